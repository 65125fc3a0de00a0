//! Background decoding over a bounded channel.

use std::{
    any::Any,
    io::{self, Read},
    panic::{self, AssertUnwindSafe},
    thread,
};

use crossbeam::channel::{Receiver, bounded};

use crate::sans::data::DecodedMessage;

use super::{Error, Options, Trailer, reader::Reader};

/// A single-use decoder for one byte source.
///
/// [`Decoder::start`] consumes the decoder, so a source can only ever be
/// decoded once. Decoding several sources at the same time needs one decoder
/// each; nothing is shared between them.
#[derive(Debug)]
pub struct Decoder<R> {
    r: R,
    options: Options,
}

impl<R> Decoder<R> {
    /// Create a decoder with default options.
    pub fn new(r: R) -> Self {
        Self {
            r,
            options: Options::default(),
        }
    }

    /// Replace all options.
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Verify each segment's trailer against the bytes read.
    pub fn verify_trailer(mut self) -> Self {
        self.options.trailer = Trailer::Verify;
        self
    }

    /// Set the number of messages the channel holds before decoding blocks.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.options.capacity = capacity;
        self
    }

    pub fn options(&self) -> &Options {
        &self.options
    }
}

impl<R: Read + Send + 'static> Decoder<R> {
    /// Start decoding on a background thread.
    ///
    /// The thread blocks whenever the channel is full, so it never runs far
    /// ahead of the consumer. It stops once the input is exhausted, after
    /// sending a terminal error, or when the returned [`Messages`] is dropped.
    /// A panic inside the byte source is delivered as a terminal
    /// [`Error::Io`].
    pub fn start(self) -> Messages {
        let (tx, rx) = bounded(self.options.capacity.max(1));
        let mut reader = self.into_iter();

        thread::spawn(move || {
            loop {
                let item = match panic::catch_unwind(AssertUnwindSafe(|| reader.next())) {
                    Ok(Some(item)) => item,
                    Ok(None) => return,
                    Err(payload) => Err(Error::Io(io::Error::other(panic_message(&*payload)))),
                };
                let is_terminal = item.is_err();

                if let Err(err) = &item {
                    tracing::warn!(error = %err, "Decoding ended with an error");
                }

                if tx.send(item).is_err() {
                    tracing::debug!("Receiver dropped, abandoning decode");
                    return;
                }

                if is_terminal {
                    return;
                }
            }
        });

        Messages { rx }
    }
}

/// Describe a panic raised by the byte source.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown cause");

    format!("byte source panicked: {detail}")
}

impl<R: Read> IntoIterator for Decoder<R> {
    type Item = Result<DecodedMessage, Error>;
    type IntoIter = Reader<R>;

    /// Decode on the current thread instead.
    fn into_iter(self) -> Self::IntoIter {
        Reader::new(self.r, self.options.trailer)
    }
}

/// The receiving end of a running decode.
///
/// Yields messages in stream order. If decoding fails, the error is the last
/// item; otherwise iteration ends when the input is exhausted.
#[derive(Debug)]
pub struct Messages {
    rx: Receiver<Result<DecodedMessage, Error>>,
}

impl Messages {
    /// The underlying channel receiver, for use with `select!`.
    pub fn receiver(&self) -> &Receiver<Result<DecodedMessage, Error>> {
        &self.rx
    }
}

impl Iterator for Messages {
    type Item = Result<DecodedMessage, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rx.recv().ok()
    }
}
