//! Reader-based segment driver.

use std::io::{ErrorKind, Read};

use either::Either::{Left, Right};

use crate::sans::{
    check::Crc,
    data::DecodedMessage,
    definition::{Definition, DeveloperDefinition, MessageDefinition},
    header::{FIXED_HEADER_SIZE, RecordHeader, SegmentHeader},
    table::DefinitionTable,
};

use super::{Error, Trailer};

/// Where in a segment a read happens, used to classify short reads.
#[derive(Debug, Clone, Copy)]
enum Position {
    Header,
    Record,
}

impl Position {
    fn error(self, err: std::io::Error) -> Error {
        match (err.kind(), self) {
            (ErrorKind::UnexpectedEof, Position::Header) => Error::TruncatedHeader(err),
            (ErrorKind::UnexpectedEof, Position::Record) => Error::TruncatedStream(err),
            _ => Error::Io(err),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    SegmentHeader,
    Records,
    Done,
}

/// A byte source with a counter of record bytes read and a running check
/// value.
#[derive(Debug)]
struct Source<R> {
    r: R,
    i: usize,
    c: Crc,
}

impl<R: Read> Source<R> {
    /// Fill a buffer from the source, advancing the counter and accumulating
    /// the check value.
    fn fill(&mut self, buf: &mut [u8], at: Position) -> Result<(), Error> {
        self.r.read_exact(buf).map_err(|e| at.error(e))?;
        self.i += buf.len();
        self.c.update(buf);
        Ok(())
    }

    /// Take an exact number of bytes.
    fn take<const N: usize>(&mut self, at: Position) -> Result<[u8; N], Error> {
        let mut buf = [0; N];
        self.fill(&mut buf, at)?;
        Ok(buf)
    }

    /// Take a single byte, or `None` if the source is exhausted.
    fn first(&mut self) -> Result<Option<u8>, Error> {
        let mut buf = [0; 1];
        loop {
            match self.r.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::Io(e)),
            }
        }

        self.i += 1;
        self.c.update(&buf);
        Ok(Some(buf[0]))
    }
}

/// Decode messages from a reader, one segment after another.
///
/// Each call to [`Iterator::next`] reads as many records as it takes to
/// produce the next message. Once an error has been yielded the iterator is
/// fused and returns `None`.
#[derive(Debug)]
pub struct Reader<R> {
    source: Source<R>,
    table: DefinitionTable,
    trailer: Trailer,
    state: State,
    /// Declared record bytes of the current segment.
    end: usize,
}

impl<R: Read> Reader<R> {
    pub fn new(r: R, trailer: Trailer) -> Self {
        Self {
            source: Source {
                r,
                i: 0,
                c: Crc::default(),
            },
            table: DefinitionTable::default(),
            trailer,
            state: State::SegmentHeader,
            end: 0,
        }
    }

    fn advance(&mut self) -> Result<Option<DecodedMessage>, Error> {
        loop {
            match self.state {
                State::Done => return Ok(None),
                State::SegmentHeader => {
                    self.state = if self.read_segment_header()? {
                        State::Records
                    } else {
                        tracing::debug!("Reached the end of the input");
                        State::Done
                    };
                }
                State::Records if self.source.i >= self.end => {
                    if self.source.i != self.end {
                        Err(Error::TruncatedStream(std::io::Error::new(
                            ErrorKind::InvalidData,
                            format!(
                                "records span {} bytes, segment header declares {}",
                                self.source.i, self.end
                            ),
                        )))?;
                    }

                    self.read_trailer()?;
                    self.state = State::SegmentHeader;
                }
                State::Records => {
                    if let Some(message) = self.read_record()? {
                        return Ok(Some(message));
                    }
                }
            }
        }
    }

    /// Read a segment header and prepare for its records.
    ///
    /// Returns false if the input ended cleanly before another segment.
    fn read_segment_header(&mut self) -> Result<bool, Error> {
        self.source.c = Crc::default();

        let Some(first) = self.source.first()? else {
            return Ok(false);
        };

        let mut fixed = [first; FIXED_HEADER_SIZE];
        self.source.fill(&mut fixed[1..], Position::Header)?;

        let header = SegmentHeader::decode(fixed)?;

        let mut extension = vec![0; header.extension_size()];
        self.source.fill(&mut extension, Position::Header)?;

        tracing::debug!(
            header_size = header.header_size,
            protocol_version = header.protocol_version,
            profile_version = header.profile_version,
            data_size = header.data_size,
            "Decoded segment header"
        );

        self.table.reset();
        self.source.i = 0;
        self.end = header.data_size as usize;

        Ok(true)
    }

    /// Read one record, returning a message if it was a data record.
    fn read_record(&mut self) -> Result<Option<DecodedMessage>, Error> {
        let [byte] = self.source.take::<1>(Position::Record)?;
        let header = RecordHeader::classify(byte);

        if header.is_compressed {
            Err(Error::CompressedTimestamp(byte))?;
        }

        if header.is_definition {
            let definition = self.read_definition(header)?;

            tracing::trace!(
                local = header.local_type,
                global = definition.global,
                fields = definition.fields.len(),
                dev_fields = definition.dev_fields.len(),
                "Installed definition"
            );

            self.table.define(header.local_type, definition);
            Ok(None)
        } else {
            self.read_data(header).map(Some)
        }
    }

    fn read_definition(&mut self, header: RecordHeader) -> Result<MessageDefinition, Error> {
        let state = Definition::decode(self.source.take(Position::Record)?);

        let mut block = vec![0; state.block_size()];
        self.source.fill(&mut block, Position::Record)?;

        let definition = match state.advance(&block, header.has_developer_fields)? {
            Left(state) => {
                let [count] = self.source.take::<1>(Position::Record)?;

                let mut block = vec![0; DeveloperDefinition::block_size(count)];
                self.source.fill(&mut block, Position::Record)?;

                state.advance(&block)?
            }
            Right(definition) => definition,
        };

        Ok(definition)
    }

    fn read_data(&mut self, header: RecordHeader) -> Result<DecodedMessage, Error> {
        let local = header.local_type;
        let definition = self.table.resolve(local)?;

        let mut body = vec![0; definition.data_size()];
        self.source.fill(&mut body, Position::Record)?;

        Ok(DecodedMessage::from_body(local, definition, &body))
    }

    /// Read the trailer closing a segment, verifying it if requested.
    fn read_trailer(&mut self) -> Result<(), Error> {
        let bytes = self.source.i;
        let calculated = self.source.c.value();
        let found = u16::from_le_bytes(self.source.take(Position::Record)?);

        if self.trailer == Trailer::Verify && found != calculated {
            Err(Error::CyclicRedundancyCheck { found, calculated })?;
        }

        tracing::debug!(bytes, "Finished segment");
        Ok(())
    }
}

impl<R: Read> Iterator for Reader<R> {
    type Item = Result<DecodedMessage, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.advance() {
            Ok(message) => message.map(Ok),
            Err(err) => {
                self.state = State::Done;
                Some(Err(err))
            }
        }
    }
}
