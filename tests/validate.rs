mod common;

use std::io::Cursor;

use common::{data, definition, dev_definition, segment};
use csv::ReaderBuilder;
use freewheel::{DecodedMessage, Decoder};

/// Expected messages, one per row: global message number, then pairs of field
/// number and hex-encoded bytes. Developer fields are written as
/// `index/number`.
const EXPECTED: &str = "\
0,0,04,1,ff00,4,01020304
20,253,00000001,0,10,2,7b00
20,253,00000002,0,11,2,7c00
20,253,00000003,0,12,2,7d00,0/5,2a
21,253,00000004
20,253,00000005,0,13,2,7e00
";

fn activity() -> Vec<u8> {
    let mut bytes = segment(
        14,
        &[
            definition(0, 0, 0, &[[0, 1, 0x00], [1, 2, 0x84], [4, 4, 0x86]]),
            data(0, &[0x04, 0xFF, 0x00, 0x01, 0x02, 0x03, 0x04]),
            definition(1, 1, 20, &[[253, 4, 0x86], [0, 1, 0x02], [2, 2, 0x84]]),
            data(1, &[0, 0, 0, 1, 0x10, 0x7B, 0x00]),
            data(1, &[0, 0, 0, 2, 0x11, 0x7C, 0x00]),
            dev_definition(
                1,
                20,
                &[[253, 4, 0x86], [0, 1, 0x02], [2, 2, 0x84]],
                &[[5, 1, 0]],
            ),
            data(1, &[0, 0, 0, 3, 0x12, 0x7D, 0x00, 0x2A]),
        ],
    );

    bytes.extend(segment(
        12,
        &[
            definition(1, 0, 21, &[[253, 4, 0x86]]),
            data(1, &[0, 0, 0, 4]),
            definition(0, 0, 20, &[[253, 4, 0x86], [0, 1, 0x02], [2, 2, 0x84]]),
            data(0, &[0, 0, 0, 5, 0x13, 0x7E, 0x00]),
        ],
    ));

    bytes
}

struct Validator(Vec<Vec<String>>);

impl Validator {
    fn new(expected: &str) -> Self {
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .has_headers(false)
            .from_reader(expected.as_bytes());

        let rows = reader
            .records()
            .map(|r| r.unwrap().iter().map(|f| f.to_string()).collect())
            .collect();

        Self(rows)
    }

    fn validate(&mut self, message: &DecodedMessage) {
        let mut row = self.0.remove(0).into_iter();
        assert_eq!(row.next().unwrap(), message.global.to_string());

        let mut fields = 0;
        let mut dev_fields = 0;

        while let (Some(key), Some(value)) = (row.next(), row.next()) {
            let bytes = match key.split_once('/') {
                Some((index, number)) => {
                    dev_fields += 1;
                    let index: u8 = index.parse().unwrap();
                    let number: u8 = number.parse().unwrap();
                    &message.dev_fields[&index][&number]
                }
                None => {
                    fields += 1;
                    &message.fields[&key.parse::<u8>().unwrap()]
                }
            };

            assert_eq!(hex(bytes), value, "field {key} of {}", message.global);
        }

        assert_eq!(message.fields.len(), fields);
        let found: usize = message.dev_fields.values().map(|f| f.len()).sum();
        assert_eq!(found, dev_fields);
    }

    fn finish(self) {
        assert!(self.0.is_empty(), "{} messages missing", self.0.len());
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[test]
fn validate_channel() {
    let mut validator = Validator::new(EXPECTED);

    for message in Decoder::new(Cursor::new(activity())).verify_trailer().start() {
        validator.validate(&message.unwrap());
    }

    validator.finish();
}

#[test]
fn validate_reader() {
    let mut validator = Validator::new(EXPECTED);

    for message in Decoder::new(Cursor::new(activity())) {
        validator.validate(&message.unwrap());
    }

    validator.finish();
}
