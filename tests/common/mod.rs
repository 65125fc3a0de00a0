#![allow(dead_code)]

use freewheel::sans::check::compute_crc;

/// Definition record header for a local type.
pub fn definition_header(local: u8) -> u8 {
    0x40 | local
}

/// Definition record with regular fields only.
pub fn definition(local: u8, architecture: u8, global: u16, fields: &[[u8; 3]]) -> Vec<u8> {
    let mut r = vec![definition_header(local), 0, architecture];
    r.extend_from_slice(&if architecture == 0 {
        global.to_le_bytes()
    } else {
        global.to_be_bytes()
    });
    r.push(fields.len() as u8);
    r.extend(fields.iter().flatten());
    r
}

/// Definition record with a developer field block.
pub fn dev_definition(local: u8, global: u16, fields: &[[u8; 3]], dev: &[[u8; 3]]) -> Vec<u8> {
    let mut r = definition(local, 0, global, fields);
    r[0] |= 0x20;
    r.push(dev.len() as u8);
    r.extend(dev.iter().flatten());
    r
}

/// Data record for a local type.
pub fn data(local: u8, body: &[u8]) -> Vec<u8> {
    let mut r = vec![local];
    r.extend_from_slice(body);
    r
}

/// A full segment with a header of `header_size` bytes and a valid trailer.
pub fn segment(header_size: u8, records: &[Vec<u8>]) -> Vec<u8> {
    let records: Vec<u8> = records.concat();

    let mut r = vec![header_size, 0x20];
    r.extend_from_slice(&2132u16.to_le_bytes());
    r.extend_from_slice(&(records.len() as u32).to_le_bytes());
    r.extend_from_slice(b".FIT");
    if header_size == 14 {
        let crc = compute_crc(0, &r);
        r.extend_from_slice(&crc.to_le_bytes());
    }
    assert_eq!(r.len(), header_size as usize);

    r.extend_from_slice(&records);
    let crc = compute_crc(0, &r);
    r.extend_from_slice(&crc.to_le_bytes());
    r
}

/// The scenario stream: one definition of global message 20 with a single
/// two-byte field 3 on local type 0, and one data record.
pub fn minimal_segment() -> Vec<u8> {
    segment(
        12,
        &[
            definition(0, 0, 20, &[[3, 2, 0x84]]),
            data(0, &[0x01, 0x02]),
        ],
    )
}
