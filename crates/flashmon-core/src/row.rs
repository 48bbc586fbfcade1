//! Canonical hex-dump row format
//!
//! One row covers 16 bytes of the device:
//!
//! ```text
//! 00000010: 4142 4344 4546 4748 494a 4b4c 4d4e 4f50  ABCDEFGHIJKLMNOP
//! ```
//!
//! 67 characters: an 8-digit address, `": "`, eight groups of four hex
//! digits separated by single spaces with an extra space after the last
//! group, then the ASCII rendering with non-printables as `'.'`. Dump
//! output and write-line input share this layout, so the renderer and the
//! decoder live together and agree on byte offsets.

use crate::hex;

/// Payload bytes per row.
pub const ROW_BYTES: usize = 16;

/// Characters in a rendered row, newline excluded.
pub const ROW_LEN: usize = 67;

/// Offset of the `':'` after the address field.
const COLON: usize = 8;

/// Offset of the first payload hex digit.
const PAYLOAD: usize = 10;

/// Offset of the ASCII rendering.
const ASCII: usize = 51;

/// Offset of payload byte `j`'s first hex digit.
fn payload_offset(j: usize) -> usize {
    PAYLOAD + (j / 2) * 5 + (j % 2) * 2
}

/// Render one canonical dump row for the 16 bytes at `addr`.
pub fn render(addr: u32, data: &[u8; ROW_BYTES]) -> [u8; ROW_LEN] {
    let mut out = [b' '; ROW_LEN];
    out[..COLON].copy_from_slice(&hex::encode::<8>(addr as u64));
    out[COLON] = b':';
    for (j, &b) in data.iter().enumerate() {
        let off = payload_offset(j);
        out[off..off + 2].copy_from_slice(&hex::encode::<2>(b as u64));
        out[ASCII + j] = if (0x20..=0x7e).contains(&b) { b } else { b'.' };
    }
    out
}

/// Check whether `line` has the shape of a write line: exactly [`ROW_LEN`]
/// characters with `':'` at offset 8.
///
/// Lines that do not match are ignored by the dispatcher, not reported.
pub fn is_write_line(line: &[u8]) -> bool {
    line.len() == ROW_LEN && line[COLON] == b':'
}

/// Decode a write line into its target address and 16-byte payload.
///
/// The caller must have checked [`is_write_line`]. Interior characters are
/// not validated: malformed hex decodes to garbage bytes, not an error.
/// The trailing ASCII column is ignored.
pub fn parse(line: &[u8]) -> (u32, [u8; ROW_BYTES]) {
    debug_assert!(is_write_line(line));
    let mut addr = 0u32;
    for pair in 0..4 {
        addr = (addr << 8) | u32::from(hex::decode_byte(line[pair * 2], line[pair * 2 + 1]));
    }
    let mut payload = [0u8; ROW_BYTES];
    for (j, slot) in payload.iter_mut().enumerate() {
        let off = payload_offset(j);
        *slot = hex::decode_byte(line[off], line[off + 1]);
    }
    (addr, payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &[u8] = b"00000010: 4142 4344 4546 4748 494a 4b4c 4d4e 4f50  ABCDEFGHIJKLMNOP";

    #[test]
    fn test_render_matches_canonical_layout() {
        let payload = *b"ABCDEFGHIJKLMNOP";
        let rendered = render(0x10, &payload);
        assert_eq!(&rendered[..], SAMPLE);
    }

    #[test]
    fn test_render_maps_non_printables_to_dot() {
        let mut payload = [0u8; ROW_BYTES];
        payload[1] = b' ';
        payload[2] = 0x7f;
        payload[3] = b'~';
        let rendered = render(0, &payload);
        assert_eq!(&rendered[ASCII..ASCII + 4], b". .~");
    }

    #[test]
    fn test_is_write_line() {
        assert!(is_write_line(SAMPLE));
        assert!(!is_write_line(b"dump"));
        assert!(!is_write_line(&SAMPLE[..66]));
        let mut broken = SAMPLE.to_vec();
        broken[COLON] = b' ';
        assert!(!is_write_line(&broken));
    }

    #[test]
    fn test_parse_sample_line() {
        let (addr, payload) = parse(SAMPLE);
        assert_eq!(addr, 0x10);
        assert_eq!(&payload, b"ABCDEFGHIJKLMNOP");
    }

    #[test]
    fn test_parse_is_case_tolerant() {
        let upper: heapless::Vec<u8, ROW_LEN> =
            SAMPLE.iter().map(|b| b.to_ascii_uppercase()).collect();
        let (addr, payload) = parse(&upper);
        assert_eq!(addr, 0x10);
        assert_eq!(&payload, b"ABCDEFGHIJKLMNOP");
    }

    #[test]
    fn test_render_parse_round_trip() {
        let addr = 0xdead_bee0;
        let payload: [u8; ROW_BYTES] = core::array::from_fn(|i| (i as u8) * 17 ^ 0x5a);
        let rendered = render(addr, &payload);
        assert_eq!(parse(&rendered), (addr, payload));
    }
}
