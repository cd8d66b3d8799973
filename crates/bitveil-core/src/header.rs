//! # Embedded payload header
//!
//! Six bytes in front of the payload: its own length, the payload length in
//! big endian, and the settings byte. The length marker comes first so future
//! writers can grow the header; this reader skips bytes it does not know.

use std::io::Cursor;

use byteorder::{BigEndian, ByteOrder, ReadBytesExt};

use crate::error::BitveilError;
use crate::result::Result;

/// Header length this writer emits. Readers accept longer markers and
/// ignore the surplus bytes, shorter ones are malformed.
pub(crate) const HEADER_LEN: u8 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PayloadHeader {
    pub payload_len: u32,
    pub settings_byte: u8,
}

impl PayloadHeader {
    pub(crate) fn to_bytes(self) -> [u8; HEADER_LEN as usize] {
        let mut bytes = [0u8; HEADER_LEN as usize];
        bytes[0] = HEADER_LEN;
        BigEndian::write_u32(&mut bytes[1..5], self.payload_len);
        bytes[5] = self.settings_byte;
        bytes
    }

    /// Number of bytes following the length marker, after validating it.
    pub(crate) fn body_len(first_byte: u8) -> Result<usize> {
        if first_byte < HEADER_LEN {
            return Err(BitveilError::MalformedHeader(
                "header length below the minimum",
            ));
        }
        Ok(usize::from(first_byte) - 1)
    }

    /// Parse the bytes following the length marker. Anything past the
    /// payload length and settings byte is ignored.
    pub(crate) fn from_body(body: &[u8]) -> Result<PayloadHeader> {
        let mut cursor = Cursor::new(body);
        let payload_len = cursor
            .read_u32::<BigEndian>()
            .map_err(|_| BitveilError::MalformedHeader("truncated header"))?;
        let settings_byte = cursor
            .read_u8()
            .map_err(|_| BitveilError::MalformedHeader("truncated header"))?;

        Ok(PayloadHeader {
            payload_len,
            settings_byte,
        })
    }
}
