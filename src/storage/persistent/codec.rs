//! Record framing for the file backend.
//!
//! Every record file holds exactly one frame:
//!
//! ```text
//! [version: 1 byte][length: 4 bytes LE][payload: N bytes][crc32: 4 bytes LE]
//! ```
//!
//! The payload is whatever the caller stored (JSON for proximity records).
//! A torn or bit-flipped file is reported instead of being handed to the
//! deserializer.

use crc32fast::Hasher;

/// Current codec version.
const CODEC_VERSION: u8 = 1;

const HEADER_LEN: usize = 1 + 4;
const TRAILER_LEN: usize = 4;

fn checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Frames `payload` with version, length and checksum.
///
/// # Errors
///
/// Returns an error if the payload does not fit the 32-bit length field.
pub fn encode(payload: &[u8]) -> Result<Vec<u8>, String> {
    let len = u32::try_from(payload.len())
        .map_err(|_| format!("payload of {} bytes exceeds frame limit", payload.len()))?;

    let mut out = Vec::with_capacity(HEADER_LEN + payload.len() + TRAILER_LEN);
    out.push(CODEC_VERSION);
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(payload);
    out.extend_from_slice(&checksum(payload).to_le_bytes());
    Ok(out)
}

/// Unframes a record, verifying version, length and checksum.
///
/// # Errors
///
/// Returns a description of the first integrity check that failed.
pub fn decode(frame: &[u8], max_payload: usize) -> Result<Vec<u8>, String> {
    if frame.len() < HEADER_LEN + TRAILER_LEN {
        return Err(format!("frame of {} bytes is truncated", frame.len()));
    }

    let version = frame[0];
    if version != CODEC_VERSION {
        return Err(format!(
            "unsupported codec version: {version} (expected {CODEC_VERSION})"
        ));
    }

    let mut len_bytes = [0u8; 4];
    len_bytes.copy_from_slice(&frame[1..HEADER_LEN]);
    let len = u32::from_le_bytes(len_bytes) as usize;

    if len > max_payload {
        return Err(format!("entry size {len} exceeds maximum {max_payload}"));
    }
    if frame.len() != HEADER_LEN + len + TRAILER_LEN {
        return Err(format!(
            "length field says {len} bytes but frame holds {}",
            frame.len().saturating_sub(HEADER_LEN + TRAILER_LEN)
        ));
    }

    let payload = &frame[HEADER_LEN..HEADER_LEN + len];
    let mut crc_bytes = [0u8; 4];
    crc_bytes.copy_from_slice(&frame[HEADER_LEN + len..]);
    let stored_crc = u32::from_le_bytes(crc_bytes);
    let computed_crc = checksum(payload);

    if stored_crc != computed_crc {
        return Err(format!(
            "CRC mismatch: stored={stored_crc:08x}, computed={computed_crc:08x} (data corrupted)"
        ));
    }

    Ok(payload.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: usize = 1024;

    #[test]
    fn test_roundtrip() {
        let payload = br#"{"isInsideZone":true,"lastAlertDistance":480}"#;
        let frame = encode(payload).unwrap();
        assert_eq!(frame.len(), HEADER_LEN + payload.len() + TRAILER_LEN);
        assert_eq!(decode(&frame, MAX).unwrap(), payload.to_vec());
    }

    #[test]
    fn test_detects_corruption() {
        let mut frame = encode(b"test data").unwrap();
        frame[7] ^= 0xFF;

        let err = decode(&frame, MAX).unwrap_err();
        assert!(err.contains("CRC"));
    }

    #[test]
    fn test_detects_truncation() {
        let frame = encode(b"some longer payload").unwrap();
        let err = decode(&frame[..frame.len() - 3], MAX).unwrap_err();
        assert!(err.contains("length field"));

        assert!(decode(&frame[..4], MAX).unwrap_err().contains("truncated"));
    }

    #[test]
    fn test_rejects_oversized_entry() {
        let mut bad = vec![CODEC_VERSION];
        bad.extend_from_slice(&200_000_000u32.to_le_bytes());
        bad.extend_from_slice(&[0u8; 4]);

        assert!(decode(&bad, MAX).unwrap_err().contains("exceeds maximum"));
    }

    #[test]
    fn test_rejects_unknown_version() {
        let mut frame = encode(b"x").unwrap();
        frame[0] = 9;
        assert!(decode(&frame, MAX).unwrap_err().contains("unsupported codec version"));
    }
}
