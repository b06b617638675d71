//! Build-info decoder
//!
//! A tiny metadata asset the engine writes at build time: three
//! null-terminated strings followed by seven packed little-endian u32
//! fields (timestamp components plus a build id). The first string is read
//! verbatim; the second and third may carry an empty leading segment that
//! is skipped. A string that never terminates before the input ends is a
//! format error.

use std::io::Read;

use crate::{FormatError, Result};

/// Decoded build metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    /// Engine version string.
    pub version: String,
    /// Build platform.
    pub platform: String,
    /// Source revision identifier.
    pub revision: String,
    /// Build year.
    pub year: u32,
    /// Build month.
    pub month: u32,
    /// Build day.
    pub day: u32,
    /// Build hour.
    pub hour: u32,
    /// Build minute.
    pub minute: u32,
    /// Build second.
    pub second: u32,
    /// Monotonic build id.
    pub build_id: u32,
}

impl BuildInfo {
    /// Decode build metadata from the start of a section reader.
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let version = read_cstr(reader)?;
        let platform = read_cstr_skip_empty(reader)?;
        let revision = read_cstr_skip_empty(reader)?;

        let mut fields = [0u32; 7];
        for field in &mut fields {
            let mut buf = [0u8; 4];
            reader.read_exact(&mut buf)?;
            *field = u32::from_le_bytes(buf);
        }

        let [year, month, day, hour, minute, second, build_id] = fields;
        Ok(Self {
            version,
            platform,
            revision,
            year,
            month,
            day,
            hour,
            minute,
            second,
            build_id,
        })
    }

    /// Timestamp rendered as `YYYY-MM-DD HH:MM:SS`.
    pub fn timestamp(&self) -> String {
        format!(
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Read bytes until a null terminator.
///
/// Reaching end of input before the terminator is a format error, never a
/// truncated success.
fn read_cstr<R: Read>(reader: &mut R) -> Result<String> {
    let mut bytes = Vec::new();
    loop {
        let mut byte = [0u8; 1];
        match reader.read_exact(&mut byte) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Err(FormatError::Structure(
                    "string field is missing its null terminator".into(),
                ));
            }
            Err(e) => return Err(e.into()),
        }
        if byte[0] == 0 {
            break;
        }
        bytes.push(byte[0]);
    }
    String::from_utf8(bytes)
        .map_err(|e| FormatError::Structure(format!("string field is not UTF-8: {e}")))
}

/// Read a string field that may start with an empty leading segment.
fn read_cstr_skip_empty<R: Read>(reader: &mut R) -> Result<String> {
    let first = read_cstr(reader)?;
    if first.is_empty() {
        read_cstr(reader)
    } else {
        Ok(first)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn fixture(strings: &[&[u8]], fields: &[u32; 7]) -> Vec<u8> {
        let mut data = Vec::new();
        for s in strings {
            data.extend_from_slice(s);
        }
        for f in fields {
            data.extend_from_slice(&f.to_le_bytes());
        }
        data
    }

    #[test]
    fn test_decode_build_info() {
        let data = fixture(
            &[b"1.9.2\0", b"win64\0", b"a1b2c3\0"],
            &[2024, 3, 18, 11, 42, 5, 90210],
        );
        let info = BuildInfo::read(&mut Cursor::new(data)).expect("decode");

        assert_eq!(info.version, "1.9.2");
        assert_eq!(info.platform, "win64");
        assert_eq!(info.revision, "a1b2c3");
        assert_eq!(info.build_id, 90210);
        assert_eq!(info.timestamp(), "2024-03-18 11:42:05");
    }

    #[test]
    fn test_empty_leading_segments_are_skipped() {
        // Second and third fields each start with an empty segment
        let data = fixture(
            &[b"1.9.2\0", b"\0win64\0", b"\0a1b2c3\0"],
            &[2024, 3, 18, 11, 42, 5, 1],
        );
        let info = BuildInfo::read(&mut Cursor::new(data)).expect("decode");
        assert_eq!(info.platform, "win64");
        assert_eq!(info.revision, "a1b2c3");
    }

    #[test]
    fn test_first_string_is_verbatim() {
        // An empty first field stays empty; only the later fields skip
        let data = fixture(&[b"\0", b"win64\0", b"rev\0"], &[1, 1, 1, 1, 1, 1, 1]);
        let info = BuildInfo::read(&mut Cursor::new(data)).expect("decode");
        assert_eq!(info.version, "");
        assert_eq!(info.platform, "win64");
    }

    #[test]
    fn test_unterminated_string_fails() {
        let data = b"1.9.2".to_vec();
        let err = BuildInfo::read(&mut Cursor::new(data)).unwrap_err();
        assert!(matches!(err, FormatError::Structure(_)), "{err}");
    }

    #[test]
    fn test_truncated_fields_fail() {
        let mut data = fixture(&[b"v\0", b"p\0", b"r\0"], &[1, 1, 1, 1, 1, 1, 1]);
        data.truncate(data.len() - 2);
        assert!(BuildInfo::read(&mut Cursor::new(data)).is_err());
    }
}
