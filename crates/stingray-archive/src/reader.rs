//! Bounded section readers.
//!
//! [`SectionReader`] restricts an underlying reader to one section's byte
//! range and rebases seeks onto it. [`ChainReader`] presents several
//! sections as one logical contiguous stream, for formats whose header
//! lives in one section and payload in another.

use std::io::{self, Read, Seek, SeekFrom};

/// Seekable reader over one section's byte range.
///
/// Every read re-seeks the underlying reader, so multiple section readers
/// over the same file handle type stay independent.
#[derive(Debug)]
pub struct SectionReader<R> {
    inner: R,
    start: u64,
    len: u64,
    pos: u64,
}

impl<R: Read + Seek> SectionReader<R> {
    /// Wrap `inner`, exposing `len` bytes starting at `start`.
    pub fn new(inner: R, start: u64, len: u64) -> Self {
        Self {
            inner,
            start,
            len,
            pos: 0,
        }
    }

    /// Section length in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Whether the section is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<R: Read + Seek> Read for SectionReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.len.saturating_sub(self.pos);
        if remaining == 0 {
            return Ok(0);
        }
        let want = buf.len().min(remaining as usize);
        self.inner.seek(SeekFrom::Start(self.start + self.pos))?;
        let n = self.inner.read(&mut buf[..want])?;
        self.pos += n as u64;
        Ok(n)
    }
}

impl<R: Read + Seek> Seek for SectionReader<R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => i128::from(offset),
            SeekFrom::End(delta) => i128::from(self.len) + i128::from(delta),
            SeekFrom::Current(delta) => i128::from(self.pos) + i128::from(delta),
        };
        if target < 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek before start of section",
            ));
        }
        self.pos = target as u64;
        Ok(self.pos)
    }
}

/// Several sections presented as one logical contiguous stream.
#[derive(Debug)]
pub struct ChainReader<R> {
    parts: Vec<SectionReader<R>>,
    pos: u64,
    total: u64,
}

impl<R: Read + Seek> ChainReader<R> {
    /// Chain the given section readers in order.
    pub fn new(parts: Vec<SectionReader<R>>) -> Self {
        let total = parts.iter().map(SectionReader::len).sum();
        Self {
            parts,
            pos: 0,
            total,
        }
    }

    /// Combined length of all chained sections.
    pub fn len(&self) -> u64 {
        self.total
    }

    /// Whether the chain holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Locate the part containing `pos` and the offset within it.
    fn part_at(&self, pos: u64) -> Option<(usize, u64)> {
        let mut base = 0;
        for (i, part) in self.parts.iter().enumerate() {
            if pos < base + part.len() {
                return Some((i, pos - base));
            }
            base += part.len();
        }
        None
    }
}

impl<R: Read + Seek> Read for ChainReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let Some((index, local)) = self.part_at(self.pos) else {
            return Ok(0);
        };
        let part = &mut self.parts[index];
        part.seek(SeekFrom::Start(local))?;
        let n = part.read(buf)?;
        self.pos += n as u64;
        Ok(n)
    }
}

impl<R: Read + Seek> Seek for ChainReader<R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => i128::from(offset),
            SeekFrom::End(delta) => i128::from(self.total) + i128::from(delta),
            SeekFrom::Current(delta) => i128::from(self.pos) + i128::from(delta),
        };
        if target < 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek before start of chain",
            ));
        }
        self.pos = target as u64;
        Ok(self.pos)
    }
}
