//! Streaming audio (WEM) reader
//!
//! Embedded audio streams are self-contained RIFF/WAVE containers. The
//! reader parses the `fmt ` chunk for the stream parameters and then pulls
//! decoded sample frames one block at a time; reaching the end of the
//! `data` chunk is a normal termination signal (`Ok(None)`), distinct from
//! an I/O failure.
//!
//! Frame decoding is implemented for plain 16-bit PCM payloads. Streams
//! carrying any other codec tag still parse (the parameters and raw payload
//! are exposed) but their sample decode is delegated to the external
//! transcoder at the dispatch layer.

use std::io::{Read, Seek, SeekFrom};

use crate::{FormatError, Result};

/// Codec tag for plain 16-bit PCM.
pub const CODEC_PCM: u16 = 0x0001;

/// Stream parameters from the `fmt ` chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WemFormat {
    /// Codec tag (1 = PCM; Wwise codecs use vendor values).
    pub codec: u16,
    /// Channel count, fixed for the whole stream.
    pub channels: u16,
    /// Sample rate in Hz, fixed for the whole stream.
    pub sample_rate: u32,
    /// Bytes per frame (one sample for every channel).
    pub block_align: u16,
    /// Bits per sample.
    pub bits_per_sample: u16,
}

/// Pull-based reader over one embedded audio stream.
#[derive(Debug)]
pub struct WemReader<R> {
    reader: R,
    format: WemFormat,
    data_start: u64,
    data_len: u64,
    consumed: u64,
}

impl<R: Read + Seek> WemReader<R> {
    /// Parse the RIFF envelope and position the reader at the first frame.
    pub fn open(mut reader: R) -> Result<Self> {
        let mut tag = [0u8; 4];
        reader.read_exact(&mut tag)?;
        if &tag != b"RIFF" {
            return Err(FormatError::Unrecognized(format!(
                "not a RIFF stream: {:02x?}",
                tag
            )));
        }
        let riff_size = read_u32(&mut reader)?;
        reader.read_exact(&mut tag)?;
        if &tag != b"WAVE" {
            return Err(FormatError::Unrecognized(format!(
                "not a WAVE stream: {:02x?}",
                tag
            )));
        }
        let riff_end = 8 + u64::from(riff_size);

        let mut format = None;
        let mut data = None;
        while reader.stream_position()? + 8 <= riff_end {
            reader.read_exact(&mut tag)?;
            let size = read_u32(&mut reader)?;
            let payload_start = reader.stream_position()?;
            match &tag {
                b"fmt " => {
                    if size < 16 {
                        return Err(FormatError::Structure(format!(
                            "fmt chunk too small: {size} bytes"
                        )));
                    }
                    let codec = read_u16(&mut reader)?;
                    let channels = read_u16(&mut reader)?;
                    let sample_rate = read_u32(&mut reader)?;
                    let _byte_rate = read_u32(&mut reader)?;
                    let block_align = read_u16(&mut reader)?;
                    let bits_per_sample = read_u16(&mut reader)?;
                    if channels == 0 || block_align == 0 {
                        return Err(FormatError::Structure(
                            "fmt chunk declares zero channels or block size".into(),
                        ));
                    }
                    format = Some(WemFormat {
                        codec,
                        channels,
                        sample_rate,
                        block_align,
                        bits_per_sample,
                    });
                }
                b"data" => {
                    data = Some((payload_start, u64::from(size)));
                }
                // cue points, loop markers and Wwise extensions are opaque
                _ => {}
            }
            // Chunks are word-aligned
            let next = payload_start + u64::from(size) + u64::from(size) % 2;
            reader.seek(SeekFrom::Start(next))?;
        }

        let format = format
            .ok_or_else(|| FormatError::Structure("stream has no fmt chunk".into()))?;
        let (data_start, data_len) =
            data.ok_or_else(|| FormatError::Structure("stream has no data chunk".into()))?;

        reader.seek(SeekFrom::Start(data_start))?;
        Ok(Self {
            reader,
            format,
            data_start,
            data_len,
            consumed: 0,
        })
    }

    /// Stream parameters.
    pub fn format(&self) -> WemFormat {
        self.format
    }

    /// Whether [`Self::next_frame`] can decode this stream's samples.
    pub fn is_pcm16(&self) -> bool {
        self.format.codec == CODEC_PCM && self.format.bits_per_sample == 16
    }

    /// Total payload size in bytes.
    pub fn payload_len(&self) -> u64 {
        self.data_len
    }

    /// Decode the next frame: one i16 sample per channel.
    ///
    /// Returns `Ok(None)` when the payload is fully consumed. A frame cut
    /// short by the end of the payload is a structural error; a non-PCM
    /// codec is an unrecognized-format error.
    pub fn next_frame(&mut self) -> Result<Option<Vec<i16>>> {
        if !self.is_pcm16() {
            return Err(FormatError::Unrecognized(format!(
                "codec {:#06x} needs the external transcoder",
                self.format.codec
            )));
        }
        let remaining = self.data_len - self.consumed;
        if remaining == 0 {
            return Ok(None);
        }
        let frame_len = u64::from(self.format.block_align);
        if remaining < frame_len {
            return Err(FormatError::Structure(format!(
                "trailing {remaining} bytes do not form a whole frame"
            )));
        }

        let mut buf = vec![0u8; frame_len as usize];
        self.reader.read_exact(&mut buf)?;
        self.consumed += frame_len;

        let samples = buf
            .chunks_exact(2)
            .map(|c| i16::from_le_bytes([c[0], c[1]]))
            .collect();
        Ok(Some(samples))
    }

    /// Read the raw payload without decoding (any codec).
    pub fn read_payload(&mut self) -> Result<Vec<u8>> {
        self.reader.seek(SeekFrom::Start(self.data_start))?;
        let mut buf = vec![0u8; self.data_len as usize];
        self.reader.read_exact(&mut buf)?;
        self.consumed = self.data_len;
        Ok(buf)
    }
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u16<R: Read>(reader: &mut R) -> Result<u16> {
    let mut buf = [0u8; 2];
    reader.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}
