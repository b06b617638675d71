//! Audio bank and stream extraction.
//!
//! Banks are demuxed into their embedded streams, one output file per
//! stream id. Plain PCM streams are written as standard WAV directly;
//! any other codec is handed to the external transcoder, with the raw
//! stream written next to the target as the transcoder's input.

use std::io::{Cursor, Write};
use std::path::Path;

use tracing::debug;

use stingray_formats::bnk::BnkFile;
use stingray_formats::wem::{WemFormat, WemReader};

use crate::dispatch::{ExtractContext, Extractor};
use crate::Result;

/// Extracts `wwise_bank` assets: the raw soundbank, or one WAV per
/// embedded stream under a directory named after the bank.
pub struct BankExtractor;

impl Extractor for BankExtractor {
    fn extract(&self, ctx: &mut ExtractContext<'_>) -> Result<()> {
        let (_, mut out) = ctx.create_output("bnk")?;
        let main = ctx.require_main()?;
        std::io::copy(main, &mut out)?;
        out.flush()?;
        Ok(())
    }

    fn convert(&self, ctx: &mut ExtractContext<'_>) -> Result<()> {
        let main = ctx.require_main()?;
        let bank = BnkFile::read(main)?;
        debug!(bank = %ctx.name, streams = bank.stream_count(), "demuxing bank");

        for index in 0..bank.stream_count() {
            let main = ctx.require_main()?;
            let bytes = bank.read_stream(main, index)?;
            let id = bank.entries[index].id;
            let target = ctx.out_root.join(&ctx.name).join(id.to_string());
            write_stream(ctx, &bytes, &target)?;
        }
        Ok(())
    }
}

/// Extracts `wwise_stream` assets: the raw stream, or a WAV.
pub struct StreamExtractor;

impl Extractor for StreamExtractor {
    fn extract(&self, ctx: &mut ExtractContext<'_>) -> Result<()> {
        let (_, mut out) = ctx.create_output("wem")?;
        let main = ctx.require_main()?;
        std::io::copy(main, &mut out)?;
        out.flush()?;
        Ok(())
    }

    fn convert(&self, ctx: &mut ExtractContext<'_>) -> Result<()> {
        let main = ctx.require_main()?;
        let mut bytes = Vec::new();
        std::io::Read::read_to_end(main, &mut bytes)?;
        let target = ctx.out_root.join(&ctx.name);
        write_stream(ctx, &bytes, &target)
    }
}

/// Write one stream as `<target>.wav`, via the transcoder when the codec
/// is not plain PCM.
fn write_stream(ctx: &ExtractContext<'_>, wem: &[u8], target: &Path) -> Result<()> {
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let wav_path = target.with_extension("wav");

    let mut reader = WemReader::open(Cursor::new(wem))?;
    if reader.is_pcm16() {
        let format = reader.format();
        let mut samples = Vec::new();
        while let Some(frame) = reader.next_frame()? {
            samples.extend_from_slice(&frame);
        }
        let mut out = std::io::BufWriter::new(std::fs::File::create(&wav_path)?);
        write_wav(&mut out, format, &samples)?;
        out.flush()?;
        return Ok(());
    }

    // Transcoder input; removed again whichever way the conversion ends,
    // along with any partial output on failure.
    let wem_path = target.with_extension("wem");
    std::fs::write(&wem_path, wem)?;
    let result = ctx.transcoder.transcode(&wem_path, &wav_path, &[]);
    std::fs::remove_file(&wem_path).ok();
    if result.is_err() {
        std::fs::remove_file(&wav_path).ok();
    }
    result
}

/// Write interleaved i16 samples as a canonical PCM WAV file.
fn write_wav<W: Write>(out: &mut W, format: WemFormat, samples: &[i16]) -> std::io::Result<()> {
    let data_len = (samples.len() * 2) as u32;
    let byte_rate = format.sample_rate * u32::from(format.channels) * 2;

    out.write_all(b"RIFF")?;
    out.write_all(&(36 + data_len).to_le_bytes())?;
    out.write_all(b"WAVE")?;
    out.write_all(b"fmt ")?;
    out.write_all(&16u32.to_le_bytes())?;
    out.write_all(&1u16.to_le_bytes())?; // PCM
    out.write_all(&format.channels.to_le_bytes())?;
    out.write_all(&format.sample_rate.to_le_bytes())?;
    out.write_all(&byte_rate.to_le_bytes())?;
    out.write_all(&(format.channels * 2).to_le_bytes())?;
    out.write_all(&16u16.to_le_bytes())?;
    out.write_all(b"data")?;
    out.write_all(&data_len.to_le_bytes())?;
    for sample in samples {
        out.write_all(&sample.to_le_bytes())?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::collections::BTreeMap;

    use stingray_archive::{Section, SectionReader};
    use stingray_formats::bnk::{BNK_TAG, CHUNK_ID_MASK, VERSION_MASK};
    use stingray_hash::{FileID, Hash, NameTable};

    use super::*;
    use crate::dispatch::SectionSet;
    use crate::transcode::{CommandTranscoder, NullTranscoder, Transcoder};
    use crate::ExtractError;

    /// Minimal stereo stream with the given codec tag.
    fn build_wem(codec: u16, samples: &[i16]) -> Vec<u8> {
        let data_len = (samples.len() * 2) as u32;
        let mut wem = Vec::new();
        wem.extend_from_slice(b"RIFF");
        wem.extend_from_slice(&(36 + data_len).to_le_bytes());
        wem.extend_from_slice(b"WAVE");
        wem.extend_from_slice(b"fmt ");
        wem.extend_from_slice(&16u32.to_le_bytes());
        wem.extend_from_slice(&codec.to_le_bytes());
        wem.extend_from_slice(&2u16.to_le_bytes()); // channels
        wem.extend_from_slice(&44100u32.to_le_bytes());
        wem.extend_from_slice(&176_400u32.to_le_bytes());
        wem.extend_from_slice(&4u16.to_le_bytes()); // block align
        wem.extend_from_slice(&16u16.to_le_bytes());
        wem.extend_from_slice(b"data");
        wem.extend_from_slice(&data_len.to_le_bytes());
        for s in samples {
            wem.extend_from_slice(&s.to_le_bytes());
        }
        wem
    }

    fn build_pcm_wem(samples: &[i16]) -> Vec<u8> {
        build_wem(1, samples)
    }

    /// Bank with one embedded stream, masked the way the packager masks.
    fn build_bank(name: Hash, stream_id: u32, wem: &[u8]) -> Vec<u8> {
        const BKHD: u32 = u32::from_le_bytes(*b"BKHD");
        const DIDX: u32 = u32::from_le_bytes(*b"DIDX");
        const DATA: u32 = u32::from_le_bytes(*b"DATA");

        let mut body = Vec::new();
        body.extend_from_slice(&(BKHD ^ CHUNK_ID_MASK).to_le_bytes());
        body.extend_from_slice(&8u32.to_le_bytes());
        body.extend_from_slice(&(145 ^ VERSION_MASK).to_le_bytes());
        body.extend_from_slice(&0x42u32.to_le_bytes());
        body.extend_from_slice(&DIDX.to_le_bytes());
        body.extend_from_slice(&12u32.to_le_bytes());
        body.extend_from_slice(&stream_id.to_le_bytes());
        body.extend_from_slice(&0u32.to_le_bytes()); // offset in DATA
        body.extend_from_slice(&(wem.len() as u32).to_le_bytes());
        body.extend_from_slice(&DATA.to_le_bytes());
        body.extend_from_slice(&(wem.len() as u32).to_le_bytes());
        body.extend_from_slice(wem);

        let mut data = Vec::new();
        data.extend_from_slice(&BNK_TAG);
        data.extend_from_slice(&(body.len() as u32).to_le_bytes());
        data.extend_from_slice(&name.0.to_le_bytes());
        data.extend_from_slice(&body);
        data
    }

    fn context_over<'a>(
        dir: &'a Path,
        names: &'a NameTable,
        id: FileID,
        type_name: &str,
        payload: &[u8],
        sibling: &'a dyn Fn(FileID, Section) -> Option<SectionReader<std::fs::File>>,
        transcoder: &'a dyn Transcoder,
    ) -> ExtractContext<'a> {
        let backing = dir.join(format!("backing-{type_name}"));
        std::fs::write(&backing, payload).unwrap();
        let file = std::fs::File::open(&backing).unwrap();
        ExtractContext {
            id,
            name: names.resolve(id.name),
            type_name: type_name.to_owned(),
            sections: SectionSet {
                main: Some(SectionReader::new(file, 0, payload.len() as u64)),
                stream: None,
                gpu: None,
            },
            options: BTreeMap::new(),
            names,
            transcoder,
            sibling,
            out_root: dir,
        }
    }

    #[test]
    fn test_stream_converts_to_wav() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut names = NameTable::new();
        names.insert("sfx/ui/click");

        let wem = build_pcm_wem(&[100, -100, 200, -200]);
        let id = FileID::of("sfx/ui/click", "wwise_stream");
        let sibling = |_: FileID, _: Section| None;
        let mut ctx = context_over(
            dir.path(),
            &names,
            id,
            "wwise_stream",
            &wem,
            &sibling,
            &NullTranscoder,
        );

        StreamExtractor.convert(&mut ctx).expect("convert");

        let wav = std::fs::read(dir.path().join("sfx/ui/click.wav")).unwrap();
        assert_eq!(&wav[..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        // Payload round-trips bit-exactly
        assert_eq!(&wav[44..], &wem[wem.len() - 8..]);
    }

    #[test]
    fn test_bank_demuxes_embedded_streams() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut names = NameTable::new();
        names.insert("audio/banks/ui");

        let wem = build_pcm_wem(&[1, 2]);
        let id = FileID::of("audio/banks/ui", "wwise_bank");
        let bank = build_bank(id.name, 777, &wem);
        let sibling = |_: FileID, _: Section| None;
        let mut ctx = context_over(
            dir.path(),
            &names,
            id,
            "wwise_bank",
            &bank,
            &sibling,
            &NullTranscoder,
        );

        BankExtractor.convert(&mut ctx).expect("convert");

        let wav = std::fs::read(dir.path().join("audio/banks/ui/777.wav")).unwrap();
        assert_eq!(&wav[..4], b"RIFF");
    }

    #[test]
    fn test_bank_source_extraction_is_byte_exact() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut names = NameTable::new();
        names.insert("audio/banks/ui");

        let bank = build_bank(Hash::of("audio/banks/ui"), 1, &build_pcm_wem(&[0, 0]));
        let id = FileID::of("audio/banks/ui", "wwise_bank");
        let sibling = |_: FileID, _: Section| None;
        let mut ctx = context_over(
            dir.path(),
            &names,
            id,
            "wwise_bank",
            &bank,
            &sibling,
            &NullTranscoder,
        );

        BankExtractor.extract(&mut ctx).expect("extract");
        assert_eq!(
            std::fs::read(dir.path().join("audio/banks/ui.bnk")).unwrap(),
            bank
        );
    }

    #[test]
    fn test_failed_transcode_cleans_up_intermediate_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut names = NameTable::new();
        names.insert("sfx/music/theme");

        // Vorbis-tagged stream forces the transcoder path; `false` fails
        let wem = build_wem(0xffff, &[1, 2, 3, 4]);
        let id = FileID::of("sfx/music/theme", "wwise_stream");
        let sibling = |_: FileID, _: Section| None;
        let transcoder = CommandTranscoder::new("false");
        let mut ctx = context_over(
            dir.path(),
            &names,
            id,
            "wwise_stream",
            &wem,
            &sibling,
            &transcoder,
        );

        let err = StreamExtractor.convert(&mut ctx).unwrap_err();
        assert!(matches!(err, ExtractError::Process { .. }), "{err}");
        assert!(!dir.path().join("sfx/music/theme.wem").exists());
        assert!(!dir.path().join("sfx/music/theme.wav").exists());
    }
}
