//! End-to-end pipeline tests over a synthetic installation on disk.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashSet;
use std::path::Path;

use stingray_archive::segment::{SEGMENT_HEADER_SIZE, SEGMENT_MAGIC, SEGMENT_RECORD_SIZE};
use stingray_archive::{ArchiveDirectory, MARKER_FILE, Section, SectionReader};
use stingray_extract::template::{ExtractorConfigTemplate, TypeDecl, default_template};
use stingray_extract::{
    ExtractContext, Extractor, ResolvedConfig, default_registry, dispatch, run_extraction,
    select, NullTranscoder,
};
use stingray_hash::{FileID, NameTable};

/// Write one segment triad under `data/`, mirroring the packager layout:
/// the index at the head of the main file, main payloads after it,
/// stream/gpu payloads in the companion files.
fn write_segment(
    data_dir: &Path,
    name: &str,
    files: &[(FileID, Option<&[u8]>, Option<&[u8]>, Option<&[u8]>)],
) {
    let index_end = SEGMENT_HEADER_SIZE + files.len() as u64 * SEGMENT_RECORD_SIZE;

    let mut index = Vec::new();
    index.extend_from_slice(&SEGMENT_MAGIC.to_le_bytes());
    index.extend_from_slice(&1u32.to_le_bytes());
    index.extend_from_slice(&(files.len() as u32).to_le_bytes());
    index.extend_from_slice(&0u32.to_le_bytes());

    let mut main = Vec::new();
    let mut stream = Vec::new();
    let mut gpu = Vec::new();
    for (id, main_payload, stream_payload, gpu_payload) in files {
        index.extend_from_slice(&id.name.raw().to_le_bytes());
        index.extend_from_slice(&id.ty.raw().to_le_bytes());
        let sections = [
            (&mut main, main_payload, index_end),
            (&mut stream, stream_payload, 0),
            (&mut gpu, gpu_payload, 0),
        ];
        let mut offsets = [0u64; 3];
        let mut sizes = [0u32; 3];
        for (i, (sink, payload, base)) in sections.into_iter().enumerate() {
            if let Some(payload) = payload {
                offsets[i] = base + sink.len() as u64;
                sizes[i] = payload.len() as u32;
                sink.extend_from_slice(payload);
            }
        }
        for offset in offsets {
            index.extend_from_slice(&offset.to_le_bytes());
        }
        for size in sizes {
            index.extend_from_slice(&size.to_le_bytes());
        }
    }

    index.extend_from_slice(&main);
    std::fs::write(data_dir.join(name), index).expect("write main");
    if !stream.is_empty() {
        std::fs::write(data_dir.join(format!("{name}.stream")), stream).expect("write stream");
    }
    if !gpu.is_empty() {
        std::fs::write(data_dir.join(format!("{name}.gpu_resources")), gpu).expect("write gpu");
    }
}

fn make_install(
    root: &Path,
    files: &[(FileID, Option<&[u8]>, Option<&[u8]>, Option<&[u8]>)],
) -> ArchiveDirectory {
    std::fs::write(root.join(MARKER_FILE), "[engine]\n").expect("marker");
    let data_dir = root.join("data");
    std::fs::create_dir_all(&data_dir).expect("data dir");
    write_segment(&data_dir, "9ba626afa44a3aa3", files);
    ArchiveDirectory::load(root, &mut |_, _| {}).expect("load")
}

fn dds_texture(payload: &[u8]) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&1u32.to_le_bytes());
    data.extend_from_slice(&188u32.to_le_bytes()); // payload right after header
    data.extend_from_slice(&[0u8; 15 * 12]);
    data.extend_from_slice(b"DDS ");
    data.extend_from_slice(payload);
    data
}

#[test]
fn test_include_glob_selects_by_type() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let tex = FileID::of("gui/logo", "texture");
    let vid = FileID::of("cutscenes/intro", "bik");
    let dir = make_install(
        tmp.path(),
        &[(tex, Some(b"t"), None, None), (vid, Some(b"v"), None, None)],
    );

    let mut names = NameTable::new();
    names.insert("texture");
    let template = default_template();
    // The fallback type starts disabled, so the unknown "bik" needs it on
    let config = ResolvedConfig::parse("enable:raw", &template).expect("config");

    let selected = select(
        &["*.texture".to_owned()],
        &[],
        &template,
        &config,
        &names,
        &dir,
    )
    .expect("select");
    assert_eq!(selected, HashSet::from([tex]));
}

#[test]
fn test_disable_by_category_overrides_enable_all() {
    let template = ExtractorConfigTemplate::new(
        vec![
            TypeDecl::new("a").category("x"),
            TypeDecl::new("b").category("x"),
            TypeDecl::new("c"),
        ],
        "c",
    )
    .expect("template");
    let config = ResolvedConfig::parse("enable:all disable:x", &template).expect("config");

    let tmp = tempfile::tempdir().expect("tempdir");
    let ids = [
        FileID::of("one", "a"),
        FileID::of("two", "b"),
        FileID::of("three", "c"),
    ];
    let files: Vec<_> = ids
        .iter()
        .map(|id| (*id, Some(b"p".as_slice()), None, None))
        .collect();
    let dir = make_install(tmp.path(), &files);

    let mut names = NameTable::new();
    for ty in ["a", "b", "c"] {
        names.insert(ty);
    }

    let selected = select(&[], &[], &template, &config, &names, &dir).expect("select");
    assert_eq!(selected, HashSet::from([ids[2]]));
}

#[test]
fn test_run_extracts_selection_and_reports_count() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let tex = FileID::of("gui/logo", "texture");
    let broken = FileID::of("gui/broken", "texture");
    let texture = dds_texture(b"pixels");
    let dir = make_install(
        tmp.path(),
        &[
            (tex, Some(&texture), None, None),
            // Main section too short for a texture header
            (broken, Some(b"junk"), None, None),
        ],
    );

    let mut names = NameTable::new();
    names.load_wordlist("gui/logo\ngui/broken\ntexture\n");
    let template = default_template();
    let config = ResolvedConfig::parse("", &template).expect("config");
    let selected = select(&[], &[], &template, &config, &names, &dir).expect("select");
    assert_eq!(selected.len(), 2);

    let out_root = tmp.path().join("out");
    let report = run_extraction(
        &selected,
        &dir,
        &names,
        &default_registry(),
        &template,
        &config,
        &NullTranscoder,
        &out_root,
    )
    .expect("run");

    // The broken file fails at decode, the run still finishes
    assert_eq!(report.selected, 2);
    assert_eq!(report.succeeded, 1);
    assert!(!report.is_complete());
    assert_eq!(
        std::fs::read(out_root.join("gui/logo.dds")).unwrap(),
        b"DDS pixels"
    );
}

#[test]
fn test_source_format_bypasses_conversion() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let tex = FileID::of("gui/logo", "texture");
    let texture = dds_texture(b"pixels");
    let dir = make_install(tmp.path(), &[(tex, Some(&texture), None, None)]);

    let mut names = NameTable::new();
    names.load_wordlist("gui/logo\ntexture\n");
    let template = default_template();
    let config = ResolvedConfig::parse("texture:format=source", &template).expect("config");

    let out_root = tmp.path().join("out");
    std::fs::create_dir_all(&out_root).unwrap();
    dispatch(
        tex,
        &dir,
        &names,
        &default_registry(),
        &template,
        &config,
        &NullTranscoder,
        &out_root,
    )
    .expect("dispatch");

    assert_eq!(
        std::fs::read(out_root.join("gui/logo.texture")).unwrap(),
        texture
    );
}

#[test]
fn test_unknown_type_falls_back_to_raw_passthrough() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let vid = FileID::of("cutscenes/intro", "bik");
    let dir = make_install(tmp.path(), &[(vid, Some(b"BIKi frames"), None, None)]);

    let names = NameTable::new();
    let template = default_template();
    let config = ResolvedConfig::parse("enable:raw", &template).expect("config");

    let out_root = tmp.path().join("out");
    std::fs::create_dir_all(&out_root).unwrap();
    dispatch(
        vid,
        &dir,
        &names,
        &default_registry(),
        &template,
        &config,
        &NullTranscoder,
        &out_root,
    )
    .expect("dispatch");

    // Both hashes render as little-endian hex when unknown
    let expected = out_root.join(format!(
        "{}.{}",
        vid.name.to_hex_le(),
        vid.ty.to_hex_le()
    ));
    assert_eq!(std::fs::read(expected).unwrap(), b"BIKi frames");
}

/// Extractor that follows a cross-reference to another file's main
/// section through the sibling callback.
struct CompanionProbe;

impl Extractor for CompanionProbe {
    fn extract(&self, ctx: &mut ExtractContext<'_>) -> stingray_extract::Result<()> {
        let companion = FileID::of("gui/logo", "texture");
        let mut reader: SectionReader<std::fs::File> = (ctx.sibling)(companion, Section::Main)
            .ok_or_else(|| stingray_extract::ExtractError::Validation("no sibling".into()))?;
        let mut bytes = Vec::new();
        std::io::Read::read_to_end(&mut reader, &mut bytes).unwrap();
        let (_, mut out) = ctx.create_output("probe")?;
        std::io::Write::write_all(&mut out, &bytes)?;
        Ok(())
    }
}

#[test]
fn test_sibling_callback_reaches_other_files() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let tex = FileID::of("gui/logo", "texture");
    let probe = FileID::of("gui/probe", "probe");
    let dir = make_install(
        tmp.path(),
        &[
            (tex, Some(b"texture bytes"), None, None),
            (probe, Some(b"ignored"), None, None),
        ],
    );

    let mut names = NameTable::new();
    names.load_wordlist("gui/logo\ngui/probe\ntexture\nprobe\n");
    let template = ExtractorConfigTemplate::new(
        vec![TypeDecl::new("probe"), TypeDecl::new("texture")],
        "probe",
    )
    .expect("template");
    let config = ResolvedConfig::parse("", &template).expect("config");
    let mut registry = stingray_extract::ExtractorRegistry::new();
    registry.register("probe", Box::new(CompanionProbe));
    registry.register("texture", Box::new(stingray_extract::extractors::RawExtractor));

    let out_root = tmp.path().join("out");
    std::fs::create_dir_all(&out_root).unwrap();
    dispatch(
        probe,
        &dir,
        &names,
        &registry,
        &template,
        &config,
        &NullTranscoder,
        &out_root,
    )
    .expect("dispatch");

    assert_eq!(
        std::fs::read(out_root.join("gui/probe.probe")).unwrap(),
        b"texture bytes"
    );
}
