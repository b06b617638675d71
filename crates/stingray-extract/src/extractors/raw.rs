//! Byte-exact passthrough for unrecognized types.

use std::io::Write;

use crate::dispatch::{ExtractContext, Extractor};
use crate::Result;

/// Fallback extractor: copies the main section unchanged.
///
/// The output extension is the rendered type name, so an unknown type
/// hash yields `<name>.<hex-type>` and a known one `<name>.<type>`.
pub struct RawExtractor;

impl Extractor for RawExtractor {
    fn extract(&self, ctx: &mut ExtractContext<'_>) -> Result<()> {
        let extension = ctx.names.resolve(ctx.id.ty);
        let (_, mut out) = ctx.create_output(&extension)?;
        let main = ctx.require_main()?;
        std::io::copy(main, &mut out)?;
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::collections::BTreeMap;

    use stingray_archive::{Section, SectionReader};
    use stingray_hash::{FileID, NameTable};

    use super::*;
    use crate::dispatch::SectionSet;
    use crate::transcode::NullTranscoder;

    #[test]
    fn test_passthrough_copies_main_section() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backing = dir.path().join("segment");
        std::fs::write(&backing, b"xxRAW PAYLOADxx").unwrap();
        let file = std::fs::File::open(&backing).unwrap();

        let names = NameTable::new();
        let id = FileID::of("content/thing", "mystery");
        let sibling = |_: FileID, _: Section| None;
        let mut ctx = ExtractContext {
            id,
            name: names.resolve(id.name),
            type_name: "raw".to_owned(),
            sections: SectionSet {
                main: Some(SectionReader::new(file, 2, 11)),
                stream: None,
                gpu: None,
            },
            options: BTreeMap::new(),
            names: &names,
            transcoder: &NullTranscoder,
            sibling: &sibling,
            out_root: dir.path(),
        };

        RawExtractor.extract(&mut ctx).expect("extract");

        let expected = dir
            .path()
            .join(format!("{}.{}", id.name.to_hex_le(), id.ty.to_hex_le()));
        assert_eq!(std::fs::read(expected).unwrap(), b"RAW PAYLOAD");
    }
}
