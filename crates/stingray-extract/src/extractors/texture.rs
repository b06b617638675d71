//! Texture extraction.

use std::io::Write;

use stingray_formats::texture::Texture;

use crate::dispatch::{ExtractContext, Extractor};
use crate::Result;

/// Extracts `texture` assets: raw bytes, or the embedded DDS container.
///
/// The decoder rejects payloads whose sniffed magic is not DDS, so
/// conversion never writes a silently mislabeled file.
pub struct TextureExtractor;

impl Extractor for TextureExtractor {
    fn extract(&self, ctx: &mut ExtractContext<'_>) -> Result<()> {
        let (_, mut out) = ctx.create_output("texture")?;
        let main = ctx.require_main()?;
        std::io::copy(main, &mut out)?;
        out.flush()?;
        Ok(())
    }

    fn convert(&self, ctx: &mut ExtractContext<'_>) -> Result<()> {
        let main = ctx.require_main()?;
        let texture = Texture::read(main)?;

        let (_, mut out) = ctx.create_output("dds")?;
        let main = ctx.require_main()?;
        texture.copy_payload(main, &mut out)?;
        out.flush()?;
        Ok(())
    }
}
