//! Build-info extraction.

use std::io::Write;

use serde_json::json;
use stingray_formats::build_info::BuildInfo;

use crate::dispatch::{ExtractContext, Extractor};
use crate::Result;

/// Extracts `build_info` assets: raw bytes, or a JSON record of the
/// engine version, platform, revision and build timestamp.
pub struct BuildInfoExtractor;

impl Extractor for BuildInfoExtractor {
    fn extract(&self, ctx: &mut ExtractContext<'_>) -> Result<()> {
        let (_, mut out) = ctx.create_output("build_info")?;
        let main = ctx.require_main()?;
        std::io::copy(main, &mut out)?;
        out.flush()?;
        Ok(())
    }

    fn convert(&self, ctx: &mut ExtractContext<'_>) -> Result<()> {
        let info = BuildInfo::read(ctx.require_main()?)?;
        let doc = json!({
            "version": info.version,
            "platform": info.platform,
            "revision": info.revision,
            "built": info.timestamp(),
            "build_id": info.build_id,
        });

        let (_, mut out) = ctx.create_output("build_info.json")?;
        serde_json::to_writer_pretty(&mut out, &doc)?;
        out.flush()?;
        Ok(())
    }
}
