//! Package index extraction.

use std::io::Write;

use serde_json::json;
use stingray_formats::package::PackageIndex;

use crate::dispatch::{ExtractContext, Extractor};
use crate::Result;

/// Extracts `package` assets: raw bytes, or a JSON listing of the files
/// the package references, with hashes resolved through the name table.
pub struct PackageExtractor;

impl Extractor for PackageExtractor {
    fn extract(&self, ctx: &mut ExtractContext<'_>) -> Result<()> {
        let (_, mut out) = ctx.create_output("package")?;
        let main = ctx.require_main()?;
        std::io::copy(main, &mut out)?;
        out.flush()?;
        Ok(())
    }

    fn convert(&self, ctx: &mut ExtractContext<'_>) -> Result<()> {
        let index = PackageIndex::read(ctx.require_main()?)?;
        let files: Vec<_> = index
            .entries
            .iter()
            .map(|id| {
                json!({
                    "name": ctx.names.resolve(id.name),
                    "type": ctx.names.resolve(id.ty),
                })
            })
            .collect();
        let doc = json!({
            "name": ctx.name,
            "file_count": index.len(),
            "files": files,
        });

        let (_, mut out) = ctx.create_output("package.json")?;
        serde_json::to_writer_pretty(&mut out, &doc)?;
        out.flush()?;
        Ok(())
    }
}
