//! Level container extraction.

use std::io::Write;

use serde_json::json;
use stingray_formats::level::{Level, MetadataValue};

use crate::dispatch::{ExtractContext, Extractor};
use crate::Result;

/// Extracts `level` assets: raw bytes, or a JSON scene listing with
/// units, prefabs and material assignments.
pub struct LevelExtractor;

impl Extractor for LevelExtractor {
    fn extract(&self, ctx: &mut ExtractContext<'_>) -> Result<()> {
        let (_, mut out) = ctx.create_output("level")?;
        let main = ctx.require_main()?;
        std::io::copy(main, &mut out)?;
        out.flush()?;
        Ok(())
    }

    fn convert(&self, ctx: &mut ExtractContext<'_>) -> Result<()> {
        let level = Level::read(ctx.require_main()?)?;

        let units: Vec<_> = level
            .units
            .iter()
            .map(|unit| {
                let metadata: Vec<_> = unit
                    .metadata
                    .iter()
                    .map(|slot| slot.as_ref().map(|v| render_metadata(ctx, v)))
                    .collect();
                json!({
                    "unit": ctx.names.resolve(unit.name),
                    "metadata": metadata,
                })
            })
            .collect();
        let prefabs: Vec<_> = level
            .prefabs
            .iter()
            .map(|h| ctx.names.resolve(*h))
            .collect();
        let materials: Vec<_> = level
            .materials
            .iter()
            .map(|m| {
                json!({
                    "slot": ctx.names.resolve_thin(m.slot),
                    "material": ctx.names.resolve(m.material),
                })
            })
            .collect();
        let doc = json!({
            "name": ctx.name,
            "version": level.version,
            "units": units,
            "prefabs": prefabs,
            "materials": materials,
        });

        let (_, mut out) = ctx.create_output("level.json")?;
        serde_json::to_writer_pretty(&mut out, &doc)?;
        out.flush()?;
        Ok(())
    }
}

fn render_metadata(ctx: &ExtractContext<'_>, value: &MetadataValue) -> serde_json::Value {
    match value {
        MetadataValue::Bytes(bytes) => json!({ "bytes": hex::encode(bytes) }),
        MetadataValue::String(s) => json!({ "string": s }),
        MetadataValue::Floats(f) => json!({ "floats": f }),
        MetadataValue::Hash(h) => json!({ "hash": ctx.names.resolve(*h) }),
    }
}
