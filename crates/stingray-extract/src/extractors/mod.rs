//! Built-in extractors, one per declared type of the default template.

mod audio;
mod build_info;
mod level;
mod package;
mod raw;
mod texture;

pub use audio::{BankExtractor, StreamExtractor};
pub use build_info::BuildInfoExtractor;
pub use level::LevelExtractor;
pub use package::PackageExtractor;
pub use raw::RawExtractor;
pub use texture::TextureExtractor;

use crate::dispatch::ExtractorRegistry;

/// Registry wiring every built-in extractor to its template type.
pub fn default_registry() -> ExtractorRegistry {
    let mut registry = ExtractorRegistry::new();
    registry.register("package", Box::new(PackageExtractor));
    registry.register("level", Box::new(LevelExtractor));
    registry.register("wwise_bank", Box::new(BankExtractor));
    registry.register("wwise_stream", Box::new(StreamExtractor));
    registry.register("texture", Box::new(TextureExtractor));
    registry.register("build_info", Box::new(BuildInfoExtractor));
    registry.register("raw", Box::new(RawExtractor));
    registry
}
