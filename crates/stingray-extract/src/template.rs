//! Extractor configuration template.
//!
//! The template declares, per logical file type, its shorthand category,
//! the option keys it accepts with their enumerated legal values, and
//! whether the type is enabled by default. One declared type is the
//! fallback used for otherwise-unrecognized types.
//!
//! The reserved shorthand `all` spans every declared type. Category names
//! never collide with declared type names.

use std::collections::BTreeMap;

use crate::{ExtractError, Result};

/// Reserved shorthand spanning every declared type.
pub const ALL_SHORTHAND: &str = "all";

/// Reserved pseudo-type enabling types or shorthands.
pub const ENABLE_KEY: &str = "enable";

/// Reserved pseudo-type disabling types or shorthands.
pub const DISABLE_KEY: &str = "disable";

/// Option key selecting the output format of an extractor.
pub const FORMAT_OPTION: &str = "format";

/// Sentinel format value selecting raw extraction instead of conversion.
pub const SOURCE_FORMAT: &str = "source";

/// Declaration of one logical file type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    /// Type name as it appears in configuration and selection.
    pub name: String,
    /// Shorthand category this type belongs to, if any.
    pub category: Option<String>,
    /// Allowed option keys, each with its enumerated legal values.
    pub options: BTreeMap<String, Vec<String>>,
    /// Whether the type starts disabled unless explicitly enabled.
    pub default_disabled: bool,
}

impl TypeDecl {
    /// Declare a type with no options, enabled by default.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            category: None,
            options: BTreeMap::new(),
            default_disabled: false,
        }
    }

    /// Assign a shorthand category.
    pub fn category(mut self, category: &str) -> Self {
        self.category = Some(category.to_owned());
        self
    }

    /// Declare an option key with its legal values.
    pub fn option(mut self, key: &str, values: &[&str]) -> Self {
        self.options
            .insert(key.to_owned(), values.iter().map(|v| (*v).to_owned()).collect());
        self
    }

    /// Mark the type as disabled unless explicitly enabled.
    pub fn disabled_by_default(mut self) -> Self {
        self.default_disabled = true;
        self
    }
}

/// Declarative description of every extractable type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorConfigTemplate {
    types: BTreeMap<String, TypeDecl>,
    fallback: String,
}

impl ExtractorConfigTemplate {
    /// Build a template from declarations plus the fallback type name.
    ///
    /// Fails when the fallback is not declared or a category name collides
    /// with a declared type name (including the reserved names).
    pub fn new(decls: Vec<TypeDecl>, fallback: &str) -> Result<Self> {
        let mut types = BTreeMap::new();
        for decl in decls {
            if [ALL_SHORTHAND, ENABLE_KEY, DISABLE_KEY].contains(&decl.name.as_str()) {
                return Err(ExtractError::Validation(format!(
                    "type name '{}' is reserved",
                    decl.name
                )));
            }
            types.insert(decl.name.clone(), decl);
        }
        for decl in types.values() {
            if let Some(category) = &decl.category {
                if types.contains_key(category) {
                    return Err(ExtractError::Validation(format!(
                        "category '{category}' collides with a declared type name"
                    )));
                }
                if category == ALL_SHORTHAND || category == ENABLE_KEY || category == DISABLE_KEY
                {
                    return Err(ExtractError::Validation(format!(
                        "category name '{category}' is reserved"
                    )));
                }
            }
        }
        if !types.contains_key(fallback) {
            return Err(ExtractError::Validation(format!(
                "fallback type '{fallback}' is not declared"
            )));
        }
        Ok(Self {
            types,
            fallback: fallback.to_owned(),
        })
    }

    /// Declaration of a type, if declared.
    pub fn get(&self, name: &str) -> Option<&TypeDecl> {
        self.types.get(name)
    }

    /// Whether `name` is a declared type.
    pub fn is_type(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Whether `name` is a usable shorthand (`all` or a declared category).
    pub fn is_shorthand(&self, name: &str) -> bool {
        name == ALL_SHORTHAND
            || self
                .types
                .values()
                .any(|t| t.category.as_deref() == Some(name))
    }

    /// Declared types belonging to a shorthand, in declaration-name order.
    pub fn shorthand_members(&self, shorthand: &str) -> Vec<&str> {
        self.types
            .values()
            .filter(|t| {
                shorthand == ALL_SHORTHAND || t.category.as_deref() == Some(shorthand)
            })
            .map(|t| t.name.as_str())
            .collect()
    }

    /// All declared type names.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// The fallback type for unrecognized types.
    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Whether a type starts disabled; unknown names use the fallback's
    /// declaration.
    pub fn default_disabled(&self, name: &str) -> bool {
        self.types
            .get(name)
            .or_else(|| self.types.get(&self.fallback))
            .is_some_and(|t| t.default_disabled)
    }
}

/// The template shipped with the toolkit's built-in extractors.
pub fn default_template() -> ExtractorConfigTemplate {
    #[allow(clippy::expect_used)] // static declarations, verified by tests
    ExtractorConfigTemplate::new(
        vec![
            TypeDecl::new("package")
                .category("index")
                .option(FORMAT_OPTION, &["json", SOURCE_FORMAT]),
            TypeDecl::new("level")
                .category("scene")
                .option(FORMAT_OPTION, &["json", SOURCE_FORMAT]),
            TypeDecl::new("wwise_bank")
                .category("audio")
                .option(FORMAT_OPTION, &["wav", SOURCE_FORMAT]),
            TypeDecl::new("wwise_stream")
                .category("audio")
                .option(FORMAT_OPTION, &["wav", SOURCE_FORMAT]),
            TypeDecl::new("texture")
                .category("image")
                .option(FORMAT_OPTION, &["dds", SOURCE_FORMAT]),
            TypeDecl::new("build_info")
                .category("meta")
                .option(FORMAT_OPTION, &["json", SOURCE_FORMAT]),
            TypeDecl::new("raw").disabled_by_default(),
        ],
        "raw",
    )
    .expect("built-in template is valid")
}
