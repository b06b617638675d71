//! Configuration string parsing and validation.
//!
//! A configuration is a single space-separated string of
//! `key:opt=val,opt2=val2` tokens. `key` is a declared type name, a
//! shorthand category (including the reserved `all`), or one of the
//! reserved pseudo-types `enable`/`disable` whose "options" are themselves
//! type-or-shorthand names with boolean string values. A bare option
//! without `=` defaults to the value `"true"`.
//!
//! Validation is all-or-nothing: any failure aborts the parse with a
//! single descriptive error naming the offending token, and no partial
//! configuration is produced. After validation, shorthand keys are
//! substituted by an explicit expansion pass producing a flat per-type
//! map; expansion only fills in keys that are not already a literal type
//! name, so an explicit per-type entry always wins over its category.

use std::collections::BTreeMap;

use crate::template::{DISABLE_KEY, ENABLE_KEY, ExtractorConfigTemplate};
use crate::{ExtractError, Result};

type OptionMap = BTreeMap<String, String>;

/// Validated, shorthand-expanded configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedConfig {
    options: BTreeMap<String, OptionMap>,
    enable: BTreeMap<String, bool>,
    disable: BTreeMap<String, bool>,
}

impl ResolvedConfig {
    /// Parse and validate a configuration string against a template.
    pub fn parse(input: &str, template: &ExtractorConfigTemplate) -> Result<Self> {
        let mut raw_options: BTreeMap<String, OptionMap> = BTreeMap::new();
        let mut raw_enable: BTreeMap<String, String> = BTreeMap::new();
        let mut raw_disable: BTreeMap<String, String> = BTreeMap::new();

        for token in input.split_whitespace() {
            let (key, opts) = match token.split_once(':') {
                Some((key, opts)) => (key, opts),
                None => (token, ""),
            };
            if key.is_empty() {
                return Err(ExtractError::Validation(format!(
                    "configuration token '{token}' has an empty key"
                )));
            }

            let pairs = parse_option_list(token, opts)?;
            match key {
                ENABLE_KEY | DISABLE_KEY => {
                    let target = if key == ENABLE_KEY {
                        &mut raw_enable
                    } else {
                        &mut raw_disable
                    };
                    for (inner, value) in pairs {
                        if !template.is_type(&inner) && !template.is_shorthand(&inner) {
                            return Err(ExtractError::Validation(format!(
                                "'{key}:{inner}' does not name a declared type or shorthand"
                            )));
                        }
                        if value != "true" && value != "false" {
                            return Err(ExtractError::Validation(format!(
                                "'{key}:{inner}={value}' must be \"true\" or \"false\""
                            )));
                        }
                        target.insert(inner, value);
                    }
                }
                _ => {
                    if !template.is_type(key) && !template.is_shorthand(key) {
                        return Err(ExtractError::Validation(format!(
                            "'{key}' is not a declared type, shorthand, enable or disable"
                        )));
                    }
                    validate_options(key, &pairs, template)?;
                    let entry = raw_options.entry(key.to_owned()).or_default();
                    for (opt, value) in pairs {
                        entry.insert(opt, value);
                    }
                }
            }
        }

        Ok(Self {
            options: expand_options(raw_options, template),
            enable: expand_flags(raw_enable, template),
            disable: expand_flags(raw_disable, template),
        })
    }

    /// Effective option map for a type; empty when the type has no entry.
    pub fn options_for(&self, ty: &str) -> OptionMap {
        self.options.get(ty).cloned().unwrap_or_default()
    }

    /// Resolve the enabled state of a type.
    ///
    /// Precedence, highest first: explicit `disable:<type>=true`, explicit
    /// `enable:<type>=true`, the template's per-type default, enabled.
    pub fn enabled(&self, ty: &str, template: &ExtractorConfigTemplate) -> bool {
        if self.disable.get(ty) == Some(&true) {
            return false;
        }
        if self.enable.get(ty) == Some(&true) {
            return true;
        }
        !template.default_disabled(ty)
    }

    /// Serialize back to configuration-string form.
    ///
    /// The output is already shorthand-free, so re-parsing it yields an
    /// equal configuration.
    pub fn to_config_string(&self) -> String {
        let mut tokens = Vec::new();
        for (ty, opts) in &self.options {
            if opts.is_empty() {
                continue;
            }
            let rendered: Vec<String> =
                opts.iter().map(|(k, v)| format!("{k}={v}")).collect();
            tokens.push(format!("{ty}:{}", rendered.join(",")));
        }
        for (key, flags) in [(ENABLE_KEY, &self.enable), (DISABLE_KEY, &self.disable)] {
            if flags.is_empty() {
                continue;
            }
            let rendered: Vec<String> =
                flags.iter().map(|(k, v)| format!("{k}={v}")).collect();
            tokens.push(format!("{key}:{}", rendered.join(",")));
        }
        tokens.join(" ")
    }
}

/// Split an option list, applying the bare-option-means-true rule.
fn parse_option_list(token: &str, opts: &str) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::new();
    if opts.is_empty() {
        return Ok(pairs);
    }
    for part in opts.split(',') {
        let (key, value) = match part.split_once('=') {
            Some((key, value)) => (key, value),
            None => (part, "true"),
        };
        if key.is_empty() {
            return Err(ExtractError::Validation(format!(
                "configuration token '{token}' has an empty option key"
            )));
        }
        pairs.push((key.to_owned(), value.to_owned()));
    }
    Ok(pairs)
}

/// Validate option keys and values for a type or shorthand entry.
///
/// For a declared type every key must be declared and every value legal.
/// For a shorthand a key must be declared by at least one member type, and
/// wherever it is declared the value must be legal; members that do not
/// declare the key simply never receive it during expansion.
fn validate_options(
    key: &str,
    pairs: &[(String, String)],
    template: &ExtractorConfigTemplate,
) -> Result<()> {
    let members: Vec<&str> = if template.is_type(key) {
        vec![key]
    } else {
        template.shorthand_members(key)
    };

    for (opt, value) in pairs {
        let mut declared_anywhere = false;
        for member in &members {
            let Some(decl) = template.get(member) else {
                continue;
            };
            if let Some(legal) = decl.options.get(opt) {
                declared_anywhere = true;
                if !legal.contains(value) {
                    return Err(ExtractError::Validation(format!(
                        "'{member}:{opt}={value}' is not one of {legal:?}"
                    )));
                }
            }
        }
        if !declared_anywhere {
            return Err(ExtractError::Validation(format!(
                "'{key}:{opt}' is not a declared option"
            )));
        }
    }
    Ok(())
}

/// Fan shorthand-keyed option entries out to their member types.
///
/// A member receives only the option keys it declares, and an existing
/// literal type entry is never overridden. Entries that end up with no
/// options are dropped: `to_config_string` cannot render them, so
/// keeping them would break the parse/serialize round trip.
fn expand_options(
    raw: BTreeMap<String, OptionMap>,
    template: &ExtractorConfigTemplate,
) -> BTreeMap<String, OptionMap> {
    let mut out: BTreeMap<String, OptionMap> = BTreeMap::new();

    // Literal type entries first: they must win over any expansion.
    for (key, opts) in &raw {
        if template.is_type(key) {
            out.insert(key.clone(), opts.clone());
        }
    }
    for (key, opts) in &raw {
        if template.is_type(key) {
            continue;
        }
        for member in template.shorthand_members(key) {
            let Some(decl) = template.get(member) else {
                continue;
            };
            let declared: Vec<_> = opts
                .iter()
                .filter(|(opt, _)| decl.options.contains_key(opt.as_str()))
                .collect();
            if declared.is_empty() {
                continue;
            }
            let entry = out.entry(member.to_owned()).or_default();
            for (opt, value) in declared {
                if !entry.contains_key(opt) {
                    entry.insert(opt.clone(), value.clone());
                }
            }
        }
    }
    out.retain(|_, opts| !opts.is_empty());
    out
}

/// Fan shorthand keys in an enable/disable map out to member types.
fn expand_flags(
    raw: BTreeMap<String, String>,
    template: &ExtractorConfigTemplate,
) -> BTreeMap<String, bool> {
    let mut out: BTreeMap<String, bool> = BTreeMap::new();
    for (key, value) in &raw {
        if template.is_type(key) {
            out.insert(key.clone(), value == "true");
        }
    }
    for (key, value) in &raw {
        if template.is_type(key) {
            continue;
        }
        for member in template.shorthand_members(key) {
            out.entry(member.to_owned()).or_insert(value == "true");
        }
    }
    out
}
