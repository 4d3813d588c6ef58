//! # Template Registry
//!
//! Named template strings. Two are compiled in:
//!
//! | Name | Content |
//! |------|---------|
//! | `default` | Image, body, QR codes and a sender/time footer |
//! | `debug` | Every markup tag, then every placeholder |
//!
//! More can be loaded from a directory: each `<name>.tmpl` file becomes the
//! template `<name>`, replacing a built-in of the same name.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::MissiveError;

const DEFAULT_TEMPLATE: &str = "{image}\
<b>{sender}</b>
<code>{received}</code>
{text}
{qr_codes}";

const DEBUG_TEMPLATE: &str = "
<code>Code Snippet</code>
<flip>Flipped Text</flip>
<right><flip>Flipped Text aligned</flip></right>
<invert>Inverted Text</invert>
<u1>Underlined Text</u1>
<u2>Bolder Underlined Text</u2>
<b>Bold Text</b>
<u2><b>Boldest Underlined Text</b></u2>
Normal Text
<h1>Header 1</h1>
<h2>Header 2</h2>
<center>Centered Text</center>
<h2><invert>Inverted Header</invert></h2>

image if any:
{image}
message if any:
{text}
qr_codes if any:
{qr_codes}

From: {sender}
Sent at: {sent}
Received at: {received}
Printed at: {printed}
";

/// File extension of template files.
pub const TEMPLATE_EXTENSION: &str = "tmpl";

/// Templates by name.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    templates: BTreeMap<String, String>,
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TemplateRegistry {
    /// Only the compiled-in templates.
    pub fn builtin() -> Self {
        let mut templates = BTreeMap::new();
        templates.insert("default".to_string(), DEFAULT_TEMPLATE.to_string());
        templates.insert("debug".to_string(), DEBUG_TEMPLATE.to_string());
        Self { templates }
    }

    /// Built-ins plus every `*.tmpl` file in `dir`.
    pub fn with_dir(dir: &Path) -> Result<Self, MissiveError> {
        let mut registry = Self::builtin();
        registry.load_dir(dir)?;
        Ok(registry)
    }

    /// Load every `*.tmpl` file in `dir`. Returns how many were loaded.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, MissiveError> {
        let entries = fs::read_dir(dir).map_err(|e| {
            MissiveError::Template(format!("cannot read {}: {}", dir.display(), e))
        })?;

        let mut loaded = 0;
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(TEMPLATE_EXTENSION) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let content = fs::read_to_string(&path)?;
            debug!(name, path = %path.display(), "template loaded");
            self.templates.insert(name.to_string(), content);
            loaded += 1;
        }
        Ok(loaded)
    }

    /// Add or replace a template.
    pub fn insert(&mut self, name: impl Into<String>, template: impl Into<String>) {
        self.templates.insert(name.into(), template.into());
    }

    /// Look up a template by name.
    pub fn get(&self, name: &str) -> Result<&str, MissiveError> {
        self.templates
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| MissiveError::Template(format!("unknown template '{}'", name)))
    }

    /// Template names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.templates.keys().map(String::as_str).collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builtins_present() {
        let registry = TemplateRegistry::builtin();
        assert_eq!(registry.names(), vec!["debug", "default"]);
        assert!(registry.get("default").unwrap().contains("{text}"));
    }

    #[test]
    fn test_debug_template_uses_every_tag() {
        let debug = TemplateRegistry::builtin().get("debug").unwrap().to_string();
        for tag in crate::markup::tags::list_tags() {
            assert!(debug.contains(&format!("<{}>", tag)), "missing <{}>", tag);
        }
    }

    #[test]
    fn test_unknown_template_is_an_error() {
        let err = TemplateRegistry::builtin().get("nope").unwrap_err();
        assert!(matches!(err, MissiveError::Template(_)));
    }

    #[test]
    fn test_load_dir_reads_tmpl_files_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("short.tmpl"), "{sender}: {text}").unwrap();
        fs::write(dir.path().join("default.tmpl"), "{text}").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let registry = TemplateRegistry::with_dir(dir.path()).unwrap();
        assert_eq!(registry.names(), vec!["debug", "default", "short"]);
        assert_eq!(registry.get("short").unwrap(), "{sender}: {text}");
        assert_eq!(registry.get("default").unwrap(), "{text}");
    }

    #[test]
    fn test_missing_dir_is_a_template_error() {
        let err = TemplateRegistry::with_dir(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, MissiveError::Template(_)));
    }
}
