//! Prefix-based rules that mint descriptors for dynamic modules.

use serde::{Deserialize, Serialize};

use crate::descriptor::{LoadFormat, ModuleDescriptor};

/// Default file pattern when a rule does not configure one.
pub const DEFAULT_FILE_PATTERN: &str = "{icon}.js";

/// A configured rule matching a family of module names by prefix.
///
/// A request like `react-icons/fa/FaBeer` matches a rule with prefix
/// `react-icons/fa/`; the remainder (`FaBeer`, the "icon") is substituted
/// into the file and global patterns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicRule {
    /// Name prefix this rule matches
    pub prefix: String,
    /// Package identifier; derived from the prefix when absent
    pub package: Option<String>,
    /// Version pinned as an `@version` path segment
    pub version: Option<String>,
    /// Path prefix joined in front of the rendered file
    #[serde(rename = "pathPrefix")]
    pub path_prefix: Option<String>,
    /// File pattern with an `{icon}` placeholder
    #[serde(rename = "filePattern")]
    pub file_pattern: Option<String>,
    /// Loading strategy for matched modules
    pub format: LoadFormat,
    /// Global lookup pattern with an `{icon}` placeholder
    #[serde(rename = "globalPattern")]
    pub global_pattern: Option<String>,
    /// Explicitly configured provider
    pub provider: Option<String>,
    /// Provider preferred on CI-like hosts
    pub ci_provider: Option<String>,
    /// Provider preferred in production serving
    pub production_provider: Option<String>,
    /// Whether the global fallback-provider list may be appended
    #[serde(rename = "allowFallback", alias = "allowJsDelivr")]
    pub allow_fallback: Option<bool>,
}

impl Default for DynamicRule {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            package: None,
            version: None,
            path_prefix: None,
            file_pattern: None,
            format: LoadFormat::Global,
            global_pattern: None,
            provider: None,
            ci_provider: None,
            production_provider: None,
            allow_fallback: None,
        }
    }
}

impl DynamicRule {
    /// Icon suffix for a matching name, `None` when the prefix differs.
    pub fn matches<'a>(&self, name: &'a str) -> Option<&'a str> {
        if self.prefix.is_empty() {
            return None;
        }
        name.strip_prefix(&self.prefix)
    }

    /// Package identifier: the configured one, or the prefix with a
    /// trailing `/*` or `/` stripped.
    pub fn package_name(&self) -> String {
        if let Some(package) = &self.package {
            return package.clone();
        }
        self.prefix
            .strip_suffix("/*")
            .or_else(|| self.prefix.strip_suffix('/'))
            .unwrap_or(&self.prefix)
            .to_string()
    }

    /// Mint a descriptor for a matching module name.
    pub fn descriptor_for(&self, name: &str) -> Option<ModuleDescriptor> {
        let icon = self.matches(name)?;
        let file = self
            .file_pattern
            .as_deref()
            .unwrap_or(DEFAULT_FILE_PATTERN)
            .replace("{icon}", icon);
        Some(ModuleDescriptor {
            name: name.to_string(),
            package: Some(self.package_name()),
            version: self.version.clone(),
            path_prefix: self.path_prefix.clone(),
            file: Some(file),
            format: self.format,
            global_pattern: self.global_pattern.clone(),
            icon: Some(icon.to_string()),
            provider: self.provider.clone(),
            ci_provider: self.ci_provider.clone(),
            production_provider: self.production_provider.clone(),
            allow_fallback: self.allow_fallback.unwrap_or(true),
            ..Default::default()
        })
    }
}

/// Find the descriptor minted by the first matching rule.
pub fn descriptor_for_name(rules: &[DynamicRule], name: &str) -> Option<ModuleDescriptor> {
    rules.iter().find_map(|rule| rule.descriptor_for(name))
}
