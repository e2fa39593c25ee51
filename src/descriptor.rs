//! Module descriptors consumed from bootstrap configuration.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

/// How a fetched artifact should be loaded and interpreted.
///
/// Resolved once when the descriptor is built; `esm` and `module` select
/// ES-module loading, everything else falls back to script/global loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadFormat {
    /// Load via dynamic `import()`
    EsModule,
    /// Load via script injection and a global lookup
    #[default]
    Global,
}

impl LoadFormat {
    /// Parse a configured format string (case-insensitive).
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("esm") | Some("module") => LoadFormat::EsModule,
            _ => LoadFormat::Global,
        }
    }

    /// Canonical name of the format.
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadFormat::EsModule => "esm",
            LoadFormat::Global => "global",
        }
    }
}

impl<'de> Deserialize<'de> for LoadFormat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(LoadFormat::parse(value.as_deref()))
    }
}

impl Serialize for LoadFormat {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Logical request for one module.
///
/// Immutable once resolution starts; built from configuration or by a
/// [`DynamicRule`](crate::rules::DynamicRule) match.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleDescriptor {
    /// Registry name for the loaded namespace
    pub name: String,
    /// Package identifier on the provider (defaults to `name`)
    pub package: Option<String>,
    /// Version pinned as an `@version` path segment
    pub version: Option<String>,
    /// Path prefix joined in front of the file
    #[serde(rename = "pathPrefix")]
    pub path_prefix: Option<String>,
    /// File name under the package root
    pub file: Option<String>,
    /// Explicit path overriding the prefix/file combination
    pub path: Option<String>,
    /// Fully resolved URL bypassing provider resolution and probing
    pub url: Option<String>,
    /// Loading strategy
    pub format: LoadFormat,
    /// Global lookup pattern for script loads (`{icon}` is substituted)
    #[serde(rename = "globalPattern", alias = "global")]
    pub global_pattern: Option<String>,
    /// Request-specific suffix extracted by a dynamic rule
    #[serde(skip)]
    pub icon: Option<String>,
    /// Explicitly configured provider
    pub provider: Option<String>,
    /// Provider preferred on CI-like hosts
    pub ci_provider: Option<String>,
    /// Provider preferred in production serving
    pub production_provider: Option<String>,
    /// Whether the global fallback-provider list may be appended
    #[serde(
        rename = "allowFallback",
        alias = "allowJsDelivr",
        deserialize_with = "de_opt_bool_default_true"
    )]
    pub allow_fallback: bool,
}

impl Default for ModuleDescriptor {
    fn default() -> Self {
        Self {
            name: String::new(),
            package: None,
            version: None,
            path_prefix: None,
            file: None,
            path: None,
            url: None,
            format: LoadFormat::Global,
            global_pattern: None,
            icon: None,
            provider: None,
            ci_provider: None,
            production_provider: None,
            allow_fallback: true,
        }
    }
}

fn de_opt_bool_default_true<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<bool, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(true),
        Some(serde_json::Value::Bool(b)) => Ok(b),
        Some(other) => Err(de::Error::custom(format!(
            "expected a boolean for allowFallback, got {}",
            other
        ))),
    }
}

impl ModuleDescriptor {
    /// Create a descriptor with only a name set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Package identifier used in candidate URLs.
    pub fn package_name(&self) -> &str {
        self.package.as_deref().unwrap_or(&self.name)
    }

    /// Version path segment, `@1.2.3` or empty.
    pub fn version_segment(&self) -> String {
        match &self.version {
            Some(version) if !version.is_empty() => format!("@{}", version),
            _ => String::new(),
        }
    }

    /// Render the global lookup pattern for this request.
    ///
    /// Defaults to `{icon}`; the placeholder is substituted with the icon
    /// suffix when a dynamic rule produced this descriptor, otherwise with
    /// the module name.
    pub fn global_name(&self) -> String {
        let pattern = self.global_pattern.as_deref().unwrap_or("{icon}");
        let subject = self.icon.as_deref().unwrap_or(&self.name);
        pattern.replace("{icon}", subject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format() {
        assert_eq!(LoadFormat::parse(Some("esm")), LoadFormat::EsModule);
        assert_eq!(LoadFormat::parse(Some("Module")), LoadFormat::EsModule);
        assert_eq!(LoadFormat::parse(Some("ESM ")), LoadFormat::EsModule);
        assert_eq!(LoadFormat::parse(Some("global")), LoadFormat::Global);
        assert_eq!(LoadFormat::parse(Some("umd")), LoadFormat::Global);
        assert_eq!(LoadFormat::parse(None), LoadFormat::Global);
    }

    #[test]
    fn test_descriptor_defaults() {
        let desc: ModuleDescriptor = serde_json::from_str(r#"{"name": "react"}"#).unwrap();
        assert_eq!(desc.name, "react");
        assert_eq!(desc.package_name(), "react");
        assert_eq!(desc.format, LoadFormat::Global);
        assert!(desc.allow_fallback);
        assert_eq!(desc.version_segment(), "");
    }

    #[test]
    fn test_legacy_fallback_alias() {
        let desc: ModuleDescriptor =
            serde_json::from_str(r#"{"name": "react", "allowJsDelivr": false}"#).unwrap();
        assert!(!desc.allow_fallback);

        let desc: ModuleDescriptor =
            serde_json::from_str(r#"{"name": "react", "allowFallback": false}"#).unwrap();
        assert!(!desc.allow_fallback);
    }

    #[test]
    fn test_global_name_rendering() {
        let mut desc = ModuleDescriptor::new("react-icons/fa/FaBeer");
        desc.icon = Some("FaBeer".to_string());
        desc.global_pattern = Some("ReactIcons.{icon}".to_string());
        assert_eq!(desc.global_name(), "ReactIcons.FaBeer");

        desc.global_pattern = None;
        assert_eq!(desc.global_name(), "FaBeer");

        let plain = ModuleDescriptor::new("Sortable");
        assert_eq!(plain.global_name(), "Sortable");
    }

    #[test]
    fn test_version_segment() {
        let mut desc = ModuleDescriptor::new("foo");
        desc.version = Some("1.2.3".to_string());
        assert_eq!(desc.version_segment(), "@1.2.3");
    }
}
