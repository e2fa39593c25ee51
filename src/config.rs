//! Bootstrap configuration surface consumed by the resolver.
//!
//! Fetching the configuration document is the surrounding bootstrap
//! layer's job; this module only defines the shapes and turns the provider
//! section into live [`ProviderSettings`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::descriptor::ModuleDescriptor;
use crate::error::Result;
use crate::provider::ProviderSettings;
use crate::rules::DynamicRule;

/// Provider section of the bootstrap configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// System default provider base
    pub default: Option<String>,
    /// Global fallback-provider list, appended as a final safety net
    #[serde(alias = "fallbackProviders")]
    pub fallbacks: Vec<String>,
    /// Alias name to raw provider string
    pub aliases: BTreeMap<String, String>,
}

/// Top-level loader configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Provider defaults, fallbacks, and aliases
    pub providers: ProvidersConfig,
    /// Prefix rules for dynamically requested modules
    #[serde(rename = "dynamicModules")]
    pub dynamic_modules: Vec<DynamicRule>,
    /// Statically declared modules
    pub modules: Vec<ModuleDescriptor>,
}

impl LoaderConfig {
    /// Parse a configuration document from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Build provider settings from the provider section.
    pub fn provider_settings(&self) -> ProviderSettings {
        let settings = ProviderSettings::new();
        if let Some(default) = &self.providers.default {
            settings.set_default_base(default);
        }
        settings.set_fallback_providers(&self.providers.fallbacks);
        settings.set_aliases(
            self.providers
                .aliases
                .iter()
                .map(|(alias, value)| (alias.clone(), value)),
        );
        settings
    }
}
