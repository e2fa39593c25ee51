//! Provider base normalization and environment-aware ordering.

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;
use tracing::debug;
use url::Url;

use crate::descriptor::ModuleDescriptor;

/// Environment variable controlling provider ordering.
pub const PROXY_MODE_ENV: &str = "DYNLOAD_PROXY_MODE";

/// How the resolver should weigh CI/proxy providers against production ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProxyMode {
    /// Decide from the page hostname
    #[default]
    Auto,
    /// Always prefer the CI/proxy provider
    Proxy,
    /// Always prefer the production provider
    Direct,
}

impl ProxyMode {
    /// Parse a mode string; anything unrecognized maps to `Auto`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "proxy" => ProxyMode::Proxy,
            "direct" => ProxyMode::Direct,
            _ => ProxyMode::Auto,
        }
    }
}

/// Environment signal consumed by the provider resolver.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    /// Hostname of the current page, when known
    pub hostname: Option<String>,
    /// Proxy-mode override
    pub proxy_mode: ProxyMode,
}

impl Environment {
    /// Build an environment from an explicit hostname and mode.
    pub fn new(hostname: Option<String>, proxy_mode: ProxyMode) -> Self {
        Self {
            hostname,
            proxy_mode,
        }
    }

    /// Build an environment from a hostname, reading the proxy mode from
    /// the `DYNLOAD_PROXY_MODE` environment variable.
    pub fn detect(hostname: Option<String>) -> Self {
        let proxy_mode = std::env::var(PROXY_MODE_ENV)
            .map(|v| ProxyMode::parse(&v))
            .unwrap_or_default();
        Self {
            hostname,
            proxy_mode,
        }
    }

    /// Build an environment from the current page URL.
    pub fn from_page_url(page_url: &str) -> Self {
        let hostname = Url::parse(page_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string));
        Self::detect(hostname)
    }

    fn is_ci_like_host(&self) -> bool {
        matches!(self.hostname.as_deref(), Some("127.0.0.1") | Some("localhost"))
    }

    /// Whether CI providers should be tried before production providers.
    pub fn prefers_ci(&self) -> bool {
        match self.proxy_mode {
            ProxyMode::Proxy => true,
            ProxyMode::Direct => false,
            ProxyMode::Auto => self.is_ci_like_host(),
        }
    }
}

/// Canonicalize a provider reference without alias resolution.
///
/// Empty input stays empty; absolute paths and full URLs get a trailing
/// slash enforced; anything else is treated as a bare host and wrapped in
/// `https://.../`. Never fails; callers must skip empty results.
pub fn normalize_raw(provider: &str) -> String {
    if provider.is_empty() {
        return String::new();
    }
    if provider.starts_with('/')
        || provider.starts_with("http://")
        || provider.starts_with("https://")
    {
        if provider.ends_with('/') {
            provider.to_string()
        } else {
            format!("{}/", provider)
        }
    } else {
        format!("https://{}/", provider.trim_end_matches('/'))
    }
}

/// Mutable provider configuration shared by resolution calls.
#[derive(Debug, Default)]
pub struct ProviderSettings {
    default_base: RwLock<String>,
    fallbacks: RwLock<Vec<String>>,
    aliases: RwLock<HashMap<String, String>>,
}

impl ProviderSettings {
    /// Create empty settings: no default base, no fallbacks, no aliases.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the system default provider base.
    pub fn set_default_base(&self, provider: &str) {
        *self.default_base.write() = normalize_raw(provider);
    }

    /// The system default provider base (normalized, possibly empty).
    pub fn default_base(&self) -> String {
        self.default_base.read().clone()
    }

    /// Replace the global fallback-provider list.
    ///
    /// Entries are normalized; empty results are dropped.
    pub fn set_fallback_providers<I, S>(&self, providers: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let normalized: Vec<String> = providers
            .into_iter()
            .map(|p| self.normalize(p.as_ref()))
            .filter(|p| !p.is_empty())
            .collect();
        *self.fallbacks.write() = normalized;
    }

    /// The current fallback-provider list (normalized).
    pub fn fallback_providers(&self) -> Vec<String> {
        self.fallbacks.read().clone()
    }

    /// Replace the alias table; alias values are normalized, empties dropped.
    pub fn set_aliases<I, K, V>(&self, aliases: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let mut table = HashMap::new();
        for (alias, value) in aliases {
            let alias = alias.into();
            let normalized = normalize_raw(value.as_ref());
            if !alias.is_empty() && !normalized.is_empty() {
                table.insert(alias, normalized);
            }
        }
        *self.aliases.write() = table;
    }

    /// Canonicalize a provider reference, resolving aliases first.
    pub fn normalize(&self, provider: &str) -> String {
        if provider.is_empty() {
            return String::new();
        }
        if let Some(aliased) = self.aliases.read().get(provider) {
            return aliased.clone();
        }
        normalize_raw(provider)
    }

    /// Produce the ordered, de-duplicated list of candidate base URLs for
    /// one descriptor.
    ///
    /// CI-like environments try `ci_provider`, then `provider`, then
    /// `production_provider`; production serving reverses the tie-break so
    /// the production CDN is hit first. The global fallback list is
    /// appended unless the descriptor opted out.
    pub fn resolve_bases(&self, desc: &ModuleDescriptor, env: &Environment) -> Vec<String> {
        let ordered = if env.prefers_ci() {
            [&desc.ci_provider, &desc.provider, &desc.production_provider]
        } else {
            [&desc.production_provider, &desc.provider, &desc.ci_provider]
        };

        let mut seen = HashSet::new();
        let mut bases = Vec::new();
        for candidate in ordered.into_iter().flatten() {
            self.push_base(candidate, &mut seen, &mut bases);
        }

        if bases.is_empty() {
            let fallback = desc
                .provider
                .clone()
                .filter(|p| !p.is_empty())
                .or_else(|| desc.production_provider.clone().filter(|p| !p.is_empty()))
                .unwrap_or_else(|| self.default_base());
            self.push_base(&fallback, &mut seen, &mut bases);
        }

        if desc.allow_fallback {
            for provider in self.fallbacks.read().iter() {
                self.push_base(provider, &mut seen, &mut bases);
            }
        }

        debug!(name = %desc.name, ?bases, "resolved provider bases");
        bases
    }

    fn push_base(&self, provider: &str, seen: &mut HashSet<String>, bases: &mut Vec<String>) {
        let normalized = self.normalize(provider);
        if !normalized.is_empty() && seen.insert(normalized.clone()) {
            bases.push(normalized);
        }
    }
}
