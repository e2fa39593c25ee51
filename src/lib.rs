//! Dynamic provider/module resolution and loading for CDN-delivered bundles.
//!
//! Given a logical module reference (name, package, version, path pattern),
//! dynload decides which provider base URLs to try, probes them for
//! availability with retry/backoff, loads the winning URL as an ES module or
//! a classic script global, and normalizes the result into a consistent
//! namespace object written into a shared registry.
//!
//! The engine is host-agnostic: page primitives (dynamic `import()`, script
//! injection, global lookup) come in through the [`host::ModuleHost`] trait,
//! HTTP probing through [`probe::HttpProbe`], and backoff delays through
//! [`probe::Delay`], so everything is unit-testable without a browser.
//!
//! ```no_run
//! # async fn demo(host: impl dynload::ModuleHost) -> dynload::Result<()> {
//! use dynload::{
//!     Environment, ModuleDescriptor, ModuleLoader, ModuleRegistry, ProviderSettings,
//!     ReqwestProbe, TokioDelay, UrlProber,
//! };
//!
//! let settings = ProviderSettings::new();
//! settings.set_fallback_providers(["cdn.jsdelivr.net/npm"]);
//!
//! let loader = ModuleLoader::new(
//!     UrlProber::new(ReqwestProbe::new()?, TokioDelay),
//!     host,
//!     settings,
//!     Environment::from_page_url("https://app.example.com/"),
//!     ModuleRegistry::new(),
//! );
//!
//! let mut desc = ModuleDescriptor::new("sortablejs");
//! desc.version = Some("1.15.0".to_string());
//! desc.file = Some("Sortable.min.js".to_string());
//! desc.global_pattern = Some("Sortable".to_string());
//! let namespace = loader.load(&desc).await?;
//! # let _ = namespace;
//! # Ok(())
//! # }
//! ```

pub mod candidates;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod host;
pub mod loader;
pub mod namespace;
pub mod probe;
pub mod provider;
pub mod registry;
pub mod rules;

pub use candidates::build_candidates;
pub use config::{LoaderConfig, ProvidersConfig};
pub use descriptor::{LoadFormat, ModuleDescriptor};
pub use error::{DynloadError, Result};
pub use host::ModuleHost;
pub use loader::ModuleLoader;
pub use namespace::{create_namespace, is_namespace};
pub use probe::{Delay, HttpProbe, ProbeMethod, ProbeOptions, ReqwestProbe, TokioDelay, UrlProber};
pub use provider::{Environment, ProviderSettings, ProxyMode, normalize_raw};
pub use registry::ModuleRegistry;
pub use rules::DynamicRule;
