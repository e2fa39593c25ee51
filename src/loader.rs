//! Ordered candidate walking and format-specific module loading.

use futures::stream::{self, StreamExt};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::candidates::build_candidates;
use crate::descriptor::{LoadFormat, ModuleDescriptor};
use crate::error::{DynloadError, Result};
use crate::host::{self, ModuleHost};
use crate::namespace::{create_namespace, is_falsy};
use crate::probe::{Delay, HttpProbe, UrlProber};
use crate::provider::{Environment, ProviderSettings};
use crate::registry::ModuleRegistry;
use crate::rules::{self, DynamicRule};

/// Resolves and loads modules against an injected host and registry.
pub struct ModuleLoader<C, D, H> {
    prober: UrlProber<C, D>,
    host: H,
    settings: ProviderSettings,
    environment: Environment,
    registry: ModuleRegistry,
}

impl<C: HttpProbe, D: Delay, H: ModuleHost> ModuleLoader<C, D, H> {
    /// Wire a loader from its collaborators.
    pub fn new(
        prober: UrlProber<C, D>,
        host: H,
        settings: ProviderSettings,
        environment: Environment,
        registry: ModuleRegistry,
    ) -> Self {
        Self {
            prober,
            host,
            settings,
            environment,
            registry,
        }
    }

    /// The registry this loader writes into.
    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// Resolve provider bases, expand candidates, probe, load, register.
    pub async fn load(&self, desc: &ModuleDescriptor) -> Result<Value> {
        let candidates = self.candidates_for(desc)?;
        self.fetch_namespace(desc, &candidates).await
    }

    /// Load a dynamically requested module through its matching prefix rule.
    pub async fn load_dynamic(&self, name: &str, dyn_rules: &[DynamicRule]) -> Result<Value> {
        let desc = rules::descriptor_for_name(dyn_rules, name)
            .ok_or_else(|| DynloadError::NoRule(name.to_string()))?;
        self.load(&desc).await
    }

    /// Load several modules concurrently with a bounded fan-out.
    ///
    /// Candidate probing within each module stays strictly sequential; only
    /// distinct module names run in parallel. Namespaces come back in
    /// completion order; any failure fails the batch.
    pub async fn load_many(
        &self,
        descriptors: &[ModuleDescriptor],
        concurrency: usize,
    ) -> Result<Vec<Value>> {
        let results: Vec<Result<Value>> = stream::iter(descriptors)
            .map(|desc| self.load(desc))
            .buffer_unordered(concurrency.max(1))
            .collect()
            .await;

        results.into_iter().collect()
    }

    /// The ordered, de-duplicated candidate URL list for a descriptor.
    pub fn candidates_for(&self, desc: &ModuleDescriptor) -> Result<Vec<String>> {
        if let Some(url) = &desc.url {
            return Ok(vec![url.clone()]);
        }
        let bases = self.settings.resolve_bases(desc, &self.environment);
        let candidates = build_candidates(desc, &bases);
        if candidates.is_empty() {
            return Err(DynloadError::NoCandidates(desc.name.clone()));
        }
        Ok(candidates)
    }

    /// Walk candidates until one probes successful, load it in the
    /// descriptor's format, and register the synthesized namespace.
    pub async fn fetch_namespace(
        &self,
        desc: &ModuleDescriptor,
        candidates: &[String],
    ) -> Result<Value> {
        let url = self.select_url(desc, candidates).await?;

        let namespace = match desc.format {
            LoadFormat::EsModule => {
                let module = self.host.import_module(&url).await?;
                create_namespace(module)
            }
            LoadFormat::Global => self.load_global(desc, &url).await?,
        };

        self.registry.insert(&desc.name, namespace.clone());
        info!(
            name = %desc.name,
            url = %url,
            format = desc.format.as_str(),
            "dynamic module loaded"
        );
        Ok(namespace)
    }

    /// First candidate that probes successful, in list order.
    ///
    /// A descriptor with an explicit `url` bypasses probing entirely.
    async fn select_url(&self, desc: &ModuleDescriptor, candidates: &[String]) -> Result<String> {
        if let Some(url) = &desc.url {
            return Ok(url.clone());
        }

        for url in candidates {
            if self.prober.probe(url).await {
                debug!(name = %desc.name, url = %url, "candidate selected");
                return Ok(url.clone());
            }
        }

        warn!(name = %desc.name, tried = ?candidates, "module resolution failed");
        Err(DynloadError::ResolutionFailed {
            name: desc.name.clone(),
            tried: candidates.to_vec(),
        })
    }

    async fn load_global(&self, desc: &ModuleDescriptor, url: &str) -> Result<Value> {
        self.host.inject_script(url).await?;

        let pattern = desc.global_name();
        match host::lookup_global(&self.host, &pattern) {
            Some(value) if !is_falsy(&value) => Ok(create_namespace(value)),
            _ => Err(DynloadError::GlobalNotFound {
                name: desc.name.clone(),
                pattern,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{ProbeMethod, ProbeOptions};
    use parking_lot::Mutex;
    use serde_json::json;
    use std::collections::{HashMap, HashSet};

    struct MapHttp {
        ok: HashSet<String>,
    }

    impl MapHttp {
        fn new<const N: usize>(ok: [&str; N]) -> Self {
            Self {
                ok: ok.iter().map(|s| s.to_string()).collect(),
            }
        }
    }

    impl HttpProbe for MapHttp {
        async fn request(&self, url: &str, _method: ProbeMethod) -> Result<u16> {
            Ok(if self.ok.contains(url) { 200 } else { 404 })
        }
    }

    #[derive(Default)]
    struct NoDelay;

    impl Delay for NoDelay {
        async fn wait(&self, _ms: u64) {}
    }

    #[derive(Default)]
    struct FakeHost {
        globals: HashMap<String, Value>,
        modules: HashMap<String, Value>,
        scripts: Mutex<Vec<String>>,
    }

    impl ModuleHost for FakeHost {
        async fn import_module(&self, url: &str) -> Result<Value> {
            self.modules
                .get(url)
                .cloned()
                .ok_or_else(|| DynloadError::ImportFailed {
                    url: url.to_string(),
                    reason: "unknown module".to_string(),
                })
        }

        async fn inject_script(&self, url: &str) -> Result<()> {
            self.scripts.lock().push(url.to_string());
            Ok(())
        }

        fn global(&self, name: &str) -> Option<Value> {
            self.globals.get(name).cloned()
        }
    }

    fn loader(http: MapHttp, host: FakeHost) -> ModuleLoader<MapHttp, NoDelay, FakeHost> {
        let options = ProbeOptions {
            retries: 0,
            backoff_ms: 1,
            allow_get_fallback: true,
        };
        ModuleLoader::new(
            UrlProber::new(http, NoDelay).with_options(options),
            host,
            ProviderSettings::new(),
            Environment::default(),
            ModuleRegistry::new(),
        )
    }

    fn global_descriptor() -> ModuleDescriptor {
        let mut desc = ModuleDescriptor::new("sortable");
        desc.provider = Some("unpkg.com".to_string());
        desc.file = Some("Sortable.js".to_string());
        desc.global_pattern = Some("Foo.Bar".to_string());
        desc
    }

    #[tokio::test]
    async fn test_global_load_produces_namespace() {
        let http = MapHttp::new(["https://unpkg.com/sortable/Sortable.js"]);
        let mut host = FakeHost::default();
        host.globals
            .insert("Foo".to_string(), json!({"Bar": {"baz": 1}}));
        let loader = loader(http, host);

        let ns = loader.load(&global_descriptor()).await.unwrap();
        assert_eq!(ns["__esModule"], json!(true));
        assert_eq!(ns["default"]["baz"], json!(1));
        assert_eq!(loader.registry().get("sortable"), Some(ns));
        assert_eq!(
            *loader.host.scripts.lock(),
            vec!["https://unpkg.com/sortable/Sortable.js".to_string()]
        );
    }

    #[tokio::test]
    async fn test_global_missing_fails() {
        let http = MapHttp::new(["https://unpkg.com/sortable/Sortable.js"]);
        let loader = loader(http, FakeHost::default());

        let err = loader.load(&global_descriptor()).await.unwrap_err();
        match err {
            DynloadError::GlobalNotFound { pattern, .. } => assert_eq!(pattern, "Foo.Bar"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(!loader.registry().contains("sortable"));
    }

    #[tokio::test]
    async fn test_esm_namespace_passes_through() {
        let http = MapHttp::new(["https://unpkg.com/lib/index.mjs"]);
        let mut host = FakeHost::default();
        let module = json!({"__esModule": true, "default": {"a": 1}});
        host.modules
            .insert("https://unpkg.com/lib/index.mjs".to_string(), module.clone());
        let loader = loader(http, host);

        let mut desc = ModuleDescriptor::new("lib");
        desc.provider = Some("unpkg.com".to_string());
        desc.file = Some("index.mjs".to_string());
        desc.format = LoadFormat::EsModule;

        let ns = loader.load(&desc).await.unwrap();
        assert_eq!(ns, module);
    }

    #[tokio::test]
    async fn test_probe_walks_to_umd_fallback() {
        let http = MapHttp::new(["https://unpkg.com/sortable/umd/Sortable.js"]);
        let mut host = FakeHost::default();
        host.globals.insert("Foo".to_string(), json!({"Bar": 1}));
        let loader = loader(http, host);

        loader.load(&global_descriptor()).await.unwrap();
        assert_eq!(
            *loader.host.scripts.lock(),
            vec!["https://unpkg.com/sortable/umd/Sortable.js".to_string()]
        );
    }

    #[tokio::test]
    async fn test_total_failure_lists_all_candidates() {
        let http = MapHttp::new([]);
        let loader = loader(http, FakeHost::default());

        let err = loader.load(&global_descriptor()).await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("https://unpkg.com/sortable/Sortable.js"));
        assert!(message.contains("https://unpkg.com/sortable/umd/Sortable.js"));
        assert!(message.contains("https://unpkg.com/sortable/dist/Sortable.js"));
    }

    #[tokio::test]
    async fn test_direct_url_skips_probing() {
        // 404 everywhere; the explicit url must still load
        let http = MapHttp::new([]);
        let mut host = FakeHost::default();
        host.globals.insert("Widget".to_string(), json!({"v": 2}));
        let loader = loader(http, host);

        let mut desc = ModuleDescriptor::new("widget");
        desc.url = Some("https://cdn.example.com/widget.js".to_string());
        desc.global_pattern = Some("Widget".to_string());

        let ns = loader.load(&desc).await.unwrap();
        assert_eq!(ns["default"]["v"], json!(2));
    }

    #[tokio::test]
    async fn test_no_candidates_is_hard_failure() {
        let loader = loader(MapHttp::new([]), FakeHost::default());
        // No providers configured anywhere, so no bases at all
        let desc = ModuleDescriptor::new("ghost");
        let err = loader.load(&desc).await.unwrap_err();
        match err {
            DynloadError::NoCandidates(name) => assert_eq!(name, "ghost"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_load_dynamic_through_rule() {
        let http = MapHttp::new(["https://unpkg.com/icons/Star.js"]);
        let mut host = FakeHost::default();
        host.globals.insert("Star".to_string(), json!({"path": "m0"}));
        let loader = loader(http, host);

        let dyn_rules = vec![DynamicRule {
            prefix: "icons/".to_string(),
            provider: Some("unpkg.com".to_string()),
            ..Default::default()
        }];

        let ns = loader.load_dynamic("icons/Star", &dyn_rules).await.unwrap();
        assert_eq!(ns["default"]["path"], json!("m0"));
        assert!(loader.registry().contains("icons/Star"));

        let err = loader
            .load_dynamic("widgets/Star", &dyn_rules)
            .await
            .unwrap_err();
        assert!(matches!(err, DynloadError::NoRule(_)));
    }

    #[tokio::test]
    async fn test_load_many() {
        let http = MapHttp::new([
            "https://unpkg.com/a/a.js",
            "https://unpkg.com/b/b.js",
        ]);
        let mut host = FakeHost::default();
        host.globals.insert("A".to_string(), json!({"a": 1}));
        host.globals.insert("B".to_string(), json!({"b": 2}));
        let loader = loader(http, host);

        let mut a = ModuleDescriptor::new("a");
        a.provider = Some("unpkg.com".to_string());
        a.file = Some("a.js".to_string());
        a.global_pattern = Some("A".to_string());
        let mut b = ModuleDescriptor::new("b");
        b.provider = Some("unpkg.com".to_string());
        b.file = Some("b.js".to_string());
        b.global_pattern = Some("B".to_string());

        let namespaces = loader.load_many(&[a, b], 4).await.unwrap();
        assert_eq!(namespaces.len(), 2);
        assert!(loader.registry().contains("a"));
        assert!(loader.registry().contains("b"));
    }
}
