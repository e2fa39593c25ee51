//! Page-side collaborators: dynamic import, script injection, globals.

use std::future::Future;

use serde_json::Value;

use crate::error::Result;

/// The page primitives the loader depends on.
///
/// The engine never touches a DOM or a JS engine directly; the embedder
/// supplies whatever bridge the deployment uses (wasm bindings, a headless
/// browser driver, a test double). Module values cross this boundary as
/// [`serde_json::Value`] objects.
pub trait ModuleHost: Send + Sync {
    /// Load a URL as an ES module and return its namespace object.
    fn import_module(&self, url: &str) -> impl Future<Output = Result<Value>> + Send;

    /// Inject a classic `<script src=url>` element and wait for its
    /// load/error event.
    fn inject_script(&self, url: &str) -> impl Future<Output = Result<()>> + Send;

    /// Look up a top-level global by name.
    fn global(&self, name: &str) -> Option<Value>;
}

/// Walk a dotted global pattern (`Foo.Bar.baz`) through the host's globals.
pub fn lookup_global<H: ModuleHost>(host: &H, pattern: &str) -> Option<Value> {
    let mut parts = pattern.split('.');
    let root = parts.next()?;
    let mut current = host.global(root)?;
    for part in parts {
        current = current.get(part)?.clone();
    }
    Some(current)
}
