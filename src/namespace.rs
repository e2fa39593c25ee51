//! Namespace normalization for heterogeneous module shapes.
//!
//! Loaded artifacts arrive as ES-module namespaces, UMD exports, or page
//! globals. This is the single seam where that heterogeneity is absorbed:
//! every loaded value is wrapped into `{ __esModule: true, default, ... }`
//! so `require`-style consumers see identical interop semantics.

use serde_json::{Map, Value};

/// Key marking a value as an already-synthesized namespace.
pub const ES_MODULE_FLAG: &str = "__esModule";

/// Key holding the default export.
pub const DEFAULT_EXPORT: &str = "default";

/// Whether a value already satisfies the namespace shape.
pub fn is_namespace(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|obj| obj.get(ES_MODULE_FLAG).and_then(Value::as_bool) == Some(true))
}

/// JavaScript-style falsiness for loaded globals.
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Wrap an arbitrary loaded value into a consistent namespace object.
///
/// Values that already carry `__esModule: true` pass through unchanged, so
/// repeated synthesis is a no-op. Otherwise the value's own keys are copied
/// in, `default` is set to the value itself unless the value supplied one,
/// and named exports of an object `default` are lifted onto the namespace
/// without overwriting anything already present.
pub fn create_namespace(value: Value) -> Value {
    if is_namespace(&value) {
        return value;
    }

    let mut ns = Map::new();
    ns.insert(ES_MODULE_FLAG.to_string(), Value::Bool(true));

    match value {
        Value::Object(entries) => {
            let original = Value::Object(entries.clone());
            for (key, entry) in entries {
                // The flag we just set is the one key the source may not override
                if key != ES_MODULE_FLAG {
                    ns.insert(key, entry);
                }
            }
            if !ns.contains_key(DEFAULT_EXPORT) {
                ns.insert(DEFAULT_EXPORT.to_string(), original);
            }
        }
        other => {
            ns.insert(DEFAULT_EXPORT.to_string(), other);
        }
    }

    if let Some(Value::Object(exports)) = ns.get(DEFAULT_EXPORT).cloned() {
        for (key, export) in exports {
            if key == DEFAULT_EXPORT || key == ES_MODULE_FLAG || ns.contains_key(&key) {
                continue;
            }
            ns.insert(key, export);
        }
    }

    Value::Object(ns)
}
