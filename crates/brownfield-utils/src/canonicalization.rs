//! Canonical JSON emission (JCS, RFC 8785)
//!
//! State and checkpoint files are written in canonical form so that saving an
//! unchanged aggregate produces byte-identical output and diffs stay stable.

use anyhow::{Context, Result};
use camino::Utf8Path;
use serde::Serialize;

use crate::atomic_write::{AtomicWriteResult, write_file_atomic};

/// Serialize `value` to JCS canonical JSON.
pub fn emit_jcs<T: Serialize>(value: &T) -> Result<String> {
    let json_value =
        serde_json::to_value(value).with_context(|| "Failed to serialize value to JSON")?;
    let json_bytes = serde_json_canonicalizer::to_vec(&json_value)
        .with_context(|| "Failed to canonicalize JSON using JCS")?;
    String::from_utf8(json_bytes).with_context(|| "JCS output contained invalid UTF-8")
}

/// Serialize `value` canonically and atomically replace `path` with it.
pub fn write_json_atomic<T: Serialize>(path: &Utf8Path, value: &T) -> Result<AtomicWriteResult> {
    let content = emit_jcs(value)?;
    write_file_atomic(path, content.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_emit_jcs_sorts_keys() {
        let mut map = HashMap::new();
        map.insert("zeta", 1);
        map.insert("alpha", 2);

        assert_eq!(emit_jcs(&map).unwrap(), r#"{"alpha":2,"zeta":1}"#);
    }

    #[test]
    fn test_emit_jcs_is_deterministic() {
        let value = serde_json::json!({"b": [3, 2, 1], "a": {"y": 0.75, "x": null}});

        let first = emit_jcs(&value).unwrap();
        let second = emit_jcs(&value).unwrap();

        assert_eq!(first, second);
        assert_eq!(first, r#"{"a":{"x":null,"y":0.75},"b":[3,2,1]}"#);
    }
}
