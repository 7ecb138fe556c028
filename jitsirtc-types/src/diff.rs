/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 *
 * Unless you explicitly state otherwise, any contribution intentionally
 * submitted for inclusion in the work by you, as defined in the Apache-2.0
 * license, shall be dual licensed as above, without any additional terms or
 * conditions.
 */

//! Settings change sets.
//!
//! The host reports setting changes as a nested object containing only the
//! keys that changed, e.g. `{"client": {"voice": {"mode": "ptt"}}}`. This
//! module flattens such objects into dotted paths (`client.voice.mode`).

use serde_json::Value;
use std::collections::BTreeSet;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SettingsDiff {
    keys: BTreeSet<String>,
}

impl SettingsDiff {
    pub fn from_value(value: &Value) -> Self {
        let mut keys = BTreeSet::new();
        flatten_into(value, String::new(), &mut keys);
        Self { keys }
    }

    /// Dotted paths of every leaf that changed.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    /// Whether `path` changed, either as a leaf or as a parent of changed leaves.
    pub fn touches(&self, path: &str) -> bool {
        self.keys
            .iter()
            .any(|key| key == path || key.starts_with(&format!("{path}.")))
    }

    pub fn touches_any(&self, paths: &[&str]) -> bool {
        paths.iter().any(|path| self.touches(path))
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl From<Value> for SettingsDiff {
    fn from(value: Value) -> Self {
        Self::from_value(&value)
    }
}

fn flatten_into(value: &Value, prefix: String, keys: &mut BTreeSet<String>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_into(child, path, keys);
            }
        }
        _ if !prefix.is_empty() => {
            keys.insert(prefix);
        }
        _ => {}
    }
}
