//! Layer merging over raw TOML trees.

use super::{ConfigLayer, FieldSources};

/// Merge `overlay` into `base` without recording where values came from.
///
/// Tables merge key by key. Any other overlay value, arrays included,
/// replaces the base value outright.
pub fn deep_merge(base: &mut toml::Value, overlay: &toml::Value) {
    let mut discarded = FieldSources::new();
    deep_merge_tracking(base, overlay, "", &ConfigLayer::Defaults, &mut discarded);
}

/// Merge `overlay` into `base`, attributing each leaf the overlay sets to
/// `layer` under its dotted key (`commands.allow_dangerous`).
pub fn deep_merge_tracking(
    base: &mut toml::Value,
    overlay: &toml::Value,
    prefix: &str,
    layer: &ConfigLayer,
    sources: &mut FieldSources,
) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                let path = dotted(prefix, key);
                merge_key(base_table, key, value, &path, layer, sources);
            }
        },
        (slot, value) => {
            *slot = value.clone();
            sources.insert(prefix.to_owned(), layer.clone());
        },
    }
}

fn merge_key(
    table: &mut toml::Table,
    key: &str,
    value: &toml::Value,
    path: &str,
    layer: &ConfigLayer,
    sources: &mut FieldSources,
) {
    match table.get_mut(key) {
        Some(existing) if value.is_table() => {
            deep_merge_tracking(existing, value, path, layer, sources);
        },
        Some(existing) => {
            *existing = value.clone();
            sources.insert(path.to_owned(), layer.clone());
        },
        None => {
            table.insert(key.to_owned(), value.clone());
            record_leaves(value, path, layer, sources);
        },
    }
}

/// Attribute every leaf under `value` to `layer`.
pub(crate) fn record_leaves(
    value: &toml::Value,
    path: &str,
    layer: &ConfigLayer,
    sources: &mut FieldSources,
) {
    match value {
        toml::Value::Table(table) => {
            for (key, child) in table {
                record_leaves(child, &dotted(path, key), layer, sources);
            }
        },
        _ => {
            sources.insert(path.to_owned(), layer.clone());
        },
    }
}

fn dotted(prefix: &str, key: &str) -> String {
    match prefix {
        "" => key.to_owned(),
        _ => format!("{prefix}.{key}"),
    }
}
