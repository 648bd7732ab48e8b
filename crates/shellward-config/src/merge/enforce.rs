use tracing::warn;

use super::path::{get_nested, remove_nested, set_nested};

/// Clamp an integer field so the workspace cannot raise it above baseline.
pub(super) fn clamp_max_int(
    merged: &mut toml::Value,
    baseline: &toml::Value,
    workspace: &toml::Value,
    path: &[&str],
    field_name: &str,
) {
    let baseline_val = get_nested(baseline, path).and_then(toml::Value::as_integer);
    let ws_val = get_nested(workspace, path).and_then(toml::Value::as_integer);

    if let (Some(base_v), Some(ws_v)) = (baseline_val, ws_val)
        && ws_v > base_v
    {
        warn!(
            "Workspace config tried to increase {field_name} from {base_v} to {ws_v}; \
             clamping to {base_v}"
        );
        set_nested(merged, path, toml::Value::Integer(base_v));
    }
}

/// Ensure a boolean field can only become `true`.
pub(super) fn enforce_bool_only_true(
    merged: &mut toml::Value,
    workspace: &toml::Value,
    path: &[&str],
    field_name: &str,
) {
    if let Some(ws_val) = get_nested(workspace, path).and_then(toml::Value::as_bool)
        && !ws_val
    {
        warn!("Workspace config tried to disable {field_name}; forcing to true");
        set_nested(merged, path, toml::Value::Boolean(true));
    }
}

/// Ensure a boolean field that loosens the gate cannot be switched on by the
/// workspace.
pub(super) fn enforce_bool_only_false(
    merged: &mut toml::Value,
    baseline: &toml::Value,
    workspace: &toml::Value,
    path: &[&str],
    field_name: &str,
) {
    let base_val = get_nested(baseline, path)
        .and_then(toml::Value::as_bool)
        .unwrap_or(false);
    if let Some(ws_val) = get_nested(workspace, path).and_then(toml::Value::as_bool)
        && ws_val
        && !base_val
    {
        warn!("Workspace config tried to enable {field_name}; keeping it disabled");
        set_nested(merged, path, toml::Value::Boolean(false));
    }
}

/// Union a string array so the workspace can add entries but never drop
/// entries inherited from the baseline.
pub(super) fn union_string_arrays(
    merged: &mut toml::Value,
    baseline: &toml::Value,
    workspace: &toml::Value,
    path: &[&str],
    field_name: &str,
) {
    let Some(ws_arr) = get_nested(workspace, path).and_then(toml::Value::as_array) else {
        return;
    };

    let mut combined: Vec<toml::Value> = get_nested(baseline, path)
        .and_then(toml::Value::as_array)
        .cloned()
        .unwrap_or_default();
    let before = combined.len();
    for item in ws_arr {
        if !combined.contains(item) {
            combined.push(item.clone());
        }
    }

    tracing::debug!(
        field = field_name,
        added = combined.len().saturating_sub(before),
        "merged workspace entries into baseline"
    );
    set_nested(merged, path, toml::Value::Array(combined));
}

/// Discard a workspace override entirely, restoring the baseline value.
pub(super) fn block_workspace_override(
    merged: &mut toml::Value,
    baseline: &toml::Value,
    workspace: &toml::Value,
    path: &[&str],
    field_name: &str,
) {
    if get_nested(workspace, path).is_none() {
        return;
    }

    warn!("Workspace config cannot set {field_name}; ignoring workspace value");
    match get_nested(baseline, path).cloned() {
        Some(restored) => set_nested(merged, path, restored),
        None => remove_nested(merged, path),
    }
}
