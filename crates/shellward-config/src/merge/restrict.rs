use super::enforce::{
    block_workspace_override, clamp_max_int, enforce_bool_only_false, enforce_bool_only_true,
    union_string_arrays,
};

/// Enforce that the workspace layer can only **tighten** the gate. Call this
/// after merging the workspace layer but before final deserialization.
///
/// `baseline` is the merged config *before* the workspace layer was applied,
/// so enforcement works even when no user config file exists.
pub fn enforce_restrictions(
    merged: &mut toml::Value,
    baseline: &toml::Value,
    workspace_layer: &toml::Value,
) {
    // Switches that loosen the gate cannot be turned on.
    for (path, name) in [
        (
            &["commands", "allow_dangerous"][..],
            "commands.allow_dangerous",
        ),
        (
            &["commands", "allow_complex_commands"][..],
            "commands.allow_complex_commands",
        ),
    ] {
        enforce_bool_only_false(merged, baseline, workspace_layer, path, name);
    }

    // Confirmation and boundary switches cannot be turned off.
    for (path, name) in [
        (
            &["commands", "require_confirmation"][..],
            "commands.require_confirmation",
        ),
        (
            &["commands", "require_confirmation_for_risky"][..],
            "commands.require_confirmation_for_risky",
        ),
        (
            &["commands", "require_confirmation_for_dangerous"][..],
            "commands.require_confirmation_for_dangerous",
        ),
        (
            &["workspace", "enforce_boundaries"][..],
            "workspace.enforce_boundaries",
        ),
    ] {
        enforce_bool_only_true(merged, workspace_layer, path, name);
    }

    // A lower threshold confirms more; the workspace may only lower it.
    clamp_max_int(
        merged,
        baseline,
        workspace_layer,
        &["commands", "confirmation_threshold"],
        "commands.confirmation_threshold",
    );
    clamp_max_int(
        merged,
        baseline,
        workspace_layer,
        &["sanitizer", "max_command_length"],
        "sanitizer.max_command_length",
    );

    // Deny lists: workspace can only add.
    for (path, name) in [
        (
            &["commands", "blocked_commands"][..],
            "commands.blocked_commands",
        ),
        (
            &["commands", "always_block_patterns"][..],
            "commands.always_block_patterns",
        ),
        (
            &["sanitizer", "dangerous_patterns"][..],
            "sanitizer.dangerous_patterns",
        ),
        (&["categories", "blocked"][..], "categories.blocked"),
        (&["categories", "dangerous"][..], "categories.dangerous"),
        (&["workspace", "denied_paths"][..], "workspace.denied_paths"),
    ] {
        union_string_arrays(merged, baseline, workspace_layer, path, name);
    }

    // Allow lists and the workspace root itself are not workspace-settable.
    for (path, name) in [
        (
            &["commands", "allowed_commands"][..],
            "commands.allowed_commands",
        ),
        (
            &["commands", "trusted_commands"][..],
            "commands.trusted_commands",
        ),
        (
            &["commands", "auto_approve_patterns"][..],
            "commands.auto_approve_patterns",
        ),
        (&["categories", "safe"][..], "categories.safe"),
        (&["workspace", "root"][..], "workspace.root"),
    ] {
        block_workspace_override(merged, baseline, workspace_layer, path, name);
    }
}
