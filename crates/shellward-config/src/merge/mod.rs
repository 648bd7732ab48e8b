//! Deep merge of TOML values with restriction enforcement.
//!
//! The merge operates on raw [`toml::Value`] trees rather than deserialized
//! structs, so a key missing from an overlay never resets the base layer.

mod deep;
mod enforce;
mod path;
mod restrict;
mod types;

pub use deep::{deep_merge, deep_merge_tracking};
pub use restrict::enforce_restrictions;
pub use types::{ConfigLayer, FieldSources};

pub(crate) use path::set_nested;

/// Mark every leaf of the defaults tree with [`ConfigLayer::Defaults`].
pub(crate) fn record_defaults(val: &toml::Value, sources: &mut FieldSources) {
    deep::record_leaves(val, "", &ConfigLayer::Defaults, sources);
}
