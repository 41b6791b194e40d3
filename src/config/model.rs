// src/config/model.rs

use serde::Deserialize;

/// Group settings as read from a TOML file.
///
/// ```toml
/// [group]
/// prefix = "ingest"
/// limit = 8
/// timeout_ms = 1500
/// logging = true
/// dependency_tracking = true
/// ```
///
/// Every key is optional; an empty document yields [`crate::Options::new`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawGroupSettings {
    #[serde(default)]
    pub group: GroupSection,
}

/// `[group]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupSection {
    /// Log label. Empty falls back to `"anonymous"`.
    #[serde(default)]
    pub prefix: String,

    /// `0` (default) means one slot per submitted task.
    #[serde(default)]
    pub limit: usize,

    /// Whole-call deadline in milliseconds. Omit for no deadline.
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    #[serde(default)]
    pub logging: bool,

    #[serde(default)]
    pub dependency_tracking: bool,
}

/// Settings that passed validation. Build with [`crate::config::load_from_path`]
/// or [`crate::config::from_toml_str`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSettings {
    group: GroupSection,
}

impl GroupSettings {
    pub(crate) fn new_unchecked(group: GroupSection) -> Self {
        Self { group }
    }

    pub fn group(&self) -> &GroupSection {
        &self.group
    }
}
