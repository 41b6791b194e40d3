// src/config/validate.rs

use std::time::Duration;

use crate::config::model::{GroupSettings, RawGroupSettings};
use crate::errors::ConfigError;
use crate::options::Options;

impl TryFrom<RawGroupSettings> for GroupSettings {
    type Error = ConfigError;

    fn try_from(raw: RawGroupSettings) -> Result<Self, Self::Error> {
        validate_group(&raw)?;
        Ok(GroupSettings::new_unchecked(raw.group))
    }
}

fn validate_group(raw: &RawGroupSettings) -> Result<(), ConfigError> {
    if raw.group.timeout_ms == Some(0) {
        return Err(ConfigError::Invalid(
            "[group].timeout_ms must be >= 1 (omit it for no timeout)".to_string(),
        ));
    }

    if raw.group.prefix.trim() != raw.group.prefix {
        return Err(ConfigError::Invalid(format!(
            "[group].prefix must not have surrounding whitespace (got {:?})",
            raw.group.prefix
        )));
    }

    Ok(())
}

impl GroupSettings {
    /// Options equivalent to these settings.
    ///
    /// The error collector and a custom logger can only be attached through
    /// the builder afterwards.
    pub fn into_options(self) -> Options {
        let group = self.group().clone();
        let mut opts = Options::new()
            .with_prefix(group.prefix)
            .with_limit(group.limit);

        if let Some(ms) = group.timeout_ms {
            opts = opts.with_timeout(Duration::from_millis(ms));
        }
        if group.logging {
            opts = opts.with_logging();
        }
        if group.dependency_tracking {
            opts = opts.with_dependency_tracking();
        }
        opts
    }
}
