//! Command-line overrides layered on top of the file configuration.

use crate::types::BuildConfig;
use incbuild_common::DetectionPolicy;

/// Values given on the command line that replace file settings.
///
/// `None` and `false` leave the file value untouched; a flag can enable
/// pruning but never disable it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// Replaces `cache.detection`.
    pub detection: Option<DetectionPolicy>,
    /// Forces `archive.prune` on.
    pub prune: bool,
}

impl ConfigOverrides {
    /// Applies the overrides and returns the merged configuration.
    pub fn apply(&self, mut config: BuildConfig) -> BuildConfig {
        if let Some(policy) = self.detection {
            config.cache.detection = policy;
        }
        if self.prune {
            config.archive.prune = true;
        }
        config
    }
}
