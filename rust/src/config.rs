//! Configuration for scheduling and leveling requests.

use serde::{Deserialize, Serialize};

use crate::logging::Verbosity;

/// Schedule the leveler starts from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LevelingBaseline {
    /// Every task at its earliest start, ignoring resource contention.
    #[default]
    DependencyOnly,
    /// The resource-cursor forward schedule.
    ResourceCursor,
}

/// Per-request scheduling configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchedulingConfig {
    /// Diagnostic output level.
    pub verbosity: Verbosity,
    /// Capacity used for resources that do not declare `max_concurrent_tasks`.
    pub default_max_concurrent_tasks: u32,
    /// Starting schedule for resource leveling.
    pub leveling_baseline: LevelingBaseline,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            verbosity: Verbosity::Silent,
            default_max_concurrent_tasks: 1,
            leveling_baseline: LevelingBaseline::DependencyOnly,
        }
    }
}

impl SchedulingConfig {
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn with_leveling_baseline(mut self, baseline: LevelingBaseline) -> Self {
        self.leveling_baseline = baseline;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = SchedulingConfig::default();
        assert_eq!(config.verbosity, Verbosity::Silent);
        assert_eq!(config.default_max_concurrent_tasks, 1);
        assert_eq!(config.leveling_baseline, LevelingBaseline::DependencyOnly);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: SchedulingConfig =
            serde_json::from_str(r#"{"levelingBaseline":"resourceCursor"}"#).unwrap();
        assert_eq!(config.leveling_baseline, LevelingBaseline::ResourceCursor);
        assert_eq!(config.default_max_concurrent_tasks, 1);
    }
}
