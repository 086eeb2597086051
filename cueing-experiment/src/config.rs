use crate::error::ExperimentError;
use cueing_layout::GeometryConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub practice_trials: usize,
    pub block_count: usize,
    pub layouts_per_block: usize,
    /// Blank gap between a response and the next layout.
    pub inter_trial_interval_ms: u64,
    /// Length of the red flash after an incorrect response.
    pub incorrect_feedback_ms: u64,
    /// Wake-status options offered on the submission form.
    pub conditions: Vec<String>,
    pub geometry: GeometryConfig,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            practice_trials: 10,
            block_count: 18,
            layouts_per_block: 20,
            inter_trial_interval_ms: 300,
            incorrect_feedback_ms: 500,
            conditions: vec!["awake".to_string(), "sleepy".to_string()],
            geometry: GeometryConfig::default(),
        }
    }
}

impl ExperimentConfig {
    /// Reads a JSON config; missing fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ExperimentError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn main_trials(&self) -> usize {
        self.block_count * self.layouts_per_block
    }

    pub fn inter_trial_interval(&self) -> Duration {
        Duration::from_millis(self.inter_trial_interval_ms)
    }

    pub fn incorrect_feedback(&self) -> Duration {
        Duration::from_millis(self.incorrect_feedback_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cueing_layout::ZonePolicy;
    use std::io::Write;

    #[test]
    fn defaults_match_the_task() {
        let config = ExperimentConfig::default();
        assert_eq!(config.main_trials(), 360);
        assert_eq!(config.practice_trials, 10);
        assert_eq!(config.inter_trial_interval(), Duration::from_millis(300));
    }

    #[test]
    fn partial_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "block_count": 2, "geometry": {{ "policy": {{ "kind": "quadrant", "edge_inset": 5.0, "buffer": 7.0 }} }} }}"#
        )
        .unwrap();

        let config = ExperimentConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.block_count, 2);
        assert_eq!(config.layouts_per_block, 20);
        assert_eq!(
            config.geometry.policy,
            ZonePolicy::Quadrant {
                edge_inset: 5.0,
                buffer: 7.0
            }
        );
        assert_eq!(config.geometry.max_attempts, 100);
    }

    #[test]
    fn unreadable_or_malformed_files_are_errors() {
        assert!(matches!(
            ExperimentConfig::from_json_file("/nonexistent/cueing.json"),
            Err(ExperimentError::ConfigIo(_))
        ));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(
            ExperimentConfig::from_json_file(file.path()),
            Err(ExperimentError::ConfigParse(_))
        ));
    }
}
