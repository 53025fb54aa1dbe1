use edgeclick::{ClickPolicy, EdgeParams, MatchConfig, ScaleSweep, TargetSpec};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const SCHEMA_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
pub const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    pub label: String,
    pub path: PathBuf,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ScaleConfig {
    pub min: f64,
    pub max: f64,
    pub steps: usize,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        let sweep = ScaleSweep::default();
        Self {
            min: sweep.min,
            max: sweep.max,
            steps: sweep.steps,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EdgeConfig {
    pub low_threshold: f32,
    pub high_threshold: f32,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        let params = EdgeParams::default();
        Self {
            low_threshold: params.low_threshold,
            high_threshold: params.high_threshold,
        }
    }
}

/// Monitor configuration. Every field is optional in the JSON file.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub targets: Vec<TargetConfig>,
    pub screenshot_dir: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub interval_secs: f64,
    pub threshold: f32,
    pub cooldown_secs: f64,
    pub scale: ScaleConfig,
    pub edges: EdgeConfig,
    pub failsafe: bool,
}

impl Default for Config {
    fn default() -> Self {
        let policy = ClickPolicy::default();
        Self {
            targets: vec![
                TargetConfig {
                    label: "I AM AVAILABLE".to_string(),
                    path: PathBuf::from("data/i'm_available.png"),
                },
                TargetConfig {
                    label: "OK".to_string(),
                    path: PathBuf::from("data/ok.png"),
                },
            ],
            screenshot_dir: Some(PathBuf::from("data/screenshots")),
            log_dir: Some(PathBuf::from("data/logs")),
            interval_secs: 30.0,
            threshold: policy.threshold,
            cooldown_secs: policy.cooldown.as_secs_f64(),
            scale: ScaleConfig::default(),
            edges: EdgeConfig::default(),
            failsafe: true,
        }
    }
}

impl Config {
    pub fn from_path(path: &Path) -> Result<Self, Box<dyn Error>> {
        let text = fs::read_to_string(path)
            .map_err(|err| format!("cannot read config {}: {err}", path.display()))?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, Box<dyn Error>> {
        let config: Config = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks everything the library and the loop will rely on.
    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        if self.targets.is_empty() {
            return Err("at least one target must be configured".into());
        }
        if self.targets.iter().any(|t| t.label.is_empty()) {
            return Err("target labels must not be empty".into());
        }
        self.interval()?;
        if !(self.cooldown_secs.is_finite() && self.cooldown_secs >= 0.0) {
            return Err(format!(
                "cooldown_secs must be finite and non-negative, got {}",
                self.cooldown_secs
            )
            .into());
        }
        self.click_policy().validate()?;
        self.match_config().validate()?;
        Ok(())
    }

    pub fn interval(&self) -> Result<Duration, Box<dyn Error>> {
        if self.interval_secs <= 0.0 {
            let msg = format!("interval_secs must be positive, got {}", self.interval_secs);
            return Err(msg.into());
        }
        Duration::try_from_secs_f64(self.interval_secs)
            .map_err(|err| format!("invalid interval_secs {}: {err}", self.interval_secs).into())
    }

    pub fn click_policy(&self) -> ClickPolicy {
        ClickPolicy {
            threshold: self.threshold,
            cooldown: self.cooldown(),
        }
    }

    fn cooldown(&self) -> Duration {
        Duration::try_from_secs_f64(self.cooldown_secs).unwrap_or(Duration::MAX)
    }

    pub fn match_config(&self) -> MatchConfig {
        MatchConfig {
            edges: self.edge_params(),
            sweep: ScaleSweep {
                min: self.scale.min,
                max: self.scale.max,
                steps: self.scale.steps,
            },
            ..MatchConfig::default()
        }
    }

    pub fn edge_params(&self) -> EdgeParams {
        EdgeParams {
            low_threshold: self.edges.low_threshold,
            high_threshold: self.edges.high_threshold,
        }
    }

    pub fn target_specs(&self) -> Vec<TargetSpec> {
        self.targets
            .iter()
            .map(|t| TargetSpec::new(t.label.clone(), t.path.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, EXAMPLE_JSON};
    use std::time::Duration;

    #[test]
    fn empty_object_gives_defaults() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.interval().unwrap(), Duration::from_secs(30));
        assert_eq!(config.click_policy().cooldown, Duration::from_secs(15));
        assert_eq!(config.match_config().sweep.factors().len(), 11);
        let labels: Vec<_> = config.target_specs().into_iter().map(|s| s.label).collect();
        assert_eq!(labels, ["I AM AVAILABLE", "OK"]);
    }

    #[test]
    fn example_config_matches_defaults() {
        assert_eq!(Config::from_json(EXAMPLE_JSON).unwrap(), Config::default());
    }

    #[test]
    fn null_screenshot_dir_disables_saving() {
        let config = Config::from_json(r#"{ "screenshot_dir": null }"#).unwrap();
        assert!(config.screenshot_dir.is_none());
        assert!(config.log_dir.is_some());
    }

    #[test]
    fn partial_nested_sections_keep_other_defaults() {
        let config = Config::from_json(r#"{ "scale": { "steps": 5 } }"#).unwrap();
        assert_eq!(config.scale.steps, 5);
        assert_eq!(config.scale.min, 0.8);
        assert_eq!(config.scale.max, 1.2);
    }

    #[test]
    fn invalid_values_are_rejected() {
        for text in [
            r#"{ "interval_secs": 0 }"#,
            r#"{ "cooldown_secs": -1 }"#,
            r#"{ "targets": [] }"#,
            r#"{ "scale": { "min": 1.5, "max": 1.0 } }"#,
            r#"{ "edges": { "low_threshold": 200, "high_threshold": 100 } }"#,
            r#"{ "unknown_field": 1 }"#,
        ] {
            assert!(Config::from_json(text).is_err(), "{text}");
        }
    }
}
