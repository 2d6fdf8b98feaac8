//! 분석 설정 (JSON 파일 + 명령줄 옵션)

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Result, TraceError};
use crate::models::{BctUnit, IdScheme};
use crate::utils::constants::DEFAULT_TICK_MS;

/// Knobs shared by every analysis command.
///
/// Loaded from `--config <file.json>`; missing keys fall back to
/// [`AnalysisConfig::default`] and command line flags override both.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    /// In-time ratio reported for a class that has no completed block yet
    pub default_ratio: f64,
    pub bct_unit: BctUnit,
    pub result_id_scheme: IdScheme,
    /// Priority classes drawn in charts and tables
    pub classes: Vec<u32>,
    pub tick_ms: u64,
    pub hist_bucket_ms: f64,
    pub chart_width: u32,
    pub chart_height: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            default_ratio: 1.0,
            bct_unit: BctUnit::Micros,
            result_id_scheme: IdScheme::Stream,
            classes: vec![1, 2],
            tick_ms: DEFAULT_TICK_MS,
            hist_bucket_ms: 10.0,
            chart_width: 1000,
            chart_height: 800,
        }
    }
}

impl AnalysisConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| TraceError::io(path, e))?;
        let config: AnalysisConfig = serde_json::from_str(&text)?;
        config.validate().map_err(TraceError::Config)?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if !(0.0..=1.0).contains(&self.default_ratio) {
            return Err(format!(
                "default_ratio must be within [0, 1], got {}",
                self.default_ratio
            ));
        }
        if self.classes.is_empty() {
            return Err("at least one priority class is required".to_string());
        }
        if self.tick_ms == 0 {
            return Err("tick_ms must be positive".to_string());
        }
        if self.hist_bucket_ms <= 0.0 {
            return Err("hist_bucket_ms must be positive".to_string());
        }
        if self.chart_width < 200 || self.chart_height < 200 {
            return Err("chart size must be at least 200x200".to_string());
        }
        Ok(())
    }
}

/// Parse a comma separated class list such as `1,2`.
pub fn parse_classes(value: &str) -> std::result::Result<Vec<u32>, String> {
    let mut classes = Vec::new();
    for part in value.split(',') {
        let class = part
            .trim()
            .parse::<u32>()
            .map_err(|_| format!("Invalid priority class: {part}"))?;
        if !classes.contains(&class) {
            classes.push(class);
        }
    }
    if classes.is_empty() {
        return Err("No priority class provided".to_string());
    }
    Ok(classes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_config_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"default_ratio": 0.0, "bct_unit": "millis"}}"#).unwrap();
        file.flush().unwrap();

        let config = AnalysisConfig::load(file.path()).unwrap();
        assert_eq!(config.default_ratio, 0.0);
        assert_eq!(config.bct_unit, BctUnit::Millis);
        assert_eq!(config.classes, vec![1, 2]);
        assert_eq!(config.tick_ms, 500);
    }

    #[test]
    fn test_invalid_ratio_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"default_ratio": 1.5}}"#).unwrap();
        file.flush().unwrap();

        assert!(matches!(
            AnalysisConfig::load(file.path()),
            Err(TraceError::Config(_))
        ));
    }

    #[test]
    fn test_parse_classes() {
        assert_eq!(parse_classes("1, 2,1").unwrap(), vec![1, 2]);
        assert!(parse_classes("1,x").is_err());
    }
}
