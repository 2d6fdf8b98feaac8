use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, TraceError};

/// One entry of a generator config file (the file holds a JSON array).
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TraceGenConfig {
    pub trace_file_name: PathBuf,
    pub block_num: usize,
    #[serde(default)]
    pub block_size: Option<ValueSpec>,
    #[serde(default)]
    pub block_gap: Option<ValueSpec>,
    #[serde(default)]
    pub block_prio: Option<ValueSpec>,
    #[serde(default)]
    pub block_ddl: Option<ValueSpec>,
}

/// How the values of one trace column are produced.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ValueSpec {
    /// Same value for every block
    Literal(f64),
    /// Literal written as a string, e.g. `"1350"`
    Text(String),
    Generated(GeneratedSpec),
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GeneratedSpec {
    /// Repeats `seq` cyclically
    Seq { seq: Vec<f64> },
    Random { random: RandomSpec },
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RandomSpec {
    /// Fixed seed for reproducible traces; entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(flatten)]
    pub distribution: Distribution,
}

/// Supported distributions. `max` is the historical name of the main
/// parameter and means something different for each of them.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "distribution", rename_all = "snake_case")]
pub enum Distribution {
    /// Integers in `[0, max)`
    Integers { max: i64 },
    Choice { choices: Vec<f64>, probability: Vec<f64> },
    /// `[0, max)`
    Uniform { max: f64 },
    /// Mean 0, standard deviation `max`
    Normal { max: f64 },
    /// Underlying normal with mean 0 and sigma `max`
    Lognormal { max: f64 },
    Beta { a: f64, b: f64 },
    /// Scale (mean) `max`
    Exponential { max: f64 },
    /// Lomax (Pareto II) with shape `a`
    Pareto { a: f64 },
    /// Mean `max`
    Poisson { max: f64 },
    /// `max` trials with success probability `p`
    Binomial { max: u64, p: f64 },
    /// Trials up to and including the first success, always >= 1
    Geometric { p: f64 },
    /// Failures before `max` successes
    NegativeBinomial { max: f64, p: f64 },
}

impl TraceGenConfig {
    pub fn validate(&self) -> std::result::Result<(), String> {
        for (name, spec) in [
            ("block_size", &self.block_size),
            ("block_gap", &self.block_gap),
            ("block_prio", &self.block_prio),
            ("block_ddl", &self.block_ddl),
        ] {
            if let Some(spec) = spec {
                spec.validate().map_err(|e| format!("{name}: {e}"))?;
            }
        }
        Ok(())
    }
}

impl ValueSpec {
    pub fn validate(&self) -> std::result::Result<(), String> {
        match self {
            ValueSpec::Literal(_) => Ok(()),
            ValueSpec::Text(text) => text
                .trim()
                .parse::<f64>()
                .map(|_| ())
                .map_err(|_| format!("'{text}' is not a number")),
            ValueSpec::Generated(GeneratedSpec::Seq { seq }) if seq.is_empty() => {
                Err("seq must not be empty".to_string())
            }
            ValueSpec::Generated(GeneratedSpec::Seq { .. }) => Ok(()),
            ValueSpec::Generated(GeneratedSpec::Random { random }) => random.distribution.validate(),
        }
    }
}

impl Distribution {
    fn validate(&self) -> std::result::Result<(), String> {
        let check_p = |p: f64| {
            if p > 0.0 && p <= 1.0 {
                Ok(())
            } else {
                Err(format!("p must be within (0, 1], got {p}"))
            }
        };
        match self {
            Distribution::Integers { max } if *max <= 0 => Err(format!("max must be positive, got {max}")),
            Distribution::Choice { choices, probability } => {
                if choices.is_empty() {
                    Err("choices must not be empty".to_string())
                } else if choices.len() != probability.len() {
                    Err(format!(
                        "{} choices but {} probabilities",
                        choices.len(),
                        probability.len()
                    ))
                } else {
                    Ok(())
                }
            }
            Distribution::Uniform { max } if *max <= 0.0 => Err(format!("max must be positive, got {max}")),
            Distribution::Binomial { p, .. } => {
                if (0.0..=1.0).contains(p) {
                    Ok(())
                } else {
                    Err(format!("p must be within [0, 1], got {p}"))
                }
            }
            Distribution::Geometric { p } => check_p(*p),
            Distribution::NegativeBinomial { max, p } => {
                if *max <= 0.0 {
                    Err(format!("max must be positive, got {max}"))
                } else {
                    check_p(*p)
                }
            }
            _ => Ok(()),
        }
    }
}

/// Read a config file holding an array of generator entries.
pub fn load_configs(path: &Path) -> Result<Vec<TraceGenConfig>> {
    let text = fs::read_to_string(path).map_err(|e| TraceError::io(path, e))?;
    let configs: Vec<TraceGenConfig> = serde_json::from_str(&text)
        .map_err(|e| TraceError::Config(format!("{}: {e}", path.display())))?;
    for config in &configs {
        config.validate().map_err(|e| {
            TraceError::Config(format!("{} ({}): {e}", path.display(), config.trace_file_name.display()))
        })?;
    }
    Ok(configs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_spec_forms() {
        let json = r#"[{
            "trace_file_name": "out.txt",
            "block_num": 4,
            "block_size": 1300,
            "block_gap": "0.01",
            "block_prio": {"type": "seq", "seq": [0, 1, 2]},
            "block_ddl": {"type": "random", "random": {"distribution": "normal", "max": 20, "seed": 7}}
        }]"#;
        let configs: Vec<TraceGenConfig> = serde_json::from_str(json).unwrap();
        let config = &configs[0];
        assert_eq!(config.block_size, Some(ValueSpec::Literal(1300.0)));
        assert_eq!(config.block_gap, Some(ValueSpec::Text("0.01".to_string())));
        assert_eq!(
            config.block_prio,
            Some(ValueSpec::Generated(GeneratedSpec::Seq {
                seq: vec![0.0, 1.0, 2.0]
            }))
        );
        assert_eq!(
            config.block_ddl,
            Some(ValueSpec::Generated(GeneratedSpec::Random {
                random: RandomSpec {
                    seed: Some(7),
                    distribution: Distribution::Normal { max: 20.0 },
                }
            }))
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_fields_are_none() {
        let config: TraceGenConfig =
            serde_json::from_str(r#"{"trace_file_name": "t.txt", "block_num": 1}"#).unwrap();
        assert!(config.block_size.is_none());
        assert!(config.block_ddl.is_none());
    }

    #[test]
    fn test_invalid_distribution_parameters() {
        let spec = ValueSpec::Generated(GeneratedSpec::Random {
            random: RandomSpec {
                seed: None,
                distribution: Distribution::Choice {
                    choices: vec![1.0, 2.0],
                    probability: vec![1.0],
                },
            },
        });
        assert!(spec.validate().is_err());
        assert!(Distribution::Geometric { p: 0.0 }.validate().is_err());
        assert!(ValueSpec::Text("abc".to_string()).validate().is_err());
    }
}
