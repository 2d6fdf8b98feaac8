//! Synthetic trace files from JSON descriptions.

mod config;

use rand::distr::weighted::WeightedIndex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{
    Beta, Binomial, Distribution as _, Exp, Gamma, Geometric, LogNormal, Normal, Pareto, Poisson,
};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, TraceError};
use crate::log;
use crate::utils::constants::{
    DEFAULT_BLOCK_DDL, DEFAULT_BLOCK_GAP, DEFAULT_BLOCK_PRIO, DEFAULT_BLOCK_SIZE, MAX_BLOCK_SIZE,
};

pub use config::{load_configs, Distribution, GeneratedSpec, RandomSpec, TraceGenConfig, ValueSpec};

fn config_error(e: impl std::fmt::Display) -> TraceError {
    TraceError::Config(e.to_string())
}

fn sample_n<D: rand_distr::Distribution<f64>>(dist: D, rng: &mut StdRng, count: usize) -> Vec<f64> {
    (0..count).map(|_| dist.sample(rng)).collect()
}

/// Draw `count` values from `spec`.
pub fn generate_random(spec: &RandomSpec, count: usize) -> Result<Vec<f64>> {
    let mut rng = match spec.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let values = match &spec.distribution {
        Distribution::Integers { max } => (0..count)
            .map(|_| rng.random_range(0..*max) as f64)
            .collect(),
        Distribution::Choice { choices, probability } => {
            let index = WeightedIndex::new(probability).map_err(config_error)?;
            (0..count).map(|_| choices[index.sample(&mut rng)]).collect()
        }
        Distribution::Uniform { max } => (0..count).map(|_| rng.random_range(0.0..*max)).collect(),
        Distribution::Normal { max } => {
            sample_n(Normal::new(0.0, *max).map_err(config_error)?, &mut rng, count)
        }
        Distribution::Lognormal { max } => {
            sample_n(LogNormal::new(0.0, *max).map_err(config_error)?, &mut rng, count)
        }
        Distribution::Beta { a, b } => sample_n(Beta::new(*a, *b).map_err(config_error)?, &mut rng, count),
        Distribution::Exponential { max } => {
            sample_n(Exp::new(1.0 / *max).map_err(config_error)?, &mut rng, count)
        }
        Distribution::Pareto { a } => {
            // Lomax = classic Pareto with unit scale, shifted to start at 0
            let pareto = Pareto::new(1.0, *a).map_err(config_error)?;
            (0..count).map(|_| pareto.sample(&mut rng) - 1.0).collect()
        }
        Distribution::Poisson { max } => {
            sample_n(Poisson::new(*max).map_err(config_error)?, &mut rng, count)
        }
        Distribution::Binomial { max, p } => {
            let binomial = Binomial::new(*max, *p).map_err(config_error)?;
            (0..count).map(|_| binomial.sample(&mut rng) as f64).collect()
        }
        Distribution::Geometric { p } => {
            // rand_distr counts failures, trials include the success
            let geometric = Geometric::new(*p).map_err(config_error)?;
            (0..count).map(|_| (geometric.sample(&mut rng) + 1) as f64).collect()
        }
        Distribution::NegativeBinomial { p, .. } if *p >= 1.0 => vec![0.0; count],
        Distribution::NegativeBinomial { max, p } => {
            // Gamma-Poisson mixture
            let gamma = Gamma::new(*max, (1.0 - p) / p).map_err(config_error)?;
            let mut values = Vec::with_capacity(count);
            for _ in 0..count {
                let lambda = gamma.sample(&mut rng);
                let value = if lambda > 0.0 {
                    Poisson::new(lambda).map_err(config_error)?.sample(&mut rng)
                } else {
                    0.0
                };
                values.push(value);
            }
            values
        }
    };
    Ok(values)
}

/// Values of one trace column; `None` means every block uses `default`.
pub fn generate_values(spec: Option<&ValueSpec>, count: usize, default: f64) -> Result<Vec<f64>> {
    match spec {
        None => Ok(vec![default; count]),
        Some(ValueSpec::Literal(value)) => Ok(vec![*value; count]),
        Some(ValueSpec::Text(text)) => {
            let value = text
                .trim()
                .parse::<f64>()
                .map_err(|_| TraceError::Config(format!("'{text}' is not a number")))?;
            Ok(vec![value; count])
        }
        Some(ValueSpec::Generated(GeneratedSpec::Seq { seq })) => {
            if seq.is_empty() {
                return Err(TraceError::Config("seq must not be empty".to_string()));
            }
            Ok(seq.iter().copied().cycle().take(count).collect())
        }
        Some(ValueSpec::Generated(GeneratedSpec::Random { random })) => generate_random(random, count),
    }
}

fn to_integer(value: f64, max: u64) -> u64 {
    (value.max(0.0).round() as u64).min(max)
}

/// Write `config.block_num` lines of `gap deadline size priority`.
///
/// Size, deadline and priority are rounded to non-negative integers and
/// negative gaps are clamped to zero so the output always parses back.
pub fn write_trace<W: Write>(config: &TraceGenConfig, writer: &mut W) -> Result<()> {
    let count = config.block_num;
    let sizes = generate_values(config.block_size.as_ref(), count, DEFAULT_BLOCK_SIZE as f64)?;
    let gaps = generate_values(config.block_gap.as_ref(), count, DEFAULT_BLOCK_GAP)?;
    let prios = generate_values(config.block_prio.as_ref(), count, DEFAULT_BLOCK_PRIO as f64)?;
    let ddls = generate_values(config.block_ddl.as_ref(), count, DEFAULT_BLOCK_DDL as f64)?;

    for i in 0..count {
        writeln!(
            writer,
            "{} {} {} {}",
            gaps[i].max(0.0),
            to_integer(ddls[i], u64::MAX),
            to_integer(sizes[i], MAX_BLOCK_SIZE),
            to_integer(prios[i], u32::MAX as u64),
        )?;
    }
    Ok(())
}

pub fn generate_trace(config: &TraceGenConfig) -> Result<PathBuf> {
    let path = config.trace_file_name.clone();
    let file = File::create(&path).map_err(|e| TraceError::io(&path, e))?;
    let mut writer = BufWriter::new(file);
    write_trace(config, &mut writer)?;
    writer.flush()?;
    log!("{} blocks written to {}", config.block_num, path.display());
    Ok(path)
}

/// Generate every trace described in a config file.
pub fn generate_from_file(config_path: &Path) -> Result<Vec<PathBuf>> {
    load_configs(config_path)?.iter().map(generate_trace).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::parse_trace;

    fn random(distribution: Distribution) -> RandomSpec {
        RandomSpec {
            seed: Some(42),
            distribution,
        }
    }

    #[test]
    fn test_defaults_when_fields_missing() {
        let config = TraceGenConfig {
            trace_file_name: PathBuf::from("unused"),
            block_num: 2,
            block_size: None,
            block_gap: None,
            block_prio: None,
            block_ddl: None,
        };
        let mut out = Vec::new();
        write_trace(&config, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "0.001 200 1350 0\n0.001 200 1350 0\n");
    }

    #[test]
    fn test_seq_cycles() {
        let spec = ValueSpec::Generated(GeneratedSpec::Seq { seq: vec![1.0, 2.0] });
        assert_eq!(
            generate_values(Some(&spec), 5, 0.0).unwrap(),
            vec![1.0, 2.0, 1.0, 2.0, 1.0]
        );
    }

    #[test]
    fn test_seed_is_reproducible() {
        let spec = random(Distribution::Normal { max: 5.0 });
        assert_eq!(generate_random(&spec, 20).unwrap(), generate_random(&spec, 20).unwrap());
    }

    #[test]
    fn test_distribution_supports() {
        let integers = generate_random(&random(Distribution::Integers { max: 3 }), 200).unwrap();
        assert!(integers.iter().all(|v| [0.0, 1.0, 2.0].contains(v)));

        let choice = generate_random(
            &random(Distribution::Choice {
                choices: vec![1.0, 2.0],
                probability: vec![0.0, 1.0],
            }),
            50,
        )
        .unwrap();
        assert!(choice.iter().all(|&v| v == 2.0));

        let geometric = generate_random(&random(Distribution::Geometric { p: 0.5 }), 200).unwrap();
        assert!(geometric.iter().all(|&v| v >= 1.0));

        let lomax = generate_random(&random(Distribution::Pareto { a: 3.0 }), 200).unwrap();
        assert!(lomax.iter().all(|&v| v >= 0.0));

        let binomial =
            generate_random(&random(Distribution::Binomial { max: 10, p: 0.3 }), 200).unwrap();
        assert!(binomial.iter().all(|&v| (0.0..=10.0).contains(&v) && v.fract() == 0.0));

        let negbin = generate_random(
            &random(Distribution::NegativeBinomial { max: 5.0, p: 0.5 }),
            200,
        )
        .unwrap();
        assert!(negbin.iter().all(|&v| v >= 0.0 && v.fract() == 0.0));

        let beta = generate_random(&random(Distribution::Beta { a: 2.0, b: 5.0 }), 200).unwrap();
        assert!(beta.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_generated_trace_parses_back() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("gen.json");
        let trace_path = dir.path().join("trace.txt");
        let json = format!(
            r#"[{{
                "trace_file_name": {:?},
                "block_num": 50,
                "block_gap": {{"type": "random", "random": {{"distribution": "normal", "max": 0.01, "seed": 1}}}},
                "block_prio": {{"type": "random", "random": {{"distribution": "choice", "choices": [1, 2], "probability": [0.5, 0.5], "seed": 2}}}},
                "block_ddl": {{"type": "seq", "seq": [100, 200]}}
            }}]"#,
            trace_path.display().to_string()
        );
        std::fs::write(&config_path, json).unwrap();

        let written = generate_from_file(&config_path).unwrap();
        assert_eq!(written, vec![trace_path.clone()]);

        let trace = parse_trace(&trace_path).unwrap();
        assert_eq!(trace.len(), 50);
        assert_eq!(trace.blocks[1].deadline, 200);
        assert!(trace.blocks.iter().all(|b| b.priority == 1 || b.priority == 2));
        assert!(trace.blocks.iter().all(|b| b.size == 1350));
    }

    #[test]
    fn test_bad_config_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("gen.json");
        std::fs::write(&config_path, r#"[{"block_num": 3}]"#).unwrap();
        assert!(matches!(generate_from_file(&config_path), Err(TraceError::Config(_))));
    }
}
