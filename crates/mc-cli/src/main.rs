//! microcause CLI

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use mc_core::{Regressor, Table};
use mc_inference::{
    estimate_effect, simulate_table, with_log_ratio, FoldStrategy, MeanRegressor, OlsRegressor,
    PlrConfig, SimulationConfig,
};

#[derive(Parser)]
#[command(name = "microcause")]
#[command(about = "microcause - causal effect estimation for microbiome tables")]
#[command(version)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Commands,
}

/// Nuisance regression method for the covariate adjustment.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum RegressorKind {
    /// Ordinary least squares with an intercept.
    Ols,
    /// Training-sample mean (no covariate adjustment).
    Mean,
}

impl RegressorKind {
    fn build(self) -> Box<dyn Regressor> {
        match self {
            RegressorKind::Ols => Box::new(OlsRegressor::default()),
            RegressorKind::Mean => Box::new(MeanRegressor),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate a causal effect by cross-fitted residualization
    Estimate {
        /// Input table (CSV with a header row)
        #[arg(short, long)]
        input: PathBuf,

        /// Exposure variable
        #[arg(long)]
        exposure: Option<String>,

        /// Outcome variable
        #[arg(long)]
        outcome: String,

        /// Comma-separated adjustment covariates
        #[arg(long, value_delimiter = ',')]
        covariates: Vec<String>,

        /// Number of cross-fitting folds (1 = in-sample residuals)
        #[arg(long, default_value = "5")]
        folds: usize,

        /// Shuffle fold assignment with this seed (round-robin if omitted)
        #[arg(long)]
        shuffle_seed: Option<u64>,

        /// Nuisance regression method
        #[arg(long, value_enum, default_value = "ols")]
        regressor: RegressorKind,

        /// Derive a log-ratio exposure, e.g. `BugA/BugD`
        #[arg(long)]
        log_ratio: Option<String>,

        /// Output file for results (pretty JSON). Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate a synthetic microbiome dataset as CSV
    Simulate {
        /// Number of records
        #[arg(long, default_value = "400")]
        n: usize,

        /// RNG seed
        #[arg(long, default_value = "1")]
        seed: u64,

        /// Output CSV file. Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Per-column summary statistics for a CSV table
    Describe {
        /// Input table (CSV with a header row)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file for results (pretty JSON). Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt().with_max_level(cli.log_level).with_target(false).init();

    match cli.command {
        Commands::Estimate {
            input,
            exposure,
            outcome,
            covariates,
            folds,
            shuffle_seed,
            regressor,
            log_ratio,
            output,
        } => cmd_estimate(
            &input,
            exposure.as_deref(),
            &outcome,
            &covariates,
            folds,
            shuffle_seed,
            regressor,
            log_ratio.as_deref(),
            output.as_ref(),
        ),
        Commands::Simulate { n, seed, output } => cmd_simulate(n, seed, output.as_ref()),
        Commands::Describe { input, output } => cmd_describe(&input, output.as_ref()),
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_estimate(
    input: &PathBuf,
    exposure: Option<&str>,
    outcome: &str,
    covariates: &[String],
    folds: usize,
    shuffle_seed: Option<u64>,
    regressor: RegressorKind,
    log_ratio: Option<&str>,
    output: Option<&PathBuf>,
) -> Result<()> {
    let mut table = load_table(input)?;

    let exposure = match (exposure, log_ratio) {
        (_, Some(ratio)) => {
            if exposure.is_some() {
                tracing::warn!("--exposure ignored in favour of the --log-ratio column");
            }
            let (num, den) = ratio
                .split_once('/')
                .context("--log-ratio must look like NUMERATOR/DENOMINATOR, e.g. BugA/BugD")?;
            let (derived, name) = with_log_ratio(&table, num, den)?;
            tracing::info!(column = %name, "derived log-ratio exposure");
            table = derived;
            name
        }
        (Some(e), None) => e.to_string(),
        (None, None) => bail!("provide --exposure or --log-ratio"),
    };

    let folding = match shuffle_seed {
        Some(seed) => FoldStrategy::Shuffled { seed },
        None => FoldStrategy::RoundRobin,
    };
    let config = PlrConfig { n_folds: folds, folding, include_intercept: false };
    let regressor = regressor.build();

    let covariate_refs: Vec<&str> = covariates.iter().map(String::as_str).collect();
    let est =
        estimate_effect(&table, &exposure, outcome, &covariate_refs, regressor.as_ref(), &config)?;
    tracing::info!(theta = est.theta, se = est.se, "estimate complete");

    let (ci_lo, ci_hi) = est.confidence_interval95();
    let output_json = serde_json::json!({
        "exposure": exposure,
        "outcome": outcome,
        "covariates": covariates,
        "n_obs": est.n_obs,
        "n_folds": est.n_folds,
        "regressor": est.regressor,
        "theta": est.theta,
        "se": est.se,
        "t_stat": est.t_stat,
        "p_value": est.p_value,
        "ci95": [ci_lo, ci_hi],
        "exposure_residuals": est.exposure_residuals,
        "outcome_residuals": est.outcome_residuals,
    });

    write_json(output, &output_json)
}

fn cmd_simulate(n: usize, seed: u64, output: Option<&PathBuf>) -> Result<()> {
    let table = simulate_table(&SimulationConfig { n, seed, ..Default::default() })?;
    tracing::info!(n = table.n_rows(), seed, "simulated dataset");

    match output {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("cannot create {}", path.display()))?;
            write_table_csv(&table, file)?;
            eprintln!("Wrote {}", path.display());
        }
        None => write_table_csv(&table, std::io::stdout())?,
    }
    Ok(())
}

fn cmd_describe(input: &PathBuf, output: Option<&PathBuf>) -> Result<()> {
    let table = load_table(input)?;

    let columns: Vec<serde_json::Value> = table
        .names()
        .iter()
        .map(|name| {
            let values = table.column(name).expect("name comes from the table");
            let (mean, sd, min, max) = column_summary(values);
            serde_json::json!({
                "column": name,
                "n": values.len(),
                "mean": mean,
                "sd": sd,
                "min": min,
                "max": max,
            })
        })
        .collect();

    let output_json = serde_json::json!({
        "n_rows": table.n_rows(),
        "n_cols": table.n_cols(),
        "columns": columns,
    });
    write_json(output, &output_json)
}

/// Mean, sample standard deviation, min, and max of a column.
fn column_summary(values: &[f64]) -> (f64, f64, f64, f64) {
    let n = values.len();
    if n == 0 {
        return (f64::NAN, f64::NAN, f64::NAN, f64::NAN);
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let sd = if n > 1 {
        (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64).sqrt()
    } else {
        f64::NAN
    };
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    (mean, sd, min, max)
}

fn load_table(input: &PathBuf) -> Result<Table> {
    tracing::info!(path = %input.display(), "loading table");
    let file = std::fs::File::open(input)
        .with_context(|| format!("cannot open {}", input.display()))?;
    let table = table_from_reader(file)?;
    tracing::info!(rows = table.n_rows(), columns = table.n_cols(), "table loaded");
    Ok(table)
}

/// Read a CSV with a header row into a numeric [`Table`].
///
/// Columns whose every cell parses as `f64` become table columns; label
/// columns (e.g. a `Patient` id) are skipped with a warning.
fn table_from_reader<R: std::io::Read>(reader: R) -> Result<Table> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
    if headers.is_empty() {
        bail!("CSV has no header row");
    }

    let mut raw: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        if record.len() != headers.len() {
            bail!("record {} has {} fields, expected {}", i + 1, record.len(), headers.len());
        }
        for (j, field) in record.iter().enumerate() {
            raw[j].push(field.to_string());
        }
    }

    let mut table = Table::new();
    for (name, cells) in headers.iter().zip(raw) {
        let parsed: Option<Vec<f64>> = cells.iter().map(|c| c.parse::<f64>().ok()).collect();
        match parsed {
            Some(values) => table.add_column(name, values)?,
            None => tracing::warn!(column = %name, "skipping non-numeric column"),
        }
    }
    if table.n_cols() == 0 {
        bail!("no numeric columns found");
    }
    Ok(table)
}

fn write_table_csv<W: std::io::Write>(table: &Table, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = vec!["Patient".to_string()];
    header.extend(table.names().iter().cloned());
    wtr.write_record(&header)?;

    for i in 0..table.n_rows() {
        let mut record = vec![format!("S{}", i + 1)];
        for name in table.names() {
            let col = table.column(name).expect("name comes from the table");
            record.push(col[i].to_string());
        }
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_json(output: Option<&PathBuf>, value: &serde_json::Value) -> Result<()> {
    if let Some(path) = output {
        std::fs::write(path, serde_json::to_string_pretty(value)?)?;
    } else {
        println!("{}", serde_json::to_string_pretty(value)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOY_CSV: &str = "\
Patient,Diet,BugA,BugB,BugC,BugD,Metabolite,Tumor
P1,0,0.10,0.50,0.25,0.15,1.18,61.0
P2,0,0.15,0.45,0.22,0.18,1.33,59.0
P3,1,0.40,0.25,0.20,0.15,2.08,52.5
P4,1,0.45,0.20,0.18,0.17,2.28,47.5
";

    #[test]
    fn test_table_from_reader_skips_label_columns() {
        let table = table_from_reader(TOY_CSV.as_bytes()).unwrap();
        assert_eq!(table.n_rows(), 4);
        // Patient is a label column and gets skipped.
        assert!(table.column("Patient").is_none());
        assert_eq!(table.n_cols(), 7);
        assert_eq!(table.column("BugA"), Some(&[0.10, 0.15, 0.40, 0.45][..]));
        assert_eq!(table.column("Tumor"), Some(&[61.0, 59.0, 52.5, 47.5][..]));
    }

    #[test]
    fn test_table_from_reader_rejects_ragged_records() {
        let csv = "a,b\n1,2\n3\n";
        assert!(table_from_reader(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_table_from_reader_rejects_all_label_table() {
        let csv = "a,b\nx,y\n";
        assert!(table_from_reader(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_column_summary() {
        let (mean, sd, min, max) = column_summary(&[1.0, 2.0, 3.0, 4.0]);
        assert!((mean - 2.5).abs() < 1e-12);
        assert!((sd - (5.0_f64 / 3.0).sqrt()).abs() < 1e-12);
        assert!((min - 1.0).abs() < 1e-12);
        assert!((max - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_csv_round_trip_through_writer() {
        let table = table_from_reader(TOY_CSV.as_bytes()).unwrap();
        let mut buf = Vec::new();
        write_table_csv(&table, &mut buf).unwrap();
        let back = table_from_reader(buf.as_slice()).unwrap();
        assert_eq!(back.n_rows(), 4);
        assert_eq!(back.column("Diet"), table.column("Diet"));
    }
}
