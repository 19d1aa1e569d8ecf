//! proteo-daa - Proteomics Differential Abundance CLI
//!
//! Command-line interface for cleaning protein intensity tables and
//! comparing two sample groups.

use clap::{Parser, Subcommand, ValueEnum};
use proteo_daa::data::{RawIntensityTable, SampleMetadata};
use proteo_daa::error::Result;
use proteo_daa::pipeline::{clean_with, AnalysisConfig, Pipeline};
use proteo_daa::profile::{pca, profile_missingness};
use proteo_daa::progress::LogProgress;
use std::path::{Path, PathBuf};

/// Output format for profile and PCA reports.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human readable text (TSV for PCA)
    Text,
    /// JSON
    Json,
    /// YAML
    Yaml,
}

/// Proteomics Differential Abundance Analysis
#[derive(Parser)]
#[command(name = "proteo-daa")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Only log warnings and errors (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean an intensity table and test treatment against control
    Run {
        /// Path to analysis configuration YAML
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Path to protein intensity table (tab-separated)
        #[arg(short, long)]
        intensities: PathBuf,

        /// Path to sample metadata (sample, condition)
        #[arg(short, long)]
        metadata: PathBuf,

        /// Output path for results TSV
        #[arg(short, long)]
        output: PathBuf,

        /// Also write the clean matrix to this path
        #[arg(long)]
        clean_output: Option<PathBuf>,

        /// Control condition label (overrides config)
        #[arg(long)]
        control: Option<String>,

        /// Treatment condition label (overrides config)
        #[arg(long)]
        treatment: Option<String>,

        /// Ignore intensity columns without metadata
        #[arg(long)]
        allow_unmapped: bool,

        /// Run per-protein tests on a single thread
        #[arg(long)]
        sequential: bool,
    },

    /// Write the clean log2 matrix without testing
    Clean {
        /// Path to analysis configuration YAML (for the table layout)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Path to protein intensity table (tab-separated)
        #[arg(short, long)]
        intensities: PathBuf,

        /// Path to sample metadata (sample, condition)
        #[arg(short, long)]
        metadata: PathBuf,

        /// Output path for the clean matrix TSV
        #[arg(short, long)]
        output: PathBuf,

        /// Ignore intensity columns without metadata
        #[arg(long)]
        allow_unmapped: bool,
    },

    /// Principal component scores of the samples
    Pca {
        /// Path to analysis configuration YAML (for the table layout)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Path to protein intensity table (tab-separated)
        #[arg(short, long)]
        intensities: PathBuf,

        /// Path to sample metadata (sample, condition)
        #[arg(short, long)]
        metadata: PathBuf,

        /// Number of components
        #[arg(short = 'n', long, default_value = "2")]
        components: usize,

        /// Output path for scores TSV (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format when printing to stdout
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Profile missing values of a raw intensity table
    Profile {
        /// Path to analysis configuration YAML (for the table layout)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Path to protein intensity table (tab-separated)
        #[arg(short, long)]
        intensities: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Write an example analysis configuration
    Example {
        /// Output path for the YAML file
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let result = match cli.command {
        Commands::Run {
            config,
            intensities,
            metadata,
            output,
            clean_output,
            control,
            treatment,
            allow_unmapped,
            sequential,
        } => cmd_run(
            config.as_deref(),
            &intensities,
            &metadata,
            &output,
            clean_output.as_deref(),
            control,
            treatment,
            allow_unmapped,
            sequential,
        ),

        Commands::Clean {
            config,
            intensities,
            metadata,
            output,
            allow_unmapped,
        } => cmd_clean(config.as_deref(), &intensities, &metadata, &output, allow_unmapped),

        Commands::Pca {
            config,
            intensities,
            metadata,
            components,
            output,
            format,
        } => cmd_pca(
            config.as_deref(),
            &intensities,
            &metadata,
            components,
            output.as_deref(),
            format,
        ),

        Commands::Profile {
            config,
            intensities,
            format,
        } => cmd_profile(config.as_deref(), &intensities, format),

        Commands::Example { output } => cmd_example(&output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Load the configuration file, or defaults when none is given.
fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    match path {
        Some(path) => {
            log::info!("Loading analysis configuration from {:?}", path);
            AnalysisConfig::from_file(path)
        }
        None => Ok(AnalysisConfig::default()),
    }
}

fn load_inputs(
    config: &AnalysisConfig,
    intensities_path: &Path,
    metadata_path: &Path,
) -> Result<(RawIntensityTable, SampleMetadata)> {
    let raw = RawIntensityTable::from_tsv(intensities_path, &config.layout)?;
    let metadata = SampleMetadata::from_path(metadata_path)?;
    log::info!(
        "Loaded {} rows x {} intensity columns, {} annotated samples",
        raw.n_rows(),
        raw.n_samples(),
        metadata.n_samples()
    );
    Ok((raw, metadata))
}

/// Run the full analysis
#[allow(clippy::too_many_arguments)]
fn cmd_run(
    config_path: Option<&Path>,
    intensities_path: &Path,
    metadata_path: &Path,
    output_path: &Path,
    clean_output: Option<&Path>,
    control: Option<String>,
    treatment: Option<String>,
    allow_unmapped: bool,
    sequential: bool,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(control) = control {
        config.control = control;
    }
    if let Some(treatment) = treatment {
        config.treatment = treatment;
    }
    config.preprocess.allow_unmapped_samples |= allow_unmapped;
    if sequential {
        config.test.parallel = false;
    }

    let (raw, metadata) = load_inputs(&config, intensities_path, metadata_path)?;

    let output = Pipeline::from_config(&config).run_with_progress(&raw, &metadata, &LogProgress)?;
    eprintln!("{}", output.report);

    if let Some(path) = clean_output {
        log::info!("Writing clean matrix to {:?}", path);
        output.clean.to_tsv(path)?;
    }

    log::info!("Writing results to {:?}", output_path);
    output.results.to_tsv(output_path)?;

    let summary = output.results.summary(config.alpha, config.fc_threshold);
    eprintln!("{}", summary);

    let top: Vec<_> = output
        .results
        .sorted_by_adj_pvalue()
        .into_iter()
        .filter(|r| r.is_defined())
        .take(5)
        .collect();
    if !top.is_empty() {
        eprintln!("Top {} hits:", top.len());
        for r in top {
            eprintln!(
                "  {}: log2FC={:.3}, p={:.4e}, adj_p={:.4}",
                r.protein_id, r.log2_fold_change, r.p_value, r.adj_p_value
            );
        }
    }

    Ok(())
}

/// Write the clean matrix only
fn cmd_clean(
    config_path: Option<&Path>,
    intensities_path: &Path,
    metadata_path: &Path,
    output_path: &Path,
    allow_unmapped: bool,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    config.preprocess.allow_unmapped_samples |= allow_unmapped;

    let (raw, metadata) = load_inputs(&config, intensities_path, metadata_path)?;
    let cleaned = clean_with(&raw, &metadata, &config.preprocess, &LogProgress)?;
    eprintln!("{}", cleaned.report);

    log::info!("Writing clean matrix to {:?}", output_path);
    cleaned.matrix.to_tsv(output_path)?;
    Ok(())
}

/// Principal component scores of the clean matrix
fn cmd_pca(
    config_path: Option<&Path>,
    intensities_path: &Path,
    metadata_path: &Path,
    components: usize,
    output_path: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let config = load_config(config_path)?;
    let (raw, metadata) = load_inputs(&config, intensities_path, metadata_path)?;
    let cleaned = clean_with(&raw, &metadata, &config.preprocess, &LogProgress)?;
    let result = pca(&cleaned.matrix, components)?;

    for (k, ratio) in result.explained_variance_ratio.iter().enumerate() {
        log::info!("PC{}: {:.1}% of variance", k + 1, ratio * 100.0);
    }

    if let Some(path) = output_path {
        log::info!("Writing PCA scores to {:?}", path);
        return result.to_tsv(path);
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&result)?),
        OutputFormat::Text => {
            let header: Vec<String> = (1..=result.n_components())
                .map(|k| format!("PC{}", k))
                .collect();
            println!("sample_id\t{}", header.join("\t"));
            for (sample_id, scores) in result.sample_ids.iter().zip(&result.scores) {
                let row: Vec<String> = scores.iter().map(|s| format!("{:.6}", s)).collect();
                println!("{}\t{}", sample_id, row.join("\t"));
            }
        }
    }
    Ok(())
}

/// Profile missing values of the raw table
fn cmd_profile(config_path: Option<&Path>, intensities_path: &Path, format: OutputFormat) -> Result<()> {
    let config = load_config(config_path)?;
    let raw = RawIntensityTable::from_tsv(intensities_path, &config.layout)?;
    let profile = profile_missingness(&raw);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&profile)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&profile)?),
        OutputFormat::Text => {
            print!("{}", profile);
            println!();
            println!("Per-sample missing:");
            for (sample_id, fraction) in raw.sample_ids().iter().zip(&profile.sample_missing) {
                println!("  {:<20} {:.1}%", sample_id, fraction * 100.0);
            }
            if profile.is_highly_missing() {
                log::warn!("more than half of all intensities are missing");
            }
        }
    }
    Ok(())
}

/// Write an example configuration
fn cmd_example(output_path: &Path) -> Result<()> {
    let yaml = AnalysisConfig::example().to_yaml()?;

    std::fs::write(output_path, &yaml)?;
    log::info!("Wrote example configuration to {:?}", output_path);
    println!("{}", yaml);

    Ok(())
}
