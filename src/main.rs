//! Anomaly Detector - command line entry point

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use anomaly_detector::constants::APP_VERSION;
use anomaly_detector::logic::model::{ModelKind, OutputActivation};
use anomaly_detector::{score, train, PipelineConfig};

#[derive(Parser)]
#[command(name = "anomaly-detector", version = APP_VERSION)]
#[command(about = "Train and apply a reconstruction-error anomaly detector")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fit normalizer, model and threshold; publish the bundle
    Train(TrainArgs),
    /// Score a CSV against a published bundle
    Score(ScoreArgs),
}

#[derive(Args)]
struct TrainArgs {
    /// Training CSV
    #[arg(long)]
    data: Option<PathBuf>,

    /// Bundle directory
    #[arg(long)]
    artifacts: Option<PathBuf>,

    #[arg(long)]
    split_ratio: Option<f64>,

    #[arg(long)]
    split_seed: Option<u64>,

    #[arg(long)]
    threshold_multiplier: Option<f64>,

    #[arg(long)]
    label_column: Option<String>,

    #[arg(long, value_enum)]
    model: Option<ModelKind>,

    /// Activation of the autoencoder's output layer
    #[arg(long, value_enum)]
    output_activation: Option<OutputActivation>,

    #[arg(long)]
    epochs: Option<usize>,

    #[arg(long)]
    batch_size: Option<usize>,

    #[arg(long)]
    learning_rate: Option<f64>,

    /// Early stopping patience (epochs without validation improvement)
    #[arg(long)]
    patience: Option<usize>,

    /// PCA components
    #[arg(long)]
    components: Option<usize>,
}

#[derive(Args)]
struct ScoreArgs {
    /// CSV to score
    #[arg(long)]
    data: Option<PathBuf>,

    /// Bundle directory
    #[arg(long)]
    artifacts: Option<PathBuf>,

    /// Scored CSV destination
    #[arg(long)]
    output: Option<PathBuf>,

    #[arg(long)]
    label_column: Option<String>,
}

impl TrainArgs {
    fn apply(self, config: &mut PipelineConfig) {
        if let Some(v) = self.data {
            config.data_path = v;
        }
        if let Some(v) = self.artifacts {
            config.artifact_dir = v;
        }
        if let Some(v) = self.split_ratio {
            config.split_ratio = v;
        }
        if let Some(v) = self.split_seed {
            config.split_seed = v;
        }
        if let Some(v) = self.threshold_multiplier {
            config.threshold_multiplier = v;
        }
        if let Some(v) = self.label_column {
            config.label_column = v;
        }
        if let Some(v) = self.model {
            config.training.model = v;
        }
        if let Some(v) = self.output_activation {
            config.training.output_activation = v;
        }
        if let Some(v) = self.epochs {
            config.training.epochs = v;
        }
        if let Some(v) = self.batch_size {
            config.training.batch_size = v;
        }
        if let Some(v) = self.learning_rate {
            config.training.learning_rate = v;
        }
        if let Some(v) = self.patience {
            config.training.patience = Some(v);
        }
        if let Some(v) = self.components {
            config.training.pca_components = v;
        }
    }
}

impl ScoreArgs {
    fn apply(self, config: &mut PipelineConfig) {
        if let Some(v) = self.data {
            config.data_path = v;
        }
        if let Some(v) = self.artifacts {
            config.artifact_dir = v;
        }
        if let Some(v) = self.output {
            config.output_path = v;
        }
        if let Some(v) = self.label_column {
            config.label_column = v;
        }
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = PipelineConfig::from_env().context("Failed to read configuration from environment")?;

    log::info!("Starting Anomaly Detector v{}", APP_VERSION);

    let report = match cli.command {
        Command::Train(args) => {
            args.apply(&mut config);
            config.validate().context("Invalid configuration")?;
            let summary = train(&config)
                .with_context(|| format!("Training failed for {}", config.data_path.display()))?;
            serde_json::to_string_pretty(&summary)?
        }
        Command::Score(args) => {
            args.apply(&mut config);
            config.validate().context("Invalid configuration")?;
            let summary = score(&config)
                .with_context(|| format!("Scoring failed for {}", config.data_path.display()))?;
            serde_json::to_string_pretty(&summary)?
        }
    };

    println!("{}", report);
    Ok(())
}
