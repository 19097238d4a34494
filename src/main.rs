//! churn-model entrypoint: train an artifact offline, score requests locally against one,
//! or query a remote serving endpoint.

use churn_model::{
    client::PredictionClient,
    config::ChurnConfig,
    logging::StructuredLogger,
    schema::{self, RecordCandidate},
    serving::ServingPipeline,
    training::TrainingPipeline,
};
use clap::{Parser, Subcommand};
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "churn-model", about = "Customer churn prediction")]
struct Cli {
    /// JSON config file (default: $CHURN_CONFIG_PATH, then ./config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fit the preprocessing transform and classifier on the raw tables; write the artifact
    Train {
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Score newline-delimited JSON requests against a local artifact
    Predict {
        #[arg(long)]
        artifact: Option<PathBuf>,
        /// Request file (default: stdin)
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Validate one JSON request and send it to a remote serving endpoint
    Query {
        #[arg(long)]
        endpoint: Option<String>,
        #[arg(long)]
        input: PathBuf,
    },
}

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .clone()
        .or_else(|| std::env::var("CHURN_CONFIG_PATH").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("config.json"));
    let mut config = ChurnConfig::load(&config_path)?;

    StructuredLogger::init(config.log.json, &config.log.level)?;

    match cli.command {
        Command::Train { data_dir, out } => {
            if let Some(dir) = data_dir {
                config.training.data_dir = dir;
            }
            let out = out.unwrap_or_else(|| config.artifact_path.clone());
            info!(snapshot_date = %config.snapshot_date, "training started");
            let pipeline = TrainingPipeline::new(config.training.clone(), config.snapshot_date);
            let artifact = pipeline.run(&out)?;
            info!(
                artifact_id = %artifact.artifact_id,
                path = %out.display(),
                roc_auc = artifact.training_summary.train_roc_auc,
                "training complete"
            );
        }
        Command::Predict { artifact, input } => {
            let path = artifact.unwrap_or_else(|| config.artifact_path.clone());
            let pipeline = ServingPipeline::load(&path)?;
            let reader: Box<dyn BufRead> = match input {
                Some(p) => Box::new(BufReader::new(std::fs::File::open(p)?)),
                None => Box::new(BufReader::new(std::io::stdin())),
            };
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            let (mut served, mut rejected) = (0usize, 0usize);
            for line in reader.lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let response = pipeline.handle_json(&line);
                if response.is_success() {
                    served += 1;
                } else {
                    rejected += 1;
                    warn!(status = response.status, error = %response.body["error"], "request rejected");
                }
                StructuredLogger::emit_json(&response.body, &mut out)?;
            }
            info!(served, rejected, "scoring complete");
        }
        Command::Query { endpoint, input } => {
            if let Some(e) = endpoint {
                config.client.endpoint = e;
            }
            let candidate = RecordCandidate::from_json(&std::fs::read_to_string(&input)?)?;
            let record = schema::validate(&candidate, config.snapshot_date)?;
            let client = PredictionClient::new(&config.client)?;
            info!(endpoint = client.endpoint(), "querying serving endpoint");
            let result = client.predict(&record)?;
            let stdout = std::io::stdout();
            StructuredLogger::emit_json(
                &churn_model::decision::PredictionResponse::from(result),
                &mut stdout.lock(),
            )?;
        }
    }

    Ok(())
}
