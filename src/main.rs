//! psebench CLI entry point

use clap::Parser;
use std::path::{Path, PathBuf};
use log::{debug, error};

use psebench::config::{BASE_MODEL_VAR, SHIFT_MODEL_VAR, RunConfig};

/// Input file path, fixed relative to the working directory
const PROMPT_FILE: &str = "prompts.yml";

#[derive(Parser)]
#[command(name = "psebench")]
#[command(about = "Perspective Shift Effect benchmark", long_about = None)]
#[command(version)]
struct Cli
{   /// Maximum tokens for generation
    #[arg(long = "max_tokens", default_value_t = 128)]
    max_tokens: u32

  , /// Sampling temperature
    #[arg(long = "temp", default_value_t = 0.7)]
    temp: f64

  , /// Output CSV path
    #[arg(long = "out", default_value = "results.csv")]
    out: PathBuf
}

#[tokio::main]
async fn main()
{   env_logger::init();

    if let Err(e) = run().await
    {   error!("Benchmark aborted: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), psebench::error::Error>
{   let cli = Cli::parse();

    let config = RunConfig::from_sources(
      std::env::var(BASE_MODEL_VAR).ok()
    , std::env::var(SHIFT_MODEL_VAR).ok()
    , cli.max_tokens
    , cli.temp
    , cli.out
    )?;
    debug!("Run configuration: {:?}", config);

    let prompts = psebench::load_prompts(Path::new(PROMPT_FILE))?;

    let client = psebench::ChatClient::new(
      std::env::var("OPENAI_API_KEY").ok()
    , std::env::var("OPENAI_API_BASE").ok()
    );

    let records = psebench::evaluate(&client, &prompts, &config).await?;
    psebench::summarize(&records, &config.output_path)
}
