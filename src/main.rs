mod config;
mod handler;
mod pipeline;
mod pubmed;
mod text;
mod tgi;

pub const USER_AGENT: &str = concat!("medq/", env!("CARGO_PKG_VERSION"));

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use reqwest::Client;
use tracing::info;

use config::Config;
use pipeline::Pipeline;
use pubmed::PubMedClient;
use tgi::{DecodeConfig, TgiClient};

/// TCP connection establishment timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Global HTTP client timeout; individual requests set tighter ones.
const HTTP_TIMEOUT: Duration = Duration::from_secs(300);

/// Decoding bounds for the keyword-extraction stage. Kept short and
/// low-temperature so the model emits bare search terms rather than prose.
const KEYWORD_MAX_NEW_TOKENS: u32 = 100;
const KEYWORD_TEMPERATURE: f32 = 0.3;

#[derive(Parser)]
#[command(
    name = "medq",
    version,
    about = "LLM-augmented Q&A over PubMed literature search"
)]
struct Cli {
    /// Biomedical question to answer
    question: String,

    /// Path to the JSON configuration file
    #[arg(long, default_value = "config.json")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("medq=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    info!(tool = %config.pubmed.tool, max_results = config.pubmed.max_results, "PubMed search configured");
    info!(model = %config.models.answer_generator, "answer model configured");

    let http = Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(HTTP_TIMEOUT)
        .build()?;

    let literature = PubMedClient::from_env(http.clone(), &config.pubmed.tool)?;

    let keyword_llm = TgiClient::from_env(
        http.clone(),
        &config.models.keyword_generator,
        DecodeConfig::new()
            .with_max_new_tokens(KEYWORD_MAX_NEW_TOKENS)
            .with_temperature(KEYWORD_TEMPERATURE),
    )?;
    let answer_llm = TgiClient::from_env(
        http,
        &config.models.answer_generator,
        DecodeConfig::from(&config.generation),
    )?;

    info!("warming up generation models (this may take a moment)");
    keyword_llm.warm_up().await?;
    answer_llm.warm_up().await?;

    // Request-scoped decode overrides for the answer stage, merged over the
    // client's defaults at generation time.
    let answer_overrides = DecodeConfig::new()
        .with_max_new_tokens(config.generation.max_new_tokens)
        .with_temperature(config.generation.temperature);

    let pipeline = Pipeline::new(
        keyword_llm,
        answer_llm,
        literature,
        config.pubmed.max_results,
        answer_overrides,
    );

    let reply = handler::answer(&pipeline, &config.models.answer_generator, &cli.question).await;
    println!("{reply}");
    Ok(())
}
