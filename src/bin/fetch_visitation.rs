use clap::Parser;
use park_visitation::adapters::DEFAULT_STATS_ENDPOINT;
use park_visitation::utils::{logger, validation::validate_url};
use park_visitation::{fetch_park_year, EtlError, NpsStatsClient};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "fetch-visitation")]
#[command(about = "Print one park's monthly visitation for one year as JSON")]
struct Args {
    /// Park code, e.g. OLYM
    #[arg(short, long, default_value = "OLYM")]
    park: String,

    #[arg(short, long, default_value = "2024")]
    year: i32,

    #[arg(long, default_value = DEFAULT_STATS_ENDPOINT)]
    api_endpoint: String,

    #[arg(long)]
    timeout_seconds: Option<u64>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

async fn run(args: &Args) -> Result<String, EtlError> {
    validate_url("api_endpoint", &args.api_endpoint)?;

    let client = NpsStatsClient::new(args.api_endpoint.clone())
        .with_timeout(args.timeout_seconds.map(Duration::from_secs));
    let record = fetch_park_year(&client, &args.park, args.year).await?;
    Ok(serde_json::to_string_pretty(&record)?)
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    match run(&args).await {
        Ok(json) => println!("{}", json),
        Err(e) => {
            tracing::error!("Fetch failed for {} {}: {}", args.park, args.year, e);
            tracing::error!("Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("{}", e.user_friendly_message());
            // Any failure is fatal for a single-unit fetch.
            std::process::exit(e.exit_code());
        }
    }
}
