use clap::Parser;
use park_visitation::core::batch::plan_batches;
use park_visitation::core::ConfigProvider;
use park_visitation::utils::{logger, validation::Validate};
use park_visitation::{BulkPipeline, EtlEngine, LocalStorage, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-visitation")]
#[command(about = "Bulk visitation collection driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "visitation.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    /// Dry run - show the batch plan without fetching anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if args.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("Loading configuration from: {}", args.config);

    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config file '{}': {}", args.config, e);
            eprintln!("Make sure the file exists and is valid TOML format");
            std::process::exit(e.exit_code());
        }
    };

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        tracing::error!("Suggestion: {}", e.recovery_suggestion());
        eprintln!("{}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    display_config_summary(&config);

    let storage = LocalStorage::default();

    if args.dry_run {
        tracing::info!("DRY RUN MODE - No requests will be made");
        if let Err(e) = perform_dry_run(&storage, config).await {
            eprintln!("{}", e.user_friendly_message());
            std::process::exit(e.exit_code());
        }
        return;
    }

    let pipeline = BulkPipeline::new(storage, config);
    let engine = EtlEngine::new(pipeline);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("Data collection complete");
            println!("Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "Visitation collection failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("{}", e.user_friendly_message());
            std::process::exit(e.exit_code());
        }
    }
}

fn display_config_summary(config: &TomlConfig) {
    tracing::info!("Endpoint: {}", config.api_endpoint());
    tracing::info!("Parks file: {}", config.parks_file());
    tracing::info!("Output file: {}", config.output_file());
    if let Some(averages_file) = config.averages_file() {
        tracing::info!("Monthly averages file: {}", averages_file);
    }
    tracing::info!("Target years: {:?}", config.target_years());
    tracing::info!(
        "Chunk size: {}, delay between chunks: {:?}",
        config.chunk_size(),
        config.request_delay()
    );
}

async fn perform_dry_run(storage: &LocalStorage, config: TomlConfig) -> park_visitation::Result<()> {
    let pipeline = BulkPipeline::new(storage.clone(), config.clone());
    let codes = pipeline.park_codes().await?;
    let plan = plan_batches(&codes, config.target_years(), config.chunk_size())?;

    for (i, batch) in plan.iter().enumerate() {
        println!(
            "chunk {}: {} ({}-{:02} to {}-{:02})",
            i + 1,
            batch.unit_codes_param(),
            batch.start_year,
            batch.start_month,
            batch.end_year,
            batch.end_month
        );
    }
    tracing::info!("{} park(s) would be fetched in {} request(s)", codes.len(), plan.len());
    Ok(())
}
