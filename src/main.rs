use clap::Parser;
use park_visitation::utils::{logger, validation::Validate};
use park_visitation::{BulkPipeline, CliConfig, EtlEngine, LocalStorage};

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting bulk visitation data collection for all national parks");
    tracing::info!("Input file: {}", config.parks_file);
    tracing::info!("Output file: {}", config.output_file);
    if let Some(averages_file) = &config.averages_file {
        tracing::info!("Monthly averages file: {}", averages_file);
    }
    tracing::info!("Target years: {:?}", config.years);
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        tracing::error!("Suggestion: {}", e.recovery_suggestion());
        eprintln!("{}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    let storage = LocalStorage::default();
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
