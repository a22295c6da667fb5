use anyhow::Context;
use clap::Parser;
use rate_checker::config::cli::{Command, ProductArgs, QuoteArgs};
use rate_checker::core::presentation::render_outcome;
use rate_checker::core::shipment::{direct_shipment, product_shipment};
use rate_checker::domain::model::{Dimensions, RateCheckOutcome, ShipmentRequest};
use rate_checker::utils::{logger, validation::Validate};
use rate_checker::{
    CliConfig, FedexClient, ProductCatalog, RateCheckEngine, RateConfig, RateError,
    SupplierDirectory, ZipDirectory,
};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting rate-check");

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration failed: {:#}", e);
            eprintln!("❌ {:#}", e);
            std::process::exit(1);
        }
    };
    tracing::debug!("Config: {:?}", config);

    let zips = match load_zips(&config) {
        Ok(zips) => zips,
        Err(e) => {
            eprintln!("❌ {:#}", e);
            std::process::exit(1);
        }
    };

    match run(&cli, config, zips).await {
        Ok(outcome) => print_outcome(&cli, &outcome),
        Err(e) => {
            tracing::error!(
                "❌ Rate check failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            std::process::exit(e.severity().exit_code());
        }
    }
}

fn load_config(cli: &CliConfig) -> anyhow::Result<RateConfig> {
    let mut config = match &cli.config {
        Some(path) => RateConfig::from_file(path)
            .with_context(|| format!("failed to load config file '{}'", path.display()))?,
        None => RateConfig::default(),
    }
    .with_env_credentials();

    // 命令列覆蓋設定
    if let Some(path) = &cli.zip_file {
        config.reference_data.zip_file = Some(path.clone());
    }
    if let Some(path) = &cli.product_file {
        config.reference_data.product_file = Some(path.clone());
    }
    if let Some(path) = &cli.supplier_file {
        config.reference_data.supplier_file = Some(path.clone());
    }
    if let Some(rate) = cli.markup_rate {
        config.pricing.markup_rate = rate;
    }

    config.validate().context("configuration is invalid")?;
    Ok(config)
}

fn load_zips(config: &RateConfig) -> anyhow::Result<ZipDirectory> {
    match &config.reference_data.zip_file {
        Some(path) => ZipDirectory::from_csv_path(path)
            .with_context(|| format!("failed to load ZIP table '{}'", path.display())),
        None => {
            tracing::warn!("No ZIP table configured; ground estimates assume the longest transit");
            Ok(ZipDirectory::default())
        }
    }
}

fn quote_shipment(zips: &ZipDirectory, args: &QuoteArgs) -> Result<ShipmentRequest, RateError> {
    direct_shipment(
        zips,
        &args.from_zip,
        &args.to_zip,
        args.weight,
        Dimensions::new(args.length, args.width, args.height),
        args.from_state.clone(),
        args.to_state.clone(),
    )
}

fn catalog_shipment(
    config: &RateConfig,
    zips: &ZipDirectory,
    args: &ProductArgs,
) -> Result<ShipmentRequest, RateError> {
    let product_file =
        config
            .reference_data
            .product_file
            .as_ref()
            .ok_or_else(|| RateError::MissingConfig {
                field: "reference_data.product_file".to_string(),
            })?;
    let products = ProductCatalog::from_csv_path(product_file)?;
    let suppliers = match &config.reference_data.supplier_file {
        Some(path) => SupplierDirectory::from_csv_path(path)?,
        None => SupplierDirectory::default(),
    };

    product_shipment(
        &products,
        &suppliers,
        zips,
        &args.product_number,
        &args.to_zip,
        args.to_state.clone(),
    )
}

async fn run(
    cli: &CliConfig,
    config: RateConfig,
    zips: ZipDirectory,
) -> Result<RateCheckOutcome, RateError> {
    let shipment = match &cli.command {
        Command::Quote(args) => quote_shipment(&zips, args)?,
        Command::Product(args) => catalog_shipment(&config, &zips, args)?,
    };

    let pricing = config.pricing_policy();
    let carrier = FedexClient::new(config.carrier)?;
    let engine = RateCheckEngine::new(carrier, zips, pricing);

    let ship_date = chrono::Local::now().date_naive();
    engine.run(&shipment, ship_date).await
}

fn print_outcome(cli: &CliConfig, outcome: &RateCheckOutcome) {
    if cli.json {
        match serde_json::to_string_pretty(outcome) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("❌ Could not serialize outcome: {}", e),
        }
    } else {
        print!("{}", render_outcome(outcome, cli.raw));
    }
}
