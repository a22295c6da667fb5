use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "rate-check")]
#[command(about = "Check carrier list rates, add markup and estimate delivery dates")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// ZIP reference table (zip,lat,lng,state); overrides the config file
    #[arg(long, global = true)]
    pub zip_file: Option<PathBuf>,

    /// Product table; overrides the config file
    #[arg(long, global = true)]
    pub product_file: Option<PathBuf>,

    /// Supplier table; overrides the config file
    #[arg(long, global = true)]
    pub supplier_file: Option<PathBuf>,

    /// Markup rate, e.g. 0.10 for 10%
    #[arg(long, global = true)]
    pub markup_rate: Option<Decimal>,

    /// Print the outcome as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Append the raw carrier response
    #[arg(long, global = true)]
    pub raw: bool,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Rate a package entered directly
    Quote(QuoteArgs),
    /// Rate a catalog product by product number
    Product(ProductArgs),
}

#[derive(Debug, Clone, Args)]
pub struct QuoteArgs {
    #[arg(long, default_value = "53202")]
    pub from_zip: String,

    #[arg(long)]
    pub from_state: Option<String>,

    #[arg(long, default_value = "90210")]
    pub to_zip: String,

    #[arg(long)]
    pub to_state: Option<String>,

    /// Package weight (lb)
    #[arg(long, default_value = "10.0")]
    pub weight: f64,

    /// Length (in)
    #[arg(long, default_value = "10")]
    pub length: f64,

    /// Width (in)
    #[arg(long, default_value = "10")]
    pub width: f64,

    /// Height (in)
    #[arg(long, default_value = "10")]
    pub height: f64,
}

#[derive(Debug, Clone, Args)]
pub struct ProductArgs {
    /// Product number as listed in the product table
    pub product_number: String,

    #[arg(long)]
    pub to_zip: String,

    #[arg(long)]
    pub to_state: Option<String>,
}
