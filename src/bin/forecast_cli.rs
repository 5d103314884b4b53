use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use serde::Serialize;

use demand_forecast_api::{
    ml::load_model,
    models::forecast::{ForecastRequest, ForecastResult},
    services::ForecastingService,
};

#[derive(Parser)]
#[command(
    name = "forecast-cli",
    about = "Run a 15-day store/item sales forecast without the web server",
    version
)]
struct Cli {
    /// Store id (1-10)
    #[arg(long)]
    store: i64,
    /// Item id
    #[arg(long)]
    item: i64,
    /// First forecast day, YYYY-MM-DD
    #[arg(long)]
    date: String,
    /// Path of the serialized demand model
    #[arg(long, default_value = "models/demand_forecast_model.json")]
    model: PathBuf,
    #[arg(
        long,
        action = ArgAction::SetTrue,
        help = "Render the forecast as pretty JSON"
    )]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    demand_forecast_api::config::init_tracing("warn", false);

    let model = load_model(&cli.model)
        .with_context(|| format!("failed to load demand model from {}", cli.model.display()))?;
    let service = ForecastingService::new(model);

    let request = ForecastRequest::from_parts(cli.store, cli.item, &cli.date)?;
    let result = service.forecast(&request)?;

    if cli.json {
        print_json(&result)?;
    } else {
        render_forecast(&result);
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn render_forecast(result: &ForecastResult) {
    println!(
        "Forecast for store {} • item {} • from {}",
        result.store_id, result.item_id, result.start_date
    );
    println!("{:<12} {:>12}", "Date", "Sales");
    for point in &result.points {
        println!("{:<12} {:>12.2}", point.date, point.predicted_sales);
    }
}
