// BharatVerse - art, culture and tourism dashboard data layer
// Module declarations

pub mod commands;
pub mod config;
pub mod insights;
pub mod session;
pub mod state;

use config::Config;
use session::Session;

/// Load configuration and data, then print the landing dashboard as JSON
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    simple_logger::init_with_level(config.log_level()?)?;
    log::info!("BharatVerse starting (version {})", env!("CARGO_PKG_VERSION"));

    let source = state::open_source(&config).map_err(|e| {
        log::error!("Data unavailable: {}", e);
        e
    })?;

    let session = Session::load(&*source, &config.datasets, &config.retry).map_err(|e| {
        log::error!("Data unavailable: {}", e);
        e
    })?;

    let landing = commands::landing(&session);
    println!("{}", serde_json::to_string_pretty(&landing)?);

    log::info!("BharatVerse landing view rendered");
    Ok(())
}
