//! Weather station VFD driver.
//!
//! Opens the three displays, shows "Running..." and then refreshes them from
//! the observation API every few minutes during the active hours, until
//! SIGINT or SIGTERM.
//!
//! # Configuration
//!
//! ```bash
//! # Station and key are required
//! WU_STATION_ID=KXXCITY12 WU_API_KEY=... vfd_weather
//!
//! # Different ports
//! VFD_TOP=/dev/ttyUSB0 VFD_MIDDLE=/dev/ttyUSB1 VFD_BOTTOM=/dev/ttyUSB2 vfd_weather
//!
//! # Full JSON config (environment still overrides it)
//! VFD_WEATHER_CONFIG=/etc/vfd-weather.json vfd_weather
//!
//! # More logging
//! RUST_LOG=vfd_weather=debug vfd_weather
//! ```

use anyhow::{Context, Result};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use vfd_weather::hal::{SerialOpener, SystemClock, ThreadDelay, UreqClient};
use vfd_weather::{Config, Scheduler, TracingObserver};

/// Environment variable naming a JSON config file.
const CONFIG_PATH_ENV: &str = "VFD_WEATHER_CONFIG";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "vfd-weather starting");

    let config = load_config()?;
    if !config.api.is_configured() {
        warn!("WU_STATION_ID / WU_API_KEY not set, every fetch will fail");
    }

    let shutdown = setup_shutdown_handler()?;

    let mut scheduler = Scheduler::from_config(
        &config,
        SerialOpener::new(config.displays.baud_rate),
        UreqClient::new(),
        SystemClock,
        ThreadDelay,
        TracingObserver,
    );

    let failures = scheduler.start();
    if failures.len() == 3 {
        warn!("no display could be initialized, continuing anyway");
    }

    scheduler.run(&shutdown);
    scheduler.close();

    info!("vfd-weather stopped");
    Ok(())
}

fn load_config() -> Result<Config> {
    let Ok(path) = std::env::var(CONFIG_PATH_ENV) else {
        return Config::from_env().context("Invalid configuration in environment");
    };

    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file {}", path))?;
    let config = Config::from_json(&text)
        .with_context(|| format!("Failed to parse config file {}", path))?;
    info!(path = %path, "config file loaded");

    config
        .with_overrides(|var| std::env::var(var).ok())
        .context("Invalid configuration in environment")
}

fn setup_shutdown_handler() -> Result<Arc<AtomicBool>> {
    let shutdown = Arc::new(AtomicBool::new(false));

    signal_hook::flag::register(signal_hook::consts::SIGTERM, Arc::clone(&shutdown))
        .context("Failed to register SIGTERM handler")?;
    signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&shutdown))
        .context("Failed to register SIGINT handler")?;

    info!("Shutdown handlers registered");
    Ok(shutdown)
}
