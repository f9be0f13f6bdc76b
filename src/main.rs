// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

mod config;
mod opensky;

use std::error::Error;

use alert_engine::{AlertEmitter, ConsoleSink, Scheduler};
use clap::Parser;
use log::{info, warn};
use tokio_util::sync::CancellationToken;

use config::AppConfig;
use opensky::OpenSkyClient;

/// Watch the sky around a fixed location and alert when aircraft come close.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Observer latitude in degrees (overrides config)
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Observer longitude in degrees (overrides config)
    #[arg(long, allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Alert distance in kilometers (overrides config)
    #[arg(long)]
    distance_km: Option<f64>,

    /// Half-width of the queried box in degrees (overrides config)
    #[arg(long)]
    range_deg: Option<f64>,

    /// Run a single poll cycle and exit
    #[arg(long)]
    once: bool,

    /// Print the configuration file path and exit
    #[arg(long)]
    print_config_path: bool,
}

impl Cli {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(lat) = self.lat {
            config.latitude = lat;
        }
        if let Some(lon) = self.lon {
            config.longitude = lon;
        }
        if let Some(distance) = self.distance_km {
            config.alert_distance_km = distance;
        }
        if let Some(range) = self.range_deg {
            config.range_deg = range;
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if cli.print_config_path {
        println!("{}", AppConfig::get_config_path()?.display());
        return Ok(());
    }

    let mut app_config = AppConfig::load()?;
    cli.apply(&mut app_config);

    let alert_config = app_config.alert_config();
    alert_config.validate()?;

    let credentials = app_config.resolve_credentials();
    if credentials.is_none() {
        info!("No OpenSky credentials configured, using anonymous access");
    }
    let client = OpenSkyClient::new(
        &app_config.opensky_api_url,
        credentials,
        app_config.request_timeout(),
    )?;

    let scheduler = Scheduler::new(client, AlertEmitter::new(ConsoleSink), alert_config);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        if cli.once {
            let outcome = scheduler.run_cycle().await;
            info!("Single poll finished: {:?}", outcome);
            return;
        }

        let cancel_token = CancellationToken::new();
        let signal_token = cancel_token.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Interrupt received, shutting down");
                    signal_token.cancel();
                }
                Err(e) => warn!("Failed to listen for interrupt: {}", e),
            }
        });

        scheduler.run(&cancel_token).await;
    });

    Ok(())
}
