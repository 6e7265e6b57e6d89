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
mod globe;
mod panels;

use std::error::Error;
use std::time::Duration;

use airspace_client::{
    spawn_tracker, FeedStatus, HttpFlightFeed, RefreshScheduler, SharedScene,
};
use clap::{Parser, Subcommand};
use config::AppConfig;
use eframe::egui;
use globe::GlobeView;
use log::{debug, info, warn};
use panels::{FlightPanel, PanelAction};
use tokio::sync::watch;

#[derive(Parser, Debug)]
#[command(name = "airspace-live")]
#[command(version, about = "Live flight tracking on an interactive globe", long_about = None)]
struct Cli {
    /// Flight API base URL (overrides the config file)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Seconds between refreshes (overrides the config file)
    #[arg(long, global = true)]
    interval: Option<u64>,

    /// Keep flights that lose their position at their last known location
    #[arg(long, global = true)]
    retain_unknown: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Command {
    /// Open the globe window (default)
    Gui,
    /// Poll the feed and log each refresh without opening a window
    Headless,
    /// Print the details of one flight
    Show {
        /// Flight identifier
        flight_id: String,
    },
    /// Search flights by flight number, callsign, or airport
    Search {
        query: String,
    },
}

impl Cli {
    /// Apply command line overrides for this run only
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(url) = &self.api_url {
            config.api_base_url.clone_from(url);
        }
        if let Some(interval) = self.interval {
            config.refresh_interval_secs = interval;
        }
        if self.retain_unknown {
            config.retain_unknown_positions = true;
        }
    }
}

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    // Renderer backends are chatty at info
    builder
        .filter_module("wgpu_core", log::LevelFilter::Warn)
        .filter_module("wgpu_hal", log::LevelFilter::Warn)
        .filter_module("naga", log::LevelFilter::Warn);
    if verbose {
        builder.filter_module("airspace_live", log::LevelFilter::Debug);
        builder.filter_module("airspace_client", log::LevelFilter::Debug);
    }
    builder.init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let stored = AppConfig::load().unwrap_or_else(|e| {
        warn!("Failed to load config, using defaults: {e}");
        AppConfig::default()
    });
    if let Ok(path) = AppConfig::get_config_path() {
        debug!("Config file: {}", path.display());
    }

    let mut config = stored.clone();
    cli.apply_overrides(&mut config);

    match cli.command.unwrap_or(Command::Gui) {
        Command::Gui => run_gui(stored, &config),
        Command::Headless => run_headless(&config),
        Command::Show { flight_id } => run_show(&config, &flight_id),
        Command::Search { query } => run_search(&config, &query),
    }
}

fn run_gui(stored: AppConfig, config: &AppConfig) -> Result<(), Box<dyn Error>> {
    info!("Starting AirSpace Live...");

    let runtime = tokio::runtime::Runtime::new()?;
    let _guard = runtime.enter();

    let scene = SharedScene::new();
    let scheduler = spawn_tracker(&config.tracker_config(), scene.clone())?;
    info!(
        "Polling {} every {}s",
        config.api_base_url,
        config.refresh_interval().as_secs()
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_title("AirSpace Live"),
        ..Default::default()
    };

    eframe::run_native(
        "AirSpace Live",
        options,
        Box::new(move |_cc| Ok(Box::new(AirspaceApp::new(scheduler, scene, stored)))),
    )?;

    Ok(())
}

fn run_headless(config: &AppConfig) -> Result<(), Box<dyn Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let scene = SharedScene::new();
        let mut scheduler = spawn_tracker(&config.tracker_config(), scene.clone())?;
        info!(
            "Polling {} every {}s, press Ctrl-C to stop",
            config.api_base_url,
            config.refresh_interval().as_secs()
        );

        let mut status = scheduler.subscribe();
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                changed = status.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snapshot = status.borrow_and_update().clone();
                    info!("{}", summarize(&snapshot, scene.len()));
                }
                _ = &mut ctrl_c => {
                    info!("Interrupted, shutting down");
                    break;
                }
            }
        }

        scheduler.shutdown().await;
        let cleared = scene.clear();
        debug!("Cleared {cleared} entities");
        Ok::<(), Box<dyn Error>>(())
    })
}

fn run_show(config: &AppConfig, flight_id: &str) -> Result<(), Box<dyn Error>> {
    let feed = HttpFlightFeed::new(&config.tracker_config().feed)?;
    let runtime = tokio::runtime::Runtime::new()?;
    let flight = runtime.block_on(feed.fetch_by_id(flight_id))?;

    println!("{}", flight.description());
    match flight.position() {
        Some(position) => println!("Position: {position}"),
        None => println!("Position: unknown"),
    }
    Ok(())
}

fn run_search(config: &AppConfig, query: &str) -> Result<(), Box<dyn Error>> {
    let feed = HttpFlightFeed::new(&config.tracker_config().feed)?;
    let runtime = tokio::runtime::Runtime::new()?;
    let flights = runtime.block_on(feed.search(query))?;

    if flights.is_empty() {
        println!("No flights match \"{query}\"");
    }
    for flight in &flights {
        println!(
            "{:<12} {:<10} {} -> {}  {}",
            flight.flight_id,
            flight.display_name(),
            flight.origin(),
            flight.destination(),
            flight.status
        );
    }
    Ok(())
}

/// One-line summary of a refresh outcome
fn summarize(status: &FeedStatus, on_scene: usize) -> String {
    match &status.error {
        Some(error) => format!(
            "{error} ({} consecutive failures, {on_scene} entities kept)",
            status.consecutive_failures
        ),
        None => {
            let mut line = format!(
                "{} flights, {on_scene} on globe (cycle {})",
                status.flights.len(),
                status.cycles
            );
            if status.render_failures > 0 {
                line.push_str(&format!(", {} render failures", status.render_failures));
            }
            if status.skipped_ticks > 0 {
                line.push_str(&format!(", {} ticks skipped", status.skipped_ticks));
            }
            line
        }
    }
}

struct AirspaceApp {
    scheduler: RefreshScheduler<HttpFlightFeed, SharedScene>,
    scene: SharedScene,
    status_rx: watch::Receiver<FeedStatus>,
    status: FeedStatus,
    globe: GlobeView,
    flight_panel: FlightPanel,
    selected: Option<String>,
    // Persisted as loaded, without command line overrides
    config: AppConfig,
}

impl AirspaceApp {
    fn new(
        scheduler: RefreshScheduler<HttpFlightFeed, SharedScene>,
        scene: SharedScene,
        config: AppConfig,
    ) -> Self {
        let status_rx = scheduler.subscribe();
        let status = status_rx.borrow().clone();
        Self {
            scheduler,
            scene,
            status_rx,
            status,
            globe: GlobeView::new(config.globe_center_lat, config.globe_center_lon),
            flight_panel: FlightPanel::new(config.flight_list_expanded),
            selected: None,
            config,
        }
    }

    fn poll_status(&mut self) {
        if !self.status_rx.has_changed().unwrap_or(false) {
            return;
        }
        self.status = self.status_rx.borrow_and_update().clone();

        // Errors keep the previous flights, so only a successful refresh can
        // make a selection stale
        if self.status.error.is_none() {
            if let Some(id) = &self.selected {
                if !self.status.flights.iter().any(|f| &f.flight_id == id) {
                    self.selected = None;
                }
            }
        }
    }

    fn handle(&mut self, action: PanelAction) {
        match action {
            PanelAction::Refresh => {
                if !self.scheduler.refresh_now() {
                    debug!("Refresh already pending");
                }
            }
            PanelAction::Select(id) => {
                let position = self.scene.with(|entities| entities.find(&id).map(|(_, e)| e.state.position));
                if let Some(position) = position {
                    self.globe.focus(&position);
                }
                self.selected = Some(id);
            }
        }
    }
}

impl eframe::App for AirspaceApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.request_repaint_after(Duration::from_millis(500));
        self.poll_status();

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                if let Some(id) = self.globe.show(ui, &self.scene, self.selected.as_deref()) {
                    self.selected = Some(id);
                }
            });

        let mut actions = Vec::new();
        actions.extend(panels::render_header(ctx, &self.status, self.scene.len()));
        actions.extend(self.flight_panel.render(ctx, &self.status.flights, self.selected.as_deref()));
        panels::render_error_banner(ctx, self.status.error.as_deref());

        for action in actions {
            self.handle(action);
        }
    }
}

impl Drop for AirspaceApp {
    fn drop(&mut self) {
        self.scheduler.stop();
        let cleared = self.scene.clear();
        info!("Stopped refreshing, cleared {cleared} entities");

        let (lat, lon) = self.globe.center();
        self.config.globe_center_lat = lat;
        self.config.globe_center_lon = lon;
        self.config.flight_list_expanded = self.flight_panel.expanded;
        if let Err(e) = self.config.save() {
            warn!("Failed to save config: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use airspace_client::FlightRecord;

    #[test]
    fn test_gui_is_default_command() {
        let cli = Cli::try_parse_from(["airspace-live"]).unwrap();
        assert_eq!(cli.command, None);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_global_overrides_after_subcommand() {
        let cli = Cli::try_parse_from([
            "airspace-live",
            "headless",
            "--api-url",
            "http://flights.internal/api",
            "--interval",
            "2",
            "--retain-unknown",
        ])
        .unwrap();
        assert_eq!(cli.command, Some(Command::Headless));

        let mut config = AppConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.api_base_url, "http://flights.internal/api");
        assert_eq!(config.refresh_interval_secs, 2);
        assert!(config.retain_unknown_positions);
    }

    #[test]
    fn test_show_and_search_arguments() {
        let cli = Cli::try_parse_from(["airspace-live", "show", "UA100"]).unwrap();
        assert_eq!(cli.command, Some(Command::Show { flight_id: "UA100".to_string() }));

        let cli = Cli::try_parse_from(["airspace-live", "search", "KSFO"]).unwrap();
        assert_eq!(cli.command, Some(Command::Search { query: "KSFO".to_string() }));

        assert!(Cli::try_parse_from(["airspace-live", "show"]).is_err());
    }

    #[test]
    fn test_no_overrides_keep_config() {
        let cli = Cli::try_parse_from(["airspace-live"]).unwrap();
        let mut config = AppConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_summarize_success_and_failure() {
        let mut status = FeedStatus {
            flights: vec![FlightRecord::new("A").at(1.0, 2.0, 3.0), FlightRecord::new("B")],
            cycles: 3,
            ..Default::default()
        };
        assert_eq!(summarize(&status, 1), "2 flights, 1 on globe (cycle 3)");

        status.skipped_ticks = 2;
        assert_eq!(summarize(&status, 1), "2 flights, 1 on globe (cycle 3), 2 ticks skipped");

        status.error = Some("Failed to fetch flight data: failed to fetch flights: 503 Service Unavailable".to_string());
        status.consecutive_failures = 1;
        assert_eq!(
            summarize(&status, 1),
            "Failed to fetch flight data: failed to fetch flights: 503 Service Unavailable (1 consecutive failures, 1 entities kept)"
        );
    }
}
