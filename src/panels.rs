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

use airspace_client::{FeedStatus, FlightRecord, FlightStatus};
use chrono::{DateTime, Local, Utc};
use eframe::egui;

/// User interaction coming out of the overlay panels
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelAction {
    Refresh,
    Select(String),
}

fn panel_frame(ctx: &egui::Context) -> egui::Frame {
    egui::Frame::window(&ctx.style())
        .fill(egui::Color32::from_rgba_unmultiplied(25, 30, 35, 230))
        .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(60, 80, 100)))
        .corner_radius(6.0)
}

/// Title bar with the last update time and a manual refresh button
pub fn render_header(ctx: &egui::Context, status: &FeedStatus, on_globe: usize) -> Option<PanelAction> {
    let mut action = None;

    egui::Window::new("header")
        .title_bar(false)
        .anchor(egui::Align2::LEFT_TOP, egui::vec2(10.0, 10.0))
        .resizable(false)
        .collapsible(false)
        .frame(panel_frame(ctx))
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("AirSpace Live")
                    .color(egui::Color32::from_rgb(100, 180, 220))
                    .size(18.0)
                    .strong());

                ui.add_space(8.0);

                if ui.button(egui::RichText::new("⟳").size(14.0))
                    .on_hover_text("Refresh now")
                    .clicked() {
                    action = Some(PanelAction::Refresh);
                }
            });

            ui.label(egui::RichText::new(format_last_update(status.last_update))
                .color(egui::Color32::from_rgb(150, 150, 150))
                .size(11.0)
                .monospace());

            ui.label(egui::RichText::new(format!("{} flights, {} on globe", status.flights.len(), on_globe))
                .color(egui::Color32::from_rgb(150, 150, 150))
                .size(11.0)
                .monospace());
        });

    action
}

/// Error overlay along the bottom edge. Draws nothing when `error` is `None`.
pub fn render_error_banner(ctx: &egui::Context, error: Option<&str>) {
    let Some(error) = error else {
        return;
    };

    egui::Window::new("error_banner")
        .title_bar(false)
        .anchor(egui::Align2::CENTER_BOTTOM, egui::vec2(0.0, -16.0))
        .resizable(false)
        .collapsible(false)
        .frame(egui::Frame::window(&ctx.style())
            .fill(egui::Color32::from_rgba_unmultiplied(140, 30, 30, 230))
            .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(220, 90, 90)))
            .corner_radius(6.0))
        .show(ctx, |ui| {
            ui.label(egui::RichText::new(format!("⚠ {error}"))
                .color(egui::Color32::WHITE)
                .size(12.0));
        });
}

/// Floating list of active flights on the right side of the window
#[derive(Debug)]
pub struct FlightPanel {
    pub expanded: bool,
}

impl FlightPanel {
    pub fn new(expanded: bool) -> Self {
        Self { expanded }
    }

    pub fn render(
        &mut self,
        ctx: &egui::Context,
        flights: &[FlightRecord],
        selected: Option<&str>,
    ) -> Option<PanelAction> {
        let mut action = None;
        let screen_height = ctx.screen_rect().height();

        egui::Window::new("Flights")
            .title_bar(false)
            .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-10.0, 10.0))
            .fixed_size(egui::vec2(300.0, if self.expanded { (screen_height - 40.0).max(60.0) } else { 30.0 }))
            .resizable(false)
            .collapsible(false)
            .frame(panel_frame(ctx))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new(format!("◈ ACTIVE FLIGHTS ({})", flights.len()))
                        .color(egui::Color32::from_rgb(100, 200, 100))
                        .size(12.0)
                        .strong());

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let icon = if self.expanded { "▲" } else { "▼" };
                        if ui.button(egui::RichText::new(icon).size(10.0))
                            .on_hover_text(if self.expanded { "Collapse" } else { "Expand" })
                            .clicked() {
                            self.expanded = !self.expanded;
                        }
                    });
                });

                if !self.expanded {
                    return;
                }

                ui.separator();

                if flights.is_empty() {
                    ui.label(egui::RichText::new("No active flights")
                        .color(egui::Color32::from_rgb(150, 150, 150))
                        .italics());
                    return;
                }

                egui::ScrollArea::vertical()
                    .max_height((screen_height - 90.0).max(40.0))
                    .show(ui, |ui| {
                        for flight in flights {
                            if let Some(clicked) = render_flight_row(ui, flight, selected) {
                                action = Some(clicked);
                            }
                            ui.add_space(2.0);
                        }
                    });
            });

        action
    }
}

fn render_flight_row(ui: &mut egui::Ui, flight: &FlightRecord, selected: Option<&str>) -> Option<PanelAction> {
    let is_selected = selected == Some(flight.flight_id.as_str());
    let mut action = None;

    ui.horizontal(|ui| {
        let name = egui::RichText::new(flight.display_name())
            .size(13.0)
            .strong()
            .color(egui::Color32::WHITE);
        let response = ui.selectable_label(is_selected, name);
        let response = if flight.has_position() {
            response.on_hover_text("Show on globe")
        } else {
            response.on_hover_text("Position unknown")
        };
        if response.clicked() {
            action = Some(PanelAction::Select(flight.flight_id.clone()));
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(egui::RichText::new(flight.status.label())
                .color(status_color(flight.status))
                .size(11.0));
        });
    });

    ui.label(egui::RichText::new(format!("{} → {}", flight.origin(), flight.destination()))
        .color(egui::Color32::from_rgb(180, 180, 180))
        .size(11.0));

    ui.label(egui::RichText::new(format!(
        "{}  {}",
        format_altitude(flight.altitude),
        format_speed(flight.speed)
    ))
    .color(egui::Color32::from_rgb(150, 150, 150))
    .size(10.0)
    .monospace());

    ui.separator();

    action
}

pub fn format_last_update(last_update: Option<DateTime<Utc>>) -> String {
    match last_update {
        Some(at) => format!("Last update: {}", at.with_timezone(&Local).format("%H:%M:%S")),
        None => "Last update: never".to_string(),
    }
}

fn format_altitude(altitude: Option<f64>) -> String {
    altitude.map_or_else(|| "ALT ---".to_string(), |alt| format!("ALT {alt:.0} m"))
}

fn format_speed(speed: Option<f64>) -> String {
    speed.map_or_else(|| "SPD ---".to_string(), |spd| format!("SPD {spd:.0} km/h"))
}

fn status_color(status: FlightStatus) -> egui::Color32 {
    match status {
        FlightStatus::Departed | FlightStatus::InFlight => egui::Color32::from_rgb(100, 255, 100),
        FlightStatus::Landing | FlightStatus::Landed | FlightStatus::Arrived => egui::Color32::from_rgb(100, 200, 220),
        FlightStatus::Scheduled | FlightStatus::Boarding => egui::Color32::from_rgb(180, 180, 220),
        FlightStatus::Delayed => egui::Color32::from_rgb(255, 200, 50),
        FlightStatus::Cancelled | FlightStatus::Diverted => egui::Color32::from_rgb(255, 100, 100),
        FlightStatus::Unknown => egui::Color32::from_rgb(150, 150, 150),
    }
}
