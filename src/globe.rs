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

//! Orthographic globe view of the shared scene.

use airspace_client::{Position, SharedScene};
use eframe::egui;

const EARTH_RADIUS_M: f64 = 6_371_000.0;
// Real altitudes are invisible at globe scale
const ALTITUDE_EXAGGERATION: f64 = 20.0;
const GRATICULE_STEP_DEG: i32 = 30;
const GRATICULE_SAMPLE_DEG: i32 = 5;
const MAX_CENTER_LAT: f64 = 89.0;
const MIN_ZOOM: f32 = 0.5;
const MAX_ZOOM: f32 = 8.0;
const POINT_RADIUS: f32 = 4.0;
const HOVER_RADIUS_PX: f32 = 8.0;

/// A point on the unit sphere rotated into view space.
///
/// `x` points right, `y` up, and `depth` toward the viewer. Points with a
/// negative depth are on the far side of the globe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    pub x: f64,
    pub y: f64,
    pub depth: f64,
}

/// An entity placed on screen this frame
#[derive(Debug, Clone)]
struct ScreenPoint {
    index: usize,
    id: String,
    pos: egui::Pos2,
    depth: f64,
}

#[derive(Debug, Clone)]
pub struct GlobeView {
    center_lat: f64,
    center_lon: f64,
    zoom: f32,
}

impl GlobeView {
    pub fn new(center_lat: f64, center_lon: f64) -> Self {
        Self {
            center_lat: center_lat.clamp(-MAX_CENTER_LAT, MAX_CENTER_LAT),
            center_lon: wrap_longitude(center_lon),
            zoom: 1.0,
        }
    }

    /// Current view center as (latitude, longitude)
    pub fn center(&self) -> (f64, f64) {
        (self.center_lat, self.center_lon)
    }

    /// Turn the globe so `position` faces the viewer
    pub fn focus(&mut self, position: &Position) {
        self.center_lat = position.latitude.clamp(-MAX_CENTER_LAT, MAX_CENTER_LAT);
        self.center_lon = wrap_longitude(position.longitude);
    }

    pub fn rotate(&mut self, delta_lon: f64, delta_lat: f64) {
        self.center_lon = wrap_longitude(self.center_lon + delta_lon);
        self.center_lat = (self.center_lat + delta_lat).clamp(-MAX_CENTER_LAT, MAX_CENTER_LAT);
    }

    /// Project a geographic point, or `None` when it is behind the globe.
    pub fn project(&self, latitude: f64, longitude: f64, altitude: f64) -> Option<Projected> {
        let phi = latitude.to_radians();
        let phi0 = self.center_lat.to_radians();
        let dlambda = (longitude - self.center_lon).to_radians();
        let r = 1.0 + altitude.max(0.0) / EARTH_RADIUS_M * ALTITUDE_EXAGGERATION;

        let depth = phi0.sin() * phi.sin() + phi0.cos() * phi.cos() * dlambda.cos();
        if depth < 0.0 {
            return None;
        }

        Some(Projected {
            x: r * phi.cos() * dlambda.sin(),
            y: r * (phi0.cos() * phi.sin() - phi0.sin() * phi.cos() * dlambda.cos()),
            depth: r * depth,
        })
    }

    /// Draw the globe and its entities. Returns the id of a clicked entity.
    pub fn show(&mut self, ui: &mut egui::Ui, scene: &SharedScene, selected: Option<&str>) -> Option<String> {
        let (response, painter) = ui.allocate_painter(
            egui::vec2(ui.available_width(), ui.available_height()),
            egui::Sense::click_and_drag(),
        );
        let rect = response.rect;
        let radius = rect.width().min(rect.height()) * 0.45 * self.zoom;
        let center = rect.center();

        if response.dragged() {
            let delta = response.drag_delta();
            let degrees_per_px = 1.0_f64.to_degrees() / f64::from(radius.max(1.0));
            self.rotate(
                -f64::from(delta.x) * degrees_per_px,
                f64::from(delta.y) * degrees_per_px,
            );
        }

        if response.hovered() {
            let (zoom_delta, scroll) = ui.ctx().input(|i| (i.zoom_delta(), i.smooth_scroll_delta.y));
            self.zoom = (self.zoom * zoom_delta * (1.0 + scroll * 0.001)).clamp(MIN_ZOOM, MAX_ZOOM);
        }

        painter.rect_filled(rect, 0.0, egui::Color32::from_rgb(8, 12, 18));
        painter.circle_filled(center, radius, egui::Color32::from_rgb(16, 38, 64));
        self.draw_graticule(&painter, center, radius);
        painter.circle_stroke(
            center,
            radius,
            egui::Stroke::new(1.0, egui::Color32::from_rgb(60, 80, 100)),
        );

        // Snapshot so the scene lock is not held while painting
        let entities = scene.snapshot();
        let mut points: Vec<ScreenPoint> = entities
            .iter()
            .enumerate()
            .filter_map(|(index, (_, entity))| {
                let p = entity.state.position;
                self.project(p.latitude, p.longitude, p.altitude).map(|projected| ScreenPoint {
                    index,
                    id: entity.id.clone(),
                    pos: to_screen(center, radius, projected),
                    depth: projected.depth,
                })
            })
            .collect();
        points.sort_by(|a, b| a.depth.total_cmp(&b.depth));

        for point in &points {
            let entity = &entities[point.index].1;
            let is_selected = selected == Some(point.id.as_str());
            let color = if is_selected {
                egui::Color32::from_rgb(255, 210, 60)
            } else {
                egui::Color32::from_rgb(80, 220, 230)
            };

            painter.circle_filled(point.pos, POINT_RADIUS, color);
            painter.circle_stroke(point.pos, POINT_RADIUS, egui::Stroke::new(1.0, egui::Color32::WHITE));
            painter.text(
                point.pos + egui::vec2(6.0, -4.0),
                egui::Align2::LEFT_BOTTOM,
                &entity.state.label,
                egui::FontId::proportional(11.0),
                egui::Color32::from_rgb(220, 220, 220),
            );
        }

        let hovered = response
            .hover_pos()
            .and_then(|pointer| nearest_within(&points, pointer, HOVER_RADIUS_PX).map(|p| (pointer, p)));

        if let Some((pointer, point)) = hovered {
            let galley = painter.layout_no_wrap(
                entities[point.index].1.state.description.clone(),
                egui::FontId::monospace(11.0),
                egui::Color32::WHITE,
            );
            let tooltip = egui::Rect::from_min_size(
                pointer + egui::vec2(14.0, 14.0),
                galley.size() + egui::vec2(12.0, 8.0),
            );
            painter.rect_filled(tooltip, 4.0, egui::Color32::from_rgba_unmultiplied(25, 30, 35, 235));
            painter.galley(tooltip.min + egui::vec2(6.0, 4.0), galley, egui::Color32::WHITE);
        }

        if response.clicked() {
            return hovered.map(|(_, point)| point.id.clone());
        }
        None
    }

    fn draw_graticule(&self, painter: &egui::Painter, center: egui::Pos2, radius: f32) {
        let stroke = egui::Stroke::new(0.5, egui::Color32::from_rgb(40, 70, 100));

        for lat in (-90 + GRATICULE_STEP_DEG..90).step_by(GRATICULE_STEP_DEG as usize) {
            let samples = (-180..=180)
                .step_by(GRATICULE_SAMPLE_DEG as usize)
                .map(|lon| self.project(f64::from(lat), f64::from(lon), 0.0));
            draw_visible_runs(painter, center, radius, samples, stroke);
        }

        for lon in (-180..180).step_by(GRATICULE_STEP_DEG as usize) {
            let samples = (-90..=90)
                .step_by(GRATICULE_SAMPLE_DEG as usize)
                .map(|lat| self.project(f64::from(lat), f64::from(lon), 0.0));
            draw_visible_runs(painter, center, radius, samples, stroke);
        }
    }
}

/// Draw a polyline through consecutive visible samples, breaking at the horizon
fn draw_visible_runs(
    painter: &egui::Painter,
    center: egui::Pos2,
    radius: f32,
    samples: impl Iterator<Item = Option<Projected>>,
    stroke: egui::Stroke,
) {
    let mut run: Vec<egui::Pos2> = Vec::new();
    for sample in samples {
        if let Some(projected) = sample {
            run.push(to_screen(center, radius, projected));
        } else if run.len() > 1 {
            painter.add(egui::Shape::line(std::mem::take(&mut run), stroke));
        } else {
            run.clear();
        }
    }
    if run.len() > 1 {
        painter.add(egui::Shape::line(run, stroke));
    }
}

fn to_screen(center: egui::Pos2, radius: f32, projected: Projected) -> egui::Pos2 {
    egui::pos2(
        center.x + projected.x as f32 * radius,
        center.y - projected.y as f32 * radius,
    )
}

fn nearest_within(points: &[ScreenPoint], pointer: egui::Pos2, max_distance: f32) -> Option<&ScreenPoint> {
    points
        .iter()
        .map(|p| (p, p.pos.distance(pointer)))
        .filter(|(_, d)| *d <= max_distance)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(p, _)| p)
}

fn wrap_longitude(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}
