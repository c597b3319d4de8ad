use crate::braille::BrailleCanvas;
use crate::config::{DEFAULT_CENTER_LAT, DEFAULT_CENTER_LON, DEFAULT_ZOOM, MARKER_RADIUS, PICK_TOLERANCE};
use crate::detail::DetailPanel;
use crate::diagnostics::Diagnostics;
use crate::glacier::{risk_color, GlacierRecord, RiskLevel};
use crate::map::basemap::Basemap;
use crate::map::geometry::{draw_circle, draw_ring};
use crate::map::markers::{MapMarker, MarkerArena, MarkerId, MarkerStyle};
use crate::map::projection::Viewport;
use ratatui::style::Color;

/// Everything the map pane needs to paint one frame, one canvas per color
pub struct MapLayers {
    pub coastlines: BrailleCanvas,
    pub borders: BrailleCanvas,
    /// Marker canvases in draw order (lowest risk first)
    pub markers: Vec<(Color, BrailleCanvas)>,
    pub selection: BrailleCanvas,
}

/// The glacier map: background layer, markers and the records they stand for.
///
/// Built once per session by [`GlacierMap::render`] and owned by the caller.
pub struct GlacierMap {
    viewport: Viewport,
    basemap: Basemap,
    records: Vec<GlacierRecord>,
    markers: MarkerArena,
    selected: Option<MarkerId>,
}

impl GlacierMap {
    /// Build the map surface for a glacier collection.
    ///
    /// Records are visited in order. Those without both coordinates get no
    /// marker and are otherwise ignored. `width`/`height` are the canvas
    /// size in braille pixels.
    pub fn render(
        collection: Vec<GlacierRecord>,
        basemap: Basemap,
        width: usize,
        height: usize,
        diagnostics: &mut Diagnostics,
    ) -> Self {
        let viewport = Viewport::new(DEFAULT_CENTER_LON, DEFAULT_CENTER_LAT, DEFAULT_ZOOM, width, height);
        let mut markers = MarkerArena::new();

        for (idx, glacier) in collection.iter().enumerate() {
            let Some((lat, lon)) = glacier.coordinates() else {
                continue;
            };
            let style = MarkerStyle {
                color: risk_color(glacier.risk_level.as_deref()),
                radius: MARKER_RADIUS,
            };
            markers.push(lat, lon, glacier.risk(), style, idx);
        }

        diagnostics.info(format!("Rendered {} glaciers", markers.len()));

        Self {
            viewport,
            basemap,
            records: collection,
            markers,
            selected: None,
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    /// Go back to the initial center and zoom
    pub fn reset_view(&mut self) {
        self.viewport = Viewport::new(
            DEFAULT_CENTER_LON,
            DEFAULT_CENTER_LAT,
            DEFAULT_ZOOM,
            self.viewport.width,
            self.viewport.height,
        );
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.viewport.width = width;
        self.viewport.height = height;
    }

    pub fn basemap(&self) -> &Basemap {
        &self.basemap
    }

    pub fn markers(&self) -> &MarkerArena {
        &self.markers
    }

    pub fn records(&self) -> &[GlacierRecord] {
        &self.records
    }

    /// Source record of a marker
    pub fn record_for(&self, id: MarkerId) -> Option<&GlacierRecord> {
        self.markers.get(id).and_then(|m| self.records.get(m.record))
    }

    pub fn selected(&self) -> Option<&MapMarker> {
        self.selected.and_then(|id| self.markers.get(id))
    }

    /// Selection handler shared by every marker: show its record in the panel
    pub fn select(&mut self, id: MarkerId, panel: &mut DetailPanel) -> bool {
        let Some(record) = self.record_for(id) else {
            return false;
        };
        panel.present(record);
        self.selected = Some(id);
        true
    }

    /// Select the marker under a canvas pixel, if any
    pub fn select_at(&mut self, px: i32, py: i32, panel: &mut DetailPanel) -> Option<MarkerId> {
        let id = self.markers.pick(&self.viewport, px, py, PICK_TOLERANCE)?;
        self.select(id, panel);
        Some(id)
    }

    /// Step the selection through markers in render order and center on it
    pub fn select_relative(&mut self, step: isize, panel: &mut DetailPanel) -> Option<MarkerId> {
        let count = self.markers.len() as isize;
        if count == 0 {
            return None;
        }
        let next = match self.selected {
            Some(MarkerId(current)) => (current as isize + step).rem_euclid(count),
            None if step >= 0 => 0,
            None => count - 1,
        };
        let id = MarkerId(next as usize);
        self.select(id, panel);
        if let Some(marker) = self.markers.get(id) {
            self.viewport.center_on(marker.lon, marker.lat);
        }
        Some(id)
    }

    /// Number of markers per risk bucket, lowest risk first
    pub fn risk_counts(&self) -> [(RiskLevel, usize); 3] {
        RiskLevel::ALL.map(|risk| (risk, self.markers.iter().filter(|m| m.risk == risk).count()))
    }

    /// Rasterize the visible map into braille layers of `cols` x `rows` cells
    pub fn draw(&self, cols: usize, rows: usize) -> MapLayers {
        let mut viewport = self.viewport.clone();
        viewport.width = cols * 2;
        viewport.height = rows * 4;

        let mut coastlines = BrailleCanvas::new(cols, rows);
        let mut borders = BrailleCanvas::new(cols, rows);
        self.basemap.draw(&mut coastlines, &mut borders, &viewport);

        let mut markers: Vec<(Color, BrailleCanvas)> = RiskLevel::ALL
            .iter()
            .map(|risk| (risk.color(), BrailleCanvas::new(cols, rows)))
            .collect();

        for marker in self.markers.iter() {
            let (px, py) = viewport.project(marker.lon, marker.lat);
            if !viewport.is_visible(px, py) {
                continue;
            }
            let layer = markers
                .iter_mut()
                .find(|(color, _)| *color == marker.style.color);
            if let Some((_, canvas)) = layer {
                draw_circle(canvas, px, py, marker.style.radius);
            }
        }

        let mut selection = BrailleCanvas::new(cols, rows);
        if let Some(marker) = self.selected() {
            let (px, py) = viewport.project(marker.lon, marker.lat);
            draw_ring(&mut selection, px, py, marker.style.radius + 2);
        }

        MapLayers {
            coastlines,
            borders,
            markers,
            selection,
        }
    }
}
