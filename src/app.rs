use crate::detail::DetailPanel;
use crate::diagnostics::Diagnostics;
use crate::loader::Loader;
use crate::map::{Basemap, GlacierMap, Lod};
use crate::ui;
use ratatui::layout::Rect;

/// Application state
pub struct App {
    /// Pending retrieval; finished after the first result
    loader: Loader,
    /// Background layer waiting for the map to be built
    basemap: Option<Basemap>,
    /// The map, once the glacier collection has arrived
    pub map: Option<GlacierMap>,
    pub detail: DetailPanel,
    pub diagnostics: Diagnostics,
    /// Inner area of the map pane in terminal cells
    pub map_area: Rect,
    pub should_quit: bool,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
    /// Whether the current left-button press has moved (drag, not click)
    dragged: bool,
    /// Current mouse position for cursor marker
    pub mouse_pos: Option<(u16, u16)>,
}

impl App {
    pub fn new(loader: Loader, basemap: Basemap, diagnostics: Diagnostics, area: Rect) -> Self {
        Self {
            loader,
            basemap: Some(basemap),
            map: None,
            detail: DetailPanel::new(),
            diagnostics,
            map_area: ui::map_inner_area(area),
            should_quit: false,
            last_mouse: None,
            dragged: false,
            mouse_pos: None,
        }
    }

    /// Braille pixel size of the map pane
    fn canvas_size(&self) -> (usize, usize) {
        (self.map_area.width as usize * 2, self.map_area.height as usize * 4)
    }

    /// Called once per frame: build the map when the collection arrives
    pub fn tick(&mut self) {
        if self.map.is_some() {
            return;
        }
        let Some(collection) = self.loader.poll(&mut self.diagnostics) else {
            return;
        };
        let Some(basemap) = self.basemap.take() else {
            return;
        };
        let (width, height) = self.canvas_size();
        self.map = Some(GlacierMap::render(collection, basemap, width, height, &mut self.diagnostics));
    }

    /// Update viewport size when terminal resizes
    pub fn resize(&mut self, width: u16, height: u16) {
        self.map_area = ui::map_inner_area(Rect::new(0, 0, width, height));
        let (w, h) = self.canvas_size();
        if let Some(map) = self.map.as_mut() {
            map.resize(w, h);
        }
    }

    /// Convert a terminal position inside the map pane to braille pixels
    fn to_pixel(&self, col: u16, row: u16) -> Option<(i32, i32)> {
        let area = self.map_area;
        if col < area.x || row < area.y || col >= area.x + area.width || row >= area.y + area.height {
            return None;
        }
        // Aim at the middle of the cell
        let px = (col - area.x) as i32 * 2 + 1;
        let py = (row - area.y) as i32 * 4 + 2;
        Some((px, py))
    }

    pub fn pan(&mut self, dx: i32, dy: i32) {
        if let Some(map) = self.map.as_mut() {
            map.viewport_mut().pan(dx, dy);
        }
    }

    pub fn zoom_in(&mut self) {
        if let Some(map) = self.map.as_mut() {
            map.viewport_mut().zoom_in();
        }
    }

    pub fn zoom_out(&mut self) {
        if let Some(map) = self.map.as_mut() {
            map.viewport_mut().zoom_out();
        }
    }

    /// Zoom in towards a terminal position
    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        if let Some((px, py)) = self.to_pixel(col, row) {
            if let Some(map) = self.map.as_mut() {
                map.viewport_mut().zoom_in_at(px, py);
            }
        }
    }

    /// Zoom out from a terminal position
    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        if let Some((px, py)) = self.to_pixel(col, row) {
            if let Some(map) = self.map.as_mut() {
                map.viewport_mut().zoom_out_at(px, py);
            }
        }
    }

    pub fn reset_view(&mut self) {
        if let Some(map) = self.map.as_mut() {
            map.reset_view();
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Left button down. Only presses inside the map pane start a drag or click.
    pub fn press(&mut self, col: u16, row: u16) {
        self.last_mouse = self.to_pixel(col, row).map(|_| (col, row));
        self.dragged = false;
    }

    /// Handle mouse drag by panning the map
    pub fn handle_drag(&mut self, x: u16, y: u16) {
        let Some((last_x, last_y)) = self.last_mouse else {
            return;
        };
        let dx = last_x as i32 - x as i32;
        let dy = last_y as i32 - y as i32;
        if dx != 0 || dy != 0 {
            self.dragged = true;
            // Terminal cells are 2x4 braille pixels
            self.pan(dx * 2, dy * 4);
        }
        self.last_mouse = Some((x, y));
    }

    /// Button released: a press without movement is a click
    pub fn release(&mut self, col: u16, row: u16) {
        let was_click = self.last_mouse.is_some() && !self.dragged;
        self.last_mouse = None;
        self.dragged = false;
        if was_click {
            self.click(col, row);
        }
    }

    /// Select the glacier marker under a terminal position
    pub fn click(&mut self, col: u16, row: u16) {
        let Some((px, py)) = self.to_pixel(col, row) else {
            return;
        };
        if let Some(map) = self.map.as_mut() {
            map.select_at(px, py, &mut self.detail);
        }
    }

    pub fn select_next(&mut self) {
        if let Some(map) = self.map.as_mut() {
            map.select_relative(1, &mut self.detail);
        }
    }

    pub fn select_previous(&mut self) {
        if let Some(map) = self.map.as_mut() {
            map.select_relative(-1, &mut self.detail);
        }
    }

    pub fn set_mouse_pos(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
    }

    /// Get current zoom level as a string
    pub fn zoom_level(&self) -> Option<String> {
        self.map.as_ref().map(|m| format!("{:.1}x", m.viewport().zoom))
    }

    /// Get current LOD label
    pub fn lod_level(&self) -> Option<&'static str> {
        self.map.as_ref().map(|m| Lod::from_zoom(m.viewport().zoom).label())
    }

    /// Get current center coordinates as a string
    pub fn center_coords(&self) -> Option<String> {
        self.map.as_ref().map(|m| {
            let vp = m.viewport();
            format!(
                "{:.1}°{}, {:.1}°{}",
                vp.center_lat.abs(),
                if vp.center_lat >= 0.0 { "N" } else { "S" },
                vp.center_lon.abs(),
                if vp.center_lon >= 0.0 { "E" } else { "W" }
            )
        })
    }
}
