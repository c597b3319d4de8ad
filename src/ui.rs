use crate::app::App;
use crate::braille::BrailleCanvas;
use crate::map::MapLayers;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
    Frame,
};

/// Width of the detail pane in terminal cells
const DETAIL_WIDTH: u16 = 36;

/// Split the screen into map pane, detail pane and status bar
fn layout(area: Rect) -> (Rect, Rect, Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Panes
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(DETAIL_WIDTH)])
        .split(rows[0]);

    (panes[0], panes[1], rows[1])
}

fn pane_block(title: &'static str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            title,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
}

/// Area inside the map pane border, where the braille canvas goes
pub fn map_inner_area(area: Rect) -> Rect {
    let (map_area, _, _) = layout(area);
    pane_block(" Glacier Explorer ").inner(map_area)
}

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let (map_area, detail_area, status_area) = layout(frame.area());

    render_map(frame, app, map_area);
    render_detail(frame, app, detail_area);
    render_status_bar(frame, app, status_area);
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let block = pane_block(" Glacier Explorer ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // No collection, no map
    let Some(map) = app.map.as_ref() else {
        return;
    };

    let layers = map.draw(inner.width as usize, inner.height as usize);
    let cursor = app
        .mouse_pos
        .filter(|&(col, row)| inner.contains((col, row).into()));
    let widget = MapWidget {
        layers,
        cursor,
        attribution: map.basemap().attribution(),
    };
    frame.render_widget(widget, inner);
}

/// Braille map with colored marker layers and the attribution notice
struct MapWidget<'a> {
    layers: MapLayers,
    /// Mouse position in absolute terminal cells
    cursor: Option<(u16, u16)>,
    attribution: &'a str,
}

impl MapWidget<'_> {
    fn render_layer(canvas: &BrailleCanvas, color: Color, area: Rect, buf: &mut Buffer) {
        for (col, row, ch) in canvas.lit_cells() {
            if col >= area.width as usize || row >= area.height as usize {
                continue;
            }
            let x = area.x + col as u16;
            let y = area.y + row as u16;
            buf[(x, y)].set_char(ch).set_fg(color);
        }
    }
}

impl Widget for MapWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Back to front: coastlines, borders, markers by rising risk, selection
        Self::render_layer(&self.layers.coastlines, Color::Cyan, area, buf);
        Self::render_layer(&self.layers.borders, Color::DarkGray, area, buf);
        for (color, canvas) in &self.layers.markers {
            Self::render_layer(canvas, *color, area, buf);
        }
        Self::render_layer(&self.layers.selection, Color::White, area, buf);

        if let Some((x, y)) = self.cursor {
            buf[(x, y)].set_char('╋').set_fg(Color::Red);
        }

        // Attribution sits in the bottom-right corner, always on top
        if area.height == 0 {
            return;
        }
        let text = format!("© {}", self.attribution);
        let len = text.chars().count() as u16;
        let x = area.x + area.width.saturating_sub(len);
        let y = area.y + area.height - 1;
        buf.set_stringn(x, y, &text, area.width as usize, Style::default().fg(Color::DarkGray));
    }
}

fn render_detail(frame: &mut Frame, app: &App, area: Rect) {
    let block = pane_block(" Glacier ");
    let paragraph = match app.detail.content() {
        Some(text) => Paragraph::new(text.clone()),
        None => Paragraph::new(Line::from(Span::styled(
            "Click a marker to see its details",
            Style::default().fg(Color::DarkGray),
        ))),
    };
    frame.render_widget(paragraph.block(block).wrap(Wrap { trim: false }), area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let dim = Style::default().fg(Color::DarkGray);
    let mut spans = Vec::new();

    if let Some(map) = app.map.as_ref() {
        spans.push(Span::styled(" Zoom: ", dim));
        spans.push(Span::styled(app.zoom_level().unwrap_or_default(), Style::default().fg(Color::Yellow)));
        spans.push(Span::styled(" (", dim));
        spans.push(Span::styled(app.lod_level().unwrap_or_default(), Style::default().fg(Color::Magenta)));
        spans.push(Span::styled(") | ", dim));
        for (risk, count) in map.risk_counts().iter().rev() {
            spans.push(Span::styled(
                format!("● {} {} ", risk.name(), count),
                Style::default().fg(risk.color()),
            ));
        }
        spans.push(Span::styled("| ", dim));
        spans.push(Span::styled(app.center_coords().unwrap_or_default(), Style::default().fg(Color::Cyan)));
    }

    spans.push(Span::styled(
        " | hjkl:pan +/-:zoom n/p:next/prev r:reset q:quit",
        dim,
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_pane_leaves_room_for_detail() {
        let area = Rect::new(0, 0, 120, 40);
        let inner = map_inner_area(area);
        assert_eq!(inner.x, 1);
        assert_eq!(inner.y, 1);
        assert_eq!(inner.width, 120 - DETAIL_WIDTH - 2);
        // Two border rows and the status bar
        assert_eq!(inner.height, 40 - 3);
    }
}
