use crate::glacier::{risk_color, GlacierRecord};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};

/// Placeholder for values the dataset does not have
pub const MISSING: &str = "NA";

/// Fixed-precision number, or the placeholder when absent
pub fn format_fixed(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", decimals, v),
        None => MISSING.to_string(),
    }
}

fn field(label: &'static str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(label, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(value),
    ])
}

/// Format one glacier for the detail panel. Pure: the same record always
/// produces the same text.
pub fn format_detail(record: &GlacierRecord) -> Text<'static> {
    let risk_label = record.risk_level.clone().unwrap_or_else(|| MISSING.to_string());
    let risk_style = Style::default()
        .fg(risk_color(record.risk_level.as_deref()))
        .add_modifier(Modifier::BOLD);

    Text::from(vec![
        Line::from(Span::styled(
            record.glacier_id.clone(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        field("Latitude: ", format_fixed(record.lat, 4)),
        field("Longitude: ", format_fixed(record.lon, 4)),
        Line::default(),
        field("Area: ", format!("{} km²", format_fixed(record.area_km2, 2))),
        field("Predicted Melt: ", format_fixed(record.predicted_melt, 2)),
        Line::default(),
        Line::from(vec![
            Span::styled("Risk Level: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(risk_label, risk_style),
        ]),
    ])
}

/// The panel showing the currently selected glacier.
/// Each presentation replaces the previous one entirely.
#[derive(Default)]
pub struct DetailPanel {
    content: Option<Text<'static>>,
}

impl DetailPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn present(&mut self, record: &GlacierRecord) {
        self.content = Some(format_detail(record));
    }

    pub fn content(&self) -> Option<&Text<'static>> {
        self.content.as_ref()
    }
}
