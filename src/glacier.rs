use ratatui::style::Color;
use serde::{Deserialize, Deserializer};

/// High-risk marker color (#d73027)
pub const RISK_RED: Color = Color::Rgb(0xd7, 0x30, 0x27);
/// Medium-risk marker color (#fc8d59)
pub const RISK_ORANGE: Color = Color::Rgb(0xfc, 0x8d, 0x59);
/// Default marker color (#1a9850)
pub const RISK_GREEN: Color = Color::Rgb(0x1a, 0x98, 0x50);

/// One glacier as served by the data endpoint.
/// Risk and melt values arrive precomputed; nothing here is derived.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct GlacierRecord {
    #[serde(deserialize_with = "id_as_string")]
    pub glacier_id: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub area_km2: Option<f64>,
    #[serde(default)]
    pub predicted_melt: Option<f64>,
    #[serde(default)]
    pub risk_level: Option<String>,
}

impl GlacierRecord {
    /// Position as (lat, lon), only when both coordinates are present
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }

    pub fn risk(&self) -> RiskLevel {
        RiskLevel::classify(self.risk_level.as_deref())
    }
}

/// Identifiers are usually strings, but numeric ids show up in some exports.
fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Integer(i64),
        Float(f64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Integer(n) => n.to_string(),
        RawId::Float(n) => n.to_string(),
    })
}

/// Risk classification buckets used for color encoding
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RiskLevel {
    High,
    Medium,
    /// Explicit "Low" and every unrecognized or missing label
    Low,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 3] = [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High];

    /// Map a raw label onto a bucket. Only the exact strings "High" and
    /// "Medium" are recognized; anything else is the default bucket.
    pub fn classify(label: Option<&str>) -> Self {
        match label {
            Some("High") => RiskLevel::High,
            Some("Medium") => RiskLevel::Medium,
            _ => RiskLevel::Low,
        }
    }

    pub fn color(self) -> Color {
        match self {
            RiskLevel::High => RISK_RED,
            RiskLevel::Medium => RISK_ORANGE,
            RiskLevel::Low => RISK_GREEN,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RiskLevel::High => "High",
            RiskLevel::Medium => "Medium",
            RiskLevel::Low => "Low",
        }
    }
}

/// The one color mapping shared by markers and the detail panel
pub fn risk_color(label: Option<&str>) -> Color {
    RiskLevel::classify(label).color()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> Vec<GlacierRecord> {
        let mut bytes = json.as_bytes().to_vec();
        simd_json::serde::from_slice(&mut bytes).unwrap()
    }

    #[test]
    fn test_risk_color_mapping() {
        assert_eq!(risk_color(Some("High")), RISK_RED);
        assert_eq!(risk_color(Some("Medium")), RISK_ORANGE);
        assert_eq!(risk_color(Some("Low")), RISK_GREEN);
        assert_eq!(risk_color(Some("Unknown")), RISK_GREEN);
        assert_eq!(risk_color(Some("high")), RISK_GREEN);
        assert_eq!(risk_color(Some("")), RISK_GREEN);
        assert_eq!(risk_color(None), RISK_GREEN);
    }

    #[test]
    fn test_decode_full_record() {
        let records = decode(
            r#"[{"glacier_id":"G1","lat":30.1,"lon":79.2,"area_km2":5.5,"predicted_melt":1.23,"risk_level":"High"}]"#,
        );
        assert_eq!(records.len(), 1);
        let g = &records[0];
        assert_eq!(g.glacier_id, "G1");
        assert_eq!(g.coordinates(), Some((30.1, 79.2)));
        assert_eq!(g.area_km2, Some(5.5));
        assert_eq!(g.predicted_melt, Some(1.23));
        assert_eq!(g.risk(), RiskLevel::High);
    }

    #[test]
    fn test_null_and_missing_fields_are_absent() {
        let records = decode(r#"[{"glacier_id":"G2","lat":null,"lon":79.0,"risk_level":"Medium"}]"#);
        let g = &records[0];
        assert_eq!(g.lat, None);
        assert_eq!(g.coordinates(), None);
        assert_eq!(g.area_km2, None);
        assert_eq!(g.predicted_melt, None);
        assert_eq!(g.risk(), RiskLevel::Medium);
    }

    #[test]
    fn test_missing_risk_level_is_default_bucket() {
        let records = decode(r#"[{"glacier_id":"G4","lat":28.0,"lon":80.0}]"#);
        assert_eq!(records[0].risk_level, None);
        assert_eq!(records[0].risk(), RiskLevel::Low);
    }

    #[test]
    fn test_numeric_glacier_id() {
        let records = decode(r#"[{"glacier_id":15003,"lat":28.0,"lon":80.0}]"#);
        assert_eq!(records[0].glacier_id, "15003");
    }
}
