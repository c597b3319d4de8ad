use crate::diagnostics::Diagnostics;
use crate::map::{Basemap, LineString, Lod};
use anyhow::Result;
use geojson::{GeoJson, Geometry, Value};
use std::fs;
use std::path::Path;

/// Attribution for layers built from Natural Earth files
pub const NATURAL_EARTH_ATTRIBUTION: &str = "Made with Natural Earth";
/// Attribution for the built-in fallback outline
pub const OUTLINE_ATTRIBUTION: &str = "Simplified outline";

const COASTLINE_FILES: [(&str, Lod); 3] = [
    ("ne_110m_coastline.json", Lod::Low),
    ("ne_50m_coastline.json", Lod::Medium),
    ("ne_10m_coastline.json", Lod::High),
];

const BORDER_FILES: [(&str, Lod); 2] = [
    ("ne_50m_borders.json", Lod::Medium),
    ("ne_10m_borders.json", Lod::High),
];

/// Build the background layer from whatever Natural Earth files exist in
/// `data_dir`, falling back to the built-in outline when none load.
pub fn load_basemap(data_dir: &Path, diagnostics: &mut Diagnostics) -> Basemap {
    let mut basemap = Basemap::new(NATURAL_EARTH_ATTRIBUTION);

    if data_dir.exists() {
        for (filename, lod) in COASTLINE_FILES {
            let path = data_dir.join(filename);
            if path.exists() {
                if let Err(e) = load_lines(&path, |line| basemap.add_coastline(line, lod)) {
                    diagnostics.warn(format!("Failed to load {}: {}", filename, e));
                }
            }
        }

        for (filename, lod) in BORDER_FILES {
            let path = data_dir.join(filename);
            if path.exists() {
                if let Err(e) = load_lines(&path, |line| basemap.add_border(line, lod)) {
                    diagnostics.warn(format!("Failed to load {}: {}", filename, e));
                }
            }
        }
    }

    if !basemap.has_data() {
        diagnostics.info(format!("No basemap data in {}, using built-in outline", data_dir.display()));
        basemap = simplified_outline();
    }

    basemap
}

/// Parse a GeoJSON file and feed every line feature to `add_line`
fn load_lines<F>(path: &Path, mut add_line: F) -> Result<()>
where
    F: FnMut(LineString),
{
    let content = fs::read_to_string(path)?;
    let geojson: GeoJson = content.parse()?;
    process_geojson_lines(&geojson, &mut add_line);
    Ok(())
}

/// Extract line features (polygon exteriors count as lines)
fn process_geojson_lines<F>(geojson: &GeoJson, add_line: &mut F)
where
    F: FnMut(LineString),
{
    match geojson {
        GeoJson::FeatureCollection(fc) => {
            for feature in &fc.features {
                if let Some(ref geometry) = feature.geometry {
                    process_geometry_lines(geometry, add_line);
                }
            }
        }
        GeoJson::Feature(f) => {
            if let Some(ref geometry) = f.geometry {
                process_geometry_lines(geometry, add_line);
            }
        }
        GeoJson::Geometry(geometry) => {
            process_geometry_lines(geometry, add_line);
        }
    }
}

fn process_geometry_lines<F>(geometry: &Geometry, add_line: &mut F)
where
    F: FnMut(LineString),
{
    let to_line = |coords: &[Vec<f64>]| -> LineString {
        coords
            .iter()
            .filter(|c| c.len() >= 2)
            .map(|c| (c[0], c[1]))
            .collect()
    };

    match &geometry.value {
        Value::LineString(coords) => add_line(to_line(coords)),
        Value::MultiLineString(lines) => {
            for coords in lines {
                add_line(to_line(coords));
            }
        }
        Value::Polygon(rings) => {
            if let Some(exterior) = rings.first() {
                add_line(to_line(exterior));
            }
        }
        Value::MultiPolygon(polygons) => {
            for rings in polygons {
                if let Some(exterior) = rings.first() {
                    add_line(to_line(exterior));
                }
            }
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                process_geometry_lines(g, add_line);
            }
        }
        _ => {}
    }
}

/// Coarse outline of South and Central Asia, enough to orient the glacier
/// markers when no Natural Earth data is installed
pub fn simplified_outline() -> Basemap {
    let mut basemap = Basemap::new(OUTLINE_ATTRIBUTION);

    // Arabian Sea, Indian peninsula and Bay of Bengal coast
    basemap.add_coastline(
        vec![
            (57.0, 25.5), (61.5, 25.2), (66.6, 25.4), (67.5, 24.0),
            (68.8, 22.8), (70.2, 22.6), (72.6, 21.1), (72.8, 19.0),
            (73.4, 16.0), (74.8, 12.8), (76.3, 9.5), (77.5, 8.1),
            (78.2, 8.9), (79.9, 10.3), (80.3, 13.1), (81.3, 16.3),
            (83.3, 17.7), (85.8, 19.8), (87.0, 21.5), (88.9, 21.6),
            (90.5, 22.1), (91.8, 22.3), (92.3, 20.7), (94.2, 18.8),
            (94.5, 16.0), (97.6, 16.5), (98.5, 13.0),
        ],
        Lod::Low,
    );

    // Sri Lanka
    basemap.add_coastline(
        vec![
            (79.9, 9.8), (81.2, 8.5), (81.9, 7.0), (81.2, 6.2),
            (80.1, 6.0), (79.8, 7.5), (79.9, 9.8),
        ],
        Lod::Low,
    );

    // Caspian Sea
    basemap.add_coastline(
        vec![
            (47.0, 44.8), (51.3, 47.0), (53.0, 45.3), (51.3, 43.2),
            (53.0, 41.0), (53.9, 37.3), (50.3, 37.1), (49.0, 38.4),
            (49.6, 40.4), (47.6, 42.6), (47.0, 44.8),
        ],
        Lod::Low,
    );

    // Himalayan frontier: Pakistan, India, Nepal, Bhutan against China
    basemap.add_border(
        vec![
            (74.5, 37.0), (75.8, 36.7), (77.8, 35.5), (79.5, 34.3),
            (78.7, 32.6), (79.0, 31.1), (80.2, 30.6), (81.1, 30.2),
            (82.6, 29.3), (84.2, 28.6), (85.8, 28.2), (88.1, 27.9),
            (88.9, 27.3), (90.4, 28.1), (91.6, 27.8), (92.1, 26.9),
            (94.3, 29.3), (96.2, 29.4), (97.3, 28.2),
        ],
        Lod::Low,
    );

    // Nepal's southern border with India
    basemap.add_border(
        vec![
            (80.1, 28.8), (81.8, 27.9), (83.3, 27.4), (84.6, 27.2),
            (86.1, 26.6), (88.2, 26.4),
        ],
        Lod::Low,
    );

    basemap
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_data_dir_uses_outline() {
        let mut diag = Diagnostics::new();
        let basemap = load_basemap(Path::new("/nonexistent/basemap"), &mut diag);
        assert!(basemap.has_data());
        assert_eq!(basemap.attribution(), OUTLINE_ATTRIBUTION);
        assert_eq!(diag.entries().len(), 1);
        assert_eq!(diag.entries()[0].level, log::Level::Info);
    }

    #[test]
    fn test_broken_file_is_a_warning() {
        let dir = std::env::temp_dir().join(format!("glacier-map-basemap-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("ne_110m_coastline.json"), "not geojson").unwrap();
        fs::write(
            dir.join("ne_50m_coastline.json"),
            r#"{"type": "LineString", "coordinates": [[78.0, 30.0], [79.0, 31.0]]}"#,
        )
        .unwrap();

        let mut diag = Diagnostics::new();
        let basemap = load_basemap(&dir, &mut diag);
        fs::remove_dir_all(&dir).unwrap();

        assert_eq!(basemap.attribution(), NATURAL_EARTH_ATTRIBUTION);
        let warnings: Vec<_> = diag.at_level(log::Level::Warn).collect();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("ne_110m_coastline.json"));
        assert_eq!(diag.entries().len(), 1);
    }

    #[test]
    fn test_geojson_lines_are_extracted() {
        let geojson: GeoJson = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {},
                 "geometry": {"type": "LineString", "coordinates": [[78.0, 30.0], [79.0, 31.0]]}},
                {"type": "Feature", "properties": {},
                 "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]], [[0.2,0.2],[0.4,0.2],[0.2,0.4],[0.2,0.2]]]}},
                {"type": "Feature", "properties": {},
                 "geometry": {"type": "Point", "coordinates": [80.0, 30.0]}}
            ]
        }"#
        .parse()
        .unwrap();

        let mut lines = Vec::new();
        process_geojson_lines(&geojson, &mut |line| lines.push(line));

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], vec![(78.0, 30.0), (79.0, 31.0)]);
        // Only the exterior ring of the polygon
        assert_eq!(lines[1].len(), 4);
    }
}
