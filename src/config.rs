use clap::Parser;
use std::path::PathBuf;

/// Initial map center latitude (central Himalaya)
pub const DEFAULT_CENTER_LAT: f64 = 30.5;
/// Initial map center longitude (central Himalaya)
pub const DEFAULT_CENTER_LON: f64 = 79.5;
/// Initial zoom; about 22° of longitude across the map pane
pub const DEFAULT_ZOOM: f64 = 16.0;

/// Glacier marker radius in braille pixels
pub const MARKER_RADIUS: i32 = 1;
/// How far from a marker (in braille pixels) a click still selects it
pub const PICK_TOLERANCE: i32 = 3;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/api/glaciers";

/// Terminal map of glacier melt risk
#[derive(Parser, Debug, Clone)]
#[command(name = "glacier-map", version, about)]
pub struct Args {
    /// Endpoint serving the glacier collection as a JSON array
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Read the glacier collection from a local JSON file instead of the endpoint
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Directory with Natural Earth coastline and border GeoJSON files
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Where diagnostics are written (the terminal is owned by the map)
    #[arg(long, default_value = "glacier-map.log")]
    pub log_file: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["glacier-map"]);
        assert_eq!(args.endpoint, DEFAULT_ENDPOINT);
        assert!(args.file.is_none());
        assert_eq!(args.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn test_file_override() {
        let args = Args::parse_from(["glacier-map", "--file", "glaciers.json", "--data-dir", "/srv/ne"]);
        assert_eq!(args.file, Some(PathBuf::from("glaciers.json")));
        assert_eq!(args.data_dir, PathBuf::from("/srv/ne"));
    }
}
