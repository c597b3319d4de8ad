use crate::glacier::RiskLevel;
use crate::map::projection::Viewport;
use crate::map::spatial::SpatialGrid;
use ratatui::style::Color;

/// Spatial index cell size in degrees
const INDEX_CELL_DEGREES: f64 = 0.5;

/// Stable handle of a marker inside its arena
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(pub usize);

/// Point marker appearance. The same color is used for fill and stroke.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkerStyle {
    pub color: Color,
    /// Radius in braille pixels
    pub radius: i32,
}

/// A glacier marker and the index of the record it was created from
#[derive(Clone, Debug)]
pub struct MapMarker {
    pub id: MarkerId,
    pub lat: f64,
    pub lon: f64,
    pub risk: RiskLevel,
    pub style: MarkerStyle,
    pub record: usize,
}

/// Append-only marker storage. Ids are positions in creation order and
/// never change, so a marker's record association lasts the whole session.
pub struct MarkerArena {
    markers: Vec<MapMarker>,
    index: SpatialGrid<MarkerId>,
}

impl MarkerArena {
    pub fn new() -> Self {
        Self {
            markers: Vec::new(),
            index: SpatialGrid::new(INDEX_CELL_DEGREES),
        }
    }

    pub fn push(&mut self, lat: f64, lon: f64, risk: RiskLevel, style: MarkerStyle, record: usize) -> MarkerId {
        let id = MarkerId(self.markers.len());
        self.markers.push(MapMarker {
            id,
            lat,
            lon,
            risk,
            style,
            record,
        });
        self.index.insert(lon, lat, id);
        id
    }

    pub fn get(&self, id: MarkerId) -> Option<&MapMarker> {
        self.markers.get(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MapMarker> {
        self.markers.iter()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Marker under a canvas pixel, within `tolerance` pixels.
    ///
    /// Nearest wins. On a tie the marker drawn on top wins: higher risk
    /// layers are drawn last, and within a layer later markers cover
    /// earlier ones.
    pub fn pick(&self, viewport: &Viewport, px: i32, py: i32, tolerance: i32) -> Option<MarkerId> {
        let (lon, lat) = viewport.unproject(px, py);
        // Beyond half the globe every cell is already covered
        let radius_degrees = ((tolerance + 1) as f64 * viewport.degrees_per_pixel()).min(180.0);
        let max_dist = tolerance * tolerance;

        self.index
            .query_radius(lon, lat, radius_degrees)
            .into_iter()
            .filter_map(|idx| self.index.get(idx))
            .filter_map(|&id| self.get(id))
            .filter_map(|m| {
                let (mx, my) = viewport.project(m.lon, m.lat);
                let d = (mx - px) * (mx - px) + (my - py) * (my - py);
                (d <= max_dist).then_some((d, m))
            })
            .min_by(|(da, a), (db, b)| {
                da.cmp(db)
                    .then_with(|| draw_rank(b.risk).cmp(&draw_rank(a.risk)))
                    .then_with(|| b.id.cmp(&a.id))
            })
            .map(|(_, m)| m.id)
    }
}

impl Default for MarkerArena {
    fn default() -> Self {
        Self::new()
    }
}

/// Position of a risk layer in draw order (higher is drawn later)
fn draw_rank(risk: RiskLevel) -> usize {
    RiskLevel::ALL.iter().position(|&r| r == risk).unwrap_or(0)
}
