mod basemap;
mod geometry;
mod markers;
mod projection;
mod spatial;
mod surface;

pub use basemap::{Basemap, LineString, Lod};
pub use markers::{MapMarker, MarkerArena, MarkerId, MarkerStyle};
pub use projection::Viewport;
pub use surface::{GlacierMap, MapLayers};
