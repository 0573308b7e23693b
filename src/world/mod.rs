pub mod environment;
pub mod spatial;
pub mod zones;

pub use environment::EnvironmentTree;
pub use spatial::SpatialIndex;
pub use zones::{TileRect, Zone, ZoneRegistry};
