pub mod osm;
pub mod records;

pub use osm::{ElementKind, OsmElement, RawTag};
pub use records::{NodeRecord, TagRecord, TagValue, WayRecord, NO_NAMESPACE};
