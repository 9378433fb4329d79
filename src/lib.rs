//! Streaming clean-up of OpenStreetMap XML exports into relational tables.
//!
//! One pass of [`parse_osm::OsmElementReader`] feeds the
//! [`extract::RecordExtractor`], which classifies tag keys, repairs postal
//! codes, street names and building categories, and hands typed records to a
//! [`sink::RecordSink`]. A separate pass feeds the [`audit::AuditAccumulator`].

pub mod audit;
pub mod clean;
pub mod config;
pub mod data;
pub mod errors;
pub mod etl;
pub mod extract;
pub mod parse_osm;
pub mod sink;
