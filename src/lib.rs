//! Streaming parser and in-memory model for OpenStreetMap XML data.
//!
//! An OSM document is read in one sequential pass: element events build one
//! entity at a time, a pluggable [`OsmFilter`] decides what is admitted, and
//! after the stream is drained a resolution pass replaces every by-id
//! reference with the entity it names. Ways and relations whose references
//! point outside the document are reported on the result instead of failing
//! the parse. A small blocking [`ApiClient`] fetches entities and paginated
//! GPS trackpoints from an OSM API server, and [`GpsTracks`] reads and
//! writes the GPX track format.

pub mod client;
pub mod data;
pub mod errors;
pub mod parse;

mod resolve;

pub use client::{ApiClient, ClientConfig};
pub use data::gps::{BBox, GpsTracks};
pub use data::osm::{
    EntityRef, Member, Node, OsmId, Relation, Tags, UnresolvedRelation, UnresolvedWay, Way,
};
pub use data::OsmDocument;
pub use errors::{Error, Result};
pub use parse::{KeepAll, OsmFilter};
