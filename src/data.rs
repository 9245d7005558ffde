use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use crate::errors::Result;
use crate::parse::{self, KeepAll, OsmFilter};

use self::osm::{Node, OsmId, Relation, UnresolvedRelation, UnresolvedWay, Way};

pub mod gps;
pub mod osm;

/// Map data as defined by an .osm document, after reference resolution.
/// Entities are owned by the document and keyed by id; on duplicate ids the
/// last-parsed entity wins. Ways and relations whose references could not be
/// resolved are kept out of the maps and reported instead.

#[derive(Debug, Default, Clone, PartialEq)]
pub struct OsmDocument {
    pub nodes: HashMap<OsmId, Node>,
    pub ways: HashMap<OsmId, Way>,
    pub relations: HashMap<OsmId, Relation>,

    /// Ways dropped because a node reference pointed outside the document.
    pub invalid_ways: Vec<UnresolvedWay>,
    /// Relations dropped because a member reference could not be resolved.
    pub invalid_relations: Vec<UnresolvedRelation>,
    /// Element names encountered outside the OSM vocabulary, in document
    /// order. Parsing continues past them.
    pub unknown_elements: Vec<String>,
}

impl OsmDocument {
    /// Parse an OSM XML document from a file. Files ending in `.xz` are
    /// decompressed transparently.
    pub fn from_path(path: impl AsRef<Path>) -> Result<OsmDocument> {
        Self::from_path_with_filter(path, &mut KeepAll)
    }

    pub fn from_path_with_filter<F: OsmFilter>(
        path: impl AsRef<Path>,
        filter: &mut F,
    ) -> Result<OsmDocument> {
        let mut reader = parse::xml_reader_from_path(path.as_ref())?;
        parse::osm::read_document(&mut reader, filter)
    }

    /// Parse an OSM XML document from any buffered reader; the transport
    /// (file, network stream, in-memory buffer) does not matter.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<OsmDocument> {
        Self::from_reader_with_filter(reader, &mut KeepAll)
    }

    pub fn from_reader_with_filter<R: BufRead, F: OsmFilter>(
        reader: R,
        filter: &mut F,
    ) -> Result<OsmDocument> {
        let mut reader = parse::xml_reader(reader);
        parse::osm::read_document(&mut reader, filter)
    }
}
