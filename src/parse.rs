use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::events::BytesStart;
use quick_xml::reader::Reader;
use xz::bufread::XzDecoder;

use crate::data::osm::{Node, OsmId, UnresolvedWay};
use crate::errors::{Error, Result};

pub mod gpx;
pub mod osm;

/// Hook applied to every completed node and way before it is admitted into
/// the document. Returning `None` drops the entity; returning a modified
/// value stores the modification. This is the extension point for bounding
/// box clipping, tag-based exclusion and similar trimming.
///
/// Ways arrive unresolved (node references still bare ids) because the
/// filter runs while the rest of the document is still being read.
pub trait OsmFilter {
    fn filter_node(&mut self, node: Node) -> Option<Node> {
        Some(node)
    }

    fn filter_way(&mut self, way: UnresolvedWay) -> Option<UnresolvedWay> {
        Some(way)
    }
}

/// Admits every entity unchanged.
#[derive(Debug, Default)]
pub struct KeepAll;

impl OsmFilter for KeepAll {}

pub(crate) fn xml_reader<R: BufRead>(reader: R) -> Reader<R> {
    let mut reader = Reader::from_reader(reader);
    reader.trim_text(true);
    reader
}

/// Open an XML document on disk, decompressing `.xz` files transparently.
pub(crate) fn xml_reader_from_path(path: &Path) -> Result<Reader<Box<dyn BufRead>>> {
    let file = File::open(path)?;
    let file_reader = BufReader::new(file);

    let source: Box<dyn BufRead> = if path.extension().is_some_and(|ext| ext == "xz") {
        Box::new(BufReader::new(XzDecoder::new(file_reader)))
    } else {
        Box::new(file_reader)
    };

    Ok(xml_reader(source))
}

pub(crate) fn attr_value(element: &BytesStart, name: &str) -> Result<Option<String>> {
    for attr in element.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == name.as_bytes() {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

pub(crate) fn required_attr(
    element: &BytesStart,
    element_name: &'static str,
    name: &'static str,
) -> Result<String> {
    attr_value(element, name)?.ok_or(Error::MissingAttribute {
        element: element_name,
        name,
    })
}

pub(crate) fn id_attr(
    element: &BytesStart,
    element_name: &'static str,
    name: &'static str,
) -> Result<OsmId> {
    let value = required_attr(element, element_name, name)?;
    value.parse().map_err(|_| Error::InvalidAttribute {
        element: element_name,
        name,
        value,
    })
}

/// Decimal-degree attribute: must parse and must be finite, since the
/// distance math would otherwise silently produce NaN.
pub(crate) fn coord_attr(
    element: &BytesStart,
    element_name: &'static str,
    name: &'static str,
) -> Result<f64> {
    let value = required_attr(element, element_name, name)?;
    match value.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => Ok(parsed),
        _ => Err(Error::InvalidAttribute {
            element: element_name,
            name,
            value,
        }),
    }
}
