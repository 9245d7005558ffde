use std::collections::HashMap;
use std::io::BufRead;
use std::mem;

use log::{debug, warn};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::data::osm::{EntityRef, Node, OsmId, Tags, UnresolvedRelation, UnresolvedWay};
use crate::data::OsmDocument;
use crate::errors::{Error, Result};
use crate::parse::{coord_attr, id_attr, required_attr, OsmFilter};
use crate::resolve;

/// The entity currently being accumulated. OSM XML never nests node, way and
/// relation elements, so at most one of them is open at any time; anything
/// else is a structural error rather than something to silently overwrite.
enum Current {
    Idle,
    Node(Node),
    Way(UnresolvedWay),
    Relation(UnresolvedRelation),
}

impl Current {
    fn describe(&self) -> &'static str {
        match self {
            Current::Idle => "nothing",
            Current::Node(_) => "a <node>",
            Current::Way(_) => "a <way>",
            Current::Relation(_) => "a <relation>",
        }
    }
}

struct OsmXmlParser<'f, F: OsmFilter> {
    filter: &'f mut F,
    current: Current,
    nodes: HashMap<OsmId, Node>,
    ways: HashMap<OsmId, UnresolvedWay>,
    relations: HashMap<OsmId, UnresolvedRelation>,
    unknown_elements: Vec<String>,
}

/// Drain `reader` and build the resolved document. Fatal errors (malformed
/// XML, structural violations) abort immediately; dangling references and
/// unrecognized elements are reported on the returned document instead.
pub fn read_document<R: BufRead, F: OsmFilter>(
    reader: &mut Reader<R>,
    filter: &mut F,
) -> Result<OsmDocument> {
    let mut parser = OsmXmlParser {
        filter,
        current: Current::Idle,
        nodes: HashMap::new(),
        ways: HashMap::new(),
        relations: HashMap::new(),
        unknown_elements: Vec::new(),
    };

    let mut buf = Vec::new();
    let mut depth = 0_usize;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::Start(e) => {
                depth += 1;
                parser.handle_start(&e)?;
            }
            Event::Empty(e) => {
                parser.handle_start(&e)?;
                parser.handle_end(e.name().as_ref())?;
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                parser.handle_end(e.name().as_ref())?;
            }
            Event::Text(e) => {
                return Err(Error::Structure(format!(
                    "unexpected text content {:?} in OSM document",
                    String::from_utf8_lossy(&e)
                )));
            }
            Event::CData(_) => {
                return Err(Error::Structure(
                    "unexpected CDATA section in OSM document".to_string(),
                ));
            }
            Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => (),
        }
        buf.clear();
    }

    if depth != 0 || !matches!(parser.current, Current::Idle) {
        return Err(Error::Structure(
            "document ended with unclosed elements".to_string(),
        ));
    }

    Ok(resolve::resolve_document(
        parser.nodes,
        parser.ways,
        parser.relations,
        parser.unknown_elements,
    ))
}

impl<F: OsmFilter> OsmXmlParser<'_, F> {
    fn handle_start(&mut self, e: &BytesStart) -> Result<()> {
        match e.name().as_ref() {
            b"node" => {
                self.require_idle("node")?;
                self.current = Current::Node(Node {
                    id: Some(id_attr(e, "node", "id")?),
                    lat: coord_attr(e, "node", "lat")?,
                    lon: coord_attr(e, "node", "lon")?,
                    tags: Tags::new(),
                });
            }
            b"way" => {
                self.require_idle("way")?;
                self.current = Current::Way(UnresolvedWay::new(id_attr(e, "way", "id")?));
            }
            b"relation" => {
                self.require_idle("relation")?;
                self.current =
                    Current::Relation(UnresolvedRelation::new(id_attr(e, "relation", "id")?));
            }
            b"tag" => {
                let tags = match &mut self.current {
                    Current::Node(node) => &mut node.tags,
                    Current::Way(way) => &mut way.tags,
                    Current::Relation(relation) => &mut relation.tags,
                    Current::Idle => {
                        warn!("skipping <tag> outside of any entity");
                        return Ok(());
                    }
                };
                let k = required_attr(e, "tag", "k")?;
                let v = required_attr(e, "tag", "v")?;
                tags.insert(k, v);
            }
            b"nd" => match &mut self.current {
                Current::Way(way) => {
                    way.node_refs.push(id_attr(e, "nd", "ref")?);
                }
                Current::Node(_) => {
                    return Err(Error::Structure(
                        "<nd> encountered while a <node> is open".to_string(),
                    ));
                }
                Current::Idle | Current::Relation(_) => {
                    return Err(Error::Structure(
                        "<nd> encountered outside of a <way>".to_string(),
                    ));
                }
            },
            b"member" => match &mut self.current {
                Current::Relation(relation) => {
                    let member_type = required_attr(e, "member", "type")?;
                    let member_ref = id_attr(e, "member", "ref")?;
                    let role = required_attr(e, "member", "role")?;
                    let member = match member_type.as_str() {
                        "node" => EntityRef::Node(member_ref),
                        "way" => EntityRef::Way(member_ref),
                        "relation" => EntityRef::Relation(member_ref),
                        other => {
                            return Err(Error::Structure(format!(
                                "unknown <member> type {other:?}"
                            )));
                        }
                    };
                    relation.add(member, &role);
                }
                _ => {
                    return Err(Error::Structure(
                        "<member> encountered outside of a <relation>".to_string(),
                    ));
                }
            },
            b"osm" | b"bounds" => (),
            other => {
                let name = String::from_utf8_lossy(other).into_owned();
                warn!(element = name.as_str(); "skipping unrecognized element");
                self.unknown_elements.push(name);
            }
        }
        Ok(())
    }

    fn handle_end(&mut self, name: &[u8]) -> Result<()> {
        match name {
            b"node" => match mem::replace(&mut self.current, Current::Idle) {
                Current::Node(node) => {
                    if let Some(node) = self.filter.filter_node(node) {
                        match node.id {
                            Some(id) => {
                                if self.nodes.insert(id, node).is_some() {
                                    debug!(node = id; "duplicate node id, keeping the later one");
                                }
                            }
                            None => warn!("filter cleared the node id, dropping the node"),
                        }
                    }
                }
                current => return Err(end_mismatch("node", &current)),
            },
            b"way" => match mem::replace(&mut self.current, Current::Idle) {
                Current::Way(way) => {
                    if let Some(way) = self.filter.filter_way(way) {
                        if self.ways.insert(way.id, way).is_some() {
                            debug!("duplicate way id, keeping the later one");
                        }
                    }
                }
                current => return Err(end_mismatch("way", &current)),
            },
            b"relation" => match mem::replace(&mut self.current, Current::Idle) {
                Current::Relation(relation) => {
                    if self.relations.insert(relation.id, relation).is_some() {
                        debug!("duplicate relation id, keeping the later one");
                    }
                }
                current => return Err(end_mismatch("relation", &current)),
            },
            _ => (),
        }
        Ok(())
    }

    fn require_idle(&self, element: &str) -> Result<()> {
        match self.current {
            Current::Idle => Ok(()),
            ref current => Err(Error::Structure(format!(
                "<{element}> encountered while {} is still open",
                current.describe()
            ))),
        }
    }
}

fn end_mismatch(element: &str, current: &Current) -> Error {
    Error::Structure(format!(
        "</{element}> encountered while {} is open",
        current.describe()
    ))
}
