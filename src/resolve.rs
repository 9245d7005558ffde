//! Post-parse reference resolution. Runs once, strictly after the event
//! stream is drained, because a way may reference nodes that appear later in
//! the document.

use std::collections::{HashMap, HashSet};

use log::warn;

use crate::data::osm::{
    EntityRef, Member, Node, OsmId, Relation, UnresolvedRelation, UnresolvedWay, Way,
};
use crate::data::OsmDocument;

/// Replace every placeholder id with the referenced entity. Ways resolve
/// first; relations then resolve against the surviving ways, so a way
/// dropped for a dangling node also invalidates the relations naming it.
/// Dangling references are never fatal: the owning way or relation moves to
/// the corresponding `invalid_*` report and resolution continues.
pub(crate) fn resolve_document(
    nodes: HashMap<OsmId, Node>,
    ways: HashMap<OsmId, UnresolvedWay>,
    relations: HashMap<OsmId, UnresolvedRelation>,
    unknown_elements: Vec<String>,
) -> OsmDocument {
    let mut resolved_ways = HashMap::with_capacity(ways.len());
    let mut invalid_ways = Vec::new();

    for (id, way) in ways {
        match resolve_way(&way, &nodes) {
            Some(resolved) => {
                resolved_ways.insert(id, resolved);
            }
            None => {
                warn!(way = way.id; "way references a node missing from the document, skipping");
                invalid_ways.push(way);
            }
        }
    }

    // Relation members of type relation are validated against the ids seen
    // in the document, not against the survivors: relations may legally
    // reference each other in cycles, so there is no safe resolution order.
    let relation_ids: HashSet<OsmId> = relations.keys().copied().collect();

    let mut resolved_relations = HashMap::with_capacity(relations.len());
    let mut invalid_relations = Vec::new();

    for (id, relation) in relations {
        match resolve_relation(&relation, &nodes, &resolved_ways, &relation_ids) {
            Some(resolved) => {
                resolved_relations.insert(id, resolved);
            }
            None => {
                warn!(relation = relation.id; "relation has an unresolvable member, skipping");
                invalid_relations.push(relation);
            }
        }
    }

    OsmDocument {
        nodes,
        ways: resolved_ways,
        relations: resolved_relations,
        invalid_ways,
        invalid_relations,
        unknown_elements,
    }
}

fn resolve_way(way: &UnresolvedWay, nodes: &HashMap<OsmId, Node>) -> Option<Way> {
    let mut resolved = Vec::with_capacity(way.node_refs.len());
    for node_ref in &way.node_refs {
        resolved.push(nodes.get(node_ref)?.clone());
    }
    Some(Way {
        id: Some(way.id),
        nodes: resolved,
        tags: way.tags.clone(),
    })
}

fn resolve_relation(
    relation: &UnresolvedRelation,
    nodes: &HashMap<OsmId, Node>,
    ways: &HashMap<OsmId, Way>,
    relation_ids: &HashSet<OsmId>,
) -> Option<Relation> {
    let mut roles = HashMap::with_capacity(relation.members.len());
    for (role, members) in &relation.members {
        let mut resolved = Vec::with_capacity(members.len());
        for member in members {
            let member = match member {
                EntityRef::Node(id) => Member::Node(nodes.get(id)?.clone()),
                EntityRef::Way(id) => Member::Way(ways.get(id)?.clone()),
                EntityRef::Relation(id) => {
                    if !relation_ids.contains(id) {
                        return None;
                    }
                    Member::Relation(*id)
                }
            };
            resolved.push(member);
        }
        roles.insert(role.clone(), resolved);
    }
    Some(Relation {
        id: relation.id,
        roles,
        tags: relation.tags.clone(),
    })
}
