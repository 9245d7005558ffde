use std::collections::{HashMap, HashSet};

/// Stable OSM entity id. Synthetic entities (GPS track points and segments)
/// carry no id at all, so owners store `Option<OsmId>`.
pub type OsmId = u64;

pub type Tags = HashMap<String, String>;

/// Spherical Earth radius in metres. Not WGS84-accurate, but the value the
/// distance formula is calibrated against.
const EARTH_RADIUS_M: f64 = 6_372_795.0;

/// Reference to an entity by id only, before resolution.
///
/// These are what `<nd ref=".."/>` and `<member .../>` produce while the
/// document is still being read. None may remain in a resolved way or
/// relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityRef {
    Node(OsmId),
    Way(OsmId),
    Relation(OsmId),
}

impl EntityRef {
    pub fn id(&self) -> OsmId {
        match self {
            EntityRef::Node(id) | EntityRef::Way(id) | EntityRef::Relation(id) => *id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: Option<OsmId>,
    pub lat: f64,
    pub lon: f64,
    pub tags: Tags,
}

impl Node {
    /// Great-circle distance to `other` in metres.
    ///
    /// Uses the atan2 form of the spherical law of cosines, so antipodal and
    /// coincident points are both numerically stable.
    pub fn distance(&self, other: &Node) -> f64 {
        debug_assert!(self.lat.is_finite() && self.lon.is_finite());
        debug_assert!(other.lat.is_finite() && other.lon.is_finite());

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let d_lon = other.lon.to_radians() - self.lon.to_radians();

        let y = ((lat2.cos() * d_lon.sin()).powi(2)
            + (lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos()).powi(2))
        .sqrt();
        let x = lat1.sin() * lat2.sin() + lat1.cos() * lat2.cos() * d_lon.cos();

        y.atan2(x) * EARTH_RADIUS_M
    }

    /// Whether the two nodes denote the same OSM entity: ids equal and both
    /// present. Synthetic nodes are never the same entity as anything.
    pub fn same_entity(&self, other: &Node) -> bool {
        match (self.id, other.id) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

/// An ordered node sequence. Order is semantically significant: it defines
/// the path. GPS track segments reuse this shape with `id: None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Way {
    pub id: Option<OsmId>,
    pub nodes: Vec<Node>,
    pub tags: Tags,
}

impl Way {
    /// Length of the way in metres, summed over consecutive node pairs.
    /// A way with fewer than two nodes has length 0.
    pub fn length(&self) -> f64 {
        self.nodes
            .windows(2)
            .map(|pair| pair[0].distance(&pair[1]))
            .sum()
    }
}

/// A way as accumulated during parsing: node references are still bare ids.
/// Also the payload of `invalid_ways` when resolution fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedWay {
    pub id: OsmId,
    pub node_refs: Vec<OsmId>,
    pub tags: Tags,
}

impl UnresolvedWay {
    pub fn new(id: OsmId) -> UnresolvedWay {
        UnresolvedWay {
            id,
            node_refs: Vec::new(),
            tags: Tags::new(),
        }
    }
}

/// A resolved relation member. Node and way members embed resolved copies;
/// relation members stay id handles so cyclic relation graphs cannot send
/// resolution or traversal into a loop.
#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    Node(Node),
    Way(Way),
    Relation(OsmId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    pub id: OsmId,
    /// Members grouped by role. "" is the untagged role. Within a role the
    /// members are unique (deduplicated while still id references) but
    /// carry no meaningful order.
    pub roles: HashMap<String, Vec<Member>>,
    pub tags: Tags,
}

/// A relation as accumulated during parsing, members still bare ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedRelation {
    pub id: OsmId,
    pub members: HashMap<String, HashSet<EntityRef>>,
    pub tags: Tags,
}

impl UnresolvedRelation {
    pub fn new(id: OsmId) -> UnresolvedRelation {
        UnresolvedRelation {
            id,
            members: HashMap::new(),
            tags: Tags::new(),
        }
    }

    /// Add `member` under `role`. "" is the untagged role. Adding the same
    /// (role, member) pair twice is a no-op.
    pub fn add(&mut self, member: EntityRef, role: &str) {
        self.members.entry(role.to_string()).or_default().insert(member);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn node(id: OsmId, lat: f64, lon: f64) -> Node {
        Node {
            id: Some(id),
            lat,
            lon,
            tags: Tags::new(),
        }
    }

    #[test]
    fn distance_is_symmetric() {
        let bergen = node(1, 60.39, 5.32);
        let trondheim = node(2, 63.43, 10.39);
        assert_eq!(bergen.distance(&trondheim), trondheim.distance(&bergen));
    }

    #[test]
    fn distance_to_self_is_zero() {
        let n = node(1, 51.0, -0.1);
        assert_eq!(n.distance(&n), 0.0);
    }

    #[test]
    fn distance_bergen_trondheim() {
        let bergen = node(1, 60.39, 5.32);
        let trondheim = node(2, 63.43, 10.39);
        assert_approx_eq!(bergen.distance(&trondheim), 429_659.58, 0.5);
    }

    #[test]
    fn distance_one_degree_at_equator() {
        let a = node(1, 0.0, 0.0);
        let b = node(2, 0.0, 1.0);
        assert_approx_eq!(a.distance(&b), 111_226.26, 0.5);
    }

    #[test]
    fn way_length_sums_consecutive_pairs() {
        let a = node(1, 51.0, -0.1);
        let b = node(2, 51.5, -0.2);
        let c = node(3, 51.5, 0.3);
        let expected = a.distance(&b) + b.distance(&c);
        let way = Way {
            id: Some(10),
            nodes: vec![a, b, c],
            tags: Tags::new(),
        };
        assert_approx_eq!(way.length(), expected, 1e-9);
    }

    #[test]
    fn short_ways_have_zero_length() {
        let empty = Way::default();
        assert_eq!(empty.length(), 0.0);

        let single = Way {
            id: Some(1),
            nodes: vec![node(1, 51.0, -0.1)],
            tags: Tags::new(),
        };
        assert_eq!(single.length(), 0.0);
    }

    #[test]
    fn relation_add_is_idempotent() {
        let mut relation = UnresolvedRelation::new(7);
        relation.add(EntityRef::Way(1), "outer");
        relation.add(EntityRef::Node(2), "outer");
        relation.add(EntityRef::Way(1), "outer");

        let outer = &relation.members["outer"];
        assert_eq!(outer.len(), 2);
        assert!(outer.contains(&EntityRef::Way(1)));
        assert!(outer.contains(&EntityRef::Node(2)));
    }

    #[test]
    fn relation_roles_are_distinct() {
        let mut relation = UnresolvedRelation::new(7);
        relation.add(EntityRef::Way(1), "outer");
        relation.add(EntityRef::Way(1), "inner");
        assert_eq!(relation.members["outer"].len(), 1);
        assert_eq!(relation.members["inner"].len(), 1);
    }

    #[test]
    fn same_entity_needs_both_ids() {
        let a = node(1, 51.0, -0.1);
        let b = node(1, 52.0, -0.2);
        let synthetic = Node {
            id: None,
            lat: 51.0,
            lon: -0.1,
            tags: Tags::new(),
        };
        assert!(a.same_entity(&b));
        assert!(!a.same_entity(&synthetic));
        assert!(!synthetic.same_entity(&synthetic.clone()));
    }
}
