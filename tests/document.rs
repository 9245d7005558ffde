use assert_approx_eq::assert_approx_eq;
use osmxml::{GpsTracks, Member, OsmDocument};

const EXTRACT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<osm version="0.5" generator="test">
  <bounds minlat="51.0" minlon="-0.3" maxlat="51.6" maxlon="0.4"/>
  <node id="1" lat="51.0" lon="-0.1"/>
  <node id="2" lat="51.5" lon="-0.2">
    <tag k="name" v="Fish &amp; Chips"/>
    <tag k="amenity" v="fast_food"/>
  </node>
  <node id="3" lat="51.5" lon="0.3"/>
  <way id="10">
    <nd ref="1"/>
    <nd ref="2"/>
    <nd ref="3"/>
    <tag k="highway" v="residential"/>
  </way>
  <way id="11">
    <nd ref="1"/>
    <nd ref="99"/>
  </way>
  <relation id="20">
    <member type="way" ref="10" role="outer"/>
    <member type="node" ref="3" role=""/>
    <tag k="type" v="multipolygon"/>
  </relation>
  <fixme severity="low"/>
  <node id="3" lat="51.51" lon="0.31"/>
</osm>
"#;

#[test]
fn full_extract_parses_and_resolves() {
    let doc = OsmDocument::from_reader(EXTRACT.as_bytes()).unwrap();

    // Three distinct node ids; the re-declared node 3 wins.
    assert_eq!(doc.nodes.len(), 3);
    assert_eq!(doc.nodes[&3].lat, 51.51);
    assert_eq!(doc.nodes[&2].tags["name"], "Fish & Chips");

    // Way 10 resolved in order, way 11 dropped for its dangling ref.
    let way = &doc.ways[&10];
    let ids: Vec<_> = way.nodes.iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![Some(1), Some(2), Some(3)]);
    assert_eq!(doc.invalid_ways.len(), 1);
    assert_eq!(doc.invalid_ways[0].id, 11);
    assert!(!doc.ways.contains_key(&11));

    // Length is the sum over consecutive pairs of the resolved sequence.
    let expected = way.nodes[0].distance(&way.nodes[1]) + way.nodes[1].distance(&way.nodes[2]);
    assert_approx_eq!(way.length(), expected, 1e-9);
    assert!(way.length() > 0.0);

    // The relation stored on its end tag, members resolved.
    let relation = &doc.relations[&20];
    assert_eq!(relation.tags["type"], "multipolygon");
    assert!(relation.roles["outer"]
        .iter()
        .any(|m| matches!(m, Member::Way(w) if w.id == Some(10))));
    assert!(relation.roles[""]
        .iter()
        .any(|m| matches!(m, Member::Node(n) if n.id == Some(3))));

    // The stray element is reported, not fatal.
    assert_eq!(doc.unknown_elements, vec!["fixme"]);
}

#[test]
fn resolved_ways_feed_gpx_output() {
    let doc = OsmDocument::from_reader(EXTRACT.as_bytes()).unwrap();

    // Hand the resolved path over as a GPS track and write it out as GPX.
    let mut way = doc.ways[&10].clone();
    way.id = None;
    way.tags.clear();
    for node in &mut way.nodes {
        node.id = None;
        node.tags.clear();
    }
    let tracks = GpsTracks { tracks: vec![way] };

    let mut bytes = Vec::new();
    tracks.write_gpx(&mut bytes).unwrap();
    let reparsed = GpsTracks::from_reader(bytes.as_slice()).unwrap();

    assert_eq!(reparsed, tracks);
    assert_eq!(reparsed.point_count(), 3);
}
