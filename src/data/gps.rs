use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::data::osm::Way;
use crate::errors::Result;
use crate::parse;

/// Geographic bounding box in decimal degrees.
///
/// Longitude maps onto `left`/`right`, latitude onto `bottom`/`top`. The
/// `min_*`/`max_*` accessors follow that single convention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub top: f64,
}

impl BBox {
    pub fn new(left: f64, bottom: f64, right: f64, top: f64) -> BBox {
        BBox {
            left,
            bottom,
            right,
            top,
        }
    }

    pub fn min_lon(&self) -> f64 {
        self.left
    }

    pub fn max_lon(&self) -> f64 {
        self.right
    }

    pub fn min_lat(&self) -> f64 {
        self.bottom
    }

    pub fn max_lat(&self) -> f64 {
        self.top
    }
}

/// Formats as the `left,bottom,right,top` quadruple the trackpoints API
/// expects in its `bbox` query parameter.
impl fmt::Display for BBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.left, self.bottom, self.right, self.top)
    }
}

/// GPS track segments downloaded from the trackpoints API or read from a
/// GPX stream. Each track is a way-shaped point sequence without ids or
/// tags.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GpsTracks {
    pub tracks: Vec<Way>,
}

impl GpsTracks {
    /// Parse a GPX-like stream into a fresh track list.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<GpsTracks> {
        let mut tracks = GpsTracks::default();
        tracks.append_from_reader(reader)?;
        Ok(tracks)
    }

    /// Parse a GPX-like stream and append its segments, returning the number
    /// of points added. Paginated downloads call this once per page and stop
    /// on the first page that comes up short.
    pub fn append_from_reader<R: BufRead>(&mut self, reader: R) -> Result<usize> {
        let mut xml = parse::xml_reader(reader);
        let segments = parse::gpx::read_tracks(&mut xml)?;
        let added = segments.iter().map(|way| way.nodes.len()).sum();
        self.tracks.extend(segments);
        Ok(added)
    }

    /// Total number of track points over all segments.
    pub fn point_count(&self) -> usize {
        self.tracks.iter().map(|way| way.nodes.len()).sum()
    }

    /// Write the tracks as a GPX 1.0 document.
    pub fn write_gpx<W: Write>(&self, mut writer: W) -> Result<()> {
        let document = GpxDocument {
            version: "1.0",
            creator: "osmxml",
            xmlns: "http://www.topografix.com/GPS/1/0/",
            tracks: self
                .tracks
                .iter()
                .map(|way| GpxTrack {
                    segment: GpxSegment {
                        points: way
                            .nodes
                            .iter()
                            .map(|node| GpxPoint {
                                lat: node.lat,
                                lon: node.lon,
                            })
                            .collect(),
                    },
                })
                .collect(),
        };

        let mut body = String::new();
        quick_xml::se::to_writer(&mut body, &document)?;

        writer.write_all(b"<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n")?;
        writer.write_all(body.as_bytes())?;
        Ok(())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path)?;
        self.write_gpx(BufWriter::new(file))
    }
}

#[derive(Serialize)]
#[serde(rename = "gpx")]
struct GpxDocument {
    #[serde(rename = "@version")]
    version: &'static str,
    #[serde(rename = "@creator")]
    creator: &'static str,
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,
    #[serde(rename = "trk")]
    tracks: Vec<GpxTrack>,
}

#[derive(Serialize)]
struct GpxTrack {
    #[serde(rename = "trkseg")]
    segment: GpxSegment,
}

#[derive(Serialize)]
struct GpxSegment {
    #[serde(rename = "trkpt")]
    points: Vec<GpxPoint>,
}

#[derive(Serialize)]
struct GpxPoint {
    #[serde(rename = "@lat")]
    lat: f64,
    #[serde(rename = "@lon")]
    lon: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::osm::{Node, Tags};

    fn point(lat: f64, lon: f64) -> Node {
        Node {
            id: None,
            lat,
            lon,
            tags: Tags::new(),
        }
    }

    #[test]
    fn bbox_accessors_are_consistent() {
        let bbox = BBox::new(-0.2, 51.0, 0.3, 51.5);
        assert_eq!(bbox.min_lon(), -0.2);
        assert_eq!(bbox.max_lon(), 0.3);
        assert_eq!(bbox.min_lat(), 51.0);
        assert_eq!(bbox.max_lat(), 51.5);
    }

    #[test]
    fn bbox_query_order_is_left_bottom_right_top() {
        let bbox = BBox::new(-0.2, 51.0, 0.3, 51.5);
        assert_eq!(bbox.to_string(), "-0.2,51,0.3,51.5");
    }

    #[test]
    fn gpx_round_trip() {
        let tracks = GpsTracks {
            tracks: vec![
                Way {
                    id: None,
                    nodes: vec![point(51.0, -0.1), point(51.1, -0.2)],
                    tags: Tags::new(),
                },
                Way {
                    id: None,
                    nodes: vec![point(52.5, 13.4)],
                    tags: Tags::new(),
                },
            ],
        };

        let mut bytes = Vec::new();
        tracks.write_gpx(&mut bytes).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));

        let reparsed = GpsTracks::from_reader(text.as_bytes()).unwrap();
        assert_eq!(reparsed, tracks);
    }

    #[test]
    fn point_count_sums_all_segments() {
        let tracks = GpsTracks {
            tracks: vec![
                Way {
                    id: None,
                    nodes: vec![point(51.0, -0.1), point(51.1, -0.2)],
                    tags: Tags::new(),
                },
                Way {
                    id: None,
                    nodes: vec![point(52.5, 13.4)],
                    tags: Tags::new(),
                },
            ],
        };
        assert_eq!(tracks.point_count(), 3);
    }
}
