use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::data::osm::{Node, Tags, Way};
use crate::errors::{Error, Result};
use crate::parse::coord_attr;

/// Read the track segments out of a GPX-like stream.
///
/// Only `trkseg` and `trkpt` are interpreted; everything else a GPX file
/// carries (metadata, names, timestamps, elevations and their text content)
/// is skipped. Track points have no ids and no tags, so each segment comes
/// back as an id-less [`Way`].
pub fn read_tracks<R: BufRead>(reader: &mut Reader<R>) -> Result<Vec<Way>> {
    let mut tracks = Vec::new();
    let mut current: Option<Way> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::Start(e) => handle_start(&e, &mut current)?,
            Event::Empty(e) => {
                handle_start(&e, &mut current)?;
                handle_end(e.name().as_ref(), &mut current, &mut tracks);
            }
            Event::End(e) => handle_end(e.name().as_ref(), &mut current, &mut tracks),
            _ => (),
        }
        buf.clear();
    }

    if current.is_some() {
        return Err(Error::Structure(
            "stream ended with a <trkseg> still open".to_string(),
        ));
    }

    Ok(tracks)
}

fn handle_start(e: &BytesStart, current: &mut Option<Way>) -> Result<()> {
    match e.name().as_ref() {
        b"trkseg" => {
            if current.is_some() {
                return Err(Error::Structure("nested <trkseg> elements".to_string()));
            }
            *current = Some(Way::default());
        }
        b"trkpt" => match current {
            Some(way) => way.nodes.push(Node {
                id: None,
                lat: coord_attr(e, "trkpt", "lat")?,
                lon: coord_attr(e, "trkpt", "lon")?,
                tags: Tags::new(),
            }),
            None => {
                return Err(Error::Structure(
                    "<trkpt> encountered before any <trkseg>".to_string(),
                ));
            }
        },
        _ => (),
    }
    Ok(())
}

fn handle_end(name: &[u8], current: &mut Option<Way>, tracks: &mut Vec<Way>) {
    if name == b"trkseg" {
        if let Some(way) = current.take() {
            tracks.push(way);
        }
    }
}
