use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::debug;
use serde::Deserialize;

use crate::data::gps::{BBox, GpsTracks};
use crate::data::osm::OsmId;
use crate::data::OsmDocument;
use crate::errors::Result;

/// API root used when no configuration is supplied.
pub const DEFAULT_API_BASE: &str = "http://api.openstreetmap.org/api/0.5";

/// The trackpoints endpoint serves at most this many points per page; a page
/// contributing fewer is the last one.
pub const TRACKPOINTS_PAGE_SIZE: usize = 5000;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> ClientConfig {
        ClientConfig {
            base_url: DEFAULT_API_BASE.to_string(),
            user_agent: format!("osmxml/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Load the configuration from a JSON file. Missing fields fall back to
    /// the defaults.
    pub fn from_path(path: impl AsRef<Path>) -> Result<ClientConfig> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }
}

/// Blocking client for the OSM API. Construct one explicitly and pass it
/// where it is needed; there is deliberately no ambient default instance.
///
/// Fetched documents stream straight from the response body into the
/// parser; no scratch files are created.
pub struct ApiClient {
    config: ClientConfig,
    agent: ureq::Agent,
}

impl ApiClient {
    pub fn new() -> ApiClient {
        ApiClient::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> ApiClient {
        let agent = ureq::AgentBuilder::new()
            .user_agent(&config.user_agent)
            .build();
        ApiClient { config, agent }
    }

    pub fn fetch_node(&self, id: OsmId) -> Result<OsmDocument> {
        self.fetch_entity("node", id)
    }

    pub fn fetch_way(&self, id: OsmId) -> Result<OsmDocument> {
        self.fetch_entity("way", id)
    }

    pub fn fetch_relation(&self, id: OsmId) -> Result<OsmDocument> {
        self.fetch_entity("relation", id)
    }

    fn fetch_entity(&self, kind: &str, id: OsmId) -> Result<OsmDocument> {
        let url = self.url_for(&format!("{kind}/{id}"));
        debug!(url = url.as_str(); "fetching OSM entity");
        let response = self.agent.get(&url).call()?;
        OsmDocument::from_reader(BufReader::new(response.into_reader()))
    }

    /// Download every GPS track page intersecting `bbox`. Pages are fetched
    /// starting at 0 and appended to one track list; the loop stops after
    /// the first page contributing fewer than [`TRACKPOINTS_PAGE_SIZE`] new
    /// points.
    pub fn fetch_trackpoints(&self, bbox: &BBox) -> Result<GpsTracks> {
        let mut tracks = GpsTracks::default();
        let mut page = 0_u32;

        loop {
            let url = self.url_for(&format!("trackpoints?bbox={bbox}&page={page}"));
            debug!(url = url.as_str(); "fetching trackpoint page");
            let response = self.agent.get(&url).call()?;
            let added = tracks.append_from_reader(BufReader::new(response.into_reader()))?;
            if added < TRACKPOINTS_PAGE_SIZE {
                break;
            }
            page += 1;
        }

        Ok(tracks)
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }
}

impl Default for ApiClient {
    fn default() -> ApiClient {
        ApiClient::new()
    }
}
