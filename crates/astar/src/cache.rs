use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::{info, warn};
use serde::Deserialize;

use crate::error::AstarError;
use crate::graph::{RoadGraph, RoadGraphData, RoadNode};

/// Anything that can produce a road graph for a bounding box. Implemented by
/// [`OverpassSource`]; swappable in tests for a fixed in-memory graph.
#[async_trait]
pub trait OsmGraphSource: Send + Sync {
    async fn fetch_graph(
        &self,
        bbox: (f64, f64, f64, f64),
    ) -> Result<RoadGraphData, AstarError>;
}

const OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

/// Fetches a drivable/walkable road graph for a bbox from the Overpass API.
pub struct OverpassSource {
    client: reqwest::Client,
    base_url: String,
}

impl OverpassSource {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: OVERPASS_URL.to_owned(),
        }
    }

    #[cfg(test)]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl Default for OverpassSource {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    #[serde(rename = "type")]
    kind: String,
    id: i64,
    lat: Option<f64>,
    lon: Option<f64>,
    #[serde(default)]
    nodes: Vec<i64>,
}

#[async_trait]
impl OsmGraphSource for OverpassSource {
    async fn fetch_graph(
        &self,
        bbox: (f64, f64, f64, f64),
    ) -> Result<RoadGraphData, AstarError> {
        let (west, south, east, north) = bbox;
        let query = format!(
            "[out:json][timeout:60];way[highway][\"highway\"!~\"footway|steps\"]({south},{west},{north},{east})->.roads;(.roads;>;);out skel qt;"
        );

        info!("fetching osm road graph for bbox ({west},{south},{east},{north})");

        let response = self
            .client
            .post(&self.base_url)
            .form(&[("data", query.as_str())])
            .send()
            .await
            .map_err(|why| AstarError::GraphFetch(why.to_string()))?;

        let body: OverpassResponse = response
            .json()
            .await
            .map_err(|why| AstarError::GraphFetch(why.to_string()))?;

        Ok(overpass_to_graph_data(body))
    }
}

fn overpass_to_graph_data(response: OverpassResponse) -> RoadGraphData {
    let mut nodes = Vec::new();
    let mut edges = Vec::new();

    for element in &response.elements {
        if element.kind == "node" {
            if let (Some(lat), Some(lon)) = (element.lat, element.lon) {
                nodes.push(RoadNode { osm_id: element.id, lat, lon });
            }
        }
    }

    for element in &response.elements {
        if element.kind != "way" {
            continue;
        }
        for pair in element.nodes.windows(2) {
            edges.push((pair[0], pair[1], f64::NAN));
            edges.push((pair[1], pair[0], f64::NAN));
        }
    }

    RoadGraphData { nodes, edges }
}

/// Wraps an [`OsmGraphSource`] with a bbox-keyed on-disk cache. A fetched
/// graph is serialized to `{cache_dir}/{bbox_key}.json`; later calls for the
/// same (rounded) bbox are served from disk without a network round-trip.
pub struct CachedOsmSource<S> {
    inner: S,
    cache_dir: PathBuf,
}

impl<S: OsmGraphSource> CachedOsmSource<S> {
    pub fn new(inner: S, cache_dir: impl Into<PathBuf>) -> Self {
        Self { inner, cache_dir: cache_dir.into() }
    }

    pub async fn graph_for_bbox(&self, bbox: (f64, f64, f64, f64)) -> Result<RoadGraph, AstarError> {
        let path = self.cache_path(bbox);

        if let Some(data) = read_cache(&path) {
            return Ok(RoadGraph::from_data(&data));
        }

        let data = self.inner.fetch_graph(bbox).await?;
        write_cache(&path, &data);
        Ok(RoadGraph::from_data(&data))
    }

    fn cache_path(&self, bbox: (f64, f64, f64, f64)) -> PathBuf {
        let (west, south, east, north) = bbox;
        let key = format!(
            "{:.4}_{:.4}_{:.4}_{:.4}.json",
            west, south, east, north
        );
        self.cache_dir.join(key)
    }
}

fn read_cache(path: &Path) -> Option<RoadGraphData> {
    let bytes = std::fs::read(path).ok()?;
    match serde_json::from_slice(&bytes) {
        Ok(data) => Some(data),
        Err(why) => {
            warn!("discarding unreadable osm cache file {path:?}: {why}");
            None
        }
    }
}

fn write_cache(path: &Path, data: &RoadGraphData) {
    if let Some(parent) = path.parent() {
        if let Err(why) = std::fs::create_dir_all(parent) {
            warn!("could not create osm cache dir {parent:?}: {why}");
            return;
        }
    }
    match serde_json::to_vec(data) {
        Ok(bytes) => {
            if let Err(why) = std::fs::write(path, bytes) {
                warn!("could not write osm cache file {path:?}: {why}");
            }
        }
        Err(why) => warn!("could not serialize road graph for caching: {why}"),
    }
}
