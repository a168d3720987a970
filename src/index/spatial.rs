//! Point index over latitude/longitude properties (the layer index)

use crate::graph::NodeId;
use rustc_hash::FxHashMap;

/// A raw geometry hit; carries the numeric node id that callers must
/// resolve back to a graph node before typed wrapping
#[derive(Debug, Clone, PartialEq)]
pub struct GeoHit {
    pub raw_id: u64,
    pub latitude: f64,
    pub longitude: f64,
}

/// In-memory point index
#[derive(Debug, Default)]
pub struct SpatialIndex {
    points: FxHashMap<NodeId, (f64, f64)>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        SpatialIndex::default()
    }

    pub fn add(&mut self, node: NodeId, latitude: f64, longitude: f64) {
        self.points.insert(node, (latitude, longitude));
    }

    pub fn remove(&mut self, node: NodeId) {
        self.points.remove(&node);
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.points.contains_key(&node)
    }

    /// All points inside the inclusive bounding box
    pub fn within_bbox(
        &self,
        min_lat: f64,
        max_lat: f64,
        min_lon: f64,
        max_lon: f64,
    ) -> Vec<GeoHit> {
        let mut hits: Vec<GeoHit> = self
            .points
            .iter()
            .filter(|(_, (lat, lon))| {
                *lat >= min_lat && *lat <= max_lat && *lon >= min_lon && *lon <= max_lon
            })
            .map(|(id, (lat, lon))| GeoHit {
                raw_id: id.as_u64(),
                latitude: *lat,
                longitude: *lon,
            })
            .collect();
        hits.sort_by_key(|hit| hit.raw_id);
        hits
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_query() {
        let mut index = SpatialIndex::new();
        index.add(NodeId::new(1), 52.5, 13.4); // Berlin
        index.add(NodeId::new(2), 48.1, 11.6); // Munich
        index.add(NodeId::new(3), 40.7, -74.0); // New York

        let hits = index.within_bbox(45.0, 55.0, 5.0, 20.0);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].raw_id, 1);
        assert_eq!(hits[1].raw_id, 2);
    }

    #[test]
    fn test_replace_and_remove() {
        let mut index = SpatialIndex::new();
        index.add(NodeId::new(1), 0.0, 0.0);
        index.add(NodeId::new(1), 10.0, 10.0);
        assert_eq!(index.len(), 1);

        assert!(index.within_bbox(-1.0, 1.0, -1.0, 1.0).is_empty());
        assert_eq!(index.within_bbox(9.0, 11.0, 9.0, 11.0).len(), 1);

        index.remove(NodeId::new(1));
        assert!(index.is_empty());
    }
}
