//! Colocated vertices: the same place photographed at different times

use crate::edge::NewEdge;
use crate::error::Result;
use crate::graph::Graph;
use crate::ids::{EdgeId, VertexId};
use crate::vertex::Coordinates;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in metres
pub fn haversine_distance(a: Coordinates, b: Coordinates) -> f64 {
    let (lat1, lat2) = (a[0].to_radians(), b[0].to_radians());
    let dlat = lat2 - lat1;
    let dlon = (b[1] - a[1]).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

impl Graph {
    /// Vertices of other spatial groups within the colocation radius
    /// inherited by this vertex's temporal group
    pub fn colocated_vertices(&self, vertex: &str) -> Result<Vec<VertexId>> {
        let origin = self.get_vertex(vertex)?;
        let Some(radius) = self
            .temporal_group_of(vertex)?
            .and_then(|group| self.colocated_radius(group.as_str()))
        else {
            return Ok(Vec::new());
        };

        Ok(self
            .vertices
            .values()
            .filter(|v| v.spatial_group != origin.spatial_group)
            .filter(|v| haversine_distance(origin.coordinates, v.coordinates) <= radius)
            .map(|v| v.id.clone())
            .collect())
    }

    /// Whether the vertex's temporal lineage asks for colocated vertices to
    /// be connected automatically
    pub fn auto_connects_colocated(&self, vertex: &str) -> Result<bool> {
        Ok(self
            .temporal_group_of(vertex)?
            .map(|group| {
                self.lineage(group.as_str())
                    .iter()
                    .any(|g| g.auto_connect_colocated)
            })
            .unwrap_or(false))
    }

    /// Connect the vertex to each colocated vertex with a bidirectional edge
    ///
    /// Does nothing unless auto-connection is enabled for the vertex's
    /// lineage. Returns the forward edge ids.
    pub fn connect_colocated(&mut self, vertex: &str) -> Result<Vec<EdgeId>> {
        if !self.auto_connects_colocated(vertex)? {
            return Ok(Vec::new());
        }
        let mut edges = Vec::new();
        for other in self.colocated_vertices(vertex)? {
            edges.push(self.create_edge(NewEdge::new(vertex, other).bidirectional())?);
        }
        Ok(edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::EdgeType;
    use crate::spatial_group::NewSpatialGroup;
    use crate::temporal_group::NewTemporalGroup;
    use crate::vertex::NewVertex;

    fn two_visits(auto_connect: bool) -> Graph {
        let mut graph = Graph::new();
        graph
            .create_temporal_group(
                NewTemporalGroup::new("Trip")
                    .with_colocated_radius(30.0)
                    .auto_connect_colocated(auto_connect),
            )
            .unwrap();
        for day in ["Day1", "Day2"] {
            graph
                .create_spatial_group(NewSpatialGroup::new(day).with_super_group("trip"))
                .unwrap();
        }
        // About 11 m apart
        graph
            .create_vertex(NewVertex::new([38.70000, -9.14]).with_id("A").in_group("day1"))
            .unwrap();
        graph
            .create_vertex(NewVertex::new([38.70010, -9.14]).with_id("B").in_group("day2"))
            .unwrap();
        // About 1.1 km away
        graph
            .create_vertex(NewVertex::new([38.71, -9.14]).with_id("C").in_group("day2"))
            .unwrap();
        graph
    }

    #[test]
    fn test_haversine() {
        let d = haversine_distance([0.0, 0.0], [0.0, 1.0]);
        assert!((d - 111_195.0).abs() < 10.0);
        assert_eq!(haversine_distance([1.0, 1.0], [1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_colocated_vertices() {
        let graph = two_visits(false);
        assert_eq!(graph.colocated_vertices("A").unwrap(), vec![VertexId::new("B")]);
        assert!(graph.colocated_vertices("C").unwrap().is_empty());
    }

    #[test]
    fn test_connect_colocated_respects_flag() {
        let mut graph = two_visits(false);
        assert!(graph.connect_colocated("A").unwrap().is_empty());
        assert_eq!(graph.edge_count(), 0);

        let mut graph = two_visits(true);
        let edges = graph.connect_colocated("A").unwrap();
        assert_eq!(edges.len(), 1);
        let edge = graph.get_edge(edges[0].as_str()).unwrap();
        assert_eq!(edge.edge_type, EdgeType::Temporal);
        assert!(edge.is_bidirectional());
    }
}
