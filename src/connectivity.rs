//! Corridor backbone between rooms.
//!
//! Room centroids are Delaunay-triangulated; triangulation neighbors become
//! weighted edges of an adjacency matrix, and its minimum spanning tree is
//! the set of room pairs that corridors must join.
//!
//! Edge weights are a priority scheme, not distances. The default gives any
//! edge touching the boss room weight 20 and every other pair `(i, j)`
//! weight `2j + 1`, which favours low-index rooms.

use std::collections::HashMap;

use log::info;
use petgraph::algo::{connected_components, min_spanning_tree};
use petgraph::data::Element;
use petgraph::graph::{NodeIndex, UnGraph};
use spade::{DelaunayTriangulation, Point2, Triangulation};

use crate::constants::CONNECTIVITY_BOSS_EDGE_WEIGHT;
use crate::error::{FloorError, FloorResult};
use crate::room::RoomFootprint;

/// Weight of the directed adjacency entry `i -> j`, or `None` for no edge.
pub trait EdgeWeight {
    fn weight(&self, i: usize, j: usize, room_count: usize) -> Option<u32>;
}

impl<F> EdgeWeight for F
where
    F: Fn(usize, usize, usize) -> Option<u32>,
{
    fn weight(&self, i: usize, j: usize, room_count: usize) -> Option<u32> {
        self(i, j, room_count)
    }
}

/// Boss edges weigh 20, everything else `2j + 1`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultEdgeWeight;

impl EdgeWeight for DefaultEdgeWeight {
    fn weight(&self, i: usize, j: usize, room_count: usize) -> Option<u32> {
        let boss = room_count.checked_sub(1);
        if Some(i) == boss || Some(j) == boss {
            Some(CONNECTIVITY_BOSS_EDGE_WEIGHT)
        } else {
            Some(2 * j as u32 + 1)
        }
    }
}

/// Dense `n x n` matrix of optional edge weights. Not necessarily symmetric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjacencyMatrix {
    size: usize,
    weights: Vec<Option<u32>>,
}

impl AdjacencyMatrix {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            weights: vec![None; size * size],
        }
    }

    /// Fill both directions of every neighbor pair using `weight`.
    pub fn from_pairs(size: usize, pairs: &[(usize, usize)], weight: &impl EdgeWeight) -> Self {
        let mut matrix = Self::new(size);
        for &(i, j) in pairs {
            matrix.set(i, j, weight.weight(i, j, size));
            matrix.set(j, i, weight.weight(j, i, size));
        }
        matrix
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, i: usize, j: usize) -> Option<u32> {
        if i >= self.size || j >= self.size {
            return None;
        }
        self.weights[i * self.size + j]
    }

    pub fn set(&mut self, i: usize, j: usize, weight: Option<u32>) {
        if i < self.size && j < self.size {
            self.weights[i * self.size + j] = weight;
        }
    }

    /// Weight of the undirected pair: the entry from the lower index to the
    /// higher one, or the reverse entry if that one is missing.
    pub fn undirected(&self, i: usize, j: usize) -> Option<u32> {
        let (low, high) = (i.min(j), i.max(j));
        self.get(low, high).or_else(|| self.get(high, low))
    }
}

/// An edge of the corridor backbone, `a < b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BackboneEdge {
    pub a: usize,
    pub b: usize,
    pub weight: u32,
}

#[derive(Debug, Clone)]
pub struct ConnectivityGraph {
    /// Floored centroid of each room; the boss room is last
    pub centroids: Vec<(i32, i32)>,
    /// Sorted triangulation neighbor pairs, `i < j`
    pub neighbors: Vec<(usize, usize)>,
    pub adjacency: AdjacencyMatrix,
    /// Minimum spanning tree of `adjacency`, `n - 1` edges
    pub backbone: Vec<BackboneEdge>,
}

impl ConnectivityGraph {
    pub fn boss_index(&self) -> usize {
        self.centroids.len().saturating_sub(1)
    }
}

/// Delaunay neighbor pairs of a set of cell centroids.
pub fn triangulate(centroids: &[(i32, i32)]) -> FloorResult<Vec<(usize, usize)>> {
    puffin::profile_function!();

    if centroids.len() < 3 {
        return Err(FloorError::DegenerateGeometry(format!(
            "need at least 3 rooms to triangulate, got {}",
            centroids.len()
        )));
    }

    let mut triangulation = DelaunayTriangulation::<Point2<f64>>::new();
    let mut vertex_to_room: HashMap<usize, usize> = HashMap::new();
    for (room, &(x, y)) in centroids.iter().enumerate() {
        let handle = triangulation
            .insert(Point2::new(x as f64, y as f64))
            .map_err(|e| FloorError::DegenerateGeometry(format!("cannot insert centroid ({x}, {y}): {e:?}")))?;
        if let Some(other) = vertex_to_room.insert(handle.index(), room) {
            return Err(FloorError::DegenerateGeometry(format!(
                "rooms {other} and {room} share centroid ({x}, {y})"
            )));
        }
    }

    if triangulation.num_inner_faces() == 0 {
        return Err(FloorError::DegenerateGeometry("room centroids are collinear".into()));
    }

    let mut pairs = Vec::new();
    for edge in triangulation.undirected_edges() {
        let [from, to] = edge.vertices();
        let (Some(&i), Some(&j)) = (vertex_to_room.get(&from.fix().index()), vertex_to_room.get(&to.fix().index()))
        else {
            continue;
        };
        pairs.push((i.min(j), i.max(j)));
    }
    pairs.sort_unstable();
    pairs.dedup();
    Ok(pairs)
}

/// Minimum spanning tree of the matrix's undirected edges.
///
/// Fails with `DisconnectedTopology` instead of returning a forest.
pub fn spanning_backbone(adjacency: &AdjacencyMatrix) -> FloorResult<Vec<BackboneEdge>> {
    puffin::profile_function!();

    let size = adjacency.size();
    let mut graph = UnGraph::<usize, u32>::with_capacity(size, size * 3);
    let nodes: Vec<NodeIndex> = (0..size).map(|i| graph.add_node(i)).collect();
    for i in 0..size {
        for j in (i + 1)..size {
            if let Some(weight) = adjacency.undirected(i, j) {
                graph.add_edge(nodes[i], nodes[j], weight);
            }
        }
    }

    let components = connected_components(&graph);
    if components > 1 {
        return Err(FloorError::DisconnectedTopology { components });
    }

    let mut backbone: Vec<BackboneEdge> = min_spanning_tree(&graph)
        .filter_map(|element| match element {
            Element::Edge { source, target, weight } => Some(BackboneEdge {
                a: source.min(target),
                b: source.max(target),
                weight,
            }),
            Element::Node { .. } => None,
        })
        .collect();
    backbone.sort_unstable();

    if backbone.len() != size.saturating_sub(1) {
        return Err(FloorError::InvariantViolation(format!(
            "spanning tree has {} edges for {} rooms",
            backbone.len(),
            size
        )));
    }
    Ok(backbone)
}

/// Triangulate the rooms' centroids and derive the corridor backbone.
///
/// The last room is the boss room.
pub fn build_connectivity(rooms: &[RoomFootprint], weight: &impl EdgeWeight) -> FloorResult<ConnectivityGraph> {
    puffin::profile_function!();

    let centroids: Vec<(i32, i32)> = rooms
        .iter()
        .map(|room| {
            let c = room.center().floor();
            (c.x as i32, c.y as i32)
        })
        .collect();

    let neighbors = triangulate(&centroids)?;
    let adjacency = AdjacencyMatrix::from_pairs(centroids.len(), &neighbors, weight);
    let backbone = spanning_backbone(&adjacency)?;

    info!(
        "connectivity: {} rooms, {} neighbor pairs, {} backbone edges",
        centroids.len(),
        neighbors.len(),
        backbone.len()
    );

    Ok(ConnectivityGraph {
        centroids,
        neighbors,
        adjacency,
        backbone,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room_at(x: f32, y: f32) -> RoomFootprint {
        RoomFootprint::new(2.0, 2.0, x, y)
    }

    #[test]
    fn test_default_weights() {
        let w = DefaultEdgeWeight;
        assert_eq!(w.weight(0, 3, 6), Some(7));
        assert_eq!(w.weight(3, 0, 6), Some(1));
        assert_eq!(w.weight(2, 5, 6), Some(20));
        assert_eq!(w.weight(5, 2, 6), Some(20));
    }

    #[test]
    fn test_matrix_is_asymmetric() {
        let matrix = AdjacencyMatrix::from_pairs(4, &[(0, 1), (1, 2)], &DefaultEdgeWeight);
        assert_eq!(matrix.get(0, 1), Some(3));
        assert_eq!(matrix.get(1, 0), Some(1));
        assert_eq!(matrix.get(1, 2), Some(5));
        assert_eq!(matrix.get(2, 1), Some(3));
        assert_eq!(matrix.get(0, 2), None);
        assert_eq!(matrix.undirected(2, 1), Some(5));
    }

    #[test]
    fn test_square_triangulation() {
        let pairs = triangulate(&[(0, 0), (10, 0), (10, 10), (0, 10)]).unwrap();
        // Four sides plus one diagonal
        assert_eq!(pairs.len(), 5);
        for side in [(0, 1), (1, 2), (2, 3), (0, 3)] {
            assert!(pairs.contains(&side));
        }
    }

    #[test]
    fn test_two_rooms_are_degenerate() {
        let rooms = [room_at(0.0, 0.0), room_at(10.0, 0.0)];
        assert!(matches!(
            build_connectivity(&rooms, &DefaultEdgeWeight),
            Err(FloorError::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn test_collinear_rooms_are_degenerate() {
        let rooms = [room_at(0.0, 0.0), room_at(5.0, 5.0), room_at(10.0, 10.0), room_at(20.0, 20.0)];
        assert!(matches!(
            build_connectivity(&rooms, &DefaultEdgeWeight),
            Err(FloorError::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn test_coincident_centroids_are_degenerate() {
        let rooms = [room_at(0.2, 0.2), room_at(0.7, 0.9), room_at(10.0, 0.0), room_at(0.0, 10.0)];
        assert!(matches!(
            build_connectivity(&rooms, &DefaultEdgeWeight),
            Err(FloorError::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn test_backbone_spans_all_rooms() {
        let rooms = [
            room_at(10.0, 10.0),
            room_at(30.0, 12.0),
            room_at(20.0, 30.0),
            room_at(45.0, 35.0),
            room_at(5.0, 40.0),
            room_at(25.0, 20.0),
        ];
        let graph = build_connectivity(&rooms, &DefaultEdgeWeight).unwrap();
        assert_eq!(graph.backbone.len(), rooms.len() - 1);
        assert_eq!(graph.boss_index(), 5);

        let mut reached = vec![false; rooms.len()];
        reached[0] = true;
        for _ in 0..rooms.len() {
            for edge in &graph.backbone {
                if reached[edge.a] || reached[edge.b] {
                    reached[edge.a] = true;
                    reached[edge.b] = true;
                }
            }
        }
        assert!(reached.iter().all(|&r| r));
    }

    #[test]
    fn test_backbone_prefers_light_edges() {
        // Triangle 0-1-2 plus boss 3: edge 0-1 weighs 3, 0-2 and 1-2 weigh 5
        let adjacency = AdjacencyMatrix::from_pairs(4, &[(0, 1), (0, 2), (1, 2), (2, 3)], &DefaultEdgeWeight);
        let backbone = spanning_backbone(&adjacency).unwrap();
        assert_eq!(backbone.len(), 3);
        assert!(backbone.contains(&BackboneEdge { a: 0, b: 1, weight: 3 }));
        assert!(backbone.contains(&BackboneEdge { a: 2, b: 3, weight: 20 }));
    }

    #[test]
    fn test_disconnected_matrix() {
        let adjacency = AdjacencyMatrix::from_pairs(5, &[(0, 1), (1, 2), (3, 4)], &DefaultEdgeWeight);
        assert_eq!(
            spanning_backbone(&adjacency).unwrap_err(),
            FloorError::DisconnectedTopology { components: 2 }
        );
    }

    #[test]
    fn test_weight_function_can_drop_edges() {
        let rooms = [room_at(0.0, 0.0), room_at(10.0, 0.0), room_at(5.0, 10.0), room_at(30.0, 30.0)];
        // Cut every edge touching the boss room
        let no_boss = |i: usize, j: usize, n: usize| -> Option<u32> { if i == n - 1 || j == n - 1 { None } else { Some(1) } };
        assert!(matches!(
            build_connectivity(&rooms, &no_boss),
            Err(FloorError::DisconnectedTopology { .. })
        ));
    }
}
