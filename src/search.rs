use std::{
    cmp::{Ordering, Reverse},
    collections::BinaryHeap,
    fmt,
};

use bevy_math::Vec2;
use bevy_utils::tracing::{debug, trace};

use crate::NavGraph;

/// Open set entry. Ties on cost fall back to the order in which nodes were
/// first added to the open set, which keeps results reproducible.
#[derive(Eq, PartialEq)]
struct PathNode {
    id: u32,
    cost: u32,
    order: u32,
}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .cmp(&other.cost)
            .then_with(|| self.order.cmp(&other.order))
    }
}

/// Per-search bookkeeping: best known cost and predecessor for every node.
///
/// Nothing here lives on the graph itself, so any number of searches can run
/// over a shared `&NavGraph`.
#[derive(Debug, Clone)]
pub struct SearchState {
    start: u32,
    goal: u32,
    best_cost: Vec<Option<u32>>,
    predecessor: Vec<Option<u32>>,
    expanded: usize,
}

impl SearchState {
    fn new(len: usize, start: u32, goal: u32) -> Self {
        Self {
            start,
            goal,
            best_cost: vec![None; len],
            predecessor: vec![None; len],
            expanded: 0,
        }
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn goal(&self) -> u32 {
        self.goal
    }

    /// Cost recorded for `id`, `None` if the search never discovered it.
    pub fn cost(&self, id: u32) -> Option<u32> {
        self.best_cost.get(id as usize).copied().flatten()
    }

    pub fn predecessor(&self, id: u32) -> Option<u32> {
        self.predecessor.get(id as usize).copied().flatten()
    }

    /// Number of nodes moved to the closed set.
    pub fn expanded(&self) -> usize {
        self.expanded
    }

    pub fn reached_goal(&self) -> bool {
        self.cost(self.goal).is_some()
    }

    /// Walks the predecessor chain back from the goal.
    pub fn path(&self) -> Path {
        let Some(cost) = self.cost(self.goal) else {
            return Path::default();
        };

        let mut nodes = vec![self.goal];
        let mut current = self.goal;
        while let Some(prev) = self.predecessor(current) {
            nodes.push(prev);
            current = prev;
        }
        nodes.reverse();

        Path { nodes, cost }
    }
}

/// Uniform-cost search from `start` until `goal` is selected or the open set
/// runs dry.
///
/// Returns `None` if either id is not part of the graph.
pub fn dijkstra(nav_graph: &NavGraph, start: u32, goal: u32) -> Option<SearchState> {
    if !nav_graph.has_node(start) || !nav_graph.has_node(goal) {
        return None;
    }

    let len = nav_graph.len();
    let mut state = SearchState::new(len, start, goal);
    let mut closed = vec![false; len];
    let mut open_order: Vec<Option<u32>> = vec![None; len];
    let mut next_order = 0_u32;
    let mut open_set = BinaryHeap::with_capacity(len);

    state.best_cost[start as usize] = Some(0);
    open_order[start as usize] = Some(next_order);
    open_set.push(Reverse(PathNode {
        id: start,
        cost: 0,
        order: next_order,
    }));
    next_order += 1;

    while let Some(Reverse(current)) = open_set.pop() {
        let index = current.id as usize;
        // Stale entry left behind by a cheaper relaxation.
        if closed[index] || state.best_cost[index] != Some(current.cost) {
            continue;
        }

        if current.id == goal {
            break;
        }

        closed[index] = true;
        state.expanded += 1;
        trace!("Expanding node {} at cost {}", current.id, current.cost);

        for edge in nav_graph.points[index].connections() {
            let target = edge.target() as usize;
            if closed[target] {
                continue;
            }

            let candidate = current.cost.saturating_add(edge.cost());
            let improves = match state.best_cost[target] {
                None => true,
                Some(known) => candidate < known,
            };
            if !improves {
                continue;
            }

            state.best_cost[target] = Some(candidate);
            state.predecessor[target] = Some(current.id);

            let order = match open_order[target] {
                Some(order) => order,
                None => {
                    let order = next_order;
                    open_order[target] = Some(order);
                    next_order += 1;
                    order
                }
            };
            open_set.push(Reverse(PathNode {
                id: edge.target(),
                cost: candidate,
                order,
            }));
        }
    }

    Some(state)
}

/// An ordered run of node ids from start to goal inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path {
    nodes: Vec<u32>,
    cost: u32,
}

impl Path {
    pub fn nodes(&self) -> &[u32] {
        &self.nodes
    }

    pub fn into_nodes(self) -> Vec<u32> {
        self.nodes
    }

    /// Sum of the edge costs along the path.
    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn first(&self) -> Option<u32> {
        self.nodes.first().copied()
    }

    pub fn last(&self) -> Option<u32> {
        self.nodes.last().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.nodes.iter().copied()
    }

    /// World-space line segments between consecutive waypoints.
    pub fn segments<'a>(
        &'a self,
        nav_graph: &'a NavGraph,
    ) -> impl Iterator<Item = (Vec2, Vec2)> + 'a {
        self.nodes
            .windows(2)
            .filter_map(move |pair| {
                Some((nav_graph.location(pair[0])?, nav_graph.location(pair[1])?))
            })
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_empty() {
            write!(f, "No path from start to end")
        } else {
            write!(f, "Number of nodes in the path: {}", self.len())
        }
    }
}

impl NavGraph {
    /// Shortest path from `start` to `goal`. Absent or unknown endpoints and
    /// unreachable goals all produce an empty path.
    pub fn find_path(&self, start: Option<u32>, goal: Option<u32>) -> Path {
        let (Some(start), Some(goal)) = (start, goal) else {
            debug!("Start or goal missing, no path");
            return Path::default();
        };

        let Some(state) = dijkstra(self, start, goal) else {
            debug!("Start {} or goal {} is not in the graph", start, goal);
            return Path::default();
        };

        let path = state.path();
        debug!(
            "Search {} -> {} expanded {} nodes: {} (cost {})",
            start,
            goal,
            state.expanded(),
            path,
            path.cost()
        );
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GridSettings;

    fn line_graph(len: u32) -> NavGraph {
        let mut nav_graph = NavGraph::new();
        for i in 0..len {
            let id = nav_graph.add_nav_point(Vec2::new(i as f32, 0.0));
            if i > 0 {
                nav_graph.connect_points(id, id - 1, 1);
            }
        }
        nav_graph
    }

    #[test]
    pub fn test_basic_route() {
        let nav_graph = line_graph(3);

        let path = nav_graph.find_path(Some(0), Some(2));
        assert_eq!(path.nodes(), &[0, 1, 2]);
        assert_eq!(path.cost(), 2);
        assert_eq!(path.to_string(), "Number of nodes in the path: 3");
    }

    #[test]
    pub fn test_start_is_goal() {
        let nav_graph = line_graph(3);

        let path = nav_graph.find_path(Some(1), Some(1));
        assert_eq!(path.nodes(), &[1]);
        assert_eq!(path.cost(), 0);
    }

    #[test]
    pub fn test_missing_endpoints() {
        let nav_graph = line_graph(3);

        assert!(nav_graph.find_path(None, Some(1)).is_empty());
        assert!(nav_graph.find_path(Some(1), None).is_empty());
        assert!(nav_graph.find_path(Some(0), Some(9)).is_empty());
        assert!(dijkstra(&nav_graph, 9, 0).is_none());
        assert_eq!(
            nav_graph.find_path(None, None).to_string(),
            "No path from start to end"
        );
    }

    #[test]
    pub fn test_unreachable_goal() {
        let rows = ["11111", "10001", "10101", "10001", "11111"];
        let nav_graph = NavGraph::from_grid(&rows, &GridSettings::default());
        let start = nav_graph.node_at(0, 0);
        let enclosed = nav_graph.node_at(2, 2);

        let state = dijkstra(&nav_graph, start.unwrap(), enclosed.unwrap()).unwrap();
        assert!(!state.reached_goal());
        assert_eq!(state.expanded(), nav_graph.len() - 1);
        assert!(nav_graph.find_path(start, enclosed).is_empty());
    }

    #[test]
    pub fn test_cheaper_detour() {
        let mut nav_graph = NavGraph::new();
        let a = nav_graph.add_nav_point(Vec2::new(0.0, 0.0));
        let b = nav_graph.add_nav_point(Vec2::new(1.0, 0.0));
        let c = nav_graph.add_nav_point(Vec2::new(1.0, 1.0));
        let d = nav_graph.add_nav_point(Vec2::new(2.0, 0.0));

        nav_graph.connect_points(a, b, 10);
        nav_graph.connect_points(b, d, 10);
        nav_graph.connect_points(a, c, 1);
        nav_graph.connect_points(c, b, 2);

        let state = dijkstra(&nav_graph, a, d).unwrap();
        assert_eq!(state.cost(b), Some(3));
        assert_eq!(state.predecessor(b), Some(c));

        let path = state.path();
        assert_eq!(path.nodes(), &[a, c, b, d]);
        assert_eq!(path.cost(), 13);
    }

    #[test]
    pub fn test_one_way_edges() {
        let mut nav_graph = NavGraph::new();
        let a = nav_graph.add_nav_point(Vec2::ZERO);
        let b = nav_graph.add_nav_point(Vec2::X);
        nav_graph.connect_one_way(a, b, 1);

        assert_eq!(nav_graph.find_path(Some(a), Some(b)).nodes(), &[a, b]);
        assert!(nav_graph.find_path(Some(b), Some(a)).is_empty());
    }

    #[test]
    pub fn test_ties_follow_insertion_order() {
        // Two equal routes around a block; the first discovered neighbour wins.
        let mut nav_graph = NavGraph::new();
        let start = nav_graph.add_nav_point(Vec2::new(0.0, 0.0));
        let left = nav_graph.add_nav_point(Vec2::new(-1.0, 1.0));
        let right = nav_graph.add_nav_point(Vec2::new(1.0, 1.0));
        let goal = nav_graph.add_nav_point(Vec2::new(0.0, 2.0));

        nav_graph.connect_points(start, right, 1);
        nav_graph.connect_points(start, left, 1);
        nav_graph.connect_points(left, goal, 1);
        nav_graph.connect_points(right, goal, 1);

        for _ in 0..10 {
            assert_eq!(
                nav_graph.find_path(Some(start), Some(goal)).nodes(),
                &[start, right, goal]
            );
        }
    }

    #[test]
    pub fn test_zero_cost_edges() {
        let mut nav_graph = NavGraph::new();
        let a = nav_graph.add_nav_point(Vec2::ZERO);
        let b = nav_graph.add_nav_point(Vec2::X);
        let c = nav_graph.add_nav_point(Vec2::Y);
        nav_graph.connect_points(a, b, 0);
        nav_graph.connect_points(b, c, 0);
        nav_graph.connect_points(a, c, 1);

        let path = nav_graph.find_path(Some(a), Some(c));
        assert_eq!(path.nodes(), &[a, b, c]);
        assert_eq!(path.cost(), 0);
    }

    #[test]
    pub fn test_path_segments() {
        let nav_graph = line_graph(3);
        let path = nav_graph.find_path(Some(0), Some(2));

        let segments: Vec<_> = path.segments(&nav_graph).collect();
        assert_eq!(
            segments,
            vec![
                (Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0)),
                (Vec2::new(1.0, 0.0), Vec2::new(2.0, 0.0)),
            ]
        );
    }
}
