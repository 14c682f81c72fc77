use bevy_ecs::{component::Component, system::Resource};
use bevy_math::{UVec2, Vec2};
use bevy_reflect::{FromReflect, Reflect};

/// A directed connection to another point in the same [`NavGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    target: u32,
    cost: u32,
}

impl Edge {
    pub fn new(target: u32, cost: u32) -> Self {
        Self { target, cost }
    }

    #[inline(always)]
    pub fn target(&self) -> u32 {
        self.target
    }

    #[inline(always)]
    pub fn cost(&self) -> u32 {
        self.cost
    }
}

#[derive(Debug, Clone)]
pub struct NavPoint {
    id: u32,
    location: Vec2,
    cell: Option<UVec2>,
    connections: Vec<Edge>,
}

impl NavPoint {
    pub(crate) fn new(id: u32, location: Vec2, cell: Option<UVec2>) -> Self {
        Self {
            id,
            location,
            cell,
            connections: Vec::new(),
        }
    }

    #[inline(always)]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[inline(always)]
    pub fn location(&self) -> Vec2 {
        self.location
    }

    /// Grid cell this point was built from, `None` for hand-placed points.
    #[inline(always)]
    pub fn cell(&self) -> Option<UVec2> {
        self.cell
    }

    /// Outgoing edges in the order they were connected.
    #[inline(always)]
    pub fn connections(&self) -> &[Edge] {
        &self.connections
    }

    pub fn is_connected_to(&self, id: u32) -> bool {
        self.connections.iter().any(|edge| edge.target == id)
    }
}

/// Marks an entity as the visual for a nav point.
#[derive(Debug, Component, Reflect, FromReflect, Clone, Copy, PartialEq, Eq)]
pub struct NavPointRef(pub u32);

/// Arena of nav points. Ids are indices into the arena and edges refer to
/// their targets by id, so lookups are O(1) and nothing can dangle.
///
/// Grid-built graphs additionally keep a row-major cell table mapping
/// `(column, row)` to the id of the point standing on that cell.
#[derive(Debug, Default, Clone, Resource)]
pub struct NavGraph {
    pub(crate) points: Vec<NavPoint>,
    pub(crate) cells: Vec<Option<u32>>,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) cell_size: f32,
}

impl NavGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Total number of directed edges.
    pub fn edge_count(&self) -> usize {
        self.points.iter().map(|p| p.connections.len()).sum()
    }

    /// Adds a free-standing point and returns its id.
    pub fn add_nav_point(&mut self, location: Vec2) -> u32 {
        self.push_point(location, None)
    }

    pub(crate) fn push_point(&mut self, location: Vec2, cell: Option<UVec2>) -> u32 {
        let id = self.points.len() as u32;
        self.points.push(NavPoint::new(id, location, cell));
        id
    }

    /// Connects `a` and `b` with a reciprocal pair of edges.
    pub fn connect_points(&mut self, a: u32, b: u32, cost: u32) {
        if !self.has_node(a) || !self.has_node(b) {
            return;
        }

        self.points[a as usize].connections.push(Edge::new(b, cost));
        self.points[b as usize].connections.push(Edge::new(a, cost));
    }

    /// Adds a single directed edge from `from` to `to`.
    pub fn connect_one_way(&mut self, from: u32, to: u32, cost: u32) {
        if !self.has_node(from) || !self.has_node(to) {
            return;
        }

        self.points[from as usize]
            .connections
            .push(Edge::new(to, cost));
    }

    #[inline(always)]
    pub fn has_node(&self, id: u32) -> bool {
        (id as usize) < self.points.len()
    }

    #[inline(always)]
    pub fn get_nav_point(&self, id: u32) -> Option<&NavPoint> {
        self.points.get(id as usize)
    }

    #[inline(always)]
    pub fn location(&self, id: u32) -> Option<Vec2> {
        self.get_nav_point(id).map(|p| p.location)
    }

    pub fn points(&self) -> impl Iterator<Item = &NavPoint> {
        self.points.iter()
    }

    /// World-space line segments for every directed edge.
    pub fn segments(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        self.points.iter().flat_map(move |point| {
            point
                .connections
                .iter()
                .map(move |edge| (point.location, self.points[edge.target as usize].location))
        })
    }
}
