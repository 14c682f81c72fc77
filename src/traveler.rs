use bevy_ecs::{
    component::Component,
    entity::Entity,
    query::Without,
    system::{Commands, Query, Res},
};
use bevy_math::Vec2;
use bevy_reflect::{FromReflect, Reflect};
use bevy_time::Time;
use bevy_transform::prelude::Transform;
use bevy_utils::tracing::{debug, info};

use crate::NavGraph;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentState {
    /// No path, or the last waypoint has been reached.
    Idle,
    /// Moving toward `path[current_index + 1]`.
    Following,
}

/// Moves at a constant speed along a path of nav points.
///
/// `current_index` is the index of the waypoint the agent last departed
/// from, so the waypoint being approached is always `current_index + 1`.
#[derive(Debug, Reflect, FromReflect, Component, Clone)]
pub struct PathAgent {
    position: Vec2,
    current_node: u32,
    path: Vec<u32>,
    current_index: usize,
    speed: f32,
}

impl PathAgent {
    /// Places a new agent on the center of `node`.
    pub fn new(nav_graph: &NavGraph, node: u32, speed: f32) -> Option<Self> {
        let position = nav_graph.location(node)?;
        Some(Self {
            position,
            current_node: node,
            path: Vec::new(),
            current_index: 0,
            speed,
        })
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    #[inline(always)]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    #[inline(always)]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[inline(always)]
    pub fn current_node(&self) -> u32 {
        self.current_node
    }

    #[inline(always)]
    pub fn path(&self) -> &[u32] {
        &self.path
    }

    #[inline(always)]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn next_waypoint(&self) -> Option<u32> {
        self.path.get(self.current_index + 1).copied()
    }

    pub fn state(&self) -> AgentState {
        if self.next_waypoint().is_some() {
            AgentState::Following
        } else {
            AgentState::Idle
        }
    }

    /// Teleports the agent onto `node` and drops any path it was following.
    pub fn set_node(&mut self, nav_graph: &NavGraph, node: u32) -> bool {
        let Some(location) = nav_graph.location(node) else {
            return false;
        };
        self.position = location;
        self.current_node = node;
        self.clear_path();
        true
    }

    fn clear_path(&mut self) {
        self.path.clear();
        self.current_index = 0;
    }

    /// Replaces the current path with a fresh route from the agent's current
    /// node to `destination`. Returns the number of nodes in the new route,
    /// zero if there is none.
    pub fn go_to_node(&mut self, nav_graph: &NavGraph, destination: Option<u32>) -> usize {
        let path = nav_graph.find_path(Some(self.current_node), destination);
        let len = path.len();
        self.path = path.into_nodes();
        self.current_index = 0;

        // A single node route still needs a waypoint to head for, which brings an
        // agent caught between nodes back onto its own node.
        if self.path.len() == 1 {
            self.path.insert(0, self.current_node);
        }

        len
    }

    /// Advances the agent by `delta_seconds` worth of travel.
    ///
    /// Reaching an intermediate waypoint snaps the agent onto it, then carries
    /// the overshoot along the direction from the waypoint before it to the
    /// one after it.
    pub fn advance(&mut self, nav_graph: &NavGraph, delta_seconds: f32) {
        let Some(next) = self.next_waypoint() else {
            return;
        };
        let Some(target) = nav_graph.location(next) else {
            debug!("Waypoint {} is not in the graph, dropping path", next);
            self.clear_path();
            return;
        };

        let travel = (self.speed * delta_seconds).max(0.0);
        let offset = target - self.position;
        let distance = offset.length();
        let remaining = distance - travel;

        if remaining > 0.0 {
            // `distance` is non-zero here since `travel` is never negative.
            self.position += offset / distance * travel;
            return;
        }

        self.current_index += 1;
        self.current_node = next;
        self.position = target;

        if self.current_index + 1 >= self.path.len() {
            debug!("Path end reached at node {}", next);
            self.clear_path();
            return;
        }

        debug!("Passed waypoint {} (node {})", self.current_index, next);
        let previous = self.path[self.current_index - 1];
        let upcoming = self.path[self.current_index + 1];
        let (Some(from), Some(to)) = (nav_graph.location(previous), nav_graph.location(upcoming))
        else {
            self.clear_path();
            return;
        };

        // Coincident waypoints leave the agent on the one it just reached.
        self.position += (to - from).normalize_or_zero() * -remaining;
    }
}

/// Asks the agent on this entity to head for a new destination.
#[derive(Debug, Component, Reflect, FromReflect, Clone, Copy)]
pub struct TravelRequest {
    pub destination: Option<u32>,
}

impl TravelRequest {
    pub fn new(destination: Option<u32>) -> Self {
        Self { destination }
    }
}

#[derive(Debug, Component, Reflect, FromReflect)]
pub struct TravelingPaused;

pub(crate) fn route_agents(
    mut requests_query: Query<(Entity, &mut PathAgent, &TravelRequest)>,
    nav_graph: Res<NavGraph>,
    mut commands: Commands,
) {
    for (entity, mut agent, request) in requests_query.iter_mut() {
        if agent.go_to_node(&nav_graph, request.destination) > 0 {
            info!("Found path: {:?}", agent.path());
        } else {
            info!("No path found");
        }
        commands.entity(entity).remove::<TravelRequest>();
    }
}

pub(crate) fn move_agents(
    mut agents_query: Query<(&mut PathAgent, &mut Transform), Without<TravelingPaused>>,
    nav_graph: Res<NavGraph>,
    time: Res<Time>,
) {
    for (mut agent, mut transform) in agents_query.iter_mut() {
        if agent.state() == AgentState::Following {
            agent.advance(&nav_graph, time.delta_seconds());
        }

        transform.translation.x = agent.position.x;
        transform.translation.y = agent.position.y;
    }
}
