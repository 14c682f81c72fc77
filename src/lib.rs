mod grid;
mod navigation;
mod search;
mod traveler;

use bevy_app::{App, Plugin};
use bevy_ecs::schedule::{IntoSystemDescriptor, SystemLabel};

pub use grid::GridSettings;
pub use navigation::{Edge, NavGraph, NavPoint, NavPointRef};
pub use search::{dijkstra, Path, SearchState};
use traveler::{move_agents, route_agents};
pub use traveler::{AgentState, PathAgent, TravelRequest, TravelingPaused};

/// Labels for ordering user systems around routing and movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SystemLabel)]
pub enum NavigatorSystem {
    Route,
    Move,
}

#[derive(Default, Clone)]
pub struct NavigatorPlugin {
    pub initial_graph_capacity: usize,
    pub grid: Option<(Vec<String>, GridSettings)>,
}

impl NavigatorPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.initial_graph_capacity = capacity;
        self
    }

    /// Builds the [`NavGraph`] resource from `rows` instead of starting empty.
    pub fn with_grid<S: AsRef<str>>(mut self, rows: &[S], settings: GridSettings) -> Self {
        let rows = rows.iter().map(|row| row.as_ref().to_owned()).collect();
        self.grid = Some((rows, settings));
        self
    }
}

impl Plugin for NavigatorPlugin {
    fn build(&self, app: &mut App) {
        let nav_graph = match &self.grid {
            Some((rows, settings)) => NavGraph::from_grid(rows.as_slice(), settings),
            None => NavGraph::with_capacity(self.initial_graph_capacity),
        };

        app.insert_resource(nav_graph)
            .add_system(route_agents.label(NavigatorSystem::Route))
            .add_system(
                move_agents
                    .label(NavigatorSystem::Move)
                    .after(NavigatorSystem::Route),
            )
            .register_type::<PathAgent>()
            .register_type::<TravelRequest>()
            .register_type::<NavPointRef>();
    }
}
