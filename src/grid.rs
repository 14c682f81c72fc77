use bevy_math::{UVec2, Vec2};
use bevy_utils::tracing::{debug, warn};

use crate::NavGraph;

/// How a textual grid is turned into a [`NavGraph`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSettings {
    /// World-space edge length of one cell.
    pub cell_size: f32,
    /// The only symbol that marks a cell as impassable.
    pub blocked_symbol: char,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            cell_size: 50.0,
            blocked_symbol: '0',
        }
    }
}

impl GridSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cell_size(mut self, cell_size: f32) -> Self {
        self.cell_size = cell_size;
        self
    }

    pub fn with_blocked_symbol(mut self, blocked_symbol: char) -> Self {
        self.blocked_symbol = blocked_symbol;
        self
    }
}

impl NavGraph {
    /// Builds a 4-connected graph from rows of cell symbols.
    ///
    /// The first row's length is the grid width. Shorter rows are padded with
    /// blocked cells and longer rows are cut; both only produce a warning.
    pub fn from_grid<S: AsRef<str>>(rows: &[S], settings: &GridSettings) -> Self {
        let cell_size = if settings.cell_size.is_finite() && settings.cell_size > 0.0 {
            settings.cell_size
        } else {
            warn!(
                "Invalid cell size {}, falling back to 1.0",
                settings.cell_size
            );
            1.0
        };

        let height = rows.len() as u32;
        let width = rows
            .first()
            .map(|row| row.as_ref().chars().count() as u32)
            .unwrap_or(0);

        let mut nav_graph = NavGraph::with_capacity((width * height) as usize);
        nav_graph.width = width;
        nav_graph.height = height;
        nav_graph.cell_size = cell_size;
        nav_graph.cells = vec![None; (width * height) as usize];

        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let row_width = row.chars().count();
            if row_width != width as usize {
                warn!(
                    "Mismatched row #{} in grid ({} cells instead of {})",
                    y, row_width, width
                );
            }

            let mut symbols = row.chars();
            for x in 0..width {
                let symbol = symbols.next().unwrap_or(settings.blocked_symbol);
                if symbol == settings.blocked_symbol {
                    continue;
                }

                let location = Vec2::new(
                    (x as f32 + 0.5) * cell_size,
                    (y as f32 + 0.5) * cell_size,
                );
                let cell = UVec2::new(x, y as u32);
                let id = nav_graph.push_point(location, Some(cell));
                let index = nav_graph.cell_index(x, y as u32);
                nav_graph.cells[index] = Some(id);
            }
        }

        // West and south only: the east and north neighbours link back
        // when their own turn comes.
        for y in 0..height {
            for x in 0..width {
                let Some(id) = nav_graph.node_at(x, y) else {
                    continue;
                };
                if x > 0 {
                    if let Some(west) = nav_graph.node_at(x - 1, y) {
                        nav_graph.connect_points(id, west, 1);
                    }
                }
                if y > 0 {
                    if let Some(south) = nav_graph.node_at(x, y - 1) {
                        nav_graph.connect_points(id, south, 1);
                    }
                }
            }
        }

        debug!(
            "Built {}x{} grid graph with {} nodes and {} edges",
            width,
            height,
            nav_graph.len(),
            nav_graph.edge_count()
        );

        nav_graph
    }

    #[inline(always)]
    fn cell_index(&self, x: u32, y: u32) -> usize {
        (x + self.width * y) as usize
    }

    #[inline(always)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline(always)]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline(always)]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Id of the point standing on cell `(x, y)`, if that cell is passable.
    pub fn node_at(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells.get(self.cell_index(x, y)).copied().flatten()
    }

    pub fn cell_of(&self, id: u32) -> Option<UVec2> {
        self.get_nav_point(id).and_then(|p| p.cell())
    }

    /// Maps a world position onto the point of the cell containing it.
    pub fn closest_node(&self, world_pos: Vec2) -> Option<u32> {
        if self.cells.is_empty() || !world_pos.is_finite() {
            return None;
        }

        let cell = (world_pos / self.cell_size).floor();
        if cell.x < 0.0 || cell.y < 0.0 {
            return None;
        }
        if cell.x >= self.width as f32 || cell.y >= self.height as f32 {
            return None;
        }

        self.node_at(cell.x as u32, cell.y as u32)
    }
}
