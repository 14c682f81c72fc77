use bevy::{
    prelude::{
        App, Camera, Camera2dBundle, Color, Commands, Component, Entity, Input, MouseButton,
        Quat, Query, Res, Transform, Vec2, With,
    },
    sprite::{Sprite, SpriteBundle},
    window::Windows,
    DefaultPlugins,
};
use bevy_utils::tracing::info;
use grid_navigator::{
    GridSettings, NavGraph, NavPointRef, NavigatorPlugin, PathAgent, TravelRequest,
};

// The map renders upside down relative to the text since world y points up.
const MAP: [&str; 8] = [
    "00000000000000",
    "01011101110000",
    "01010111011110",
    "01010000000010",
    "01011111111010",
    "01000000100010",
    "01111111111110",
    "00000000000000",
];

const CELL_SIZE: f32 = 50.0;

/// Marks the sprites drawing the route of the last click.
#[derive(Component)]
struct PathLine;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins)
        .add_plugin(
            NavigatorPlugin::new().with_grid(&MAP, GridSettings::new().with_cell_size(CELL_SIZE)),
        )
        .add_startup_system(setup)
        .add_system(click_to_travel)
        .run();
}

fn setup(nav_graph: Res<NavGraph>, mut commands: Commands) {
    let center = Vec2::new(
        nav_graph.width() as f32 * CELL_SIZE,
        nav_graph.height() as f32 * CELL_SIZE,
    ) / 2.0;
    commands.spawn(Camera2dBundle {
        transform: Transform::from_xyz(center.x, center.y, 999.0),
        ..Default::default()
    });

    for point in nav_graph.points() {
        let location = point.location();
        commands
            .spawn(SpriteBundle {
                sprite: Sprite {
                    color: Color::DARK_GRAY,
                    custom_size: Some(Vec2::splat(CELL_SIZE - 1.0)),
                    ..Default::default()
                },
                transform: Transform::from_xyz(location.x, location.y, 0.0),
                ..Default::default()
            })
            .insert(NavPointRef(point.id()));
    }

    // Every edge is stored in both directions, draw it once.
    for (from, to) in nav_graph
        .segments()
        .filter(|(from, to)| (from.x, from.y) < (to.x, to.y))
    {
        commands.spawn(line_sprite(from, to, 2.0, Color::GRAY, 0.5));
    }

    let Some(start) = nav_graph.node_at(1, 1) else {
        return;
    };
    let Some(agent) = PathAgent::new(&nav_graph, start, 64.0) else {
        return;
    };
    let location = agent.position();
    commands
        .spawn(SpriteBundle {
            sprite: Sprite {
                color: Color::FUCHSIA,
                custom_size: Some(Vec2::splat(16.0)),
                ..Default::default()
            },
            transform: Transform::from_xyz(location.x, location.y, 1.0),
            ..Default::default()
        })
        .insert(agent);
}

fn click_to_travel(
    buttons: Res<Input<MouseButton>>,
    windows: Res<Windows>,
    nav_graph: Res<NavGraph>,
    cameras: Query<&Transform, With<Camera>>,
    agents: Query<(Entity, &PathAgent)>,
    path_lines: Query<Entity, With<PathLine>>,
    mut commands: Commands,
) {
    if !buttons.just_pressed(MouseButton::Left) {
        return;
    }
    let (Some(window), Ok(camera)) = (windows.get_primary(), cameras.get_single()) else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };

    let window_size = Vec2::new(window.width(), window.height());
    let world_pos = cursor - window_size / 2.0 + camera.translation.truncate();
    let destination = nav_graph.closest_node(world_pos);

    for entity in path_lines.iter() {
        commands.entity(entity).despawn();
    }

    for (entity, agent) in agents.iter() {
        let preview = nav_graph.find_path(Some(agent.current_node()), destination);
        info!("Clicked {:?}: {}", world_pos, preview);
        for (from, to) in preview.segments(&nav_graph) {
            commands
                .spawn(line_sprite(from, to, 6.0, Color::YELLOW, 0.8))
                .insert(PathLine);
        }
        commands
            .entity(entity)
            .insert(TravelRequest::new(destination));
    }
}

/// A thin rectangle stretched and rotated to cover `from -> to`.
fn line_sprite(from: Vec2, to: Vec2, thickness: f32, color: Color, depth: f32) -> SpriteBundle {
    let offset = to - from;
    let midpoint = (from + to) / 2.0;
    SpriteBundle {
        sprite: Sprite {
            color,
            custom_size: Some(Vec2::new(offset.length(), thickness)),
            ..Default::default()
        },
        transform: Transform::from_xyz(midpoint.x, midpoint.y, depth)
            .with_rotation(Quat::from_rotation_z(offset.y.atan2(offset.x))),
        ..Default::default()
    }
}
