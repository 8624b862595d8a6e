use glam::IVec2;
use rand::Rng;

use crate::config::{GameConfig, GeneratorKind};

use super::{Grid, Room, Tile};

const WALK_DIRECTIONS: [IVec2; 4] = [IVec2::X, IVec2::NEG_X, IVec2::Y, IVec2::NEG_Y];

#[derive(Debug, Clone)]
pub struct GeneratedMap {
    pub grid: Grid,
    /// `rooms[0]` is the spawn room.
    pub rooms: Vec<Room>,
}

impl GeneratedMap {
    pub fn spawn_point(&self) -> IVec2 {
        self.rooms
            .first()
            .map(|room| room.center)
            .unwrap_or(IVec2::new(self.grid.width() as i32 / 2, self.grid.height() as i32 / 2))
    }
}

/// Carves a dungeon out of a solid grid.
///
/// Rooms are placed without an overlap check, so overlapping rooms merge into one larger
/// open area. Connectivity comes from the L-shaped corridor each room gets back to the
/// previous one, which makes every room reachable from `rooms[0]`.
#[derive(Debug, Clone)]
pub struct MapGenerator {
    width: usize,
    height: usize,
    kind: GeneratorKind,
    room_count: usize,
    room_min_size: usize,
    room_max_size: usize,
    hazard_chance: f64,
}

impl MapGenerator {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            width: config.grid_width,
            height: config.grid_height,
            kind: config.generator,
            room_count: config.room_count,
            room_min_size: config.room_min_size,
            room_max_size: config.room_max_size,
            hazard_chance: config.hazard_chance,
        }
    }

    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> GeneratedMap {
        match self.kind {
            GeneratorKind::Rooms => self.generate_rooms(rng),
            GeneratorKind::RandomWalk { steps } => self.generate_walk(rng, steps),
        }
    }

    fn generate_rooms<R: Rng + ?Sized>(&self, rng: &mut R) -> GeneratedMap {
        let mut grid = Grid::filled(self.width, self.height, Tile::Wall);
        let mut rooms: Vec<Room> = Vec::with_capacity(self.room_count);

        for _ in 0..self.room_count {
            let w = rng.gen_range(self.room_min_size..=self.room_max_size);
            let h = rng.gen_range(self.room_min_size..=self.room_max_size);
            let x = rng.gen_range(0..self.width - w - 2) + 1;
            let y = rng.gen_range(0..self.height - h - 2) + 1;
            let room = Room::new(x as i32, y as i32, w as i32, h as i32);

            for cell in room.cells() {
                grid.set(cell, self.roll_floor(rng));
            }

            if let Some(prev) = rooms.last() {
                carve_corridor(&mut grid, prev.center, room.center);
            }
            rooms.push(room);
        }

        log::debug!(
            "Generated {}x{} map with {} rooms",
            self.width,
            self.height,
            rooms.len()
        );

        GeneratedMap { grid, rooms }
    }

    /// Drunkard's walk from the grid centre. Waypoints along the walk stand in for rooms so
    /// spawn placement and entity seeding work the same way as for the room carver.
    fn generate_walk<R: Rng + ?Sized>(&self, rng: &mut R, steps: usize) -> GeneratedMap {
        let mut grid = Grid::filled(self.width, self.height, Tile::Wall);
        let max = IVec2::new(self.width as i32 - 2, self.height as i32 - 2);
        let mut pos = IVec2::new(self.width as i32 / 2, self.height as i32 / 2);
        grid.set(pos, Tile::Floor);

        let waypoint_every = (steps / self.room_count).max(1);
        let mut rooms = vec![Room::new(pos.x, pos.y, 1, 1)];

        for step in 1..=steps {
            let dir = WALK_DIRECTIONS[rng.gen_range(0..WALK_DIRECTIONS.len())];
            pos = (pos + dir).clamp(IVec2::ONE, max);
            if grid.get(pos) == Tile::Wall {
                grid.set(pos, self.roll_floor(rng));
            }

            if step % waypoint_every == 0 && rooms.len() < self.room_count {
                rooms.push(Room::new(pos.x, pos.y, 1, 1));
            }
        }

        GeneratedMap { grid, rooms }
    }

    fn roll_floor<R: Rng + ?Sized>(&self, rng: &mut R) -> Tile {
        if rng.gen_bool(self.hazard_chance) {
            Tile::Hazard
        } else {
            Tile::Floor
        }
    }
}

/// X axis first, then Y. Every visited cell becomes floor, hazards included.
fn carve_corridor(grid: &mut Grid, from: IVec2, to: IVec2) {
    let mut pos = from;
    grid.set(pos, Tile::Floor);
    while pos != to {
        if pos.x != to.x {
            pos.x += (to.x - pos.x).signum();
        } else {
            pos.y += (to.y - pos.y).signum();
        }
        grid.set(pos, Tile::Floor);
    }
}
