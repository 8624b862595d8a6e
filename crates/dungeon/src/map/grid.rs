use glam::IVec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum Tile {
    #[default]
    Wall = b'#',
    Floor = b'.',
    Hazard = b'~',
}

impl Tile {
    pub fn glyph(self) -> char {
        self as u8 as char
    }

    pub fn is_passable(self) -> bool {
        self != Tile::Wall
    }
}

impl TryFrom<u8> for Tile {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            b'#' => Ok(Self::Wall),
            b'.' => Ok(Self::Floor),
            b'~' => Ok(Self::Hazard),
            other => Err(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("expected {expected} rows, got {actual}")]
    RowCount { expected: usize, actual: usize },
    #[error("row {row} has {actual} cells, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("unknown tile byte {byte:#04x} at ({x}, {y})")]
    UnknownTile { x: usize, y: usize, byte: u8 },
    #[error("grid is {actual_width}x{actual_height}, session expects {expected_width}x{expected_height}")]
    DimensionMismatch {
        expected_width: usize,
        expected_height: usize,
        actual_width: usize,
        actual_height: usize,
    },
}

/// Fixed-size tile map, row-major. Cells never change once generation hands it out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Tile>,
}

impl Grid {
    pub fn filled(width: usize, height: usize, tile: Tile) -> Self {
        Self {
            width,
            height,
            cells: vec![tile; width * height],
        }
    }

    /// Rebuilds a grid from glyph rows, rejecting any missing row, ragged row or unknown byte.
    pub fn from_rows(width: usize, height: usize, rows: &[Vec<u8>]) -> Result<Self, GridError> {
        if rows.len() != height {
            return Err(GridError::RowCount {
                expected: height,
                actual: rows.len(),
            });
        }

        let mut cells = Vec::with_capacity(width * height);
        for (y, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(GridError::RowWidth {
                    row: y,
                    expected: width,
                    actual: row.len(),
                });
            }
            for (x, &byte) in row.iter().enumerate() {
                let tile = Tile::try_from(byte).map_err(|byte| GridError::UnknownTile { x, y, byte })?;
                cells.push(tile);
            }
        }

        Ok(Self {
            width,
            height,
            cells,
        })
    }

    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        self.cells
            .chunks(self.width.max(1))
            .map(|row| row.iter().map(|&tile| tile as u8).collect())
            .collect()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn contains(&self, pos: IVec2) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    /// Out-of-bounds positions read as walls.
    pub fn get(&self, pos: IVec2) -> Tile {
        if self.contains(pos) {
            self.cells[pos.y as usize * self.width + pos.x as usize]
        } else {
            Tile::Wall
        }
    }

    pub fn is_passable(&self, pos: IVec2) -> bool {
        self.get(pos).is_passable()
    }

    pub(crate) fn set(&mut self, pos: IVec2, tile: Tile) {
        if self.contains(pos) {
            self.cells[pos.y as usize * self.width + pos.x as usize] = tile;
        }
    }

    pub fn count(&self, tile: Tile) -> usize {
        self.cells.iter().filter(|&&t| t == tile).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Room {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    pub center: IVec2,
}

impl Room {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self {
            x,
            y,
            w,
            h,
            center: IVec2::new(x + w / 2, y + h / 2),
        }
    }

    pub fn cells(&self) -> impl Iterator<Item = IVec2> + '_ {
        (self.y..self.y + self.h)
            .flat_map(move |y| (self.x..self.x + self.w).map(move |x| IVec2::new(x, y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_reads_as_wall() {
        let grid = Grid::filled(4, 4, Tile::Floor);
        assert_eq!(grid.get(IVec2::new(-1, 0)), Tile::Wall);
        assert_eq!(grid.get(IVec2::new(0, 4)), Tile::Wall);
        assert_eq!(grid.get(IVec2::new(3, 3)), Tile::Floor);
    }

    #[test]
    fn rows_rebuild_identical_grid() {
        let mut grid = Grid::filled(5, 3, Tile::Wall);
        grid.set(IVec2::new(1, 1), Tile::Floor);
        grid.set(IVec2::new(2, 1), Tile::Hazard);

        let rebuilt = Grid::from_rows(5, 3, &grid.to_rows()).unwrap();
        assert_eq!(rebuilt, grid);
    }

    #[test]
    fn missing_row_is_rejected() {
        let rows = vec![b"###".to_vec(), b"#.#".to_vec()];
        assert_eq!(
            Grid::from_rows(3, 3, &rows),
            Err(GridError::RowCount {
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn short_row_is_rejected() {
        let rows = vec![b"###".to_vec(), b"#.".to_vec(), b"###".to_vec()];
        assert_eq!(
            Grid::from_rows(3, 3, &rows),
            Err(GridError::RowWidth {
                row: 1,
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn unknown_glyph_is_rejected() {
        let rows = vec![b"#?#".to_vec()];
        assert!(matches!(
            Grid::from_rows(3, 1, &rows),
            Err(GridError::UnknownTile { x: 1, y: 0, byte: b'?' })
        ));
    }

    #[test]
    fn room_center_rounds_down() {
        let room = Room::new(3, 4, 5, 4);
        assert_eq!(room.center, IVec2::new(5, 6));
        assert_eq!(room.cells().count(), 20);
    }
}
