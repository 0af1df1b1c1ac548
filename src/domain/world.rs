// Static tile grid the arena is played on.

/// Kind of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Open,
    Blocked,
}

/// Errors returned when building a world from an ASCII layout.
#[derive(Debug, PartialEq, Eq)]
pub enum WorldError {
    /// Layout has no rows, no columns, or a zero tile size.
    Empty,
    /// A row's length differs from the first row's.
    Ragged { row: usize },
    /// A character other than `#` or `.`.
    UnknownCell { row: usize, col: usize, ch: char },
}

// Default 20x15 arena with a solid border. Both spawn cells are open.
const ARENA_LAYOUT: [&str; 15] = [
    "####################",
    "#..................#",
    "#..................#",
    "#...##........##...#",
    "#...##........##...#",
    "#..................#",
    "#........##........#",
    "#..................#",
    "#........##........#",
    "#..................#",
    "#...##........##...#",
    "#...##........##...#",
    "#..................#",
    "#..................#",
    "####################",
];

pub const ARENA_TILE_SIZE: u32 = 40;

/// Immutable grid of cells with a fixed tile edge length in pixels.
///
/// Pixel coordinates map to cells by integer division by the tile size.
/// Every query outside the grid resolves to [`Cell::Blocked`].
#[derive(Debug, Clone)]
pub struct TileWorld {
    cols: u32,
    rows: u32,
    tile: u32,
    cells: Vec<Cell>,
}

impl TileWorld {
    /// The fixed arena served at startup (800x600 px).
    pub fn arena() -> Result<Self, WorldError> {
        Self::from_rows(ARENA_TILE_SIZE, &ARENA_LAYOUT)
    }

    /// A grid with no blocked cells.
    pub fn open(cols: u32, rows: u32, tile: u32) -> Self {
        Self {
            cols,
            rows,
            tile,
            cells: vec![Cell::Open; (cols * rows) as usize],
        }
    }

    /// Builds a world from rows of `#` (blocked) and `.` (open).
    pub fn from_rows(tile: u32, layout: &[&str]) -> Result<Self, WorldError> {
        let Some(first) = layout.first() else {
            return Err(WorldError::Empty);
        };
        let cols = first.chars().count();
        if cols == 0 || tile == 0 {
            return Err(WorldError::Empty);
        }

        let mut cells = Vec::with_capacity(cols * layout.len());
        for (row, line) in layout.iter().enumerate() {
            if line.chars().count() != cols {
                return Err(WorldError::Ragged { row });
            }
            for (col, ch) in line.chars().enumerate() {
                let cell = match ch {
                    '#' => Cell::Blocked,
                    '.' => Cell::Open,
                    _ => return Err(WorldError::UnknownCell { row, col, ch }),
                };
                cells.push(cell);
            }
        }

        Ok(Self {
            cols: cols as u32,
            rows: layout.len() as u32,
            tile,
            cells,
        })
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn tile_size(&self) -> u32 {
        self.tile
    }

    /// World width in pixels.
    pub fn width(&self) -> f32 {
        (self.cols * self.tile) as f32
    }

    /// World height in pixels.
    pub fn height(&self) -> f32 {
        (self.rows * self.tile) as f32
    }

    /// Cell at grid coordinates; out of range is blocked.
    pub fn cell(&self, col: i64, row: i64) -> Cell {
        if col < 0 || row < 0 || col >= self.cols as i64 || row >= self.rows as i64 {
            return Cell::Blocked;
        }
        self.cells[(row as usize) * (self.cols as usize) + col as usize]
    }

    /// Cell containing the pixel coordinate.
    pub fn cell_at(&self, x: f32, y: f32) -> Cell {
        if !x.is_finite() || !y.is_finite() {
            return Cell::Blocked;
        }
        let tile = self.tile as f32;
        self.cell((x / tile).floor() as i64, (y / tile).floor() as i64)
    }

    pub fn is_blocked(&self, x: f32, y: f32) -> bool {
        self.cell_at(x, y) == Cell::Blocked
    }

    /// True when the point lies within `[0, width] x [0, height]`.
    pub fn in_bounds(&self, x: f32, y: f32) -> bool {
        (0.0..=self.width()).contains(&x) && (0.0..=self.height()).contains(&y)
    }

    /// Clamps a point into `[0, width] x [0, height]`.
    pub fn clamp(&self, x: f32, y: f32) -> (f32, f32) {
        (x.clamp(0.0, self.width()), y.clamp(0.0, self.height()))
    }

    /// Grid rows, top to bottom.
    pub fn grid_rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.cols as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_arena_is_built_then_it_is_20_by_15_tiles_of_40px() {
        let world = TileWorld::arena().expect("arena layout");

        assert_eq!(world.cols(), 20);
        assert_eq!(world.rows(), 15);
        assert_eq!(world.tile_size(), 40);
        assert_eq!(world.width(), 800.0);
        assert_eq!(world.height(), 600.0);
        assert_eq!(world.grid_rows().count(), 15);
        assert!(world.grid_rows().all(|row| row.len() == 20));
    }

    #[test]
    fn when_arena_layout_is_parsed_then_every_cell_matches_its_character() {
        let world = TileWorld::arena().expect("arena layout");

        for (row, (cells, line)) in world.grid_rows().zip(ARENA_LAYOUT).enumerate() {
            for (col, (cell, ch)) in cells.iter().zip(line.chars()).enumerate() {
                let expected = if ch == '#' { Cell::Blocked } else { Cell::Open };
                assert_eq!(*cell, expected, "row {row} col {col}");
            }
        }
    }

    #[test]
    fn when_arena_origin_is_queried_then_it_is_a_wall() {
        let world = TileWorld::arena().expect("arena layout");

        assert!(world.is_blocked(0.0, 0.0));
        assert!(world.is_blocked(39.9, 39.9));
        assert!(!world.is_blocked(40.0, 40.0));
    }

    #[test]
    fn when_arena_spawn_points_are_queried_then_they_are_open() {
        let world = TileWorld::arena().expect("arena layout");

        assert_eq!(world.cell_at(100.0, 100.0), Cell::Open);
        assert_eq!(world.cell_at(400.0, 300.0), Cell::Open);
    }

    #[test]
    fn when_coordinates_are_outside_the_grid_then_cell_is_blocked() {
        let world = TileWorld::open(4, 3, 10);

        for (x, y) in [
            (-0.1, 5.0),
            (5.0, -0.1),
            (40.0, 5.0),
            (5.0, 30.0),
            (1_000.0, 1_000.0),
            (f32::NAN, 5.0),
            (5.0, f32::INFINITY),
        ] {
            assert_eq!(world.cell_at(x, y), Cell::Blocked, "({x}, {y})");
        }
        assert_eq!(world.cell_at(39.9, 29.9), Cell::Open);
    }

    #[test]
    fn when_grid_index_is_out_of_range_then_cell_is_blocked() {
        let world = TileWorld::open(2, 2, 8);

        assert_eq!(world.cell(-1, 0), Cell::Blocked);
        assert_eq!(world.cell(0, 2), Cell::Blocked);
        assert_eq!(world.cell(1, 1), Cell::Open);
    }

    #[test]
    fn when_layout_is_parsed_then_cells_follow_the_characters() {
        let world = TileWorld::from_rows(10, &["#.", ".#"]).expect("valid layout");

        assert_eq!(world.cell_at(5.0, 5.0), Cell::Blocked);
        assert_eq!(world.cell_at(15.0, 5.0), Cell::Open);
        assert_eq!(world.cell_at(5.0, 15.0), Cell::Open);
        assert_eq!(world.cell_at(15.0, 15.0), Cell::Blocked);
    }

    #[test]
    fn when_layout_is_malformed_then_returns_error() {
        assert_eq!(TileWorld::from_rows(10, &[]).unwrap_err(), WorldError::Empty);
        assert_eq!(TileWorld::from_rows(0, &[".."]).unwrap_err(), WorldError::Empty);
        assert_eq!(
            TileWorld::from_rows(10, &["..", "."]).unwrap_err(),
            WorldError::Ragged { row: 1 }
        );
        assert_eq!(
            TileWorld::from_rows(10, &[".x"]).unwrap_err(),
            WorldError::UnknownCell {
                row: 0,
                col: 1,
                ch: 'x'
            }
        );
    }

    #[test]
    fn when_point_is_clamped_then_it_lands_inside_world_bounds() {
        let world = TileWorld::arena().expect("arena layout");

        assert_eq!(world.clamp(-5.0, 700.0), (0.0, 600.0));
        assert_eq!(world.clamp(900.0, 10.0), (800.0, 10.0));
        assert!(world.in_bounds(800.0, 600.0));
        assert!(!world.in_bounds(800.1, 0.0));
    }
}
