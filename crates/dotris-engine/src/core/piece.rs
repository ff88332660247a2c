use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use super::geom::{Point, Rectangle};

/// Side length of the largest shape matrix (the I-piece).
pub const MAX_SHAPE_SIZE: usize = 4;

/// Number of blocks in every piece.
pub const PIECE_BLOCKS: usize = 4;

/// Enum representing the type of piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// O-piece.
    O = 1,
    /// S-piece.
    S = 2,
    /// Z-piece.
    Z = 3,
    /// J-piece.
    J = 4,
    /// L-piece.
    L = 5,
    /// T-piece.
    T = 6,
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    /// All piece kinds in catalog order.
    pub const ALL: [Self; Self::LEN] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
        PieceKind::T,
    ];

    /// Returns a fresh copy of the catalog shape in spawn orientation.
    #[must_use]
    pub const fn shape(self) -> Shape {
        SHAPES[self as usize]
    }

    /// Returns the spawn row of the shape's top edge, relative to the top visible row.
    ///
    /// Every piece spawns with its lowest block on the row just above the visible field.
    #[must_use]
    pub const fn spawn_offset(self) -> i32 {
        match self {
            PieceKind::S | PieceKind::Z => -3,
            PieceKind::I | PieceKind::O | PieceKind::J | PieceKind::L | PieceKind::T => -2,
        }
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use dotris_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
            PieceKind::T => 'T',
        }
    }

    /// Parses a piece kind from a single character.
    ///
    /// # Examples
    ///
    /// ```
    /// use dotris_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_char('S'), Some(PieceKind::S));
    /// assert_eq!(PieceKind::from_char('X'), None);
    /// ```
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'O' => Some(PieceKind::O),
            'S' => Some(PieceKind::S),
            'Z' => Some(PieceKind::Z),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            'T' => Some(PieceKind::T),
            _ => None,
        }
    }
}

/// Direction of a rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RotationDirection {
    Clockwise,
    CounterClockwise,
}

impl RotationDirection {
    pub(crate) const fn as_usize(self) -> usize {
        match self {
            RotationDirection::Clockwise => 0,
            RotationDirection::CounterClockwise => 1,
        }
    }
}

/// Rotation state of a piece.
///
/// - `0`: spawn orientation
/// - `1`: R (90° clockwise)
/// - `2`: 180°
/// - `3`: L (90° counterclockwise)
///
/// Rotation operations wrap around modulo 4.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RotationState(u8);

impl RotationState {
    pub const SPAWN: Self = Self(0);

    #[must_use]
    pub const fn rotated(self, direction: RotationDirection) -> Self {
        match direction {
            RotationDirection::Clockwise => Self((self.0 + 1) % 4),
            RotationDirection::CounterClockwise => Self((self.0 + 3) % 4),
        }
    }

    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    pub(crate) const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// A single cell of a shape matrix.
///
/// Only [`ShapeCell::Block`] takes part in collision. The spin variants mark empty
/// cells around the piece that are inspected for spin detection when it locks.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeCell {
    #[default]
    Empty,
    /// Solid cell of the piece.
    Block,
    /// Spin-detection cell.
    Spin,
    /// Spin-detection cell that also counts towards the mini test.
    SpinMini,
}

impl ShapeCell {
    #[must_use]
    pub const fn is_block(self) -> bool {
        matches!(self, ShapeCell::Block)
    }

    #[must_use]
    pub const fn is_spin(self) -> bool {
        matches!(self, ShapeCell::Spin | ShapeCell::SpinMini)
    }

    #[must_use]
    pub const fn is_spin_mini(self) -> bool {
        matches!(self, ShapeCell::SpinMini)
    }
}

/// Square cell matrix of a piece in one orientation.
///
/// Shapes are plain values: rotating returns a new matrix and never touches the
/// catalog entry it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    size: usize,
    cells: [[ShapeCell; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE],
}

impl Shape {
    /// Builds a shape from its rows.
    ///
    /// # Panics
    ///
    /// Panics if `size` exceeds [`MAX_SHAPE_SIZE`] or a non-empty cell lies outside
    /// the `size`×`size` matrix.
    #[must_use]
    pub const fn from_rows(
        size: usize,
        cells: [[ShapeCell; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE],
    ) -> Self {
        assert!(size > 0 && size <= MAX_SHAPE_SIZE);
        let mut row = 0;
        while row < MAX_SHAPE_SIZE {
            let mut col = 0;
            while col < MAX_SHAPE_SIZE {
                if row >= size || col >= size {
                    assert!(matches!(cells[row][col], ShapeCell::Empty));
                }
                col += 1;
            }
            row += 1;
        }
        Self { size, cells }
    }

    /// Side length of the matrix.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Returns the cell at column `col`, row `row` of the matrix.
    #[must_use]
    pub const fn cell(&self, col: usize, row: usize) -> ShapeCell {
        self.cells[row][col]
    }

    /// Iterates over every matrix cell with its offset from the top-left corner.
    pub fn cells(&self) -> impl Iterator<Item = (Point, ShapeCell)> + '_ {
        (0..self.size).flat_map(move |row| {
            (0..self.size).map(move |col| (offset(col, row), self.cells[row][col]))
        })
    }

    /// Returns the offsets of the solid cells.
    #[must_use]
    pub fn blocks(&self) -> ArrayVec<Point, PIECE_BLOCKS> {
        self.cells()
            .filter(|(_, cell)| cell.is_block())
            .map(|(point, _)| point)
            .collect()
    }

    /// Returns the matrix rotated by 90° in the given direction.
    ///
    /// - clockwise: `new[i][j] = old[n - 1 - j][i]`
    /// - counterclockwise: `new[i][j] = old[j][n - 1 - i]`
    #[must_use]
    pub fn rotated(&self, direction: RotationDirection) -> Self {
        let n = self.size;
        let mut cells = [[ShapeCell::Empty; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        for (i, row) in cells.iter_mut().enumerate().take(n) {
            for (j, cell) in row.iter_mut().enumerate().take(n) {
                *cell = match direction {
                    RotationDirection::Clockwise => self.cells[n - 1 - j][i],
                    RotationDirection::CounterClockwise => self.cells[j][n - 1 - i],
                };
            }
        }
        Self { size: n, cells }
    }

    /// Returns the tightest rectangle (in matrix offsets) containing every solid cell.
    ///
    /// Used for trimming next/hold previews, which do not want the padding rows
    /// and columns some shapes carry for their rotation pivot.
    ///
    /// # Examples
    ///
    /// ```
    /// use dotris_engine::{PieceKind, Rectangle};
    ///
    /// assert_eq!(PieceKind::I.shape().trimmed_bounds(), Rectangle::new(0, 1, 4, 1));
    /// assert_eq!(PieceKind::S.shape().trimmed_bounds(), Rectangle::new(0, 1, 3, 2));
    /// ```
    #[must_use]
    pub fn trimmed_bounds(&self) -> Rectangle {
        let blocks = self.blocks();
        let Some(first) = blocks.first() else {
            return Rectangle::default();
        };
        let (mut left, mut top, mut right, mut bottom) = (first.x, first.y, first.x, first.y);
        for p in &blocks {
            left = left.min(p.x);
            top = top.min(p.y);
            right = right.max(p.x);
            bottom = bottom.max(p.y);
        }
        Rectangle::new(left, top, right - left + 1, bottom - top + 1)
    }
}

#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
const fn offset(col: usize, row: usize) -> Point {
    Point::new(col as i32, row as i32)
}

const SHAPES: [Shape; PieceKind::LEN] = {
    use ShapeCell::{Block as B, Empty as E, Spin as S, SpinMini as M};
    const EEEE: [ShapeCell; MAX_SHAPE_SIZE] = [E; MAX_SHAPE_SIZE];
    [
        // I-piece
        Shape::from_rows(4, [[M, E, E, M], [B, B, B, B], [S, E, E, S], EEEE]),
        // O-piece
        Shape::from_rows(2, [[B, B, E, E], [B, B, E, E], EEEE, EEEE]),
        // S-piece
        Shape::from_rows(3, [[S, E, S, E], [M, B, B, E], [B, B, M, E], EEEE]),
        // Z-piece
        Shape::from_rows(3, [[S, E, S, E], [B, B, M, E], [M, B, B, E], EEEE]),
        // J-piece
        Shape::from_rows(3, [[B, M, M, E], [B, B, B, E], [S, E, S, E], EEEE]),
        // L-piece
        Shape::from_rows(3, [[M, M, B, E], [B, B, B, E], [S, E, S, E], EEEE]),
        // T-piece
        Shape::from_rows(3, [[M, B, M, E], [B, B, B, E], [S, E, S, E], EEEE]),
    ]
};

#[cfg(test)]
mod tests {
    use super::*;

    const DIRECTIONS: [RotationDirection; 2] = [
        RotationDirection::Clockwise,
        RotationDirection::CounterClockwise,
    ];

    #[test]
    fn test_every_shape_has_four_blocks() {
        for kind in PieceKind::ALL {
            assert_eq!(kind.shape().blocks().len(), PIECE_BLOCKS, "{kind:?}");
        }
    }

    #[test]
    fn test_four_rotations_restore_shape_and_state() {
        for kind in PieceKind::ALL {
            for direction in DIRECTIONS {
                let original = kind.shape();
                let mut shape = original;
                let mut state = RotationState::SPAWN;
                for _ in 0..4 {
                    shape = shape.rotated(direction);
                    state = state.rotated(direction);
                }
                assert_eq!(shape, original, "{kind:?} {direction:?}");
                assert_eq!(state, RotationState::SPAWN);
            }
        }
    }

    #[test]
    fn test_clockwise_then_counterclockwise_is_identity() {
        for kind in PieceKind::ALL {
            let shape = kind.shape();
            let back = shape
                .rotated(RotationDirection::Clockwise)
                .rotated(RotationDirection::CounterClockwise);
            assert_eq!(back, shape, "{kind:?}");
        }
    }

    #[test]
    fn test_t_clockwise_points_right() {
        let shape = PieceKind::T.shape().rotated(RotationDirection::Clockwise);
        let mut blocks = shape.blocks().to_vec();
        blocks.sort_by_key(|p| (p.y, p.x));
        assert_eq!(
            blocks,
            [
                Point::new(1, 0),
                Point::new(1, 1),
                Point::new(2, 1),
                Point::new(1, 2)
            ]
        );
    }

    #[test]
    fn test_i_rotation_matches_srs_columns() {
        let right = PieceKind::I.shape().rotated(RotationDirection::Clockwise);
        assert!(right.blocks().iter().all(|p| p.x == 2));
        let left = PieceKind::I
            .shape()
            .rotated(RotationDirection::CounterClockwise);
        assert!(left.blocks().iter().all(|p| p.x == 1));
    }

    #[test]
    fn test_rotation_does_not_touch_catalog() {
        let _ = PieceKind::T.shape().rotated(RotationDirection::Clockwise);
        assert_eq!(PieceKind::T.shape(), SHAPES[PieceKind::T as usize]);
    }

    #[test]
    fn test_spin_cells_rotate_with_blocks() {
        let down = PieceKind::T
            .shape()
            .rotated(RotationDirection::Clockwise)
            .rotated(RotationDirection::Clockwise);
        // Pointing down: the mini cells are now the bottom corners.
        assert!(down.cell(0, 2).is_spin_mini());
        assert!(down.cell(2, 2).is_spin_mini());
        assert!(down.cell(0, 0).is_spin());
        assert!(!down.cell(0, 0).is_spin_mini());
    }

    #[test]
    fn test_spawn_offsets_place_lowest_block_above_field() {
        for kind in PieceKind::ALL {
            let bounds = kind.shape().trimmed_bounds();
            assert_eq!(kind.spawn_offset() + bounds.bottom(), 0, "{kind:?}");
        }
    }

    #[test]
    fn test_trimmed_bounds() {
        assert_eq!(
            PieceKind::O.shape().trimmed_bounds(),
            Rectangle::new(0, 0, 2, 2)
        );
        assert_eq!(
            PieceKind::T.shape().trimmed_bounds(),
            Rectangle::new(0, 0, 3, 2)
        );
        let vertical_i = PieceKind::I.shape().rotated(RotationDirection::Clockwise);
        assert_eq!(vertical_i.trimmed_bounds(), Rectangle::new(2, 0, 1, 4));
    }

    #[test]
    fn test_piece_kind_char_conversion() {
        for kind in PieceKind::ALL {
            assert_eq!(PieceKind::from_char(kind.as_char()), Some(kind));
        }
        assert_eq!(PieceKind::from_char('x'), None);
    }
}
