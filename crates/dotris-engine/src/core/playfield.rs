use std::fmt;

use arrayvec::ArrayVec;
use serde::Serialize;

use super::{
    geom::Point,
    piece::{PIECE_BLOCKS, PieceKind, Shape},
};

/// Number of rows above the visible field where pieces spawn.
///
/// These rows are ordinary addressable cells. They are never rendered, and a piece
/// locking with blocks left in them ends the game.
pub const SPAWN_BUFFER_ROWS: i32 = 6;

// Wall cells on the left, right and bottom of the back-buffer.
const SENTINEL_MARGIN: i32 = 2;
const SENTINEL_CELLS: usize = SENTINEL_MARGIN.unsigned_abs() as usize;

/// A single cell of the playfield.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Block {
    /// Empty cell.
    #[default]
    Empty,
    /// Sentinel border, or anything outside the back-buffer.
    Wall,
    /// Locked block of a specific piece.
    Piece(PieceKind),
}

impl Block {
    #[must_use]
    pub const fn is_empty(self) -> bool {
        matches!(self, Block::Empty)
    }

    /// Returns the character used by the ASCII rendering.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Block::Empty => '.',
            Block::Wall => '#',
            Block::Piece(kind) => kind.as_char(),
        }
    }

    const fn from_char(c: char) -> Option<Self> {
        match c {
            '.' => Some(Block::Empty),
            '#' => Some(Block::Wall),
            _ => match PieceKind::from_char(c) {
                Some(kind) => Some(Block::Piece(kind)),
                None => None,
            },
        }
    }
}

/// One row of the back-buffer, sentinels included, with its fill counter.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Row {
    cells: Vec<Block>,
    fill: usize,
}

impl Row {
    fn open(width: usize) -> Self {
        let mut cells = vec![Block::Wall; width + 2 * SENTINEL_CELLS];
        cells[SENTINEL_CELLS..][..width].fill(Block::Empty);
        Self { cells, fill: 0 }
    }

    fn floor(width: usize) -> Self {
        Self {
            cells: vec![Block::Wall; width + 2 * SENTINEL_CELLS],
            fill: 0,
        }
    }

    fn playable_cells(&self) -> &[Block] {
        &self.cells[SENTINEL_CELLS..self.cells.len() - SENTINEL_CELLS]
    }

    fn is_full(&self) -> bool {
        self.fill == self.playable_cells().len()
    }
}

/// The stack of locked blocks.
///
/// Coordinates are field coordinates: `(0, 0)` is the top-left visible cell and
/// the spawn buffer occupies rows `-SPAWN_BUFFER_ROWS..0`. The back-buffer is
/// surrounded by two columns of walls on each side and two rows of walls at the
/// bottom, and every point outside it reads as [`Block::Wall`]. Collision tests
/// therefore never need a bounds check.
///
/// Each row keeps a fill counter equal to the number of non-empty playable cells,
/// so a row is clearable exactly when its counter reaches the field width.
///
/// # Example
///
/// ```
/// use dotris_engine::{Playfield, PieceKind, Point};
///
/// let mut field = Playfield::new(10, 20);
/// let shape = PieceKind::O.shape();
/// let landing = field.landing_position(&shape, Point::new(4, -2));
/// assert_eq!(landing, Point::new(4, 18));
///
/// field.commit(&shape, PieceKind::O, landing);
/// assert_eq!(field.row_fill(19), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playfield {
    width: i32,
    height: i32,
    rows: Vec<Row>,
}

impl Playfield {
    /// Creates an empty playfield with the given visible size.
    ///
    /// # Panics
    ///
    /// Panics if `width` or `height` is not positive.
    #[must_use]
    pub fn new(width: i32, height: i32) -> Self {
        assert!(width > 0 && height > 0, "playfield size must be positive");
        let cells = width.unsigned_abs() as usize;
        let open_rows = (SPAWN_BUFFER_ROWS + height).unsigned_abs() as usize;
        let rows = (0..open_rows)
            .map(|_| Row::open(cells))
            .chain((0..SENTINEL_CELLS).map(|_| Row::floor(cells)))
            .collect();
        Self {
            width,
            height,
            rows,
        }
    }

    /// Width of the visible field.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Height of the visible field.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }

    fn row_index(&self, y: i32) -> Option<usize> {
        usize::try_from(y + SPAWN_BUFFER_ROWS)
            .ok()
            .filter(|&idx| idx < self.rows.len())
    }

    fn cell_index(&self, point: Point) -> Option<(usize, usize)> {
        let row = self.row_index(point.y)?;
        let col = usize::try_from(point.x + SENTINEL_MARGIN)
            .ok()
            .filter(|&col| col < self.rows[row].cells.len())?;
        Some((row, col))
    }

    /// Returns the cell at `point`, or [`Block::Wall`] outside the back-buffer.
    #[must_use]
    pub fn block_at(&self, point: Point) -> Block {
        self.cell_index(point)
            .map_or(Block::Wall, |(row, col)| self.rows[row].cells[col])
    }

    #[must_use]
    pub fn is_occupied(&self, point: Point) -> bool {
        !self.block_at(point).is_empty()
    }

    /// Returns `true` if any block of `shape` placed at `position` overlaps an
    /// occupied cell.
    #[must_use]
    pub fn hit_test(&self, shape: &Shape, position: Point) -> bool {
        shape
            .blocks()
            .iter()
            .any(|&offset| self.is_occupied(position + offset))
    }

    /// Returns `true` if the shape cannot move one row down from `position`.
    #[must_use]
    pub fn will_land(&self, shape: &Shape, position: Point) -> bool {
        self.hit_test(shape, position.down())
    }

    /// Returns the position the shape would come to rest at when dropped straight
    /// down from `position`.
    ///
    /// Each column is scanned downward from its lowest block and the smallest
    /// drop wins.
    #[must_use]
    pub fn landing_position(&self, shape: &Shape, position: Point) -> Point {
        let mut lowest: ArrayVec<Point, PIECE_BLOCKS> = ArrayVec::new();
        for block in shape.blocks() {
            match lowest.iter_mut().find(|p| p.x == block.x) {
                Some(p) => p.y = p.y.max(block.y),
                None => lowest.push(block),
            }
        }
        let drop = lowest
            .iter()
            .map(|&offset| {
                let mut cell = position + offset;
                let mut distance = 0;
                while !self.is_occupied(cell.down()) {
                    cell = cell.down();
                    distance += 1;
                }
                distance
            })
            .min()
            .unwrap_or(0);
        position.offset(0, drop)
    }

    /// Marks the blocks of `shape` at `position` as occupied by `kind`.
    pub fn commit(&mut self, shape: &Shape, kind: PieceKind, position: Point) {
        for offset in shape.blocks() {
            let Some((row, col)) = self.cell_index(position + offset) else {
                continue;
            };
            let row = &mut self.rows[row];
            if row.cells[col].is_empty() {
                row.fill += 1;
            }
            row.cells[col] = Block::Piece(kind);
        }
    }

    /// Removes every full row from `top_row` down to the bottom of the field and
    /// returns how many were removed.
    ///
    /// Each removed row is replaced by an empty row inserted at the top of the
    /// spawn buffer, so everything above it shifts down by one.
    pub fn clear_full_rows(&mut self, top_row: i32) -> usize {
        let cells = self.width.unsigned_abs() as usize;
        let mut cleared = 0;
        for y in top_row.max(-SPAWN_BUFFER_ROWS)..self.height {
            let Some(idx) = self.row_index(y) else {
                continue;
            };
            if self.rows[idx].is_full() {
                self.rows.remove(idx);
                self.rows.insert(0, Row::open(cells));
                cleared += 1;
            }
        }
        cleared
    }

    /// Number of occupied cells in row `y`, or `0` outside the back-buffer.
    #[must_use]
    pub fn row_fill(&self, y: i32) -> usize {
        self.row_index(y).map_or(0, |idx| self.rows[idx].fill)
    }

    #[must_use]
    pub fn is_row_empty(&self, y: i32) -> bool {
        self.row_fill(y) == 0
    }

    /// Returns `true` if the visible field holds no blocks at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        (0..self.height).all(|y| self.is_row_empty(y))
    }

    /// Returns `true` if any of the `rows` rows directly above the visible field
    /// hold a block.
    #[must_use]
    pub fn forbidden_rows_occupied(&self, rows: i32) -> bool {
        (-(rows.min(SPAWN_BUFFER_ROWS))..0).any(|y| !self.is_row_empty(y))
    }

    /// Total number of occupied cells in the visible field.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        (0..self.height).map(|y| self.row_fill(y)).sum()
    }

    /// Iterates over the playable cells of the visible rows, top to bottom.
    pub fn visible_rows(&self) -> impl Iterator<Item = &[Block]> + '_ {
        let start = SPAWN_BUFFER_ROWS.unsigned_abs() as usize;
        let height = self.height.unsigned_abs() as usize;
        self.rows[start..][..height].iter().map(Row::playable_cells)
    }

    /// Builds a playfield from ASCII art for tests and fixtures.
    ///
    /// Every non-blank line is one visible row, top to bottom. `.` is an empty
    /// cell, a piece letter is a block of that kind and `#` is an anonymous block.
    /// All rows must have the same width.
    ///
    /// # Panics
    ///
    /// Panics on an unknown character or rows of different widths.
    #[must_use]
    pub fn from_ascii(art: &str) -> Self {
        let lines: Vec<&str> = art
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let width = lines.first().map_or(0, |line| line.chars().count());
        let width = i32::try_from(width).expect("row too wide");
        let height = i32::try_from(lines.len()).expect("too many rows");
        let mut field = Self::new(width, height);

        for (y, line) in (0..).zip(&lines) {
            let chars: Vec<char> = line.chars().collect();
            assert_eq!(
                chars.len(),
                width.unsigned_abs() as usize,
                "each row must have exactly {width} cells, got {} at row {y}",
                chars.len()
            );
            for (x, &ch) in (0..).zip(&chars) {
                let block = Block::from_char(ch)
                    .unwrap_or_else(|| panic!("unknown cell {ch:?} at ({x}, {y})"));
                if block.is_empty() {
                    continue;
                }
                if let Some((row, col)) = field.cell_index(Point::new(x, y)) {
                    field.rows[row].cells[col] = block;
                    field.rows[row].fill += 1;
                }
            }
        }
        field
    }
}

impl fmt::Display for Playfield {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.visible_rows().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for block in row {
                write!(f, "{}", block.as_char())?;
            }
        }
        Ok(())
    }
}

impl Serialize for Playfield {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Format: ["..........", "....T.....", ...] (visible rows, top to bottom)
        serializer.collect_seq(
            self.visible_rows()
                .map(|row| row.iter().map(|b| b.as_char()).collect::<String>()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::piece::RotationDirection;

    fn assert_fill_invariant(field: &Playfield) {
        for y in -SPAWN_BUFFER_ROWS..field.height() {
            let counted = (0..field.width())
                .filter(|&x| field.is_occupied(Point::new(x, y)))
                .count();
            assert_eq!(field.row_fill(y), counted, "row {y}");
        }
    }

    #[test]
    fn test_new_playfield_is_empty_and_walled() {
        let field = Playfield::new(10, 20);
        assert!(field.is_empty());
        assert_eq!(field.occupied_count(), 0);
        assert_eq!(field.block_at(Point::new(0, 0)), Block::Empty);
        assert_eq!(field.block_at(Point::new(9, 19)), Block::Empty);
        assert_eq!(field.block_at(Point::new(-1, 0)), Block::Wall);
        assert_eq!(field.block_at(Point::new(10, 0)), Block::Wall);
        assert_eq!(field.block_at(Point::new(0, 20)), Block::Wall);
        // Buffer rows are open, anything beyond reads as wall.
        assert_eq!(field.block_at(Point::new(0, -SPAWN_BUFFER_ROWS)), Block::Empty);
        assert_eq!(field.block_at(Point::new(0, -SPAWN_BUFFER_ROWS - 1)), Block::Wall);
        assert_eq!(field.block_at(Point::new(-50, 100)), Block::Wall);
        assert_fill_invariant(&field);
    }

    #[test]
    fn test_hit_test_and_will_land() {
        let field = Playfield::from_ascii(
            "
            ....
            ....
            .#..
            ",
        );
        let o = PieceKind::O.shape();
        assert!(!field.hit_test(&o, Point::new(2, 0)));
        assert!(field.hit_test(&o, Point::new(0, 1)));
        assert!(field.hit_test(&o, Point::new(3, 0)));
        assert!(field.will_land(&o, Point::new(0, 0)));
        assert!(field.will_land(&o, Point::new(2, 1)));
        assert!(!field.will_land(&o, Point::new(2, 0)));
    }

    #[test]
    fn test_landing_position_uses_lowest_block_per_column() {
        let field = Playfield::from_ascii(
            "
            ......
            ......
            ......
            ......
            ..#...
            ......
            ",
        );
        // T pointing up: the stem column lands on the block at (2, 4).
        let t = PieceKind::T.shape();
        assert_eq!(field.landing_position(&t, Point::new(1, -2)), Point::new(1, 2));
        // Vertical I in a free column drops to the floor.
        let i = PieceKind::I.shape().rotated(RotationDirection::Clockwise);
        assert_eq!(field.landing_position(&i, Point::new(2, -4)), Point::new(2, 2));
    }

    #[test]
    fn test_landing_then_commit_never_collides() {
        let mut field = Playfield::from_ascii(
            "
            ........
            ........
            ...##...
            #.....#.
            ##.#..##
            ",
        );
        for kind in PieceKind::ALL {
            let mut shape = kind.shape();
            for _ in 0..4 {
                for x in -1..field.width() {
                    let start = Point::new(x, -4);
                    if field.hit_test(&shape, start) {
                        continue;
                    }
                    let landing = field.landing_position(&shape, start);
                    assert!(!field.hit_test(&shape, landing), "{kind:?} at {x}");
                    assert!(field.will_land(&shape, landing), "{kind:?} at {x}");
                    let mut copy = field.clone();
                    copy.commit(&shape, kind, landing);
                    assert_eq!(copy.occupied_count(), copy_total(&copy));
                    assert_fill_invariant(&copy);
                }
                shape = shape.rotated(RotationDirection::Clockwise);
            }
        }
        field.commit(&PieceKind::O.shape(), PieceKind::O, Point::new(4, 0));
        assert_fill_invariant(&field);
    }

    fn copy_total(field: &Playfield) -> usize {
        field
            .visible_rows()
            .flatten()
            .filter(|b| !b.is_empty())
            .count()
    }

    #[test]
    fn test_commit_updates_fill() {
        let mut field = Playfield::new(4, 4);
        let i = PieceKind::I.shape();
        field.commit(&i, PieceKind::I, Point::new(0, 2));
        assert_eq!(field.row_fill(3), 4);
        assert_eq!(field.block_at(Point::new(2, 3)), Block::Piece(PieceKind::I));
        assert_fill_invariant(&field);
    }

    #[test]
    fn test_clear_full_rows_shifts_rows_down() {
        let mut field = Playfield::from_ascii(
            "
            ....
            .T..
            IIII
            .OO.
            IIII
            ",
        );
        let cleared = field.clear_full_rows(0);
        assert_eq!(cleared, 2);
        assert_eq!(field.to_string(), "....\n....\n....\n.T..\n.OO.");
        assert_eq!(field.occupied_count(), 3);
        assert_fill_invariant(&field);
    }

    #[test]
    fn test_clear_full_rows_respects_top_row() {
        let mut field = Playfield::from_ascii(
            "
            ####
            ....
            ####
            ",
        );
        assert_eq!(field.clear_full_rows(1), 1);
        assert_eq!(field.to_string(), "....\n####\n....");
        assert_fill_invariant(&field);
    }

    #[test]
    fn test_clear_all_rows_is_perfect_clear() {
        let mut field = Playfield::from_ascii(
            "
            ....
            LLLL
            JJJJ
            ",
        );
        assert_eq!(field.clear_full_rows(-2), 2);
        assert!(field.is_empty());
        assert_eq!(field.occupied_count(), 0);
    }

    #[test]
    fn test_forbidden_rows() {
        let mut field = Playfield::new(4, 4);
        assert!(!field.forbidden_rows_occupied(SPAWN_BUFFER_ROWS));
        field.commit(&PieceKind::O.shape(), PieceKind::O, Point::new(1, -1));
        assert!(field.forbidden_rows_occupied(1));
        assert!(field.forbidden_rows_occupied(SPAWN_BUFFER_ROWS));
        assert!(!field.is_row_empty(-1));
        assert!(field.is_row_empty(-2));
        // Buffer blocks are not part of the visible field.
        assert_eq!(field.occupied_count(), 2);
    }

    #[test]
    fn test_serialize_visible_rows() {
        let field = Playfield::from_ascii(
            "
            ..S.
            #ZZ.
            ",
        );
        let json = serde_json::to_string(&field).unwrap();
        assert_eq!(json, r##"["..S.","#ZZ."]"##);
    }
}
