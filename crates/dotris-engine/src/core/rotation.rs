use std::iter;

use arrayvec::ArrayVec;

use super::{
    geom::Point,
    kick::kicks,
    piece::{PIECE_BLOCKS, PieceKind, RotationDirection, RotationState, Shape},
    playfield::Playfield,
};

/// The falling piece.
///
/// Holds its own copy of the shape matrix, so rotating it never affects the
/// catalog. The ghost (landing) position is recomputed whenever the piece is
/// placed through one of the constructors below.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivePiece {
    kind: PieceKind,
    shape: Shape,
    rotation: RotationState,
    position: Point,
    ghost: Point,
}

impl ActivePiece {
    /// Places a freshly spawned piece of `kind` in spawn orientation at `position`.
    #[must_use]
    pub fn spawn(kind: PieceKind, position: Point, playfield: &Playfield) -> Self {
        Self::place(kind, kind.shape(), RotationState::SPAWN, position, playfield)
    }

    fn place(
        kind: PieceKind,
        shape: Shape,
        rotation: RotationState,
        position: Point,
        playfield: &Playfield,
    ) -> Self {
        let ghost = playfield.landing_position(&shape, position);
        Self {
            kind,
            shape,
            rotation,
            position,
            ghost,
        }
    }

    /// Returns this piece moved to `position`, or `None` if it would collide.
    #[must_use]
    pub fn moved_to(&self, position: Point, playfield: &Playfield) -> Option<Self> {
        if playfield.hit_test(&self.shape, position) {
            return None;
        }
        Some(Self::place(
            self.kind,
            self.shape,
            self.rotation,
            position,
            playfield,
        ))
    }

    #[must_use]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub const fn shape(&self) -> &Shape {
        &self.shape
    }

    #[must_use]
    pub const fn rotation(&self) -> RotationState {
        self.rotation
    }

    /// Top-left corner of the shape matrix in field coordinates.
    #[must_use]
    pub const fn position(&self) -> Point {
        self.position
    }

    /// Position the piece would land at if hard-dropped now.
    #[must_use]
    pub const fn ghost(&self) -> Point {
        self.ghost
    }

    /// Absolute field coordinates of the piece's blocks.
    #[must_use]
    pub fn blocks(&self) -> ArrayVec<Point, PIECE_BLOCKS> {
        self.shape
            .blocks()
            .into_iter()
            .map(|offset| self.position + offset)
            .collect()
    }

    /// Returns `true` if the piece cannot move one row down.
    #[must_use]
    pub fn will_land(&self, playfield: &Playfield) -> bool {
        playfield.will_land(&self.shape, self.position)
    }
}

/// Rotates `piece` in `direction`, applying wall kicks if needed.
///
/// The rotated shape is first tried at the current position, then at each kick
/// offset in table order. The first position that fits wins. Returns `None`
/// when every candidate collides.
///
/// # Examples
///
/// ```
/// use dotris_engine::{ActivePiece, PieceKind, Playfield, Point, RotationDirection, attempt_rotate};
///
/// let field = Playfield::new(10, 20);
/// let piece = ActivePiece::spawn(PieceKind::T, Point::new(3, 5), &field);
/// let rotated = attempt_rotate(&piece, RotationDirection::Clockwise, &field).unwrap();
/// assert_eq!(rotated.rotation().value(), 1);
/// assert_eq!(rotated.position(), piece.position());
/// ```
#[must_use]
pub fn attempt_rotate(
    piece: &ActivePiece,
    direction: RotationDirection,
    playfield: &Playfield,
) -> Option<ActivePiece> {
    let shape = piece.shape.rotated(direction);
    let rotation = piece.rotation.rotated(direction);
    iter::once(Point::ORIGIN)
        .chain(kicks(piece.kind, piece.rotation, direction).iter().copied())
        .map(|kick| piece.position + kick)
        .find(|&position| !playfield.hit_test(&shape, position))
        .map(|position| ActivePiece::place(piece.kind, shape, rotation, position, playfield))
}
