//! Wall-kick tables.
//!
//! Offsets are in field coordinates (y grows downward) and are tried in order
//! after the unrotated position fails. The I and T tables follow SRS; every
//! other piece shares a symmetric default table.

use super::{
    geom::Point,
    piece::{PieceKind, RotationDirection, RotationState},
};

/// Kick candidates indexed by `[from_state][direction]`.
type KickTable = [[&'static [Point]; 2]; 4];

const fn p(x: i32, y: i32) -> Point {
    Point::new(x, y)
}

const T_KICKS: KickTable = [
    // 0 -> R, 0 -> L
    [
        &[p(-1, 0), p(-1, -1), p(0, 2), p(-1, 2)],
        &[p(1, 0), p(1, -1), p(0, 2), p(1, 2)],
    ],
    // R -> 2, R -> 0
    [
        &[p(1, 0), p(1, 1), p(0, -2), p(1, -2)],
        &[p(1, 0), p(1, 1), p(0, -2), p(1, -2)],
    ],
    // 2 -> L, 2 -> R
    [
        &[p(1, 0), p(1, -1), p(0, 2), p(1, 2)],
        &[p(-1, 0), p(-1, -1), p(0, 2), p(-1, 2)],
    ],
    // L -> 0, L -> 2
    [
        &[p(-1, 0), p(-1, 1), p(0, -2), p(-1, -2)],
        &[p(-1, 0), p(-1, 1), p(0, -2), p(-1, -2)],
    ],
];

const I_KICKS: KickTable = [
    // 0 -> R, 0 -> L
    [
        &[p(-2, 0), p(1, 0), p(-2, 1), p(1, -2)],
        &[p(-1, 0), p(2, 0), p(-1, -2), p(2, 1)],
    ],
    // R -> 2, R -> 0
    [
        &[p(-1, 0), p(2, 0), p(-1, -2), p(2, 1)],
        &[p(2, 0), p(-1, 0), p(2, -1), p(-1, 2)],
    ],
    // 2 -> L, 2 -> R
    [
        &[p(2, 0), p(-1, 0), p(2, -1), p(-1, 2)],
        &[p(1, 0), p(-2, 0), p(1, 2), p(-2, -1)],
    ],
    // L -> 0, L -> 2
    [
        &[p(1, 0), p(-2, 0), p(1, 2), p(-2, -1)],
        &[p(-2, 0), p(1, 0), p(-2, 1), p(1, -2)],
    ],
];

const DEFAULT_CW: &[Point] = &[p(-1, 0), p(1, 0), p(0, -1), p(-1, -1), p(1, -1)];
const DEFAULT_CCW: &[Point] = &[p(1, 0), p(-1, 0), p(0, -1), p(1, -1), p(-1, -1)];

const DEFAULT_KICKS: KickTable = [
    [DEFAULT_CW, DEFAULT_CCW],
    [DEFAULT_CW, DEFAULT_CCW],
    [DEFAULT_CW, DEFAULT_CCW],
    [DEFAULT_CW, DEFAULT_CCW],
];

/// Returns the ordered kick offsets for rotating `kind` out of `from`.
///
/// # Examples
///
/// ```
/// use dotris_engine::{Point, PieceKind, RotationDirection, RotationState, kicks};
///
/// let offsets = kicks(PieceKind::T, RotationState::SPAWN, RotationDirection::Clockwise);
/// assert_eq!(offsets[0], Point::new(-1, 0));
/// ```
#[must_use]
pub fn kicks(
    kind: PieceKind,
    from: RotationState,
    direction: RotationDirection,
) -> &'static [Point] {
    let table = match kind {
        PieceKind::I => &I_KICKS,
        PieceKind::T => &T_KICKS,
        PieceKind::O | PieceKind::S | PieceKind::Z | PieceKind::J | PieceKind::L => &DEFAULT_KICKS,
    };
    table[from.as_usize()][direction.as_usize()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_entry_has_candidates_without_identity() {
        for kind in PieceKind::ALL {
            let mut state = RotationState::SPAWN;
            for _ in 0..4 {
                for direction in [
                    RotationDirection::Clockwise,
                    RotationDirection::CounterClockwise,
                ] {
                    let offsets = kicks(kind, state, direction);
                    assert!(offsets.len() >= 4, "{kind:?} {state:?} {direction:?}");
                    assert!(!offsets.contains(&Point::ORIGIN));
                }
                state = state.rotated(RotationDirection::Clockwise);
            }
        }
    }

    #[test]
    fn test_i_kicks_are_inverse_pairs() {
        // Rotating back tries the negated offsets in the same order.
        let mut state = RotationState::SPAWN;
        for _ in 0..4 {
            let there = kicks(PieceKind::I, state, RotationDirection::Clockwise);
            let next = state.rotated(RotationDirection::Clockwise);
            let back = kicks(PieceKind::I, next, RotationDirection::CounterClockwise);
            let negated: Vec<_> = there.iter().map(|k| Point::ORIGIN - *k).collect();
            assert_eq!(back, negated.as_slice());
            state = next;
        }
    }

    #[test]
    fn test_shared_default_table() {
        let from = RotationState::SPAWN.rotated(RotationDirection::Clockwise);
        assert_eq!(
            kicks(PieceKind::J, from, RotationDirection::Clockwise),
            kicks(PieceKind::Z, RotationState::SPAWN, RotationDirection::Clockwise)
        );
    }
}
