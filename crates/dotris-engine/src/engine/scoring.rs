use serde::Serialize;

use crate::{ActivePiece, PieceKind, Playfield};

/// How the active piece last changed position.
///
/// Only a rotation right before locking makes a clear eligible for spin scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::IsVariant)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    Spawn,
    Move,
    Rotate,
}

/// Spin classification of a locking piece.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpinKind {
    #[default]
    None,
    Mini,
    Full,
}

/// Outcome of one lock, as fed to [`evaluate_lock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineClear {
    pub cleared_rows: usize,
    pub spin: SpinKind,
    pub kind: PieceKind,
    pub perfect_clear: bool,
}

/// Score change caused by one lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreResult {
    pub score_delta: usize,
    /// Clear-type text. Empty for a plain single or when nothing was cleared.
    pub message: String,
    /// Back-to-back state after this lock.
    pub back_to_back: bool,
}

/// Classifies the spin of `piece` at its current position.
///
/// The spin cells of the shape matrix are checked against the playfield, with
/// walls and the floor counting as occupied. Three or more occupied spin cells
/// make a spin. It is a mini when exactly one mini cell is occupied for the
/// T-piece, or at most one for any other piece. Nothing counts unless the last
/// movement was a rotation.
///
/// # Examples
///
/// ```
/// use dotris_engine::{ActivePiece, MovementKind, PieceKind, Playfield, Point, SpinKind, detect_spin};
///
/// let field = Playfield::new(10, 20);
/// let piece = ActivePiece::spawn(PieceKind::T, Point::new(3, 10), &field);
/// assert_eq!(detect_spin(&piece, &field, MovementKind::Rotate), SpinKind::None);
/// ```
#[must_use]
pub fn detect_spin(
    piece: &ActivePiece,
    playfield: &Playfield,
    last_movement: MovementKind,
) -> SpinKind {
    if !last_movement.is_rotate() {
        return SpinKind::None;
    }
    let mut spin = 0;
    let mut mini = 0;
    for (offset, cell) in piece.shape().cells() {
        if !cell.is_spin() || !playfield.is_occupied(piece.position() + offset) {
            continue;
        }
        spin += 1;
        if cell.is_spin_mini() {
            mini += 1;
        }
    }
    if spin < 3 {
        return SpinKind::None;
    }
    let is_mini = match piece.kind() {
        PieceKind::T => mini == 1,
        _ => mini <= 1,
    };
    if is_mini {
        SpinKind::Mini
    } else {
        SpinKind::Full
    }
}

/// Scores one lock.
///
/// The base value is `cleared² × field_width × 10`, scaled by the clear type:
///
/// | rows | spin | message | multiplier | back-to-back after |
/// |---|---|---|---|---|
/// | 1 | mini | `{K}-Spin Mini` | ×1.5 | yes |
/// | 1 | full | `{K}-Spin Single` | ×2 | yes |
/// | 1 | none | (empty) | ×1 | no |
/// | 2 | any | `{K}-Spin Double` | ×2 | yes |
/// | 2 | none | `Double` | ×1 | no |
/// | 3 | any | `{K}-Spin Triple` | ×2 | yes |
/// | 3 | none | `Triple` | ×1 | no |
/// | 4 | - | `Quadruple` | ×1 | yes |
///
/// A back-to-back clear following another adds 10% and a `Back-To-Back `
/// prefix. A perfect clear adds `field_width² × 100` and a `Perfect Clear` line.
/// The delta is floored. A lock that clears nothing scores nothing and keeps the
/// back-to-back state.
///
/// # Examples
///
/// ```
/// use dotris_engine::{LineClear, PieceKind, SpinKind, evaluate_lock};
///
/// let clear = LineClear {
///     cleared_rows: 4,
///     spin: SpinKind::None,
///     kind: PieceKind::I,
///     perfect_clear: false,
/// };
/// let first = evaluate_lock(clear, false, 10);
/// assert_eq!(first.score_delta, 1600);
/// assert_eq!(first.message, "Quadruple");
///
/// let second = evaluate_lock(clear, first.back_to_back, 10);
/// assert_eq!(second.score_delta, 1760);
/// assert_eq!(second.message, "Back-To-Back Quadruple");
/// ```
#[must_use]
pub fn evaluate_lock(clear: LineClear, back_to_back: bool, field_width: usize) -> ScoreResult {
    let rows = clear.cleared_rows;
    if rows == 0 {
        return ScoreResult {
            score_delta: 0,
            message: String::new(),
            back_to_back,
        };
    }

    let k = clear.kind.as_char();
    let is_spin = clear.spin != SpinKind::None;
    // Multipliers are kept in halves so the arithmetic stays exact.
    let (mut message, halves, qualifies) = match (rows, clear.spin) {
        (1, SpinKind::Mini) => (format!("{k}-Spin Mini"), 3, true),
        (1, SpinKind::Full) => (format!("{k}-Spin Single"), 4, true),
        (1, SpinKind::None) => (String::new(), 2, false),
        (2, _) if is_spin => (format!("{k}-Spin Double"), 4, true),
        (2, _) => ("Double".to_owned(), 2, false),
        (3, _) if is_spin => (format!("{k}-Spin Triple"), 4, true),
        (3, _) => ("Triple".to_owned(), 2, false),
        _ => ("Quadruple".to_owned(), 2, true),
    };

    let bonus = back_to_back && qualifies;
    if bonus {
        message.insert_str(0, "Back-To-Back ");
    }
    let base = rows * rows * field_width * 10;
    let tenths = if bonus { 11 } else { 10 };
    let mut score_delta = base * halves * tenths / 20;

    if clear.perfect_clear {
        score_delta += field_width * field_width * 100;
        if !message.is_empty() {
            message.push('\n');
        }
        message.push_str("Perfect Clear");
    }

    ScoreResult {
        score_delta,
        message,
        back_to_back: qualifies,
    }
}
