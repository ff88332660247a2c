use std::{collections::VecDeque, fmt, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
    seq::SliceRandom,
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::PieceKind;

/// Upcoming-piece queue and hold slot, fed by a 7-bag randomizer.
///
/// The queue is the concatenation of independently shuffled bags, each a full
/// permutation of the seven kinds. A new bag is appended whenever seven or fewer
/// pieces remain, so previews of up to seven pieces never run dry.
///
/// The hold slot stores one kind. The first hold parks the current piece and
/// draws from the queue, later holds swap with the parked kind. Limiting hold
/// to once per piece life is the session's job.
///
/// # Example
///
/// ```
/// use dotris_engine::PieceBuffer;
///
/// let mut buffer = PieceBuffer::new();
/// let first = buffer.pop_next();
///
/// let preview: Vec<_> = buffer.next_pieces().take(5).collect();
/// assert_eq!(preview.len(), 5);
///
/// // Nothing held yet: holding returns the head of the queue.
/// let expected = buffer.peek_hold_result();
/// assert_eq!(buffer.hold(first), expected);
/// assert_eq!(buffer.held_piece(), Some(first));
/// ```
#[derive(Debug, Clone)]
pub struct PieceBuffer {
    rng: Pcg32,
    bag: VecDeque<PieceKind>,
    held: Option<PieceKind>,
}

impl Default for PieceBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// 128-bit seed for a deterministic piece sequence.
///
/// Serialized and parsed as 32 hexadecimal characters (big-endian).
///
/// # Example
///
/// ```
/// use dotris_engine::{PieceBuffer, PieceSeed};
///
/// let seed: PieceSeed = "0123456789abcdef0123456789abcdef".parse().unwrap();
/// let mut a = PieceBuffer::with_seed(seed);
/// let mut b = PieceBuffer::with_seed(seed);
/// assert_eq!(a.pop_next(), b.pop_next());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceSeed([u8; 16]);

/// Error returned when parsing a malformed [`PieceSeed`].
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid hex seed: {reason}")]
pub struct ParseSeedError {
    reason: String,
}

impl FromStr for PieceSeed {
    type Err = ParseSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 32 {
            return Err(ParseSeedError {
                reason: format!("expected 32 characters, got {}", s.len()),
            });
        }
        let num = u128::from_str_radix(s, 16).map_err(|e| ParseSeedError {
            reason: format!("{s} ({e})"),
        })?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl fmt::Display for PieceSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

impl Serialize for PieceSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PieceSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

impl PieceSeed {
    /// Generator for random choices other than the piece order, reproducible
    /// from the same seed.
    pub(crate) fn derived_rng(self) -> Pcg32 {
        let [a, b, c, d, e, f, g, h, ..] = self.0;
        Pcg32::seed_from_u64(u64::from_le_bytes([a, b, c, d, e, f, g, h]))
    }
}

/// Allows generating random `PieceSeed` values with `rng.random()`.
impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}

impl PieceBuffer {
    /// Creates a buffer seeded from the thread-local generator.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed for a reproducible sequence.
    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        let rng = Pcg32::from_seed(seed.0);
        let bag = VecDeque::with_capacity(PieceKind::LEN * 3);
        let mut this = Self {
            rng,
            bag,
            held: None,
        };
        this.refill();
        this
    }

    /// Appends shuffled bags until more than seven pieces are queued.
    fn refill(&mut self) {
        while self.bag.len() <= PieceKind::LEN {
            let mut new_bag = PieceKind::ALL;
            new_bag.shuffle(&mut self.rng);
            self.bag.extend(new_bag);
        }
    }

    /// Removes and returns the head of the queue.
    ///
    /// # Panics
    ///
    /// Panics if the queue is empty, which the refill policy rules out.
    pub fn pop_next(&mut self) -> PieceKind {
        self.refill();
        self.bag
            .pop_front()
            .expect("piece queue is refilled before every draw")
    }

    /// Iterates over the queued pieces, head first.
    ///
    /// The iterator always yields at least seven pieces.
    pub fn next_pieces(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.bag.iter().copied()
    }

    /// Returns the kind [`Self::hold`] would hand out right now.
    #[must_use]
    pub fn peek_hold_result(&self) -> PieceKind {
        self.held.unwrap_or_else(|| self.bag[0])
    }

    /// Parks `current` in the hold slot and returns the piece to play next.
    ///
    /// Returns the previously held kind, or the head of the queue on the first
    /// hold.
    pub fn hold(&mut self, current: PieceKind) -> PieceKind {
        self.held
            .replace(current)
            .unwrap_or_else(|| self.pop_next())
    }

    #[must_use]
    pub fn held_piece(&self) -> Option<PieceKind> {
        self.held
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    const SEED: PieceSeed = PieceSeed([
        0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77,
        0x88,
    ]);

    #[test]
    fn test_fresh_bag_is_a_permutation() {
        for _ in 0..20 {
            let mut buffer = PieceBuffer::new();
            let drawn: HashSet<_> = (0..PieceKind::LEN).map(|_| buffer.pop_next()).collect();
            assert_eq!(drawn.len(), PieceKind::LEN);
        }
    }

    #[test]
    fn test_every_bag_is_a_permutation() {
        let mut buffer = PieceBuffer::with_seed(SEED);
        for _ in 0..10 {
            let mut bag: Vec<_> = (0..PieceKind::LEN).map(|_| buffer.pop_next()).collect();
            bag.sort_by_key(|kind| *kind as u8);
            assert_eq!(bag, PieceKind::ALL);
        }
    }

    #[test]
    fn test_preview_never_runs_short() {
        let mut buffer = PieceBuffer::with_seed(SEED);
        for _ in 0..50 {
            assert!(buffer.next_pieces().count() >= PieceKind::LEN);
            let head = buffer.next_pieces().next();
            assert_eq!(Some(buffer.pop_next()), head);
        }
    }

    #[test]
    fn test_hold_swaps_with_held_piece() {
        let mut buffer = PieceBuffer::with_seed(SEED);
        let current = buffer.pop_next();
        let head = buffer.next_pieces().next().unwrap();

        assert_eq!(buffer.peek_hold_result(), head);
        let played = buffer.hold(current);
        assert_eq!(played, head);
        assert_eq!(buffer.held_piece(), Some(current));

        // Second hold swaps back without touching the queue.
        let queued: Vec<_> = buffer.next_pieces().collect();
        assert_eq!(buffer.peek_hold_result(), current);
        assert_eq!(buffer.hold(played), current);
        assert_eq!(buffer.held_piece(), Some(played));
        assert_eq!(buffer.next_pieces().collect::<Vec<_>>(), queued);
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = PieceBuffer::with_seed(SEED);
        let mut b = PieceBuffer::with_seed(SEED);
        for _ in 0..30 {
            assert_eq!(a.pop_next(), b.pop_next());
        }
    }

    mod piece_seed_format {
        use super::*;

        #[test]
        fn test_serializes_as_big_endian_hex() {
            let seed = PieceSeed([
                0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, 0xFE, 0xDC, 0xBA, 0x98, 0x76, 0x54,
                0x32, 0x10,
            ]);
            let json = serde_json::to_string(&seed).unwrap();
            assert_eq!(json, "\"0123456789abcdeffedcba9876543210\"");
            assert_eq!(seed.to_string(), "0123456789abcdeffedcba9876543210");
            let back: PieceSeed = serde_json::from_str(&json).unwrap();
            assert_eq!(back, seed);
        }

        #[test]
        fn test_parses_uppercase() {
            let seed: PieceSeed = "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF".parse().unwrap();
            assert_eq!(seed, PieceSeed([0xFF; 16]));
        }

        #[test]
        fn test_rejects_bad_input() {
            for input in ["", "0123", "ghijklmnopqrstuvwxyzghijklmnopqr"] {
                let err = input.parse::<PieceSeed>().unwrap_err();
                assert!(err.to_string().starts_with("invalid hex seed"), "{input}");
            }
            let err = serde_json::from_str::<PieceSeed>("\"0123456789abcdef0123456789abcdef0\"")
                .unwrap_err();
            assert!(err.to_string().contains("invalid hex seed"));
        }

        #[test]
        fn test_random_seed_roundtrip_keeps_sequence() {
            let seed: PieceSeed = rand::rng().random();
            let parsed: PieceSeed = seed.to_string().parse().unwrap();
            let mut a = PieceBuffer::with_seed(seed);
            let mut b = PieceBuffer::with_seed(parsed);
            for _ in 0..20 {
                assert_eq!(a.pop_next(), b.pop_next());
            }
        }
    }
}
