use std::{collections::VecDeque, fmt::Write as _, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
    seq::SliceRandom,
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::PieceKind;

/// Piece source using the 7-bag randomization algorithm.
///
/// # 7-Bag System
///
/// 1. A "bag" holds all 7 piece types in a uniformly shuffled order
/// 2. Pieces are drawn from the bag front to back
/// 3. A new bag is shuffled only once the previous one is exhausted
///
/// Every aligned run of 7 draws is therefore a permutation of all types.
///
/// # Example
///
/// ```
/// use stackfall_engine::{PieceBag, PieceKind};
///
/// let mut bag = PieceBag::new();
/// let mut drawn: Vec<PieceKind> = (0..7).map(|_| bag.pop_next()).collect();
/// drawn.sort_by_key(|kind| *kind as u8);
/// assert_eq!(drawn, PieceKind::ALL);
/// ```
#[derive(Debug, Clone)]
pub struct PieceBag {
    rng: Pcg32,
    bag: VecDeque<PieceKind>,
}

impl Default for PieceBag {
    fn default() -> Self {
        Self::new()
    }
}

/// Seed for deterministic piece generation.
///
/// This is a 128-bit seed. The same seed produces the same piece sequence and
/// the same garbage hole columns, which makes sessions reproducible.
///
/// Seeds are written as 32 hex digits, both in JSON and on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceSeed([u8; 16]);

impl PieceSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Random number generator for the piece bag.
    pub(crate) fn bag_rng(self) -> Pcg32 {
        Pcg32::from_seed(self.0)
    }

    /// Independent generator for garbage hole columns.
    pub(crate) fn garbage_rng(self) -> Pcg32 {
        let num = u128::from_be_bytes(self.0);
        #[expect(clippy::cast_possible_truncation)]
        let folded = (num as u64) ^ ((num >> 64) as u64);
        Pcg32::seed_from_u64(folded)
    }
}

/// Error returned when a seed string is not 32 hex digits.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid hex seed: {input:?} (expected 32 hex digits)")]
pub struct ParseSeedError {
    input: String,
}

impl FromStr for PieceSeed {
    type Err = ParseSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseSeedError {
            input: s.to_owned(),
        };
        if s.len() != 32 {
            return Err(err());
        }
        let num = u128::from_str_radix(s, 16).map_err(|_| err())?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl std::fmt::Display for PieceSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

impl Serialize for PieceSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut hex_str = String::with_capacity(2 * self.0.len());
        write!(&mut hex_str, "{self}").map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&hex_str)
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

/// Allows generating random `PieceSeed` values with `rng.random()`.
impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}

impl PieceBag {
    /// Creates a new bag with a random seed.
    ///
    /// For deterministic piece generation, use [`Self::with_seed`] instead.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed.
    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        Self {
            rng: seed.bag_rng(),
            bag: VecDeque::with_capacity(PieceKind::LEN),
        }
    }

    fn refill(&mut self) {
        let mut new_bag = PieceKind::ALL;
        new_bag.shuffle(&mut self.rng);
        self.bag.extend(new_bag);
    }

    /// Draws the next piece, shuffling a fresh bag if the current one is empty.
    pub fn pop_next(&mut self) -> PieceKind {
        loop {
            if let Some(kind) = self.bag.pop_front() {
                return kind;
            }
            self.refill();
        }
    }

    /// Pieces still left in the current bag, in draw order.
    pub fn remaining(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.bag.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(byte: u8) -> PieceSeed {
        PieceSeed::from_bytes([byte; 16])
    }

    #[test]
    fn test_every_bag_is_a_permutation() {
        let mut bag = PieceBag::with_seed(seed(0x5a));
        for _ in 0..50 {
            let mut window: Vec<PieceKind> = (0..PieceKind::LEN).map(|_| bag.pop_next()).collect();
            window.sort_by_key(|kind| *kind as u8);
            assert_eq!(window, PieceKind::ALL);
        }
    }

    #[test]
    fn test_refill_only_when_exhausted() {
        let mut bag = PieceBag::with_seed(seed(1));
        assert_eq!(bag.remaining().count(), 0);
        bag.pop_next();
        assert_eq!(bag.remaining().count(), 6);
        for _ in 0..6 {
            bag.pop_next();
        }
        assert_eq!(bag.remaining().count(), 0);
    }

    #[test]
    fn test_deterministic_piece_generation() {
        let mut bag1 = PieceBag::with_seed(seed(0x12));
        let mut bag2 = PieceBag::with_seed(seed(0x12));
        for _ in 0..20 {
            assert_eq!(bag1.pop_next(), bag2.pop_next());
        }
    }

    #[test]
    fn test_seed_hex_format() {
        let seed = PieceSeed::from_bytes([
            0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, 0xFE, 0xDC, 0xBA, 0x98, 0x76, 0x54,
            0x32, 0x10,
        ]);
        let serialized = serde_json::to_string(&seed).unwrap();
        assert_eq!(serialized, "\"0123456789abcdeffedcba9876543210\"");
        let deserialized: PieceSeed = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, seed);

        assert_eq!(
            "0123456789ABCDEFFEDCBA9876543210".parse::<PieceSeed>(),
            Ok(seed)
        );
    }

    #[test]
    fn test_seed_parse_errors() {
        assert!("".parse::<PieceSeed>().is_err());
        assert!("0123".parse::<PieceSeed>().is_err());
        assert!("ghijklmnopqrstuvwxyzghijklmnopqr".parse::<PieceSeed>().is_err());
        let err = serde_json::from_str::<PieceSeed>("\"abc\"").unwrap_err();
        assert!(err.to_string().contains("invalid hex seed"));
    }
}
