//! Distribution functions.
//!
//! A distribution maps a source value within a source range to an index
//! within a destination range `[dst_min, dst_max)`. In practice the source is
//! a row index bounded by the row count and the destination is a column's
//! value domain, so the result is a position in the domain rather than a
//! data value.

use crate::error::{GeneratorError, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::fmt;
use std::str::FromStr;

/// The named distributions a column may select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DistributionKind {
    Ascending,
    /// Ascending traversal with the mirror applied to every value.
    Descending,
    Random,
    RunLength,
    LinearConv,
}

impl DistributionKind {
    pub fn name(&self) -> &'static str {
        match self {
            DistributionKind::Ascending => "ascending",
            DistributionKind::Descending => "descending",
            DistributionKind::Random => "random",
            DistributionKind::RunLength => "runlength",
            DistributionKind::LinearConv => "linearconv",
        }
    }

    /// Build the index function for this kind.
    ///
    /// `seed_id` only matters for `Random`: equal ids give equal sequences.
    pub fn function(&self, seed_id: &str) -> DistributionFunction {
        match self {
            DistributionKind::Ascending | DistributionKind::Descending => {
                DistributionFunction::Ascending
            }
            DistributionKind::RunLength => DistributionFunction::RunLength,
            DistributionKind::LinearConv => DistributionFunction::LinearConv,
            DistributionKind::Random => DistributionFunction::random(seed_id),
        }
    }

    /// How values drawn with this kind are mirrored into negative space.
    pub fn mirror_policy(&self) -> MirrorPolicy {
        match self {
            DistributionKind::Ascending => MirrorPolicy::Identity,
            DistributionKind::Descending => MirrorPolicy::Reverse,
            DistributionKind::Random => MirrorPolicy::NegateOdd,
            DistributionKind::RunLength | DistributionKind::LinearConv => MirrorPolicy::NegateEven,
        }
    }
}

impl fmt::Display for DistributionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DistributionKind {
    type Err = GeneratorError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ascending" | "incremental" => Ok(DistributionKind::Ascending),
            "descending" => Ok(DistributionKind::Descending),
            "random" => Ok(DistributionKind::Random),
            "runlength" => Ok(DistributionKind::RunLength),
            "linearconv" => Ok(DistributionKind::LinearConv),
            _ => Err(GeneratorError::UnknownDistribution(s.to_string())),
        }
    }
}

/// Sign and position adjustment applied to rendered values.
///
/// Negating a subset of numeric values doubles the reachable value space
/// without a second generation path. Strings are only affected by
/// `Reverse`, which reflects the embedded number within its range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorPolicy {
    Identity,
    Reverse,
    NegateOdd,
    NegateEven,
}

impl MirrorPolicy {
    /// Whether the numeric value at domain `index` is negated.
    pub fn negates(&self, index: i64) -> bool {
        let odd = index.rem_euclid(2) == 1;
        match self {
            MirrorPolicy::Identity => false,
            MirrorPolicy::Reverse => true,
            MirrorPolicy::NegateOdd => odd,
            MirrorPolicy::NegateEven => !odd,
        }
    }

    /// Whether string values have their embedded number reflected.
    pub fn mirrors_strings(&self) -> bool {
        matches!(self, MirrorPolicy::Reverse)
    }
}

/// A resolved distribution, ready to map indices.
#[derive(Debug, Clone)]
pub enum DistributionFunction {
    /// `(src_val mod width) + dst_min`: cycles through the destination in order.
    Ascending,
    /// Ascending over a squared destination, divided back down: each index
    /// repeats `width` times before advancing.
    RunLength,
    /// Proportional scaling of the source range onto the destination.
    LinearConv,
    /// Uniform draws, ignoring the source value.
    Random(ChaCha8Rng),
}

impl DistributionFunction {
    /// A random distribution seeded from the 64-bit hash of `seed_id`.
    pub fn random(seed_id: &str) -> Self {
        DistributionFunction::Random(ChaCha8Rng::seed_from_u64(hash64(seed_id)))
    }

    /// Map `src_val` in `[src_min, src_max]` to an index in `[dst_min, dst_max)`.
    pub fn apply(
        &mut self,
        src_min: i64,
        src_max: i64,
        src_val: i64,
        dst_min: i64,
        dst_max: i64,
    ) -> Result<i64> {
        check(src_min, src_max, dst_min, dst_max)?;
        let width = dst_max - dst_min;
        let index = match self {
            DistributionFunction::Ascending => ascending(src_val, dst_min, width),
            DistributionFunction::RunLength => {
                if width == 0 {
                    dst_min
                } else {
                    let width = i128::from(width);
                    let cycle = i128::from(src_val).rem_euclid(width * width);
                    dst_min + (cycle / width) as i64
                }
            }
            DistributionFunction::LinearConv => {
                if src_min == src_max {
                    dst_min + width / 2
                } else {
                    let offset = (src_val - src_min) as f64;
                    let range = (src_max - src_min) as f64;
                    (offset / range * width as f64).floor() as i64 + dst_min
                }
            }
            DistributionFunction::Random(rng) => {
                if width == 0 {
                    dst_min
                } else {
                    rng.random_range(dst_min..dst_max)
                }
            }
        };
        Ok(index)
    }
}

fn ascending(src_val: i64, dst_min: i64, width: i64) -> i64 {
    if width == 0 {
        return dst_min;
    }
    src_val.rem_euclid(width) + dst_min
}

/// Ensure neither range has its minimum above its maximum.
pub fn check(src_min: i64, src_max: i64, dst_min: i64, dst_max: i64) -> Result<()> {
    if src_min > src_max {
        return Err(GeneratorError::InvalidRange {
            bound: "source",
            min: src_min,
            max: src_max,
        });
    }
    if dst_min > dst_max {
        return Err(GeneratorError::InvalidRange {
            bound: "destination",
            min: dst_min,
            max: dst_max,
        });
    }
    Ok(())
}

/// FNV-1a over the UTF-8 bytes of `key`.
///
/// Stable across processes and platforms, which `std`'s hasher is not.
pub fn hash64(key: &str) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    let mut hash = FNV_OFFSET;
    for byte in key.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascending_apply() {
        let mut f = DistributionKind::Ascending.function("col1");
        assert_eq!(f.apply(0, 100, 1, 0, 100).unwrap(), 1);
        assert_eq!(f.apply(0, 200, 101, 0, 100).unwrap(), 1);
        assert_eq!(f.apply(0, 300, 201, 0, 100).unwrap(), 1);
        assert_eq!(f.apply(0, 300, 50, 0, 100).unwrap(), 50);
        assert_eq!(f.apply(0, 300, 99, 0, 100).unwrap(), 99);
    }

    #[test]
    fn test_ascending_visits_every_index_once_per_cycle() {
        let mut f = DistributionFunction::Ascending;
        let size = 37;
        let mut seen = vec![0u32; size as usize];
        for row in 0..size {
            let index = f.apply(0, size, row, 0, size).unwrap();
            seen[index as usize] += 1;
        }
        assert!(seen.iter().all(|&count| count == 1));
    }

    #[test]
    fn test_runlength_repeats_each_index() {
        for n in 1..=6i64 {
            let mut f = DistributionFunction::RunLength;
            let values: Vec<i64> = (0..n * n)
                .map(|row| f.apply(0, n * n, row, 0, n).unwrap())
                .collect();
            for (position, chunk) in values.chunks(n as usize).enumerate() {
                assert!(chunk.iter().all(|&v| v == position as i64), "n={n}: {values:?}");
            }
        }
    }

    #[test]
    fn test_linearconv_apply() {
        let mut f = DistributionKind::LinearConv.function("col1");
        assert_eq!(f.apply(0, 99, 50, 0, 10).unwrap(), 5);
        assert_eq!(f.apply(5, 5, 5, 0, 10).unwrap(), 5);
        assert_eq!(f.apply(0, 500, 0, 0, 100).unwrap(), 0);
        assert_eq!(f.apply(0, 500, 250, 0, 100).unwrap(), 50);
        assert_eq!(f.apply(-500, 500, 250, 0, 100).unwrap(), 75);
        assert_eq!(f.apply(0, 500, 250, -50, 50).unwrap(), 0);
        assert_eq!(f.apply(0, 500, 250, 1000, 3000).unwrap(), 2000);
    }

    #[test]
    fn test_random_is_seeded_by_id() {
        let mut a = DistributionKind::Random.function("int:[1-100]");
        let mut b = DistributionKind::Random.function("int:[1-100]");
        let mut c = DistributionKind::Random.function("long:[1-100]");

        let seq_a: Vec<i64> = (0..50).map(|_| a.apply(0, 0, 0, 0, 100).unwrap()).collect();
        let seq_b: Vec<i64> = (0..50).map(|_| b.apply(0, 0, 0, 0, 100).unwrap()).collect();
        let seq_c: Vec<i64> = (0..50).map(|_| c.apply(0, 0, 0, 0, 100).unwrap()).collect();

        assert_eq!(seq_a, seq_b);
        assert_ne!(seq_a, seq_c);
    }

    #[test]
    fn test_random_stays_in_destination() {
        let mut f = DistributionKind::Random.function("col1");
        for _ in 0..100_000 {
            let v = f.apply(0, 0, 0, -50, 50).unwrap();
            assert!((-50..50).contains(&v));
        }
    }

    #[test]
    fn test_check() {
        let err = check(100, 99, 0, 20).unwrap_err();
        assert_eq!(
            err.to_string(),
            "source minimum is greater than source maximum: 100 > 99"
        );

        let err = check(2, 200, 100, 99).unwrap_err();
        assert_eq!(
            err.to_string(),
            "destination minimum is greater than destination maximum: 100 > 99"
        );

        let mut f = DistributionFunction::Ascending;
        assert!(matches!(
            f.apply(5, 1, 3, 0, 10),
            Err(GeneratorError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(
            "incremental".parse::<DistributionKind>().unwrap(),
            DistributionKind::Ascending
        );
        assert_eq!(
            "LinearConv".parse::<DistributionKind>().unwrap(),
            DistributionKind::LinearConv
        );
        assert!(matches!(
            "zipf".parse::<DistributionKind>(),
            Err(GeneratorError::UnknownDistribution(_))
        ));
    }

    #[test]
    fn test_mirror_policies() {
        assert!(!MirrorPolicy::Identity.negates(1));
        assert!(MirrorPolicy::Reverse.negates(0));
        assert!(MirrorPolicy::NegateOdd.negates(3));
        assert!(!MirrorPolicy::NegateOdd.negates(4));
        assert!(MirrorPolicy::NegateEven.negates(0));
        assert!(!MirrorPolicy::NegateEven.negates(1));
        assert!(DistributionKind::Descending.mirror_policy().mirrors_strings());
        assert!(!DistributionKind::Random.mirror_policy().mirrors_strings());
    }

    #[test]
    fn test_hash64_is_stable() {
        assert_eq!(hash64(""), 0xcbf29ce484222325);
        assert_eq!(hash64("a"), 0xaf63dc4c8601ec8c);
        assert_ne!(hash64("int:[1-10]"), hash64("int:[1-11]"));
    }
}
