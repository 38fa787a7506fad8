//! services/api/src/adapters/jitter.rs
//!
//! Small random perturbation applied to coordinates before a location
//! check-in is submitted. The random source is seeded once, when the
//! `Jitter` is built, and can be fixed for reproducible runs and tests.

use rand::{rngs::StdRng, Rng, SeedableRng};
use regex::Regex;
use std::sync::{LazyLock, Mutex};

/// Largest offset added to either coordinate, in degrees (about 10 meters).
pub const MAX_OFFSET_DEGREES: f64 = 0.000089;

/// Decimal places of a submitted coordinate.
const COORDINATE_PRECISION: usize = 8;

/// The leading decimal of a coordinate. Anything after it is ignored.
static LEADING_DECIMAL: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\s*[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?").ok());

/// Reads the number a coordinate starts with, so `"113.264385,"` and
/// `"23.129112 N"` keep their value. Returns 0.0 when there is none.
fn leading_decimal(coordinate: &str) -> f64 {
    LEADING_DECIMAL
        .as_ref()
        .and_then(|re| re.find(coordinate))
        .and_then(|m| m.as_str().trim().parse::<f64>().ok())
        .unwrap_or(0.0)
}

pub struct Jitter {
    rng: Mutex<StdRng>,
}

impl Jitter {
    /// Seeds the random source from OS entropy.
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Seeds the random source with a fixed value.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }

    /// Draws one offset, uniform over `[-MAX_OFFSET_DEGREES, MAX_OFFSET_DEGREES]`.
    pub fn offset(&self) -> f64 {
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.gen_range(-MAX_OFFSET_DEGREES..=MAX_OFFSET_DEGREES)
    }

    /// Perturbs a decimal coordinate and formats it for submission.
    ///
    /// Only the leading number is read. Input without one is treated as zero.
    pub fn apply(&self, coordinate: &str) -> String {
        let base = leading_decimal(coordinate);
        format!("{:.*}", COORDINATE_PRECISION, base + self.offset())
    }
}

impl Default for Jitter {
    fn default() -> Self {
        Self::from_entropy()
    }
}
