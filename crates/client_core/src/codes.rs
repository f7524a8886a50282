use rand::Rng;
use serde::{Deserialize, Serialize};

/// Alphabets for participant-facing codes. The alphanumeric set leaves out
/// characters that are easy to misread (`0 1 l o I O`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeMode {
    #[default]
    Numeric,
    Alphanumeric,
    Consonants,
}

impl CodeMode {
    pub fn symbols(self) -> &'static [u8] {
        match self {
            Self::Numeric => b"0123456789",
            Self::Alphanumeric => b"23456789abcdefghijkmnpqrstuvwxyzABCDEFGHJKLMNPQRSTUVWXYZ",
            Self::Consonants => b"bcdfghjkmnpqrstvwxz",
        }
    }
}

/// Uniform integer in `min..=max`. Returns `min` when the range is empty.
pub fn random_integer(min: i64, max: i64) -> i64 {
    if max <= min {
        return min;
    }
    rand::thread_rng().gen_range(min..=max)
}

/// External ids for participants, e.g. `generate_nonambiguous_code(6, CodeMode::Numeric)`.
pub fn generate_nonambiguous_code(length: usize, mode: CodeMode) -> String {
    let symbols = mode.symbols();
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| symbols[rng.gen_range(0..symbols.len())] as char)
        .collect()
}
