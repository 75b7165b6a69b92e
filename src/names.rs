//! File names for the bulk tests and the boundary suite.

/// Characters the boundary names are drawn from, in order.
const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Name of the test file at `index`: the prefix followed by the decimal
/// index.
pub fn file_name(prefix: &str, index: usize) -> String {
    format!("{prefix}{index}")
}

/// The two names that sit on either side of a name length limit.
///
/// Limits count the implicit terminator, so for a limit of 256 `at_limit` is
/// 255 bytes long and `over_limit` is 256.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryNames {
    at_limit: Vec<u8>,
    over_limit: Vec<u8>,
}

impl BoundaryNames {
    /// # Panics
    ///
    /// Panics if `limit` is less than 2; there is no name that fits a
    /// smaller limit.
    pub fn new(limit: usize) -> Self {
        assert!(limit >= 2, "name limit must be at least 2");

        let over_limit: Vec<u8> = ALPHABET.iter().copied().cycle().take(limit).collect();
        let at_limit = over_limit[..limit - 1].to_vec();

        Self {
            at_limit,
            over_limit,
        }
    }

    /// The longest name the limit accepts.
    pub fn at_limit(&self) -> &[u8] {
        &self.at_limit
    }

    /// One byte longer than [`at_limit`](Self::at_limit).
    pub fn over_limit(&self) -> &[u8] {
        &self.over_limit
    }

    /// Length of `name` as a subsystem counts it, terminator included.
    pub fn encoded_len(name: &[u8]) -> usize {
        name.len() + 1
    }
}
