//! Deterministic file contents.

/// Generates the content of each test file from its index alone.
///
/// Byte `j` of file `i` is `((i + j) mod modulus) + base`. Because the
/// content is a pure function of the index, the round-trip check recomputes
/// the expected bytes instead of keeping a copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pattern {
    modulus: u8,
    base: u8,
}

impl Default for Pattern {
    /// Bytes `'0'..='~'`.
    fn default() -> Self {
        Self {
            modulus: 79,
            base: 48,
        }
    }
}

impl Pattern {
    /// # Panics
    ///
    /// Panics unless every generated byte is printable ASCII.
    pub fn new(modulus: u8, base: u8) -> Self {
        assert!(modulus > 0, "pattern modulus must be positive");
        let top = base as u16 + modulus as u16 - 1;
        assert!(
            base >= 0x20 && top <= 0x7e,
            "pattern bytes must be printable ASCII"
        );
        Self { modulus, base }
    }

    /// Byte `offset` of the content of file `index`.
    pub fn byte(&self, index: usize, offset: usize) -> u8 {
        let m = self.modulus as usize;
        // Reduce first so huge indices cannot overflow the sum.
        ((index % m + offset % m) % m) as u8 + self.base
    }

    /// Content of file `index`, `len` bytes long.
    pub fn fill(&self, index: usize, len: usize) -> Vec<u8> {
        (0..len).map(|offset| self.byte(index, offset)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::Pattern;

    #[test]
    fn default_pattern() {
        let pattern = Pattern::default();
        assert_eq!(&pattern.fill(0, 3), b"012");
        assert_eq!(pattern.byte(1, 0), b'1');
        // wraps after 79 bytes
        assert_eq!(pattern.byte(0, 78), b'~');
        assert_eq!(pattern.byte(0, 79), b'0');
    }

    #[test]
    fn neighbours_differ() {
        let pattern = Pattern::default();
        assert_ne!(pattern.fill(0, 256), pattern.fill(1, 256));
    }

    #[test]
    #[should_panic]
    fn unprintable_pattern() {
        Pattern::new(100, 48);
    }

    #[test]
    #[should_panic]
    fn zero_modulus() {
        Pattern::new(0, 48);
    }
}
