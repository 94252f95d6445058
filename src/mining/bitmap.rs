//! Packed item-membership bitmaps.
//!
//! Each frequent item owns one bit; a transaction becomes a row of `u64`
//! words. Pair support counting then reduces to `(row & mask) == mask`
//! over at most two words instead of a set intersection.

/// Bitmap of frequent items present in one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionBitmap {
    words: Vec<u64>,
}

impl TransactionBitmap {
    /// Empty bitmap able to hold `n_items` bits.
    #[must_use]
    pub fn new(n_items: usize) -> Self {
        Self {
            words: vec![0; n_items.div_ceil(64)],
        }
    }

    /// Set bit `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is beyond the capacity given to [`Self::new`].
    #[inline]
    pub fn set(&mut self, index: usize) {
        self.words[index / 64] |= 1u64 << (index % 64);
    }

    /// Whether bit `index` is set. Out-of-range bits read as unset.
    #[inline]
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.words
            .get(index / 64)
            .is_some_and(|word| word & (1u64 << (index % 64)) != 0)
    }

    /// Whether every bit in `mask` is also set here.
    #[inline]
    #[must_use]
    pub fn contains_mask(&self, mask: &PairMask) -> bool {
        mask.parts().all(|(word, bits)| {
            self.words
                .get(word)
                .is_some_and(|row| row & bits == bits)
        })
    }

    /// True when no bit is set.
    #[inline]
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Number of set bits.
    #[must_use]
    pub fn count_ones(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }
}

/// Combined mask `(1 << i) | (1 << j)` for a pair of item indices.
///
/// Stored as at most two `(word, bits)` parts so pairs that straddle a
/// word boundary still test in two AND+compare steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairMask {
    first: (usize, u64),
    second: Option<(usize, u64)>,
}

impl PairMask {
    /// Mask with bits `i` and `j` set.
    #[must_use]
    pub fn new(i: usize, j: usize) -> Self {
        let (wi, bi) = (i / 64, 1u64 << (i % 64));
        let (wj, bj) = (j / 64, 1u64 << (j % 64));
        if wi == wj {
            Self {
                first: (wi, bi | bj),
                second: None,
            }
        } else {
            Self {
                first: (wi, bi),
                second: Some((wj, bj)),
            }
        }
    }

    fn parts(&self) -> impl Iterator<Item = (usize, u64)> {
        std::iter::once(self.first).chain(self.second)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zero() {
        let bitmap = TransactionBitmap::new(130);
        assert!(bitmap.is_zero());
        assert_eq!(bitmap.count_ones(), 0);
    }

    #[test]
    fn test_set_and_contains() {
        let mut bitmap = TransactionBitmap::new(130);
        bitmap.set(0);
        bitmap.set(63);
        bitmap.set(64);
        bitmap.set(129);
        assert!(bitmap.contains(0));
        assert!(bitmap.contains(63));
        assert!(bitmap.contains(64));
        assert!(bitmap.contains(129));
        assert!(!bitmap.contains(1));
        assert!(!bitmap.contains(500));
        assert_eq!(bitmap.count_ones(), 4);
        assert!(!bitmap.is_zero());
    }

    #[test]
    fn test_pair_mask_same_word() {
        let mut bitmap = TransactionBitmap::new(10);
        bitmap.set(2);
        bitmap.set(5);
        assert!(bitmap.contains_mask(&PairMask::new(2, 5)));
        assert!(!bitmap.contains_mask(&PairMask::new(2, 6)));
    }

    #[test]
    fn test_pair_mask_across_words() {
        let mut bitmap = TransactionBitmap::new(200);
        bitmap.set(3);
        bitmap.set(150);
        assert!(bitmap.contains_mask(&PairMask::new(3, 150)));
        assert!(!bitmap.contains_mask(&PairMask::new(3, 151)));
        assert!(!bitmap.contains_mask(&PairMask::new(4, 150)));
    }

    #[test]
    fn test_pair_mask_beyond_capacity() {
        let mut bitmap = TransactionBitmap::new(8);
        bitmap.set(1);
        assert!(!bitmap.contains_mask(&PairMask::new(1, 300)));
    }

    #[test]
    fn test_empty_capacity() {
        let bitmap = TransactionBitmap::new(0);
        assert!(bitmap.is_zero());
        assert!(!bitmap.contains(0));
    }
}
