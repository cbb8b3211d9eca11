// Component-presence bit sets used to key archetypes.

use std::fmt;

const WORD_BITS: usize = 64;

/// Set of component kinds carried by an entity or archetype.
///
/// Bit `i` is set when component kind `i` (as numbered by the
/// [`ComponentRegistry`](super::components::ComponentRegistry)) is present.
///
/// The word vector is kept canonical: it never ends in a zero word. That makes
/// the derived `Eq` and `Hash` structural, so two independently built
/// signatures with the same bits land on the same map entry.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Signature {
    words: Vec<u64>,
}

impl Signature {
    /// Empty signature (matches nothing in a `with` filter, excludes nothing in a `without`).
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Signature::set`].
    pub fn with(mut self, bit: usize) -> Self {
        self.set(bit);
        self
    }

    pub fn set(&mut self, bit: usize) {
        let word = bit / WORD_BITS;
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1u64 << (bit % WORD_BITS);
    }

    pub fn contains(&self, bit: usize) -> bool {
        self.words
            .get(bit / WORD_BITS)
            .is_some_and(|w| w & (1u64 << (bit % WORD_BITS)) != 0)
    }

    /// Returns true if every bit set in `other` is also set here.
    pub fn contains_all(&self, other: &Signature) -> bool {
        other.words.iter().enumerate().all(|(i, &need)| {
            let have = self.words.get(i).copied().unwrap_or(0);
            have & need == need
        })
    }

    /// Returns true if no bit is set in both signatures.
    pub fn is_disjoint(&self, other: &Signature) -> bool {
        self.words
            .iter()
            .zip(other.words.iter())
            .all(|(a, b)| a & b == 0)
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn highest_bit(&self) -> Option<usize> {
        let last = self.words.len().checked_sub(1)?;
        let word = self.words[last];
        Some(last * WORD_BITS + (WORD_BITS - 1 - word.leading_zeros() as usize))
    }

    /// Set bit positions in ascending order.
    pub fn iter_bits(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(i, &word)| {
            (0..WORD_BITS)
                .filter(move |b| word & (1u64 << b) != 0)
                .map(move |b| i * WORD_BITS + b)
        })
    }
}

impl FromIterator<usize> for Signature {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut signature = Signature::new();
        for bit in iter {
            signature.set(bit);
        }
        signature
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter_bits()).finish()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(highest) = self.highest_bit() else {
            return f.write_str("0");
        };
        for bit in (0..=highest).rev() {
            f.write_str(if self.contains(bit) { "1" } else { "0" })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn when_built_in_different_orders_then_signatures_are_equal() {
        let a: Signature = [0, 3, 70].into_iter().collect();
        let b = Signature::new().with(70).with(0).with(3);

        assert_eq!(a, b);

        let mut map = HashMap::new();
        map.insert(a, "first");
        assert_eq!(map.get(&b), Some(&"first"));
    }

    #[test]
    fn when_bit_is_past_the_first_word_then_it_round_trips() {
        let sig = Signature::new().with(130);

        assert!(sig.contains(130));
        assert!(!sig.contains(2));
        assert_eq!(sig.highest_bit(), Some(130));
        assert_eq!(sig.iter_bits().collect::<Vec<_>>(), vec![130]);
    }

    #[test]
    fn when_other_is_subset_then_contains_all_is_true() {
        let sig: Signature = [0, 1, 2, 4].into_iter().collect();

        assert!(sig.contains_all(&Signature::new()));
        assert!(sig.contains_all(&[1, 4].into_iter().collect()));
        assert!(!sig.contains_all(&[1, 3].into_iter().collect()));
        assert!(!sig.contains_all(&Signature::new().with(100)));
    }

    #[test]
    fn when_no_shared_bits_then_signatures_are_disjoint() {
        let sig: Signature = [0, 1].into_iter().collect();

        assert!(sig.is_disjoint(&Signature::new()));
        assert!(sig.is_disjoint(&[2, 65].into_iter().collect()));
        assert!(!sig.is_disjoint(&[1, 65].into_iter().collect()));
    }

    #[test]
    fn when_empty_then_display_is_zero_and_no_highest_bit() {
        let sig = Signature::new();

        assert!(sig.is_empty());
        assert_eq!(sig.highest_bit(), None);
        assert_eq!(sig.to_string(), "0");
        assert_eq!(Signature::new().with(0).with(2).to_string(), "101");
    }
}
