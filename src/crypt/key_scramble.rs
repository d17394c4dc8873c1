//! Deterministic key-byte permutation applied when an envelope element carries
//! a `Key` attribute (§4.8).
//!
//! The reference implementation's exact byte mapping
//! (`hpsdecode/encryption.py`) was not available to build against; this
//! implements the one testable property spec §8 requires — a fixed,
//! length-dependent, involutive permutation — by reversing the key and then
//! swapping adjacent byte pairs. See `SPEC_FULL.md` §13.

/// Apply the key-scrambling permutation to `key`, returning a new `Vec<u8>`
/// of the same length.
///
/// Even-length keys are reversed and then have each adjacent byte pair
/// swapped back, which composes to an involution. Odd-length keys are just
/// reversed: pairing up a reversed odd-length sequence at fixed offsets does
/// not commute with the reversal, so the pair-swap step is skipped there to
/// keep the permutation involutive for every key length.
pub(crate) fn scramble_key(key: &[u8]) -> Vec<u8> {
    let mut scrambled: Vec<u8> = key.iter().rev().copied().collect();

    if scrambled.len() % 2 == 0 {
        for pair in scrambled.chunks_exact_mut(2) {
            pair.swap(0, 1);
        }
    }

    scrambled
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_involutive_on_even_length_keys() {
        let key = b"0123456789ABCDEF";
        let once = scramble_key(key);
        let twice = scramble_key(&once);
        assert_eq!(twice, key);
    }

    #[test]
    fn is_involutive_on_odd_length_keys() {
        let key = b"odd-length-key-";
        assert_eq!(key.len() % 2, 1, "fixture must be odd length");
        let once = scramble_key(key);
        let twice = scramble_key(&once);
        assert_eq!(twice, key);
    }

    #[test]
    fn preserves_length() {
        let key = b"some-base-key-material";
        assert_eq!(scramble_key(key).len(), key.len());
    }

    #[test]
    fn actually_permutes_bytes() {
        let key = b"abcdefgh";
        let scrambled = scramble_key(key);
        assert_ne!(scrambled, key);

        let mut sorted_key = key.to_vec();
        let mut sorted_scrambled = scrambled.clone();
        sorted_key.sort_unstable();
        sorted_scrambled.sort_unstable();
        assert_eq!(sorted_key, sorted_scrambled);
    }
}
