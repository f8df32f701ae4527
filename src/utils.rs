use crate::bitset::BitSet;

/// Combines a hash seed with one more value.
///
/// ```text
/// seed' = seed ^ (v + K + (seed << 6) + (seed >> 2))
/// ```
///
/// where `K` is the 64-bit golden-ratio constant. Equal inputs in equal
/// order produce equal digests; that is the only guarantee.
pub fn hash_combine(seed: u64, v: u64) -> u64 {
    seed ^ v
        .wrapping_add(0x9e37_79b9_7f4a_7c15)
        .wrapping_add(seed << 6)
        .wrapping_add(seed >> 2)
}

/// Folds a bit set into a hash seed, word by word.
pub fn hash_bits(seed: u64, bits: &BitSet) -> u64 {
    let mut seed = hash_combine(seed, bits.width() as u64);
    for &word in bits.words() {
        seed = hash_combine(seed, word);
    }
    seed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_combine_order_sensitive() {
        let a = hash_combine(hash_combine(0, 1), 2);
        let b = hash_combine(hash_combine(0, 2), 1);
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_combine_deterministic() {
        assert_eq!(hash_combine(17, 42), hash_combine(17, 42));
    }

    #[test]
    fn test_hash_bits_distinguishes_width() {
        let a = BitSet::new(3);
        let b = BitSet::new(4);
        assert_ne!(hash_bits(0, &a), hash_bits(0, &b));
    }

    #[test]
    fn test_hash_bits_equal_sets() {
        let a = BitSet::from_indices(100, &[1, 64, 99]);
        let b = BitSet::from_indices(100, &[1, 64, 99]);
        assert_eq!(hash_bits(7, &a), hash_bits(7, &b));
    }
}
