use rand::RngCore;

use crate::HashFamily;

/// Thorup string hashing for linear probing (SODA '09, section 5.3),
/// applied to variable-length byte keys up to `max_len` bytes.
///
/// The key is conceptually zero-padded to an even number of 32-bit words;
/// each consecutive pair of words is combined with two random 64-bit
/// constants from the table and XOR-accumulated. The result is the top
/// `hash_bits` bits of the 64-bit accumulator.
pub struct VariableLengthHash {
    max_len: usize,
    hash_bits: u32,
    tables: Vec<Vec<u64>>,
}

impl VariableLengthHash {
    /// Builds `iterations` independent hash functions over keys of at most
    /// `max_len` bytes, returning the top `hash_bits` bits of the internal
    /// 64-bit accumulator. `hash_bits` must be `<= 32` (the wider
    /// requirement of `<= 33` bits from the source algorithm is naturally
    /// satisfied since this returns a `u32`).
    pub fn new(iterations: usize, max_len: usize, hash_bits: u32) -> Self {
        assert!(hash_bits <= 32, "hash width must fit in a u32");
        let words = max_len.div_ceil(4);
        let columns = (words + 1) & !1; // round up to even, Thorup pairs words
        let mut rng = rand::thread_rng();
        let tables = (0..iterations)
            .map(|_| (0..columns).map(|_| rng.next_u64()).collect())
            .collect();
        Self {
            max_len,
            hash_bits,
            tables,
        }
    }

    /// Loads up to 4 bytes starting at `offset` from `key`, zero-padding past
    /// the end, as a little-endian `u32` (mirrors the source's `get32`).
    fn load_word(key: &[u8], offset: usize) -> u32 {
        if offset >= key.len() {
            return 0;
        }
        let end = (offset + 4).min(key.len());
        let mut buf = [0u8; 4];
        buf[..end - offset].copy_from_slice(&key[offset..end]);
        u32::from_le_bytes(buf)
    }
}

impl HashFamily for VariableLengthHash {
    fn iterations(&self) -> usize {
        self.tables.len()
    }

    fn hash(&self, index: usize, key: &[u8]) -> u32 {
        assert!(key.len() <= self.max_len, "key exceeds VariableLengthHash max_len");
        let table = &self.tables[index];
        let mut result: u64 = 0;
        let mut offset = 0usize;
        let mut j = 0usize;
        while offset < key.len() {
            let x1 = Self::load_word(key, offset) as u64;
            let x2 = Self::load_word(key, offset + 4) as u64;
            let (a, b) = (table[j], table[j + 1]);
            result ^= x1.wrapping_add(a).wrapping_mul(x2.wrapping_add(b));
            offset += 8;
            j += 2;
        }
        (result >> (64 - self.hash_bits)) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_key_hashes_to_zero() {
        let h = VariableLengthHash::new(2, 256, 32);
        assert_eq!(h.hash(0, b""), 0);
    }

    #[test]
    fn distinct_names_usually_differ() {
        let h = VariableLengthHash::new(1, 256, 32);
        let a = h.hash(0, b"example.co.uk.");
        let b = h.hash(0, b"example.com.");
        assert_ne!(a, b);
    }

    #[test]
    fn handles_key_at_max_len() {
        let h = VariableLengthHash::new(1, 8, 32);
        let _ = h.hash(0, &[7u8; 8]);
    }
}
