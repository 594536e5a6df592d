use rand::RngCore;

use crate::HashFamily;

/// Carter-Wegman universal hash over fixed-width byte keys.
///
/// For a key of `key_len` bytes, each of the `iterations` hash functions is
/// backed by a table of `256 * key_len` random 64-bit words. Hashing walks
/// the key bytes left to right, maintaining a running offset
/// `place += byte + 1`, and XORs `table[place - 1]` into the result at every
/// step. This is the scheme from Carter & Wegman, "Universal Classes of Hash
/// Functions" (Proposition 6).
pub struct FixedWidthHash {
    key_len: usize,
    tables: Vec<Vec<u64>>,
}

impl FixedWidthHash {
    /// Builds `iterations` independent hash functions over keys of exactly
    /// `key_len` bytes, seeding every table from OS entropy.
    pub fn new(iterations: usize, key_len: usize) -> Self {
        let columns = 256 * key_len;
        let mut rng = rand::thread_rng();
        let tables = (0..iterations)
            .map(|_| (0..columns).map(|_| rng.next_u64()).collect())
            .collect();
        Self { key_len, tables }
    }

    /// Byte width of keys accepted by this hash family.
    pub fn key_len(&self) -> usize {
        self.key_len
    }
}

impl HashFamily for FixedWidthHash {
    fn iterations(&self) -> usize {
        self.tables.len()
    }

    fn hash(&self, index: usize, key: &[u8]) -> u32 {
        assert_eq!(
            key.len(),
            self.key_len,
            "FixedWidthHash key length mismatch"
        );
        let table = &self.tables[index];
        let mut result: u64 = 0;
        let mut place: usize = 0;
        for &byte in key {
            place += byte as usize + 1;
            result ^= table[place - 1];
        }
        result as u32
    }
}
