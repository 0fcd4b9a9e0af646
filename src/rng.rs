use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

/// Seed phrase used for the reference evaluations
pub const REFERENCE_SEED_PHRASE: &str = "yugioh";

/// Derive a numeric seed from a text phrase (first 8 bytes of its SHA-256)
pub fn seed_from_phrase(phrase: &str) -> u64 {
    let digest = Sha256::digest(phrase.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

/// Parse a seed argument: plain integers are used as-is, anything else is hashed
pub fn parse_seed(arg: &str) -> u64 {
    arg.trim()
        .parse()
        .unwrap_or_else(|_| seed_from_phrase(arg))
}

/// Seeded random number generator for reproducible simulations
#[derive(Clone, Debug)]
pub struct GameRng {
    rng: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    /// Create a new GameRng with an optional seed
    /// If seed is None, generates a random seed
    pub fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| {
            use rand::thread_rng;
            thread_rng().gen()
        });

        let rng = ChaCha8Rng::seed_from_u64(seed);
        GameRng { rng, seed }
    }

    /// Create a GameRng seeded from a text phrase
    pub fn from_phrase(phrase: &str) -> Self {
        Self::new(Some(seed_from_phrase(phrase)))
    }

    /// Get the seed used for this RNG
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Restart the sequence from a new seed
    pub fn reseed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self.seed = seed;
    }

    /// Generate a random number in range [0, 1)
    pub fn random(&mut self) -> f64 {
        self.rng.gen()
    }

    /// Generate a random integer in range [0, max)
    pub fn random_range(&mut self, max: usize) -> usize {
        self.rng.gen_range(0..max)
    }

    /// Generate a random integer in range [0, max) for large combinatorial counts
    pub fn random_below(&mut self, max: u128) -> u128 {
        self.rng.gen_range(0..max)
    }

    /// Fisher-Yates shuffle for a mutable slice
    pub fn shuffle<T>(&mut self, array: &mut [T]) {
        for i in (1..array.len()).rev() {
            let j = self.random_range(i + 1);
            array.swap(i, j);
        }
    }
}
