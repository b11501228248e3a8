//! Request-scoped deterministic RNG.
//!
//! A master seed — supplied by the caller or drawn from process entropy —
//! is expanded into independent per-stage sub-seeds via BLAKE3 hashing.
//! The return-generation stage and the OHLC wick stage each get their own
//! `StdRng` stream, so neither stage's draw count can perturb the other.
//! Same master seed ⇒ bit-identical streams across runs and threads.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Pipeline stage asking for a random stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Returns,
    Ohlc,
}

impl Stage {
    fn label(self) -> &'static str {
        match self {
            Stage::Returns => "returns",
            Stage::Ohlc => "ohlc",
        }
    }
}

/// Per-request RNG source. Cheap to construct, one per simulation call.
#[derive(Debug, Clone)]
pub struct SimulationRng {
    master_seed: u64,
}

impl SimulationRng {
    pub fn from_seed(master_seed: u64) -> Self {
        Self { master_seed }
    }

    /// Fresh unpredictable master seed. Each request gets its own source, so
    /// concurrent unseeded simulations never share a stream.
    pub fn from_entropy() -> Self {
        Self { master_seed: rand::random() }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Derive the deterministic sub-seed for a stage.
    fn stage_seed(&self, stage: Stage) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.master_seed.to_le_bytes());
        hasher.update(stage.label().as_bytes());
        let hash = hasher.finalize();
        u64::from_le_bytes(hash.as_bytes()[..8].try_into().unwrap())
    }

    /// A seeded `StdRng` for the given stage.
    pub fn stage_rng(&self, stage: Stage) -> StdRng {
        StdRng::seed_from_u64(self.stage_seed(stage))
    }
}
