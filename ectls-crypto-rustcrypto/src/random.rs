//! Cryptographically secure random number generation using the OS RNG.

use ectls_crypto::{Error, Random, Result};
use rand::rngs::OsRng;
use rand::RngCore;

/// Random number generator backed by `rand::rngs::OsRng`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl Random for OsRandom {
    fn fill(&self, dest: &mut [u8]) -> Result<()> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|_| Error::RandomGenerationFailed)
    }
}
