//! Cryptographically Secure Random Number Generator (CSPRNG) interface.

use crate::Result;

/// Random number generator trait.
///
/// Used for hello randoms, ephemeral keys and CBC explicit IVs. Must be
/// seeded from the OS entropy source and safe to share between threads.
///
/// # Example
///
/// ```rust,no_run
/// use ectls_crypto::Random;
///
/// fn client_random(rng: &dyn Random) -> ectls_crypto::Result<[u8; 32]> {
///     let mut random = [0u8; 32];
///     rng.fill(&mut random)?;
///     Ok(random)
/// }
/// ```
pub trait Random: Send + Sync {
    /// Fill a buffer with random bytes.
    ///
    /// # Errors
    ///
    /// Returns error if random generation fails (e.g., OS RNG unavailable).
    fn fill(&self, dest: &mut [u8]) -> Result<()>;

    /// Generate a random byte vector of specified length.
    fn generate(&self, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.fill(&mut buf)?;
        Ok(buf)
    }
}
