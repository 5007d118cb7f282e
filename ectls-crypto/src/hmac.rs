//! HMAC (Hash-based Message Authentication Code) interface.

use crate::HashAlgorithm;

/// Keyed HMAC instance.
///
/// The key is bound when the provider creates the instance; `reset`
/// clears the absorbed data but keeps the key.
///
/// # Example
///
/// ```rust,ignore
/// use ectls_crypto::Hmac;
///
/// fn hmac_example(hmac: &mut dyn Hmac) -> Vec<u8> {
///     hmac.update(b"message");
///     hmac.finalize_reset()
/// }
/// ```
pub trait Hmac: Send {
    /// Update the HMAC state with more data.
    fn update(&mut self, data: &[u8]);

    /// Finalize the HMAC and return the authentication tag.
    ///
    /// This consumes the HMAC state.
    fn finalize(self: Box<Self>) -> Vec<u8>;

    /// Return the tag and reset to the keyed, empty state.
    fn finalize_reset(&mut self) -> Vec<u8>;

    /// Verify an HMAC tag in constant time.
    ///
    /// # Returns
    ///
    /// `true` if the tag matches, `false` otherwise.
    fn verify(self: Box<Self>, tag: &[u8]) -> bool {
        use subtle::ConstantTimeEq;
        let computed = self.finalize();
        computed.ct_eq(tag).into()
    }

    /// Get the output size in bytes for this HMAC.
    fn output_size(&self) -> usize {
        self.algorithm().output_size()
    }

    /// Get the hash algorithm used by this HMAC.
    fn algorithm(&self) -> HashAlgorithm;

    /// Discard absorbed data, keeping the key.
    fn reset(&mut self);
}
