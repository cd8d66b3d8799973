pub use argon2::Error as Argon2Error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptError {
    /// The key derivation parameters were rejected or the derivation failed
    #[error("Key derivation error")]
    KeyDerivation(Argon2Error),

    /// Input shorter than an IV plus one block, or not block aligned
    #[error("Ciphertext of {0} bytes is truncated or misaligned")]
    MalformedCiphertext(usize),

    /// The decrypted pad count is outside 1..=16, which means the data was
    /// produced under a different password or has been corrupted
    #[error("Invalid padding marker {0}")]
    InvalidPadding(u8),
}
