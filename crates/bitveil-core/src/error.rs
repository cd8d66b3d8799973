use thiserror::Error;

use bitveil_crypt::CryptError;

#[derive(Error, Debug)]
pub enum BitveilError {
    /// Pixel buffers carry 8 or 16 bits per channel, nothing else
    #[error("Unsupported bit depth: {0}")]
    InvalidBitDepth(u8),

    /// A data depth outside 1, 2, 4 or 8 bits per carrier byte
    #[error("Unsupported data depth: {0}")]
    InvalidDataDepth(u8),

    /// The raw byte slice does not match width, height and layout
    #[error("Buffer of {actual} bytes does not hold {expected} samples")]
    BufferSizeMismatch { expected: u64, actual: usize },

    /// Buffers are indexed with 32 bit offsets; this one has more bytes than that
    #[error("Buffer of {0} bytes exceeds the addressable size")]
    OversizedBuffer(u64),

    /// A color accessor was used on a buffer with a different layout
    #[error("Expected a {expected} buffer, got {actual}")]
    LayoutMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// The payload does not fit into the carrier at the chosen settings
    #[error("Payload needs {required} carrier parts, buffer offers {available}")]
    CapacityExceeded { required: u64, available: u64 },

    /// The embedded header is inconsistent; most likely there is no payload
    #[error("Malformed header: {0}")]
    MalformedHeader(&'static str),

    /// The buffer holds an encrypted payload and no password was supplied
    #[error("The payload is encrypted, a password is required")]
    MissingPassword,

    /// Encrypting the payload failed
    #[error("Encryption error")]
    Encryption(CryptError),

    /// Decrypting the payload failed; usually a wrong password
    #[error("Decryption error")]
    Decryption(CryptError),

    /// The image decodes to a color type the engine cannot carry data in
    #[error("Unsupported color type: {0:?}")]
    UnsupportedColorType(image::ColorType),

    /// Reading or writing the carrier image failed
    #[error("Image error")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
