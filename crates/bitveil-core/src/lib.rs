//! # Bitveil
//!
//! Bitveil hides arbitrary payloads in the least significant bits of PNG
//! images. Payload bits are scattered over the whole carrier in an order
//! seeded by the image itself, so the stego image carries everything a
//! reader needs besides the optional password.
//!
//! The format in one paragraph: the sample byte at offset 0 seeds a
//! permutation of all remaining byte offsets. Along that order goes a six
//! byte header, one bit per sample byte and never in alpha samples, then the
//! payload at one, two, four or eight bits per byte. With encryption enabled
//! the payload is an Argon2i keyed AES-CBC ciphertext instead of the plain
//! bytes.
//!
//! ## Hiding and unveiling
//!
//! ```rust
//! use bitveil_core::{hide, unveil, EncoderSettings, PixelBuffer, PixelFormat};
//!
//! let mut carrier = PixelBuffer::new(64, 64, PixelFormat::RGBA8)?;
//!
//! hide(&mut carrier, b"meet at dawn", &EncoderSettings::default())?;
//!
//! let payload = unveil(&carrier, None)?;
//! assert_eq!(payload, b"meet at dawn");
//! # Ok::<(), bitveil_core::BitveilError>(())
//! ```
//!
//! ## With encryption
//!
//! ```rust
//! use bitveil_core::{
//!     hide, unveil, CipherAlgorithm, DataDepth, EncoderSettings, PixelBuffer, PixelFormat,
//! };
//!
//! let mut carrier = PixelBuffer::new(64, 64, PixelFormat::RGB8)?;
//! let settings = EncoderSettings::default()
//!     .with_depth(DataDepth::Four)
//!     .with_encryption("quartz-23", CipherAlgorithm::Aes256);
//!
//! hide(&mut carrier, b"the vault code is 7741", &settings)?;
//!
//! let payload = unveil(&carrier, Some(b"quartz-23"))?;
//! assert_eq!(payload, b"the vault code is 7741");
//! # Ok::<(), bitveil_core::BitveilError>(())
//! ```
//!
//! Reading needs no settings: depth, alpha use and cipher travel in the
//! embedded header. [`open_carrier`] and [`save_carrier`] connect buffers to
//! files on disk; [`available_bytes`] and [`can_hide`] size payloads before
//! committing to a carrier.

pub mod buffer;
pub mod carrier;
pub mod color;
pub mod engine;
pub mod error;
mod header;
pub mod instrument;
pub mod permutation;
pub mod result;
pub mod settings;

pub use crate::buffer::{ColorLayout, PixelBuffer, PixelFormat};
pub use crate::carrier::{from_dynamic, open_carrier, save_carrier, to_dynamic};
pub use crate::color::{GrayColor, RgbColor};
pub use crate::engine::{available_bytes, can_hide, hide, hide_observed, unveil, unveil_observed};
pub use crate::error::BitveilError;
pub use crate::instrument::{Stage, StageObserver, StageTimings};
pub use crate::permutation::IndexPermutation;
pub use crate::result::Result;
pub use crate::settings::{DataDepth, EncoderSettings};

pub use bitveil_crypt::CipherAlgorithm;
