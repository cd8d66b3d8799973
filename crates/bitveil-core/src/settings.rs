//! # Encoder settings
//!
//! How a payload goes into a carrier: bits per sample byte, whether alpha
//! samples may carry data, and optional password encryption. The settings
//! travel with the payload as a single byte inside the embedded header, so
//! the reader does not have to be told anything beyond the password.

use std::fmt;

use bitveil_crypt::CipherAlgorithm;

use crate::error::BitveilError;
use crate::result::Result;

/// Number of payload bits embedded per carrier byte.
///
/// Higher depths store more but disturb the carrier more visibly; two bits
/// is the compromise the format defaults to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataDepth {
    One,
    #[default]
    Two,
    Four,
    Eight,
}

impl DataDepth {
    pub const fn bits(self) -> u8 {
        match self {
            DataDepth::One => 1,
            DataDepth::Two => 2,
            DataDepth::Four => 4,
            DataDepth::Eight => 8,
        }
    }

    /// Carrier bytes consumed per payload byte.
    pub const fn parts_per_byte(self) -> u32 {
        8 / self.bits() as u32
    }

    /// Mask selecting the carrier bits a payload chunk replaces.
    pub(crate) const fn chunk_mask(self) -> u8 {
        ((1u16 << self.bits()) - 1) as u8
    }

    /// The two bit code stored in the settings byte.
    pub(crate) const fn code(self) -> u8 {
        match self {
            DataDepth::One => 0b00,
            DataDepth::Two => 0b01,
            DataDepth::Four => 0b10,
            DataDepth::Eight => 0b11,
        }
    }

    pub(crate) const fn from_code(code: u8) -> DataDepth {
        match code & 0b11 {
            0b00 => DataDepth::One,
            0b01 => DataDepth::Two,
            0b10 => DataDepth::Four,
            _ => DataDepth::Eight,
        }
    }

    pub fn from_bits(bits: u8) -> Result<DataDepth> {
        match bits {
            1 => Ok(DataDepth::One),
            2 => Ok(DataDepth::Two),
            4 => Ok(DataDepth::Four),
            8 => Ok(DataDepth::Eight),
            other => Err(BitveilError::InvalidDataDepth(other)),
        }
    }
}

/// Everything [`hide`](crate::hide) needs to know besides the payload.
///
/// ```
/// use bitveil_core::{CipherAlgorithm, DataDepth, EncoderSettings};
///
/// let settings = EncoderSettings::default()
///     .with_depth(DataDepth::Four)
///     .with_encryption("secret", CipherAlgorithm::Aes256);
/// ```
#[derive(Clone, Default)]
pub struct EncoderSettings {
    depth: DataDepth,
    encode_in_alpha: bool,
    algorithm: CipherAlgorithm,
    password: Option<Vec<u8>>,
}

impl EncoderSettings {
    pub fn with_depth(mut self, depth: DataDepth) -> EncoderSettings {
        self.depth = depth;
        self
    }

    /// Allow payload data in alpha samples. Off by default because a busy
    /// alpha channel is the easiest tell a carrier image can have.
    pub fn with_alpha_channel(mut self, encode_in_alpha: bool) -> EncoderSettings {
        self.encode_in_alpha = encode_in_alpha;
        self
    }

    pub fn with_encryption(
        mut self,
        password: impl Into<Vec<u8>>,
        algorithm: CipherAlgorithm,
    ) -> EncoderSettings {
        self.password = Some(password.into());
        self.algorithm = algorithm;
        self
    }

    pub fn depth(&self) -> DataDepth {
        self.depth
    }

    pub fn encode_in_alpha(&self) -> bool {
        self.encode_in_alpha
    }

    pub fn algorithm(&self) -> CipherAlgorithm {
        self.algorithm
    }

    pub fn password(&self) -> Option<&[u8]> {
        self.password.as_deref()
    }

    pub fn is_encrypted(&self) -> bool {
        self.password.is_some()
    }

    /// Pack the settings into their wire byte.
    ///
    /// Layout, most significant bits first: two bits data depth code, one bit
    /// alpha flag, one bit encryption flag, two bits cipher code, two bits
    /// reserved as zero. The cipher code is written even when encryption is
    /// off, so the byte survives a decode and re-encode unchanged.
    pub(crate) fn to_byte(&self) -> u8 {
        self.depth.code() << 6
            | u8::from(self.encode_in_alpha) << 5
            | u8::from(self.is_encrypted()) << 4
            | cipher_code(self.algorithm) << 2
    }
}

impl fmt::Debug for EncoderSettings {
    // the password stays out of logs and assertion output
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncoderSettings")
            .field("depth", &self.depth)
            .field("encode_in_alpha", &self.encode_in_alpha)
            .field("algorithm", &self.algorithm)
            .field("encrypted", &self.is_encrypted())
            .finish()
    }
}

/// Settings as recovered from an embedded header byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WireSettings {
    pub depth: DataDepth,
    pub encode_in_alpha: bool,
    pub encrypted: bool,
    pub algorithm: CipherAlgorithm,
}

impl WireSettings {
    /// Unpack a settings byte. The reserved low bits are ignored; the
    /// reserved cipher code is an error only when the encryption flag is
    /// set, otherwise its value never matters and defaults to AES-128.
    pub(crate) fn from_byte(byte: u8) -> Result<WireSettings> {
        let encrypted = byte & 0b0001_0000 != 0;
        let algorithm = match (byte >> 2) & 0b11 {
            0b00 => CipherAlgorithm::Aes128,
            0b01 => CipherAlgorithm::Aes192,
            0b10 => CipherAlgorithm::Aes256,
            _ if encrypted => {
                return Err(BitveilError::MalformedHeader("reserved cipher code"));
            }
            _ => CipherAlgorithm::default(),
        };

        Ok(WireSettings {
            depth: DataDepth::from_code(byte >> 6),
            encode_in_alpha: byte & 0b0010_0000 != 0,
            encrypted,
            algorithm,
        })
    }
}

const fn cipher_code(algorithm: CipherAlgorithm) -> u8 {
    match algorithm {
        CipherAlgorithm::Aes128 => 0b00,
        CipherAlgorithm::Aes192 => 0b01,
        CipherAlgorithm::Aes256 => 0b10,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_expose_the_depth_arithmetic() {
        assert_eq!(DataDepth::One.parts_per_byte(), 8);
        assert_eq!(DataDepth::Two.parts_per_byte(), 4);
        assert_eq!(DataDepth::Four.parts_per_byte(), 2);
        assert_eq!(DataDepth::Eight.parts_per_byte(), 1);

        assert_eq!(DataDepth::One.chunk_mask(), 0b0000_0001);
        assert_eq!(DataDepth::Two.chunk_mask(), 0b0000_0011);
        assert_eq!(DataDepth::Four.chunk_mask(), 0b0000_1111);
        assert_eq!(DataDepth::Eight.chunk_mask(), 0b1111_1111);
    }

    #[test]
    fn should_reject_bit_counts_without_a_depth() {
        assert!(DataDepth::from_bits(2).is_ok());

        for bits in [0, 3, 5, 6, 7, 9, 16] {
            assert!(matches!(
                DataDepth::from_bits(bits),
                Err(BitveilError::InvalidDataDepth(b)) if b == bits
            ));
        }
    }

    #[test]
    fn should_pack_the_default_settings_as_depth_two() {
        assert_eq!(EncoderSettings::default().to_byte(), 0b0100_0000);
    }

    #[test]
    fn should_roundtrip_every_settings_combination() {
        let algorithms = [
            CipherAlgorithm::Aes128,
            CipherAlgorithm::Aes192,
            CipherAlgorithm::Aes256,
        ];
        let depths = [
            DataDepth::One,
            DataDepth::Two,
            DataDepth::Four,
            DataDepth::Eight,
        ];

        for depth in depths {
            for encode_in_alpha in [false, true] {
                for algorithm in algorithms {
                    for encrypted in [false, true] {
                        let mut settings = EncoderSettings::default()
                            .with_depth(depth)
                            .with_alpha_channel(encode_in_alpha);
                        if encrypted {
                            settings = settings.with_encryption("pw", algorithm);
                        }

                        let wire = WireSettings::from_byte(settings.to_byte()).unwrap();

                        assert_eq!(wire.depth, depth);
                        assert_eq!(wire.encode_in_alpha, encode_in_alpha);
                        assert_eq!(wire.encrypted, encrypted);
                        if encrypted {
                            assert_eq!(wire.algorithm, algorithm);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn should_ignore_the_reserved_low_bits() {
        let wire = WireSettings::from_byte(0b0100_0000).unwrap();
        let with_noise = WireSettings::from_byte(0b0100_0011).unwrap();

        assert_eq!(wire, with_noise);
    }

    #[test]
    fn should_reject_the_reserved_cipher_code_only_with_encryption() {
        // encryption bit set, cipher bits 11
        assert!(matches!(
            WireSettings::from_byte(0b0001_1100),
            Err(BitveilError::MalformedHeader(_))
        ));

        // without the encryption bit the cipher code is meaningless
        let wire = WireSettings::from_byte(0b0000_1100).unwrap();
        assert!(!wire.encrypted);
        assert_eq!(wire.algorithm, CipherAlgorithm::Aes128);
    }
}
