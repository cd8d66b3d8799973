//! # Payload encryption
//!
//! Password based AES-CBC encryption for the bitveil carrier format. Keys are
//! derived with Argon2i, the IV travels in front of the ciphertext, and the
//! padding is a byte count in the PKCS#7 style (always 1..=16 bytes, a full
//! block when the payload is already aligned).
//!
//! Salt and IV come from a generator seeded with [`DERIVATION_SEED`], so a
//! reader can re-derive them from the password alone. That makes
//! [`encrypt_data`] fully deterministic: equal password, payload and algorithm
//! always produce byte identical output. The determinism is a real weakness,
//! not just a quirk: there is no per message nonce, so equal inputs are
//! linkable across carriers and the usual CBC IV guarantees do not hold.
//! It is kept because existing carriers depend on it.

use aes::cipher::block_padding::NoPadding;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use argon2::{Argon2, ParamsBuilder};
use fastrand::Rng;
use zeroize::Zeroizing;

pub mod error;

pub use crate::error::CryptError;

/// AES block length in bytes, independent of the key length.
pub const BLOCK_LEN: usize = 16;

/// Length of the IV prepended to every ciphertext.
pub const IV_LEN: usize = BLOCK_LEN;

/// Seed for the salt and IV generator.
///
/// The constant seed is wire behavior, not an accident: readers re-derive the
/// salt and key from the password alone, without any out-of-band data.
/// Changing this value invalidates every existing carrier image.
const DERIVATION_SEED: u64 = 0;

const KDF_TIME_COST: u32 = 2;
const KDF_MEMORY_KIB: u32 = 256;
const KDF_LANES: u32 = 1;

pub type Result<T> = std::result::Result<T, CryptError>;

/// The ciphers a payload can be encrypted with.
///
/// All three share the 16 byte AES block; they differ only in key length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CipherAlgorithm {
    #[default]
    Aes128,
    Aes192,
    Aes256,
}

impl CipherAlgorithm {
    /// Key length in bytes.
    pub const fn key_len(self) -> usize {
        match self {
            CipherAlgorithm::Aes128 => 16,
            CipherAlgorithm::Aes192 => 24,
            CipherAlgorithm::Aes256 => 32,
        }
    }
}

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes192CbcEnc = cbc::Encryptor<aes::Aes192>;
type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;
type Aes192CbcDec = cbc::Decryptor<aes::Aes192>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Encrypt `data` with `password`; Argon2i key derivation and AES-CBC.
///
/// Returns the IV followed by the ciphertext. The output length is always
/// `IV_LEN + data.len() + pad` where `pad` is 1..=16.
pub fn encrypt_data(password: &[u8], data: &[u8], algorithm: CipherAlgorithm) -> Result<Vec<u8>> {
    let mut rng = Rng::with_seed(DERIVATION_SEED);
    let salt = derivation_salt(&mut rng, algorithm.key_len());
    let iv = derivation_iv(&mut rng);
    let key = derive_key(password, &salt, algorithm.key_len())?;

    let padded = pad_blocks(data);
    let ciphertext = match algorithm {
        CipherAlgorithm::Aes128 => Aes128CbcEnc::new_from_slices(&key, &iv)
            .expect("derived key and IV lengths match the cipher")
            .encrypt_padded_vec_mut::<NoPadding>(&padded),
        CipherAlgorithm::Aes192 => Aes192CbcEnc::new_from_slices(&key, &iv)
            .expect("derived key and IV lengths match the cipher")
            .encrypt_padded_vec_mut::<NoPadding>(&padded),
        CipherAlgorithm::Aes256 => Aes256CbcEnc::new_from_slices(&key, &iv)
            .expect("derived key and IV lengths match the cipher")
            .encrypt_padded_vec_mut::<NoPadding>(&padded),
    };

    let mut output = Vec::with_capacity(IV_LEN + ciphertext.len());
    output.extend_from_slice(&iv);
    output.extend_from_slice(&ciphertext);
    Ok(output)
}

/// Decrypt data produced by [`encrypt_data`] under the same password.
///
/// The salt and key are re-derived from the password; the IV is read from the
/// first [`IV_LEN`] bytes. A pad count outside 1..=16 after decryption fails
/// with [`CryptError::InvalidPadding`], which is the closest thing this format
/// has to a wrong password signal.
pub fn decrypt_data(password: &[u8], data: &[u8], algorithm: CipherAlgorithm) -> Result<Vec<u8>> {
    if data.len() < IV_LEN + BLOCK_LEN || data.len() % BLOCK_LEN != 0 {
        return Err(CryptError::MalformedCiphertext(data.len()));
    }

    let mut rng = Rng::with_seed(DERIVATION_SEED);
    let salt = derivation_salt(&mut rng, algorithm.key_len());
    let key = derive_key(password, &salt, algorithm.key_len())?;

    let (iv, ciphertext) = data.split_at(IV_LEN);
    let padded = match algorithm {
        CipherAlgorithm::Aes128 => Aes128CbcDec::new_from_slices(&key, iv)
            .expect("derived key and IV lengths match the cipher")
            .decrypt_padded_vec_mut::<NoPadding>(ciphertext),
        CipherAlgorithm::Aes192 => Aes192CbcDec::new_from_slices(&key, iv)
            .expect("derived key and IV lengths match the cipher")
            .decrypt_padded_vec_mut::<NoPadding>(ciphertext),
        CipherAlgorithm::Aes256 => Aes256CbcDec::new_from_slices(&key, iv)
            .expect("derived key and IV lengths match the cipher")
            .decrypt_padded_vec_mut::<NoPadding>(ciphertext),
    }
    .map_err(|_| CryptError::MalformedCiphertext(data.len()))?;

    strip_blocks(padded)
}

/// One byte per draw, low 8 bits, so the stream does not depend on how the
/// generator would split narrower integers.
fn derivation_salt(rng: &mut Rng, len: usize) -> Vec<u8> {
    (0..len).map(|_| (rng.u64(..) & 0xFF) as u8).collect()
}

/// Two 64 bit draws; each contributes 8 bytes in the fixed bit offset order
/// 56, 40, 32, 48, 24, 16, 8, 0.
fn derivation_iv(rng: &mut Rng) -> [u8; IV_LEN] {
    let mut iv = [0u8; IV_LEN];
    for half in iv.chunks_exact_mut(8) {
        let draw = rng.u64(..);
        for (byte, shift) in half.iter_mut().zip([56, 40, 32, 48, 24, 16, 8, 0]) {
            *byte = (draw >> shift) as u8;
        }
    }
    iv
}

fn derive_key(password: &[u8], salt: &[u8], len: usize) -> Result<Zeroizing<Vec<u8>>> {
    let params = ParamsBuilder::new()
        .t_cost(KDF_TIME_COST)
        .m_cost(KDF_MEMORY_KIB)
        .p_cost(KDF_LANES)
        .output_len(len)
        .build()
        .map_err(CryptError::KeyDerivation)?;
    let argon = Argon2::new(argon2::Algorithm::Argon2i, argon2::Version::V0x13, params);

    let mut key = Zeroizing::new(vec![0u8; len]);
    argon
        .hash_password_into(password, salt, &mut key)
        .map_err(CryptError::KeyDerivation)?;
    Ok(key)
}

/// Append `n` bytes of value `n` where `n = 16 - len % 16`; a full extra
/// block when the input is already aligned.
fn pad_blocks(data: &[u8]) -> Vec<u8> {
    let pad = BLOCK_LEN - data.len() % BLOCK_LEN;
    let mut padded = Vec::with_capacity(data.len() + pad);
    padded.extend_from_slice(data);
    padded.resize(data.len() + pad, pad as u8);
    padded
}

/// Strip the pad count written by [`pad_blocks`], validating it first.
fn strip_blocks(mut data: Vec<u8>) -> Result<Vec<u8>> {
    let pad = *data.last().ok_or(CryptError::InvalidPadding(0))?;
    if pad == 0 || usize::from(pad) > BLOCK_LEN || usize::from(pad) > data.len() {
        return Err(CryptError::InvalidPadding(pad));
    }
    data.truncate(data.len() - usize::from(pad));
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALGORITHMS: [CipherAlgorithm; 3] = [
        CipherAlgorithm::Aes128,
        CipherAlgorithm::Aes192,
        CipherAlgorithm::Aes256,
    ];

    #[test]
    fn should_roundtrip_with_every_algorithm() {
        let data = b"lorem ipsum dolor sit amet, consectetur adipiscing elit";
        for algorithm in ALGORITHMS {
            let cipher_data = encrypt_data(b"resistance is futile", data, algorithm).unwrap();
            let decipher_data =
                decrypt_data(b"resistance is futile", &cipher_data, algorithm).unwrap();

            assert_eq!(data.as_slice(), decipher_data, "{algorithm:?}");
        }
    }

    #[test]
    fn should_produce_identical_output_for_identical_input() {
        let first = encrypt_data(b"pass", b"payload", CipherAlgorithm::Aes128).unwrap();
        let second = encrypt_data(b"pass", b"payload", CipherAlgorithm::Aes128).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn should_prepend_the_iv_and_pad_to_whole_blocks() {
        // 21 bytes pad to 32, plus the IV in front
        let cipher_data = encrypt_data(b"pass", &[7u8; 21], CipherAlgorithm::Aes256).unwrap();
        assert_eq!(cipher_data.len(), IV_LEN + 32);

        // aligned input grows by a full padding block
        let cipher_data = encrypt_data(b"pass", &[7u8; 16], CipherAlgorithm::Aes256).unwrap();
        assert_eq!(cipher_data.len(), IV_LEN + 32);
    }

    #[test]
    fn should_roundtrip_the_empty_payload() {
        let cipher_data = encrypt_data(b"pass", b"", CipherAlgorithm::Aes128).unwrap();
        assert_eq!(cipher_data.len(), IV_LEN + BLOCK_LEN);

        let decipher_data = decrypt_data(b"pass", &cipher_data, CipherAlgorithm::Aes128).unwrap();
        assert!(decipher_data.is_empty());
    }

    #[test]
    fn should_reject_truncated_or_misaligned_input() {
        let short = [0u8; 16];
        assert!(matches!(
            decrypt_data(b"pass", &short, CipherAlgorithm::Aes128),
            Err(CryptError::MalformedCiphertext(16))
        ));

        let misaligned = [0u8; 40];
        assert!(matches!(
            decrypt_data(b"pass", &misaligned, CipherAlgorithm::Aes128),
            Err(CryptError::MalformedCiphertext(40))
        ));
    }

    #[test]
    fn should_not_reveal_the_payload_under_a_wrong_password() {
        let data = b"the cake is a lie";
        let cipher_data = encrypt_data(b"right", data, CipherAlgorithm::Aes192).unwrap();

        // a wrong key either trips the padding check or decodes to junk
        if let Ok(decipher_data) = decrypt_data(b"wrong", &cipher_data, CipherAlgorithm::Aes192) {
            assert_ne!(decipher_data, data);
        }
    }

    #[test]
    fn should_pad_with_the_pad_count() {
        let padded = pad_blocks(&[1, 2, 3]);
        assert_eq!(padded.len(), 16);
        assert_eq!(&padded[..3], &[1, 2, 3]);
        assert!(padded[3..].iter().all(|&b| b == 13));

        let padded = pad_blocks(&[9u8; 32]);
        assert_eq!(padded.len(), 48);
        assert!(padded[32..].iter().all(|&b| b == 16));
    }

    #[test]
    fn should_strip_only_valid_pad_counts() {
        let mut block = vec![0u8; 16];
        block[15] = 4;
        assert_eq!(strip_blocks(block).unwrap().len(), 12);

        let zero_marker = vec![0u8; 16];
        assert!(matches!(
            strip_blocks(zero_marker),
            Err(CryptError::InvalidPadding(0))
        ));

        let mut oversized_marker = vec![0u8; 16];
        oversized_marker[15] = 17;
        assert!(matches!(
            strip_blocks(oversized_marker),
            Err(CryptError::InvalidPadding(17))
        ));

        // a count larger than the data itself is junk as well
        assert!(matches!(
            strip_blocks(vec![2, 3]),
            Err(CryptError::InvalidPadding(3))
        ));
    }

    #[test]
    fn should_derive_keys_of_the_requested_length() {
        for algorithm in ALGORITHMS {
            let mut rng = Rng::with_seed(DERIVATION_SEED);
            let salt = derivation_salt(&mut rng, algorithm.key_len());
            let key = derive_key(b"hunter42", &salt, algorithm.key_len()).unwrap();

            assert_eq!(key.len(), algorithm.key_len());
            assert!(key.iter().any(|&b| b != 0));
        }
    }

    #[test]
    fn should_draw_salt_and_iv_deterministically() {
        let mut first = Rng::with_seed(DERIVATION_SEED);
        let mut second = Rng::with_seed(DERIVATION_SEED);

        assert_eq!(derivation_salt(&mut first, 24), derivation_salt(&mut second, 24));
        assert_eq!(derivation_iv(&mut first), derivation_iv(&mut second));
    }
}
