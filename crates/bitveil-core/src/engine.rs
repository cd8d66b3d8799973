//! # Hiding and unveiling
//!
//! The codec at the center of the crate. A payload goes into a carrier as a
//! stream of bit chunks, scattered over the buffer in the order of
//! [`IndexPermutation::scatter`] seeded with the byte at offset 0. That byte
//! is read, never written, so the reader recovers the identical order.
//!
//! In front of the payload sits a six byte header, always embedded one bit
//! per carrier byte and never in alpha samples, regardless of the settings.
//! The payload itself follows at the configured depth, entering alpha
//! samples only when the settings allow it.
//!
//! Writes are planned against an immutable buffer and applied only once the
//! whole placement is known, so a failed [`hide`] leaves the carrier
//! untouched.

use std::borrow::Cow;
use std::io::Cursor;

use bitstream_io::{BigEndian, BitRead, BitReader, BitWrite, BitWriter};
use log::{debug, trace};

use crate::buffer::PixelBuffer;
use crate::error::BitveilError;
use crate::header::{PayloadHeader, HEADER_LEN};
use crate::instrument::{NoopObserver, Stage, StageObserver};
use crate::permutation::IndexPermutation;
use crate::result::Result;
use crate::settings::{DataDepth, EncoderSettings, WireSettings};

/// Payload bytes a buffer can take under the given settings.
///
/// This is the capacity estimate of the carrier format: header cost is
/// charged at the payload depth and encryption cost as whole cipher blocks.
/// Near the limit the placement itself can still come up short, in which
/// case [`hide`] fails with [`BitveilError::CapacityExceeded`] and the
/// buffer stays untouched.
pub fn available_bytes(buffer: &PixelBuffer, settings: &EncoderSettings) -> usize {
    let payload_bytes =
        usable_parts(buffer, settings) / u64::from(settings.depth().parts_per_byte());

    let capacity = if settings.is_encrypted() {
        let blocks = payload_bytes as i64 / 16;
        // one block of padding, one byte so a full final block is never needed,
        // six bytes of header
        (blocks - 1) * 16 - 1 - 6
    } else {
        payload_bytes as i64 - 6
    };

    capacity.max(0) as usize
}

/// Whether `payload_len` bytes fit into `buffer` under `settings`, by the
/// same estimate as [`available_bytes`]. For encrypted settings the length
/// is taken as is; padding and IV are not added here.
pub fn can_hide(buffer: &PixelBuffer, payload_len: usize, settings: &EncoderSettings) -> bool {
    let bits = (u64::from(HEADER_LEN) + payload_len as u64) * 8;
    bits / u64::from(settings.depth().bits()) <= usable_parts(buffer, settings)
}

/// Embed `payload` into `buffer` under `settings`.
pub fn hide(buffer: &mut PixelBuffer, payload: &[u8], settings: &EncoderSettings) -> Result<()> {
    hide_observed(buffer, payload, settings, &mut NoopObserver)
}

/// [`hide`] with stage reporting.
pub fn hide_observed(
    buffer: &mut PixelBuffer,
    payload: &[u8],
    settings: &EncoderSettings,
    observer: &mut dyn StageObserver,
) -> Result<()> {
    observer.started(Stage::Hide);
    debug!(
        "hiding {} payload bytes at {} bits per byte in a {}x{} buffer",
        payload.len(),
        settings.depth().bits(),
        buffer.width(),
        buffer.height()
    );

    let embedded: Cow<[u8]> = match settings.password() {
        Some(password) => {
            observer.started(Stage::Encrypt);
            let ciphertext = bitveil_crypt::encrypt_data(password, payload, settings.algorithm())
                .map_err(BitveilError::Encryption)?;
            observer.finished(Stage::Encrypt);
            Cow::Owned(ciphertext)
        }
        None => Cow::Borrowed(payload),
    };

    let depth = settings.depth();
    let required = u64::from(HEADER_LEN) * 8 + chunk_count(embedded.len(), depth);
    let available = usable_parts(buffer, settings);

    if buffer.byte_count() == 0 {
        return Err(BitveilError::CapacityExceeded {
            required,
            available: 0,
        });
    }
    let payload_len = u32::try_from(embedded.len()).map_err(|_| BitveilError::CapacityExceeded {
        required,
        available,
    })?;
    if required > available {
        return Err(BitveilError::CapacityExceeded {
            required,
            available,
        });
    }

    let header = PayloadHeader {
        payload_len,
        settings_byte: settings.to_byte(),
    }
    .to_bytes();

    let seed = buffer.byte(0);
    let permutation = IndexPermutation::scatter(buffer.byte_count(), seed);
    let mut placement = Placement::new(permutation.offsets(), required, available);

    placement.stage(buffer, &header, DataDepth::One, true)?;
    placement.stage(buffer, &embedded, depth, !settings.encode_in_alpha())?;
    placement.apply(buffer);

    observer.finished(Stage::Hide);
    Ok(())
}

/// Extract the payload embedded in `buffer`.
///
/// Depth, alpha use and cipher come from the embedded header; only the
/// password has to be supplied, and only for encrypted payloads.
pub fn unveil(buffer: &PixelBuffer, password: Option<&[u8]>) -> Result<Vec<u8>> {
    unveil_observed(buffer, password, &mut NoopObserver)
}

/// [`unveil`] with stage reporting.
pub fn unveil_observed(
    buffer: &PixelBuffer,
    password: Option<&[u8]>,
    observer: &mut dyn StageObserver,
) -> Result<Vec<u8>> {
    observer.started(Stage::Unveil);
    debug!(
        "unveiling from a {}x{} buffer",
        buffer.width(),
        buffer.height()
    );

    if buffer.byte_count() == 0 {
        return Err(BitveilError::MalformedHeader("buffer too small for a header"));
    }

    let seed = buffer.byte(0);
    let permutation = IndexPermutation::scatter(buffer.byte_count(), seed);
    let mut cursor = CarrierCursor::new(permutation.offsets());

    let marker = read_bytes(
        buffer,
        &mut cursor,
        1,
        DataDepth::One,
        true,
        "buffer ends inside the header",
    )?[0];
    let body = read_bytes(
        buffer,
        &mut cursor,
        PayloadHeader::body_len(marker)?,
        DataDepth::One,
        true,
        "buffer ends inside the header",
    )?;
    let header = PayloadHeader::from_body(&body)?;
    let wire = WireSettings::from_byte(header.settings_byte)?;
    trace!(
        "found header: {} payload bytes, settings {:#010b}",
        header.payload_len,
        header.settings_byte
    );

    let embedded = read_bytes(
        buffer,
        &mut cursor,
        header.payload_len as usize,
        wire.depth,
        !wire.encode_in_alpha,
        "buffer ends inside the payload",
    )?;

    let payload = if wire.encrypted {
        let password = password.ok_or(BitveilError::MissingPassword)?;
        observer.started(Stage::Decrypt);
        let payload = bitveil_crypt::decrypt_data(password, &embedded, wire.algorithm)
            .map_err(BitveilError::Decryption)?;
        observer.finished(Stage::Decrypt);
        payload
    } else {
        embedded
    };

    observer.finished(Stage::Unveil);
    Ok(payload)
}

/// Sample byte offsets available for embedding: everything except the seed
/// byte at offset 0 and, unless the settings open it, the alpha samples.
fn usable_parts(buffer: &PixelBuffer, settings: &EncoderSettings) -> u64 {
    let alpha = if settings.encode_in_alpha() {
        0
    } else {
        buffer.alpha_byte_count()
    };

    (i64::from(buffer.byte_count()) - i64::from(alpha) - 1).max(0) as u64
}

fn chunk_count(byte_count: usize, depth: DataDepth) -> u64 {
    byte_count as u64 * 8 / u64::from(depth.bits())
}

/// Walks the scattered offsets in order, consuming skipped alpha offsets so
/// reader and writer stay in lockstep.
struct CarrierCursor<'a> {
    offsets: &'a [u32],
    position: usize,
}

impl<'a> CarrierCursor<'a> {
    fn new(offsets: &'a [u32]) -> CarrierCursor<'a> {
        CarrierCursor {
            offsets,
            position: 0,
        }
    }

    fn next_offset(&mut self, buffer: &PixelBuffer, skip_alpha: bool) -> Option<u32> {
        while let Some(&offset) = self.offsets.get(self.position) {
            self.position += 1;
            if skip_alpha && buffer.is_alpha_index(offset) {
                continue;
            }
            return Some(offset);
        }
        None
    }

    /// Offsets not yet consumed, counting alpha offsets a skipping walk
    /// would drop.
    fn remaining(&self) -> usize {
        self.offsets.len() - self.position
    }
}

/// Pending writes, collected before the first byte of the carrier changes.
struct Placement<'a> {
    cursor: CarrierCursor<'a>,
    plan: Vec<(u32, u8)>,
    required: u64,
    available: u64,
}

impl<'a> Placement<'a> {
    fn new(offsets: &'a [u32], required: u64, available: u64) -> Placement<'a> {
        Placement {
            cursor: CarrierCursor::new(offsets),
            plan: Vec::with_capacity(required.min(offsets.len() as u64) as usize),
            required,
            available,
        }
    }

    /// Plan the writes for `bytes` at `depth`, most significant bits first.
    fn stage(
        &mut self,
        buffer: &PixelBuffer,
        bytes: &[u8],
        depth: DataDepth,
        skip_alpha: bool,
    ) -> Result<()> {
        let bits = u32::from(depth.bits());
        let mask = depth.chunk_mask();
        let mut reader = BitReader::endian(Cursor::new(bytes), BigEndian);

        for _ in 0..chunk_count(bytes.len(), depth) {
            let chunk = reader.read::<u8>(bits)?;
            let offset = self
                .cursor
                .next_offset(buffer, skip_alpha)
                .ok_or(BitveilError::CapacityExceeded {
                    required: self.required,
                    available: self.available,
                })?;
            self.plan.push((offset, buffer.byte(offset) & !mask | chunk));
        }

        Ok(())
    }

    fn apply(self, buffer: &mut PixelBuffer) {
        for (offset, value) in self.plan {
            buffer.set_byte(offset, value);
        }
    }
}

/// Collect `count` bytes from the carrier at `depth`.
fn read_bytes(
    buffer: &PixelBuffer,
    cursor: &mut CarrierCursor,
    count: usize,
    depth: DataDepth,
    skip_alpha: bool,
    context: &'static str,
) -> Result<Vec<u8>> {
    let bits = u32::from(depth.bits());
    let mask = depth.chunk_mask();

    // `count` can come straight off the wire. Alpha skips only shrink the
    // remaining supply, so a count past it can never be served.
    let chunks = chunk_count(count, depth);
    if chunks > cursor.remaining() as u64 {
        return Err(BitveilError::MalformedHeader(context));
    }

    let mut writer = BitWriter::endian(Vec::with_capacity(count), BigEndian);

    for _ in 0..chunks {
        let offset = cursor
            .next_offset(buffer, skip_alpha)
            .ok_or(BitveilError::MalformedHeader(context))?;
        writer.write(bits, buffer.byte(offset) & mask)?;
    }

    Ok(writer.into_writer())
}
