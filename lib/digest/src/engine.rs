//! Incremental Merkle-Damgård digest engine.
//!
//! [`DigestContext`] buffers input into blocks, drives the family's
//! compression function, applies the SHA-2 padding on finalization and can
//! serialize its paused state to a platform-independent byte string.
//!
//! ```ignore
//! use mdigest::Sha256;
//!
//! let mut ctx = Sha256::new();
//! ctx.update(b"a")?;
//! ctx.update(b"bc")?;
//! let digest = ctx.finalize()?;
//! ```

use core::fmt;
use core::marker::PhantomData;

use crate::error::{Error, Result};
use crate::family::{ByteArray, Family, Sha256Family, Sha512Family, Word, COUNTER_BYTES};
use crate::wipe::{secure_zero, Zeroize, ZeroizeOnDrop};

#[cfg(feature = "alloc")]
use crate::aligned::AlignedBox;

/// SHA-256 context.
pub type Sha256 = DigestContext<Sha256Family>;

/// SHA-512 context.
pub type Sha512 = DigestContext<Sha512Family>;

/// Streaming hash state for one message.
#[repr(align(16))]
pub struct DigestContext<F: Family> {
    /// Chaining value
    state: [F::Word; 8],
    /// Not yet compressed tail of the message
    buffer: F::Block,
    /// Valid bytes in `buffer`, always `< F::BLOCK_SIZE` between calls
    buffered_len: usize,
    /// Message bytes consumed so far
    total_len: u64,
    finalized: bool,
    _family: PhantomData<F>,
}

impl<F: Family> DigestContext<F> {
    /// Creates a context holding the family's initial chaining value.
    pub fn new() -> Self {
        Self {
            state: F::INITIAL_STATE,
            buffer: F::Block::zeroed(),
            buffered_len: 0,
            total_len: 0,
            finalized: false,
            _family: PhantomData,
        }
    }

    /// Resets to the initial state, discarding any absorbed input.
    pub fn init(&mut self) {
        self.zeroize();
        self.state = F::INITIAL_STATE;
        self.finalized = false;
    }

    /// Bytes needed to hold one context.
    pub const fn context_size() -> usize {
        core::mem::size_of::<Self>()
    }

    /// Allocates a fresh context on the heap, aligned for vector access.
    #[cfg(feature = "alloc")]
    pub fn alloc() -> Result<AlignedBox<Self>> {
        AlignedBox::new(Self::new())
    }

    /// Wipes and frees a heap context.
    #[cfg(feature = "alloc")]
    pub fn cleanup(ctx: AlignedBox<Self>) {
        ctx.cleanup();
    }

    /// Bytes held in the block buffer, waiting for a full block.
    pub fn buffered_len(&self) -> usize {
        self.buffered_len
    }

    /// Message bytes absorbed since the last `init`.
    pub fn total_len(&self) -> u64 {
        self.total_len
    }

    /// True once the context has produced a digest or been wiped.
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    #[inline(always)]
    fn compress_block(state: &mut [F::Word; 8], block: &[u8]) {
        F::compress(state, block);
        #[cfg(feature = "debug")]
        log::trace!("{}: block {:02x?} -> state {:x?}", F::NAME, block, state);
    }

    /// Absorbs `data`.
    ///
    /// The digest does not depend on how a message is split across calls.
    pub fn update(&mut self, data: &[u8]) -> Result<()> {
        if self.finalized {
            log::warn!("{}: update after finalize", F::NAME);
            return Err(Error::InvalidState);
        }
        self.absorb(data);
        Ok(())
    }

    /// `update` without the lifecycle check.
    pub(crate) fn absorb(&mut self, data: &[u8]) {
        if data.is_empty() {
            return;
        }

        let mut rest = data;

        if self.buffered_len > 0 {
            let take = (F::BLOCK_SIZE - self.buffered_len).min(rest.len());
            let end = self.buffered_len + take;
            self.buffer.as_mut()[self.buffered_len..end].copy_from_slice(&rest[..take]);
            self.buffered_len = end;
            rest = &rest[take..];

            if self.buffered_len == F::BLOCK_SIZE {
                Self::compress_block(&mut self.state, self.buffer.as_ref());
                self.buffered_len = 0;
            }
        }

        // Whole blocks go straight from the caller's slice
        let mut blocks = rest.chunks_exact(F::BLOCK_SIZE);
        for block in &mut blocks {
            Self::compress_block(&mut self.state, block);
        }

        let tail = blocks.remainder();
        if !tail.is_empty() {
            self.buffer.as_mut()[..tail.len()].copy_from_slice(tail);
            self.buffered_len = tail.len();
        }

        self.total_len = self.total_len.wrapping_add(data.len() as u64);
    }

    fn check_live(&self) -> Result<()> {
        if self.finalized {
            log::warn!("{}: finalize called twice", F::NAME);
            return Err(Error::InvalidState);
        }
        Ok(())
    }

    /// Pads, compresses the final block(s) and marks the context finalized.
    ///
    /// Afterwards `state` is the digest in word form.
    pub(crate) fn pad_final(&mut self) {
        let used = self.buffered_len;
        let length_at = F::BLOCK_SIZE - F::LENGTH_SIZE;

        self.buffer.as_mut()[used] = 0x80;
        if F::BLOCK_SIZE - used <= F::LENGTH_SIZE {
            // No room for the length field: flush and start an empty block
            self.buffer.as_mut()[used + 1..].fill(0);
            Self::compress_block(&mut self.state, self.buffer.as_ref());
            self.buffer.as_mut()[..length_at].fill(0);
        } else {
            self.buffer.as_mut()[used + 1..length_at].fill(0);
        }

        encode_bit_length(self.total_len, &mut self.buffer.as_mut()[length_at..]);
        Self::compress_block(&mut self.state, self.buffer.as_ref());

        secure_zero(self.buffer.as_mut());
        self.buffered_len = 0;
        self.finalized = true;
    }

    /// Serializes the chaining value big-endian into `out` (`DIGEST_SIZE` bytes).
    pub(crate) fn write_state(&self, out: &mut [u8]) {
        for (word, chunk) in self.state.iter().zip(out.chunks_exact_mut(<F::Word as Word>::BYTES)) {
            word.write_be(chunk);
        }
    }

    /// Completes the hash and returns the digest.
    ///
    /// The context must be re-initialized with [`init`](Self::init) before
    /// it can hash another message.
    pub fn finalize(&mut self) -> Result<F::Digest> {
        self.check_live()?;
        self.pad_final();
        let mut out = F::Digest::zeroed();
        self.write_state(out.as_mut());
        Ok(out)
    }

    /// Completes the hash into `out`, which must be exactly `DIGEST_SIZE` bytes.
    pub fn finalize_into(&mut self, out: &mut [u8]) -> Result<()> {
        if out.len() != F::DIGEST_SIZE {
            return Err(Error::InvalidArguments);
        }
        self.check_live()?;
        self.pad_final();
        self.write_state(out);
        Ok(())
    }

    /// One-shot digest of `data`.
    pub fn digest(data: &[u8]) -> F::Digest {
        let mut ctx = Self::new();
        ctx.absorb(data);
        ctx.pad_final();
        let mut out = F::Digest::zeroed();
        ctx.write_state(out.as_mut());
        out
    }

    /// Serializes the context.
    ///
    /// Layout: chaining value (`DIGEST_SIZE` bytes, big-endian words),
    /// block buffer (`BLOCK_SIZE` bytes, unused tail zeroed), buffered
    /// length and total length (8 bytes each, big-endian).
    pub fn export(&self) -> F::Exported {
        let mut out = F::Exported::zeroed();
        let (state, rest) = out.as_mut().split_at_mut(F::DIGEST_SIZE);
        let (block, counters) = rest.split_at_mut(F::BLOCK_SIZE);

        self.write_state(state);
        block[..self.buffered_len].copy_from_slice(&self.buffer.as_ref()[..self.buffered_len]);
        (self.buffered_len as u64).write_be(&mut counters[..COUNTER_BYTES]);
        self.total_len.write_be(&mut counters[COUNTER_BYTES..]);
        out
    }

    /// Rebuilds a live context from [`export`](Self::export) output.
    pub fn import(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != F::EXPORTED_SIZE {
            log::warn!(
                "{}: exported state is {} bytes, expected {}",
                F::NAME,
                bytes.len(),
                F::EXPORTED_SIZE
            );
            return Err(Error::InvalidArguments);
        }

        let (state, rest) = bytes.split_at(F::DIGEST_SIZE);
        let (block, counters) = rest.split_at(F::BLOCK_SIZE);

        let buffered_len = u64::read_be(&counters[..COUNTER_BYTES]);
        if buffered_len >= F::BLOCK_SIZE as u64 {
            log::warn!("{}: buffered length {} out of range", F::NAME, buffered_len);
            return Err(Error::InvalidArguments);
        }
        let buffered_len = buffered_len as usize;

        let mut ctx = Self::new();
        for (word, chunk) in ctx.state.iter_mut().zip(state.chunks_exact(<F::Word as Word>::BYTES)) {
            *word = F::Word::read_be(chunk);
        }
        ctx.buffer.as_mut()[..buffered_len].copy_from_slice(&block[..buffered_len]);
        ctx.buffered_len = buffered_len;
        ctx.total_len = u64::read_be(&counters[COUNTER_BYTES..]);
        Ok(ctx)
    }

    /// Replaces this context with one rebuilt from exported bytes.
    ///
    /// On error the context is left untouched.
    pub fn import_into(&mut self, bytes: &[u8]) -> Result<()> {
        *self = Self::import(bytes)?;
        Ok(())
    }
}

/// Writes `total_len * 8` big-endian into `field`.
///
/// The three low bits of the bit count are always zero, so the last byte
/// carries the low five bits of the byte count shifted up by three.
fn encode_bit_length(total_len: u64, field: &mut [u8]) {
    let Some((last, high)) = field.split_last_mut() else {
        return;
    };
    *last = ((total_len & 0x1f) << 3) as u8;
    let mut rest = total_len >> 5;
    for byte in high.iter_mut().rev() {
        *byte = (rest & 0xff) as u8;
        rest >>= 8;
    }
}

impl<F: Family> Default for DigestContext<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Family> Clone for DigestContext<F> {
    fn clone(&self) -> Self {
        Self {
            state: self.state,
            buffer: self.buffer,
            buffered_len: self.buffered_len,
            total_len: self.total_len,
            finalized: self.finalized,
            _family: PhantomData,
        }
    }
}

impl<F: Family> fmt::Debug for DigestContext<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DigestContext")
            .field("family", &F::NAME)
            .field("buffered_len", &self.buffered_len)
            .field("total_len", &self.total_len)
            .field("finalized", &self.finalized)
            .finish_non_exhaustive()
    }
}

impl<F: Family> Zeroize for DigestContext<F> {
    fn zeroize(&mut self) {
        self.state.zeroize();
        self.buffer.zeroize();
        self.buffered_len.zeroize();
        self.total_len.zeroize();
        // A wiped context is dead until `init`
        self.finalized = true;
    }
}

impl<F: Family> Drop for DigestContext<F> {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl<F: Family> ZeroizeOnDrop for DigestContext<F> {}
