//! Hash family parameters.
//!
//! A [`Family`] pins down everything that differs between SHA-256 and
//! SHA-512: the word width, block size, digest size, length-field size,
//! initial chaining value and the compression primitive. The engine in
//! [`crate::engine`] is written once against this trait and monomorphized
//! per family.

use core::fmt::Debug;

use zeroize::Zeroize;

use crate::compress;

/// Size of each serialized counter (`buffered_len`, `total_len`) in
/// exported state.
pub const COUNTER_BYTES: usize = 8;

/// A chaining-value word.
pub trait Word: Copy + Debug + PartialEq + Zeroize + Send + Sync + 'static {
    /// Width in bytes.
    const BYTES: usize;

    /// Writes the word big-endian into `out` (`out.len() == BYTES`).
    fn write_be(self, out: &mut [u8]);

    /// Reads a big-endian word from `bytes` (`bytes.len() == BYTES`).
    fn read_be(bytes: &[u8]) -> Self;
}

impl Word for u32 {
    const BYTES: usize = 4;

    #[inline]
    fn write_be(self, out: &mut [u8]) {
        out.copy_from_slice(&self.to_be_bytes());
    }

    #[inline]
    fn read_be(bytes: &[u8]) -> Self {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(bytes);
        u32::from_be_bytes(raw)
    }
}

impl Word for u64 {
    const BYTES: usize = 8;

    #[inline]
    fn write_be(self, out: &mut [u8]) {
        out.copy_from_slice(&self.to_be_bytes());
    }

    #[inline]
    fn read_be(bytes: &[u8]) -> Self {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        u64::from_be_bytes(raw)
    }
}

/// Fixed-size byte array used for blocks, digests and exported state.
pub trait ByteArray:
    Copy + Debug + PartialEq + Eq + AsRef<[u8]> + AsMut<[u8]> + Zeroize + Send + Sync + 'static
{
    /// All-zero value.
    fn zeroed() -> Self;
}

impl<const N: usize> ByteArray for [u8; N] {
    #[inline]
    fn zeroed() -> Self {
        [0u8; N]
    }
}

/// Parameters of one SHA-2 instance.
pub trait Family: 'static {
    type Word: Word;
    /// `[u8; BLOCK_SIZE]`
    type Block: ByteArray;
    /// `[u8; DIGEST_SIZE]`
    type Digest: ByteArray;
    /// `[u8; EXPORTED_SIZE]`
    type Exported: ByteArray;

    const NAME: &'static str;
    const BLOCK_SIZE: usize;
    const DIGEST_SIZE: usize;
    /// Bytes reserved at the end of the last block for the bit length.
    const LENGTH_SIZE: usize;
    const INITIAL_STATE: [Self::Word; 8];

    /// State bytes, block bytes, then the two big-endian counters.
    const EXPORTED_SIZE: usize = Self::DIGEST_SIZE + Self::BLOCK_SIZE + 2 * COUNTER_BYTES;

    /// Compresses one block into `state`.
    ///
    /// `block.len()` is always `BLOCK_SIZE`. Must be pure and reentrant.
    fn compress(state: &mut [Self::Word; 8], block: &[u8]);
}

/// SHA-256: 32-bit words, 64-byte blocks, 8-byte length field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sha256Family;

impl Family for Sha256Family {
    type Word = u32;
    type Block = [u8; 64];
    type Digest = [u8; 32];
    type Exported = [u8; 112];

    const NAME: &'static str = "SHA-256";
    const BLOCK_SIZE: usize = 64;
    const DIGEST_SIZE: usize = 32;
    const LENGTH_SIZE: usize = 8;

    /// First 32 bits of the fractional parts of the square roots of the first 8 primes.
    const INITIAL_STATE: [u32; 8] = [
        0x6a09e667, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a,
        0x510e527f, 0x9b05688c, 0x1f83d9ab, 0x5be0cd19,
    ];

    #[inline]
    fn compress(state: &mut [u32; 8], block: &[u8]) {
        compress::sha256(state, block);
    }
}

/// SHA-512: 64-bit words, 128-byte blocks, 16-byte length field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sha512Family;

impl Family for Sha512Family {
    type Word = u64;
    type Block = [u8; 128];
    type Digest = [u8; 64];
    type Exported = [u8; 208];

    const NAME: &'static str = "SHA-512";
    const BLOCK_SIZE: usize = 128;
    const DIGEST_SIZE: usize = 64;
    const LENGTH_SIZE: usize = 16;

    const INITIAL_STATE: [u64; 8] = [
        0x6a09e667f3bcc908, 0xbb67ae8584caa73b, 0x3c6ef372fe94f82b, 0xa54ff53a5f1d36f1,
        0x510e527fade682d1, 0x9b05688c2b3e6c1f, 0x1f83d9abfb41bd6b, 0x5be0cd19137e2179,
    ];

    #[inline]
    fn compress(state: &mut [u64; 8], block: &[u8]) {
        compress::sha512(state, block);
    }
}
