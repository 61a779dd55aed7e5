//! # mdigest
//!
//! Streaming SHA-2 digests and HMAC for kernel (no_std) and userspace.
//!
//! ## Algorithms
//!
//! - **SHA-256**: 32-bit words, 64-byte blocks, 256-bit output
//! - **SHA-512**: 64-bit words, 128-byte blocks, 512-bit output
//! - **HMAC-SHA256 / HMAC-SHA512**: FIPS 198-1 message authentication
//!
//! ## Design
//!
//! - One generic Merkle-Damgård engine ([`DigestContext`]) instantiated per
//!   [`Family`]; the compression function is the only per-family code
//! - Any message split produces the same digest
//! - Contexts can be exported to a big-endian byte string and resumed later
//! - Every context and every temporary holding key material is zeroed
//!   when it goes out of scope
//! - No dynamic allocation unless a context is explicitly heap-allocated
//!   (feature `alloc`)

#![no_std]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

#[cfg(feature = "alloc")]
pub mod aligned;
pub mod compress;
pub mod engine;
pub mod error;
pub mod family;
pub mod hmac;
pub mod selftest;
pub mod wipe;

#[cfg(feature = "alloc")]
pub use aligned::{AlignedBox, CONTEXT_ALIGN};
pub use engine::{DigestContext, Sha256, Sha512};
pub use error::{Algorithm, Error, Result};
pub use family::{Family, Sha256Family, Sha512Family};
pub use hmac::{Hmac, HmacSha256, HmacSha512};

use subtle::ConstantTimeEq;

/// Uniform streaming interface over plain digests and MACs.
pub trait Digest {
    /// Digest or tag bytes.
    type Output: AsRef<[u8]>;

    /// Output size in bytes.
    const OUTPUT_SIZE: usize;

    /// Absorbs more message data.
    fn update(&mut self, data: &[u8]) -> Result<()>;

    /// Completes the computation. Fails with `InvalidState` if called twice.
    fn finalize(&mut self) -> Result<Self::Output>;
}

impl<F: Family> Digest for DigestContext<F> {
    type Output = F::Digest;
    const OUTPUT_SIZE: usize = F::DIGEST_SIZE;

    fn update(&mut self, data: &[u8]) -> Result<()> {
        DigestContext::update(self, data)
    }

    fn finalize(&mut self) -> Result<F::Digest> {
        DigestContext::finalize(self)
    }
}

impl<F: Family> Digest for Hmac<F> {
    type Output = F::Digest;
    const OUTPUT_SIZE: usize = F::DIGEST_SIZE;

    fn update(&mut self, data: &[u8]) -> Result<()> {
        Hmac::update(self, data)
    }

    fn finalize(&mut self) -> Result<F::Digest> {
        Hmac::finalize(self)
    }
}

/// Constant-time equality of two byte strings.
///
/// Slices of different length compare unequal; the length itself is not
/// treated as secret.
pub fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}
