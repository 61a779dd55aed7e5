//! HMAC (FIPS 198-1 / RFC 2104) over any [`Family`].
//!
//! Two digest contexts are keyed at construction: `inner` with
//! `K ^ ipad` and `outer` with `K ^ opad`. Message data only ever reaches
//! `inner`; `outer` absorbs the inner digest at finalization.

use core::fmt;

use crate::engine::DigestContext;
use crate::error::{Error, Result};
use crate::family::{ByteArray, Family, Sha256Family, Sha512Family};
use crate::wipe::{Zeroize, ZeroizeOnDrop, Zeroizing};

#[cfg(feature = "alloc")]
use crate::aligned::AlignedBox;

const IPAD: u8 = 0x36;
const OPAD: u8 = 0x5c;

/// HMAC-SHA256.
pub type HmacSha256 = Hmac<Sha256Family>;

/// HMAC-SHA512.
pub type HmacSha512 = Hmac<Sha512Family>;

#[inline]
fn bytes<B: ByteArray>(b: &B) -> &[u8] {
    b.as_ref()
}

#[inline]
fn bytes_mut<B: ByteArray>(b: &mut B) -> &mut [u8] {
    b.as_mut()
}

/// Keyed MAC context.
pub struct Hmac<F: Family> {
    inner: DigestContext<F>,
    outer: DigestContext<F>,
}

impl<F: Family> Hmac<F> {
    /// Creates a MAC context keyed with `key` (any length).
    pub fn new(key: &[u8]) -> Self {
        let mut mac = Self {
            inner: DigestContext::new(),
            outer: DigestContext::new(),
        };
        mac.reset(key);
        mac
    }

    /// Re-keys the context and discards any absorbed message.
    pub fn reset(&mut self, key: &[u8]) {
        self.inner.init();
        self.outer.init();

        let mut key_block = Zeroizing::new(F::Block::zeroed());
        if key.len() > F::BLOCK_SIZE {
            let hashed = Zeroizing::new(DigestContext::<F>::digest(key));
            bytes_mut(&mut *key_block)[..F::DIGEST_SIZE].copy_from_slice(bytes(&*hashed));
        } else {
            bytes_mut(&mut *key_block)[..key.len()].copy_from_slice(key);
        }

        let mut pad = Zeroizing::new(F::Block::zeroed());
        for (p, k) in bytes_mut(&mut *pad).iter_mut().zip(bytes(&*key_block)) {
            *p = k ^ IPAD;
        }
        self.inner.absorb(bytes(&*pad));

        for (p, k) in bytes_mut(&mut *pad).iter_mut().zip(bytes(&*key_block)) {
            *p = k ^ OPAD;
        }
        self.outer.absorb(bytes(&*pad));
    }

    /// Bytes needed to hold one MAC context.
    pub const fn context_size() -> usize {
        core::mem::size_of::<Self>()
    }

    /// Allocates a keyed MAC context on the heap.
    ///
    /// The key is absorbed inside the allocation, so no keyed copy is left
    /// behind on the stack.
    #[cfg(feature = "alloc")]
    pub fn alloc(key: &[u8]) -> Result<AlignedBox<Self>> {
        let mut mac = AlignedBox::new(Self {
            inner: DigestContext::new(),
            outer: DigestContext::new(),
        })?;
        mac.reset(key);
        Ok(mac)
    }

    /// Wipes and frees a heap MAC context.
    #[cfg(feature = "alloc")]
    pub fn cleanup(mac: AlignedBox<Self>) {
        mac.cleanup();
    }

    /// Absorbs message data.
    pub fn update(&mut self, data: &[u8]) -> Result<()> {
        self.inner.update(data)
    }

    /// True once a tag has been produced or the context has been wiped.
    pub fn is_finalized(&self) -> bool {
        self.inner.is_finalized()
    }

    fn complete(&mut self, out: &mut [u8]) {
        self.inner.pad_final();

        let mut inner_digest = Zeroizing::new(F::Digest::zeroed());
        self.inner.write_state(bytes_mut(&mut *inner_digest));

        self.outer.absorb(bytes(&*inner_digest));
        self.outer.pad_final();
        self.outer.write_state(out);
    }

    /// Completes the MAC and returns the tag.
    pub fn finalize(&mut self) -> Result<F::Digest> {
        if self.is_finalized() {
            log::warn!("HMAC-{}: finalize called twice", F::NAME);
            return Err(Error::InvalidState);
        }
        let mut tag = F::Digest::zeroed();
        self.complete(tag.as_mut());
        Ok(tag)
    }

    /// Completes the MAC into `out`, which must be exactly `DIGEST_SIZE` bytes.
    pub fn finalize_into(&mut self, out: &mut [u8]) -> Result<()> {
        if out.len() != F::DIGEST_SIZE {
            return Err(Error::InvalidArguments);
        }
        if self.is_finalized() {
            log::warn!("HMAC-{}: finalize called twice", F::NAME);
            return Err(Error::InvalidState);
        }
        self.complete(out);
        Ok(())
    }

    /// Completes the MAC and compares it with `expected` in constant time.
    ///
    /// A mismatch is `Ok(false)`, not an error.
    pub fn verify(&mut self, expected: &[u8]) -> Result<bool> {
        let tag = Zeroizing::new(self.finalize()?);
        Ok(crate::ct_eq(bytes(&*tag), expected))
    }

    /// One-shot MAC of `data` under `key`.
    pub fn mac(key: &[u8], data: &[u8]) -> F::Digest {
        let mut mac = Self::new(key);
        mac.inner.absorb(data);
        let mut tag = F::Digest::zeroed();
        mac.complete(tag.as_mut());
        tag
    }
}

impl<F: Family> Clone for Hmac<F> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            outer: self.outer.clone(),
        }
    }
}

impl<F: Family> fmt::Debug for Hmac<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hmac")
            .field("family", &F::NAME)
            .field("message_len", &self.inner.total_len().saturating_sub(F::BLOCK_SIZE as u64))
            .field("finalized", &self.is_finalized())
            .finish_non_exhaustive()
    }
}

impl<F: Family> Zeroize for Hmac<F> {
    fn zeroize(&mut self) {
        self.inner.zeroize();
        self.outer.zeroize();
    }
}

// Both contexts wipe themselves on drop.
impl<F: Family> ZeroizeOnDrop for Hmac<F> {}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::engine::{Sha256, Sha512};
    use hex_literal::hex;
    use std::vec::Vec;

    const LONG_KEY: [u8; 131] = [0xaa; 131];
    const CASE6_DATA: &[u8] = b"Test Using Larger Than Block-Size Key - Hash Key First";
    const CASE7_DATA: &[u8] = b"This is a test using a larger than block-size key and a larger than block-size data. The key needs to be hashed before being used by the HMAC algorithm.";

    #[test]
    fn test_rfc4231_sha256() {
        assert_eq!(
            HmacSha256::mac(&[0x0b; 20], b"Hi There"),
            hex!("b0344c61d8db38535ca8afceaf0bf12b881dc200c9833da726e9376c2e32cff7")
        );
        assert_eq!(
            HmacSha256::mac(b"Jefe", b"what do ya want for nothing?"),
            hex!("5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843")
        );
        assert_eq!(
            HmacSha256::mac(&LONG_KEY, CASE6_DATA),
            hex!("60e431591ee0b67f0d8a26aacbf5b77f8e0bc6213728c5140546040f0ee37f54")
        );
        assert_eq!(
            HmacSha256::mac(&LONG_KEY, CASE7_DATA),
            hex!("9b09ffa71b942fcb27635fbcd5b0e944bfdc63644f0713938a7f51535c3a35e2")
        );
    }

    #[test]
    fn test_rfc4231_sha512() {
        assert_eq!(
            HmacSha512::mac(&[0x0b; 20], b"Hi There"),
            hex!("87aa7cdea5ef619d4ff0b4241a1d6cb02379f4e2ce4ec2787ad0b30545e17cdedaa833b7d6b8a702038b274eaea3f4e4be9d914eeb61f1702e696c203a126854")
        );
        assert_eq!(
            HmacSha512::mac(b"Jefe", b"what do ya want for nothing?"),
            hex!("164b7a7bfcf819e2e395fbe73b56e0a387bd64222e831fd610270cd7ea2505549758bf75c05a994a6d034f65f8f0e6fdcaeab1a34d4a6b4b636e070a38bce737")
        );
        assert_eq!(
            HmacSha512::mac(&LONG_KEY, CASE6_DATA),
            hex!("80b24263c7c1a3ebb71493c1dd7be8b49b46d1f41b4aeec1121b013783f8f3526b56d037e05f2598bd0fd2215d6a1e5295e64f73f63f0aec8b915a985d786598")
        );
        assert_eq!(
            HmacSha512::mac(&LONG_KEY, CASE7_DATA),
            hex!("e37b6a775dc87dbaa4dfa9f96e5e3ffddebd71f8867289865df5a32d20cdc944b6022cac3c4982b10d5eeb55c3e4de15134676fb6de0446065c97440fa8c6a58")
        );
    }

    #[test]
    fn test_block_sized_key_used_as_is() {
        assert_eq!(
            HmacSha256::mac(&[b'k'; 64], b""),
            hex!("83026a325aaee70e36cfe607536aa1054104ad1077c36134810d4ccded1ccd3b")
        );
        assert_eq!(
            HmacSha512::mac(&[b'k'; 64], b""),
            hex!("f823594b6d4fae1f9ee7b1b8c6147e3f583bca04bc1f28f5a5554bce39df9f05a0e2705bee4200848a39b4d68d084028c917e63781e844eb4c09f85e451407c5")
        );
    }

    #[test]
    fn test_long_key_equals_hashed_key() {
        let hashed = Sha256::digest(&LONG_KEY);
        assert_eq!(HmacSha256::mac(&LONG_KEY, CASE7_DATA), HmacSha256::mac(&hashed, CASE7_DATA));
    }

    #[test]
    fn test_mac_differs_from_plain_hash() {
        assert_ne!(HmacSha256::mac(b"key", b"message"), Sha256::digest(b"message"));
        assert_ne!(HmacSha512::mac(b"key", b"message"), Sha512::digest(b"message"));
        assert_ne!(HmacSha256::mac(b"", b"message"), Sha256::digest(b"message"));
    }

    #[test]
    fn test_chunked_updates() {
        let data: Vec<u8> = (0..300u32).map(|i| (i % 251) as u8).collect();
        let whole = HmacSha512::mac(b"secret", &data);

        for step in [1, 7, 64, 127, 128, 129, 300] {
            let mut mac = HmacSha512::new(b"secret");
            for chunk in data.chunks(step) {
                mac.update(chunk).unwrap();
            }
            assert_eq!(mac.finalize().unwrap(), whole, "step {}", step);
        }
    }

    #[test]
    fn test_verify() {
        let tag = HmacSha256::mac(b"Jefe", b"what do ya want for nothing?");

        let mut mac = HmacSha256::new(b"Jefe");
        mac.update(b"what do ya want for nothing?").unwrap();
        assert_eq!(mac.verify(&tag), Ok(true));

        let mut mac = HmacSha256::new(b"Jefe");
        mac.update(b"what do ya want for nothing?").unwrap();
        assert_eq!(mac.verify(&[0u8; 32]), Ok(false));
    }

    #[test]
    fn test_lifecycle_errors() {
        let mut mac = HmacSha256::new(b"key");
        mac.update(b"data").unwrap();

        let mut short = [0u8; 16];
        assert_eq!(mac.finalize_into(&mut short), Err(Error::InvalidArguments));

        let first = mac.finalize().unwrap();
        assert_eq!(mac.update(b"more"), Err(Error::InvalidState));
        assert_eq!(mac.finalize().err(), Some(Error::InvalidState));
        assert_eq!(mac.verify(&first), Err(Error::InvalidState));

        mac.reset(b"key");
        mac.update(b"data").unwrap();
        assert_eq!(mac.finalize().unwrap(), first);
    }

    #[test]
    fn test_zeroize_clears_both_contexts() {
        let mut mac = HmacSha256::new(b"key");
        mac.zeroize();
        assert_eq!(mac.inner.export(), [0u8; 112]);
        assert_eq!(mac.outer.export(), [0u8; 112]);
    }

    #[test]
    fn test_zeroized_mac_rejects_use() {
        let mut mac = HmacSha256::new(b"key");
        mac.update(b"data").unwrap();
        mac.zeroize();
        assert!(mac.is_finalized());
        assert_eq!(mac.update(b"more"), Err(Error::InvalidState));
        assert_eq!(mac.finalize().err(), Some(Error::InvalidState));
        assert_eq!(mac.verify(&[0u8; 32]), Err(Error::InvalidState));

        mac.reset(b"key");
        mac.update(b"data").unwrap();
        assert_eq!(mac.finalize().unwrap(), HmacSha256::mac(b"key", b"data"));
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn test_heap_mac() {
        let mut mac = HmacSha256::alloc(b"Jefe").unwrap();
        mac.update(b"what do ya want for nothing?").unwrap();
        assert_eq!(
            mac.finalize().unwrap(),
            hex!("5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843")
        );
        HmacSha256::cleanup(mac);
        assert!(HmacSha256::context_size() >= 2 * Sha256::context_size());
    }
}
