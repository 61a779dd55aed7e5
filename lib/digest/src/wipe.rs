//! Secure erasure.
//!
//! Every buffer that held key material, key-derived state or message data
//! is cleared through here (or through a [`Zeroize`] impl) when its
//! lifetime ends. The `zeroize` crate writes with volatile stores followed
//! by a compiler fence, so the clear survives dead-store elimination even
//! when the memory is never read again.

pub use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Overwrites `bytes` with zeros in a way the optimizer cannot elide.
#[inline]
pub fn secure_zero(bytes: &mut [u8]) {
    bytes.zeroize();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_zero_clears_slice() {
        let mut key = [0xa5u8; 48];
        secure_zero(&mut key[8..40]);
        assert!(key[..8].iter().all(|&b| b == 0xa5));
        assert!(key[8..40].iter().all(|&b| b == 0));
        assert!(key[40..].iter().all(|&b| b == 0xa5));
    }

    #[test]
    fn test_zeroizing_wrapper_clears_on_scope_exit() {
        let mut probe = [0u8; 16];
        {
            let mut tmp = Zeroizing::new([0x36u8; 16]);
            tmp[0] = 0x5c;
            probe.copy_from_slice(&tmp[..]);
        }
        assert_eq!(probe[0], 0x5c);
        secure_zero(&mut probe);
        assert_eq!(probe, [0u8; 16]);
    }
}
