//! Known-answer self test.
//!
//! Runs once per process; later calls return the cached outcome. Each
//! algorithm is checked against a published vector with the message split
//! across two updates, and against an all-zero tag that must not match.

use spin::Once;

use crate::engine::DigestContext;
use crate::error::{Algorithm, Error, Result};
use crate::family::{Family, Sha256Family, Sha512Family};
use crate::hmac::Hmac;
use crate::Digest;

static RESULT: Once<Result<()>> = Once::new();

const ZERO_TAG: [u8; 64] = [0u8; 64];

struct Vector {
    key: Option<&'static [u8]>,
    message: &'static [u8],
    expected: &'static [u8],
}

const SHA256_ABC: Vector = Vector {
    key: None,
    message: b"abc",
    expected: &[
        0xba, 0x78, 0x16, 0xbf, 0x8f, 0x01, 0xcf, 0xea, 0x41, 0x41, 0x40, 0xde, 0x5d, 0xae, 0x22, 0x23,
        0xb0, 0x03, 0x61, 0xa3, 0x96, 0x17, 0x7a, 0x9c, 0xb4, 0x10, 0xff, 0x61, 0xf2, 0x00, 0x15, 0xad,
    ],
};

const SHA512_ABC: Vector = Vector {
    key: None,
    message: b"abc",
    expected: &[
        0xdd, 0xaf, 0x35, 0xa1, 0x93, 0x61, 0x7a, 0xba, 0xcc, 0x41, 0x73, 0x49, 0xae, 0x20, 0x41, 0x31,
        0x12, 0xe6, 0xfa, 0x4e, 0x89, 0xa9, 0x7e, 0xa2, 0x0a, 0x9e, 0xee, 0xe6, 0x4b, 0x55, 0xd3, 0x9a,
        0x21, 0x92, 0x99, 0x2a, 0x27, 0x4f, 0xc1, 0xa8, 0x36, 0xba, 0x3c, 0x23, 0xa3, 0xfe, 0xeb, 0xbd,
        0x45, 0x4d, 0x44, 0x23, 0x64, 0x3c, 0xe8, 0x0e, 0x2a, 0x9a, 0xc9, 0x4f, 0xa5, 0x4c, 0xa4, 0x9f,
    ],
};

// RFC 4231 test case 2
const HMAC_SHA256_JEFE: Vector = Vector {
    key: Some(b"Jefe"),
    message: b"what do ya want for nothing?",
    expected: &[
        0x5b, 0xdc, 0xc1, 0x46, 0xbf, 0x60, 0x75, 0x4e, 0x6a, 0x04, 0x24, 0x26, 0x08, 0x95, 0x75, 0xc7,
        0x5a, 0x00, 0x3f, 0x08, 0x9d, 0x27, 0x39, 0x83, 0x9d, 0xec, 0x58, 0xb9, 0x64, 0xec, 0x38, 0x43,
    ],
};

const HMAC_SHA512_JEFE: Vector = Vector {
    key: Some(b"Jefe"),
    message: b"what do ya want for nothing?",
    expected: &[
        0x16, 0x4b, 0x7a, 0x7b, 0xfc, 0xf8, 0x19, 0xe2, 0xe3, 0x95, 0xfb, 0xe7, 0x3b, 0x56, 0xe0, 0xa3,
        0x87, 0xbd, 0x64, 0x22, 0x2e, 0x83, 0x1f, 0xd6, 0x10, 0x27, 0x0c, 0xd7, 0xea, 0x25, 0x05, 0x54,
        0x97, 0x58, 0xbf, 0x75, 0xc0, 0x5a, 0x99, 0x4a, 0x6d, 0x03, 0x4f, 0x65, 0xf8, 0xf0, 0xe6, 0xfd,
        0xca, 0xea, 0xb1, 0xa3, 0x4d, 0x4a, 0x6b, 0x4b, 0x63, 0x6e, 0x07, 0x0a, 0x38, 0xbc, 0xe7, 0x37,
    ],
};

/// Feeds the message in two halves and compares the output.
///
/// `Ok(true)` on a match; a mismatch is `Ok(false)`.
fn digest_matches<D: Digest>(mut d: D, message: &[u8], expected: &[u8]) -> Result<bool> {
    let (head, tail) = message.split_at(message.len() / 2);
    d.update(head)?;
    d.update(tail)?;
    let out = d.finalize()?;
    Ok(crate::ct_eq(out.as_ref(), expected))
}

fn check<D: Digest>(alg: Algorithm, make: impl Fn() -> D, vector: &Vector) -> Result<()> {
    let fail = |reason: &str| {
        log::error!("{} self test: {}", alg.name(), reason);
        Error::SelfTestFailed(alg)
    };

    if !digest_matches(make(), vector.message, vector.expected)? {
        return Err(fail("known answer mismatch"));
    }
    if digest_matches(make(), vector.message, &ZERO_TAG[..D::OUTPUT_SIZE])? {
        return Err(fail("all-zero tag accepted"));
    }
    Ok(())
}

fn check_family<F: Family>(digest: (Algorithm, &Vector), mac: (Algorithm, &Vector)) -> Result<()> {
    check(digest.0, DigestContext::<F>::new, digest.1)?;
    let key = mac.1.key.unwrap_or_default();
    check(mac.0, || Hmac::<F>::new(key), mac.1)
}

fn run_all() -> Result<()> {
    check_family::<Sha256Family>(
        (Algorithm::Sha256, &SHA256_ABC),
        (Algorithm::HmacSha256, &HMAC_SHA256_JEFE),
    )?;
    check_family::<Sha512Family>(
        (Algorithm::Sha512, &SHA512_ABC),
        (Algorithm::HmacSha512, &HMAC_SHA512_JEFE),
    )
}

/// Runs the known-answer tests on first call and returns the cached result.
pub fn run() -> Result<()> {
    *RESULT.call_once(|| {
        let result = run_all();
        match result {
            Ok(()) => log::info!("digest self test passed"),
            Err(err) => log::error!("digest self test failed: {}", err),
        }
        result
    })
}
