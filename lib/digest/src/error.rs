//! Error type shared by every digest and MAC operation.

use core::fmt;

/// Algorithms covered by the known-answer self test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Sha256,
    Sha512,
    HmacSha256,
    HmacSha512,
}

impl Algorithm {
    /// Display name used in log messages.
    pub const fn name(self) -> &'static str {
        match self {
            Algorithm::Sha256 => "SHA-256",
            Algorithm::Sha512 => "SHA-512",
            Algorithm::HmacSha256 => "HMAC-SHA256",
            Algorithm::HmacSha512 => "HMAC-SHA512",
        }
    }
}

/// Digest engine errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Output buffer of the wrong size, malformed exported state,
    /// or a layout the allocator cannot represent
    InvalidArguments,
    /// Aligned allocation failed
    OutOfMemory,
    /// Update or finalize on a context that was already finalized
    InvalidState,
    /// A known-answer test produced the wrong output
    SelfTestFailed(Algorithm),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArguments => write!(f, "Invalid arguments"),
            Error::OutOfMemory => write!(f, "Out of memory"),
            Error::InvalidState => write!(f, "Context already finalized"),
            Error::SelfTestFailed(alg) => write!(f, "Self test failed: {}", alg.name()),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;
