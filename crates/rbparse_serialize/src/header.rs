//! The format header and its validation.

use std::fmt;
use thiserror::Error;

/// Leading bytes of every dump.
pub const MAGIC: &[u8; 4] = b"YARP";

/// Magic plus three version bytes.
pub const HEADER_LEN: usize = MAGIC.len() + 3;

/// The format version written by this library.
pub const VERSION: Version = Version {
    major: 0,
    minor: 1,
    patch: 0,
};

/// A format version. Consumers accept only an exact match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerializeError {
    #[error("not a syntax tree dump: bad magic bytes")]
    BadMagic,
    #[error("dump is truncated: expected at least {expected} bytes, found {found}")]
    Truncated { expected: usize, found: usize },
    #[error("dump has format version {found}, this library reads {expected}")]
    VersionMismatch { found: Version, expected: Version },
}

/// Validate the header of a dump and return its version.
///
/// Fails unless the magic matches and the version equals [`VERSION`].
pub fn check_header(bytes: &[u8]) -> Result<Version, SerializeError> {
    if bytes.len() < MAGIC.len() {
        return Err(SerializeError::Truncated {
            expected: HEADER_LEN,
            found: bytes.len(),
        });
    }
    if &bytes[..MAGIC.len()] != MAGIC {
        return Err(SerializeError::BadMagic);
    }
    let [major, minor, patch] = match bytes.get(MAGIC.len()..HEADER_LEN) {
        Some(&[major, minor, patch]) => [major, minor, patch],
        _ => {
            return Err(SerializeError::Truncated {
                expected: HEADER_LEN,
                found: bytes.len(),
            })
        }
    };
    let found = Version { major, minor, patch };
    if found != VERSION {
        return Err(SerializeError::VersionMismatch {
            found,
            expected: VERSION,
        });
    }
    Ok(found)
}
