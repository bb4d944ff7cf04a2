// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use std::fmt;

/// A structural pre-condition was violated.
///
/// These are contract violations (invalid `k`, out-of-range prefix length,
/// build called out of order) rather than routine lookup misses, and are
/// always fatal: callers should not attempt to recover from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractError {
    /// Number of hash functions `k` must be at least 1.
    ZeroHashFunctions,

    /// Bit count `m` must be at least `k`.
    FilterTooSmall {
        /// configured bit count
        m: usize,
        /// configured hash function count
        k: usize,
    },

    /// A prefix length exceeded the protocol width.
    PrefixLengthOutOfRange {
        /// offending length
        length: u8,
        /// protocol width
        width: u8,
    },

    /// Prefixes were not presented to the builder in non-decreasing length order.
    UnsortedBuildOrder {
        /// length of the out-of-order prefix
        got: u8,
        /// length of the previously inserted prefix
        previous: u8,
    },
}

impl fmt::Display for ContractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroHashFunctions => write!(f, "bloom filter needs k >= 1 hash functions"),
            Self::FilterTooSmall { m, k } => {
                write!(f, "bloom filter bit count m={m} must be >= k={k}")
            }
            Self::PrefixLengthOutOfRange { length, width } => {
                write!(f, "prefix length {length} exceeds protocol width {width}")
            }
            Self::UnsortedBuildOrder { got, previous } => write!(
                f,
                "prefixes must be inserted in non-decreasing length order, got length {got} after {previous}"
            ),
        }
    }
}

impl std::error::Error for ContractError {}

/// A line in an external input file (FIB, prefix, weight or traffic file)
/// did not match the expected format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFormatError {
    /// 1-based line number in the offending file
    pub line: usize,
    /// human-readable explanation
    pub message: String,
}

impl fmt::Display for InputFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed input at line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for InputFormatError {}

/// Errors surfaced by this crate.
///
/// Routine lookup misses are never represented here: a miss is a returned
/// default route, not an `Err`. See [`ContractError`] and [`InputFormatError`].
#[derive(Debug)]
pub enum Error {
    /// A structural pre-condition was violated.
    Contract(ContractError),

    /// An external input file was malformed.
    InputFormat(InputFormatError),

    /// I/O error while reading an external input file.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Contract(e) => write!(f, "IpFilterError: {e}"),
            Self::InputFormat(e) => write!(f, "IpFilterError: {e}"),
            Self::Io(e) => write!(f, "IpFilterError: {e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<ContractError> for Error {
    fn from(value: ContractError) -> Self {
        Self::Contract(value)
    }
}

impl From<InputFormatError> for Error {
    fn from(value: InputFormatError) -> Self {
        Self::InputFormat(value)
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;
