// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! IP longest-prefix match over a guided Bloom filter index.
//!
//! Two lookup disciplines share one filter: [`linear::lookup`] probes every
//! represented prefix length from longest to shortest, and
//! [`guided::lookup`] walks a precomputed [`obst`] over prefix lengths,
//! using a Bloom-filter fingerprint at each positive probe to jump directly
//! to the likely best-matching prefix, falling back to linear search when a
//! decode looks untrustworthy.
//!
//! # Example
//!
//! ```
//! use ipfilter::prelude::*;
//!
//! let prefixes = vec![(0u128, 0u8), (0xC000_0000, 9)];
//! let stats = PrefixStats::from_lengths(prefixes.iter().map(|&(_, l)| l));
//! let weights = WeightProfile::Equal.resolve(&stats, &[0, 9], ProtocolWidth::V4.width());
//! let tree = obst::build(stats.lengths(), &weights);
//!
//! let mut fib: Fib<String> = Fib::new();
//! fib.insert(PackedKey::new(0, 0), "default".to_string());
//! fib.insert(PackedKey::new(0xC000_0000, 9), "192.0.0.0/9".to_string());
//!
//! let mut filter = BloomFilter::with_m_and_k(4_096, 12)?;
//! let config = FilterConfig::new(ProtocolWidth::V4, stats, &filter);
//! guided::build(&prefixes, &config, &fib, &tree, &mut filter)?;
//!
//! let hit = guided::lookup(3_221_225_600, &config, &tree, &filter, &fib);
//! assert_eq!(hit.map(String::as_str), Some("192.0.0.0/9"));
//! # Ok::<(), ipfilter::Error>(())
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::missing_const_for_fn, clippy::module_name_repetitions)]

pub mod bloom;
pub mod codec;
pub mod config;
pub mod error;
pub mod fib;
pub mod guided;
pub mod hash;
pub mod ingest;
pub mod linear;
pub mod obst;
pub mod stats;
pub mod weights;

pub use bloom::BloomFilter;
pub use codec::{mask_high_bits, pack, PackedKey};
pub use config::{FilterConfig, ProtocolWidth};
pub use error::{ContractError, Error, InputFormatError, Result};
pub use fib::Fib;
pub use obst::Node;
pub use stats::PrefixStats;
pub use weights::WeightProfile;

/// Convenience re-export of the crate's most commonly used items.
pub mod prelude {
    pub use crate::{
        bloom::BloomFilter, codec::PackedKey, config::FilterConfig, config::ProtocolWidth,
        fib::Fib, guided, linear, obst, stats::PrefixStats, weights::WeightProfile, Error,
    };
}
