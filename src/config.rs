// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Explicit configuration, replacing the prototype's module-level
//! `conf.py`/`mconf.py` globals (spec.md §9 REDESIGN FLAGS).

use crate::bloom::BloomFilter;
use crate::stats::PrefixStats;

/// Which IP protocol a filter was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolWidth {
    /// IPv4: 32-bit addresses, 5-bit length encoding.
    V4,
    /// IPv6: 128-bit addresses, 7-bit length encoding.
    V6,
}

impl ProtocolWidth {
    /// Address width `W` in bits.
    #[must_use]
    pub fn width(self) -> u8 {
        match self {
            Self::V4 => 32,
            Self::V6 => 128,
        }
    }

    /// Encoding width `E`: bits used to encode a BMP length index
    /// (spec.md §3: `E = 5` for v4, `E = 7` for v6).
    #[must_use]
    pub fn encoding_width(self) -> u8 {
        match self {
            Self::V4 => 5,
            Self::V6 => 7,
        }
    }
}

/// Explicit configuration value threaded through build and lookup entry
/// points, replacing the source's global `conf`/`mconf` modules (spec.md
/// §9 REDESIGN FLAGS: "global path state ... replace with an explicit
/// configuration value").
#[derive(Debug, Clone)]
pub struct FilterConfig {
    /// Protocol and width.
    pub protocol: ProtocolWidth,
    /// Distinct prefix lengths present and their index table.
    pub stats: PrefixStats,
    /// Target false-positive probability the filter was sized from, if any.
    pub fpp: Option<f64>,
    /// Number of hash functions `k`.
    pub k: usize,
    /// Bit count `m`.
    pub m: usize,
}

impl FilterConfig {
    /// Snapshots `protocol`, `stats` and the sizing the builder chose for
    /// `filter` into one value, built once after the guided filter is
    /// constructed and shared by reference with every build/lookup entry
    /// point from then on (spec.md §9 REDESIGN FLAGS).
    #[must_use]
    pub fn new(protocol: ProtocolWidth, stats: PrefixStats, filter: &BloomFilter) -> Self {
        Self {
            protocol,
            stats,
            fpp: filter.fpp(),
            k: filter.k(),
            m: filter.m(),
        }
    }

    /// Encoding width `E` for this config's protocol.
    #[must_use]
    pub fn encoding_width(&self) -> u8 {
        self.protocol.encoding_width()
    }

    /// `2^E - 1`, the "BMP is the marker length itself" sentinel value
    /// used during guided lookup decoding (spec.md §4.6).
    #[must_use]
    pub fn self_bmp_sentinel(&self) -> u64 {
        (1u64 << self.encoding_width()) - 1
    }
}
