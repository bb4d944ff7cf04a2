// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! The linear reference lookup scheme (spec.md §4.7, Component I): probe
//! every represented prefix length from longest to shortest.

use crate::bloom::BloomFilter;
use crate::codec::{mask_high_bits, PackedKey};
use crate::config::FilterConfig;
use crate::fib::Fib;

/// Looks up `address` by probing every length from `config.stats.maxx` down
/// to `config.stats.minn`, consulting `fib` on every Bloom hit.
#[must_use]
pub fn lookup<'a, V>(
    address: u128,
    config: &FilterConfig,
    filter: &BloomFilter,
    fib: &'a Fib<V>,
) -> Option<&'a V> {
    let width = config.protocol.width();
    let stats = &config.stats;
    let k = filter.k();

    for length in (stats.minn..=stats.maxx).rev() {
        let masked = mask_high_bits(address, length, width);
        let key = PackedKey::new(masked, length);
        if filter.contains_all(&key.hash_bytes(), 0..k) {
            log::trace!("linear probe hit at length {length}");
            if let Some(value) = fib.get(&key) {
                return Some(value);
            }
        }
    }

    None
}
