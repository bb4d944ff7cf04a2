//! The guided filter builder and guided lookup state machine (spec.md §4.5,
//! §4.6; Components F and G), grounded on
//! `original_source/prototype/ipfilter.py`'s `_build_guided_bloom` and
//! `_guided_lookup_bloom`.

use crate::bloom::BloomFilter;
use crate::codec::{mask_high_bits, PackedKey};
use crate::config::FilterConfig;
use crate::error::ContractError;
use crate::fib::Fib;
use crate::obst::Node;
use crate::stats::PrefixStats;

/// Computes BMP(P, L) as a length-table index: the index of the largest
/// already-present length `L' < L` such that `P` masked to `L'` is a key in
/// `fib`, or `0` (the sentinel/default slot) if none.
fn bmp_index<V>(value: u128, length: u8, width: u8, fib: &Fib<V>, stats: &PrefixStats) -> u64 {
    for &candidate in stats.lengths().iter().rev() {
        if candidate < length {
            let masked = mask_high_bits(value, candidate, width);
            let key = PackedKey::new(masked, candidate);
            if fib.contains(&key) {
                return stats.len2ix(candidate).unwrap_or(0) as u64;
            }
        }
    }
    0
}

/// Walks `tree` from the root for a single prefix `(value, length)`,
/// installing a presence marker plus BMP fingerprint at every ancestor
/// length greater than `length`, then inserting the prefix itself once the
/// matching tree node is reached (spec.md §4.5).
fn install(value: u128, length: u8, bmp_ix: u64, width: u8, tree: &Node, filter: &mut BloomFilter) {
    let mut current = tree;
    let mut count_hit: usize = 0;

    loop {
        if length < current.value {
            match current.left.as_deref() {
                Some(next) => current = next,
                None => break,
            }
        } else if length == current.value {
            let key = PackedKey::new(value, length);
            filter.insert(&key.hash_bytes(), 0..filter.k());
            log::trace!("installed exact prefix {value}/{length}");
            break;
        } else {
            let marker_len = current.value;
            let masked = mask_high_bits(value, marker_len, width);
            let marker_key = PackedKey::new(masked, marker_len);

            filter.insert(&marker_key.hash_bytes(), 0..1);
            count_hit += 1;
            filter.insert_pattern(&marker_key.hash_bytes(), count_hit, bmp_ix);
            log::trace!(
                "installed marker at length {marker_len} for prefix {value}/{length} (bmp_ix={bmp_ix})"
            );

            match current.right.as_deref() {
                Some(next) => current = next,
                None => break,
            }
        }
    }
}

/// Builds the guided Bloom filter from `prefixes` (must already be in
/// ascending length order — see spec.md §5 build-ordering invariant) against
/// a fully-populated `fib` and the finalized length `tree`.
///
/// `config` is built once by the caller from the already-sized `filter`
/// (spec.md §9 REDESIGN FLAGS) and is shared by reference with
/// [`lookup`]; only `filter`'s bits change during this call.
///
/// # Errors
/// Returns [`ContractError::PrefixLengthOutOfRange`] if a prefix length
/// exceeds the configured protocol's width, or
/// [`ContractError::UnsortedBuildOrder`] if prefixes are not in
/// non-decreasing length order.
pub fn build<V>(
    prefixes: &[(u128, u8)],
    config: &FilterConfig,
    fib: &Fib<V>,
    tree: &Node,
    filter: &mut BloomFilter,
) -> Result<(), ContractError> {
    let width = config.protocol.width();
    let mut previous: Option<u8> = None;

    log::debug!(
        "building guided filter for {} prefixes (protocol {:?}, m={}, k={})",
        prefixes.len(),
        config.protocol,
        filter.m(),
        filter.k()
    );
    let start = std::time::Instant::now();

    for &(value, length) in prefixes {
        if length > width {
            return Err(ContractError::PrefixLengthOutOfRange { length, width });
        }
        if let Some(prev) = previous {
            if length < prev {
                return Err(ContractError::UnsortedBuildOrder {
                    got: length,
                    previous: prev,
                });
            }
        }
        previous = Some(length);

        let bmp_ix = bmp_index(value, length, width, fib, &config.stats);
        install(value, length, bmp_ix, width, tree, filter);
    }

    log::debug!(
        "guided filter build finished in {:?}, popcount={}",
        start.elapsed(),
        filter.popcount()
    );

    Ok(())
}

fn default_route<V>(fib: &Fib<V>) -> Option<&V> {
    fib.get(&PackedKey::new(0, 0))
}

/// Looks up `address` by walking `tree` (the `Descend` state), then decoding
/// the deepest hit (the `Decode` state), falling back to linear search when
/// the decode looks untrustworthy (the `Fallback` state). See spec.md §4.6.
#[must_use]
pub fn lookup<'a, V>(
    address: u128,
    config: &FilterConfig,
    tree: &Node,
    filter: &BloomFilter,
    fib: &'a Fib<V>,
) -> Option<&'a V> {
    let width = config.protocol.width();
    let mut current = tree;
    let mut hits: usize = 0;
    let mut last_hit_len: u8 = 0;

    loop {
        let masked = mask_high_bits(address, current.value, width);
        let key = PackedKey::new(masked, current.value);
        let hit = filter.contains_all(&key.hash_bytes(), 0..1);
        log::trace!("descend: node length={} hit={}", current.value, hit);

        let next = if hit {
            hits += 1;
            last_hit_len = current.value;
            current.right.as_deref()
        } else {
            current.left.as_deref()
        };

        match next {
            Some(node) => current = node,
            None => break,
        }
    }

    if hits == 0 {
        log::trace!("descend found no markers, returning default route");
        return default_route(fib);
    }

    decode(address, config, last_hit_len, hits, filter, fib)
}

fn decode<'a, V>(
    address: u128,
    config: &FilterConfig,
    last_hit_len: u8,
    hits: usize,
    filter: &BloomFilter,
    fib: &'a Fib<V>,
) -> Option<&'a V> {
    let width = config.protocol.width();
    let e = usize::from(config.encoding_width());
    let k = filter.k();
    let start = hits;
    let stats = &config.stats;

    let masked = mask_high_bits(address, last_hit_len, width);
    let k_last = PackedKey::new(masked, last_hit_len);
    let c = filter.read_bits(&k_last.hash_bytes(), start..start + e);
    let sentinel = config.self_bmp_sentinel();
    log::trace!("decode at last_hit_len={last_hit_len}, start={start}: c={c}, sentinel={sentinel}");

    if c == sentinel {
        if start + e < k
            && filter.contains_all(&k_last.hash_bytes(), start + e..k)
            && fib.contains(&k_last)
        {
            return fib.get(&k_last);
        }
        log::trace!("sentinel decode unverified, falling back below {last_hit_len}");
        return fallback(address, config, last_hit_len.saturating_sub(1), filter, fib);
    }

    if c as usize >= stats.cardinality() {
        log::trace!("decoded index {c} out of range, falling back below {last_hit_len}");
        return fallback(address, config, last_hit_len.saturating_sub(1), filter, fib);
    }

    if c == 0 {
        return default_route(fib);
    }

    let l_h = stats
        .ix2len(c as usize)
        .expect("c < cardinality checked above");
    if l_h >= last_hit_len {
        log::trace!("decoded length {l_h} not shorter than marker {last_hit_len}, falling back");
        return fallback(address, config, last_hit_len.saturating_sub(1), filter, fib);
    }

    let a_h = mask_high_bits(address, l_h, width);
    let k_h = PackedKey::new(a_h, l_h);
    if filter.contains_all(&k_h.hash_bytes(), start + e..k) && fib.contains(&k_h) {
        return fib.get(&k_h);
    }

    log::trace!("decoded candidate length {l_h} unverified, falling back below {last_hit_len}");
    fallback(address, config, last_hit_len.saturating_sub(1), filter, fib)
}

fn fallback<'a, V>(
    address: u128,
    config: &FilterConfig,
    upper: u8,
    filter: &BloomFilter,
    fib: &'a Fib<V>,
) -> Option<&'a V> {
    let width = config.protocol.width();
    let stats = &config.stats;
    let k = filter.k();

    if upper >= stats.minn {
        for length in (stats.minn..=upper).rev() {
            let masked = mask_high_bits(address, length, width);
            let key = PackedKey::new(masked, length);
            if filter.contains_all(&key.hash_bytes(), 0..k) {
                if let Some(value) = fib.get(&key) {
                    return Some(value);
                }
            }
        }
    }

    default_route(fib)
}
