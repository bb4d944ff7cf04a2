//! 64-bit FNV-1a hashing of packed prefix keys.
//!
//! See <https://en.wikipedia.org/wiki/Fowler%E2%80%93Noll%E2%80%93Vo_hash_function>.

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0001_0000_01b3;

/// FNV-1a over the little-endian byte representation of a packed key.
///
/// Packed keys (see [`crate::codec`]) can be up to 135 bits wide for IPv6
/// (128-bit address plus a 7-bit length field), wider than any native
/// integer, so the key is hashed as a canonical byte string rather than as
/// an integer.
#[must_use]
pub fn fnv1a64(bytes: &[u8]) -> u64 {
    let mut h = FNV_OFFSET_BASIS;
    for &byte in bytes {
        h ^= u64::from(byte);
        h = h.wrapping_mul(FNV_PRIME);
    }
    h
}

/// Splits a 64-bit hash into its lower and upper 32-bit halves, used to
/// derive the double-hashing sequence `h_i = (lo + i * hi) mod m`.
#[must_use]
pub fn split(h: u64) -> (u64, u64) {
    (h & 0xFFFF_FFFF, h >> 32)
}
