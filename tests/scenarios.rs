use ipfilter::weights::WeightProfile;
use ipfilter::{
    guided, linear, obst, BloomFilter, Fib, FilterConfig, PackedKey, PrefixStats, ProtocolWidth,
};

fn build(
    prefixes: Vec<(u128, u8)>,
    m: usize,
    k: usize,
) -> (FilterConfig, obst::Node, BloomFilter, Fib<String>) {
    let mut sorted = prefixes.clone();
    sorted.sort_by_key(|&(_, l)| l);

    let mut fib: Fib<String> = Fib::new();
    let stats = PrefixStats::from_lengths(sorted.iter().map(|&(_, l)| l));

    for &(value, length) in &sorted {
        let label = match (value, length) {
            (0, 0) => "default".to_string(),
            (16_777_216, 24) => "1.0.0.0/24".to_string(),
            (3_221_225_472, 9) => "192.0.0.0/9".to_string(),
            (v, l) => format!("{v}/{l}"),
        };
        fib.insert(PackedKey::new(value, length), label);
    }

    let weights = WeightProfile::Equal.resolve(
        &stats,
        &sorted.iter().map(|&(_, l)| l).collect::<Vec<_>>(),
        32,
    );
    let tree = obst::build(stats.lengths(), &weights);

    let mut filter = BloomFilter::with_m_and_k(m, k).unwrap();
    let config = FilterConfig::new(ProtocolWidth::V4, stats, &filter);
    guided::build(&sorted, &config, &fib, &tree, &mut filter).unwrap();

    (config, tree, filter, fib)
}

#[test]
fn s1_default_route() {
    let (config, tree, filter, fib) = build(vec![(0, 0)], 4_096, 12);

    let guided_hit = guided::lookup(0x0808_0808, &config, &tree, &filter, &fib);
    let linear_hit = linear::lookup(0x0808_0808, &config, &filter, &fib);

    assert_eq!(guided_hit.map(String::as_str), Some("default"));
    assert_eq!(linear_hit.map(String::as_str), Some("default"));
}

#[test]
fn s2_exact_match() {
    let (config, tree, filter, fib) = build(vec![(16_777_216, 24)], 4_096, 12);

    let guided_hit = guided::lookup(16_777_216, &config, &tree, &filter, &fib);
    let linear_hit = linear::lookup(16_777_216, &config, &filter, &fib);

    assert_eq!(guided_hit.map(String::as_str), Some("1.0.0.0/24"));
    assert_eq!(linear_hit.map(String::as_str), Some("1.0.0.0/24"));
}

#[test]
fn s3_lpm_via_marker() {
    let (config, tree, filter, fib) = build(vec![(3_221_225_472, 9)], 4_096, 12);

    let guided_hit = guided::lookup(3_221_225_600, &config, &tree, &filter, &fib);
    let linear_hit = linear::lookup(3_221_225_600, &config, &filter, &fib);

    assert_eq!(guided_hit.map(String::as_str), Some("192.0.0.0/9"));
    assert_eq!(linear_hit.map(String::as_str), Some("192.0.0.0/9"));
}

#[test]
fn s4_no_match() {
    let (config, tree, filter, fib) = build(vec![(3_221_225_472, 9)], 4_096, 12);

    let guided_hit = guided::lookup(16_777_215, &config, &tree, &filter, &fib);
    let linear_hit = linear::lookup(16_777_215, &config, &filter, &fib);

    assert_eq!(guided_hit, None);
    assert_eq!(linear_hit, None);
}

#[test]
fn s5_fallback_triggered_on_corrupted_decode() {
    // A deliberately tiny, collision-prone filter (small m, many prefixes)
    // so that read_bits at the deepest hit very likely yields c >= |lengths|,
    // forcing the guided lookup into Fallback. Both schemes must still agree.
    let prefixes: Vec<(u128, u8)> = (0..200u128)
        .map(|i| ((i << 16) as u128 & 0xFFFF_0000, 16))
        .chain(std::iter::once((0u128, 0u8)))
        .collect();
    let (config, tree, filter, fib) = build(prefixes.clone(), 64, 8);

    for &(value, _) in &prefixes {
        let guided_hit = guided::lookup(value, &config, &tree, &filter, &fib);
        let linear_hit = linear::lookup(value, &config, &filter, &fib);
        assert_eq!(guided_hit, linear_hit, "mismatch for {value:#x}");
    }
}

#[test]
fn s6_pattern_codec_zero_pattern_writes_nothing() {
    let mut filter = BloomFilter::with_m_and_k(1_000, 1).unwrap();
    let key = PackedKey::new(3_221_225_472, 22);
    filter.insert_pattern(&key.hash_bytes(), 3, 0);
    assert_eq!(filter.read_bits(&key.hash_bytes(), 3..8), 0);
}
