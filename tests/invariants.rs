use ipfilter::weights::WeightProfile;
use ipfilter::{
    guided, linear, obst, BloomFilter, Fib, FilterConfig, PackedKey, PrefixStats, ProtocolWidth,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

struct Fixture {
    config: FilterConfig,
    tree: obst::Node,
    filter: BloomFilter,
    fib: Fib<String>,
    prefixes: Vec<(u128, u8)>,
}

fn build_fixture(mut prefixes: Vec<(u128, u8)>) -> Fixture {
    prefixes.sort_by_key(|&(_, l)| l);

    let mut fib: Fib<String> = Fib::new();
    for &(value, length) in &prefixes {
        fib.insert(PackedKey::new(value, length), format!("{value}/{length}"));
    }

    let stats = PrefixStats::from_lengths(prefixes.iter().map(|&(_, l)| l));
    let lens: Vec<u8> = prefixes.iter().map(|&(_, l)| l).collect();
    let weights = WeightProfile::ByPrefixCount.resolve(&stats, &lens, 32);
    let tree = obst::build(stats.lengths(), &weights);

    let mut filter = BloomFilter::with_m_and_k(8_192, 16).unwrap();
    let config = FilterConfig::new(ProtocolWidth::V4, stats, &filter);
    guided::build(&prefixes, &config, &fib, &tree, &mut filter).unwrap();

    Fixture {
        config,
        tree,
        filter,
        fib,
        prefixes,
    }
}

fn random_fixture() -> Fixture {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut prefixes = Vec::new();
    for len in [0u8, 8, 12, 16, 20, 24, 28, 32] {
        for _ in 0..50 {
            let raw: u128 = u128::from(rng.random::<u32>());
            let masked = ipfilter::mask_high_bits(raw, len, 32);
            prefixes.push((masked, len));
        }
    }
    build_fixture(prefixes)
}

#[test]
fn invariant_membership() {
    let fixture = random_fixture();
    let k = fixture.filter.k();
    for &(value, length) in &fixture.prefixes {
        let key = PackedKey::new(value, length);
        assert!(
            fixture.filter.contains_all(&key.hash_bytes(), 0..k),
            "prefix {value}/{length} not a member of its own filter"
        );
    }
}

#[test]
fn invariant_marker_presence() {
    let fixture = random_fixture();

    for &(value, length) in &fixture.prefixes {
        let mut current = &fixture.tree;
        loop {
            if length < current.value {
                match current.left.as_deref() {
                    Some(next) => current = next,
                    None => break,
                }
            } else if length == current.value {
                break;
            } else {
                let marker_len = current.value;
                let masked = ipfilter::mask_high_bits(value, marker_len, 32);
                let marker_key = PackedKey::new(masked, marker_len);
                assert!(
                    fixture.filter.contains_all(&marker_key.hash_bytes(), 0..1),
                    "missing presence bit for marker {marker_len} of prefix {value}/{length}"
                );
                match current.right.as_deref() {
                    Some(next) => current = next,
                    None => break,
                }
            }
        }
    }
}

// spec.md §4.6 notes that the guided state machine is "correct modulo false
// positives": a presence-bit or pattern-bit collision can make it disagree
// with the linear reference on rare addresses. It must still agree on the
// overwhelming majority of traffic.
#[test]
fn invariant_lpm_equivalence_under_random_traffic() {
    let fixture = random_fixture();
    let mut rng = ChaCha8Rng::seed_from_u64(99);

    let trials = 20_000;
    let mut mismatches = 0usize;
    for _ in 0..trials {
        let ip: u128 = u128::from(rng.random::<u32>());
        let guided = guided::lookup(
            ip,
            &fixture.config,
            &fixture.tree,
            &fixture.filter,
            &fixture.fib,
        );
        let linear = linear::lookup(ip, &fixture.config, &fixture.filter, &fixture.fib);
        if guided != linear {
            mismatches += 1;
        }
    }

    let rate = mismatches as f64 / trials as f64;
    assert!(
        rate < 0.01,
        "guided lookup disagreed with linear on {mismatches}/{trials} addresses ({rate:.4})"
    );
}
