// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! CLI driver for building a guided Bloom filter from a FIB and prefix list,
//! then looking up addresses against it or replaying traffic (spec.md §6).

use clap::{Parser, Subcommand, ValueEnum};
use ipfilter::{
    guided, ingest, linear, obst, weights::WeightProfile, FilterConfig, PrefixStats, ProtocolWidth,
};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "ipfilter",
    about = "IP longest-prefix match over a guided Bloom filter"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum Protocol {
    V4,
    V6,
}

impl From<Protocol> for ProtocolWidth {
    fn from(value: Protocol) -> Self {
        match value {
            Protocol::V4 => Self::V4,
            Protocol::V6 => Self::V6,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Build a guided filter from a FIB and prefix list, then run one lookup.
    Build {
        #[arg(long)]
        fib: PathBuf,
        #[arg(long)]
        prefixes: PathBuf,
        #[arg(long, value_enum, default_value_t = Protocol::V4)]
        protocol: Protocol,
        #[arg(long, default_value_t = 0.01)]
        fpp: f64,
        #[arg(long)]
        lookup: Option<u128>,
    },
    /// Look up a single address (requires --fib and --prefixes to rebuild).
    Lookup {
        #[arg(long)]
        fib: PathBuf,
        #[arg(long)]
        prefixes: PathBuf,
        #[arg(long, value_enum, default_value_t = Protocol::V4)]
        protocol: Protocol,
        #[arg(long)]
        ip: u128,
        #[arg(long)]
        linear: bool,
    },
    /// Replay a traffic file against both lookup schemes and report timing.
    Benchmark {
        #[arg(long)]
        fib: PathBuf,
        #[arg(long)]
        prefixes: PathBuf,
        #[arg(long, value_enum, default_value_t = Protocol::V4)]
        protocol: Protocol,
        #[arg(long)]
        traffic: PathBuf,
    },
}

fn build_index(
    fib_path: &PathBuf,
    prefixes_path: &PathBuf,
    protocol: ProtocolWidth,
    fpp: f64,
) -> ipfilter::Result<(
    FilterConfig,
    obst::Node,
    ipfilter::BloomFilter,
    ipfilter::Fib<String>,
    Vec<(u128, u8)>,
)> {
    let fib = ingest::load_fib(BufReader::new(File::open(fib_path)?), protocol)?;
    let prefixes = ingest::load_prefixes(BufReader::new(File::open(prefixes_path)?), protocol)?;

    let stats = PrefixStats::from_lengths(prefixes.iter().map(|&(_, l)| l));
    let weights = WeightProfile::Equal.resolve(
        &stats,
        &prefixes.iter().map(|&(_, l)| l).collect::<Vec<_>>(),
        protocol.width(),
    );
    let tree = obst::build(stats.lengths(), &weights);

    let mut filter = ipfilter::BloomFilter::with_fpp(prefixes.len().max(1), fpp);
    let config = FilterConfig::new(protocol, stats, &filter);
    guided::build(&prefixes, &config, &fib, &tree, &mut filter)?;

    log::info!(
        "built filter: {} prefixes, m={}, k={}, popcount={}",
        prefixes.len(),
        filter.m(),
        filter.k(),
        filter.popcount()
    );

    Ok((config, tree, filter, fib, prefixes))
}

fn run() -> ipfilter::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Build {
            fib,
            prefixes,
            protocol,
            fpp,
            lookup,
        } => {
            let protocol: ProtocolWidth = protocol.into();
            let (config, tree, filter, fib, _) = build_index(&fib, &prefixes, protocol, fpp)?;
            if let Some(ip) = lookup {
                let hit = guided::lookup(ip, &config, &tree, &filter, &fib);
                println!("{}", hit.map_or("none", String::as_str));
            }
        }
        Command::Lookup {
            fib,
            prefixes,
            protocol,
            ip,
            linear: use_linear,
        } => {
            let protocol: ProtocolWidth = protocol.into();
            let (config, tree, filter, fib, _) = build_index(&fib, &prefixes, protocol, 0.01)?;
            let hit = if use_linear {
                linear::lookup(ip, &config, &filter, &fib)
            } else {
                guided::lookup(ip, &config, &tree, &filter, &fib)
            };
            println!("{}", hit.map_or("none", String::as_str));
        }
        Command::Benchmark {
            fib,
            prefixes,
            protocol,
            traffic,
        } => {
            let protocol: ProtocolWidth = protocol.into();
            let (config, tree, filter, fib, _) = build_index(&fib, &prefixes, protocol, 0.01)?;
            let addresses = ingest::load_traffic(BufReader::new(File::open(traffic)?))?;

            let start = std::time::Instant::now();
            for &ip in &addresses {
                let _ = guided::lookup(ip, &config, &tree, &filter, &fib);
            }
            let guided_elapsed = start.elapsed();

            let start = std::time::Instant::now();
            for &ip in &addresses {
                let _ = linear::lookup(ip, &config, &filter, &fib);
            }
            let linear_elapsed = start.elapsed();

            println!(
                "{} lookups: guided {:?}, linear {:?}",
                addresses.len(),
                guided_elapsed,
                linear_elapsed
            );
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ipfilter: {err}");
            ExitCode::FAILURE
        }
    }
}
