// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! External input-file loaders (spec.md §6). Malformed lines raise
//! [`InputFormatError`], never panic — these collaborators sit outside the
//! CORE's contract-error boundary.

use crate::codec::PackedKey;
use crate::config::ProtocolWidth;
use crate::error::{InputFormatError, Result};
use crate::fib::Fib;
use std::io::BufRead;

fn malformed(line: usize, message: impl Into<String>) -> InputFormatError {
    InputFormatError {
        line,
        message: message.into(),
    }
}

/// Loads a FIB from lines of `prefix_int prefix_len cidr_string`.
pub fn load_fib(reader: impl BufRead, protocol: ProtocolWidth) -> Result<Fib<String>> {
    let mut fib = Fib::new();
    for (ix, line) in reader.lines().enumerate() {
        let line_no = ix + 1;
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        log::trace!("fib line {line_no}: {line}");

        let mut parts = line.splitn(3, ' ');
        let value_str = parts
            .next()
            .ok_or_else(|| malformed(line_no, "missing prefix_int field"))?;
        let length_str = parts
            .next()
            .ok_or_else(|| malformed(line_no, "missing prefix_len field"))?;
        let cidr = parts
            .next()
            .ok_or_else(|| malformed(line_no, "missing cidr_string field"))?;

        let value: u128 = value_str
            .parse()
            .map_err(|_| malformed(line_no, format!("invalid prefix_int {value_str:?}")))?;
        let length: u8 = length_str
            .parse()
            .map_err(|_| malformed(line_no, format!("invalid prefix_len {length_str:?}")))?;
        if length > protocol.width() {
            return Err(malformed(
                line_no,
                format!(
                    "prefix_len {length} exceeds protocol width {}",
                    protocol.width()
                ),
            )
            .into());
        }

        fib.insert(PackedKey::new(value, length), cidr.to_string());
    }
    log::debug!("loaded fib: {} entries", fib.len());
    Ok(fib)
}

/// Loads `(prefix_int, prefix_len)` pairs, same format as [`load_fib`],
/// sorted ascending by length on ingest (spec.md §6).
pub fn load_prefixes(reader: impl BufRead, protocol: ProtocolWidth) -> Result<Vec<(u128, u8)>> {
    let mut out = Vec::new();
    for (ix, line) in reader.lines().enumerate() {
        let line_no = ix + 1;
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut parts = line.splitn(3, ' ');
        let value_str = parts
            .next()
            .ok_or_else(|| malformed(line_no, "missing prefix_int field"))?;
        let length_str = parts
            .next()
            .ok_or_else(|| malformed(line_no, "missing prefix_len field"))?;

        let value: u128 = value_str
            .parse()
            .map_err(|_| malformed(line_no, format!("invalid prefix_int {value_str:?}")))?;
        let length: u8 = length_str
            .parse()
            .map_err(|_| malformed(line_no, format!("invalid prefix_len {length_str:?}")))?;
        if length > protocol.width() {
            return Err(malformed(
                line_no,
                format!(
                    "prefix_len {length} exceeds protocol width {}",
                    protocol.width()
                ),
            )
            .into());
        }

        out.push((value, length));
    }
    out.sort_by_key(|&(_, length)| length);
    log::debug!("loaded {} prefixes", out.len());
    Ok(out)
}

/// Loads per-length weight fractions from a CSV-style file: first column a
/// label, remaining columns per-length fractions indexed `0..width`. Only
/// fractions `> 0` are kept, paired with their length index (spec.md §6).
pub fn load_weights(reader: impl BufRead) -> Result<Vec<(usize, f64)>> {
    let mut out = Vec::new();
    for (ix, line) in reader.lines().enumerate() {
        let line_no = ix + 1;
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut fields = line.split(',');
        fields
            .next()
            .ok_or_else(|| malformed(line_no, "missing label field"))?;

        for (length, field) in fields.enumerate() {
            let field = field.trim();
            if field.is_empty() {
                continue;
            }
            let fraction: f64 = field
                .parse()
                .map_err(|_| malformed(line_no, format!("invalid fraction {field:?}")))?;
            if fraction > 0.0 {
                out.push((length, fraction));
            }
        }
    }
    log::debug!("loaded {} weight fractions", out.len());
    Ok(out)
}

/// Loads traffic addresses from lines of `ip_int ip_str`; only `ip_int` is
/// used (spec.md §6).
pub fn load_traffic(reader: impl BufRead) -> Result<Vec<u128>> {
    let mut out = Vec::new();
    for (ix, line) in reader.lines().enumerate() {
        let line_no = ix + 1;
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let ip_str = line
            .split(' ')
            .next()
            .ok_or_else(|| malformed(line_no, "missing ip_int field"))?;
        let ip: u128 = ip_str
            .parse()
            .map_err(|_| malformed(line_no, format!("invalid ip_int {ip_str:?}")))?;
        out.push(ip);
    }
    log::debug!("loaded {} traffic addresses", out.len());
    Ok(out)
}
