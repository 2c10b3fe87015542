// This file is part of boardctl, an application to access registers and DMA regions of memory mapped hardware boards.
//
// Copyright 2025 Canonical Ltd.
//
// SPDX-License-Identifier: GPL-3.0-only
//
// boardctl is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License version 3, as published by the Free Software Foundation.
//
// boardctl is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranties of MERCHANTABILITY, SATISFACTORY QUALITY, or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with this program.  If not, see http://www.gnu.org/licenses/.

//! Register map file parser.
//!
//! Each non-comment line describes one register:
//!
//! ```text
//! # name                 n_elements  address  n_bytes  bar  width  frac  signed
//! BOARD.WORD_FIRMWARE    1           0x0      4        0    32     0     0
//! ADC.AREA_DMA           1024        0x0      4096     2
//! ```
//!
//! Trailing columns may be omitted (bar 0, width 32, no fractional bits, signed). Lines starting
//! with `#` are comments, lines starting with `@` carry metadata and are skipped.
//!
//! Multiplexed data regions are declared by a `MODULE.AREA_MULTIPLEXED_SEQUENCE_<NAME>` entry for
//! the memory area plus one `MODULE.SEQUENCE_<NAME>_<i>` entry per channel, numbered from 0. The
//! channel entries only contribute their fixed point description; samples of all channels are
//! interleaved word by word inside the area. The region appears in the catalogue as
//! `MODULE/<NAME>`, and the area itself stays a plain register of `n_bytes / 4` raw words so the
//! whole transfer can be read with `read_dma_raw`.

use crate::catalogue::{ChannelInfo, RegisterCatalogue, RegisterInfo, RegisterPath};
use crate::config;
use crate::error::BoardError;
use crate::system_io::fs_read;
use log::{debug, trace};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone)]
struct MapEntry {
    line: usize,
    path: RegisterPath,
    elements: usize,
    address: u64,
    bytes: usize,
    bar: u8,
    channel: ChannelInfo,
}

/// Parse a decimal or `0x` prefixed hexadecimal number.
fn parse_number<T>(token: &str) -> Option<T>
where
    T: TryFrom<u64>,
{
    let value = match token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16).ok()?,
        None => token.parse::<u64>().ok()?,
    };
    T::try_from(value).ok()
}

fn parse_line(file: &Path, line: usize, text: &str) -> Result<MapEntry, BoardError> {
    let err = |msg: String| BoardError::MapFile {
        file: file.into(),
        line,
        msg,
    };
    let columns: Vec<&str> = text.split_whitespace().collect();
    if columns.len() < 4 {
        return Err(err(format!(
            "expected at least 4 columns (name, elements, address, bytes), found {}",
            columns.len()
        )));
    }
    if columns.len() > 8 {
        return Err(err(format!(
            "expected at most 8 columns, found {}",
            columns.len()
        )));
    }

    let column = |index: usize, what: &str| -> Result<Option<u64>, BoardError> {
        match columns.get(index) {
            None => Ok(None),
            Some(token) => parse_number::<u64>(token)
                .map(Some)
                .ok_or_else(|| err(format!("could not convert {what} {token:?}"))),
        }
    };

    let path = RegisterPath::parse(columns[0]);
    if path.components().is_empty() {
        return Err(err(format!("invalid register name {:?}", columns[0])));
    }
    let elements = column(1, "number of elements")?.unwrap_or_default();
    let address = column(2, "address")?.unwrap_or_default();
    let bytes = column(3, "number of bytes")?.unwrap_or_default();
    let bar = column(4, "bar")?.map_or(Ok(config::DEFAULT_BAR), |b| {
        u8::try_from(b).map_err(|_| err(format!("bar {b} is out of range")))
    })?;
    let width = column(5, "width")?.map_or(Ok(config::DEFAULT_WIDTH), |w| {
        u32::try_from(w).map_err(|_| err(format!("width {w} is out of range")))
    })?;
    let fractional_bits = match columns.get(6) {
        None => config::DEFAULT_FRACTIONAL_BITS,
        Some(token) => token
            .parse::<i32>()
            .map_err(|_| err(format!("could not convert fractional bits {token:?}")))?,
    };
    let signed = match column(7, "signed flag")? {
        None => config::DEFAULT_SIGNED,
        Some(0) => false,
        Some(1) => true,
        Some(other) => return Err(err(format!("signed flag must be 0 or 1, found {other}"))),
    };

    Ok(MapEntry {
        line,
        path,
        elements: usize::try_from(elements)
            .map_err(|_| err(format!("{elements} elements are too many")))?,
        address,
        bytes: usize::try_from(bytes).map_err(|_| err(format!("{bytes} bytes are too many")))?,
        bar,
        channel: ChannelInfo {
            width,
            fractional_bits,
            signed,
        },
    })
}

/// Splits `ADC.SEQUENCE_DAQ_3` into (`ADC.DAQ`, 3).
fn sequence_of(path: &RegisterPath) -> Option<(RegisterPath, usize)> {
    let (name, module) = path.components().split_last()?;
    let rest = name.strip_prefix(config::SEQUENCE_PREFIX)?;
    let (region, index) = rest.rsplit_once('_')?;
    let index = index.parse::<usize>().ok()?;
    Some((RegisterPath::new(&module.join("/"), region), index))
}

fn area_of(path: &RegisterPath) -> Option<RegisterPath> {
    let (name, module) = path.components().split_last()?;
    let region = name.strip_prefix(config::MULTIPLEXED_AREA_PREFIX)?;
    Some(RegisterPath::new(&module.join("/"), region))
}

fn one_dimensional(file: &Path, entry: MapEntry) -> Result<RegisterInfo, BoardError> {
    let needed = entry.elements.checked_mul(config::WORD_SIZE);
    if needed.is_none_or(|needed| entry.bytes < needed) {
        return Err(BoardError::MapFile {
            file: file.into(),
            line: entry.line,
            msg: format!(
                "{} elements of {} bytes do not fit into {} bytes",
                entry.elements,
                config::WORD_SIZE,
                entry.bytes
            ),
        });
    }
    Ok(RegisterInfo {
        path: entry.path,
        elements: entry.elements,
        bar: entry.bar,
        address: entry.address,
        channels: vec![entry.channel],
        dimensions: 1,
    })
}

/// The area of a multiplexed region as a plain register of interleaved words.
fn raw_area(area: &MapEntry) -> RegisterInfo {
    RegisterInfo {
        path: area.path.clone(),
        elements: area.bytes / config::WORD_SIZE,
        bar: area.bar,
        address: area.address,
        channels: vec![area.channel],
        dimensions: 1,
    }
}

fn multiplexed(
    file: &Path,
    region: RegisterPath,
    area: MapEntry,
    sequences: BTreeMap<usize, MapEntry>,
) -> Result<RegisterInfo, BoardError> {
    let err = |line: usize, msg: String| BoardError::MapFile {
        file: file.into(),
        line,
        msg,
    };
    if sequences.is_empty() {
        return Err(err(
            area.line,
            format!("multiplexed region {region} declares no sequences"),
        ));
    }
    let mut channels = Vec::with_capacity(sequences.len());
    for (expected, (index, sequence)) in sequences.into_iter().enumerate() {
        if index != expected {
            return Err(err(
                sequence.line,
                format!("sequence {expected} of {region} is missing, found sequence {index}"),
            ));
        }
        if sequence.bytes != config::WORD_SIZE {
            return Err(err(
                sequence.line,
                format!(
                    "sequence {index} of {region} is {} bytes wide, only {} byte words are supported",
                    sequence.bytes,
                    config::WORD_SIZE
                ),
            ));
        }
        channels.push(sequence.channel);
    }
    let block_size = channels.len() * config::WORD_SIZE;
    trace!(
        "{region}: {} channels, {} bytes per block",
        channels.len(),
        block_size
    );
    Ok(RegisterInfo {
        path: region,
        elements: area.bytes / block_size,
        bar: area.bar,
        address: area.address,
        channels,
        dimensions: 2,
    })
}

/// Parse map file text. `file` is only used for error messages.
pub fn parse_map(file: &Path, text: &str) -> Result<RegisterCatalogue, BoardError> {
    let mut plain = Vec::new();
    let mut areas: BTreeMap<RegisterPath, MapEntry> = BTreeMap::new();
    let mut sequences: BTreeMap<RegisterPath, BTreeMap<usize, MapEntry>> = BTreeMap::new();
    // region paths in declaration order so the catalogue keeps map file order
    let mut order: Vec<RegisterPath> = Vec::new();

    for (index, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('@') {
            continue;
        }
        let entry = parse_line(file, index + 1, line)?;
        if let Some(region) = area_of(&entry.path) {
            if areas.contains_key(&region) {
                return Err(BoardError::MapFile {
                    file: file.into(),
                    line: entry.line,
                    msg: format!("multiplexed region {region} is declared twice"),
                });
            }
            order.push(region.clone());
            areas.insert(region, entry);
        } else if let Some((region, channel)) = sequence_of(&entry.path) {
            sequences.entry(region).or_default().insert(channel, entry);
        } else {
            order.push(entry.path.clone());
            plain.push(entry);
        }
    }

    if let Some((region, seqs)) = sequences.iter().find(|(r, _)| !areas.contains_key(*r)) {
        let line = seqs.values().next().map_or(0, |e| e.line);
        return Err(BoardError::MapFile {
            file: file.into(),
            line,
            msg: format!("sequence of {region} declared without its multiplexed area"),
        });
    }

    let mut registers = Vec::with_capacity(order.len());
    let mut plain = plain.into_iter();
    for path in order {
        if let Some(area) = areas.remove(&path) {
            let seqs = sequences.remove(&path).unwrap_or_default();
            registers.push(raw_area(&area));
            registers.push(multiplexed(file, path, area, seqs)?);
        } else if let Some(entry) = plain.next() {
            registers.push(one_dimensional(file, entry)?);
        }
    }

    let catalogue = RegisterCatalogue::new(registers);
    for (a, b) in catalogue
        .iter()
        .enumerate()
        .flat_map(|(i, a)| catalogue.iter().skip(i + 1).map(move |b| (a, b)))
    {
        if a.path == b.path {
            return Err(BoardError::MapFile {
                file: file.into(),
                line: 0,
                msg: format!("register {} is declared twice", a.path),
            });
        }
    }
    debug!("Parsed {} registers from {file:?}", catalogue.len());
    Ok(catalogue)
}

pub fn load_map_file(file: &Path) -> Result<RegisterCatalogue, BoardError> {
    parse_map(file, &fs_read(file)?)
}
