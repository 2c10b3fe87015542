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

//! In-memory board, `(dummy?map=board.map)`.
//!
//! Every bar is sized to hold the registers the map file places in it and starts out zeroed.
//! Nothing persists beyond the lifetime of the device.

use crate::backends::backend::Device;
use crate::catalogue::RegisterCatalogue;
use crate::config;
use crate::dmap::DeviceDescriptor;
use crate::error::BoardError;
use crate::map_file::load_map_file;
use boardctl_macros::backend;
use log::{debug, trace};
use std::collections::HashMap;

#[backend(kind = "dummy")]
pub struct DummyBackend {
    descriptor: DeviceDescriptor,
    catalogue: RegisterCatalogue,
    bars: HashMap<u8, Vec<i32>>,
}

impl DummyBackend {
    pub fn open(descriptor: &DeviceDescriptor) -> Result<Self, BoardError> {
        let catalogue = load_map_file(&descriptor.map_file()?)?;
        Self::with_catalogue(descriptor.clone(), catalogue)
    }

    /// Dummy device for a catalogue which did not come from a map file.
    ///
    /// # Returns: `Result<DummyBackend, BoardError>`
    /// * `Ok(DummyBackend)` - Bars sized to hold every register
    /// * `Err(BoardError::Backend)` - A register ends beyond the addressable range
    pub fn with_catalogue(
        descriptor: DeviceDescriptor,
        catalogue: RegisterCatalogue,
    ) -> Result<Self, BoardError> {
        let mut sizes: HashMap<u8, usize> = HashMap::new();
        for register in &catalogue {
            let words = usize::try_from(register.address / config::WORD_SIZE as u64)
                .ok()
                .zip(register.elements.checked_mul(register.n_channels()))
                .and_then(|(start, len)| start.checked_add(len))
                .ok_or_else(|| {
                    BoardError::Backend(format!(
                        "{} at {:#x} ends beyond the addressable range of bar {}",
                        register.path.with_alt_separator(),
                        register.address,
                        register.bar
                    ))
                })?;
            let size = sizes.entry(register.bar).or_default();
            *size = (*size).max(words);
        }
        let bars: HashMap<u8, Vec<i32>> = sizes
            .into_iter()
            .map(|(bar, words)| (bar, vec![0; words]))
            .collect();
        debug!(
            "Dummy device with bars {:?}",
            bars.iter().map(|(n, w)| (*n, w.len())).collect::<Vec<_>>()
        );
        Ok(DummyBackend {
            descriptor,
            catalogue,
            bars,
        })
    }

    /// Word range inside `bar` for an access, or why there is none.
    fn word_range(
        &self,
        bar: u8,
        address: u64,
        count: usize,
    ) -> Result<std::ops::Range<usize>, BoardError> {
        if address % config::WORD_SIZE as u64 != 0 {
            return Err(BoardError::Backend(format!(
                "address {address:#x} in bar {bar} is not word aligned"
            )));
        }
        let size = self.bars.get(&bar).map_or(0, Vec::len);
        let start = (address / config::WORD_SIZE as u64) as usize;
        match start.checked_add(count) {
            Some(end) if end <= size => Ok(start..end),
            _ => Err(BoardError::Backend(format!(
                "{count} words at {address:#x} are outside bar {bar} of {size} words"
            ))),
        }
    }
}

impl Device for DummyBackend {
    fn descriptor(&self) -> &DeviceDescriptor {
        &self.descriptor
    }

    fn catalogue(&self) -> &RegisterCatalogue {
        &self.catalogue
    }

    fn read_words(&self, bar: u8, address: u64, count: usize) -> Result<Vec<i32>, BoardError> {
        let range = self.word_range(bar, address, count)?;
        trace!("dummy read bar {bar} words {range:?}");
        Ok(self
            .bars
            .get(&bar)
            .map(|words| words[range].to_vec())
            .unwrap_or_default())
    }

    fn write_words(&mut self, bar: u8, address: u64, words: &[i32]) -> Result<(), BoardError> {
        let range = self.word_range(bar, address, words.len())?;
        trace!("dummy write bar {bar} words {range:?}");
        if let Some(bar_words) = self.bars.get_mut(&bar) {
            bar_words[range].copy_from_slice(words);
        }
        Ok(())
    }
}
