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

//! Device abstraction and backend registry.
//!
//! A backend provides word level access to the bars of a board through
//! [`Device::read_words`] and [`Device::write_words`], plus the register catalogue loaded from
//! the board's map file. Everything register shaped (bounds of a register, fixed point
//! conversion, de-interleaving of multiplexed regions) is implemented once in the provided
//! methods of [`Device`].
//!
//! # Backend Registration
//!
//! Backends register a constructor under the `kind` used in device descriptors, normally through
//! the `#[backend(kind = "...")]` attribute which generates `register_backend()`. Registration
//! happens once at startup, see [`crate::register_backends`]. [`open_device`] then picks the
//! constructor matching a descriptor.

use crate::backends::components::fixed_point::FixedPointConverter;
use crate::catalogue::{RegisterCatalogue, RegisterInfo, RegisterPath};
use crate::config;
use crate::demux::ChannelBuffer;
use crate::dmap::DeviceDescriptor;
use crate::error::BoardError;
use log::{debug, trace};
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock, PoisonError};

/// Constructor stored in the registry for one backend kind.
type BackendConstructor = fn(&DeviceDescriptor) -> Result<Box<dyn Device>, BoardError>;

/// Global registry mapping descriptor kinds to backend constructors.
pub static BACKEND_REGISTRY: OnceLock<Mutex<HashMap<&'static str, BackendConstructor>>> =
    OnceLock::new();

/// An opened board.
pub trait Device {
    /// Descriptor the device was opened with.
    fn descriptor(&self) -> &DeviceDescriptor;

    fn catalogue(&self) -> &RegisterCatalogue;

    /// Read `count` consecutive 32 bit words starting at byte `address` of `bar`.
    ///
    /// # Returns: `Result<Vec<i32>, BoardError>`
    /// * `Ok(Vec<i32>)` - Exactly `count` words
    /// * `Err(BoardError::Backend)` - Address not word aligned or outside the bar
    /// * `Err(BoardError::IORead)` - The transport failed
    fn read_words(&self, bar: u8, address: u64, count: usize) -> Result<Vec<i32>, BoardError>;

    /// Write consecutive 32 bit words starting at byte `address` of `bar`.
    ///
    /// # Returns: `Result<(), BoardError>`
    /// * `Ok(())` - All words written
    /// * `Err(BoardError::Backend)` - Address not word aligned or outside the bar
    /// * `Err(BoardError::IOWrite)` - The transport failed
    fn write_words(&mut self, bar: u8, address: u64, words: &[i32]) -> Result<(), BoardError>;

    fn register(&self, path: &RegisterPath) -> Result<&RegisterInfo, BoardError> {
        self.catalogue().get(path)
    }

    /// Raw words of a one-dimensional register.
    fn read_raw(
        &self,
        path: &RegisterPath,
        offset: usize,
        count: usize,
    ) -> Result<Vec<i32>, BoardError> {
        let register = self.register(path)?;
        let address = element_address(register, offset, count)?;
        trace!("Reading {count} words of {path} at offset {offset}");
        self.read_words(register.bar, address, count)
    }

    /// Fixed point converted values of a one-dimensional register.
    fn read(&self, path: &RegisterPath, offset: usize, count: usize) -> Result<Vec<f64>, BoardError> {
        let converter = FixedPointConverter::new(self.register(path)?.first_channel()?)?;
        Ok(self
            .read_raw(path, offset, count)?
            .into_iter()
            .map(|raw| converter.to_double(raw))
            .collect())
    }

    fn write_raw(&mut self, path: &RegisterPath, offset: usize, words: &[i32]) -> Result<(), BoardError> {
        let register = self.register(path)?;
        let address = element_address(register, offset, words.len())?;
        let bar = register.bar;
        trace!("Writing {} words to {path} at offset {offset}", words.len());
        self.write_words(bar, address, words)
    }

    /// Convert `values` to fixed point and write them.
    fn write(&mut self, path: &RegisterPath, offset: usize, values: &[f64]) -> Result<(), BoardError> {
        let converter = FixedPointConverter::new(self.register(path)?.first_channel()?)?;
        let words: Vec<i32> = values.iter().map(|v| converter.to_raw(*v)).collect();
        self.write_raw(path, offset, &words)
    }

    /// Transfer a whole multiplexed region and de-interleave it.
    fn read_multiplexed_raw(&self, path: &RegisterPath) -> Result<ChannelBuffer<i32>, BoardError> {
        let register = self.register(path)?;
        if !register.is_multiplexed() {
            return Err(BoardError::Dimension(format!(
                "{} is not a multiplexed data region",
                path.with_alt_separator()
            )));
        }
        let channels = register.n_channels();
        let words = self.read_words(register.bar, register.address, channels * register.elements)?;
        debug!(
            "Read {} words from {path}, {channels} channels of {} samples",
            words.len(),
            register.elements
        );
        Ok(ChannelBuffer::from_interleaved(&words, channels))
    }

    /// As [`Device::read_multiplexed_raw`], converting each channel with its own fixed point
    /// description.
    fn read_multiplexed(&self, path: &RegisterPath) -> Result<ChannelBuffer<f64>, BoardError> {
        let converters = self
            .register(path)?
            .channels
            .iter()
            .map(FixedPointConverter::new)
            .collect::<Result<Vec<_>, _>>()?;
        let raw = self.read_multiplexed_raw(path)?;
        Ok(raw.map(|channel, value| converters[channel].to_double(value)))
    }
}

/// Byte address of element `offset` of a one-dimensional register, after checking that `count`
/// elements from there fit.
fn element_address(register: &RegisterInfo, offset: usize, count: usize) -> Result<u64, BoardError> {
    if register.is_multiplexed() {
        return Err(BoardError::Dimension(format!(
            "{} is a multiplexed data region, use read_seq to read it",
            register.path.with_alt_separator()
        )));
    }
    let end = offset.checked_add(count);
    if end.is_none_or(|end| end > register.elements) {
        return Err(BoardError::Argument(format!(
            "{count} elements at offset {offset} exceed the {} elements of {}",
            register.elements,
            register.path.with_alt_separator()
        )));
    }
    Ok(register.address + (offset * config::WORD_SIZE) as u64)
}

/// Initialize the backend registry.
pub fn init_backend_registry() -> Mutex<HashMap<&'static str, BackendConstructor>> {
    Mutex::new(HashMap::new())
}

/// Register a backend constructor for descriptors of the given `kind`.
///
/// Registering a kind again replaces the earlier constructor.
pub fn register_backend(kind: &'static str, constructor: BackendConstructor) {
    let mut registry = BACKEND_REGISTRY
        .get_or_init(init_backend_registry)
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    registry.insert(kind, constructor);
}

/// Kinds of all registered backends, sorted.
pub fn registered_kinds() -> Vec<&'static str> {
    let mut kinds: Vec<&'static str> = BACKEND_REGISTRY
        .get()
        .map(|r| {
            r.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .keys()
                .copied()
                .collect()
        })
        .unwrap_or_default();
    kinds.sort_unstable();
    kinds
}

/// Open the device a descriptor names.
///
/// # Returns: `Result<Box<dyn Device>, BoardError>`
/// * `Ok(Box<dyn Device>)` - The opened device
/// * `Err(BoardError::Internal)` - No backend was ever registered
/// * `Err(BoardError::Descriptor)` - No backend is registered for the descriptor's kind
/// * `Err(BoardError)` - The backend failed to open the device
pub fn open_device(descriptor: &DeviceDescriptor) -> Result<Box<dyn Device>, BoardError> {
    let constructor = {
        let registry = BACKEND_REGISTRY
            .get()
            .ok_or(BoardError::Internal(String::from(
                "couldn't get BACKEND_REGISTRY",
            )))?
            .lock()
            .map_err(|_| BoardError::Internal(String::from("couldn't lock BACKEND_REGISTRY")))?;
        *registry.get(descriptor.kind.as_str()).ok_or_else(|| {
            BoardError::Descriptor(format!(
                "No backend for {descriptor}. Known backend kinds: {}",
                {
                    let mut kinds: Vec<&str> = registry.keys().copied().collect();
                    kinds.sort_unstable();
                    kinds.join(", ")
                }
            ))
        })?
    };
    debug!("Opening {descriptor}");
    constructor(descriptor)
}
