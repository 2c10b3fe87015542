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

//! Register catalogue of a device.
//!
//! The catalogue is built from a register map file (see [`crate::map_file`]) and describes every
//! register a device exposes: where it lives (bar and byte address), how many elements it has and
//! how its raw words are interpreted. One-dimensional registers have exactly one channel;
//! multiplexed data regions are two-dimensional and have one channel per sequence.

use crate::error::BoardError;
use std::fmt;

/// Hierarchical register name such as `ADC/DAQ0`.
///
/// Both `/` and the alternative separator `.` are accepted when parsing; components are stored
/// without separators so `ADC.DAQ0` and `/ADC/DAQ0` name the same register.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegisterPath {
    components: Vec<String>,
}

impl RegisterPath {
    pub fn parse(path: &str) -> Self {
        RegisterPath {
            components: path
                .split(['/', '.'])
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Path of `register` inside `module`. An empty module names a top level register.
    pub fn new(module: &str, register: &str) -> Self {
        let mut path = RegisterPath::parse(module);
        path.components
            .extend(RegisterPath::parse(register).components);
        path
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Name with `.` between components, as written in map files.
    pub fn with_alt_separator(&self) -> String {
        self.components.join(".")
    }
}

impl fmt::Display for RegisterPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.components.join("/"))
    }
}

/// Fixed point interpretation of one channel's raw 32 bit words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelInfo {
    pub width: u32,
    pub fractional_bits: i32,
    pub signed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterInfo {
    pub path: RegisterPath,
    /// Number of elements, per channel for two-dimensional registers.
    pub elements: usize,
    pub bar: u8,
    /// Byte address of the first element within the bar.
    pub address: u64,
    pub channels: Vec<ChannelInfo>,
    pub dimensions: u8,
}

impl RegisterInfo {
    pub fn is_multiplexed(&self) -> bool {
        self.dimensions == 2
    }

    pub fn n_channels(&self) -> usize {
        self.channels.len()
    }

    /// Fixed point description of the first channel, the one shown in register tables.
    pub fn first_channel(&self) -> Result<&ChannelInfo, BoardError> {
        self.channels.first().ok_or_else(|| {
            BoardError::Internal(format!("Register {} has no channels", self.path))
        })
    }
}

/// All registers of a device, in map file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterCatalogue {
    registers: Vec<RegisterInfo>,
}

impl RegisterCatalogue {
    pub fn new(registers: Vec<RegisterInfo>) -> Self {
        RegisterCatalogue { registers }
    }

    pub fn get(&self, path: &RegisterPath) -> Result<&RegisterInfo, BoardError> {
        self.registers
            .iter()
            .find(|r| &r.path == path)
            .ok_or_else(|| BoardError::RegisterNotFound(path.with_alt_separator()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegisterInfo> {
        self.registers.iter()
    }

    pub fn len(&self) -> usize {
        self.registers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }
}

impl<'a> IntoIterator for &'a RegisterCatalogue {
    type Item = &'a RegisterInfo;
    type IntoIter = std::slice::Iter<'a, RegisterInfo>;

    fn into_iter(self) -> Self::IntoIter {
        self.registers.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;
    use rstest::*;

    fn register(path: &str) -> RegisterInfo {
        RegisterInfo {
            path: RegisterPath::parse(path),
            elements: 1,
            bar: 0,
            address: 0,
            channels: vec![ChannelInfo {
                width: 32,
                fractional_bits: 0,
                signed: true,
            }],
            dimensions: 1,
        }
    }

    #[rstest]
    #[case::dotted("ADC.DAQ0", "ADC", "DAQ0")]
    #[case::slashed("/ADC/DAQ0", "ADC", "DAQ0")]
    #[case::module_with_slash("ADC/DAQ0", "/ADC/", "DAQ0")]
    #[case::nested("APP.ADC.DAQ0", "APP/ADC", "DAQ0")]
    fn paths_with_either_separator_are_equal(
        #[case] parsed: &str,
        #[case] module: &str,
        #[case] name: &str,
    ) {
        assert_eq!(RegisterPath::parse(parsed), RegisterPath::new(module, name));
    }

    #[test]
    fn path_display_forms() {
        let path = RegisterPath::new("BOARD", "WORD_STATUS");
        assert_eq!(path.to_string(), "/BOARD/WORD_STATUS");
        assert_eq!(path.with_alt_separator(), "BOARD.WORD_STATUS");
    }

    #[gtest]
    fn lookup_of_unknown_register_names_it() {
        let catalogue = RegisterCatalogue::new(vec![register("BOARD.WORD_STATUS")]);
        assert_that!(
            catalogue.get(&RegisterPath::new("BOARD", "WORD_CLK")),
            err(displays_as(contains_substring(
                "Register BOARD.WORD_CLK does not exist"
            )))
        );
        assert!(catalogue.get(&RegisterPath::parse("BOARD/WORD_STATUS")).is_ok());
    }
}
