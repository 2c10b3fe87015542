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

/// Extension of device map files searched for in the working directory.
pub static DMAP_FILE_EXTENSION: &str = "dmap";

/// When more than one dmap file is found, the one with this stem wins. Typically a symlink to
/// the dmap file the command line tools should use.
pub static PREFERRED_DMAP_STEM: &str = "CommandLineTools";

/// Descriptor parameter naming the register map file.
pub static MAP_PARAMETER: &str = "map";

/// Size in bytes of one register word. All registers and sequence samples are 32 bit words.
pub const WORD_SIZE: usize = 4;

/// Map file defaults for omitted trailing columns.
pub const DEFAULT_BAR: u8 = 0;
pub const DEFAULT_WIDTH: u32 = 32;
pub const DEFAULT_FRACTIONAL_BITS: i32 = 0;
pub const DEFAULT_SIGNED: bool = true;

/// Register name prefixes marking a multiplexed data region and its sequences.
pub static MULTIPLEXED_AREA_PREFIX: &str = "AREA_MULTIPLEXED_SEQUENCE_";
pub static SEQUENCE_PREFIX: &str = "SEQUENCE_";

/// File name of bar `n` inside a file backend directory is `bar{n}.bin`.
pub static BAR_FILE_PREFIX: &str = "bar";
pub static BAR_FILE_EXTENSION: &str = "bin";
