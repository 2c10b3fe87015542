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

use crate::board::{DmapLocation, open_board};
use boardctl::backends::backend::Device;
use boardctl::catalogue::RegisterPath;
use boardctl::error::BoardError;
use boardctl::validation::{check_write_size, extract_offset, extract_write_values};
use log::debug;

/// Write space or tab separated values to a register, starting at `offset`.
pub fn write_handler(
    board: &str,
    module: &str,
    register: &str,
    values: &str,
    offset: &str,
    location: &DmapLocation,
) -> Result<String, BoardError> {
    let values = extract_write_values(values)?;
    let mut device = open_board(board, location)?;
    let path = RegisterPath::new(module, register);
    let elements = device.register(&path)?.elements;

    let offset = extract_offset(offset, elements.saturating_sub(1))?;
    check_write_size(values.len(), offset, elements)?;
    debug!("Writing {} values to {path} at offset {offset}", values.len());
    device.write(&path, offset, &values)?;
    Ok(String::new())
}
