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

//! Commands describing devices and registers.

use crate::board::{DmapLocation, open_board};
use boardctl::backends::backend::Device;
use boardctl::catalogue::{RegisterInfo, RegisterPath};
use boardctl::dmap::load_dmap_file;
use boardctl::error::BoardError;

const REGISTER_TABLE_HEADER: &str =
    "Name\t\tElements\tSigned\t\tBits\t\tFractional_Bits\t\tDescription\n";

/// Version of the command line tool.
pub fn version_handler() -> String {
    format!("{}\n", env!("CARGO_PKG_VERSION"))
}

/// Table of the devices in the dmap file.
///
/// Firmware and revision columns are always `na`, registers holding them are not standardised.
pub fn info_handler(location: &DmapLocation) -> Result<String, BoardError> {
    let Some(dmap_file) = location.dmap_file()? else {
        return Ok(String::from(
            "No dmap file found. No device information available.\n",
        ));
    };
    let mut ret_string = String::from(
        "\nAvailable devices: \n\n\
        Name\tDevice\t\t\tMap-File\t\t\tFirmware\tRevision\n",
    );
    for entry in load_dmap_file(&dmap_file)? {
        let map_file = entry.map_file.as_deref().unwrap_or("na");
        ret_string += format!("{}\t{}\t\t{map_file}\tna\t\tna\n", entry.alias, entry.uri).as_str();
    }
    ret_string.push('\n');
    Ok(ret_string)
}

/// Row of the register table for a one-dimensional register.
fn register_row(register: &RegisterInfo) -> Result<String, BoardError> {
    let channel = register.first_channel()?;
    Ok(format!(
        "{}\t{}\t\t{}\t\t{}\t\t{}\t\t\t \n",
        register.path.with_alt_separator(),
        register.elements,
        u8::from(channel.signed),
        channel.width,
        channel.fractional_bits
    ))
}

/// All registers of a board, multiplexed regions in a second table.
pub fn device_info_handler(board: &str, location: &DmapLocation) -> Result<String, BoardError> {
    let device = open_board(board, location)?;
    let catalogue = device.catalogue();

    let mut ret_string = String::from(REGISTER_TABLE_HEADER);
    for register in catalogue.iter().filter(|r| !r.is_multiplexed()) {
        ret_string += register_row(register)?.as_str();
    }

    let regions: Vec<&RegisterInfo> = catalogue.iter().filter(|r| r.is_multiplexed()).collect();
    if !regions.is_empty() {
        ret_string += "\n2D registers\nName\tnChannels\tnElementsPerChannel\n";
        for region in regions {
            ret_string += format!(
                "{}\t{}\t\t{}\n",
                region.path.with_alt_separator(),
                region.n_channels(),
                region.elements
            )
            .as_str();
        }
    }
    Ok(ret_string)
}

pub fn register_info_handler(
    board: &str,
    module: &str,
    register: &str,
    location: &DmapLocation,
) -> Result<String, BoardError> {
    let device = open_board(board, location)?;
    let register = device.register(&RegisterPath::new(module, register))?;
    Ok(format!("{REGISTER_TABLE_HEADER}{}", register_row(register)?))
}

/// Number of elements of a register, per channel for multiplexed regions.
pub fn register_size_handler(
    board: &str,
    module: &str,
    register: &str,
    location: &DmapLocation,
) -> Result<String, BoardError> {
    let device = open_board(board, location)?;
    let register = device.register(&RegisterPath::new(module, register))?;
    Ok(format!("{}\n", register.elements))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::test_board::TestBoard;
    use googletest::prelude::*;

    #[test]
    fn version_is_package_version() {
        assert_eq!(version_handler(), format!("{}\n", env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn info_without_dmap_file() {
        let board = TestBoard::new();
        assert_eq!(
            info_handler(&board.location()).expect("info succeeds"),
            "No dmap file found. No device information available.\n"
        );
    }

    #[gtest]
    fn info_lists_dmap_entries() {
        let board = TestBoard::new();
        board.write_dmap(
            "CommandLineTools.dmap",
            "# boards\nLLRF (file:/srv/llrf) llrf.map\nTEST (dummy?map=t.map)\n",
        );
        board.write_dmap("other.dmap", "IGNORED (dummy)\n");
        let info = info_handler(&board.location()).expect("info succeeds");
        assert_that!(
            info,
            contains_substring("LLRF\t(file:/srv/llrf)\t\tllrf.map\tna\t\tna\n")
        );
        assert_that!(
            info,
            contains_substring("TEST\t(dummy?map=t.map)\t\tna\tna\t\tna\n")
        );
        assert!(!info.contains("IGNORED"));
    }

    #[test]
    fn device_info_shows_both_tables() {
        let board = TestBoard::new();
        let info =
            device_info_handler(&board.descriptor(), &board.location()).expect("device info");
        let expected = format!(
            "{REGISTER_TABLE_HEADER}\
            BOARD.WORD_FIRMWARE\t1\t\t1\t\t32\t\t0\t\t\t \n\
            BOARD.WORD_GAIN\t4\t\t1\t\t18\t\t16\t\t\t \n\
            ADC.AREA_DMA\t4\t\t1\t\t32\t\t0\t\t\t \n\
            ADC.AREA_MULTIPLEXED_SEQUENCE_DAQ\t6\t\t1\t\t32\t\t0\t\t\t \n\
            \n2D registers\nName\tnChannels\tnElementsPerChannel\n\
            ADC.DAQ\t3\t\t2\n"
        );
        assert_eq!(info, expected);
    }

    #[test]
    fn register_info_and_size() {
        let board = TestBoard::new();
        let descriptor = board.descriptor();
        assert_eq!(
            register_info_handler(&descriptor, "BOARD", "WORD_GAIN", &board.location())
                .expect("register info"),
            format!("{REGISTER_TABLE_HEADER}BOARD.WORD_GAIN\t4\t\t1\t\t18\t\t16\t\t\t \n")
        );
        assert_eq!(
            register_size_handler(&descriptor, "ADC", "DAQ", &board.location())
                .expect("register size"),
            "2\n"
        );
    }

    #[gtest]
    fn unknown_register_is_reported() {
        let board = TestBoard::new();
        assert_that!(
            register_size_handler(&board.descriptor(), "BOARD", "NOPE", &board.location()),
            err(displays_as(contains_substring(
                "Register BOARD.NOPE does not exist in the catalogue"
            )))
        );
    }
}
