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

//! Opening the board named on the command line.

use boardctl::backends::backend::{Device, open_device};
use boardctl::dmap::{DeviceDescriptor, resolve_device, select_dmap_file};
use boardctl::error::BoardError;
use log::debug;
use std::path::{Path, PathBuf};

/// Where alias names are looked up: an explicit dmap file, or the one found in a directory.
#[derive(Debug, Clone)]
pub struct DmapLocation {
    pub explicit: Option<PathBuf>,
    pub search_dir: PathBuf,
}

impl DmapLocation {
    pub fn new(explicit: Option<PathBuf>, search_dir: &Path) -> Self {
        DmapLocation {
            explicit,
            search_dir: search_dir.to_path_buf(),
        }
    }

    pub fn dmap_file(&self) -> Result<Option<PathBuf>, BoardError> {
        select_dmap_file(self.explicit.as_deref(), &self.search_dir)
    }
}

/// Open a board given as device descriptor or dmap alias.
///
/// The dmap file is only searched for when `board` is not a descriptor, so a directory with
/// several ambiguous dmap files does not get in the way of descriptors.
pub fn open_board(board: &str, location: &DmapLocation) -> Result<Box<dyn Device>, BoardError> {
    let dmap_file = if DeviceDescriptor::is_descriptor(board) {
        None
    } else {
        location.dmap_file()?
    };
    let descriptor = resolve_device(board, dmap_file.as_deref())?;
    debug!("{board} resolved to {descriptor}");
    open_device(&descriptor)
}


#[cfg(test)]
mod tests {
    use super::test_board::TestBoard;
    use super::*;
    use googletest::prelude::*;

    #[test]
    fn descriptor_opens_without_dmap_file() {
        let board = TestBoard::new();
        let device = open_board(&board.descriptor(), &board.location()).expect("board opens");
        assert_eq!(device.catalogue().len(), 5);
    }

    #[test]
    fn alias_resolves_through_dmap_with_relative_map() {
        let board = TestBoard::new();
        board.write_dmap(
            "boards.dmap",
            &format!("LLRF (file:{}) board.map\n", board.path().display()),
        );
        let device = open_board("LLRF", &board.location()).expect("alias opens");
        assert_eq!(device.descriptor().kind, "file");
        assert_eq!(device.catalogue().len(), 5);
    }

    #[gtest]
    fn alias_without_dmap_file_is_reported() {
        let board = TestBoard::new();
        assert_that!(
            open_board("LLRF", &board.location()).map(|_| ()),
            err(displays_as(contains_substring(
                "No dmap file found to resolve alias name 'LLRF'"
            )))
        );
    }

    #[gtest]
    fn explicit_dmap_file_wins_over_search() {
        let board = TestBoard::new();
        board.write_dmap("a.dmap", "OTHER (dummy)\n");
        board.write_dmap("b.dmap", "OTHER (dummy)\n");
        let explicit = board.path().join("explicit.txt");
        std::fs::write(&explicit, format!("LLRF {}\n", board.descriptor())).expect("write dmap");

        assert_that!(
            open_board("LLRF", &board.location()).map(|_| ()),
            err(displays_as(contains_substring("Found more than one dmap file")))
        );
        let location = DmapLocation::new(Some(explicit), board.path());
        assert!(open_board("LLRF", &location).is_ok());
    }
}
