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

//! Board image kept in a directory, `(file:/path/to/dir?map=board.map)`.
//!
//! Bar `n` is the file `bar<n>.bin` in the directory, holding little-endian 32 bit words. Missing
//! files and bytes past the end of a file read as zero, writes create and extend the files. The
//! directory itself must exist.

use crate::backends::backend::Device;
use crate::catalogue::RegisterCatalogue;
use crate::config;
use crate::dmap::DeviceDescriptor;
use crate::error::BoardError;
use crate::map_file::load_map_file;
use crate::system_io::{fs_read_bytes_at, fs_write_bytes_at};
use boardctl_macros::backend;
use log::debug;
use std::path::PathBuf;

#[backend(kind = "file")]
pub struct FileBackend {
    descriptor: DeviceDescriptor,
    catalogue: RegisterCatalogue,
    directory: PathBuf,
}

impl FileBackend {
    pub fn open(descriptor: &DeviceDescriptor) -> Result<Self, BoardError> {
        if descriptor.address.is_empty() {
            return Err(BoardError::Descriptor(format!(
                "{descriptor} does not name a directory, use (file:<directory>?map=<map file>)"
            )));
        }
        let directory = PathBuf::from(&descriptor.address);
        if !directory.is_dir() {
            return Err(BoardError::Backend(format!(
                "{directory:?} is not a directory"
            )));
        }
        let catalogue = load_map_file(&descriptor.map_file()?)?;
        debug!("File device in {directory:?} with {} registers", catalogue.len());
        Ok(FileBackend {
            descriptor: descriptor.clone(),
            catalogue,
            directory,
        })
    }

    fn bar_file(&self, bar: u8) -> PathBuf {
        self.directory.join(format!(
            "{}{bar}.{}",
            config::BAR_FILE_PREFIX,
            config::BAR_FILE_EXTENSION
        ))
    }
}

fn check_aligned(bar: u8, address: u64) -> Result<(), BoardError> {
    if address % config::WORD_SIZE as u64 != 0 {
        return Err(BoardError::Backend(format!(
            "address {address:#x} in bar {bar} is not word aligned"
        )));
    }
    Ok(())
}

impl Device for FileBackend {
    fn descriptor(&self) -> &DeviceDescriptor {
        &self.descriptor
    }

    fn catalogue(&self) -> &RegisterCatalogue {
        &self.catalogue
    }

    fn read_words(&self, bar: u8, address: u64, count: usize) -> Result<Vec<i32>, BoardError> {
        check_aligned(bar, address)?;
        let bytes = fs_read_bytes_at(&self.bar_file(bar), address, count * config::WORD_SIZE)?;
        Ok(bytes
            .chunks_exact(config::WORD_SIZE)
            .map(|word| i32::from_le_bytes([word[0], word[1], word[2], word[3]]))
            .collect())
    }

    fn write_words(&mut self, bar: u8, address: u64, words: &[i32]) -> Result<(), BoardError> {
        check_aligned(bar, address)?;
        let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
        fs_write_bytes_at(&self.bar_file(bar), address, &bytes)
    }
}
