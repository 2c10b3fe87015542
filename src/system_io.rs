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

//! Error Wrapping File System I/O Helpers
//!
//! Thin wrappers around standard file operations which log at trace level and convert
//! failures into [`BoardError`] values carrying the path involved.
//!
//! Includes: whole-file text reads, positioned byte reads and writes, and directory listing.

use crate::error::BoardError;
use log::trace;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Read the contents of a file to a String.
///
/// # Returns: `Result<String, BoardError>`
/// * `Ok(String)` - The complete contents of the file
/// * `Err(BoardError::IORead)` - If the file cannot be read
pub fn fs_read(file_path: &Path) -> Result<String, BoardError> {
    trace!("Attempting to read from {file_path:?}");
    let mut buf: String = String::new();
    let result = OpenOptions::new()
        .read(true)
        .open(file_path)
        .and_then(|mut f| f.read_to_string(&mut buf));

    match result {
        Ok(_) => {
            trace!("Reading done");
            Ok(buf)
        }
        Err(e) => Err(BoardError::IORead {
            file: file_path.into(),
            e,
        }),
    }
}

/// Read `len` bytes starting at byte `offset`.
///
/// Bytes beyond the end of the file, or of a file which does not exist yet, read as zero. This
/// mirrors an uninitialised register space.
///
/// # Returns: `Result<Vec<u8>, BoardError>`
/// * `Ok(Vec<u8>)` - Exactly `len` bytes
/// * `Err(BoardError::IORead)` - The file exists but could not be read
pub fn fs_read_bytes_at(file_path: &Path, offset: u64, len: usize) -> Result<Vec<u8>, BoardError> {
    trace!("Attempting to read {len} bytes at {offset:#x} from {file_path:?}");
    let mut buf = vec![0u8; len];
    let mut file = match OpenOptions::new().read(true).open(file_path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            trace!("{file_path:?} does not exist yet, reading zeros");
            return Ok(buf);
        }
        Err(e) => {
            return Err(BoardError::IORead {
                file: file_path.into(),
                e,
            });
        }
    };

    let result = file.seek(SeekFrom::Start(offset)).and_then(|_| {
        let mut filled = 0;
        while filled < len {
            match file.read(&mut buf[filled..])? {
                0 => break,
                n => filled += n,
            }
        }
        Ok(filled)
    });

    match result {
        Ok(filled) => {
            trace!("Reading done, {filled} bytes came from the file");
            Ok(buf)
        }
        Err(e) => Err(BoardError::IORead {
            file: file_path.into(),
            e,
        }),
    }
}

/// Write binary data at byte `offset`, creating the file if needed.
///
/// Writing beyond the current end of the file extends it; the gap is filled with zeros.
///
/// # Returns: `Result<(), BoardError>`
/// * `Ok(())` - Write succeeded
/// * `Err(BoardError::IOWrite)` - If the write fails
pub fn fs_write_bytes_at(file_path: &Path, offset: u64, data: &[u8]) -> Result<(), BoardError> {
    trace!(
        "Attempting to write {} bytes at {offset:#x} to {file_path:?}",
        data.len()
    );
    let result = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(file_path)
        .and_then(|mut f| {
            f.seek(SeekFrom::Start(offset))?;
            f.write_all(data)
        });

    match result {
        Ok(_) => {
            trace!("Write done.");
            Ok(())
        }
        Err(e) => Err(BoardError::IOWrite {
            file: file_path.into(),
            e,
        }),
    }
}

/// Read the contents of a directory and return the full paths of its entries.
///
/// Entries that cannot be read are silently skipped.
///
/// # Returns: `Result<Vec<PathBuf>, BoardError>`
/// * `Ok(Vec<PathBuf>)` - Paths of the entries in the directory
/// * `Err(BoardError::IOReadDir)` - If the directory cannot be read
pub fn fs_read_dir(dir: &Path) -> Result<Vec<PathBuf>, BoardError> {
    trace!("Attempting to read directory '{dir:?}'");
    std::fs::read_dir(dir).map_or_else(
        |e| {
            Err(BoardError::IOReadDir {
                dir: dir.to_owned(),
                e,
            })
        },
        |iter| {
            let ret = iter
                .filter_map(Result::ok)
                .map(|entry| entry.path())
                .collect();
            trace!("Dir reading done.");
            Ok(ret)
        },
    )
}
