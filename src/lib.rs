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

//! Register level access to memory mapped hardware boards.
//!
//! A board is described by a register map file (see [`map_file`]) and reached through a
//! backend (see [`backends`]), selected by a device descriptor or a dmap alias (see [`dmap`]).
//! [`validation`] turns untrusted command line text into checked parameters and [`demux`]
//! selects channels and samples from multiplexed data regions.
//!
//! Backends must be registered once before a device can be opened:
//!
//! ```no_run
//! use boardctl::backends::backend::{Device, open_device};
//! use boardctl::dmap::resolve_device;
//!
//! boardctl::register_backends();
//! let descriptor = resolve_device("(dummy?map=board.map)", None)?;
//! let device = open_device(&descriptor)?;
//! println!("{} registers", device.catalogue().len());
//! # Ok::<(), boardctl::error::BoardError>(())
//! ```

pub mod backends;
pub mod catalogue;
pub mod config;
pub mod demux;
pub mod dmap;
pub mod error;
pub mod map_file;
pub mod system_io;
pub mod validation;

#[cfg(feature = "dummy-backend")]
use backends::dummy::DummyBackend;
#[cfg(feature = "file-backend")]
use backends::file::FileBackend;

/// Add all compiled in backends to the backend registry.
pub fn register_backends() {
    #[cfg(feature = "dummy-backend")]
    DummyBackend::register_backend();
    #[cfg(feature = "file-backend")]
    FileBackend::register_backend();
}
