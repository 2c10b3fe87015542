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

mod board;
mod format;
mod info;
mod read;
mod sequence;
mod write;

use crate::board::DmapLocation;
use crate::info::{
    device_info_handler, info_handler, register_info_handler, register_size_handler,
    version_handler,
};
use crate::read::{ReadArgs, read_handler};
use crate::sequence::{SequenceArgs, read_seq_handler};
use crate::write::write_handler;
use boardctl::demux::RowOrder;
use boardctl::error::BoardError;
use boardctl::validation::ReadContext;
use clap::{Parser, Subcommand};
use log::debug;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "boardctl")]
#[command(bin_name = "boardctl")]
#[command(version, about = "Read and write registers of memory mapped hardware boards")]
struct Cli {
    #[arg(
        long = "dmap",
        global = true,
        value_name = "FILE",
        help = r#"dmap file used to resolve device aliases.
Without this option the current directory is searched for a *.dmap file;
if there are several, CommandLineTools.dmap is used.
        "#
    )]
    dmap: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
#[command(rename_all = "snake_case")]
enum Commands {
    /// Prints the tool's version
    Version,
    /// Prints all devices of the dmap file
    Info,
    /// Prints the register list of a device
    DeviceInfo { board: String },
    /// Prints the info of a register
    RegisterInfo {
        board: String,
        module: String,
        register: String,
    },
    /// Prints the number of elements of a register
    RegisterSize {
        board: String,
        module: String,
        register: String,
    },
    /// Reads data from a board [offset] [elements] [raw | hex | double]
    Read {
        board: String,
        module: String,
        register: String,
        offset: Option<String>,
        elements: Option<String>,
        mode: Option<String>,
    },
    /// Writes space or tab separated values to a register
    Write {
        board: String,
        module: String,
        register: String,
        values: String,
        offset: Option<String>,
    },
    /// Reads raw 32 bit words without fixed point conversion [offset] [elements] [raw | hex]
    ReadDmaRaw {
        board: String,
        module: String,
        register: String,
        offset: Option<String>,
        elements: Option<String>,
        mode: Option<String>,
    },
    /// Reads demultiplexed sequences of a multiplexed region, one line per sample
    ReadSeq {
        board: String,
        module: String,
        region: String,
        /// Space separated sequence numbers, e.g. "2 0"
        sequences: Option<String>,
        offset: Option<String>,
        elements: Option<String>,
    },
    /// Reads demultiplexed sequences of a multiplexed region, one block per sequence
    ReadSeqChannels {
        board: String,
        module: String,
        region: String,
        /// Space separated sequence numbers, e.g. "2 0"
        sequences: Option<String>,
        offset: Option<String>,
        elements: Option<String>,
    },
}

fn opt(arg: &Option<String>) -> &str {
    arg.as_deref().unwrap_or_default()
}

fn run(command: &Commands, location: &DmapLocation) -> Result<String, BoardError> {
    match command {
        Commands::Version => Ok(version_handler()),
        Commands::Info => info_handler(location),
        Commands::DeviceInfo { board } => device_info_handler(board, location),
        Commands::RegisterInfo {
            board,
            module,
            register,
        } => register_info_handler(board, module, register, location),
        Commands::RegisterSize {
            board,
            module,
            register,
        } => register_size_handler(board, module, register, location),
        Commands::Read {
            board,
            module,
            register,
            offset,
            elements,
            mode,
        } => {
            let args = ReadArgs {
                offset: opt(offset),
                elements: opt(elements),
                mode: opt(mode),
            };
            read_handler(board, module, register, args, ReadContext::Register, location)
        }
        Commands::ReadDmaRaw {
            board,
            module,
            register,
            offset,
            elements,
            mode,
        } => {
            let args = ReadArgs {
                offset: opt(offset),
                elements: opt(elements),
                mode: opt(mode),
            };
            read_handler(board, module, register, args, ReadContext::DmaRaw, location)
        }
        Commands::Write {
            board,
            module,
            register,
            values,
            offset,
        } => write_handler(board, module, register, values, opt(offset), location),
        Commands::ReadSeq {
            board,
            module,
            region,
            sequences,
            offset,
            elements,
        }
        | Commands::ReadSeqChannels {
            board,
            module,
            region,
            sequences,
            offset,
            elements,
        } => {
            let order = match command {
                Commands::ReadSeqChannels { .. } => RowOrder::ChannelMajor,
                _ => RowOrder::SampleMajor,
            };
            let args = SequenceArgs {
                sequences: opt(sequences),
                offset: opt(offset),
                elements: opt(elements),
            };
            read_seq_handler(board, module, region, args, order, location)
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    debug!("parsed cli command with {cli:?}");
    boardctl::register_backends();

    let location = DmapLocation::new(cli.dmap.clone(), Path::new("."));
    match run(&cli.command, &location) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
