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

//! Drives a file backed board the way the command line tool does: resolve an alias through a
//! dmap file, open the device, write registers and demultiplex a DMA region.

use boardctl::backends::backend::{Device, open_device};
use boardctl::catalogue::RegisterPath;
use boardctl::demux::{RowOrder, demultiplex_request};
use boardctl::dmap::{find_dmap_file, resolve_device};
use boardctl::error::{BoardError, ValidationErrorKind};
use googletest::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const MAP: &str = "\
@MAP_VERSION 1
BOARD.WORD_STATUS                 1 0x0  4  0
BOARD.WORD_SETPOINT               2 0x4  8  0 16 4 1
DAQ.AREA_MULTIPLEXED_SEQUENCE_ADC 0 0x0  32 1
DAQ.SEQUENCE_ADC_0                1 0x0  4  1 32 0 1
DAQ.SEQUENCE_ADC_1                1 0x4  4  1 32 0 1
";

fn setup() -> (TempDir, Box<dyn Device>) {
    let _ = env_logger::builder().is_test(true).try_init();
    boardctl::register_backends();

    let dir = tempfile::tempdir().expect("temp dir");
    let bars = dir.path().join("bars");
    fs::create_dir(&bars).expect("bar directory");
    fs::write(dir.path().join("llrf.map"), MAP).expect("map file");
    fs::write(
        dir.path().join("CommandLineTools.dmap"),
        format!("LLRF (file:{}) llrf.map\n", bars.display()),
    )
    .expect("dmap file");
    fs::write(dir.path().join("old.dmap"), "OLD (dummy)\n").expect("second dmap file");

    let dmap_file = find_dmap_file(dir.path()).expect("dmap lookup succeeds");
    let descriptor = resolve_device("LLRF", dmap_file.as_deref()).expect("alias resolves");
    let device = open_device(&descriptor).expect("device opens");
    (dir, device)
}

fn write_bar(dir: &Path, bar: u8, words: &[i32]) {
    let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
    fs::write(dir.join("bars").join(format!("bar{bar}.bin")), bytes).expect("bar file");
}

#[test]
fn registers_survive_reopening() {
    let (dir, mut device) = setup();
    let setpoint = RegisterPath::parse("/BOARD/WORD_SETPOINT");
    device.write(&setpoint, 0, &[1.25, -0.5]).expect("write succeeds");
    device
        .write_raw(&RegisterPath::new("BOARD", "WORD_STATUS"), 0, &[0x5A])
        .expect("raw write succeeds");
    drop(device);

    let descriptor = resolve_device("LLRF", Some(&dir.path().join("CommandLineTools.dmap")))
        .expect("alias resolves");
    let device = open_device(&descriptor).expect("device reopens");
    assert_eq!(device.read(&setpoint, 0, 2).expect("read"), vec![1.25, -0.5]);
    assert_eq!(
        device
            .read_raw(&RegisterPath::parse("BOARD.WORD_STATUS"), 0, 1)
            .expect("read"),
        vec![0x5A]
    );
}

#[test]
fn dma_region_demultiplexes_in_both_orders() {
    let (dir, device) = setup();
    write_bar(dir.path(), 1, &[0, 100, 1, 101, 2, 102, 3, 103]);

    let buffer = device
        .read_multiplexed(&RegisterPath::parse("DAQ.ADC"))
        .expect("region reads");
    assert_eq!(buffer.channels(), 2);
    assert_eq!(buffer.samples_per_channel(), 4);

    let channel_major = demultiplex_request(&buffer, "1 0", "1", "2", RowOrder::ChannelMajor)
        .expect("valid request");
    assert_eq!(channel_major, vec![vec![101.0, 102.0], vec![1.0, 2.0]]);

    let sample_major = demultiplex_request(&buffer, "1 0", "1", "2", RowOrder::SampleMajor)
        .expect("valid request");
    assert_eq!(sample_major, vec![vec![101.0, 1.0], vec![102.0, 2.0]]);

    let nothing = demultiplex_request(&buffer, "", "3", "0", RowOrder::SampleMajor)
        .expect("zero elements are not an error");
    assert!(nothing.is_empty());
}

#[gtest]
fn invalid_requests_report_valid_ranges() {
    let (_dir, device) = setup();
    let buffer = device
        .read_multiplexed(&RegisterPath::parse("DAQ.ADC"))
        .expect("region reads");

    let error = demultiplex_request(&buffer, "2", "", "", RowOrder::SampleMajor)
        .expect_err("sequence 2 does not exist");
    assert_eq!(error.kind(), ValidationErrorKind::RangeError);
    assert_that!(
        error.to_string(),
        contains_substring("Valid seqNumbers are in the range [0, 1]")
    );

    assert_that!(
        device.read_raw(&RegisterPath::parse("BOARD.WORD_SETPOINT"), 1, 2),
        err(displays_as(contains_substring("exceed the 2 elements")))
    );
}

#[test]
fn unknown_alias_and_sdm_uri_are_rejected() {
    let (dir, _device) = setup();
    let dmap_file = dir.path().join("CommandLineTools.dmap");
    assert!(matches!(
        resolve_device("NOPE", Some(&dmap_file)),
        Err(BoardError::Argument(_))
    ));
    assert!(matches!(
        resolve_device("sdm://./pci:llrf=llrf.map", Some(&dmap_file)),
        Err(BoardError::Descriptor(_))
    ));
}
