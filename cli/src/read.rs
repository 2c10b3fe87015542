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

//! `read` and `read_dma_raw`.

use crate::board::{DmapLocation, open_board};
use crate::format::{format_scientific, format_word, lines};
use boardctl::backends::backend::Device;
use boardctl::catalogue::RegisterPath;
use boardctl::error::BoardError;
use boardctl::validation::{
    DisplayMode, ReadContext, extract_display_mode, extract_num_elements, extract_offset,
};
use log::debug;

/// Optional trailing arguments of the read commands, empty when not given.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReadArgs<'a> {
    pub offset: &'a str,
    pub elements: &'a str,
    pub mode: &'a str,
}

/// Read a register and print one value per line.
///
/// `context` selects the default display mode and which modes are accepted. A request for zero
/// elements prints nothing.
pub fn read_handler(
    board: &str,
    module: &str,
    register: &str,
    args: ReadArgs,
    context: ReadContext,
    location: &DmapLocation,
) -> Result<String, BoardError> {
    let mode = extract_display_mode(args.mode, context)?;
    let device = open_board(board, location)?;
    let path = RegisterPath::new(module, register);
    let elements = device.register(&path)?.elements;

    let offset = extract_offset(args.offset, elements.saturating_sub(1))?;
    let count = extract_num_elements(args.elements, offset, elements)?;
    if count == 0 {
        debug!("Nothing to read from {path}");
        return Ok(String::new());
    }

    let output = match mode {
        DisplayMode::Double => lines(
            device
                .read(&path, offset, count)?
                .into_iter()
                .map(format_scientific),
        ),
        DisplayMode::Raw | DisplayMode::Hex => lines(
            device
                .read_raw(&path, offset, count)?
                .into_iter()
                .map(|word| format_word(word, mode)),
        ),
    };
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::test_board::TestBoard;
    use boardctl::error::{ValidationError, ValidationErrorKind};
    use googletest::prelude::*;
    use rstest::*;

    #[fixture]
    fn board() -> TestBoard {
        let board = TestBoard::new();
        // WORD_GAIN, 18 bits with 16 fractional bits
        board.poke(0, 0x10, &[0x10000, 0x18000, 0x38000, 7]);
        // AREA_DMA
        board.poke(2, 0x0, &[1, -1, 255, 4096]);
        board
    }

    fn read(
        board: &TestBoard,
        register: &str,
        args: ReadArgs,
        context: ReadContext,
    ) -> std::result::Result<String, BoardError> {
        let module = if register.starts_with("WORD") { "BOARD" } else { "ADC" };
        read_handler(&board.descriptor(), module, register, args, context, &board.location())
    }

    #[rstest]
    #[case::all_as_double(
        "WORD_GAIN", "", "", "", ReadContext::Register,
        "1.00000000e+00\n1.50000000e+00\n-5.00000000e-01\n1.06811523e-04\n"
    )]
    #[case::offset_and_count("WORD_GAIN", "1", "2", "double", ReadContext::Register, "1.50000000e+00\n-5.00000000e-01\n")]
    #[case::raw_of_fixed_point("WORD_GAIN", "2", "", "raw", ReadContext::Register, "229376\n7\n")]
    #[case::hex("WORD_GAIN", "0", "1", "hex", ReadContext::Register, "10000\n")]
    #[case::dma_defaults_to_raw("AREA_DMA", "", "", "", ReadContext::DmaRaw, "1\n4294967295\n255\n4096\n")]
    #[case::dma_hex("AREA_DMA", "1", "2", "hex", ReadContext::DmaRaw, "ffffffff\nff\n")]
    #[case::zero_elements("WORD_GAIN", "1", "0", "", ReadContext::Register, "")]
    fn read_prints_values(
        board: TestBoard,
        #[case] register: &str,
        #[case] offset: &str,
        #[case] elements: &str,
        #[case] mode: &str,
        #[case] context: ReadContext,
        #[case] expected: &str,
    ) {
        let args = ReadArgs { offset, elements, mode };
        assert_eq!(read(&board, register, args, context).expect("read succeeds"), expected);
    }

    #[rstest]
    #[case::offset_too_large("4", "", "", ReadContext::Register, ValidationErrorKind::RangeError)]
    #[case::too_many_elements("1", "4", "", ReadContext::Register, ValidationErrorKind::RangeError)]
    #[case::bad_offset("x", "", "", ReadContext::Register, ValidationErrorKind::ParseError)]
    #[case::bad_count("", "-1", "", ReadContext::Register, ValidationErrorKind::ParseError)]
    #[case::bad_mode("", "", "float", ReadContext::Register, ValidationErrorKind::InvalidModeError)]
    #[case::double_for_dma("", "", "double", ReadContext::DmaRaw, ValidationErrorKind::InvalidModeError)]
    fn invalid_arguments_are_rejected(
        board: TestBoard,
        #[case] offset: &str,
        #[case] elements: &str,
        #[case] mode: &str,
        #[case] context: ReadContext,
        #[case] kind: ValidationErrorKind,
    ) {
        let register = match context {
            ReadContext::Register => "WORD_GAIN",
            ReadContext::DmaRaw => "AREA_DMA",
        };
        let args = ReadArgs { offset, elements, mode };
        match read(&board, register, args, context) {
            Err(BoardError::Validation(e)) => assert_eq!(e.kind(), kind),
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[gtest]
    #[rstest]
    fn error_message_states_valid_range(board: TestBoard) {
        let args = ReadArgs {
            offset: "2",
            elements: "5",
            mode: "",
        };
        assert_that!(
            read(&board, "WORD_GAIN", args, ReadContext::Register),
            err(displays_as(contains_substring(
                "Data size 5 exceeds register size. Valid element counts are in the range [0, 2]"
            )))
        );
    }

    #[gtest]
    #[rstest]
    fn multiplexed_region_needs_read_seq(board: TestBoard) {
        assert_that!(
            read_handler(
                &board.descriptor(),
                "ADC",
                "DAQ",
                ReadArgs::default(),
                ReadContext::Register,
                &board.location()
            ),
            err(displays_as(contains_substring("use read_seq")))
        );
    }

    #[rstest]
    fn multiplexed_area_reads_as_raw_words(board: TestBoard) {
        board.poke(2, 0x100, &[1, -2, 3, 4, -5, 6]);
        let args = ReadArgs {
            offset: "1",
            elements: "",
            mode: "",
        };
        assert_eq!(
            read(&board, "AREA_MULTIPLEXED_SEQUENCE_DAQ", args, ReadContext::DmaRaw)
                .expect("read succeeds"),
            "4294967294\n3\n4\n4294967291\n6\n"
        );
    }

    #[test]
    fn parse_error_names_parameter() {
        let error = ValidationError::Parse {
            parameter: boardctl::error::Parameter::Offset,
            token: "x".into(),
        };
        assert_eq!(error.to_string(), "Could not convert Offset: \"x\"");
    }
}
