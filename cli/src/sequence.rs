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

//! `read_seq` and `read_seq_channels`: sequences of a multiplexed data region.

use crate::board::{DmapLocation, open_board};
use boardctl::backends::backend::Device;
use boardctl::catalogue::RegisterPath;
use boardctl::demux::{RowOrder, SequenceRequest, demultiplex};
use boardctl::error::BoardError;
use log::debug;

/// Optional trailing arguments of the sequence commands, empty when not given.
#[derive(Debug, Default, Clone, Copy)]
pub struct SequenceArgs<'a> {
    pub sequences: &'a str,
    pub offset: &'a str,
    pub elements: &'a str,
}

/// Read a multiplexed region and print the selected sequences.
///
/// With [`RowOrder::SampleMajor`] every line holds one sample index, each value followed by a
/// tab. With [`RowOrder::ChannelMajor`] every selected sequence is a block headed
/// `# sequence <i>`, one value per line.
pub fn read_seq_handler(
    board: &str,
    module: &str,
    region: &str,
    args: SequenceArgs,
    order: RowOrder,
    location: &DmapLocation,
) -> Result<String, BoardError> {
    let device = open_board(board, location)?;
    let path = RegisterPath::new(module, region);
    let buffer = device.read_multiplexed(&path)?;

    let Some(request) = SequenceRequest::from_user_input(
        buffer.channels(),
        buffer.samples_per_channel(),
        args.sequences,
        args.offset,
        args.elements,
    )?
    else {
        debug!("Nothing to read from {path}");
        return Ok(String::new());
    };

    let rows = demultiplex(&buffer, &request.selection, request.range, order);
    let mut ret_string = String::new();
    match order {
        RowOrder::SampleMajor => {
            for row in rows {
                for value in row {
                    ret_string += format!("{value}\t").as_str();
                }
                ret_string.push('\n');
            }
        }
        RowOrder::ChannelMajor => {
            for (sequence, row) in request.selection.iter().zip(rows) {
                ret_string += format!("# sequence {sequence}\n").as_str();
                for value in row {
                    ret_string += format!("{value}\n").as_str();
                }
            }
        }
    }
    Ok(ret_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::test_board::TestBoard;
    use boardctl::error::ValidationErrorKind;
    use googletest::prelude::*;
    use rstest::*;

    /// DAQ: channel 0 plain, channel 1 with one fractional bit, channel 2 unsigned 16 bit.
    #[fixture]
    fn board() -> TestBoard {
        let board = TestBoard::new();
        board.poke(2, 0x100, &[10, 3, 0xFFFF, 11, -4, 7]);
        board
    }

    fn read_seq(
        board: &TestBoard,
        args: SequenceArgs,
        order: RowOrder,
    ) -> std::result::Result<String, BoardError> {
        read_seq_handler(&board.descriptor(), "ADC", "DAQ", args, order, &board.location())
    }

    #[rstest]
    #[case::all_sequences("", "", "", "10\t1.5\t65535\t\n11\t-2\t7\t\n")]
    #[case::reordered_with_duplicates("2 0 2", "", "", "65535\t10\t65535\t\n7\t11\t7\t\n")]
    #[case::offset("1", "1", "", "-2\t\n")]
    #[case::count("0 1", "0", "1", "10\t1.5\t\n")]
    #[case::zero_count("0", "1", "0", "")]
    fn sample_major_table(
        board: TestBoard,
        #[case] sequences: &str,
        #[case] offset: &str,
        #[case] elements: &str,
        #[case] expected: &str,
    ) {
        let args = SequenceArgs {
            sequences,
            offset,
            elements,
        };
        assert_eq!(
            read_seq(&board, args, RowOrder::SampleMajor).expect("read_seq succeeds"),
            expected
        );
    }

    #[rstest]
    fn channel_major_blocks(board: TestBoard) {
        let args = SequenceArgs {
            sequences: "1 0",
            ..SequenceArgs::default()
        };
        assert_eq!(
            read_seq(&board, args, RowOrder::ChannelMajor).expect("read_seq succeeds"),
            "# sequence 1\n1.5\n-2\n# sequence 0\n10\n11\n"
        );
    }

    #[rstest]
    #[case::sequence_out_of_range("3", "", "", ValidationErrorKind::RangeError)]
    #[case::sequence_not_a_number("0,1", "", "", ValidationErrorKind::ParseError)]
    #[case::offset_out_of_range("", "2", "", ValidationErrorKind::RangeError)]
    #[case::too_many_elements("", "1", "2", ValidationErrorKind::RangeError)]
    fn invalid_selection_is_rejected(
        board: TestBoard,
        #[case] sequences: &str,
        #[case] offset: &str,
        #[case] elements: &str,
        #[case] kind: ValidationErrorKind,
    ) {
        let args = SequenceArgs {
            sequences,
            offset,
            elements,
        };
        match read_seq(&board, args, RowOrder::SampleMajor) {
            Err(BoardError::Validation(e)) => assert_eq!(e.kind(), kind),
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[gtest]
    #[rstest]
    fn sequence_error_states_valid_range(board: TestBoard) {
        let args = SequenceArgs {
            sequences: "0 5",
            ..SequenceArgs::default()
        };
        assert_that!(
            read_seq(&board, args, RowOrder::ChannelMajor),
            err(displays_as(contains_substring(
                "seqNum 5 invalid. Valid seqNumbers are in the range [0, 2]"
            )))
        );
    }

    #[gtest]
    #[rstest]
    fn plain_register_is_not_a_region(board: TestBoard) {
        assert_that!(
            read_seq_handler(
                &board.descriptor(),
                "ADC",
                "AREA_DMA",
                SequenceArgs::default(),
                RowOrder::SampleMajor,
                &board.location()
            ),
            err(displays_as(contains_substring("is not a multiplexed data region")))
        );
    }
}
