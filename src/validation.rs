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

//! Bounds validation of user supplied offsets, element counts, sequence lists and display modes.
//!
//! Every command that takes an optional `[offset] [elements]` pair goes through the same
//! functions here, whether it addresses a register, a DMA area or the sequences of a multiplexed
//! region. An empty token always means "use the default"; any other token must be a plain
//! unsigned decimal number. Leading or trailing whitespace is not stripped, so `" 3"` fails to
//! parse.
//!
//! # Zero element counts
//!
//! [`extract_num_elements`] may legitimately return `0`, either because the user asked for zero
//! elements or because the offset sits at the end of the register. Callers treat this as
//! "nothing to do": they print nothing and report success.

use crate::error::{Parameter, RangeViolation, ValidationError};
use std::fmt;

/// Parse a token made of ASCII digits only.
fn parse_unsigned(token: &str, parameter: Parameter) -> Result<usize, ValidationError> {
    let parse_error = || ValidationError::Parse {
        parameter,
        token: token.to_string(),
    };
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(parse_error());
    }
    // digits only, so the only possible failure is overflow
    token.parse::<usize>().map_err(|_| parse_error())
}

/// Starting element for a read or write.
///
/// # Arguments
///
/// * `text` - The user's token, empty if none was given
/// * `max_offset` - Largest valid offset, usually the element count minus one
///
/// # Returns: `Result<usize, ValidationError>`
/// * `Ok(0)` - No offset given
/// * `Ok(usize)` - The parsed offset, at most `max_offset`
/// * `Err(ValidationError::Parse)` - `text` is not an unsigned decimal number
/// * `Err(ValidationError::Range)` - The offset is larger than `max_offset`
pub fn extract_offset(text: &str, max_offset: usize) -> Result<usize, ValidationError> {
    if text.is_empty() {
        return Ok(0);
    }
    let offset = parse_unsigned(text, Parameter::Offset)?;
    if offset > max_offset {
        return Err(RangeViolation::Offset { offset, max_offset }.into());
    }
    Ok(offset)
}

/// Number of elements to transfer starting at `valid_offset`.
///
/// # Arguments
///
/// * `text` - The user's token, empty if none was given
/// * `valid_offset` - An offset already returned by [`extract_offset`]
/// * `max_elements` - Total number of elements of the register or sequence
///
/// # Returns: `Result<usize, ValidationError>`
/// * `Ok(usize)` - The requested count, or all remaining elements when `text` is empty. May be 0.
/// * `Err(ValidationError::Parse)` - `text` is not an unsigned decimal number
/// * `Err(ValidationError::Range)` - More elements requested than remain after the offset
pub fn extract_num_elements(
    text: &str,
    valid_offset: usize,
    max_elements: usize,
) -> Result<usize, ValidationError> {
    let available = max_elements.saturating_sub(valid_offset);
    if text.is_empty() {
        return Ok(available);
    }
    let requested = parse_unsigned(text, Parameter::ElementCount)?;
    if requested > available {
        return Err(RangeViolation::DataSize {
            requested,
            available,
        }
        .into());
    }
    Ok(requested)
}

/// Ordered list of sequence (channel) indices.
///
/// An empty `text` selects every sequence in natural order. Otherwise `text` is split on single
/// spaces and every token must be an index below `max_sequences`. Order and duplicates are kept:
/// `"2 0 2"` selects sequence 2, then 0, then 2 again.
pub fn extract_sequence_list(
    text: &str,
    max_sequences: usize,
) -> Result<Vec<usize>, ValidationError> {
    if text.is_empty() {
        return Ok((0..max_sequences).collect());
    }
    text.split(' ')
        .map(|token| {
            let index = parse_unsigned(token, Parameter::SequenceList)?;
            if index >= max_sequences {
                return Err(RangeViolation::Sequence {
                    index,
                    count: max_sequences,
                }
                .into());
            }
            Ok(index)
        })
        .collect()
}

/// Values to write, separated by spaces or tabs.
pub fn extract_write_values(text: &str) -> Result<Vec<f64>, ValidationError> {
    text.split([' ', '\t'])
        .map(|token| {
            token
                .parse::<f64>()
                .map_err(|_| ValidationError::Parse {
                    parameter: Parameter::WriteValue,
                    token: token.to_string(),
                })
        })
        .collect()
}

/// Check that `count` values fit into a register of `max_elements` starting at `valid_offset`.
pub fn check_write_size(
    count: usize,
    valid_offset: usize,
    max_elements: usize,
) -> Result<(), ValidationError> {
    let available = max_elements.saturating_sub(valid_offset);
    if count > available {
        return Err(RangeViolation::DataSize {
            requested: count,
            available,
        }
        .into());
    }
    Ok(())
}

/// How read values are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// Raw register words as unsigned decimal numbers
    Raw,
    /// Raw register words in hexadecimal
    Hex,
    /// Fixed point converted floating point values
    Double,
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DisplayMode::Raw => "raw",
            DisplayMode::Hex => "hex",
            DisplayMode::Double => "double",
        })
    }
}

/// Which command asks for a display mode. Determines the default and the accepted modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadContext {
    /// Generic register read: defaults to `double`, accepts `raw | hex | double`
    Register,
    /// Raw DMA read: defaults to `raw`, accepts `raw | hex`
    DmaRaw,
}

impl ReadContext {
    fn default_mode(self) -> DisplayMode {
        match self {
            ReadContext::Register => DisplayMode::Double,
            ReadContext::DmaRaw => DisplayMode::Raw,
        }
    }

    fn allowed(self) -> &'static [DisplayMode] {
        match self {
            ReadContext::Register => &[DisplayMode::Raw, DisplayMode::Hex, DisplayMode::Double],
            ReadContext::DmaRaw => &[DisplayMode::Raw, DisplayMode::Hex],
        }
    }

    fn allowed_text(self) -> &'static str {
        match self {
            ReadContext::Register => "raw | hex | double",
            ReadContext::DmaRaw => "raw | hex",
        }
    }
}

pub fn extract_display_mode(text: &str, context: ReadContext) -> Result<DisplayMode, ValidationError> {
    if text.is_empty() {
        return Ok(context.default_mode());
    }
    context
        .allowed()
        .iter()
        .copied()
        .find(|mode| mode.to_string() == text)
        .ok_or_else(|| ValidationError::InvalidMode {
            mode: text.to_string(),
            allowed: context.allowed_text(),
        })
}
