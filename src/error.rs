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

use std::fmt;
use std::path::PathBuf;

/// The category of user supplied token that failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parameter {
    Offset,
    ElementCount,
    SequenceList,
    WriteValue,
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Parameter::Offset => "Offset",
            Parameter::ElementCount => "numElements",
            Parameter::SequenceList => "sequence List",
            Parameter::WriteValue => "parameter to double",
        };
        f.write_str(name)
    }
}

/// Coarse classification of a [`ValidationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    ParseError,
    RangeError,
    InvalidModeError,
}

fn sequence_range(count: &usize) -> String {
    match count {
        0 => "The region holds no sequences".to_string(),
        n => format!("Valid seqNumbers are in the range [0, {}]", n - 1),
    }
}

/// A syntactically valid number that lies outside the hardware reported bounds.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeViolation {
    #[error("Offset {offset} exceeds register size. Valid offsets are in the range [0, {max_offset}]")]
    Offset { offset: usize, max_offset: usize },
    #[error(
        "Data size {requested} exceeds register size. Valid element counts are in the range [0, {available}]"
    )]
    DataSize { requested: usize, available: usize },
    #[error("seqNum {index} invalid. {}", sequence_range(.count))]
    Sequence { index: usize, count: usize },
}

/// Failure to turn a user supplied token into a value within hardware bounds.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Could not convert {parameter}: {token:?}")]
    Parse { parameter: Parameter, token: String },
    #[error(transparent)]
    Range(#[from] RangeViolation),
    #[error("Invalid display mode {mode:?}; Use {allowed}")]
    InvalidMode { mode: String, allowed: &'static str },
}

impl ValidationError {
    pub fn kind(&self) -> ValidationErrorKind {
        match self {
            ValidationError::Parse { .. } => ValidationErrorKind::ParseError,
            ValidationError::Range(_) => ValidationErrorKind::RangeError,
            ValidationError::InvalidMode { .. } => ValidationErrorKind::InvalidModeError,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("BoardError::Argument: {0}")]
    Argument(String),
    #[error("BoardError::RegisterNotFound: Register {0} does not exist in the catalogue")]
    RegisterNotFound(String),
    #[error("BoardError::Dimension: {0}")]
    Dimension(String),
    #[error("BoardError::MapFile: {file:?} line {line}: {msg}")]
    MapFile {
        file: PathBuf,
        line: usize,
        msg: String,
    },
    #[error("BoardError::DMapFile: {file:?} line {line}: {msg}")]
    DMapFile {
        file: PathBuf,
        line: usize,
        msg: String,
    },
    #[error("BoardError::Descriptor: {0}")]
    Descriptor(String),
    #[error("BoardError::Backend: {0}")]
    Backend(String),
    #[error("BoardError::IORead: An IO error occurred when reading from {file:?}: {e}")]
    IORead { file: PathBuf, e: std::io::Error },
    #[error("BoardError::IOWrite: An IO error occurred when writing to {file:?}: {e}")]
    IOWrite { file: PathBuf, e: std::io::Error },
    #[error("BoardError::IOReadDir: An IO error occurred when reading directory {dir:?}: {e}")]
    IOReadDir { dir: PathBuf, e: std::io::Error },
    #[error("BoardError::Internal: An Internal error occurred: {0}")]
    Internal(String),
}
