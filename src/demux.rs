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

//! Demultiplexing of channel buffers into the rows a command prints.
//!
//! A multiplexed data region delivers all of its sequences in one transfer. The device layer
//! de-interleaves that transfer into a [`ChannelBuffer`]; this module selects channels and a
//! sample range from it and lays the result out in one of two orders:
//!
//! - [`RowOrder::SampleMajor`] - one row per sample index, holding that sample of every selected
//!   channel. Used for tabular output with one line per sample.
//! - [`RowOrder::ChannelMajor`] - one row per selected channel, holding its samples in order.
//!   Used when printing one block per sequence.
//!
//! Selections and ranges must have passed [`crate::validation`] first, for example via
//! [`SequenceRequest::from_user_input`]. Out of bounds input is a bug in the caller and panics.

use crate::error::ValidationError;
use crate::validation::{extract_num_elements, extract_offset, extract_sequence_list};
use log::trace;

/// Rectangular `channels x samples_per_channel` buffer, stored channel after channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelBuffer<T> {
    channels: usize,
    samples_per_channel: usize,
    data: Vec<T>,
}

impl<T: Copy> ChannelBuffer<T> {
    /// Build from samples interleaved channel by channel: `c0s0 c1s0 c2s0 c0s1 ...`.
    ///
    /// Trailing samples which do not complete a block are dropped.
    pub fn from_interleaved(interleaved: &[T], channels: usize) -> Self {
        if channels == 0 {
            return ChannelBuffer {
                channels: 0,
                samples_per_channel: 0,
                data: Vec::new(),
            };
        }
        let samples_per_channel = interleaved.len() / channels;
        let mut data = Vec::with_capacity(channels * samples_per_channel);
        for channel in 0..channels {
            data.extend(
                interleaved
                    .iter()
                    .skip(channel)
                    .step_by(channels)
                    .take(samples_per_channel),
            );
        }
        ChannelBuffer {
            channels,
            samples_per_channel,
            data,
        }
    }

    /// Build from one row per channel. Returns `None` if the rows differ in length.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Option<Self> {
        let channels = rows.len();
        let samples_per_channel = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != samples_per_channel) {
            return None;
        }
        Some(ChannelBuffer {
            channels,
            samples_per_channel,
            data: rows.into_iter().flatten().collect(),
        })
    }

    /// Apply `f(channel, value)` to every sample.
    pub fn map<U, F>(&self, mut f: F) -> ChannelBuffer<U>
    where
        F: FnMut(usize, T) -> U,
    {
        let data = self
            .data
            .iter()
            .enumerate()
            .map(|(index, value)| f(index / self.samples_per_channel.max(1), *value))
            .collect();
        ChannelBuffer {
            channels: self.channels,
            samples_per_channel: self.samples_per_channel,
            data,
        }
    }
}

impl<T> ChannelBuffer<T> {
    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn samples_per_channel(&self) -> usize {
        self.samples_per_channel
    }

    /// All samples of one channel.
    ///
    /// # Panics
    ///
    /// Panics if `channel >= self.channels()`.
    pub fn channel(&self, channel: usize) -> &[T] {
        assert!(
            channel < self.channels,
            "channel {channel} out of bounds for {} channels",
            self.channels
        );
        let start = channel * self.samples_per_channel;
        &self.data[start..start + self.samples_per_channel]
    }
}

/// Contiguous range of sample indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleRange {
    pub offset: usize,
    pub length: usize,
}

impl SampleRange {
    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOrder {
    SampleMajor,
    ChannelMajor,
}

fn assert_in_bounds<T>(buffer: &ChannelBuffer<T>, selection: &[usize], range: SampleRange) {
    assert!(
        range.end() <= buffer.samples_per_channel(),
        "sample range {}..{} out of bounds for {} samples per channel",
        range.offset,
        range.end(),
        buffer.samples_per_channel()
    );
    if let Some(bad) = selection.iter().find(|&&c| c >= buffer.channels()) {
        panic!(
            "channel {bad} out of bounds for {} channels",
            buffer.channels()
        );
    }
}

/// One row per selected channel, each holding `range.length` samples.
///
/// # Panics
///
/// Panics if a selected channel or the range lies outside the buffer.
pub fn channel_major<T: Copy>(
    buffer: &ChannelBuffer<T>,
    selection: &[usize],
    range: SampleRange,
) -> Vec<Vec<T>> {
    assert_in_bounds(buffer, selection, range);
    if range.length == 0 {
        return Vec::new();
    }
    selection
        .iter()
        .map(|&channel| buffer.channel(channel)[range.offset..range.end()].to_vec())
        .collect()
}

/// One row per sample index in `range`, each holding that sample of every selected channel in
/// selection order.
///
/// # Panics
///
/// Panics if a selected channel or the range lies outside the buffer.
pub fn sample_major<T: Copy>(
    buffer: &ChannelBuffer<T>,
    selection: &[usize],
    range: SampleRange,
) -> Vec<Vec<T>> {
    assert_in_bounds(buffer, selection, range);
    if selection.is_empty() {
        return Vec::new();
    }
    (range.offset..range.end())
        .map(|sample| {
            selection
                .iter()
                .map(|&channel| buffer.channel(channel)[sample])
                .collect()
        })
        .collect()
}

pub fn demultiplex<T: Copy>(
    buffer: &ChannelBuffer<T>,
    selection: &[usize],
    range: SampleRange,
    order: RowOrder,
) -> Vec<Vec<T>> {
    trace!(
        "demultiplexing {} channels, samples {}..{}, {order:?}",
        selection.len(),
        range.offset,
        range.end()
    );
    match order {
        RowOrder::SampleMajor => sample_major(buffer, selection, range),
        RowOrder::ChannelMajor => channel_major(buffer, selection, range),
    }
}

/// A validated selection of sequences and samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRequest {
    pub selection: Vec<usize>,
    pub range: SampleRange,
}

impl SequenceRequest {
    /// Validate the user's sequence list, offset and element count against a region of
    /// `channels` sequences holding `samples_per_channel` samples each.
    ///
    /// # Returns: `Result<Option<SequenceRequest>, ValidationError>`
    /// * `Ok(Some(SequenceRequest))` - Something to extract
    /// * `Ok(None)` - Zero elements requested, nothing to do
    /// * `Err(ValidationError)` - A token failed to parse or lies out of range
    pub fn from_user_input(
        channels: usize,
        samples_per_channel: usize,
        sequence_list: &str,
        offset: &str,
        elements: &str,
    ) -> Result<Option<Self>, ValidationError> {
        let selection = extract_sequence_list(sequence_list, channels)?;
        let offset = extract_offset(offset, samples_per_channel.saturating_sub(1))?;
        let length = extract_num_elements(elements, offset, samples_per_channel)?;
        if length == 0 {
            return Ok(None);
        }
        Ok(Some(SequenceRequest {
            selection,
            range: SampleRange { offset, length },
        }))
    }
}

/// Validate user input against `buffer` and demultiplex it.
///
/// Returns no rows when zero elements are requested.
pub fn demultiplex_request<T: Copy>(
    buffer: &ChannelBuffer<T>,
    sequence_list: &str,
    offset: &str,
    elements: &str,
    order: RowOrder,
) -> Result<Vec<Vec<T>>, ValidationError> {
    let request = SequenceRequest::from_user_input(
        buffer.channels(),
        buffer.samples_per_channel(),
        sequence_list,
        offset,
        elements,
    )?;
    Ok(match request {
        Some(request) => demultiplex(buffer, &request.selection, request.range, order),
        None => Vec::new(),
    })
}
