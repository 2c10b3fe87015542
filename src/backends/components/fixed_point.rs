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

//! Conversion between raw register words and floating point values.
//!
//! A channel stores `width` significant bits, of which `fractional_bits` lie behind the binary
//! point (negative values scale up). Bits above `width` in a raw word are ignored when reading.

use crate::catalogue::ChannelInfo;
use crate::error::BoardError;

/// Fractional bit counts outside this range cannot be represented by an f64 scale factor.
const FRACTIONAL_BITS_RANGE: std::ops::RangeInclusive<i32> = -1024..=1021;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedPointConverter {
    width: u32,
    signed: bool,
    mask: u32,
    /// 2^fractional_bits
    scale: f64,
}

impl FixedPointConverter {
    pub fn new(channel: &ChannelInfo) -> Result<Self, BoardError> {
        if !(1..=32).contains(&channel.width) {
            return Err(BoardError::Argument(format!(
                "Register width {} is not supported, it must be between 1 and 32 bits.",
                channel.width
            )));
        }
        if !FRACTIONAL_BITS_RANGE.contains(&channel.fractional_bits) {
            return Err(BoardError::Argument(format!(
                "{} fractional bits are out of the supported range {FRACTIONAL_BITS_RANGE:?}.",
                channel.fractional_bits
            )));
        }
        let mask = match channel.width {
            32 => u32::MAX,
            w => (1u32 << w) - 1,
        };
        Ok(FixedPointConverter {
            width: channel.width,
            signed: channel.signed,
            mask,
            scale: 2f64.powi(channel.fractional_bits),
        })
    }

    fn min_raw(&self) -> i64 {
        if self.signed {
            -(1i64 << (self.width - 1))
        } else {
            0
        }
    }

    fn max_raw(&self) -> i64 {
        if self.signed {
            (1i64 << (self.width - 1)) - 1
        } else {
            (1i64 << self.width) - 1
        }
    }

    pub fn to_double(&self, raw: i32) -> f64 {
        let bits = (raw as u32) & self.mask;
        let sign_bit = 1u32 << (self.width - 1);
        let value = if self.signed && bits & sign_bit != 0 {
            i64::from(bits) - (1i64 << self.width)
        } else {
            i64::from(bits)
        };
        value as f64 / self.scale
    }

    /// Round to the nearest representable value, saturating at the limits of the channel.
    pub fn to_raw(&self, value: f64) -> i32 {
        let scaled = (value * self.scale).round();
        let clamped = if scaled.is_nan() {
            0
        } else {
            scaled.clamp(self.min_raw() as f64, self.max_raw() as f64) as i64
        };
        ((clamped as u64) & u64::from(self.mask)) as u32 as i32
    }
}
