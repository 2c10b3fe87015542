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

//! Text rendering of register values.

use boardctl::validation::DisplayMode;

/// Scientific notation with 8 fractional digits and an exponent of at least two digits, e.g.
/// `-1.25000000e-03`.
pub fn format_scientific(value: f64) -> String {
    if value.is_nan() {
        return String::from("nan");
    }
    if value.is_infinite() {
        return String::from(if value < 0.0 { "-inf" } else { "inf" });
    }
    let formatted = format!("{value:.8e}");
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or_default();
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs())
        }
        None => formatted,
    }
}

/// A raw register word in the given mode. Raw and hex show the word as unsigned.
pub fn format_word(word: i32, mode: DisplayMode) -> String {
    match mode {
        DisplayMode::Hex => format!("{:x}", word as u32),
        DisplayMode::Raw | DisplayMode::Double => (word as u32).to_string(),
    }
}

/// One value per line.
pub fn lines<I>(values: I) -> String
where
    I: IntoIterator<Item = String>,
{
    values.into_iter().fold(String::new(), |mut out, value| {
        out.push_str(&value);
        out.push('\n');
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case::one(1.0, "1.00000000e+00")]
    #[case::zero(0.0, "0.00000000e+00")]
    #[case::negative_small(-0.00125, "-1.25000000e-03")]
    #[case::large(123456789.0, "1.23456789e+08")]
    #[case::three_digit_exponent(1e100, "1.00000000e+100")]
    #[case::rounded(2.0 / 3.0, "6.66666667e-01")]
    #[case::nan(f64::NAN, "nan")]
    #[case::negative_infinity(f64::NEG_INFINITY, "-inf")]
    fn scientific(#[case] value: f64, #[case] expected: &str) {
        assert_eq!(format_scientific(value), expected);
    }

    #[rstest]
    #[case::raw_positive(42, DisplayMode::Raw, "42")]
    #[case::raw_negative(-1, DisplayMode::Raw, "4294967295")]
    #[case::hex(255, DisplayMode::Hex, "ff")]
    #[case::hex_negative(-2, DisplayMode::Hex, "fffffffe")]
    fn words(#[case] word: i32, #[case] mode: DisplayMode, #[case] expected: &str) {
        assert_eq!(format_word(word, mode), expected);
    }

    #[test]
    fn lines_end_with_newline() {
        assert_eq!(lines(vec!["a".to_string(), "b".to_string()]), "a\nb\n");
        assert_eq!(lines(Vec::<String>::new()), "");
    }
}
