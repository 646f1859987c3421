//! Numeric wire precisions.
//!
//! Every floating point measurement travels in one of four encodings selected
//! by the low two bits of its data identifier. All multi-byte values are
//! big-endian; the 16.32 fixed point format stores its fractional word first.

use std::fmt;
use std::str::FromStr;

use crate::error::{DecodeError, DecodeResult, ParseNameError};

pub const PRECISION_MASK: u16 = 0x0003;

const FP1220_SCALE: f64 = 1_048_576.0; // 2^20
const FP1632_SCALE: f64 = 4_294_967_296.0; // 2^32
const FP1632_MIN: i64 = -(1 << 47);
const FP1632_MAX: i64 = (1 << 47) - 1;

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum Precision {
    /// IEEE-754 single precision.
    #[default]
    Float32 = 0x0,
    /// Signed 12.20 fixed point, 4 bytes.
    Fp1220 = 0x1,
    /// Signed 16.32 fixed point, 6 bytes.
    Fp1632 = 0x2,
    /// IEEE-754 double precision.
    Float64 = 0x3,
}

impl Precision {
    pub const ALL: [Precision; 4] = [
        Precision::Float32,
        Precision::Fp1220,
        Precision::Fp1632,
        Precision::Float64,
    ];

    /// Extracts the precision subfield from a raw data identifier.
    pub const fn from_bits(raw: u16) -> Self {
        match raw & PRECISION_MASK {
            0x0 => Precision::Float32,
            0x1 => Precision::Fp1220,
            0x2 => Precision::Fp1632,
            _ => Precision::Float64,
        }
    }

    pub const fn bits(self) -> u16 {
        self as u16
    }

    /// Width in bytes of one value in this precision.
    pub const fn size(self) -> usize {
        match self {
            Precision::Float32 | Precision::Fp1220 => 4,
            Precision::Fp1632 => 6,
            Precision::Float64 => 8,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Precision::Float32 => "Float32",
            Precision::Fp1220 => "Fp1220",
            Precision::Fp1632 => "Fp1632",
            Precision::Float64 => "Float64",
        }
    }

    /// Decodes exactly one value. `bytes` must be [`Precision::size`] long.
    pub fn decode(self, bytes: &[u8]) -> DecodeResult<f64> {
        let width_error = || DecodeError::InvalidValueWidth {
            precision: self,
            expected: self.size(),
            actual: bytes.len(),
        };
        match self {
            Precision::Float32 => {
                let raw: [u8; 4] = bytes.try_into().map_err(|_| width_error())?;
                Ok(f64::from(f32::from_be_bytes(raw)))
            }
            Precision::Fp1220 => {
                let raw: [u8; 4] = bytes.try_into().map_err(|_| width_error())?;
                Ok(Fp1220(raw).to_f64())
            }
            Precision::Fp1632 => {
                let raw: [u8; 6] = bytes.try_into().map_err(|_| width_error())?;
                Ok(Fp1632(raw).to_f64())
            }
            Precision::Float64 => {
                let raw: [u8; 8] = bytes.try_into().map_err(|_| width_error())?;
                Ok(f64::from_be_bytes(raw))
            }
        }
    }

    /// Appends the wire form of `value` to `out`.
    ///
    /// Narrowing to `Float32` and rounding to the fixed point grids lose
    /// precision silently. Fixed point values outside the representable range
    /// saturate.
    pub fn encode(self, value: f64, out: &mut Vec<u8>) {
        match self {
            Precision::Float32 => out.extend_from_slice(&(value as f32).to_be_bytes()),
            Precision::Fp1220 => out.extend_from_slice(&Fp1220::from_f64(value).0),
            Precision::Fp1632 => out.extend_from_slice(&Fp1632::from_f64(value).0),
            Precision::Float64 => out.extend_from_slice(&value.to_be_bytes()),
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Precision {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Precision::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseNameError {
                what: "precision",
                value: s.to_string(),
            })
    }
}

/// Signed 12.20 fixed point value in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fp1220(pub [u8; 4]);

impl Fp1220 {
    pub fn from_f64(value: f64) -> Self {
        let raw = (value * FP1220_SCALE).round() as i32;
        Self(raw.to_be_bytes())
    }

    pub fn to_f64(self) -> f64 {
        f64::from(i32::from_be_bytes(self.0)) / FP1220_SCALE
    }
}

/// Signed 16.32 fixed point value in wire order: four fractional bytes
/// followed by two integer bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fp1632(pub [u8; 6]);

impl Fp1632 {
    pub fn from_f64(value: f64) -> Self {
        let raw = ((value * FP1632_SCALE).round() as i64).clamp(FP1632_MIN, FP1632_MAX);
        let [_, _, i1, i0, f3, f2, f1, f0] = raw.to_be_bytes();
        Self([f3, f2, f1, f0, i1, i0])
    }

    pub fn to_f64(self) -> f64 {
        let [f3, f2, f1, f0, i1, i0] = self.0;
        let sign = if i1 & 0x80 != 0 { 0xFF } else { 0x00 };
        let raw = i64::from_be_bytes([sign, sign, i1, i0, f3, f2, f1, f0]);
        raw as f64 / FP1632_SCALE
    }
}
