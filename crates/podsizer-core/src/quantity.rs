//! Kubernetes quantity parsing and canonical rendering
//!
//! Workload documents carry quantities as strings (`"500m"`, `"1Gi"`,
//! `"2k"`, `"1e3"`) or bare numbers. [`ResourceAmount`] parses the
//! quantity grammar once, holds the value at milli precision, and
//! renders it back in canonical form: no fractional digits, exponent
//! as large as possible.

use std::fmt;

use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use serde::{Serialize, Serializer};

use crate::error::{CoreError, Result};

/// Rendering format of a quantity, inferred from its suffix
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    /// Plain integers and the `m`/`k`/`M`/`G`/`T`/`P`/`E` suffixes
    #[default]
    DecimalSi,
    /// The `Ki`/`Mi`/`Gi`/`Ti`/`Pi`/`Ei` suffixes
    BinarySi,
    /// Scientific notation, e.g. `1e3`
    DecimalExponent,
}

/// A parsed resource quantity
///
/// The value is held as a signed 64-bit count of milli-units (1/1000
/// of the base unit: millicores for cpu, milli-bytes for memory and
/// storage). Sub-milli precision in the input (`n`/`u` suffixes,
/// long fractions) is rounded up, so a nonzero input never parses to
/// zero.
///
/// Equality and ordering compare the value only; the format is
/// rendering metadata.
#[derive(Debug, Clone, Copy)]
pub struct ResourceAmount {
    milli: i64,
    format: Format,
}

impl ResourceAmount {
    /// The zero amount
    pub const fn zero() -> Self {
        Self {
            milli: 0,
            format: Format::DecimalSi,
        }
    }

    /// Build an amount from a milli-unit count
    pub const fn from_milli(milli: i64, format: Format) -> Self {
        Self { milli, format }
    }

    /// Value in milli-units
    pub const fn milli(&self) -> i64 {
        self.milli
    }

    /// Rendering format
    pub const fn format(&self) -> Format {
        self.format
    }

    pub const fn is_zero(&self) -> bool {
        self.milli == 0
    }

    /// Parse a quantity string
    ///
    /// Accepts an optional sign, an integer or decimal mantissa, and
    /// one of: no suffix, a sub-unit suffix (`n`, `u`, `m`), a decimal
    /// SI suffix (`k`, `M`, `G`, `T`, `P`, `E`), a binary SI suffix
    /// (`Ki` .. `Ei`), or a decimal exponent (`e3`, `E-2`).
    pub fn parse(input: &str) -> Result<Self> {
        let s = input.trim();
        let (sign, rest) = match s.as_bytes().first().copied() {
            Some(b'-') => (-1i128, &s[1..]),
            Some(b'+') => (1, &s[1..]),
            Some(_) => (1, s),
            None => return Err(invalid(input, "empty string")),
        };

        // Split the mantissa from the suffix
        let mut end = 0;
        let mut seen_dot = false;
        for &b in rest.as_bytes() {
            match b {
                b'0'..=b'9' => end += 1,
                b'.' if !seen_dot => {
                    seen_dot = true;
                    end += 1;
                }
                _ => break,
            }
        }
        let (number, suffix) = rest.split_at(end);
        let (int_part, frac_part) = match number.split_once('.') {
            Some((i, f)) => (i, f),
            None => (number, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid(input, "no digits"));
        }
        if frac_part.len() > 30 {
            return Err(invalid(input, "too many fractional digits"));
        }

        let digits: i128 = if int_part.len() + frac_part.len() > 38 {
            return Err(invalid(input, "value out of range"));
        } else {
            format!("{int_part}{frac_part}")
                .parse()
                .map_err(|_| invalid(input, "value out of range"))?
        };

        let (scale_num, scale_den, format) = scale_for_suffix(input, suffix)?;

        // milli = ceil(digits * scale * 1000 / 10^len(frac))
        let numerator = digits
            .checked_mul(scale_num)
            .and_then(|n| n.checked_mul(1000))
            .ok_or_else(|| invalid(input, "value out of range"))?;
        let denominator = scale_den * 10i128.pow(frac_part.len() as u32);
        let mut milli = numerator / denominator;
        if numerator % denominator != 0 {
            milli += 1;
        }
        milli *= sign;

        i64::try_from(milli)
            .map(|milli| Self { milli, format })
            .map_err(|_| invalid(input, "value out of range"))
    }

    /// Render as a `k8s-openapi` quantity in canonical form
    pub fn to_quantity(&self) -> Quantity {
        Quantity(self.to_string())
    }
}

/// Scale factor (as a fraction) and format for a quantity suffix
fn scale_for_suffix(input: &str, suffix: &str) -> Result<(i128, i128, Format)> {
    const KI: i128 = 1024;
    let scale = match suffix {
        "" => (1, 1, Format::DecimalSi),
        "n" => (1, 1_000_000_000, Format::DecimalSi),
        "u" => (1, 1_000_000, Format::DecimalSi),
        "m" => (1, 1_000, Format::DecimalSi),
        "k" => (1_000, 1, Format::DecimalSi),
        "M" => (1_000_000, 1, Format::DecimalSi),
        "G" => (1_000_000_000, 1, Format::DecimalSi),
        "T" => (1_000_000_000_000, 1, Format::DecimalSi),
        "P" => (1_000_000_000_000_000, 1, Format::DecimalSi),
        "E" => (1_000_000_000_000_000_000, 1, Format::DecimalSi),
        "Ki" => (KI, 1, Format::BinarySi),
        "Mi" => (KI.pow(2), 1, Format::BinarySi),
        "Gi" => (KI.pow(3), 1, Format::BinarySi),
        "Ti" => (KI.pow(4), 1, Format::BinarySi),
        "Pi" => (KI.pow(5), 1, Format::BinarySi),
        "Ei" => (KI.pow(6), 1, Format::BinarySi),
        s if s.starts_with('e') || s.starts_with('E') => {
            let exp: i32 = s[1..]
                .parse()
                .map_err(|_| invalid(input, "malformed exponent"))?;
            if !(-30..=30).contains(&exp) {
                return Err(invalid(input, "exponent out of range"));
            }
            if exp >= 0 {
                (10i128.pow(exp as u32), 1, Format::DecimalExponent)
            } else {
                (1, 10i128.pow(exp.unsigned_abs()), Format::DecimalExponent)
            }
        }
        _ => return Err(invalid(input, "unrecognized suffix")),
    };
    Ok(scale)
}

fn invalid(value: &str, reason: &str) -> CoreError {
    CoreError::InvalidQuantity {
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

impl fmt::Display for ResourceAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.milli == 0 {
            return f.write_str("0");
        }
        // Values that are not whole base units fall back to the `m` suffix
        if self.milli % 1000 != 0 {
            return write!(f, "{}m", self.milli);
        }
        let value = self.milli / 1000;
        match self.format {
            Format::BinarySi => {
                const SUFFIXES: [&str; 7] = ["", "Ki", "Mi", "Gi", "Ti", "Pi", "Ei"];
                let (v, i) = reduce(value, 1024, SUFFIXES.len() - 1);
                write!(f, "{v}{}", SUFFIXES[i])
            }
            Format::DecimalSi => {
                const SUFFIXES: [&str; 7] = ["", "k", "M", "G", "T", "P", "E"];
                let (v, i) = reduce(value, 1000, SUFFIXES.len() - 1);
                write!(f, "{v}{}", SUFFIXES[i])
            }
            Format::DecimalExponent => {
                let (v, exp) = reduce(value, 10, 30);
                if exp == 0 {
                    write!(f, "{v}")
                } else {
                    write!(f, "{v}e{exp}")
                }
            }
        }
    }
}

/// Divide out the base as many times as it goes evenly, up to `max` steps
fn reduce(mut value: i64, base: i64, max: usize) -> (i64, usize) {
    let mut steps = 0;
    while steps < max && value % base == 0 {
        value /= base;
        steps += 1;
    }
    (value, steps)
}

impl PartialEq for ResourceAmount {
    fn eq(&self, other: &Self) -> bool {
        self.milli == other.milli
    }
}

impl Eq for ResourceAmount {}

impl PartialOrd for ResourceAmount {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ResourceAmount {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.milli.cmp(&other.milli)
    }
}

impl Serialize for ResourceAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl TryFrom<&Quantity> for ResourceAmount {
    type Error = CoreError;

    fn try_from(q: &Quantity) -> Result<Self> {
        Self::parse(&q.0)
    }
}

impl From<ResourceAmount> for Quantity {
    fn from(amount: ResourceAmount) -> Self {
        amount.to_quantity()
    }
}
