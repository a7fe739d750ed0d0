//! Rate parsing and formatting with tc's unit grammar.
//!
//! Rates travel to the kernel as `u32` bytes per second. On the command line they are written
//! as a number with an optional unit, e.g. `1000mbit` or `12.5MBps`; a bare number is taken as
//! bits per second. Adapted from `get_rate()` and `print_rate()` in `iproute2/tc/tc_util.c`.

/// Unit suffixes and their scale to bits per second. Matched case-insensitively.
///
/// Longest suffix first, so `kbit` isn't taken for `bit`.
const SUFFIXES: &[(&str, f64)] = &[
    ("kibit", 1024.),
    ("mibit", 1024. * 1024.),
    ("gibit", 1024. * 1024. * 1024.),
    ("tibit", 1024. * 1024. * 1024. * 1024.),
    ("kibps", 8. * 1024.),
    ("mibps", 8. * 1024. * 1024.),
    ("gibps", 8. * 1024. * 1024. * 1024.),
    ("tibps", 8. * 1024. * 1024. * 1024. * 1024.),
    ("kbit", 1000.),
    ("mbit", 1_000_000.),
    ("gbit", 1_000_000_000.),
    ("tbit", 1_000_000_000_000.),
    ("kbps", 8_000.),
    ("mbps", 8_000_000.),
    ("gbps", 8_000_000_000.),
    ("tbps", 8_000_000_000_000.),
    ("bit", 1.),
    ("bps", 8.),
];

/// How rates are rendered when printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RateUnits {
    /// Powers of 1000: `Mbit`, `Kbit`.
    #[default]
    Si,
    /// Powers of 1024: `Mibit`, `Kibit` (tc's `-iec`).
    Iec,
}

/// Errors raised while parsing a rate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RateError {
    /// Not a number with a known unit.
    #[error("invalid rate \"{0}\"")]
    Invalid(String),
    /// Negative, or more than `u32::MAX` bytes per second.
    #[error("rate \"{0}\" is out of range")]
    OutOfRange(String),
}

/// Parse a rate into bytes per second.
///
/// Fractional bytes are truncated; a result that doesn't fit a `u32` is rejected.
pub fn parse_rate(value: &str) -> Result<u32, RateError> {
    let lower = value.to_ascii_lowercase();

    let bits = SUFFIXES
        .iter()
        .filter(|(suffix, _)| lower.ends_with(suffix))
        .find_map(|(suffix, scale)| {
            let number = &value[..value.len() - suffix.len()];
            parse_number(number).map(|n| n * scale)
        })
        .or_else(|| parse_number(value))
        .ok_or_else(|| RateError::Invalid(value.to_string()))?;

    let bytes = bits / 8.;
    if bytes.is_nan() || bytes < 0. || bytes.floor() > u32::MAX as f64 {
        return Err(RateError::OutOfRange(value.to_string()));
    }

    Ok(bytes as u32)
}

fn parse_number(number: &str) -> Option<f64> {
    if number.is_empty() {
        return None;
    }

    number.parse().ok()
}

/// Format a rate given in bytes per second, like tc's `print_rate()`.
pub fn format_rate(rate: u32, units: RateUnits) -> String {
    let bits = rate as f64 * 8.;

    match units {
        RateUnits::Si => {
            if bits >= 1000. * 1_000_000. {
                format!("{:.0}Mbit", bits / 1_000_000.)
            } else if bits >= 1000. * 1000. {
                format!("{:.0}Kbit", bits / 1000.)
            } else {
                format!("{bits:.0}bit")
            }
        }
        RateUnits::Iec => {
            if bits >= 1000. * 1024. * 1024. {
                format!("{:.0}Mibit", bits / (1024. * 1024.))
            } else if bits >= 1000. * 1024. {
                format!("{:.0}Kibit", bits / 1024.)
            } else {
                format!("{bits:.0}bit")
            }
        }
    }
}
