//! Decoders for the text found in the modem's table cells.
//!
//! Every decoder returns `None` when the text does not match its pattern;
//! callers fall back to the kind's zero value and record a [`FieldError`].

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Semantic field a table cell feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Channel,
    LockStatus,
    Modulation,
    ChannelType,
    Frequency,
    Power,
    Snr,
    SymbolRate,
    CorrectableErrors,
    UncorrectableErrors,
    CounterName,
    CounterValue,
    Uptime,
    Firmware,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Channel => "channel",
            Field::LockStatus => "lock_status",
            Field::Modulation => "modulation",
            Field::ChannelType => "channel_type",
            Field::Frequency => "frequency",
            Field::Power => "power",
            Field::Snr => "snr",
            Field::SymbolRate => "symbol_rate",
            Field::CorrectableErrors => "correctable_errors",
            Field::UncorrectableErrors => "uncorrectable_errors",
            Field::CounterName => "counter_name",
            Field::CounterValue => "counter_value",
            Field::Uptime => "uptime",
            Field::Firmware => "firmware",
        };
        f.write_str(name)
    }
}

/// How the text of a cell is turned into a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Trimmed text, copied verbatim.
    Text,
    /// `"<number> Hz"`, rendered as a `"<MHz with 2 decimals> Mhz"` label.
    FrequencyHz,
    /// `"<number> dBmV"`.
    PowerDbmv,
    /// `"<number> dB"`.
    SnrDb,
    /// `"<number> Ksym/sec"`, converted to symbols/sec.
    SymbolRateKsym,
    /// Plain non-negative decimal integer.
    Integer,
}

impl FieldKind {
    /// Human-readable pattern, used in decode error messages.
    pub fn expected(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::FrequencyHz => "<number> Hz",
            FieldKind::PowerDbmv => "<number> dBmV",
            FieldKind::SnrDb => "<number> dB",
            FieldKind::SymbolRateKsym => "<number> Ksym/sec",
            FieldKind::Integer => "<integer>",
        }
    }

    /// Value a field takes when its cell cannot be decoded.
    pub fn zero(&self) -> CellValue {
        match self {
            FieldKind::Text => CellValue::Text(String::new()),
            FieldKind::FrequencyHz => CellValue::Text(frequency_label_from_hz(0.0)),
            FieldKind::PowerDbmv | FieldKind::SnrDb | FieldKind::SymbolRateKsym => {
                CellValue::Float(0.0)
            }
            FieldKind::Integer => CellValue::Integer(0),
        }
    }

    pub fn decode(&self, text: &str) -> Option<CellValue> {
        let text = text.trim();
        match self {
            FieldKind::Text => Some(CellValue::Text(text.to_string())),
            FieldKind::FrequencyHz => frequency_label(text).map(CellValue::Text),
            FieldKind::PowerDbmv => number_with_unit(text, "dBmV").map(CellValue::Float),
            FieldKind::SnrDb => number_with_unit(text, "dB").map(CellValue::Float),
            FieldKind::SymbolRateKsym => symbol_rate(text).map(CellValue::Float),
            FieldKind::Integer => text.parse::<u64>().ok().map(CellValue::Integer),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Float(f64),
    Integer(u64),
}

/// A cell whose text did not match its expected pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot decode {field} from {text:?} (expected {expected})")]
pub struct FieldError {
    pub field: Field,
    /// Zero-based column index, `None` for single-cell lookups.
    pub column: Option<usize>,
    pub text: String,
    pub expected: &'static str,
}

/// Parses `"<number><ws><unit>"`.
fn number_with_unit(text: &str, unit: &str) -> Option<f64> {
    let number = text.trim().strip_suffix(unit)?.trim_end();
    let value: f64 = number.parse().ok()?;
    value.is_finite().then_some(value)
}

fn frequency_label_from_hz(hz: f64) -> String {
    format!("{:.2} Mhz", hz / 1e6)
}

/// `"602000000 Hz"` → `"602.00 Mhz"`.
pub fn frequency_label(text: &str) -> Option<String> {
    number_with_unit(text, "Hz").map(frequency_label_from_hz)
}

/// `"5120 Ksym/sec"` → `5_120_000.0`.
pub fn symbol_rate(text: &str) -> Option<f64> {
    number_with_unit(text, "Ksym/sec").map(|ksym| ksym * 1000.0)
}

/// Parses `"<d> days <hh>h:<mm>m:<ss>s"`.
pub fn uptime(text: &str) -> Option<Duration> {
    let (days, clock) = text.trim().split_once(" days ")?;
    let days: u64 = days.trim().parse().ok()?;

    let mut parts = clock.trim().split(':');
    let hours = clock_part(parts.next()?, 'h')?;
    let minutes = clock_part(parts.next()?, 'm')?;
    let seconds = clock_part(parts.next()?, 's')?;
    if parts.next().is_some() {
        return None;
    }

    Some(Duration::from_secs(
        days * 86_400 + hours * 3_600 + minutes * 60 + seconds,
    ))
}

/// One or two digits followed by `unit`.
fn clock_part(part: &str, unit: char) -> Option<u64> {
    let digits = part.strip_suffix(unit)?;
    if digits.is_empty() || digits.len() > 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
