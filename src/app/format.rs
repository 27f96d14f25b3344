//! Fixed-schema CSV record formatter.
//!
//! One declarative field-descriptor table drives a single generic
//! formatting routine — adding or removing a column is a data change in
//! [`FIELDS`] (plus the header), not a code change.
//!
//! `format_record` is a pure function: same record in, same line out, no
//! hidden state.  The line carries no terminator; each sink appends its
//! own line ending.

use core::fmt::Write as _;

use crate::app::record::{Record, Timestamp, FIELD_COUNT, PROBE_DISCONNECTED_C};
use crate::app::record::ReadingKind::{self, *};

/// CSV header — field order is the contract for every data line.
pub const CSV_HEADER: &str = "Timestamp,DHT_Temp(C),DHT_Hum(%),UV_Raw,Press(mBar),\
Press_Temp(C),Press_Alt(Ft),Probe_Temp(C),CO2(ppm),SCD_Temp(C),SCD_Hum(%)";

/// Worst case is eight full-range floats at two decimals plus separators;
/// 256 leaves comfortable headroom.
pub const LINE_CAP: usize = 256;

/// Formatted line buffer (fixed capacity, no heap).
pub type LineBuf = heapless::String<LINE_CAP>;

// ---------------------------------------------------------------------------
// Field descriptors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum Style {
    /// Fixed decimal places.
    Float { decimals: usize },
    /// Plain decimal integer, no padding.
    Integer,
}

#[derive(Debug, Clone, Copy)]
enum Invalid {
    /// Render the literal token `NaN`.
    NanToken,
    /// Render this sentinel numerically, in the field's own style.
    Sentinel(f32),
}

struct FieldSpec {
    kind: ReadingKind,
    style: Style,
    invalid: Invalid,
}

const fn float2(kind: ReadingKind, invalid: Invalid) -> FieldSpec {
    FieldSpec {
        kind,
        style: Style::Float { decimals: 2 },
        invalid,
    }
}

const fn integer(kind: ReadingKind) -> FieldSpec {
    FieldSpec {
        kind,
        style: Style::Integer,
        invalid: Invalid::NanToken,
    }
}

/// Data-line schema, in header order.
const FIELDS: [FieldSpec; FIELD_COUNT] = [
    float2(DhtTemp, Invalid::NanToken),
    float2(DhtHumidity, Invalid::NanToken),
    integer(UvRaw),
    float2(Pressure, Invalid::NanToken),
    float2(PressureTemp, Invalid::NanToken),
    float2(Altitude, Invalid::NanToken),
    float2(ProbeTemp, Invalid::Sentinel(PROBE_DISCONNECTED_C)),
    integer(Co2Ppm),
    float2(Co2Temp, Invalid::NanToken),
    float2(Co2Humidity, Invalid::NanToken),
];

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// Encode one record as a CSV line (no terminator).
pub fn format_record(record: &Record) -> LineBuf {
    let mut out = LineBuf::new();
    push_timestamp(&mut out, &record.timestamp);

    for (reading, spec) in record.readings.iter().zip(FIELDS.iter()) {
        debug_assert_eq!(reading.kind, spec.kind, "record order must match schema");
        let _ = out.push(',');
        if reading.valid {
            push_value(&mut out, spec.style, reading.value);
        } else {
            match spec.invalid {
                Invalid::NanToken => {
                    let _ = out.push_str("NaN");
                }
                Invalid::Sentinel(v) => push_value(&mut out, spec.style, v),
            }
        }
    }
    out
}

/// `YYYY-MM-DDTHH:MM:SS`, zero-padded, 24-hour clock.
fn push_timestamp(out: &mut LineBuf, ts: &Timestamp) {
    let _ = write!(
        out,
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
        ts.year, ts.month, ts.day, ts.hour, ts.minute, ts.second
    );
}

fn push_value(out: &mut LineBuf, style: Style, value: f32) {
    match style {
        Style::Float { decimals } => {
            let _ = write!(out, "{:.*}", decimals, value);
        }
        Style::Integer => {
            let _ = write!(out, "{}", value as i64);
        }
    }
}
