//! Human readable durations from nanosecond values

const NANOS_PER_MICRO: f64 = 1_000.0;
const NANOS_PER_MILLI: f64 = 1_000_000.0;
const MILLIS_PER_SECOND: f64 = 1_000.0;
const MILLIS_PER_MINUTE: f64 = 60_000.0;
const MILLIS_PER_HOUR: f64 = 3_600_000.0;
const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Values at or above this are shown without sub-millisecond units in the
/// summary lines
pub const SUB_MILLIS_THRESHOLD_NANOS: f64 = 1e8;

/// How a duration is rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DurationStyle {
    /// Show microseconds and nanoseconds instead of rounding to milliseconds
    pub sub_millis: bool,
    /// Keep only the most significant unit
    pub compact: bool,
}

impl DurationStyle {
    /// Full precision, as used by the progress line
    pub const PRECISE: Self = Self { sub_millis: true, compact: false };

    /// Most significant unit only, as used in the table
    pub const COMPACT: Self = Self { sub_millis: true, compact: true };

    /// Whole milliseconds or seconds with one decimal
    pub const COARSE: Self = Self { sub_millis: false, compact: false };

    /// Sub-millisecond precision for short totals only
    pub fn for_total(nanos: f64) -> Self {
        Self {
            sub_millis: nanos < SUB_MILLIS_THRESHOLD_NANOS,
            compact: false,
        }
    }
}

/// Render `nanos` like `1ms 234µs 567ns`, `2m 5.3s` or `17ms`.
///
/// Units are emitted from days down, skipping zero units. A zero or
/// non-finite input renders as `0ms`.
pub fn format_nanos(nanos: f64, style: DurationStyle) -> String {
    if !nanos.is_finite() || nanos <= 0.0 {
        return "0ms".to_string();
    }

    let total_millis = nanos / NANOS_PER_MILLI;
    let mut parts: Vec<String> = Vec::new();

    push_unit(&mut parts, (total_millis / MILLIS_PER_DAY).floor(), "d");
    push_unit(&mut parts, (total_millis / MILLIS_PER_HOUR).floor() % 24.0, "h");
    push_unit(&mut parts, (total_millis / MILLIS_PER_MINUTE).floor() % 60.0, "m");

    if style.sub_millis {
        push_unit(&mut parts, (total_millis / MILLIS_PER_SECOND).floor() % 60.0, "s");
        push_unit(&mut parts, total_millis.floor() % 1_000.0, "ms");
        push_unit(&mut parts, (nanos / NANOS_PER_MICRO).floor() % 1_000.0, "µs");
        push_unit(&mut parts, nanos.floor() % 1_000.0, "ns");
    } else if total_millis < MILLIS_PER_SECOND {
        // Anything above zero shows as at least 1ms
        let millis = if total_millis >= 1.0 {
            total_millis.round()
        } else {
            total_millis.ceil()
        };
        push_unit(&mut parts, millis, "ms");
    } else {
        let seconds = (total_millis % MILLIS_PER_MINUTE) / MILLIS_PER_SECOND;
        let decimals = if style.compact { 0 } else { 1 };
        let text = floor_decimals(seconds, decimals);
        let text = text.strip_suffix(".0").unwrap_or(&text);
        if text != "0" {
            parts.push(format!("{}s", text));
        }
    }

    if parts.is_empty() {
        return "0ms".to_string();
    }

    if style.compact {
        parts.truncate(1);
    }
    parts.join(" ")
}

fn push_unit(parts: &mut Vec<String>, value: f64, suffix: &str) {
    if value >= 1.0 {
        parts.push(format!("{}{}", value as u64, suffix));
    }
}

fn floor_decimals(value: f64, decimals: i32) -> String {
    let factor = 10f64.powi(decimals);
    let floored = (value * factor + 1e-7).floor() / factor;
    format!("{:.*}", decimals as usize, floored)
}
