//! Usage payload normalization
//!
//! Maps the two wire payload shapes into the canonical sample:
//! - flat shape with fractional-second CPU fields (`user_time`, `sys_time`)
//! - legacy rusage shape with sec/usec already split (`ru_utime.tv_sec` etc.)
//!
//! Missing numeric fields default to zero; they are not an error.

use crate::models::Sample;
use serde_json::Value;

/// Split fractional seconds into floor seconds and a floored microsecond
/// remainder, clamped into 0..=999_999.
fn split_cpu_seconds(value: f64) -> (i64, i64) {
    let sec = value.floor();
    let usec = ((value - sec) * 1_000_000.0).floor() as i64;
    (sec as i64, usec.clamp(0, 999_999))
}

fn field_f64(data: &Value, name: &str) -> f64 {
    data.get(name).and_then(Value::as_f64).unwrap_or(0.0)
}

fn field_i64(data: &Value, name: &str) -> i64 {
    data.get(name).and_then(Value::as_i64).unwrap_or(0)
}

/// sec/usec pair from a legacy `{tv_sec, tv_usec}` object.
fn legacy_timeval(data: &Value, name: &str) -> (i64, i64) {
    match data.get(name) {
        Some(tv) => (field_i64(tv, "tv_sec"), field_i64(tv, "tv_usec")),
        None => (0, 0),
    }
}

/// Build the canonical sample from a usage payload.
///
/// `ts` is the envelope timestamp when the wire supplied one; `fallback_now`
/// is the caller's wall-clock reading used otherwise.
pub fn normalize(data: &Value, ts: Option<f64>, fallback_now: f64) -> Sample {
    let timestamp = ts.unwrap_or(fallback_now);

    // Legacy payloads already carry the sec/usec split.
    if data.get("ru_utime").is_some() || data.get("ru_stime").is_some() {
        let (user_cpu_sec, user_cpu_usec) = legacy_timeval(data, "ru_utime");
        let (sys_cpu_sec, sys_cpu_usec) = legacy_timeval(data, "ru_stime");
        return Sample {
            user_cpu_sec,
            user_cpu_usec,
            sys_cpu_sec,
            sys_cpu_usec,
            max_rss_kb: field_i64(data, "ru_maxrss"),
            minor_faults: field_i64(data, "ru_minflt"),
            major_faults: field_i64(data, "ru_majflt"),
            timestamp,
        };
    }

    let (user_cpu_sec, user_cpu_usec) = split_cpu_seconds(field_f64(data, "user_time"));
    let (sys_cpu_sec, sys_cpu_usec) = split_cpu_seconds(field_f64(data, "sys_time"));

    Sample {
        user_cpu_sec,
        user_cpu_usec,
        sys_cpu_sec,
        sys_cpu_usec,
        max_rss_kb: field_i64(data, "max_rss_kb"),
        minor_faults: field_i64(data, "minor_page_faults"),
        major_faults: field_i64(data, "major_page_faults"),
        timestamp,
    }
}
