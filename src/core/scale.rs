//! Invertible scales mapping domain values to pixel coordinates.
//!
//! A degenerate domain (both ends equal) maps every value to the middle of the
//! range, and a degenerate range inverts to the middle of the domain. Neither
//! case divides by zero.

use chrono::{DateTime, Datelike, Duration, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// A continuous linear scale over `f64`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    domain: [f64; 2],
    range: [f64; 2],
}

impl LinearScale {
    pub fn new(domain: [f64; 2], range: [f64; 2]) -> Self {
        Self { domain, range }
    }

    pub fn domain(&self) -> [f64; 2] {
        self.domain
    }

    pub fn range(&self) -> [f64; 2] {
        self.range
    }

    /// Same range, different domain.
    pub fn with_domain(&self, domain: [f64; 2]) -> Self {
        Self::new(domain, self.range)
    }

    /// Map a domain value to the range.
    pub fn apply(&self, value: f64) -> f64 {
        let [d0, d1] = self.domain;
        let [r0, r1] = self.range;
        let span = d1 - d0;
        if span == 0.0 || !span.is_finite() {
            return (r0 + r1) / 2.0;
        }
        r0 + (value - d0) / span * (r1 - r0)
    }

    /// Map a range value back to the domain.
    pub fn invert(&self, pixel: f64) -> f64 {
        let [d0, d1] = self.domain;
        let [r0, r1] = self.range;
        let span = r1 - r0;
        if span == 0.0 || !span.is_finite() {
            return (d0 + d1) / 2.0;
        }
        d0 + (pixel - r0) / span * (d1 - d0)
    }

    /// Roughly `count` evenly spaced round values inside the domain.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let [d0, d1] = self.domain;
        let (lo, hi) = if d0 <= d1 { (d0, d1) } else { (d1, d0) };
        if lo == hi {
            return vec![lo];
        }
        let mut ticks = nice_ticks(lo, hi, count);
        if d0 > d1 {
            ticks.reverse();
        }
        ticks
    }
}

const E10: f64 = 7.0710678118654755; // sqrt(50)
const E5: f64 = 3.1622776601683795; // sqrt(10)
const E2: f64 = 1.4142135623730951; // sqrt(2)

/// Tick values on a 1-2-5 step grid.
fn nice_ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if count == 0 || !start.is_finite() || !stop.is_finite() {
        return Vec::new();
    }

    let step = (stop - start) / count as f64;
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    };

    // Work in integer multiples of the step to avoid float drift.
    if power < 0.0 {
        let inc = 10f64.powf(-power) / factor;
        let mut i1 = (start * inc).round();
        let mut i2 = (stop * inc).round();
        if i1 / inc < start {
            i1 += 1.0;
        }
        if i2 / inc > stop {
            i2 -= 1.0;
        }
        let n = (i2 - i1 + 1.0).max(0.0) as usize;
        (0..n).map(|i| (i1 + i as f64) / inc).collect()
    } else {
        let inc = 10f64.powf(power) * factor;
        let mut i1 = (start / inc).round();
        let mut i2 = (stop / inc).round();
        if i1 * inc < start {
            i1 += 1.0;
        }
        if i2 * inc > stop {
            i2 -= 1.0;
        }
        let n = (i2 - i1 + 1.0).max(0.0) as usize;
        (0..n).map(|i| (i1 + i as f64) * inc).collect()
    }
}

/// A linear scale whose domain is a pair of instants.
///
/// Instants are handled as epoch milliseconds internally.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeScale {
    inner: LinearScale,
}

impl TimeScale {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, range: [f64; 2]) -> Self {
        Self {
            inner: LinearScale::new(
                [start.timestamp_millis() as f64, end.timestamp_millis() as f64],
                range,
            ),
        }
    }

    /// Build from a raw millisecond domain.
    pub fn from_millis(domain: [f64; 2], range: [f64; 2]) -> Self {
        Self {
            inner: LinearScale::new(domain, range),
        }
    }

    pub fn domain(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let [d0, d1] = self.inner.domain();
        (millis_to_instant(d0), millis_to_instant(d1))
    }

    pub fn range(&self) -> [f64; 2] {
        self.inner.range()
    }

    /// Same range, different time domain.
    pub fn with_domain(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::new(start, end, self.inner.range())
    }

    pub fn apply(&self, t: DateTime<Utc>) -> f64 {
        self.inner.apply(t.timestamp_millis() as f64)
    }

    /// Pixel back to an instant, rounded to the millisecond.
    pub fn invert(&self, pixel: f64) -> DateTime<Utc> {
        millis_to_instant(self.inner.invert(pixel))
    }

    /// Unrounded inverse in epoch milliseconds.
    pub fn invert_millis(&self, pixel: f64) -> f64 {
        self.inner.invert(pixel)
    }

    /// Roughly `count` calendar-aligned ticks inside the domain.
    pub fn ticks(&self, count: usize) -> Vec<DateTime<Utc>> {
        let [d0, d1] = self.inner.domain();
        let (lo, hi) = if d0 <= d1 { (d0, d1) } else { (d1, d0) };
        if count == 0 {
            return Vec::new();
        }
        if lo == hi {
            return vec![millis_to_instant(lo)];
        }

        let target = (hi - lo) / count as f64;
        let mut ticks = match pick_interval(target) {
            Some(interval) => interval_ticks(interval, lo, hi),
            // Sub-second spans fall back to round millisecond steps.
            None => nice_ticks(lo, hi, count)
                .into_iter()
                .map(millis_to_instant)
                .collect(),
        };
        if d0 > d1 {
            ticks.reverse();
        }
        ticks
    }
}

fn millis_to_instant(ms: f64) -> DateTime<Utc> {
    let ms = if ms.is_finite() { ms.round() as i64 } else { 0 };
    Utc.timestamp_millis_opt(ms)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum TickInterval {
    Seconds(i64),
    Minutes(i64),
    Hours(i64),
    Days(i64),
    Months(u32),
    Years(i32),
}

impl TickInterval {
    fn approx_millis(self) -> f64 {
        const SECOND: f64 = 1_000.0;
        const DAY: f64 = 86_400_000.0;
        match self {
            TickInterval::Seconds(n) => n as f64 * SECOND,
            TickInterval::Minutes(n) => n as f64 * 60.0 * SECOND,
            TickInterval::Hours(n) => n as f64 * 3_600.0 * SECOND,
            TickInterval::Days(n) => n as f64 * DAY,
            TickInterval::Months(n) => n as f64 * 30.0 * DAY,
            TickInterval::Years(n) => n as f64 * 365.0 * DAY,
        }
    }
}

const TICK_INTERVALS: [TickInterval; 18] = [
    TickInterval::Seconds(1),
    TickInterval::Seconds(5),
    TickInterval::Seconds(15),
    TickInterval::Seconds(30),
    TickInterval::Minutes(1),
    TickInterval::Minutes(5),
    TickInterval::Minutes(15),
    TickInterval::Minutes(30),
    TickInterval::Hours(1),
    TickInterval::Hours(3),
    TickInterval::Hours(6),
    TickInterval::Hours(12),
    TickInterval::Days(1),
    TickInterval::Days(2),
    TickInterval::Days(7),
    TickInterval::Months(1),
    TickInterval::Months(3),
    TickInterval::Years(1),
];

/// Interval closest to the target step, or `None` below one second.
fn pick_interval(target_ms: f64) -> Option<TickInterval> {
    if target_ms < TICK_INTERVALS[0].approx_millis() / 2.0 {
        return None;
    }
    let years = TICK_INTERVALS[TICK_INTERVALS.len() - 1];
    if target_ms > years.approx_millis() {
        let n = (target_ms / years.approx_millis()).round().max(1.0) as i32;
        return Some(TickInterval::Years(n));
    }
    TICK_INTERVALS
        .iter()
        .copied()
        .min_by(|a, b| {
            let da = (a.approx_millis() / target_ms).ln().abs();
            let db = (b.approx_millis() / target_ms).ln().abs();
            da.total_cmp(&db)
        })
}

fn interval_ticks(interval: TickInterval, lo: f64, hi: f64) -> Vec<DateTime<Utc>> {
    let start = millis_to_instant(lo.ceil());
    let end = millis_to_instant(hi.floor());
    let mut ticks = Vec::new();

    match interval {
        TickInterval::Seconds(_)
        | TickInterval::Minutes(_)
        | TickInterval::Hours(_)
        | TickInterval::Days(_) => {
            let step = interval.approx_millis() as i64;
            let first = (start.timestamp_millis() + step - 1).div_euclid(step) * step;
            let mut t = first;
            while t <= end.timestamp_millis() {
                ticks.push(millis_to_instant(t as f64));
                t += step;
            }
        }
        TickInterval::Months(n) => {
            let mut year = start.year();
            let mut month0 = start.month0();
            // Snap to the next month boundary that is a multiple of n.
            let first_of_month = Utc
                .with_ymd_and_hms(year, month0 + 1, 1, 0, 0, 0)
                .single();
            if first_of_month.map_or(true, |t| t < start) {
                month0 += 1;
            }
            while month0 % n != 0 {
                month0 += 1;
            }
            loop {
                year += (month0 / 12) as i32;
                month0 %= 12;
                match Utc.with_ymd_and_hms(year, month0 + 1, 1, 0, 0, 0).single() {
                    Some(t) if t <= end => ticks.push(t),
                    _ => break,
                }
                month0 += n;
            }
        }
        TickInterval::Years(n) => {
            let mut year = start.year();
            if Utc
                .with_ymd_and_hms(year, 1, 1, 0, 0, 0)
                .single()
                .map_or(true, |t| t < start)
            {
                year += 1;
            }
            year = (year + n - 1).div_euclid(n) * n;
            while let Some(t) = Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).single() {
                if t > end {
                    break;
                }
                ticks.push(t);
                year += n;
            }
        }
    }

    ticks
}

/// Label for a time tick, picking the coarsest field that is not zero.
pub fn time_tick_label(t: DateTime<Utc>, tz: Tz) -> String {
    let local = t.with_timezone(&tz);
    if local.timestamp_subsec_millis() != 0 {
        local.format(".%3f").to_string()
    } else if local.second() != 0 {
        local.format(":%S").to_string()
    } else if local.minute() != 0 {
        local.format("%I:%M").to_string()
    } else if local.hour() != 0 {
        local.format("%I %p").to_string()
    } else if local.day() != 1 {
        local.format("%b %d").to_string()
    } else if local.month() != 1 {
        local.format("%B").to_string()
    } else {
        local.format("%Y").to_string()
    }
}

/// Label for a value tick, trimmed of trailing zeros.
pub fn value_tick_label(value: f64) -> String {
    let text = format!("{value:.6}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

/// Convenience for tests and fixtures.
pub fn instant_from_secs(secs: i64) -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(secs)
}
