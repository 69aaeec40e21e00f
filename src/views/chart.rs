/// Daily alpha USD charts built from the history store
///
/// Per series:
/// 1. keep the points inside the trailing time window, or the last
///    `fallback_points` when the window is empty
/// 2. downsample to at most `max_rendered_points` (plus the final point)
/// 3. derive adaptive time ticks and padded value bounds
///
/// Notes are read-only here; they only decorate series labels.
use crate::config::HistoryConfig;
use crate::logger::{self, LogTag};
use crate::storage::{HistoryPoint, HistoryStore, NoteStore};
use chrono::{Local, TimeZone, Utc};
use serde::Serialize;
use std::fmt::Write as _;

pub const EMPTY_CHART_MESSAGE: &str = "No history yet. It will populate as data refreshes.";

const MINUTE_MS: i64 = 60_000;
const HOUR_MS: i64 = 60 * MINUTE_MS;

/// Drawing margin of the SVG renderer, in pixels
const SVG_PADDING: f64 = 24.0;

#[derive(Debug, Clone)]
pub struct ChartOptions {
    /// Only these keys, in this order; `None` renders every series
    pub keys: Option<Vec<String>>,
    pub window_ms: i64,
    pub fallback_points: usize,
    pub max_rendered_points: usize,
    /// Reference time for the trailing window
    pub now_ms: i64,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self::from_config(&HistoryConfig::default())
    }
}

impl ChartOptions {
    pub fn from_config(config: &HistoryConfig) -> Self {
        Self {
            keys: None,
            window_ms: i64::try_from(config.window_hours)
                .unwrap_or(i64::MAX)
                .saturating_mul(HOUR_MS),
            fallback_points: config.fallback_points,
            max_rendered_points: config.max_rendered_points,
            now_ms: Utc::now().timestamp_millis(),
        }
    }

    pub fn with_keys(mut self, keys: Vec<String>) -> Self {
        self.keys = if keys.is_empty() { None } else { Some(keys) };
        self
    }

    pub fn at(mut self, now_ms: i64) -> Self {
        self.now_ms = now_ms;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub t: i64,
    pub v: f64,
    /// `HH:MM`, local time
    pub short_label: String,
    /// `YYYY-MM-DD HH:MM:SS`, local time
    pub full_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tick {
    pub t: i64,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValueBounds {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartSeries {
    pub key: String,
    pub label: String,
    pub points: Vec<ChartPoint>,
    pub ticks: Vec<Tick>,
    pub bounds: ValueBounds,
    pub latest: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartView {
    pub series: Vec<ChartSeries>,
    pub empty_message: Option<&'static str>,
}

impl ChartView {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

pub fn build_charts(history: &HistoryStore, notes: &NoteStore, options: &ChartOptions) -> ChartView {
    let snapshot = history.snapshot();

    let selected: Vec<(String, Vec<HistoryPoint>)> = match &options.keys {
        Some(keys) => keys
            .iter()
            .filter_map(|key| snapshot.get(key).map(|points| (key.clone(), points.clone())))
            .collect(),
        None => snapshot.into_iter().collect(),
    };

    let series: Vec<ChartSeries> = selected
        .into_iter()
        .filter(|(_, points)| !points.is_empty())
        .map(|(key, points)| build_series(key, &points, notes, options))
        .filter(|series| !series.points.is_empty())
        .collect();

    logger::debug(
        LogTag::Charts,
        &format!("Built {} chart series", series.len()),
    );

    ChartView {
        empty_message: series.is_empty().then_some(EMPTY_CHART_MESSAGE),
        series,
    }
}

fn build_series(
    key: String,
    points: &[HistoryPoint],
    notes: &NoteStore,
    options: &ChartOptions,
) -> ChartSeries {
    let windowed = select_window(points, options.now_ms, options.window_ms, options.fallback_points);
    let sampled = downsample(&windowed, options.max_rendered_points);

    let label = match notes.get(&key) {
        Some(note) if !note.trim().is_empty() => format!("{} - {}", key, note.trim()),
        _ => key.clone(),
    };

    ChartSeries {
        ticks: compute_ticks(&sampled),
        bounds: value_bounds(&sampled),
        latest: sampled.last().map(|p| p.v),
        points: sampled
            .iter()
            .map(|p| ChartPoint {
                t: p.t,
                v: p.v,
                short_label: short_time_label(p.t),
                full_label: full_time_label(p.t),
            })
            .collect(),
        key,
        label,
    }
}

/// Points with `t >= now - window`; the last `fallback` points when none are
pub fn select_window(
    points: &[HistoryPoint],
    now_ms: i64,
    window_ms: i64,
    fallback: usize,
) -> Vec<HistoryPoint> {
    let cutoff = now_ms.saturating_sub(window_ms);
    let windowed: Vec<HistoryPoint> = points.iter().copied().filter(|p| p.t >= cutoff).collect();
    if !windowed.is_empty() {
        return windowed;
    }
    let start = points.len().saturating_sub(fallback);
    points[start..].to_vec()
}

/// Keep every `ceil(len / max)`-th point and always the final one
pub fn downsample(points: &[HistoryPoint], max_points: usize) -> Vec<HistoryPoint> {
    if max_points == 0 || points.len() <= max_points {
        return points.to_vec();
    }

    let stride = points.len().div_ceil(max_points);
    let mut sampled: Vec<HistoryPoint> = points.iter().step_by(stride).copied().collect();
    let last_index = points.len() - 1;
    if last_index % stride != 0 {
        sampled.push(points[last_index]);
    }
    sampled
}

/// Tick spacing for a time span
pub fn tick_step_ms(span_ms: i64) -> i64 {
    if span_ms <= HOUR_MS {
        10 * MINUTE_MS
    } else if span_ms <= 3 * HOUR_MS {
        30 * MINUTE_MS
    } else if span_ms <= 12 * HOUR_MS {
        HOUR_MS
    } else {
        3 * HOUR_MS
    }
}

/// Grid ticks on multiples of the step plus the first and last timestamps
pub fn compute_ticks(points: &[HistoryPoint]) -> Vec<Tick> {
    let (first, last) = match (points.first(), points.last()) {
        (Some(first), Some(last)) => (first.t, last.t),
        _ => return Vec::new(),
    };

    let step = tick_step_ms(last - first);
    let mut stamps = vec![first];
    let mut t = (first.div_euclid(step) + 1) * step;
    while t < last {
        stamps.push(t);
        t += step;
    }
    if last != first {
        stamps.push(last);
    }

    stamps
        .into_iter()
        .map(|t| Tick {
            t,
            label: short_time_label(t),
        })
        .collect()
}

/// Min/max of the values, padded when the series is flat
pub fn value_bounds(points: &[HistoryPoint]) -> ValueBounds {
    if points.is_empty() {
        return ValueBounds { min: 0.0, max: 1.0 };
    }

    let min = points.iter().map(|p| p.v).fold(f64::INFINITY, f64::min);
    let max = points.iter().map(|p| p.v).fold(f64::NEG_INFINITY, f64::max);
    if (max - min).abs() < f64::EPSILON {
        let pad = (min.abs() * 0.1).max(1.0);
        return ValueBounds {
            min: min - pad,
            max: max + pad,
        };
    }
    ValueBounds { min, max }
}

pub fn short_time_label(t: i64) -> String {
    Local
        .timestamp_millis_opt(t)
        .single()
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_default()
}

pub fn full_time_label(t: i64) -> String {
    Local
        .timestamp_millis_opt(t)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

impl ChartSeries {
    /// Standalone SVG line chart with tick labels and hover titles
    pub fn to_svg(&self, width: u32, height: u32) -> String {
        let (w, h) = (width as f64, height as f64);
        let (t0, t1) = match (self.points.first(), self.points.last()) {
            (Some(a), Some(b)) => (a.t as f64, b.t as f64),
            _ => return String::new(),
        };
        let t_span = (t1 - t0).max(1.0);
        let v_span = (self.bounds.max - self.bounds.min).max(f64::EPSILON);

        let x = |t: i64| SVG_PADDING + (t as f64 - t0) / t_span * (w - 2.0 * SVG_PADDING);
        let y = |v: f64| h - SVG_PADDING - (v - self.bounds.min) / v_span * (h - 2.0 * SVG_PADDING);

        let mut svg = String::new();
        let _ = write!(
            svg,
            r##"<svg viewBox="0 0 {w} {total}" width="100%" height="{total}" role="img"><rect x="0" y="0" width="{w}" height="{total}" fill="#fafafa" stroke="#eee"/>"##,
            w = width,
            total = height + 24
        );

        let path: Vec<String> = self
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                format!("{}{:.1},{:.1}", if i == 0 { "M" } else { "L" }, x(p.t), y(p.v))
            })
            .collect();
        let _ = write!(
            svg,
            r##"<path d="{}" fill="none" stroke="#2563eb" stroke-width="2"/>"##,
            path.join(" ")
        );

        for p in &self.points {
            let _ = write!(
                svg,
                r##"<circle cx="{:.1}" cy="{:.1}" r="2" fill="#2563eb"><title>{} | {:.2}</title></circle>"##,
                x(p.t),
                y(p.v),
                escape_xml(&p.full_label),
                p.v
            );
        }

        for tick in &self.ticks {
            let _ = write!(
                svg,
                r##"<text x="{:.1}" y="{}" font-size="10" text-anchor="middle" fill="#666">{}</text>"##,
                x(tick.t),
                height + 16,
                escape_xml(&tick.label)
            );
        }

        svg.push_str("</svg>");
        svg
    }
}

pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
