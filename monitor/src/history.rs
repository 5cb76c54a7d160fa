//! Recent PM2.5 readings, for charting.

use std::collections::VecDeque;

use serde::Serialize;

/// Padding above and below the data when picking chart bounds, µg/m³.
const Y_PADDING: f64 = 5.0;
/// Chart bounds with no data.
const EMPTY_BOUNDS: (f64, f64) = (0.0, 50.0);

const SPARKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// One charted reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    /// Refresh counter: increases by one per recorded reading.
    pub x: u64,
    /// PM2.5, µg/m³.
    pub pm25: f64,
}

/// A bounded window of the most recent PM2.5 readings.
#[derive(Debug, Clone)]
pub struct History {
    capacity: usize,
    next_x: u64,
    points: VecDeque<Point>,
}

impl History {
    /// Create a history holding at most `capacity` points (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            next_x: 0,
            points: VecDeque::with_capacity(capacity),
        }
    }

    /// Record a reading, evicting the oldest if full.
    pub fn push(&mut self, pm25: f64) {
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(Point {
            x: self.next_x,
            pm25,
        });
        self.next_x += 1;
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = &Point> {
        self.points.iter()
    }

    pub fn latest(&self) -> Option<&Point> {
        self.points.back()
    }

    /// Vertical chart bounds: the data range padded by 5 µg/m³, never below zero.
    pub fn y_bounds(&self) -> (f64, f64) {
        let mut ys = self.points.iter().map(|p| p.pm25);
        let Some(first) = ys.next() else {
            return EMPTY_BOUNDS;
        };
        let (min, max) = ys.fold((first, first), |(lo, hi), y| (lo.min(y), hi.max(y)));
        ((min - Y_PADDING).max(0.0), max + Y_PADDING)
    }

    /// The x values worth labelling on a chart axis: first and last,
    /// plus up to three evenly spaced ones in between.
    pub fn label_positions(&self) -> Vec<u64> {
        let n = self.points.len();
        let x = |i: usize| self.points[i].x;
        match n {
            0 => vec![],
            1 => vec![x(0)],
            _ => {
                let mut labels = vec![x(0), x(n - 1)];
                if n > 5 {
                    let step = n / 4;
                    labels.extend(
                        (1..=3)
                            .map(|i| step * i)
                            .filter(|&idx| 0 < idx && idx < n - 1)
                            .map(x),
                    );
                } else if n > 2 {
                    let mid = x(n / 2);
                    if mid != x(0) && mid != x(n - 1) {
                        labels.push(mid);
                    }
                }
                labels
            }
        }
    }

    /// One block character per reading, scaled into the chart bounds.
    pub fn sparkline(&self) -> String {
        let (lo, hi) = self.y_bounds();
        let span = hi - lo;
        let top = (SPARKS.len() - 1) as f64;
        self.points
            .iter()
            .map(|p| {
                let f = if span > 0.0 { (p.pm25 - lo) / span } else { 0.0 };
                SPARKS[(f * top).round().clamp(0.0, top) as usize]
            })
            .collect()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(20)
    }
}
