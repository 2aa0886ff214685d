//! Aggregation of single read latencies into the windows stored in the csv.
//!
//! A window opens with its first sample and is closed after `WINDOW_SAMPLES`
//! samples, or as soon as a read ends more than `WINDOW_US` after the window opened.

use crate::{ReadTimes, Record};

pub const WINDOW_SAMPLES: usize = 1000;
pub const WINDOW_US: i64 = 1_000_000;

/// Latency windows of one reader (job)
#[derive(Debug, Clone)]
pub struct WindowStats {
    job: i64,
    window_start: i64,
    samples: Vec<i64>,
    windows: Vec<Record>,
}

impl WindowStats {
    pub fn new(job: i64) -> WindowStats {
        WindowStats {
            job,
            window_start: 0,
            samples: Vec::with_capacity(WINDOW_SAMPLES),
            windows: Vec::new(),
        }
    }

    pub fn job(&self) -> i64 {
        self.job
    }

    /// adds one read that began at `begin` and ended at `end`, microseconds
    pub fn record(&mut self, begin: i64, end: i64) {
        if self.samples.is_empty() {
            self.window_start = begin;
        }
        self.samples.push(end - begin);
        if self.samples.len() == WINDOW_SAMPLES || end - self.window_start > WINDOW_US {
            self.flush();
        }
    }

    fn flush(&mut self) {
        let n = self.samples.len();
        if n == 0 {
            return;
        }
        self.samples.sort_unstable();
        let sum: i64 = self.samples.iter().sum();
        self.windows.push(Record {
            job: self.job,
            start: self.window_start,
            avg: sum / n as i64,
            p50: self.samples[n / 2],
            p90: self.samples[n * 9 / 10],
            p99: self.samples[n * 99 / 100],
        });
        self.samples.clear();
    }

    /// closes the open window, if any, and returns all windows in order
    pub fn finish(mut self) -> Vec<Record> {
        self.flush();
        self.windows
    }
}

impl ReadTimes {
    /// concatenates the windows of every reader, reader by reader
    pub fn from_windows<I: IntoIterator<Item = WindowStats>>(stats: I) -> ReadTimes {
        let mut readtimes = ReadTimes::new(1000);
        for s in stats {
            readtimes.records.extend(s.finish());
        }
        readtimes
    }
}
