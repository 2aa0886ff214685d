//! Read-time windows of an mmap latency benchmark.
//!
//! `readlat_plot` loads a `job,start,avg,p50,p90,p99` csv with [`ReadTimes::from_csv`]
//! and draws one scatter series per job with [`ReadTimes::plot_scatter`].
//! The producer side, [`window::WindowStats`] with [`ReadTimes::from_windows`] and
//! [`ReadTimes::to_csv`], is library API for benchmark harnesses that write such files;
//! no binary of this crate drives it.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info, warn};
pub mod error;
pub mod plot;
pub mod render;
pub mod window;

pub use error::{Error, Result};

pub const VERSION: Option<&str> = option_env!("CARGO_PKG_VERSION");

pub const CSV_HEADER: &str = "job,start,avg,p50,p90,p99";
pub const US_PER_SECOND: i64 = 1_000_000;

const FIELDS: [&str; 6] = ["job", "start", "avg", "p50", "p90", "p99"];

/// One window of read-time measurements; all times in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record {
    pub job: i64,
    pub start: i64,
    pub avg: i64,
    pub p50: i64,
    pub p90: i64,
    pub p99: i64,
}

impl Record {
    /// Parses a data row made of exactly six comma-separated integers.
    /// `line` is the 1-based line number reported in errors.
    pub fn from_csv_line(l: &str, line: usize) -> Result<Record> {
        let tokens: Vec<&str> = l.split(',').collect();
        if tokens.len() != FIELDS.len() {
            return Err(Error::FieldCount {
                line,
                found: tokens.len(),
            });
        }
        let mut values = [0i64; 6];
        for ((v, token), field) in values.iter_mut().zip(tokens.iter()).zip(FIELDS.iter()) {
            let token = token.trim();
            *v = token.parse().map_err(|source| Error::ParseInt {
                line,
                field: *field,
                value: token.to_string(),
                source,
            })?;
        }
        let [job, start, avg, p50, p90, p99] = values;
        Ok(Record {
            job,
            start,
            avg,
            p50,
            p90,
            p99,
        })
    }
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{},{},{},{},{},{}",
            self.job, self.start, self.avg, self.p50, self.p90, self.p99
        )
    }
}

/// Records of one job, in load order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobGroup {
    pub job: i64,
    pub records: Vec<Record>,
}

/// How the microsecond offset from the reference start becomes seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Elapsed {
    /// real-valued division, 500000 us -> 0.5 s
    Fractional,
    /// integer division truncating toward zero, 500000 us -> 0 s
    WholeSeconds,
}

impl Default for Elapsed {
    fn default() -> Self {
        Elapsed::Fractional
    }
}

/// Maps records to (elapsed seconds, avg) chart coordinates.
///
/// The reference start time `tmin` is the start of the first loaded record,
/// not the smallest start: unsorted input yields negative elapsed times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Normalizer {
    pub tmin: i64,
    pub elapsed: Elapsed,
}

impl Normalizer {
    pub fn from_first(records: &[Record], elapsed: Elapsed) -> Result<Normalizer> {
        let first = records.first().ok_or(Error::EmptyInput)?;
        Ok(Normalizer {
            tmin: first.start,
            elapsed,
        })
    }

    pub fn seconds(&self, record: &Record) -> Result<f64> {
        let delta = record
            .start
            .checked_sub(self.tmin)
            .ok_or(Error::TimeOverflow {
                start: record.start,
                tmin: self.tmin,
            })?;
        Ok(match self.elapsed {
            Elapsed::Fractional => delta as f64 / US_PER_SECOND as f64,
            Elapsed::WholeSeconds => (delta / US_PER_SECOND) as f64,
        })
    }

    /// avg stays in microseconds
    pub fn point(&self, record: &Record) -> Result<(f64, f64)> {
        Ok((self.seconds(record)?, record.avg as f64))
    }
}

/// One scatter series ready to draw
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub job: i64,
    pub points: Vec<(f64, f64)>,
}

/// The main struct for the read-time windows, in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadTimes {
    pub records: Vec<Record>,
}

impl ReadTimes {
    pub fn new(capacity: usize) -> ReadTimes {
        ReadTimes {
            records: Vec::with_capacity(capacity),
        }
    }

    /// Init a ReadTimes from csv.
    /// The header line is discarded without looking at it, empty lines are skipped,
    /// any other malformed line (whitespace only included) is an error.
    pub fn from_csv(fin: &Path) -> Result<ReadTimes> {
        let file = File::open(fin).map_err(|e| Error::io(fin, e))?;
        let readtimes = ReadTimes::from_lines(BufReader::new(file), fin)?;
        info!(
            "loaded {} records from {}",
            readtimes.records.len(),
            fin.display()
        );
        Ok(readtimes)
    }

    fn from_lines<B: BufRead>(buf: B, fin: &Path) -> Result<ReadTimes> {
        let mut readtimes = ReadTimes::new(1000);
        for (i, l) in buf.lines().enumerate().skip(1) {
            let l = l.map_err(|e| Error::io(fin, e))?;
            if l.is_empty() {
                debug!("skipping empty line {}", i + 1);
                continue;
            }
            readtimes.records.push(Record::from_csv_line(&l, i + 1)?);
        }
        Ok(readtimes)
    }

    /// Partitions the records by job, groups in order of first appearance.
    pub fn by_job(&self) -> Vec<JobGroup> {
        let mut index: HashMap<i64, usize> = HashMap::new();
        let mut groups: Vec<JobGroup> = Vec::new();
        for r in &self.records {
            let g = *index.entry(r.job).or_insert_with(|| {
                groups.push(JobGroup {
                    job: r.job,
                    records: Vec::new(),
                });
                groups.len() - 1
            });
            groups[g].records.push(*r);
        }
        groups
    }

    pub fn normalizer(&self, elapsed: Elapsed) -> Result<Normalizer> {
        Normalizer::from_first(&self.records, elapsed)
    }

    /// One series per job, with elapsed seconds relative to the first record
    pub fn series(&self, elapsed: Elapsed) -> Result<Vec<Series>> {
        let normalizer = self.normalizer(elapsed)?;
        info!("reference start time {} us", normalizer.tmin);
        let series: Vec<Series> = self
            .by_job()
            .iter()
            .map(|g| -> Result<Series> {
                let points: Vec<(f64, f64)> = g
                    .records
                    .iter()
                    .map(|r| normalizer.point(r))
                    .collect::<Result<_>>()?;
                let negative = points.iter().filter(|(x, _)| *x < 0.).count();
                if negative > 0 {
                    warn!(
                        "job {}: {} points start before the first record and fall left of the x axis",
                        g.job, negative
                    );
                }
                debug!("job {}: {} points", g.job, points.len());
                Ok(Series { job: g.job, points })
            })
            .collect::<Result<_>>()?;
        info!("{} job series", series.len());
        Ok(series)
    }

    /// writes the header and one line per record as a csv at the given path
    pub fn to_csv(&self, fout: &Path) -> Result<()> {
        let file = File::create(fout).map_err(|e| Error::io(fout, e))?;
        let mut buf = BufWriter::new(file);
        write!(buf, "{}", self)
            .and_then(|_| buf.flush())
            .map_err(|e| Error::io(fout, e))
    }
}

impl std::str::FromStr for ReadTimes {
    type Err = Error;

    fn from_str(s: &str) -> Result<ReadTimes> {
        ReadTimes::from_lines(s.as_bytes(), Path::new("<str>"))
    }
}

impl std::fmt::Display for ReadTimes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", CSV_HEADER)?;
        for r in self.records.iter() {
            writeln!(f, "{}", r)?
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = "job,start,avg,p50,p90,p99
1,1000000,50,40,60,80
1,2000000,55,45,65,85
2,1500000,70,60,80,100
";

    #[test]
    fn parses_rows_and_discards_header() {
        let rt: ReadTimes = SCENARIO.parse().unwrap();
        assert_eq!(rt.records.len(), 3);
        assert_eq!(
            rt.records[2],
            Record {
                job: 2,
                start: 1500000,
                avg: 70,
                p50: 60,
                p90: 80,
                p99: 100
            }
        );
    }

    #[test]
    fn header_is_not_validated() {
        let rt: ReadTimes = "whatever\n3,10,20,30,40,50\n".parse().unwrap();
        assert_eq!(rt.records.len(), 1);
        assert_eq!(rt.records[0].job, 3);
    }

    #[test]
    fn empty_lines_and_crlf_are_accepted() {
        let rt: ReadTimes = "h\r\n\r\n1,2,3,4,5,6\r\n\n7, 8,9,10,11,12\n"
            .parse()
            .unwrap();
        assert_eq!(rt.records.len(), 2);
        assert_eq!(rt.records[1].start, 8);
    }

    #[test]
    fn whitespace_only_line_is_an_error() {
        let err = "h\n1,2,3,4,5,6\n   \n".parse::<ReadTimes>().unwrap_err();
        assert!(matches!(err, Error::FieldCount { line: 3, found: 1 }));
        let err = "h\n , , , , , \n".parse::<ReadTimes>().unwrap_err();
        assert!(matches!(err, Error::ParseInt { line: 2, field: "job", .. }));
    }

    #[test]
    fn five_fields_is_an_error() {
        let err = "h\n1,2,3,4,5,6\n1,2,3,4,5\n".parse::<ReadTimes>().unwrap_err();
        match err {
            Error::FieldCount { line, found } => {
                assert_eq!(line, 3);
                assert_eq!(found, 5);
            }
            e => panic!("unexpected error {:?}", e),
        }
    }

    #[test]
    fn seven_fields_is_an_error() {
        let err = Record::from_csv_line("1,2,3,4,5,6,7", 2).unwrap_err();
        assert!(matches!(err, Error::FieldCount { line: 2, found: 7 }));
    }

    #[test]
    fn non_integer_field_is_an_error() {
        let err = Record::from_csv_line("1,2,3.5,4,5,6", 9).unwrap_err();
        match err {
            Error::ParseInt {
                line, field, value, ..
            } => {
                assert_eq!(line, 9);
                assert_eq!(field, "avg");
                assert_eq!(value, "3.5");
            }
            e => panic!("unexpected error {:?}", e),
        }
    }

    #[test]
    fn header_only_is_empty_and_has_no_reference() {
        let rt: ReadTimes = "job,start,avg,p50,p90,p99\n".parse().unwrap();
        assert!(rt.records.is_empty());
        assert!(matches!(
            rt.normalizer(Elapsed::default()),
            Err(Error::EmptyInput)
        ));
        assert!(matches!(rt.series(Elapsed::default()), Err(Error::EmptyInput)));
    }

    #[test]
    fn groups_keep_first_seen_and_insertion_order() {
        let rt: ReadTimes = "h\n5,1,1,0,0,0\n2,2,2,0,0,0\n5,3,3,0,0,0\n9,4,4,0,0,0\n2,5,5,0,0,0\n"
            .parse()
            .unwrap();
        let groups = rt.by_job();
        let jobs: Vec<i64> = groups.iter().map(|g| g.job).collect();
        assert_eq!(jobs, vec![5, 2, 9]);
        let starts: Vec<Vec<i64>> = groups
            .iter()
            .map(|g| g.records.iter().map(|r| r.start).collect())
            .collect();
        assert_eq!(starts, vec![vec![1, 3], vec![2, 5], vec![4]]);
        let total: usize = groups.iter().map(|g| g.records.len()).sum();
        assert_eq!(total, rt.records.len());
    }

    #[test]
    fn scenario_points() {
        let rt: ReadTimes = SCENARIO.parse().unwrap();
        let series = rt.series(Elapsed::Fractional).unwrap();
        assert_eq!(
            series,
            vec![
                Series {
                    job: 1,
                    points: vec![(0.0, 50.0), (1.0, 55.0)]
                },
                Series {
                    job: 2,
                    points: vec![(0.5, 70.0)]
                },
            ]
        );
        assert_eq!(rt.normalizer(Elapsed::Fractional).unwrap().tmin, 1000000);
    }

    #[test]
    fn whole_seconds_truncates_toward_zero() {
        let rt: ReadTimes = "h\n1,3000000,1,0,0,0\n1,4500000,2,0,0,0\n1,1500000,3,0,0,0\n"
            .parse()
            .unwrap();
        let n = rt.normalizer(Elapsed::WholeSeconds).unwrap();
        let xs: Vec<f64> = rt.records.iter().map(|r| n.seconds(r).unwrap()).collect();
        assert_eq!(xs, vec![0.0, 1.0, -1.0]);
    }

    #[test]
    fn reference_is_first_record_not_minimum() {
        let rt: ReadTimes = "h\n1,2000000,1,0,0,0\n2,1000000,2,0,0,0\n".parse().unwrap();
        let n = rt.normalizer(Elapsed::Fractional).unwrap();
        assert_eq!(n.tmin, 2000000);
        assert_eq!(n.seconds(&rt.records[0]).unwrap(), 0.0);
        assert_eq!(n.seconds(&rt.records[1]).unwrap(), -1.0);
    }

    #[test]
    fn overflowing_offset_is_an_error() {
        let rt = ReadTimes {
            records: vec![
                Record {
                    job: 1,
                    start: i64::MAX,
                    avg: 1,
                    p50: 0,
                    p90: 0,
                    p99: 0,
                },
                Record {
                    job: 1,
                    start: -10,
                    avg: 2,
                    p50: 0,
                    p90: 0,
                    p99: 0,
                },
            ],
        };
        let err = rt.series(Elapsed::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::TimeOverflow {
                start: -10,
                tmin: i64::MAX
            }
        ));
    }

    #[test]
    fn display_writes_header_and_rows() {
        let rt: ReadTimes = SCENARIO.parse().unwrap();
        assert_eq!(rt.to_string(), SCENARIO);
    }
}
