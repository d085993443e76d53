use std::{
    fmt::{self, Display},
    fs::{File, OpenOptions},
    io::{BufWriter, Write},
    path::Path,
};

use nalgebra::Vector3;

use crate::{Float, Result};

/// State of one particle at one sampled time.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub time: Float,
    pub index: usize,
    pub position: Vector3<Float>,
    pub velocity: Vector3<Float>,
}

/// Renders as `time,index,x,y,z,vx,vy,vz`.
impl Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (p, v) = (&self.position, &self.velocity);
        write!(
            f,
            "{},{},{},{},{},{},{},{}",
            self.time, self.index, p.x, p.y, p.z, v.x, v.y, v.z
        )
    }
}

/// A sink for sampled particle states.
///
/// Records arrive in increasing time, and within one time in increasing particle index.
pub trait Recorder {
    fn record(&mut self, record: &Record) -> Result<()>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

impl Recorder for Vec<Record> {
    fn record(&mut self, record: &Record) -> Result<()> {
        self.push(record.clone());
        Ok(())
    }
}

/// Writes one comma-separated line per record.
#[derive(Debug)]
pub struct CsvRecorder<W: Write> {
    writer: W,
}

impl<W: Write> CsvRecorder<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl CsvRecorder<BufWriter<File>> {
    /// Create (or truncate) the file at `path`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }

    /// Append to the file at `path`, creating it if necessary.
    pub fn append(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> Recorder for CsvRecorder<W> {
    fn record(&mut self, record: &Record) -> Result<()> {
        writeln!(self.writer, "{record}")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Only counts what it is handed.
#[derive(Clone, Debug, Default)]
pub struct CountingRecorder {
    records: usize,
    timestamps: usize,
    last_time: Option<Float>,
}

impl CountingRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn records(&self) -> usize {
        self.records
    }

    /// Number of distinct sampled times.
    #[must_use]
    pub fn timestamps(&self) -> usize {
        self.timestamps
    }

    #[must_use]
    pub fn last_time(&self) -> Option<Float> {
        self.last_time
    }
}

impl Recorder for CountingRecorder {
    fn record(&mut self, record: &Record) -> Result<()> {
        self.records += 1;
        if self.last_time != Some(record.time) {
            self.timestamps += 1;
            self.last_time = Some(record.time);
        }
        Ok(())
    }
}
