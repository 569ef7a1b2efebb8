//! Waveform capture for driven simulations.
//!
//! The [`TraceSink`] trait is the call discipline every sink follows:
//! attach once to a model, dump the full model state at strictly increasing
//! timestamps, then close. [`VcdTrace`] writes IEEE 1364 Value Change Dump
//! text (optionally gzip-compressed) that GTKWave or Surfer can open.
//! [`MemoryTrace`] keeps every sample in memory.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;

use crate::capture::capture_enabled;
use crate::error::SimError;
use crate::model::CircuitModel;
use crate::time::{SimTime, Timescale};
use crate::value::{PinValue, SignalDecl};

/// A destination for time-ordered snapshots of a model's signals.
pub trait TraceSink {
    /// Binds the sink to a model, capturing signals at most `depth` scope
    /// levels deep. Fails unless waveform capture has been enabled.
    fn attach(&mut self, model: &dyn CircuitModel, depth: u32) -> Result<(), SimError>;

    /// Captures the model's current state at `time`.
    fn dump(&mut self, time: SimTime, model: &dyn CircuitModel) -> Result<(), SimError>;

    /// Flushes and finalizes the output. Closing twice is a no-op.
    fn close(&mut self) -> Result<(), SimError>;

    /// Number of samples dumped so far.
    fn samples(&self) -> u64;
}

/// Enforces attach → dump* → close ordering and monotonic time.
#[derive(Debug, Clone, Default)]
struct DumpCursor {
    attached: bool,
    closed: bool,
    last: Option<SimTime>,
    samples: u64,
}

impl DumpCursor {
    fn attach(&mut self) -> Result<(), SimError> {
        if !capture_enabled() {
            return Err(SimError::CaptureDisabled);
        }
        if self.closed {
            return Err(SimError::TraceClosed);
        }
        if self.attached {
            return Err(SimError::AlreadyAttached);
        }
        self.attached = true;
        Ok(())
    }

    /// Returns true for the first dump.
    fn advance(&mut self, time: SimTime) -> Result<bool, SimError> {
        if self.closed {
            return Err(SimError::TraceClosed);
        }
        if !self.attached {
            return Err(SimError::NotAttached);
        }
        if let Some(previous) = self.last {
            if time <= previous {
                return Err(SimError::NonMonotonicTime {
                    previous: previous.ticks(),
                    time: time.ticks(),
                });
            }
        }
        let first = self.last.is_none();
        self.last = Some(time);
        self.samples += 1;
        Ok(first)
    }
}

/// Indices of the declarations within the depth limit.
fn visible_signals(decls: &[SignalDecl], depth: u32) -> Vec<usize> {
    decls
        .iter()
        .enumerate()
        .filter(|(_, d)| d.depth() <= depth)
        .map(|(i, _)| i)
        .collect()
}

/// A writer that needs an explicit end-of-stream step.
pub trait TraceOutput: Write {
    /// Writes any trailer and flushes.
    fn finish_output(&mut self) -> io::Result<()> {
        self.flush()
    }
}

impl TraceOutput for Vec<u8> {}

impl<W: Write> TraceOutput for BufWriter<W> {}

/// A trace file on disk, plain or gzip-compressed.
pub enum TraceFile {
    /// Uncompressed VCD text.
    Plain(BufWriter<File>),
    /// Gzip-compressed VCD text.
    Gzip(GzEncoder<BufWriter<File>>),
}

impl TraceFile {
    /// Creates (truncating) the file at `path`.
    pub fn create(path: &Path, compress: bool) -> io::Result<Self> {
        let writer = BufWriter::new(File::create(path)?);
        Ok(if compress {
            TraceFile::Gzip(GzEncoder::new(writer, Compression::default()))
        } else {
            TraceFile::Plain(writer)
        })
    }
}

impl Write for TraceFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            TraceFile::Plain(w) => w.write(buf),
            TraceFile::Gzip(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            TraceFile::Plain(w) => w.flush(),
            TraceFile::Gzip(w) => w.flush(),
        }
    }
}

impl TraceOutput for TraceFile {
    fn finish_output(&mut self) -> io::Result<()> {
        match self {
            TraceFile::Plain(w) => w.flush(),
            TraceFile::Gzip(w) => {
                w.try_finish()?;
                w.get_mut().flush()
            }
        }
    }
}

/// One captured signal in a VCD file.
#[derive(Debug, Clone)]
struct VcdVar {
    index: usize,
    code: String,
    width: u32,
    last: Option<PinValue>,
}

/// VCD (Value Change Dump) trace following IEEE 1364.
///
/// The header and variable definitions are written on attach. Every dump
/// emits a `#time` line, the first one under `$dumpvars` with all values and
/// later ones with changed values only.
pub struct VcdTrace<W: TraceOutput> {
    writer: W,
    timescale: Timescale,
    cursor: DumpCursor,
    vars: Vec<VcdVar>,
    scratch: Vec<PinValue>,
}

impl VcdTrace<TraceFile> {
    /// Opens a VCD file at `path`.
    pub fn create(path: &Path, timescale: Timescale, compress: bool) -> Result<Self, SimError> {
        let file = TraceFile::create(path, compress)?;
        tracing::debug!(path = %path.display(), compress, "opened trace file");
        Ok(Self::new(file, timescale))
    }
}

impl<W: TraceOutput> VcdTrace<W> {
    /// Creates a VCD trace writing to the given output.
    pub fn new(writer: W, timescale: Timescale) -> Self {
        Self {
            writer,
            timescale,
            cursor: DumpCursor::default(),
            vars: Vec::new(),
            scratch: Vec::new(),
        }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Generates a VCD identifier code from a sequential index.
    ///
    /// Uses printable ASCII characters starting from `!` (0x21).
    /// Multi-character codes are generated for indices >= 94.
    fn make_id_code(index: usize) -> String {
        let mut result = String::new();
        let mut idx = index;
        loop {
            result.push((b'!' + (idx % 94) as u8) as char);
            idx /= 94;
            if idx == 0 {
                break;
            }
            idx -= 1;
        }
        result
    }

    /// Formats a value change line.
    fn format_change(value: PinValue, code: &str) -> String {
        if value.width() == 1 {
            format!("{}{code}", value.bits())
        } else {
            format!("b{:0width$b} {code}", value.bits(), width = value.width() as usize)
        }
    }

    fn write_header(&mut self) -> io::Result<()> {
        writeln!(self.writer, "$date")?;
        writeln!(self.writer, "  Simulation date")?;
        writeln!(self.writer, "$end")?;
        writeln!(self.writer, "$version")?;
        writeln!(self.writer, "  gblink link-port driver")?;
        writeln!(self.writer, "$end")?;
        writeln!(self.writer, "$timescale")?;
        writeln!(self.writer, "  {}", self.timescale)?;
        writeln!(self.writer, "$end")?;
        Ok(())
    }

    /// Writes nested `$scope` blocks and `$var` lines for the captured signals.
    fn write_definitions(&mut self, decls: &[SignalDecl], visible: &[usize]) -> io::Result<()> {
        let mut open: Vec<&str> = Vec::new();
        for (n, &index) in visible.iter().enumerate() {
            let decl = &decls[index];
            let path: Vec<&str> = decl.scope.split('.').filter(|s| !s.is_empty()).collect();
            let common = open
                .iter()
                .zip(&path)
                .take_while(|(a, b)| a == b)
                .count();
            while open.len() > common {
                writeln!(self.writer, "$upscope $end")?;
                open.pop();
            }
            for name in &path[common..] {
                writeln!(self.writer, "$scope module {name} $end")?;
                open.push(*name);
            }

            let code = Self::make_id_code(n);
            writeln!(
                self.writer,
                "$var wire {} {code} {} $end",
                decl.width, decl.name
            )?;
            self.vars.push(VcdVar {
                index,
                code,
                width: decl.width,
                last: None,
            });
        }
        for _ in open {
            writeln!(self.writer, "$upscope $end")?;
        }
        writeln!(self.writer, "$enddefinitions $end")?;
        Ok(())
    }
}

impl<W: TraceOutput> TraceSink for VcdTrace<W> {
    fn attach(&mut self, model: &dyn CircuitModel, depth: u32) -> Result<(), SimError> {
        self.cursor.attach()?;
        let decls = model.signals();
        let visible = visible_signals(decls, depth);
        self.write_header()?;
        self.write_definitions(decls, &visible)?;
        Ok(())
    }

    fn dump(&mut self, time: SimTime, model: &dyn CircuitModel) -> Result<(), SimError> {
        let first = self.cursor.advance(time)?;
        model.sample(&mut self.scratch);

        writeln!(self.writer, "#{}", time.ticks())?;
        if first {
            writeln!(self.writer, "$dumpvars")?;
        }
        for var in &mut self.vars {
            let value = self.scratch[var.index];
            debug_assert_eq!(value.width(), var.width);
            if var.last != Some(value) {
                writeln!(self.writer, "{}", Self::format_change(value, &var.code))?;
                var.last = Some(value);
            }
        }
        if first {
            writeln!(self.writer, "$end")?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), SimError> {
        if self.cursor.closed {
            return Ok(());
        }
        self.cursor.closed = true;
        self.writer.finish_output()?;
        Ok(())
    }

    fn samples(&self) -> u64 {
        self.cursor.samples
    }
}

/// One snapshot held by a [`MemoryTrace`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    /// When the snapshot was taken.
    pub time: SimTime,
    /// Values of the captured signals, in [`MemoryTrace::signal_names`] order.
    pub values: Vec<PinValue>,
}

/// A trace sink that keeps every sample in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryTrace {
    cursor: DumpCursor,
    visible: Vec<usize>,
    names: Vec<String>,
    records: Vec<Sample>,
    scratch: Vec<PinValue>,
}

impl MemoryTrace {
    /// Creates an empty, unattached trace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hierarchical names of the captured signals.
    pub fn signal_names(&self) -> &[String] {
        &self.names
    }

    /// All samples in dump order.
    pub fn records(&self) -> &[Sample] {
        &self.records
    }

    /// Whether [`close`](TraceSink::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.cursor.closed
    }

    /// Every sampled value of one signal, by hierarchical name.
    pub fn column(&self, name: &str) -> Option<Vec<PinValue>> {
        let col = self.names.iter().position(|n| n == name)?;
        Some(self.records.iter().map(|s| s.values[col]).collect())
    }
}

impl TraceSink for MemoryTrace {
    fn attach(&mut self, model: &dyn CircuitModel, depth: u32) -> Result<(), SimError> {
        self.cursor.attach()?;
        let decls = model.signals();
        self.visible = visible_signals(decls, depth);
        self.names = self.visible.iter().map(|&i| decls[i].path()).collect();
        Ok(())
    }

    fn dump(&mut self, time: SimTime, model: &dyn CircuitModel) -> Result<(), SimError> {
        self.cursor.advance(time)?;
        model.sample(&mut self.scratch);
        let values = self.visible.iter().map(|&i| self.scratch[i]).collect();
        self.records.push(Sample { time, values });
        Ok(())
    }

    fn close(&mut self) -> Result<(), SimError> {
        self.cursor.closed = true;
        Ok(())
    }

    fn samples(&self) -> u64 {
        self.cursor.samples
    }
}
