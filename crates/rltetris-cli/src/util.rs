use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;

/// Where a JSON report goes: stdout, or a file when `--output` is given.
#[derive(Debug)]
pub enum ReportSink {
    Stdout(io::StdoutLock<'static>),
    File(BufWriter<File>, PathBuf),
}

impl ReportSink {
    pub fn create(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::Stdout(io::stdout().lock()));
        };
        let file = File::create(path)
            .with_context(|| format!("Failed to create report file: {}", path.display()))?;
        Ok(Self::File(BufWriter::new(file), path.to_owned()))
    }

    fn describe(&self) -> String {
        match self {
            Self::Stdout(_) => "stdout".to_owned(),
            Self::File(_, path) => path.display().to_string(),
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(writer) => writer,
            Self::File(writer, _) => writer,
        }
    }

    /// Writes `report` as pretty JSON followed by a newline, then flushes.
    pub fn write_report<T>(mut self, report: &T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let target = self.describe();
        let writer = self.writer();
        serde_json::to_writer_pretty(&mut *writer, report)
            .with_context(|| format!("Failed to write report to {target}"))?;
        writeln!(writer).with_context(|| format!("Failed to write report to {target}"))?;
        writer
            .flush()
            .with_context(|| format!("Failed to flush report to {target}"))?;
        log::info!("report written to {target}");
        Ok(())
    }
}

/// Writes `report` to `path`, or to stdout when no path is given.
pub fn save_report<T>(report: &T, path: Option<&Path>) -> anyhow::Result<()>
where
    T: serde::Serialize,
{
    ReportSink::create(path)?.write_report(report)
}
