//! Output format for decoded samples.
//!
//! ```text
//! # sample 0
//! 2
//! 2
//! 1 0
//! 2 1
//! # row clusters: 0 0 1 1
//! # column clusters: 1 0 0 1
//!
//! ```
//!
//! The matrix part of each block is readable with the matrix reader's
//! comment rules; the cluster maps are carried on comment lines.

use dollosat_base::{Result, StateMatrix};
use std::io::Write;

/// Appends decoded samples to a writer.
pub struct SolutionWriter<W: Write> {
    inner: W,
    written: usize,
}

impl<W: Write> SolutionWriter<W> {
    /// Wraps a writer.
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    /// Writes one sample block.
    pub fn write(
        &mut self,
        sample: usize,
        matrix: &StateMatrix,
        row_clusters: &[usize],
        col_clusters: &[usize],
    ) -> Result<()> {
        writeln!(self.inner, "# sample {sample}")?;
        writeln!(self.inner, "{}", matrix.rows())?;
        writeln!(self.inner, "{}", matrix.cols())?;
        write!(self.inner, "{matrix}")?;
        writeln!(self.inner, "# row clusters: {}", join(row_clusters))?;
        writeln!(self.inner, "# column clusters: {}", join(col_clusters))?;
        writeln!(self.inner)?;
        self.written += 1;
        Ok(())
    }

    /// Number of blocks written.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flushes and returns the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

fn join(values: &[usize]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
