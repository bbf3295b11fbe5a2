//! Subcommands and the arguments they share.

pub mod check;
pub mod decode;
pub mod encode;
pub mod sample;

use anyhow::Context;
use clap::Args;
use dollosat_format::{read_allowed_losses, read_matrix, SolutionWriter};
use dollosat_kit::{Instance, Reconstruction};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// The observed matrix and how to cluster it.
#[derive(Args, Debug)]
pub struct ProblemArgs {
    /// Input matrix file
    #[arg(long)]
    pub matrix: PathBuf,

    /// Number of row clusters
    #[arg(long, default_value_t = 1)]
    pub s: usize,

    /// Number of column clusters
    #[arg(long, default_value_t = 1)]
    pub t: usize,

    /// File listing the columns that may be lost (default: all)
    #[arg(long)]
    pub allowed_losses: Option<PathBuf>,
}

impl ProblemArgs {
    /// Reads and validates the instance.
    pub fn load(&self) -> anyhow::Result<Instance> {
        tracing::info!("Loading matrix from {:?}", self.matrix);
        let matrix = read_matrix(&self.matrix)
            .with_context(|| format!("reading matrix {}", self.matrix.display()))?;
        let allowed = read_allowed_losses(self.allowed_losses.as_deref(), matrix.cols())?;
        tracing::info!(
            "Matrix: {} rows, {} columns, {} loss-capable",
            matrix.rows(),
            matrix.cols(),
            allowed.len()
        );
        Ok(Instance::new(matrix, self.s, self.t, allowed)?)
    }
}

/// Creates a buffered output file.
pub fn create(path: &Path) -> anyhow::Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    Ok(BufWriter::new(file))
}

/// Writes every successful reconstruction, numbering them by input position.
///
/// Returns the number of blocks written.
pub fn write_reconstructions<'a>(
    path: &Path,
    results: impl IntoIterator<Item = (usize, &'a Reconstruction)>,
) -> anyhow::Result<usize> {
    let mut writer = SolutionWriter::new(create(path)?);
    for (sample, rec) in results {
        writer.write(sample, &rec.matrix, &rec.row_clusters, &rec.col_clusters)?;
    }
    let written = writer.written();
    writer.finish()?;
    Ok(written)
}
