//! Decode command.

use anyhow::Context;
use clap::Args;
use dollosat_format::{read_allowed_losses, read_matrix, SampleLine};
use dollosat_kit::{AllowedLosses, BitMatrix, Decoder, VariableMap};
use std::fs::File;
use std::path::{Path, PathBuf};

use super::write_reconstructions;

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Input matrix the formula was compiled from
    #[arg(long)]
    pub matrix: PathBuf,

    /// Variable map written by `encode`
    #[arg(long)]
    pub vars: PathBuf,

    /// Sampler output
    #[arg(long)]
    pub samples: PathBuf,

    /// Output file for the reconstructions
    #[arg(long, default_value = "solutions.txt")]
    pub out: PathBuf,

    /// Also reject losses outside the columns listed in this file
    #[arg(long)]
    pub allowed_losses: Option<PathBuf>,
}

/// Outcome of decoding one sampler output file.
#[derive(Debug, Clone, Copy)]
pub struct DecodeSummary {
    pub samples: usize,
    pub decoded: usize,
}

pub fn run(args: DecodeArgs) -> anyhow::Result<()> {
    let matrix = read_matrix(&args.matrix)
        .with_context(|| format!("reading matrix {}", args.matrix.display()))?;
    let map = read_map(&args.vars)?;
    let allowed = match &args.allowed_losses {
        Some(path) => Some(read_allowed_losses(Some(path.as_path()), matrix.cols())?),
        None => None,
    };

    let summary = decode_file(&map, &matrix, allowed.as_ref(), &args.samples, &args.out)?;
    println!(
        "c decoded {} of {} samples -> {}",
        summary.decoded,
        summary.samples,
        args.out.display()
    );
    Ok(())
}

/// Loads a persisted variable map.
pub fn read_map(path: &Path) -> anyhow::Result<VariableMap> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let map = VariableMap::read_from(file)
        .with_context(|| format!("loading variable map {}", path.display()))?;
    tracing::info!("Variable map: {} variables", map.num_vars());
    Ok(map)
}

/// Decodes every sample in `samples_path` and writes the reconstructions.
///
/// Samples that fail to decode are skipped; the rest are numbered by their
/// position in the sampler output.
pub fn decode_file(
    map: &VariableMap,
    matrix: &BitMatrix,
    allowed: Option<&AllowedLosses>,
    samples_path: &Path,
    out: &Path,
) -> anyhow::Result<DecodeSummary> {
    let mut decoder = Decoder::new(map, matrix)?;
    if let Some(allowed) = allowed {
        decoder = decoder.with_allowed_losses(allowed)?;
    }

    let file = File::open(samples_path)
        .with_context(|| format!("opening samples {}", samples_path.display()))?;
    let samples = SampleLine::read_all(file)?;
    let results = decoder.decode_all(&samples);

    let decoded = write_reconstructions(
        out,
        results
            .iter()
            .enumerate()
            .filter_map(|(k, r)| r.as_ref().ok().map(|rec| (k, rec))),
    )?;

    if decoded < samples.len() {
        tracing::warn!("{} of {} samples could not be decoded", samples.len() - decoded, samples.len());
    }
    tracing::info!("Decoded {} samples into {:?}", decoded, out);
    Ok(DecodeSummary {
        samples: samples.len(),
        decoded,
    })
}
