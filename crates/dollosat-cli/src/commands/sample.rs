//! Sample command: encode, run an external sampler, decode.

use anyhow::Context;
use clap::Args;
use dollosat_kit::EncoderConfig;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::decode::{decode_file, read_map};
use super::encode::write_encoding;
use super::ProblemArgs;
use crate::config::{CliConfig, Sampler};

#[derive(Args, Debug)]
pub struct SampleArgs {
    #[command(flatten)]
    pub problem: ProblemArgs,

    /// Sampler to run
    #[arg(long, value_enum)]
    pub sampler: Option<Sampler>,

    /// Number of samples to request
    #[arg(long)]
    pub num_samples: Option<usize>,

    /// Sampler timeout in seconds
    #[arg(long)]
    pub timeout: Option<f64>,

    /// Skip the 1-Dollo conflict clauses
    #[arg(long)]
    pub no_phylogeny: bool,

    /// Output file for the reconstructions
    #[arg(long, default_value = "solutions.txt")]
    pub out: PathBuf,

    /// Keep the formula, variable map and raw sampler output
    #[arg(long)]
    pub keep_intermediate: bool,
}

/// Files produced next to the input matrix.
struct Intermediate {
    cnf: PathBuf,
    vars: PathBuf,
    raw: PathBuf,
    samples: PathBuf,
}

impl Intermediate {
    fn new(matrix: &Path, sampler: Sampler) -> Self {
        let stem = matrix.with_extension("");
        let cnf = suffixed(&stem, ".tmp.formula.cnf");
        let (raw, samples) = match sampler {
            Sampler::Quicksampler => (
                suffixed(&cnf, ".samples"),
                suffixed(&cnf, ".samples.valid"),
            ),
            Sampler::Unigen => {
                let out = suffixed(&cnf, ".unigen");
                (out.clone(), out)
            }
        };
        Self {
            vars: suffixed(&stem, ".variables"),
            cnf,
            raw,
            samples,
        }
    }

    fn remove(&self) {
        for path in [&self.cnf, &self.vars, &self.raw, &self.samples] {
            match std::fs::remove_file(path) {
                Ok(()) => tracing::debug!("Removed {:?}", path),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!("Could not remove {:?}: {}", path, e),
            }
        }
    }
}

fn suffixed(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

pub fn run(args: SampleArgs, config: &CliConfig) -> anyhow::Result<()> {
    let instance = args.problem.load()?;
    let sampler = args.sampler.unwrap_or(config.sampler);
    let num_samples = args.num_samples.unwrap_or(config.num_samples);
    let timeout = args.timeout.unwrap_or(config.timeout_secs);
    let files = Intermediate::new(&args.problem.matrix, sampler);

    let encoder = EncoderConfig {
        phylogeny: !args.no_phylogeny,
    };
    write_encoding(&instance, &encoder, sampler, &files.cnf, &files.vars)?;

    tracing::info!("Requesting {} samples from {:?} (timeout {}s)", num_samples, sampler, timeout);
    match sampler {
        Sampler::Quicksampler => {
            run_tool(
                &config.quicksampler,
                [
                    OsString::from("-n"),
                    num_samples.to_string().into(),
                    "-t".into(),
                    timeout.to_string().into(),
                    files.cnf.clone().into(),
                ],
            )?;
            run_tool(
                &config.z3,
                [OsString::from("sat.quicksampler_check=true"), files.cnf.clone().into()],
            )?;
        }
        Sampler::Unigen => {
            run_tool(
                &config.unigen,
                [
                    OsString::from(format!("--samples={num_samples}")),
                    format!("--maxTotalTime={timeout}").into(),
                    files.cnf.clone().into(),
                    files.raw.clone().into(),
                ],
            )?;
        }
    }

    require_samples(&files.samples)?;

    // Decode against the map as persisted, not the in-memory one.
    let map = read_map(&files.vars)?;
    let summary = decode_file(
        &map,
        instance.matrix(),
        Some(instance.allowed_losses()),
        &files.samples,
        &args.out,
    )?;
    println!(
        "c decoded {} of {} samples -> {}",
        summary.decoded,
        summary.samples,
        args.out.display()
    );

    if !args.keep_intermediate {
        files.remove();
    }
    Ok(())
}

/// Runs an external tool. A non-zero exit is only logged; whatever samples
/// the tool wrote are still decoded.
fn run_tool<const N: usize>(program: &Path, args: [OsString; N]) -> anyhow::Result<()> {
    tracing::debug!("Running {:?} {:?}", program, args);
    let status = Command::new(program)
        .args(&args)
        .status()
        .with_context(|| format!("starting {}", program.display()))?;
    if !status.success() {
        tracing::warn!("{} exited with {}", program.display(), status);
    }
    Ok(())
}

fn require_samples(path: &Path) -> anyhow::Result<()> {
    if !path.is_file() {
        anyhow::bail!("sampler wrote no samples to {}", path.display());
    }
    Ok(())
}
