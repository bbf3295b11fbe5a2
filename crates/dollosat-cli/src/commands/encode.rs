//! Encode command.

use clap::Args;
use dollosat_kit::{encode, EncoderConfig, Encoding, Instance};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::{create, ProblemArgs};
use crate::config::{CliConfig, Sampler};

#[derive(Args, Debug)]
pub struct EncodeArgs {
    #[command(flatten)]
    pub problem: ProblemArgs,

    /// Sampler the formula is meant for (decides the DIMACS header)
    #[arg(long, value_enum)]
    pub sampler: Option<Sampler>,

    /// Skip the 1-Dollo conflict clauses
    #[arg(long)]
    pub no_phylogeny: bool,

    /// Output DIMACS file
    #[arg(long, default_value = "formula.cnf")]
    pub out: PathBuf,

    /// Output variable map (JSON)
    #[arg(long, default_value = "formula.vars")]
    pub vars: PathBuf,
}

pub fn run(args: EncodeArgs, config: &CliConfig) -> anyhow::Result<()> {
    let instance = args.problem.load()?;
    let sampler = args.sampler.unwrap_or(config.sampler);
    let encoder = EncoderConfig {
        phylogeny: !args.no_phylogeny,
    };
    let encoding = write_encoding(&instance, &encoder, sampler, &args.out, &args.vars)?;

    println!(
        "c {} variables, {} clauses -> {}",
        encoding.formula.num_vars(),
        encoding.formula.num_clauses(),
        args.out.display()
    );
    Ok(())
}

/// Compiles the instance and writes the formula and its variable map.
pub fn write_encoding(
    instance: &Instance,
    encoder: &EncoderConfig,
    sampler: Sampler,
    cnf_path: &Path,
    vars_path: &Path,
) -> anyhow::Result<Encoding> {
    let encoding = encode(instance, encoder)?;
    for group in encoding.formula.groups() {
        tracing::info!("{:>20}: {} clauses", group.family.to_string(), group.len());
    }

    encoding
        .formula
        .write_dimacs(create(cnf_path)?, sampler.needs_header())?;
    let mut vars = create(vars_path)?;
    encoding.map.write_to(&mut vars)?;
    vars.flush()?;

    tracing::info!("Wrote {:?} and {:?}", cnf_path, vars_path);
    Ok(encoding)
}
