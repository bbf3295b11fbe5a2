//! Check command.

use clap::Args;
use dollosat_kit::{encode, Assignment, CheckConfig, Decoder, EncoderConfig, SatResult};
use std::path::PathBuf;

use super::{write_reconstructions, ProblemArgs};

#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub problem: ProblemArgs,

    /// Conflicts allowed before giving up
    #[arg(long, default_value_t = 100_000)]
    pub max_conflicts: u64,

    /// Decisions allowed before giving up
    #[arg(long, default_value_t = 1_000_000)]
    pub max_decisions: u64,

    /// Skip the 1-Dollo conflict clauses
    #[arg(long)]
    pub no_phylogeny: bool,

    /// Write the reconstruction found here
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn run(args: CheckArgs) -> anyhow::Result<()> {
    let instance = args.problem.load()?;
    let encoder = EncoderConfig {
        phylogeny: !args.no_phylogeny,
    };
    let encoding = encode(&instance, &encoder)?;
    let config = CheckConfig {
        max_conflicts: args.max_conflicts,
        max_decisions: args.max_decisions,
    };

    match encoding.formula.precheck(&config) {
        SatResult::Sat(model) => {
            let assignment = Assignment::from_model(&model);
            let rec = Decoder::new(&encoding.map, instance.matrix())?
                .with_allowed_losses(instance.allowed_losses())?
                .decode(&assignment)?;
            println!("s SATISFIABLE");
            println!(
                "c {} false positives, {} false negatives",
                rec.false_positives, rec.false_negatives
            );
            print!("{}", rec.matrix);
            if let Some(out) = &args.out {
                write_reconstructions(out, [(0, &rec)])?;
            }
        }
        SatResult::Unsat => println!("s UNSATISFIABLE"),
        SatResult::Unknown(reason) => println!("s UNKNOWN ({reason})"),
    }
    Ok(())
}
