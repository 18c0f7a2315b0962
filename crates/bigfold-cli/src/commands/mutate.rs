use super::progress_handler;
use crate::cli::MutateArgs;
use crate::error::{CliError, Result};
use bigfold::core::io::pdb::PdbFile;
use bigfold::core::io::traits::MolecularFile;
use bigfold::engine::mutation::{Mutation, ResidueSelection};
use bigfold::engine::progress::ProgressReporter;
use bigfold::workflows;
use tracing::info;

pub fn run(args: MutateArgs, quiet: bool) -> Result<()> {
    let mutation = Mutation::new(&args.from_name, &args.to_name)
        .map_err(|e| CliError::Config(e.to_string()))?;
    let selection = ResidueSelection {
        chain: args.chain,
        first: args.first,
        last: args.last,
    };

    let (mut system, mut metadata) =
        PdbFile::read_from_path(&args.input).map_err(|e| CliError::FileParsing {
            path: args.input.clone(),
            source: e.into(),
        })?;
    info!(
        "Read {} residue(s) from {:?}",
        system.residue_count(),
        &args.input
    );

    let progress_handler = progress_handler(quiet);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    let report = workflows::mutate::run(&mut system, &selection, &mutation, &reporter)
        .map_err(|e| CliError::Config(e.to_string()))?;

    metadata.header_lines.push(format!(
        "REMARK   1 bigfold mutate {} -> {} at {} residue(s)",
        mutation.from_name(),
        mutation.to_name(),
        report.mutated.len()
    ));
    PdbFile::write_to_path(&system, &metadata, &args.output).map_err(|e| {
        CliError::FileParsing {
            path: args.output.clone(),
            source: e.into(),
        }
    })?;

    println!(
        "✓ {} residue(s) mutated {} -> {}, written to: {}",
        report.mutated.len(),
        mutation.from_name(),
        mutation.to_name(),
        args.output.display()
    );
    if !report.issues.is_empty() {
        println!("{} residue(s) left unchanged:", report.issues.len());
        for issue in &report.issues {
            println!("  - {}", issue);
        }
    }
    Ok(())
}
