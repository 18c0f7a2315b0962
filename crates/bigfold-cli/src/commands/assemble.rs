use super::progress_handler;
use crate::cli::AssembleArgs;
use crate::config::{AssemblePlan, build_assemble_plan};
use crate::error::{CliError, Result};
use bigfold::core::io::pdb::{PdbFile, PdbMetadata};
use bigfold::core::io::traits::MolecularFile;
use bigfold::engine::assembler::{AssembledModel, AssemblyOutcome};
use bigfold::engine::error::EngineError;
use bigfold::engine::fragment::Fragment;
use bigfold::engine::progress::ProgressReporter;
use bigfold::workflows::{self, assemble::AssemblyReport};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub fn run(args: AssembleArgs, quiet: bool) -> Result<()> {
    let plan = build_assemble_plan(&args)?;

    let files = workflows::assemble::discover_fragment_files(&plan.input_dir, &plan.prefix)?;
    if files.is_empty() {
        return Err(CliError::Argument(format!(
            "No fragment files named '{}_seg<N>_*.pdb' found in {}",
            plan.prefix,
            plan.input_dir.display()
        )));
    }
    info!(
        "Found {} fragment file(s) for '{}' in {:?}",
        files.len(),
        plan.prefix,
        &plan.input_dir
    );

    let fragments = files
        .par_iter()
        .map(|(index, path)| load_fragment(*index, path))
        .collect::<Result<Vec<_>>>()?;

    let progress_handler = progress_handler(quiet);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Reassembling {} fragment(s)...", fragments.len());
    let outcome = workflows::assemble::run(fragments, &plan.core_config, &reporter)?;
    let model = outcome.model.as_ref().ok_or(EngineError::NoFragments)?;

    write_model(model, &plan)?;
    if let Some(report_path) = &plan.report_path {
        write_report(&outcome, report_path)?;
        println!("  Run report written to: {}", report_path.display());
    }

    print_summary(&outcome, model);
    Ok(())
}

fn load_fragment(chunk_index: usize, path: &Path) -> Result<Fragment> {
    let (system, _) = PdbFile::read_from_path(path).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    Ok(Fragment::new(chunk_index, system)?)
}

fn write_model(model: &AssembledModel, plan: &AssemblePlan) -> Result<()> {
    if plan.core_config.combine {
        let metadata = PdbMetadata::with_remark(&format!(
            "bigfold reassembly of {} from {} fragment(s)",
            plan.prefix,
            model.spans().len()
        ));
        write_pdb(model.system(), &metadata, &plan.output_path)?;
        println!(
            "✓ Assembled model ({} residues) written to: {}",
            model.residue_count(),
            plan.output_path.display()
        );
        return Ok(());
    }

    for (chunk_index, system) in model.split_by_fragment()? {
        let path = fragment_output_path(&plan.output_path, chunk_index);
        let metadata = PdbMetadata::with_remark(&format!(
            "bigfold aligned fragment {} of {}",
            chunk_index, plan.prefix
        ));
        write_pdb(&system, &metadata, &path)?;
        println!(
            "✓ Fragment {} ({} residues) written to: {}",
            chunk_index,
            system.residue_count(),
            path.display()
        );
    }
    Ok(())
}

fn write_pdb(
    system: &bigfold::core::models::system::MolecularSystem,
    metadata: &PdbMetadata,
    path: &Path,
) -> Result<()> {
    info!("Writing {:?}", path);
    PdbFile::write_to_path(system, metadata, path).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })
}

fn write_report(outcome: &AssemblyOutcome, path: &Path) -> Result<()> {
    let text = AssemblyReport::from_outcome(outcome)
        .to_toml_string()
        .map_err(|e| CliError::Other(e.into()))?;
    std::fs::write(path, text)?;
    Ok(())
}

/// `out/model.pdb` with chunk 3 becomes `out/model_seg3.pdb`.
fn fragment_output_path(base: &Path, chunk_index: usize) -> PathBuf {
    let stem = base
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("fragment");
    let extension = base.extension().and_then(|e| e.to_str()).unwrap_or("pdb");
    base.with_file_name(format!("{}_seg{}.{}", stem, chunk_index, extension))
}

fn print_summary(outcome: &AssemblyOutcome, model: &AssembledModel) {
    let connected = model.junctions().iter().filter(|j| j.connected).count();
    println!(
        "  {} fragment(s) used, {} junction(s) bonded, {} confidence value(s) smoothed.",
        model.spans().len(),
        connected,
        model.confidence_updates().len()
    );
    if outcome.halted {
        warn!("Reassembly stopped early at a short fragment.");
        println!("Warning: reassembly stopped early; the model covers the leading fragments only.");
    }
    if !outcome.issues.is_empty() {
        println!("{} issue(s) recorded:", outcome.issues.len());
        for issue in &outcome.issues {
            println!("  - {}", issue);
        }
    }
}
