use crate::core::models::system::MolecularSystem;
use crate::engine::config::ConfigError;
use crate::engine::mutation::{Mutation, MutationReport, ResidueSelection, mutate_residues};
use crate::engine::progress::{Progress, ProgressReporter};
use tracing::{info, instrument};

/// Truncates every selected residue named like the mutation source.
///
/// Residues that cannot be mutated are left as they are; their problems are
/// reported together in a single warning once the batch is done.
#[instrument(skip_all, name = "mutation_workflow")]
pub fn run(
    system: &mut MolecularSystem,
    selection: &ResidueSelection,
    mutation: &Mutation,
    reporter: &ProgressReporter,
) -> Result<MutationReport, ConfigError> {
    if let (Some(first), Some(last)) = (selection.first, selection.last) {
        if first > last {
            return Err(ConfigError::InvalidValue {
                parameter: "residue_range",
                reason: format!("first residue {} is after last residue {}", first, last),
            });
        }
    }

    let report = reporter.phase("Mutation", || mutate_residues(system, selection, mutation));

    info!(
        mutated = report.mutated.len(),
        failed = report.issues.len(),
        "{} -> {} done.",
        mutation.from_name(),
        mutation.to_name()
    );
    if let Some(summary) = report.issue_summary() {
        reporter.report(Progress::Warning(summary));
    }
    Ok(report)
}
