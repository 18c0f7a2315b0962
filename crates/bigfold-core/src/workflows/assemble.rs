use crate::core::sequence::FragmentNamePattern;
use crate::engine::assembler::{
    AssemblyOutcome, Assembler, FragmentOutcome, FragmentSpan,
};
use crate::engine::config::AssemblyConfig;
use crate::engine::error::{AssemblyIssue, EngineError};
use crate::engine::fragment::Fragment;
use crate::engine::joining::Junction;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::smoothing::ConfidenceUpdate;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Finds the fragment files `{prefix}_seg{N}_*.pdb` in `dir`, ordered by `N`.
///
/// Files that do not follow the naming scheme are ignored. Two files with the
/// same chunk index are both returned; the assembler rejects the duplicate.
pub fn discover_fragment_files(dir: &Path, prefix: &str) -> io::Result<Vec<(usize, PathBuf)>> {
    let pattern = FragmentNamePattern::new(prefix)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        match pattern.chunk_index(name) {
            Some(index) => found.push((index, entry.path())),
            None => debug!(file = name, "Ignoring file outside the fragment naming scheme."),
        }
    }
    found.sort();
    Ok(found)
}

/// Reassembles fragments into one model.
///
/// Fragments may be supplied in any order; they are sorted by chunk index
/// first. A repeated chunk index is fatal, while short fragments, degenerate
/// alignments and broken junctions are collected in the outcome.
#[instrument(skip_all, name = "assembly_workflow")]
pub fn run(
    mut fragments: Vec<Fragment>,
    config: &AssemblyConfig,
    reporter: &ProgressReporter,
) -> Result<AssemblyOutcome, EngineError> {
    if fragments.is_empty() {
        return Err(EngineError::NoFragments);
    }
    fragments.sort_by_key(|f| f.chunk_index());
    if let Some(pair) = fragments
        .windows(2)
        .find(|pair| pair[0].chunk_index() == pair[1].chunk_index())
    {
        return Err(EngineError::DuplicateChunk(pair[0].chunk_index()));
    }

    info!(
        fragments = fragments.len(),
        overlap = config.overlap_length,
        align_span = config.align_span,
        combine = config.combine,
        "Starting reassembly."
    );

    reporter.report(Progress::PhaseStart { name: "Reassembly" });
    reporter.report(Progress::TaskStart {
        total_steps: fragments.len() as u64,
    });

    let mut assembler = Assembler::new(config.clone());
    for fragment in fragments {
        let seen_issues = assembler.issues().len();
        let outcome = assembler.push(fragment)?;
        for issue in &assembler.issues()[seen_issues..] {
            reporter.report(Progress::Warning(issue.to_string()));
        }
        reporter.report(Progress::TaskIncrement);
        if outcome == FragmentOutcome::Halted {
            reporter.report(Progress::Message(
                "Stopped at a short fragment; keeping the model built so far.".into(),
            ));
            break;
        }
    }

    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);

    let outcome = assembler.finish();
    if let Some(model) = &outcome.model {
        info!(
            residues = model.residue_count(),
            junctions = model.junctions().len(),
            issues = outcome.issues.len(),
            "Reassembly complete."
        );
    }
    Ok(outcome)
}

/// Serializable summary of an assembly run.
#[derive(Debug, Clone, Serialize)]
pub struct AssemblyReport {
    pub residue_count: usize,
    pub halted: bool,
    pub fragments_used: Vec<usize>,
    pub spans: Vec<FragmentSpan>,
    pub junctions: Vec<Junction>,
    pub confidence_updates: Vec<ConfidenceUpdate>,
    pub issues: Vec<AssemblyIssue>,
}

impl AssemblyReport {
    pub fn from_outcome(outcome: &AssemblyOutcome) -> Self {
        let (residue_count, spans, junctions, confidence_updates) = match &outcome.model {
            Some(model) => (
                model.residue_count(),
                model.spans().to_vec(),
                model.junctions().to_vec(),
                model.confidence_updates().to_vec(),
            ),
            None => (0, Vec::new(), Vec::new(), Vec::new()),
        };
        Self {
            residue_count,
            halted: outcome.halted,
            fragments_used: spans.iter().map(|s| s.chunk_index).collect(),
            spans,
            junctions,
            confidence_updates,
            issues: outcome.issues.clone(),
        }
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
