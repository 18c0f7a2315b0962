use super::alignment::{align_fragment, pair_anchor_residues};
use super::config::{AssemblyConfig, ShortFragmentPolicy};
use super::error::{AssemblyIssue, EngineError};
use super::fragment::Fragment;
use super::joining::{Junction, join_residues};
use super::smoothing::{ConfidenceUpdate, smooth_boundary};
use super::trimming::trim_and_renumber;
use crate::core::models::chain::ChainType;
use crate::core::models::ids::{ChainId, ResidueId};
use crate::core::models::system::MolecularSystem;
use serde::Serialize;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyState {
    /// No fragment seen yet.
    Empty,
    /// At least one fragment folded in; more may follow.
    Accumulating,
    /// Finished, either by [`Assembler::finish`] or by a halting short fragment.
    Done,
}

/// Residue numbers contributed by one fragment to the assembled chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FragmentSpan {
    pub chunk_index: usize,
    pub first_residue: isize,
    pub last_residue: isize,
}

impl FragmentSpan {
    pub fn len(&self) -> usize {
        (self.last_residue - self.first_residue + 1) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.last_residue < self.first_residue
    }
}

/// The single continuous chain grown from the fragments, numbered from 1.
#[derive(Debug, Clone)]
pub struct AssembledModel {
    system: MolecularSystem,
    chain_id: ChainId,
    junctions: Vec<Junction>,
    spans: Vec<FragmentSpan>,
    confidence_updates: Vec<ConfidenceUpdate>,
}

impl AssembledModel {
    pub fn system(&self) -> &MolecularSystem {
        &self.system
    }

    pub fn into_system(self) -> MolecularSystem {
        self.system
    }

    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    pub fn junctions(&self) -> &[Junction] {
        &self.junctions
    }

    pub fn spans(&self) -> &[FragmentSpan] {
        &self.spans
    }

    pub fn confidence_updates(&self) -> &[ConfidenceUpdate] {
        &self.confidence_updates
    }

    pub fn residue_ids(&self) -> &[ResidueId] {
        self.system
            .chain(self.chain_id)
            .map(|c| c.residues())
            .unwrap_or(&[])
    }

    pub fn residue_count(&self) -> usize {
        self.residue_ids().len()
    }

    fn last_residue_number(&self) -> isize {
        self.residue_ids()
            .last()
            .and_then(|&id| self.system.residue(id))
            .map_or(0, |r| r.residue_number)
    }

    /// Cuts the model back into the pieces each fragment contributed, keeping
    /// the continuous numbering. Bonds across the cuts are dropped.
    pub fn split_by_fragment(&self) -> Result<Vec<(usize, MolecularSystem)>, EngineError> {
        let mut start = 0;
        let mut pieces = Vec::with_capacity(self.spans.len());
        for span in &self.spans {
            let end = start + span.len();
            let piece = self
                .system
                .extract_residues(self.chain_id, start..end)
                .ok_or_else(|| {
                    EngineError::Internal(format!(
                        "span of chunk {} ({}..{}) exceeds the assembled chain",
                        span.chunk_index, span.first_residue, span.last_residue
                    ))
                })?;
            pieces.push((span.chunk_index, piece));
            start = end;
        }
        Ok(pieces)
    }
}

/// Per-fragment result of [`Assembler::push`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentOutcome {
    /// The fragment became the initial model.
    Seeded { residues: usize },
    Appended { residues: usize },
    /// Too short; recorded and ignored.
    Skipped,
    /// Too short under [`ShortFragmentPolicy::Halt`]; the assembler is done.
    Halted,
}

/// Everything an assembly run produced.
#[derive(Debug, Clone)]
pub struct AssemblyOutcome {
    /// `None` only when no fragment was ever pushed.
    pub model: Option<AssembledModel>,
    pub issues: Vec<AssemblyIssue>,
    pub halted: bool,
}

/// Folds fragments, in chunk order, into one continuous model.
///
/// The first fragment is taken verbatim and renumbered from 1. Every later
/// fragment is aligned onto the tail of the model, its overlap window donates
/// confidence to the matched tail residues, its overlap is trimmed, and the
/// remainder is renumbered, linked to the chain end and appended.
pub struct Assembler {
    config: AssemblyConfig,
    state: AssemblyState,
    model: Option<AssembledModel>,
    issues: Vec<AssemblyIssue>,
    last_chunk: Option<usize>,
    halted: bool,
}

impl Assembler {
    pub fn new(config: AssemblyConfig) -> Self {
        Self {
            config,
            state: AssemblyState::Empty,
            model: None,
            issues: Vec::new(),
            last_chunk: None,
            halted: false,
        }
    }

    pub fn state(&self) -> AssemblyState {
        self.state
    }

    pub fn model(&self) -> Option<&AssembledModel> {
        self.model.as_ref()
    }

    pub fn issues(&self) -> &[AssemblyIssue] {
        &self.issues
    }

    #[instrument(skip_all, name = "assembler_push", fields(chunk = fragment.chunk_index()))]
    pub fn push(&mut self, fragment: Fragment) -> Result<FragmentOutcome, EngineError> {
        if self.state == AssemblyState::Done {
            return Err(EngineError::AlreadyFinished);
        }

        let chunk_index = fragment.chunk_index();
        if let Some(previous) = self.last_chunk {
            if chunk_index == previous {
                return Err(EngineError::DuplicateChunk(chunk_index));
            }
            if chunk_index < previous {
                return Err(EngineError::OutOfOrder {
                    previous,
                    got: chunk_index,
                });
            }
        }
        self.last_chunk = Some(chunk_index);

        match self.model.take() {
            None => {
                let model = self.seed(&fragment)?;
                let residues = model.residue_count();
                info!(residues, "Seeded assembled model.");
                self.model = Some(model);
                self.state = AssemblyState::Accumulating;
                Ok(FragmentOutcome::Seeded { residues })
            }
            Some(mut model) => {
                let outcome = self.fold(&mut model, &fragment);
                self.model = Some(model);
                outcome
            }
        }
    }

    /// Ends the run and hands back the model with every recorded issue.
    pub fn finish(mut self) -> AssemblyOutcome {
        self.state = AssemblyState::Done;
        if !self.issues.is_empty() {
            warn!(count = self.issues.len(), "Assembly finished with recoverable issues.");
        }
        AssemblyOutcome {
            model: self.model,
            issues: self.issues,
            halted: self.halted,
        }
    }

    fn seed(&self, fragment: &Fragment) -> Result<AssembledModel, EngineError> {
        let mut system = MolecularSystem::new();
        let chain_id = system.add_chain(self.config.chain_id, ChainType::Protein);
        system
            .append_residues(chain_id, fragment.system(), fragment.residue_ids())
            .ok_or_else(|| EngineError::Internal("failed to copy the first fragment".into()))?;
        system
            .renumber_chain(chain_id, 1)
            .ok_or_else(|| EngineError::Internal("assembled chain disappeared".into()))?;

        let residues = fragment.len() as isize;
        Ok(AssembledModel {
            system,
            chain_id,
            junctions: Vec::new(),
            spans: vec![FragmentSpan {
                chunk_index: fragment.chunk_index(),
                first_residue: 1,
                last_residue: residues,
            }],
            confidence_updates: Vec::new(),
        })
    }

    fn fold(
        &mut self,
        model: &mut AssembledModel,
        fragment: &Fragment,
    ) -> Result<FragmentOutcome, EngineError> {
        let chunk_index = fragment.chunk_index();
        let overlap = self.config.overlap_length;

        if fragment.len() <= overlap {
            let issue = AssemblyIssue::ShortFragment {
                chunk_index,
                residue_count: fragment.len(),
                overlap_length: overlap,
            };
            warn!("{}", issue);
            self.issues.push(issue);
            return Ok(match self.config.short_fragment_policy {
                ShortFragmentPolicy::Skip => FragmentOutcome::Skipped,
                ShortFragmentPolicy::Halt => {
                    self.state = AssemblyState::Done;
                    self.halted = true;
                    FragmentOutcome::Halted
                }
            });
        }

        let tail = model.residue_ids().to_vec();
        let previous_last = *tail
            .last()
            .ok_or_else(|| EngineError::Internal("assembled chain is empty".into()))?;
        let pairing = pair_anchor_residues(&tail, fragment, overlap, self.config.align_span);

        let alignment = align_fragment(&model.system, fragment, &pairing);
        if !alignment.degeneracies.is_empty() {
            self.issues.push(AssemblyIssue::AlignmentDegeneracy {
                chunk_index,
                requested_span: pairing.requested_span,
                used_pairs: alignment.used_pairs,
                detail: alignment.degeneracies.join("; "),
            });
        }
        let aligned = fragment.transformed(&alignment.transform);

        let updates = smooth_boundary(&mut model.system, &aligned, &pairing);
        model.confidence_updates.extend(updates);

        let first_number = model.last_residue_number() + 1;
        let trimmed = trim_and_renumber(&aligned, overlap, first_number)
            .ok_or_else(|| EngineError::Internal("trimmed fragment is empty".into()))?;
        let trimmed_ids = trimmed
            .chains_iter()
            .next()
            .map(|(_, chain)| chain.residues().to_vec())
            .unwrap_or_default();

        let new_ids = model
            .system
            .append_residues(model.chain_id, &trimmed, &trimmed_ids)
            .ok_or_else(|| {
                EngineError::Internal(format!(
                    "residue numbers from {} collide with the assembled chain",
                    first_number
                ))
            })?;
        let first_new = *new_ids
            .first()
            .ok_or_else(|| EngineError::Internal("no residues appended".into()))?;

        if self.config.combine {
            let (junction, issue) =
                join_residues(&mut model.system, previous_last, first_new, chunk_index);
            model.junctions.push(junction);
            self.issues.extend(issue);
        }

        let residues = new_ids.len();
        model.spans.push(FragmentSpan {
            chunk_index,
            first_residue: first_number,
            last_residue: first_number + residues as isize - 1,
        });
        info!(
            residues,
            total = model.residue_count(),
            rmsd = alignment.rmsd.unwrap_or_default(),
            "Appended fragment."
        );

        Ok(FragmentOutcome::Appended { residues })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::utils::geometry::RigidTransform;
    use crate::engine::config::AssemblyConfigBuilder;
    use crate::engine::fragment::test_support::{backbone_fragment, helix_atom};
    use nalgebra::{Rotation3, Vector3};

    fn config(overlap: usize, policy: ShortFragmentPolicy, combine: bool) -> AssemblyConfig {
        AssemblyConfigBuilder::new()
            .overlap_length(overlap)
            .align_span(5)
            .combine(combine)
            .short_fragment_policy(policy)
            .build()
            .unwrap()
    }

    fn fragment(index: usize, first: usize, last: usize) -> Fragment {
        let system = backbone_fragment(first, last, move |_| index as f64 * 10.0);
        let scramble = RigidTransform::new(
            Rotation3::from_euler_angles(0.4 * index as f64, -0.7, 1.3 * index as f64),
            Vector3::new(25.0 * index as f64, -10.0, 3.0),
        );
        let fragment = Fragment::new(index, system).unwrap();
        if index == 1 {
            fragment
        } else {
            fragment.transformed(&scramble)
        }
    }

    fn numbers(model: &AssembledModel) -> Vec<isize> {
        model
            .residue_ids()
            .iter()
            .map(|&id| model.system().residue(id).unwrap().residue_number)
            .collect()
    }

    fn confidence_of(model: &AssembledModel, number: isize) -> f64 {
        let id = model
            .system()
            .find_residue_by_number(model.chain_id(), number)
            .unwrap();
        model.system().residue(id).unwrap().confidence
    }

    #[test]
    fn three_full_fragments_make_one_continuous_chain() {
        let mut assembler = Assembler::new(config(200, ShortFragmentPolicy::Skip, true));
        assert_eq!(assembler.state(), AssemblyState::Empty);

        assert_eq!(
            assembler.push(fragment(1, 1, 1400)).unwrap(),
            FragmentOutcome::Seeded { residues: 1400 }
        );
        assert_eq!(assembler.state(), AssemblyState::Accumulating);
        assert_eq!(
            assembler.push(fragment(2, 1201, 2600)).unwrap(),
            FragmentOutcome::Appended { residues: 1200 }
        );
        assembler.push(fragment(3, 2401, 3800)).unwrap();

        let outcome = assembler.finish();
        let model = outcome.model.unwrap();

        assert!(outcome.issues.is_empty());
        assert!(!outcome.halted);
        assert_eq!(model.residue_count(), 3800);
        assert_eq!(numbers(&model), (1..=3800).collect::<Vec<_>>());
        assert_eq!(model.junctions().len(), 2);
        assert!(model.junctions().iter().all(|j| j.connected));
        assert_eq!(model.system().bonds().len(), 2);
        assert_eq!(
            model.spans().iter().map(|s| (s.first_residue, s.last_residue)).collect::<Vec<_>>(),
            vec![(1, 1400), (1401, 2600), (2601, 3800)]
        );
    }

    #[test]
    fn fragments_land_in_the_frame_of_the_first() {
        let mut assembler = Assembler::new(config(10, ShortFragmentPolicy::Skip, true));
        assembler.push(fragment(1, 1, 30)).unwrap();
        assembler.push(fragment(2, 21, 50)).unwrap();
        assembler.push(fragment(3, 41, 70)).unwrap();
        let model = assembler.finish().model.unwrap();

        for (position, &residue_id) in model.residue_ids().iter().enumerate() {
            let global = position + 1;
            for name in ["N", "CA", "C"] {
                let atom = model.system().residue_atom(residue_id, name).unwrap();
                assert!(
                    (atom.position - helix_atom(global, name)).norm() < 1e-6,
                    "residue {global} atom {name}"
                );
            }
        }
        let junction = &model.junctions()[0];
        assert_eq!((junction.previous_residue, junction.next_residue), (30, 31));
        let expected = (helix_atom(30, "C") - helix_atom(31, "N")).norm();
        assert!((junction.distance.unwrap() - expected).abs() < 1e-6);
    }

    #[test]
    fn boundary_confidence_comes_from_the_next_fragment() {
        let mut assembler = Assembler::new(config(10, ShortFragmentPolicy::Skip, true));
        assembler.push(fragment(1, 1, 30)).unwrap();
        assembler.push(fragment(2, 21, 50)).unwrap();
        let model = assembler.finish().model.unwrap();

        assert_eq!(confidence_of(&model, 25), 10.0);
        for number in 26..=30 {
            assert_eq!(confidence_of(&model, number), 20.0);
        }
        assert_eq!(confidence_of(&model, 31), 20.0);
        assert_eq!(model.confidence_updates().len(), 5);
        assert_eq!(model.confidence_updates()[0].residue_number, 26);
        assert_eq!(model.confidence_updates()[0].old, 10.0);
    }

    #[test]
    fn short_fragment_is_recorded_and_skipped() {
        let mut assembler = Assembler::new(config(200, ShortFragmentPolicy::Skip, true));
        assembler.push(fragment(1, 1, 1400)).unwrap();
        assert_eq!(
            assembler.push(fragment(2, 1201, 1350)).unwrap(),
            FragmentOutcome::Skipped
        );
        assert_eq!(assembler.state(), AssemblyState::Accumulating);

        let outcome = assembler.finish();
        assert_eq!(outcome.model.unwrap().residue_count(), 1400);
        assert_eq!(
            outcome.issues,
            vec![AssemblyIssue::ShortFragment {
                chunk_index: 2,
                residue_count: 150,
                overlap_length: 200
            }]
        );
    }

    #[test]
    fn halt_policy_stops_at_short_fragment() {
        let mut assembler = Assembler::new(config(10, ShortFragmentPolicy::Halt, true));
        assembler.push(fragment(1, 1, 30)).unwrap();
        assert_eq!(
            assembler.push(fragment(2, 21, 28)).unwrap(),
            FragmentOutcome::Halted
        );
        assert_eq!(assembler.state(), AssemblyState::Done);
        assert!(matches!(
            assembler.push(fragment(3, 21, 50)),
            Err(EngineError::AlreadyFinished)
        ));

        let outcome = assembler.finish();
        assert!(outcome.halted);
        assert_eq!(outcome.model.unwrap().residue_count(), 30);
        assert_eq!(outcome.issues.len(), 1);
    }

    #[test]
    fn fragments_must_arrive_in_increasing_chunk_order() {
        let mut assembler = Assembler::new(config(10, ShortFragmentPolicy::Skip, true));
        assembler.push(fragment(2, 1, 30)).unwrap();
        assert!(matches!(
            assembler.push(fragment(2, 21, 50)),
            Err(EngineError::DuplicateChunk(2))
        ));
        assert!(matches!(
            assembler.push(fragment(1, 21, 50)),
            Err(EngineError::OutOfOrder {
                previous: 2,
                got: 1
            })
        ));
    }

    #[test]
    fn without_combine_fragments_are_not_linked_and_can_be_split() {
        let mut assembler = Assembler::new(config(10, ShortFragmentPolicy::Skip, false));
        assembler.push(fragment(1, 1, 30)).unwrap();
        assembler.push(fragment(2, 21, 50)).unwrap();
        let model = assembler.finish().model.unwrap();

        assert!(model.junctions().is_empty());
        assert!(model.system().bonds().is_empty());

        let pieces = model.split_by_fragment().unwrap();
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].0, 1);
        assert_eq!(pieces[0].1.residue_count(), 30);
        let second = &pieces[1].1;
        let chain_id = second.find_chain_by_id('A').unwrap();
        assert!(second.find_residue_by_number(chain_id, 31).is_some());
        assert!(second.find_residue_by_number(chain_id, 50).is_some());
    }

    #[test]
    fn finishing_without_fragments_yields_no_model() {
        let outcome = Assembler::new(AssemblyConfig::default()).finish();
        assert!(outcome.model.is_none());
        assert!(outcome.issues.is_empty());
    }
}
