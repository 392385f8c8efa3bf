use crate::core::models::composition::Composition;
use crate::core::models::ids::{CandidateHandle, EntryId};
use crate::engine::config::HullConfig;
use crate::engine::diagram::{HullView, PhaseDiagram};
use crate::engine::error::HullError;
use crate::engine::registry::Rejection;
use slotmap::SlotMap;
use std::fmt;
use tracing::{info, instrument};

pub const STABILITY_PROPERTY: &str = "stability";
pub const FORMATION_ENERGY_PROPERTY: &str = "formation_energy";
pub const HULL_DISTANCE_PROPERTY: &str = "hull_distance";

/// Classification of a candidate against the hull.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stability {
    Stable,
    Unstable,
    NotAHullCandidate,
}

impl fmt::Display for Stability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Stable => "STABLE",
            Self::Unstable => "UNSTABLE",
            Self::NotAHullCandidate => "NOT_A_HULL_CANDIDATE",
        };
        f.write_str(name)
    }
}

/// A value written back onto a candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyValue {
    Stability(Stability),
    Float(f64),
}

/// A caller-owned object that can be placed on a phase diagram.
pub trait Candidate {
    fn composition(&self) -> &Composition;

    /// The energetic score, e.g. an enthalpy. `None` makes the candidate ineligible.
    fn score(&self) -> Option<f64>;

    fn set_property(&mut self, name: &str, value: PropertyValue);
}

/// Counts of what [`StructureHull::populate_properties`] wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PopulateSummary {
    pub stable: usize,
    pub unstable: usize,
    pub rejected: usize,
    pub indeterminate: usize,
}

#[derive(Debug)]
struct Binding<C> {
    candidate: C,
    entry: Result<EntryId, Rejection>,
}

/// Candidates bound to the entries of one phase diagram.
///
/// Every inserted candidate gets a handle, including rejected ones, so that they can still
/// be tagged as not being hull candidates.
#[derive(Debug)]
pub struct StructureHull<C> {
    diagram: PhaseDiagram,
    bindings: SlotMap<CandidateHandle, Binding<C>>,
}

impl<C: Candidate> StructureHull<C> {
    pub fn new(config: &HullConfig) -> Result<Self, HullError> {
        Ok(Self {
            diagram: PhaseDiagram::new(config)?,
            bindings: SlotMap::with_key(),
        })
    }

    /// Registers `candidate` and keeps it.
    ///
    /// Returns the rejection reason when the candidate cannot take part in the hull; the
    /// candidate is retained either way and shows up in [`StructureHull::rejected`].
    pub fn insert(&mut self, candidate: C) -> Result<CandidateHandle, Rejection> {
        let entry = self
            .diagram
            .register(candidate.composition(), candidate.score());
        let outcome = entry.clone().map(|_| ());
        let handle = self.bindings.insert(Binding { candidate, entry });
        outcome.map(|()| handle)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn get(&self, handle: CandidateHandle) -> Option<&C> {
        self.bindings.get(handle).map(|b| &b.candidate)
    }

    pub fn entry_id(&self, handle: CandidateHandle) -> Option<EntryId> {
        self.bindings.get(handle)?.entry.as_ref().ok().copied()
    }

    /// All candidates in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (CandidateHandle, &C)> {
        self.bindings.iter().map(|(handle, b)| (handle, &b.candidate))
    }

    /// Candidates that could not be registered, with the reason.
    pub fn rejected(&self) -> impl Iterator<Item = (CandidateHandle, &C, &Rejection)> {
        self.bindings.iter().filter_map(|(handle, b)| match &b.entry {
            Err(rejection) => Some((handle, &b.candidate, rejection)),
            Ok(_) => None,
        })
    }

    /// Candidates on the lower envelope of the current hull.
    ///
    /// Empty while the hull is indeterminate.
    pub fn stable(&mut self) -> Result<Vec<(CandidateHandle, &C)>, HullError> {
        self.diagram.refresh()?;
        let Some(view) = self.diagram.view() else {
            return Ok(Vec::new());
        };
        Ok(self
            .bindings
            .iter()
            .filter(|(_, b)| classify(view, &b.entry) == Some(Stability::Stable))
            .map(|(handle, b)| (handle, &b.candidate))
            .collect())
    }

    pub fn formation_energy(&self, handle: CandidateHandle) -> Option<f64> {
        self.diagram.formation_energy(self.entry_id(handle)?)
    }

    /// Stability of one candidate; `None` for unknown handles and indeterminate results.
    pub fn stability(&mut self, handle: CandidateHandle) -> Result<Option<Stability>, HullError> {
        self.diagram.refresh()?;
        let Some(binding) = self.bindings.get(handle) else {
            return Ok(None);
        };
        if binding.entry.is_err() {
            return Ok(Some(Stability::NotAHullCandidate));
        }
        Ok(self
            .diagram
            .view()
            .and_then(|view| classify(view, &binding.entry)))
    }

    pub fn hull_distance(&mut self, handle: CandidateHandle) -> Result<Option<f64>, HullError> {
        let Some(entry) = self.entry_id(handle) else {
            return Ok(None);
        };
        self.diagram.distance_to_hull(entry)
    }

    /// Writes stability, formation energy and hull distance onto every candidate.
    ///
    /// Properties whose value is indeterminate are not written.
    #[instrument(skip_all, name = "populate_properties")]
    pub fn populate_properties(&mut self) -> Result<PopulateSummary, HullError> {
        self.diagram.refresh()?;
        let Self { diagram, bindings } = self;
        let view = diagram.view();
        let mut summary = PopulateSummary::default();

        for binding in bindings.values_mut() {
            let Binding { candidate, entry } = binding;

            let stability = match view {
                Some(view) => classify(view, entry),
                None if entry.is_err() => Some(Stability::NotAHullCandidate),
                None => None,
            };
            match stability {
                Some(Stability::Stable) => summary.stable += 1,
                Some(Stability::Unstable) => summary.unstable += 1,
                Some(Stability::NotAHullCandidate) => summary.rejected += 1,
                None => summary.indeterminate += 1,
            }
            if let Some(stability) = stability {
                candidate.set_property(STABILITY_PROPERTY, PropertyValue::Stability(stability));
            }

            let Ok(&id) = entry.as_ref() else {
                continue;
            };
            if let Some(energy) = diagram.formation_energy(id) {
                candidate.set_property(FORMATION_ENERGY_PROPERTY, PropertyValue::Float(energy));
            }
            if let Some(distance) = view.and_then(|view| view.distance_to_hull(id)) {
                candidate.set_property(HULL_DISTANCE_PROPERTY, PropertyValue::Float(distance));
            }
        }

        info!(
            stable = summary.stable,
            unstable = summary.unstable,
            rejected = summary.rejected,
            indeterminate = summary.indeterminate,
            "Hull properties populated."
        );
        Ok(summary)
    }

    /// Brings the hull up to date; `false` while it cannot be built.
    pub fn refresh(&mut self) -> Result<bool, HullError> {
        self.diagram.refresh()
    }

    pub fn diagram(&self) -> &PhaseDiagram {
        &self.diagram
    }

    /// Consumes the container, returning the candidates in insertion order.
    pub fn into_candidates(self) -> Vec<C> {
        self.bindings.into_iter().map(|(_, b)| b.candidate).collect()
    }
}

fn classify(view: HullView<'_>, entry: &Result<EntryId, Rejection>) -> Option<Stability> {
    match entry {
        Err(_) => Some(Stability::NotAHullCandidate),
        Ok(id) => view.is_stable(*id).map(|stable| {
            if stable {
                Stability::Stable
            } else {
                Stability::Unstable
            }
        }),
    }
}
