use super::embedding::SimplexEmbedding;
use super::error::HullError;
use super::phase_hull::{HullPoint, HullPointSource, PhaseHull};
use super::potentials::ChemicalPotentials;
use super::registry::{Entry, EntryRegistry};
use crate::core::geometry::exact::Rational;
use crate::core::models::composition::Composition;
use itertools::Itertools;
use num_traits::Signed;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

/// Owns the cached phase hull and decides when it must be rebuilt.
///
/// The hull is rebuilt lazily: any change to the entry set or to a chemical potential marks
/// the cache dirty, and the next [`HullBuilder::get_hull`] call rebuilds it. A dirty cache
/// is never handed out.
#[derive(Debug, Clone)]
pub struct HullBuilder {
    cached: Option<PhaseHull>,
    dirty: bool,
    filter_vertical_facets: bool,
    builds: usize,
}

impl HullBuilder {
    pub fn new(filter_vertical_facets: bool) -> Self {
        Self {
            cached: None,
            dirty: true,
            filter_vertical_facets,
            builds: 0,
        }
    }

    /// Marks the cached hull stale.
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    /// The cached hull, if one exists and is current.
    pub fn cached(&self) -> Option<&PhaseHull> {
        if self.dirty {
            None
        } else {
            self.cached.as_ref()
        }
    }

    /// Number of hull builds performed so far.
    pub fn build_count(&self) -> usize {
        self.builds
    }

    /// Returns the current hull, rebuilding it first if it is stale.
    ///
    /// Returns `Ok(None)` while some endpoint still lacks a chemical potential; callers must
    /// treat that as indeterminate.
    pub fn get_hull(
        &mut self,
        embedding: &SimplexEmbedding,
        registry: &EntryRegistry,
        potentials: &ChemicalPotentials,
    ) -> Result<Option<&PhaseHull>, HullError> {
        if !potentials.is_complete() {
            return Ok(None);
        }
        if self.dirty || self.cached.is_none() {
            let hull = self.build(embedding, registry, potentials)?;
            self.cached = Some(hull);
            self.dirty = false;
            self.builds += 1;
        }
        Ok(self.cached.as_ref())
    }

    #[instrument(skip_all, name = "phase_hull_build")]
    fn build(
        &self,
        embedding: &SimplexEmbedding,
        registry: &EntryRegistry,
        potentials: &ChemicalPotentials,
    ) -> Result<PhaseHull, HullError> {
        let dim = embedding.dimension();
        let mut points: Vec<HullPoint> = embedding
            .endpoints()
            .iter()
            .map(|endpoint| {
                HullPoint::new(
                    HullPointSource::Endpoint(endpoint.id()),
                    embedding.exact_vertex(endpoint.id()),
                    endpoint.formula().to_string(),
                )
            })
            .collect();

        let candidates = select_candidates(registry, potentials);
        let admitted = candidates.len();
        points.extend(candidates.into_iter().filter_map(|(entry, _)| {
            let coordinates = entry.exact_point(embedding, potentials)?;
            Some(HullPoint::new(
                HullPointSource::Entry(entry.id()),
                coordinates,
                entry.composition().to_string(),
            ))
        }));

        let mut hull = PhaseHull::build(dim, points)?;

        if self.filter_vertical_facets && !hull.is_flat() {
            let supporting = hull.supporting_points();
            let dropped = hull.points().len() - supporting.len();
            if dropped > 0 {
                debug!(dropped, "Dropping points that only support vertical facets.");
                let points = supporting
                    .into_iter()
                    .map(|index| hull.points()[index].clone())
                    .collect();
                hull = PhaseHull::build(dim, points)?;
            }
        }

        info!(
            entries = registry.len(),
            admitted,
            points = hull.points().len(),
            facets = hull.facets().len(),
            flat = hull.is_flat(),
            "Phase hull built."
        );
        Ok(hull)
    }
}

/// Non-pure entries with non-positive energy, lowest energy per reduced composition, sorted by
/// ascending energy. Ties keep the earliest registered entry.
fn select_candidates<'a>(
    registry: &'a EntryRegistry,
    potentials: &ChemicalPotentials,
) -> Vec<(&'a Entry, Rational)> {
    let mut best: BTreeMap<&Composition, (&Entry, Rational)> = BTreeMap::new();
    for entry in registry.iter().filter(|e| !e.is_pure_endpoint()) {
        let Some(energy) = entry.energy(potentials) else {
            continue;
        };
        if energy.is_positive() {
            continue;
        }
        match best.get(entry.reduced()) {
            Some((_, current)) if *current <= energy => {}
            _ => {
                best.insert(entry.reduced(), (entry, energy));
            }
        }
    }

    best.into_values()
        .sorted_by(|(a, ea), (b, eb)| ea.cmp(eb).then(a.id().cmp(&b.id())))
        .collect()
}
