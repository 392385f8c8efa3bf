use super::builder::HullBuilder;
use super::config::HullConfig;
use super::embedding::{Endpoint, SimplexEmbedding};
use super::error::HullError;
use super::phase_hull::{HullPoint, PhaseHull};
use super::potentials::ChemicalPotentials;
use super::registry::{Entry, EntryRegistry, Rejection};
use crate::core::geometry::exact::{self, Rational};
use crate::core::models::composition::Composition;
use crate::core::models::ids::{EndpointId, EntryId, HullPointId};
use nalgebra::DVector;
use tracing::{debug, info};

/// A phase diagram over a fixed set of endpoints.
///
/// Owns the endpoint embedding, the chemical potentials, the registered entries and the
/// cached hull, and keeps the cache consistent: every accepted registration marks the hull
/// stale, so queries after a registration always see a rebuilt hull.
#[derive(Debug, Clone)]
pub struct PhaseDiagram {
    embedding: SimplexEmbedding,
    potentials: ChemicalPotentials,
    registry: EntryRegistry,
    builder: HullBuilder,
}

impl PhaseDiagram {
    /// Creates an empty diagram for the configured endpoints.
    ///
    /// # Errors
    ///
    /// Returns a [`HullError`] when the endpoint list is unusable (fewer than two, empty,
    /// duplicated or shadowed formulas).
    pub fn new(config: &HullConfig) -> Result<Self, HullError> {
        let embedding = SimplexEmbedding::new(&config.endpoints)?;
        info!(
            endpoints = embedding.dimension(),
            filter_vertical_facets = config.filter_vertical_facets,
            "Phase diagram initialized."
        );
        Ok(Self {
            potentials: ChemicalPotentials::new(embedding.dimension()),
            embedding,
            registry: EntryRegistry::new(),
            builder: HullBuilder::new(config.filter_vertical_facets),
        })
    }

    /// Registers a scored composition.
    ///
    /// Rejections are ordinary results, not failures of the diagram; a rejected candidate
    /// leaves the diagram untouched.
    pub fn register(
        &mut self,
        composition: &Composition,
        score: Option<f64>,
    ) -> Result<EntryId, Rejection> {
        let registration =
            self.registry
                .register(composition, score, &self.embedding, &mut self.potentials)?;

        if let Some((endpoint, update)) = registration.potential_update {
            if update.invalidates_hull() {
                debug!(%endpoint, ?update, "Chemical potential changed; hull invalidated.");
            }
        }
        self.builder.invalidate();
        Ok(registration.id)
    }

    /// True once every endpoint has a chemical potential.
    pub fn can_build_hull(&self) -> bool {
        self.potentials.is_complete()
    }

    /// Brings the cached hull up to date.
    ///
    /// Returns `false` when no hull can be built yet.
    pub fn refresh(&mut self) -> Result<bool, HullError> {
        Ok(self
            .builder
            .get_hull(&self.embedding, &self.registry, &self.potentials)?
            .is_some())
    }

    /// A read-only view onto the current hull, or `None` if it is stale or cannot be built.
    ///
    /// Call [`PhaseDiagram::refresh`] first.
    pub fn view(&self) -> Option<HullView<'_>> {
        let hull = self.builder.cached()?;
        Some(HullView {
            embedding: &self.embedding,
            potentials: &self.potentials,
            registry: &self.registry,
            hull,
        })
    }

    /// Refreshes the hull and reports whether `entry` is stable.
    ///
    /// `Ok(None)` means indeterminate: the hull cannot be built yet or the entry is unknown.
    pub fn is_stable(&mut self, entry: EntryId) -> Result<Option<bool>, HullError> {
        self.refresh()?;
        Ok(self.view().and_then(|view| view.is_stable(entry)))
    }

    /// Refreshes the hull and returns how far above it `entry` lies.
    pub fn distance_to_hull(&mut self, entry: EntryId) -> Result<Option<f64>, HullError> {
        self.refresh()?;
        Ok(self.view().and_then(|view| view.distance_to_hull(entry)))
    }

    /// Energy coordinate of `entry`, available once its constituent potentials are known.
    pub fn formation_energy(&self, entry: EntryId) -> Option<f64> {
        let energy = self.registry.get(entry)?.energy(&self.potentials)?;
        Some(exact::to_f64(&energy))
    }

    /// Endpoints without a chemical potential yet; the hull cannot be built while any remain.
    pub fn missing_potentials(&self) -> impl Iterator<Item = &Endpoint> {
        self.potentials
            .missing()
            .filter_map(|id| self.embedding.endpoint(id))
    }

    pub fn potential(&self, endpoint: EndpointId) -> Option<f64> {
        self.potentials.get(endpoint).map(exact::to_f64)
    }

    pub fn embedding(&self) -> &SimplexEmbedding {
        &self.embedding
    }

    pub fn entry(&self, id: EntryId) -> Option<&Entry> {
        self.registry.get(id)
    }

    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.registry.iter()
    }

    /// Regular-simplex position of `entry` with its energy on the last axis.
    pub fn embedded_point(&self, entry: EntryId) -> Option<DVector<f64>> {
        self.registry
            .get(entry)?
            .embedded_point(&self.embedding, &self.potentials)
    }

    /// Points of the current hull. Empty while the hull is stale or unavailable.
    pub fn hull_points(&self) -> &[HullPoint] {
        self.builder.cached().map(PhaseHull::points).unwrap_or(&[])
    }

    pub fn label(&self, point: HullPointId) -> Option<&str> {
        self.builder.cached()?.label(point)
    }

    pub fn hull_build_count(&self) -> usize {
        self.builder.build_count()
    }
}

/// Queries against a current hull. Borrowing the diagram guarantees the hull cannot go stale
/// while the view exists.
#[derive(Debug, Clone, Copy)]
pub struct HullView<'a> {
    embedding: &'a SimplexEmbedding,
    potentials: &'a ChemicalPotentials,
    registry: &'a EntryRegistry,
    hull: &'a PhaseHull,
}

impl<'a> HullView<'a> {
    pub fn hull(&self) -> &'a PhaseHull {
        self.hull
    }

    fn point(&self, entry: EntryId) -> Option<Vec<Rational>> {
        self.registry
            .get(entry)?
            .exact_point(self.embedding, self.potentials)
    }

    pub fn is_stable(&self, entry: EntryId) -> Option<bool> {
        let point = self.point(entry)?;
        Some(self.hull.is_stable(&point))
    }

    pub fn exact_distance_to_hull(&self, entry: EntryId) -> Option<Rational> {
        let point = self.point(entry)?;
        self.hull.distance_to_hull(&point)
    }

    pub fn distance_to_hull(&self, entry: EntryId) -> Option<f64> {
        self.exact_distance_to_hull(entry)
            .map(|distance| exact::to_f64(&distance))
    }

    pub fn formation_energy(&self, entry: EntryId) -> Option<f64> {
        let energy = self.registry.get(entry)?.energy(self.potentials)?;
        Some(exact::to_f64(&energy))
    }

    /// Entries lying on the lower envelope, in registration order.
    pub fn stable_entries(self) -> impl Iterator<Item = &'a Entry> {
        self.registry
            .iter()
            .filter(move |entry| self.is_stable(entry.id()) == Some(true))
    }
}
