use super::embedding::SimplexEmbedding;
use super::potentials::{ChemicalPotentials, PotentialUpdate};
use crate::core::geometry::exact::{self, Rational};
use crate::core::models::composition::Composition;
use crate::core::models::ids::{EndpointId, EntryId};
use nalgebra::DVector;
use num_bigint::BigInt;
use thiserror::Error;
use tracing::{debug, trace};

/// Why a candidate cannot take part in the hull.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Rejection {
    #[error("Composition is empty")]
    EmptyComposition,

    #[error("No score available for '{0}'")]
    MissingScore(Composition),

    #[error("Score {score} for '{composition}' is not a finite number")]
    NonFiniteScore { composition: Composition, score: f64 },

    #[error("'{composition}' leaves '{remainder}' after removing every endpoint")]
    Remainder {
        composition: Composition,
        remainder: Composition,
    },

    #[error("'{0}' contains none of the endpoints")]
    NoEndpoint(Composition),
}

/// Whole endpoint formula units making up a composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decomposition {
    multiples: Vec<u32>,
}

impl Decomposition {
    /// Decomposes `composition` greedily in endpoint order, failing unless every atom is
    /// accounted for.
    pub fn of(composition: &Composition, embedding: &SimplexEmbedding) -> Result<Self, Rejection> {
        let (multiples, remainder) = embedding.decompose(composition);
        if multiples.iter().all(|&m| m == 0) {
            return Err(Rejection::NoEndpoint(composition.clone()));
        }
        if !remainder.is_empty() {
            return Err(Rejection::Remainder {
                composition: composition.clone(),
                remainder,
            });
        }
        Ok(Self { multiples })
    }

    pub fn multiple(&self, endpoint: EndpointId) -> u32 {
        self.multiples.get(endpoint.index()).copied().unwrap_or(0)
    }

    /// The single endpoint this decomposition consists of, if there is exactly one.
    pub fn pure_endpoint(&self) -> Option<EndpointId> {
        let mut present = self
            .multiples
            .iter()
            .enumerate()
            .filter(|(_, m)| **m > 0)
            .map(|(index, _)| EndpointId(index));
        match (present.next(), present.next()) {
            (Some(endpoint), None) => Some(endpoint),
            _ => None,
        }
    }

    /// Atoms contributed by each endpoint.
    pub fn atoms(&self, embedding: &SimplexEmbedding) -> Vec<u64> {
        self.multiples
            .iter()
            .zip(embedding.endpoints())
            .map(|(&m, endpoint)| u64::from(m) * endpoint.atoms_per_unit())
            .collect()
    }
}

/// An accepted candidate. Immutable after registration.
#[derive(Debug, Clone)]
pub struct Entry {
    id: EntryId,
    composition: Composition,
    reduced: Composition,
    score: f64,
    exact_score: Rational,
    decomposition: Decomposition,
    atoms: Vec<u64>,
    total_atoms: u64,
}

impl Entry {
    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn composition(&self) -> &Composition {
        &self.composition
    }

    /// The composition in lowest terms; entries sharing it compete for the same hull point.
    pub fn reduced(&self) -> &Composition {
        &self.reduced
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn decomposition(&self) -> &Decomposition {
        &self.decomposition
    }

    /// Atoms contributed by each endpoint.
    pub fn atoms(&self) -> &[u64] {
        &self.atoms
    }

    pub fn total_atoms(&self) -> u64 {
        self.total_atoms
    }

    pub fn is_pure_endpoint(&self) -> bool {
        self.decomposition.pure_endpoint().is_some()
    }

    /// Energy coordinate: the score per atom relative to the matching combination of
    /// endpoint potentials, `(score - Σ mᵢ·μᵢ) / T`.
    ///
    /// `None` until every endpoint present in the decomposition has a potential.
    pub fn energy(&self, potentials: &ChemicalPotentials) -> Option<Rational> {
        let mut reference = Rational::from_integer(BigInt::from(0));
        for (index, &multiple) in self.decomposition.multiples.iter().enumerate() {
            if multiple == 0 {
                continue;
            }
            let mu = potentials.get(EndpointId(index))?;
            reference += mu * Rational::from_integer(BigInt::from(multiple));
        }
        Some((&self.exact_score - reference) / Rational::from_integer(BigInt::from(self.total_atoms)))
    }

    /// Exact-frame hull coordinates, `None` while the energy is undefined.
    pub fn exact_point(
        &self,
        embedding: &SimplexEmbedding,
        potentials: &ChemicalPotentials,
    ) -> Option<Vec<Rational>> {
        let energy = self.energy(potentials)?;
        Some(embedding.exact_point(&self.atoms, energy))
    }

    /// Regular-simplex coordinates, `None` while the energy is undefined.
    pub fn embedded_point(
        &self,
        embedding: &SimplexEmbedding,
        potentials: &ChemicalPotentials,
    ) -> Option<DVector<f64>> {
        let energy = self.energy(potentials)?;
        embedding.embedded_point(&self.atoms, exact::to_f64(&energy))
    }
}

/// Result of a successful registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
    pub id: EntryId,
    /// Set when the entry was a pure endpoint sample.
    pub potential_update: Option<(EndpointId, PotentialUpdate)>,
}

/// Accepted entries in registration order. Ids are positions and are never reused.
#[derive(Debug, Clone, Default)]
pub struct EntryRegistry {
    entries: Vec<Entry>,
}

impl EntryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and stores a candidate, forwarding pure-endpoint scores to `potentials`.
    pub fn register(
        &mut self,
        composition: &Composition,
        score: Option<f64>,
        embedding: &SimplexEmbedding,
        potentials: &mut ChemicalPotentials,
    ) -> Result<Registration, Rejection> {
        let result = self.admit(composition, score, embedding, potentials);
        if let Err(rejection) = &result {
            debug!(composition = %composition, %rejection, "Candidate rejected.");
        }
        result
    }

    fn admit(
        &mut self,
        composition: &Composition,
        score: Option<f64>,
        embedding: &SimplexEmbedding,
        potentials: &mut ChemicalPotentials,
    ) -> Result<Registration, Rejection> {
        if composition.is_empty() {
            return Err(Rejection::EmptyComposition);
        }
        let score = score.ok_or_else(|| Rejection::MissingScore(composition.clone()))?;
        let exact_score = exact::from_f64(score).ok_or_else(|| Rejection::NonFiniteScore {
            composition: composition.clone(),
            score,
        })?;

        let decomposition = Decomposition::of(composition, embedding)?;
        let atoms = decomposition.atoms(embedding);
        let total_atoms = atoms.iter().sum();

        let potential_update = decomposition.pure_endpoint().map(|endpoint| {
            let units = Rational::from_integer(BigInt::from(decomposition.multiple(endpoint)));
            let update = potentials.observe(endpoint, &exact_score / units);
            debug!(%endpoint, ?update, "Pure endpoint observed.");
            (endpoint, update)
        });

        let id = EntryId(self.entries.len());
        self.entries.push(Entry {
            id,
            reduced: composition.reduced(),
            composition: composition.clone(),
            score,
            exact_score,
            decomposition,
            atoms,
            total_atoms,
        });
        trace!(%id, composition = %composition, score, "Entry registered.");

        Ok(Registration {
            id,
            potential_update,
        })
    }

    pub fn get(&self, id: EntryId) -> Option<&Entry> {
        self.entries.get(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        embedding: SimplexEmbedding,
        potentials: ChemicalPotentials,
        registry: EntryRegistry,
    }

    impl Fixture {
        fn new(endpoints: &[&str]) -> Self {
            let formulas: Vec<Composition> =
                endpoints.iter().map(|t| t.parse().unwrap()).collect();
            let embedding = SimplexEmbedding::new(&formulas).unwrap();
            let potentials = ChemicalPotentials::new(embedding.dimension());
            Self {
                embedding,
                potentials,
                registry: EntryRegistry::new(),
            }
        }

        fn register(&mut self, formula: &str, score: Option<f64>) -> Result<Registration, Rejection> {
            let composition: Composition = formula.parse().unwrap();
            self.registry
                .register(&composition, score, &self.embedding, &mut self.potentials)
        }
    }

    mod validation {
        use super::*;

        #[test]
        fn empty_composition_is_rejected() {
            let mut fixture = Fixture::new(&["A", "B"]);
            let result = fixture.registry.register(
                &Composition::new(),
                Some(1.0),
                &fixture.embedding,
                &mut fixture.potentials,
            );
            assert_eq!(result, Err(Rejection::EmptyComposition));
        }

        #[test]
        fn missing_and_non_finite_scores_are_rejected() {
            let mut fixture = Fixture::new(&["A", "B"]);
            assert!(matches!(
                fixture.register("AB", None),
                Err(Rejection::MissingScore(_))
            ));
            assert!(matches!(
                fixture.register("AB", Some(f64::NAN)),
                Err(Rejection::NonFiniteScore { .. })
            ));
            assert!(fixture.registry.is_empty());
        }

        #[test]
        fn foreign_species_leave_a_remainder() {
            let mut fixture = Fixture::new(&["A", "B"]);
            let Err(Rejection::Remainder { remainder, .. }) = fixture.register("AC", Some(-1.0))
            else {
                panic!("AC should leave a remainder");
            };
            assert_eq!(remainder.to_string(), "C");
        }

        #[test]
        fn compositions_without_any_endpoint_are_rejected() {
            let mut fixture = Fixture::new(&["A", "B"]);
            assert!(matches!(
                fixture.register("C2", Some(-1.0)),
                Err(Rejection::NoEndpoint(_))
            ));
        }

        #[test]
        fn greedy_order_decides_between_competing_decompositions() {
            // AB is taken first, so A2B is AB + A and A2B3 leaves a lone B behind.
            let mut fixture = Fixture::new(&["AB", "A"]);
            let registration = fixture.register("A2B", Some(-1.0)).unwrap();
            let entry = fixture.registry.get(registration.id).unwrap();
            assert_eq!(entry.decomposition().multiples, vec![1, 1]);
            assert!(matches!(
                fixture.register("A2B3", Some(-1.0)),
                Err(Rejection::Remainder { .. })
            ));
        }
    }

    mod chemical_potentials {
        use super::*;

        #[test]
        fn pure_endpoint_scores_are_forwarded_per_formula_unit() {
            let mut fixture = Fixture::new(&["A", "B2"]);

            let registration = fixture.register("B4", Some(-6.0)).unwrap();
            assert_eq!(
                registration.potential_update,
                Some((EndpointId(1), PotentialUpdate::Initialized))
            );
            assert_eq!(
                fixture.potentials.get(EndpointId(1)),
                Some(&exact::from_f64(-1.5).unwrap())
            );
            assert!(fixture.registry.get(registration.id).unwrap().is_pure_endpoint());
        }

        #[test]
        fn mixtures_do_not_touch_potentials() {
            let mut fixture = Fixture::new(&["A", "B"]);
            let registration = fixture.register("AB", Some(-5.0)).unwrap();
            assert_eq!(registration.potential_update, None);
            assert!(!fixture.potentials.is_complete());
        }
    }

    mod energies {
        use super::*;

        #[test]
        fn energy_is_undefined_until_constituent_potentials_exist() {
            let mut fixture = Fixture::new(&["A", "B", "C"]);
            let ab = fixture.register("AB", Some(-5.0)).unwrap().id;
            fixture.register("A", Some(0.0)).unwrap();

            let entry = fixture.registry.get(ab).unwrap().clone();
            assert!(entry.energy(&fixture.potentials).is_none());

            // C is not part of AB, so its potential is not needed.
            fixture.register("B", Some(0.0)).unwrap();
            assert_eq!(
                entry.energy(&fixture.potentials),
                Some(exact::from_f64(-2.5).unwrap())
            );
        }

        #[test]
        fn energy_uses_formula_unit_potentials_and_atom_totals() {
            let mut fixture = Fixture::new(&["Li2O", "CoO"]);
            fixture.register("Li2O", Some(-6.0)).unwrap();
            fixture.register("CoO", Some(-4.0)).unwrap();
            let id = fixture.register("Li2Co2O3", Some(-16.0)).unwrap().id;

            let entry = fixture.registry.get(id).unwrap();
            assert_eq!(entry.atoms(), &[3, 4]);
            assert_eq!(entry.total_atoms(), 7);
            // (-16 - (-6 - 2 * 4)) / 7
            assert_eq!(
                entry.energy(&fixture.potentials),
                Some(Rational::new(BigInt::from(-2), BigInt::from(7)))
            );

            let point = entry.exact_point(&fixture.embedding, &fixture.potentials).unwrap();
            assert_eq!(point[0], exact::ratio(4, 7));
        }

        #[test]
        fn ids_follow_registration_order() {
            let mut fixture = Fixture::new(&["A", "B"]);
            let first = fixture.register("A", Some(0.0)).unwrap().id;
            assert!(fixture.register("AC", Some(0.0)).is_err());
            let second = fixture.register("B", Some(0.0)).unwrap().id;

            assert_eq!(first, EntryId(0));
            assert_eq!(second, EntryId(1));
            assert_eq!(
                fixture.registry.iter().map(Entry::id).collect::<Vec<_>>(),
                vec![first, second]
            );
        }
    }
}
