use super::error::HullError;
use crate::core::geometry::exact::{self, Rational};
use crate::core::geometry::simplex;
use crate::core::models::composition::Composition;
use crate::core::models::ids::EndpointId;
use nalgebra::DVector;
use num_traits::{One, Zero};
use tracing::debug;

/// A pure reference composition spanning one vertex of the phase diagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    id: EndpointId,
    formula: Composition,
    atoms_per_unit: u64,
}

impl Endpoint {
    pub fn id(&self) -> EndpointId {
        self.id
    }

    /// The endpoint formula in lowest terms. One formula unit is one copy of it.
    pub fn formula(&self) -> &Composition {
        &self.formula
    }

    pub fn atoms_per_unit(&self) -> u64 {
        self.atoms_per_unit
    }
}

/// The fixed endpoint geometry of a phase diagram.
///
/// Two frames describe the same affine space. The regular-simplex frame places every
/// endpoint at a vertex of a unit-edge simplex, as returned by
/// [`simplex::build_simplex`]; it is what callers see as embedded points. The exact frame
/// puts endpoint 0 at the origin and endpoint `i > 0` on the unit axis `i - 1`, so that a
/// point's composition coordinates are simply the atom fractions of endpoints `1..N`. The
/// two frames differ by an invertible linear map on the composition axes only, which leaves
/// coplanarity, vertical facets, facet containment and vertical distances unchanged; all
/// hull predicates are therefore evaluated in the exact frame.
#[derive(Debug, Clone)]
pub struct SimplexEmbedding {
    endpoints: Vec<Endpoint>,
    positions: Vec<DVector<f64>>,
}

impl SimplexEmbedding {
    /// Builds the embedding for `formulas`, in order.
    ///
    /// # Errors
    ///
    /// Fails with [`HullError::TooFewEndpoints`] for fewer than two formulas, and rejects
    /// empty formulas, formulas that reduce to the same composition and formulas that
    /// contain an earlier endpoint (a pure sample of those could never be recognised).
    pub fn new(formulas: &[Composition]) -> Result<Self, HullError> {
        let positions = simplex::build_simplex(formulas.len())?;

        let mut endpoints: Vec<Endpoint> = Vec::with_capacity(formulas.len());
        for (index, formula) in formulas.iter().enumerate() {
            if formula.is_empty() {
                return Err(HullError::EmptyEndpoint { index });
            }
            let reduced = formula.reduced();
            if let Some(first) = endpoints.iter().position(|e| e.formula == reduced) {
                return Err(HullError::DuplicateEndpoint {
                    first,
                    second: index,
                    formula: reduced,
                });
            }
            endpoints.push(Endpoint {
                id: EndpointId(index),
                atoms_per_unit: reduced.total_atoms(),
                formula: reduced,
            });
        }

        let embedding = Self {
            endpoints,
            positions,
        };

        for endpoint in &embedding.endpoints {
            let (multiples, remainder) = embedding.decompose(&endpoint.formula);
            let is_itself = remainder.is_empty()
                && multiples
                    .iter()
                    .enumerate()
                    .all(|(i, &m)| m == u32::from(i == endpoint.id.index()));
            if !is_itself {
                return Err(HullError::ShadowedEndpoint {
                    index: endpoint.id.index(),
                    formula: endpoint.formula.clone(),
                });
            }
        }

        debug!(
            endpoints = %embedding
                .endpoints
                .iter()
                .map(|e| e.formula.to_string())
                .collect::<Vec<_>>()
                .join(", "),
            "Simplex embedding constructed."
        );
        Ok(embedding)
    }

    /// Number of endpoints `N`, which is also the dimension of the hull.
    pub fn dimension(&self) -> usize {
        self.endpoints.len()
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    pub fn endpoint(&self, id: EndpointId) -> Option<&Endpoint> {
        self.endpoints.get(id.index())
    }

    /// Greedy decomposition of `composition` into whole endpoint formula units.
    ///
    /// Endpoints are taken in configuration order, each removing as many copies of itself as
    /// the remaining composition holds. Returns the multiple per endpoint and whatever atoms
    /// are left over.
    pub fn decompose(&self, composition: &Composition) -> (Vec<u32>, Composition) {
        let mut remainder = composition.clone();
        let multiples = self
            .endpoints
            .iter()
            .map(|endpoint| {
                let multiple = endpoint.formula.largest_multiple_in(&remainder);
                if multiple > 0 {
                    remainder = remainder.without_multiple(&endpoint.formula, multiple);
                }
                multiple
            })
            .collect();
        (multiples, remainder)
    }

    /// Exact-frame coordinates for a point with `atoms[i]` atoms contributed by endpoint `i`.
    pub fn exact_point(&self, atoms: &[u64], energy: Rational) -> Vec<Rational> {
        let total: u64 = atoms.iter().sum();
        let mut point: Vec<Rational> = atoms
            .iter()
            .skip(1)
            .map(|&n| exact::ratio(n, total.max(1)))
            .collect();
        point.push(energy);
        point
    }

    /// Exact-frame coordinates of an endpoint vertex (energy zero).
    pub fn exact_vertex(&self, id: EndpointId) -> Vec<Rational> {
        let mut point: Vec<Rational> = (1..self.dimension())
            .map(|axis| {
                if axis == id.index() {
                    Rational::one()
                } else {
                    Rational::zero()
                }
            })
            .collect();
        point.push(Rational::zero());
        point
    }

    /// Regular-simplex coordinates for a point with the given atom counts and energy.
    pub fn embedded_point(&self, atoms: &[u64], energy: f64) -> Option<DVector<f64>> {
        let total: u64 = atoms.iter().sum();
        if total == 0 {
            return None;
        }
        let weights: Vec<f64> = atoms.iter().map(|&n| n as f64 / total as f64).collect();
        let mut point = simplex::combine(&self.positions, &weights)?;
        let energy_axis = point.len() - 1;
        point[energy_axis] = energy;
        Some(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formulas(texts: &[&str]) -> Vec<Composition> {
        texts.iter().map(|t| t.parse().unwrap()).collect()
    }

    mod construction {
        use super::*;

        #[test]
        fn endpoints_are_stored_reduced_and_in_order() {
            let embedding = SimplexEmbedding::new(&formulas(&["Li2O2", "CoO", "O2"])).unwrap();

            assert_eq!(embedding.dimension(), 3);
            let stored: Vec<String> = embedding
                .endpoints()
                .iter()
                .map(|e| e.formula().to_string())
                .collect();
            assert_eq!(stored, vec!["LiO", "CoO", "O"]);
            assert_eq!(embedding.endpoints()[0].atoms_per_unit(), 2);
            assert_eq!(embedding.endpoint(EndpointId(2)).unwrap().id(), EndpointId(2));
            assert!(embedding.endpoint(EndpointId(3)).is_none());
        }

        #[test]
        fn fewer_than_two_endpoints_is_a_configuration_error() {
            assert_eq!(
                SimplexEmbedding::new(&formulas(&["A"])).unwrap_err(),
                HullError::TooFewEndpoints { found: 1 }
            );
            assert_eq!(
                SimplexEmbedding::new(&[]).unwrap_err(),
                HullError::TooFewEndpoints { found: 0 }
            );
        }

        #[test]
        fn empty_and_duplicate_endpoints_are_rejected() {
            let with_empty = vec!["A".parse().unwrap(), Composition::new()];
            assert_eq!(
                SimplexEmbedding::new(&with_empty).unwrap_err(),
                HullError::EmptyEndpoint { index: 1 }
            );

            assert!(matches!(
                SimplexEmbedding::new(&formulas(&["AB", "C", "A2B2"])).unwrap_err(),
                HullError::DuplicateEndpoint {
                    first: 0,
                    second: 2,
                    ..
                }
            ));
        }

        #[test]
        fn endpoint_containing_an_earlier_endpoint_is_rejected() {
            assert!(matches!(
                SimplexEmbedding::new(&formulas(&["A", "AB"])).unwrap_err(),
                HullError::ShadowedEndpoint { index: 1, .. }
            ));
            // The larger formula first leaves both recognisable as pure.
            assert!(SimplexEmbedding::new(&formulas(&["AB", "A"])).is_ok());
        }
    }

    mod decomposition {
        use super::*;

        #[test]
        fn greedy_decomposition_follows_endpoint_order() {
            let embedding = SimplexEmbedding::new(&formulas(&["Li2O", "CoO"])).unwrap();
            let (multiples, remainder) = embedding.decompose(&"Li4Co2O4".parse().unwrap());
            assert_eq!(multiples, vec![2, 2]);
            assert!(remainder.is_empty());

            let (multiples, remainder) = embedding.decompose(&"LiCoO2".parse().unwrap());
            assert_eq!(multiples, vec![0, 1]);
            assert_eq!(remainder.to_string(), "LiO");
        }
    }

    mod frames {
        use super::*;

        #[test]
        fn exact_vertices_are_the_origin_and_unit_axes() {
            let embedding = SimplexEmbedding::new(&formulas(&["A", "B", "C"])).unwrap();
            let zero = Rational::zero();
            let one = Rational::one();

            assert_eq!(
                embedding.exact_vertex(EndpointId(0)),
                vec![zero.clone(), zero.clone(), zero.clone()]
            );
            assert_eq!(
                embedding.exact_vertex(EndpointId(2)),
                vec![zero.clone(), one, zero]
            );
        }

        #[test]
        fn exact_point_uses_atom_fractions() {
            let embedding = SimplexEmbedding::new(&formulas(&["A", "B", "C"])).unwrap();
            let point = embedding.exact_point(&[1, 2, 1], exact::ratio(1, 2));
            assert_eq!(
                point,
                vec![exact::ratio(1, 2), exact::ratio(1, 4), exact::ratio(1, 2)]
            );
        }

        #[test]
        fn embedded_point_lies_between_the_regular_simplex_vertices() {
            let embedding = SimplexEmbedding::new(&formulas(&["A", "B"])).unwrap();
            let point = embedding.embedded_point(&[1, 1], -2.5).unwrap();
            assert!((point[0] - 0.5).abs() < 1e-12);
            assert_eq!(point[1], -2.5);
            assert!(embedding.embedded_point(&[0, 0], 0.0).is_none());
        }
    }
}
