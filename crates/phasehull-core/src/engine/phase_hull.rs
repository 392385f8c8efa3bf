use crate::core::geometry::exact::{self, Hyperplane, Rational};
use crate::core::geometry::hull::{ConvexHull, Facet, GeometryError};
use crate::core::models::ids::{EndpointId, EntryId, HullPointId};
use num_traits::{One, Signed, Zero};
use std::collections::BTreeSet;
use std::fmt;
use tracing::trace;

/// What a hull point stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HullPointSource {
    Endpoint(EndpointId),
    Entry(EntryId),
}

impl fmt::Display for HullPointSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Endpoint(id) => write!(f, "{id}"),
            Self::Entry(id) => write!(f, "{id}"),
        }
    }
}

/// A point admitted into one particular hull build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HullPoint {
    id: HullPointId,
    source: HullPointSource,
    coordinates: Vec<Rational>,
    label: String,
}

impl HullPoint {
    pub(crate) fn new(source: HullPointSource, coordinates: Vec<Rational>, label: String) -> Self {
        Self {
            id: HullPointId(0),
            source,
            coordinates,
            label,
        }
    }

    pub fn id(&self) -> HullPointId {
        self.id
    }

    pub fn source(&self) -> HullPointSource {
        self.source
    }

    pub fn is_endpoint(&self) -> bool {
        matches!(self.source, HullPointSource::Endpoint(_))
    }

    /// Exact-frame coordinates; the last one is the energy.
    pub fn coordinates(&self) -> &[Rational] {
        &self.coordinates
    }

    pub fn energy(&self) -> Option<&Rational> {
        self.coordinates.last()
    }

    /// Human-readable composition string.
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Orientation of a facet relative to the energy axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FacetKind {
    /// Outward normal points to lower energy; part of the lower envelope.
    Lower,
    /// No energy component; only bounds composition space.
    Vertical,
    /// Outward normal points to higher energy.
    Upper,
}

impl FacetKind {
    fn of(plane: &Hyperplane) -> Self {
        match plane.normal().last() {
            Some(component) if component.is_negative() => Self::Lower,
            Some(component) if component.is_positive() => Self::Upper,
            _ => Self::Vertical,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PhaseFacet {
    facet: Facet,
    kind: FacetKind,
    top: bool,
}

impl PhaseFacet {
    pub fn vertices(&self) -> impl Iterator<Item = HullPointId> + '_ {
        self.facet.vertices().iter().map(|&index| HullPointId(index))
    }

    pub fn plane(&self) -> &Hyperplane {
        self.facet.plane()
    }

    pub fn kind(&self) -> FacetKind {
        self.kind
    }

    /// True when every vertex is an endpoint.
    pub fn is_top(&self) -> bool {
        self.top
    }
}

/// A built hull over exact-frame points, with classified facets.
///
/// The first `dim` points are always the endpoint vertices. When the admitted points do not
/// leave the zero-energy plane the hull is *flat*: a single downward-facing facet spanning
/// the endpoints.
#[derive(Debug, Clone)]
pub struct PhaseHull {
    dim: usize,
    points: Vec<HullPoint>,
    facets: Vec<PhaseFacet>,
    flat: bool,
}

impl PhaseHull {
    pub(crate) fn build(dim: usize, mut points: Vec<HullPoint>) -> Result<Self, GeometryError> {
        for (index, point) in points.iter_mut().enumerate() {
            point.id = HullPointId(index);
        }

        let coordinates = points.iter().map(|p| p.coordinates.clone()).collect();
        let hull = match ConvexHull::build(dim, coordinates) {
            Ok(hull) => hull,
            Err(GeometryError::Degenerate { rank, .. }) => {
                trace!(rank, "Points do not leave the zero-energy plane; using a flat hull.");
                return Ok(Self::flat(dim, points));
            }
            Err(error) => return Err(error),
        };

        let (_, facets) = hull.into_parts();
        let facets = facets
            .into_iter()
            .map(|facet| {
                let kind = FacetKind::of(facet.plane());
                let top = facet.vertices().iter().all(|&v| points[v].is_endpoint());
                PhaseFacet { facet, kind, top }
            })
            .collect();

        Ok(Self {
            dim,
            points,
            facets,
            flat: false,
        })
    }

    fn flat(dim: usize, points: Vec<HullPoint>) -> Self {
        let mut normal = vec![Rational::zero(); dim];
        if let Some(energy) = normal.last_mut() {
            *energy = -Rational::one();
        }
        let facet = Facet::new(
            (0..dim).collect(),
            Hyperplane::new(normal, Rational::zero()),
        );
        Self {
            dim,
            points,
            facets: vec![PhaseFacet {
                facet,
                kind: FacetKind::Lower,
                top: true,
            }],
            flat: true,
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Every point admitted into this build, endpoints first.
    pub fn points(&self) -> &[HullPoint] {
        &self.points
    }

    pub fn point(&self, id: HullPointId) -> Option<&HullPoint> {
        self.points.get(id.index())
    }

    pub fn label(&self, id: HullPointId) -> Option<&str> {
        self.point(id).map(HullPoint::label)
    }

    pub fn facets(&self) -> &[PhaseFacet] {
        &self.facets
    }

    /// True when the hull consists solely of the endpoint plane.
    pub fn is_flat(&self) -> bool {
        self.flat
    }

    /// Points that are a vertex of at least one facet, in id order.
    pub fn vertices(&self) -> impl Iterator<Item = &HullPoint> {
        let used: BTreeSet<usize> = self
            .facets
            .iter()
            .flat_map(|f| f.facet.vertices().iter().copied())
            .collect();
        used.into_iter().map(move |index| &self.points[index])
    }

    /// Ids of the endpoints plus every point lying on a non-vertical facet's hyperplane.
    pub(crate) fn supporting_points(&self) -> Vec<usize> {
        self.points
            .iter()
            .enumerate()
            .filter(|(_, point)| {
                point.is_endpoint()
                    || self.facets.iter().any(|facet| {
                        facet.kind != FacetKind::Vertical
                            && facet.plane().contains(&point.coordinates)
                    })
            })
            .map(|(index, _)| index)
            .collect()
    }

    /// Whether `point` lies on the hull boundary.
    ///
    /// A point is stable when it lies exactly on the hyperplane of a non-vertical facet and
    /// its composition falls inside that facet. Top facets count, so a mixture at energy zero
    /// is stable even above a negative compound. Points with positive energy never are.
    pub fn is_stable(&self, point: &[Rational]) -> bool {
        let Some(energy) = point.last() else {
            return false;
        };
        if energy.is_positive() {
            return false;
        }
        self.facets
            .iter()
            .filter(|facet| facet.kind != FacetKind::Vertical)
            .any(|facet| {
                facet.plane().contains(point) && self.barycentric(facet, point).is_some()
            })
    }

    /// Vertical distance from the lower envelope up to `point`.
    ///
    /// Returns the point's own energy for endpoint compositions and for a flat hull, and
    /// `None` when the composition lies outside the hull's base.
    pub fn distance_to_hull(&self, point: &[Rational]) -> Option<Rational> {
        let energy = point.last()?;
        if self.flat || self.is_endpoint_composition(point) {
            return Some(energy.clone());
        }

        self.facets
            .iter()
            .filter(|facet| facet.kind == FacetKind::Lower && !facet.top)
            .find_map(|facet| {
                let weights = self.barycentric(facet, point)?;
                let height = facet
                    .facet
                    .vertices()
                    .iter()
                    .zip(&weights)
                    .fold(Rational::zero(), |acc, (&v, w)| {
                        acc + w * &self.points[v].coordinates[self.dim - 1]
                    });
                Some(energy - height)
            })
    }

    fn is_endpoint_composition(&self, point: &[Rational]) -> bool {
        let axes = self.dim - 1;
        self.points
            .iter()
            .filter(|p| p.is_endpoint())
            .any(|p| p.coordinates[..axes] == point[..axes.min(point.len())])
    }

    /// Barycentric weights of `point`'s composition within `facet`'s vertices, if it lies
    /// inside the facet's projection onto composition space.
    fn barycentric(&self, facet: &PhaseFacet, point: &[Rational]) -> Option<Vec<Rational>> {
        let axes = self.dim - 1;
        if point.len() != self.dim {
            return None;
        }
        let vertices = facet.facet.vertices();

        let mut matrix: Vec<Vec<Rational>> = (0..axes)
            .map(|axis| {
                vertices
                    .iter()
                    .map(|&v| self.points[v].coordinates[axis].clone())
                    .collect()
            })
            .collect();
        matrix.push(vec![Rational::one(); vertices.len()]);

        let mut rhs: Vec<Rational> = point[..axes].to_vec();
        rhs.push(Rational::one());

        let weights = exact::solve(matrix, rhs)?;
        weights
            .iter()
            .all(|w| !w.is_negative())
            .then_some(weights)
    }
}
