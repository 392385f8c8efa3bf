use super::exact::{self, Hyperplane, Rational};
use itertools::Itertools;
use num_traits::Zero;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use thiserror::Error;
use tracing::{instrument, trace};

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum GeometryError {
    #[error("Point set spans only {rank} of {dim} dimensions")]
    Degenerate { rank: usize, dim: usize },
    #[error("Point #{index} has {found} coordinates, expected {expected}")]
    DimensionMismatch {
        index: usize,
        found: usize,
        expected: usize,
    },
    #[error("Facet through points {vertices:?} could not be oriented against the interior")]
    Orientation { vertices: Vec<usize> },
}

/// A simplicial facet: `dim` vertex indices and its outward-oriented supporting hyperplane.
#[derive(Debug, Clone)]
pub struct Facet {
    vertices: Vec<usize>,
    plane: Hyperplane,
}

impl Facet {
    pub fn new(vertices: Vec<usize>, plane: Hyperplane) -> Self {
        Self { vertices, plane }
    }

    pub fn vertices(&self) -> &[usize] {
        &self.vertices
    }

    pub fn plane(&self) -> &Hyperplane {
        &self.plane
    }
}

/// Convex hull of a point set in `dim` dimensions, evaluated with exact rational predicates.
///
/// Points live in an arena and are referenced by index; facets are simplices storing vertex
/// index lists. Construction is incremental beneath-beyond: a point strictly outside at least
/// one facet removes every facet it can see and is coned to the horizon, while points on or
/// inside the current hull are skipped. Points that land exactly on the boundary after being
/// inserted stay vertices, so the vertex set may include non-extreme boundary points.
#[derive(Debug, Clone)]
pub struct ConvexHull {
    points: Vec<Vec<Rational>>,
    facets: Vec<Facet>,
    interior: Vec<Rational>,
}

impl ConvexHull {
    /// Builds the hull of `points`, inserting them in the given order.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] when the points do not span all `dim` dimensions
    /// and [`GeometryError::DimensionMismatch`] for points of the wrong length.
    #[instrument(skip_all, name = "convex_hull_build", fields(dim = dim, points = points.len()))]
    pub fn build(dim: usize, points: Vec<Vec<Rational>>) -> Result<Self, GeometryError> {
        if let Some((index, point)) = points.iter().enumerate().find(|(_, p)| p.len() != dim) {
            return Err(GeometryError::DimensionMismatch {
                index,
                found: point.len(),
                expected: dim,
            });
        }

        let simplex = initial_simplex(dim, &points)?;
        let interior = centroid(simplex.iter().map(|&i| points[i].as_slice()), dim);

        let mut hull = Self {
            points,
            facets: Vec::with_capacity(simplex.len()),
            interior,
        };

        for vertices in simplex.iter().copied().combinations(dim) {
            let facet = hull.oriented_facet(vertices)?;
            hull.facets.push(facet);
        }

        let seeded: HashSet<usize> = simplex.into_iter().collect();
        for index in 0..hull.points.len() {
            if !seeded.contains(&index) {
                hull.insert(index)?;
            }
        }

        trace!(facets = hull.facets.len(), "Convex hull complete.");
        Ok(hull)
    }

    pub fn points(&self) -> &[Vec<Rational>] {
        &self.points
    }

    pub fn facets(&self) -> &[Facet] {
        &self.facets
    }

    /// Indices of all points that appear as a vertex of some facet, in ascending order.
    pub fn vertices(&self) -> BTreeSet<usize> {
        self.facets
            .iter()
            .flat_map(|facet| facet.vertices.iter().copied())
            .collect()
    }

    /// A point strictly inside the hull, used to orient facets.
    pub fn interior(&self) -> &[Rational] {
        &self.interior
    }

    /// Consumes the hull, returning its point arena and facets.
    pub fn into_parts(self) -> (Vec<Vec<Rational>>, Vec<Facet>) {
        (self.points, self.facets)
    }

    fn insert(&mut self, index: usize) -> Result<bool, GeometryError> {
        let point = &self.points[index];
        let visible: Vec<usize> = self
            .facets
            .iter()
            .enumerate()
            .filter(|(_, facet)| facet.plane.side(point) == Ordering::Greater)
            .map(|(position, _)| position)
            .collect();

        if visible.is_empty() {
            trace!(index, "Point lies inside or on the hull; skipped.");
            return Ok(false);
        }

        // Ridges shared by two visible facets are interior to the visible region; those seen
        // once form the horizon.
        let mut ridge_counts: BTreeMap<Vec<usize>, usize> = BTreeMap::new();
        for &position in &visible {
            let vertices = &self.facets[position].vertices;
            let ridges = vertices
                .iter()
                .copied()
                .sorted_unstable()
                .combinations(vertices.len() - 1);
            for ridge in ridges {
                *ridge_counts.entry(ridge).or_insert(0) += 1;
            }
        }

        let mut cone = Vec::new();
        for (mut ridge, count) in ridge_counts {
            if count == 1 {
                ridge.push(index);
                cone.push(self.oriented_facet(ridge)?);
            }
        }

        trace!(
            index,
            removed = visible.len(),
            added = cone.len(),
            "Point inserted into hull."
        );

        let visible: HashSet<usize> = visible.into_iter().collect();
        let mut position = 0;
        self.facets.retain(|_| {
            let keep = !visible.contains(&position);
            position += 1;
            keep
        });
        self.facets.extend(cone);
        Ok(true)
    }

    fn oriented_facet(&self, vertices: Vec<usize>) -> Result<Facet, GeometryError> {
        let coordinates: Vec<&[Rational]> =
            vertices.iter().map(|&v| self.points[v].as_slice()).collect();

        let Some(plane) = Hyperplane::through(&coordinates) else {
            return Err(GeometryError::Orientation { vertices });
        };

        let plane = match plane.side(&self.interior) {
            Ordering::Less => plane,
            Ordering::Greater => plane.flipped(),
            Ordering::Equal => return Err(GeometryError::Orientation { vertices }),
        };

        Ok(Facet { vertices, plane })
    }
}

/// Greedily picks, in insertion order, `dim + 1` affinely independent points.
fn initial_simplex(dim: usize, points: &[Vec<Rational>]) -> Result<Vec<usize>, GeometryError> {
    let mut chosen: Vec<usize> = Vec::with_capacity(dim + 1);
    let mut directions: Vec<Vec<Rational>> = Vec::with_capacity(dim);

    for (index, point) in points.iter().enumerate() {
        let Some(&origin) = chosen.first() else {
            chosen.push(index);
            continue;
        };

        let direction = exact::difference(point, &points[origin]);
        if direction.iter().all(Zero::is_zero) {
            continue;
        }

        let mut candidate = directions.clone();
        candidate.push(direction.clone());
        if exact::rank(candidate) > directions.len() {
            directions.push(direction);
            chosen.push(index);
            if chosen.len() == dim + 1 {
                return Ok(chosen);
            }
        }
    }

    Err(GeometryError::Degenerate {
        rank: directions.len(),
        dim,
    })
}

fn centroid<'a>(points: impl Iterator<Item = &'a [Rational]>, dim: usize) -> Vec<Rational> {
    let mut sum = vec![Rational::zero(); dim];
    let mut count: u64 = 0;
    for point in points {
        for (acc, value) in sum.iter_mut().zip(point) {
            *acc = &*acc + value;
        }
        count += 1;
    }
    let scale = exact::ratio(1, count.max(1));
    sum.into_iter().map(|value| value * &scale).collect()
}
