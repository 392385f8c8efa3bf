use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::cmp::Ordering;

/// Arbitrary-precision rational used for every boundary predicate.
pub type Rational = BigRational;

/// Converts a finite `f64` into the rational with exactly the same value.
///
/// Returns `None` for NaN and infinities.
pub fn from_f64(value: f64) -> Option<Rational> {
    Rational::from_float(value)
}

/// Nearest `f64` to `value`.
pub fn to_f64(value: &Rational) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

/// The fraction `numer / denom`. `denom` must be non-zero.
pub fn ratio(numer: u64, denom: u64) -> Rational {
    Rational::new(BigInt::from(numer), BigInt::from(denom))
}

pub fn dot(a: &[Rational], b: &[Rational]) -> Rational {
    a.iter()
        .zip(b)
        .fold(Rational::zero(), |acc, (x, y)| acc + x * y)
}

pub fn difference(a: &[Rational], b: &[Rational]) -> Vec<Rational> {
    a.iter().zip(b).map(|(x, y)| x - y).collect()
}

/// Determinant of a square matrix by fraction-exact Gaussian elimination.
///
/// The empty matrix has determinant one.
pub fn determinant(mut matrix: Vec<Vec<Rational>>) -> Rational {
    let n = matrix.len();
    let mut det = Rational::one();

    for col in 0..n {
        let Some(pivot) = (col..n).find(|&row| !matrix[row][col].is_zero()) else {
            return Rational::zero();
        };
        if pivot != col {
            matrix.swap(pivot, col);
            det = -det;
        }

        let pivot_value = matrix[col][col].clone();
        det = det * &pivot_value;

        for row in (col + 1)..n {
            if matrix[row][col].is_zero() {
                continue;
            }
            let factor = &matrix[row][col] / &pivot_value;
            for k in col..n {
                let delta = &factor * &matrix[col][k];
                matrix[row][k] = &matrix[row][k] - &delta;
            }
        }
    }

    det
}

/// Solves the square system `A·x = b` exactly.
///
/// Returns `None` when `A` is singular or the shapes disagree.
pub fn solve(a: Vec<Vec<Rational>>, b: Vec<Rational>) -> Option<Vec<Rational>> {
    let n = a.len();
    if b.len() != n || a.iter().any(|row| row.len() != n) {
        return None;
    }

    let mut augmented: Vec<Vec<Rational>> = a
        .into_iter()
        .zip(b)
        .map(|(mut row, rhs)| {
            row.push(rhs);
            row
        })
        .collect();

    for col in 0..n {
        let pivot = (col..n).find(|&row| !augmented[row][col].is_zero())?;
        augmented.swap(pivot, col);

        let pivot_value = augmented[col][col].clone();
        for k in col..=n {
            augmented[col][k] = &augmented[col][k] / &pivot_value;
        }

        for row in 0..n {
            if row == col || augmented[row][col].is_zero() {
                continue;
            }
            let factor = augmented[row][col].clone();
            for k in col..=n {
                let delta = &factor * &augmented[col][k];
                augmented[row][k] = &augmented[row][k] - &delta;
            }
        }
    }

    Some(
        augmented
            .into_iter()
            .map(|mut row| row.swap_remove(n))
            .collect(),
    )
}

/// Row rank of a matrix.
pub fn rank(mut rows: Vec<Vec<Rational>>) -> usize {
    let Some(width) = rows.first().map(Vec::len) else {
        return 0;
    };

    let mut rank = 0;
    for col in 0..width {
        let Some(pivot) = (rank..rows.len()).find(|&row| !rows[row][col].is_zero()) else {
            continue;
        };
        rows.swap(pivot, rank);

        let pivot_value = rows[rank][col].clone();
        for row in (rank + 1)..rows.len() {
            if rows[row][col].is_zero() {
                continue;
            }
            let factor = &rows[row][col] / &pivot_value;
            for k in col..width {
                let delta = &factor * &rows[rank][k];
                rows[row][k] = &rows[row][k] - &delta;
            }
        }

        rank += 1;
        if rank == rows.len() {
            break;
        }
    }

    rank
}

/// An oriented hyperplane `{x : normal · x = offset}`.
///
/// Points with `normal · x > offset` are on the positive (outer) side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hyperplane {
    normal: Vec<Rational>,
    offset: Rational,
}

impl Hyperplane {
    /// Hyperplane through `d` points in `d` dimensions.
    ///
    /// The normal is the generalised cross product of the edge vectors, computed by cofactor
    /// expansion. Returns `None` if the points are affinely dependent or the count does not
    /// match the dimension.
    pub fn through(points: &[&[Rational]]) -> Option<Self> {
        let origin = *points.first()?;
        let dim = origin.len();
        if points.len() != dim || points.iter().any(|p| p.len() != dim) {
            return None;
        }

        let edges: Vec<Vec<Rational>> = points[1..]
            .iter()
            .map(|p| difference(p, origin))
            .collect();

        let normal: Vec<Rational> = (0..dim)
            .map(|skipped| {
                let minor: Vec<Vec<Rational>> = edges
                    .iter()
                    .map(|edge| {
                        edge.iter()
                            .enumerate()
                            .filter(|(col, _)| *col != skipped)
                            .map(|(_, value)| value.clone())
                            .collect()
                    })
                    .collect();
                let cofactor = determinant(minor);
                if skipped % 2 == 0 { cofactor } else { -cofactor }
            })
            .collect();

        if normal.iter().all(Zero::is_zero) {
            return None;
        }

        let offset = dot(&normal, origin);
        Some(Self { normal, offset })
    }

    /// Builds a hyperplane directly from its normal and offset.
    pub fn new(normal: Vec<Rational>, offset: Rational) -> Self {
        Self { normal, offset }
    }

    pub fn normal(&self) -> &[Rational] {
        &self.normal
    }

    /// Signed residual `normal · p - offset`.
    pub fn evaluate(&self, point: &[Rational]) -> Rational {
        dot(&self.normal, point) - &self.offset
    }

    /// Exact side of `point`: `Greater` outside, `Equal` on the plane, `Less` inside.
    pub fn side(&self, point: &[Rational]) -> Ordering {
        let residual = self.evaluate(point);
        if residual.is_zero() {
            Ordering::Equal
        } else if residual.is_positive() {
            Ordering::Greater
        } else {
            Ordering::Less
        }
    }

    pub fn contains(&self, point: &[Rational]) -> bool {
        self.side(point) == Ordering::Equal
    }

    /// The same plane with the opposite orientation.
    pub fn flipped(self) -> Self {
        Self {
            normal: self.normal.into_iter().map(|n| -n).collect(),
            offset: -self.offset,
        }
    }
}
