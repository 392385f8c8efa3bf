use nalgebra::DVector;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum SimplexError {
    #[error("A simplex embedding needs at least 2 vertices, got {0}")]
    TooFewVertices(usize),
}

/// Places `n` vertices of a regular `(n - 1)`-simplex with unit edge length in `n` dimensions.
///
/// Vertex 0 sits at the origin and vertex 1 at unit distance along axis 0. Every further
/// vertex `i` takes the centroid of the already placed vertices on axes `0..i-1` and the
/// non-negative height on axis `i - 1` that puts it at unit distance from all of them. The
/// last axis is reserved for the energy coordinate and is zero for every vertex.
///
/// # Errors
///
/// Returns [`SimplexError::TooFewVertices`] when `n < 2`.
pub fn build_simplex(n: usize) -> Result<Vec<DVector<f64>>, SimplexError> {
    if n < 2 {
        return Err(SimplexError::TooFewVertices(n));
    }

    let mut vertices: Vec<DVector<f64>> = Vec::with_capacity(n);
    vertices.push(DVector::zeros(n));
    let mut second = DVector::zeros(n);
    second[0] = 1.0;
    vertices.push(second);

    for i in 2..n {
        let mut vertex = DVector::zeros(n);
        for axis in 0..i - 1 {
            vertex[axis] = vertices.iter().map(|v| v[axis]).sum::<f64>() / i as f64;
        }
        // Unit distance to the origin vertex fixes the remaining height.
        let fixed: f64 = (0..i - 1).map(|axis| vertex[axis] * vertex[axis]).sum();
        vertex[i - 1] = (1.0 - fixed).max(0.0).sqrt();
        vertices.push(vertex);
    }

    Ok(vertices)
}

/// Weighted combination `Σ wᵢ·Pᵢ` of simplex vertices.
///
/// Returns `None` when the number of weights does not match the number of vertices.
pub fn combine(vertices: &[DVector<f64>], weights: &[f64]) -> Option<DVector<f64>> {
    let first = vertices.first()?;
    if vertices.len() != weights.len() {
        return None;
    }
    Some(
        vertices
            .iter()
            .zip(weights)
            .fold(DVector::zeros(first.len()), |acc, (vertex, &w)| acc + vertex * w),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-12;

    #[test]
    fn rejects_fewer_than_two_vertices() {
        assert_eq!(build_simplex(0), Err(SimplexError::TooFewVertices(0)));
        assert_eq!(build_simplex(1), Err(SimplexError::TooFewVertices(1)));
    }

    #[test]
    fn all_vertex_pairs_are_unit_distance_apart() {
        for n in 2..=8 {
            let vertices = build_simplex(n).unwrap();
            assert_eq!(vertices.len(), n);
            for i in 0..n {
                for j in (i + 1)..n {
                    let distance = (&vertices[i] - &vertices[j]).norm();
                    assert!(
                        (distance - 1.0).abs() < TOLERANCE,
                        "n={n}: |P{i} - P{j}| = {distance}"
                    );
                }
            }
        }
    }

    #[test]
    fn energy_axis_is_zero_and_first_vertex_is_the_origin() {
        for n in 2..=6 {
            let vertices = build_simplex(n).unwrap();
            assert!(vertices[0].iter().all(|&x| x == 0.0));
            for vertex in &vertices {
                assert_eq!(vertex.len(), n);
                assert_eq!(vertex[n - 1], 0.0);
            }
        }
    }

    #[test]
    fn third_vertex_is_the_apex_of_an_equilateral_triangle() {
        let vertices = build_simplex(3).unwrap();
        assert!((vertices[2][0] - 0.5).abs() < TOLERANCE);
        assert!((vertices[2][1] - 3f64.sqrt() / 2.0).abs() < TOLERANCE);
    }

    #[test]
    fn combine_produces_the_weighted_centroid() {
        let vertices = build_simplex(3).unwrap();
        let centroid = combine(&vertices, &[1.0 / 3.0; 3]).unwrap();
        assert!((centroid[0] - 0.5).abs() < TOLERANCE);
        assert!((centroid[1] - 3f64.sqrt() / 6.0).abs() < TOLERANCE);
        assert!(combine(&vertices, &[1.0, 0.0]).is_none());
    }
}
