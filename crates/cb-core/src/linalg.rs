//! Dense linear algebra on design matrices
//!
//! Design matrices live in `ndarray`; decompositions are delegated to
//! nalgebra's SVD, which copes with ill-conditioned and rank-deficient input
//! without forming `X'X`.

use nalgebra::DMatrix;
use ndarray::{Array1, Array2};

use crate::error::{CoreError, Result};

/// Relative tolerance multiplier used to decide which singular values are zero
const RANK_EPS: f64 = f64::EPSILON;

/// SVD-based least squares solution of `X b = y`
#[derive(Debug, Clone)]
pub struct LeastSquares {
    /// Minimum-norm solution
    pub solution: Array1<f64>,
    /// Numerical rank of `X`
    pub rank: usize,
    /// Singular values of `X`, descending
    pub singular_values: Array1<f64>,
    /// `(X'X)^{-1}` computed as `V Σ^{-2} V'` over the retained singular values
    pub xtx_inv: Array2<f64>,
}

fn to_dmatrix(x: &Array2<f64>) -> DMatrix<f64> {
    DMatrix::from_fn(x.nrows(), x.ncols(), |i, j| x[(i, j)])
}

fn rank_tolerance(singular_values: &[f64], nrows: usize, ncols: usize) -> f64 {
    let largest = singular_values.iter().copied().fold(0.0, f64::max);
    largest * nrows.max(ncols) as f64 * RANK_EPS
}

fn ensure_finite(x: &Array2<f64>) -> Result<()> {
    if x.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(CoreError::LinearAlgebra(
            "matrix contains non-finite values".to_string(),
        ))
    }
}

/// Numerical rank of `x`
pub fn rank(x: &Array2<f64>) -> Result<usize> {
    if x.is_empty() {
        return Ok(0);
    }
    ensure_finite(x)?;

    let singular_values = to_dmatrix(x).singular_values();
    let tol = rank_tolerance(singular_values.as_slice(), x.nrows(), x.ncols());
    Ok(singular_values.iter().filter(|&&s| s > tol).count())
}

/// Solve `min ||X b - y||` through the thin SVD of `X`
pub fn least_squares(x: &Array2<f64>, y: &Array1<f64>) -> Result<LeastSquares> {
    let (n, p) = x.dim();
    if y.len() != n {
        return Err(CoreError::LinearAlgebra(format!(
            "response has {} rows, matrix has {}",
            y.len(),
            n
        )));
    }
    if n == 0 || p == 0 {
        return Err(CoreError::LinearAlgebra("empty design matrix".to_string()));
    }
    ensure_finite(x)?;

    let svd = to_dmatrix(x)
        .try_svd(true, true, f64::EPSILON, 0)
        .ok_or_else(|| CoreError::LinearAlgebra("SVD did not converge".to_string()))?;
    let u = svd
        .u
        .as_ref()
        .ok_or_else(|| CoreError::LinearAlgebra("SVD returned no U factor".to_string()))?;
    let v_t = svd
        .v_t
        .as_ref()
        .ok_or_else(|| CoreError::LinearAlgebra("SVD returned no V factor".to_string()))?;

    let singular_values: Vec<f64> = svd.singular_values.iter().copied().collect();
    let tol = rank_tolerance(&singular_values, n, p);

    let mut solution = Array1::<f64>::zeros(p);
    let mut xtx_inv = Array2::<f64>::zeros((p, p));
    let mut rank = 0;

    for (k, &s) in singular_values.iter().enumerate() {
        if s <= tol {
            continue;
        }
        rank += 1;

        // u_k' y / s_k
        let weight = (0..n).map(|i| u[(i, k)] * y[i]).sum::<f64>() / s;
        let inv_s2 = 1.0 / (s * s);

        for a in 0..p {
            let va = v_t[(k, a)];
            solution[a] += weight * va;
            for b in 0..p {
                xtx_inv[(a, b)] += va * v_t[(k, b)] * inv_s2;
            }
        }
    }

    let mut singular_values = singular_values;
    singular_values.sort_by(|a, b| b.total_cmp(a));

    Ok(LeastSquares {
        solution,
        rank,
        singular_values: Array1::from(singular_values),
        xtx_inv,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_rank_detects_collinear_columns() {
        let full = array![[1.0, 0.0], [1.0, 1.0], [1.0, 2.0]];
        assert_eq!(rank(&full).unwrap(), 2);

        let collinear = array![[1.0, 2.0], [1.0, 2.0], [1.0, 2.0]];
        assert_eq!(rank(&collinear).unwrap(), 1);

        let zero_column = array![[1.0, 0.0], [1.0, 0.0]];
        assert_eq!(rank(&zero_column).unwrap(), 1);
    }

    #[test]
    fn test_least_squares_exact_line() {
        let x = array![[1.0, 1.0], [1.0, 2.0], [1.0, 3.0], [1.0, 4.0]];
        let y = array![3.0, 5.0, 7.0, 9.0];

        let ls = least_squares(&x, &y).unwrap();
        assert_eq!(ls.rank, 2);
        assert_abs_diff_eq!(ls.solution, array![1.0, 2.0], epsilon = 1e-10);

        // (X'X)^{-1} for this design is [[1.5, -0.5], [-0.5, 0.2]]
        assert_abs_diff_eq!(
            ls.xtx_inv,
            array![[1.5, -0.5], [-0.5, 0.2]],
            epsilon = 1e-10
        );
    }

    #[test]
    fn test_least_squares_rejects_non_finite() {
        let x = array![[1.0, f64::NAN], [1.0, 2.0]];
        let y = array![1.0, 2.0];
        assert!(matches!(
            least_squares(&x, &y),
            Err(CoreError::LinearAlgebra(_))
        ));
    }
}
