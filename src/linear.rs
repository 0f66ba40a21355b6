//! Dense solves for assembled equation sets.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::errors::AnalysisError;
use crate::expression::{Equation, UnknownId};
use crate::options::AnalysisOptions;

/// How a system was solved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveMode {
    /// Nothing to solve.
    Trivial,
    /// Square system solved by LU decomposition.
    Square,
    /// Least-squares fit, regularised only when rank deficient.
    LeastSquares,
}

/// Values of every registered unknown, indexed by [`UnknownId`].
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Solution {
    pub(crate) values: Vec<f64>,
    pub(crate) mode: SolveMode,
}

/// Solve `equations` for `unknown_count` registered unknowns.
///
/// Only unknowns that appear in some equation form matrix columns; the others
/// are reported as zero.
pub(crate) fn solve_equations(
    equations: &[Equation],
    unknown_count: usize,
    options: &AnalysisOptions,
) -> Result<Solution, AnalysisError> {
    solve_logged(equations, unknown_count, options, log::Level::Warn)
}

/// Solve a secondary system where a least-squares fit is expected.
pub(crate) fn solve_secondary(
    equations: &[Equation],
    unknown_count: usize,
    ridge: f64,
) -> Result<Solution, AnalysisError> {
    let options = AnalysisOptions::default()
        .with_least_squares(true)
        .with_ridge(ridge);
    solve_logged(equations, unknown_count, &options, log::Level::Debug)
}

fn solve_logged(
    equations: &[Equation],
    unknown_count: usize,
    options: &AnalysisOptions,
    fallback_level: log::Level,
) -> Result<Solution, AnalysisError> {
    let mut columns: Vec<UnknownId> = equations
        .iter()
        .flat_map(|equation| equation.coefficients.keys().copied())
        .collect();
    columns.sort();
    columns.dedup();

    let mut values = vec![0.0; unknown_count];
    if equations.is_empty() || columns.is_empty() {
        return Ok(Solution {
            values,
            mode: SolveMode::Trivial,
        });
    }

    let mut stiffness = DMatrix::zeros(equations.len(), columns.len());
    let mut load = DVector::zeros(equations.len());
    for (row, equation) in equations.iter().enumerate() {
        load[row] = -equation.constant;
        for (id, coefficient) in &equation.coefficients {
            if let Ok(column) = columns.binary_search(id) {
                stiffness[(row, column)] = *coefficient;
            }
        }
    }

    let (solution, mode) = solve_dense(stiffness, &load, options, fallback_level)?;
    for (column, id) in columns.iter().enumerate() {
        if let Some(value) = values.get_mut(id.0) {
            *value = solution[column];
        }
    }
    Ok(Solution { values, mode })
}

/// Solve `K·x = F`, by LU when square or by ridge regression otherwise.
fn solve_dense(
    stiffness: DMatrix<f64>,
    load: &DVector<f64>,
    options: &AnalysisOptions,
    fallback_level: log::Level,
) -> Result<(DVector<f64>, SolveMode), AnalysisError> {
    let (rows, columns) = stiffness.shape();
    if rows == columns {
        if let Some(solution) = stiffness.clone().lu().solve(load) {
            if solution.iter().all(|value| value.is_finite()) {
                log::debug!("solved {rows}x{columns} system by LU decomposition");
                return Ok((solution, SolveMode::Square));
            }
        }
        if !options.least_squares {
            return Err(AnalysisError::SingularSystem);
        }
        log::log!(
            fallback_level,
            "{rows}x{columns} system is singular; falling back to least squares"
        );
    } else if options.least_squares {
        log::log!(
            fallback_level,
            "{rows} equations for {columns} unknowns; solving by least squares"
        );
    } else {
        return Err(AnalysisError::DimensionMismatch {
            equations: rows,
            unknowns: columns,
        });
    }
    let solution = least_squares_solve(&stiffness, load, options.ridge)?;
    Ok((solution, SolveMode::LeastSquares))
}

/// Relative singular value below which a direction counts as missing.
const RANK_TOLERANCE: f64 = 1.0e-12;

/// Least-squares solution of `K·x = F` by singular value decomposition.
///
/// A full-rank system is solved without bias. A rank-deficient one falls
/// back to [`ridge_solve`].
pub(crate) fn least_squares_solve(
    stiffness: &DMatrix<f64>,
    load: &DVector<f64>,
    ridge: f64,
) -> Result<DVector<f64>, AnalysisError> {
    let (rows, columns) = stiffness.shape();
    let svd = stiffness.clone().svd(true, true);
    let largest = svd.singular_values.max();
    let eps = RANK_TOLERANCE * largest;
    if largest > 0.0 && svd.rank(eps) == columns {
        if let Ok(solution) = svd.solve(load, eps) {
            if solution.iter().all(|value| value.is_finite()) {
                return Ok(solution);
            }
        }
    }
    log::debug!("{rows}x{columns} system is rank deficient; adding ridge {ridge:e}");
    ridge_solve(stiffness, load, ridge)
}

/// `(KᵀK + λI)x = KᵀF` with `λ = ridge·max(1, max diag KᵀK)`.
pub(crate) fn ridge_solve(
    stiffness: &DMatrix<f64>,
    load: &DVector<f64>,
    ridge: f64,
) -> Result<DVector<f64>, AnalysisError> {
    let transpose = stiffness.transpose();
    let mut normal = &transpose * stiffness;
    let rhs = &transpose * load;
    let scale = normal.diagonal().iter().fold(1.0_f64, |acc, v| acc.max(v.abs()));
    let lambda = ridge * scale;
    for i in 0..normal.nrows() {
        normal[(i, i)] += lambda;
    }
    let solution = match normal.clone().cholesky() {
        Some(factor) => factor.solve(&rhs),
        None => normal.lu().solve(&rhs).ok_or(AnalysisError::SingularSystem)?,
    };
    if solution.iter().all(|value| value.is_finite()) {
        Ok(solution)
    } else {
        Err(AnalysisError::SingularSystem)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use approx::assert_relative_eq;

    use super::*;

    fn equation(constant: f64, coefficients: &[(usize, f64)]) -> Equation {
        Equation {
            constant,
            coefficients: coefficients
                .iter()
                .map(|(id, value)| (UnknownId(*id), *value))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn square_system_uses_lu() {
        // 2x + y - 5 = 0, x - y - 1 = 0
        let equations = [
            equation(-5.0, &[(0, 2.0), (1, 1.0)]),
            equation(-1.0, &[(0, 1.0), (1, -1.0)]),
        ];
        let solution =
            solve_equations(&equations, 2, &AnalysisOptions::default()).expect("solvable");
        assert_eq!(solution.mode, SolveMode::Square);
        assert_relative_eq!(solution.values[0], 2.0, epsilon = 1.0e-12);
        assert_relative_eq!(solution.values[1], 1.0, epsilon = 1.0e-12);
    }

    #[test]
    fn unused_unknowns_are_zero() {
        let equations = [equation(-4.0, &[(2, 2.0)])];
        let solution =
            solve_equations(&equations, 3, &AnalysisOptions::default()).expect("solvable");
        assert_eq!(solution.values, vec![0.0, 0.0, 2.0]);
    }

    #[test]
    fn overdetermined_system_needs_least_squares() {
        let equations = [
            equation(-1.0, &[(0, 1.0)]),
            equation(-3.0, &[(0, 1.0)]),
        ];
        assert_eq!(
            solve_equations(&equations, 1, &AnalysisOptions::strict()),
            Err(AnalysisError::DimensionMismatch {
                equations: 2,
                unknowns: 1
            })
        );
        let solution =
            solve_equations(&equations, 1, &AnalysisOptions::default()).expect("solvable");
        assert_eq!(solution.mode, SolveMode::LeastSquares);
        assert_relative_eq!(solution.values[0], 2.0, epsilon = 1.0e-8);
    }

    #[test]
    fn consistent_overdetermined_system_is_solved_without_bias() {
        // x = 1e4, y = -2e4, x + y = -1e4
        let equations = [
            equation(-1.0e4, &[(0, 1.0)]),
            equation(2.0e4, &[(1, 1.0)]),
            equation(1.0e4, &[(0, 1.0), (1, 1.0)]),
        ];
        let solution =
            solve_equations(&equations, 2, &AnalysisOptions::default()).expect("solvable");
        assert_eq!(solution.mode, SolveMode::LeastSquares);
        assert_relative_eq!(solution.values[0], 1.0e4, max_relative = 1.0e-13);
        assert_relative_eq!(solution.values[1], -2.0e4, max_relative = 1.0e-13);
    }

    #[test]
    fn singular_square_system_is_regularised_or_rejected() {
        let equations = [
            equation(-2.0, &[(0, 1.0), (1, 1.0)]),
            equation(-4.0, &[(0, 2.0), (1, 2.0)]),
        ];
        assert_eq!(
            solve_equations(&equations, 2, &AnalysisOptions::strict()),
            Err(AnalysisError::SingularSystem)
        );
        let solution =
            solve_equations(&equations, 2, &AnalysisOptions::default()).expect("solvable");
        assert_eq!(solution.mode, SolveMode::LeastSquares);
        assert_relative_eq!(solution.values[0] + solution.values[1], 2.0, epsilon = 1.0e-6);
        assert_relative_eq!(solution.values[0], solution.values[1], epsilon = 1.0e-4);
    }

    #[test]
    fn empty_system_is_trivial() {
        let solution = solve_equations(&[], 2, &AnalysisOptions::default()).expect("solvable");
        assert_eq!(solution.mode, SolveMode::Trivial);
        assert_eq!(solution.values, vec![0.0, 0.0]);
    }
}
