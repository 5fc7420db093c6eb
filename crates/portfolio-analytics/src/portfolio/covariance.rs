//! 공분산 행렬 계산.
//!
//! - 표본 공분산 행렬: 수익률 쌍마다 n-1 분모 공분산
//! - 베타 기반 공분산 행렬: 비대각 βᵢβⱼ·Var(벤치마크), 대각은 표본 분산

use portfolio_core::{CovarianceMatrix, TickerMap};
use std::collections::BTreeMap;

use crate::statistics::sample_covariance;

/// 모든 티커 쌍의 표본 공분산 행렬을 계산합니다.
pub fn empirical_covariance(returns: &[(String, Vec<f64>)]) -> CovarianceMatrix {
    let mut matrix = CovarianceMatrix::new();
    for (row_ticker, row) in returns {
        let entries: BTreeMap<String, f64> = returns
            .iter()
            .map(|(col_ticker, col)| (col_ticker.clone(), sample_covariance(row, col)))
            .collect();
        matrix.insert(row_ticker.clone(), entries);
    }
    matrix
}

/// 베타 기반 공분산 행렬을 계산합니다.
///
/// 대각 원소는 표본 공분산 행렬의 대각(자산 분산)을 그대로 사용합니다.
pub fn beta_covariance(
    tickers: &[String],
    betas: &TickerMap,
    benchmark_variance: f64,
    empirical: &CovarianceMatrix,
) -> CovarianceMatrix {
    let mut matrix = CovarianceMatrix::new();
    for row in tickers {
        let beta_row = betas.get(row).copied().unwrap_or(0.0);
        let entries: BTreeMap<String, f64> = tickers
            .iter()
            .map(|col| {
                let value = if row == col {
                    matrix_entry(empirical, row, col)
                } else {
                    let beta_col = betas.get(col).copied().unwrap_or(0.0);
                    beta_row * beta_col * benchmark_variance
                };
                (col.clone(), value)
            })
            .collect();
        matrix.insert(row.clone(), entries);
    }
    matrix
}

/// 행렬 원소 조회. 없으면 0.
pub fn matrix_entry(matrix: &CovarianceMatrix, row: &str, col: &str) -> f64 {
    matrix
        .get(row)
        .and_then(|entries| entries.get(col))
        .copied()
        .unwrap_or(0.0)
}

/// 이차형식 wᵗΣw.
///
/// 가중치 맵에 있는 티커들만 사용합니다.
pub fn quadratic_form(weights: &TickerMap, matrix: &CovarianceMatrix) -> f64 {
    weights
        .iter()
        .flat_map(|(a, wa)| {
            weights
                .iter()
                .map(move |(b, wb)| wa * wb * matrix_entry(matrix, a, b))
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn returns() -> Vec<(String, Vec<f64>)> {
        vec![
            ("A".to_string(), vec![1.0, 2.0, 3.0, 4.0]),
            ("B".to_string(), vec![2.0, 4.0, 6.0, 8.0]),
            ("M".to_string(), vec![1.0, 3.0, 2.0, 4.0]),
        ]
    }

    #[test]
    fn test_empirical_is_symmetric() {
        let matrix = empirical_covariance(&returns());
        for a in ["A", "B", "M"] {
            for b in ["A", "B", "M"] {
                assert_eq!(matrix_entry(&matrix, a, b), matrix_entry(&matrix, b, a));
            }
        }
        // var(A) = 1.6667, cov(A, 2A) = 2 var(A)
        assert!((matrix_entry(&matrix, "A", "B") - 2.0 * matrix_entry(&matrix, "A", "A")).abs() < 1e-12);
    }

    #[test]
    fn test_beta_covariance_diagonal_matches_empirical() {
        let empirical = empirical_covariance(&returns());
        let tickers = vec!["A".to_string(), "B".to_string(), "M".to_string()];
        let betas: TickerMap = [("A", 0.8), ("B", 1.6), ("M", 1.0)]
            .into_iter()
            .map(|(t, b)| (t.to_string(), b))
            .collect();
        let var_m = matrix_entry(&empirical, "M", "M");

        let matrix = beta_covariance(&tickers, &betas, var_m, &empirical);

        for t in &tickers {
            assert_eq!(matrix_entry(&matrix, t, t), matrix_entry(&empirical, t, t));
        }
        assert!((matrix_entry(&matrix, "A", "B") - 0.8 * 1.6 * var_m).abs() < 1e-12);
    }

    #[test]
    fn test_quadratic_form_identity_weights() {
        let empirical = empirical_covariance(&returns());
        let weights: TickerMap = [("A".to_string(), 1.0)].into_iter().collect();
        assert_eq!(
            quadratic_form(&weights, &empirical),
            matrix_entry(&empirical, "A", "A")
        );
    }
}
