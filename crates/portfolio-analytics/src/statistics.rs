//! 통계 기본 연산.
//!
//! 수익률 변환, 평균, 표본 분산/공분산 등 지표 계산의 기초가 되는 함수들입니다.
//! 데이터가 부족한 경우 NaN 대신 0을 반환합니다.
//!
//! # 예시
//!
//! ```rust
//! use portfolio_analytics::statistics::{mean, pct_returns, sample_std_dev};
//!
//! let returns = pct_returns(&[100.0, 102.0, 101.0, 105.0]);
//! assert_eq!(returns.len(), 3);
//! assert!((mean(&returns) - 1.66).abs() < 1e-4);
//! assert!(sample_std_dev(&returns) > 0.0);
//! ```

/// 가격 시계열을 백분율 수익률로 변환.
///
/// `r[i] = (p[i] - p[i-1]) / p[i-1] * 100`
///
/// 가격은 양수여야 합니다. 정규화와 `PriceSeries` 생성 단계에서 보장됩니다.
///
/// # 반환
///
/// 수익률 벡터 (길이: prices.len() - 1, 가격이 2개 미만이면 빈 벡터)
pub fn pct_returns(prices: &[f64]) -> Vec<f64> {
    if prices.len() < 2 {
        return Vec::new();
    }

    prices
        .windows(2)
        .map(|w| (w[1] - w[0]) / w[0] * 100.0)
        .collect()
}

/// 산술 평균. 빈 입력이면 0.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// 표본 공분산 (n-1 분모).
///
/// 길이가 다르거나 2개 미만이면 0.
pub fn sample_covariance(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return 0.0;
    }

    let mean_x = mean(x);
    let mean_y = mean(y);

    let sum: f64 = x
        .iter()
        .zip(y.iter())
        .map(|(a, b)| (a - mean_x) * (b - mean_y))
        .sum();

    sum / (x.len() - 1) as f64
}

/// 표본 분산 (n-1 분모).
pub fn sample_variance(values: &[f64]) -> f64 {
    sample_covariance(values, values)
}

/// 표본 표준편차 (n-1 분모).
pub fn sample_std_dev(values: &[f64]) -> f64 {
    sample_variance(values).max(0.0).sqrt()
}

/// 분모가 0이면 0을 반환하는 나눗셈.
///
/// 성과 지수, 샤프 지수, 베타 계산에서 NaN/∞ 전파를 막습니다.
pub fn guarded_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() {
        0.0
    } else {
        numerator / denominator
    }
}

/// 소수점 `places`자리 반올림.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
