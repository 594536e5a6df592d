use crate::error::{Error, Result};
use crate::gamma::{AnalysedParameter, GammaParams};

/// Per-aggregation reference moments computed across all sketches at one
/// detection tick: the mean and variance of `(shape, scale)`, and their
/// cross-covariance, each indexed by aggregation level.
pub struct ReferenceMoments {
    pub mean: Vec<GammaParams>,
    pub variance: Vec<GammaParams>,
    pub covariance: Vec<f64>,
}

impl ReferenceMoments {
    /// `per_sketch_params[k][j]` is sketch `k`'s Gamma estimate at
    /// aggregation level `j`. Invalid per-sketch entries are excluded from
    /// the mean/variance/covariance at that aggregation level.
    pub fn compute(per_sketch_params: &[Vec<GammaParams>], aggregation_count: usize) -> Self {
        let mut mean = Vec::with_capacity(aggregation_count);
        let mut variance = Vec::with_capacity(aggregation_count);
        let mut covariance = Vec::with_capacity(aggregation_count);

        // Matches the reference implementation's approximateParams(): only
        // valid per-sketch estimates contribute to the sums, but every sum is
        // divided by the total sketch count K, not by the number of valid
        // entries. An aggregation level with some invalid sketches pulls the
        // reference moments toward zero rather than being renormalized away.
        let n = per_sketch_params.len() as f64;
        for j in 0..aggregation_count {
            let valid: Vec<GammaParams> = per_sketch_params
                .iter()
                .filter_map(|sketch| sketch.get(j).copied())
                .filter(GammaParams::is_valid)
                .collect();
            if n == 0.0 {
                mean.push(GammaParams::INVALID);
                variance.push(GammaParams::INVALID);
                covariance.push(0.0);
                continue;
            }
            let mean_j = valid.iter().fold(GammaParams { shape: 0.0, scale: 0.0 }, |acc, p| acc + *p)
                .div_scalar(n);
            let mean_sq_j = valid
                .iter()
                .fold(GammaParams { shape: 0.0, scale: 0.0 }, |acc, p| acc + p.pow_scalar(2.0))
                .div_scalar(n);
            let var_j = GammaParams {
                shape: mean_sq_j.shape - mean_j.shape * mean_j.shape,
                scale: mean_sq_j.scale - mean_j.scale * mean_j.scale,
            };
            let cross_mean = valid.iter().map(|p| p.shape * p.scale).sum::<f64>() / n;
            let cov_j = cross_mean - mean_j.shape * mean_j.scale;

            mean.push(mean_j);
            variance.push(var_j);
            covariance.push(cov_j);
        }

        Self { mean, variance, covariance }
    }
}

/// Squared Mahalanobis distance for one sketch, averaged across the leading
/// run of aggregation levels for which that sketch's own estimate is valid
/// (matching the reference implementation's prefix truncation: estimation
/// stops at the first invalid aggregation rather than skipping over it),
/// then square-rooted. Requires at least 2 such leading valid levels.
pub fn score(
    params: &[GammaParams],
    reference: &ReferenceMoments,
    mode: AnalysedParameter,
) -> Result<f64> {
    let valid_prefix = params.iter().take_while(|p| p.is_valid()).count();
    if valid_prefix < 2 {
        return Err(Error::TooFewValidAggregations);
    }

    let mut sum = 0.0;
    for j in 0..valid_prefix {
        let p = params[j];
        let mean = reference.mean[j];
        let var = reference.variance[j];
        let dist = match mode {
            AnalysedParameter::Shape => scalar_term(p.shape - mean.shape, var.shape)?,
            AnalysedParameter::Scale => scalar_term(p.scale - mean.scale, var.scale)?,
            AnalysedParameter::Both => {
                let cov = reference.covariance[j];
                let c00 = var.shape;
                let c01 = cov;
                let c10 = cov;
                let c11 = var.scale;
                let det = c00 * c11 - c01 * c10;
                if det == 0.0 {
                    return Err(Error::SingularCovariance);
                }
                let inv00 = c11 / det;
                let inv01 = -c01 / det;
                let inv10 = -c10 / det;
                let inv11 = c00 / det;
                let d_shape = p.shape - mean.shape;
                let d_scale = p.scale - mean.scale;
                (d_shape * inv00 + d_scale * inv10) * d_shape
                    + (d_shape * inv01 + d_scale * inv11) * d_scale
            }
        };
        sum += dist;
    }
    sum /= valid_prefix as f64;
    Ok(sum.sqrt())
}

fn scalar_term(delta: f64, variance: f64) -> Result<f64> {
    let numerator = delta * delta;
    if numerator == 0.0 {
        return Ok(0.0);
    }
    if variance == 0.0 {
        return Err(Error::ZeroVarianceNumerator);
    }
    Ok(numerator / variance)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(shape: f64, scale: f64) -> GammaParams {
        GammaParams { shape, scale }
    }

    #[test]
    fn identical_sketches_score_near_zero() {
        let per_sketch = vec![vec![p(2.0, 3.0); 4]; 8];
        let reference = ReferenceMoments::compute(&per_sketch, 4);
        // constant population has zero variance; every delta is also zero,
        // so the numerator-zero shortcut keeps the distance at zero.
        let d = score(&per_sketch[0], &reference, AnalysedParameter::Scale).unwrap();
        assert_eq!(d, 0.0);
    }

    #[test]
    fn outlier_sketch_scores_higher_than_population() {
        let mut per_sketch = vec![vec![p(2.0, 3.0); 4]; 8];
        per_sketch[0] = vec![p(2.1, 3.1); 4];
        per_sketch[1] = vec![p(50.0, 80.0); 4];
        let reference = ReferenceMoments::compute(&per_sketch, 4);
        let normal = score(&per_sketch[0], &reference, AnalysedParameter::Both).unwrap();
        let outlier = score(&per_sketch[1], &reference, AnalysedParameter::Both).unwrap();
        assert!(outlier > normal);
    }

    #[test]
    fn too_few_valid_aggregations_errs() {
        let per_sketch = vec![vec![p(1.0, 1.0), GammaParams::INVALID, GammaParams::INVALID]; 4];
        let reference = ReferenceMoments::compute(&per_sketch, 3);
        let err = score(&per_sketch[0], &reference, AnalysedParameter::Scale).unwrap_err();
        assert!(matches!(err, Error::TooFewValidAggregations));
    }
}
