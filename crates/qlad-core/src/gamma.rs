use std::ops::{Add, Sub};

/// Which Gamma-distribution parameter(s) the engine scores against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum AnalysedParameter {
    Shape,
    Scale,
    Both,
}

impl std::str::FromStr for AnalysedParameter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shape" => Ok(Self::Shape),
            "scale" => Ok(Self::Scale),
            "both" => Ok(Self::Both),
            other => Err(format!("unknown analysed parameter '{other}' (expected shape|scale|both)")),
        }
    }
}

/// A Gamma distribution's `(shape, scale)` parameter pair, method-of-moments
/// estimated from one sketch's per-second counts at one aggregation level.
///
/// `Invalid` (`shape == 0.0 && scale == 0.0`) marks an aggregation for which
/// estimation failed (zero mean or zero variance) and is excluded from
/// reference-moment computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GammaParams {
    pub shape: f64,
    pub scale: f64,
}

impl GammaParams {
    pub const INVALID: GammaParams = GammaParams {
        shape: 0.0,
        scale: 0.0,
    };

    pub fn is_valid(&self) -> bool {
        self.shape > 0.0 && self.scale > 0.0
    }

    /// Method-of-moments estimate from a slice of per-bucket counts:
    /// `mean = sum/n`, `var = sum_sq/n - mean^2`; `shape = mean^2/var`,
    /// `scale = var/mean`. Returns [`GammaParams::INVALID`] if the mean or
    /// variance is zero.
    pub fn estimate(counts: &[u64]) -> GammaParams {
        let n = counts.len() as f64;
        if n == 0.0 {
            return GammaParams::INVALID;
        }
        let sum: f64 = counts.iter().map(|&c| c as f64).sum();
        let sum_sq: f64 = counts.iter().map(|&c| (c as f64).powi(2)).sum();
        let mean = sum / n;
        let var = sum_sq / n - mean * mean;
        if mean == 0.0 || var == 0.0 {
            return GammaParams::INVALID;
        }
        GammaParams {
            shape: mean * mean / var,
            scale: var / mean,
        }
    }

    pub fn div_scalar(self, divisor: f64) -> GammaParams {
        GammaParams {
            shape: self.shape / divisor,
            scale: self.scale / divisor,
        }
    }

    pub fn pow_scalar(self, exponent: f64) -> GammaParams {
        GammaParams {
            shape: self.shape.powf(exponent),
            scale: self.scale.powf(exponent),
        }
    }
}

impl Add for GammaParams {
    type Output = GammaParams;
    fn add(self, rhs: GammaParams) -> GammaParams {
        GammaParams {
            shape: self.shape + rhs.shape,
            scale: self.scale + rhs.scale,
        }
    }
}

impl Sub for GammaParams {
    type Output = GammaParams;
    fn sub(self, rhs: GammaParams) -> GammaParams {
        GammaParams {
            shape: self.shape - rhs.shape,
            scale: self.scale - rhs.scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_series_has_zero_variance_and_is_invalid() {
        let p = GammaParams::estimate(&[5, 5, 5, 5]);
        assert!(!p.is_valid());
    }

    #[test]
    fn all_zero_series_is_invalid() {
        let p = GammaParams::estimate(&[0, 0, 0]);
        assert!(!p.is_valid());
    }

    #[test]
    fn varying_series_yields_valid_params() {
        let p = GammaParams::estimate(&[1, 2, 3, 10, 2, 1, 4, 2]);
        assert!(p.is_valid());
    }

    #[test]
    fn arithmetic_is_componentwise() {
        let a = GammaParams { shape: 2.0, scale: 3.0 };
        let b = GammaParams { shape: 1.0, scale: 1.0 };
        assert_eq!((a + b).shape, 3.0);
        assert_eq!((a - b).scale, 2.0);
        assert_eq!(a.div_scalar(2.0).shape, 1.0);
    }
}
