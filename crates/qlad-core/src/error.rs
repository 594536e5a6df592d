use thiserror::Error;

/// Errors raised by the core anomaly-detection pipeline.
///
/// Packet-parse rejects and out-of-order drops are not represented here:
/// they are recovered locally by [`crate::flow_store::FlowStore`] and never
/// surface as a `Result::Err`.
#[derive(Error, Debug)]
pub enum Error {
    /// A sketch received no member flows during `Engine::fill_sketches`.
    /// Indicates the capture window is too short or the sketch count too
    /// high for the observed traffic volume.
    #[error("sketch {0} received no flows: window too short or too many sketches for this traffic volume")]
    EmptySketch(usize),

    /// Fewer than 2 aggregation levels produced a valid Gamma estimate for
    /// some sketch, so a Mahalanobis score could not be computed.
    #[error("fewer than 2 valid aggregations available for scoring (window or aggregation count too small)")]
    TooFewValidAggregations,

    /// The 2x2 shape/scale covariance matrix was singular in `both` mode.
    #[error("singular covariance matrix while scoring in 'both' mode (determinant is zero)")]
    SingularCovariance,

    /// A squared-distance denominator was zero while its numerator was
    /// non-zero (degenerate population variance).
    #[error("zero-variance denominator with non-zero numerator during scoring")]
    ZeroVarianceNumerator,
}

pub type Result<T> = std::result::Result<T, Error>;
