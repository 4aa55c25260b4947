use thiserror::Error;

/// Simplified `Result` using [`NaiveBayesError`](crate::NaiveBayesError) as error type
pub type Result<T> = std::result::Result<T, NaiveBayesError>;

/// Error variants from hyper-parameter construction or model estimation
#[derive(Error, Debug, Clone)]
pub enum NaiveBayesError {
    /// The record matrix contains no samples or no features
    #[error("records must contain at least one sample and one feature")]
    EmptyRecords,
    /// The target array contains no samples or no classes
    #[error("targets must contain at least one sample")]
    EmptyTargets,
    #[error("expected records and targets to have the same number of samples, got {0} != {1}")]
    MismatchedShapes(usize, usize),
    #[error("label {label} is out of range for a model with {n_classes} classes")]
    LabelOutOfRange { label: usize, n_classes: usize },
    #[error("symbol {symbol} of feature {feature} is out of range, feature has {n_symbols} symbols")]
    SymbolOutOfRange {
        feature: usize,
        symbol: usize,
        n_symbols: usize,
    },
    #[error("model expects {expected} features, records have {found}")]
    FeatureMismatch { expected: usize, found: usize },
    #[error("model expects {expected} classes, targets have {found}")]
    ClassMismatch { expected: usize, found: usize },
    /// Soft labels must be non-negative and finite
    #[error("class membership weights must be non-negative and finite")]
    InvalidWeights,
    /// Invalid smoothing parameter
    #[error("invalid smoothing parameter {0}")]
    InvalidSmoothing(f64),
    #[error("per-class smoothing given for {found} classes, model has {expected}")]
    ClassSmoothingLength { expected: usize, found: usize },
    #[error("invalid class priors: {0}")]
    InvalidPriors(String),
    /// Counts plus regularization summed to zero, the distribution can not be normalized
    #[error("distribution of class {class} and feature {feature} has zero mass, increase the regularization")]
    DegenerateDistribution { class: usize, feature: usize },
    #[error(transparent)]
    BaseCrate(#[from] linfa::Error),
}
