use crate::{CategoricalNb, NaiveBayesError, Result};
use linfa::{Float, ParamGuard};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// Smoothing applied when turning symbol frequencies into a distribution
///
/// | Name | Default | Purpose | Range |
/// | :--- | :--- | :---| :--- |
/// | [regularization](Self::regularization) | `0` | Pseudo-count added to every symbol frequency before normalization | `[0, inf)` |
/// | [use_laplace_rule](Self::use_laplace_rule) | `false` | Add one more pseudo-count on top of `regularization` | |
/// | [use_previous_values_as_priors](Self::use_previous_values_as_priors) | `false` | Multiply the new counts into the distribution already stored in the model | |
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingOptions<F> {
    pub regularization: F,
    pub use_laplace_rule: bool,
    pub use_previous_values_as_priors: bool,
}

impl<F: Float> Default for SmoothingOptions<F> {
    fn default() -> Self {
        Self {
            regularization: F::zero(),
            use_laplace_rule: false,
            use_previous_values_as_priors: false,
        }
    }
}

impl<F: Float> SmoothingOptions<F> {
    /// Options adding `regularization` pseudo-counts to every symbol
    pub fn new(regularization: F) -> Self {
        Self {
            regularization,
            ..Default::default()
        }
    }

    /// Laplace (add-one) smoothing
    pub fn laplace() -> Self {
        Self {
            use_laplace_rule: true,
            ..Default::default()
        }
    }

    pub fn with_previous_values_as_priors(mut self, use_previous: bool) -> Self {
        self.use_previous_values_as_priors = use_previous;
        self
    }

    /// Collapse the options into the pseudo-count and blending flag used by the estimator
    pub(crate) fn resolve(&self) -> ResolvedSmoothing<F> {
        let regularization = if self.use_laplace_rule {
            self.regularization + F::one()
        } else {
            self.regularization
        };

        ResolvedSmoothing {
            regularization,
            use_previous: self.use_previous_values_as_priors,
        }
    }

    fn check(&self) -> Result<()> {
        if self.regularization.is_finite() && self.regularization >= F::zero() {
            Ok(())
        } else {
            Err(NaiveBayesError::InvalidSmoothing(
                self.regularization.to_f64().unwrap_or(f64::NAN),
            ))
        }
    }
}

/// Smoothing settings of a single class, with the Laplace rule already folded into the pseudo-count
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ResolvedSmoothing<F> {
    pub regularization: F,
    pub use_previous: bool,
}

/// A verified hyper-parameter set ready for the estimation of a categorical Naive Bayes model
///
/// See [`CategoricalNbParams`](crate::CategoricalNbParams) for more information.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalNbValidParams<F> {
    smoothing: SmoothingOptions<F>,
    class_smoothing: Option<Vec<SmoothingOptions<F>>>,
    empirical: bool,
}

impl<F: Float> CategoricalNbValidParams<F> {
    /// Smoothing options shared by every class without an override
    pub fn smoothing(&self) -> &SmoothingOptions<F> {
        &self.smoothing
    }

    /// Per-class smoothing overrides, if any
    pub fn class_smoothing(&self) -> Option<&[SmoothingOptions<F>]> {
        self.class_smoothing.as_deref()
    }

    /// Whether class priors are estimated from the training data
    pub fn empirical(&self) -> bool {
        self.empirical
    }

    /// Resolve the smoothing of every class, preferring the per-class overrides
    pub(crate) fn resolve_smoothing(&self, n_classes: usize) -> Result<Vec<ResolvedSmoothing<F>>> {
        match &self.class_smoothing {
            Some(per_class) if per_class.len() != n_classes => {
                Err(NaiveBayesError::ClassSmoothingLength {
                    expected: n_classes,
                    found: per_class.len(),
                })
            }
            Some(per_class) => Ok(per_class.iter().map(SmoothingOptions::resolve).collect()),
            None => Ok(self.resolve_shared_smoothing(n_classes)),
        }
    }

    /// Resolve every class from the shared options, ignoring the per-class overrides
    pub(crate) fn resolve_shared_smoothing(&self, n_classes: usize) -> Vec<ResolvedSmoothing<F>> {
        vec![self.smoothing.resolve(); n_classes]
    }
}

/// A hyper-parameter set during construction
///
/// The parameter set can be verified into a
/// [`CategoricalNbValidParams`](crate::CategoricalNbValidParams) by calling
/// [ParamGuard::check](Self::check). It is also possible to directly fit a model with
/// [Fit::fit](linfa::traits::Fit::fit) or
/// [FitWith::fit_with](linfa::traits::FitWith::fit_with) which implicitely verifies
/// the parameter set prior to the model estimation and forwards any error.
///
/// # Parameters
/// | Name | Default | Purpose | Range |
/// | :--- | :--- | :---| :--- |
/// | [smoothing](Self::smoothing) | [`SmoothingOptions::default`] | Smoothing shared by all classes | |
/// | [class_smoothing](Self::class_smoothing) | `None` | Per-class smoothing overriding the shared options, hard labels only | one entry per class |
/// | [empirical](Self::empirical) | `true` | Estimate class priors from the observed class frequencies | |
///
/// # Errors
///
/// Returns [`InvalidSmoothing`](NaiveBayesError::InvalidSmoothing) if any regularization
/// is negative or not finite.
///
/// # Example
///
/// ```rust
/// use linfa_categorical_nb::{CategoricalNb, Result};
/// use linfa::prelude::*;
/// use ndarray::array;
///
/// let x = array![[0usize, 1], [0, 0], [1, 1], [1, 0]];
/// let y = array![0usize, 0, 1, 1];
/// let ds = DatasetView::new(x.view(), y.view());
///
/// // add-one smoothing, priors estimated from the labels
/// let unchecked_params = CategoricalNb::<f64>::params().laplace_rule(true);
///
/// // fit model with unchecked parameter set
/// let model = unchecked_params.fit(&ds)?;
///
/// // transform into a verified parameter set
/// let checked_params = unchecked_params.check()?;
///
/// // update the same model with another batch
/// let model = checked_params.fit_with(Some(model), &ds)?;
/// assert_eq!(model.n_classes(), 2);
/// # Result::Ok(())
/// ```
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalNbParams<F>(CategoricalNbValidParams<F>);

impl<F: Float> Default for CategoricalNbParams<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Float> CategoricalNbParams<F> {
    /// Create a new parameter set with default values
    pub fn new() -> Self {
        Self(CategoricalNbValidParams {
            smoothing: SmoothingOptions::default(),
            class_smoothing: None,
            empirical: true,
        })
    }

    /// Replace the shared smoothing options
    pub fn smoothing(mut self, smoothing: SmoothingOptions<F>) -> Self {
        self.0.smoothing = smoothing;
        self
    }

    /// Set the pseudo-count added to every symbol frequency
    pub fn regularization(mut self, regularization: F) -> Self {
        self.0.smoothing.regularization = regularization;
        self
    }

    /// Add one pseudo-count on top of the regularization
    pub fn laplace_rule(mut self, use_laplace_rule: bool) -> Self {
        self.0.smoothing.use_laplace_rule = use_laplace_rule;
        self
    }

    /// Blend the new counts multiplicatively with the distributions already in the model
    pub fn use_previous_values_as_priors(mut self, use_previous: bool) -> Self {
        self.0.smoothing.use_previous_values_as_priors = use_previous;
        self
    }

    /// Override the smoothing options class by class, index `i` belongs to class `i`
    pub fn class_smoothing(mut self, class_smoothing: Vec<SmoothingOptions<F>>) -> Self {
        self.0.class_smoothing = Some(class_smoothing);
        self
    }

    /// Estimate priors from the data (`true`) or keep the priors stored in the model
    pub fn empirical(mut self, empirical: bool) -> Self {
        self.0.empirical = empirical;
        self
    }
}

impl<F: Float> ParamGuard for CategoricalNbParams<F> {
    type Checked = CategoricalNbValidParams<F>;
    type Error = NaiveBayesError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        self.0.smoothing.check()?;
        if let Some(per_class) = &self.0.class_smoothing {
            per_class.iter().try_for_each(SmoothingOptions::check)?;
        }

        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}

impl<F: Float> CategoricalNb<F> {
    /// Construct a new set of hyperparameters
    pub fn params() -> CategoricalNbParams<F> {
        CategoricalNbParams::new()
    }
}
