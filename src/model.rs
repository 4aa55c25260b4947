use linfa::Float;
use ndarray::{Array1, ArrayBase, ArrayView1, Data, Ix2};
use tracing::debug;

use crate::base_nb::distinct_symbols;
use crate::error::{NaiveBayesError, Result};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// Fitted categorical Naive Bayes classifier
///
/// See [CategoricalNbParams](crate::CategoricalNbParams) for more information on the
/// hyper-parameters.
///
/// # Model assumptions
///
/// Every feature takes one of a finite set of symbols `0..n_symbols[j]` and features are
/// independent given the class. For each class the model stores a prior and, for each
/// feature, a discrete distribution over that feature's symbols.
///
/// The model is owned by the caller and updated in place: passing it back through
/// [FitWith::fit_with](linfa::traits::FitWith::fit_with) re-estimates the parameters,
/// optionally blending the new counts with the stored distributions.
///
/// # Model usage example
///
/// ```rust
/// use linfa_categorical_nb::{CategoricalNb, Result};
/// use linfa::prelude::*;
/// use ndarray::array;
///
/// let x = array![[0usize], [1], [0], [1], [1]];
/// let y = array![0usize, 1, 0, 1, 1];
/// let ds = DatasetView::new(x.view(), y.view());
///
/// let model = CategoricalNb::<f64>::params().laplace_rule(true).fit(&ds)?;
///
/// assert_eq!(model.priors(), array![0.4, 0.6]);
/// assert_eq!(model.distribution(0, 0), array![0.75, 0.25]);
/// # Result::Ok(())
/// ```
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalNb<F> {
    pub(crate) n_symbols: Vec<usize>,
    pub(crate) priors: Array1<F>,
    // indexed by class, then feature
    pub(crate) distributions: Vec<Vec<Array1<F>>>,
}

impl<F: Float> CategoricalNb<F> {
    /// Create an untrained model with uniform priors and uniform distributions
    ///
    /// `n_symbols[j]` is the number of symbols feature `j` can take. The distributions have
    /// to be estimated before the model is meaningful.
    pub fn new(n_classes: usize, n_symbols: Vec<usize>) -> Self {
        debug!(
            n_classes,
            n_features = n_symbols.len(),
            "creating categorical naive bayes model"
        );

        let priors = Array1::from_elem(n_classes, F::one() / F::cast(n_classes.max(1)));
        let row = n_symbols
            .iter()
            .map(|&n| Array1::from_elem(n, F::one() / F::cast(n.max(1))))
            .collect::<Vec<_>>();

        CategoricalNb {
            n_symbols,
            priors,
            distributions: vec![row; n_classes],
        }
    }

    /// Create an untrained model for `n_classes` classes, sizing every feature by the
    /// number of distinct symbols found in the matching column of `x`
    pub fn create<D: Data<Elem = usize>>(x: &ArrayBase<D, Ix2>, n_classes: usize) -> Self {
        Self::new(n_classes, distinct_symbols(x))
    }

    /// Replace the class priors, used as-is when fitting with `empirical(false)`
    pub fn with_priors(mut self, priors: Array1<F>) -> Result<Self> {
        self.set_priors(priors)?;
        Ok(self)
    }

    /// Replace the class priors in place
    pub fn set_priors(&mut self, priors: Array1<F>) -> Result<()> {
        if priors.len() != self.n_classes() {
            return Err(NaiveBayesError::InvalidPriors(format!(
                "expected {} priors, got {}",
                self.n_classes(),
                priors.len()
            )));
        }
        if priors.iter().any(|p| !p.is_finite() || *p < F::zero()) {
            return Err(NaiveBayesError::InvalidPriors(
                "priors must be non-negative and finite".to_string(),
            ));
        }

        self.priors = priors;
        Ok(())
    }

    pub fn n_classes(&self) -> usize {
        self.priors.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_symbols.len()
    }

    /// Number of symbols of every feature
    pub fn n_symbols(&self) -> &[usize] {
        &self.n_symbols
    }

    /// Prior probability of each class
    pub fn priors(&self) -> ArrayView1<F> {
        self.priors.view()
    }

    /// Distribution of the symbols of `feature` given `class`
    ///
    /// # Panics
    ///
    /// If `class` or `feature` is out of range.
    pub fn distribution(&self, class: usize, feature: usize) -> ArrayView1<F> {
        self.distributions[class][feature].view()
    }

    /// All distributions, indexed by class and then by feature
    pub fn distributions(&self) -> &[Vec<Array1<F>>] {
        &self.distributions
    }
}
