use linfa::Float;
use ndarray::{Array1, ArrayBase, ArrayView2, Axis, Data, Ix2};
use rayon::prelude::*;
use std::collections::HashSet;
use tracing::trace;

use crate::error::{NaiveBayesError, Result};
use crate::hyperparams::ResolvedSmoothing;
use crate::smoothing::smooth;
use crate::CategoricalNb;

/// Observed mass of a single class, the source of its prior and symbol frequencies
pub(crate) trait ClassFrequencies<F: Float>: Sync {
    /// Number of samples (or summed membership weight) of the class
    fn mass(&self) -> F;

    /// Frequency of every symbol of `feature` within the class
    fn frequencies(&self, feature: usize, n_symbols: usize) -> Array1<F>;
}

/// Number of distinct symbols observed in every column of `x`
pub(crate) fn distinct_symbols<D: Data<Elem = usize>>(x: &ArrayBase<D, Ix2>) -> Vec<usize> {
    x.axis_iter(Axis(1))
        .map(|col| col.iter().collect::<HashSet<_>>().len())
        .collect()
}

/// Checks that both records and targets hold samples and that they agree in count
pub(crate) fn check_shapes<D: Data<Elem = usize>>(
    x: &ArrayBase<D, Ix2>,
    n_targets: usize,
) -> Result<()> {
    if x.nrows() == 0 || x.ncols() == 0 {
        return Err(NaiveBayesError::EmptyRecords);
    }
    if n_targets == 0 {
        return Err(NaiveBayesError::EmptyTargets);
    }
    if x.nrows() != n_targets {
        return Err(NaiveBayesError::MismatchedShapes(x.nrows(), n_targets));
    }

    Ok(())
}

/// Checks that the records fit the feature layout and symbol tables of `model`
pub(crate) fn check_records<F: Float>(model: &CategoricalNb<F>, x: ArrayView2<usize>) -> Result<()> {
    if x.ncols() != model.n_features() {
        return Err(NaiveBayesError::FeatureMismatch {
            expected: model.n_features(),
            found: x.ncols(),
        });
    }

    for (feature, (col, &n_symbols)) in x.axis_iter(Axis(1)).zip(model.n_symbols()).enumerate() {
        if let Some(&symbol) = col.iter().find(|&&s| s >= n_symbols) {
            return Err(NaiveBayesError::SymbolOutOfRange {
                feature,
                symbol,
                n_symbols,
            });
        }
    }

    Ok(())
}

/// Estimate priors and distributions of every class in parallel
///
/// Classes fan out over the rayon pool and every class fans out over its features. Each
/// class task owns its prior and its row of distributions, each feature task owns a
/// single slot, so no two tasks ever write the same memory.
pub(crate) fn fan_out<F, C, S>(
    model: &mut CategoricalNb<F>,
    smoothing: &[ResolvedSmoothing<F>],
    n_samples: usize,
    empirical: bool,
    class_stats: C,
) -> Result<()>
where
    F: Float,
    C: Fn(usize) -> S + Sync,
    S: ClassFrequencies<F>,
{
    debug_assert_eq!(smoothing.len(), model.n_classes());

    let CategoricalNb {
        n_symbols,
        priors,
        distributions,
    } = model;
    let n_symbols = &*n_symbols;
    let n_samples = F::cast(n_samples);

    priors
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .zip(distributions.par_iter_mut())
        .zip(smoothing.par_iter())
        .enumerate()
        .try_for_each(|(class, ((mut prior, row), smoothing))| {
            let stats = class_stats(class);
            trace!(class, mass = %stats.mass(), "estimating class");

            if empirical {
                prior.fill(stats.mass() / n_samples);
            }

            row.par_iter_mut()
                .zip(n_symbols.par_iter())
                .enumerate()
                .try_for_each(|(feature, (slot, &n))| {
                    let frequencies = stats.frequencies(feature, n);
                    smooth(slot.view_mut(), frequencies.view(), smoothing, (class, feature))
                })
        })
}
