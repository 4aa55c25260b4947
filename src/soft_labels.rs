use linfa::dataset::DatasetBase;
use linfa::traits::{Fit, FitWith};
use linfa::Float;
use ndarray::{Array1, ArrayBase, ArrayView1, ArrayView2, Axis, Data, Ix2, Zip};
use tracing::debug;

use crate::base_nb::{check_records, check_shapes, fan_out, ClassFrequencies};
use crate::error::{NaiveBayesError, Result};
use crate::hyperparams::CategoricalNbValidParams;
use crate::CategoricalNb;

/// Membership weight of every sample in one class
struct ClassWeights<'a, F> {
    records: ArrayView2<'a, usize>,
    weights: ArrayView1<'a, F>,
}

impl<F: Float> ClassFrequencies<F> for ClassWeights<'_, F> {
    fn mass(&self) -> F {
        self.weights.sum()
    }

    fn frequencies(&self, feature: usize, n_symbols: usize) -> Array1<F> {
        let mut frequencies = Array1::zeros(n_symbols);
        Zip::from(self.records.column(feature))
            .and(&self.weights)
            .for_each(|&symbol, &weight| frequencies[symbol] += weight);

        frequencies
    }
}

impl<F: Float> CategoricalNbValidParams<F> {
    /// Re-estimate `model` from records `x` and soft labels `y`
    ///
    /// `y` has one row per sample and one column per class, entry `(n, i)` is the weight
    /// with which sample `n` belongs to class `i`. Weights of a sample do not have to sum
    /// to one, they scale the counts it contributes. Per-class smoothing overrides are not
    /// used, every class is smoothed with the shared options.
    pub fn learn_weighted<D, S>(
        &self,
        model: &mut CategoricalNb<F>,
        x: &ArrayBase<D, Ix2>,
        y: &ArrayBase<S, Ix2>,
    ) -> Result<()>
    where
        D: Data<Elem = usize>,
        S: Data<Elem = F>,
    {
        check_shapes(x, y.nrows())?;
        if y.ncols() == 0 {
            return Err(NaiveBayesError::EmptyTargets);
        }
        check_records(model, x.view())?;

        if y.ncols() != model.n_classes() {
            return Err(NaiveBayesError::ClassMismatch {
                expected: model.n_classes(),
                found: y.ncols(),
            });
        }
        if y.iter().any(|w| !w.is_finite() || *w < F::zero()) {
            return Err(NaiveBayesError::InvalidWeights);
        }

        if self.class_smoothing().is_some() {
            debug!("per-class smoothing is reset to the shared options for soft labels");
        }
        let smoothing = self.resolve_shared_smoothing(model.n_classes());
        debug!(
            n_samples = x.nrows(),
            n_features = x.ncols(),
            n_classes = model.n_classes(),
            "estimating categorical naive bayes from class weights"
        );

        let (x, y) = (x.view(), y.view());
        let mut estimate = model.clone();
        fan_out(
            &mut estimate,
            &smoothing,
            x.nrows(),
            self.empirical(),
            move |class| ClassWeights {
                records: x,
                weights: y.index_axis_move(Axis(1), class),
            },
        )?;

        *model = estimate;
        Ok(())
    }
}

impl<F, D, S> Fit<ArrayBase<D, Ix2>, ArrayBase<S, Ix2>, NaiveBayesError>
    for CategoricalNbValidParams<F>
where
    F: Float,
    D: Data<Elem = usize>,
    S: Data<Elem = F>,
{
    type Object = CategoricalNb<F>;

    fn fit(&self, dataset: &DatasetBase<ArrayBase<D, Ix2>, ArrayBase<S, Ix2>>) -> Result<Self::Object> {
        self.fit_with(None, dataset)
    }
}

impl<'a, F, D, S> FitWith<'a, ArrayBase<D, Ix2>, ArrayBase<S, Ix2>, NaiveBayesError>
    for CategoricalNbValidParams<F>
where
    F: Float,
    D: Data<Elem = usize>,
    S: Data<Elem = F>,
{
    type ObjectIn = Option<CategoricalNb<F>>;
    type ObjectOut = CategoricalNb<F>;

    fn fit_with(
        &self,
        model_in: Self::ObjectIn,
        dataset: &DatasetBase<ArrayBase<D, Ix2>, ArrayBase<S, Ix2>>,
    ) -> Result<Self::ObjectOut> {
        let x = dataset.records();
        let y = dataset.targets();
        check_shapes(x, y.nrows())?;

        if dataset.weights().is_some() {
            debug!("sample weights are not used by categorical naive bayes");
        }

        let mut model = match model_in {
            Some(model) => model,
            None => CategoricalNb::create(x, y.ncols()),
        };

        self.learn_weighted(&mut model, x, y)?;
        Ok(model)
    }
}
