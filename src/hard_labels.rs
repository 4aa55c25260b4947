use linfa::dataset::{DatasetBase, Labels};
use linfa::traits::{Fit, FitWith};
use linfa::Float;
use ndarray::{Array1, Array2, ArrayBase, ArrayView1, Axis, Data, Ix1, Ix2};
use tracing::debug;

use crate::base_nb::{check_records, check_shapes, fan_out, ClassFrequencies};
use crate::error::{NaiveBayesError, Result};
use crate::hyperparams::CategoricalNbValidParams;
use crate::CategoricalNb;

/// Samples carrying the hard label of one class
struct ClassMembers {
    records: Array2<usize>,
}

impl ClassMembers {
    fn new<D: Data<Elem = usize>>(x: &ArrayBase<D, Ix2>, y: ArrayView1<usize>, class: usize) -> Self {
        let index = y
            .iter()
            .enumerate()
            .filter_map(|(i, &label)| if label == class { Some(i) } else { None })
            .collect::<Vec<_>>();

        ClassMembers {
            records: x.select(Axis(0), &index),
        }
    }
}

impl<F: Float> ClassFrequencies<F> for ClassMembers {
    fn mass(&self) -> F {
        F::cast(self.records.nrows())
    }

    fn frequencies(&self, feature: usize, n_symbols: usize) -> Array1<F> {
        let mut frequencies = Array1::zeros(n_symbols);
        for &symbol in self.records.column(feature) {
            frequencies[symbol] += F::one();
        }

        frequencies
    }
}

impl<F: Float> CategoricalNbValidParams<F> {
    /// Re-estimate `model` from records `x` and hard labels `y` in `0..model.n_classes()`
    ///
    /// Every input is validated before the model is touched and the model is only updated
    /// when all classes and features were estimated successfully.
    pub fn learn<D, S>(
        &self,
        model: &mut CategoricalNb<F>,
        x: &ArrayBase<D, Ix2>,
        y: &ArrayBase<S, Ix1>,
    ) -> Result<()>
    where
        D: Data<Elem = usize>,
        S: Data<Elem = usize>,
    {
        check_shapes(x, y.len())?;
        check_records(model, x.view())?;

        let n_classes = model.n_classes();
        if let Some(&label) = y.iter().find(|&&label| label >= n_classes) {
            return Err(NaiveBayesError::LabelOutOfRange { label, n_classes });
        }

        let smoothing = self.resolve_smoothing(n_classes)?;
        debug!(
            n_samples = x.nrows(),
            n_features = x.ncols(),
            n_classes,
            "estimating categorical naive bayes from hard labels"
        );

        let (x, y) = (x.view(), y.view());
        let mut estimate = model.clone();
        fan_out(
            &mut estimate,
            &smoothing,
            x.nrows(),
            self.empirical(),
            |class| ClassMembers::new(&x, y, class),
        )?;

        *model = estimate;
        Ok(())
    }
}

impl<F, D, S> Fit<ArrayBase<D, Ix2>, ArrayBase<S, Ix1>, NaiveBayesError>
    for CategoricalNbValidParams<F>
where
    F: Float,
    D: Data<Elem = usize>,
    S: Data<Elem = usize>,
{
    type Object = CategoricalNb<F>;

    fn fit(&self, dataset: &DatasetBase<ArrayBase<D, Ix2>, ArrayBase<S, Ix1>>) -> Result<Self::Object> {
        self.fit_with(None, dataset)
    }
}

impl<'a, F, D, S> FitWith<'a, ArrayBase<D, Ix2>, ArrayBase<S, Ix1>, NaiveBayesError>
    for CategoricalNbValidParams<F>
where
    F: Float,
    D: Data<Elem = usize>,
    S: Data<Elem = usize>,
{
    type ObjectIn = Option<CategoricalNb<F>>;
    type ObjectOut = CategoricalNb<F>;

    fn fit_with(
        &self,
        model_in: Self::ObjectIn,
        dataset: &DatasetBase<ArrayBase<D, Ix2>, ArrayBase<S, Ix1>>,
    ) -> Result<Self::ObjectOut> {
        let x = dataset.records();
        let y = dataset.targets();
        check_shapes(x, y.len())?;

        if dataset.weights().is_some() {
            debug!("sample weights are not used by categorical naive bayes");
        }

        let mut model = match model_in {
            Some(model) => model,
            None => CategoricalNb::create(x, dataset.labels().len()),
        };

        self.learn(&mut model, x, y)?;
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::ClassMembers;
    use crate::base_nb::ClassFrequencies;
    use crate::{CategoricalNb, NaiveBayesError, Result, SmoothingOptions};
    use approx::assert_abs_diff_eq;
    use linfa::prelude::*;
    use linfa::ParamGuard;
    use ndarray::{array, Array1, Array2};

    #[test]
    fn class_members_count_symbols() {
        let x = array![[0usize, 2], [1, 2], [0, 1], [1, 0]];
        let y = array![1usize, 0, 1, 1];

        let members = ClassMembers::new(&x, y.view(), 1);
        assert_eq!(ClassFrequencies::<f64>::mass(&members), 3.);
        assert_eq!(
            ClassFrequencies::<f64>::frequencies(&members, 0, 2),
            array![2., 1.]
        );
        assert_eq!(
            ClassFrequencies::<f64>::frequencies(&members, 1, 3),
            array![1., 1., 1.]
        );
    }

    #[test]
    fn counts_without_regularization() -> Result<()> {
        let ds = Dataset::new(array![[0usize], [1], [0], [1], [1]], array![0usize, 1, 0, 1, 1]);
        let model = CategoricalNb::<f64>::params().regularization(0.0).fit(&ds)?;

        assert_abs_diff_eq!(model.priors(), array![0.4, 0.6], epsilon = 1e-12);
        assert_abs_diff_eq!(model.distribution(0, 0), array![1.0, 0.0]);
        assert_abs_diff_eq!(model.distribution(1, 0), array![0.0, 1.0]);

        Ok(())
    }

    #[test]
    fn laplace_rule() -> Result<()> {
        let ds = Dataset::new(array![[0usize], [1], [0], [1], [1]], array![0usize, 1, 0, 1, 1]);
        let model = CategoricalNb::<f64>::params().laplace_rule(true).fit(&ds)?;

        assert_abs_diff_eq!(model.distribution(0, 0), array![0.75, 0.25]);
        assert_abs_diff_eq!(model.distribution(1, 0), array![0.2, 0.8], epsilon = 1e-12);

        Ok(())
    }

    #[test]
    fn previous_values_blend() -> Result<()> {
        let x = array![[0usize], [0], [1]];
        let y = array![0usize, 0, 1];

        let mut model = CategoricalNb::<f64>::new(2, vec![2]);
        CategoricalNb::params()
            .regularization(1.0)
            .use_previous_values_as_priors(true)
            .check()?
            .learn(&mut model, &x, &y)?;

        // uniform slots act as a neutral prior
        assert_abs_diff_eq!(model.distribution(0, 0), array![0.75, 0.25]);
        assert_abs_diff_eq!(model.distribution(1, 0), array![1. / 3., 2. / 3.], epsilon = 1e-12);

        Ok(())
    }

    #[test]
    fn priors_untouched_without_empirical() -> Result<()> {
        let ds = Dataset::new(array![[0usize], [1], [1]], array![0usize, 1, 1]);
        let model = CategoricalNb::new(2, vec![2]).with_priors(array![0.9, 0.1])?;

        let model = CategoricalNb::params()
            .laplace_rule(true)
            .empirical(false)
            .fit_with(Some(model), &ds)?;

        assert_eq!(model.priors(), array![0.9, 0.1]);
        assert_abs_diff_eq!(model.distribution(1, 0), array![0.25, 0.75]);

        Ok(())
    }

    #[test]
    fn per_class_smoothing() -> Result<()> {
        let ds = Dataset::new(array![[0usize], [0], [1], [1]], array![0usize, 0, 1, 1]);
        let model = CategoricalNb::<f64>::params()
            .class_smoothing(vec![SmoothingOptions::new(0.0), SmoothingOptions::laplace()])
            .fit(&ds)?;

        assert_abs_diff_eq!(model.distribution(0, 0), array![1.0, 0.0]);
        assert_abs_diff_eq!(model.distribution(1, 0), array![0.25, 0.75]);

        let res = CategoricalNb::<f64>::params()
            .class_smoothing(vec![SmoothingOptions::laplace()])
            .fit(&ds);
        assert!(matches!(
            res,
            Err(NaiveBayesError::ClassSmoothingLength {
                expected: 2,
                found: 1
            })
        ));

        Ok(())
    }

    #[test]
    fn fresh_model_has_one_class_per_label() -> Result<()> {
        let x = array![[0usize], [1], [1], [0]];
        let ds = Dataset::new(x.clone(), array![2usize, 0, 1, 2]);
        let model = CategoricalNb::<f64>::params().laplace_rule(true).fit(&ds)?;
        assert_eq!(model.n_classes(), 3);
        assert_abs_diff_eq!(model.priors(), array![0.25, 0.25, 0.5]);

        // labels have to be contiguous from zero
        let res = CategoricalNb::<f64>::params()
            .laplace_rule(true)
            .fit(&Dataset::new(x, array![0usize, 3, 3, 0]));
        assert!(matches!(
            res,
            Err(NaiveBayesError::LabelOutOfRange {
                label: 3,
                n_classes: 2
            })
        ));

        Ok(())
    }

    #[test]
    fn invalid_inputs_leave_model_untouched() -> Result<()> {
        let params = CategoricalNb::<f64>::params().laplace_rule(true).check()?;
        let mut model = CategoricalNb::new(2, vec![2]);
        let before = model.clone();

        let empty = Array2::<usize>::zeros((0, 1));
        assert!(matches!(
            params.learn(&mut model, &empty, &Array1::<usize>::zeros(0)),
            Err(NaiveBayesError::EmptyRecords)
        ));
        assert!(matches!(
            params.learn(&mut model, &array![[0usize]], &Array1::<usize>::zeros(0)),
            Err(NaiveBayesError::EmptyTargets)
        ));
        assert!(matches!(
            params.learn(&mut model, &array![[0usize], [1]], &array![0usize]),
            Err(NaiveBayesError::MismatchedShapes(2, 1))
        ));
        assert!(matches!(
            params.learn(&mut model, &array![[0usize], [1]], &array![0usize, 2]),
            Err(NaiveBayesError::LabelOutOfRange {
                label: 2,
                n_classes: 2
            })
        ));
        assert!(matches!(
            params.learn(&mut model, &array![[0usize], [3]], &array![0usize, 1]),
            Err(NaiveBayesError::SymbolOutOfRange { .. })
        ));
        assert_eq!(model, before);

        Ok(())
    }

    #[test]
    fn degenerate_class_fails_without_smoothing() {
        // class 1 has no samples and no pseudo-counts
        let x = array![[0usize], [1]];
        let y = array![0usize, 0];
        let mut model = CategoricalNb::<f64>::new(2, vec![2]);
        let before = model.clone();

        let res = CategoricalNb::params()
            .check()
            .and_then(|params| params.learn(&mut model, &x, &y));
        assert!(matches!(
            res,
            Err(NaiveBayesError::DegenerateDistribution {
                class: 1,
                feature: 0
            })
        ));
        assert_eq!(model, before);
    }
}
