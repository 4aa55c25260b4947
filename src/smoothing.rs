use linfa::Float;
use ndarray::{ArrayView1, ArrayViewMut1, Zip};

use crate::error::{NaiveBayesError, Result};
use crate::hyperparams::ResolvedSmoothing;

/// Normalize `frequencies` plus the pseudo-count into `slot`, the distribution of
/// `feature` given `class`
///
/// With `use_previous` the current content of `slot` acts as a multiplicative prior,
/// otherwise it is overwritten. Fails without normalizing when the total mass is zero
/// (or not finite), leaving the slot unnormalized.
pub(crate) fn smooth<F: Float>(
    mut slot: ArrayViewMut1<F>,
    frequencies: ArrayView1<F>,
    smoothing: &ResolvedSmoothing<F>,
    (class, feature): (usize, usize),
) -> Result<()> {
    debug_assert_eq!(slot.len(), frequencies.len());
    let regularization = smoothing.regularization;

    if smoothing.use_previous {
        Zip::from(&mut slot)
            .and(&frequencies)
            .for_each(|p, &f| *p *= f + regularization);
    } else {
        Zip::from(&mut slot)
            .and(&frequencies)
            .for_each(|p, &f| *p = f + regularization);
    }

    let sum = slot.sum();
    if sum <= F::zero() || !sum.is_finite() {
        return Err(NaiveBayesError::DegenerateDistribution { class, feature });
    }

    slot.mapv_inplace(|p| p / sum);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::smooth;
    use crate::hyperparams::ResolvedSmoothing;
    use crate::NaiveBayesError;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array1};

    fn resolved(regularization: f64, use_previous: bool) -> ResolvedSmoothing<f64> {
        ResolvedSmoothing {
            regularization,
            use_previous,
        }
    }

    #[test]
    fn raw_frequencies_are_normalized() {
        let mut slot = Array1::zeros(2);
        smooth(slot.view_mut(), array![2., 0.].view(), &resolved(0., false), (0, 0)).unwrap();
        assert_abs_diff_eq!(slot, array![1., 0.]);
    }

    #[test]
    fn pseudo_counts_are_added() {
        // previous content is ignored without blending
        let mut slot = array![0.9, 0.1];
        smooth(slot.view_mut(), array![2., 0.].view(), &resolved(1., false), (0, 0)).unwrap();
        assert_abs_diff_eq!(slot, array![0.75, 0.25]);
    }

    #[test]
    fn previous_values_blend_multiplicatively() {
        let mut slot = array![0.5, 0.5];
        smooth(slot.view_mut(), array![2., 0.].view(), &resolved(1., true), (0, 0)).unwrap();
        assert_abs_diff_eq!(slot, array![0.75, 0.25]);

        let mut slot = array![0.2, 0.8];
        smooth(slot.view_mut(), array![1., 1.].view(), &resolved(0., true), (0, 0)).unwrap();
        assert_abs_diff_eq!(slot, array![0.2, 0.8], epsilon = 1e-12);
    }

    #[test]
    fn zero_mass_is_reported() {
        let mut slot = Array1::<f64>::zeros(3);
        assert!(matches!(
            smooth(slot.view_mut(), Array1::zeros(3).view(), &resolved(0., false), (2, 5)),
            Err(NaiveBayesError::DegenerateDistribution {
                class: 2,
                feature: 5
            })
        ));

        let mut slot = Array1::<f64>::zeros(3);
        assert!(smooth(slot.view_mut(), array![1., 2., 3.].view(), &resolved(1., true), (0, 0)).is_err());
    }
}
