#![doc = include_str!("../README.md")]

mod base_nb;
mod error;
mod hard_labels;
mod hyperparams;
mod model;
mod smoothing;
mod soft_labels;

pub use error::{NaiveBayesError, Result};
pub use hyperparams::{CategoricalNbParams, CategoricalNbValidParams, SmoothingOptions};
pub use model::CategoricalNb;
