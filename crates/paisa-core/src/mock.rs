//! Mock predictor for testing
//!
//! Returns scripted values and records every feature row it receives, so
//! tests can check exactly what the forecast loop fed the model.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::predictor::Predictor;

enum Behavior {
    Constant(f64),
    Sequence(Mutex<VecDeque<f64>>),
    Function(Box<dyn Fn(&[f64]) -> f64 + Send + Sync>),
    Fail(String),
}

/// Mock predictor with configurable output
pub struct MockPredictor {
    behavior: Behavior,
    calls: Mutex<Vec<Vec<f64>>>,
}

impl MockPredictor {
    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Always predict `value`
    pub fn constant(value: f64) -> Self {
        Self::with_behavior(Behavior::Constant(value))
    }

    /// Predict the given values in order, failing once they run out
    pub fn sequence(values: impl IntoIterator<Item = f64>) -> Self {
        Self::with_behavior(Behavior::Sequence(Mutex::new(values.into_iter().collect())))
    }

    /// Compute the prediction from the projected row
    pub fn from_fn(f: impl Fn(&[f64]) -> f64 + Send + Sync + 'static) -> Self {
        Self::with_behavior(Behavior::Function(Box::new(f)))
    }

    /// Fail every call with `message`
    pub fn failing(message: &str) -> Self {
        Self::with_behavior(Behavior::Fail(message.to_string()))
    }

    /// Rows received so far, in call order
    pub fn calls(&self) -> Vec<Vec<f64>> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl Predictor for MockPredictor {
    fn predict(&self, row: &[f64]) -> Result<f64> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(row.to_vec());
        }

        match &self.behavior {
            Behavior::Constant(value) => Ok(*value),
            Behavior::Sequence(values) => values
                .lock()
                .ok()
                .and_then(|mut v| v.pop_front())
                .ok_or_else(|| Error::Prediction("Mock sequence exhausted".to_string())),
            Behavior::Function(f) => Ok(f(row)),
            Behavior::Fail(message) => Err(Error::Prediction(message.clone())),
        }
    }

    fn kind(&self) -> &'static str {
        "mock"
    }
}
