//! Activation functions
//!
//! Enum-dispatched: the set is closed and a `match` is both simpler and
//! cheaper than a trait object per call.

/// Activation applied to a raw decision value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// ±1 step: -1 below zero, +1 otherwise
    Sign,
    /// 0/1 step
    Step,
    /// Logistic sigmoid `1 / (1 + e^-x)`
    Sigmoid,
    /// Identity
    Linear,
    /// Bell curve `e^(-x²/2)`
    Gaussian,
}

impl Activation {
    pub fn value(&self, x: f64) -> f64 {
        match self {
            Activation::Sign => {
                if x < 0.0 {
                    -1.0
                } else {
                    1.0
                }
            }
            Activation::Step => {
                if x < 0.0 {
                    0.0
                } else {
                    1.0
                }
            }
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Activation::Linear => x,
            Activation::Gaussian => (-x * x / 2.0).exp(),
        }
    }

    pub fn derivative(&self, x: f64) -> f64 {
        match self {
            // subgradient convention for the steps
            Activation::Sign | Activation::Step => 1.0,
            Activation::Sigmoid => {
                let s = self.value(x);
                s * (1.0 - s)
            }
            Activation::Linear => 1.0,
            Activation::Gaussian => -x * (-x * x / 2.0).exp(),
        }
    }
}
