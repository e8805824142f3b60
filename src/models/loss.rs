//! Margin-based loss approximations
//!
//! Smooth stand-ins for the 0/1 loss, evaluated on the margin
//! `decision * goal`. Enum-dispatched like the activations.

/// Loss over a classification margin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loss {
    /// `margin²`
    Quadratic,
    /// Hinge: `max(0, 1 - margin)`
    PiecewiseLinear,
    /// `2 / (1 + e^margin)`
    Sigmoid,
    /// `2 log2(1 + e^-margin)`
    Logistic,
    /// `e^-margin`
    Exponential,
}

impl Loss {
    pub fn value(&self, margin: f64) -> f64 {
        match self {
            Loss::Quadratic => margin * margin,
            Loss::PiecewiseLinear => (1.0 - margin).max(0.0),
            Loss::Sigmoid => 2.0 / (1.0 + margin.exp()),
            Loss::Logistic => 2.0 * (1.0 + (-margin).exp()).log2(),
            Loss::Exponential => (-margin).exp(),
        }
    }

    pub fn derivative(&self, margin: f64) -> f64 {
        match self {
            Loss::Quadratic => 2.0 * margin,
            Loss::PiecewiseLinear => {
                if margin < 1.0 {
                    -1.0
                } else {
                    0.0
                }
            }
            Loss::Sigmoid => {
                let e = margin.exp();
                -2.0 * e / ((1.0 + e) * (1.0 + e))
            }
            Loss::Logistic => {
                let e = (-margin).exp();
                -2.0 / std::f64::consts::LN_2 * e / (1.0 + e)
            }
            Loss::Exponential => -(-margin).exp(),
        }
    }
}
