use serde::{Deserialize, Serialize};

use super::super::DecisionError;

const DEFAULT_SCALE: f64 = 1.0;
const DEFAULT_BIAS: f64 = 0.5;
const DEFAULT_MIN_PROBABILITY: f64 = 0.01;
const DEFAULT_MAX_PROBABILITY: f64 = 0.99;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationMethod {
    Logistic,
    /// Recognised name only; configurations selecting it are rejected.
    Isotonic,
}

impl CalibrationMethod {
    pub const fn label(self) -> &'static str {
        match self {
            CalibrationMethod::Logistic => "logistic",
            CalibrationMethod::Isotonic => "isotonic",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, DecisionError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "logistic" => Ok(Self::Logistic),
            "isotonic" => Ok(Self::Isotonic),
            _ => Err(DecisionError::CalibrationMethod {
                method: raw.to_string(),
            }),
        }
    }
}

/// Output clamp applied after calibration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbabilityBounds {
    pub min_probability: f64,
    pub max_probability: f64,
}

impl Default for ProbabilityBounds {
    fn default() -> Self {
        Self {
            min_probability: DEFAULT_MIN_PROBABILITY,
            max_probability: DEFAULT_MAX_PROBABILITY,
        }
    }
}

impl ProbabilityBounds {
    pub fn validate(self) -> Result<Self, DecisionError> {
        let Self {
            min_probability,
            max_probability,
        } = self;
        let within_unit = (0.0..=1.0).contains(&min_probability) && (0.0..=1.0).contains(&max_probability);
        if within_unit && min_probability <= max_probability {
            Ok(self)
        } else {
            Err(DecisionError::config(format!(
                "bounds must satisfy 0 <= min_probability ({min_probability}) <= max_probability ({max_probability}) <= 1"
            )))
        }
    }

    pub fn clamp(&self, probability: f64) -> f64 {
        probability.clamp(self.min_probability, self.max_probability)
    }
}

/// Monotone map from raw log-odds to a bounded approval probability.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Calibrator {
    method: CalibrationMethod,
    scale: f64,
    bias: f64,
    bounds: ProbabilityBounds,
}

impl Default for Calibrator {
    fn default() -> Self {
        Self {
            method: CalibrationMethod::Logistic,
            scale: DEFAULT_SCALE,
            bias: DEFAULT_BIAS,
            bounds: ProbabilityBounds::default(),
        }
    }
}

impl Calibrator {
    pub fn new(
        method: CalibrationMethod,
        scale: f64,
        bias: f64,
        bounds: ProbabilityBounds,
    ) -> Result<Self, DecisionError> {
        if method == CalibrationMethod::Isotonic {
            return Err(DecisionError::CalibrationMethod {
                method: method.label().to_string(),
            });
        }
        // A negative scale would invert the ordering of scores.
        if !scale.is_finite() || scale < 0.0 {
            return Err(DecisionError::config(format!(
                "calibration.scale must be finite and non-negative, found {scale}"
            )));
        }
        if !bias.is_finite() {
            return Err(DecisionError::config("calibration.bias must be finite"));
        }

        Ok(Self {
            method,
            scale,
            bias,
            bounds: bounds.validate()?,
        })
    }

    pub fn calibrate(&self, raw_score: f64) -> f64 {
        let z = self.scale * raw_score + self.bias;
        self.bounds.clamp(logistic(z))
    }

    pub fn method(&self) -> CalibrationMethod {
        self.method
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    pub fn bounds(&self) -> ProbabilityBounds {
        self.bounds
    }
}

fn logistic(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logistic_matches_closed_form() {
        let calibrator = Calibrator::new(
            CalibrationMethod::Logistic,
            1.0,
            0.0,
            ProbabilityBounds {
                min_probability: 0.0,
                max_probability: 1.0,
            },
        )
        .expect("valid calibrator");

        assert!((calibrator.calibrate(0.0) - 0.5).abs() < 1e-12);
        let expected = 1.0 / (1.0 + (-2.0f64).exp());
        assert!((calibrator.calibrate(2.0) - expected).abs() < 1e-12);
        assert!((calibrator.calibrate(-2.0) - (1.0 - expected)).abs() < 1e-12);
    }

    #[test]
    fn extreme_scores_are_clamped_to_bounds() {
        let calibrator = Calibrator::default();
        assert_eq!(calibrator.calibrate(1e6), DEFAULT_MAX_PROBABILITY);
        assert_eq!(calibrator.calibrate(-1e6), DEFAULT_MIN_PROBABILITY);
    }

    #[test]
    fn rejects_isotonic_and_negative_scale() {
        let bounds = ProbabilityBounds::default();
        assert!(matches!(
            Calibrator::new(CalibrationMethod::Isotonic, 1.0, 0.0, bounds),
            Err(DecisionError::CalibrationMethod { .. })
        ));
        assert!(matches!(
            Calibrator::new(CalibrationMethod::Logistic, -1.0, 0.0, bounds),
            Err(DecisionError::ConfigValidation { .. })
        ));
    }

    #[test]
    fn parses_method_names() {
        assert_eq!(
            CalibrationMethod::parse(" Logistic ").expect("known"),
            CalibrationMethod::Logistic
        );
        assert_eq!(
            CalibrationMethod::parse("isotonic").expect("known"),
            CalibrationMethod::Isotonic
        );
        assert!(CalibrationMethod::parse("beta").is_err());
    }
}
