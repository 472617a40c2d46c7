//! Resilient propagation.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::TrainError;
use crate::network::ConnectionScratch;

/// The constants of resilient propagation (RPROP).
///
/// Every connection adapts its own step size from the sign of its gradient, so there is no global
/// learning rate. The per-connection state lives in [`ConnectionScratch`], which lets one
/// `RpropParams` serve the whole network.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RpropParams {
    /// The step size every connection starts with.
    pub initial_update: f64,
    /// The largest step size.
    pub max_step: f64,
    /// The factor a step size grows by while the gradient keeps its sign.
    pub positive_eta: f64,
    /// The factor a step size shrinks by when the gradient changes sign.
    pub negative_eta: f64,
    /// The smallest step size.
    pub delta_min: f64,
    /// Values with a smaller magnitude have a sign of zero.
    pub zero_tolerance: f64,
}

impl Default for RpropParams {
    fn default() -> Self {
        Self {
            initial_update: 0.1,
            max_step: 50.0,
            positive_eta: 1.2,
            negative_eta: 0.5,
            delta_min: 1e-6,
            zero_tolerance: 1e-17,
        }
    }
}

impl RpropParams {
    /// Returns the sign of `value` as `-1`, `0` or `1`, treating magnitudes below the zero
    /// tolerance as zero.
    pub fn sign(&self, value: f64) -> i8 {
        if value.abs() < self.zero_tolerance {
            0
        } else if value > 0.0 {
            1
        } else {
            -1
        }
    }

    /// Updates the training memory of one connection from its accumulated gradient and returns
    /// the weight change to apply. The gradient accumulator is zeroed.
    pub fn learn(&self, scratch: &mut ConnectionScratch) -> f64 {
        let gradient = scratch.gradient;
        let change = self.sign(gradient * scratch.last_gradient);

        let weight_change = match change {
            1 => {
                let update = (scratch.update * self.positive_eta).min(self.max_step);
                scratch.update = update;
                scratch.last_gradient = gradient;
                f64::from(self.sign(gradient)) * update
            }
            -1 => {
                scratch.update = (scratch.update * self.negative_eta).max(self.delta_min);
                // Avoid shrinking again on the next pass
                scratch.last_gradient = 0.0;
                -scratch.last_weight_delta
            }
            _ => {
                scratch.last_gradient = gradient;
                f64::from(self.sign(gradient)) * scratch.update
            }
        };

        scratch.last_weight_delta = weight_change;
        scratch.gradient = 0.0;
        weight_change
    }

    pub(crate) fn validate(&self) -> Result<(), TrainError> {
        let all_finite = [
            self.initial_update,
            self.max_step,
            self.positive_eta,
            self.negative_eta,
            self.delta_min,
            self.zero_tolerance,
        ]
        .iter()
        .all(|v| v.is_finite());

        if !all_finite {
            return Err(TrainError::InvalidParameter(
                "RPROP parameters must be finite".to_string(),
            ));
        }
        if !(self.delta_min > 0.0 && self.delta_min <= self.max_step) {
            return Err(TrainError::InvalidParameter(format!(
                "RPROP step bounds must satisfy 0 < delta_min <= max_step, got {} and {}",
                self.delta_min, self.max_step
            )));
        }
        if self.initial_update <= 0.0 {
            return Err(TrainError::InvalidParameter(format!(
                "RPROP initial update must be positive, got {}",
                self.initial_update
            )));
        }
        if !(self.negative_eta > 0.0 && self.negative_eta < 1.0 && self.positive_eta > 1.0) {
            return Err(TrainError::InvalidParameter(format!(
                "RPROP factors must satisfy 0 < negative_eta < 1 < positive_eta, got {} and {}",
                self.negative_eta, self.positive_eta
            )));
        }
        if self.zero_tolerance < 0.0 {
            return Err(TrainError::InvalidParameter(
                "RPROP zero tolerance must not be negative".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;

    use super::*;

    fn scratch(params: &RpropParams) -> ConnectionScratch {
        ConnectionScratch {
            update: params.initial_update,
            ..ConnectionScratch::default()
        }
    }

    #[test]
    fn test_sign() {
        let params = RpropParams::default();
        assert_eq!(1, params.sign(0.5));
        assert_eq!(-1, params.sign(-0.5));
        assert_eq!(0, params.sign(0.0));
        assert_eq!(0, params.sign(1e-18));
        assert_eq!(0, params.sign(-1e-18));
    }

    #[test]
    fn test_first_pass_uses_initial_update() {
        let params = RpropParams::default();
        let mut s = scratch(&params);

        s.gradient = -3.0;
        assert_approx_eq!(-0.1, params.learn(&mut s));
        assert_approx_eq!(0.1, s.update);
        assert_eq!(-3.0, s.last_gradient);
        assert_eq!(0.0, s.gradient);
    }

    #[test]
    fn test_same_sign_grows_update_up_to_max_step() {
        let params = RpropParams::default();
        let mut s = scratch(&params);
        let mut previous = s.update;

        for _ in 0..100 {
            s.gradient = 2.0;
            let change = params.learn(&mut s);

            assert!(s.update >= previous);
            assert!(s.update <= params.max_step);
            assert_approx_eq!(s.update, change);
            previous = s.update;
        }
        assert_approx_eq!(params.max_step, s.update);
    }

    #[test]
    fn test_sign_flip_reverts_previous_step() {
        let params = RpropParams::default();
        let mut s = scratch(&params);

        s.gradient = 1.0;
        params.learn(&mut s);
        s.gradient = 1.0;
        let step = params.learn(&mut s);
        assert_approx_eq!(0.12, step);

        s.gradient = -1.0;
        let reverted = params.learn(&mut s);
        assert_eq!(-step, reverted);
        assert_approx_eq!(0.06, s.update);
        assert_eq!(0.0, s.last_gradient);

        // After a flip the next pass steps by the shrunken update without shrinking again
        s.gradient = -1.0;
        assert_approx_eq!(-0.06, params.learn(&mut s));
        assert_approx_eq!(0.06, s.update);
    }

    #[test]
    fn test_update_floor() {
        let params = RpropParams::default();
        let mut s = ConnectionScratch {
            update: 1e-6,
            last_gradient: 1.0,
            ..ConnectionScratch::default()
        };

        s.gradient = -1.0;
        params.learn(&mut s);
        assert_eq!(params.delta_min, s.update);
    }

    #[test]
    fn test_zero_gradient_is_no_op() {
        let params = RpropParams::default();
        let mut s = scratch(&params);
        s.last_gradient = 4.0;

        assert_eq!(0.0, params.learn(&mut s));
        assert_approx_eq!(0.1, s.update);
    }

    #[test]
    fn test_validate() {
        assert!(RpropParams::default().validate().is_ok());

        let invalid = [
            RpropParams {
                max_step: f64::NAN,
                ..RpropParams::default()
            },
            RpropParams {
                delta_min: 100.0,
                ..RpropParams::default()
            },
            RpropParams {
                initial_update: 0.0,
                ..RpropParams::default()
            },
            RpropParams {
                positive_eta: 0.9,
                ..RpropParams::default()
            },
        ];
        for params in invalid {
            assert!(matches!(params.validate(), Err(TrainError::InvalidParameter(_))));
        }
    }
}
