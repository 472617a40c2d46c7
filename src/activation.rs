//! Handling of neuron activation functions and their derivatives.

use num_traits::Float;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Represents which activation function to use when computing a neuron's output from the sum of
/// its weighted inputs.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Activation {
    /// Identity function. Outputs `x`.
    Linear,
    /// Heaviside or unit step function. Outputs `1` for `x > 0`, or `0` otherwise.
    UnitStep,
    /// Sign function. Outputs `1` for `x > 0`, `0` for `x = 0`, or `-1` otherwise.
    Sign,
    /// Logistic function. Outputs `1 / (1 + exp(-x))`.
    Sigmoid,
    /// Hyperbolic tangent function. Outputs `tanh(x)`.
    Tanh,
    /// Softsign function. Outputs `x / (1 + abs(x))`.
    SoftSign,
    /// Bent identity function. Outputs `(sqrt(x^2 + 1) - 1) / 2 + x`.
    BentIdentity,
    /// Rectified linear unit. Outputs `max(x, 0)`.
    Relu,
}

impl Activation {
    /// Applies the activation function to the input.
    pub fn apply<T: Float>(&self, x: T) -> T {
        match self {
            Activation::Linear => linear(x),
            Activation::UnitStep => unit_step(x),
            Activation::Sign => sign(x),
            Activation::Sigmoid => sigmoid(x),
            Activation::Tanh => tanh(x),
            Activation::SoftSign => soft_sign(x),
            Activation::BentIdentity => bent_identity(x),
            Activation::Relu => relu(x),
        }
    }

    /// Returns the derivative of the activation function.
    ///
    /// `sum` is the value the function was applied to and `output` is the value it produced.
    /// Functions whose derivative is cheaper to express in terms of their output (sigmoid, tanh)
    /// use `output`; the rest use `sum`.
    ///
    /// Functions without a usable derivative ([`UnitStep`][Self::UnitStep] and
    /// [`Sign`][Self::Sign]) return zero. See [`has_derivative`][Self::has_derivative].
    pub fn derivative<T: Float>(&self, sum: T, output: T) -> T {
        let one = T::one();
        match self {
            Activation::Linear => one,
            Activation::UnitStep | Activation::Sign => T::zero(),
            Activation::Sigmoid => output * (one - output),
            Activation::Tanh => one - output * output,
            Activation::SoftSign => {
                let d = one + sum.abs();
                one / (d * d)
            }
            Activation::BentIdentity => {
                sum / ((one + one) * (sum * sum + one).sqrt()) + one
            }
            Activation::Relu => {
                if sum > T::zero() {
                    one
                } else {
                    T::zero()
                }
            }
        }
    }

    /// Returns whether this function can be used with gradient-based training.
    pub fn has_derivative(&self) -> bool {
        !matches!(self, Activation::UnitStep | Activation::Sign)
    }

    /// Returns whether this is the logistic sigmoid, whose saturated regions receive the flat spot
    /// correction during propagation training.
    pub fn is_sigmoid(&self) -> bool {
        matches!(self, Activation::Sigmoid)
    }
}

/// Outputs `x`.
pub fn linear<T>(x: T) -> T {
    x
}

/// Heaviside/unit step function. Outputs `1` for `x > 0`, or `0` otherwise.
pub fn unit_step<T: Float>(x: T) -> T {
    if x > T::zero() {
        T::one()
    } else {
        T::zero()
    }
}

/// Outputs `1` for `x > 0`, `0` for `x = 0`, or `-1` otherwise.
pub fn sign<T: Float>(x: T) -> T {
    if x > T::zero() {
        T::one()
    } else if x == T::zero() {
        T::zero()
    } else {
        -T::one()
    }
}

/// Logistic function. Outputs `1 / (1 + exp(-x))`.
pub fn sigmoid<T: Float>(x: T) -> T {
    T::one() / (T::one() + (-x).exp())
}

/// Outputs `tanh(x)`.
pub fn tanh<T: Float>(x: T) -> T {
    x.tanh()
}

/// Outputs `x / (1 + abs(x))`.
pub fn soft_sign<T: Float>(x: T) -> T {
    x / (T::one() + x.abs())
}

/// Outputs `(sqrt(x^2 + 1) - 1) / 2 + x`.
pub fn bent_identity<T: Float>(x: T) -> T {
    (((x.powi(2) + T::one()).sqrt() - T::one()) / (T::one() + T::one())) + x
}

/// Rectified linear unit. Outputs `max(0, x)`.
pub fn relu<T: Float>(x: T) -> T {
    x.max(T::zero())
}
