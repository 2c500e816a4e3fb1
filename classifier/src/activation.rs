use crate::linear_algebra::{MathError, Value};

/// The activation kinds a layer can apply to its weighted sums.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Activation {
    Sigmoid,
    Relu,
    Softmax,
}

impl Activation {
    /// Activates the node at `index`, given the layer's full pre-activation
    /// vector. Softmax reads the whole vector; sigmoid and relu read only
    /// their own element.
    pub fn apply(self, preactivations: &[Value], index: usize) -> Result<Value, MathError> {
        match self {
            Activation::Sigmoid => Ok(sigmoid(preactivations[index])),
            Activation::Relu => Ok(relu(preactivations[index])),
            Activation::Softmax => Ok(softmax(preactivations)?[index]),
        }
    }

    /// The derivative of this activation with respect to the pre-activation
    /// input at `index`.
    pub fn derivative(self, preactivations: &[Value], index: usize) -> Result<Value, MathError> {
        match self {
            Activation::Sigmoid => Ok(sigmoid_prime(preactivations[index])),
            Activation::Relu => Ok(relu_prime(preactivations[index])),
            Activation::Softmax => softmax_prime(preactivations, index),
        }
    }
}

pub fn sigmoid(x: Value) -> Value {
    1.0 / (1.0 + (-x).exp())
}

pub fn sigmoid_prime(x: Value) -> Value {
    let e = (-x).exp();
    e / ((1.0 + e) * (1.0 + e))
}

pub fn relu(x: Value) -> Value {
    x.max(0.0)
}

pub fn relu_prime(x: Value) -> Value {
    match x > 0.0 {
        true => 1.0,
        false => 0.0,
    }
}

pub fn softmax(values: &[Value]) -> Result<Vec<Value>, MathError> {
    if values.is_empty() {
        return Err(MathError::InvalidInput("inputs should have values"));
    }

    let exp_sum = values.iter().map(|v| v.exp()).sum::<Value>();
    Ok(values.iter().map(|v| v.exp() / exp_sum).collect())
}

/// The local derivative of softmax at `index`, treating the output as if it
/// were independent per element. The cross-element Jacobian terms are
/// intentionally omitted.
pub fn softmax_prime(values: &[Value], index: usize) -> Result<Value, MathError> {
    let s = softmax(values)?[index];
    Ok(s * (1.0 - s))
}
