use crate::linear_algebra::Value;

/// Calculates the squared error between one output value and its expected
/// value.
pub fn squared_error(output: Value, expected: Value) -> Value {
    (output - expected) * (output - expected)
}

/// Calculates the derivative of the squared error with respect to the output
/// value.
pub fn squared_error_prime(output: Value, expected: Value) -> Value {
    2.0 * (output - expected)
}
