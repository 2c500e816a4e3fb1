pub type Value = f64;

#[derive(Debug, Eq, PartialEq)]
pub enum MathError {
    InvalidInput(&'static str),
}

/// Calculates the dot product of two equal-length vectors.
pub fn dot_product(a: &[Value], b: &[Value]) -> Result<Value, MathError> {
    if a.is_empty() || b.is_empty() {
        return Err(MathError::InvalidInput("inputs should have values"));
    }
    if a.len() != b.len() {
        return Err(MathError::InvalidInput("inputs should be the same length"));
    }

    Ok(a.iter().zip(b).map(|(a, b)| a * b).sum())
}
