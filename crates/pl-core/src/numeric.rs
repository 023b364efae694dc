use crate::CoreError;

/// Floating point type used for quantities and costs
pub type Real = f64;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Add a quantity to an integer count, truncating after every step.
///
/// Fractional usages only show up in the count once the running total
/// crosses a whole unit.
pub fn accumulate_count(count: i64, quantity: Real) -> i64 {
    (count as Real + quantity) as i64
}
