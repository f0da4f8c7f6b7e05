//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;
use thiserror::Error;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Reasons a lookup table cannot be used.
#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    #[error("Table has no breakpoints")]
    Empty,

    #[error("Table has {bp} breakpoints but {vals} values")]
    LengthMismatch { bp: usize, vals: usize },

    #[error("Table breakpoints are not strictly ascending at index {0}")]
    NotAscending(usize),

    #[error("Table contains a non-finite entry at index {0}")]
    NonFinite(usize)
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float
{
    target_range.0
        + ((value - source_range.0)
        * (target_range.1 - target_range.0)
        / (source_range.1 - source_range.0))
}

/// Clamp `value` into `[min, max]`.
///
/// The upper limit is applied last, so if `min > max` the result is `max`.
pub fn clamp<T>(value: T, min: T, max: T) -> T
where
    T: Float
{
    let mut ret = value;

    if ret < min {
        ret = min
    }
    if ret > max {
        ret = max
    }

    ret
}

/// Linearly interpolate `x` over the breakpoints `bp` and values `vals`.
///
/// Breakpoints must be ascending and the slices the same non-zero length (see
/// `validate_table`). Queries below the first breakpoint, including NaN,
/// return the first value, those above the last breakpoint return the last
/// value.
pub fn interp<T>(x: T, bp: &[T], vals: &[T]) -> T
where
    T: Float
{
    let last = bp.len() - 1;

    if !(x > bp[0]) {
        return vals[0]
    }
    if x >= bp[last] {
        return vals[last]
    }

    // Index of the first breakpoint strictly above x, guaranteed to be in
    // 1..=last by the checks above
    let hi = bp.partition_point(|b| *b <= x);
    let lo = hi - 1;

    lin_map((bp[lo], bp[hi]), (vals[lo], vals[hi]), x)
}

/// Check that a breakpoint and value pair can be used with `interp`.
pub fn validate_table<T>(bp: &[T], vals: &[T]) -> Result<(), TableError>
where
    T: Float
{
    if bp.is_empty() {
        return Err(TableError::Empty)
    }
    if bp.len() != vals.len() {
        return Err(TableError::LengthMismatch {
            bp: bp.len(),
            vals: vals.len()
        })
    }

    for (i, (b, v)) in bp.iter().zip(vals.iter()).enumerate() {
        if !b.is_finite() || !v.is_finite() {
            return Err(TableError::NonFinite(i))
        }
        if i > 0 && !(*b > bp[i - 1]) {
            return Err(TableError::NotAscending(i))
        }
    }

    Ok(())
}
