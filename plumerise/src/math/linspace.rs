use num_traits::{Float, FromPrimitive};

/// Returns `n` evenly spaced samples from `y_start` to `y_end`.
///
/// Sample `x` is `y_start + x * dy`, except the last sample which is
/// `y_end` itself so that the range is always closed.
pub fn linspace<T>(y_start: T, y_end: T, n: usize) -> impl Iterator<Item = T>
where
    T: Float + FromPrimitive,
{
    let last = n.saturating_sub(1);
    // Unwraps are fine, every usize is representable by a float.
    let dy = (y_end - y_start) / T::from_usize(last.max(1)).unwrap();
    (0..n).map(move |x| {
        if x == last && x > 0 {
            y_end
        } else {
            y_start + T::from_usize(x).unwrap() * dy
        }
    })
}

/// Linear interpolation `pct` percent of the way from `lo` to `hi`.
pub fn lerp_percent<T>(lo: T, hi: T, pct: T) -> T
where
    T: Float + FromPrimitive,
{
    lo + ((hi - lo) / T::from_u8(100).unwrap()) * pct
}
