use std::cmp::Ordering;

/// Compares two floats in descending order, with NaN sorted last.
pub(crate) fn nan_safe_f64_cmp_desc(a: &f64, b: &f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(a).unwrap_or(Ordering::Equal),
    }
}
