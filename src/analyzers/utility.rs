/// Mean of the present values, ignoring `None`. Returns `None` if nothing is present.
pub fn mean_present<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// `change / base`, undefined when the base is zero or either side is missing.
pub fn pct_change(change: Option<f64>, base: Option<f64>) -> Option<f64> {
    match (change, base) {
        (Some(c), Some(b)) if b != 0.0 => Some(c / b),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_skips_missing() {
        assert_eq!(mean_present([Some(1.0), None, Some(3.0)]), Some(2.0));
    }

    #[test]
    fn test_mean_all_missing() {
        assert_eq!(mean_present([None, None]), None);
        assert_eq!(mean_present(Vec::<Option<f64>>::new()), None);
    }

    #[test]
    fn test_pct_change_zero_base() {
        assert_eq!(pct_change(Some(500.0), Some(0.0)), None);
        assert_eq!(pct_change(Some(50.0), Some(200.0)), Some(0.25));
        assert_eq!(pct_change(None, Some(200.0)), None);
    }
}
