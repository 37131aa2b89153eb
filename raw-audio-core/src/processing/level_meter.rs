/// Approximate sound-pressure level of a sample block, in decibels.
///
/// Averages only the samples with value >= 0 — negative samples are excluded
/// from both the sum and the divisor. The result is a biased estimate, not a
/// true RMS, and downstream displayed values depend on exactly this
/// heuristic; do not "fix" it. The average is a truncating integer division,
/// the pressure reference is 20 µPa:
///
/// ```text
/// average  = sum(samples >= 0) / count(samples >= 0)
/// pressure = average / 51805.5336
/// dB       = 20 · log10(pressure / 0.00002)
/// ```
///
/// # Panics
///
/// Divides by zero (and panics) when the block is empty or contains only
/// negative samples. Callers feeding arbitrary blocks must guard against an
/// empty effective-sample set themselves; the meter does not special-case it.
pub fn calculate_decibel(block: &[i16]) -> f64 {
    let mut sum: i64 = 0;
    let mut count = block.len() as i64;
    for &sample in block {
        if sample >= 0 {
            sum += i64::from(sample);
        } else {
            count -= 1;
        }
    }

    let average = sum / count;
    let pressure = average as f64 / 51805.5336;
    20.0 * (pressure / 0.00002).log10()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn known_block_matches_hand_computed_value() {
        // average = 1000, pressure = 1000 / 51805.5336 ≈ 0.0193030,
        // dB = 20 · log10(0.0193030 / 0.00002)
        let db = calculate_decibel(&[1000, 1000, 1000, 1000]);
        assert_abs_diff_eq!(db, 59.692, epsilon = 1e-3);
    }

    #[test]
    fn negative_samples_are_excluded_from_sum_and_count() {
        // Only the two 1000s count: same average as the all-positive block.
        let mixed = calculate_decibel(&[1000, -32768, 1000, -1]);
        let pure = calculate_decibel(&[1000, 1000]);
        assert_abs_diff_eq!(mixed, pure, epsilon = 1e-12);
    }

    #[test]
    fn average_truncates_toward_zero() {
        // sum = 3, count = 2 → average = 1, not 1.5
        let a = calculate_decibel(&[1, 2]);
        let b = calculate_decibel(&[1, 1]);
        assert_abs_diff_eq!(a, b, epsilon = 1e-12);
    }

    #[test]
    #[should_panic]
    fn all_negative_block_divides_by_zero() {
        calculate_decibel(&[-1, -200, -32768]);
    }

    #[test]
    #[should_panic]
    fn empty_block_divides_by_zero() {
        calculate_decibel(&[]);
    }
}
