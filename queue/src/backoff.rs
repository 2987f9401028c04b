/// Delay applied to the first observed failure, regardless of the job's own
/// base delay.
pub const FIRST_FAILURE_DELAY_SECONDS: i64 = 30;
/// Ceiling on any computed retry delay: two hours.
pub const MAX_DELAY_SECONDS: i64 = 60 * 60 * 2;

/// Exponential backoff between retry attempts.
///
/// The first failure always waits [`FIRST_FAILURE_DELAY_SECONDS`]; from the
/// second attempt on, the delay doubles: `2^(attempts-2) * base`. Capped at
/// [`MAX_DELAY_SECONDS`]. With `base = 30` the sequence is
/// 30, 30, 60, 120, 240, … 7200.
///
/// A base delay of 0 collapses every computed delay to 0 past the fixed
/// first-failure value; that quirk is inherited behavior, kept as is.
pub fn next_delay_seconds(attempts: i64, base_delay_seconds: i64) -> i64 {
    if attempts <= 1 {
        return FIRST_FAILURE_DELAY_SECONDS;
    }
    let base = base_delay_seconds.max(0);
    // exponent clamp keeps the shift in range; the cap dominates long before
    let exponent = (attempts - 2).min(30) as u32;
    let delay = base.saturating_mul(1i64 << exponent);
    delay.min(MAX_DELAY_SECONDS)
}
