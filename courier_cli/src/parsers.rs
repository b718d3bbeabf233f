use jiff::{SignedDuration, Span, SpanRelativeTo};

/// Parses a budget or service time: a jiff duration ("2m", "PT1H30M"), a span
/// with days ("1 day") or a number of seconds.
///
/// The sign is kept, so a negative value reaches problem validation.
pub fn parse_duration(input: &str) -> Result<SignedDuration, String> {
    let input = input.trim();

    if let Ok(duration) = input.parse::<SignedDuration>() {
        return Ok(duration);
    }

    if let Ok(duration) = input
        .parse::<Span>()
        .and_then(|span| span.to_duration(SpanRelativeTo::days_are_24_hours()))
    {
        return Ok(duration);
    }

    input
        .parse::<i64>()
        .map(SignedDuration::from_secs)
        .map_err(|_| format!("Invalid duration '{input}', expected e.g. \"2m\", \"PT90S\" or \"600\""))
}
