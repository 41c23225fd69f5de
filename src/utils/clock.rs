//! `MM:SS` clock formatting and parsing for countdown durations

/// Format remaining time for display, rounding partial seconds up so a
/// countdown only shows `00:00` once it has actually run out
pub fn format_remaining(ms: u64) -> String {
    format_seconds(ms.div_ceil(1000))
}

/// Format a configured duration, truncating partial seconds
pub fn format_duration(ms: u64) -> String {
    format_seconds(ms / 1000)
}

fn format_seconds(total_seconds: u64) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Parse a user-entered duration into milliseconds.
///
/// Accepts `MM:SS`, or bare digits where the last two digits are seconds
/// (`90` is ninety seconds, `130` is 1:30). Returns `None` for anything
/// unparseable or for a zero duration.
pub fn parse_duration(input: &str) -> Option<u64> {
    let input = input.trim();
    let (minutes, seconds) = match input.split_once(':') {
        Some((min, sec)) => (parse_part(min)?, parse_part(sec)?),
        None => {
            if input.is_empty() || !input.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            if input.len() <= 2 {
                (0, input.parse().ok()?)
            } else {
                let (min, sec) = input.split_at(input.len() - 2);
                (min.parse().ok()?, sec.parse().ok()?)
            }
        }
    };

    let total_ms = minutes.checked_mul(60)?.checked_add(seconds)?.checked_mul(1000)?;
    (total_ms > 0).then_some(total_ms)
}

fn parse_part(part: &str) -> Option<u64> {
    let part = part.trim();
    if part.is_empty() {
        Some(0)
    } else {
        part.parse().ok()
    }
}
