//! Time formatting helpers.

const UNITS: [(u64, &str); 4] = [(86_400, "d"), (3_600, "h"), (60, "m"), (1, "s")];

/// Render a span of seconds as its largest unit plus the next one down,
/// e.g. `2h 3m` or `7d 0h`. Spans under a minute print as plain seconds.
pub fn format_duration(secs: u64) -> String {
    let Some(i) = UNITS.iter().position(|&(size, _)| secs >= size) else {
        return "0s".to_string();
    };
    let (size, unit) = UNITS[i];
    match UNITS.get(i + 1) {
        Some(&(next, next_unit)) => {
            format!("{}{} {}{}", secs / size, unit, (secs % size) / next, next_unit)
        }
        None => format!("{}{}", secs, unit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_the_two_largest_units() {
        assert_eq!(format_duration(42), "42s");
        assert_eq!(format_duration(125), "2m 5s");
        assert_eq!(format_duration(7_380), "2h 3m");
        assert_eq!(format_duration(604_800), "7d 0h");
    }

    #[test]
    fn zero_and_unit_boundaries() {
        assert_eq!(format_duration(0), "0s");
        assert_eq!(format_duration(60), "1m 0s");
        assert_eq!(format_duration(86_399), "23h 59m");
    }
}
