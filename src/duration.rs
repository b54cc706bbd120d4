/// Formats a number of seconds as `"{h}h {m}m {s}s"`.
///
/// Hours are not wrapped into days, so a month of downtime reads `720h 0m 0s`.
pub fn format_duration(total_seconds: u64) -> String {
    let (minutes, seconds) = (total_seconds / 60, total_seconds % 60);
    let (hours, minutes) = (minutes / 60, minutes % 60);
    format!("{hours}h {minutes}m {seconds}s")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_format_duration_examples() {
        assert_eq!(format_duration(0), "0h 0m 0s");
        assert_eq!(format_duration(59), "0h 0m 59s");
        assert_eq!(format_duration(3725), "1h 2m 5s");
        assert_eq!(format_duration(90_000), "25h 0m 0s");
    }

    fn parse(formatted: &str) -> (u64, u64, u64) {
        let parts: Vec<u64> = formatted
            .split(' ')
            .map(|p| p[..p.len() - 1].parse().unwrap())
            .collect();
        (parts[0], parts[1], parts[2])
    }

    proptest! {
        #[test]
        fn test_format_duration_decomposes(s in 0u64..10_000_000_000) {
            let (hh, mm, ss) = parse(&format_duration(s));
            prop_assert!(mm < 60);
            prop_assert!(ss < 60);
            prop_assert_eq!(hh * 3600 + mm * 60 + ss, s);
        }
    }
}
