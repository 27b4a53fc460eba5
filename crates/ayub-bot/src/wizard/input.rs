//! Input parsing and validation for wizard replies.

use chrono::NaiveTime;

/// Menu choice in `1..=max`.
pub fn parse_choice(input: &str, max: u32) -> Option<u32> {
    input
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|n| (1..=max).contains(n))
}

/// Digest interval in hours, `1..=24`.
pub fn parse_interval(input: &str) -> Option<u32> {
    input
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|h| (1..=24).contains(h))
}

/// Time of day as `HH:MM`.
pub fn parse_time(input: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(input.trim(), "%H:%M").ok()
}

/// Auto-delete delay as `<int>(m|h)`, in minutes, at least one.
pub fn parse_delete_after(input: &str) -> Option<u32> {
    let input = input.trim().to_lowercase();
    let (idx, unit) = input.char_indices().last()?;
    let amount = input[..idx].trim().parse::<u32>().ok()?;

    let minutes = match unit {
        'm' => amount,
        'h' => amount.checked_mul(60)?,
        _ => return None,
    };

    (minutes >= 1).then_some(minutes)
}

/// Global cancel command.
pub fn is_cancel(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "cancelar" | "cancel")
}

/// Global back command.
pub fn is_back(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "voltar" | "back")
}

/// Yes/no confirmation.
pub fn parse_yes_no(input: &str) -> Option<bool> {
    match input.trim().to_lowercase().as_str() {
        "sim" | "s" | "yes" | "y" => Some(true),
        "não" | "nao" | "n" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_choice_bounds() {
        assert_eq!(parse_choice("1", 6), Some(1));
        assert_eq!(parse_choice(" 6 ", 6), Some(6));
        assert_eq!(parse_choice("0", 6), None);
        assert_eq!(parse_choice("7", 6), None);
        assert_eq!(parse_choice("dois", 6), None);
    }

    #[test]
    fn test_parse_interval_range() {
        assert_eq!(parse_interval("1"), Some(1));
        assert_eq!(parse_interval("24"), Some(24));
        assert_eq!(parse_interval("0"), None);
        assert_eq!(parse_interval("25"), None);
        assert_eq!(parse_interval("30"), None);
        assert_eq!(parse_interval("6h"), None);
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(
            parse_time("22:00"),
            Some(NaiveTime::from_hms_opt(22, 0, 0).unwrap())
        );
        assert_eq!(
            parse_time("7:30"),
            Some(NaiveTime::from_hms_opt(7, 30, 0).unwrap())
        );
        assert_eq!(parse_time("25:00"), None);
        assert_eq!(parse_time("22h"), None);
        assert_eq!(parse_time("22:60"), None);
    }

    #[test]
    fn test_parse_delete_after() {
        assert_eq!(parse_delete_after("30m"), Some(30));
        assert_eq!(parse_delete_after("2h"), Some(120));
        assert_eq!(parse_delete_after("1m"), Some(1));
        assert_eq!(parse_delete_after(" 45M "), Some(45));
        assert_eq!(parse_delete_after("0m"), None);
        assert_eq!(parse_delete_after("0h"), None);
        assert_eq!(parse_delete_after("30"), None);
        assert_eq!(parse_delete_after("m"), None);
        assert_eq!(parse_delete_after("2d"), None);
    }

    #[test]
    fn test_global_commands() {
        assert!(is_cancel("cancelar"));
        assert!(is_cancel("CANCEL"));
        assert!(!is_cancel("cancela tudo"));

        assert!(is_back("voltar"));
        assert!(is_back("Back"));
        assert!(!is_back("volta"));
    }

    #[test]
    fn test_parse_yes_no() {
        assert_eq!(parse_yes_no("sim"), Some(true));
        assert_eq!(parse_yes_no("S"), Some(true));
        assert_eq!(parse_yes_no("não"), Some(false));
        assert_eq!(parse_yes_no("nao"), Some(false));
        assert_eq!(parse_yes_no("talvez"), None);
    }
}
