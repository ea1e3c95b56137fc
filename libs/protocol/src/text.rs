/// Trims a value and maps empty results to `None`
pub fn trimmed_or_none(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_become_none() {
        assert_eq!(trimmed_or_none(None), None);
        assert_eq!(trimmed_or_none(Some("")), None);
        assert_eq!(trimmed_or_none(Some("   \t")), None);
    }

    #[test]
    fn values_are_trimmed() {
        assert_eq!(trimmed_or_none(Some("  git log  ")), Some("git log".to_string()));
    }
}
