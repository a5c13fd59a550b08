#[must_use]
pub(super) fn read_env_usize(name: &str, default_value: usize, min_value: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .filter(|value| *value >= min_value)
        .unwrap_or(default_value)
}

#[must_use]
pub(super) fn read_env_f64(name: &str) -> Option<f64> {
    std::env::var(name)
        .ok()
        .and_then(|raw| raw.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite())
}

#[must_use]
pub(super) fn parse_enabled_default_true(raw: Option<&str>) -> bool {
    !matches!(
        raw.map(|value| value.trim().to_ascii_lowercase())
            .as_deref(),
        Some("off" | "none" | "0" | "false")
    )
}
