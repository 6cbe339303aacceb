use super::*;
use std::collections::HashMap;

fn from_pairs(pairs: &[(&str, &str)]) -> HubConfig {
    let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    HubConfig::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn empty_environment_uses_defaults() {
    assert_eq!(from_pairs(&[]), HubConfig::default());
    let cfg = HubConfig::default();
    assert_eq!(cfg.port, 3000);
    assert_eq!(cfg.idle_ttl, Some(Duration::from_secs(86_400)));
    assert_eq!((cfg.default_width, cfg.default_height), (800, 500));
}

#[test]
fn overrides_are_parsed() {
    let cfg = from_pairs(&[
        ("PORT", "8080"),
        ("WHITEBOARD_IDLE_TTL_SECS", "60"),
        ("WHITEBOARD_SWEEP_INTERVAL_SECS", "5"),
        ("SUBSCRIBER_CHANNEL_CAPACITY", "16"),
        ("DEFAULT_CANVAS_WIDTH", "1024"),
        ("DEFAULT_CANVAS_HEIGHT", " 768 "),
    ]);
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.idle_ttl, Some(Duration::from_secs(60)));
    assert_eq!(cfg.sweep_interval, Duration::from_secs(5));
    assert_eq!(cfg.subscriber_capacity, 16);
    assert_eq!((cfg.default_width, cfg.default_height), (1024, 768));
}

#[test]
fn zero_ttl_disables_eviction() {
    assert_eq!(from_pairs(&[("WHITEBOARD_IDLE_TTL_SECS", "0")]).idle_ttl, None);
}

#[test]
fn unparsable_or_zero_values_fall_back() {
    let cfg = from_pairs(&[
        ("PORT", "http"),
        ("SUBSCRIBER_CHANNEL_CAPACITY", "0"),
        ("WHITEBOARD_SWEEP_INTERVAL_SECS", "-3"),
        ("DEFAULT_CANVAS_WIDTH", "0"),
    ]);
    assert_eq!(cfg.port, DEFAULT_PORT);
    assert_eq!(cfg.subscriber_capacity, 1);
    assert_eq!(cfg.sweep_interval, Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS));
    assert_eq!(cfg.default_width, DEFAULT_WIDTH);
}
