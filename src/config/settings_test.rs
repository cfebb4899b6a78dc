use crate::config::settings::Settings;

#[test]
fn defaults_cover_every_section() {
    let settings = Settings::with_overrides(&[]).expect("defaults should deserialize");

    assert_eq!(settings.server.port, 3000);
    assert_eq!(settings.auth.min_password_length, 8);
    assert_eq!(settings.llm.model, "gpt-4-turbo-preview");
    assert_eq!(settings.llm.max_tokens, 4096);
    assert!(settings.llm.api_key.is_none());
    assert_eq!(settings.sources.arxiv.min_interval_ms, 3000);
    assert_eq!(settings.sources.semantic_scholar.min_interval_ms, 1000);
    assert_eq!(settings.sources.cache_capacity, 128);
    assert_eq!(settings.generation.max_papers, 100);
    assert_eq!(settings.logging.format, "pretty");
}

#[test]
fn overrides_replace_defaults() {
    let settings = Settings::with_overrides(&[
        ("database.url", "sqlite::memory:"),
        ("llm.api_key", "sk-test"),
        ("sources.crossref.enabled", "false"),
    ])
    .expect("overrides should deserialize");

    assert_eq!(settings.database.url, "sqlite::memory:");
    assert_eq!(settings.llm.api_key.as_deref(), Some("sk-test"));
    assert!(!settings.sources.crossref.enabled);
    assert!(settings.sources.arxiv.enabled);
}
