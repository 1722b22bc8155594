#[cfg(test)]
mod tests {
    use super::super::*;

    #[test]
    fn test_default_bind_address() {
        assert_eq!(default_bind(), "0.0.0.0:3000");
    }

    #[test]
    fn test_default_models_follow_backend_defaults() {
        assert_eq!(default_model(), DEFAULT_TEXT_MODEL);
        assert_eq!(default_tts_model(), DEFAULT_TTS_MODEL);
        assert_eq!(default_image_model(), DEFAULT_IMAGE_MODEL);
        assert_eq!(default_voice(), "Kore");
    }

    #[test]
    fn test_minimal_config_parses_with_defaults() {
        let config: Config = toml::from_str(
            "[server]\n\
             [gemini]\n\
             [store]\n",
        )
        .unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:3000");
        assert!(config.gemini.api_key.is_empty());
        assert_eq!(config.gemini.voice, "Kore");
        assert_eq!(config.store.path, "./data");
    }

    #[test]
    fn test_explicit_values_win_over_defaults() {
        let config: Config = toml::from_str(
            "[server]\n\
             bind = \"127.0.0.1:8080\"\n\
             [gemini]\n\
             api_key = \"AIza-test\"\n\
             voice = \"Puck\"\n\
             [store]\n\
             path = \"/var/lib/nursesim\"\n",
        )
        .unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert_eq!(config.gemini.api_key, "AIza-test");
        assert_eq!(config.gemini.voice, "Puck");
        assert_eq!(config.gemini.model, DEFAULT_TEXT_MODEL);
        assert_eq!(config.store.path, "/var/lib/nursesim");
    }
}
