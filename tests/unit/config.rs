use kaspa_utxo_manager::foundation::UtxoError;
use kaspa_utxo_manager::infrastructure::config::{
    UtxoManagerConfig, CACHE_EXPIRY_MS_ENV, MASS_LIMIT_BUFFER_ENV, MAX_INPUTS_PER_TX_ENV, MIN_UTXO_AGE_BLOCKS_ENV,
};

#[test]
fn test_defaults_match_documented_values() {
    let config = UtxoManagerConfig::default();
    assert_eq!(config.min_utxo_age_blocks, 10);
    assert_eq!(config.max_inputs_per_tx, 5);
    assert_eq!(config.consolidation_threshold, 10);
    assert_eq!(config.mass_limit_buffer, 0.9);
    assert_eq!(config.max_mass_bytes, 100_000);
    assert_eq!(config.cache_expiry_ms, 10_000);
}

// Env manipulation is process-global, so every from_env case runs inside
// this single test.
#[test]
fn test_from_env_overrides_and_rejects_garbage() {
    std::env::set_var(MIN_UTXO_AGE_BLOCKS_ENV, "25");
    std::env::set_var(MAX_INPUTS_PER_TX_ENV, "8");
    std::env::set_var(MASS_LIMIT_BUFFER_ENV, "0.8");
    std::env::set_var(CACHE_EXPIRY_MS_ENV, " 5000 ");

    let config = UtxoManagerConfig::from_env().expect("config");
    assert_eq!(config.min_utxo_age_blocks, 25);
    assert_eq!(config.max_inputs_per_tx, 8);
    assert_eq!(config.mass_limit_buffer, 0.8);
    assert_eq!(config.cache_expiry_ms, 5_000);
    // Untouched vars keep their defaults.
    assert_eq!(config.max_mass_bytes, 100_000);

    // Empty values are ignored, not errors.
    std::env::set_var(MIN_UTXO_AGE_BLOCKS_ENV, "");
    let config = UtxoManagerConfig::from_env().expect("config");
    assert_eq!(config.min_utxo_age_blocks, 10);

    // Garbage is a configuration error, not a silent default.
    std::env::set_var(MAX_INPUTS_PER_TX_ENV, "five");
    let err = UtxoManagerConfig::from_env().unwrap_err();
    assert!(matches!(err, UtxoError::ConfigError(_)));
    assert!(err.to_string().contains(MAX_INPUTS_PER_TX_ENV));

    std::env::remove_var(MIN_UTXO_AGE_BLOCKS_ENV);
    std::env::remove_var(MAX_INPUTS_PER_TX_ENV);
    std::env::remove_var(MASS_LIMIT_BUFFER_ENV);
    std::env::remove_var(CACHE_EXPIRY_MS_ENV);
}
