//! Configuration layering: defaults, then file, then environment

use std::io::Write;

use nix_search_client::ClientConfig;

// Environment mutation is process-global and integration tests run in
// parallel, so every layering case lives in this one test.
#[test]
fn test_layering_defaults_file_then_environment() {
    // Defaults only
    let config = ClientConfig::load().unwrap();
    assert_eq!(config.schema_version, 44);
    assert_eq!(config.request_timeout_secs, 30);
    assert_eq!(config.max_retries, 3);
    assert_eq!(config.max_retry_time_secs, 60);
    assert!(!config.debug);

    // File overrides defaults
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nix-search.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(
        file,
        "endpoint = \"https://example.org/search\"\nmax_retries = 7\nfacet_size = 100"
    )
    .unwrap();

    std::env::set_var("NIX_SEARCH_CONFIG", &path);
    let config = ClientConfig::load().unwrap();
    assert_eq!(config.endpoint, "https://example.org/search");
    assert_eq!(config.max_retries, 7);
    assert_eq!(config.facet_size, 100);
    // Untouched fields keep their defaults
    assert_eq!(config.schema_version, 44);

    // Environment overrides file and defaults; the prefix consumes
    // NIX_SEARCH_<FIELD> variables
    std::env::set_var("NIX_SEARCH_MAX_RETRIES", "9");
    std::env::set_var("NIX_SEARCH_DEBUG", "true");
    let config = ClientConfig::load().unwrap();
    assert_eq!(config.max_retries, 9);
    assert!(config.debug);
    // File values not shadowed by the environment still win over defaults
    assert_eq!(config.endpoint, "https://example.org/search");
    assert_eq!(config.facet_size, 100);

    std::env::remove_var("NIX_SEARCH_CONFIG");
    std::env::remove_var("NIX_SEARCH_MAX_RETRIES");
    std::env::remove_var("NIX_SEARCH_DEBUG");
}
