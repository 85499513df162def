use beacon_config::{AppConfig, CooldownBackend, DEFAULT_COOLDOWN_MS, StorageBackend};

// 环境变量是进程级共享状态，全部断言放在同一个测试里顺序执行。
#[test]
fn load_config_from_env() {
    // Rust 2024 中 set_var 需要显式标注 unsafe（测试进程内可控）。
    unsafe {
        std::env::set_var("BEACON_STORAGE", "postgres");
        std::env::remove_var("BEACON_DATABASE_URL");
    }
    let err = AppConfig::from_env().expect_err("database url required");
    assert_eq!(err.to_string(), "missing required env: BEACON_DATABASE_URL");

    unsafe {
        std::env::set_var("BEACON_STORAGE", "memory");
        std::env::set_var("BEACON_HTTP_ADDR", "127.0.0.1:8081");
        std::env::set_var("BEACON_COOLDOWN_MS", "120000");
    }
    let config = AppConfig::from_env().expect("config");
    assert_eq!(config.http_addr, "127.0.0.1:8081");
    assert_eq!(config.storage, StorageBackend::Memory);
    assert_eq!(config.cooldown_backend, CooldownBackend::Store);
    assert_eq!(config.cooldown_ms, 120_000);
    assert_eq!(config.boundary_cooldown_ms, DEFAULT_COOLDOWN_MS);
    assert_eq!(config.boundary_scan_limit, 10);
    assert!(config.notify_enabled);

    unsafe {
        std::env::set_var("BEACON_COOLDOWN_MS", "0");
    }
    let err = AppConfig::from_env().expect_err("cooldown must be positive");
    assert_eq!(err.to_string(), "invalid value for BEACON_COOLDOWN_MS: 0");
}
