use headwatch::Settings;
use std::env;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_env_override_nested_and_top_level() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("settings.toml");
    fs::write(&config_path, "manifest = \".fromfile\"\n[debounce]\nrewrite_ms = 1500\n").unwrap();

    unsafe {
        // Double underscore separates nesting levels
        env::set_var("HEADWATCH_DEBOUNCE__EVENT_MS", "300");
        env::set_var("HEADWATCH_MANIFEST", ".fromenv");
    }

    let settings = Settings::load_from(&config_path).unwrap();

    unsafe {
        env::remove_var("HEADWATCH_DEBOUNCE__EVENT_MS");
        env::remove_var("HEADWATCH_MANIFEST");
    }

    assert_eq!(settings.manifest, ".fromenv", "env wins over file");
    assert_eq!(settings.debounce.event_ms, 300);
    assert_eq!(settings.debounce.rewrite_ms, 1500, "file value kept");
    assert_eq!(settings.event_window(), Duration::from_millis(300));
}

#[test]
fn test_low_windows_are_raised_to_floor() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("settings.toml");
    fs::write(&config_path, "[debounce]\nrewrite_ms = 10\n").unwrap();

    let settings = Settings::load_from(&config_path).unwrap();
    assert_eq!(settings.debounce.rewrite_ms, 10);
    assert_eq!(settings.rewrite_window(), Duration::from_secs(1));
}
