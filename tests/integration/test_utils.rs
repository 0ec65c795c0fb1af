//! Shared test utilities for integration tests
//!
//! Config loading reads process-wide environment variables, so tests that
//! touch them are serialized and get their original values back afterwards.

use std::path::Path;
use std::sync::Mutex;
use tempfile::TempDir;

static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Variables a test may change; all are restored after the closure runs.
const ISOLATED_VARS: [&str; 5] = [
    "XDG_CONFIG_HOME",
    "SLIDESMITH_ENV",
    "SLIDESMITH_ACCESS_TOKEN",
    "SLIDESMITH_PRESENTATION__REQUESTS_PER_MINUTE",
    "SLIDESMITH_STORAGE__BUCKET",
];

/// Run `f` with an empty XDG config home and no SLIDESMITH overrides.
///
/// The closure receives the config home, so tests can place a global
/// `slidesmith/config.toml` under it.
pub fn with_isolated_env<F, R>(f: F) -> R
where
    F: FnOnce(&Path) -> R,
{
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let saved: Vec<(&str, Option<String>)> = ISOLATED_VARS
        .iter()
        .map(|name| (*name, std::env::var(name).ok()))
        .collect();

    let config_home = TempDir::new().unwrap();
    for name in ISOLATED_VARS {
        std::env::remove_var(name);
    }
    std::env::set_var("XDG_CONFIG_HOME", config_home.path());

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| f(config_home.path())));

    for (name, value) in saved {
        match value {
            Some(v) => std::env::set_var(name, v),
            None => std::env::remove_var(name),
        }
    }

    match result {
        Ok(r) => r,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}

/// Write `contents` to `relative` under `root`, creating parent directories.
pub fn write_file(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

/// Document from the reference scenario: one existing slide with one text
/// element and one image element.
pub const SINGLE_SLIDE_DOCUMENT: &str = r#"{
  "slides": [
    {
      "slideNumber": 1,
      "exists": true,
      "elements": {
        "TEXT": [{ "objectId": "t1", "text": "Hello" }],
        "IMAGE": [{ "objectId": "i1", "image_prompt": "a red circle", "aspect_ratio": "1:1" }]
      }
    }
  ]
}"#;
