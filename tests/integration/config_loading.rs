//! Layered configuration: files, environment and explicit overrides.

use crate::integration::{with_isolated_env, write_file};
use slidesmith::cli::RunContext;
use slidesmith::config::ConfigLoader;
use slidesmith::error::ApiError;
use tempfile::TempDir;

#[test]
fn defaults_apply_without_any_file() {
    with_isolated_env(|_| {
        let workspace = TempDir::new().unwrap();
        let config = ConfigLoader::load(workspace.path()).unwrap();
        assert_eq!(config.presentation.requests_per_minute, 60);
        assert_eq!(config.storage.image_prefix, "slides");
        assert!(config.presentation.presentation_id.is_none());
    });
}

#[test]
fn workspace_file_overrides_global_file() {
    with_isolated_env(|config_home| {
        write_file(
            config_home,
            "slidesmith/config.toml",
            r#"
[presentation]
presentation_id = "global-deck"
requests_per_minute = 20

[storage]
bucket = "global-bucket"
"#,
        );
        let workspace = TempDir::new().unwrap();
        write_file(
            workspace.path(),
            "config/config.toml",
            r#"
[presentation]
presentation_id = "workspace-deck"
"#,
        );

        let config = ConfigLoader::load(workspace.path()).unwrap();
        assert_eq!(
            config.presentation.presentation_id.as_deref(),
            Some("workspace-deck")
        );
        // Keys the workspace file leaves alone keep their global values.
        assert_eq!(config.presentation.requests_per_minute, 20);
        assert_eq!(config.storage.bucket, "global-bucket");
    });
}

#[test]
fn environment_file_layers_over_base_file() {
    with_isolated_env(|_| {
        let workspace = TempDir::new().unwrap();
        write_file(
            workspace.path(),
            "config/config.toml",
            "[storage]\nbucket = \"dev-bucket\"\nregion = \"europe-west1\"\nproject_id = \"proj-7\"\n",
        );
        write_file(
            workspace.path(),
            "config/production.toml",
            "[storage]\nbucket = \"prod-bucket\"\n",
        );

        let dev = ConfigLoader::load(workspace.path()).unwrap();
        assert_eq!(dev.storage.bucket, "dev-bucket");

        std::env::set_var("SLIDESMITH_ENV", "production");
        let prod = ConfigLoader::load(workspace.path()).unwrap();
        assert_eq!(prod.storage.bucket, "prod-bucket");
        assert_eq!(prod.storage.region, "europe-west1");
        assert_eq!(prod.storage.project_id.as_deref(), Some("proj-7"));
    });
}

#[test]
fn environment_variables_override_files() {
    with_isolated_env(|_| {
        let workspace = TempDir::new().unwrap();
        write_file(
            workspace.path(),
            "config/config.toml",
            "[presentation]\nrequests_per_minute = 30\n",
        );
        std::env::set_var("SLIDESMITH_PRESENTATION__REQUESTS_PER_MINUTE", "12");
        std::env::set_var("SLIDESMITH_STORAGE__BUCKET", "env-bucket");

        let config = ConfigLoader::load(workspace.path()).unwrap();
        assert_eq!(config.presentation.requests_per_minute, 12);
        assert_eq!(config.storage.bucket, "env-bucket");
    });
}

#[test]
fn explicit_file_beats_environment_and_skips_discovery() {
    with_isolated_env(|config_home| {
        write_file(
            config_home,
            "slidesmith/config.toml",
            "[storage]\nimage_prefix = \"global-prefix\"\n",
        );
        let workspace = TempDir::new().unwrap();
        write_file(
            workspace.path(),
            "config/config.toml",
            "[presentation]\npresentation_id = \"workspace-deck\"\n",
        );
        write_file(
            workspace.path(),
            "ci.toml",
            "[presentation]\nrequests_per_minute = 5\n",
        );
        std::env::set_var("SLIDESMITH_PRESENTATION__REQUESTS_PER_MINUTE", "99");
        std::env::set_var("SLIDESMITH_STORAGE__BUCKET", "env-bucket");

        let explicit = workspace.path().join("ci.toml");
        let config = ConfigLoader::load_with_override(workspace.path(), Some(&explicit)).unwrap();
        assert_eq!(config.presentation.requests_per_minute, 5);
        assert_eq!(config.storage.bucket, "env-bucket");
        assert!(config.presentation.presentation_id.is_none());
        assert_eq!(config.storage.image_prefix, "slides");
    });
}

#[test]
fn missing_explicit_file_is_config_error() {
    with_isolated_env(|_| {
        let workspace = TempDir::new().unwrap();
        let missing = workspace.path().join("nope.toml");
        let err = ConfigLoader::load_with_override(workspace.path(), Some(&missing)).unwrap_err();
        assert!(matches!(err, ApiError::ConfigError(ref m) if m.contains("nope.toml")));
    });
}

#[test]
fn run_context_reports_every_invalid_value() {
    with_isolated_env(|_| {
        let workspace = TempDir::new().unwrap();
        write_file(
            workspace.path(),
            "config/config.toml",
            r#"
[presentation]
requests_per_minute = 0

[retry]
max_attempts = 0

[logging]
format = "xml"
"#,
        );

        let err = match RunContext::new(workspace.path().to_path_buf(), None) {
            Ok(_) => panic!("invalid configuration was accepted"),
            Err(err) => err,
        };
        let message = err.to_string();
        assert!(matches!(err, ApiError::ConfigError(_)));
        assert!(message.contains("requests_per_minute"));
        assert!(message.contains("max_attempts"));
        assert!(message.contains("logging"));
    });
}

#[test]
fn run_context_resolves_paths_against_workspace() {
    with_isolated_env(|_| {
        let workspace = TempDir::new().unwrap();
        write_file(
            workspace.path(),
            "config/config.toml",
            "[presentation]\ncredentials_file = \"secrets/creds.json\"\n",
        );

        let context = RunContext::new(workspace.path().to_path_buf(), None).unwrap();
        assert_eq!(
            context.config().presentation.credentials_file,
            workspace.path().join("secrets/creds.json")
        );
        assert_eq!(
            context.config().presentation.input_file,
            workspace.path().join("slides.json")
        );
    });
}
