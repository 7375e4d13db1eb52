//! Test configuration builder writing `main.toml` into a temp directory

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Builder for creating test configurations
pub struct TestConfigBuilder {
    temp_dir: TempDir,
    main_config: MainConfigBuilder,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self {
            temp_dir,
            main_config: MainConfigBuilder::default(),
        }
    }

    /// Configure main settings
    pub fn with_main_config<F>(mut self, f: F) -> Self
    where
        F: FnOnce(MainConfigBuilder) -> MainConfigBuilder,
    {
        self.main_config = f(self.main_config);
        self
    }

    /// Build and write config files to temp directory
    pub fn build(self) -> TestConfig {
        let config_dir = self.temp_dir.path().join("config");
        fs::create_dir_all(&config_dir).expect("Failed to create config dir");
        fs::write(config_dir.join("main.toml"), self.main_config.to_toml())
            .expect("Failed to write main.toml");

        TestConfig {
            _temp_dir: self.temp_dir,
            config_dir,
        }
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Main configuration builder
#[derive(Clone)]
pub struct MainConfigBuilder {
    port: u16,
    worker_threads: usize,
    update_frequency_seconds: u64,
    alarm_webhook_url: Option<String>,
    reference_host: String,
    reference_port: u16,
}

impl MainConfigBuilder {
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads;
        self
    }

    pub fn update_frequency(mut self, seconds: u64) -> Self {
        self.update_frequency_seconds = seconds;
        self
    }

    pub fn alarm_webhook(mut self, url: &str) -> Self {
        self.alarm_webhook_url = Some(url.to_string());
        self
    }

    pub fn reference(mut self, host: &str, port: u16) -> Self {
        self.reference_host = host.to_string();
        self.reference_port = port;
        self
    }

    fn to_toml(&self) -> String {
        let webhook = self.alarm_webhook_url.as_deref().unwrap_or("");
        format!(
            r#"
port = {}
worker_threads = {}
update_frequency_seconds = {}
alarm_webhook_url = "{}"

[reference]
host = "{}"
api_port = {}
"#,
            self.port,
            self.worker_threads,
            self.update_frequency_seconds,
            webhook,
            self.reference_host,
            self.reference_port
        )
    }
}

impl Default for MainConfigBuilder {
    fn default() -> Self {
        Self {
            port: 8095,
            worker_threads: 8,
            update_frequency_seconds: 10,
            alarm_webhook_url: None,
            reference_host: "fullnode.mainnet.example.org".to_string(),
            reference_port: 443,
        }
    }
}

/// Built test configuration with temp directory
pub struct TestConfig {
    _temp_dir: TempDir,
    pub config_dir: PathBuf,
}

impl TestConfig {
    /// Config directory as `ConfigManager::new` expects it
    pub fn config_dir(&self) -> String {
        self.config_dir.to_string_lossy().to_string()
    }
}
