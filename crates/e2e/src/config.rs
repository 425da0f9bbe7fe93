//! Runner configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{E2eError, E2eResult};
use crate::login::LoginForm;
use crate::playwright::{Browser, PlaywrightConfig};
use crate::target::ReachabilityConfig;

/// Configuration for the scenario runner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Base URL of the page under test
    pub base_url: String,

    pub browser: Browser,

    pub headless: bool,

    pub viewport: Viewport,

    /// Implicit wait for actions and expectations
    pub command_timeout_ms: u64,

    /// Login form selectors
    pub login_form: LoginForm,

    /// Directory of YAML scenarios; the built-in suite is used when unset
    pub specs_dir: Option<PathBuf>,

    /// Output directory for results and screenshots
    pub output_dir: PathBuf,

    /// Directory whose node_modules provides `playwright`
    pub node_dir: PathBuf,

    pub reachability: ReachabilityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { width: 1280, height: 720 }
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.saucedemo.com".to_string(),
            browser: Browser::Chromium,
            headless: true,
            viewport: Viewport::default(),
            command_timeout_ms: 4000,
            login_form: LoginForm::default(),
            specs_dir: None,
            output_dir: PathBuf::from("test-results"),
            node_dir: PathBuf::from("."),
            reachability: ReachabilityConfig::default(),
        }
    }
}

impl RunnerConfig {
    /// Load configuration from file, falling back to defaults when absent
    pub fn load(path: &Path) -> E2eResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> E2eResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> E2eResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(E2eError::InvalidConfig(format!(
                "base_url must be an http(s) URL: {}",
                self.base_url
            )));
        }
        if self.command_timeout_ms == 0 {
            return Err(E2eError::InvalidConfig(
                "command_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn screenshot_dir(&self) -> PathBuf {
        self.output_dir.join("screenshots")
    }

    /// Browser settings derived from this configuration
    pub fn playwright(&self) -> PlaywrightConfig {
        PlaywrightConfig {
            base_url: self.base_url.clone(),
            screenshot_dir: self.screenshot_dir(),
            node_dir: self.node_dir.clone(),
            viewport_width: self.viewport.width,
            viewport_height: self.viewport.height,
            browser: self.browser,
            headless: self.headless,
            command_timeout_ms: self.command_timeout_ms,
        }
    }
}
