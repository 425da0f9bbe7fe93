//! Login page E2E scenario runner
//!
//! This crate drives a third-party login page through Playwright:
//! - Models each check as an independent declarative scenario
//! - Fills and submits the login form through one helper action
//! - Compiles every scenario into a single Playwright script run in a fresh
//!   browser context, with expectations retried until a timeout
//! - Reports per-step results as JSON
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Scenario Runner (Rust)                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestRunner                                                 │
//! │    ├── preflight() -> playwright installed, target checked  │
//! │    ├── run_scenario(scenario) -> TestResult                 │
//! │    └── write_results(suite) -> test-results.json            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Scenario (built-in or YAML)                                │
//! │    ├── visit { path, fail_on_status_code }                  │
//! │    ├── login: Option<Credentials>  -> fill, fill, click     │
//! │    ├── actions: [click | fill]                              │
//! │    └── expect: [url | element | cookie | no_cookie | text]  │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod login;
pub mod playwright;
pub mod runner;
pub mod spec;
pub mod suite;
pub mod target;

pub use config::RunnerConfig;
pub use error::{E2eError, E2eResult};
pub use login::{Credentials, LoginForm};
pub use runner::{TestResult, TestRunner, TestSuiteResult};
pub use spec::{Action, Expectation, Scenario, Step, Visit};
