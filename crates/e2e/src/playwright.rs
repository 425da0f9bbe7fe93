//! Playwright browser automation
//!
//! A scenario's steps are compiled into a single Node script that runs in a
//! fresh browser and context, so cookies and storage never leak between
//! scenarios. The script prints one JSON line per executed step.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use tokio::process::Command as TokioCommand;
use tracing::debug;

use crate::error::{E2eError, E2eResult};
use crate::spec::{ChildCount, Expectation, Step, Visit};

/// Playwright browser handle
pub struct PlaywrightHandle {
    /// Base URL of the page under test
    base_url: String,

    /// Directory for failure screenshots
    screenshot_dir: PathBuf,

    /// Directory whose node_modules provides `playwright`
    node_dir: PathBuf,

    /// Viewport dimensions
    viewport_width: u32,
    viewport_height: u32,

    /// Browser type
    browser: Browser,

    headless: bool,

    /// Implicit wait applied to every action and expectation
    command_timeout_ms: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

impl FromStr for Browser {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chromium" | "chrome" => Ok(Browser::Chromium),
            "firefox" => Ok(Browser::Firefox),
            "webkit" | "safari" => Ok(Browser::Webkit),
            other => Err(E2eError::InvalidConfig(format!("unknown browser: {}", other))),
        }
    }
}

/// Result of executing a scenario step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    pub success: bool,
    pub step_name: String,
    pub duration_ms: u64,
    pub error: Option<String>,
}

/// Everything one script run produced
#[derive(Debug, Clone)]
pub struct ScriptOutcome {
    pub steps: Vec<StepResult>,
    pub screenshot_path: Option<PathBuf>,
}

/// One line of script output
#[derive(Debug, Deserialize)]
struct StepReport {
    step: usize,
    ok: bool,
    #[serde(default)]
    ms: u64,
    #[serde(default)]
    error: Option<String>,
}

impl PlaywrightHandle {
    /// Create a new Playwright handle
    pub fn new(config: PlaywrightConfig) -> Self {
        Self {
            base_url: config.base_url,
            screenshot_dir: config.screenshot_dir,
            node_dir: config.node_dir,
            viewport_width: config.viewport_width,
            viewport_height: config.viewport_height,
            browser: config.browser,
            headless: config.headless,
            command_timeout_ms: config.command_timeout_ms,
        }
    }

    /// Check if Playwright is installed
    pub fn check_playwright_installed(&self) -> E2eResult<()> {
        let output = Command::new("npx")
            .args(["playwright", "--version"])
            .current_dir(&self.node_dir)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match output {
            Ok(status) if status.success() => Ok(()),
            _ => Err(E2eError::PlaywrightNotFound),
        }
    }

    pub fn screenshot_path(&self, slug: &str) -> PathBuf {
        self.screenshot_dir.join(format!("{}.png", slug))
    }

    /// Absolute URL for a path on the page under test
    pub fn url_for(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }

    /// Build the Playwright script for a scenario's steps
    pub fn build_script(&self, slug: &str, steps: &[Step]) -> String {
        let mut script = String::new();

        // Header
        script.push_str(&format!(r#"
const {{ chromium, firefox, webkit }} = require('playwright');

const TIMEOUT_MS = {timeout};

function report(step, ok, ms, error) {{
  const line = {{ step, ok, ms }};
  if (error !== undefined) line.error = error;
  console.log(JSON.stringify(line));
}}

function expectThat(condition, message) {{
  if (!condition) throw new Error(message);
}}

async function retry(check) {{
  const deadline = Date.now() + TIMEOUT_MS;
  for (;;) {{
    try {{
      return await check();
    }} catch (error) {{
      if (Date.now() >= deadline) throw error;
      await new Promise((resolve) => setTimeout(resolve, 100));
    }}
  }}
}}

(async () => {{
  let browser;
  try {{
    browser = await {browser}.launch({{ headless: {headless} }});
    const context = await browser.newContext({{
      viewport: {{ width: {width}, height: {height} }}
    }});
    const page = await context.newPage();
    page.setDefaultTimeout(TIMEOUT_MS);
    let step = 0;
    let started = Date.now();

    try {{
"#,
            timeout = self.command_timeout_ms,
            browser = self.browser.as_str(),
            headless = self.headless,
            width = self.viewport_width,
            height = self.viewport_height,
        ));

        for (i, step) in steps.iter().enumerate() {
            script.push_str(&format!("\n    // Step {}: {}\n", i + 1, step.name()));
            script.push_str(&format!("    step = {};\n    started = Date.now();\n", i));
            script.push_str(&self.step_to_js(step));
            script.push_str(&format!("\n    report({}, true, Date.now() - started);\n", i));
        }

        // Footer
        script.push_str(&format!(r#"
    }} catch (error) {{
      report(step, false, Date.now() - started, error.message);
      try {{
        await page.screenshot({{ path: {screenshot}, fullPage: true }});
      }} catch (_) {{}}
      process.exitCode = 1;
    }}
  }} finally {{
    // Setup failures leave `browser` unset and fall through to the crash handler.
    if (browser) {{
      await browser.close().catch(() => {{}});
    }}
  }}
}})().catch((error) => {{
  console.error(error && error.stack ? error.stack : String(error));
  process.exit(2);
}});
"#,
            screenshot = js_str(&self.screenshot_path(slug).to_string_lossy()),
        ));

        script
    }

    /// Convert a step to JavaScript code
    fn step_to_js(&self, step: &Step) -> String {
        match step {
            Step::Visit(visit) => self.visit_to_js(visit),
            Step::Fill { selector, value } => {
                format!("    await page.fill({}, {});", js_str(selector), js_str(value))
            }
            Step::Click { selector } => {
                format!("    await page.click({});", js_str(selector))
            }
            Step::Expect(expectation) => self.expectation_to_js(expectation),
        }
    }

    fn visit_to_js(&self, visit: &Visit) -> String {
        let url = js_str(&self.url_for(&visit.path));
        let mut js = format!("    {{\n      const response = await page.goto({});", url);
        if visit.fail_on_status_code {
            js.push_str(&format!(r#"
      if (response && response.status() >= 400) {{
        throw new Error('visit ' + {url} + ' returned status ' + response.status());
      }}"#,
                url = url,
            ));
        }
        js.push_str("\n    }");
        js
    }

    fn expectation_to_js(&self, expectation: &Expectation) -> String {
        let body = match expectation {
            Expectation::UrlEquals { path } => {
                let url = js_str(&self.url_for(path));
                format!(
                    "      expectThat(page.url() === {url}, 'expected url ' + {url} + ', got ' + page.url());",
                    url = url
                )
            }
            Expectation::UrlNotEquals { path } => {
                let url = js_str(&self.url_for(path));
                format!(
                    "      expectThat(page.url() !== {url}, 'expected url not to be ' + {url});",
                    url = url
                )
            }
            Expectation::Element {
                selector,
                has_class,
                lacks_class,
                attribute,
                children,
            } => {
                let sel = js_str(selector);
                let mut checks = vec![format!(
                    "      const el = await page.$({sel});\n      expectThat(el !== null, 'expected element ' + {sel} + ' to exist');",
                    sel = sel
                )];

                if let Some(class) = has_class {
                    checks.push(format!(
                        "      expectThat(await el.evaluate((node, c) => node.classList.contains(c), {class}), 'expected ' + {sel} + ' to have class ' + {class});",
                        sel = sel,
                        class = js_str(class)
                    ));
                }
                if let Some(class) = lacks_class {
                    checks.push(format!(
                        "      expectThat(!(await el.evaluate((node, c) => node.classList.contains(c), {class})), 'expected ' + {sel} + ' not to have class ' + {class});",
                        sel = sel,
                        class = js_str(class)
                    ));
                }
                if let Some(attr) = attribute {
                    checks.push(format!(
                        "      const attr = await el.getAttribute({name});\n      expectThat(attr === {value}, 'expected ' + {sel} + ' attribute ' + {name} + ' to be ' + {value} + ', got ' + attr);",
                        sel = sel,
                        name = js_str(&attr.name),
                        value = js_str(&attr.value)
                    ));
                }
                if let Some(count) = children {
                    let (condition, wanted) = match count {
                        ChildCount::Equals(n) => (format!("count === {}", n), format!("{}", n)),
                        ChildCount::GreaterThan(n) => (format!("count > {}", n), format!("more than {}", n)),
                    };
                    checks.push(format!(
                        "      const count = await el.evaluate((node) => node.children.length);\n      expectThat({condition}, 'expected ' + {sel} + ' to have {wanted} children, got ' + count);",
                        condition = condition,
                        sel = sel,
                        wanted = wanted
                    ));
                }

                checks.join("\n")
            }
            Expectation::Cookie { name, value } => {
                let name = js_str(name);
                let mut js = format!(
                    "      const cookie = (await context.cookies()).find((c) => c.name === {name});\n      expectThat(cookie !== undefined, 'expected cookie ' + {name} + ' to exist');",
                    name = name
                );
                if let Some(value) = value {
                    js.push_str(&format!(
                        "\n      expectThat(cookie.value === {value}, 'expected cookie ' + {name} + ' to be ' + {value} + ', got ' + cookie.value);",
                        name = name,
                        value = js_str(value)
                    ));
                }
                js
            }
            Expectation::NoCookie { name } => {
                format!(
                    "      const cookie = (await context.cookies()).find((c) => c.name === {name});\n      expectThat(cookie === undefined, 'expected cookie ' + {name} + ' not to exist');",
                    name = js_str(name)
                )
            }
            Expectation::ContainsText { text } => {
                format!(
                    "      const text = await page.evaluate(() => (document.body ? document.body.innerText : ''));\n      expectThat(text.includes({text}), 'expected page to contain ' + {text});",
                    text = js_str(text)
                )
            }
        };

        format!("    await retry(async () => {{\n{}\n    }});", body)
    }

    /// Execute a script via Node and collect step results
    pub async fn run_script(&self, slug: &str, steps: &[Step], script: &str) -> E2eResult<ScriptOutcome> {
        std::fs::create_dir_all(&self.screenshot_dir)?;

        // Inside node_dir so `require('playwright')` resolves from its node_modules
        let temp_dir = tempfile::Builder::new()
            .prefix(".login-e2e-")
            .tempdir_in(&self.node_dir)?;
        let script_path = temp_dir.path().join(format!("{}.js", slug));
        std::fs::write(&script_path, script)?;

        debug!("Running Playwright script: {}", script_path.display());

        let output = TokioCommand::new("node")
            .arg(&script_path)
            .current_dir(&self.node_dir)
            .output()
            .await?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let steps = collect_step_results(steps, &stdout, &stderr, output.status.success())?;

        let screenshot_path = if steps.iter().any(|s| !s.success) {
            Some(self.screenshot_path(slug)).filter(|p| p.exists())
        } else {
            None
        };

        Ok(ScriptOutcome { steps, screenshot_path })
    }

    /// Compile and run a scenario's steps
    pub async fn execute(&self, slug: &str, steps: &[Step]) -> E2eResult<ScriptOutcome> {
        let script = self.build_script(slug, steps);
        self.run_script(slug, steps, &script).await
    }

    pub fn node_dir(&self) -> &Path {
        &self.node_dir
    }
}

/// Map script output onto steps.
///
/// The script stops at the first failing step, so later steps are absent.
/// A run that neither completed nor reported a failure crashed, and that is
/// an error rather than a failed scenario.
pub fn collect_step_results(
    steps: &[Step],
    stdout: &str,
    stderr: &str,
    exited_ok: bool,
) -> E2eResult<Vec<StepResult>> {
    let mut results = Vec::with_capacity(steps.len());

    for line in stdout.lines() {
        let Ok(report) = serde_json::from_str::<StepReport>(line.trim()) else {
            continue;
        };
        let step = steps.get(report.step).ok_or_else(|| {
            E2eError::Playwright(format!("script reported unknown step {}", report.step))
        })?;

        results.push(StepResult {
            success: report.ok,
            step_name: step.name(),
            duration_ms: report.ms,
            error: report.error,
        });

        if !report.ok {
            return Ok(results);
        }
    }

    if !exited_ok || results.len() != steps.len() {
        return Err(E2eError::Playwright(format!(
            "Script failed after {} of {} steps:\nstdout: {}\nstderr: {}",
            results.len(),
            steps.len(),
            stdout,
            stderr
        )));
    }

    Ok(results)
}

/// Encode a string as a JavaScript string literal
fn js_str(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

/// Configuration for Playwright
#[derive(Debug, Clone)]
pub struct PlaywrightConfig {
    pub base_url: String,
    pub screenshot_dir: PathBuf,
    pub node_dir: PathBuf,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub browser: Browser,
    pub headless: bool,
    pub command_timeout_ms: u64,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.saucedemo.com".to_string(),
            screenshot_dir: PathBuf::from("test-results/screenshots"),
            node_dir: PathBuf::from("."),
            viewport_width: 1280,
            viewport_height: 720,
            browser: Browser::Chromium,
            headless: true,
            command_timeout_ms: 4000,
        }
    }
}
