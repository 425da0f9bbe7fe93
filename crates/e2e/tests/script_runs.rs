//! Runs generated scripts through `node` against a stand-in `playwright`
//! module, so the execution path is covered without a real browser.

use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};

use login_e2e::playwright::Browser;
use login_e2e::spec::{Expectation, Scenario, Visit};
use login_e2e::suite;
use login_e2e::{LoginForm, RunnerConfig, TestRunner};

/// Minimal in-memory page: the login form, the session cookie and the
/// "Username is required" prompt. Firefox fails to launch.
const FAKE_PLAYWRIGHT: &str = r#"
const fs = require('fs');

function makePage(context) {
  const fields = {};
  const known = ['#user-name', '#password', '#login-button'];
  let url = 'about:blank';
  let text = '';

  return {
    setDefaultTimeout() {},
    async goto(target) {
      url = target;
      return { status: () => 200 };
    },
    async fill(selector, value) {
      fields[selector] = value;
    },
    async click(selector) {
      if (selector !== '#login-button') throw new Error('no element ' + selector);
      if (!fields['#user-name']) {
        text = 'Epic sadface: Username is required';
        return;
      }
      if (fields['#user-name'] === 'standard_user' && fields['#password'] === 'secret_sauce') {
        context.jar.push({ name: 'session-username', value: fields['#user-name'] });
        url = url.replace(/\/$/, '') + '/inventory.html';
      }
    },
    url() {
      return url;
    },
    async $(selector) {
      if (!known.includes(selector)) return null;
      const node = { classList: { contains: () => false }, children: [] };
      return {
        async evaluate(fn, arg) {
          return fn(node, arg);
        },
        async getAttribute(name) {
          return selector === '#password' && name === 'type' ? 'password' : null;
        },
      };
    },
    async evaluate(fn) {
      globalThis.document = { body: { innerText: text } };
      return fn();
    },
    async screenshot({ path }) {
      fs.writeFileSync(path, 'png');
    },
  };
}

function browserType(name) {
  return {
    async launch() {
      if (name === 'firefox') throw new Error('firefox is not installed');
      return {
        async newContext() {
          const context = {
            jar: [],
            async cookies() {
              return context.jar;
            },
          };
          context.newPage = async () => makePage(context);
          return context;
        },
        async close() {},
      };
    },
  };
}

module.exports = {
  chromium: browserType('chromium'),
  firefox: browserType('firefox'),
  webkit: browserType('webkit'),
};
"#;

fn node_available() -> bool {
    Command::new("node")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

fn runner(dir: &Path, browser: Browser) -> TestRunner {
    let module_dir = dir.join("node_modules/playwright");
    fs::create_dir_all(&module_dir).unwrap();
    fs::write(module_dir.join("index.js"), FAKE_PLAYWRIGHT).unwrap();

    TestRunner::with_config(RunnerConfig {
        base_url: "http://login.test".to_string(),
        browser,
        command_timeout_ms: 300,
        node_dir: dir.to_path_buf(),
        output_dir: dir.join("out"),
        ..Default::default()
    })
}

fn builtin(name: &str) -> Scenario {
    suite::builtin()
        .into_iter()
        .find(|s| s.name == name)
        .unwrap()
}

#[tokio::test]
async fn passing_scenarios_report_every_step() {
    if !node_available() {
        eprintln!("skipping: node not found");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let runner = runner(dir.path(), Browser::Chromium);

    for name in [
        "should create a session cookie with username on successful login",
        "should not display the password on screen",
        "should prompt user when no username is provided",
    ] {
        let scenario = builtin(name);
        let result = runner.run_scenario(&scenario).await;

        assert!(result.success, "{}: {:?}", name, result.error);
        assert_eq!(
            result.steps.len(),
            scenario.steps(&LoginForm::default()).len(),
            "{} skipped steps",
            name
        );
        assert!(result.screenshot_path.is_none());
    }

    // Scripts run from temp directories that are removed afterwards.
    let leftovers = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with(".login-e2e-"))
        .count();
    assert_eq!(leftovers, 0);
}

#[tokio::test]
async fn failing_scenario_stops_and_keeps_screenshot() {
    if !node_available() {
        eprintln!("skipping: node not found");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let runner = runner(dir.path(), Browser::Chromium);

    // The fake page never marks fields with the error class.
    let scenario = builtin("should provide feedback when account details are invalid");
    let result = runner.run_scenario(&scenario).await;

    assert!(!result.success);
    assert_eq!(result.steps.len(), 5);
    assert!(result.steps[..4].iter().all(|s| s.success));
    assert_eq!(result.steps[4].step_name, "expect:element:#user-name");
    assert_eq!(
        result.error.as_deref(),
        Some("Step failed: expect:element:#user-name - expected #user-name to have class error")
    );

    let screenshot = result.screenshot_path.expect("screenshot recorded");
    assert!(Path::new(&screenshot).is_absolute());
    assert!(Path::new(&screenshot).exists());
    assert!(screenshot.ends_with("out/screenshots/should-provide-feedback-when-account-details-are-invalid.png"));
}

#[tokio::test]
async fn missing_element_fails_with_message() {
    if !node_available() {
        eprintln!("skipping: node not found");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let runner = runner(dir.path(), Browser::Chromium);

    let scenario = Scenario::new("logout link before login", Visit::path("/"))
        .expect(Expectation::exists("#logout_sidebar_link"));
    let result = runner.run_scenario(&scenario).await;

    assert!(!result.success);
    assert!(result
        .error
        .as_deref()
        .unwrap()
        .contains("expected element #logout_sidebar_link to exist"));
}

#[tokio::test]
async fn crashed_script_is_folded_into_result() {
    if !node_available() {
        eprintln!("skipping: node not found");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let runner = runner(dir.path(), Browser::Firefox);

    let scenario = builtin("should display login form elements");
    let result = runner.run_scenario(&scenario).await;

    assert!(!result.success);
    assert!(result.steps.is_empty());
    assert!(result.screenshot_path.is_none());
    let error = result.error.unwrap();
    assert!(error.starts_with("Playwright error: Script failed after 0 of 4 steps"), "{}", error);
    assert!(error.contains("firefox is not installed"), "{}", error);
}
