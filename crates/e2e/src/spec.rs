//! Declarative scenario model

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{E2eError, E2eResult};
use crate::login::{Credentials, LoginForm};

/// One independent login-page scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Unique name for this scenario
    pub name: String,

    /// Group the scenario belongs to (e.g. "redirect", "cookies")
    #[serde(default)]
    pub group: String,

    /// Tags for filtering scenarios
    #[serde(default)]
    pub tags: Vec<String>,

    /// Where the fresh browser context navigates first
    pub visit: Visit,

    /// Credentials submitted through the login helper, if any
    #[serde(default)]
    pub login: Option<Credentials>,

    /// Page actions performed after login
    #[serde(default)]
    pub actions: Vec<Action>,

    /// Expected outcomes, checked in order
    #[serde(default)]
    pub expect: Vec<Expectation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    /// Path relative to the base URL
    pub path: String,

    /// Fail when the navigation response has an HTTP error status
    #[serde(default = "default_fail_on_status_code")]
    pub fail_on_status_code: bool,
}

fn default_fail_on_status_code() -> bool {
    true
}

impl Visit {
    pub fn path(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            fail_on_status_code: true,
        }
    }
}

/// A page interaction performed after login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Click { selector: String },
    Fill { selector: String, value: String },
}

/// An expected page state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expectation {
    /// Current URL equals `base_url + path`
    UrlEquals { path: String },

    /// Current URL differs from `base_url + path`
    UrlNotEquals { path: String },

    /// Element checks; an element with no further checks only asserts existence
    Element {
        selector: String,
        #[serde(default)]
        has_class: Option<String>,
        #[serde(default)]
        lacks_class: Option<String>,
        #[serde(default)]
        attribute: Option<AttributeAssertion>,
        #[serde(default)]
        children: Option<ChildCount>,
    },

    /// Cookie is present, optionally with a given value
    Cookie {
        name: String,
        #[serde(default)]
        value: Option<String>,
    },

    /// Cookie is absent
    NoCookie { name: String },

    /// Page text contains the given string
    ContainsText { text: String },
}

impl Expectation {
    pub fn exists(selector: impl Into<String>) -> Self {
        Expectation::Element {
            selector: selector.into(),
            has_class: None,
            lacks_class: None,
            attribute: None,
            children: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeAssertion {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChildCount {
    Equals(usize),
    GreaterThan(usize),
}

/// A single executable step, produced by lowering a [`Scenario`]
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Visit(Visit),
    Fill { selector: String, value: String },
    Click { selector: String },
    Expect(Expectation),
}

impl Step {
    /// Stable display name used in logs and reports
    pub fn name(&self) -> String {
        match self {
            Step::Visit(visit) => format!("visit:{}", visit.path),
            Step::Fill { selector, .. } => format!("fill:{}", selector),
            Step::Click { selector } => format!("click:{}", selector),
            Step::Expect(expectation) => match expectation {
                Expectation::UrlEquals { path } => format!("expect:url:{}", path),
                Expectation::UrlNotEquals { path } => format!("expect:url-not:{}", path),
                Expectation::Element { selector, .. } => format!("expect:element:{}", selector),
                Expectation::Cookie { name, .. } => format!("expect:cookie:{}", name),
                Expectation::NoCookie { name } => format!("expect:no-cookie:{}", name),
                Expectation::ContainsText { text } => {
                    format!("expect:text:{}", text.chars().take(30).collect::<String>())
                }
            },
        }
    }
}

impl From<&Action> for Step {
    fn from(action: &Action) -> Self {
        match action {
            Action::Click { selector } => Step::Click {
                selector: selector.clone(),
            },
            Action::Fill { selector, value } => Step::Fill {
                selector: selector.clone(),
                value: value.clone(),
            },
        }
    }
}

impl Scenario {
    pub fn new(name: impl Into<String>, visit: Visit) -> Self {
        Self {
            name: name.into(),
            group: String::new(),
            tags: Vec::new(),
            visit,
            login: None,
            actions: Vec::new(),
            expect: Vec::new(),
        }
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn login(mut self, username: &str, password: &str) -> Self {
        self.login = Some(Credentials::new(username, password));
        self
    }

    pub fn action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn expect(mut self, expectation: Expectation) -> Self {
        self.expect.push(expectation);
        self
    }

    /// Lower into executable steps: visit, login, actions, then expectations
    pub fn steps(&self, form: &LoginForm) -> Vec<Step> {
        let mut steps = vec![Step::Visit(self.visit.clone())];
        if let Some(credentials) = &self.login {
            steps.extend(form.login_steps(credentials));
        }
        steps.extend(self.actions.iter().map(Step::from));
        steps.extend(self.expect.iter().cloned().map(Step::Expect));
        steps
    }

    /// Filesystem-safe form of the name, used for screenshots
    pub fn slug(&self) -> String {
        let mut slug = String::with_capacity(self.name.len());
        for c in self.name.chars() {
            if c.is_ascii_alphanumeric() {
                slug.push(c.to_ascii_lowercase());
            } else if !slug.ends_with('-') {
                slug.push('-');
            }
        }
        slug.trim_matches('-').to_string()
    }

    /// Parse one scenario, or a list of scenarios, from a YAML string
    pub fn from_yaml(yaml: &str) -> E2eResult<Vec<Self>> {
        let value: serde_yaml::Value = serde_yaml::from_str(yaml)?;
        let scenarios = if value.is_sequence() {
            serde_yaml::from_value(value)?
        } else {
            vec![serde_yaml::from_value(value)?]
        };
        Ok(scenarios)
    }

    /// Parse scenarios from a YAML file
    pub fn from_file(path: &Path) -> E2eResult<Vec<Self>> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
            .map_err(|e| E2eError::SpecParse(format!("{}: {}", path.display(), e)))
    }

    /// Load all scenarios from a directory, sorted by file path
    pub fn load_all(dir: &Path) -> E2eResult<Vec<Self>> {
        let mut scenarios = Vec::new();

        for entry in walkdir::WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
        {
            scenarios.extend(Self::from_file(entry.path())?);
        }

        ensure_unique_names(&scenarios)?;
        Ok(scenarios)
    }

    /// Filter scenarios by tag
    pub fn filter_by_tag<'a>(scenarios: &'a [Self], tag: &str) -> Vec<&'a Self> {
        scenarios
            .iter()
            .filter(|s| s.tags.iter().any(|t| t == tag))
            .collect()
    }

    /// Find a scenario by exact name
    pub fn find<'a>(scenarios: &'a [Self], name: &str) -> E2eResult<&'a Self> {
        scenarios
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| E2eError::ScenarioNotFound(name.to_string()))
    }
}

/// Scenario names identify results and screenshots, so they must not repeat
pub fn ensure_unique_names(scenarios: &[Scenario]) -> E2eResult<()> {
    let mut seen = std::collections::HashSet::new();
    for scenario in scenarios {
        if !seen.insert(scenario.name.as_str()) {
            return Err(E2eError::SpecParse(format!(
                "duplicate scenario name: {}",
                scenario.name
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_scenario() {
        let yaml = r#"
name: valid-login
group: redirect
tags: [smoke]
visit:
  path: /
login:
  username: standard_user
  password: secret_sauce
expect:
  - kind: url_equals
    path: /inventory.html
  - kind: element
    selector: '#logout_sidebar_link'
"#;
        let scenarios = Scenario::from_yaml(yaml).unwrap();
        assert_eq!(scenarios.len(), 1);
        let scenario = &scenarios[0];
        assert_eq!(scenario.name, "valid-login");
        assert!(scenario.visit.fail_on_status_code);
        assert_eq!(scenario.expect.len(), 2);
        assert_eq!(scenario.expect[1], Expectation::exists("#logout_sidebar_link"));
    }

    #[test]
    fn test_parse_scenario_list_with_children_and_actions() {
        let yaml = r#"
- name: no-errors
  visit: { path: / }
  expect:
    - kind: element
      selector: .error-message-container
      children: { equals: 0 }
- name: logout
  visit: { path: /, fail_on_status_code: false }
  actions:
    - action: click
      selector: '#react-burger-menu-btn'
  expect:
    - kind: no_cookie
      name: session-username
"#;
        let scenarios = Scenario::from_yaml(yaml).unwrap();
        assert_eq!(scenarios.len(), 2);
        match &scenarios[0].expect[0] {
            Expectation::Element { children, .. } => {
                assert_eq!(*children, Some(ChildCount::Equals(0)))
            }
            other => panic!("unexpected expectation: {:?}", other),
        }
        assert!(!scenarios[1].visit.fail_on_status_code);
        assert_eq!(scenarios[1].actions.len(), 1);
    }

    #[test]
    fn test_steps_order() {
        let scenario = Scenario::new("logout", Visit::path("/"))
            .login("standard_user", "secret_sauce")
            .action(Action::Click {
                selector: "#logout_sidebar_link".to_string(),
            })
            .expect(Expectation::NoCookie {
                name: "session-username".to_string(),
            });

        let names: Vec<String> = scenario
            .steps(&LoginForm::default())
            .iter()
            .map(Step::name)
            .collect();
        assert_eq!(
            names,
            vec![
                "visit:/",
                "fill:#user-name",
                "fill:#password",
                "click:#login-button",
                "click:#logout_sidebar_link",
                "expect:no-cookie:session-username",
            ]
        );
    }

    #[test]
    fn test_slug() {
        let scenario = Scenario::new("Should log in & redirect!", Visit::path("/"));
        assert_eq!(scenario.slug(), "should-log-in-redirect");
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let a = Scenario::new("same", Visit::path("/"));
        let b = Scenario::new("same", Visit::path("/inventory.html"));
        assert!(matches!(
            ensure_unique_names(&[a, b]),
            Err(E2eError::SpecParse(_))
        ));
    }
}
