//! Login form selectors and the login helper action

use serde::{Deserialize, Serialize};

use crate::spec::Step;

/// Inputs for the login helper; an empty field is left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl Credentials {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }
}

/// Selectors of the login form on the page under test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username_selector: String,
    pub password_selector: String,
    pub submit_selector: String,
}

impl Default for LoginForm {
    fn default() -> Self {
        Self {
            username_selector: "#user-name".to_string(),
            password_selector: "#password".to_string(),
            submit_selector: "#login-button".to_string(),
        }
    }
}

impl LoginForm {
    /// Fill each provided credential into its input, then submit.
    ///
    /// The resulting navigation is left to the page; failures show up in the
    /// steps of the calling scenario.
    pub fn login_steps(&self, credentials: &Credentials) -> Vec<Step> {
        let mut steps = Vec::with_capacity(3);

        if !credentials.username.is_empty() {
            steps.push(Step::Fill {
                selector: self.username_selector.clone(),
                value: credentials.username.clone(),
            });
        }
        if !credentials.password.is_empty() {
            steps.push(Step::Fill {
                selector: self.password_selector.clone(),
                value: credentials.password.clone(),
            });
        }

        steps.push(Step::Click {
            selector: self.submit_selector.clone(),
        });
        steps
    }
}
