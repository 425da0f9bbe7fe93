//! Built-in login page scenarios

use crate::spec::{Action, AttributeAssertion, ChildCount, Expectation, Scenario, Visit};

pub const VALID_USERNAME: &str = "standard_user";
pub const VALID_PASSWORD: &str = "secret_sauce";

pub const INVENTORY_PATH: &str = "/inventory.html";
pub const SESSION_COOKIE: &str = "session-username";
pub const MENU_BUTTON: &str = "#react-burger-menu-btn";
pub const LOGOUT_LINK: &str = "#logout_sidebar_link";
pub const ERROR_CONTAINER: &str = ".error-message-container";
pub const ERROR_CLASS: &str = "error";

const USERNAME_INPUT: &str = "#user-name";
const PASSWORD_INPUT: &str = "#password";
const LOGIN_BUTTON: &str = "#login-button";

/// Every built-in scenario, grouped the way they are reported
pub fn builtin() -> Vec<Scenario> {
    let mut scenarios = form_elements();
    scenarios.extend(redirect());
    scenarios.extend(cookies());
    scenarios.extend(validation_feedback());
    scenarios
}

fn form_elements() -> Vec<Scenario> {
    let group = "form elements";
    vec![
        Scenario::new("should display login form elements", Visit::path("/"))
            .group(group)
            .tag("smoke")
            .expect(Expectation::exists(USERNAME_INPUT))
            .expect(Expectation::exists(PASSWORD_INPUT))
            .expect(Expectation::exists(LOGIN_BUTTON)),
        Scenario::new("should not display the password on screen", Visit::path("/"))
            .group(group)
            .expect(Expectation::Element {
                selector: PASSWORD_INPUT.to_string(),
                has_class: None,
                lacks_class: None,
                attribute: Some(AttributeAssertion {
                    name: "type".to_string(),
                    value: "password".to_string(),
                }),
                children: None,
            }),
    ]
}

fn redirect() -> Vec<Scenario> {
    let group = "redirect";
    vec![
        Scenario::new(
            "should log in and redirect to the inventory page with correct account details",
            Visit::path("/"),
        )
        .group(group)
        .tag("smoke")
        .login(VALID_USERNAME, VALID_PASSWORD)
        .expect(url_equals(INVENTORY_PATH))
        .expect(Expectation::exists(LOGOUT_LINK)),
        Scenario::new("should not log in or redirect with invalid username", Visit::path("/"))
            .group(group)
            .login("invalid_username", VALID_PASSWORD)
            .expect(url_equals("/")),
        Scenario::new("should not log in or redirect with invalid password", Visit::path("/"))
            .group(group)
            .login(VALID_USERNAME, "invalid_password")
            .expect(url_equals("/")),
        Scenario::new(
            "should not allow access to the inventory page before the user has logged in",
            Visit {
                path: INVENTORY_PATH.to_string(),
                fail_on_status_code: false,
            },
        )
        .group(group)
        .expect(Expectation::UrlNotEquals {
            path: INVENTORY_PATH.to_string(),
        }),
    ]
}

fn cookies() -> Vec<Scenario> {
    let group = "cookies";
    vec![
        Scenario::new(
            "should create a session cookie with username on successful login",
            Visit::path("/"),
        )
        .group(group)
        .login(VALID_USERNAME, VALID_PASSWORD)
        .expect(Expectation::Cookie {
            name: SESSION_COOKIE.to_string(),
            value: Some(VALID_USERNAME.to_string()),
        }),
        Scenario::new("should remove the cookie on logout", Visit::path("/"))
            .group(group)
            .login(VALID_USERNAME, VALID_PASSWORD)
            .action(click(MENU_BUTTON))
            .action(click(LOGOUT_LINK))
            .expect(Expectation::NoCookie {
                name: SESSION_COOKIE.to_string(),
            }),
    ]
}

fn validation_feedback() -> Vec<Scenario> {
    let group = "validation failure feedback";
    vec![
        Scenario::new("should not show any errors before user input", Visit::path("/"))
            .group(group)
            .expect(class_check(USERNAME_INPUT, false))
            .expect(class_check(PASSWORD_INPUT, false))
            .expect(children(ChildCount::Equals(0))),
        Scenario::new(
            "should provide feedback when account details are invalid",
            Visit::path("/"),
        )
        .group(group)
        .login("invalid_username", "invalid_password")
        .expect(class_check(USERNAME_INPUT, true))
        .expect(class_check(PASSWORD_INPUT, true))
        .expect(children(ChildCount::GreaterThan(0))),
        Scenario::new("should prompt user when no username is provided", Visit::path("/"))
            .group(group)
            .login("", VALID_PASSWORD)
            .expect(Expectation::ContainsText {
                text: "Username is required".to_string(),
            }),
        Scenario::new("should prompt user when no password is provided", Visit::path("/"))
            .group(group)
            .login(VALID_USERNAME, "")
            .expect(Expectation::ContainsText {
                text: "Password is required".to_string(),
            }),
    ]
}

fn url_equals(path: &str) -> Expectation {
    Expectation::UrlEquals {
        path: path.to_string(),
    }
}

fn click(selector: &str) -> Action {
    Action::Click {
        selector: selector.to_string(),
    }
}

fn class_check(selector: &str, present: bool) -> Expectation {
    let class = Some(ERROR_CLASS.to_string());
    let (has_class, lacks_class) = if present { (class, None) } else { (None, class) };
    Expectation::Element {
        selector: selector.to_string(),
        has_class,
        lacks_class,
        attribute: None,
        children: None,
    }
}

fn children(count: ChildCount) -> Expectation {
    Expectation::Element {
        selector: ERROR_CONTAINER.to_string(),
        has_class: None,
        lacks_class: None,
        attribute: None,
        children: Some(count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::ensure_unique_names;

    #[test]
    fn test_builtin_names_unique() {
        let scenarios = builtin();
        assert_eq!(scenarios.len(), 12);
        ensure_unique_names(&scenarios).unwrap();
    }

    #[test]
    fn test_every_scenario_has_group_and_expectation() {
        for scenario in builtin() {
            assert!(!scenario.group.is_empty(), "{} has no group", scenario.name);
            assert!(!scenario.expect.is_empty(), "{} asserts nothing", scenario.name);
        }
    }

    #[test]
    fn test_inventory_guard_tolerates_error_status() {
        let scenario = builtin()
            .into_iter()
            .find(|s| s.visit.path == INVENTORY_PATH)
            .unwrap();
        assert!(!scenario.visit.fail_on_status_code);
        assert!(scenario.login.is_none());
    }
}
