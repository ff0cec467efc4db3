//! Firewall configuration: which authenticators run and how logins behave.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// What happens to the HTTP session after a successful login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionFixationStrategy {
    /// Keep the session untouched.
    None,
    /// Issue a new session id but keep the session data.
    #[default]
    Migrate,
    /// Issue a new session id and drop all session data.
    Invalidate,
}

/// A single firewall and the authenticators registered on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirewallConfig {
    /// Firewall name, used to scope tokens and candidate sets.
    #[serde(default = "default_name")]
    pub name: String,
    /// Stateless firewalls never touch the session on login.
    #[serde(default)]
    pub stateless: bool,
    /// Wipe secret material from the token before it is stored.
    #[serde(default = "default_true")]
    pub erase_credentials: bool,
    /// Report unknown users and account-status failures as bad credentials.
    #[serde(default = "default_true")]
    pub hide_user_not_found: bool,
    /// Session fixation protection applied on login.
    #[serde(default)]
    pub session_fixation_strategy: SessionFixationStrategy,
    /// Register the anonymous authenticator as the final fallback.
    #[serde(default = "default_true")]
    pub anonymous: bool,
    /// HTTP Basic authentication.
    #[serde(default)]
    pub http_basic: Option<HttpBasicConfig>,
    /// Form login.
    #[serde(default)]
    pub form_login: Option<FormLoginConfig>,
    /// Bearer access tokens.
    #[serde(default)]
    pub access_token: Option<AccessTokenConfig>,
    /// Remember-me cookies.
    #[serde(default)]
    pub remember_me: Option<RememberMeConfig>,
    /// Users served by the in-memory user provider.
    #[serde(default)]
    pub users: Vec<UserConfig>,
}

impl Default for FirewallConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            stateless: false,
            erase_credentials: true,
            hide_user_not_found: true,
            session_fixation_strategy: SessionFixationStrategy::default(),
            anonymous: true,
            http_basic: None,
            form_login: None,
            access_token: None,
            remember_me: None,
            users: Vec::new(),
        }
    }
}

impl FirewallConfig {
    /// Rejects configurations the firewall cannot be assembled from.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::configuration("Firewall name must not be empty"));
        }

        if let Some(remember_me) = &self.remember_me {
            if remember_me.secret.len() < 32 {
                return Err(AppError::configuration(format!(
                    "Remember-me secret for firewall '{}' must be at least 32 bytes",
                    self.name
                )));
            }
            if remember_me.lifetime_seconds == 0 {
                return Err(AppError::configuration(
                    "Remember-me lifetime must be greater than zero",
                ));
            }
        }

        let mut seen = std::collections::HashSet::new();
        for user in &self.users {
            if !seen.insert(user.identifier.as_str()) {
                return Err(AppError::configuration(format!(
                    "User '{}' is declared more than once",
                    user.identifier
                )));
            }
        }

        Ok(())
    }
}

/// HTTP Basic authentication settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpBasicConfig {
    /// Realm announced in the `WWW-Authenticate` challenge.
    #[serde(default = "default_realm")]
    pub realm: String,
}

/// Form login settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormLoginConfig {
    /// Path the login form posts to.
    #[serde(default = "default_check_path")]
    pub check_path: String,
    /// Path of the login form; failures redirect here.
    #[serde(default = "default_login_path")]
    pub login_path: String,
    /// Where to send the user after a successful login.
    #[serde(default = "default_target_path")]
    pub default_target_path: String,
    /// Form field carrying the identifier.
    #[serde(default = "default_username_parameter")]
    pub username_parameter: String,
    /// Form field carrying the password.
    #[serde(default = "default_password_parameter")]
    pub password_parameter: String,
}

/// Bearer access token settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessTokenConfig {
    /// Opaque token to user identifier.
    #[serde(default)]
    pub tokens: HashMap<String, String>,
}

/// Remember-me cookie settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RememberMeConfig {
    /// HMAC secret used to sign the cookie.
    pub secret: String,
    /// Cookie lifetime in seconds.
    #[serde(default = "default_remember_me_lifetime")]
    pub lifetime_seconds: u64,
    /// Cookie name.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Cookie path.
    #[serde(default = "default_cookie_path")]
    pub path: String,
    /// Send the cookie over HTTPS only.
    #[serde(default)]
    pub secure: bool,
    /// Hide the cookie from scripts.
    #[serde(default = "default_true")]
    pub http_only: bool,
    /// Issue the cookie on every remember-me capable login.
    #[serde(default)]
    pub always_remember_me: bool,
    /// Request parameter that opts a login into remember-me.
    #[serde(default = "default_remember_me_parameter")]
    pub remember_me_parameter: String,
}

impl Default for HttpBasicConfig {
    fn default() -> Self {
        Self {
            realm: default_realm(),
        }
    }
}

impl Default for FormLoginConfig {
    fn default() -> Self {
        Self {
            check_path: default_check_path(),
            login_path: default_login_path(),
            default_target_path: default_target_path(),
            username_parameter: default_username_parameter(),
            password_parameter: default_password_parameter(),
        }
    }
}

/// Defaults with an empty secret, which [`FirewallConfig::validate`] rejects.
impl Default for RememberMeConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            lifetime_seconds: default_remember_me_lifetime(),
            cookie_name: default_cookie_name(),
            path: default_cookie_path(),
            secure: false,
            http_only: true,
            always_remember_me: false,
            remember_me_parameter: default_remember_me_parameter(),
        }
    }
}

/// A user served by the in-memory provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    /// Login identifier.
    pub identifier: String,
    /// PHC-formatted password hash; users without one authenticate on identity alone.
    #[serde(default)]
    pub password_hash: Option<String>,
    /// Granted roles.
    #[serde(default = "default_roles")]
    pub roles: Vec<String>,
    /// Disabled users fail the pre-authentication check.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Locked users fail the pre-authentication check.
    #[serde(default)]
    pub locked: bool,
}

fn default_name() -> String {
    "main".to_string()
}

fn default_true() -> bool {
    true
}

fn default_realm() -> String {
    "Secured Area".to_string()
}

fn default_check_path() -> String {
    "/login_check".to_string()
}

fn default_login_path() -> String {
    "/login".to_string()
}

fn default_target_path() -> String {
    "/".to_string()
}

fn default_username_parameter() -> String {
    "_username".to_string()
}

fn default_password_parameter() -> String {
    "_password".to_string()
}

fn default_remember_me_lifetime() -> u64 {
    31_536_000
}

fn default_cookie_name() -> String {
    "REMEMBERME".to_string()
}

fn default_cookie_path() -> String {
    "/".to_string()
}

fn default_remember_me_parameter() -> String {
    "_remember_me".to_string()
}

fn default_roles() -> Vec<String> {
    vec!["ROLE_USER".to_string()]
}
