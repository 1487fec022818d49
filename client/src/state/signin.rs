//! Two-step sign-in form.
//!
//! SYSTEM CONTEXT
//! ==============
//! The sign-in page first confirms the username exists, then asks for the
//! password and submits both to the credentials provider. This module is the
//! state machine behind that page; it performs no I/O itself.
//!
//! DESIGN
//! ======
//! Each user action returns the request the page should send (or `None`).
//! The page feeds the network result back through a `resolve_*` method,
//! which may return effects to apply. The `loading` flag is the only guard
//! against duplicate submissions; in-flight calls are never cancelled.

#[cfg(test)]
#[path = "signin_test.rs"]
mod signin_test;

use std::fmt;

pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 6;

pub const USERNAME_TOO_SHORT: &str = "username must be at least 3 characters long";
pub const USERNAME_NOT_FOUND: &str = "username doesn't exist";
pub const PASSWORD_TOO_SHORT: &str = "password must be at least 6 characters long";
pub const WRONG_PASSWORD: &str = "wrong password";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SignInStep {
    #[default]
    CollectingUsername,
    CollectingPassword,
}

/// Network call the page must perform on behalf of the form.
#[derive(Clone, PartialEq, Eq)]
pub enum SignInRequest {
    CheckUsername(String),
    Login { username: String, password: String },
}

impl fmt::Debug for SignInRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CheckUsername(username) => f.debug_tuple("CheckUsername").field(username).finish(),
            Self::Login { username, .. } => f
                .debug_struct("Login")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

/// Side effects of a finished sign-in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SignInEffect {
    InvalidateQueries,
    Navigate(String),
}

/// Result of the credentials login call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoginOutcome {
    Granted,
    Denied,
    /// The gateway could not be reached or answered unexpectedly.
    Failed(String),
}

#[derive(Clone, Default)]
pub struct SignInForm {
    username: String,
    password: String,
    step: SignInStep,
    confirmed_username: Option<String>,
    loading: bool,
    username_error: Option<String>,
    password_error: Option<String>,
}

impl SignInForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> SignInStep {
        self.step
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn confirmed_username(&self) -> Option<&str> {
        self.confirmed_username.as_deref()
    }

    pub fn username_error(&self) -> Option<&str> {
        self.username_error.as_deref()
    }

    pub fn password_error(&self) -> Option<&str> {
        self.password_error.as_deref()
    }

    /// Username input edits are ignored once the username is confirmed.
    pub fn set_username(&mut self, value: String) {
        if self.step == SignInStep::CollectingUsername && !self.loading {
            self.username = value;
            self.username_error = None;
        }
    }

    pub fn set_password(&mut self, value: String) {
        if self.step == SignInStep::CollectingPassword && !self.loading {
            self.password = value;
            self.password_error = None;
        }
    }

    /// Validate the username locally and, if it passes, ask for an existence check.
    pub fn submit_username(&mut self) -> Option<SignInRequest> {
        if self.loading || self.step != SignInStep::CollectingUsername {
            return None;
        }
        let username = self.username.trim();
        if username.chars().count() < MIN_USERNAME_LEN {
            self.username_error = Some(USERNAME_TOO_SHORT.to_owned());
            return None;
        }
        self.username_error = None;
        self.loading = true;
        Some(SignInRequest::CheckUsername(username.to_owned()))
    }

    /// Apply the existence check result.
    pub fn resolve_username_check(&mut self, result: Result<bool, String>) {
        if !self.loading || self.step != SignInStep::CollectingUsername {
            return;
        }
        self.loading = false;
        match result {
            Ok(true) => {
                self.confirmed_username = Some(self.username.trim().to_owned());
                self.step = SignInStep::CollectingPassword;
                self.password.clear();
                self.password_error = None;
            }
            Ok(false) => self.username_error = Some(USERNAME_NOT_FOUND.to_owned()),
            Err(e) => self.username_error = Some(format!("could not check username: {e}")),
        }
    }

    /// Return to the username step, discarding the password.
    pub fn change_username(&mut self) {
        if self.loading || self.step != SignInStep::CollectingPassword {
            return;
        }
        self.step = SignInStep::CollectingUsername;
        self.confirmed_username = None;
        self.password.clear();
        self.password_error = None;
    }

    /// Validate the password locally and, if it passes, ask for a login.
    pub fn submit_password(&mut self) -> Option<SignInRequest> {
        if self.loading || self.step != SignInStep::CollectingPassword {
            return None;
        }
        let username = self.confirmed_username.clone()?;
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            self.password_error = Some(PASSWORD_TOO_SHORT.to_owned());
            return None;
        }
        self.password_error = None;
        self.loading = true;
        Some(SignInRequest::Login { username, password: self.password.clone() })
    }

    /// Apply the login result and return the effects the page must run.
    pub fn resolve_login(&mut self, outcome: LoginOutcome) -> Vec<SignInEffect> {
        if !self.loading || self.step != SignInStep::CollectingPassword {
            return Vec::new();
        }
        self.loading = false;
        match outcome {
            LoginOutcome::Granted => {
                self.password.clear();
                vec![SignInEffect::InvalidateQueries, SignInEffect::Navigate("/".to_owned())]
            }
            LoginOutcome::Denied => {
                self.password_error = Some(WRONG_PASSWORD.to_owned());
                Vec::new()
            }
            LoginOutcome::Failed(e) => {
                self.password_error = Some(format!("sign-in failed: {e}"));
                Vec::new()
            }
        }
    }
}
