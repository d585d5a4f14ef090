//! Login outcome detection.
//!
//! The modem has no API for authentication; the only signal is where it
//! redirects the login form POST:
//!
//! ```text
//! POST /goform/loginMR3 --302--> /RgHomeMR3.asp   success
//! POST /goform/loginMR3 --302--> /loginMR3.asp    bad credentials
//! POST /goform/loginMR3 --302--> anything else    protocol error
//! ```
//!
//! Redirects that do not originate from the login POST are followed
//! without inspection.

use thiserror::Error;

use crate::error::AppError;

/// Endpoint the credentials are posted to.
pub const LOGIN_ENDPOINT: &str = "/goform/loginMR3";
/// Landing page after a successful login.
pub const HOME_PATH: &str = "/RgHomeMR3.asp";
/// Login form the modem bounces back to on bad credentials.
pub const LOGIN_PAGE_PATH: &str = "/loginMR3.asp";

/// Form field names expected by the login endpoint.
pub const USERNAME_FIELD: &str = "loginUsername";
pub const PASSWORD_FIELD: &str = "loginPassword";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginFailure {
    #[error("login failed")]
    BadCredentials,

    #[error("unexpected login redirect: {0}")]
    UnexpectedRedirect(String),

    #[error("login did not redirect")]
    NoRedirect,
}

impl From<LoginFailure> for AppError {
    fn from(failure: LoginFailure) -> Self {
        match failure {
            LoginFailure::BadCredentials => AppError::AuthenticationFailed(failure.to_string()),
            LoginFailure::UnexpectedRedirect(_) | LoginFailure::NoRedirect => {
                AppError::ProtocolError(failure.to_string())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginDecision {
    /// The login POST landed on the home page.
    Success,
    /// The login POST was answered with something other than the home page.
    Failure(LoginFailure),
    /// Not a login hop; follow the redirect.
    Defer,
}

/// Decide what a redirect means.
///
/// `previous` is the path of the request that produced the redirect,
/// `current` the path it points to.
pub fn login_decision(previous: &str, current: &str) -> LoginDecision {
    if previous != LOGIN_ENDPOINT {
        return LoginDecision::Defer;
    }

    match current {
        HOME_PATH => LoginDecision::Success,
        LOGIN_PAGE_PATH => LoginDecision::Failure(LoginFailure::BadCredentials),
        other => LoginDecision::Failure(LoginFailure::UnexpectedRedirect(other.to_string())),
    }
}
