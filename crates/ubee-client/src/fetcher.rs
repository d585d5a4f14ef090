use std::error::Error as _;
use std::time::Duration;

use reqwest::Client;
use reqwest::redirect::Policy;
use ubee_core::error::AppError;
use ubee_core::login::{
    LOGIN_ENDPOINT, LoginDecision, LoginFailure, PASSWORD_FIELD, USERNAME_FIELD, login_decision,
};
use ubee_core::models::{Credentials, Page};
use ubee_core::traits::PageFetcher;
use url::Url;

const MAX_REDIRECTS: usize = 10;

/// Modem page fetcher using reqwest.
///
/// Every [`authenticate`](PageFetcher::authenticate) call builds a fresh
/// client with its own cookie jar, so no cookie outlives the scrape that
/// obtained it.
#[derive(Debug, Clone)]
pub struct ReqwestPageFetcher {
    timeout: Duration,
}

/// Authenticated client for one scrape.
#[derive(Debug)]
pub struct ModemSession {
    client: Client,
    base_url: Url,
}

impl ReqwestPageFetcher {
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn build_client(&self) -> Result<Client, AppError> {
        Client::builder()
            .user_agent(concat!("ubee-exporter/", env!("CARGO_PKG_VERSION")))
            .timeout(self.timeout)
            .cookie_store(true)
            .redirect(login_redirect_policy())
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))
    }

    fn map_send_error(&self, e: reqwest::Error) -> AppError {
        if let Some(failure) = login_failure(&e) {
            return failure.into();
        }

        if e.is_timeout() {
            AppError::Timeout(self.timeout.as_secs())
        } else if e.is_connect() {
            AppError::NetworkError(format!("Connection failed: {e}"))
        } else {
            AppError::HttpError(e.to_string())
        }
    }
}

impl Default for ReqwestPageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl PageFetcher for ReqwestPageFetcher {
    type Session = ModemSession;

    async fn authenticate(
        &self,
        address: &str,
        credentials: &Credentials,
    ) -> Result<ModemSession, AppError> {
        let base_url = modem_url(address)?;
        let login_url = join(&base_url, LOGIN_ENDPOINT)?;
        let client = self.build_client()?;

        let form = [
            (USERNAME_FIELD, credentials.username.as_str()),
            (PASSWORD_FIELD, credentials.password.as_str()),
        ];
        let response = client
            .post(login_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::HttpError(format!(
                "HTTP {} for {}",
                status.as_u16(),
                response.url()
            )));
        }

        // Redirect policy already rejected bad credentials and odd targets;
        // a 2xx still on the login endpoint means there was no redirect at all.
        if response.url().path() == LOGIN_ENDPOINT {
            return Err(LoginFailure::NoRedirect.into());
        }

        Ok(ModemSession { client, base_url })
    }

    async fn fetch(&self, session: &ModemSession, page: Page) -> Result<String, AppError> {
        let url = join(&session.base_url, page.path())?;

        let response = session
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::HttpError(format!(
                "HTTP {} for {}",
                status.as_u16(),
                url
            )));
        }

        response
            .text()
            .await
            .map_err(|e| AppError::HttpError(format!("Failed to read response body: {e}")))
    }
}

/// Base URL of the modem web UI, from a `host[:port]` address.
pub fn modem_url(address: &str) -> Result<Url, AppError> {
    let url = Url::parse(&format!("http://{address}/"))
        .map_err(|e| AppError::ConfigError(format!("Invalid modem address '{address}': {e}")))?;

    if url.path() != "/" || url.host_str().is_none() {
        return Err(AppError::ConfigError(format!(
            "Invalid modem address '{address}': expected host[:port]"
        )));
    }

    Ok(url)
}

fn join(base: &Url, path: &str) -> Result<Url, AppError> {
    base.join(path)
        .map_err(|e| AppError::Generic(format!("Cannot build URL for {path}: {e}")))
}

/// Redirect policy that runs the login state machine on every hop.
fn login_redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() > MAX_REDIRECTS {
            return attempt.error("too many redirects");
        }

        let previous = attempt
            .previous()
            .last()
            .map(|url| url.path().to_string())
            .unwrap_or_default();

        match login_decision(&previous, attempt.url().path()) {
            LoginDecision::Success | LoginDecision::Defer => attempt.follow(),
            LoginDecision::Failure(failure) => attempt.error(failure),
        }
    })
}

/// Digs the [`LoginFailure`] raised by the redirect policy out of a reqwest error.
fn login_failure(e: &reqwest::Error) -> Option<LoginFailure> {
    let mut source = e.source();
    while let Some(err) = source {
        if let Some(failure) = err.downcast_ref::<LoginFailure>() {
            return Some(failure.clone());
        }
        source = err.source();
    }
    None
}
