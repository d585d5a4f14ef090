use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Form, Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;

use ubee_core::login::{HOME_PATH, LOGIN_ENDPOINT, LOGIN_PAGE_PATH, PASSWORD_FIELD, USERNAME_FIELD};
use ubee_core::models::{Credentials, Page};

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "secret";

pub const DOCSIS_HTML: &str = include_str!("../fixtures/docsis.html");
pub const STATUS_HTML: &str = include_str!("../fixtures/status.html");
pub const FIRMWARE_HTML: &str = include_str!("../fixtures/firmware.html");
pub const LOGIN_HTML: &str = include_str!("../fixtures/login.html");

const SESSION_COOKIE: &str = "SessionID=4242";

pub fn credentials() -> Credentials {
    Credentials::new(USERNAME, PASSWORD)
}

/// How the fake modem answers the login POST when the credentials match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginBehavior {
    /// 302 to the home page with a session cookie.
    Normal,
    /// 302 to a page that is neither home nor the login form.
    OddRedirect,
    /// 200 straight from the login endpoint.
    NoRedirect,
    /// 503 straight from the login endpoint.
    ServerError,
}

struct ModemState {
    login: LoginBehavior,
    home_redirect: Option<String>,
    pages: HashMap<String, String>,
    broken_page: Option<Page>,
    requests: Mutex<Vec<String>>,
}

/// In-process stand-in for the modem web UI, listening on a random port.
pub struct FakeModem {
    pub address: String,
    state: Arc<ModemState>,
}

pub struct FakeModemBuilder {
    login: LoginBehavior,
    home_redirect: Option<String>,
    pages: HashMap<String, String>,
    broken_page: Option<Page>,
}

impl FakeModem {
    pub fn builder() -> FakeModemBuilder {
        FakeModemBuilder {
            login: LoginBehavior::Normal,
            home_redirect: None,
            pages: [
                (Page::DocsisStatus, DOCSIS_HTML),
                (Page::BasicStatus, STATUS_HTML),
                (Page::Firmware, FIRMWARE_HTML),
            ]
            .into_iter()
            .map(|(page, html)| (page.path().to_string(), html.to_string()))
            .collect(),
            broken_page: None,
        }
    }

    pub async fn start() -> Self {
        Self::builder().start().await
    }

    /// `"METHOD /path"` of every request received so far.
    pub fn requests(&self) -> Vec<String> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn login_count(&self) -> usize {
        let login = format!("POST {LOGIN_ENDPOINT}");
        self.requests().iter().filter(|r| **r == login).count()
    }
}

impl FakeModemBuilder {
    pub fn login(mut self, login: LoginBehavior) -> Self {
        self.login = login;
        self
    }

    /// Make the home page redirect once more, to `target`.
    pub fn home_redirect(mut self, target: &str) -> Self {
        self.home_redirect = Some(target.to_string());
        self
    }

    pub fn serve(mut self, page: Page, html: &str) -> Self {
        self.pages.insert(page.path().to_string(), html.to_string());
        self
    }

    /// Answer `page` with HTTP 500.
    pub fn broken(mut self, page: Page) -> Self {
        self.broken_page = Some(page);
        self
    }

    pub async fn start(self) -> FakeModem {
        let state = Arc::new(ModemState {
            login: self.login,
            home_redirect: self.home_redirect,
            pages: self.pages,
            broken_page: self.broken_page,
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route(LOGIN_ENDPOINT, post(login))
            .route("/{page}", get(page))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        FakeModem {
            address: addr.to_string(),
            state,
        }
    }
}

fn record(state: &ModemState, method: &str, path: &str) {
    state
        .requests
        .lock()
        .unwrap()
        .push(format!("{method} {path}"));
}

fn redirect(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

async fn login(
    State(state): State<Arc<ModemState>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    record(&state, "POST", LOGIN_ENDPOINT);

    let valid = form.get(USERNAME_FIELD).map(String::as_str) == Some(USERNAME)
        && form.get(PASSWORD_FIELD).map(String::as_str) == Some(PASSWORD);
    if !valid {
        return redirect(LOGIN_PAGE_PATH);
    }

    match state.login {
        LoginBehavior::Normal => (
            StatusCode::FOUND,
            [
                (header::LOCATION, HOME_PATH.to_string()),
                (header::SET_COOKIE, format!("{SESSION_COOKIE}; Path=/")),
            ],
        )
            .into_response(),
        LoginBehavior::OddRedirect => redirect("/RgSetup.asp"),
        LoginBehavior::NoRedirect => Html("<html>ok</html>").into_response(),
        LoginBehavior::ServerError => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}

async fn page(
    State(state): State<Arc<ModemState>>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> Response {
    let path = format!("/{name}");
    record(&state, "GET", &path);

    if path == LOGIN_PAGE_PATH {
        return Html(LOGIN_HTML).into_response();
    }
    if path == HOME_PATH {
        return match &state.home_redirect {
            Some(target) => redirect(target),
            None => Html("<html>home</html>").into_response(),
        };
    }
    if state.home_redirect.as_deref() == Some(path.as_str()) {
        return Html("<html>software info</html>").into_response();
    }

    let authenticated = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains(SESSION_COOKIE));
    if !authenticated {
        return StatusCode::FORBIDDEN.into_response();
    }

    if state.broken_page.is_some_and(|p| p.path() == path) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    match state.pages.get(&path) {
        Some(html) => Html(html.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
