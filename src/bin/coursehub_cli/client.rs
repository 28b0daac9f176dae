#![deny(clippy::all, clippy::pedantic)]

use std::sync::{Mutex, MutexGuard, PoisonError};

use reqwest::header::{COOKIE, HeaderMap, SET_COOKIE};
use reqwest::{Client, Method, Response, StatusCode, Url};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::args::Cli;
use crate::cache::{DEFAULT_CAPACITY, QueryCache};
use crate::session::SessionFile;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("site URL is required (use --site or COURSEHUB_SITE_URL)")]
    MissingSite,
    /// The server's `{message}`, shown as-is.
    #[error("{message}")]
    Api { status: StatusCode, message: String },
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("session file error: {0}")]
    Session(std::io::Error),
    #[error("terminal i/o error: {0}")]
    Terminal(std::io::Error),
    #[error("unexpected response: {0}")]
    Server(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl CliError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub struct Ctx {
    pub client: Client,
    pub base: Url,
    session: SessionFile,
    cookie: Mutex<Option<String>>,
    cache: Mutex<QueryCache>,
}

impl Ctx {
    pub fn new(site: &str, session: SessionFile) -> Result<Self, CliError> {
        let base = Url::parse(site)?.join("/")?;
        let client = Client::builder().user_agent(Self::user_agent()).build()?;
        let cookie = session.load()?;
        Ok(Self {
            client,
            base,
            session,
            cookie: Mutex::new(cookie),
            cache: Mutex::new(QueryCache::new(DEFAULT_CAPACITY)),
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("coursehub-cli/", env!("CARGO_PKG_VERSION"))
    }

    pub fn url(&self, path: &str) -> Result<Url, CliError> {
        self.base.join(path).map_err(CliError::Url)
    }

    pub fn cookie(&self) -> Option<String> {
        lock(&self.cookie).clone()
    }

    pub fn cache(&self) -> MutexGuard<'_, QueryCache> {
        lock(&self.cache)
    }

    /// Cached `GET`. A miss goes to the server and stores the body.
    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, CliError> {
        let key = QueryCache::key(path, query);
        if let Some(hit) = self.cache().get(&key) {
            return Ok(hit);
        }

        let mut url = self.url(path)?;
        if !query.is_empty() {
            let mut qp = url.query_pairs_mut();
            for (k, v) in query {
                qp.append_pair(k, v);
            }
        }
        let resp = self.authorized(Method::GET, url).send().await?;
        let value = self.handle(resp).await?.unwrap_or(Value::Null);
        self.cache().put(key, value.clone());
        Ok(value)
    }

    /// Mutating request. On success every cached query under one of the
    /// `invalidates` prefixes is dropped so the next read refetches.
    pub async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        invalidates: &[&str],
    ) -> Result<Option<Value>, CliError> {
        let mut req = self.authorized(method, self.url(path)?);
        if let Some(b) = body {
            req = req.json(b);
        }
        let resp = req.send().await?;
        let value = self.handle(resp).await?;

        let mut cache = self.cache();
        for prefix in invalidates {
            cache.invalidate_prefix(prefix);
        }
        Ok(value)
    }

    /// Forgets the stored session and every cached query.
    pub fn forget_session(&self) -> Result<(), CliError> {
        *lock(&self.cookie) = None;
        self.cache().clear();
        self.session.clear()
    }

    fn authorized(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        let req = self.client.request(method, url);
        match self.cookie() {
            Some(cookie) => req.header(COOKIE, cookie),
            None => req,
        }
    }

    async fn handle(&self, resp: Response) -> Result<Option<Value>, CliError> {
        let status = resp.status();
        self.capture_cookie(resp.headers())?;
        let bytes = resp.bytes().await?;

        if !status.is_success() {
            return Err(CliError::Api {
                status,
                message: error_message(status, &bytes),
            });
        }
        if status == StatusCode::NO_CONTENT || bytes.is_empty() {
            return Ok(None);
        }
        let val = serde_json::from_slice(&bytes)
            .map_err(|e| CliError::Server(format!("failed to parse body: {e}")))?;
        Ok(Some(val))
    }

    /// A new session cookie replaces the stored one and the cache, since
    /// cached reads belonged to whoever was signed in before. An emptied
    /// cookie ends the session.
    fn capture_cookie(&self, headers: &HeaderMap) -> Result<(), CliError> {
        let Some(pair) = headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(|raw| raw.split(';').next())
            .map(str::trim)
        else {
            return Ok(());
        };

        let Some((_, value)) = pair.split_once('=') else {
            return Ok(());
        };
        if value.is_empty() {
            return self.forget_session();
        }

        *lock(&self.cookie) = Some(pair.to_string());
        self.cache().clear();
        self.session.save(pair)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn error_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| {
            let text = String::from_utf8_lossy(body).trim().to_string();
            if text.is_empty() {
                status.to_string()
            } else {
                text
            }
        })
}

pub fn build_ctx_from_cli(cli: &Cli) -> Result<Ctx, CliError> {
    let site = cli.site.clone().ok_or(CliError::MissingSite)?;
    Ctx::new(&site, SessionFile::new(&cli.session_file))
}
