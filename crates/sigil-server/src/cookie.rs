//! Access cookie naming and attributes.
//!
//! Without an explicit name, the cookie name derives from the base URL:
//!
//! | Base URL | Cookie name |
//! |----------|-------------|
//! | `http://my-dns.co` | `my-dns` |
//! | `https://sub.dns.co/` | `__Host-sub-dns` |
//! | `http://my-dns.co/dir` | `dir` |
//! | `https://my-dns.co:8080/my/-_-my.dir_-_.jpg/` | `__Secure-my-dir` |
//! | `http://localhost:8080/` | `sigil` |

use crate::error::AccessError;
use axum::http::{HeaderMap, header};
use url::{Host, Url};

/// Cookie name used when none can be derived from the base URL.
pub const DEFAULT_COOKIE_NAME: &str = "sigil";

/// Name and attributes of the access cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieSpec {
    pub name: String,
    pub path: String,
    pub secure: bool,
    /// `Max-Age` in seconds.
    pub max_age: u64,
}

impl CookieSpec {
    pub fn from_base_url(
        base_url: &str,
        explicit_name: Option<&str>,
        max_age: u64,
    ) -> Result<Self, AccessError> {
        let url = Url::parse(base_url).map_err(|e| AccessError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        let secure = match url.scheme() {
            "https" => true,
            "http" => false,
            other => {
                return Err(AccessError::InvalidBaseUrl {
                    url: base_url.to_string(),
                    reason: format!("unsupported scheme {other:?}"),
                });
            }
        };

        let path = clean_path(url.path());
        let name = match explicit_name.filter(|name| !name.is_empty()) {
            Some(name) => name.to_string(),
            None => derive_name(&url, &path, secure),
        };

        Ok(Self {
            name,
            path,
            secure,
            max_age,
        })
    }

    /// `Set-Cookie` header value carrying `value`.
    pub fn set_cookie(&self, value: &str) -> String {
        let mut cookie = format!(
            "{}={}; Path={}; Max-Age={}; HttpOnly; SameSite=Strict",
            self.name, value, self.path, self.max_age
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    /// Value of this cookie in the request `Cookie` headers.
    pub fn find<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|cookies| cookies.split(';'))
            .filter_map(|cookie| cookie.trim().split_once('='))
            .find(|(name, _)| *name == self.name)
            .map(|(_, value)| value.trim_matches('"'))
    }
}

fn derive_name(url: &Url, path: &str, secure: bool) -> String {
    let base = if path == "/" {
        match url.host() {
            Some(Host::Domain(domain)) => domain
                .rsplit_once('.')
                .map(|(rest, _tld)| rest.to_string())
                .unwrap_or_default(),
            _ => String::new(),
        }
    } else {
        let segment = path.rsplit('/').next().unwrap_or_default();
        match segment.rfind('.') {
            Some(dot) => segment[..dot].to_string(),
            None => segment.to_string(),
        }
    };

    let name = base.trim_matches(['-', '_']).replace('.', "-");
    if name.is_empty() {
        return DEFAULT_COOKIE_NAME.to_string();
    }

    match (secure, path == "/") {
        (true, true) => format!("__Host-{name}"),
        (true, false) => format!("__Secure-{name}"),
        (false, _) => name,
    }
}

/// Lexical path cleaning: always rooted, no empty, `.` or `..` segments,
/// no trailing slash.
pub fn clean_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    format!("/{}", segments.join("/"))
}
