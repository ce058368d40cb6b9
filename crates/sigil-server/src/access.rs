//! Cookie-based access control.
//!
//! Three axum middlewares share one [`AccessController`]:
//!
//! - [`set`] mints a cookie for the default plan on every response
//! - [`vet`] injects the cookie's permission, or the default one
//! - [`chk`] injects the cookie's permission, or answers `401 Unauthorized`
//!
//! Mount them with `axum::middleware::from_fn_with_state(controller, access::chk)`.
//! Handlers read the result through `Extension<Perm>` or [`Perm::from_request`].

use crate::cookie::CookieSpec;
use crate::error::AccessError;
use crate::plans::{Perm, PermissionTable, Plan};
use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    middleware::Next,
    response::Response,
};
use sigil_core::{AccessConfig, TokenConfig};
use sigil_token::ttl::{expiry_after, parse_duration};
use sigil_token::{TokenError, Tokenizer};
use std::cell::RefCell;
use std::sync::Arc;

thread_local! {
    /// Per-thread copy of the cookie, decoded in place when the tokenizer reuses buffers.
    static COOKIE_BUFFER: RefCell<Vec<u8>> = const { RefCell::new(Vec::new()) };
}

/// Issues and checks access cookies.
pub struct AccessController {
    tokenizer: Arc<Tokenizer>,
    plans: PermissionTable,
    cookie: CookieSpec,
    timeout: String,
    max_ttl: String,
}

impl AccessController {
    /// Cookie tokens live for `token.timeout`, bounded by `token.max_ttl`; the cookie
    /// itself for `access.cookie_ttl`.
    pub fn new(tokenizer: Arc<Tokenizer>, access: &AccessConfig, token: &TokenConfig) -> Result<Self, AccessError> {
        let plans = PermissionTable::from_items(&access.plans)?;
        let max_age = parse_duration(&access.cookie_ttl)?.as_secs();
        let cookie = CookieSpec::from_base_url(&access.base_url, access.cookie_name.as_deref(), max_age)?;
        expiry_after(&token.timeout, &token.max_ttl)?;

        tracing::info!(
            cookie = %cookie.name,
            path = %cookie.path,
            default_plan = %plans.default_plan().name,
            plans = plans.plans().len(),
            "Access controller ready"
        );

        Ok(Self {
            tokenizer,
            plans,
            cookie,
            timeout: token.timeout.clone(),
            max_ttl: token.max_ttl.clone(),
        })
    }

    pub fn cookie(&self) -> &CookieSpec {
        &self.cookie
    }

    pub fn default_plan(&self) -> &Plan {
        self.plans.default_plan()
    }

    /// Signs a token carrying `plan` in its first group.
    pub fn issue_token(&self, plan: &str) -> Result<String, TokenError> {
        self.tokenizer
            .gen_access_token(&self.timeout, &self.max_ttl, "", vec![plan.to_string()], vec![])
    }

    /// `Set-Cookie` value for a fresh token on `plan`.
    pub fn issue_cookie(&self, plan: &str) -> Result<String, TokenError> {
        Ok(self.cookie.set_cookie(&self.issue_token(plan)?))
    }

    /// Permission carried by the access cookie in `headers`.
    pub fn permission(&self, headers: &HeaderMap) -> Result<Perm, Rejection> {
        let token = self.cookie.find(headers).ok_or(Rejection::NoCookie)?;
        self.permission_of(token)
    }

    /// Permission carried by an access token.
    pub fn permission_of(&self, token: &str) -> Result<Perm, Rejection> {
        let claims = if self.tokenizer.reuse() {
            COOKIE_BUFFER.with_borrow_mut(|buffer| {
                buffer.clear();
                buffer.extend_from_slice(token.as_bytes());
                self.tokenizer.claims_in_place(buffer)
            })?
        } else {
            self.tokenizer.claims(token.as_bytes())?
        };

        let plan = claims.first_group().ok_or(Rejection::NoPlan)?;
        self.plans
            .resolve(plan)
            .ok_or_else(|| Rejection::UnknownPlan(plan.to_string()))
    }
}

/// Why a request is left unauthenticated.
#[derive(Debug, thiserror::Error)]
pub enum Rejection {
    #[error("no access cookie")]
    NoCookie,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("token carries no plan")]
    NoPlan,

    #[error("unknown plan {0:?}")]
    UnknownPlan(String),
}

impl Rejection {
    /// Rejections caused by what the client sent, as opposed to a server-side fault.
    pub fn is_client_error(&self) -> bool {
        match self {
            Rejection::Token(e) => e.is_per_token(),
            _ => true,
        }
    }

    fn log(&self, policy: &'static str) {
        if self.is_client_error() {
            tracing::debug!(policy, reason = %self, "Access cookie rejected");
        } else {
            tracing::warn!(policy, reason = %self, "Access cookie rejected");
        }
    }
}

/// Set policy: always mints a cookie for the default plan and injects its permission.
pub async fn set(
    State(controller): State<Arc<AccessController>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let plan = controller.default_plan();
    let cookie = controller.issue_cookie(&plan.name).map_err(|e| {
        tracing::error!(error = %e, "Failed to mint access cookie");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    let cookie = HeaderValue::from_str(&cookie).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    req.extensions_mut().insert(plan.perm);
    let mut response = next.run(req).await;
    response.headers_mut().append(header::SET_COOKIE, cookie);
    Ok(response)
}

/// Vet policy: a valid cookie grants its permission, anything else the default one.
pub async fn vet(
    State(controller): State<Arc<AccessController>>,
    mut req: Request,
    next: Next,
) -> Response {
    let perm = match controller.permission(req.headers()) {
        Ok(perm) => perm,
        Err(rejection) => {
            rejection.log("vet");
            controller.default_plan().perm
        }
    };
    req.extensions_mut().insert(perm);
    next.run(req).await
}

/// Chk policy: a valid cookie is required.
pub async fn chk(
    State(controller): State<Arc<AccessController>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let perm = controller.permission(req.headers()).map_err(|rejection| {
        rejection.log("chk");
        StatusCode::UNAUTHORIZED
    })?;
    req.extensions_mut().insert(perm);
    Ok(next.run(req).await)
}
