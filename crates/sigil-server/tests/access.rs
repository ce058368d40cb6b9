use axum::{
    Router,
    body::Body,
    extract::Request,
    http::{StatusCode, header},
    middleware::from_fn_with_state,
    routing::get,
};
use serde_json::Value;
use sigil_core::{AccessConfig, PlanItem, SigilConfig, TokenConfig};
use sigil_server::{
    AccessController, AccessError, AppState, DEFAULT_COOKIE_NAME, DEFAULT_PERM, DEFAULT_PLAN, Perm,
    access, routes,
};
use sigil_token::Tokenizer;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

const SECRET_HEX: &str = "0a02123112dfb13d58a1bc0c8ce55b154878085035ae4d2e13383a79a3e3de1b";

/// What the downstream handler saw: `None` when it was never called.
type Seen = Arc<Mutex<Option<Option<Perm>>>>;

#[derive(Clone, Copy)]
enum Policy {
    Set,
    Vet,
    Chk,
}

fn app(controller: Arc<AccessController>, policy: Policy, seen: Seen) -> Router {
    let handler = move |req: Request| {
        let seen = seen.clone();
        async move {
            *seen.lock().unwrap() = Some(Perm::from_request(&req));
            "ok"
        }
    };
    let router = Router::new().route("/", get(handler));
    match policy {
        Policy::Set => router.layer(from_fn_with_state(controller, access::set)),
        Policy::Vet => router.layer(from_fn_with_state(controller, access::vet)),
        Policy::Chk => router.layer(from_fn_with_state(controller, access::chk)),
    }
}

fn plans(items: &[(&str, i64)]) -> Vec<PlanItem> {
    items
        .iter()
        .flat_map(|(name, perm)| [PlanItem::Name(name.to_string()), PlanItem::Level(*perm)])
        .collect()
}

fn controller(base_url: &str, cookie_name: Option<&str>, plans: Vec<PlanItem>) -> Result<AccessController, AccessError> {
    let tokenizer = Arc::new(Tokenizer::new(SECRET_HEX, true).unwrap());
    let config = AccessConfig {
        base_url: base_url.to_string(),
        cookie_name: cookie_name.map(str::to_string),
        plans,
        ..Default::default()
    };
    AccessController::new(tokenizer, &config, &TokenConfig::default())
}

async fn call(
    controller: &Arc<AccessController>,
    policy: Policy,
    cookie: Option<String>,
) -> (axum::response::Response, Option<Option<Perm>>) {
    let seen: Seen = Arc::default();
    let mut req = Request::builder().uri("/");
    if let Some(cookie) = cookie {
        req = req.header(header::COOKIE, cookie);
    }
    let response = app(controller.clone(), policy, seen.clone())
        .oneshot(req.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let seen = seen.lock().unwrap().take();
    (response, seen)
}

struct CheckerCase {
    name: &'static str,
    base_url: &'static str,
    cookie_name_in: Option<&'static str>,
    plans: &'static [(&'static str, i64)],
    cookie_name: &'static str,
    plan: &'static str,
    perm: i64,
}

const CASES: &[CheckerCase] = &[
    CheckerCase {
        name: "0plans",
        base_url: "http://my-dns.co",
        cookie_name_in: None,
        plans: &[],
        cookie_name: "my-dns",
        plan: DEFAULT_PLAN,
        perm: DEFAULT_PERM,
    },
    CheckerCase {
        name: "name-only",
        base_url: "http://my-dns.co",
        cookie_name_in: Some("my-cookie-name"),
        plans: &[],
        cookie_name: "my-cookie-name",
        plan: DEFAULT_PLAN,
        perm: DEFAULT_PERM,
    },
    CheckerCase {
        name: "1plans",
        base_url: "https://sub.dns.co/",
        cookie_name_in: None,
        plans: &[("Anonymous", 6)],
        cookie_name: "__Host-sub-dns",
        plan: "Anonymous",
        perm: 6,
    },
    CheckerCase {
        name: "3plans",
        base_url: "http://sub.dns.co//./sss/..///-_-my.dir_-_.jpg///",
        cookie_name_in: None,
        plans: &[("Anonymous", 6), ("Personal", 48), ("Enterprise", 0)],
        cookie_name: "my-dir",
        plan: "Personal",
        perm: 48,
    },
    CheckerCase {
        name: "localhost",
        base_url: "http://localhost:8080/",
        cookie_name_in: None,
        plans: &[("Anonymous", 6), ("Personal", 48), ("Enterprise", -1)],
        cookie_name: DEFAULT_COOKIE_NAME,
        plan: "Enterprise",
        perm: -1,
    },
    CheckerCase {
        name: "customPlan",
        base_url: "https://my-dns.co:8080/my/sub/-_-my.dir_-_.jpg/",
        cookie_name_in: None,
        plans: &[("Anonymous", 6), ("Personal", 48), ("Enterprise", -1)],
        cookie_name: "__Secure-my-dir",
        plan: "55",
        perm: 55,
    },
];

#[tokio::test]
async fn test_checker_cases() {
    for case in CASES {
        let ctl = Arc::new(controller(case.base_url, case.cookie_name_in, plans(case.plans)).unwrap());
        assert_eq!(ctl.cookie().name, case.cookie_name, "{}", case.name);

        let token = ctl.issue_token(case.plan).unwrap();
        let cookie = format!("{}={}", case.cookie_name, token);

        for policy in [Policy::Chk, Policy::Vet] {
            let (response, seen) = call(&ctl, policy, Some(cookie.clone())).await;
            assert_eq!(response.status(), StatusCode::OK, "{}", case.name);
            assert_eq!(seen, Some(Some(Perm::new(case.perm))), "{}", case.name);
        }

        let (response, seen) = call(&ctl, Policy::Set, None).await;
        assert_eq!(response.status(), StatusCode::OK, "{}", case.name);
        assert_eq!(response.headers().get_all(header::SET_COOKIE).iter().count(), 1, "{}", case.name);
        let first_perm = case.plans.first().map_or(DEFAULT_PERM, |(_, perm)| *perm);
        assert_eq!(seen, Some(Some(Perm::new(first_perm))), "{}", case.name);
    }
}

#[test]
fn test_odd_plan_list_is_rejected() {
    let items = vec![
        PlanItem::Name("Anonymous".into()),
        PlanItem::Level(6),
        PlanItem::Name("Personal".into()),
    ];
    assert!(matches!(
        controller("http://my-dns.co/dir", None, items),
        Err(AccessError::OddPlanList(3))
    ));
}

#[tokio::test]
async fn test_chk_without_cookie_never_calls_downstream() {
    let ctl = Arc::new(controller("http://my-dns.co", None, vec![]).unwrap());

    let (response, seen) = call(&ctl, Policy::Chk, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(seen, None);

    let (response, seen) = call(&ctl, Policy::Chk, Some("my-dns=not.a.token".into())).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(seen, None);
}

#[tokio::test]
async fn test_vet_without_cookie_uses_default_permission() {
    let ctl = Arc::new(controller("http://my-dns.co", None, plans(&[("Anonymous", 6), ("Personal", 48)])).unwrap());

    let (response, seen) = call(&ctl, Policy::Vet, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(seen, Some(Some(Perm::new(6))));

    let (_, seen) = call(&ctl, Policy::Vet, Some("my-dns=garbage".into())).await;
    assert_eq!(seen, Some(Some(Perm::new(6))));
}

#[tokio::test]
async fn test_set_returns_one_cookie_whatever_the_request() {
    let ctl = Arc::new(controller("https://my-dns.co/", None, plans(&[("Personal", 48)])).unwrap());
    let existing = format!("__Host-my-dns={}", ctl.issue_token("Personal").unwrap());

    for cookie in [None, Some(existing), Some("__Host-my-dns=junk".to_string())] {
        let (response, _) = call(&ctl, Policy::Set, cookie).await;
        let cookies: Vec<_> = response.headers().get_all(header::SET_COOKIE).iter().collect();
        assert_eq!(cookies.len(), 1);

        let cookie = cookies[0].to_str().unwrap();
        assert!(cookie.starts_with("__Host-my-dns="));
        assert!(cookie.contains("; Path=/;"));
        assert!(cookie.contains("; HttpOnly; SameSite=Strict; Secure"));
    }
}

#[tokio::test]
async fn test_cookie_from_another_key_is_rejected() {
    let ctl = Arc::new(controller("http://my-dns.co", None, vec![]).unwrap());
    let other = Tokenizer::new(&"22".repeat(32), false).unwrap();
    let token = other
        .gen_access_token("1m", "1h", "", vec![DEFAULT_PLAN.into()], vec![])
        .unwrap();

    let (response, seen) = call(&ctl, Policy::Chk, Some(format!("my-dns={token}"))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(seen, None);
}

#[test]
fn test_state_rejects_timeout_above_max_ttl() {
    let mut cfg = SigilConfig::default();
    cfg.token.algo_key = Some(format!("HS256:{SECRET_HEX}"));
    cfg.token.timeout = "2h".into();
    cfg.token.max_ttl = "1h".into();
    assert!(AppState::init(&cfg).is_err());

    cfg.token.timeout = "1h".into();
    assert!(AppState::init(&cfg).is_ok());
}

#[tokio::test]
async fn test_demo_router_login_flow() {
    let mut cfg = SigilConfig::default();
    cfg.token.algo_key = Some(format!("HS256:{SECRET_HEX}"));
    cfg.access.base_url = "http://my-dns.co".into();
    cfg.access.plans = plans(&[("FreePlan", 1), ("PremiumPlan", 100)]);
    let app = routes::router(AppState::init(&cfg).unwrap());

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/private").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/login").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    let cookie = set_cookie.split(';').next().unwrap().to_string();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/private")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["perm"], 1);
    assert_eq!(json["area"], "private");
}
