//! Cookie access controller configuration.

use serde::{Deserialize, Serialize};

/// One entry of the flat plan list `[name, permission, name, permission, ...]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlanItem {
    Level(i64),
    Name(String),
}

/// Configuration for the cookie-based access controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Public URL of the site; the cookie name, path and `Secure` flag derive from it.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Explicit cookie name, used as-is.
    #[serde(default)]
    pub cookie_name: Option<String>,

    /// Cookie `Max-Age` (e.g. "30days").
    #[serde(default = "default_cookie_ttl")]
    pub cookie_ttl: String,

    /// Plans as a flat list. The first plan is the default one.
    #[serde(default)]
    pub plans: Vec<PlanItem>,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            cookie_name: None,
            cookie_ttl: default_cookie_ttl(),
            plans: Vec::new(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080/".to_string()
}

fn default_cookie_ttl() -> String {
    "30days".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_items_keep_their_type() {
        let plans: Vec<PlanItem> = serde_yaml::from_str(r#"[Anonymous, 6, "55", 7]"#).unwrap();
        assert_eq!(
            plans,
            vec![
                PlanItem::Name("Anonymous".into()),
                PlanItem::Level(6),
                PlanItem::Name("55".into()),
                PlanItem::Level(7),
            ]
        );
    }
}
