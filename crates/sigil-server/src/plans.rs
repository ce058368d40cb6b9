//! Plan names and their permission levels.

use crate::error::AccessError;
use sigil_core::PlanItem;

/// Plan used when none is configured.
pub const DEFAULT_PLAN: &str = "FreePlan";

/// Permission of [`DEFAULT_PLAN`].
pub const DEFAULT_PERM: i64 = 1;

/// Permission level injected into request extensions by the access middlewares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Perm {
    pub value: i64,
}

impl Perm {
    pub fn new(value: i64) -> Self {
        Self { value }
    }

    /// Reads the permission stored in the request extensions, if any.
    pub fn from_request<B>(req: &axum::http::Request<B>) -> Option<Self> {
        req.extensions().get::<Perm>().copied()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub name: String,
    pub perm: Perm,
}

/// Ordered plans. The first one is the default plan, minted by the Set policy.
#[derive(Debug, Clone)]
pub struct PermissionTable {
    plans: Vec<Plan>,
}

impl PermissionTable {
    /// Builds the table from a flat `[name, perm, name, perm, ...]` list.
    pub fn from_items(items: &[PlanItem]) -> Result<Self, AccessError> {
        if items.is_empty() {
            return Ok(Self {
                plans: vec![Plan {
                    name: DEFAULT_PLAN.to_string(),
                    perm: Perm::new(DEFAULT_PERM),
                }],
            });
        }
        if items.len() % 2 != 0 {
            return Err(AccessError::OddPlanList(items.len()));
        }

        let plans = items
            .chunks_exact(2)
            .enumerate()
            .map(|(i, pair)| match pair {
                [PlanItem::Name(name), PlanItem::Level(level)] => Ok(Plan {
                    name: name.clone(),
                    perm: Perm::new(*level),
                }),
                [PlanItem::Name(_), _] => Err(AccessError::InvalidPlanEntry {
                    index: 2 * i + 1,
                    expected: "permission (integer)",
                }),
                _ => Err(AccessError::InvalidPlanEntry {
                    index: 2 * i,
                    expected: "plan name (string)",
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { plans })
    }

    pub fn default_plan(&self) -> &Plan {
        &self.plans[0]
    }

    pub fn plans(&self) -> &[Plan] {
        &self.plans
    }

    /// Permission of a plan name: a configured plan, or else the name read as an integer.
    pub fn resolve(&self, name: &str) -> Option<Perm> {
        self.plans
            .iter()
            .find(|plan| plan.name == name)
            .map(|plan| plan.perm)
            .or_else(|| name.parse().ok().map(Perm::new))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(list: &str) -> Vec<PlanItem> {
        list.split(',')
            .map(|s| match s.trim().parse::<i64>() {
                Ok(level) => PlanItem::Level(level),
                Err(_) => PlanItem::Name(s.trim().to_string()),
            })
            .collect()
    }

    #[test]
    fn test_no_plans_means_default_plan() {
        let table = PermissionTable::from_items(&[]).unwrap();
        assert_eq!(table.default_plan().name, DEFAULT_PLAN);
        assert_eq!(table.default_plan().perm, Perm::new(DEFAULT_PERM));
    }

    #[test]
    fn test_first_plan_is_default() {
        let table = PermissionTable::from_items(&items("Anonymous, 6, Personal, 48, Enterprise, -1")).unwrap();
        assert_eq!(table.plans().len(), 3);
        assert_eq!(table.default_plan().name, "Anonymous");
        assert_eq!(table.resolve("Personal"), Some(Perm::new(48)));
        assert_eq!(table.resolve("Enterprise"), Some(Perm::new(-1)));
    }

    #[test]
    fn test_unknown_integer_plan() {
        let table = PermissionTable::from_items(&items("Anonymous, 6")).unwrap();
        assert_eq!(table.resolve("55"), Some(Perm::new(55)));
        assert_eq!(table.resolve("Gold"), None);
    }

    #[test]
    fn test_odd_plan_list() {
        let err = PermissionTable::from_items(&items("Anonymous, 6, Personal")).unwrap_err();
        assert!(matches!(err, AccessError::OddPlanList(3)));
    }

    #[test]
    fn test_entries_out_of_place() {
        let err = PermissionTable::from_items(&items("Anonymous, Personal")).unwrap_err();
        assert!(matches!(err, AccessError::InvalidPlanEntry { index: 1, .. }));

        let err = PermissionTable::from_items(&items("Anonymous, 6, 7, 8")).unwrap_err();
        assert!(matches!(err, AccessError::InvalidPlanEntry { index: 2, .. }));
    }

    #[test]
    fn test_perm_from_request() {
        let mut req = axum::http::Request::new(());
        assert_eq!(Perm::from_request(&req), None);
        req.extensions_mut().insert(Perm::new(48));
        assert_eq!(Perm::from_request(&req), Some(Perm::new(48)));
    }
}
