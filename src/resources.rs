//! Cacheable resources of the distribution backend.
//!
//! Entity type names, their cache prefixes, and the report families a
//! change to each entity makes stale.

use crate::cache::{InvalidationRegistry, RegistryBuilder};

// == Resource prefixes ==
pub const ASSIGNMENTS: &str = "assignments";
pub const DETAIL_ASSIGNMENTS: &str = "detail_assignments";
pub const CASH: &str = "cash";
pub const SELLERS: &str = "sellers";
pub const FINANCES: &str = "finances";
pub const DEVOLUTIONS: &str = "devolutions";
pub const PRODUCTS: &str = "products";
pub const TYPE_PRODUCTS: &str = "type_products";
pub const YAPES: &str = "yapes";

// == Report families ==
/// Cash balance and daily/monthly summaries.
pub const FINANCE_REPORTS: &str = "finance_reports";
/// Sales, rankings, returns and earnings reports.
pub const ASSIGNMENT_REPORTS: &str = "assignment_reports";

pub const FINANCE_REPORT_ACTIONS: &[&str] = &["cash_balance", "daily_summary", "monthly_summary"];

pub const ASSIGNMENT_REPORT_ACTIONS: &[&str] = &[
    "sales_by_seller",
    "top_newspapers",
    "top_products",
    "returns_and_efficiency",
    "profits",
    "monthly_earnings",
];

/// (entity type, resource prefix, report families)
const CATALOGUE: &[(&str, &str, &[&str])] = &[
    ("Assignment", ASSIGNMENTS, &[ASSIGNMENT_REPORTS]),
    ("DetailAssignment", DETAIL_ASSIGNMENTS, &[ASSIGNMENT_REPORTS]),
    ("Cash", CASH, &[FINANCE_REPORTS]),
    ("Seller", SELLERS, &[ASSIGNMENT_REPORTS]),
    ("Finance", FINANCES, &[FINANCE_REPORTS]),
    ("Devolution", DEVOLUTIONS, &[ASSIGNMENT_REPORTS]),
    ("Product", PRODUCTS, &[ASSIGNMENT_REPORTS]),
    ("TypeProduct", TYPE_PRODUCTS, &[]),
    ("Yape", YAPES, &[FINANCE_REPORTS]),
];

/// Action-cache prefix of one report inside its family,
/// e.g. `finance_reports_cash_balance`.
pub fn report_prefix(family: &str, action: &str) -> String {
    format!("{}_{}", family, action)
}

/// Adds every catalogued entity to `builder`.
pub fn register_all(builder: RegistryBuilder) -> RegistryBuilder {
    CATALOGUE
        .iter()
        .fold(builder, |builder, (entity, prefix, families)| {
            families.iter().fold(
                builder.register(entity, prefix),
                |builder, family| builder.register_action_cache(entity, family),
            )
        })
}

/// Registry wired for the whole catalogue.
pub fn default_registry() -> InvalidationRegistry {
    register_all(InvalidationRegistry::builder()).build()
}
