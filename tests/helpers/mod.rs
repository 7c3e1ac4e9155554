//! Shared fixtures for ownership integration tests
//!
//! Companies use the same string for name and code unless a test needs them
//! to differ, so holder strings in fixtures read naturally.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;

use ownership_graph::{
    AggregatedResult, Company, CompanyMember, EngineConfig, EntityStore, HolderType,
    OwnershipQueryEngine, ShareholderRecord,
};

/// Reference date every fixture store is evaluated on
pub fn as_of() -> NaiveDate {
    date(2024, 6, 30)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Company whose name and code are both `label`
pub fn company(id: i64, label: &str) -> Company {
    Company::new(id, label, label)
}

/// Organisational holding of `holder` in `owned`
pub fn org(owned: &str, holder: &str, pct: f64) -> ShareholderRecord {
    ShareholderRecord::new(owned, holder, HolderType::Organization, pct)
}

/// Individual holding of `holder` in `owned`
pub fn person(owned: &str, holder: &str, pct: f64) -> ShareholderRecord {
    ShareholderRecord::new(owned, holder, HolderType::Individual, pct)
}

pub fn officer(code: &str, name: &str, position: &str) -> CompanyMember {
    CompanyMember::new(code, name, position)
}

pub fn store(
    companies: Vec<Company>,
    records: Vec<ShareholderRecord>,
    members: Vec<CompanyMember>,
) -> EntityStore {
    EntityStore::new(companies, records, members).with_as_of(as_of())
}

pub fn engine(companies: Vec<Company>, records: Vec<ShareholderRecord>) -> OwnershipQueryEngine {
    engine_with(EngineConfig::default(), companies, records, vec![])
}

pub fn engine_with(
    config: EngineConfig,
    companies: Vec<Company>,
    records: Vec<ShareholderRecord>,
    members: Vec<CompanyMember>,
) -> OwnershipQueryEngine {
    OwnershipQueryEngine::new(Arc::new(store(companies, records, members)), config)
}

pub fn approx(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < 1e-9
}

/// Result for `code`, panicking with the codes present when missing
pub fn result_for<'a>(results: &'a [AggregatedResult], code: &str) -> &'a AggregatedResult {
    results
        .iter()
        .find(|r| r.code == code)
        .unwrap_or_else(|| panic!("{} not in {:?}", code, codes(results)))
}

pub fn codes(results: &[AggregatedResult]) -> Vec<&str> {
    results.iter().map(|r| r.code.as_str()).collect()
}
