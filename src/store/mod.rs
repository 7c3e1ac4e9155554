//! Entity Store
//!
//! In-memory, read-only snapshot of the company, shareholder and officer
//! tables, indexed for the joins the resolver performs (code, name, holder,
//! parent pointer). Registration history and business locations ride along
//! as per-company lists. Built once per session; nothing in a resolution run
//! mutates it, so it can be shared freely behind an `Arc`.

pub mod loader;

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

use ownership_types::{
    BusinessLocation, Company, CompanyId, CompanyMember, RegistrationEvent, ShareholderRecord,
};

pub use loader::{load_dir, LoadReport};

/// One line of a company's shareholder register
#[derive(Debug, Clone, Serialize)]
pub struct RegisterEntry {
    #[serde(flatten)]
    pub record: ShareholderRecord,
    /// Whether the holding is currently effective on the store's `as_of` date
    pub is_effective: bool,
}

/// Immutable snapshot of the entity tables
#[derive(Debug, Clone)]
pub struct EntityStore {
    companies: Vec<Company>,
    shareholders: Vec<ShareholderRecord>,
    members: Vec<CompanyMember>,
    registrations: Vec<RegistrationEvent>,
    locations: Vec<BusinessLocation>,
    /// Reference date for shareholder effectiveness
    as_of: NaiveDate,

    // Indexes hold positions into the tables above, in table order
    by_id: HashMap<CompanyId, usize>,
    by_code: HashMap<String, Vec<usize>>,
    by_name: HashMap<String, Vec<usize>>,
    children: HashMap<CompanyId, Vec<usize>>,
    records_by_owned: HashMap<String, Vec<usize>>,
    records_by_holder: HashMap<String, Vec<usize>>,
    members_by_code: HashMap<String, Vec<usize>>,
    registrations_by_code: HashMap<String, Vec<usize>>,
    locations_by_code: HashMap<String, Vec<usize>>,
}

impl EntityStore {
    /// Build a store effective as of today
    pub fn new(
        companies: Vec<Company>,
        shareholders: Vec<ShareholderRecord>,
        members: Vec<CompanyMember>,
    ) -> Self {
        let as_of = chrono::Local::now().date_naive();
        Self::build(companies, shareholders, members, as_of)
    }

    /// Same snapshot evaluated against a different reference date
    pub fn with_as_of(self, as_of: NaiveDate) -> Self {
        Self { as_of, ..self }
    }

    /// Attach the registration-history and business-location tables
    pub fn with_registry(
        mut self,
        registrations: Vec<RegistrationEvent>,
        locations: Vec<BusinessLocation>,
    ) -> Self {
        debug!(
            "Registry attached: {} registration events, {} business locations",
            registrations.len(),
            locations.len()
        );
        self.registrations_by_code = index_by_code(&registrations, |r| &r.company_code);
        self.locations_by_code = index_by_code(&locations, |l| &l.company_code);
        self.registrations = registrations;
        self.locations = locations;
        self
    }

    fn build(
        companies: Vec<Company>,
        shareholders: Vec<ShareholderRecord>,
        members: Vec<CompanyMember>,
        as_of: NaiveDate,
    ) -> Self {
        let mut by_id = HashMap::with_capacity(companies.len());
        let mut by_code: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_name: HashMap<String, Vec<usize>> = HashMap::new();
        let mut children: HashMap<CompanyId, Vec<usize>> = HashMap::new();

        for (idx, company) in companies.iter().enumerate() {
            if by_id.contains_key(&company.id) {
                warn!(
                    "Duplicate company id {} ({}); keeping the first occurrence for id lookups",
                    company.id, company.name
                );
            } else {
                by_id.insert(company.id, idx);
            }
            by_code.entry(company.code.clone()).or_default().push(idx);
            by_name.entry(company.name.clone()).or_default().push(idx);
            if let Some(parent_id) = company.parent_id {
                children.entry(parent_id).or_default().push(idx);
            }
        }

        let mut records_by_owned: HashMap<String, Vec<usize>> = HashMap::new();
        let mut records_by_holder: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, rec) in shareholders.iter().enumerate() {
            records_by_owned
                .entry(rec.owned_code.clone())
                .or_default()
                .push(idx);
            records_by_holder
                .entry(rec.holder.clone())
                .or_default()
                .push(idx);
        }

        let members_by_code = index_by_code(&members, |m| &m.company_code);

        debug!(
            "Entity store built: {} companies, {} shareholder records, {} members",
            companies.len(),
            shareholders.len(),
            members.len()
        );

        Self {
            companies,
            shareholders,
            members,
            registrations: Vec::new(),
            locations: Vec::new(),
            as_of,
            by_id,
            by_code,
            by_name,
            children,
            records_by_owned,
            records_by_holder,
            members_by_code,
            registrations_by_code: HashMap::new(),
            locations_by_code: HashMap::new(),
        }
    }

    // =========================================================================
    // TABLE ACCESS
    // =========================================================================

    pub fn as_of(&self) -> NaiveDate {
        self.as_of
    }

    pub fn companies(&self) -> &[Company] {
        &self.companies
    }

    pub fn shareholders(&self) -> &[ShareholderRecord] {
        &self.shareholders
    }

    pub fn members(&self) -> &[CompanyMember] {
        &self.members
    }

    pub fn registrations(&self) -> &[RegistrationEvent] {
        &self.registrations
    }

    pub fn locations(&self) -> &[BusinessLocation] {
        &self.locations
    }

    pub fn company(&self, id: CompanyId) -> Option<&Company> {
        self.by_id.get(&id).map(|&idx| &self.companies[idx])
    }

    /// First company carrying `code`, in table order
    pub fn company_by_code(&self, code: &str) -> Option<&Company> {
        self.by_code
            .get(code)
            .and_then(|idxs| idxs.first())
            .map(|&idx| &self.companies[idx])
    }

    /// Resolve a user-supplied key: a numeric id first, then a code
    pub fn find(&self, key: &str) -> Option<&Company> {
        let key = key.trim();
        key.parse::<i64>()
            .ok()
            .and_then(|id| self.company(CompanyId(id)))
            .or_else(|| self.company_by_code(key))
    }

    // =========================================================================
    // JOINS
    // =========================================================================

    /// Companies whose explicit parent pointer is `parent`, any status
    pub fn children_of(&self, parent: CompanyId) -> impl Iterator<Item = &Company> + '_ {
        self.children
            .get(&parent)
            .into_iter()
            .flatten()
            .map(move |&idx| &self.companies[idx])
    }

    /// Every company carrying `code`, in table order
    pub fn companies_with_code<'a>(&'a self, code: &str) -> impl Iterator<Item = &'a Company> + 'a {
        self.by_code
            .get(code)
            .into_iter()
            .flatten()
            .map(move |&idx| &self.companies[idx])
    }

    /// First company (table order) whose name or code equals `identity` and
    /// that satisfies `accept`
    pub fn first_company_named<F>(&self, identity: &str, accept: F) -> Option<&Company>
    where
        F: Fn(&Company) -> bool,
    {
        let by_name = self.by_name.get(identity).into_iter().flatten();
        let by_code = self.by_code.get(identity).into_iter().flatten();
        by_name
            .chain(by_code)
            .copied()
            .filter(|&idx| accept(&self.companies[idx]))
            .min()
            .map(|idx| &self.companies[idx])
    }

    /// Every shareholder record of the company with `owned_code`, in table order
    pub fn records_for<'a>(
        &'a self,
        owned_code: &str,
    ) -> impl Iterator<Item = &'a ShareholderRecord> + 'a {
        self.records_by_owned
            .get(owned_code)
            .into_iter()
            .flatten()
            .map(move |&idx| &self.shareholders[idx])
    }

    /// Every shareholder record naming `company` as holder, by name or by code,
    /// in table order
    pub fn records_held_by_company(&self, company: &Company) -> Vec<&ShareholderRecord> {
        let by_name = self.records_by_holder.get(&company.name).into_iter().flatten();
        let by_code = self.records_by_holder.get(&company.code).into_iter().flatten();
        let mut idxs: Vec<usize> = by_name.chain(by_code).copied().collect();
        idxs.sort_unstable();
        idxs.dedup();
        idxs.into_iter().map(|idx| &self.shareholders[idx]).collect()
    }

    /// Officers registered under `company_code`
    pub fn members_of<'a>(&'a self, company_code: &str) -> impl Iterator<Item = &'a CompanyMember> + 'a {
        self.members_by_code
            .get(company_code)
            .into_iter()
            .flatten()
            .map(move |&idx| &self.members[idx])
    }

    pub fn is_effective(&self, record: &ShareholderRecord) -> bool {
        record.is_effective_on(self.as_of)
    }

    /// Full shareholder register of a company, effective or not, largest
    /// holding first
    pub fn register_of(&self, company: &Company) -> Vec<RegisterEntry> {
        let mut entries: Vec<RegisterEntry> = self
            .records_for(&company.code)
            .map(|record| RegisterEntry {
                is_effective: self.is_effective(record),
                record: record.clone(),
            })
            .collect();
        entries.sort_by(|a, b| b.record.ownership_pct.total_cmp(&a.record.ownership_pct));
        entries
    }

    /// Registration history of a company: company-level entries before
    /// branches and offices, then by amendment number
    pub fn registration_history(&self, company: &Company) -> Vec<&RegistrationEvent> {
        let mut events: Vec<&RegistrationEvent> = self
            .registrations_by_code
            .get(&company.code)
            .into_iter()
            .flatten()
            .map(|&idx| &self.registrations[idx])
            .collect();
        events.sort_by_key(|e| (!e.is_company_level(), e.sequence));
        events
    }

    /// Business locations of a company: branches first, operating before
    /// closed, then by name
    pub fn business_locations(&self, company: &Company) -> Vec<&BusinessLocation> {
        let mut locations: Vec<&BusinessLocation> = self
            .locations_by_code
            .get(&company.code)
            .into_iter()
            .flatten()
            .map(|&idx| &self.locations[idx])
            .collect();
        locations.sort_by(|a, b| {
            (!a.is_branch(), !a.is_active())
                .cmp(&(!b.is_branch(), !b.is_active()))
                .then_with(|| a.name.cmp(&b.name))
        });
        locations
    }
}

/// Positions of `rows` grouped by company code, in table order
fn index_by_code<T>(rows: &[T], code: impl Fn(&T) -> &String) -> HashMap<String, Vec<usize>> {
    let mut index: HashMap<String, Vec<usize>> = HashMap::new();
    for (idx, row) in rows.iter().enumerate() {
        index.entry(code(row).clone()).or_default().push(idx);
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use ownership_types::{CompanyStatus, HolderType};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_store() -> EntityStore {
        let companies = vec![
            Company::new(1, "Alpha", "ALP"),
            Company::new(2, "Beta", "BET").with_parent(1),
            Company::new(3, "Gamma", "GAM")
                .with_parent(1)
                .with_status(CompanyStatus::Inactive),
            Company::new(4, "Beta", "BET2"),
        ];
        let shareholders = vec![
            ShareholderRecord::new("BET", "Alpha", HolderType::Organization, 40.0),
            ShareholderRecord::new("BET", "Nguyen Van A", HolderType::Individual, 60.0)
                .with_window(None, Some(date(2020, 1, 1))),
        ];
        let members = vec![CompanyMember::new("ALP", "Tran Thi B", "Chairman")];
        EntityStore::new(companies, shareholders, members).with_as_of(date(2024, 1, 1))
    }

    #[test]
    fn test_find_by_id_then_code() {
        let store = sample_store();
        assert_eq!(store.find("2").unwrap().code, "BET");
        assert_eq!(store.find(" GAM ").unwrap().id, CompanyId(3));
        assert!(store.find("404").is_none());
    }

    #[test]
    fn test_children_include_inactive() {
        let store = sample_store();
        let ids: Vec<_> = store.children_of(CompanyId(1)).map(|c| c.id).collect();
        assert_eq!(ids, vec![CompanyId(2), CompanyId(3)]);
    }

    #[test]
    fn test_first_company_named_prefers_table_order() {
        let store = sample_store();
        let found = store.first_company_named("Beta", |_| true).unwrap();
        assert_eq!(found.id, CompanyId(2));
        let skipped = store
            .first_company_named("Beta", |c| c.id != CompanyId(2))
            .unwrap();
        assert_eq!(skipped.id, CompanyId(4));
    }

    #[test]
    fn test_register_sorted_with_effectiveness() {
        let store = sample_store();
        let beta = store.find("BET").unwrap().clone();
        let register = store.register_of(&beta);
        assert_eq!(register.len(), 2);
        assert_eq!(register[0].record.holder, "Nguyen Van A");
        assert!(!register[0].is_effective);
        assert!(register[1].is_effective);
    }

    #[test]
    fn test_records_held_by_company_in_table_order() {
        let companies = vec![Company::new(1, "Alpha", "ALP")];
        let shareholders = vec![
            ShareholderRecord::new("C1", "ALP", HolderType::Organization, 10.0),
            ShareholderRecord::new("C2", "Alpha", HolderType::Organization, 20.0),
            ShareholderRecord::new("C3", "ALP", HolderType::Organization, 30.0),
        ];
        let store = EntityStore::new(companies, shareholders, vec![]);
        let alpha = store.find("ALP").unwrap().clone();
        let owned: Vec<&str> = store
            .records_held_by_company(&alpha)
            .iter()
            .map(|r| r.owned_code.as_str())
            .collect();
        assert_eq!(owned, vec!["C1", "C2", "C3"]);
    }

    #[test]
    fn test_registration_history_order() {
        let mut late = RegistrationEvent::new("ALP", 2, "Công ty");
        late.registered_on = Some(date(2015, 6, 1));
        let store = sample_store().with_registry(
            vec![
                RegistrationEvent::new("ALP", 0, "Chi Nhánh"),
                late,
                RegistrationEvent::new("ALP", 0, "Công ty").with_details("First issue"),
                RegistrationEvent::new("BET", 0, "Công ty"),
            ],
            vec![],
        );
        let alpha = store.find("ALP").unwrap().clone();
        let history: Vec<(u32, &str)> = store
            .registration_history(&alpha)
            .iter()
            .map(|e| (e.sequence, e.kind.as_str()))
            .collect();
        assert_eq!(history, vec![(0, "Công ty"), (2, "Công ty"), (0, "Chi Nhánh")]);
    }

    #[test]
    fn test_business_locations_order() {
        let store = sample_store().with_registry(
            vec![],
            vec![
                BusinessLocation::new("ALP", "Cua hang B", "Địa điểm kinh doanh", "Đang hoạt động"),
                BusinessLocation::new("ALP", "Chi nhanh Cu", "Chi nhánh", "Đã đóng"),
                BusinessLocation::new("ALP", "Cua hang A", "Địa điểm kinh doanh", "Đang hoạt động"),
                BusinessLocation::new("ALP", "Chi nhanh Moi", "Chi nhánh", "Đang hoạt động"),
            ],
        );
        let alpha = store.find("ALP").unwrap().clone();
        let names: Vec<&str> = store
            .business_locations(&alpha)
            .iter()
            .map(|l| l.name.as_str())
            .collect();
        assert_eq!(names, vec!["Chi nhanh Moi", "Chi nhanh Cu", "Cua hang A", "Cua hang B"]);
        let beta = store.find("BET").unwrap().clone();
        assert!(store.business_locations(&beta).is_empty());
    }

    #[test]
    fn test_members_of() {
        let store = sample_store();
        assert_eq!(store.members_of("ALP").count(), 1);
        assert_eq!(store.members_of("BET").count(), 0);
    }
}
