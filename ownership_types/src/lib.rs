//! Ownership Types - Level 1 Foundation Records
//!
//! Plain data structures for the ownership graph: companies, shareholder
//! records, officers, user-entered relatives, registration history and
//! business locations. Every other crate in the workspace depends on these;
//! this crate depends on no workspace crate.
//!
//! ## Critical Rules
//!
//! 1. **NO GRAPH LOGIC** - traversal and aggregation live in `ownership-graph`
//! 2. **CANONICAL VALUES ONLY** - dates are ISO, percentages are `f64` in [0,100];
//!    locale parsing belongs to the loader
//! 3. **OPTIONAL MEANS ABSENT** - `None` is never a stand-in for zero or ""
//! 4. **SERIALIZABLE** - all types support serde

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// COMPANY
// ============================================================================

/// Stable company identifier, unique within one entity store.
///
/// Only meaningful inside the store; joins against shareholder and member
/// tables go through [`Company::code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompanyId(pub i64);

impl std::fmt::Display for CompanyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Operating status of a company
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CompanyStatus {
    #[default]
    Active,
    Inactive,
}

impl CompanyStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, CompanyStatus::Active)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompanyStatus::Active => "active",
            CompanyStatus::Inactive => "inactive",
        }
    }
}

/// A legal entity in the entity store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    /// Explicit parent pointer. `None` when the source carried no parent (or `0`).
    pub parent_id: Option<CompanyId>,
    pub name: String,
    /// Business key, joined against shareholder and member records
    pub code: String,
    pub status: CompanyStatus,

    // =========================================================================
    // DESCRIPTIVE ATTRIBUTES (opaque to the engine)
    // =========================================================================
    /// Tax registration number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_form: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charter_capital: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub representative_inside: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub representative_outside: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incorporated_on: Option<NaiveDate>,
    /// Business registration certificate date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registered_on: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_lines: Option<String>,
}

impl Company {
    /// Create an active company with no parent and no descriptive attributes
    pub fn new(id: i64, name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            id: CompanyId(id),
            parent_id: None,
            name: name.into(),
            code: code.into(),
            status: CompanyStatus::Active,
            tax_code: None,
            legal_form: None,
            charter_capital: None,
            listing_status: None,
            representative_inside: None,
            representative_outside: None,
            incorporated_on: None,
            registered_on: None,
            business_lines: None,
        }
    }

    /// Set the explicit parent pointer
    pub fn with_parent(mut self, parent_id: i64) -> Self {
        self.parent_id = Some(CompanyId(parent_id));
        self
    }

    pub fn with_status(mut self, status: CompanyStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_tax_code(mut self, tax_code: impl Into<String>) -> Self {
        self.tax_code = Some(tax_code.into());
        self
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

// ============================================================================
// SHAREHOLDER RECORDS
// ============================================================================

/// Kind of holder named on a shareholder record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HolderType {
    Organization,
    Individual,
}

/// Status flag carried by a shareholder record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    #[default]
    Active,
    Inactive,
}

/// One row of the shareholder register: `holder` owns `ownership_pct` of the
/// company whose code is `owned_code`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareholderRecord {
    /// Code of the *owned* company
    pub owned_code: String,
    /// Holder identity: a company name or code, or a person's name
    pub holder: String,
    pub holder_type: HolderType,
    /// Percentage in [0, 100]
    pub ownership_pct: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_from: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_to: Option<NaiveDate>,
    #[serde(default)]
    pub status: RecordStatus,
    /// Identity document of the holder, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_number: Option<String>,
}

impl ShareholderRecord {
    /// Create an active, open-ended record
    pub fn new(
        owned_code: impl Into<String>,
        holder: impl Into<String>,
        holder_type: HolderType,
        ownership_pct: f64,
    ) -> Self {
        Self {
            owned_code: owned_code.into(),
            holder: holder.into(),
            holder_type,
            ownership_pct,
            effective_from: None,
            effective_to: None,
            status: RecordStatus::Active,
            identity_number: None,
        }
    }

    /// Set the validity window
    pub fn with_window(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.effective_from = from;
        self.effective_to = to;
        self
    }

    pub fn with_status(mut self, status: RecordStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_identity(mut self, identity_number: impl Into<String>) -> Self {
        self.identity_number = Some(identity_number.into());
        self
    }

    /// Active status and the end date (if any) has not passed on `as_of`.
    ///
    /// The start date is informational only.
    pub fn is_effective_on(&self, as_of: NaiveDate) -> bool {
        self.status == RecordStatus::Active && self.effective_to.map_or(true, |to| as_of <= to)
    }

    /// Exact, case-sensitive match of the holder against a company's name or code
    pub fn names_holder(&self, company: &Company) -> bool {
        self.holder == company.name || self.holder == company.code
    }
}

// ============================================================================
// OFFICERS AND RELATIVES
// ============================================================================

/// An officer (board member, director, ...) of a company. Officers hold no
/// ownership through this record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyMember {
    pub company_code: String,
    pub name: String,
    /// Position title as registered, e.g. "Chairman"
    pub position: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_number: Option<String>,
}

impl CompanyMember {
    pub fn new(
        company_code: impl Into<String>,
        name: impl Into<String>,
        position: impl Into<String>,
    ) -> Self {
        Self {
            company_code: company_code.into(),
            name: name.into(),
            position: position.into(),
            identity_number: None,
        }
    }

    pub fn with_identity(mut self, identity_number: impl Into<String>) -> Self {
        self.identity_number = Some(identity_number.into());
        self
    }
}

/// A user-entered related person (spouse, sibling, ...) of an officer or
/// shareholder, registered under a company code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelativeRecord {
    pub relative_id: Uuid,
    pub company_code: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_number: Option<String>,
    /// Name of the officer/shareholder this person is related to
    pub related_to: String,
    /// Free-text relationship, e.g. "spouse"
    pub relationship: String,
    pub created_at: DateTime<Utc>,
}

impl RelativeRecord {
    pub fn new(
        company_code: impl Into<String>,
        name: impl Into<String>,
        related_to: impl Into<String>,
        relationship: impl Into<String>,
    ) -> Self {
        Self {
            relative_id: Uuid::new_v4(),
            company_code: company_code.into(),
            name: name.into(),
            identity_number: None,
            related_to: related_to.into(),
            relationship: relationship.into(),
            created_at: Utc::now(),
        }
    }

    pub fn with_identity(mut self, identity_number: impl Into<String>) -> Self {
        self.identity_number = Some(identity_number.into());
        self
    }
}

// ============================================================================
// REGISTRY HISTORY AND BUSINESS LOCATIONS
// ============================================================================

/// Registration kind the source uses for the head company itself
pub const REGISTRATION_KIND_COMPANY: &str = "Công ty";
/// Location kind the source uses for a branch
pub const LOCATION_KIND_BRANCH: &str = "Chi nhánh";
/// Location status the source uses for an operating site
pub const LOCATION_STATUS_ACTIVE: &str = "Đang hoạt động";

/// One amendment of a business registration certificate (company, branch or
/// representative office)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationEvent {
    pub company_code: String,
    /// Amendment number, 0 for the first issue
    pub sequence: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registered_on: Option<NaiveDate>,
    /// Date exactly as registered, kept for display when it does not parse
    #[serde(default)]
    pub registered_on_text: String,
    #[serde(default)]
    pub details: String,
    /// Registered unit kind, e.g. "Công ty" or "Chi nhánh"
    #[serde(default)]
    pub kind: String,
}

impl RegistrationEvent {
    pub fn new(company_code: impl Into<String>, sequence: u32, kind: impl Into<String>) -> Self {
        Self {
            company_code: company_code.into(),
            sequence,
            registered_on: None,
            registered_on_text: String::new(),
            details: String::new(),
            kind: kind.into(),
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }

    pub fn is_company_level(&self) -> bool {
        self.kind == REGISTRATION_KIND_COMPANY
    }
}

/// A branch or business location registered under a company
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessLocation {
    pub company_code: String,
    pub name: String,
    /// Unit the location reports to
    #[serde(default)]
    pub managing_unit: String,
    #[serde(default)]
    pub registration_number: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub head: String,
    /// Position title of the head
    #[serde(default)]
    pub head_position: String,
    /// e.g. "Chi nhánh" or "Địa điểm kinh doanh"
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub status: String,
}

impl BusinessLocation {
    pub fn new(
        company_code: impl Into<String>,
        name: impl Into<String>,
        kind: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            company_code: company_code.into(),
            name: name.into(),
            managing_unit: String::new(),
            registration_number: String::new(),
            address: String::new(),
            head: String::new(),
            head_position: String::new(),
            kind: kind.into(),
            status: status.into(),
        }
    }

    pub fn is_branch(&self) -> bool {
        self.kind == LOCATION_KIND_BRANCH
    }

    pub fn is_active(&self) -> bool {
        self.status == LOCATION_STATUS_ACTIVE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_open_ended_record_is_effective() {
        let rec = ShareholderRecord::new("B", "Alpha", HolderType::Organization, 40.0);
        assert!(rec.is_effective_on(date(2030, 1, 1)));
    }

    #[test]
    fn test_end_date_is_inclusive() {
        let rec = ShareholderRecord::new("B", "Alpha", HolderType::Organization, 40.0)
            .with_window(None, Some(date(2024, 6, 30)));
        assert!(rec.is_effective_on(date(2024, 6, 30)));
        assert!(!rec.is_effective_on(date(2024, 7, 1)));
    }

    #[test]
    fn test_inactive_status_is_never_effective() {
        let rec = ShareholderRecord::new("B", "Alpha", HolderType::Organization, 40.0)
            .with_status(RecordStatus::Inactive);
        assert!(!rec.is_effective_on(date(2000, 1, 1)));
    }

    #[test]
    fn test_future_start_date_does_not_block_effectiveness() {
        let rec = ShareholderRecord::new("B", "Alpha", HolderType::Organization, 40.0)
            .with_window(Some(date(2099, 1, 1)), None);
        assert!(rec.is_effective_on(date(2024, 1, 1)));
    }

    #[test]
    fn test_holder_matches_name_or_code_exactly() {
        let alpha = Company::new(1, "Alpha Holdings", "ALP");
        let by_name = ShareholderRecord::new("B", "Alpha Holdings", HolderType::Organization, 10.0);
        let by_code = ShareholderRecord::new("B", "ALP", HolderType::Organization, 10.0);
        let wrong_case = ShareholderRecord::new("B", "alpha holdings", HolderType::Organization, 10.0);
        assert!(by_name.names_holder(&alpha));
        assert!(by_code.names_holder(&alpha));
        assert!(!wrong_case.names_holder(&alpha));
    }

    #[test]
    fn test_company_serializes_without_absent_attributes() {
        let company = Company::new(2, "Beta", "BET").with_parent(1);
        let json = serde_json::to_value(&company).unwrap();
        assert_eq!(json["parent_id"], 1);
        assert_eq!(json["status"], "active");
        assert!(json.get("tax_code").is_none());
    }

    #[test]
    fn test_registration_and_location_kinds() {
        assert!(RegistrationEvent::new("ALP", 0, "Công ty").is_company_level());
        assert!(!RegistrationEvent::new("ALP", 1, "Chi Nhánh").is_company_level());

        let site = BusinessLocation::new("ALP", "Kho Binh Duong", "Chi nhánh", "Đang hoạt động");
        assert!(site.is_branch());
        assert!(site.is_active());
        assert!(!BusinessLocation::new("ALP", "Cua hang", "Địa điểm kinh doanh", "Tạm ngừng").is_active());
    }
}
