//! Record loader
//!
//! Reads the exported JSON tables (`Company.json`, `ShareHolders.json`,
//! `CompanyMembers.json`, plus the registry tables `lsdkkd.json` and
//! `DDKD.json`) into canonical records. The exports are loosely typed:
//! numbers may arrive as strings with a decimal comma, dates as `1-Mar-21` or
//! `6/3/08`, a missing parent as `0`. Everything is normalised here so the
//! engine only ever sees ISO dates and `f64` percentages.
//!
//! A row that cannot be made canonical is skipped with a warning and counted
//! in the [`LoadReport`]; it never fails the load.

use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use ownership_types::{
    BusinessLocation, Company, CompanyId, CompanyMember, CompanyStatus, HolderType, RecordStatus,
    RegistrationEvent, ShareholderRecord,
};

use super::EntityStore;
use crate::error::Result;

pub const COMPANIES_FILE: &str = "Company.json";
pub const SHAREHOLDERS_FILE: &str = "ShareHolders.json";
pub const MEMBERS_FILE: &str = "CompanyMembers.json";
pub const REGISTRATIONS_FILE: &str = "lsdkkd.json";
pub const LOCATIONS_FILE: &str = "DDKD.json";

/// Status string the source registry uses for an operating company
const ACTIVE_STATUS_VI: &str = "Đang hoạt động";

/// Counts of loaded and skipped rows per table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub companies_loaded: usize,
    pub companies_skipped: usize,
    pub shareholders_loaded: usize,
    pub shareholders_skipped: usize,
    pub members_loaded: usize,
    pub members_skipped: usize,
    pub registrations_loaded: usize,
    pub registrations_skipped: usize,
    pub locations_loaded: usize,
    pub locations_skipped: usize,
}

// =============================================================================
// RAW ROW SHAPES
// =============================================================================

/// Number that may have been exported as text
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Num(f64),
    Text(String),
}

impl RawNumber {
    fn as_id(&self) -> Option<i64> {
        match self {
            RawNumber::Num(n) if n.fract() == 0.0 => Some(*n as i64),
            RawNumber::Num(_) => None,
            RawNumber::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawCompany {
    #[serde(rename = "ID", alias = "id")]
    id: Option<RawNumber>,
    #[serde(rename = "ParentID", alias = "parent_id")]
    parent_id: Option<RawNumber>,
    #[serde(rename = "Name", alias = "name")]
    name: Option<String>,
    #[serde(rename = "Code", alias = "code")]
    code: Option<String>,
    #[serde(rename = "MST", alias = "tax_code")]
    tax_code: Option<String>,
    #[serde(rename = "LoaiHinh", alias = "legal_form")]
    legal_form: Option<String>,
    #[serde(rename = "VonDieuLe", alias = "charter_capital")]
    charter_capital: Option<RawNumber>,
    #[serde(rename = "TinhTrangNiemYet", alias = "listing_status")]
    listing_status: Option<String>,
    #[serde(rename = "NguoiDaiDienInside", alias = "representative_inside")]
    representative_inside: Option<String>,
    #[serde(rename = "NguoiDaiDienOutside", alias = "representative_outside")]
    representative_outside: Option<String>,
    #[serde(rename = "NgayThanhLap", alias = "incorporated_on")]
    incorporated_on: Option<String>,
    #[serde(rename = "DKKD", alias = "registered_on")]
    registered_on: Option<String>,
    #[serde(rename = "TrangThai", alias = "status")]
    status: Option<String>,
    #[serde(rename = "NganhNgheKinhDoanh", alias = "business_lines")]
    business_lines: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawShareholder {
    #[serde(rename = "Code", alias = "owned_code")]
    owned_code: Option<String>,
    #[serde(rename = "PersonaOrg", alias = "holder")]
    holder: Option<String>,
    #[serde(rename = "HolderType", alias = "holder_type")]
    holder_type: Option<String>,
    #[serde(rename = "Ownership", alias = "ownership_pct")]
    ownership: Option<RawNumber>,
    #[serde(rename = "From", alias = "effective_from")]
    from: Option<String>,
    #[serde(rename = "To", alias = "effective_to")]
    to: Option<String>,
    #[serde(rename = "Status", alias = "status")]
    status: Option<String>,
    #[serde(rename = "CCCD", alias = "identity_number")]
    identity_number: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawMember {
    #[serde(rename = "Code", alias = "company_code")]
    company_code: Option<String>,
    #[serde(rename = "Name", alias = "name")]
    name: Option<String>,
    #[serde(rename = "ChucVu", alias = "position")]
    position: Option<String>,
    #[serde(rename = "CCCD", alias = "identity_number")]
    identity_number: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawRegistration {
    #[serde(rename = "Code", alias = "company_code")]
    company_code: Option<String>,
    #[serde(rename = "Lan", alias = "sequence")]
    sequence: Option<RawNumber>,
    #[serde(rename = "ThoiGian", alias = "registered_on")]
    registered_on: Option<String>,
    #[serde(rename = "ThoiGianDisplay", alias = "registered_on_text")]
    registered_on_text: Option<String>,
    #[serde(rename = "ChiTiet", alias = "details")]
    details: Option<String>,
    #[serde(rename = "Loai", alias = "kind")]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLocation {
    #[serde(rename = "Code", alias = "company_code")]
    company_code: Option<String>,
    #[serde(rename = "DonViChuQuan", alias = "managing_unit")]
    managing_unit: Option<String>,
    #[serde(rename = "TenDDKD", alias = "name")]
    name: Option<String>,
    #[serde(rename = "MaSoDangKy", alias = "registration_number")]
    registration_number: Option<String>,
    #[serde(rename = "DiaChi", alias = "address")]
    address: Option<String>,
    #[serde(rename = "NguoiDungDau", alias = "head")]
    head: Option<String>,
    #[serde(rename = "ViTri", alias = "head_position")]
    head_position: Option<String>,
    #[serde(rename = "Loai", alias = "kind")]
    kind: Option<String>,
    #[serde(rename = "TinhTrang", alias = "status")]
    status: Option<String>,
}

// =============================================================================
// FIELD NORMALISATION
// =============================================================================

/// Parse a percentage, accepting a decimal comma and a trailing `%`.
///
/// Returns `None` for text that is not a number.
pub fn parse_percent(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().trim_end_matches('%').trim().replacen(',', ".", 1);
    if cleaned.is_empty() {
        return Some(0.0);
    }
    Decimal::from_str(&cleaned).ok()?.to_f64()
}

/// Parse an amount written with thousands separators, e.g. `1,200,000,000`
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}

/// Parse `YYYY-MM-DD` (optionally followed by a time) or `D-Mon-YY[YY]`.
///
/// Two-digit years below 50 are 20xx, the rest 19xx.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    let iso = s.get(..10).unwrap_or(s);
    if let Ok(date) = NaiveDate::parse_from_str(iso, "%Y-%m-%d") {
        return Some(date);
    }

    let mut parts = s.split('-');
    let (day, month, year) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    let day: u32 = day.trim().parse().ok()?;
    let month = month_number(month.trim())?;
    let mut year: i32 = year.trim().parse().ok()?;
    if year < 100 {
        year += if year < 50 { 2000 } else { 1900 };
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse the registry's `D/M/YY` or `D/M/YYYY` dates.
///
/// Two-digit years are always 20xx.
pub fn parse_day_month_date(raw: &str) -> Option<NaiveDate> {
    let mut parts = raw.trim().split('/');
    let (day, month, year) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    let day: u32 = day.trim().parse().ok()?;
    let month: u32 = month.trim().parse().ok()?;
    let mut year: i32 = year.trim().parse().ok()?;
    if year < 100 {
        year += 2000;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

fn month_number(abbrev: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
    ];
    let key = abbrev.get(..3)?.to_ascii_lowercase();
    MONTHS.iter().position(|m| *m == key).map(|i| i as u32 + 1)
}

fn parse_company_status(raw: Option<&str>) -> CompanyStatus {
    match raw.map(str::trim) {
        Some(s) if s == ACTIVE_STATUS_VI || s.eq_ignore_ascii_case("active") => {
            CompanyStatus::Active
        }
        _ => CompanyStatus::Inactive,
    }
}

fn parse_record_status(raw: Option<&str>) -> RecordStatus {
    match raw.map(str::trim) {
        None | Some("") => RecordStatus::Active,
        Some(s) if s == ACTIVE_STATUS_VI || s.eq_ignore_ascii_case("active") => {
            RecordStatus::Active
        }
        Some(_) => RecordStatus::Inactive,
    }
}

fn parse_holder_type(raw: &str) -> Option<HolderType> {
    match raw.trim().to_lowercase().as_str() {
        "organization" | "organisation" | "org" | "tổ chức" => Some(HolderType::Organization),
        "individual" | "person" | "cá nhân" => Some(HolderType::Individual),
        _ => None,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn optional_date(raw: Option<&str>, field: &str, row: usize) -> Option<NaiveDate> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
    let parsed = parse_date(raw);
    if parsed.is_none() {
        warn!("Row {}: unparseable {} {:?}, treated as absent", row, field, raw);
    }
    parsed
}

fn rows(json: &str) -> Result<Vec<serde_json::Value>> {
    Ok(serde_json::from_str(json)?)
}

// =============================================================================
// TABLE PARSERS
// =============================================================================

/// Parse the company table
pub fn parse_companies(json: &str, report: &mut LoadReport) -> Result<Vec<Company>> {
    let mut companies = Vec::new();
    for (row, value) in rows(json)?.into_iter().enumerate() {
        let raw: RawCompany = match serde_json::from_value(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Company row {}: malformed ({}), skipped", row, e);
                report.companies_skipped += 1;
                continue;
            }
        };
        match company_from_raw(raw, row) {
            Some(company) => companies.push(company),
            None => report.companies_skipped += 1,
        }
    }
    report.companies_loaded = companies.len();
    Ok(companies)
}

fn company_from_raw(raw: RawCompany, row: usize) -> Option<Company> {
    let Some(id) = raw.id.as_ref().and_then(RawNumber::as_id).filter(|id| *id != 0) else {
        warn!("Company row {}: missing or invalid ID, skipped", row);
        return None;
    };
    let (Some(name), Some(code)) = (non_empty(raw.name), non_empty(raw.code)) else {
        warn!("Company row {} (id {}): missing Name or Code, skipped", row, id);
        return None;
    };

    let charter_capital = match &raw.charter_capital {
        Some(RawNumber::Num(n)) => Decimal::from_f64_retain(*n),
        Some(RawNumber::Text(s)) => parse_amount(s),
        None => None,
    };

    Some(Company {
        id: CompanyId(id),
        parent_id: raw
            .parent_id
            .as_ref()
            .and_then(RawNumber::as_id)
            .filter(|pid| *pid != 0)
            .map(CompanyId),
        name,
        code,
        status: parse_company_status(raw.status.as_deref()),
        tax_code: non_empty(raw.tax_code),
        legal_form: non_empty(raw.legal_form),
        charter_capital,
        listing_status: non_empty(raw.listing_status),
        representative_inside: non_empty(raw.representative_inside),
        representative_outside: non_empty(raw.representative_outside),
        incorporated_on: optional_date(raw.incorporated_on.as_deref(), "incorporation date", row),
        registered_on: optional_date(raw.registered_on.as_deref(), "registration date", row),
        business_lines: non_empty(raw.business_lines),
    })
}

/// Parse the shareholder table. `companies` is used to infer the holder type
/// of rows that do not carry one.
pub fn parse_shareholders(
    json: &str,
    companies: &[Company],
    report: &mut LoadReport,
) -> Result<Vec<ShareholderRecord>> {
    let known_holders: HashSet<&str> = companies
        .iter()
        .flat_map(|c| [c.name.as_str(), c.code.as_str()])
        .collect();

    let mut records = Vec::new();
    for (row, value) in rows(json)?.into_iter().enumerate() {
        let raw: RawShareholder = match serde_json::from_value(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Shareholder row {}: malformed ({}), skipped", row, e);
                report.shareholders_skipped += 1;
                continue;
            }
        };
        match shareholder_from_raw(raw, row, &known_holders) {
            Some(record) => records.push(record),
            None => report.shareholders_skipped += 1,
        }
    }
    report.shareholders_loaded = records.len();
    Ok(records)
}

fn shareholder_from_raw(
    raw: RawShareholder,
    row: usize,
    known_holders: &HashSet<&str>,
) -> Option<ShareholderRecord> {
    let (Some(owned_code), Some(holder)) = (non_empty(raw.owned_code), non_empty(raw.holder)) else {
        warn!("Shareholder row {}: missing Code or holder, skipped", row);
        return None;
    };

    let ownership_pct = match &raw.ownership {
        None => 0.0,
        Some(RawNumber::Num(n)) => *n,
        Some(RawNumber::Text(s)) => match parse_percent(s) {
            Some(pct) => pct,
            None => {
                warn!("Shareholder row {}: unparseable ownership {:?}, skipped", row, s);
                return None;
            }
        },
    };
    if !ownership_pct.is_finite() || !(0.0..=100.0).contains(&ownership_pct) {
        warn!(
            "Shareholder row {}: ownership {} outside [0, 100], skipped",
            row, ownership_pct
        );
        return None;
    }

    let holder_type = raw
        .holder_type
        .as_deref()
        .and_then(parse_holder_type)
        .unwrap_or(if known_holders.contains(holder.as_str()) {
            HolderType::Organization
        } else {
            HolderType::Individual
        });

    Some(ShareholderRecord {
        owned_code,
        holder,
        holder_type,
        ownership_pct,
        effective_from: optional_date(raw.from.as_deref(), "From", row),
        effective_to: optional_date(raw.to.as_deref(), "To", row),
        status: parse_record_status(raw.status.as_deref()),
        identity_number: non_empty(raw.identity_number),
    })
}

/// Parse the officer table
pub fn parse_members(json: &str, report: &mut LoadReport) -> Result<Vec<CompanyMember>> {
    let mut members = Vec::new();
    for (row, value) in rows(json)?.into_iter().enumerate() {
        let raw: RawMember = match serde_json::from_value(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Member row {}: malformed ({}), skipped", row, e);
                report.members_skipped += 1;
                continue;
            }
        };
        let (Some(company_code), Some(name)) = (non_empty(raw.company_code), non_empty(raw.name))
        else {
            warn!("Member row {}: missing Code or Name, skipped", row);
            report.members_skipped += 1;
            continue;
        };
        members.push(CompanyMember {
            company_code,
            name,
            position: non_empty(raw.position).unwrap_or_default(),
            identity_number: non_empty(raw.identity_number),
        });
    }
    report.members_loaded = members.len();
    Ok(members)
}

/// Parse the registration-history table
pub fn parse_registrations(json: &str, report: &mut LoadReport) -> Result<Vec<RegistrationEvent>> {
    let mut events = Vec::new();
    for (row, value) in rows(json)?.into_iter().enumerate() {
        let raw: RawRegistration = match serde_json::from_value(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Registration row {}: malformed ({}), skipped", row, e);
                report.registrations_skipped += 1;
                continue;
            }
        };
        let Some(company_code) = non_empty(raw.company_code) else {
            warn!("Registration row {}: missing Code, skipped", row);
            report.registrations_skipped += 1;
            continue;
        };

        let registered_on_text = non_empty(raw.registered_on_text)
            .or_else(|| non_empty(raw.registered_on.clone()))
            .unwrap_or_default();
        let registered_on = raw
            .registered_on
            .as_deref()
            .and_then(parse_date)
            .or_else(|| parse_day_month_date(&registered_on_text));
        if registered_on.is_none() && !registered_on_text.is_empty() {
            warn!(
                "Registration row {}: unparseable date {:?}, kept as text",
                row, registered_on_text
            );
        }

        events.push(RegistrationEvent {
            company_code,
            sequence: raw
                .sequence
                .as_ref()
                .and_then(RawNumber::as_id)
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(0),
            registered_on,
            registered_on_text,
            details: non_empty(raw.details).unwrap_or_default(),
            kind: non_empty(raw.kind).unwrap_or_default(),
        });
    }
    report.registrations_loaded = events.len();
    Ok(events)
}

/// Parse the business-location table
pub fn parse_locations(json: &str, report: &mut LoadReport) -> Result<Vec<BusinessLocation>> {
    let mut locations = Vec::new();
    for (row, value) in rows(json)?.into_iter().enumerate() {
        let raw: RawLocation = match serde_json::from_value(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Location row {}: malformed ({}), skipped", row, e);
                report.locations_skipped += 1;
                continue;
            }
        };
        let (Some(company_code), Some(name)) = (non_empty(raw.company_code), non_empty(raw.name))
        else {
            warn!("Location row {}: missing Code or TenDDKD, skipped", row);
            report.locations_skipped += 1;
            continue;
        };
        locations.push(BusinessLocation {
            company_code,
            name,
            managing_unit: non_empty(raw.managing_unit).unwrap_or_default(),
            registration_number: non_empty(raw.registration_number).unwrap_or_default(),
            address: non_empty(raw.address).unwrap_or_default(),
            head: non_empty(raw.head).unwrap_or_default(),
            head_position: non_empty(raw.head_position).unwrap_or_default(),
            kind: non_empty(raw.kind).unwrap_or_default(),
            status: non_empty(raw.status).unwrap_or_default(),
        });
    }
    report.locations_loaded = locations.len();
    Ok(locations)
}

/// Load an entity store from a directory holding the exported tables.
///
/// `Company.json` is required; every other table is optional and treated as
/// empty when absent.
pub fn load_dir(dir: impl AsRef<Path>) -> Result<(EntityStore, LoadReport)> {
    let dir = dir.as_ref();
    let mut report = LoadReport::default();

    let companies = parse_companies(
        &std::fs::read_to_string(dir.join(COMPANIES_FILE))?,
        &mut report,
    )?;

    let shareholders = match read_optional(&dir.join(SHAREHOLDERS_FILE))? {
        Some(json) => parse_shareholders(&json, &companies, &mut report)?,
        None => Vec::new(),
    };
    let members = match read_optional(&dir.join(MEMBERS_FILE))? {
        Some(json) => parse_members(&json, &mut report)?,
        None => Vec::new(),
    };
    let registrations = match read_optional(&dir.join(REGISTRATIONS_FILE))? {
        Some(json) => parse_registrations(&json, &mut report)?,
        None => Vec::new(),
    };
    let locations = match read_optional(&dir.join(LOCATIONS_FILE))? {
        Some(json) => parse_locations(&json, &mut report)?,
        None => Vec::new(),
    };

    info!(
        "Loaded {} companies ({} skipped), {} shareholder records ({} skipped), {} members ({} skipped) from {}",
        report.companies_loaded,
        report.companies_skipped,
        report.shareholders_loaded,
        report.shareholders_skipped,
        report.members_loaded,
        report.members_skipped,
        dir.display()
    );
    info!(
        "Loaded {} registration events ({} skipped), {} business locations ({} skipped)",
        report.registrations_loaded,
        report.registrations_skipped,
        report.locations_loaded,
        report.locations_skipped
    );

    let store =
        EntityStore::new(companies, shareholders, members).with_registry(registrations, locations);
    Ok((store, report))
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        info!("{} not found, treating as empty", path.display());
        return Ok(None);
    }
    Ok(Some(std::fs::read_to_string(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_percent_decimal_comma() {
        assert_eq!(parse_percent("12,5"), Some(12.5));
        assert_eq!(parse_percent(" 60 "), Some(60.0));
        assert_eq!(parse_percent("33.25%"), Some(33.25));
        assert_eq!(parse_percent(""), Some(0.0));
        assert_eq!(parse_percent("n/a"), None);
    }

    #[test]
    fn test_parse_amount_thousands() {
        assert_eq!(parse_amount("1,200,000,000"), Some(Decimal::new(1_200_000_000, 0)));
        assert_eq!(parse_amount(""), None);
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("2021-03-01"), Some(date(2021, 3, 1)));
        assert_eq!(parse_date("2021-03-01T00:00:00"), Some(date(2021, 3, 1)));
        assert_eq!(parse_date("1-Mar-21"), Some(date(2021, 3, 1)));
        assert_eq!(parse_date("11-Feb-96"), Some(date(1996, 2, 11)));
        assert_eq!(parse_date("5-Dec-2003"), Some(date(2003, 12, 5)));
        assert_eq!(parse_date("31-Feb-21"), None);
        assert_eq!(parse_date("1-Foo-21"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_parse_companies_canonicalises_and_skips() {
        let json = r#"[
            {"ID": 1, "ParentID": 0, "Name": "Alpha", "Code": "ALP", "TrangThai": "Đang hoạt động",
             "VonDieuLe": "1,000,000", "NgayThanhLap": "11-Feb-96"},
            {"ID": "2", "ParentID": 1, "Name": "Beta", "Code": "BET", "TrangThai": "Giải thể"},
            {"ID": 3, "Name": "", "Code": "X"},
            {"ParentID": 1, "Name": "NoId", "Code": "NID"},
            "not an object"
        ]"#;
        let mut report = LoadReport::default();
        let companies = parse_companies(json, &mut report).unwrap();

        assert_eq!(companies.len(), 2);
        assert_eq!(report.companies_loaded, 2);
        assert_eq!(report.companies_skipped, 3);

        let alpha = &companies[0];
        assert_eq!(alpha.parent_id, None);
        assert!(alpha.is_active());
        assert_eq!(alpha.charter_capital, Some(Decimal::new(1_000_000, 0)));
        assert_eq!(alpha.incorporated_on, Some(date(1996, 2, 11)));

        let beta = &companies[1];
        assert_eq!(beta.parent_id, Some(CompanyId(1)));
        assert_eq!(beta.status, CompanyStatus::Inactive);
    }

    #[test]
    fn test_parse_shareholders_infers_holder_type() {
        let companies = vec![Company::new(1, "Alpha", "ALP")];
        let json = r#"[
            {"Code": "BET", "PersonaOrg": "Alpha", "Ownership": "51,5", "From": "1-Mar-21", "To": ""},
            {"Code": "BET", "PersonaOrg": "ALP", "Ownership": 10},
            {"Code": "BET", "PersonaOrg": "Nguyen Van A", "Ownership": 5, "To": "31-Dec-22"},
            {"Code": "BET", "PersonaOrg": "Broken", "Ownership": "lots"},
            {"Code": "BET", "PersonaOrg": "Too Much", "Ownership": 140},
            {"PersonaOrg": "No Code", "Ownership": 1}
        ]"#;
        let mut report = LoadReport::default();
        let records = parse_shareholders(json, &companies, &mut report).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(report.shareholders_skipped, 3);
        assert_eq!(records[0].ownership_pct, 51.5);
        assert_eq!(records[0].holder_type, HolderType::Organization);
        assert_eq!(records[0].effective_from, Some(date(2021, 3, 1)));
        assert_eq!(records[0].effective_to, None);
        assert_eq!(records[0].status, RecordStatus::Active);
        assert_eq!(records[1].holder_type, HolderType::Organization);
        assert_eq!(records[2].holder_type, HolderType::Individual);
        assert_eq!(records[2].effective_to, Some(date(2022, 12, 31)));
    }

    #[test]
    fn test_explicit_holder_type_wins() {
        let companies = vec![Company::new(1, "Alpha", "ALP")];
        let json = r#"[{"Code": "BET", "PersonaOrg": "Alpha", "HolderType": "individual", "Ownership": 3}]"#;
        let mut report = LoadReport::default();
        let records = parse_shareholders(json, &companies, &mut report).unwrap();
        assert_eq!(records[0].holder_type, HolderType::Individual);
    }

    #[test]
    fn test_parse_members() {
        let json = r#"[
            {"Code": "ALP", "Name": " Tran Thi B ", "ChucVu": "Chairman", "CCCD": "001"},
            {"Code": "ALP", "Name": "No Id", "ChucVu": "Director"},
            {"Code": "", "Name": "Orphan"}
        ]"#;
        let mut report = LoadReport::default();
        let members = parse_members(json, &mut report).unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].name, "Tran Thi B");
        assert_eq!(members[0].identity_number.as_deref(), Some("001"));
        assert_eq!(members[1].identity_number, None);
        assert_eq!(report.members_skipped, 1);
    }

    #[test]
    fn test_parse_day_month_date() {
        assert_eq!(parse_day_month_date("6/3/08"), Some(date(2008, 3, 6)));
        assert_eq!(parse_day_month_date("29/9/2009"), Some(date(2009, 9, 29)));
        assert_eq!(parse_day_month_date("31/2/10"), None);
        assert_eq!(parse_day_month_date("2009-09-29"), None);
        assert_eq!(parse_day_month_date(""), None);
    }

    #[test]
    fn test_parse_registrations() {
        let json = r#"[
            {"ID": 1, "Code": "ALP", "Lan": 0, "ThoiGian": "2008-03-06", "ThoiGianDisplay": "6/3/08",
             "ChiTiet": "Cap moi", "Loai": "Công ty"},
            {"ID": 2, "Code": "ALP", "Lan": "3", "ThoiGian": null, "ThoiGianDisplay": "29/9/2009",
             "ChiTiet": "Thay doi von", "Loai": "Công ty"},
            {"ID": 3, "Code": "ALP", "ThoiGianDisplay": "khong ro", "Loai": "Chi Nhánh"},
            {"ID": 4, "Code": "", "Lan": 1}
        ]"#;
        let mut report = LoadReport::default();
        let events = parse_registrations(json, &mut report).unwrap();

        assert_eq!(events.len(), 3);
        assert_eq!(report.registrations_skipped, 1);
        assert_eq!(events[0].registered_on, Some(date(2008, 3, 6)));
        assert_eq!(events[0].registered_on_text, "6/3/08");
        assert_eq!(events[1].sequence, 3);
        assert_eq!(events[1].registered_on, Some(date(2009, 9, 29)));
        assert_eq!(events[2].sequence, 0);
        assert_eq!(events[2].registered_on, None);
        assert_eq!(events[2].registered_on_text, "khong ro");
    }

    #[test]
    fn test_parse_locations() {
        let json = r#"[
            {"Code": "ALP", "DonViChuQuan": "Tap Doan Alpha", "TenDDKD": "Chi nhanh Ha Noi",
             "MaSoDangKy": "0101-001", "DiaChi": "Ha Noi", "NguoiDungDau": "Le Van C",
             "ViTri": "Giám đốc", "Loai": "Chi nhánh", "TinhTrang": "Đang hoạt động"},
            {"Code": "ALP", "TenDDKD": "", "Loai": "Chi nhánh"}
        ]"#;
        let mut report = LoadReport::default();
        let locations = parse_locations(json, &mut report).unwrap();
        assert_eq!(locations.len(), 1);
        assert_eq!(report.locations_skipped, 1);
        assert_eq!(locations[0].head, "Le Van C");
        assert_eq!(locations[0].registration_number, "0101-001");
        assert!(locations[0].is_branch());
        assert!(locations[0].is_active());
    }

    #[test]
    fn test_not_an_array_is_an_error() {
        let mut report = LoadReport::default();
        assert!(parse_companies("{}", &mut report).is_err());
    }

    #[test]
    fn test_load_dir_with_optional_tables() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(COMPANIES_FILE),
            r#"[{"ID": 1, "ParentID": 0, "Name": "Alpha", "Code": "ALP", "TrangThai": "Active"}]"#,
        )
        .unwrap();

        let (store, report) = load_dir(dir.path()).unwrap();
        assert_eq!(store.companies().len(), 1);
        assert!(store.shareholders().is_empty());
        assert_eq!(report.members_loaded, 0);
    }

    #[test]
    fn test_load_dir_requires_company_table() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_dir(dir.path()).is_err());
    }
}
