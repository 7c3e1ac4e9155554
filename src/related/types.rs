//! Related-party roster rows

use serde::Serialize;

use ownership_types::CompanyId;

/// Organisations are listed before individuals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyKind {
    Organization,
    Individual,
}

/// Which company of the group a row was found through, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyScope {
    ParentCompany,
    CurrentCompany,
    DirectSubsidiary,
    IndirectSubsidiary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyRole {
    ParentCompany,
    Subsidiary,
    IndirectSubsidiary,
    OrganizationShareholder,
    Officer,
    Shareholder,
    Relative,
}

impl PartyRole {
    pub fn kind(&self) -> PartyKind {
        match self {
            PartyRole::ParentCompany
            | PartyRole::Subsidiary
            | PartyRole::IndirectSubsidiary
            | PartyRole::OrganizationShareholder => PartyKind::Organization,
            PartyRole::Officer | PartyRole::Shareholder | PartyRole::Relative => {
                PartyKind::Individual
            }
        }
    }
}

/// One row of the related-party roster
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelatedParty {
    pub kind: PartyKind,
    pub role: PartyRole,
    pub scope: PartyScope,
    /// Code of the company the row is attached to
    pub company_code: String,
    pub company_name: String,
    pub name: String,
    /// Set when the party is itself a company in the store
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<CompanyId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ownership_pct: Option<f64>,
    /// Officer position or relationship text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    /// For relatives, the officer or shareholder they are related to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_to: Option<String>,
}
