//! Related-party aggregator
//!
//! Assembles one deduplicated roster for a company from resolved traversal
//! output (parents, direct and indirect subsidiaries), the officer and
//! shareholder tables, and a relatives snapshot.
//!
//! Rows are deduplicated on (role, company code, name, identity number) with
//! names and identity numbers trimmed, NFC-normalised and lower-cased. A
//! person who is both officer and shareholder therefore appears twice, once
//! per role.

use std::cmp::Ordering;
use std::collections::HashSet;

use tracing::debug;
use unicode_normalization::UnicodeNormalization;

use ownership_types::{Company, CompanyId, HolderType};

use super::relatives::RelativeStore;
use super::types::{PartyKind, PartyRole, PartyScope, RelatedParty};
use crate::graph::AggregatedResult;
use crate::store::EntityStore;

/// Resolved inputs of one aggregation run
pub struct RelatedPartyInputs<'a> {
    pub root: &'a Company,
    pub parents: &'a [AggregatedResult],
    pub direct_subsidiaries: &'a [AggregatedResult],
    /// Already restricted to controlled indirect holdings
    pub indirect_subsidiaries: &'a [AggregatedResult],
    pub relatives: &'a RelativeStore,
}

type DedupKey = (PartyRole, String, String, String);

pub struct RelatedPartyAggregator<'a> {
    store: &'a EntityStore,
    stakeholder_threshold_pct: f64,
}

impl<'a> RelatedPartyAggregator<'a> {
    pub fn new(store: &'a EntityStore, stakeholder_threshold_pct: f64) -> Self {
        Self {
            store,
            stakeholder_threshold_pct,
        }
    }

    pub fn aggregate(&self, inputs: &RelatedPartyInputs<'_>) -> Vec<RelatedParty> {
        let mut roster = Roster::default();

        let mut emitted: HashSet<CompanyId> = HashSet::new();
        emitted.insert(inputs.root.id);
        let mut scopes: Vec<(PartyScope, &Company)> = Vec::new();

        self.emit_companies(
            PartyScope::ParentCompany,
            PartyRole::ParentCompany,
            inputs.parents,
            &mut emitted,
            &mut scopes,
            &mut roster,
        );
        scopes.push((PartyScope::CurrentCompany, inputs.root));
        self.emit_companies(
            PartyScope::DirectSubsidiary,
            PartyRole::Subsidiary,
            inputs.direct_subsidiaries,
            &mut emitted,
            &mut scopes,
            &mut roster,
        );
        self.emit_companies(
            PartyScope::IndirectSubsidiary,
            PartyRole::IndirectSubsidiary,
            inputs.indirect_subsidiaries,
            &mut emitted,
            &mut scopes,
            &mut roster,
        );

        self.organization_shareholders(inputs.root, &emitted, &mut roster);

        for (scope, company) in &scopes {
            self.individuals(*scope, company, inputs.relatives, &mut roster);
        }

        let mut parties = roster.into_rows();
        parties.sort_by(compare_rows);
        debug!(
            "Related parties of {}: {} rows across {} scope companies",
            inputs.root.code,
            parties.len(),
            scopes.len()
        );
        parties
    }

    /// One organisation row per company not yet emitted; each becomes a scope
    /// company for the individual rows
    fn emit_companies<'s>(
        &self,
        scope: PartyScope,
        role: PartyRole,
        results: &[AggregatedResult],
        emitted: &mut HashSet<CompanyId>,
        scopes: &mut Vec<(PartyScope, &'s Company)>,
        roster: &mut Roster,
    ) where
        'a: 's,
    {
        for result in results {
            let Some(company) = self.store.company(result.company_id) else {
                continue;
            };
            if !emitted.insert(company.id) {
                continue;
            }
            roster.push(RelatedParty {
                kind: PartyKind::Organization,
                role,
                scope,
                company_code: company.code.clone(),
                company_name: company.name.clone(),
                name: company.name.clone(),
                company_id: Some(company.id),
                identity_number: company.tax_code.clone(),
                ownership_pct: Some(result.ownership_pct),
                position: None,
                related_to: None,
            });
            scopes.push((scope, company));
        }
    }

    /// Organisational shareholders of the current company not already listed
    fn organization_shareholders(
        &self,
        root: &Company,
        emitted: &HashSet<CompanyId>,
        roster: &mut Roster,
    ) {
        let records = self.store.records_for(&root.code).filter(|r| {
            r.holder_type == HolderType::Organization
                && self.store.is_effective(r)
                && r.ownership_pct >= self.stakeholder_threshold_pct
        });
        for record in records {
            let holder = self
                .store
                .first_company_named(&record.holder, |c| c.id != root.id);
            if holder.is_some_and(|c| emitted.contains(&c.id)) {
                continue;
            }
            roster.push(RelatedParty {
                kind: PartyKind::Organization,
                role: PartyRole::OrganizationShareholder,
                scope: PartyScope::CurrentCompany,
                company_code: holder.map_or_else(|| root.code.clone(), |c| c.code.clone()),
                company_name: holder.map_or_else(|| root.name.clone(), |c| c.name.clone()),
                name: record.holder.clone(),
                company_id: holder.map(|c| c.id),
                identity_number: record.identity_number.clone(),
                ownership_pct: Some(record.ownership_pct),
                position: None,
                related_to: None,
            });
        }
    }

    /// Officers, individual shareholders and relatives of one scope company
    fn individuals(
        &self,
        scope: PartyScope,
        company: &Company,
        relatives: &RelativeStore,
        roster: &mut Roster,
    ) {
        let row = |role: PartyRole, name: &str| RelatedParty {
            kind: PartyKind::Individual,
            role,
            scope,
            company_code: company.code.clone(),
            company_name: company.name.clone(),
            name: name.to_string(),
            company_id: None,
            identity_number: None,
            ownership_pct: None,
            position: None,
            related_to: None,
        };

        for member in self.store.members_of(&company.code) {
            roster.push(RelatedParty {
                identity_number: member.identity_number.clone(),
                position: Some(member.position.clone()).filter(|p| !p.is_empty()),
                ..row(PartyRole::Officer, &member.name)
            });
        }

        let shareholders = self.store.records_for(&company.code).filter(|r| {
            r.holder_type == HolderType::Individual
                && self.store.is_effective(r)
                && r.ownership_pct >= self.stakeholder_threshold_pct
        });
        for record in shareholders {
            roster.push(RelatedParty {
                identity_number: record.identity_number.clone(),
                ownership_pct: Some(record.ownership_pct),
                ..row(PartyRole::Shareholder, &record.holder)
            });
        }

        for relative in relatives.for_company(&company.code) {
            roster.push(RelatedParty {
                identity_number: relative.identity_number.clone(),
                position: Some(relative.relationship.clone()),
                related_to: Some(relative.related_to.clone()),
                ..row(PartyRole::Relative, &relative.name)
            });
        }
    }
}

/// Rows in insertion order, first occurrence of each key kept
#[derive(Default)]
struct Roster {
    seen: HashSet<DedupKey>,
    rows: Vec<RelatedParty>,
}

impl Roster {
    fn push(&mut self, party: RelatedParty) {
        let key = (
            party.role,
            party.company_code.clone(),
            normalize(&party.name),
            party
                .identity_number
                .as_deref()
                .map(normalize)
                .unwrap_or_default(),
        );
        if self.seen.insert(key) {
            self.rows.push(party);
        }
    }

    fn into_rows(self) -> Vec<RelatedParty> {
        self.rows
    }
}

/// Trimmed, NFC-normalised, lower-cased
pub fn normalize(value: &str) -> String {
    value.trim().nfc().collect::<String>().to_lowercase()
}

fn compare_rows(a: &RelatedParty, b: &RelatedParty) -> Ordering {
    a.kind
        .cmp(&b.kind)
        .then_with(|| a.scope.cmp(&b.scope))
        .then_with(|| match (a.ownership_pct, b.ownership_pct) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.name.cmp(&b.name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ownership_types::{CompanyMember, RelativeRecord, ShareholderRecord};
    use pretty_assertions::assert_eq;

    fn store() -> EntityStore {
        let companies = vec![Company::new(1, "Root Co", "ROOT")];
        let shareholders = vec![
            ShareholderRecord::new("ROOT", "Nguyen Van A", HolderType::Individual, 12.0),
            ShareholderRecord::new("ROOT", "Small Holder", HolderType::Individual, 2.0),
            ShareholderRecord::new("ROOT", "Outside Fund", HolderType::Organization, 25.0),
        ];
        let members = vec![
            CompanyMember::new("ROOT", "Nguyen Van A", "Chairman"),
            CompanyMember::new("ROOT", "Tran Thi B", "Director"),
            CompanyMember::new("ROOT", " tran thi b ", "Director"),
        ];
        EntityStore::new(companies, shareholders, members)
    }

    fn run(store: &EntityStore, relatives: &RelativeStore) -> Vec<RelatedParty> {
        let root = store.company(CompanyId(1)).unwrap();
        let inputs = RelatedPartyInputs {
            root,
            parents: &[],
            direct_subsidiaries: &[],
            indirect_subsidiaries: &[],
            relatives,
        };
        RelatedPartyAggregator::new(store, 10.0).aggregate(&inputs)
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Nguyễn Văn A "), "nguyễn văn a");
        // decomposed and precomposed forms compare equal
        assert_eq!(normalize("e\u{0301}"), normalize("\u{00e9}"));
    }

    #[test]
    fn test_roles_are_not_merged_but_duplicates_are() {
        let store = store();
        let parties = run(&store, &RelativeStore::new());

        let rows: Vec<(PartyRole, &str)> = parties.iter().map(|p| (p.role, p.name.as_str())).collect();
        assert_eq!(
            rows,
            vec![
                (PartyRole::OrganizationShareholder, "Outside Fund"),
                (PartyRole::Shareholder, "Nguyen Van A"),
                (PartyRole::Officer, "Nguyen Van A"),
                (PartyRole::Officer, "Tran Thi B"),
            ]
        );
    }

    #[test]
    fn test_relatives_from_snapshot() {
        let store = store();
        let relatives = RelativeStore::new()
            .save(RelativeRecord::new("ROOT", "Le Van C", "Nguyen Van A", "Son"))
            .save(RelativeRecord::new("OTHER", "Not Here", "Someone", "Wife"));
        let parties = run(&store, &relatives);

        let relative: Vec<&RelatedParty> = parties
            .iter()
            .filter(|p| p.role == PartyRole::Relative)
            .collect();
        assert_eq!(relative.len(), 1);
        assert_eq!(relative[0].related_to.as_deref(), Some("Nguyen Van A"));
        assert_eq!(relative[0].position.as_deref(), Some("Son"));
    }
}
