//! Ownership Query Engine
//!
//! Named views over the traversal. Each view is one [`TraversalQuery`]
//! shaped from the engine configuration, plus any post-filtering the view
//! needs. Views are pure: repeated calls over the same store return the same
//! result.

use std::collections::HashSet;
use std::sync::Arc;

use ownership_types::{BusinessLocation, CompanyId, RegistrationEvent};

use super::edges::DirectEdgeResolver;
use super::lookup;
use super::traversal::OwnershipTraversal;
use super::types::{AggregatedResult, AggregationMode, Direction, TraversalQuery};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::related::{RelatedParty, RelatedPartyAggregator, RelatedPartyInputs, RelativeStore};
use crate::store::{EntityStore, RegisterEntry};

// =============================================================================
// OWNERSHIP QUERY ENGINE
// =============================================================================

/// Engine for ownership queries over one entity store snapshot
///
/// Provides:
/// - Direct and indirect subsidiaries (control view)
/// - Equity interests, controlled subsidiaries and associates (equity view)
/// - Parent companies (ascending)
/// - Shareholder register and related-party roster
/// - Registration history and business locations
#[derive(Debug, Clone)]
pub struct OwnershipQueryEngine {
    store: Arc<EntityStore>,
    config: EngineConfig,
}

impl OwnershipQueryEngine {
    pub fn new(store: Arc<EntityStore>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run an arbitrary traversal
    pub fn traverse(&self, query: &TraversalQuery) -> Result<Vec<AggregatedResult>> {
        OwnershipTraversal::new(&self.store, &self.config).traverse(query)
    }

    /// Direct holding of `holder` in `owned`, 0 when unknown
    pub fn ownership_rate(&self, holder: CompanyId, owned: CompanyId) -> f64 {
        lookup::ownership_rate(&self.store, holder, owned)
    }

    fn query(&self, root: CompanyId, direction: Direction, mode: AggregationMode) -> TraversalQuery {
        TraversalQuery::new(root, direction, mode).with_min_branch(self.config.min_branch_pct)
    }

    // =========================================================================
    // DESCENDING VIEWS
    // =========================================================================

    /// Companies owned directly, at or above `threshold_pct`
    pub fn direct_subsidiaries(
        &self,
        root: CompanyId,
        threshold_pct: f64,
    ) -> Result<Vec<AggregatedResult>> {
        let query = self
            .query(root, Direction::Descending, AggregationMode::Control)
            .direct_only()
            .with_threshold(threshold_pct);
        self.traverse(&query)
    }

    /// Every reachable company with its strongest branch, unfiltered
    pub fn ownership_branches(&self, root: CompanyId) -> Result<Vec<AggregatedResult>> {
        let query = self.query(root, Direction::Descending, AggregationMode::Control);
        self.traverse(&query)
    }

    /// Summed equity over all paths at or above `threshold_pct`, leaving out
    /// companies already held directly above 50 %
    pub fn equity_interests(
        &self,
        root: CompanyId,
        threshold_pct: f64,
    ) -> Result<Vec<AggregatedResult>> {
        let query = self
            .query(root, Direction::Descending, AggregationMode::Equity)
            .with_threshold(threshold_pct);
        self.traverse(&query)
    }

    /// Equity interests at or above the indirect-control level
    pub fn controlled_subsidiaries(&self, root: CompanyId) -> Result<Vec<AggregatedResult>> {
        self.equity_interests(root, self.config.indirect_control_pct)
    }

    /// Equity interests between `threshold_pct` and the indirect-control level
    pub fn associated_companies(
        &self,
        root: CompanyId,
        threshold_pct: f64,
    ) -> Result<Vec<AggregatedResult>> {
        let control = self.config.indirect_control_pct;
        Ok(self
            .equity_interests(root, threshold_pct)?
            .into_iter()
            .filter(|r| r.ownership_pct < control)
            .collect())
    }

    /// Members of the group headed by `root`: companies with summed equity at
    /// or above the indirect-control level, plus every company those hold a
    /// positive stake in
    pub fn subsidiary_group(&self, root: CompanyId) -> Result<Vec<CompanyId>> {
        let query = self
            .query(root, Direction::Descending, AggregationMode::Equity)
            .with_exclude_controlled_direct(false)
            .with_threshold(self.config.indirect_control_pct);
        let controlled = self.traverse(&query)?;

        let resolver = DirectEdgeResolver::new(&self.store, self.config.parent_floor_pct);
        let mut seen: HashSet<CompanyId> = HashSet::from([root]);
        let mut group = Vec::new();
        for result in &controlled {
            if seen.insert(result.company_id) {
                group.push(result.company_id);
            }
        }
        for result in &controlled {
            for edge in resolver.owns(result.company_id) {
                if edge.pct > 0.0 && seen.insert(edge.company_id) {
                    group.push(edge.company_id);
                }
            }
        }
        Ok(group)
    }

    // =========================================================================
    // ASCENDING VIEWS
    // =========================================================================

    /// Owners of `root`, direct and through chains, with summed equity at or
    /// above `min_pct`
    pub fn parent_companies(&self, root: CompanyId, min_pct: f64) -> Result<Vec<AggregatedResult>> {
        let query = self
            .query(root, Direction::Ascending, AggregationMode::Equity)
            .with_exclude_controlled_direct(false)
            .with_threshold(min_pct);
        self.traverse(&query)
    }

    // =========================================================================
    // REGISTER AND RELATED PARTIES
    // =========================================================================

    /// Every shareholder record of `company`, effective or not
    pub fn shareholder_register(&self, company: CompanyId) -> Vec<RegisterEntry> {
        self.store
            .company(company)
            .map(|c| self.store.register_of(c))
            .unwrap_or_default()
    }

    /// Registration history of `company`, company-level entries first
    pub fn registration_history(&self, company: CompanyId) -> Vec<RegistrationEvent> {
        self.store
            .company(company)
            .map(|c| {
                self.store
                    .registration_history(c)
                    .into_iter()
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Branches and business locations of `company`
    pub fn business_locations(&self, company: CompanyId) -> Vec<BusinessLocation> {
        self.store
            .company(company)
            .map(|c| self.store.business_locations(c).into_iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Deduplicated roster of parties related to `root`
    pub fn related_parties(
        &self,
        root: CompanyId,
        relatives: &RelativeStore,
    ) -> Result<Vec<RelatedParty>> {
        let Some(company) = self.store.company(root) else {
            return Ok(Vec::new());
        };

        let parents = self.parent_companies(root, self.config.stakeholder_threshold_pct)?;
        let direct = self.direct_subsidiaries(root, self.config.display_threshold_pct)?;
        let direct_ids: HashSet<CompanyId> = direct.iter().map(|r| r.company_id).collect();
        let indirect: Vec<AggregatedResult> = self
            .controlled_subsidiaries(root)?
            .into_iter()
            .filter(|r| !direct_ids.contains(&r.company_id))
            .collect();

        let inputs = RelatedPartyInputs {
            root: company,
            parents: &parents,
            direct_subsidiaries: &direct,
            indirect_subsidiaries: &indirect,
            relatives,
        };
        Ok(RelatedPartyAggregator::new(&self.store, self.config.stakeholder_threshold_pct)
            .aggregate(&inputs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::classify::ControlTier;
    use ownership_types::{Company, HolderType, ShareholderRecord};

    /// Holdco owns Opco 60 % and Assoc 30 %; Opco owns Sub 80 %
    fn engine() -> OwnershipQueryEngine {
        let companies = vec![
            Company::new(1, "Holdco", "HLD"),
            Company::new(2, "Opco", "OPC"),
            Company::new(3, "Assoc", "ASC"),
            Company::new(4, "Sub", "SUB"),
        ];
        let records = vec![
            ShareholderRecord::new("OPC", "Holdco", HolderType::Organization, 60.0),
            ShareholderRecord::new("ASC", "Holdco", HolderType::Organization, 30.0),
            ShareholderRecord::new("SUB", "Opco", HolderType::Organization, 80.0),
        ];
        let store = EntityStore::new(companies, records, vec![]);
        OwnershipQueryEngine::new(Arc::new(store), EngineConfig::default())
    }

    fn codes(results: &[AggregatedResult]) -> Vec<&str> {
        results.iter().map(|r| r.code.as_str()).collect()
    }

    #[test]
    fn test_direct_subsidiaries() {
        let engine = engine();
        let results = engine.direct_subsidiaries(CompanyId(1), 15.0).unwrap();
        assert_eq!(codes(&results), vec!["OPC", "ASC"]);
        assert_eq!(results[0].tier, ControlTier::Control);
        assert_eq!(results[1].tier, ControlTier::SignificantInfluence);
    }

    #[test]
    fn test_equity_views() {
        let engine = engine();
        let equity = engine.equity_interests(CompanyId(1), 15.0).unwrap();
        assert_eq!(codes(&equity), vec!["SUB", "ASC"]);
        assert!((equity[0].ownership_pct - 48.0).abs() < 1e-9);

        assert!(engine.controlled_subsidiaries(CompanyId(1)).unwrap().is_empty());
        let associates = engine.associated_companies(CompanyId(1), 15.0).unwrap();
        assert_eq!(codes(&associates), vec!["SUB", "ASC"]);
    }

    #[test]
    fn test_subsidiary_group() {
        let engine = engine();
        let group = engine.subsidiary_group(CompanyId(1)).unwrap();
        assert_eq!(group, vec![CompanyId(2), CompanyId(4)]);
    }

    #[test]
    fn test_parent_companies() {
        let engine = engine();
        let parents = engine.parent_companies(CompanyId(4), 40.0).unwrap();
        assert_eq!(codes(&parents), vec!["OPC", "HLD"]);
        assert!((parents[1].ownership_pct - 48.0).abs() < 1e-9);

        let majority = engine.parent_companies(CompanyId(4), 50.0).unwrap();
        assert_eq!(codes(&majority), vec!["OPC"]);
    }

    #[test]
    fn test_unknown_root_views_are_empty() {
        let engine = engine();
        assert!(engine.ownership_branches(CompanyId(99)).unwrap().is_empty());
        assert!(engine.shareholder_register(CompanyId(99)).is_empty());
        assert!(engine.registration_history(CompanyId(99)).is_empty());
        assert!(engine.business_locations(CompanyId(99)).is_empty());
        assert!(engine
            .related_parties(CompanyId(99), &RelativeStore::new())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_registry_views() {
        let companies = vec![Company::new(1, "Holdco", "HLD")];
        let store = EntityStore::new(companies, vec![], vec![]).with_registry(
            vec![
                RegistrationEvent::new("HLD", 1, "Công ty"),
                RegistrationEvent::new("HLD", 0, "Công ty"),
            ],
            vec![BusinessLocation::new("HLD", "Kho Thu Duc", "Chi nhánh", "Đang hoạt động")],
        );
        let engine = OwnershipQueryEngine::new(Arc::new(store), EngineConfig::default());

        let sequences: Vec<u32> = engine
            .registration_history(CompanyId(1))
            .iter()
            .map(|e| e.sequence)
            .collect();
        assert_eq!(sequences, vec![0, 1]);
        assert_eq!(engine.business_locations(CompanyId(1))[0].name, "Kho Thu Duc");
    }
}
