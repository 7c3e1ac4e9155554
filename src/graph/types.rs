//! Traversal query and result types

use serde::{Deserialize, Serialize};

use ownership_types::CompanyId;

use super::classify::ControlTier;

// =============================================================================
// QUERY
// =============================================================================

/// Which way ownership edges are followed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Towards owners (ultimate parents)
    Ascending,
    /// Towards owned companies (subsidiaries)
    Descending,
}

/// How several paths to the same target combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMode {
    /// Highest single cumulative path
    Control,
    /// Sum of all cumulative paths
    Equity,
}

/// Parameters of one traversal run
///
/// ```ignore
/// let query = TraversalQuery::new(root, Direction::Descending, AggregationMode::Equity)
///     .with_threshold(15.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraversalQuery {
    pub root: CompanyId,
    pub direction: Direction,
    pub mode: AggregationMode,
    /// Branches whose cumulative ownership falls below this are not expanded
    pub min_branch_pct: f64,
    /// Follow edges past the first hop
    pub include_indirect: bool,
    /// Aggregated results below this are dropped
    pub threshold_pct: f64,
    /// Drop targets held directly above 50 % (equity mode only)
    pub exclude_controlled_direct: bool,
}

impl TraversalQuery {
    pub fn new(root: CompanyId, direction: Direction, mode: AggregationMode) -> Self {
        Self {
            root,
            direction,
            mode,
            min_branch_pct: 1.0,
            include_indirect: true,
            threshold_pct: 0.0,
            exclude_controlled_direct: mode == AggregationMode::Equity,
        }
    }

    pub fn with_min_branch(mut self, pct: f64) -> Self {
        self.min_branch_pct = pct;
        self
    }

    pub fn with_threshold(mut self, pct: f64) -> Self {
        self.threshold_pct = pct;
        self
    }

    pub fn direct_only(mut self) -> Self {
        self.include_indirect = false;
        self
    }

    pub fn with_exclude_controlled_direct(mut self, exclude: bool) -> Self {
        self.exclude_controlled_direct = exclude;
        self
    }
}

// =============================================================================
// RESULTS
// =============================================================================

/// One chain of holdings from the root to a target
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnershipPath {
    /// Company ids, root first
    pub company_ids: Vec<CompanyId>,
    /// Percentage of each hop, in order
    pub hop_pcts: Vec<f64>,
    /// Product of the hop percentages, as a percentage
    pub cumulative_pct: f64,
    pub is_direct: bool,
    /// e.g. `A → B (60.0%) → C (50.0%)`
    pub chain_label: String,
}

impl OwnershipPath {
    pub fn target(&self) -> CompanyId {
        self.company_ids
            .last()
            .copied()
            .unwrap_or(CompanyId(0))
    }

    /// Cumulative ownership as a fraction in [0, 1]
    pub fn cumulative_rate(&self) -> f64 {
        self.cumulative_pct / 100.0
    }

    pub fn hops(&self) -> usize {
        self.hop_pcts.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    Direct,
    Indirect,
}

/// All paths reaching one target, combined
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedResult {
    pub company_id: CompanyId,
    pub code: String,
    pub name: String,
    /// Every company merged into this result (more than one only under name grouping)
    pub member_ids: Vec<CompanyId>,
    pub ownership_pct: f64,
    pub relation: Relation,
    pub tier: ControlTier,
    pub paths: Vec<OwnershipPath>,
}

impl AggregatedResult {
    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    pub fn has_multiple_paths(&self) -> bool {
        self.paths.len() > 1
    }

    pub fn is_direct(&self) -> bool {
        self.relation == Relation::Direct
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_defaults_follow_mode() {
        let control = TraversalQuery::new(CompanyId(1), Direction::Descending, AggregationMode::Control);
        assert!(!control.exclude_controlled_direct);
        assert!(control.include_indirect);
        assert_eq!(control.min_branch_pct, 1.0);

        let equity = TraversalQuery::new(CompanyId(1), Direction::Descending, AggregationMode::Equity)
            .with_threshold(15.0)
            .direct_only();
        assert!(equity.exclude_controlled_direct);
        assert!(!equity.include_indirect);
        assert_eq!(equity.threshold_pct, 15.0);
    }

    #[test]
    fn test_path_accessors() {
        let path = OwnershipPath {
            company_ids: vec![CompanyId(1), CompanyId(2), CompanyId(3)],
            hop_pcts: vec![60.0, 50.0],
            cumulative_pct: 30.0,
            is_direct: false,
            chain_label: "A → B (60.0%) → C (50.0%)".to_string(),
        };
        assert_eq!(path.target(), CompanyId(3));
        assert_eq!(path.hops(), 2);
        assert!((path.cumulative_rate() - 0.3).abs() < 1e-12);
    }
}
