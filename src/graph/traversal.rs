//! Breadth-first ownership traversal
//!
//! One direction-parameterised walk serves every view: descending for
//! subsidiaries, ascending for parents. Each queued entry carries its full
//! id path so cycles are cut when a neighbour is already on the path. Every
//! quantified seed edge is expanded; deeper branches only while their
//! cumulative ownership stays at or above `min_branch_pct`. Paths are then grouped per target and combined by max
//! (control) or sum (equity).
//!
//! The walk is iterative over a `VecDeque`; a visit cap turns a pathological
//! input into [`OwnershipError::ResourceExhausted`] instead of an unbounded
//! run or a silently truncated answer.

use std::collections::{HashMap, VecDeque};

use tracing::{debug, trace, warn};

use ownership_types::{Company, CompanyId};

use super::classify::{classify, CONTROL_THRESHOLD_PCT};
use super::edges::{DirectEdgeResolver, OwnershipEdge};
use super::types::{AggregatedResult, AggregationMode, OwnershipPath, Relation, TraversalQuery};
use crate::config::{EngineConfig, GroupingKey};
use crate::error::{OwnershipError, Result};
use crate::store::EntityStore;

/// A branch waiting to be expanded
struct QueueEntry {
    company_ids: Vec<CompanyId>,
    hop_pcts: Vec<f64>,
    cumulative_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum GroupKey {
    Id(CompanyId),
    Name(String),
}

pub struct OwnershipTraversal<'a> {
    store: &'a EntityStore,
    config: &'a EngineConfig,
    resolver: DirectEdgeResolver<'a>,
}

impl<'a> OwnershipTraversal<'a> {
    pub fn new(store: &'a EntityStore, config: &'a EngineConfig) -> Self {
        Self {
            store,
            config,
            resolver: DirectEdgeResolver::new(store, config.parent_floor_pct),
        }
    }

    /// Run one traversal. An unknown root yields an empty result.
    pub fn traverse(&self, query: &TraversalQuery) -> Result<Vec<AggregatedResult>> {
        let Some(root) = self.store.company(query.root) else {
            debug!("Traversal root {} not found, empty result", query.root);
            return Ok(Vec::new());
        };

        let paths = self.collect_paths(root, query)?;
        let path_count = paths.len();
        let results = self.aggregate(paths, query);

        debug!(
            "Traversal from {} ({:?}, {:?}): {} paths, {} results",
            root.code,
            query.direction,
            query.mode,
            path_count,
            results.len()
        );
        Ok(results)
    }

    // =========================================================================
    // WALK
    // =========================================================================

    fn collect_paths(&self, root: &Company, query: &TraversalQuery) -> Result<Vec<OwnershipPath>> {
        let mut memo: HashMap<CompanyId, Vec<OwnershipEdge>> = HashMap::new();
        let mut paths = Vec::new();
        let mut queue = VecDeque::new();

        for edge in self.neighbors(&mut memo, root.id, query) {
            let company_ids = vec![root.id, edge.company_id];
            let hop_pcts = vec![edge.pct];
            paths.push(self.make_path(&company_ids, &hop_pcts, edge.pct));
            if query.include_indirect && edge.pct > 0.0 {
                queue.push_back(QueueEntry {
                    company_ids,
                    hop_pcts,
                    cumulative_pct: edge.pct,
                });
            }
        }

        let cap = self.config.max_node_visits;
        let mut visited = 0usize;

        while let Some(entry) = queue.pop_front() {
            visited += 1;
            if visited > cap {
                warn!(
                    "Traversal from {} aborted after {} node visits (cap {})",
                    root.code, visited, cap
                );
                return Err(OwnershipError::ResourceExhausted {
                    root: root.id,
                    visited,
                    cap,
                });
            }

            let Some(&terminal) = entry.company_ids.last() else {
                continue;
            };
            for edge in self.neighbors(&mut memo, terminal, query) {
                if entry.company_ids.contains(&edge.company_id) {
                    trace!(
                        "Cycle at {} via {:?}, branch dropped",
                        edge.company_id,
                        entry.company_ids
                    );
                    continue;
                }

                let cumulative_pct = entry.cumulative_pct * edge.pct / 100.0;
                let mut company_ids = entry.company_ids.clone();
                company_ids.push(edge.company_id);
                let mut hop_pcts = entry.hop_pcts.clone();
                hop_pcts.push(edge.pct);

                paths.push(self.make_path(&company_ids, &hop_pcts, cumulative_pct));
                if cumulative_pct >= query.min_branch_pct {
                    queue.push_back(QueueEntry {
                        company_ids,
                        hop_pcts,
                        cumulative_pct,
                    });
                }
            }
        }

        debug!("Traversal from {}: {} node visits", root.code, visited);
        Ok(paths)
    }

    fn neighbors(
        &self,
        memo: &mut HashMap<CompanyId, Vec<OwnershipEdge>>,
        company: CompanyId,
        query: &TraversalQuery,
    ) -> Vec<OwnershipEdge> {
        memo.entry(company)
            .or_insert_with(|| self.resolver.neighbors(company, query.direction))
            .clone()
    }

    fn make_path(&self, company_ids: &[CompanyId], hop_pcts: &[f64], cumulative_pct: f64) -> OwnershipPath {
        let mut label = self.display_name(company_ids[0]);
        for (id, pct) in company_ids[1..].iter().zip(hop_pcts) {
            label.push_str(&format!(" → {} ({:.1}%)", self.display_name(*id), pct));
        }
        OwnershipPath {
            company_ids: company_ids.to_vec(),
            hop_pcts: hop_pcts.to_vec(),
            cumulative_pct,
            is_direct: hop_pcts.len() == 1,
            chain_label: label,
        }
    }

    fn display_name(&self, id: CompanyId) -> String {
        self.store
            .company(id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    // =========================================================================
    // AGGREGATION
    // =========================================================================

    fn aggregate(&self, paths: Vec<OwnershipPath>, query: &TraversalQuery) -> Vec<AggregatedResult> {
        let mut order: Vec<GroupKey> = Vec::new();
        let mut groups: HashMap<GroupKey, Vec<OwnershipPath>> = HashMap::new();

        for path in paths {
            let key = match self.config.grouping {
                GroupingKey::Id => GroupKey::Id(path.target()),
                GroupingKey::Name => GroupKey::Name(self.display_name(path.target())),
            };
            groups
                .entry(key.clone())
                .or_insert_with(|| {
                    order.push(key);
                    Vec::new()
                })
                .push(path);
        }

        let mut results: Vec<AggregatedResult> = order
            .into_iter()
            .filter_map(|key| groups.remove(&key))
            .filter_map(|group_paths| self.combine(group_paths, query))
            .filter(|r| r.ownership_pct >= query.threshold_pct)
            .collect();

        results.sort_by(|a, b| {
            b.ownership_pct
                .total_cmp(&a.ownership_pct)
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.company_id.0.cmp(&b.company_id.0))
        });
        results
    }

    /// Combine one group's paths; `None` when the group is excluded
    fn combine(&self, paths: Vec<OwnershipPath>, query: &TraversalQuery) -> Option<AggregatedResult> {
        let first = paths.first()?;
        let company = self.store.company(first.target())?;

        let is_direct = paths.iter().any(|p| p.is_direct);
        if query.mode == AggregationMode::Equity
            && query.exclude_controlled_direct
            && paths
                .iter()
                .any(|p| p.is_direct && p.cumulative_pct > CONTROL_THRESHOLD_PCT)
        {
            trace!("{} held directly above 50%, excluded from equity view", company.code);
            return None;
        }

        let ownership_pct = match query.mode {
            AggregationMode::Control => paths
                .iter()
                .map(|p| p.cumulative_pct)
                .fold(0.0, f64::max),
            AggregationMode::Equity => paths.iter().map(|p| p.cumulative_pct).sum(),
        };

        let mut member_ids: Vec<CompanyId> = Vec::new();
        for path in &paths {
            let id = path.target();
            if !member_ids.contains(&id) {
                member_ids.push(id);
            }
        }

        Some(AggregatedResult {
            company_id: company.id,
            code: company.code.clone(),
            name: company.name.clone(),
            member_ids,
            ownership_pct,
            relation: if is_direct {
                Relation::Direct
            } else {
                Relation::Indirect
            },
            tier: classify(ownership_pct),
            paths,
        })
    }
}
