//! Direct-edge resolver
//!
//! Single-hop ownership edges, merged from the two sources: the explicit
//! parent pointer on a company and the shareholder table. Edges are computed
//! on demand per company and never stored as a graph.

use std::collections::HashSet;

use serde::Serialize;

use ownership_types::{Company, CompanyId};

use super::lookup::rate_between;
use super::types::Direction;
use crate::store::EntityStore;

/// One resolved neighbour and the holding percentage on the edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OwnershipEdge {
    pub company_id: CompanyId,
    pub pct: f64,
}

impl OwnershipEdge {
    /// Edge weight as a fraction in [0, 1]
    pub fn weight(&self) -> f64 {
        self.pct / 100.0
    }
}

pub struct DirectEdgeResolver<'a> {
    store: &'a EntityStore,
    parent_floor_pct: f64,
}

impl<'a> DirectEdgeResolver<'a> {
    /// `parent_floor_pct` is the floor used by [`Self::neighbors`] when ascending
    pub fn new(store: &'a EntityStore, parent_floor_pct: f64) -> Self {
        Self {
            store,
            parent_floor_pct,
        }
    }

    /// Companies directly owned by `parent`
    ///
    /// Children by parent pointer come first (weight may be 0 when no
    /// shareholder record quantifies them), then companies whose register
    /// names `parent` as a holder with a positive stake, in table order.
    pub fn owns(&self, parent: CompanyId) -> Vec<OwnershipEdge> {
        let Some(parent) = self.store.company(parent) else {
            return Vec::new();
        };
        let mut seen = HashSet::new();
        let mut edges = Vec::new();

        for child in self.store.children_of(parent.id) {
            if child.is_active() && child.id != parent.id && seen.insert(child.id) {
                edges.push(self.edge(parent, child, child.id));
            }
        }

        let records = self
            .store
            .records_held_by_company(parent)
            .into_iter()
            .filter(|r| self.store.is_effective(r) && r.ownership_pct > 0.0);
        for record in records {
            for owned in self.store.companies_with_code(&record.owned_code) {
                if owned.is_active() && owned.id != parent.id && seen.insert(owned.id) {
                    edges.push(self.edge(parent, owned, owned.id));
                }
            }
        }
        edges
    }

    /// Companies holding at least `floor_pct` of `child`
    ///
    /// The explicit parent comes first, then holders named in the register
    /// that resolve to an active company.
    pub fn owned_by(&self, child: CompanyId, floor_pct: f64) -> Vec<OwnershipEdge> {
        let Some(child) = self.store.company(child) else {
            return Vec::new();
        };
        let mut seen = HashSet::new();
        let mut edges = Vec::new();

        if let Some(parent) = child
            .parent_id
            .and_then(|id| self.store.company(id))
            .filter(|p| p.is_active() && p.id != child.id)
        {
            let edge = self.edge(parent, child, parent.id);
            if edge.pct >= floor_pct {
                seen.insert(parent.id);
                edges.push(edge);
            }
        }

        let records = self
            .store
            .records_for(&child.code)
            .filter(|r| self.store.is_effective(r) && r.ownership_pct >= floor_pct);
        for record in records {
            let holder = self
                .store
                .first_company_named(&record.holder, |c| c.is_active() && c.id != child.id);
            let Some(holder) = holder else {
                continue;
            };
            if seen.contains(&holder.id) {
                continue;
            }
            // the edge carries the first matching record, which may be another line
            let edge = self.edge(holder, child, holder.id);
            if edge.pct >= floor_pct {
                seen.insert(holder.id);
                edges.push(edge);
            }
        }
        edges
    }

    pub fn neighbors(&self, company: CompanyId, direction: Direction) -> Vec<OwnershipEdge> {
        match direction {
            Direction::Descending => self.owns(company),
            Direction::Ascending => self.owned_by(company, self.parent_floor_pct),
        }
    }

    fn edge(&self, holder: &Company, owned: &Company, neighbour: CompanyId) -> OwnershipEdge {
        OwnershipEdge {
            company_id: neighbour,
            pct: rate_between(self.store, holder, owned),
        }
    }
}
