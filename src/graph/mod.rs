//! Ownership graph resolution
//!
//! The graph is never materialised. Edges are resolved per company from the
//! entity store ([`edges`]), walked breadth-first ([`traversal`]) and exposed
//! through named views on [`OwnershipQueryEngine`].

pub mod classify;
pub mod edges;
pub mod lookup;
pub mod query_engine;
pub mod traversal;
pub mod types;

pub use classify::{classify, ControlTier};
pub use edges::{DirectEdgeResolver, OwnershipEdge};
pub use lookup::ownership_rate;
pub use query_engine::OwnershipQueryEngine;
pub use traversal::OwnershipTraversal;
pub use types::{
    AggregatedResult, AggregationMode, Direction, OwnershipPath, Relation, TraversalQuery,
};
