//! Ownership Graph - control chains, equity interests and related parties
//!
//! Resolves who owns a company, whom it owns, and who else is related to it,
//! from a company table, a shareholder register and an officer list. Company
//! registration history and business locations are served alongside.
//!
//! ## Architecture
//! Entity Store -> Ownership Lookup -> Direct-Edge Resolver -> Traversal
//! -> Classifier / Related-Party Aggregator
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ownership_graph::{load_dir, EngineConfig, OwnershipQueryEngine};
//!
//! let (store, _report) = load_dir("data").unwrap();
//! let engine = OwnershipQueryEngine::new(Arc::new(store), EngineConfig::default());
//! let root = engine.store().find("ALP").unwrap().id;
//! for result in engine.direct_subsidiaries(root, 15.0).unwrap() {
//!     println!("{} {:.2}% {:?}", result.name, result.ownership_pct, result.tier);
//! }
//! ```

// Core error handling
pub mod error;

// Thresholds and limits
pub mod config;

// Entity tables and loader
pub mod store;

// Traversal, aggregation and views
pub mod graph;

// Related-party roster
pub mod related;

pub use config::{EngineConfig, GroupingKey};
pub use error::{OwnershipError, Result};
pub use graph::{
    classify, ownership_rate, AggregatedResult, AggregationMode, ControlTier, DirectEdgeResolver,
    Direction, OwnershipEdge, OwnershipPath, OwnershipQueryEngine, OwnershipTraversal, Relation,
    TraversalQuery,
};
pub use related::{
    PartyKind, PartyRole, PartyScope, RelatedParty, RelatedPartyAggregator, RelatedPartyInputs,
    RelativeStore,
};
pub use store::{load_dir, EntityStore, LoadReport, RegisterEntry};

// Record types
pub use ownership_types::{
    BusinessLocation, Company, CompanyId, CompanyMember, CompanyStatus, HolderType, RecordStatus,
    RegistrationEvent, RelativeRecord, ShareholderRecord,
};
