//! Related-party roster: organisations and individuals connected to a
//! company through ownership, office or family ties

pub mod aggregator;
pub mod relatives;
pub mod types;

pub use aggregator::{normalize, RelatedPartyAggregator, RelatedPartyInputs};
pub use relatives::RelativeStore;
pub use types::{PartyKind, PartyRole, PartyScope, RelatedParty};
