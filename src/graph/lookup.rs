//! Ownership lookup
//!
//! Direct holding percentage of one company in another, read from the
//! effective shareholder records. Holder matching is exact and
//! case-sensitive against the holder company's name or code.

use tracing::warn;

use ownership_types::{Company, CompanyId};

use crate::store::EntityStore;

/// Percentage of `owned` held directly by `holder`, or 0 when either company
/// is unknown or no effective record links them.
pub fn ownership_rate(store: &EntityStore, holder: CompanyId, owned: CompanyId) -> f64 {
    match (store.company(holder), store.company(owned)) {
        (Some(holder), Some(owned)) => rate_between(store, holder, owned),
        _ => 0.0,
    }
}

/// [`ownership_rate`] for companies already resolved. The first effective
/// matching record in table order wins.
pub fn rate_between(store: &EntityStore, holder: &Company, owned: &Company) -> f64 {
    let Some(record) = store
        .records_for(&owned.code)
        .filter(|r| store.is_effective(r))
        .find(|r| r.names_holder(holder))
    else {
        return 0.0;
    };

    let pct = record.ownership_pct;
    if !pct.is_finite() || pct < 0.0 {
        warn!(
            "Ignoring unusable ownership {} of {} in {}",
            pct, holder.name, owned.code
        );
        return 0.0;
    }
    pct
}
