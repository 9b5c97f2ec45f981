//! Derived totals of a consolidation.
//!
//! Totals are always a full re-sum over the current members, staged in the
//! same batch as the membership change that invalidated them.

use chrono::{DateTime, Utc};
use fhub_kernel::domain::models::{Consolidation, Package};
use fhub_store::{Store, StoreError};
use rust_decimal::Decimal;

/// Sum of member weights and declared values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub weight: Decimal,
    pub value: Decimal,
}

impl<'a> FromIterator<&'a Package> for Totals {
    fn from_iter<I: IntoIterator<Item = &'a Package>>(iter: I) -> Self {
        iter.into_iter().fold(Self::default(), |acc, p| Self {
            weight: acc.weight + p.weight,
            value: acc.value + p.declared_value,
        })
    }
}

/// Members of `package_ids` that still exist, in joining order.
pub async fn members(store: &Store, package_ids: &[String]) -> Result<Vec<Package>, StoreError> {
    let mut packages = Vec::with_capacity(package_ids.len());
    for id in package_ids {
        packages.extend(store.get::<Package>(id).await?);
    }
    Ok(packages)
}

/// Re-sums the totals of `consolidation` over those `packages` it lists.
pub fn recompute(consolidation: &mut Consolidation, packages: &[Package], at: DateTime<Utc>) {
    let totals: Totals = packages.iter().filter(|p| consolidation.contains(&p.id)).collect();
    consolidation.total_weight = totals.weight;
    consolidation.total_value = totals.value;
    consolidation.updated_at = at;
}
