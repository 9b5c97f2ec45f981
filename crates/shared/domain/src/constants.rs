//! Table names, code prefixes and fixed business constants.

pub const USER: &str = "user";
pub const PACKAGE: &str = "package";
pub const CONSOLIDATION: &str = "consolidation";
pub const SHIPMENT: &str = "shipment";
pub const PAYMENT: &str = "payment";
pub const RATE: &str = "rate";
pub const DELIVERY: &str = "delivery";
pub const SETTINGS: &str = "settings";
pub const TEMPLATE: &str = "template";
pub const AUDIT: &str = "audit";
pub const MAINTENANCE: &str = "maintenance";
pub const ADDRESS: &str = "address";

pub const TRACKING_PREFIX: &str = "BP";
pub const CONSOLIDATION_PREFIX: &str = "CONS";
pub const SHIPMENT_PREFIX: &str = "SH";
/// Random suffix length of tracking, consolidation and shipment codes.
pub const CODE_SUFFIX_LEN: usize = 8;
/// Random suffix length of customer ids (after the two initials).
pub const CUSTOMER_SUFFIX_LEN: usize = 6;
/// Initials used when neither the name nor the email yields two letters.
pub const CUSTOMER_FALLBACK_INITIALS: &str = "BP";

/// Consolidations below this member count are deactivated.
pub const MIN_CONSOLIDATION_MEMBERS: usize = 2;
/// Display precision of money amounts.
pub const MONEY_SCALE: u32 = 2;
