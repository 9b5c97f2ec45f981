//! Kernel utilities shared across slices.
//! Keep this crate lightweight; it re-exports ergonomic helpers for IDs, codes,
//! config loading, authorization and (feature `server`) the HTTP plumbing.
//!
//! ## ID generation
//! Use `safe_nanoid!` for URL-safe, unambiguous IDs:
//! ```rust
//! # use fhub_kernel::safe_nanoid;
//! let id = safe_nanoid!();
//! assert_eq!(id.len(), 12);
//! ```
//!
//! ## Operations
//! Every workflow operation is a marker type naming the capability it needs:
//! ```rust
//! use fhub_kernel::domain::security::Role;
//! use fhub_kernel::security::{Actor, Operation};
//!
//! fhub_kernel::operation!(ReceivePackage, "receive_package", PROCESS_PACKAGE);
//!
//! let agent = Actor::new("user:agent", "Agent", Role::AgentIn);
//! assert!(agent.authorize::<ReceivePackage>().is_ok());
//! ```
pub mod codes;
#[cfg(not(target_arch = "wasm32"))]
pub mod config;
pub mod error;
pub mod security;
#[cfg(feature = "server")]
pub mod server;

// Alphabet excludes visually ambiguous characters (I, O, l, 0, 1).
pub const SAFE_ALPHABET: &[char; 55] = &[
    '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'L',
    'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', 'a', 'b', 'c', 'd', 'e', 'f',
    'g', 'h', 'j', 'k', 'm', 'n', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

pub use fhub_domain as domain;
pub use nanoid::nanoid;

/// Generates an unambiguous `NanoID` (no visually confusing characters).
#[macro_export]
macro_rules! safe_nanoid {
    () => {
        $crate::nanoid!(12, $crate::SAFE_ALPHABET)
    };
    ($size:expr) => {
        $crate::nanoid!($size, $crate::SAFE_ALPHABET)
    };
}

/// Generates a table-prefixed record id (`package:K7mQ2xPa9bZr`).
#[macro_export]
macro_rules! record_id {
    ($table:expr) => {
        format!("{}:{}", $table, $crate::safe_nanoid!())
    };
}

/// Declares an operation marker type and the capability it requires.
#[macro_export]
macro_rules! operation {
    ($(#[$meta:meta])* $vis:vis $name:ident, $label:literal, $($cap:ident)|+) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy)]
        $vis struct $name;

        impl $crate::security::Operation for $name {
            const NAME: &'static str = $label;
            const REQUIRES: $crate::domain::security::Capabilities =
                $crate::domain::security::Capabilities::empty()
                    $( .union($crate::domain::security::Capabilities::$cap) )+;
        }
    };
}
