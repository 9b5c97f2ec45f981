//! Roles and the capabilities they grant.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

bitflags! {
    /// Operations an actor may perform.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct Capabilities: u32 {
        /// Read records the actor owns.
        const VIEW_OWN = 1 << 0;
        const ANNOUNCE_PACKAGE = 1 << 1;
        const REGISTER_PACKAGE = 1 << 2;
        const PROCESS_PACKAGE = 1 << 3;
        const UPDATE_PACKAGE_STATUS = 1 << 4;
        const DELIVER_PACKAGE = 1 << 5;
        const VIEW_ALL_PACKAGES = 1 << 6;
        const CONSOLIDATE = 1 << 7;
        const CREATE_SHIPMENT = 1 << 8;
        const ADVANCE_SHIPMENT = 1 << 9;
        const VIEW_ALL_SHIPMENTS = 1 << 10;
        const PAY = 1 << 11;
        const MANAGE_PAYMENTS = 1 << 12;
        const MANAGE_RATES = 1 << 13;
        const MANAGE_SETTINGS = 1 << 14;
        const MANAGE_USERS = 1 << 15;

        const CLIENT = Self::VIEW_OWN.bits()
            | Self::ANNOUNCE_PACKAGE.bits()
            | Self::CONSOLIDATE.bits()
            | Self::CREATE_SHIPMENT.bits()
            | Self::PAY.bits();
        const AGENT_IN = Self::VIEW_OWN.bits()
            | Self::REGISTER_PACKAGE.bits()
            | Self::PROCESS_PACKAGE.bits()
            | Self::UPDATE_PACKAGE_STATUS.bits()
            | Self::VIEW_ALL_PACKAGES.bits();
        const AGENT_OUT = Self::VIEW_OWN.bits()
            | Self::DELIVER_PACKAGE.bits()
            | Self::ADVANCE_SHIPMENT.bits()
            | Self::VIEW_ALL_SHIPMENTS.bits();
        const ALL = u32::MAX >> 16;
    }
}

/// Who an actor is from the workflow's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Client,
    AgentIn,
    AgentOut,
    Admin,
}

impl Role {
    #[must_use]
    pub const fn capabilities(self) -> Capabilities {
        match self {
            Self::Client => Capabilities::CLIENT,
            Self::AgentIn => Capabilities::AGENT_IN,
            Self::AgentOut => Capabilities::AGENT_OUT,
            Self::Admin => Capabilities::ALL,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::AgentIn => "agent_in",
            Self::AgentOut => "agent_out",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised role name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role '{}'", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "client" => Ok(Self::Client),
            "agent_in" | "agent-in" => Ok(Self::AgentIn),
            "agent_out" | "agent-out" => Ok(Self::AgentOut),
            "admin" => Ok(Self::Admin),
            other => Err(UnknownRole(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_holds_every_capability() {
        let admin = Role::Admin.capabilities();
        for role in [Role::Client, Role::AgentIn, Role::AgentOut] {
            assert!(admin.contains(role.capabilities()), "admin must cover {role}");
        }
        assert!(admin.contains(Capabilities::MANAGE_SETTINGS | Capabilities::MANAGE_USERS));
    }

    #[test]
    fn agents_cannot_act_for_clients() {
        let agent_in = Role::AgentIn.capabilities();
        assert!(!agent_in.contains(Capabilities::ANNOUNCE_PACKAGE));
        assert!(!agent_in.contains(Capabilities::PAY));
        assert!(agent_in.contains(Capabilities::PROCESS_PACKAGE));

        let agent_out = Role::AgentOut.capabilities();
        assert!(agent_out.contains(Capabilities::DELIVER_PACKAGE));
        assert!(!agent_out.contains(Capabilities::UPDATE_PACKAGE_STATUS));
    }

    #[test]
    fn roles_parse_from_header_values() {
        assert_eq!("agent_in".parse::<Role>(), Ok(Role::AgentIn));
        assert_eq!(" Agent-Out ".parse::<Role>(), Ok(Role::AgentOut));
        assert_eq!("root".parse::<Role>(), Err(UnknownRole("root".to_owned())));
    }
}
