//! Per-device command status flags.
//!
//! Two 32-bit registers indexed by [`CommandKind`]: `active` records that a
//! command reached its parser, `error` records that its session call, parse
//! or record conversion failed. The registers are independent, so a kind can
//! be active and errored at once.
//!
//! Bits are laid out in catalogue order from the most significant of the
//! used bits down: `show_version` alone reads as 1024, `show_interface_status`
//! alone as 1.

use crate::error::Result;
use crate::models::CommandKind;
use serde::{Deserialize, Serialize};

/// Fixed serialized width of a register
pub const REGISTER_WIDTH: usize = 32;

/// One bit per command kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlagBits(u32);

impl FlagBits {
    fn mask(kind: CommandKind) -> u32 {
        let used = CommandKind::ALL.len() as u32;
        used.checked_sub(kind.bit() + 1)
            .and_then(|shift| 1_u32.checked_shl(shift))
            .unwrap_or(0)
    }

    /// Sets the bit for `kind`
    pub fn set(&mut self, kind: CommandKind) {
        self.0 |= Self::mask(kind);
    }

    /// Returns true if the bit for `kind` is set
    pub fn is_set(self, kind: CommandKind) -> bool {
        self.0 & Self::mask(kind) != 0
    }

    /// Number of set bits
    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Kinds whose bit is set, in bit order
    pub fn kinds(self) -> impl Iterator<Item = CommandKind> {
        CommandKind::ALL
            .into_iter()
            .filter(move |kind| self.is_set(*kind))
    }

    /// Most-significant-bit-first, zero-padded to 32 characters.
    ///
    /// ```rust
    /// use fleetscope_core::flags::FlagBits;
    /// use fleetscope_core::models::CommandKind;
    ///
    /// let mut bits = FlagBits::default();
    /// bits.set(CommandKind::ShowInterface);
    /// assert_eq!(bits.to_binary_string(), format!("{}01000000000", "0".repeat(21)));
    /// ```
    pub fn to_binary_string(self) -> String {
        format!("{:0width$b}", self.0, width = REGISTER_WIDTH)
    }

    /// The binary string read as a base-2 integer
    pub fn to_integer(self) -> u32 {
        self.0
    }
}

/// Per-kind combination of the two registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagState {
    /// Neither bit set
    Untouched,
    /// Attempted and parsed
    Active,
    /// Parsed, then failed record conversion
    ActiveWithError,
    /// Failed before reaching the parser
    ErrorOnly,
}

/// Paired `active` and `error` registers for one device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusFlagRegister {
    pub active: FlagBits,
    pub error: FlagBits,
}

impl StatusFlagRegister {
    /// Creates a register pair with every bit clear
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `kind` as attempted with a parser result
    pub fn set_active(&mut self, kind: CommandKind) {
        self.active.set(kind);
    }

    /// Marks `kind` as failed
    pub fn set_error(&mut self, kind: CommandKind) {
        self.error.set(kind);
    }

    /// Sets the active bit for a kind given by name.
    ///
    /// # Errors
    /// Returns `FleetError::UnknownCommandKind` for names outside the catalogue.
    pub fn set_active_by_name(&mut self, name: &str) -> Result<()> {
        let kind: CommandKind = name.parse()?;
        self.set_active(kind);
        Ok(())
    }

    /// Sets the error bit for a kind given by name.
    ///
    /// # Errors
    /// Returns `FleetError::UnknownCommandKind` for names outside the catalogue.
    pub fn set_error_by_name(&mut self, name: &str) -> Result<()> {
        let kind: CommandKind = name.parse()?;
        self.set_error(kind);
        Ok(())
    }

    /// True if `kind` reached its parser
    pub fn is_active(&self, kind: CommandKind) -> bool {
        self.active.is_set(kind)
    }

    /// True if `kind` failed
    pub fn has_error(&self, kind: CommandKind) -> bool {
        self.error.is_set(kind)
    }

    /// Combined state of both registers for `kind`
    pub fn state(&self, kind: CommandKind) -> FlagState {
        match (self.is_active(kind), self.has_error(kind)) {
            (false, false) => FlagState::Untouched,
            (true, false) => FlagState::Active,
            (true, true) => FlagState::ActiveWithError,
            (false, true) => FlagState::ErrorOnly,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FleetError;

    #[test]
    fn test_binary_string_fixed_width() {
        let mut register = StatusFlagRegister::new();
        assert_eq!(register.active.to_binary_string(), "0".repeat(32));

        for kind in CommandKind::ALL {
            register.set_active(kind);
        }
        let bits = register.active.to_binary_string();
        assert_eq!(bits.len(), REGISTER_WIDTH);
        assert_eq!(&bits[..21], "0".repeat(21));
        assert_eq!(&bits[21..], "1".repeat(11));
    }

    #[test]
    fn test_to_integer_matches_binary_string() {
        let mut register = StatusFlagRegister::new();
        register.set_error(CommandKind::ShowVersion);
        register.set_error(CommandKind::ShowInterfaceStatus);

        let bits = register.error.to_binary_string();
        assert_eq!(u32::from_str_radix(&bits, 2).unwrap(), register.error.to_integer());
        assert_eq!(register.error.to_integer(), 0b100_0000_0001);
    }

    #[test]
    fn test_show_version_is_most_significant_used_bit() {
        let mut bits = FlagBits::default();
        bits.set(CommandKind::ShowVersion);
        assert_eq!(bits.to_integer(), 1024);
        assert_eq!(bits.to_binary_string(), format!("{}1{}", "0".repeat(21), "0".repeat(10)));

        let mut bits = FlagBits::default();
        bits.set(CommandKind::ShowInterfaceStatus);
        assert_eq!(bits.to_integer(), 1);

        let mut bits = FlagBits::default();
        bits.set(CommandKind::ShowInterface);
        bits.set(CommandKind::ShowIpArp);
        assert_eq!(bits.to_integer(), 512 + 64);
    }

    #[test]
    fn test_active_and_error_are_independent() {
        let mut register = StatusFlagRegister::new();
        register.set_active(CommandKind::ShowIpArp);
        register.set_error(CommandKind::ShowIpArp);
        register.set_error(CommandKind::ShowVlan);
        register.set_active(CommandKind::ShowVersion);

        assert_eq!(register.state(CommandKind::ShowIpArp), FlagState::ActiveWithError);
        assert_eq!(register.state(CommandKind::ShowVlan), FlagState::ErrorOnly);
        assert_eq!(register.state(CommandKind::ShowVersion), FlagState::Active);
        assert_eq!(register.state(CommandKind::ShowLogging), FlagState::Untouched);
    }

    #[test]
    fn test_unknown_kind_name_fails_loudly() {
        let mut register = StatusFlagRegister::new();
        let error = register.set_active_by_name("show_tech_support").unwrap_err();
        assert!(matches!(error, FleetError::UnknownCommandKind { .. }));
        assert!(register.set_error_by_name("show_bogus").is_err());
        assert_eq!(register, StatusFlagRegister::new());

        register.set_active_by_name("show_ip_arp").unwrap();
        assert!(register.is_active(CommandKind::ShowIpArp));
    }

    #[test]
    fn test_kinds_iterates_in_bit_order() {
        let mut bits = FlagBits::default();
        bits.set(CommandKind::ShowInterfaceStatus);
        bits.set(CommandKind::ShowVersion);
        let kinds: Vec<_> = bits.kinds().collect();
        assert_eq!(
            kinds,
            vec![CommandKind::ShowVersion, CommandKind::ShowInterfaceStatus]
        );
        assert_eq!(bits.count(), 2);
    }
}
