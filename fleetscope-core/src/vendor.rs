//! Hardware vendor lookup by address prefix.
//!
//! The table is the line-oriented `manuf` format: a colon-delimited prefix
//! (optionally masked with `/28` or `/36`), a short vendor name, and the
//! full vendor name in the remaining fields.
//!
//! # Lookup order
//! Candidate prefixes of 6, 7 and 9 hex digits are tried in that order and
//! the first hit wins, so a 24-bit block shadows any 28- or 36-bit block
//! registered inside it.

use crate::error::{FleetError, Result};
use std::collections::HashMap;
use std::sync::Arc;

pub mod source;

pub use source::{VendorFetcher, VendorSource, load_vendor_database};

/// Returned by [`VendorResolver::resolve`] for addresses that are not 12 hex digits
pub const INVALID_MAC_FORMAT: &str = "Invalid MAC format";

/// Candidate prefix lengths in hex digits, in lookup order
pub const PREFIX_LENGTHS: [usize; 3] = [6, 7, 9];

const MAC_HEX_DIGITS: usize = 12;

/// Strips every non-hex character and lowercases the rest.
///
/// # Errors
/// Returns `FleetError::AddressFormat` unless exactly 12 hex digits remain.
///
/// # Example
///
/// ```rust
/// use fleetscope_core::vendor::normalize_mac_address;
///
/// assert_eq!(normalize_mac_address("00:00:01:02:03:04").unwrap(), "000001020304");
/// assert_eq!(normalize_mac_address("6412.2582.F13F").unwrap(), "64122582f13f");
/// assert!(normalize_mac_address("00:00:01").is_err());
/// ```
pub fn normalize_mac_address(address: &str) -> Result<String> {
    let normalized: String = address
        .chars()
        .filter(char::is_ascii_hexdigit)
        .map(|c| c.to_ascii_lowercase())
        .collect();

    if normalized.len() == MAC_HEX_DIGITS {
        Ok(normalized)
    } else {
        Err(FleetError::AddressFormat {
            input: address.to_string(),
        })
    }
}

/// True if both addresses are valid and normalize to the same digits
pub fn compare_mac_addresses(first: &str, second: &str) -> bool {
    match (normalize_mac_address(first), normalize_mac_address(second)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Prefix to vendor tables, read-only once parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VendorDatabase {
    /// Lowercase hex prefix to short vendor name
    prefixes: HashMap<String, String>,
    /// Short vendor name to full vendor name
    full_names: HashMap<String, String>,
}

impl VendorDatabase {
    /// Parses `manuf`-format text.
    ///
    /// Comment lines, blank lines, lines with fewer than three fields and
    /// lines whose prefix is not hex are skipped.
    pub fn parse(text: &str) -> Self {
        let mut database = Self::default();
        let mut skipped = 0_usize;

        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = trimmed.split_whitespace().collect();
            let [prefix, short_name, full_name @ ..] = fields.as_slice() else {
                skipped += 1;
                continue;
            };
            if full_name.is_empty() {
                skipped += 1;
                continue;
            }
            let Some(prefix) = parse_prefix(prefix) else {
                skipped += 1;
                continue;
            };

            database
                .full_names
                .entry((*short_name).to_string())
                .or_insert_with(|| full_name.join(" "));
            database.prefixes.insert(prefix, (*short_name).to_string());
        }

        tracing::debug!(
            "Parsed {} vendor prefixes ({} lines skipped)",
            database.prefixes.len(),
            skipped
        );
        database
    }

    /// Number of prefixes
    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    /// Short vendor name registered for an exact prefix
    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(String::as_str)
    }

    /// Full vendor name for a short name
    pub fn full_name(&self, short_name: &str) -> Option<&str> {
        self.full_names.get(short_name).map(String::as_str)
    }

    /// Every prefix with its short vendor name, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.prefixes
            .iter()
            .map(|(prefix, vendor)| (prefix.as_str(), vendor.as_str()))
    }
}

/// `00:1B:C5:00:00:00/36` becomes `001bc5000`; `00:00:0C` becomes `00000c`.
fn parse_prefix(field: &str) -> Option<String> {
    let (digits, mask) = match field.split_once('/') {
        Some((digits, mask)) => (digits, Some(mask.parse::<usize>().ok()?)),
        None => (field, None),
    };

    let hex: String = digits
        .chars()
        .filter(|c| !matches!(c, ':' | '-' | '.'))
        .collect();
    if hex.is_empty() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let hex = hex.to_ascii_lowercase();

    match mask {
        Some(bits) if bits % 4 == 0 && bits / 4 <= hex.len() => Some(hex[..bits / 4].to_string()),
        Some(_) => None,
        None => Some(hex),
    }
}

/// Resolves hardware addresses against a shared [`VendorDatabase`].
///
/// Lookups are pure functions of the loaded table.
#[derive(Debug, Clone)]
pub struct VendorResolver {
    database: Arc<VendorDatabase>,
}

impl VendorResolver {
    pub fn new(database: VendorDatabase) -> Self {
        Self {
            database: Arc::new(database),
        }
    }

    /// The underlying table
    pub fn database(&self) -> &VendorDatabase {
        &self.database
    }

    /// Looks up the short vendor name for `address`.
    ///
    /// # Errors
    /// Returns `FleetError::AddressFormat` for malformed addresses.
    pub fn try_resolve(&self, address: &str) -> Result<Option<&str>> {
        let normalized = normalize_mac_address(address)?;
        Ok(PREFIX_LENGTHS
            .iter()
            .find_map(|len| self.database.get(&normalized[..*len])))
    }

    /// Looks up the short vendor name, never failing.
    ///
    /// Malformed addresses resolve to [`INVALID_MAC_FORMAT`]; unknown
    /// prefixes resolve to `None`.
    pub fn resolve(&self, address: &str) -> Option<String> {
        match self.try_resolve(address) {
            Ok(vendor) => vendor.map(str::to_string),
            Err(_) => Some(INVALID_MAC_FORMAT.to_string()),
        }
    }

    /// Full vendor name for `address`, if its prefix is known
    pub fn resolve_full_name(&self, address: &str) -> Option<&str> {
        let short = self.try_resolve(address).ok().flatten()?;
        self.database.full_name(short)
    }

    /// Prefixes whose short or full vendor name contains `needle`,
    /// ignoring case, sorted by prefix.
    pub fn list_prefixes_by_vendor(&self, needle: &str) -> Vec<(String, String)> {
        let needle = needle.to_lowercase();
        let mut matches: Vec<(String, String)> = self
            .database
            .iter()
            .filter(|(_, short)| {
                short.to_lowercase().contains(&needle)
                    || self
                        .database
                        .full_name(short)
                        .is_some_and(|full| full.to_lowercase().contains(&needle))
            })
            .map(|(prefix, short)| (prefix.to_string(), short.to_string()))
            .collect();
        matches.sort();
        matches
    }
}
