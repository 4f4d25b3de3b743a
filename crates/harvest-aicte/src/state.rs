//! Partition set: the states and union territories listed by the source

use std::fmt;

/// Names as offered by the source's search form. `Orissa` is left out: it
/// returns nothing and was superseded by `Odisha`.
static STATES: [&str; 35] = [
    "Andaman and Nicobar Islands",
    "Andhra Pradesh",
    "Arunachal Pradesh",
    "Assam",
    "Bihar",
    "Chandigarh",
    "Chhattisgarh",
    "Dadra and Nagar Haveli",
    "Daman and Diu",
    "Delhi",
    "Goa",
    "Gujarat",
    "Haryana",
    "Himachal Pradesh",
    "Jammu and Kashmir",
    "Jharkhand",
    "Karnataka",
    "Kerala",
    "Madhya Pradesh",
    "Maharashtra",
    "Manipur",
    "Meghalaya",
    "Mizoram",
    "Nagaland",
    "Odisha",
    "Puducherry",
    "Punjab",
    "Rajasthan",
    "Sikkim",
    "Tamil Nadu",
    "Telangana",
    "Tripura",
    "Uttar Pradesh",
    "Uttarakhand",
    "West Bengal",
];

/// Width of the `[CODE]` log tag
const LOG_CODE_WIDTH: usize = 13;

/// One geographic partition, always a member of the fixed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Partition(&'static str);

impl Partition {
    /// Look up a partition by name (case-insensitive, surrounding whitespace ignored)
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = name.trim();
        STATES
            .iter()
            .copied()
            .find(|s| s.eq_ignore_ascii_case(wanted))
            .map(Self)
    }

    /// Like [`from_name`](Self::from_name) but with an error naming the valid choices.
    pub fn parse(name: &str) -> Result<Self, UnknownPartition> {
        Self::from_name(name).ok_or_else(|| UnknownPartition {
            name: name.to_string(),
        })
    }

    /// Every partition, in the source's order
    pub fn all() -> Vec<Partition> {
        STATES.iter().copied().map(Self).collect()
    }

    /// Canonical name, as sent to the source
    pub fn name(&self) -> &'static str {
        self.0
    }

    /// Short code padded to a fixed width, for interleaved log output.
    ///
    /// `Kerala` → `KERALA`, `Andaman and Nicobar Islands` → `ANDAMAN-A-N-I`.
    pub fn log_code(&self) -> String {
        let mut words = self.0.split_whitespace();
        let mut code = words.next().unwrap_or_default().to_uppercase();
        for word in words {
            if let Some(initial) = word.chars().next() {
                code.push('-');
                code.extend(initial.to_uppercase());
            }
        }
        format!("{code:<LOG_CODE_WIDTH$}")
    }

    /// File-name key of this partition's cache document
    pub fn storage_key(&self) -> String {
        harvest_store::storage_key(self.0)
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A requested partition name outside the fixed set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPartition {
    pub name: String,
}

impl fmt::Display for UnknownPartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid state {:?}. Pick one of the following:\n{}",
            self.name,
            STATES.join(", ")
        )
    }
}

impl std::error::Error for UnknownPartition {}
