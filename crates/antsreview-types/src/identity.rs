//! Identity types for AntsReview
//!
//! Record identifiers are strongly typed wrappers around sequential
//! integers so a contribution id can never be passed where a review id is
//! expected. Account addresses and content hashes are opaque strings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate sequential ID types with common implementations
macro_rules! define_id_type {
    ($name:ident, $prefix:literal, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Create from a raw sequence number
            pub fn new(value: u64) -> Self {
                Self(value)
            }

            /// Get the raw sequence number
            pub fn value(&self) -> u64 {
                self.0
            }

            /// Position of this record in its owning list
            pub fn index(&self) -> Option<usize> {
                usize::try_from(self.0).ok()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}_{}", $prefix, self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

define_id_type!(TaskId, "task", "Identifier of a review task, assigned monotonically at creation");
define_id_type!(ContributionId, "contribution", "Identifier of a contribution, scoped to its task");
define_id_type!(ReviewId, "review", "Identifier of a peer review, scoped to its task");

/// An account address on the external ledger
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(pub String);

impl Address {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Opaque content-addressed reference (paper, requirements or review body).
///
/// Typically a 46-character IPFS CID, but the protocol never looks inside.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(pub String);

impl ContentHash {
    /// Length of a base58 CIDv0 such as `QmW2WQi7j6c7UgJTarActp7tDNikE4B2qXtFCfLPdsgaTQ`
    pub const CID_V0_LEN: usize = 46;

    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ContentHash {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ContentHash {
    fn from(s: String) -> Self {
        Self(s)
    }
}
