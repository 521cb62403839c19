//! Strongly-typed ID wrappers for store-assigned record ids
//!
//! Ids are positive integers handed out by the record store. Zero marks a
//! record that has not been inserted yet. Using newtype wrappers prevents
//! accidentally mixing up ids from different tables at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Integer identity handed out by a record table
pub trait RecordId: Copy + Ord + fmt::Display {
    fn from_raw(raw: u64) -> Self;
    fn raw(&self) -> u64;
}

/// Macro to generate ID newtype wrappers
macro_rules! define_id {
    ($name:ident, $display_prefix:literal) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Placeholder carried by records that have not been inserted yet
            pub const UNASSIGNED: Self = Self(0);

            pub fn new(raw: u64) -> Self {
                Self(raw)
            }

            pub fn get(&self) -> u64 {
                self.0
            }

            pub fn is_assigned(&self) -> bool {
                self.0 != 0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, self.0)
            }
        }

        impl RecordId for $name {
            fn from_raw(raw: u64) -> Self {
                Self(raw)
            }

            fn raw(&self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.strip_prefix($display_prefix).unwrap_or(s);
                Ok(Self(s.parse()?))
            }
        }
    };
}

define_id!(ChapterId, "ch-");
define_id!(TaskId, "task-");
define_id!(BackupId, "bk-");
define_id!(DefaultChapterId, "dch-");
