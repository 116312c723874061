// ABOUTME: Calendar period granularities used to bucket step totals
// ABOUTME: Maps each period to its storage key prefix and groups the four live bucket keys
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Zen Pedometer Contributors

use crate::constants::keys;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Granularity of a step bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// Calendar day (`yyyyMMdd`)
    Daily,
    /// ISO-8601 week (`<iso-year>W<ww>`)
    Weekly,
    /// Calendar month (`yyyyMM`)
    Monthly,
    /// Calendar year (`yyyy`)
    Yearly,
}

impl Period {
    /// All periods, finest first
    pub const ALL: [Self; 4] = [Self::Daily, Self::Weekly, Self::Monthly, Self::Yearly];

    /// Storage key prefix for this period's bucket totals
    #[must_use]
    pub const fn storage_prefix(self) -> &'static str {
        match self {
            Self::Daily => keys::DAILY_PREFIX,
            Self::Weekly => keys::WEEKLY_PREFIX,
            Self::Monthly => keys::MONTHLY_PREFIX,
            Self::Yearly => keys::YEARLY_PREFIX,
        }
    }

    /// Full storage key for the bucket identified by `bucket_key`
    #[must_use]
    pub fn storage_key(self, bucket_key: &str) -> String {
        format!("{}{bucket_key}", self.storage_prefix())
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        };
        f.write_str(name)
    }
}

/// Calendar bucket identifiers for one instant, one per period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketKeys {
    /// Day key, e.g. `20250114`
    pub day: String,
    /// ISO week key, e.g. `2025W03`
    pub week: String,
    /// Month key, e.g. `202501`
    pub month: String,
    /// Year key, e.g. `2025`
    pub year: String,
}

impl BucketKeys {
    /// Key for the given period
    #[must_use]
    pub fn get(&self, period: Period) -> &str {
        match period {
            Period::Daily => &self.day,
            Period::Weekly => &self.week,
            Period::Monthly => &self.month,
            Period::Yearly => &self.year,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_keys_use_legacy_prefixes() {
        assert_eq!(Period::Daily.storage_key("20250114"), "steps_daily_20250114");
        assert_eq!(Period::Weekly.storage_key("2025W03"), "steps_weekly_2025W03");
        assert_eq!(Period::Yearly.storage_key("2025"), "steps_yearly_2025");
    }
}
