use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::counters::{DailyCounters, WeeklyCounters};
use crate::progress::ChallengeId;

/// Mutable rotation state, kept apart from the static definitions.
///
/// Counter maps are keyed by day key (`YYYY-MM-DD`) and week-anchor key.
/// Both are cleared on their rollover, so in practice they hold one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeState {
    pub active_challenges: BTreeSet<ChallengeId>,
    pub completed_challenges: BTreeSet<ChallengeId>,
    pub daily_progress: BTreeMap<String, DailyCounters>,
    pub weekly_progress: BTreeMap<String, WeeklyCounters>,
    pub last_reset_date: NaiveDate,
    /// Week anchor of the last weekly reset.
    pub last_week_reset_date: NaiveDate,
}

impl ChallengeState {
    pub fn new(today: NaiveDate, week_anchor: NaiveDate) -> Self {
        Self {
            active_challenges: BTreeSet::new(),
            completed_challenges: BTreeSet::new(),
            daily_progress: BTreeMap::new(),
            weekly_progress: BTreeMap::new(),
            last_reset_date: today,
            last_week_reset_date: week_anchor,
        }
    }
}
