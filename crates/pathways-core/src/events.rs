//! Events emitted by the engine and the bus that delivers them.
//!
//! Subscribers are called in registration order; a bounded history keeps the
//! most recent events for callers that poll instead.

use std::collections::VecDeque;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::challenges::ChallengeKind;
use crate::progress::UserProgress;

/// Every state change in the engine produces an Event.
/// Presentation layers either subscribe to the bus or drain recent events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Full snapshot after a mutation has been saved. Always the last event
    /// of a mutating call.
    ProgressChanged { user: UserProgress },
    /// Net level transition of one call chain.
    LevelUp {
        previous_level: u32,
        new_level: u32,
        total_xp: u64,
    },
    StreakMilestone { streak: u32, bonus_xp: u64 },
    /// Detected on load when the last activity is older than yesterday.
    StreakBroken { previous_streak: u32 },
    WeeklyWindowReset {
        week_start: NaiveDate,
        previous_weekly_xp: u64,
    },
    BadgeAwarded { badge_id: String },
    ChallengeCompleted {
        challenge_id: String,
        kind: ChallengeKind,
        xp_awarded: u64,
    },
    ChallengesRotated {
        daily: bool,
        weekly: bool,
        active: Vec<String>,
    },
    /// User-facing message, already localized and filtered by preferences.
    Notification {
        kind: NotificationKind,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Success,
    Achievement,
}

/// Handle returned by [`EventBus::subscribe`].
pub type SubscriptionId = u64;

const RECENT_CAPACITY: usize = 256;

/// In-process pub/sub owned by the gamification facade.
///
/// Subscribers run synchronously inside `publish`. Published events are also
/// kept in a bounded buffer so a polling consumer can `drain` them later.
pub struct EventBus {
    subscribers: Vec<(SubscriptionId, Box<dyn FnMut(&Event)>)>,
    recent: VecDeque<Event>,
    next_id: SubscriptionId,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            recent: VecDeque::with_capacity(RECENT_CAPACITY),
            next_id: 1,
        }
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&Event) + 'static,
    {
        let id = self.next_id;
        self.next_id += 1;
        self.subscribers.push((id, Box::new(listener)));
        id
    }

    /// Returns false if the id was never issued or already removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    pub fn publish(&mut self, event: Event) {
        for (_, listener) in self.subscribers.iter_mut() {
            listener(&event);
        }
        if self.recent.len() == RECENT_CAPACITY {
            self.recent.pop_front();
        }
        self.recent.push_back(event);
    }

    /// Take every buffered event, oldest first.
    pub fn drain(&mut self) -> Vec<Event> {
        self.recent.drain(..).collect()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .field("recent", &self.recent.len())
            .finish()
    }
}
