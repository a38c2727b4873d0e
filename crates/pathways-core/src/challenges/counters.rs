//! Per-period activity counters that challenge goals are measured against.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Activity reported by lesson, reading and writing screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    AudioExercise,
    CharacterWriting,
    ReadingExercise,
    /// Amount is in minutes.
    StudyTime,
    PerfectScore,
    LessonComplete,
    WritingExercise,
    XpEarned,
}

impl ActivityKind {
    pub const ALL: [ActivityKind; 8] = [
        ActivityKind::AudioExercise,
        ActivityKind::CharacterWriting,
        ActivityKind::ReadingExercise,
        ActivityKind::StudyTime,
        ActivityKind::PerfectScore,
        ActivityKind::LessonComplete,
        ActivityKind::WritingExercise,
        ActivityKind::XpEarned,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::AudioExercise => "audio_exercise",
            ActivityKind::CharacterWriting => "character_writing",
            ActivityKind::ReadingExercise => "reading_exercise",
            ActivityKind::StudyTime => "study_time",
            ActivityKind::PerfectScore => "perfect_score",
            ActivityKind::LessonComplete => "lesson_complete",
            ActivityKind::WritingExercise => "writing_exercise",
            ActivityKind::XpEarned => "xp_earned",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActivityKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownActivity(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DailyCounters {
    pub audio_exercises_today: u64,
    pub characters_written_today: u64,
    pub reading_exercises_today: u64,
    pub study_time_today: u64,
    pub perfect_scores_today: u64,
    pub lessons_today: u64,
}

impl DailyCounters {
    pub fn apply(&mut self, kind: ActivityKind, amount: u64) {
        let counter = match kind {
            ActivityKind::AudioExercise => &mut self.audio_exercises_today,
            ActivityKind::CharacterWriting => &mut self.characters_written_today,
            ActivityKind::ReadingExercise => &mut self.reading_exercises_today,
            ActivityKind::StudyTime => &mut self.study_time_today,
            ActivityKind::PerfectScore => &mut self.perfect_scores_today,
            ActivityKind::LessonComplete => &mut self.lessons_today,
            ActivityKind::WritingExercise | ActivityKind::XpEarned => return,
        };
        *counter = counter.saturating_add(amount);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WeeklyCounters {
    pub lessons_this_week: u64,
    pub writing_this_week: u64,
    pub reading_this_week: u64,
    pub xp_this_week: u64,
}

impl WeeklyCounters {
    pub fn apply(&mut self, kind: ActivityKind, amount: u64) {
        let counter = match kind {
            ActivityKind::ReadingExercise => &mut self.reading_this_week,
            ActivityKind::LessonComplete => &mut self.lessons_this_week,
            ActivityKind::WritingExercise => &mut self.writing_this_week,
            ActivityKind::XpEarned => &mut self.xp_this_week,
            ActivityKind::AudioExercise
            | ActivityKind::CharacterWriting
            | ActivityKind::StudyTime
            | ActivityKind::PerfectScore => return,
        };
        *counter = counter.saturating_add(amount);
    }
}

/// Merged view a challenge goal is evaluated against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    pub daily: DailyCounters,
    pub weekly: WeeklyCounters,
    pub current_streak: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reading_touches_both_buckets() {
        let mut daily = DailyCounters::default();
        let mut weekly = WeeklyCounters::default();
        daily.apply(ActivityKind::ReadingExercise, 2);
        weekly.apply(ActivityKind::ReadingExercise, 2);
        assert_eq!(daily.reading_exercises_today, 2);
        assert_eq!(weekly.reading_this_week, 2);
    }

    #[test]
    fn single_bucket_activities() {
        let mut daily = DailyCounters::default();
        let mut weekly = WeeklyCounters::default();
        for kind in [ActivityKind::StudyTime, ActivityKind::XpEarned] {
            daily.apply(kind, 30);
            weekly.apply(kind, 30);
        }
        assert_eq!(daily.study_time_today, 30);
        assert_eq!(weekly.xp_this_week, 30);
        assert_eq!(weekly.lessons_this_week, 0);
        assert_eq!(daily.lessons_today, 0);
    }

    #[test]
    fn parses_activity_names() {
        assert_eq!(
            "character_writing".parse::<ActivityKind>().unwrap(),
            ActivityKind::CharacterWriting
        );
        assert_eq!(
            "juggling".parse::<ActivityKind>(),
            Err(ValidationError::UnknownActivity("juggling".into()))
        );
        for kind in ActivityKind::ALL {
            assert_eq!(kind.as_str().parse::<ActivityKind>().unwrap(), kind);
        }
    }

    #[test]
    fn partial_counters_deserialize_with_zeros() {
        let daily: DailyCounters =
            serde_json::from_str(r#"{"readingExercisesToday": 2}"#).unwrap();
        assert_eq!(daily.reading_exercises_today, 2);
        assert_eq!(daily.audio_exercises_today, 0);
    }
}
