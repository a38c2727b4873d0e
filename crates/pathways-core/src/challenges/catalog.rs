//! Static daily and weekly challenge definitions.

use serde::{Deserialize, Serialize};

use super::counters::ProgressSnapshot;
use crate::locale::LocalizedText;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeKind {
    Daily,
    Weekly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn color(&self) -> &'static str {
        match self {
            Difficulty::Easy => "#2ecc71",
            Difficulty::Medium => "#f39c12",
            Difficulty::Hard => "#e74c3c",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeCategory {
    Audio,
    Writing,
    Reading,
    Time,
    Accuracy,
    Consistency,
    Skills,
    Xp,
}

/// Counter a challenge goal reads from a [`ProgressSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    AudioExercisesToday,
    CharactersWrittenToday,
    ReadingExercisesToday,
    StudyMinutesToday,
    PerfectScoresToday,
    LessonsThisWeek,
    WritingThisWeek,
    ReadingThisWeek,
    XpThisWeek,
    CurrentStreak,
}

impl Metric {
    pub fn read(&self, snapshot: &ProgressSnapshot) -> u64 {
        let daily = &snapshot.daily;
        let weekly = &snapshot.weekly;
        match self {
            Metric::AudioExercisesToday => daily.audio_exercises_today,
            Metric::CharactersWrittenToday => daily.characters_written_today,
            Metric::ReadingExercisesToday => daily.reading_exercises_today,
            Metric::StudyMinutesToday => daily.study_time_today,
            Metric::PerfectScoresToday => daily.perfect_scores_today,
            Metric::LessonsThisWeek => weekly.lessons_this_week,
            Metric::WritingThisWeek => weekly.writing_this_week,
            Metric::ReadingThisWeek => weekly.reading_this_week,
            Metric::XpThisWeek => weekly.xp_this_week,
            Metric::CurrentStreak => snapshot.current_streak.into(),
        }
    }
}

/// One `metric >= target` condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Goal {
    pub metric: Metric,
    pub target: u64,
}

impl Goal {
    pub const fn new(metric: Metric, target: u64) -> Self {
        Self { metric, target }
    }

    pub fn is_met(&self, snapshot: &ProgressSnapshot) -> bool {
        self.metric.read(snapshot) >= self.target
    }

    /// Fraction of the target reached, capped at 1.
    pub fn ratio(&self, snapshot: &ProgressSnapshot) -> f64 {
        if self.target == 0 {
            return 1.0;
        }
        (self.metric.read(snapshot) as f64 / self.target as f64).min(1.0)
    }
}

/// Immutable challenge definition; all goals must hold to complete it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub id: &'static str,
    pub name: LocalizedText,
    pub description: LocalizedText,
    pub icon: &'static str,
    pub kind: ChallengeKind,
    pub xp_reward: u64,
    pub difficulty: Difficulty,
    pub category: ChallengeCategory,
    pub goals: &'static [Goal],
    pub reset_daily: bool,
    pub reset_weekly: bool,
}

impl Challenge {
    pub fn is_met(&self, snapshot: &ProgressSnapshot) -> bool {
        self.goals.iter().all(|g| g.is_met(snapshot))
    }

    /// Mean of the capped goal ratios, as a 0-100 percentage.
    pub fn percent(&self, snapshot: &ProgressSnapshot) -> f64 {
        if self.goals.is_empty() {
            return 100.0;
        }
        let sum: f64 = self.goals.iter().map(|g| g.ratio(snapshot)).sum();
        sum / self.goals.len() as f64 * 100.0
    }

    /// Whether a period rollover of `kind` clears this challenge's completion.
    pub fn resets_on(&self, kind: ChallengeKind) -> bool {
        match kind {
            ChallengeKind::Daily => self.reset_daily,
            ChallengeKind::Weekly => self.reset_weekly,
        }
    }
}

const fn daily(
    id: &'static str,
    name: LocalizedText,
    description: LocalizedText,
    icon: &'static str,
    xp_reward: u64,
    difficulty: Difficulty,
    category: ChallengeCategory,
    goals: &'static [Goal],
) -> Challenge {
    Challenge {
        id,
        name,
        description,
        icon,
        kind: ChallengeKind::Daily,
        xp_reward,
        difficulty,
        category,
        goals,
        reset_daily: true,
        reset_weekly: false,
    }
}

const fn weekly(
    id: &'static str,
    name: LocalizedText,
    description: LocalizedText,
    icon: &'static str,
    xp_reward: u64,
    difficulty: Difficulty,
    category: ChallengeCategory,
    goals: &'static [Goal],
    reset_weekly: bool,
) -> Challenge {
    Challenge {
        id,
        name,
        description,
        icon,
        kind: ChallengeKind::Weekly,
        xp_reward,
        difficulty,
        category,
        goals,
        reset_daily: false,
        reset_weekly,
    }
}

pub static DAILY_CHALLENGES: [Challenge; 5] = [
    daily(
        "perfect_pronunciation",
        LocalizedText::new("Perfect Pronunciation", "完美发音"),
        LocalizedText::new("Complete all audio exercises today", "今天完成所有听力练习"),
        "🎵",
        50,
        Difficulty::Medium,
        ChallengeCategory::Audio,
        &[Goal::new(Metric::AudioExercisesToday, 1)],
    ),
    daily(
        "character_master",
        LocalizedText::new("Character Master", "汉字大师"),
        LocalizedText::new("Practice writing 10 characters", "练习书写10个汉字"),
        "✍️",
        50,
        Difficulty::Medium,
        ChallengeCategory::Writing,
        &[Goal::new(Metric::CharactersWrittenToday, 10)],
    ),
    daily(
        "speed_reader",
        LocalizedText::new("Speed Reader", "快速阅读者"),
        LocalizedText::new("Complete 3 reading exercises", "完成3个阅读练习"),
        "📚",
        50,
        Difficulty::Easy,
        ChallengeCategory::Reading,
        &[Goal::new(Metric::ReadingExercisesToday, 3)],
    ),
    daily(
        "consistency_king",
        LocalizedText::new("Consistency King", "坚持之王"),
        LocalizedText::new("Study for 20+ minutes today", "今天学习20+分钟"),
        "⏰",
        50,
        Difficulty::Medium,
        ChallengeCategory::Time,
        &[Goal::new(Metric::StudyMinutesToday, 20)],
    ),
    daily(
        "perfect_day",
        LocalizedText::new("Perfect Day", "完美一天"),
        LocalizedText::new("Complete lesson with 100% accuracy", "以100%准确率完成课程"),
        "🎯",
        75,
        Difficulty::Hard,
        ChallengeCategory::Accuracy,
        &[Goal::new(Metric::PerfectScoresToday, 1)],
    ),
];

pub static WEEKLY_CHALLENGES: [Challenge; 4] = [
    weekly(
        "weekly_warrior",
        LocalizedText::new("Weekly Warrior", "每周战士"),
        LocalizedText::new("Complete 5 lessons this week", "本周完成5课"),
        "⚔️",
        200,
        Difficulty::Medium,
        ChallengeCategory::Consistency,
        &[Goal::new(Metric::LessonsThisWeek, 5)],
        true,
    ),
    weekly(
        "streak_champion",
        LocalizedText::new("Streak Champion", "连击冠军"),
        LocalizedText::new("Maintain daily study streak for 7 days", "保持7天每日学习连击"),
        "🔥",
        300,
        Difficulty::Hard,
        ChallengeCategory::Consistency,
        &[Goal::new(Metric::CurrentStreak, 7)],
        false,
    ),
    weekly(
        "skill_master",
        LocalizedText::new("Skill Master", "技能大师"),
        LocalizedText::new("Complete 5 writing + 5 reading exercises", "完成5个写作+5个阅读练习"),
        "🎓",
        250,
        Difficulty::Hard,
        ChallengeCategory::Skills,
        &[
            Goal::new(Metric::WritingThisWeek, 5),
            Goal::new(Metric::ReadingThisWeek, 5),
        ],
        true,
    ),
    weekly(
        "xp_hunter",
        LocalizedText::new("XP Hunter", "经验猎人"),
        LocalizedText::new("Earn 500 XP this week", "本周获得500经验"),
        "💎",
        200,
        Difficulty::Medium,
        ChallengeCategory::Xp,
        &[Goal::new(Metric::XpThisWeek, 500)],
        true,
    ),
];

/// Look a challenge up in either catalog.
pub fn find_challenge(id: &str) -> Option<&'static Challenge> {
    DAILY_CHALLENGES
        .iter()
        .chain(WEEKLY_CHALLENGES.iter())
        .find(|c| c.id == id)
}

pub fn catalog(kind: ChallengeKind) -> &'static [Challenge] {
    match kind {
        ChallengeKind::Daily => &DAILY_CHALLENGES,
        ChallengeKind::Weekly => &WEEKLY_CHALLENGES,
    }
}
