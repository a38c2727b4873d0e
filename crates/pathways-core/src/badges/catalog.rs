//! Static badge definitions.
//!
//! Each badge carries a [`BadgeRequirement`] descriptor instead of a closure,
//! so unlock rules are plain data: serializable, comparable and evaluated by
//! one pure function per requirement kind.

use serde::Serialize;

use crate::locale::LocalizedText;
use crate::progress::UserProgress;

/// Grouping used for summaries and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeCategory {
    Progress,
    Consistency,
    Skills,
    Excellence,
    Challenges,
    Levels,
    Goals,
    Milestones,
}

impl BadgeCategory {
    pub const ALL: [BadgeCategory; 8] = [
        BadgeCategory::Progress,
        BadgeCategory::Consistency,
        BadgeCategory::Skills,
        BadgeCategory::Excellence,
        BadgeCategory::Challenges,
        BadgeCategory::Levels,
        BadgeCategory::Goals,
        BadgeCategory::Milestones,
    ];

    /// Serialized name, as used in summaries and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeCategory::Progress => "progress",
            BadgeCategory::Consistency => "consistency",
            BadgeCategory::Skills => "skills",
            BadgeCategory::Excellence => "excellence",
            BadgeCategory::Challenges => "challenges",
            BadgeCategory::Levels => "levels",
            BadgeCategory::Goals => "goals",
            BadgeCategory::Milestones => "milestones",
        }
    }

    pub fn name(&self) -> LocalizedText {
        match self {
            BadgeCategory::Progress => LocalizedText::new("Progress", "进度"),
            BadgeCategory::Consistency => LocalizedText::new("Consistency", "坚持"),
            BadgeCategory::Skills => LocalizedText::new("Skills", "技能"),
            BadgeCategory::Excellence => LocalizedText::new("Excellence", "卓越"),
            BadgeCategory::Challenges => LocalizedText::new("Challenges", "挑战"),
            BadgeCategory::Levels => LocalizedText::new("Levels", "等级"),
            BadgeCategory::Goals => LocalizedText::new("Goals", "目标"),
            BadgeCategory::Milestones => LocalizedText::new("Milestones", "里程碑"),
        }
    }

    /// Display color as a hex string.
    pub fn color(&self) -> &'static str {
        match self {
            BadgeCategory::Progress => "#2ecc71",
            BadgeCategory::Consistency => "#e74c3c",
            BadgeCategory::Skills => "#3498db",
            BadgeCategory::Excellence => "#f39c12",
            BadgeCategory::Challenges => "#9b59b6",
            BadgeCategory::Levels => "#1abc9c",
            BadgeCategory::Goals => "#34495e",
            BadgeCategory::Milestones => "#e67e22",
        }
    }
}

/// Unlock rule: a progress counter and the threshold it must reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "threshold", rename_all = "snake_case")]
pub enum BadgeRequirement {
    LessonsCompleted(u32),
    /// Compared against the better of the live and longest streak.
    Streak(u32),
    WritingCompleted(u32),
    ReadingCompleted(u32),
    PerfectScores(u32),
    ChallengesCompleted(u32),
    Level(u32),
    /// Weekly XP reaches the learner's own weekly goal.
    WeeklyGoal,
    TotalXp(u64),
}

impl BadgeRequirement {
    /// `(current, target)` pair this requirement compares.
    pub fn measure(&self, progress: &UserProgress) -> (u64, u64) {
        match *self {
            BadgeRequirement::LessonsCompleted(n) => {
                (progress.total_lessons_completed.into(), n.into())
            }
            BadgeRequirement::Streak(n) => (progress.best_streak().into(), n.into()),
            BadgeRequirement::WritingCompleted(n) => {
                (progress.total_writing_completed.into(), n.into())
            }
            BadgeRequirement::ReadingCompleted(n) => {
                (progress.total_reading_completed.into(), n.into())
            }
            BadgeRequirement::PerfectScores(n) => (progress.perfect_scores.into(), n.into()),
            BadgeRequirement::ChallengesCompleted(n) => {
                (progress.challenges_completed.len() as u64, n.into())
            }
            BadgeRequirement::Level(n) => (progress.level.into(), n.into()),
            BadgeRequirement::WeeklyGoal => (progress.weekly_xp, progress.weekly_goal),
            BadgeRequirement::TotalXp(n) => (progress.xp, n),
        }
    }

    pub fn is_met(&self, progress: &UserProgress) -> bool {
        let (current, target) = self.measure(progress);
        current >= target
    }

    /// Percentage toward the target, capped at 100.
    pub fn percent(&self, progress: &UserProgress) -> f64 {
        let (current, target) = self.measure(progress);
        if target == 0 {
            return 100.0;
        }
        (current as f64 / target as f64 * 100.0).min(100.0)
    }
}

/// Immutable badge definition. Earned state lives in [`UserProgress::badges`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Badge {
    pub id: &'static str,
    pub name: LocalizedText,
    pub description: LocalizedText,
    pub icon: &'static str,
    pub category: BadgeCategory,
    pub requirement: BadgeRequirement,
    /// Reports partial progress. Ungraded badges read 0 until unlocked.
    #[serde(skip)]
    pub graded: bool,
}

impl Badge {
    /// Percentage toward unlocking, 0 or 100 for ungraded badges.
    pub fn percent(&self, progress: &UserProgress) -> f64 {
        if self.graded {
            self.requirement.percent(progress)
        } else if self.requirement.is_met(progress) {
            100.0
        } else {
            0.0
        }
    }
}

const fn badge(
    id: &'static str,
    name: LocalizedText,
    description: LocalizedText,
    icon: &'static str,
    category: BadgeCategory,
    requirement: BadgeRequirement,
) -> Badge {
    Badge {
        id,
        name,
        description,
        icon,
        category,
        requirement,
        graded: true,
    }
}

/// A badge that is either unlocked or not, with no partial progress.
const fn milestone(
    id: &'static str,
    name: LocalizedText,
    description: LocalizedText,
    icon: &'static str,
    category: BadgeCategory,
    requirement: BadgeRequirement,
) -> Badge {
    Badge {
        graded: false,
        ..badge(id, name, description, icon, category, requirement)
    }
}

pub static BADGES: [Badge; 15] = [
    milestone(
        "first_steps",
        LocalizedText::new("First Steps", "初出茅庐"),
        LocalizedText::new("Complete your first lesson", "完成第一课"),
        "🌱",
        BadgeCategory::Progress,
        BadgeRequirement::LessonsCompleted(1),
    ),
    badge(
        "week_warrior",
        LocalizedText::new("Week Warrior", "周冠军"),
        LocalizedText::new("Complete 7 lessons", "完成7课"),
        "⚔️",
        BadgeCategory::Progress,
        BadgeRequirement::LessonsCompleted(7),
    ),
    badge(
        "month_master",
        LocalizedText::new("Month Master", "月度大师"),
        LocalizedText::new("Complete 30 lessons", "完成30课"),
        "👑",
        BadgeCategory::Progress,
        BadgeRequirement::LessonsCompleted(30),
    ),
    milestone(
        "streak_starter",
        LocalizedText::new("Streak Starter", "连击新手"),
        LocalizedText::new("Maintain a 3-day streak", "保持3天连击"),
        "🔥",
        BadgeCategory::Consistency,
        BadgeRequirement::Streak(3),
    ),
    badge(
        "streak_master",
        LocalizedText::new("Streak Master", "连击大师"),
        LocalizedText::new("Maintain a 7-day streak", "保持7天连击"),
        "🌟",
        BadgeCategory::Consistency,
        BadgeRequirement::Streak(7),
    ),
    milestone(
        "dedication_hero",
        LocalizedText::new("Dedication Hero", "坚持英雄"),
        LocalizedText::new("Maintain a 30-day streak", "保持30天连击"),
        "💎",
        BadgeCategory::Consistency,
        BadgeRequirement::Streak(30),
    ),
    badge(
        "writing_pro",
        LocalizedText::new("Writing Pro", "写作专家"),
        LocalizedText::new("Complete 10 writing exercises", "完成10个写作练习"),
        "✍️",
        BadgeCategory::Skills,
        BadgeRequirement::WritingCompleted(10),
    ),
    badge(
        "reading_champion",
        LocalizedText::new("Reading Champion", "阅读冠军"),
        LocalizedText::new("Complete 15 reading exercises", "完成15个阅读练习"),
        "📚",
        BadgeCategory::Skills,
        BadgeRequirement::ReadingCompleted(15),
    ),
    badge(
        "perfect_student",
        LocalizedText::new("Perfect Student", "完美学生"),
        LocalizedText::new("Achieve 5 perfect scores", "获得5次满分"),
        "🎯",
        BadgeCategory::Excellence,
        BadgeRequirement::PerfectScores(5),
    ),
    badge(
        "challenge_champion",
        LocalizedText::new("Challenge Champion", "挑战冠军"),
        LocalizedText::new("Complete 5 daily challenges", "完成5个每日挑战"),
        "🏆",
        BadgeCategory::Challenges,
        BadgeRequirement::ChallengesCompleted(5),
    ),
    badge(
        "level_5_legend",
        LocalizedText::new("Level 5 Legend", "五级传说"),
        LocalizedText::new("Reach Level 5", "达到5级"),
        "🌟",
        BadgeCategory::Levels,
        BadgeRequirement::Level(5),
    ),
    badge(
        "level_10_master",
        LocalizedText::new("Level 10 Master", "十级大师"),
        LocalizedText::new("Reach Level 10", "达到10级"),
        "🎖️",
        BadgeCategory::Levels,
        BadgeRequirement::Level(10),
    ),
    badge(
        "weekly_warrior",
        LocalizedText::new("Weekly Warrior", "每周战士"),
        LocalizedText::new("Reach weekly XP goal", "达到每周经验目标"),
        "📈",
        BadgeCategory::Goals,
        BadgeRequirement::WeeklyGoal,
    ),
    badge(
        "xp_collector",
        LocalizedText::new("XP Collector", "经验收集者"),
        LocalizedText::new("Earn 1000 total XP", "获得1000总经验"),
        "💰",
        BadgeCategory::Milestones,
        BadgeRequirement::TotalXp(1000),
    ),
    badge(
        "xp_master",
        LocalizedText::new("XP Master", "经验大师"),
        LocalizedText::new("Earn 5000 total XP", "获得5000总经验"),
        "💎",
        BadgeCategory::Milestones,
        BadgeRequirement::TotalXp(5000),
    ),
];
