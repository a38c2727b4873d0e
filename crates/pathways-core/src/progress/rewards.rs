//! XP reward table.

/// Base XP for finishing a daily lesson.
pub const LESSON_XP: u64 = 25;
/// Extra XP when the lesson was perfect.
pub const PERFECT_SCORE_BONUS: u64 = 10;
pub const READING_XP: u64 = 15;
pub const WRITING_XP: u64 = 20;
/// Fixed XP for any completed challenge.
pub const CHALLENGE_XP: u64 = 50;

/// Streak lengths that pay a one-off bonus, with the bonus paid.
pub const STREAK_MILESTONES: [(u32, u64); 4] = [(7, 100), (14, 200), (30, 500), (50, 1000)];

/// Bonus XP for hitting exactly `streak` days, if it is a milestone.
pub fn streak_milestone_bonus(streak: u32) -> Option<u64> {
    STREAK_MILESTONES
        .iter()
        .find(|(days, _)| *days == streak)
        .map(|(_, bonus)| *bonus)
}
