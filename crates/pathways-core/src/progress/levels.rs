//! Level thresholds and XP-to-level lookups.
//!
//! Level `n` (1-based) starts at `LEVEL_THRESHOLDS[n - 1]` XP. Past the last
//! threshold the level stays at [`MAX_LEVEL`] and there is no "next level".

/// Cumulative XP needed to reach each level, starting at level 1.
pub const LEVEL_THRESHOLDS: [u64; 21] = [
    0, 100, 250, 500, 1000, 1750, 2750, 4000, 5500, 7500, 10000, 13000, 16500, 20500, 25000,
    30000, 35500, 41500, 48000, 55000, 62500,
];

/// Highest level defined by the threshold table.
pub const MAX_LEVEL: u32 = LEVEL_THRESHOLDS.len() as u32;

/// 1-based index of the highest threshold not above `xp`.
pub fn level_for_xp(xp: u64) -> u32 {
    let reached = LEVEL_THRESHOLDS.iter().take_while(|&&t| t <= xp).count();
    (reached as u32).max(1)
}

/// XP still missing for the next level, `None` at max level.
pub fn xp_for_next_level(xp: u64) -> Option<u64> {
    let level = level_for_xp(xp);
    LEVEL_THRESHOLDS
        .get(level as usize)
        .map(|next| next.saturating_sub(xp))
}

/// Percentage (0-100) of the way from the current level to the next.
pub fn progress_to_next_level(xp: u64) -> f64 {
    let level = level_for_xp(xp) as usize;
    let Some(&next) = LEVEL_THRESHOLDS.get(level) else {
        return 100.0;
    };
    let current = LEVEL_THRESHOLDS[level - 1];
    let gained = (xp - current) as f64;
    let needed = (next - current) as f64;
    (gained / needed * 100.0).min(100.0)
}
