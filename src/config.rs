use serde::{Deserialize, Serialize};

/// Draw thresholds consulted by terminal-state detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawRules {
    /// Reversible plies (no pawn move, no capture) that end the game in a
    /// draw.
    pub fifty_move_plies: usize,
    /// Occurrences of the same board that end the game in a draw.
    pub repetition_count: usize,
}

impl Default for DrawRules {
    fn default() -> Self {
        DrawRules {
            fifty_move_plies: 100,
            repetition_count: 3,
        }
    }
}

/// Driver configuration parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Draw thresholds handed to every new game.
    pub rules: DrawRules,
    /// Promote to a queen without asking.
    pub auto_queen: bool,
}

impl AppConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        let defaults = DrawRules::default();
        AppConfig {
            rules: DrawRules {
                fifty_move_plies: env_parse("CHESS_FIFTY_MOVE_PLIES")
                    .filter(|n| *n > 0)
                    .unwrap_or(defaults.fifty_move_plies),
                repetition_count: env_parse("CHESS_REPETITION_COUNT")
                    .filter(|n| *n > 1)
                    .unwrap_or(defaults.repetition_count),
            },
            auto_queen: std::env::var("CHESS_AUTO_QUEEN")
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            rules: DrawRules::default(),
            auto_queen: false,
        }
    }
}

fn env_parse(key: &str) -> Option<usize> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
