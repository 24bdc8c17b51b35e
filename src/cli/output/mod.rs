//! Output formatting for the CLI.
//!
//! Every command result implements [`CommandOutput`] and is printed either
//! for humans or as pretty JSON depending on `--json`.

pub mod table;

use serde::Serialize;

pub use table::TableFormatter;

/// Result of a CLI command, printable for humans or as JSON.
pub trait CommandOutput: Serialize {
    /// Rendering for terminal output.
    fn to_human(&self) -> String;

    /// Rendering for `--json`; the serde form by default.
    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Print `result` in the selected mode.
pub fn output<T: CommandOutput>(result: &T, json_mode: bool) {
    if json_mode {
        println!("{}", serde_json::to_string_pretty(&result.to_json()).unwrap_or_default());
    } else {
        println!("{}", result.to_human());
    }
}

/// Truncate to at most `max_len` characters, appending "..." if truncated.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a-much-longer-name", 10), "a-much-...");
        assert_eq!(truncate("ééééééé", 5), "éé...");
    }
}
