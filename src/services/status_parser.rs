//! Porcelain status parsing.
//!
//! Turns `git status --porcelain` output into a [`RepositoryStatus`]. The
//! two-letter code decides the bucket; anything unrecognised counts as a
//! modification so no change is ever silently dropped.

use crate::domain::models::RepositoryStatus;

/// Where a status code sends its path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bucket {
    Staged,
    StagedRename,
    Modified,
    Untracked,
}

fn classify(code: &str) -> Bucket {
    match code {
        "A " | "AM" | "AD" | "M " | "MA" | "D " | "DA" | "C " | "CM" => Bucket::Staged,
        "R " | "RM" => Bucket::StagedRename,
        " M" | "MM" | "MD" | " D" => Bucket::Modified,
        "??" => Bucket::Untracked,
        _ => Bucket::Modified,
    }
}

/// For `old -> new` keep the destination.
fn rename_target(path: &str) -> &str {
    path.rsplit_once(" -> ").map_or(path, |(_, new)| new)
}

/// Split a porcelain line into its code and path.
///
/// Works on characters rather than bytes so a multi-byte character near the
/// start of a line never causes a split inside its encoding.
fn split_line(line: &str) -> Option<(&str, &str)> {
    let mut boundaries = line.char_indices().map(|(i, _)| i).skip(2);
    let code_end = boundaries.next()?;
    // The line must hold at least one character past the separator.
    let path_start = boundaries.next()?;
    Some((&line[..code_end], &line[path_start..]))
}

/// Parse porcelain output. Never fails: malformed lines are skipped.
///
/// Paths are stored as git printed them. Git C-quotes paths holding spaces
/// or unusual bytes (`"sp ace"`), and those quotes are kept, so callers that
/// open the files must unquote first.
pub fn parse(raw: &str) -> RepositoryStatus {
    let mut staged = Vec::new();
    let mut modified = Vec::new();
    let mut untracked = Vec::new();

    for line in raw.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        let Some((code, path)) = split_line(line) else {
            continue;
        };
        if path.is_empty() {
            continue;
        }

        match classify(code) {
            Bucket::Staged => staged.push(path.to_string()),
            Bucket::StagedRename => staged.push(rename_target(path).to_string()),
            Bucket::Modified => modified.push(path.to_string()),
            Bucket::Untracked => untracked.push(path.to_string()),
        }
    }

    RepositoryStatus::new(staged, modified, untracked)
}
