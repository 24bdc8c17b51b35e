use proptest::prelude::*;
use repolens::services::status_parser::parse;

/// Two status characters, as git prints them.
fn status_code() -> impl Strategy<Value = String> {
    let ch = prop::sample::select(vec![' ', 'M', 'A', 'D', 'R', 'C', 'U', '?', '!', 'T']);
    (ch.clone(), ch).prop_map(|(x, y)| format!("{x}{y}"))
}

fn file_name() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_./-]{1,24}"
}

proptest! {
    /// Property: parsing never panics, whatever the input
    #[test]
    fn prop_parse_is_total(raw in ".{0,400}") {
        let status = parse(&raw);
        prop_assert_eq!(status.has_changes, status.total_changed_files() > 0);
    }

    /// Property: has_changes matches the buckets, and every bucketed path
    /// comes from the input
    #[test]
    fn prop_buckets_match_input(
        lines in prop::collection::vec((status_code(), file_name()), 0..30)
    ) {
        let raw: String = lines
            .iter()
            .map(|(code, path)| format!("{code} {path}\n"))
            .collect();
        let status = parse(&raw);

        let any_bucketed = !status.staged_files.is_empty()
            || !status.modified_files.is_empty()
            || !status.untracked_files.is_empty();
        prop_assert_eq!(status.has_changes, any_bucketed);

        for path in status.all_changed_files() {
            prop_assert!(lines.iter().any(|(_, p)| p == path));
        }
    }

    /// Property: untracked entries always land in the untracked bucket only
    #[test]
    fn prop_untracked_bucket(paths in prop::collection::vec(file_name(), 1..20)) {
        let raw: String = paths.iter().map(|p| format!("?? {p}\n")).collect();
        let status = parse(&raw);

        prop_assert!(status.staged_files.is_empty());
        prop_assert!(status.modified_files.is_empty());
        for path in &paths {
            prop_assert!(status.untracked_files.contains(path));
        }
    }
}
