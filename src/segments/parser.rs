// Bulk timestamp parser: one "start - end" range per line

use super::Segment;
use regex::Regex;
use std::sync::OnceLock;

pub const FORMAT_HINT: &str = "00:01:02 - 00:10:00";

fn range_regex() -> &'static Regex {
    static RANGE_RE: OnceLock<Regex> = OnceLock::new();
    RANGE_RE.get_or_init(|| {
        Regex::new(
            r"([0-9]{1,2}:[0-9]{2}:[0-9]{2}|[0-9]{1,2}:[0-9]{2})\s*-\s*([0-9]{1,2}:[0-9]{2}:[0-9]{2}|[0-9]{1,2}:[0-9]{2})",
        )
        .expect("valid time range regex")
    })
}

/// Parse free-form text into segments, one per line containing a time range.
///
/// Blank lines are dropped and lines without a range are skipped. Captured
/// times are kept exactly as typed. Ids come from the bulk id space and are
/// derived from the line's position among non-blank lines, so the same text
/// always yields the same segments.
pub fn parse(text: &str) -> Vec<Segment> {
    let re = range_regex();

    text.lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .filter_map(|(index, line)| {
            let caps = re.captures(line)?;
            Some(Segment::bulk(index + 1, &caps[1], &caps[2]))
        })
        .collect()
}

/// Number of ranges `parse` would produce, for a live "N clips detected" hint.
pub fn count(text: &str) -> usize {
    let re = range_regex();
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .filter(|line| re.is_match(line))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed_input() {
        let segments = parse("00:01:02 - 00:10:00\n00:20:02-00:30:00\nbad line");
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].start, "00:01:02");
        assert_eq!(segments[0].end, "00:10:00");
        assert_eq!(segments[1].start, "00:20:02");
        assert_eq!(segments[1].end, "00:30:00");
    }

    #[test]
    fn test_parse_keeps_tokens_verbatim() {
        let segments = parse("intro 1:05 - 12:30 (the good part)\n  2:03:04 -   2:04:00  ");
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].start, "1:05");
        assert_eq!(segments[0].end, "12:30");
        assert_eq!(segments[1].start, "2:03:04");
        assert_eq!(segments[1].end, "2:04:00");
    }

    #[test]
    fn test_blank_and_unmatched_lines_are_dropped() {
        let text = "\n\n   \nnothing here\n00:00:05 - 00:00:15\n\r\n12 - 13\n";
        let segments = parse(text);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].start, "00:00:05");
        assert!(segments.len() <= text.lines().filter(|l| !l.trim().is_empty()).count());
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        assert!(parse("").is_empty());
        assert_eq!(count(""), 0);
    }

    #[test]
    fn test_ids_are_bulk_unique_and_deterministic() {
        let text = "0:10 - 0:20\nskip\n0:30 - 0:40\n0:50 - 1:00";
        let first = parse(text);
        let second = parse(text);
        assert_eq!(first, second);
        assert!(first.iter().all(|s| s.is_bulk()));

        let mut ids: Vec<_> = first.iter().map(|s| s.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_count_matches_parse() {
        let text = "00:01:02 - 00:10:00\nfoo\n1:00-2:00\n";
        assert_eq!(count(text), parse(text).len());
    }

    #[test]
    fn test_first_range_on_a_line_wins() {
        let segments = parse("1:00:00 - 1:30:00 then 2:00 - 3:00");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].start, "1:00:00");
        assert_eq!(segments[0].end, "1:30:00");
    }
}
