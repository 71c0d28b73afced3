//! Document splitting
//!
//! Two layers, matching the chunk hierarchy:
//! - [`split_sections`] cuts normalized markdown into section-level parents
//!   at top-level heading boundaries, keeping the raw text (tables and
//!   their pipe rows included) intact.
//! - [`window_text`] slices a parent into fixed-length child windows,
//!   contiguous and non-overlapping, counted in characters.
//!
//! Splitting is pure; all store writes belong to the ingestion pipeline.

use pulldown_cmark::{Event, Options, Parser, Tag};

/// Split a markdown document into ordered sections.
///
/// A section is a heading plus everything up to the next heading; text
/// before the first heading forms its own section. Sections partition the
/// input: concatenating the returned slices in order reproduces the
/// document, except that all-whitespace slices are dropped.
pub fn split_sections(markdown: &str) -> Vec<String> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);

    let mut cuts: Vec<usize> = Parser::new_ext(markdown, options)
        .into_offset_iter()
        .filter_map(|(event, range)| match event {
            Event::Start(Tag::Heading { .. }) => Some(range.start),
            _ => None,
        })
        .collect();

    cuts.sort_unstable();
    cuts.dedup();
    if cuts.first() != Some(&0) {
        cuts.insert(0, 0);
    }
    cuts.push(markdown.len());

    cuts.windows(2)
        .map(|pair| &markdown[pair[0]..pair[1]])
        .filter(|slice| !slice.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Slice text into windows of `window` characters.
///
/// Every window except the last has exactly `window` characters; the last
/// holds the remainder. Empty input produces no windows, so no window is
/// ever empty. Concatenating the windows reproduces the input exactly.
pub fn window_text(text: &str, window: usize) -> Vec<String> {
    let window = window.max(1);
    let mut windows = Vec::new();
    let mut start = 0;
    let mut seen = 0;

    for (idx, _) in text.char_indices() {
        if seen == window {
            windows.push(text[start..idx].to_string());
            start = idx;
            seen = 0;
        }
        seen += 1;
    }

    if start < text.len() {
        windows.push(text[start..].to_string());
    }

    windows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_split_at_headings() {
        let doc = "# Overview\n\nIntro text.\n\n## Balance Sheets\n\n|Cash|100|\n|Debt|50|\n\n## Risk Factors\n\nSupply chain exposure.\n";
        let sections = split_sections(doc);

        assert_eq!(sections.len(), 3);
        assert!(sections[0].starts_with("# Overview"));
        assert!(sections[1].starts_with("## Balance Sheets"));
        assert!(sections[1].contains("|Cash|100|"));
        assert!(sections[2].starts_with("## Risk Factors"));
    }

    #[test]
    fn test_sections_partition_document() {
        let doc = "# A\n\none\n\n# B\n\ntwo\n\n# C\n\nthree\n";
        let sections = split_sections(doc);
        assert_eq!(sections.concat(), doc);
    }

    #[test]
    fn test_preamble_before_first_heading() {
        let doc = "Cover page text.\n\n# Item 1\n\nBusiness overview.\n";
        let sections = split_sections(doc);

        assert_eq!(sections.len(), 2);
        assert!(sections[0].starts_with("Cover page"));
    }

    #[test]
    fn test_document_without_headings() {
        let doc = "Just one block of narrative text.";
        let sections = split_sections(doc);
        assert_eq!(sections, vec![doc.to_string()]);
    }

    #[test]
    fn test_empty_document() {
        assert!(split_sections("").is_empty());
        assert!(split_sections("   \n\n  ").is_empty());
    }

    #[test]
    fn test_window_count_is_ceil() {
        let text = "x".repeat(1100);
        let windows = window_text(&text, 500);

        assert_eq!(windows.len(), 3);
        assert_eq!(windows[0].chars().count(), 500);
        assert_eq!(windows[1].chars().count(), 500);
        assert_eq!(windows[2].chars().count(), 100);
    }

    #[test]
    fn test_window_exact_multiple() {
        let text = "y".repeat(1000);
        let windows = window_text(&text, 500);

        assert_eq!(windows.len(), 2);
        assert!(windows.iter().all(|w| w.chars().count() == 500));
    }

    #[test]
    fn test_short_text_single_window() {
        let windows = window_text("short", 500);
        assert_eq!(windows, vec!["short".to_string()]);
    }

    #[test]
    fn test_windows_reassemble_parent() {
        let text = "Net sales increased due to iPhone and Services growth. ".repeat(30);
        let windows = window_text(&text, 500);

        assert_eq!(windows.concat(), text);
        assert!(windows.iter().all(|w| !w.is_empty()));
    }

    #[test]
    fn test_windowing_is_char_aware() {
        // Multi-byte characters must not split mid-codepoint
        let text = "€".repeat(7);
        let windows = window_text(&text, 3);

        assert_eq!(windows.len(), 3);
        assert_eq!(windows[0], "€€€");
        assert_eq!(windows[2], "€");
        assert_eq!(windows.concat(), text);
    }

    #[test]
    fn test_empty_text_yields_no_windows() {
        assert!(window_text("", 500).is_empty());
    }
}
