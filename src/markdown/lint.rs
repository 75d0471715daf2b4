//! Markdown linting
//!
//! Line-oriented lint rules over the document text, producing the issue list
//! shown in the sidebar. Rules are advisory; none of them block editing or
//! saving. Each rule is a standalone function so individual rules stay
//! testable, and a failing rule only loses its own findings.

use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::document::split_front_matter;

// ─────────────────────────────────────────────────────────────────────────────
// Issue Types
// ─────────────────────────────────────────────────────────────────────────────

/// Severity of a lint finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LintSeverity {
    Info,
    Warning,
    Error,
}

impl LintSeverity {
    /// Short label for display.
    pub fn label(&self) -> &'static str {
        match self {
            LintSeverity::Info => "info",
            LintSeverity::Warning => "warning",
            LintSeverity::Error => "error",
        }
    }
}

/// A single lint finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintIssue {
    pub severity: LintSeverity,
    /// 1-indexed line in the full document text
    pub line: usize,
    /// Stable rule identifier
    pub rule: &'static str,
    pub message: String,
}

/// Tunables for the rule set.
#[derive(Debug, Clone)]
pub struct LintOptions {
    /// Maximum line length before the long-line rule fires
    pub max_line_length: usize,
    /// Title from front matter, if any (feeds the heading rules)
    pub front_matter_title: String,
}

impl Default for LintOptions {
    fn default() -> Self {
        Self {
            max_line_length: 120,
            front_matter_title: String::new(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Entry Point
// ─────────────────────────────────────────────────────────────────────────────

type RuleFn = fn(&str, &LintOptions) -> Vec<LintIssue>;

/// Lint a markdown document, returning issues sorted by line.
pub fn lint_document(text: &str, options: &LintOptions) -> Vec<LintIssue> {
    let rules: &[RuleFn] = &[
        check_front_matter_title,
        check_heading_hierarchy,
        check_line_length,
        check_trailing_whitespace,
        check_empty_links,
        check_duplicate_headings,
        check_list_markers,
    ];

    let mut issues = Vec::new();
    for rule in rules {
        issues.extend(rule(text, options));
    }

    issues.sort_by_key(|i| i.line);
    issues
}

// ─────────────────────────────────────────────────────────────────────────────
// Shared Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn heading_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(#{1,6})\s+(.+)").expect("valid regex"))
}

/// 1-indexed line number where the body starts (skipping front matter).
fn body_start_line(text: &str) -> usize {
    let split = split_front_matter(text);
    text[..text.len() - split.body.len()].matches('\n').count() + 1
}

/// Iterate (1-indexed line number, line) over the document body, skipping
/// front matter and fenced code block contents.
fn body_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    let start = body_start_line(text);
    let split = split_front_matter(text);
    let mut in_fence = false;
    split
        .body
        .lines()
        .enumerate()
        .filter_map(move |(i, line)| {
            let trimmed = line.trim_start();
            if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
                in_fence = !in_fence;
                return None;
            }
            if in_fence {
                None
            } else {
                Some((start + i, line))
            }
        })
}

// ─────────────────────────────────────────────────────────────────────────────
// Rules
// ─────────────────────────────────────────────────────────────────────────────

/// A front-matter title plus an H1 usually duplicates the document title.
fn check_front_matter_title(text: &str, options: &LintOptions) -> Vec<LintIssue> {
    if options.front_matter_title.is_empty() {
        return Vec::new();
    }

    for (line_no, line) in body_lines(text) {
        if let Some(caps) = heading_regex().captures(line.trim()) {
            if caps[1].len() == 1 {
                return vec![LintIssue {
                    severity: LintSeverity::Warning,
                    line: line_no,
                    rule: "front_matter_title",
                    message: "Document has a front matter title and an H1 heading. \
                              Consider starting sections with H2."
                        .to_string(),
                }];
            }
            // Only the first heading matters for this rule
            return Vec::new();
        }
    }
    Vec::new()
}

/// Heading levels should not skip (H1 → H3).
fn check_heading_hierarchy(text: &str, options: &LintOptions) -> Vec<LintIssue> {
    let mut issues = Vec::new();
    // A front matter title counts as the document's H1
    let mut previous = if options.front_matter_title.is_empty() {
        0
    } else {
        1
    };

    for (line_no, line) in body_lines(text) {
        if let Some(caps) = heading_regex().captures(line.trim()) {
            let level = caps[1].len();
            if level > previous + 1 {
                issues.push(LintIssue {
                    severity: LintSeverity::Warning,
                    line: line_no,
                    rule: "heading_hierarchy",
                    message: format!(
                        "Heading level jumps from H{} to H{}. Consider using H{}.",
                        previous,
                        level,
                        previous + 1
                    ),
                });
            }
            previous = level;
        }
    }
    issues
}

/// Overlong prose lines are hard to diff and review.
fn check_line_length(text: &str, options: &LintOptions) -> Vec<LintIssue> {
    let mut issues = Vec::new();
    for (line_no, line) in body_lines(text) {
        // Tables wrap poorly; leave them alone
        if line.trim_start().starts_with('|') {
            continue;
        }
        let length = line.chars().count();
        if length > options.max_line_length {
            issues.push(LintIssue {
                severity: LintSeverity::Info,
                line: line_no,
                rule: "line_length",
                message: format!(
                    "Line is {} characters long. Consider breaking at {} characters.",
                    length, options.max_line_length
                ),
            });
        }
    }
    issues
}

fn check_trailing_whitespace(text: &str, _options: &LintOptions) -> Vec<LintIssue> {
    let mut issues = Vec::new();
    for (line_no, line) in body_lines(text) {
        if line.ends_with(' ') || line.ends_with('\t') {
            issues.push(LintIssue {
                severity: LintSeverity::Warning,
                line: line_no,
                rule: "trailing_whitespace",
                message: "Line has trailing whitespace.".to_string(),
            });
        }
    }
    issues
}

/// Links whose target is empty or a placeholder.
fn check_empty_links(text: &str, _options: &LintOptions) -> Vec<LintIssue> {
    static LINK_RE: OnceLock<Regex> = OnceLock::new();
    let link_re =
        LINK_RE.get_or_init(|| Regex::new(r"\[([^\]]*)\]\(([^)]*)\)").expect("valid regex"));

    let mut issues = Vec::new();
    for (line_no, line) in body_lines(text) {
        for caps in link_re.captures_iter(line) {
            let label = &caps[1];
            let url = caps[2].trim();
            if url.is_empty() || matches!(url, "url" | "URL" | "#" | "javascript:void(0)") {
                issues.push(LintIssue {
                    severity: LintSeverity::Error,
                    line: line_no,
                    rule: "empty_links",
                    message: format!("Empty or placeholder link: [{}]({})", label, url),
                });
            }
        }
    }
    issues
}

fn check_duplicate_headings(text: &str, _options: &LintOptions) -> Vec<LintIssue> {
    let mut issues = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();

    for (line_no, line) in body_lines(text) {
        if let Some(caps) = heading_regex().captures(line.trim()) {
            let title = caps[2].trim().to_lowercase();
            if let Some(&first) = seen.get(&title) {
                issues.push(LintIssue {
                    severity: LintSeverity::Warning,
                    line: line_no,
                    rule: "duplicate_headings",
                    message: format!(
                        "Duplicate heading \"{}\" (first seen on line {})",
                        title, first
                    ),
                });
            } else {
                seen.insert(title, line_no);
            }
        }
    }
    issues
}

/// Unordered lists should stick to one marker character.
fn check_list_markers(text: &str, _options: &LintOptions) -> Vec<LintIssue> {
    static ITEM_RE: OnceLock<Regex> = OnceLock::new();
    let item_re = ITEM_RE.get_or_init(|| Regex::new(r"^\s*([-*+])\s+").expect("valid regex"));

    let mut issues = Vec::new();
    let mut list_marker: Option<(char, usize)> = None;

    for (line_no, line) in body_lines(text) {
        if let Some(caps) = item_re.captures(line) {
            let marker = caps[1].chars().next().unwrap_or('-');
            match list_marker {
                None => list_marker = Some((marker, line_no)),
                Some((expected, start_line)) if marker != expected => {
                    issues.push(LintIssue {
                        severity: LintSeverity::Warning,
                        line: line_no,
                        rule: "list_marker_consistency",
                        message: format!(
                            "Inconsistent list marker \"{}\" (list started with \"{}\" on line {})",
                            marker, expected, start_line
                        ),
                    });
                }
                Some(_) => {}
            }
        } else if !line.trim().is_empty() {
            // A non-blank, non-item line ends the current list
            list_marker = None;
        }
    }
    issues
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn lint(text: &str) -> Vec<LintIssue> {
        lint_document(text, &LintOptions::default())
    }

    fn rules_of(issues: &[LintIssue]) -> Vec<&'static str> {
        issues.iter().map(|i| i.rule).collect()
    }

    #[test]
    fn test_clean_document_has_no_issues() {
        let issues = lint("# Title\n\nSome text.\n\n## Section\n\n- a\n- b\n");
        assert!(issues.is_empty(), "unexpected issues: {:?}", issues);
    }

    #[test]
    fn test_heading_hierarchy_skip_detected() {
        let issues = lint("# Title\n\n### Jumped\n");
        assert_eq!(rules_of(&issues), vec!["heading_hierarchy"]);
        assert_eq!(issues[0].line, 3);
    }

    #[test]
    fn test_front_matter_title_counts_as_h1() {
        let options = LintOptions {
            front_matter_title: "Doc".to_string(),
            ..LintOptions::default()
        };
        // H2 directly after a front matter title is fine
        let issues = lint_document("## Section\n", &options);
        assert!(!rules_of(&issues).contains(&"heading_hierarchy"));
    }

    #[test]
    fn test_front_matter_title_with_h1_warns() {
        let options = LintOptions {
            front_matter_title: "Doc".to_string(),
            ..LintOptions::default()
        };
        let issues = lint_document("# Duplicate title\n", &options);
        assert!(rules_of(&issues).contains(&"front_matter_title"));
    }

    #[test]
    fn test_line_length() {
        let long = format!("{}\n", "x".repeat(140));
        let issues = lint(&long);
        assert_eq!(rules_of(&issues), vec!["line_length"]);

        // Table lines are exempt
        let table = format!("| {} |\n", "x".repeat(140));
        assert!(lint(&table).is_empty());
    }

    #[test]
    fn test_trailing_whitespace() {
        let issues = lint("clean line\ndirty line  \n");
        assert_eq!(rules_of(&issues), vec!["trailing_whitespace"]);
        assert_eq!(issues[0].line, 2);
    }

    #[test]
    fn test_empty_links() {
        let issues = lint("[click me]()\n[other](url)\n[fine](https://example.com)\n");
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| i.rule == "empty_links"));
        assert!(issues.iter().all(|i| i.severity == LintSeverity::Error));
    }

    #[test]
    fn test_duplicate_headings_case_insensitive() {
        let issues = lint("# Intro\n\ntext\n\n# INTRO\n");
        assert_eq!(rules_of(&issues), vec!["duplicate_headings"]);
        assert_eq!(issues[0].line, 5);
    }

    #[test]
    fn test_list_marker_consistency() {
        let issues = lint("- one\n* two\n");
        assert_eq!(rules_of(&issues), vec!["list_marker_consistency"]);

        // A new list after a paragraph may pick a new marker
        let issues = lint("- one\n- two\n\nbreak\n\n* three\n* four\n");
        assert!(issues.is_empty());
    }

    #[test]
    fn test_code_fences_are_skipped() {
        let text = "```\nthis line has trailing spaces   \n# not a heading\n```\n";
        assert!(lint(text).is_empty());
    }

    #[test]
    fn test_issues_sorted_by_line() {
        let text = "dirty  \n\n### Jump\n\n[]()\n";
        let issues = lint(text);
        let lines: Vec<usize> = issues.iter().map(|i| i.line).collect();
        let mut sorted = lines.clone();
        sorted.sort_unstable();
        assert_eq!(lines, sorted);
    }

    #[test]
    fn test_front_matter_lines_are_skipped() {
        // Trailing space inside front matter is not the body's problem
        let text = "---\ntitle: x  \n---\n\nbody\n";
        assert!(lint(text).is_empty());
    }
}
