use crate::config::ExtractorConfig;
use crate::dedup::FoundSet;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;

/// Keys that anchor the keyword-window strategy, in scan order
pub const PLAN_KEYWORDS: [&str; 4] = [
    "resource_changes",
    "planned_values",
    "terraform_version",
    "configuration",
];

static LAZY_OBJECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{.*?\}").expect("lazy object pattern is valid"));

/// Independent ways of locating JSON inside noisy text.
///
/// Every strategy has blind spots, so the scanner always runs all of them and
/// lets the deduplicator collapse the overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStrategy {
    /// Depth-counted `{...}` then `[...]` spans, string-literal aware
    BalancedSpans,

    /// Multi-line objects starting on a line that begins with `{`
    LineAccumulation,

    /// Balanced objects near the first occurrence of a plan keyword
    KeywordWindow,

    /// Shortest `{...}` spans whose brace counts agree
    LazyMultiline,
}

impl ScanStrategy {
    pub const ALL: [Self; 4] = [
        Self::BalancedSpans,
        Self::LineAccumulation,
        Self::KeywordWindow,
        Self::LazyMultiline,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::BalancedSpans => "balanced_spans",
            Self::LineAccumulation => "line_accumulation",
            Self::KeywordWindow => "keyword_window",
            Self::LazyMultiline => "lazy_multiline",
        }
    }
}

/// Runs every [`ScanStrategy`] over a buffer
#[derive(Debug, Clone)]
pub struct FragmentScanner {
    window_before: usize,
    window_after: usize,
}

impl FragmentScanner {
    #[must_use]
    pub fn new(config: &ExtractorConfig) -> Self {
        Self {
            window_before: config.keyword_window_before,
            window_after: config.keyword_window_after,
        }
    }

    /// All strategies, deduplicated, in discovery order.
    #[must_use]
    pub fn scan(&self, text: &str) -> FoundSet {
        FoundSet::from_candidates(self.scan_raw(text))
    }

    /// All strategies concatenated, duplicates included.
    #[must_use]
    pub fn scan_raw(&self, text: &str) -> Vec<Value> {
        let mut found = Vec::new();
        for strategy in ScanStrategy::ALL {
            let values = self.run(strategy, text);
            log::debug!(
                "{} strategy recovered {} values",
                strategy.name(),
                values.len()
            );
            found.extend(values);
        }
        found
    }

    /// Run a single strategy
    #[must_use]
    pub fn run(&self, strategy: ScanStrategy, text: &str) -> Vec<Value> {
        match strategy {
            ScanStrategy::BalancedSpans => balanced_spans(text),
            ScanStrategy::LineAccumulation => line_accumulation(text),
            ScanStrategy::KeywordWindow => self.keyword_windows(text),
            ScanStrategy::LazyMultiline => lazy_multiline(text),
        }
    }

    fn keyword_windows(&self, text: &str) -> Vec<Value> {
        let mut found = Vec::new();
        for keyword in PLAN_KEYWORDS {
            let Some(at) = text.find(keyword) else {
                continue;
            };
            let window = char_window(text, at, self.window_before, self.window_after);

            let mut candidates = Vec::new();
            balanced_pass(window, b'{', b'}', &mut candidates);
            found.extend(
                candidates
                    .into_iter()
                    .filter(|value| value.to_string().contains(keyword)),
            );
        }
        found
    }
}

fn parse_candidate(candidate: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(candidate)
}

fn keep_parsed(candidate: &str, out: &mut Vec<Value>) -> bool {
    match parse_candidate(candidate) {
        Ok(value) => {
            out.push(value);
            true
        }
        Err(err) => {
            log::trace!("discarding candidate of {} bytes: {err}", candidate.len());
            false
        }
    }
}

fn balanced_spans(text: &str) -> Vec<Value> {
    let mut found = Vec::new();
    balanced_pass(text, b'{', b'}', &mut found);
    balanced_pass(text, b'[', b']', &mut found);
    found
}

/// Collect parseable `open ... close` spans.
///
/// A span that parses is consumed whole; one that does not is retried from the
/// next byte so nested candidates inside it are still found.
fn balanced_pass(text: &str, open: u8, close: u8, out: &mut Vec<Value>) {
    let bytes = text.as_bytes();
    let mut index = SpanIndex::new(bytes, open, close);
    let mut pos = 0;
    while let Some(offset) = bytes[pos..].iter().position(|&b| b == open) {
        let start = pos + offset;
        pos = match index.end_of(start) {
            Some(end) if keep_parsed(&text[start..=end], out) => end + 1,
            _ => start + 1,
        };
    }
}

/// Closing delimiter for each opening one, memoized across starts.
///
/// A walk from one opening delimiter follows the same path as a fresh walk
/// from any opening delimiter it meets outside a string literal, so every
/// pair it closes (and every delimiter it leaves open at the end of the
/// buffer) is recorded for those starts too. Later walks jump over known
/// pairs and stop at a known dead end, which keeps a pass linear on runs of
/// unclosed delimiters.
struct SpanIndex<'a> {
    bytes: &'a [u8],
    open: u8,
    close: u8,
    ends: HashMap<usize, Option<usize>>,
}

impl<'a> SpanIndex<'a> {
    fn new(bytes: &'a [u8], open: u8, close: u8) -> Self {
        Self {
            bytes,
            open,
            close,
            ends: HashMap::new(),
        }
    }

    /// Index of the delimiter closing the one at `start`, skipping string literals.
    fn end_of(&mut self, start: usize) -> Option<usize> {
        if let Some(&known) = self.ends.get(&start) {
            return known;
        }

        let mut stack = vec![start];
        let mut in_string = false;
        let mut escaped = false;
        let mut pos = start + 1;

        while pos < self.bytes.len() {
            let b = self.bytes[pos];
            if in_string {
                if escaped {
                    escaped = false;
                } else if b == b'\\' {
                    escaped = true;
                } else if b == b'"' {
                    in_string = false;
                }
            } else if b == b'"' {
                in_string = true;
            } else if b == self.open {
                match self.ends.get(&pos) {
                    Some(&Some(end)) => {
                        pos = end + 1;
                        continue;
                    }
                    // nothing after `pos` drops below its depth
                    Some(&None) => break,
                    None => stack.push(pos),
                }
            } else if b == self.close {
                if let Some(opened) = stack.pop() {
                    self.ends.insert(opened, Some(pos));
                }
                if stack.is_empty() {
                    return Some(pos);
                }
            }
            pos += 1;
        }

        for opened in stack {
            self.ends.insert(opened, None);
        }
        None
    }
}

fn line_accumulation(text: &str) -> Vec<Value> {
    let mut found = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut depth: i64 = 0;

    for line in split_lines(text).map(str::trim) {
        if line.is_empty() {
            continue;
        }
        if current.is_empty() {
            if !line.starts_with('{') {
                continue;
            }
            depth = 0;
        }

        current.push(line);
        depth += brace_delta(line);

        if depth == 0 {
            keep_parsed(&current.join("\n"), &mut found);
            current.clear();
        }
    }
    found
}

/// `{` count minus `}` count, string literals included.
fn brace_delta(line: &str) -> i64 {
    line.bytes().fold(0, |acc, b| match b {
        b'{' => acc + 1,
        b'}' => acc - 1,
        _ => acc,
    })
}

fn lazy_multiline(text: &str) -> Vec<Value> {
    let mut found = Vec::new();
    for m in LAZY_OBJECT.find_iter(text) {
        let candidate = m.as_str();
        if candidate.matches('{').count() == candidate.matches('}').count() {
            keep_parsed(candidate, &mut found);
        }
    }
    found
}

/// Split on every line terminator a log file is likely to contain.
pub(crate) fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| {
        matches!(
            c,
            '\n' | '\r' | '\u{0b}' | '\u{0c}' | '\u{85}' | '\u{2028}' | '\u{2029}'
        )
    })
}

/// Slice from `before` characters ahead of byte offset `at` to `after`
/// characters past it, clamped to the buffer.
fn char_window(text: &str, at: usize, before: usize, after: usize) -> &str {
    let start = text[..at]
        .char_indices()
        .rev()
        .take(before)
        .last()
        .map_or(at, |(idx, _)| idx);
    let end = text[at..]
        .char_indices()
        .nth(after)
        .map_or(text.len(), |(idx, _)| at + idx);
    &text[start..end]
}
