//! Rewrites nested code fences so a flat, commonmark-style renderer keeps
//! them intact.
//!
//! A renderer closes a fenced block at the first bare fence whose backtick run
//! is at least as long as the opener. Widening the outer fences of a block past
//! every run found inside it turns the inner fences into plain content lines.

pub mod kind;
pub mod line;
pub mod scan;

use std::borrow::Cow;

use serde::Serialize;

pub use kind::{BlockKind, FenceRules};
pub use line::FenceLine;
use scan::{Lookahead, find_close};

/// One opening/closing pair that was re-emitted with a new fence length.
///
/// Line indices are zero-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rewrite {
    pub open_line: usize,
    pub close_line: usize,
    pub kind: BlockKind,
    pub fence_len: usize,
}

/// Output of [`FenceNormalizer::normalize_with_report`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub text: String,
    pub rewrites: Vec<Rewrite>,
    changed: bool,
}

impl Normalized {
    /// Whether any line differs from the input.
    ///
    /// A block whose fences already had the right length is reported as a
    /// rewrite but leaves the text unchanged.
    pub fn changed(&self) -> bool {
        self.changed
    }
}

#[derive(Debug, Clone, Default)]
pub struct FenceNormalizer {
    rules: FenceRules,
}

impl FenceNormalizer {
    pub fn new(rules: FenceRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &FenceRules {
        &self.rules
    }

    pub fn normalize(&self, text: &str) -> String {
        self.normalize_with_report(text).text
    }

    /// Normalizes `text` and records every block whose fences were re-emitted.
    ///
    /// Line count and every line outside the matched fence pairs are preserved.
    /// Unterminated openers are left as written.
    pub fn normalize_with_report(&self, text: &str) -> Normalized {
        if text.is_empty() {
            return Normalized {
                text: String::new(),
                rewrites: Vec::new(),
                changed: false,
            };
        }

        let lines: Vec<&str> = text.split('\n').collect();
        let fences: Vec<Option<FenceLine<'_>>> =
            lines.iter().map(|line| FenceLine::parse(line)).collect();
        let lookahead = Lookahead::new(&fences);

        let mut out: Vec<Cow<'_, str>> = lines.iter().map(|line| Cow::Borrowed(*line)).collect();
        let mut rewrites = Vec::new();
        let mut changed = false;

        let mut idx = 0;
        while idx < fences.len() {
            let Some(open) = fences[idx].filter(|f| f.opens_block()) else {
                idx += 1;
                continue;
            };

            let kind = self.rules.classify(&open);
            let Some(block) = find_close(&fences, idx, kind, &lookahead) else {
                log::trace!("unterminated {} fence at line {}", kind.label(), idx + 1);
                idx += 1;
                continue;
            };

            let fence_len = self
                .rules
                .min_fence_len
                .max(FenceLine::MIN_TICKS)
                .max(block.max_inner_ticks + 1);
            let run = FenceLine::BACKTICK.to_string().repeat(fence_len);
            let close_prefix = fences[block.close].map_or("", |f| f.prefix);

            let opening = format!("{}{run}{}", open.prefix, open.raw_info);
            let closing = format!("{close_prefix}{run}");
            changed |= opening != lines[idx] || closing != lines[block.close];
            out[idx] = Cow::Owned(opening);
            out[block.close] = Cow::Owned(closing);

            log::debug!(
                "{} fence at lines {}-{} emitted with {} backticks",
                kind.label(),
                idx + 1,
                block.close + 1,
                fence_len
            );
            rewrites.push(Rewrite {
                open_line: idx,
                close_line: block.close,
                kind,
                fence_len,
            });

            idx = block.close + 1;
        }

        Normalized {
            text: out.join("\n"),
            rewrites,
            changed,
        }
    }
}

/// Normalizes `text` with the default rules.
pub fn normalize(text: &str) -> String {
    FenceNormalizer::default().normalize(text)
}

/// Like [`normalize`], passing an absent document through untouched.
pub fn normalize_opt(text: Option<&str>) -> Option<String> {
    text.map(normalize)
}
