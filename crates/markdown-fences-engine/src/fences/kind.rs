use serde::Serialize;

use super::line::FenceLine;

/// How a fenced block treats the fences nested inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BlockKind {
    /// Diff container: nested fences count unless they carry a diff marker.
    Diff,
    /// Markdown container: nested fences always count.
    Markdown,
    /// Opaque code: the first bare fence at depth one closes it.
    Leaf,
}

impl BlockKind {
    pub fn is_container(self) -> bool {
        matches!(self, BlockKind::Diff | BlockKind::Markdown)
    }

    pub fn is_diff(self) -> bool {
        matches!(self, BlockKind::Diff)
    }

    pub fn label(self) -> &'static str {
        match self {
            BlockKind::Diff => "diff",
            BlockKind::Markdown => "markdown",
            BlockKind::Leaf => "leaf",
        }
    }
}

/// Languages that decide which opening fences are containers.
///
/// Keywords are matched case-insensitively against the first token of the
/// info string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenceRules {
    pub container_languages: Vec<String>,
    pub diff_languages: Vec<String>,
    /// Shortest backtick run emitted by a rewrite.
    pub min_fence_len: usize,
}

impl Default for FenceRules {
    fn default() -> Self {
        Self {
            container_languages: vec!["markdown".to_string(), "md".to_string()],
            diff_languages: vec!["diff".to_string()],
            min_fence_len: FenceLine::MIN_TICKS,
        }
    }
}

impl FenceRules {
    pub fn classify(&self, fence: &FenceLine<'_>) -> BlockKind {
        let Some(language) = fence.language() else {
            return BlockKind::Leaf;
        };
        let language = language.to_lowercase();

        if Self::contains(&self.diff_languages, &language) {
            BlockKind::Diff
        } else if Self::contains(&self.container_languages, &language) {
            BlockKind::Markdown
        } else {
            BlockKind::Leaf
        }
    }

    fn contains(keywords: &[String], language: &str) -> bool {
        keywords.iter().any(|k| k.to_lowercase() == language)
    }
}
