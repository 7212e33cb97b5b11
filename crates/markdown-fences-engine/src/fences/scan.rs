use super::kind::BlockKind;
use super::line::FenceLine;

/// Result of a successful scan from an opening fence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockMatch {
    /// Line index of the closing fence.
    pub close: usize,
    /// Longest backtick run seen on fence lines inside the block.
    pub max_inner_ticks: usize,
}

/// Answers "is there any later real fence?" in constant time.
///
/// Two suffix tables are kept because diff blocks ignore marked fences while
/// every other block counts them.
#[derive(Debug)]
pub struct Lookahead {
    any: Vec<bool>,
    unmarked: Vec<bool>,
}

impl Lookahead {
    pub fn new(fences: &[Option<FenceLine<'_>>]) -> Self {
        let mut any = vec![false; fences.len()];
        let mut unmarked = vec![false; fences.len()];
        let mut seen_any = false;
        let mut seen_unmarked = false;

        for (idx, fence) in fences.iter().enumerate().rev() {
            any[idx] = seen_any;
            unmarked[idx] = seen_unmarked;
            if let Some(fence) = fence {
                seen_any = true;
                seen_unmarked |= !fence.diff_marker;
            }
        }

        Self { any, unmarked }
    }

    /// Whether a real fence exists strictly after `line`.
    pub fn has_more(&self, line: usize, inside_diff: bool) -> bool {
        let table = if inside_diff { &self.unmarked } else { &self.any };
        table.get(line).copied().unwrap_or(false)
    }
}

/// Scans forward from the opening fence at `open` for its matching close.
///
/// Returns `None` when the document ends with the block still open.
pub fn find_close(
    fences: &[Option<FenceLine<'_>>],
    open: usize,
    kind: BlockKind,
    lookahead: &Lookahead,
) -> Option<BlockMatch> {
    let inside_diff = kind.is_diff();
    let mut depth = 1usize;
    let mut max_inner_ticks = 0usize;

    for (idx, fence) in fences.iter().copied().enumerate().skip(open + 1) {
        let Some(fence) = fence.filter(|f| f.is_real(inside_diff)) else {
            continue;
        };

        if fence.has_info() {
            depth += 1;
        } else if depth > 1 {
            depth -= 1;
        } else if kind.is_container() && lookahead.has_more(idx, inside_diff) {
            // A bare fence with more fences after it is read as an inner opener.
            depth += 1;
        } else {
            depth = 0;
        }

        if depth == 0 {
            return Some(BlockMatch {
                close: idx,
                max_inner_ticks,
            });
        }
        max_inner_ticks = max_inner_ticks.max(fence.ticks);
    }

    None
}
