/// A line that looks like a backtick fence delimiter.
///
/// Borrowed from the input line; nothing is copied until a rewrite is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FenceLine<'a> {
    /// Leading whitespace before the backtick run, verbatim.
    pub prefix: &'a str,
    /// Length of the backtick run.
    pub ticks: usize,
    /// Trailing text after the run, trimmed. Empty for a closing fence.
    pub info: &'a str,
    /// Trailing text after the run, exactly as written.
    pub raw_info: &'a str,
    /// The full line starts with a diff `+`/`-` marker.
    pub diff_marker: bool,
}

impl<'a> FenceLine<'a> {
    pub const BACKTICK: char = '`';
    pub const MIN_TICKS: usize = 3;

    /// Parses `line` as a fence: optional whitespace, then at least three
    /// backticks, then trailing text on the same line.
    ///
    /// A byte order mark counts as leading whitespace. Trailing text holding a
    /// line terminator (`\r`, U+2028, U+2029) disqualifies the line, so CRLF
    /// input passes through byte-identical.
    pub fn parse(line: &'a str) -> Option<Self> {
        let rest = line.trim_start_matches(|c: char| c.is_whitespace() || c == '\u{feff}');
        let prefix = &line[..line.len() - rest.len()];

        let after_run = rest.trim_start_matches(Self::BACKTICK);
        let ticks = rest.len() - after_run.len();
        if ticks < Self::MIN_TICKS || after_run.contains(['\r', '\u{2028}', '\u{2029}']) {
            return None;
        }

        Some(FenceLine {
            prefix,
            ticks,
            info: after_run.trim(),
            raw_info: after_run,
            diff_marker: line.starts_with(['+', '-']),
        })
    }

    pub fn has_info(&self) -> bool {
        !self.info.is_empty()
    }

    /// Whether this line counts as a fence when scanning a block.
    ///
    /// Inside a diff block, lines carrying a diff marker are content.
    pub fn is_real(&self, inside_diff: bool) -> bool {
        !(inside_diff && self.diff_marker)
    }

    /// Only fences with an info string and no diff marker open a block.
    pub fn opens_block(&self) -> bool {
        self.has_info() && !self.diff_marker
    }

    /// First whitespace-delimited token of the info string.
    pub fn language(&self) -> Option<&'a str> {
        self.info.split_whitespace().next()
    }
}
