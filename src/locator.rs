use serde::Serialize;

/// Inclusive, zero-based line range of a bracketed assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlockSpan {
    pub start: usize,
    pub end: usize,
}

impl BlockSpan {
    pub fn line_count(&self) -> usize {
        self.end - self.start + 1
    }
}

/// Splits text into lines that keep their terminators, so `concat()` restores
/// the input byte-for-byte.
pub fn split_lines(text: &str) -> Vec<String> {
    text.split_inclusive('\n').map(str::to_string).collect()
}

/// Finds the line extent of the first entry whose trimmed line starts with
/// `entry_name`.
///
/// The depth counter is seeded with the openers on the start line only; closers
/// on that line are ignored and zero depth is first checked on the following
/// line. A one-line entry at the end of input is therefore never found, and a
/// bracket-free entry is reported as spanning the next bracket-neutral line.
/// Brackets inside string literals are counted like any other.
pub fn locate<S: AsRef<str>>(entry_name: &str, lines: &[S]) -> Option<BlockSpan> {
    let start = find_start(entry_name, lines)?;

    let mut depth = count_openers(lines[start].as_ref());
    for (offset, line) in lines[start + 1..].iter().enumerate() {
        let line = line.as_ref();
        depth += count_openers(line);
        depth -= count_closers(line);
        if depth == 0 {
            return Some(BlockSpan {
                start,
                end: start + 1 + offset,
            });
        }
    }

    None
}

/// Index of the first line whose trimmed content starts with `entry_name`,
/// whether or not its brackets ever balance.
pub fn find_start<S: AsRef<str>>(entry_name: &str, lines: &[S]) -> Option<usize> {
    if entry_name.is_empty() {
        return None;
    }

    lines
        .iter()
        .position(|line| line.as_ref().trim_start().starts_with(entry_name))
}

/// Returns true when some line, after trimming leading whitespace, starts with
/// `"{name} ="`.
pub fn has_scalar<S: AsRef<str>>(name: &str, lines: &[S]) -> bool {
    let prefix = format!("{name} =");
    lines
        .iter()
        .any(|line| line.as_ref().trim_start().starts_with(&prefix))
}

fn count_openers(line: &str) -> i64 {
    line.chars().filter(|ch| matches!(ch, '(' | '{')).count() as i64
}

fn count_closers(line: &str) -> i64 {
    line.chars().filter(|ch| matches!(ch, ')' | '}')).count() as i64
}
