//! Positional line diff.
//!
//! Lines are compared strictly by index: line `i` of the old text against
//! line `i` of the new text, with the shorter side padded by empty lines.
//! There is no alignment step, so a single inserted line makes every
//! following line show up as changed. Previews depend on this exact output.

use std::fmt;

/// One rendered line of a positional diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffLine {
    /// Identical on both sides.
    Context(String),
    /// Present only on the old side at this index.
    Removed(String),
    /// Present only on the new side at this index.
    Added(String),
}

impl DiffLine {
    pub fn prefix(&self) -> &'static str {
        match self {
            DiffLine::Context(_) => "  ",
            DiffLine::Removed(_) => "- ",
            DiffLine::Added(_) => "+ ",
        }
    }

    pub fn text(&self) -> &str {
        match self {
            DiffLine::Context(t) | DiffLine::Removed(t) | DiffLine::Added(t) => t,
        }
    }
}

impl fmt::Display for DiffLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.prefix(), self.text())
    }
}

/// Compare `old` and `new` line by line.
///
/// For each index: equal lines yield one `Context`; otherwise a `Removed`
/// when the old line is non-empty, followed by an `Added` when the new line
/// is non-empty.
pub fn line_diff(old: &str, new: &str) -> Vec<DiffLine> {
    let old_lines: Vec<&str> = old.split('\n').collect();
    let new_lines: Vec<&str> = new.split('\n').collect();
    let len = old_lines.len().max(new_lines.len());

    let mut out = Vec::with_capacity(len);
    for i in 0..len {
        let o = old_lines.get(i).copied().unwrap_or("");
        let n = new_lines.get(i).copied().unwrap_or("");

        if o == n {
            out.push(DiffLine::Context(n.to_string()));
            continue;
        }
        if !o.is_empty() {
            out.push(DiffLine::Removed(o.to_string()));
        }
        if !n.is_empty() {
            out.push(DiffLine::Added(n.to_string()));
        }
    }
    out
}

/// Join diff lines with `\n`, each carrying its two-character prefix.
pub fn render(lines: &[DiffLine]) -> String {
    lines
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// `render(&line_diff(old, new))`.
pub fn simple_line_diff(old: &str, new: &str) -> String {
    render(&line_diff(old, new))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
