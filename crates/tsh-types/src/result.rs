//! ExecResult — the result of every dispatched command.

/// The result of executing a builtin or an external command.
///
/// - `code` — exit code (0 = success)
/// - `out` — text for stdout (listings, status lines)
/// - `err` — error message if failed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecResult {
    /// Exit code. 0 means success.
    pub code: i64,
    /// Standard output text.
    pub out: String,
    /// Standard error text.
    pub err: String,
}

impl ExecResult {
    /// Create a successful result with output.
    pub fn success(out: impl Into<String>) -> Self {
        Self {
            code: 0,
            out: out.into(),
            err: String::new(),
        }
    }

    /// Create a failed result with an error message.
    pub fn failure(code: i64, err: impl Into<String>) -> Self {
        Self {
            code,
            out: String::new(),
            err: err.into(),
        }
    }

    /// Create a result from raw parts.
    pub fn from_output(code: i64, out: impl Into<String>, err: impl Into<String>) -> Self {
        Self {
            code,
            out: out.into(),
            err: err.into(),
        }
    }

    /// True if the exit code is 0.
    pub fn ok(&self) -> bool {
        self.code == 0
    }

    /// Append status lines (job notices) to `out`.
    pub fn append_lines(&mut self, lines: impl IntoIterator<Item = String>) {
        for line in lines {
            self.out.push_str(&line);
            self.out.push('\n');
        }
    }
}
