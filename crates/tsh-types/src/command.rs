//! Command descriptors — what a parser hands to the kernel.

use std::path::PathBuf;

/// Where a child's standard streams should point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Redirects {
    /// File to read stdin from (`< file`).
    pub stdin: Option<PathBuf>,
    /// File to write stdout to (`> file` or `>> file`).
    pub stdout: Option<PathBuf>,
    /// Append instead of truncating `stdout`.
    pub append: bool,
}

impl Redirects {
    /// True when no stream is redirected.
    pub fn is_empty(&self) -> bool {
        self.stdin.is_none() && self.stdout.is_none()
    }
}

/// A single parsed command, ready to dispatch.
///
/// `argv[0]` is the program name as typed. `text` is the command line shown
/// in job listings, without the trailing `&`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDescriptor {
    /// Argument vector; `argv[0]` names the program.
    pub argv: Vec<String>,
    /// Run without blocking the shell (`cmd &`).
    pub background: bool,
    /// Optional stream redirects, attached before the image is replaced.
    pub redirects: Redirects,
    /// Human-readable command text for status lines.
    pub text: String,
}

impl CommandDescriptor {
    /// Build a foreground descriptor from words; `text` is the words joined by spaces.
    pub fn new<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let argv: Vec<String> = argv.into_iter().map(Into::into).collect();
        let text = argv.join(" ");
        Self {
            argv,
            background: false,
            redirects: Redirects::default(),
            text,
        }
    }

    /// Mark the command as a background job.
    pub fn background(mut self, background: bool) -> Self {
        self.background = background;
        self
    }

    /// Attach redirects.
    pub fn with_redirects(mut self, redirects: Redirects) -> Self {
        self.redirects = redirects;
        self
    }

    /// Override the display text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// The program name (`argv[0]`), if any.
    pub fn program(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }

    /// Arguments after the program name.
    pub fn args(&self) -> &[String] {
        self.argv.get(1..).unwrap_or(&[])
    }
}
