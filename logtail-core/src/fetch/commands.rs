//! Shell commands issued against the remote host.
//!
//! The command shapes are fixed; only the path (and the byte count for a
//! delta read) vary. Plain paths are emitted verbatim, anything else is
//! single-quoted so it cannot split the command line.

/// Sentinel printed when the file exists
pub const EXISTS_SENTINEL: &str = "EXISTS";

/// Sentinel printed when the file is absent
pub const NOT_FOUND_SENTINEL: &str = "NOT_FOUND";

/// A command understood by [`crate::executor::RemoteExecutor`] implementations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCommand {
    /// `test -f <path> && echo 'EXISTS' || echo 'NOT_FOUND'`
    Exists(String),
    /// `wc -c < <path>`
    Size(String),
    /// `base64 <path>`
    ReadAll(String),
    /// `tail -c <n> <path> | base64`
    ReadTail {
        /// Remote path
        path: String,
        /// Number of trailing bytes
        bytes: u64,
    },
    /// `truncate -s 0 <path>`
    Truncate(String),
}

impl RemoteCommand {
    /// Renders the shell command line
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Exists(path) => format!(
                "test -f {} && echo '{EXISTS_SENTINEL}' || echo '{NOT_FOUND_SENTINEL}'",
                quote_path(path)
            ),
            Self::Size(path) => format!("wc -c < {}", quote_path(path)),
            Self::ReadAll(path) => format!("base64 {}", quote_path(path)),
            Self::ReadTail { path, bytes } => {
                format!("tail -c {bytes} {} | base64", quote_path(path))
            }
            Self::Truncate(path) => format!("truncate -s 0 {}", quote_path(path)),
        }
    }

    /// Parses a rendered command line back into its structured form.
    ///
    /// Returns `None` for anything that is not one of the known shapes.
    #[must_use]
    pub fn parse(command: &str) -> Option<Self> {
        let exists_suffix =
            format!(" && echo '{EXISTS_SENTINEL}' || echo '{NOT_FOUND_SENTINEL}'");
        if let Some(rest) = command.strip_prefix("test -f ") {
            let path = rest.strip_suffix(exists_suffix.as_str())?;
            return unquote_path(path).map(Self::Exists);
        }
        if let Some(path) = command.strip_prefix("wc -c < ") {
            return unquote_path(path).map(Self::Size);
        }
        if let Some(rest) = command.strip_prefix("tail -c ") {
            let rest = rest.strip_suffix(" | base64")?;
            let (count, path) = rest.split_once(' ')?;
            let bytes = count.parse().ok()?;
            return unquote_path(path).map(|path| Self::ReadTail { path, bytes });
        }
        if let Some(path) = command.strip_prefix("base64 ") {
            return unquote_path(path).map(Self::ReadAll);
        }
        if let Some(path) = command.strip_prefix("truncate -s 0 ") {
            return unquote_path(path).map(Self::Truncate);
        }
        None
    }
}

impl std::fmt::Display for RemoteCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

fn is_plain_path_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '/' | '~' | '+' | ':' | '@' | '%' | ',' | '-')
}

/// Quotes a path for a POSIX shell when it contains anything but plain characters
#[must_use]
pub fn quote_path(path: &str) -> String {
    if !path.is_empty() && path.chars().all(is_plain_path_char) {
        return path.to_string();
    }
    format!("'{}'", path.replace('\'', r"'\''"))
}

/// Reverses [`quote_path`]
#[must_use]
pub fn unquote_path(text: &str) -> Option<String> {
    if !text.starts_with('\'') {
        return (!text.is_empty() && text.chars().all(is_plain_path_char)).then(|| text.to_string());
    }
    let inner = text.strip_prefix('\'')?.strip_suffix('\'')?;
    // quotes may only appear as the escaped sequence
    if inner.replace(r"'\''", "").contains('\'') {
        return None;
    }
    Some(inner.replace(r"'\''", "'"))
}
