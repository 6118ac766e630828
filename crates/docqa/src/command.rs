//! Parsing of REPL input lines.

/// What a line typed into the REPL asks for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Ask the assistant a question.
    Ask(String),
    /// Upload every file matching the glob patterns.
    Upload(Vec<String>),
    /// List uploaded files.
    ListFiles,
    /// Forget the uploaded file at this 0-based index.
    Remove(usize),
    /// Clear the chat.
    Clear,
    /// Leave the REPL.
    Quit,
}

/// Error type for [`Command::parse`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// The slash command is not known.
    #[error("unknown command `/{0}`, try /upload, /files, /remove, /clear or /quit")]
    Unknown(String),
    /// The command needs an argument that wasn't given.
    #[error("usage: {0}")]
    MissingArgument(&'static str),
    /// The file number is not a positive integer.
    #[error("`{0}` is not a file number, see /files")]
    InvalidIndex(String),
}

impl Command {
    /// Parses a line of input. Returns `Ok(None)` for a blank line.
    ///
    /// Lines starting with `/` are commands, anything else is a question.
    /// File numbers are 1-based, as printed by `/files`.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Ok(Some(Command::Ask(line.to_owned())));
        };

        let mut words = rest.split_whitespace();
        let name = words.next().unwrap_or_default();
        let command = match name {
            "upload" => {
                let patterns: Vec<_> = words.map(str::to_owned).collect();
                if patterns.is_empty() {
                    return Err(CommandError::MissingArgument(
                        "/upload <pattern>...",
                    ));
                }
                Command::Upload(patterns)
            }
            "files" => Command::ListFiles,
            "remove" => {
                let Some(arg) = words.next() else {
                    return Err(CommandError::MissingArgument("/remove <n>"));
                };
                match arg.parse::<usize>() {
                    Ok(n) if n > 0 => Command::Remove(n - 1),
                    _ => return Err(CommandError::InvalidIndex(arg.to_owned())),
                }
            }
            "clear" => Command::Clear,
            "quit" | "exit" => Command::Quit,
            _ => return Err(CommandError::Unknown(name.to_owned())),
        };
        Ok(Some(command))
    }
}
