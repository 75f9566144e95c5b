use crate::error::NoteError;

/// Walks one command's arguments, separating `--flags` from positionals.
pub struct ArgParser {
    iter: std::vec::IntoIter<String>,
    command_name: String,
}

impl ArgParser {
    pub fn new(args: Vec<String>, command_name: &str) -> Self {
        Self { iter: args.into_iter(), command_name: command_name.to_string() }
    }

    /// Split into positionals and the switches found among `known`.
    pub fn split(
        self,
        known: &[&str],
    ) -> Result<(Vec<String>, Vec<String>), NoteError> {
        let mut positional = Vec::new();
        let mut switches = Vec::new();
        for arg in self.iter {
            if arg.starts_with("--") && arg.len() > 2 {
                if !known.contains(&arg.as_str()) {
                    return Err(NoteError::Usage(format!(
                        "Unknown flag for {}: {arg}",
                        self.command_name
                    )));
                }
                switches.push(arg);
            } else {
                positional.push(arg);
            }
        }
        Ok((positional, switches))
    }

    /// Exactly `count` positionals, or a usage error built from `usage`.
    pub fn positionals(
        self,
        count: usize,
        known: &[&str],
        usage: &str,
    ) -> Result<(Vec<String>, Vec<String>), NoteError> {
        let (positional, switches) = self.split(known)?;
        if positional.len() != count {
            return Err(NoteError::Usage(format!("Usage: {usage}")));
        }
        Ok((positional, switches))
    }
}
