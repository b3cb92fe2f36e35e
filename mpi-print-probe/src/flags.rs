//! Parsing the command line printed by `mpicc -show`

use std::path::PathBuf;

/// Link and include settings extracted from a compiler wrapper's command line
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompilerFlags {
    /// Libraries named with `-l`
    pub libs: Vec<String>,
    /// Library search directories named with `-L`
    pub lib_paths: Vec<PathBuf>,
    /// Header search directories named with `-I`
    pub include_paths: Vec<PathBuf>,
}

impl CompilerFlags {
    /// Split `cmd` the way a POSIX shell would and pick out `-l`, `-L` and `-I` arguments.
    ///
    /// Both `-I/path` and `-I"/path with spaces"` are understood. Fails only when `cmd` has
    /// unbalanced quotes.
    pub fn parse(cmd: &str) -> Result<CompilerFlags, shell_words::ParseError> {
        let mut flags = CompilerFlags::default();
        for arg in shell_words::split(cmd)? {
            if let Some(lib) = arg.strip_prefix("-l") {
                flags.libs.push(lib.to_owned());
            } else if let Some(dir) = arg.strip_prefix("-L") {
                flags.lib_paths.push(PathBuf::from(unquote(dir)));
            } else if let Some(dir) = arg.strip_prefix("-I") {
                flags.include_paths.push(PathBuf::from(unquote(dir)));
            }
        }
        Ok(flags)
    }
}

/// Strips one level of matching `"`, `'` or `` ` `` quotes that survived shell splitting.
fn unquote(s: &str) -> &str {
    let mut chars = s.chars();
    match (chars.next(), chars.next_back()) {
        (Some(open), Some(close)) if open == close && matches!(open, '"' | '\'' | '`') => {
            &s[1..s.len() - 1]
        }
        _ => s,
    }
}
