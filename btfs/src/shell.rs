//! Line-oriented command shell over a [`Namespace`].
//!
//! Each input line is one command; arguments are separated by whitespace.
//! Paths are given relative to the root, segments separated by `/`, and `/`
//! alone names the root. Optional path arguments default to the root.
//!
//! ```text
//! mkdir NAME [PATH]         create a folder
//! touch NAME [PATH]         create a file
//! rmdir NAME [PATH]         delete a folder and its contents
//! rm NAME [PATH]            delete a file
//! rename OLD NEW [PATH]     rename a file or folder
//! mvdir NAME SRC DEST       move a folder
//! mv NAME SRC DEST          move a file
//! finddir NAME              list every folder with this name
//! find NAME                 list every file with this name
//! tree                      print the whole tree
//! save [FILE]               write the state file
//! load [FILE]               replace the namespace with a state file
//! help                      print this summary
//! exit                      leave the shell
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::ShellConfig;
use crate::namespace::{EntryKind, Namespace, NamespaceError, NsPath};
use crate::state_file::{self, StateFileError};

const HELP: &str = "\
Commands:
  mkdir NAME [PATH]       create a folder
  touch NAME [PATH]       create a file
  rmdir NAME [PATH]       delete a folder and its contents
  rm NAME [PATH]          delete a file
  rename OLD NEW [PATH]   rename a file or folder
  mvdir NAME SRC DEST     move a folder
  mv NAME SRC DEST        move a file
  finddir NAME            list every folder with this name
  find NAME               list every file with this name
  tree                    print the whole tree
  save [FILE]             write the state file
  load [FILE]             replace the namespace with a state file
  help                    print this summary
  exit                    leave the shell
Paths are relative to root, e.g. projects/python; '/' is the root itself.";

/// A parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    CreateFolder { name: String, parent: NsPath },
    CreateFile { name: String, parent: NsPath },
    DeleteFolder { name: String, parent: NsPath },
    DeleteFile { name: String, parent: NsPath },
    Rename { old: String, new: String, parent: NsPath },
    MoveFolder { name: String, source: NsPath, dest: NsPath },
    MoveFile { name: String, source: NsPath, dest: NsPath },
    FindFolder { name: String },
    FindFile { name: String },
    Tree,
    Save { file: Option<PathBuf> },
    Load { file: Option<PathBuf> },
    Help,
    Exit,
}

impl Command {
    /// Parse one input line.
    ///
    /// Returns `Ok(None)` for a blank line or a `#` comment.
    ///
    /// # Errors
    ///
    /// Returns `ShellError::UnknownCommand` for an unrecognised verb and
    /// `ShellError::Usage` when the argument count is wrong.
    pub fn parse(line: &str) -> Result<Option<Self>, ShellError> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        if verb.starts_with('#') {
            return Ok(None);
        }
        let args: Vec<&str> = words.collect();
        let optional_path = |i: usize| args.get(i).map_or_else(NsPath::root, |p| NsPath::parse(p));

        let command = match (verb, args.len()) {
            ("mkdir", 1 | 2) => Self::CreateFolder {
                name: args[0].to_string(),
                parent: optional_path(1),
            },
            ("touch", 1 | 2) => Self::CreateFile {
                name: args[0].to_string(),
                parent: optional_path(1),
            },
            ("rmdir", 1 | 2) => Self::DeleteFolder {
                name: args[0].to_string(),
                parent: optional_path(1),
            },
            ("rm", 1 | 2) => Self::DeleteFile {
                name: args[0].to_string(),
                parent: optional_path(1),
            },
            ("rename", 2 | 3) => Self::Rename {
                old: args[0].to_string(),
                new: args[1].to_string(),
                parent: optional_path(2),
            },
            ("mvdir", 3) => Self::MoveFolder {
                name: args[0].to_string(),
                source: NsPath::parse(args[1]),
                dest: NsPath::parse(args[2]),
            },
            ("mv", 3) => Self::MoveFile {
                name: args[0].to_string(),
                source: NsPath::parse(args[1]),
                dest: NsPath::parse(args[2]),
            },
            ("finddir", 1) => Self::FindFolder {
                name: args[0].to_string(),
            },
            ("find", 1) => Self::FindFile {
                name: args[0].to_string(),
            },
            ("tree", 0) => Self::Tree,
            ("save", 0 | 1) => Self::Save {
                file: args.first().map(PathBuf::from),
            },
            ("load", 0 | 1) => Self::Load {
                file: args.first().map(PathBuf::from),
            },
            ("help", _) => Self::Help,
            ("exit" | "quit", 0) => Self::Exit,
            (verb, _) => return Err(Self::usage(verb)),
        };
        Ok(Some(command))
    }

    fn usage(verb: &str) -> ShellError {
        let usage = match verb {
            "mkdir" => "mkdir NAME [PATH]",
            "touch" => "touch NAME [PATH]",
            "rmdir" => "rmdir NAME [PATH]",
            "rm" => "rm NAME [PATH]",
            "rename" => "rename OLD NEW [PATH]",
            "mvdir" => "mvdir NAME SRC DEST",
            "mv" => "mv NAME SRC DEST",
            "finddir" => "finddir NAME",
            "find" => "find NAME",
            "tree" => "tree",
            "save" => "save [FILE]",
            "load" => "load [FILE]",
            "exit" | "quit" => "exit",
            _ => return ShellError::UnknownCommand(verb.to_string()),
        };
        ShellError::Usage(usage.to_string())
    }
}

/// Whether the shell should keep reading commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Interactive session state: the namespace plus its configuration.
#[derive(Debug)]
pub struct Shell {
    namespace: Namespace,
    config: ShellConfig,
}

impl Shell {
    /// Start with an empty namespace.
    #[must_use]
    pub fn new(config: ShellConfig) -> Self {
        Self {
            namespace: Namespace::new(config.min_degree),
            config,
        }
    }

    /// Start a session, loading the configured state file when autoload is on.
    ///
    /// A missing state file is not an error.
    pub fn open(config: ShellConfig) -> Result<Self, ShellError> {
        let mut shell = Self::new(config);
        if shell.config.autoload {
            let path = shell.config.state_file.clone();
            shell.load_from(&path)?;
        }
        Ok(shell)
    }

    #[must_use]
    pub const fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Run one command, writing any output to `out`.
    ///
    /// # Errors
    ///
    /// Returns the namespace or state-file error that made the command fail.
    /// A `ShellError::Namespace` error leaves the namespace unchanged. An
    /// `Io` error means writing to `out` failed, possibly after the command
    /// already took effect.
    pub fn execute<W: Write>(&mut self, command: Command, out: &mut W) -> Result<Flow, ShellError> {
        match command {
            Command::CreateFolder { name, parent } => {
                self.namespace.create_folder(&name, &parent)?;
                writeln!(out, "Folder '{name}' created in {parent}")?;
            }
            Command::CreateFile { name, parent } => {
                self.namespace.create_file(&name, &parent)?;
                writeln!(out, "File '{name}' created in {parent}")?;
            }
            Command::DeleteFolder { name, parent } => {
                let descendants = self.namespace.delete_folder(&name, &parent)?;
                writeln!(out, "Folder '{name}' deleted from {parent} along with {descendants} entries")?;
            }
            Command::DeleteFile { name, parent } => {
                self.namespace.delete_file(&name, &parent)?;
                writeln!(out, "File '{name}' deleted from {parent}")?;
            }
            Command::Rename { old, new, parent } => {
                self.namespace.rename(&old, &new, &parent)?;
                writeln!(out, "'{old}' renamed to '{new}' in {parent}")?;
            }
            Command::MoveFolder { name, source, dest } => {
                self.namespace.move_folder(&name, &source, &dest)?;
                writeln!(out, "Folder '{name}' moved from {source} to {dest}")?;
            }
            Command::MoveFile { name, source, dest } => {
                self.namespace.move_file(&name, &source, &dest)?;
                writeln!(out, "File '{name}' moved from {source} to {dest}")?;
            }
            Command::FindFolder { name } => self.find(&name, EntryKind::Folder, out)?,
            Command::FindFile { name } => self.find(&name, EntryKind::File, out)?,
            Command::Tree => write!(out, "{}", self.namespace.display())?,
            Command::Save { file } => {
                let path = file.unwrap_or_else(|| self.config.state_file.clone());
                let written = state_file::save(&self.namespace, &path)?;
                writeln!(out, "Saved {written} entries to '{}'", path.display())?;
            }
            Command::Load { file } => {
                let path = file.unwrap_or_else(|| self.config.state_file.clone());
                if self.load_from(&path)? {
                    writeln!(
                        out,
                        "Loaded {} entries from '{}'",
                        self.namespace.entry_count(),
                        path.display()
                    )?;
                } else {
                    writeln!(out, "No saved state at '{}'", path.display())?;
                }
            }
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Exit => {
                if self.config.autosave {
                    let path = self.config.state_file.clone();
                    let written = state_file::save(&self.namespace, &path)?;
                    writeln!(out, "Saved {written} entries to '{}'", path.display())?;
                }
                return Ok(Flow::Exit);
            }
        }
        Ok(Flow::Continue)
    }

    fn find<W: Write>(&self, name: &str, kind: EntryKind, out: &mut W) -> Result<(), ShellError> {
        let mut found = 0;
        for hit in self.namespace.search(name, kind) {
            writeln!(out, "{}", hit.path())?;
            found += 1;
        }
        if found == 0 {
            writeln!(out, "No {kind} named '{name}' found")?;
        }
        Ok(())
    }

    /// Replace the namespace with the contents of `path`.
    ///
    /// Returns `false`, leaving the namespace as it was, if the file does not
    /// exist.
    fn load_from(&mut self, path: &Path) -> Result<bool, ShellError> {
        match state_file::load(path, self.config.min_degree)? {
            Some((namespace, _)) => {
                self.namespace = namespace;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Errors reported by the shell.
#[derive(Debug)]
pub enum ShellError {
    /// Wrong number of arguments; holds the expected form.
    Usage(String),
    /// The verb is not a known command.
    UnknownCommand(String),
    /// A namespace operation failed.
    Namespace(NamespaceError),
    /// Saving or loading the state file failed.
    StateFile(StateFileError),
    /// Writing command output failed.
    Io(std::io::Error),
}

impl std::fmt::Display for ShellError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Usage(usage) => write!(f, "usage: {usage}"),
            Self::UnknownCommand(verb) => {
                write!(f, "unknown command '{verb}' (type 'help' for a list)")
            }
            Self::Namespace(e) => write!(f, "{e}"),
            Self::StateFile(e) => write!(f, "{e}"),
            Self::Io(e) => write!(f, "output error: {e}"),
        }
    }
}

impl std::error::Error for ShellError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Namespace(e) => Some(e),
            Self::StateFile(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::Usage(_) | Self::UnknownCommand(_) => None,
        }
    }
}

impl From<NamespaceError> for ShellError {
    fn from(e: NamespaceError) -> Self {
        Self::Namespace(e)
    }
}

impl From<StateFileError> for ShellError {
    fn from(e: StateFileError) -> Self {
        Self::StateFile(e)
    }
}

impl From<std::io::Error> for ShellError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
