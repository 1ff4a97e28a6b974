//! Shared sequential command source
//!
//! The stream is read by all workers under the dispatch mutex, one command
//! at a time. End-of-stream is terminal: every subsequent read also yields
//! `None`.

use crate::command::Command;

/// A sequential source of commands shared by the worker pool.
pub trait CommandStream: Send {
    /// The next command, or `None` at end-of-stream.
    fn next_command(&mut self) -> Option<Command>;
}

/// A stream over a pre-built command list. Mostly used in tests and by
/// embedders that parse a whole job file up front.
pub struct VecStream {
    commands: std::vec::IntoIter<Command>,
}

impl VecStream {
    /// Wrap a command list.
    pub fn new(commands: Vec<Command>) -> Self {
        Self {
            commands: commands.into_iter(),
        }
    }
}

impl CommandStream for VecStream {
    fn next_command(&mut self) -> Option<Command> {
        self.commands.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec_stream_is_sequential_and_terminal() {
        let mut stream = VecStream::new(vec![Command::List, Command::Barrier]);
        assert_eq!(stream.next_command(), Some(Command::List));
        assert_eq!(stream.next_command(), Some(Command::Barrier));
        assert_eq!(stream.next_command(), None);
        assert_eq!(stream.next_command(), None);
    }
}
