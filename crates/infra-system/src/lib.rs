// hooktail Infrastructure - System Adapters
// Implements: CommandRunner

pub mod line_framer;
pub mod shell_runner;

pub use line_framer::LineFramer;
pub use shell_runner::ShellCommandRunner;
