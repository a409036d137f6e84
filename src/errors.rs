use std::io;
use thiserror::Error;

/// Script loading failures. Parse failures carry the 1-based line number
/// and the offending line for the stderr diagnostic.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("cannot read script: {0}")]
    Io(#[from] io::Error),

    #[error("parse failure at line {line_no}: `{line}`")]
    Parse { line_no: usize, line: String },
}

/// Engine-side harness failures. The engine never fails a call over order
/// semantics (those are events); only the event log sink can error.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("event log i/o: {0}")]
    Log(#[from] io::Error),
}

/// Top-level CLI failures, each mapped to its contractual exit code.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),

    #[error("script load failure: {0}")]
    ScriptLoad(#[from] ScriptError),

    #[error("event log failure: {0}")]
    Log(#[from] EngineError),

    #[error("cannot read events file: {0}")]
    EventsRead(io::Error),

    #[error("events file line {line_no} is not a valid event: `{line}`")]
    EventsParse { line_no: usize, line: String },

    #[error("replay line count mismatch: expected {expected} lines, got {actual}")]
    ReplayLineCount { expected: usize, actual: usize },

    #[error("replay line content mismatch at line {line_no}")]
    ReplayLineContent { line_no: usize },

    #[error("bench argument error: {0}")]
    BenchArgs(String),

    #[error("i/o failure: {0}")]
    Io(io::Error),
}

impl CliError {
    /// Process exit code for this failure. The mapping is part of the CLI
    /// contract.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Usage(_) | CliError::Io(_) => 1,
            CliError::ScriptLoad(_) => 10,
            CliError::Log(_) => 11,
            CliError::EventsRead(_) | CliError::EventsParse { .. } => 12,
            CliError::ReplayLineCount { .. } => 20,
            CliError::ReplayLineContent { .. } => 21,
            CliError::BenchArgs(_) => 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_match_the_contract() {
        assert_eq!(CliError::Usage("x".into()).exit_code(), 1);
        assert_eq!(
            CliError::ScriptLoad(ScriptError::Parse {
                line_no: 1,
                line: "x".into()
            })
            .exit_code(),
            10
        );
        assert_eq!(
            CliError::Log(EngineError::Log(io::Error::other("x"))).exit_code(),
            11
        );
        assert_eq!(CliError::EventsRead(io::Error::other("x")).exit_code(), 12);
        assert_eq!(
            CliError::ReplayLineCount {
                expected: 1,
                actual: 2
            }
            .exit_code(),
            20
        );
        assert_eq!(CliError::ReplayLineContent { line_no: 3 }.exit_code(), 21);
        assert_eq!(CliError::BenchArgs("x".into()).exit_code(), 30);
    }
}
