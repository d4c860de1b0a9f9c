use crate::supervisor::traits::ExecutionResult;

/// What a scenario demands of one engine run: the exit status plus literal
/// checks against the combined captured output.
#[derive(Debug, Clone, Default)]
pub struct Expectation {
    pub exit_status: i32,
    /// Substrings that must appear somewhere in the output.
    pub require: Vec<String>,
    /// Substrings that must not appear anywhere in the output.
    pub forbid: Vec<String>,
    /// Marker pairs that must appear together on a single output line.
    pub same_line: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckFailure {
    #[error("expected exit status {expected}, got {actual} (timed out: {timed_out})")]
    ExitStatus {
        expected: i32,
        actual: i32,
        timed_out: bool,
    },
    #[error("required text not found in output: {needle:?}")]
    MissingText { needle: String },
    #[error("forbidden text found in output: {needle:?}")]
    ForbiddenText { needle: String },
    #[error("no output line contains both {first:?} and {second:?}")]
    NoLineWith { first: String, second: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail(Vec<CheckFailure>),
}

impl Verdict {
    pub fn passed(&self) -> bool {
        matches!(self, Verdict::Pass)
    }
}

/// Evaluates every check and records every violation, not just the first.
pub fn verify(result: &ExecutionResult, expectation: &Expectation) -> Verdict {
    let mut failures = Vec::new();

    if result.exit_status != expectation.exit_status {
        failures.push(CheckFailure::ExitStatus {
            expected: expectation.exit_status,
            actual: result.exit_status,
            timed_out: result.timed_out,
        });
    }

    let text = result.text();
    for needle in &expectation.require {
        if !text.contains(needle.as_str()) {
            failures.push(CheckFailure::MissingText {
                needle: needle.clone(),
            });
        }
    }
    for needle in &expectation.forbid {
        if text.contains(needle.as_str()) {
            failures.push(CheckFailure::ForbiddenText {
                needle: needle.clone(),
            });
        }
    }
    for (first, second) in &expectation.same_line {
        let found = text
            .lines()
            .any(|line| line.contains(first.as_str()) && line.contains(second.as_str()));
        if !found {
            failures.push(CheckFailure::NoLineWith {
                first: first.clone(),
                second: second.clone(),
            });
        }
    }

    if failures.is_empty() {
        Verdict::Pass
    } else {
        Verdict::Fail(failures)
    }
}
