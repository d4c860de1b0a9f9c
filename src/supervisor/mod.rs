/// Supervisor module owns everything about running the engine as a bounded
/// external process: spawning into a dedicated process group with deadline
/// enforcement and TERM-then-KILL escalation, plus complete capture of the
/// combined output.
pub mod basic;
pub mod capture;
pub mod group;
pub mod stubs;
pub mod traits;
