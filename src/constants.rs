use tokio::time::Duration;

pub const RECORD_TX_ERR: &str = "Record channel closed before the suite finished";
pub const RUN_TX_ERR: &str = "Run channel closed before dispatch finished";

/// Exit status reported for runs that hit the wall-clock deadline. Never a
/// value the OS would report for a normal exit or signal death.
pub const TIMED_OUT_STATUS: i32 = -1;

pub const DEFAULT_ENGINE_PREFIX: &str = "graybox";
pub const DEFAULT_LOG_DIR: &str = "graybox-logs";

/// How long a group gets between SIGTERM and SIGKILL.
pub const DEFAULT_GRACE: Duration = Duration::from_secs(2);

/// How long to wait for a SIGKILLed group to actually disappear before the
/// run is declared unrecoverable.
pub const DEFAULT_CLEANUP_WINDOW: Duration = Duration::from_secs(5);

/// How long to wait for the capture task after the group is confirmed dead.
/// EOF arrives immediately unless something outside the group inherited the
/// pipe, so this only bounds the pathological case.
pub const DEFAULT_RESIDUAL_WINDOW: Duration = Duration::from_millis(500);

pub const DEATH_POLL_INTERVAL: Duration = Duration::from_millis(50);
