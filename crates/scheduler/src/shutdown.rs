//! Shutdown discipline (spec §4.5).

/// Which shutdown discipline a caller requested.
///
/// `Running` has no corresponding variant: absence of a recorded mode
/// (`Option<ShutdownMode> == None`) means the scheduler has not yet
/// been asked to shut down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownMode {
    /// Stop accepting; drain every already-submitted, non-cancelled
    /// job; then stop workers.
    Graceful,
    /// Stop accepting; drop every undispatched job; then stop workers.
    /// Jobs already in flight still run to completion.
    Immediate,
}
