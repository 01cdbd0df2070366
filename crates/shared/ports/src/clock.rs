use termlink_core::Timestamp;

/// Port for time abstraction
///
/// Outbound envelopes and heartbeats are stamped from this clock so
/// tests can pin time while production reads the system clock.
pub trait Clock: Send + Sync {
    /// Current time, epoch seconds
    fn now(&self) -> Timestamp;
}
