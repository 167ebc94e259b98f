#[cfg(test)] use mockall::automock;

/// The underlying unreliable datagram transport an [`crate::end_point::EndPoint`] is wired to
///  at construction time. Implementations must preserve payload integrity per datagram but are
///  free to drop or delay datagrams at their discretion.
///
/// The abstraction exists to decouple the protocol from I/O and to facilitate mocking the
///  transport away for testing.
#[cfg_attr(test, automock)]
pub trait Channel {
    /// Best-effort, fire-and-forget enqueue of exactly `data` for delivery.
    fn send(&mut self, data: &[u8]);

    /// Non-blocking poll: copies the next available datagram into `buf` and returns its
    ///  length, or 0 when nothing usable is available.
    fn receive(&mut self, buf: &mut [u8]) -> usize;
}
