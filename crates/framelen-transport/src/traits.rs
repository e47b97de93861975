/// Consumer-facing half of a handshake: the producer's `valid` + payload.
///
/// `peek` observes the offered item without accepting it; `take` is the
/// transfer (consumer `ready` while the producer is `valid`).
pub trait Upstream<T> {
    fn peek(&self) -> Option<&T>;
    fn take(&mut self) -> Option<T>;
}

/// Producer-facing half of a handshake: the consumer's `ready`.
///
/// A producer must only call `accept` when `is_ready_for` returned true for
/// the same item. Implementations return an error otherwise and leave their
/// state untouched.
pub trait Downstream<T> {
    type Error;

    fn is_ready_for(&self, item: &T) -> bool;
    fn accept(&mut self, item: T) -> Result<(), Self::Error>;
}
