/// Generic result type for component key handling.
///
/// Components get first look at key events and use this enum to tell their
/// parent view what happened, so every component reports results the same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResult<T> {
  /// Key was consumed, no event for parent to handle
  Handled,
  /// Key was consumed, here's an event for parent to process
  Event(T),
  /// Key was not consumed, parent should try next handler
  NotHandled,
}
