/// Notification broadcast after every fetch attempt settles.
///
/// The event deliberately carries no payload: no URI, no success flag, no
/// bytes. Subscribers are expected to re-probe the resources they care
/// about (`exists`/`read`) when one arrives, which also means an event
/// fired for a failed fetch looks identical to one fired for a success.
/// Embedders that need per-resource signalling should key their own state
/// off the re-probe, not off the event itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CacheChanged;
