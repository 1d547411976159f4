use chrono::{DateTime, Utc};

/// A message describing something that already happened.
///
/// Values are facts: never mutated after publishing. `event_type` and
/// `version` together identify the payload shape a consumer should expect.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Dotted name, `<area>.<what_happened>`.
    fn event_type(&self) -> &'static str;

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc>;
}
