// Domain models: sensor samples and their per-bucket reductions

mod aggregate;
mod reading;

pub use aggregate::{AggregateRecord, ChannelStats};
pub use reading::Reading;
