pub mod clock;
pub mod ids;
pub mod telemetry;
pub mod test_utils;

pub use clock::{Clock, ManualClock, SystemClock};
pub use ids::{generate_unique_id, IdGenerator, IdSpaceExhausted, RandomIdGenerator, SequenceIdGenerator, MAX_ID_ATTEMPTS};
