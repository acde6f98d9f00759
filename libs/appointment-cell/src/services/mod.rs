pub mod availability;
pub mod booking;
pub mod conflict;
pub mod guard;
pub mod lifecycle;
pub mod report;

pub use availability::AvailabilityFinder;
pub use booking::BookingService;
pub use conflict::{intervals_overlap, ConflictValidator};
pub use guard::BookingGuard;
pub use lifecycle::AppointmentLifecycle;
pub use report::ReportService;
