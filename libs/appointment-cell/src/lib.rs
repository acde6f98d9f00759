pub mod models;
pub mod services;
pub mod store;

pub use models::{
    Appointment, AppointmentError, AppointmentSearchQuery, AppointmentSortField,
    AppointmentStatus, BookAppointmentRequest, BookingConfirmation, CreateAppointmentRequest,
    ReportRequest, ReportSummary,
};
pub use services::{
    AppointmentLifecycle, AvailabilityFinder, BookingGuard, BookingService, ConflictValidator,
    ReportService,
};
pub use store::{AppointmentStore, InMemoryAppointmentStore, SupabaseAppointmentStore};
