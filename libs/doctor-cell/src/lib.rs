pub mod models;
pub mod services;

pub use models::{Doctor, Specialty};
pub use services::{DoctorDirectory, InMemoryDoctorDirectory, SupabaseDoctorDirectory};
