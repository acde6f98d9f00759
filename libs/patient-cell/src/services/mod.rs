pub mod directory;
pub mod supabase;

pub use directory::{InMemoryPatientDirectory, PatientDirectory};
pub use supabase::SupabasePatientDirectory;
