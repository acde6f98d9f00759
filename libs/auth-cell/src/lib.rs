pub mod models;
pub mod service;
pub mod session;
pub mod users;

pub use models::{AuthError, AuthResult, RegisterRequest, SessionError, SessionToken, UserAccount};
pub use service::AuthService;
pub use session::SessionStore;
pub use users::{InMemoryUserDirectory, UserDirectory};
