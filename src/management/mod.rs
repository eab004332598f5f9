pub mod credentials;
mod session;
mod token;

pub use credentials::Credentials;
pub use session::{LoginOutcome, SessionManager};
pub use token::TokenStore;
