mod error;
mod extract;
pub mod handlers;
mod routes;
mod types;

pub use error::AppError;
pub use extract::{client_ip, CurrentUser};
pub use routes::{api_routes, AppState};
pub use types::{ErrorResponse, MessageResponse, SessionUserResponse};
