mod email;
mod money;
mod text;

pub use email::validate_email;
pub use money::{validate_amount_cents, validate_currency};
pub use text::{validate_name, validate_subject};
