//! Calendar provider integration.

pub mod source;
pub mod tokens;

pub use source::GoogleCalendarSource;
pub use tokens::AccessTokenSource;
