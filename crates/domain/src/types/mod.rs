//! Domain type definitions grouped by concern.

pub mod events;
pub mod meeting;
pub mod notification;
pub mod user;

pub use events::*;
pub use meeting::*;
pub use notification::*;
pub use user::*;
