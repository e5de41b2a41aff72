//! HTTP request handlers, grouped by resource

pub mod categories;
pub mod companies;
pub mod contracts;
pub mod permissions;
pub mod status;
pub mod types;
pub mod users;

pub use categories::*;
pub use companies::*;
pub use contracts::*;
pub use permissions::*;
pub use status::*;
pub use users::*;

pub use types::*;
