pub mod helpers;
pub mod session;
pub mod summary;
