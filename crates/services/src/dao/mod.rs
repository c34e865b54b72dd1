pub mod base;
pub mod event;
pub mod feedback;
pub mod question;
pub mod session;

pub use base::{BaseDao, DaoError, DaoResult};
