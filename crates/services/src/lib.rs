pub mod calendar;
pub mod catalog;
pub mod dao;
pub mod lifecycle;
pub mod seed;
pub mod views;

pub use catalog::CatalogService;
pub use dao::*;
pub use lifecycle::{ClockState, SessionStatus, derive_status};
