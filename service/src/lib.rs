pub mod access;
pub mod cheffing;
mod error;
pub mod integrations;
mod reservation;
mod task;

pub use error::ServiceError;
pub use reservation::*;
pub use task::*;

pub use sea_orm;
