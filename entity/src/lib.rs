//! SeaORM entities of the venue back-office.
//!
//! Tables prefixed `app_` belong to access control, `cheffing_` to recipe
//! costing. Invariants that the database cannot express portably (ranges,
//! "exactly one of" item references) are validated by the service crate.

pub mod prelude;

pub mod allowed_user;
pub mod dish;
pub mod dish_item;
pub mod dish_sale;
pub mod ingredient;
pub mod reservation;
pub mod sea_orm_active_enums;
pub mod session;
pub mod subrecipe;
pub mod subrecipe_item;
pub mod task;

pub use sea_orm;
