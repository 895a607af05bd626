pub use super::allowed_user::Entity as AllowedUser;
pub use super::dish::Entity as Dish;
pub use super::dish_item::Entity as DishItem;
pub use super::dish_sale::Entity as DishSale;
pub use super::ingredient::Entity as Ingredient;
pub use super::reservation::Entity as Reservation;
pub use super::session::Entity as Session;
pub use super::subrecipe::Entity as Subrecipe;
pub use super::subrecipe_item::Entity as SubrecipeItem;
pub use super::task::Entity as Task;
