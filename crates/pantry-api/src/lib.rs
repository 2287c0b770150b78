//! Resource endpoints of the Pantry API: dishes, ingredients, grocery
//! lists, the weekly cart and user administration.
//!
//! Like [`auth_service`], every call goes through a shared
//! [`session_gateway::Gateway`], so an expired session is renewed once and
//! the call replayed without the caller noticing.

mod call;
mod cart;
mod dishes;
mod error;
mod grocery_lists;
mod ingredients;
mod users;

pub use call::PageRequest;
pub use cart::{CartEntry, CartService};
pub use dishes::{
    Dish, DishFilter, DishIngredient, DishIngredientInput, DishInput, DishPage, DishService,
};
pub use error::{ApiError, ApiResult};
pub use grocery_lists::{GroceryList, GroceryListItem, GroceryListItems, GroceryListService};
pub use ingredients::{
    Ingredient, IngredientFilter, IngredientInput, IngredientPage, IngredientService,
};
pub use users::{DataExport, ProfileUpdate, UserFilter, UserPage, UserService};

use session_gateway::Gateway;

/// All resource services over one gateway, so they share its cookie store
/// and renewal coordinator.
#[derive(Clone)]
pub struct PantryApi {
    pub dishes: DishService,
    pub ingredients: IngredientService,
    pub grocery_lists: GroceryListService,
    pub cart: CartService,
    pub users: UserService,
}

impl PantryApi {
    pub fn new(gateway: Gateway) -> Self {
        Self {
            dishes: DishService::new(gateway.clone()),
            ingredients: IngredientService::new(gateway.clone()),
            grocery_lists: GroceryListService::new(gateway.clone()),
            cart: CartService::new(gateway.clone()),
            users: UserService::new(gateway),
        }
    }
}
