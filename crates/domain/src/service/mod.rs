//! Application services orchestrating the cart engine against repositories.

mod cart;
mod recipe;

pub use cart::CartService;
pub use recipe::RecipeService;
