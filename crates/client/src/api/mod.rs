//! Typed service facades over the decorated client, one per backend
//! resource. Each is a thin endpoint map returning wire DTOs; catalog
//! reads (products, categories) carry a 5-minute moka cache invalidated
//! by the matching mutations.

mod account;
mod addresses;
mod cart;
mod categories;
mod coupons;
mod orders;
mod permissions;
mod products;
mod reviews;
mod settings;
mod users;
mod wishlists;

pub use account::AccountApi;
pub use addresses::AddressesApi;
pub use cart::CartApi;
pub use categories::CategoriesApi;
pub use coupons::CouponsApi;
pub use orders::OrdersApi;
pub use permissions::PermissionsApi;
pub use products::{ProductFilter, ProductSort, ProductsApi};
pub use reviews::ReviewsApi;
pub use settings::SettingsApi;
pub use users::UsersApi;
pub use wishlists::WishlistsApi;
