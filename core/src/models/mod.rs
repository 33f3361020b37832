// booknest/core/src/models/mod.rs

//! Domain records persisted by the stores.

pub mod book;
pub mod cart;
pub mod order;
pub mod user;

pub use book::{Book, BookCreate, BookUpdate, Genre, PLACEHOLDER_COVER_URL};
pub use cart::{Cart, CartLine};
pub use order::{LineItem, Order, OrderLineRequest, OrderStatus, PlaceOrderRequest, ShippingAddress};
pub use user::{ProfileUpdate, Role, User};

use uuid::Uuid;

pub type BookId = Uuid;
pub type UserId = Uuid;
pub type OrderId = Uuid;
