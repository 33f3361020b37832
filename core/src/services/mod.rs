// booknest/core/src/services/mod.rs

pub mod accounts;
pub mod cart;
pub mod catalog;
pub mod orders;
pub mod stats;

pub use accounts::{AccountService, LoginRequest, RegisterRequest, Session};
pub use cart::CartService;
pub use catalog::CatalogService;
pub use orders::OrderService;
pub use stats::{AdminStats, SellerStats, StatsService};
