// booknest/core/src/services/cart.rs

use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::access::{authorize, Caller, Capability};
use crate::error::{BooknestError, Result};
use crate::models::Cart;
use crate::store::Stores;

/// Per-user carts. Stock is not checked here; checkout validates it.
#[derive(Clone)]
pub struct CartService {
  stores: Stores,
}

fn quantity_from(quantity: i64) -> Result<u32> {
  u32::try_from(quantity).map_err(|_| BooknestError::Validation(format!("Invalid quantity {}.", quantity)))
}

impl CartService {
  pub fn new(stores: Stores) -> Self {
    Self { stores }
  }

  // Returns the stored cart, creating an empty one on first access.
  async fn load(&self, user_id: Uuid) -> Result<Cart> {
    if let Some(cart) = self.stores.carts.get_cart(user_id).await? {
      return Ok(cart);
    }
    let cart = Cart::empty(user_id);
    self.stores.carts.save_cart(&cart).await?;
    debug!(%user_id, "Cart created.");
    Ok(cart)
  }

  #[instrument(name = "cart::get", skip(self), fields(user_id = %caller.user_id), err(Display))]
  pub async fn get(&self, caller: &Caller) -> Result<Cart> {
    authorize(caller, Capability::ManageCart)?;
    self.load(caller.user_id).await
  }

  #[instrument(name = "cart::add_item", skip(self), fields(user_id = %caller.user_id), err(Display))]
  pub async fn add_item(&self, caller: &Caller, book_id: Uuid, quantity: i64) -> Result<Cart> {
    authorize(caller, Capability::ManageCart)?;
    if quantity < 1 {
      return Err(BooknestError::Validation("Quantity must be at least 1.".to_string()));
    }
    let quantity = quantity_from(quantity)?;
    if self.stores.catalog.get_book(book_id).await?.is_none() {
      return Err(BooknestError::not_found("Book", book_id));
    }

    let mut cart = self.load(caller.user_id).await?;
    cart.add(book_id, quantity);
    self.stores.carts.save_cart(&cart).await?;
    info!(%book_id, quantity, "Item added to cart.");
    Ok(cart)
  }

  /// A quantity of zero or less removes the line.
  #[instrument(name = "cart::set_item_quantity", skip(self), fields(user_id = %caller.user_id), err(Display))]
  pub async fn set_item_quantity(&self, caller: &Caller, book_id: Uuid, quantity: i64) -> Result<Cart> {
    authorize(caller, Capability::ManageCart)?;
    let quantity = if quantity <= 0 { 0 } else { quantity_from(quantity)? };

    let mut cart = self.load(caller.user_id).await?;
    if !cart.set_quantity(book_id, quantity) {
      return Err(BooknestError::NotFound {
        entity: "Cart item",
        id: book_id.to_string(),
      });
    }
    self.stores.carts.save_cart(&cart).await?;
    info!(%book_id, quantity, "Cart line updated.");
    Ok(cart)
  }

  #[instrument(name = "cart::remove_item", skip(self), fields(user_id = %caller.user_id), err(Display))]
  pub async fn remove_item(&self, caller: &Caller, book_id: Uuid) -> Result<Cart> {
    authorize(caller, Capability::ManageCart)?;
    let mut cart = self.load(caller.user_id).await?;
    if cart.remove(book_id) {
      self.stores.carts.save_cart(&cart).await?;
      info!(%book_id, "Item removed from cart.");
    }
    Ok(cart)
  }

  #[instrument(name = "cart::clear", skip(self), fields(user_id = %caller.user_id), err(Display))]
  pub async fn clear(&self, caller: &Caller) -> Result<Cart> {
    authorize(caller, Capability::ManageCart)?;
    let mut cart = self.load(caller.user_id).await?;
    if !cart.is_empty() {
      cart.clear();
      self.stores.carts.save_cart(&cart).await?;
      info!("Cart cleared.");
    }
    Ok(cart)
  }
}
