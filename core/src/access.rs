// booknest/core/src/access.rs

//! Role-gated access.
//!
//! Every service operation receives an explicit [`Caller`]. Role checks go
//! through [`authorize`] with a [`Capability`]; ownership checks (a seller's
//! own book, a shopper's own order) are made by the service that loads the
//! record.

use serde::{Deserialize, Serialize};
use tracing::{event, Level};
use uuid::Uuid;

use crate::error::{BooknestError, Result};
use crate::models::Role;

/// The authenticated identity behind a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
  pub user_id: Uuid,
  pub role: Role,
}

impl Caller {
  pub fn new(user_id: Uuid, role: Role) -> Self {
    Self { user_id, role }
  }

  pub fn is_admin(&self) -> bool {
    self.role == Role::Admin
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
  /// Create books, edit or delete one's own books, list one's own books.
  ManageOwnBooks,
  ManageCart,
  PlaceOrder,
  /// Read and edit one's own profile and wishlist, list one's own orders.
  ManageOwnAccount,
  ListOrders,
  UpdateOrderStatus,
  ManageUsers,
  ViewAdminStats,
  ViewSellerStats,
}

impl Capability {
  pub fn allowed_roles(&self) -> &'static [Role] {
    match self {
      Capability::ManageOwnBooks | Capability::ViewSellerStats => &[Role::Seller],
      Capability::ManageCart | Capability::PlaceOrder => &[Role::Shopper],
      Capability::ManageOwnAccount => &[Role::Shopper, Role::Seller, Role::Admin],
      Capability::ListOrders | Capability::UpdateOrderStatus => &[Role::Admin, Role::Seller],
      Capability::ManageUsers | Capability::ViewAdminStats => &[Role::Admin],
    }
  }
}

/// Fails with `Unauthorized` unless the caller's role grants `capability`.
pub fn authorize(caller: &Caller, capability: Capability) -> Result<()> {
  require_role(caller, capability.allowed_roles()).map_err(|err| {
    event!(
      Level::WARN,
      user_id = %caller.user_id,
      role = %caller.role,
      ?capability,
      "Capability denied."
    );
    err
  })
}

pub fn require_role(caller: &Caller, roles: &[Role]) -> Result<()> {
  if roles.contains(&caller.role) {
    return Ok(());
  }
  Err(BooknestError::Unauthorized(format!(
    "User role '{}' is not authorized to access this route.",
    caller.role
  )))
}
