// booknest/core/src/checkout/context.rs

use uuid::Uuid;

use crate::access::Caller;
use crate::models::{LineItem, Order, PlaceOrderRequest, ShippingAddress};
use crate::store::Stores;

/// State shared by the steps of one order placement.
pub struct PlaceOrderCtxData {
  pub stores: Stores,
  pub caller: Caller,
  pub request: PlaceOrderRequest,

  // Set by `validate_request`.
  pub shipping_address: Option<ShippingAddress>,
  pub request_id: Option<String>,
  pub quantities: Vec<(Uuid, u32)>,

  // Set by `price_lines`.
  pub lines: Vec<LineItem>,
  pub total_amount: i64,

  /// Stock taken so far. Compensation gives back exactly this.
  pub reserved: Vec<(Uuid, u32)>,

  pub order: Option<Order>,
  /// True when an earlier order with the same request id was returned.
  pub replayed: bool,
}

impl PlaceOrderCtxData {
  pub fn new(stores: Stores, caller: Caller, request: PlaceOrderRequest) -> Self {
    Self {
      stores,
      caller,
      request,
      shipping_address: None,
      request_id: None,
      quantities: Vec::new(),
      lines: Vec::new(),
      total_amount: 0,
      reserved: Vec::new(),
      order: None,
      replayed: false,
    }
  }
}
