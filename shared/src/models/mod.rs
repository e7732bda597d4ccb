//! Domain models
//!
//! Entities and request/response payloads shared by the server and tests.

pub mod admin;
pub mod customer;
pub mod menu_item;

pub use admin::{Admin, AdminInfo, ChangePasswordRequest, LoginRequest, LoginResponse, ProfileUpdate};
pub use customer::{
    ClaimRequest, Customer, CustomerDetail, CustomerLookup, DrinkCategory, Order, PurchaseRequest,
    RewardState, RewardStatus,
};
pub use menu_item::{MenuItem, MenuItemCreate, MenuItemUpdate};
