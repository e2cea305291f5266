pub mod claim;
pub mod entity;
pub mod food_listing;
pub mod provider;
pub mod receiver;
pub mod report;

pub use claim::{Claim, ClaimStatus};
pub use entity::EntityKind;
pub use food_listing::FoodListing;
pub use provider::Provider;
pub use receiver::Receiver;
