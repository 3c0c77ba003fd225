pub use super::items::Entity as Items;
pub use super::price_history::Entity as PriceHistory;
pub use super::purchases::Entity as Purchases;
pub use super::stores::Entity as Stores;
