pub mod dto;
pub mod model;
pub mod money;
mod pricing;
pub mod validation;

pub use dto::{CustomerInfo, OrderSelection};
pub use model::{BoxOrder, Order, SaladOrder};
pub use validation::ValidationError;
