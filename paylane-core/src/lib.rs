pub mod gateway;
pub mod intent;
pub mod money;
pub mod order;
pub mod repository;

pub use gateway::{ApiError, Level3Data, Level3LineItem, PaymentsApi};
pub use intent::{IntentStatus, PaymentIntent, Refund, RefundStatus, SetupIntent};
pub use order::{LineItem, Order, OrderId, OrderStatus, ShippingInfo};
pub use repository::{CustomerStore, JobScheduler, OrderStore, StoreError, TokenStore};
