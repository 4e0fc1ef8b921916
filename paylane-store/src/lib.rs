pub mod app_config;
pub mod jobs;
pub mod memory;
pub mod mock_api;

pub use app_config::{ApiConfig, Config};
pub use jobs::{RecordingScheduler, ScheduledJob};
pub use memory::{MemoryCustomerStore, MemoryOrderStore, MemoryTokenStore};
pub use mock_api::MockPaymentsApi;
