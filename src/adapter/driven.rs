// 駆動される側アダプター（リポジトリ実装など）

mod availability_repository;
mod booking_repository;
mod catalog_repository;
mod console_logger;
mod discount_code_repository;
mod event_bus;
mod pricing_rule_repository;
mod system_clock;

pub use availability_repository::MySqlAvailabilityRepository;
pub use booking_repository::MySqlBookingRepository;
pub use catalog_repository::{MySqlAccommodationSpotRepository, MySqlAccommodationTypeRepository};
pub use console_logger::{ConsoleLogger, LogEntry};
pub use discount_code_repository::MySqlDiscountCodeRepository;
pub use event_bus::{EventBusConfig, InMemoryEventBus};
pub use pricing_rule_repository::MySqlPricingRuleRepository;
pub use system_clock::SystemClock;
