// ドメインモデル（エンティティと値オブジェクト）

mod availability;
mod booking;
mod catalog;
mod discount;
mod pricing;
mod value_objects;

pub use value_objects::{
    AccommodationTypeId, BookingId, CampsiteId, GuestId, SpotId,
    BookingStatus,
    Currency, Money,
    DateRange,
};

pub use availability::AvailabilityRecord;
pub use booking::Booking;
pub use catalog::{AccommodationSpot, AccommodationType, SpotStatus};
pub use discount::{DiscountCode, DiscountKind};
pub use pricing::SeasonalPricingRule;
