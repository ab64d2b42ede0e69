pub mod booking;
pub mod office;
pub mod slot;

pub use booking::{Booking, BookingRequest};
pub use office::{Office, OfficeProfile};
pub use slot::SlotTime;
