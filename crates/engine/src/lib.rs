//! Core of the simulator booking service.
//!
//! The [`Engine`] owns every business rule: slot allocation and the booking
//! quota, cancellation with its guest-fee cascade, the append-only ledger and
//! the balances derived from it, announcements, profiles and the public
//! inquiry forms. Callers resolve a [`Principal`] once per request and pass it
//! to each operation.

pub use access::{Capabilities, Principal, Role};
pub use announcements::Announcement;
pub use bookings::{BOOKING_LENGTH, Booking, BookingFilter, CancelledBooking, Simulator, Slot};
pub use contact_messages::ContactMessage;
pub use error::EngineError;
pub use inquiries::{MembershipInquiry, NewInquiry};
pub use ledger::{Balance, EntryKind, LedgerEntry};
pub use money::MoneyCents;
pub use notify::{BookingConfirmation, LogNotifier, MembershipInquiryNotice, Notifier, NotifyError};
pub use ops::{DEFAULT_GUEST_FEE, Engine, EngineBuilder};
pub use profiles::{NewProfile, Profile, ProfileUpdate};

mod access;
mod access_tokens;
mod announcements;
mod bookings;
mod contact_messages;
mod error;
mod inquiries;
mod ledger;
mod money;
mod notify;
mod ops;
mod profiles;

type ResultEngine<T> = Result<T, EngineError>;
