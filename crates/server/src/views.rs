//! Conversions between engine values and wire bodies.

use api_types::{
    announcement::AnnouncementView,
    booking::{self as wire_booking, BookingView},
    contact::ContactView,
    inquiry::InquiryView,
    ledger::{self as wire_ledger, BalanceView, LedgerEntryView},
    profile::{self as wire_profile, CapabilitiesView, ProfileView},
};
use chrono::{DateTime, FixedOffset, Utc};
use engine::{
    Announcement, Balance, Booking, Capabilities, ContactMessage, EntryKind, LedgerEntry,
    MembershipInquiry, Profile, Role, Simulator,
};

pub fn utc(value: DateTime<FixedOffset>) -> DateTime<Utc> {
    value.with_timezone(&Utc)
}

pub fn role_from_wire(role: wire_profile::Role) -> Role {
    match role {
        wire_profile::Role::User => Role::User,
        wire_profile::Role::Admin => Role::Admin,
    }
}

fn role_to_wire(role: Role) -> wire_profile::Role {
    match role {
        Role::User => wire_profile::Role::User,
        Role::Admin => wire_profile::Role::Admin,
    }
}

pub fn simulator_from_wire(simulator: wire_booking::Simulator) -> Simulator {
    match simulator {
        wire_booking::Simulator::East => Simulator::East,
        wire_booking::Simulator::West => Simulator::West,
    }
}

fn simulator_to_wire(simulator: Simulator) -> wire_booking::Simulator {
    match simulator {
        Simulator::East => wire_booking::Simulator::East,
        Simulator::West => wire_booking::Simulator::West,
    }
}

fn kind_to_wire(kind: EntryKind) -> wire_ledger::EntryKind {
    match kind {
        EntryKind::GuestFee => wire_ledger::EntryKind::GuestFee,
        EntryKind::Payment => wire_ledger::EntryKind::Payment,
        EntryKind::Adjustment => wire_ledger::EntryKind::Adjustment,
    }
}

pub fn profile(profile: Profile) -> ProfileView {
    let is_member = profile.is_member(Utc::now());
    ProfileView {
        id: profile.id,
        name: profile.name,
        email: profile.email,
        phone: profile.phone,
        role: role_to_wire(profile.role),
        active_until: profile.active_until,
        is_member,
        profile_picture_url: profile.profile_picture_url,
        created_at: profile.created_at,
    }
}

pub fn capabilities(capabilities: Capabilities) -> CapabilitiesView {
    CapabilitiesView {
        can_book_for_others: capabilities.can_book_for_others,
        can_bypass_quota: capabilities.can_bypass_quota,
        can_manage_ledger_for_any_user: capabilities.can_manage_ledger_for_any_user,
        can_manage_announcements: capabilities.can_manage_announcements,
        can_manage_profiles: capabilities.can_manage_profiles,
    }
}

pub fn booking(booking: Booking) -> BookingView {
    BookingView {
        id: booking.id,
        user_id: booking.user_id,
        simulator: simulator_to_wire(booking.simulator),
        start_time: booking.start_time,
        end_time: booking.end_time,
        created_at: booking.created_at,
    }
}

pub fn ledger_entry(entry: LedgerEntry) -> LedgerEntryView {
    LedgerEntryView {
        id: entry.id,
        user_id: entry.user_id,
        booking_id: entry.booking_id,
        kind: kind_to_wire(entry.kind),
        amount_minor: entry.amount.cents(),
        description: entry.description,
        created_at: entry.created_at,
        created_by: entry.created_by,
    }
}

pub fn balance(balance: Balance) -> BalanceView {
    BalanceView {
        formatted: balance.display.to_string(),
        user_id: balance.user_id,
        raw_minor: balance.raw.cents(),
        balance_minor: balance.display.cents(),
    }
}

pub fn announcement(announcement: Announcement) -> AnnouncementView {
    AnnouncementView {
        id: announcement.id,
        message: announcement.message,
        is_active: announcement.is_active,
        created_at: announcement.created_at,
        updated_at: announcement.updated_at,
    }
}

pub fn inquiry(inquiry: MembershipInquiry) -> InquiryView {
    InquiryView {
        id: inquiry.id,
        name: inquiry.name,
        email: inquiry.email,
        phone: inquiry.phone,
        message: inquiry.message,
        created_at: inquiry.created_at,
    }
}

pub fn contact(message: ContactMessage) -> ContactView {
    ContactView {
        id: message.id,
        user_id: message.user_id,
        subject: message.subject,
        message: message.message,
        attachment_url: message.attachment_url,
        created_at: message.created_at,
    }
}
