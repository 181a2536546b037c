//! Status enums shared across the data model.
//!
//! All of these are stored as TEXT in Postgres; the manual sqlx
//! conversions keep unknown database values from decoding silently.

use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, Postgres};
use utoipa::ToSchema;

macro_rules! impl_text_sqlx {
    ($ty:ty) => {
        impl sqlx::Type<Postgres> for $ty {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<Postgres>>::type_info()
            }
        }

        impl<'r> Decode<'r, Postgres> for $ty {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let s: String = Decode::<Postgres>::decode(value)?;
                s.parse().map_err(|e: String| e.into())
            }
        }

        impl Encode<'_, Postgres> for $ty {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> sqlx::encode::IsNull {
                <String as Encode<Postgres>>::encode(self.as_str().to_string(), buf)
            }
        }
    };
}

/// Status of a physical copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemStatus {
    Available,
    Reserved,
    Loaned,
    Lost,
    Damaged,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Available => "AVAILABLE",
            ItemStatus::Reserved => "RESERVED",
            ItemStatus::Loaned => "LOANED",
            ItemStatus::Lost => "LOST",
            ItemStatus::Damaged => "DAMAGED",
        }
    }

    /// Human-readable label, as shown in exports
    pub fn display(&self) -> &'static str {
        match self {
            ItemStatus::Available => "Available",
            ItemStatus::Reserved => "Reserved",
            ItemStatus::Loaned => "Loaned",
            ItemStatus::Lost => "Lost",
            ItemStatus::Damaged => "Damaged",
        }
    }
}

impl std::str::FromStr for ItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AVAILABLE" => Ok(ItemStatus::Available),
            "RESERVED" => Ok(ItemStatus::Reserved),
            "LOANED" => Ok(ItemStatus::Loaned),
            "LOST" => Ok(ItemStatus::Lost),
            "DAMAGED" => Ok(ItemStatus::Damaged),
            _ => Err(format!("Invalid item status: {}", s)),
        }
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl_text_sqlx!(ItemStatus);

/// Status of a borrow request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
    Expired,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "PENDING",
            RequestStatus::Approved => "APPROVED",
            RequestStatus::Rejected => "REJECTED",
            RequestStatus::Cancelled => "CANCELLED",
            RequestStatus::Expired => "EXPIRED",
        }
    }

    /// Requests only move forward out of PENDING; every other state is terminal.
    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        matches!(
            (self, next),
            (
                RequestStatus::Pending,
                RequestStatus::Approved
                    | RequestStatus::Rejected
                    | RequestStatus::Cancelled
                    | RequestStatus::Expired
            )
        )
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(RequestStatus::Pending),
            "APPROVED" => Ok(RequestStatus::Approved),
            "REJECTED" => Ok(RequestStatus::Rejected),
            "CANCELLED" => Ok(RequestStatus::Cancelled),
            "EXPIRED" => Ok(RequestStatus::Expired),
            _ => Err(format!("Invalid request status: {}", s)),
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl_text_sqlx!(RequestStatus);

/// Status of a loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanStatus {
    Borrowed,
    Returned,
    Overdue,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Borrowed => "BORROWED",
            LoanStatus::Returned => "RETURNED",
            LoanStatus::Overdue => "OVERDUE",
        }
    }

    pub fn display(&self) -> &'static str {
        match self {
            LoanStatus::Borrowed => "Borrowed",
            LoanStatus::Returned => "Returned",
            LoanStatus::Overdue => "Overdue",
        }
    }

    /// An open loan occupies its copy
    pub fn is_open(&self) -> bool {
        matches!(self, LoanStatus::Borrowed | LoanStatus::Overdue)
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BORROWED" => Ok(LoanStatus::Borrowed),
            "RETURNED" => Ok(LoanStatus::Returned),
            "OVERDUE" => Ok(LoanStatus::Overdue),
            _ => Err(format!("Invalid loan status: {}", s)),
        }
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl_text_sqlx!(LoanStatus);

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Staff,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Staff => "staff",
            Role::Admin => "admin",
        }
    }

    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Staff | Role::Admin)
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "member" => Ok(Role::Member),
            "staff" => Ok(Role::Staff),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl_text_sqlx!(Role);

/// Kind of queued notification mail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    RequestApproved,
    RequestRejected,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::RequestApproved => "request_approved",
            NotificationKind::RequestRejected => "request_rejected",
        }
    }
}

impl std::str::FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "request_approved" => Ok(NotificationKind::RequestApproved),
            "request_rejected" => Ok(NotificationKind::RequestRejected),
            _ => Err(format!("Invalid notification kind: {}", s)),
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl_text_sqlx!(NotificationKind);

/// Delivery status of a queued mail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    Pending,
    Sent,
    Failed,
}

impl NotificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationStatus::Pending => "pending",
            NotificationStatus::Sent => "sent",
            NotificationStatus::Failed => "failed",
        }
    }
}

impl std::str::FromStr for NotificationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(NotificationStatus::Pending),
            "sent" => Ok(NotificationStatus::Sent),
            "failed" => Ok(NotificationStatus::Failed),
            _ => Err(format!("Invalid notification status: {}", s)),
        }
    }
}

impl std::fmt::Display for NotificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl_text_sqlx!(NotificationStatus);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_moves_forward_only() {
        let terminal = [
            RequestStatus::Approved,
            RequestStatus::Rejected,
            RequestStatus::Cancelled,
            RequestStatus::Expired,
        ];
        for next in terminal {
            assert!(RequestStatus::Pending.can_transition_to(next));
        }
        assert!(!RequestStatus::Pending.can_transition_to(RequestStatus::Pending));
    }

    #[test]
    fn terminal_states_never_transition() {
        let all = [
            RequestStatus::Pending,
            RequestStatus::Approved,
            RequestStatus::Rejected,
            RequestStatus::Cancelled,
            RequestStatus::Expired,
        ];
        for from in all.iter().filter(|s| s.is_terminal()) {
            for next in all {
                assert!(!from.can_transition_to(next), "{} -> {}", from, next);
            }
        }
    }

    #[test]
    fn statuses_round_trip_through_strings() {
        for s in ["AVAILABLE", "RESERVED", "LOANED", "LOST", "DAMAGED"] {
            assert_eq!(s.parse::<ItemStatus>().unwrap().as_str(), s);
        }
        for s in ["BORROWED", "RETURNED", "OVERDUE"] {
            assert_eq!(s.parse::<LoanStatus>().unwrap().as_str(), s);
        }
        assert!("LOITERING".parse::<ItemStatus>().is_err());
    }

    #[test]
    fn open_loans_occupy_their_copy() {
        assert!(LoanStatus::Borrowed.is_open());
        assert!(LoanStatus::Overdue.is_open());
        assert!(!LoanStatus::Returned.is_open());
    }
}
