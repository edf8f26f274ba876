use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Backend-assigned reference for a submitted application. Immutable once issued.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceNo(pub String);

impl ReferenceNo {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ReferenceNo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Review status of an application. Transitions are admin-initiated only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    UnderReview,
    Approved,
    Rejected,
    Called,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::Pending,
        ApplicationStatus::UnderReview,
        ApplicationStatus::Approved,
        ApplicationStatus::Rejected,
        ApplicationStatus::Called,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::UnderReview => "under_review",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Called => "called",
        }
    }

    pub fn from_label(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        Self::ALL
            .into_iter()
            .find(|status| status.label() == normalized)
    }
}

/// Answer to "do you already have a payment portal?".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentPortal {
    #[serde(rename = "YES", alias = "yes", alias = "Yes")]
    Yes,
    #[serde(rename = "NO", alias = "no", alias = "No")]
    No,
}

impl PaymentPortal {
    pub const fn label(self) -> &'static str {
        match self {
            PaymentPortal::Yes => "YES",
            PaymentPortal::No => "NO",
        }
    }

    pub fn from_label(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "YES" => Some(Self::Yes),
            "NO" => Some(Self::No),
            _ => None,
        }
    }
}

/// Estimated monthly transaction count bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionVolume {
    #[serde(rename = "1 – 50", alias = "1 - 50")]
    UpTo50,
    #[serde(rename = "51 – 100", alias = "51 - 100")]
    From51To100,
    #[serde(rename = "ABOVE 100")]
    Above100,
}

impl TransactionVolume {
    pub const ALL: [TransactionVolume; 3] = [
        TransactionVolume::UpTo50,
        TransactionVolume::From51To100,
        TransactionVolume::Above100,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            TransactionVolume::UpTo50 => "1 – 50",
            TransactionVolume::From51To100 => "51 – 100",
            TransactionVolume::Above100 => "ABOVE 100",
        }
    }

    pub fn from_label(raw: &str) -> Option<Self> {
        let wanted = normalize_bucket(raw);
        Self::ALL
            .into_iter()
            .find(|bucket| normalize_bucket(bucket.label()) == wanted)
    }
}

/// Estimated average transaction amount bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AverageAmount {
    #[serde(rename = "1 – 10,000", alias = "1 - 10,000")]
    UpTo10k,
    #[serde(rename = "10,001 – 50,000", alias = "10,001 - 50,000")]
    From10kTo50k,
    #[serde(rename = "ABOVE 50,000")]
    Above50k,
}

impl AverageAmount {
    pub const ALL: [AverageAmount; 3] = [
        AverageAmount::UpTo10k,
        AverageAmount::From10kTo50k,
        AverageAmount::Above50k,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            AverageAmount::UpTo10k => "1 – 10,000",
            AverageAmount::From10kTo50k => "10,001 – 50,000",
            AverageAmount::Above50k => "ABOVE 50,000",
        }
    }

    pub fn from_label(raw: &str) -> Option<Self> {
        let wanted = normalize_bucket(raw);
        Self::ALL
            .into_iter()
            .find(|bucket| normalize_bucket(bucket.label()) == wanted)
    }
}

// Buckets arrive with en-dashes, ASCII hyphens, or odd spacing depending on the client.
fn normalize_bucket(raw: &str) -> String {
    raw.chars()
        .filter(|ch| !ch.is_whitespace())
        .map(|ch| if ch == '–' { '-' } else { ch })
        .collect::<String>()
        .to_ascii_uppercase()
}

/// One accepted payment channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMode {
    Cash,
    EWallets,
    Qrph,
    CardPayment,
}

impl PaymentMode {
    pub const ALL: [PaymentMode; 4] = [
        PaymentMode::Cash,
        PaymentMode::EWallets,
        PaymentMode::Qrph,
        PaymentMode::CardPayment,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            PaymentMode::Cash => "Cash",
            PaymentMode::EWallets => "E-Wallets",
            PaymentMode::Qrph => "QRPH",
            PaymentMode::CardPayment => "Card Payment",
        }
    }
}

/// The `currentModeOfPayment` flag set. Field order matches the wire encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentModes {
    pub cash: bool,
    pub e_wallets: bool,
    pub qrph: bool,
    pub card_payment: bool,
}

impl PaymentModes {
    pub fn get(&self, mode: PaymentMode) -> bool {
        match mode {
            PaymentMode::Cash => self.cash,
            PaymentMode::EWallets => self.e_wallets,
            PaymentMode::Qrph => self.qrph,
            PaymentMode::CardPayment => self.card_payment,
        }
    }

    pub fn set(&mut self, mode: PaymentMode, enabled: bool) {
        match mode {
            PaymentMode::Cash => self.cash = enabled,
            PaymentMode::EWallets => self.e_wallets = enabled,
            PaymentMode::Qrph => self.qrph = enabled,
            PaymentMode::CardPayment => self.card_payment = enabled,
        }
    }

    pub fn any(&self) -> bool {
        PaymentMode::ALL.into_iter().any(|mode| self.get(mode))
    }

    pub fn enabled(&self) -> Vec<PaymentMode> {
        PaymentMode::ALL
            .into_iter()
            .filter(|mode| self.get(*mode))
            .collect()
    }
}

/// Raw wizard field values; mirrors [`Application`] minus system fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationFields {
    pub registered_by_name: String,
    pub registered_by_contact_number: String,
    pub same_as_registered_by: bool,
    pub contact_person_name: String,
    pub contact_number: String,
    pub business_name: String,
    pub business_email: String,
    pub business_address: String,
    pub telephone_no: String,
    pub has_existing_payment_portal: Option<PaymentPortal>,
    pub current_mode_of_payment: PaymentModes,
    pub estimated_transaction_numbers: Option<TransactionVolume>,
    pub estimated_average_amount: Option<AverageAmount>,
}

/// One merchant submission in its canonical shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub reference: ReferenceNo,
    pub registered_by_name: String,
    pub registered_by_contact_number: String,
    pub contact_person_name: String,
    pub contact_number: String,
    pub business_name: String,
    pub business_email: String,
    pub business_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telephone_no: Option<String>,
    pub has_existing_payment_portal: Option<PaymentPortal>,
    pub current_mode_of_payment: PaymentModes,
    pub estimated_transaction_numbers: Option<TransactionVolume>,
    pub estimated_average_amount: Option<AverageAmount>,
    pub status: ApplicationStatus,
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Application {
    /// Case-insensitive partial match across the fields the dashboard search covers.
    pub fn matches_term(&self, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [
            self.reference.as_str(),
            self.business_name.as_str(),
            self.business_email.as_str(),
            self.contact_person_name.as_str(),
            self.contact_number.as_str(),
            self.registered_by_name.as_str(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// One fetched page of applications for the admin view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationListPage {
    pub applications: Vec<Application>,
    pub current_page: u32,
    pub total_pages: u32,
    pub total_count: u64,
    /// Set when the backend omitted `total` and the count was derived from
    /// `totalPages × pageSize`; inexact whenever the last page is partial.
    pub count_is_estimate: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_labels_round_trip_and_tolerate_spacing() {
        for status in ApplicationStatus::ALL {
            assert_eq!(ApplicationStatus::from_label(status.label()), Some(status));
        }
        assert_eq!(
            ApplicationStatus::from_label("Under Review"),
            Some(ApplicationStatus::UnderReview)
        );
        assert_eq!(ApplicationStatus::from_label("archived"), None);
    }

    #[test]
    fn bucket_labels_accept_ascii_hyphens() {
        assert_eq!(
            TransactionVolume::from_label("51 - 100"),
            Some(TransactionVolume::From51To100)
        );
        assert_eq!(
            AverageAmount::from_label("above 50,000"),
            Some(AverageAmount::Above50k)
        );
        assert_eq!(AverageAmount::from_label("a lot"), None);
    }

    #[test]
    fn payment_modes_track_individual_flags() {
        let mut modes = PaymentModes::default();
        assert!(!modes.any());
        modes.set(PaymentMode::Qrph, true);
        assert!(modes.any());
        assert_eq!(modes.enabled(), vec![PaymentMode::Qrph]);
    }
}
