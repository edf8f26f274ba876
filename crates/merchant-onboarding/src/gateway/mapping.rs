//! Single translation point between stored company rows and [`Application`].
//!
//! Legacy spellings resolved here:
//!
//! | canonical                | also accepted                                        |
//! |--------------------------|------------------------------------------------------|
//! | `reference_no`           | `referenceNo`, `reference`, `referenceNumber`, `id`  |
//! | `contact_person_name`    | `contact_person` as a string or `{firstName, lastName}` |
//! | `contact_number`         | `contact_person.phone`                               |
//! | `business_address`       | `{street, city, state, postalCode, country}`         |
//! | `current_mode_of_payment`| nested object instead of a JSON string               |
//! | `submitted_at`           | `created_at`                                         |

use tracing::warn;

use super::codec::EncodedPaymentModes;
use super::wire::{CompanyRecord, LegacyAddress, LegacyContactPerson};
use crate::domain::{
    Application, ApplicationStatus, AverageAmount, PaymentModes, PaymentPortal, ReferenceNo,
    TransactionVolume,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MappingError {
    #[error("company record for '{business_name}' carries no reference")]
    MissingReference { business_name: String },
}

pub fn application_from_record(record: CompanyRecord) -> Result<Application, MappingError> {
    let reference = record
        .reference_no
        .clone()
        .or_else(|| record.id.clone())
        .filter(|reference| !reference.trim().is_empty())
        .ok_or_else(|| MappingError::MissingReference {
            business_name: record.business_name.clone(),
        })?;

    let contact_person_name = record
        .contact_person_name
        .clone()
        .or_else(|| record.contact_person.as_ref().map(legacy_contact_name))
        .unwrap_or_default();

    let contact_number = record
        .contact_number
        .clone()
        .or_else(|| match &record.contact_person {
            Some(LegacyContactPerson::Detail { phone, .. }) => phone.clone(),
            _ => None,
        })
        .unwrap_or_default();

    let status = match record.status.as_deref() {
        Some(raw) => ApplicationStatus::from_label(raw).unwrap_or_else(|| {
            warn!(reference = %reference, status = raw, "unknown application status; treating as pending");
            ApplicationStatus::Pending
        }),
        None => ApplicationStatus::Pending,
    };

    Ok(Application {
        reference: ReferenceNo(reference),
        registered_by_name: record.registered_by_name,
        registered_by_contact_number: record.registered_by_contact_number,
        contact_person_name,
        contact_number,
        business_name: record.business_name,
        business_email: record.business_email,
        business_address: record
            .business_address
            .as_ref()
            .map(legacy_address_line)
            .unwrap_or_default(),
        telephone_no: record.telephone_no.filter(|phone| !phone.trim().is_empty()),
        has_existing_payment_portal: record
            .has_existing_payment_portal
            .as_deref()
            .and_then(PaymentPortal::from_label),
        current_mode_of_payment: record
            .current_mode_of_payment
            .as_ref()
            .map(EncodedPaymentModes::decode)
            .unwrap_or_else(PaymentModes::default),
        estimated_transaction_numbers: record
            .estimated_transaction_numbers
            .as_deref()
            .and_then(TransactionVolume::from_label),
        estimated_average_amount: record
            .estimated_average_amount
            .as_deref()
            .and_then(AverageAmount::from_label),
        status,
        submitted_at: record.submitted_at.or(record.created_at),
        reviewed_at: record.reviewed_at,
        reviewed_by: record.reviewed_by,
        notes: record.notes,
    })
}

/// Maps a batch, skipping rows that cannot be identified.
pub fn applications_from_records(records: Vec<CompanyRecord>) -> Vec<Application> {
    records
        .into_iter()
        .filter_map(|record| match application_from_record(record) {
            Ok(application) => Some(application),
            Err(err) => {
                warn!(error = %err, "skipping unidentifiable company record");
                None
            }
        })
        .collect()
}

/// Canonical outbound row, as the bundled backend stores and serves it.
pub fn record_from_application(application: &Application) -> CompanyRecord {
    CompanyRecord {
        id: None,
        reference_no: Some(application.reference.0.clone()),
        registered_by_name: application.registered_by_name.clone(),
        registered_by_contact_number: application.registered_by_contact_number.clone(),
        contact_person_name: Some(application.contact_person_name.clone()),
        contact_person: None,
        contact_number: Some(application.contact_number.clone()),
        business_name: application.business_name.clone(),
        business_email: application.business_email.clone(),
        business_address: Some(LegacyAddress::Line(application.business_address.clone())),
        telephone_no: application.telephone_no.clone(),
        has_existing_payment_portal: application
            .has_existing_payment_portal
            .map(|portal| portal.label().to_string()),
        current_mode_of_payment: Some(EncodedPaymentModes::encode(
            &application.current_mode_of_payment,
        )),
        estimated_transaction_numbers: application
            .estimated_transaction_numbers
            .map(|bucket| bucket.label().to_string()),
        estimated_average_amount: application
            .estimated_average_amount
            .map(|bucket| bucket.label().to_string()),
        status: Some(application.status.label().to_string()),
        submitted_at: application.submitted_at,
        created_at: None,
        reviewed_at: application.reviewed_at,
        reviewed_by: application.reviewed_by.clone(),
        notes: application.notes.clone(),
    }
}

fn legacy_contact_name(contact: &LegacyContactPerson) -> String {
    match contact {
        LegacyContactPerson::Name(name) => name.trim().to_string(),
        LegacyContactPerson::Detail {
            first_name,
            last_name,
            ..
        } => format!("{} {}", first_name.trim(), last_name.trim())
            .trim()
            .to_string(),
    }
}

fn legacy_address_line(address: &LegacyAddress) -> String {
    match address {
        LegacyAddress::Line(line) => line.trim().to_string(),
        LegacyAddress::Parts {
            street,
            city,
            state,
            postal_code,
            country,
        } => [street, city, state, postal_code, country]
            .iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
    }
}
