//! Spreadsheet rendering of applications, shared by the dashboard's page export and the
//! backend's download endpoint.

use serde::Serialize;

use crate::domain::Application;

pub const EXPORT_FILE_NAME: &str = "merchant-applications.csv";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv buffer flush failed: {0}")]
    Flush(String),
}

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    #[serde(rename = "Reference No")]
    reference: &'a str,
    #[serde(rename = "Business Name")]
    business_name: &'a str,
    #[serde(rename = "Business Email")]
    business_email: &'a str,
    #[serde(rename = "Business Address")]
    business_address: &'a str,
    #[serde(rename = "Telephone No")]
    telephone_no: &'a str,
    #[serde(rename = "Contact Person")]
    contact_person_name: &'a str,
    #[serde(rename = "Contact Number")]
    contact_number: &'a str,
    #[serde(rename = "Registered By")]
    registered_by_name: &'a str,
    #[serde(rename = "Registrant Contact Number")]
    registered_by_contact_number: &'a str,
    #[serde(rename = "Existing Payment Portal")]
    has_existing_payment_portal: &'a str,
    #[serde(rename = "Modes of Payment")]
    modes_of_payment: String,
    #[serde(rename = "Estimated Transactions")]
    estimated_transaction_numbers: &'a str,
    #[serde(rename = "Estimated Average Amount")]
    estimated_average_amount: &'a str,
    #[serde(rename = "Status")]
    status: &'a str,
    #[serde(rename = "Submitted At")]
    submitted_at: String,
}

impl<'a> From<&'a Application> for ExportRow<'a> {
    fn from(application: &'a Application) -> Self {
        Self {
            reference: application.reference.as_str(),
            business_name: &application.business_name,
            business_email: &application.business_email,
            business_address: &application.business_address,
            telephone_no: application.telephone_no.as_deref().unwrap_or(""),
            contact_person_name: &application.contact_person_name,
            contact_number: &application.contact_number,
            registered_by_name: &application.registered_by_name,
            registered_by_contact_number: &application.registered_by_contact_number,
            has_existing_payment_portal: application
                .has_existing_payment_portal
                .map(|portal| portal.label())
                .unwrap_or(""),
            modes_of_payment: application
                .current_mode_of_payment
                .enabled()
                .iter()
                .map(|mode| mode.label())
                .collect::<Vec<_>>()
                .join("; "),
            estimated_transaction_numbers: application
                .estimated_transaction_numbers
                .map(|bucket| bucket.label())
                .unwrap_or(""),
            estimated_average_amount: application
                .estimated_average_amount
                .map(|bucket| bucket.label())
                .unwrap_or(""),
            status: application.status.label(),
            submitted_at: application
                .submitted_at
                .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
        }
    }
}

/// Renders one header row plus a row per application, in the given order.
pub fn write_applications_csv(applications: &[Application]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if applications.is_empty() {
        // serde only emits headers alongside the first record
        writer.write_record(EXPORT_HEADERS)?;
    }
    for application in applications {
        writer.serialize(ExportRow::from(application))?;
    }
    writer
        .into_inner()
        .map_err(|err| ExportError::Flush(err.to_string()))
}

const EXPORT_HEADERS: [&str; 15] = [
    "Reference No",
    "Business Name",
    "Business Email",
    "Business Address",
    "Telephone No",
    "Contact Person",
    "Contact Number",
    "Registered By",
    "Registrant Contact Number",
    "Existing Payment Portal",
    "Modes of Payment",
    "Estimated Transactions",
    "Estimated Average Amount",
    "Status",
    "Submitted At",
];
