//! Backend wire shapes. Requests are camelCase; stored company rows are snake_case with
//! a handful of legacy spellings accepted on read (see `mapping`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::codec::EncodedPaymentModes;
use crate::domain::{ApplicationFields, AverageAmount, PaymentPortal, TransactionVolume};

/// Body of `POST {apiUrl}/company_data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
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
    pub current_mode_of_payment: EncodedPaymentModes,
    pub estimated_transaction_numbers: Option<TransactionVolume>,
    pub estimated_average_amount: Option<AverageAmount>,
}

impl SubmissionPayload {
    pub fn from_fields(values: &ApplicationFields) -> Self {
        let telephone = values.telephone_no.trim();
        Self {
            registered_by_name: values.registered_by_name.trim().to_string(),
            registered_by_contact_number: values.registered_by_contact_number.trim().to_string(),
            contact_person_name: values.contact_person_name.trim().to_string(),
            contact_number: values.contact_number.trim().to_string(),
            business_name: values.business_name.trim().to_string(),
            business_email: values.business_email.trim().to_string(),
            business_address: values.business_address.trim().to_string(),
            telephone_no: (!telephone.is_empty()).then(|| telephone.to_string()),
            has_existing_payment_portal: values.has_existing_payment_portal,
            current_mode_of_payment: EncodedPaymentModes::encode(&values.current_mode_of_payment),
            estimated_transaction_numbers: values.estimated_transaction_numbers,
            estimated_average_amount: values.estimated_average_amount,
        }
    }

    /// Back to form values, e.g. for server-side validation of a submission.
    pub fn to_fields(&self) -> ApplicationFields {
        ApplicationFields {
            registered_by_name: self.registered_by_name.clone(),
            registered_by_contact_number: self.registered_by_contact_number.clone(),
            same_as_registered_by: false,
            contact_person_name: self.contact_person_name.clone(),
            contact_number: self.contact_number.clone(),
            business_name: self.business_name.clone(),
            business_email: self.business_email.clone(),
            business_address: self.business_address.clone(),
            telephone_no: self.telephone_no.clone().unwrap_or_default(),
            has_existing_payment_portal: self.has_existing_payment_portal,
            current_mode_of_payment: self.current_mode_of_payment.decode(),
            estimated_transaction_numbers: self.estimated_transaction_numbers,
            estimated_average_amount: self.estimated_average_amount,
        }
    }
}

/// Response of `POST {apiUrl}/company_data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<CompanyRecord>,
    #[serde(
        default,
        alias = "reference_id",
        alias = "referenceNo",
        skip_serializing_if = "Option::is_none"
    )]
    pub reference: Option<String>,
}

/// Legacy `contact_person`: either a bare name or the nested contact object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LegacyContactPerson {
    Name(String),
    Detail {
        #[serde(default, alias = "firstName")]
        first_name: String,
        #[serde(default, alias = "lastName")]
        last_name: String,
        #[serde(default)]
        email: Option<String>,
        #[serde(default)]
        phone: Option<String>,
    },
}

/// Legacy `business_address`: either one line or the structured address object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LegacyAddress {
    Line(String),
    Parts {
        #[serde(default)]
        street: String,
        #[serde(default)]
        city: String,
        #[serde(default)]
        state: String,
        #[serde(default, alias = "postalCode")]
        postal_code: String,
        #[serde(default)]
        country: String,
    },
}

/// One stored company row as returned by the dashboard and search endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(
        default,
        alias = "referenceNo",
        alias = "reference",
        alias = "referenceNumber",
        skip_serializing_if = "Option::is_none"
    )]
    pub reference_no: Option<String>,
    #[serde(default, alias = "registeredByName", deserialize_with = "null_as_empty")]
    pub registered_by_name: String,
    #[serde(default, alias = "registeredByContactNumber", deserialize_with = "null_as_empty")]
    pub registered_by_contact_number: String,
    #[serde(default, alias = "contactPersonName", skip_serializing_if = "Option::is_none")]
    pub contact_person_name: Option<String>,
    #[serde(default, alias = "contactPerson", skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<LegacyContactPerson>,
    #[serde(default, alias = "contactNumber", skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,
    #[serde(default, alias = "businessName", deserialize_with = "null_as_empty")]
    pub business_name: String,
    #[serde(default, alias = "businessEmail", deserialize_with = "null_as_empty")]
    pub business_email: String,
    #[serde(default, alias = "businessAddress", skip_serializing_if = "Option::is_none")]
    pub business_address: Option<LegacyAddress>,
    #[serde(default, alias = "telephoneNo", skip_serializing_if = "Option::is_none")]
    pub telephone_no: Option<String>,
    #[serde(default, alias = "hasExistingPaymentPortal", skip_serializing_if = "Option::is_none")]
    pub has_existing_payment_portal: Option<String>,
    #[serde(default, alias = "currentModeOfPayment", skip_serializing_if = "Option::is_none")]
    pub current_mode_of_payment: Option<EncodedPaymentModes>,
    #[serde(
        default,
        alias = "estimatedTransactionNumbers",
        skip_serializing_if = "Option::is_none"
    )]
    pub estimated_transaction_numbers: Option<String>,
    #[serde(default, alias = "estimatedAverageAmount", skip_serializing_if = "Option::is_none")]
    pub estimated_average_amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, alias = "submittedAt", skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "reviewedAt", skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "reviewedBy", skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Legacy rows send `null` for blank text columns.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Response of `GET {apiUrl}/admin/dashboard[/{page}]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardPageResponse {
    #[serde(default, alias = "total_pages")]
    pub total_pages: u32,
    #[serde(default, alias = "totalCount", skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, alias = "currentPage", skip_serializing_if = "Option::is_none")]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub companies: Vec<CompanyRecord>,
}

/// Body of `POST {apiUrl}/admin/update-application-status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateRequest {
    pub reference_no: String,
    pub status: String,
}

/// `{success, message?}` acknowledgement shared by mutation endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub message: String,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeUsernameRequest {
    pub new_username: String,
    pub current_password: String,
}
