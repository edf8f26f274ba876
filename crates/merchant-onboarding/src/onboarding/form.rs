use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::validators::{validate, FieldError, FieldValidator, Pattern};
use crate::domain::ApplicationFields;

/// Linear wizard steps. Serialized as their 1-based index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WizardStep {
    BusinessInfo = 1,
    PaymentDetails = 2,
    Review = 3,
}

impl WizardStep {
    pub const fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            1 => Some(Self::BusinessInfo),
            2 => Some(Self::PaymentDetails),
            3 => Some(Self::Review),
            _ => None,
        }
    }

    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    pub fn previous(self) -> Option<Self> {
        Self::from_index(self.index().saturating_sub(1))
    }

    pub const fn title(self) -> &'static str {
        match self {
            WizardStep::BusinessInfo => "Business Information",
            WizardStep::PaymentDetails => "Payment & Transaction Details",
            WizardStep::Review => "Review",
        }
    }
}

/// Addressable form controls.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum FieldName {
    RegisteredByName,
    RegisteredByContactNumber,
    ContactPersonName,
    ContactNumber,
    BusinessName,
    BusinessEmail,
    BusinessAddress,
    TelephoneNo,
    HasExistingPaymentPortal,
    EstimatedTransactionNumbers,
    EstimatedAverageAmount,
}

impl FieldName {
    /// Wire name of the control, as used in submission payloads.
    pub const fn key(self) -> &'static str {
        match self {
            FieldName::RegisteredByName => "registeredByName",
            FieldName::RegisteredByContactNumber => "registeredByContactNumber",
            FieldName::ContactPersonName => "contactPersonName",
            FieldName::ContactNumber => "contactNumber",
            FieldName::BusinessName => "businessName",
            FieldName::BusinessEmail => "businessEmail",
            FieldName::BusinessAddress => "businessAddress",
            FieldName::TelephoneNo => "telephoneNo",
            FieldName::HasExistingPaymentPortal => "hasExistingPaymentPortal",
            FieldName::EstimatedTransactionNumbers => "estimatedTransactionNumbers",
            FieldName::EstimatedAverageAmount => "estimatedAverageAmount",
        }
    }

    /// Raw value as the validators see it; choice fields yield their label or "".
    pub fn value_in(self, values: &ApplicationFields) -> String {
        match self {
            FieldName::RegisteredByName => values.registered_by_name.clone(),
            FieldName::RegisteredByContactNumber => values.registered_by_contact_number.clone(),
            FieldName::ContactPersonName => values.contact_person_name.clone(),
            FieldName::ContactNumber => values.contact_number.clone(),
            FieldName::BusinessName => values.business_name.clone(),
            FieldName::BusinessEmail => values.business_email.clone(),
            FieldName::BusinessAddress => values.business_address.clone(),
            FieldName::TelephoneNo => values.telephone_no.clone(),
            FieldName::HasExistingPaymentPortal => values
                .has_existing_payment_portal
                .map(|portal| portal.label().to_string())
                .unwrap_or_default(),
            FieldName::EstimatedTransactionNumbers => values
                .estimated_transaction_numbers
                .map(|bucket| bucket.label().to_string())
                .unwrap_or_default(),
            FieldName::EstimatedAverageAmount => values
                .estimated_average_amount
                .map(|bucket| bucket.label().to_string())
                .unwrap_or_default(),
        }
    }

    /// Writes a free-text value. Returns false for choice fields, which are set through
    /// their typed setters.
    pub(crate) fn write_text(self, values: &mut ApplicationFields, value: String) -> bool {
        let slot = match self {
            FieldName::RegisteredByName => &mut values.registered_by_name,
            FieldName::RegisteredByContactNumber => &mut values.registered_by_contact_number,
            FieldName::ContactPersonName => &mut values.contact_person_name,
            FieldName::ContactNumber => &mut values.contact_number,
            FieldName::BusinessName => &mut values.business_name,
            FieldName::BusinessEmail => &mut values.business_email,
            FieldName::BusinessAddress => &mut values.business_address,
            FieldName::TelephoneNo => &mut values.telephone_no,
            FieldName::HasExistingPaymentPortal
            | FieldName::EstimatedTransactionNumbers
            | FieldName::EstimatedAverageAmount => return false,
        };
        *slot = value;
        true
    }
}

/// Rules for one control and the step that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    pub field: FieldName,
    pub label: &'static str,
    pub step: WizardStep,
    pub validators: Vec<FieldValidator>,
}

/// Outcome of validating one step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepReport {
    pub field_errors: BTreeMap<FieldName, FieldError>,
    /// Set when the payment-method group has no flag checked.
    pub missing_payment_mode: bool,
}

impl StepReport {
    pub fn is_valid(&self) -> bool {
        self.field_errors.is_empty() && !self.missing_payment_mode
    }

    fn merge(mut self, other: StepReport) -> Self {
        self.field_errors.extend(other.field_errors);
        self.missing_payment_mode |= other.missing_payment_mode;
        self
    }
}

/// The onboarding form's field set and rules. Stateless beyond the rules themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationFormModel {
    rules: Vec<FieldRule>,
}

impl Default for ApplicationFormModel {
    fn default() -> Self {
        Self::build()
    }
}

impl ApplicationFormModel {
    pub fn build() -> Self {
        use FieldValidator::{Email, MinLength, Required};

        let business = WizardStep::BusinessInfo;
        let payment = WizardStep::PaymentDetails;
        let mobile = FieldValidator::Pattern(Pattern::MobileNumber);

        let rules = vec![
            rule(FieldName::RegisteredByName, "Registered by", business, vec![Required, MinLength(2)]),
            rule(
                FieldName::RegisteredByContactNumber,
                "Registrant contact number",
                business,
                vec![Required, mobile.clone()],
            ),
            rule(FieldName::ContactPersonName, "Contact person", business, vec![Required, MinLength(2)]),
            rule(FieldName::ContactNumber, "Contact number", business, vec![Required, mobile]),
            rule(FieldName::BusinessName, "Business name", business, vec![Required, MinLength(2)]),
            rule(FieldName::BusinessEmail, "Business email", business, vec![Required, Email]),
            rule(FieldName::BusinessAddress, "Business address", business, vec![Required, MinLength(10)]),
            rule(FieldName::TelephoneNo, "Telephone no.", business, Vec::new()),
            rule(
                FieldName::HasExistingPaymentPortal,
                "Existing payment portal",
                payment,
                vec![Required],
            ),
            rule(
                FieldName::EstimatedTransactionNumbers,
                "Estimated transactions",
                payment,
                vec![Required],
            ),
            rule(
                FieldName::EstimatedAverageAmount,
                "Estimated average amount",
                payment,
                vec![Required],
            ),
        ];

        Self { rules }
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    pub fn rule(&self, field: FieldName) -> Option<&FieldRule> {
        self.rules.iter().find(|rule| rule.field == field)
    }

    pub fn validate_field(
        &self,
        field: FieldName,
        values: &ApplicationFields,
    ) -> Result<(), FieldError> {
        match self.rule(field) {
            Some(rule) => validate(&rule.validators, &field.value_in(values)),
            None => Ok(()),
        }
    }

    /// Review covers every earlier step.
    pub fn check_step(&self, step: WizardStep, values: &ApplicationFields) -> StepReport {
        match step {
            WizardStep::BusinessInfo | WizardStep::PaymentDetails => {
                let mut report = StepReport::default();
                for rule in self.rules.iter().filter(|rule| rule.step == step) {
                    if let Err(error) = validate(&rule.validators, &rule.field.value_in(values)) {
                        report.field_errors.insert(rule.field, error);
                    }
                }
                if step == WizardStep::PaymentDetails {
                    report.missing_payment_mode = !values.current_mode_of_payment.any();
                }
                report
            }
            WizardStep::Review => self
                .check_step(WizardStep::BusinessInfo, values)
                .merge(self.check_step(WizardStep::PaymentDetails, values)),
        }
    }

    pub fn is_step_valid(&self, step: WizardStep, values: &ApplicationFields) -> bool {
        self.check_step(step, values).is_valid()
    }

    pub fn is_complete(&self, values: &ApplicationFields) -> bool {
        self.is_step_valid(WizardStep::Review, values)
    }

    /// UI-ready messages keyed by field.
    pub fn messages(&self, report: &StepReport) -> BTreeMap<FieldName, String> {
        report
            .field_errors
            .iter()
            .map(|(field, error)| {
                let label = self.rule(*field).map(|rule| rule.label).unwrap_or("This field");
                (*field, error.message(label))
            })
            .collect()
    }
}

fn rule(
    field: FieldName,
    label: &'static str,
    step: WizardStep,
    validators: Vec<FieldValidator>,
) -> FieldRule {
    FieldRule {
        field,
        label,
        step,
        validators,
    }
}
