use std::sync::Arc;

use tracing::{debug, info, warn};

use super::draft::{DraftStore, FormDraft};
use super::form::{ApplicationFormModel, FieldName, StepReport, WizardStep};
use crate::domain::{
    ApplicationFields, AverageAmount, PaymentMode, PaymentPortal, ReferenceNo, TransactionVolume,
};
use crate::gateway::{ApplicationSubmitter, GatewayError, SubmissionPayload, SubmitReceipt};

/// Message shown when a submission fails; details go to the log.
pub const SUBMIT_FAILURE_MESSAGE: &str =
    "We could not submit your application. Please try again.";

/// A single user edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldChange {
    Text(FieldName, String),
    PaymentPortal(Option<PaymentPortal>),
    PaymentMode(PaymentMode, bool),
    TransactionVolume(Option<TransactionVolume>),
    AverageAmount(Option<AverageAmount>),
    SameAsRegisteredBy(bool),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardPhase {
    Editing,
    Submitted { reference: ReferenceNo, message: String },
}

#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("step {} is incomplete", .step.index())]
    StepInvalid { step: WizardStep, report: StepReport },
    #[error("already on the last step")]
    NoFurtherStep,
    #[error("submission is only available from the review step")]
    NotOnReview,
    #[error("the application form is incomplete")]
    FormInvalid { report: StepReport },
    #[error("application already submitted")]
    AlreadySubmitted,
    #[error("submission failed: {0}")]
    Submit(#[from] GatewayError),
}

/// Drives the three-step onboarding flow.
pub struct OnboardingWizard<D, S> {
    form: ApplicationFormModel,
    drafts: Arc<D>,
    submitter: Arc<S>,
    step: WizardStep,
    values: ApplicationFields,
    phase: WizardPhase,
    failure: Option<String>,
}

impl<D, S> OnboardingWizard<D, S>
where
    D: DraftStore,
    S: ApplicationSubmitter,
{
    /// Starts a wizard, re-applying any stored draft.
    pub fn mount(drafts: Arc<D>, submitter: Arc<S>) -> Self {
        let mut wizard = Self {
            form: ApplicationFormModel::build(),
            drafts,
            submitter,
            step: WizardStep::BusinessInfo,
            values: ApplicationFields::default(),
            phase: WizardPhase::Editing,
            failure: None,
        };

        if let Some(draft) = wizard.drafts.load() {
            wizard.step = WizardStep::from_index(draft.step).unwrap_or(WizardStep::BusinessInfo);
            wizard.values = draft.form_values;
            wizard.apply_same_as_registered_by();
            debug!(step = wizard.step.index(), "restored onboarding draft");
        }

        wizard
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn values(&self) -> &ApplicationFields {
        &self.values
    }

    pub fn phase(&self) -> &WizardPhase {
        &self.phase
    }

    pub fn form(&self) -> &ApplicationFormModel {
        &self.form
    }

    /// Generic failure text from the last submit attempt, if it failed.
    pub fn failure_message(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn is_step_valid(&self, step: WizardStep) -> bool {
        self.form.is_step_valid(step, &self.values)
    }

    pub fn step_report(&self, step: WizardStep) -> StepReport {
        self.form.check_step(step, &self.values)
    }

    /// Contact fields are locked while "same as registered-by" is on.
    pub fn is_field_disabled(&self, field: FieldName) -> bool {
        self.values.same_as_registered_by
            && matches!(field, FieldName::ContactPersonName | FieldName::ContactNumber)
    }

    /// Applies an edit and snapshots the draft. Returns false when the edit targets a
    /// disabled field or a choice field through the text variant.
    pub fn update(&mut self, change: FieldChange) -> bool {
        let applied = match change {
            FieldChange::Text(field, value) => {
                if self.is_field_disabled(field) {
                    false
                } else {
                    field.write_text(&mut self.values, value)
                }
            }
            FieldChange::PaymentPortal(portal) => {
                self.values.has_existing_payment_portal = portal;
                true
            }
            FieldChange::PaymentMode(mode, enabled) => {
                self.values.current_mode_of_payment.set(mode, enabled);
                true
            }
            FieldChange::TransactionVolume(bucket) => {
                self.values.estimated_transaction_numbers = bucket;
                true
            }
            FieldChange::AverageAmount(bucket) => {
                self.values.estimated_average_amount = bucket;
                true
            }
            FieldChange::SameAsRegisteredBy(enabled) => {
                self.values.same_as_registered_by = enabled;
                true
            }
        };

        if applied {
            self.apply_same_as_registered_by();
            self.save_draft();
        }
        applied
    }

    pub fn next(&mut self) -> Result<WizardStep, WizardError> {
        let report = self.step_report(self.step);
        if !report.is_valid() {
            return Err(WizardError::StepInvalid {
                step: self.step,
                report,
            });
        }
        let next = self.step.next().ok_or(WizardError::NoFurtherStep)?;
        self.step = next;
        self.save_draft();
        Ok(next)
    }

    pub fn previous(&mut self) -> WizardStep {
        if let Some(previous) = self.step.previous() {
            self.step = previous;
            self.save_draft();
        }
        self.step
    }

    /// Submits from the review step. On failure the wizard stays on review.
    pub async fn submit(&mut self) -> Result<SubmitReceipt, WizardError> {
        if matches!(self.phase, WizardPhase::Submitted { .. }) {
            return Err(WizardError::AlreadySubmitted);
        }
        if self.step != WizardStep::Review {
            return Err(WizardError::NotOnReview);
        }
        let report = self.step_report(WizardStep::Review);
        if !report.is_valid() {
            return Err(WizardError::FormInvalid { report });
        }

        self.failure = None;
        let payload = SubmissionPayload::from_fields(&self.values);
        match self.submitter.submit(&payload).await {
            Ok(receipt) => {
                if let Err(err) = self.drafts.clear() {
                    warn!(error = %err, "failed to clear onboarding draft after submission");
                }
                info!(reference = %receipt.reference, "onboarding wizard completed");
                self.phase = WizardPhase::Submitted {
                    reference: receipt.reference.clone(),
                    message: receipt.message.clone(),
                };
                Ok(receipt)
            }
            Err(err) => {
                warn!(error = %err, "onboarding submission failed");
                self.failure = Some(SUBMIT_FAILURE_MESSAGE.to_string());
                Err(WizardError::Submit(err))
            }
        }
    }

    /// Drops all progress, including the stored draft.
    pub fn reset(&mut self) {
        if let Err(err) = self.drafts.clear() {
            warn!(error = %err, "failed to clear onboarding draft on reset");
        }
        self.step = WizardStep::BusinessInfo;
        self.values = ApplicationFields::default();
        self.phase = WizardPhase::Editing;
        self.failure = None;
    }

    fn apply_same_as_registered_by(&mut self) {
        if self.values.same_as_registered_by {
            self.values.contact_person_name = self.values.registered_by_name.clone();
            self.values.contact_number = self.values.registered_by_contact_number.clone();
        }
    }

    fn save_draft(&self) {
        let draft = FormDraft {
            step: self.step.index(),
            form_values: self.values.clone(),
        };
        if let Err(err) = self.drafts.save(&draft) {
            warn!(error = %err, "failed to save onboarding draft");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PaymentModes;
    use crate::gateway::tests::common::{company_row, ScriptedTransport};
    use crate::gateway::ApplicationGateway;
    use crate::onboarding::draft::{LocalDraftStore, LocalStorage, MemoryLocalStorage, DRAFT_KEY};
    use crate::onboarding::form::tests::{business_info, complete_fields};
    use axum::http::StatusCode;
    use serde_json::json;

    type TestWizard = OnboardingWizard<LocalDraftStore<MemoryLocalStorage>, ApplicationGateway<ScriptedTransport>>;

    struct Harness {
        storage: Arc<MemoryLocalStorage>,
        transport: Arc<ScriptedTransport>,
        gateway: Arc<ApplicationGateway<ScriptedTransport>>,
    }

    impl Harness {
        fn new() -> Self {
            let transport = Arc::new(ScriptedTransport::default());
            Self {
                storage: Arc::new(MemoryLocalStorage::default()),
                gateway: Arc::new(ApplicationGateway::new(transport.clone(), "/api", 10)),
                transport,
            }
        }

        fn mount(&self) -> TestWizard {
            OnboardingWizard::mount(
                Arc::new(LocalDraftStore::new(self.storage.clone())),
                self.gateway.clone(),
            )
        }

        fn stored_draft(&self) -> Option<FormDraft> {
            self.storage
                .get_item(DRAFT_KEY)
                .expect("memory storage readable")
                .map(|raw| serde_json::from_str(&raw).expect("draft json"))
        }
    }

    fn fill(wizard: &mut TestWizard, values: &ApplicationFields) {
        let text_fields = [
            (FieldName::RegisteredByName, &values.registered_by_name),
            (FieldName::RegisteredByContactNumber, &values.registered_by_contact_number),
            (FieldName::ContactPersonName, &values.contact_person_name),
            (FieldName::ContactNumber, &values.contact_number),
            (FieldName::BusinessName, &values.business_name),
            (FieldName::BusinessEmail, &values.business_email),
            (FieldName::BusinessAddress, &values.business_address),
            (FieldName::TelephoneNo, &values.telephone_no),
        ];
        for (field, value) in text_fields {
            wizard.update(FieldChange::Text(field, value.clone()));
        }
        wizard.update(FieldChange::PaymentPortal(values.has_existing_payment_portal));
        for mode in PaymentMode::ALL {
            wizard.update(FieldChange::PaymentMode(mode, values.current_mode_of_payment.get(mode)));
        }
        wizard.update(FieldChange::TransactionVolume(values.estimated_transaction_numbers));
        wizard.update(FieldChange::AverageAmount(values.estimated_average_amount));
    }

    #[test]
    fn next_is_blocked_until_step_is_valid() {
        let harness = Harness::new();
        let mut wizard = harness.mount();

        match wizard.next() {
            Err(WizardError::StepInvalid { step, report }) => {
                assert_eq!(step, WizardStep::BusinessInfo);
                assert!(report.field_errors.contains_key(&FieldName::BusinessName));
            }
            other => panic!("expected invalid step, got {other:?}"),
        }
        assert_eq!(wizard.step(), WizardStep::BusinessInfo);

        fill(&mut wizard, &business_info());
        assert_eq!(wizard.next().expect("advances"), WizardStep::PaymentDetails);

        assert!(wizard.next().is_err(), "payment details still empty");
        assert_eq!(wizard.step(), WizardStep::PaymentDetails);

        fill(&mut wizard, &complete_fields());
        assert_eq!(wizard.next().expect("advances"), WizardStep::Review);
        assert!(matches!(wizard.next(), Err(WizardError::NoFurtherStep)));
        assert_eq!(wizard.step(), WizardStep::Review);
    }

    #[test]
    fn previous_never_goes_below_first_step() {
        let harness = Harness::new();
        let mut wizard = harness.mount();
        assert_eq!(wizard.previous(), WizardStep::BusinessInfo);

        fill(&mut wizard, &complete_fields());
        wizard.next().expect("to payment");
        wizard.next().expect("to review");
        assert_eq!(wizard.previous(), WizardStep::PaymentDetails);
        assert_eq!(wizard.previous(), WizardStep::BusinessInfo);
        assert_eq!(wizard.previous(), WizardStep::BusinessInfo);
    }

    #[test]
    fn same_as_registered_by_copies_locks_and_releases_contact_fields() {
        let harness = Harness::new();
        let mut wizard = harness.mount();
        wizard.update(FieldChange::Text(FieldName::RegisteredByName, "Liza Manalo".into()));
        wizard.update(FieldChange::Text(FieldName::RegisteredByContactNumber, "09171234567".into()));
        wizard.update(FieldChange::Text(FieldName::ContactPersonName, "Someone Else".into()));

        assert!(wizard.update(FieldChange::SameAsRegisteredBy(true)));
        assert_eq!(wizard.values().contact_person_name, "Liza Manalo");
        assert_eq!(wizard.values().contact_number, "09171234567");
        assert!(wizard.is_field_disabled(FieldName::ContactPersonName));
        assert!(!wizard.update(FieldChange::Text(FieldName::ContactNumber, "09999999999".into())));
        assert_eq!(wizard.values().contact_number, "09171234567");

        wizard.update(FieldChange::Text(FieldName::RegisteredByName, "Liza M. Manalo".into()));
        assert_eq!(wizard.values().contact_person_name, "Liza M. Manalo");

        wizard.update(FieldChange::SameAsRegisteredBy(false));
        assert!(!wizard.is_field_disabled(FieldName::ContactPersonName));
        assert_eq!(wizard.values().contact_person_name, "Liza M. Manalo");
        assert_eq!(wizard.values().contact_number, "09171234567");

        wizard.update(FieldChange::Text(FieldName::RegisteredByName, "Someone New".into()));
        assert_eq!(wizard.values().contact_person_name, "Liza M. Manalo");
    }

    #[test]
    fn disabled_contact_fields_still_count_toward_validity() {
        let harness = Harness::new();
        let mut wizard = harness.mount();
        let mut values = business_info();
        values.contact_person_name.clear();
        values.contact_number.clear();
        fill(&mut wizard, &values);
        assert!(!wizard.is_step_valid(WizardStep::BusinessInfo));

        wizard.update(FieldChange::SameAsRegisteredBy(true));
        assert!(wizard.is_step_valid(WizardStep::BusinessInfo));
    }

    #[test]
    fn every_edit_overwrites_the_draft_and_mount_restores_it() {
        let harness = Harness::new();
        {
            let mut wizard = harness.mount();
            fill(&mut wizard, &business_info());
            wizard.next().expect("to payment");
            wizard.update(FieldChange::PaymentMode(PaymentMode::EWallets, true));
        }

        let stored = harness.stored_draft().expect("draft saved");
        assert_eq!(stored.step, 2);
        assert!(stored.form_values.current_mode_of_payment.e_wallets);

        let restored = harness.mount();
        assert_eq!(restored.step(), WizardStep::PaymentDetails);
        assert_eq!(restored.values().business_name, "Test Co");
        assert!(restored.values().current_mode_of_payment.e_wallets);
    }

    #[test]
    fn corrupt_draft_is_ignored_on_mount() {
        let harness = Harness::new();
        harness
            .storage
            .set_item(DRAFT_KEY, "{\"step\": 2, \"formValues\": ")
            .expect("seed corrupt draft");
        let wizard = harness.mount();
        assert_eq!(wizard.step(), WizardStep::BusinessInfo);
        assert_eq!(wizard.values(), &ApplicationFields::default());
    }

    #[tokio::test]
    async fn submit_requires_review_step_and_complete_form() {
        let harness = Harness::new();
        let mut wizard = harness.mount();
        assert!(matches!(wizard.submit().await, Err(WizardError::NotOnReview)));
        assert!(harness.transport.requests().is_empty());
    }

    #[tokio::test]
    async fn successful_submit_clears_draft_and_shows_reference() {
        let harness = Harness::new();
        harness.transport.reply(
            StatusCode::CREATED,
            json!({
                "success": true,
                "message": "Application received",
                "reference": "ngsi-25-00007",
                "data": company_row("ngsi-25-00007", "Test Co", "pending")
            }),
        );

        let mut wizard = harness.mount();
        let mut values = complete_fields();
        values.current_mode_of_payment = PaymentModes {
            cash: true,
            ..PaymentModes::default()
        };
        fill(&mut wizard, &values);
        wizard.next().expect("to payment");
        wizard.next().expect("to review");

        let receipt = wizard.submit().await.expect("submitted");
        assert_eq!(receipt.reference.as_str(), "ngsi-25-00007");
        assert_eq!(
            wizard.phase(),
            &WizardPhase::Submitted {
                reference: ReferenceNo("ngsi-25-00007".to_string()),
                message: "Application received".to_string(),
            }
        );
        assert!(harness.stored_draft().is_none());

        let body = harness.transport.last_request().body.expect("payload");
        assert_eq!(
            body["currentModeOfPayment"],
            json!(r#"{"cash":true,"eWallets":false,"qrph":false,"cardPayment":false}"#)
        );
        assert_eq!(body["contactNumber"], "09281234567");

        assert!(matches!(wizard.submit().await, Err(WizardError::AlreadySubmitted)));
    }

    #[tokio::test]
    async fn failed_submit_stays_on_review_and_keeps_draft() {
        let harness = Harness::new();
        harness
            .transport
            .reply(StatusCode::INTERNAL_SERVER_ERROR, json!({"message": "boom"}));

        let mut wizard = harness.mount();
        fill(&mut wizard, &complete_fields());
        wizard.next().expect("to payment");
        wizard.next().expect("to review");

        assert!(matches!(wizard.submit().await, Err(WizardError::Submit(_))));
        assert_eq!(wizard.step(), WizardStep::Review);
        assert_eq!(wizard.phase(), &WizardPhase::Editing);
        assert_eq!(wizard.failure_message(), Some(SUBMIT_FAILURE_MESSAGE));
        assert!(harness.stored_draft().is_some());
        assert_eq!(harness.transport.requests().len(), 1, "no automatic retry");
    }

    #[test]
    fn reset_clears_progress_and_draft() {
        let harness = Harness::new();
        let mut wizard = harness.mount();
        fill(&mut wizard, &business_info());
        wizard.next().expect("to payment");

        wizard.reset();
        assert_eq!(wizard.step(), WizardStep::BusinessInfo);
        assert_eq!(wizard.values(), &ApplicationFields::default());
        assert!(harness.stored_draft().is_none());
    }
}
