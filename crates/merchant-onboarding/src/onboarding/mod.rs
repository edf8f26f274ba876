//! Public intake flow: field rules, the step-gated wizard, and draft persistence.

pub mod draft;
pub mod form;
pub mod validators;
pub mod wizard;

pub use draft::{
    DraftStore, FileLocalStorage, FormDraft, LocalDraftStore, LocalStorage, MemoryLocalStorage,
    StorageError, DRAFT_KEY,
};
pub use form::{ApplicationFormModel, FieldName, FieldRule, StepReport, WizardStep};
pub use validators::{FieldError, FieldValidator, Pattern};
pub use wizard::{FieldChange, OnboardingWizard, WizardError, WizardPhase, SUBMIT_FAILURE_MESSAGE};
