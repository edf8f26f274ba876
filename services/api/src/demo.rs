use crate::infra::build_backend;
use chrono::Utc;
use clap::Args;
use merchant_onboarding::admin::{AdminApplicationListState, AdminDashboardView, AdminSession, SearchOutcome};
use merchant_onboarding::backend::merchant_router;
use merchant_onboarding::config::AppConfig;
use merchant_onboarding::domain::{
    AverageAmount, PaymentMode, PaymentPortal, ReferenceNo, TransactionVolume,
};
use merchant_onboarding::error::AppError;
use merchant_onboarding::gateway::{ApplicationGateway, RouterTransport, SubmitReceipt, Transport};
use merchant_onboarding::onboarding::{
    FieldChange, FieldName, FileLocalStorage, LocalDraftStore, LocalStorage, MemoryLocalStorage,
    OnboardingWizard,
};
use merchant_onboarding::telemetry;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Term typed into the dashboard search box
    #[arg(long, default_value = "sari")]
    pub(crate) search: String,
    /// Override the dashboard page size
    #[arg(long)]
    pub(crate) page_size: Option<usize>,
    /// Write the dashboard export to this path
    #[arg(long)]
    pub(crate) export: Option<PathBuf>,
}

/// What the demo produced, for the closing summary.
#[derive(Debug, Default)]
pub(crate) struct DemoSummary {
    pub(crate) references: Vec<ReferenceNo>,
    pub(crate) search_matches: usize,
    pub(crate) export_bytes: usize,
}

struct SampleMerchant {
    registered_by: &'static str,
    registered_by_contact: &'static str,
    contact: Option<(&'static str, &'static str)>,
    business_name: &'static str,
    business_email: &'static str,
    business_address: &'static str,
    portal: PaymentPortal,
    modes: &'static [PaymentMode],
    volume: TransactionVolume,
    amount: AverageAmount,
}

const SAMPLE_MERCHANTS: [SampleMerchant; 3] = [
    SampleMerchant {
        registered_by: "Liza Manalo",
        registered_by_contact: "09171234567",
        contact: None,
        business_name: "Aling Nena Sari-Sari Store",
        business_email: "nena.store@example.ph",
        business_address: "45 Mabini Street, Quezon City",
        portal: PaymentPortal::No,
        modes: &[PaymentMode::Cash, PaymentMode::Qrph],
        volume: TransactionVolume::UpTo50,
        amount: AverageAmount::UpTo10k,
    },
    SampleMerchant {
        registered_by: "Marco dela Cruz",
        registered_by_contact: "+639281234567",
        contact: Some(("Ana Villanueva", "09391234567")),
        business_name: "Bayanihan Bakery",
        business_email: "orders@bayanihanbakery.ph",
        business_address: "8 Burgos Avenue, Cebu City",
        portal: PaymentPortal::Yes,
        modes: &[PaymentMode::EWallets, PaymentMode::CardPayment],
        volume: TransactionVolume::From51To100,
        amount: AverageAmount::From10kTo50k,
    },
    SampleMerchant {
        registered_by: "Joy Santos",
        registered_by_contact: "09451234567",
        contact: Some(("Ramon Santos", "09561234567")),
        business_name: "Santos Sari-Sari Mart",
        business_email: "santosmart@example.ph",
        business_address: "112 Rizal Road, Davao City",
        portal: PaymentPortal::No,
        modes: &[PaymentMode::Cash],
        volume: TransactionVolume::Above100,
        amount: AverageAmount::Above50k,
    },
];

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(page_size) = args.page_size {
        config.dashboard.page_size = page_size.max(1);
    }
    telemetry::init(&config.telemetry, config.environment)?;

    let summary = match config.admin.local_store.clone() {
        Some(path) => run_flow(Arc::new(FileLocalStorage::new(path)), &config, &args).await?,
        None => run_flow(Arc::new(MemoryLocalStorage::default()), &config, &args).await?,
    };

    println!(
        "\nDemo finished: {} applications submitted, {} search matches, {} export bytes",
        summary.references.len(),
        summary.search_matches,
        summary.export_bytes
    );
    Ok(())
}

/// Wizard submissions, admin login, and dashboard triage against an in-process backend.
pub(crate) async fn run_flow<S>(
    storage: Arc<S>,
    config: &AppConfig,
    args: &DemoArgs,
) -> Result<DemoSummary, AppError>
where
    S: LocalStorage + 'static,
{
    let backend = build_backend(config);
    let transport = Arc::new(RouterTransport::new(merchant_router(backend, &config.api)));
    let gateway = Arc::new(ApplicationGateway::new(
        transport,
        config.api.base_path.clone(),
        config.dashboard.page_size,
    ));
    let drafts = Arc::new(LocalDraftStore::new(storage.clone()));
    let mut summary = DemoSummary::default();

    println!("Merchant onboarding demo ({})", Utc::now().format("%Y-%m-%d %H:%M UTC"));
    println!("\nSubmitting applications");
    for merchant in &SAMPLE_MERCHANTS {
        let receipt = submit_merchant(&drafts, &gateway, merchant).await?;
        println!("- {} -> {}", merchant.business_name, receipt.reference);
        summary.references.push(receipt.reference);
    }

    let mut session = AdminSession::new(storage, gateway.clone());
    session
        .login(&config.admin.username, &config.admin.password)
        .await?;

    let state = Arc::new(AdminApplicationListState::from_config(
        gateway.clone(),
        &config.dashboard,
    ));
    let mut view = AdminDashboardView::new(state.clone());
    view.go_to_page(1).await?;
    print_dashboard(&view, "Dashboard");

    let rows = view.rows();
    if let Some(first) = rows.first() {
        view.approve(&first.reference).await?;
    }
    if let Some(second) = rows.get(1) {
        view.mark_called(&second.reference).await?;
        if let Some(detail) = view.open_detail(&second.reference) {
            println!(
                "\nDetail {}: {} | modes {} | next actions {}",
                detail.application.reference,
                detail.badge.label,
                detail.payment_modes.join(", "),
                detail
                    .actions
                    .iter()
                    .map(|action| action.label())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            view.close_detail();
        }
    }
    print_dashboard(&view, "After triage");

    if let SearchOutcome::Searched { matches } = state.set_search(&args.search).await? {
        summary.search_matches = matches;
        print_dashboard(&view, &format!("Search \"{}\"", args.search));
    }
    state.set_search("").await?;

    let export = view.download_excel().await?;
    summary.export_bytes = export.bytes.len();
    if let Some(path) = &args.export {
        std::fs::write(path, &export.bytes)?;
        println!("\nExport written to {}", path.display());
    }

    session.logout()?;
    Ok(summary)
}

async fn submit_merchant<S, T>(
    drafts: &Arc<LocalDraftStore<S>>,
    gateway: &Arc<ApplicationGateway<T>>,
    merchant: &SampleMerchant,
) -> Result<SubmitReceipt, AppError>
where
    S: LocalStorage + 'static,
    T: Transport + 'static,
{
    let mut wizard = OnboardingWizard::mount(drafts.clone(), gateway.clone());

    let text = [
        (FieldName::RegisteredByName, merchant.registered_by),
        (FieldName::RegisteredByContactNumber, merchant.registered_by_contact),
        (FieldName::BusinessName, merchant.business_name),
        (FieldName::BusinessEmail, merchant.business_email),
        (FieldName::BusinessAddress, merchant.business_address),
    ];
    for (field, value) in text {
        wizard.update(FieldChange::Text(field, value.to_string()));
    }
    match merchant.contact {
        Some((name, number)) => {
            wizard.update(FieldChange::Text(FieldName::ContactPersonName, name.to_string()));
            wizard.update(FieldChange::Text(FieldName::ContactNumber, number.to_string()));
        }
        None => {
            wizard.update(FieldChange::SameAsRegisteredBy(true));
        }
    }
    wizard.next()?;

    wizard.update(FieldChange::PaymentPortal(Some(merchant.portal)));
    for mode in merchant.modes {
        wizard.update(FieldChange::PaymentMode(*mode, true));
    }
    wizard.update(FieldChange::TransactionVolume(Some(merchant.volume)));
    wizard.update(FieldChange::AverageAmount(Some(merchant.amount)));
    wizard.next()?;

    Ok(wizard.submit().await?)
}

fn print_dashboard<D>(view: &AdminDashboardView<D>, title: &str)
where
    D: merchant_onboarding::gateway::ApplicationDirectory,
{
    println!("\n{title}: {}", view.pagination().summary());
    for row in view.rows() {
        println!(
            "- {} | {} | {} {} | {} | {}",
            row.reference,
            row.business_name,
            row.contact_person_name,
            row.contact_number,
            row.submitted_on,
            row.badge.label
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::test_config;
    use merchant_onboarding::onboarding::DRAFT_KEY;
    use std::time::Duration;

    #[tokio::test]
    async fn demo_flow_submits_and_triages_every_sample() {
        let mut config = test_config();
        config.dashboard.search_debounce = Duration::ZERO;
        let storage = Arc::new(MemoryLocalStorage::default());
        let args = DemoArgs {
            search: "sari".to_string(),
            ..DemoArgs::default()
        };

        let summary = run_flow(storage.clone(), &config, &args)
            .await
            .expect("demo completes");

        assert_eq!(summary.references.len(), SAMPLE_MERCHANTS.len());
        assert_eq!(summary.search_matches, 2);
        assert!(summary.export_bytes > 0);
        assert!(
            storage.get_item(DRAFT_KEY).expect("readable").is_none(),
            "drafts are cleared after submission"
        );
        assert!(storage.keys().is_empty(), "logout clears the admin session");
    }
}
