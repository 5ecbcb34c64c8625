use crate::infra::{
    parse_date, parse_profile, parse_sort_field, parse_sort_order, InMemoryCaseRepository,
    InMemoryNotificationSink,
};
use chrono::{Datelike, Duration, Local, NaiveDate, TimeZone, Utc};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use seguro_defeso::config::AppConfig;
use seguro_defeso::error::AppError;
use seguro_defeso::session::{ReqwestTransport, SessionClient};
use seguro_defeso::state::AppSession;
use seguro_defeso::telemetry;
use seguro_defeso::workflows::cases::{
    export_cases_csv, render_analysis_report, Case, CaseService, CaseStatus, Claimant,
    CourtDetails, ListQuery, Page, Priority, ProcessNumberIssuer, RecordId, SolicitationSubmission,
    SortField, SortOrder, SubmittedDocument,
};
use seguro_defeso::workflows::eligibility::EligibilityEngine;
use seguro_defeso::workflows::intake::{
    DocumentCategory, IntakeLog, IntakeProfile, KeywordClassifier, UploadOrchestrator,
    UploadedFile,
};

const DEMO_CASE_COUNT: u32 = 25;

const DEMO_NAMES: &[&str] = &[
    "Maria Aparecida",
    "João Batista",
    "Ana Lúcia",
    "Pedro Henrique",
    "Francisca Souza",
    "José Ribamar",
    "Raimunda Costa",
    "Antônio Carlos",
];

const DEMO_COLONIES: &[&str] = &["Colônia Z-1", "Colônia Z-3", "Colônia Z-10"];

const DEMO_STATUSES: &[CaseStatus] = &[
    CaseStatus::Pendente,
    CaseStatus::EmAnalise,
    CaseStatus::Aprovado,
    CaseStatus::DocumentacaoIncompleta,
    CaseStatus::Negado,
];

#[derive(Args, Debug)]
pub(crate) struct IntakeArgs {
    /// Files to classify, in upload order
    #[arg(required = true)]
    pub(crate) files: Vec<PathBuf>,
    /// Intake form to fill (standard or pesqbrasil). Defaults to INTAKE_PROFILE.
    #[arg(long, value_parser = parse_profile)]
    pub(crate) profile: Option<IntakeProfile>,
    /// Score the classified documents once the batch is done
    #[arg(long)]
    pub(crate) analyze: bool,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Page of the case list to print (1-indexed)
    #[arg(long, default_value_t = 1)]
    pub(crate) page: usize,
    /// Sort field (name, status, documents, created_at, process_number, tribunal, filed_on,
    /// movements, last_movement)
    #[arg(long, value_parser = parse_sort_field)]
    pub(crate) sort: Option<SortField>,
    /// Sort order (asc or desc)
    #[arg(long, value_parser = parse_sort_order)]
    pub(crate) order: Option<SortOrder>,
    /// Case-insensitive search over name, CPF, process number and tribunal
    #[arg(long, default_value = "")]
    pub(crate) search: String,
    /// Reference date for the seeded records (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Write the filtered case list as CSV into this directory
    #[arg(long)]
    pub(crate) export_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct SessionLoginArgs {
    /// Login e-mail
    #[arg(long)]
    pub(crate) email: String,
    /// Login password
    #[arg(long)]
    pub(crate) password: String,
}

pub(crate) async fn run_intake(args: IntakeArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init_lenient(&config.telemetry, config.environment)?;

    let profile = args.profile.unwrap_or(config.intake.profile);
    let mut uploads = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let metadata = std::fs::metadata(path)?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        uploads.push(UploadedFile {
            size_bytes: metadata.len(),
            ..UploadedFile::named(name)
        });
    }

    let classifier = KeywordClassifier::configured(profile, false);
    let mut orchestrator = UploadOrchestrator::new(profile, classifier);
    let mut log = IntakeLog::default();
    let summary = orchestrator.process_batch(uploads, &mut log).await;

    println!("Intake form: {}", profile.label());
    for notice in &log.notices {
        println!("  - {}", notice.message());
    }

    println!("\nSlots");
    for slot in orchestrator.registry().slots() {
        let marker = if slot.required { "*" } else { " " };
        let detail = slot
            .bound_file()
            .map(|file| file.name.clone())
            .unwrap_or_else(|| format!("{:?}", slot.state.phase()).to_lowercase());
        println!("  {marker} {:<45} {}", slot.label, detail);
    }

    let registry = orchestrator.registry();
    println!(
        "\n{} classified, {} replaced, {} failed, {} skipped, {} rejected; required {}/{}{}",
        summary.classified,
        summary.replaced,
        summary.failed,
        summary.skipped,
        summary.rejected,
        registry.count_filled(true),
        registry.total_required(),
        if registry.is_complete() {
            " (ready to submit)"
        } else {
            ""
        }
    );

    if args.analyze {
        let categories: Vec<DocumentCategory> = orchestrator
            .classified_documents()
            .iter()
            .map(|document| document.category)
            .collect();
        let result =
            EligibilityEngine::for_profile(profile, false).evaluate(&categories, Utc::now());

        println!("\nEligibility score: {}% (confidence {}%)", result.score, result.confidence);
        for check in &result.checks {
            println!("  {} {}: {}", check.status.symbol(), check.criterion, check.detail);
        }
        for recommendation in &result.recommendations {
            println!("  → {recommendation}");
        }
    }

    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init_lenient(&config.telemetry, config.environment)?;

    let DemoArgs {
        page,
        sort,
        order,
        search,
        today,
        export_dir,
    } = args;
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    let repository = Arc::new(InMemoryCaseRepository::default());
    let notifications = Arc::new(InMemoryNotificationSink::default());
    let service = CaseService::new(
        repository,
        notifications.clone(),
        EligibilityEngine::for_profile(IntakeProfile::Standard, false),
    );

    for case in seed_cases(today) {
        service.record_case(case)?;
    }

    let query = ListQuery::<CaseStatus> {
        search,
        status: None,
        sort: sort.unwrap_or_default(),
        order: order.unwrap_or_default(),
        page,
    };
    let listing = service.list_cases(&query)?;
    print_case_page(&listing);

    if let Some(dir) = export_dir {
        let matching = service.matching_cases(&query)?;
        let document = export_cases_csv(&matching, today)?;
        let path = dir.join(&document.file_name);
        std::fs::write(&path, document.body)?;
        println!("\nExported {} cases to {}", matching.len(), path.display());
    }

    println!("\nSolicitation walkthrough");
    let submission = SolicitationSubmission {
        claimant: Claimant {
            name: "Raimundo Nonato".to_string(),
            cpf: "98765432100".to_string(),
            colony: "Colônia Z-3".to_string(),
            ..Claimant::default()
        },
        documents: [
            DocumentCategory::Rg,
            DocumentCategory::Cpf,
            DocumentCategory::Rgp,
            DocumentCategory::DeclaracaoColonia,
            DocumentCategory::ComprovanteVenda,
        ]
        .into_iter()
        .map(|category| SubmittedDocument {
            category,
            file_name: format!("{}.pdf", category.code()),
        })
        .collect(),
        priority: Priority::Alta,
        lawyer_notes: None,
    };
    let solicitation = service.submit(submission).await?;
    println!(
        "  {} filed with status {} (score {}%)",
        solicitation.id,
        solicitation.status.label(),
        solicitation
            .analysis
            .as_ref()
            .map(|analysis| analysis.score)
            .unwrap_or_default()
    );

    let process = service.convert_to_process(&solicitation.id)?;
    println!(
        "  converted into process {} at {}",
        process.process_number, process.tribunal
    );

    let refreshed = service.get_solicitation(&solicitation.id)?;
    let report = render_analysis_report(&refreshed, Utc::now());
    println!("  analysis report ready: {}", report.file_name);
    println!("  notifications published: {}", notifications.events().len());

    Ok(())
}

pub(crate) async fn run_session_login(args: SessionLoginArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init_lenient(&config.telemetry, config.environment)?;

    let transport = ReqwestTransport::new(&config.session.base_url)
        .map_err(seguro_defeso::session::SessionError::from)?;
    let client = SessionClient::new(transport);

    client.login(&args.email, &args.password).await?;
    let mut state = AppSession::default();
    state.restore(&client).await?;

    match &state.user {
        Some(user) => println!("Signed in as {} <{}>", user.name, user.email),
        None => println!("Login accepted but the API returned no user"),
    }
    Ok(())
}

/// Deterministic records: one per day going back from `today`, every third one filed in court.
fn seed_cases(today: NaiveDate) -> Vec<Case> {
    let issuer = ProcessNumberIssuer::default();
    let midday = today
        .and_hms_opt(12, 0, 0)
        .map(|at| Utc.from_utc_datetime(&at))
        .unwrap_or_else(Utc::now);

    (0..DEMO_CASE_COUNT)
        .map(|index| {
            let position = index as usize;
            let created_at = midday - Duration::days(i64::from(DEMO_CASE_COUNT - index));
            let name = format!(
                "{} {:02}",
                DEMO_NAMES[position % DEMO_NAMES.len()],
                index + 1
            );
            let court = if index % 3 == 0 {
                let filed_on = created_at.date_naive() + Duration::days(2);
                CourtDetails {
                    process_number: Some(issuer.issue(filed_on.year())),
                    tribunal: Some(if index % 2 == 0 { "TJSP" } else { "TRF3" }.to_string()),
                    court_body: Some("Vara Cível".to_string()),
                    procedural_class: Some("Procedimento Comum Cível".to_string()),
                    subject: Some("Seguro-Defeso".to_string()),
                    situation: Some("Distribuído".to_string()),
                    filed_on: Some(filed_on),
                    movements: Some(index % 7 + 1),
                    last_movement: Some(filed_on + Duration::days(i64::from(index % 5))),
                }
            } else {
                CourtDetails::default()
            };

            Case {
                id: RecordId(format!("case-{:06}", index + 1)),
                claimant: Claimant {
                    name,
                    cpf: format!("{:011}", 10_000_000_000u64 + u64::from(index) * 7_919),
                    colony: DEMO_COLONIES[position % DEMO_COLONIES.len()].to_string(),
                    ..Claimant::default()
                },
                status: DEMO_STATUSES[position % DEMO_STATUSES.len()],
                documents: Vec::new(),
                analysis: None,
                created_at,
                updated_at: created_at,
                lawyer_notes: None,
                priority: match index % 3 {
                    0 => Priority::Alta,
                    1 => Priority::Media,
                    _ => Priority::Baixa,
                },
                court,
            }
        })
        .collect()
}

fn print_case_page(page: &Page<Case>) {
    println!(
        "Cases (page {} of {}, {} matching)",
        page.page,
        page.total_pages.max(1),
        page.total_items
    );
    if page.items.is_empty() {
        println!("  no cases on this page");
        return;
    }

    for case in &page.items {
        println!(
            "  {:<22} {:<16} {:<12} {:<26} {}",
            case.claimant.name,
            case.status.label(),
            case.created_at.format("%d/%m/%Y"),
            case.court.process_number.as_deref().unwrap_or("-"),
            case.court.tribunal.as_deref().unwrap_or("-"),
        );
    }
}
