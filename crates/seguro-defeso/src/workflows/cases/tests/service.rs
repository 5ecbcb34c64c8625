use super::common::*;
use crate::notifications::NotificationKind;
use crate::workflows::cases::domain::{
    is_valid_process_number, CaseStatus, ProcessImport, ProcessNumberIssuer, ProcessStatus,
    RecordId, SolicitationStatus,
};
use crate::workflows::cases::repository::{CaseRepository, RepositoryError};
use crate::workflows::cases::{CaseService, CaseServiceError, ListQuery};
use crate::workflows::eligibility::EligibilityEngine;
use crate::workflows::intake::DocumentCategory;
use std::sync::Arc;

#[tokio::test]
async fn submit_with_complete_documents_is_approved() {
    let (service, repository, notifications) = build_service();

    let record = service
        .submit(complete_submission("Maria Aparecida"))
        .await
        .expect("submission stored");

    assert_eq!(record.status, SolicitationStatus::Aprovada);
    let analysis = record.analysis.as_ref().expect("analysis attached");
    assert_eq!(analysis.score, 100);
    assert!(analysis.missing_categories.is_empty());
    assert_eq!(record.documents.len(), 5);
    assert!(record
        .documents
        .iter()
        .all(|document| document.url == format!("/uploads/{}", document.name)));

    let stored = repository
        .fetch_solicitation(&record.id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored, record);

    let kinds: Vec<_> = notifications.events().iter().map(|event| event.kind).collect();
    assert_eq!(
        kinds,
        vec![NotificationKind::CaseCreated, NotificationKind::AnalysisComplete]
    );
}

#[tokio::test]
async fn submit_with_missing_documents_requests_more() {
    use DocumentCategory::*;
    let (service, _, notifications) = build_service();

    let record = service
        .submit(submission("José Ribamar", &[Rg, Cpf]))
        .await
        .expect("submission stored");

    assert_eq!(record.status, SolicitationStatus::DocumentacaoIncompleta);
    let events = notifications.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].kind, NotificationKind::DocumentMissing);
    assert!(events[1].message.contains("Registro Geral da Pesca (RGP)"));
    assert_eq!(events[1].case_id.as_deref(), Some(record.id.0.as_str()));
}

#[tokio::test]
async fn submit_without_documents_stays_pending() {
    let (service, _, notifications) = build_service();

    let record = service
        .submit(submission("Ana Lúcia", &[]))
        .await
        .expect("submission stored");

    assert_eq!(record.status, SolicitationStatus::Pendente);
    assert!(record.analysis.is_none());
    assert_eq!(notifications.events().len(), 1);
}

#[tokio::test]
async fn submit_rejects_blank_claimant() {
    let (service, repository, _) = build_service();

    match service.submit(submission("   ", &[])).await {
        Err(CaseServiceError::EmptyClaimant) => {}
        other => panic!("expected empty claimant error, got {other:?}"),
    }
    assert!(repository.solicitations().expect("list").is_empty());
}

#[tokio::test]
async fn submit_propagates_repository_failures() {
    let service = CaseService::new(
        Arc::new(UnavailableRepository),
        Arc::new(MemoryNotifications::default()),
        EligibilityEngine::default(),
    );

    match service.submit(complete_submission("Maria")).await {
        Err(CaseServiceError::Repository(RepositoryError::Unavailable(_))) => {}
        other => panic!("expected unavailable repository, got {other:?}"),
    }
}

#[tokio::test]
async fn submit_surfaces_notification_failures() {
    let service = CaseService::new(
        Arc::new(MemoryRepository::default()),
        Arc::new(OfflineNotifications),
        EligibilityEngine::default(),
    );

    assert!(matches!(
        service.submit(complete_submission("Maria")).await,
        Err(CaseServiceError::Notification(_))
    ));
}

#[tokio::test]
async fn approve_moves_incomplete_solicitation_to_approved() {
    use DocumentCategory::*;
    let (service, _, notifications) = build_service();
    let record = service
        .submit(submission("José", &[Rg, Cpf]))
        .await
        .expect("stored");

    let approved = service.approve(&record.id).expect("approve succeeds");

    assert_eq!(approved.status, SolicitationStatus::Aprovada);
    assert!(approved.updated_at >= record.updated_at);
    let last = notifications.events().pop().expect("status notification");
    assert_eq!(last.kind, NotificationKind::StatusChange);
}

#[tokio::test]
async fn approve_rejects_already_approved_solicitation() {
    let (service, _, _) = build_service();
    let record = service
        .submit(complete_submission("Maria"))
        .await
        .expect("stored");

    match service.approve(&record.id) {
        Err(CaseServiceError::InvalidTransition { from, action }) => {
            assert_eq!(from, "aprovada");
            assert_eq!(action, "approve");
        }
        other => panic!("expected invalid transition, got {other:?}"),
    }
}

#[test]
fn approve_unknown_solicitation_is_not_found() {
    let (service, _, _) = build_service();

    assert!(matches!(
        service.approve(&RecordId("sol-missing".to_string())),
        Err(CaseServiceError::Repository(RepositoryError::NotFound))
    ));
}

#[tokio::test]
async fn convert_creates_linked_process_once() {
    let (service, repository, notifications) = build_service();
    let service = service.with_issuer(ProcessNumberIssuer::new(8, 26, 100));
    let record = service
        .submit(complete_submission("Maria Aparecida"))
        .await
        .expect("stored");

    let process = service.convert_to_process(&record.id).expect("converted");

    assert_eq!(process.status, ProcessStatus::EmAndamento);
    assert_eq!(process.tribunal, "TJSP");
    assert_eq!(process.court_body.as_deref(), Some("Vara Cível"));
    assert_eq!(process.subject.as_deref(), Some("Seguro-Defeso"));
    assert_eq!(process.solicitation_id.as_ref(), Some(&record.id));
    assert_eq!(process.documents, record.documents);
    assert_eq!(process.movements, Some(1));
    assert!(process.process_number.starts_with("0000001-"));
    assert!(is_valid_process_number(&process.process_number));
    let notes = process.lawyer_notes.as_deref().expect("origin notes");
    assert!(notes.contains(&format!("#{}", record.id)));
    assert!(notes.ends_with("Score IA: 100%"));

    let linked = repository
        .fetch_solicitation(&record.id)
        .expect("fetch")
        .expect("present");
    assert_eq!(linked.process_id.as_ref(), Some(&process.id));

    let last = notifications.events().pop().expect("process notification");
    assert_eq!(last.title, "Processo Criado");

    assert!(matches!(
        service.convert_to_process(&record.id),
        Err(CaseServiceError::InvalidTransition {
            action: "convert_to_process",
            ..
        })
    ));
    assert_eq!(repository.processes().expect("list").len(), 1);
}

#[tokio::test]
async fn concurrent_conversions_open_a_single_process() {
    let repository = Arc::new(SlowReadRepository::default());
    let service = CaseService::new(
        repository.clone(),
        Arc::new(MemoryNotifications::default()),
        EligibilityEngine::default(),
    );
    let record = service
        .submit(complete_submission("Maria Aparecida"))
        .await
        .expect("stored");

    let (service, id) = (&service, &record.id);
    let outcomes: Vec<_> = std::thread::scope(|scope| {
        let workers: Vec<_> = (0..2)
            .map(move |_| scope.spawn(move || service.convert_to_process(id)))
            .collect();
        workers
            .into_iter()
            .map(|worker| worker.join().expect("worker finished"))
            .collect()
    });

    assert_eq!(outcomes.iter().filter(|outcome| outcome.is_ok()).count(), 1);
    assert!(outcomes.iter().any(|outcome| matches!(
        outcome,
        Err(CaseServiceError::InvalidTransition {
            action: "convert_to_process",
            ..
        })
    )));
    assert_eq!(repository.processes().expect("list").len(), 1);
}

#[tokio::test]
async fn concurrent_approvals_apply_once() {
    use DocumentCategory::*;
    let repository = Arc::new(SlowReadRepository::default());
    let notifications = Arc::new(MemoryNotifications::default());
    let service = CaseService::new(
        repository.clone(),
        notifications.clone(),
        EligibilityEngine::default(),
    );
    let record = service
        .submit(submission("José", &[Rg]))
        .await
        .expect("stored");

    let (service, id) = (&service, &record.id);
    let approved = std::thread::scope(|scope| {
        let workers: Vec<_> = (0..2)
            .map(move |_| scope.spawn(move || service.approve(id)))
            .collect();
        workers
            .into_iter()
            .filter_map(|worker| worker.join().expect("worker finished").ok())
            .count()
    });

    assert_eq!(approved, 1);
    let status_changes = notifications
        .events()
        .iter()
        .filter(|event| event.kind == NotificationKind::StatusChange)
        .count();
    assert_eq!(status_changes, 1);
}

#[tokio::test]
async fn convert_requires_approved_status() {
    use DocumentCategory::*;
    let (service, repository, _) = build_service();
    let record = service
        .submit(submission("José", &[Rg]))
        .await
        .expect("stored");

    assert!(matches!(
        service.convert_to_process(&record.id),
        Err(CaseServiceError::InvalidTransition {
            from: "documentacao_incompleta",
            ..
        })
    ));
    assert!(repository.processes().expect("list").is_empty());
}

fn import(number: &str, name: &str) -> ProcessImport {
    ProcessImport {
        process_number: number.to_string(),
        claimant_name: name.to_string(),
        claimant_cpf: "98765432100".to_string(),
        tribunal: "TRF3".to_string(),
        court_body: Some("1º Juizado Especial Federal".to_string()),
        procedural_class: None,
        subject: None,
        situation: Some("Em andamento".to_string()),
        filed_on: None,
        movements: Some(7),
        last_movement: None,
    }
}

#[test]
fn register_process_imports_court_record() {
    let (service, _, notifications) = build_service();

    let process = service
        .register_process(import(" 5001234-56.2024.4.03.6104 ", "Carlos Alberto"))
        .expect("registered");

    assert_eq!(process.process_number, "5001234-56.2024.4.03.6104");
    assert_eq!(process.claimant.name, "Carlos Alberto");
    assert_eq!(process.claimant.cpf, "98765432100");
    assert_eq!(process.tribunal, "TRF3");
    assert!(process.solicitation_id.is_none());
    assert!(process
        .lawyer_notes
        .as_deref()
        .is_some_and(|notes| notes.starts_with("Processo importado automaticamente em ")));
    assert!(notifications.events().is_empty());
}

#[test]
fn register_process_validates_input() {
    let (service, _, _) = build_service();

    assert!(matches!(
        service.register_process(import("", "Carlos")),
        Err(CaseServiceError::InvalidInput(_))
    ));
    assert!(matches!(
        service.register_process(import("5001234-56.2024.4.03.6104", " ")),
        Err(CaseServiceError::EmptyClaimant)
    ));
}

#[test]
fn list_cases_reads_recorded_cases() {
    let (service, _, _) = build_service();
    for index in 0..12 {
        service
            .record_case(case(index, &format!("Pescador {index:02}"), CaseStatus::Pendente))
            .expect("recorded");
    }

    let page = service
        .list_cases(&ListQuery::default())
        .expect("listing succeeds");

    assert_eq!(page.total_items, 12);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.items.len(), 10);
    assert_eq!(page.items[0].claimant.name, "Pescador 11");
}
