use std::sync::{Arc, Barrier};
use std::thread;

use super::common::*;
use crate::datasets::{MunicipalityCode, StaticDatasetProvider};
use crate::registry::domain::{
    NewRevenda, RevendaUpdate, TerritoryId, TerritoryKind, ValidationError, VendedorUpdate,
};
use crate::registry::repository::RepositoryError;
use crate::registry::{TerritoryService, TerritoryServiceError};

#[test]
fn ids_come_from_one_sequence_across_both_registries() {
    let service = build_service();
    let revenda = service
        .create_revenda(revenda_payload("12.345.678/0001-90"))
        .expect("revenda created");
    let vendedor = service
        .create_vendedor(vendedor_payload("ana@example.com", "000.000.000-00"))
        .expect("vendedor created");

    assert_eq!(revenda.id, TerritoryId(1));
    assert_eq!(vendedor.id, TerritoryId(2));
}

#[test]
fn duplicate_cnpj_is_rejected_until_the_holder_is_deactivated() {
    let service = build_service();
    let first = service
        .create_revenda(revenda_payload("12.345.678/0001-90"))
        .expect("first revenda");

    let error = service
        .create_revenda(revenda_payload("12.345.678/0001-90"))
        .unwrap_err();
    assert!(matches!(error, TerritoryServiceError::Duplicate("CNPJ")));
    assert_eq!(error.to_string(), "CNPJ já cadastrado");

    service.deactivate_revenda(first.id).expect("deactivated");
    service
        .create_revenda(revenda_payload("12.345.678/0001-90"))
        .expect("cnpj free again");
}

#[test]
fn rejected_payloads_do_not_consume_ids() {
    let service = build_service();
    service
        .create_revenda(NewRevenda {
            cnpj: String::new(),
            ..revenda_payload("unused")
        })
        .unwrap_err();
    service
        .create_revenda(revenda_payload("12.345.678/0001-90"))
        .expect("first revenda");
    service
        .create_revenda(revenda_payload("12.345.678/0001-90"))
        .unwrap_err();

    let vendedor = service
        .create_vendedor(vendedor_payload("ana@example.com", "111"))
        .expect("vendedor created");
    assert_eq!(vendedor.id, TerritoryId(2));
}

#[test]
fn concurrent_registrations_keep_cnpj_unique() {
    const WRITERS: usize = 8;

    for round in 0..50 {
        let service = Arc::new(build_service());
        let barrier = Arc::new(Barrier::new(WRITERS));
        let cnpj = format!("11.111.111/0001-{round:02}");

        let handles: Vec<_> = (0..WRITERS)
            .map(|_| {
                let service = Arc::clone(&service);
                let barrier = Arc::clone(&barrier);
                let cnpj = cnpj.clone();
                thread::spawn(move || {
                    barrier.wait();
                    service.create_revenda(revenda_payload(&cnpj)).is_ok()
                })
            })
            .collect();
        let created = handles
            .into_iter()
            .map(|handle| handle.join().expect("writer thread"))
            .filter(|created| *created)
            .count();

        assert_eq!(created, 1, "round {round}");
        assert_eq!(service.list_revendas().expect("listing").len(), 1);
    }
}

#[test]
fn concurrent_updates_cannot_steal_a_taken_cpf() {
    let service = Arc::new(build_service());
    let first = service
        .create_vendedor(vendedor_payload("ana@example.com", "111"))
        .expect("first vendedor");
    let second = service
        .create_vendedor(vendedor_payload("bia@example.com", "222"))
        .expect("second vendedor");
    let barrier = Arc::new(Barrier::new(2));

    let handles: Vec<_> = [first.id, second.id]
        .into_iter()
        .map(|id| {
            let service = Arc::clone(&service);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                service.update_vendedor(
                    id,
                    VendedorUpdate {
                        cpf: Some("333".to_string()),
                        ..VendedorUpdate::default()
                    },
                )
            })
        })
        .collect();
    let succeeded = handles
        .into_iter()
        .map(|handle| handle.join().expect("writer thread"))
        .filter(Result::is_ok)
        .count();

    assert_eq!(succeeded, 1);
    let holders = service
        .list_vendedores()
        .expect("listing")
        .into_iter()
        .filter(|vendedor| vendedor.cpf == "333")
        .count();
    assert_eq!(holders, 1);
}

#[test]
fn vendedor_uniqueness_covers_email_and_cpf() {
    let service = build_service();
    service
        .create_vendedor(vendedor_payload("ana@example.com", "111"))
        .expect("first vendedor");

    let same_email = service
        .create_vendedor(vendedor_payload("ana@example.com", "222"))
        .unwrap_err();
    let same_cpf = service
        .create_vendedor(vendedor_payload("bia@example.com", "111"))
        .unwrap_err();

    assert!(matches!(same_email, TerritoryServiceError::Duplicate("E-mail")));
    assert!(matches!(same_cpf, TerritoryServiceError::Duplicate("CPF")));
}

#[test]
fn listings_hide_deactivated_records_but_get_still_finds_them() {
    let service = build_service();
    let kept = service
        .create_revenda(revenda_payload("1"))
        .expect("kept revenda");
    let removed = service
        .create_revenda(revenda_payload("2"))
        .expect("removed revenda");

    service.deactivate_revenda(removed.id).expect("deactivated");

    let listed: Vec<TerritoryId> = service
        .list_revendas()
        .expect("listing")
        .into_iter()
        .map(|revenda| revenda.id)
        .collect();
    assert_eq!(listed, vec![kept.id]);
    assert!(!service.get_revenda(removed.id).expect("still stored").ativo);
}

#[test]
fn failed_update_leaves_the_stored_record_untouched() {
    let service = build_service();
    let vendedor = service
        .create_vendedor(vendedor_payload("ana@example.com", "111"))
        .expect("vendedor created");

    let error = service
        .update_vendedor(
            vendedor.id,
            VendedorUpdate {
                nome: Some("Ana Lima".to_string()),
                municipios: Some(Vec::new()),
                ..VendedorUpdate::default()
            },
        )
        .unwrap_err();

    assert!(matches!(
        error,
        TerritoryServiceError::Validation(ValidationError::NoMunicipalities)
    ));
    assert_eq!(
        service.get_vendedor(vendedor.id).expect("stored").nome,
        "Ana Souza"
    );
}

#[test]
fn update_replaces_the_municipality_list() {
    let service = build_service();
    let revenda = service
        .create_revenda(revenda_payload("1"))
        .expect("revenda created");

    let updated = service
        .update_revenda(
            revenda.id,
            RevendaUpdate {
                municipios: Some(vec![MunicipalityCode::from(CUIABA)]),
                ..RevendaUpdate::default()
            },
        )
        .expect("updated");

    assert_eq!(updated.municipios, vec![MunicipalityCode::from(CUIABA)]);
    assert_eq!(updated.created_at, revenda.created_at);
    assert!(updated.updated_at >= revenda.updated_at);
}

#[test]
fn unknown_ids_report_not_found_per_registry() {
    let service = build_service();

    let revenda = service.analyze_revenda_potential(TerritoryId(42)).unwrap_err();
    let vendedor = service.deactivate_vendedor(TerritoryId(42)).unwrap_err();

    assert_eq!(revenda.to_string(), "Revenda não encontrada");
    assert!(matches!(
        vendedor,
        TerritoryServiceError::NotFound(TerritoryKind::Vendedor)
    ));
    assert_eq!(vendedor.to_string(), "Vendedor não encontrado");
}

#[test]
fn territory_analysis_matches_an_ad_hoc_selection() {
    let service = build_service();
    let revenda = service
        .create_revenda(revenda_payload("1"))
        .expect("revenda created");

    let by_id = service
        .analyze_revenda_potential(revenda.id)
        .expect("analysis");
    let ad_hoc = service.analyze_municipalities(&revenda.municipios.iter().cloned().collect());

    assert_eq!(by_id, ad_hoc);
    assert_eq!(by_id.crops_diversity, 2);
    assert!(!by_id.degraded);
}

#[test]
fn commercial_report_describes_the_vendedor() {
    let service = build_service();
    let vendedor = service
        .create_vendedor(vendedor_payload("ana@example.com", "111"))
        .expect("vendedor created");

    let report = service.commercial_vendedor(vendedor.id).expect("report");

    assert_eq!(report.context.heading, "Informações do Vendedor");
    assert_eq!(report.context.name, "Ana Souza");
    assert_eq!(report.context.municipality_count, 1);
    assert!(report
        .context
        .profile
        .contains(&("CPF".to_string(), "111".to_string())));
    assert_eq!(report.analysis.municipios_data[0].name, "Sorriso");
    assert_eq!(report.analysis.financial_data.saldo, 600_000.0);
}

#[test]
fn categories_reject_unknown_dataset_keys() {
    let service = build_service();

    let (kind, names) = service.categories("fertilizers").expect("known dataset");
    assert_eq!(kind.key(), "fertilizers");
    assert_eq!(
        names,
        vec!["Adubação orgânica", "Adubação química", "Total Estabelecimentos"]
    );

    let error = service.categories("soja").unwrap_err();
    assert_eq!(error.status_code(), axum::http::StatusCode::NOT_FOUND);
}

#[test]
fn repository_outage_surfaces_as_repository_error() {
    let service = TerritoryService::new(
        Arc::new(UnavailableStore),
        Arc::new(UnavailableStore),
        Arc::new(StaticDatasetProvider::new(catalog())),
    );

    let error = service.create_revenda(revenda_payload("1")).unwrap_err();

    assert!(matches!(
        error,
        TerritoryServiceError::Repository(RepositoryError::Unavailable(_))
    ));
    assert_eq!(
        error.status_code(),
        axum::http::StatusCode::INTERNAL_SERVER_ERROR
    );
}
