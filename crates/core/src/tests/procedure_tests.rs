// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for procedure validation against the owning specialization.

use super::helpers::{
    M1, M2, create_test_new_fields, create_test_old_fields, create_test_service,
    create_test_specialization, domain_error,
};
use crate::{EngineConfig, ValidationService};
use sledz_domain::{
    DomainError, ErrorKind, ModuleId, OperatorCodes, OperatorGroups, Procedure, ProcedureFields,
    SmkVersion, Specialization, SpecializationId, SyncStatus, SyncTransition, approve, mark_synced,
};

#[test]
fn test_new_regime_requires_active_module_then_matching_module() {
    let service: ValidationService = create_test_service();
    let mut spec: Specialization = create_test_specialization(SmkVersion::New, None);

    let err: DomainError = domain_error(
        service
            .validate_procedure(&spec, &create_test_new_fields(M1, 5, 3))
            .unwrap_err(),
    );
    assert_eq!(
        err,
        DomainError::NoActiveModule {
            specialization: SpecializationId::new(42)
        }
    );
    assert_eq!(err.kind(), ErrorKind::StructuralInconsistency);

    spec.set_active_module(M1).unwrap();
    let accepted: Procedure = service
        .validate_procedure(&spec, &create_test_new_fields(M1, 5, 3))
        .unwrap();
    assert_eq!(accepted.module_id(), Some(M1));
    assert_eq!(accepted.sync_status(), SyncStatus::NotSynced);

    let err: DomainError = domain_error(
        service
            .validate_procedure(&spec, &create_test_new_fields(M2, 5, 3))
            .unwrap_err(),
    );
    assert_eq!(
        err,
        DomainError::ModuleMismatch {
            specialization: SpecializationId::new(42),
            procedure_module: M2,
            active_module: M1,
        }
    );
}

#[test]
fn test_new_regime_rejects_module_outside_specialization() {
    let service: ValidationService = create_test_service();
    let spec: Specialization = create_test_specialization(SmkVersion::New, Some(M1));

    let err: DomainError = domain_error(
        service
            .validate_procedure(&spec, &create_test_new_fields(ModuleId::new(99), 1, 0))
            .unwrap_err(),
    );
    assert!(matches!(err, DomainError::UnknownModule { .. }));
}

#[test]
fn test_new_regime_rejects_empty_aggregate() {
    let service: ValidationService = create_test_service();
    let spec: Specialization = create_test_specialization(SmkVersion::New, Some(M1));

    let err: DomainError = domain_error(
        service
            .validate_procedure(&spec, &create_test_new_fields(M1, 0, 0))
            .unwrap_err(),
    );
    assert_eq!(err, DomainError::EmptyAggregate);
}

#[test]
fn test_regime_decides_which_fields_are_legal() {
    let service: ValidationService = create_test_service();
    let old: Specialization = create_test_specialization(SmkVersion::Old, None);

    let err: DomainError = domain_error(
        service
            .validate_procedure(&old, &create_test_new_fields(M1, 5, 3))
            .unwrap_err(),
    );
    assert!(matches!(
        err,
        DomainError::ForeignRegimeFields {
            regime: SmkVersion::Old,
            ..
        }
    ));
}

#[test]
fn test_old_regime_operator_codes() {
    let service: ValidationService = create_test_service();
    let spec: Specialization = create_test_specialization(SmkVersion::Old, None);

    assert!(
        service
            .validate_procedure(&spec, &create_test_old_fields("C", 1))
            .is_err()
    );
    assert!(
        service
            .validate_procedure(&spec, &create_test_old_fields("A", 1))
            .is_ok()
    );
}

#[test]
fn test_configured_operator_codes_are_used() {
    let config: EngineConfig = EngineConfig {
        operator_codes: OperatorCodes::new(["A", "B", "C"]).unwrap(),
        ..EngineConfig::default()
    };
    let service: ValidationService = ValidationService::new(config);
    let spec: Specialization = create_test_specialization(SmkVersion::Old, None);

    assert!(
        service
            .validate_procedure(&spec, &create_test_old_fields("C", 1))
            .is_ok()
    );
}

#[test]
fn test_old_regime_year_rules() {
    let service: ValidationService = create_test_service();
    let spec: Specialization = create_test_specialization(SmkVersion::Old, None);

    for year in [-1, 7] {
        assert!(
            service
                .validate_procedure(&spec, &create_test_old_fields("A", year))
                .is_err()
        );
    }
    assert!(
        service
            .validate_procedure(&spec, &create_test_old_fields("A", 0))
            .is_ok()
    );

    let scoped: Specialization = create_test_specialization(SmkVersion::Old, Some(M2));
    assert!(
        service
            .validate_procedure(&scoped, &create_test_old_fields("A", 2))
            .is_err()
    );
    assert!(
        service
            .validate_procedure(&scoped, &create_test_old_fields("A", 4))
            .is_ok()
    );
}

#[test]
fn test_update_counts_on_synced_procedure() {
    let service: ValidationService = create_test_service();
    let spec: Specialization = create_test_specialization(SmkVersion::New, Some(M1));
    let mut procedure: Procedure = service
        .validate_procedure(&spec, &create_test_new_fields(M1, 5, 3))
        .unwrap();
    mark_synced(&mut procedure);

    let transition: SyncTransition = service
        .update_procedure_counts(&spec, &mut procedure, 8, 5)
        .unwrap();

    assert_eq!(transition.from, SyncStatus::Synced);
    assert_eq!(transition.to, SyncStatus::Modified);
    assert_eq!(procedure.group_counts(&OperatorGroups::default()), (8, 5));
}

#[test]
fn test_update_counts_after_module_switch_is_rejected() {
    let service: ValidationService = create_test_service();
    let mut spec: Specialization = create_test_specialization(SmkVersion::New, Some(M1));
    let mut procedure: Procedure = service
        .validate_procedure(&spec, &create_test_new_fields(M1, 5, 3))
        .unwrap();

    spec.set_active_module(M2).unwrap();

    let err: DomainError = domain_error(
        service
            .update_procedure_counts(&spec, &mut procedure, 8, 5)
            .unwrap_err(),
    );
    assert!(matches!(err, DomainError::ModuleMismatch { .. }));
    assert_eq!(procedure.group_counts(&OperatorGroups::default()), (5, 3));
}

#[test]
fn test_update_procedure_is_all_or_nothing() {
    let service: ValidationService = create_test_service();
    let spec: Specialization = create_test_specialization(SmkVersion::Old, Some(M1));
    let mut procedure: Procedure = service
        .validate_procedure(&spec, &create_test_old_fields("A", 1))
        .unwrap();
    mark_synced(&mut procedure);
    let before: Procedure = procedure.clone();

    // Year 5 is a valid training year but outside the active module.
    let changes: ProcedureFields = ProcedureFields {
        year: Some(5),
        ..ProcedureFields::default()
    };
    assert!(
        service
            .update_procedure(&spec, &mut procedure, &changes)
            .is_err()
    );
    assert_eq!(procedure, before);

    let changes: ProcedureFields = ProcedureFields {
        year: Some(2),
        ..ProcedureFields::default()
    };
    service
        .update_procedure(&spec, &mut procedure, &changes)
        .unwrap();
    assert_eq!(procedure.year(), Some(2));
    assert_eq!(procedure.sync_status(), SyncStatus::Modified);
}

#[test]
fn test_update_procedure_rejects_other_regime() {
    let service: ValidationService = create_test_service();
    let new_spec: Specialization = create_test_specialization(SmkVersion::New, Some(M1));
    let old_spec: Specialization = create_test_specialization(SmkVersion::Old, None);
    let mut procedure: Procedure = service
        .validate_procedure(&new_spec, &create_test_new_fields(M1, 5, 3))
        .unwrap();

    let err: DomainError = domain_error(
        service
            .update_procedure(&old_spec, &mut procedure, &ProcedureFields::default())
            .unwrap_err(),
    );
    assert!(matches!(err, DomainError::ProcedureRegimeMismatch { .. }));
}

#[test]
fn test_approved_procedure_is_state_conflict() {
    let service: ValidationService = create_test_service();
    let spec: Specialization = create_test_specialization(SmkVersion::New, Some(M1));
    let mut procedure: Procedure = service
        .validate_procedure(&spec, &create_test_new_fields(M1, 5, 3))
        .unwrap();
    approve(&mut procedure);
    let before: Procedure = procedure.clone();

    let err: DomainError = domain_error(
        service
            .update_procedure_counts(&spec, &mut procedure, 8, 5)
            .unwrap_err(),
    );
    assert_eq!(err.kind(), ErrorKind::StateConflict);
    assert_eq!(procedure, before);
}

#[test]
fn test_new_regime_listing_is_scoped_to_active_module() {
    let service: ValidationService = create_test_service();
    let mut spec: Specialization = create_test_specialization(SmkVersion::New, Some(M1));
    let first: Procedure = service
        .validate_procedure(&spec, &create_test_new_fields(M1, 5, 3))
        .unwrap();
    spec.set_active_module(M2).unwrap();
    let second: Procedure = service
        .validate_procedure(&spec, &create_test_new_fields(M2, 1, 1))
        .unwrap();
    let procedures: Vec<Procedure> = vec![first, second];

    let visible: Vec<&Procedure> = service.visible_procedures(&spec, &procedures);
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].module_id(), Some(M2));

    spec.clear_active_module();
    assert!(service.visible_procedures(&spec, &procedures).is_empty());
}

#[test]
fn test_old_regime_listing_is_unscoped() {
    let service: ValidationService = create_test_service();
    let spec: Specialization = create_test_specialization(SmkVersion::Old, Some(M1));
    let procedures: Vec<Procedure> = vec![
        service
            .validate_procedure(&spec, &create_test_old_fields("A", 1))
            .unwrap(),
        service
            .validate_procedure(&spec, &create_test_old_fields("B", 0))
            .unwrap(),
    ];

    assert_eq!(service.visible_procedures(&spec, &procedures).len(), 2);
}

#[test]
fn test_approved_procedure_reports_state_conflict_before_module_mismatch() {
    let service: ValidationService = create_test_service();
    let mut spec: Specialization = create_test_specialization(SmkVersion::New, Some(M1));
    let mut procedure: Procedure = service
        .validate_procedure(&spec, &create_test_new_fields(M1, 5, 3))
        .unwrap();
    approve(&mut procedure);
    spec.set_active_module(M2).unwrap();

    let err: DomainError = domain_error(
        service
            .update_procedure_counts(&spec, &mut procedure, 8, 5)
            .unwrap_err(),
    );
    assert_eq!(err.kind(), ErrorKind::StateConflict);

    let err: DomainError = domain_error(
        service
            .update_procedure(&spec, &mut procedure, &ProcedureFields::default())
            .unwrap_err(),
    );
    assert_eq!(err.kind(), ErrorKind::StateConflict);
}
