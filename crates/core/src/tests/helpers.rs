// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{CoreError, EngineConfig, ValidationService};
use sledz_domain::{
    DomainError, Module, ModuleId, ModuleRequirements, ProcedureFields, ShiftDetails, SmkVersion,
    Specialization, SpecializationId,
};
use time::macros::date;

pub const M1: ModuleId = ModuleId::new(1);
pub const M2: ModuleId = ModuleId::new(2);

pub fn create_test_service() -> ValidationService {
    ValidationService::new(EngineConfig::default())
}

pub fn create_test_requirements() -> ModuleRequirements {
    ModuleRequirements {
        procedures_a: 30,
        procedures_b: 20,
        internships: 2,
        courses: 4,
        shift_hours: 200,
    }
}

/// Basic module (years 1-2) and specialistic module (years 3-6).
pub fn create_test_specialization(
    smk_version: SmkVersion,
    active_module: Option<ModuleId>,
) -> Specialization {
    let basic: Module = Module::new(
        M1,
        "Moduł podstawowy",
        smk_version,
        1,
        (1, 2),
        create_test_requirements(),
    )
    .unwrap();
    let specialistic: Module = Module::new(
        M2,
        "Moduł specjalistyczny",
        smk_version,
        2,
        (3, 6),
        create_test_requirements(),
    )
    .unwrap();

    Specialization::new(
        SpecializationId::new(42),
        "Choroby wewnętrzne",
        smk_version,
        date!(2023 - 10 - 01),
        vec![basic, specialistic],
        active_module,
    )
    .unwrap()
}

pub fn create_test_new_fields(module_id: ModuleId, count_a: i32, count_b: i32) -> ProcedureFields {
    ProcedureFields {
        date: Some(date!(2024 - 02 - 14)),
        code: Some(String::from("88.72")),
        location: Some(String::from("Pracownia echokardiografii")),
        module_id: Some(module_id),
        procedure_name: Some(String::from("Echokardiografia przezklatkowa")),
        count_a: Some(count_a),
        count_b: Some(count_b),
        institution: Some(String::from("Szpital Uniwersytecki")),
        ..ProcedureFields::default()
    }
}

pub fn create_test_old_fields(operator_code: &str, year: i32) -> ProcedureFields {
    ProcedureFields {
        date: Some(date!(2018 - 04 - 09)),
        code: Some(String::from("88.72")),
        location: Some(String::from("Pracownia echokardiografii")),
        operator_code: Some(String::from(operator_code)),
        performing_person: Some(String::from("lek. Nowak")),
        patient_initials: Some(String::from("AB")),
        year: Some(year),
        ..ProcedureFields::default()
    }
}

pub fn create_test_shift_details(hours: i32, minutes: i32, year: i32) -> ShiftDetails {
    ShiftDetails {
        date: date!(2024 - 03 - 02),
        hours,
        minutes,
        location: String::from("Izba przyjęć"),
        year,
    }
}

/// Extracts the domain error from a service failure.
pub fn domain_error(err: CoreError) -> DomainError {
    match err {
        CoreError::DomainViolation(err) => err,
        CoreError::Config(err) => panic!("expected a domain violation, got {err}"),
    }
}
