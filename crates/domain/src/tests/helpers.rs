// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    Module, ModuleId, ModuleRequirements, OperatorCodes, ProcedureFields, SmkVersion,
    Specialization, SpecializationId,
};
use time::macros::date;

pub fn create_test_requirements() -> ModuleRequirements {
    ModuleRequirements {
        procedures_a: 20,
        procedures_b: 10,
        internships: 3,
        courses: 2,
        shift_hours: 120,
    }
}

pub fn create_test_module(id: i64, smk_version: SmkVersion, range: (i32, i32)) -> Module {
    let ordinal: u8 = u8::try_from(id).unwrap();
    Module::new(
        ModuleId::new(id),
        &format!("Module {id}"),
        smk_version,
        ordinal,
        range,
        create_test_requirements(),
    )
    .unwrap()
}

/// Two-module program: basic years 1-2, specialistic years 3-6.
pub fn create_test_specialization(
    smk_version: SmkVersion,
    active_module: Option<i64>,
) -> Specialization {
    Specialization::new(
        SpecializationId::new(7),
        "Kardiologia",
        smk_version,
        date!(2023 - 10 - 01),
        vec![
            create_test_module(1, smk_version, (1, 2)),
            create_test_module(2, smk_version, (3, 6)),
        ],
        active_module.map(ModuleId::new),
    )
    .unwrap()
}

pub fn create_test_new_fields(module_id: i64, count_a: i32, count_b: i32) -> ProcedureFields {
    ProcedureFields {
        date: Some(date!(2024 - 11 - 20)),
        code: Some(String::from("89.52")),
        location: Some(String::from("Oddział kardiologii")),
        module_id: Some(ModuleId::new(module_id)),
        procedure_name: Some(String::from("Elektrokardiografia")),
        count_a: Some(count_a),
        count_b: Some(count_b),
        supervisor: Some(String::from("dr hab. Kowalska")),
        ..ProcedureFields::default()
    }
}

pub fn create_test_old_fields(operator_code: &str, year: i32) -> ProcedureFields {
    ProcedureFields {
        date: Some(date!(2019 - 05 - 14)),
        code: Some(String::from("89.52")),
        location: Some(String::from("Oddział kardiologii")),
        operator_code: Some(String::from(operator_code)),
        patient_initials: Some(String::from("MW")),
        year: Some(year),
        ..ProcedureFields::default()
    }
}

pub fn create_test_operator_codes() -> OperatorCodes {
    OperatorCodes::default()
}
