// End-to-end scenarios across the gate, state machine, derivation and sync
use crate::{
    engine::{
        access::{AccessGate, ManagerScopePolicy},
        derivation::derive_tasks,
        events::{EventBus, WorkflowEventKind},
        service::ProcessService,
        storage::{InMemoryStorage, ProcessStore},
        sync::SyncConfig,
        workflow::{SubmitOutcome, WorkflowEngine},
    },
    models::{Actor, FieldData, Process, ProcessType, Role, Task},
    HrWorkflowError,
};

use serde_json::{json, Value};
use std::{sync::Arc, time::Duration};
use tokio::sync::broadcast::error::TryRecvError;
use tokio_test::{assert_err, assert_ok};

// Test helpers
fn payload(pairs: &[(&str, Value)]) -> FieldData {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn is_done(tasks: &[Task], id: &str) -> bool {
    tasks
        .iter()
        .find(|t| t.id.as_str() == id)
        .map(|t| t.is_completed)
        .unwrap_or_else(|| panic!("no task {}", id))
}

fn marketing_manager() -> Actor {
    Actor::new(Role::Manager).with_department("Marketing")
}

/// Admission process after HR's submit in scenario A
fn admission_at_manager_step(engine: &WorkflowEngine) -> Process {
    let mut process = Process::new(ProcessType::Admission, "Admission - Ana Silva");
    assert_ok!(engine.submit_step(
        &mut process,
        &Actor::new(Role::Hr),
        payload(&[
            ("fullName", json!("Ana Silva")),
            ("displayName", json!("Ana")),
            ("department", json!("Marketing")),
            ("roleTitle", json!("Analyst")),
        ]),
    ));
    process
}

#[test]
fn scenario_a_hr_submit_hands_off_to_manager() {
    let engine = WorkflowEngine::default();
    let process = admission_at_manager_step(&engine);

    assert_eq!(process.current_step(), 2);
    assert!(is_done(process.tasks(), "admission.personal_data"));
    assert!(is_done(process.tasks(), "admission.department_role"));
    assert!(!is_done(process.tasks(), "admission.dates"));

    for task in process.tasks().iter().filter(|t| t.owner_role != Role::Hr) {
        assert!(!task.is_completed, "{} should still be open", task.id);
    }
}

#[test]
fn scenario_b_manager_submit_keeps_hr_progress() {
    let engine = WorkflowEngine::default();
    let mut process = admission_at_manager_step(&engine);

    let receipt = assert_ok!(engine.submit_step(
        &mut process,
        &marketing_manager(),
        payload(&[("requestedEquipment", json!(["Notebook"]))]),
    ));

    assert_eq!(
        receipt.outcome,
        SubmitOutcome::HandedOff {
            from_step: 2,
            to_step: 3,
            to_role: Role::It
        }
    );
    assert_eq!(process.current_step(), 3);
    assert!(is_done(process.tasks(), "admission.equipment_request"));
    assert!(is_done(process.tasks(), "admission.personal_data"));
    assert!(is_done(process.tasks(), "admission.department_role"));
}

#[test]
fn scenario_c_it_cannot_edit_manager_step() {
    let engine = WorkflowEngine::default();
    let mut process = admission_at_manager_step(&engine);
    let before = process.clone();

    let err = assert_err!(engine.edit_field(
        &mut process,
        &Actor::new(Role::It),
        "adAccountCreated",
        json!("Yes"),
    ));

    assert!(matches!(err, HrWorkflowError::PermissionDenied { role: Role::It, step: 2, .. }));
    assert_eq!(process.field_data(), before.field_data());
    assert_eq!(process.current_step(), 2);
}

#[test]
fn scenario_d_demission_it_revocations() {
    let engine = WorkflowEngine::new(AccessGate::new(ManagerScopePolicy::RoleOnly));
    let mut process = Process::new(ProcessType::Demission, "Demission - Bruno Costa");

    assert_ok!(engine.submit_step(&mut process, &Actor::new(Role::Hr), payload(&[("fullName", json!("Bruno Costa"))])));
    assert_ok!(engine.submit_step(&mut process, &Actor::new(Role::Manager), FieldData::new()));
    assert_eq!(process.current_step(), 3);

    let it = Actor::new(Role::It);
    assert_ok!(engine.edit_field(&mut process, &it, "accountDisabled", json!(true)));
    let receipt = assert_ok!(engine.edit_field(&mut process, &it, "emailDisabled", json!(true)));
    assert_eq!(receipt.newly_completed.len(), 1);

    assert!(is_done(process.tasks(), "demission.ad_account_disabled"));
    assert!(is_done(process.tasks(), "demission.email_disabled"));
    assert!(!is_done(process.tasks(), "demission.equipment_returned"));
    assert!(!is_done(process.tasks(), "demission.vpn_revoked"));
}

#[test]
fn personal_data_task_depends_only_on_its_fields() {
    let noise = [("buddyMentor", json!("Carla")), ("vpnConfigured", json!("Yes")), ("hrNotes", json!(""))];
    let values = [None, Some(json!("")), Some(json!("x"))];

    for full_name in &values {
        for display_name in &values {
            for tax_id in &values {
                let mut data = FieldData::new();
                for (name, value) in [("fullName", full_name), ("displayName", display_name), ("taxId", tax_id)] {
                    if let Some(value) = value {
                        data.insert(name.to_string(), value.clone());
                    }
                }

                let filled = |v: &Option<Value>| matches!(v, Some(Value::String(s)) if !s.is_empty());
                let expected = filled(full_name) && (filled(display_name) || filled(tax_id));

                assert_eq!(is_done(&derive_tasks(ProcessType::Admission, &data), "admission.personal_data"), expected);

                for (name, value) in &noise {
                    data.insert(name.to_string(), value.clone());
                }
                assert_eq!(is_done(&derive_tasks(ProcessType::Admission, &data), "admission.personal_data"), expected);
            }
        }
    }
}

#[test]
fn step_is_monotonic_under_any_submit_sequence() {
    let engine = WorkflowEngine::new(AccessGate::new(ManagerScopePolicy::RoleOnly));
    let actors = [Role::It, Role::Hr, Role::Admin, Role::Employee, Role::Manager, Role::Payroll, Role::Unrecognized];

    for process_type in ProcessType::ALL {
        let mut process = Process::new(process_type, "x");
        let mut last_step = process.current_step();

        for round in 0..40 {
            let role = actors[(round * 3 + round / 5) % actors.len()];
            let _ = engine.submit_step(&mut process, &Actor::new(role), FieldData::new());

            assert!(process.current_step() >= last_step);
            assert!(process.current_step() <= process.step_count());
            last_step = process.current_step();
        }
    }
}

#[test]
fn non_owners_never_change_a_process() {
    let engine = WorkflowEngine::default();

    for process_type in ProcessType::ALL {
        let template = crate::flows::template_for(process_type);
        let mut process = Process::new(process_type, "x");

        for step in &template.steps {
            for role in Role::STEP_OWNERS.iter().chain([Role::Unrecognized].iter()) {
                if *role == step.owner_role {
                    continue;
                }
                let actor = Actor::new(*role).with_department("Marketing");
                let before = process.clone();

                for _ in 0..3 {
                    assert!(engine.edit_field(&mut process, &actor, "hrNotes", json!("sneaky")).is_err());
                    assert!(engine
                        .submit_step(&mut process, &actor, payload(&[("itNotes", json!("sneaky"))]))
                        .is_err());
                }
                assert_eq!(process, before);
            }

            // The rightful owner moves it on
            let owner = Actor::new(step.owner_role).with_department("Marketing");
            let owner_payload = payload(&[("department", json!("Marketing"))]);
            assert_ok!(engine.submit_step(&mut process, &owner, owner_payload));
        }
        assert!(process.is_complete());
    }
}

#[test]
fn derivation_is_idempotent_on_live_process() {
    let engine = WorkflowEngine::default();
    let process = admission_at_manager_step(&engine);
    let again = derive_tasks(process.process_type(), process.field_data());
    assert_eq!(again, process.tasks());
    assert_eq!(again, derive_tasks(process.process_type(), process.field_data()));
}

#[tokio::test(start_paused = true)]
async fn burst_of_edits_is_written_once_with_last_value() {
    let storage = Arc::new(InMemoryStorage::new());
    let events = EventBus::default();
    let mut receiver = events.subscribe();
    let service = ProcessService::new(storage.clone(), AccessGate::default(), SyncConfig::from_millis(1000), events);

    let id = service.create_process(ProcessType::Admission, "Ana").await.unwrap().id();
    let hr = Actor::new(Role::Hr);

    for i in 1..=5 {
        service
            .edit_field(&id, &hr, "fullName", json!(format!("Ana {}", i)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    tokio::time::sleep(Duration::from_millis(2000)).await;

    let mut persisted = 0;
    loop {
        match receiver.try_recv() {
            Ok(event) => {
                if event.kind == WorkflowEventKind::SyncPersisted {
                    persisted += 1;
                }
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            Err(TryRecvError::Lagged(_)) => continue,
        }
    }
    assert_eq!(persisted, 1);

    let stored = storage.get_process(&id).await.unwrap().unwrap();
    assert_eq!(stored.data.get("fullName"), Some(&json!("Ana 5")));
}
