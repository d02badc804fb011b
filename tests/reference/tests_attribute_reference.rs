//! Attribute-valued references: `sequenceFlow/@sourceRef` and the QName
//! variant `participant/@processRef`.

use crate::helpers::diagram::Diagram;
use rstest::rstest;
use xref::{ModelError, Reference, ScalarReference};

// =============================================================================
// RESOLUTION
// =============================================================================

#[test]
fn test_set_target_then_resolve() {
    let mut d = Diagram::new();
    let registry = d.registry();
    let source_ref = &registry[d.refs.source_ref];
    let task = d.add_task("Task_1");
    let flow = d.add_flow("Flow_1");

    source_ref.set_target(&mut d.model, flow, task).unwrap();

    assert_eq!(d.model.attribute(flow, "sourceRef"), Some("Task_1"));
    assert_eq!(
        source_ref.resolve_identifier(&d.model, flow).unwrap(),
        Some("Task_1".to_owned())
    );
    assert_eq!(source_ref.resolve_target(&d.model, flow).unwrap(), Some(task));
}

#[test]
fn test_unset_reference_resolves_to_none() {
    let mut d = Diagram::new();
    let registry = d.registry();
    let source_ref = &registry[d.refs.source_ref];
    let flow = d.add_flow("Flow_1");

    assert_eq!(source_ref.resolve_identifier(&d.model, flow).unwrap(), None);
    assert_eq!(source_ref.resolve_target(&d.model, flow).unwrap(), None);
}

#[test]
fn test_clear_target_removes_attribute() {
    let mut d = Diagram::new();
    let registry = d.registry();
    let source_ref = &registry[d.refs.source_ref];
    let task = d.add_task("Task_1");
    let flow = d.add_flow("Flow_1");
    source_ref.set_target(&mut d.model, flow, task).unwrap();

    source_ref.clear_target(&mut d.model, flow).unwrap();

    assert_eq!(d.model.attribute(flow, "sourceRef"), None);
    assert_eq!(source_ref.resolve_target(&d.model, flow).unwrap(), None);
}

#[test]
fn test_subtype_target_is_accepted() {
    let mut d = Diagram::new();
    let registry = d.registry();
    let target_ref = &registry[d.refs.target_ref];
    let process = d.process;
    let start = d.add(process, "startEvent", "Start_1");
    let flow = d.add_flow("Flow_1");

    target_ref.set_target(&mut d.model, flow, start).unwrap();
    assert_eq!(target_ref.resolve_target(&d.model, flow).unwrap(), Some(start));
}

#[test]
fn test_dangling_identifier_is_not_found() {
    let mut d = Diagram::new();
    let registry = d.registry();
    let source_ref = &registry[d.refs.source_ref];
    let flow = d.add_flow("Flow_1");
    d.model.set_attribute(flow, "sourceRef", "Missing").unwrap();

    assert_eq!(
        source_ref.resolve_target(&d.model, flow),
        Err(ModelError::NotFound {
            identifier: "Missing".into()
        })
    );
}

#[test]
fn test_wrong_target_type_is_a_mismatch() {
    let mut d = Diagram::new();
    let registry = d.registry();
    let source_ref = &registry[d.refs.source_ref];
    let store = d.add_data_store("Store_1");
    let flow = d.add_flow("Flow_1");
    d.model.set_attribute(flow, "sourceRef", "Store_1").unwrap();

    assert_eq!(
        source_ref.resolve_target(&d.model, flow),
        Err(ModelError::TypeMismatch {
            identifier: "Store_1".into(),
            expected: "flowNode".into(),
            found: "dataStore".into(),
        })
    );
    assert!(matches!(
        source_ref.set_target(&mut d.model, flow, store),
        Err(ModelError::TypeMismatch { .. })
    ));
}

#[test]
fn test_source_of_wrong_type_is_rejected() {
    let mut d = Diagram::new();
    let registry = d.registry();
    let source_ref = &registry[d.refs.source_ref];
    let task = d.add_task("Task_1");

    assert!(matches!(
        source_ref.resolve_identifier(&d.model, task),
        Err(ModelError::WrongSourceType { .. })
    ));
}

// =============================================================================
// CONNECTIVITY
// =============================================================================

#[rstest]
#[case::detached_with_fresh_id(false)]
#[case::detached_shadowing_attached_id(true)]
fn test_set_target_requires_connected_target(#[case] shadow: bool) {
    let mut d = Diagram::new();
    let registry = d.registry();
    let source_ref = &registry[d.refs.source_ref];
    let flow = d.add_flow("Flow_1");
    if shadow {
        d.add_task("Task_1");
    }
    let detached = d.detached("task", "Task_1");

    assert_eq!(
        source_ref.set_target(&mut d.model, flow, detached),
        Err(ModelError::NotConnected { element: detached })
    );
    assert_eq!(d.model.attribute(flow, "sourceRef"), None);
}

#[test]
fn test_not_connected_leaves_previous_target() {
    let mut d = Diagram::new();
    let registry = d.registry();
    let source_ref = &registry[d.refs.source_ref];
    let task = d.add_task("Task_1");
    let flow = d.add_flow("Flow_1");
    source_ref.set_target(&mut d.model, flow, task).unwrap();
    let detached = d.detached("task", "Task_2");

    assert!(source_ref.set_target(&mut d.model, flow, detached).is_err());
    assert_eq!(d.model.attribute(flow, "sourceRef"), Some("Task_1"));
}

// =============================================================================
// PROPAGATION
// =============================================================================

#[test]
fn test_rename_updates_reference() {
    let mut d = Diagram::new();
    let registry = d.registry();
    let source_ref = &registry[d.refs.source_ref];
    let target_ref = &registry[d.refs.target_ref];
    let task = d.add_task("A");
    let other = d.add_task("Other");
    let flow = d.add_flow("Flow_1");
    source_ref.set_target(&mut d.model, flow, task).unwrap();
    target_ref.set_target(&mut d.model, flow, other).unwrap();

    d.model.set_attribute(task, "id", "B").unwrap();

    assert_eq!(
        source_ref.resolve_identifier(&d.model, flow).unwrap(),
        Some("B".to_owned())
    );
    assert_eq!(source_ref.resolve_target(&d.model, flow).unwrap(), Some(task));
    assert_eq!(d.model.attribute(flow, "targetRef"), Some("Other"));
}

#[test]
fn test_removing_target_clears_reference() {
    let mut d = Diagram::new();
    let registry = d.registry();
    let source_ref = &registry[d.refs.source_ref];
    let task = d.add_task("Task_1");
    let flow = d.add_flow("Flow_1");
    source_ref.set_target(&mut d.model, flow, task).unwrap();

    d.model.remove_element(task).unwrap();

    assert_eq!(d.model.attribute(flow, "sourceRef"), None);
    assert_eq!(source_ref.resolve_target(&d.model, flow).unwrap(), None);
}

#[test]
fn test_removing_identifier_clears_reference() {
    let mut d = Diagram::new();
    let registry = d.registry();
    let source_ref = &registry[d.refs.source_ref];
    let task = d.add_task("Task_1");
    let flow = d.add_flow("Flow_1");
    source_ref.set_target(&mut d.model, flow, task).unwrap();

    assert_eq!(
        d.model.remove_attribute(task, "id").unwrap(),
        Some("Task_1".to_owned())
    );
    assert_eq!(d.model.attribute(flow, "sourceRef"), None);
    assert_eq!(d.model.element_by_id("Task_1"), None);
}

#[test]
fn test_find_referencing_elements_by_source_type() {
    let mut d = Diagram::new();
    let registry = d.registry();
    let source_ref = &registry[d.refs.source_ref];
    let task = d.add_task("Task_1");
    let store = d.add_data_store("Store_1");
    let first = d.add_flow("Flow_1");
    let second = d.add_flow("Flow_2");

    let found: Vec<_> = source_ref
        .find_referencing_elements(&d.model, task)
        .into_iter()
        .collect();
    assert_eq!(found, vec![first, second]);
    assert!(source_ref.find_referencing_elements(&d.model, store).is_empty());
}

// =============================================================================
// QNAME VARIANT
// =============================================================================

#[test]
fn test_qname_reference_strips_prefix() {
    let mut d = Diagram::new();
    let registry = d.registry();
    let process_ref = &registry[d.refs.process_ref];
    let definitions = d.definitions;
    let participant = d.add(definitions, "participant", "Participant_1");
    d.model
        .set_attribute(participant, "processRef", "ns:Process_1")
        .unwrap();

    assert_eq!(
        process_ref.resolve_identifier(&d.model, participant).unwrap(),
        Some("Process_1".to_owned())
    );
    assert_eq!(
        process_ref.resolve_target(&d.model, participant).unwrap(),
        Some(d.process)
    );
    assert_eq!(
        d.model.attribute(participant, "processRef"),
        Some("ns:Process_1")
    );
}

#[test]
fn test_qname_rename_keeps_prefix() {
    let mut d = Diagram::new();
    let definitions = d.definitions;
    let process = d.process;
    let participant = d.add(definitions, "participant", "Participant_1");
    d.model
        .set_attribute(participant, "processRef", "ns:Process_1")
        .unwrap();

    d.model.set_attribute(process, "id", "Process_2").unwrap();

    assert_eq!(
        d.model.attribute(participant, "processRef"),
        Some("ns:Process_2")
    );
}

#[test]
fn test_qname_set_target_writes_plain_identifier() {
    let mut d = Diagram::new();
    let registry = d.registry();
    let process_ref = &registry[d.refs.process_ref];
    let definitions = d.definitions;
    let process = d.process;
    let participant = d.add(definitions, "participant", "Participant_1");

    process_ref
        .set_target(&mut d.model, participant, process)
        .unwrap();

    assert_eq!(
        d.model.attribute(participant, "processRef"),
        Some("Process_1")
    );
}
