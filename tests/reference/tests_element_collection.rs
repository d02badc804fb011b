//! Element reference collections: `lane/flowNodeRef` (text), the QName
//! collections `flowNode/incoming` and `flowNode/outgoing`, the URI
//! collection `task/dataRef` and the immutable `conversation/participantRef`.

use crate::helpers::diagram::Diagram;
use rstest::rstest;
use xref::{ModelError, NodeId, ReferenceCollection};

fn lane(d: &mut Diagram) -> NodeId {
    let process = d.process;
    d.add(process, "lane", "Lane_1")
}

// =============================================================================
// TEXT COLLECTION
// =============================================================================

#[test]
fn test_add_creates_one_child_per_target() {
    let mut d = Diagram::new();
    let registry = d.registry();
    let refs = &registry[d.refs.flow_node_refs];
    let first = d.add_task("Task_1");
    let second = d.add_task("Task_2");
    let lane = lane(&mut d);

    let mut view = refs.view_mut(&mut d.model, lane).unwrap();
    assert!(view.is_empty());
    assert!(view.add(first).unwrap());
    assert!(view.add(second).unwrap());
    assert!(!view.add(first).unwrap());
    assert_eq!(view.len(), 2);
    assert_eq!(view.to_vec().unwrap(), vec![first, second]);
    assert!(view.contains(second).unwrap());

    assert_eq!(d.child_types(lane), vec!["flowNodeRef", "flowNodeRef"]);
    let texts: Vec<_> = d
        .model
        .children(lane)
        .iter()
        .map(|&child| d.model.text(child).unwrap())
        .collect();
    assert_eq!(texts, vec!["Task_1", "Task_2"]);
}

#[test]
fn test_remove_drops_matching_children() {
    let mut d = Diagram::new();
    let registry = d.registry();
    let refs = &registry[d.refs.flow_node_refs];
    let first = d.add_task("Task_1");
    let second = d.add_task("Task_2");
    let lane = lane(&mut d);
    d.add_text_child(lane, "flowNodeRef", "Task_1");
    d.add_text_child(lane, "flowNodeRef", "Task_2");
    d.add_text_child(lane, "flowNodeRef", "Task_1");

    let mut view = refs.view_mut(&mut d.model, lane).unwrap();
    assert!(view.remove(first).unwrap());
    assert!(!view.remove(first).unwrap());
    assert_eq!(view.to_vec().unwrap(), vec![second]);
}

#[test]
fn test_remove_all_and_clear() {
    let mut d = Diagram::new();
    let registry = d.registry();
    let refs = &registry[d.refs.flow_node_refs];
    let tasks: Vec<_> = (1..=3).map(|i| d.add_task(&format!("Task_{i}"))).collect();
    let lane = lane(&mut d);

    let mut view = refs.view_mut(&mut d.model, lane).unwrap();
    assert!(view.add_all(tasks.iter().copied()).unwrap());
    assert!(view.remove_all([tasks[0], tasks[2]]).unwrap());
    assert_eq!(view.identifiers(), vec!["Task_2"]);

    view.clear().unwrap();
    assert!(view.is_empty());
    assert!(d.model.children(lane).is_empty());
}

#[test]
fn test_add_all_checks_every_target_first() {
    let mut d = Diagram::new();
    let registry = d.registry();
    let refs = &registry[d.refs.flow_node_refs];
    let task = d.add_task("Task_1");
    let detached = d.detached("task", "Task_2");
    let lane = lane(&mut d);

    let mut view = refs.view_mut(&mut d.model, lane).unwrap();
    assert_eq!(
        view.add_all([task, detached]),
        Err(ModelError::NotConnected { element: detached })
    );
    assert!(view.is_empty());
}

#[test]
fn test_remove_all_checks_every_target_first() {
    let mut d = Diagram::new();
    let registry = d.registry();
    let refs = &registry[d.refs.flow_node_refs];
    let task = d.add_task("Task_1");
    let gone = d.add_task("Task_2");
    d.model.remove_element(gone).unwrap();
    let lane = lane(&mut d);

    let mut view = refs.view_mut(&mut d.model, lane).unwrap();
    view.add(task).unwrap();
    assert_eq!(
        view.remove_all([task, gone]),
        Err(ModelError::UnknownElement(gone))
    );
    assert_eq!(view.to_vec().unwrap(), vec![task]);
}

#[test]
fn test_retain_all_is_unsupported() {
    let mut d = Diagram::new();
    let registry = d.registry();
    let refs = &registry[d.refs.flow_node_refs];
    let task = d.add_task("Task_1");
    let lane = lane(&mut d);

    let mut view = refs.view_mut(&mut d.model, lane).unwrap();
    view.add(task).unwrap();
    assert!(matches!(
        view.retain_all([task]),
        Err(ModelError::Unsupported {
            operation: "retain_all",
            ..
        })
    ));
    assert_eq!(view.len(), 1);
}

#[test]
fn test_dangling_member_fails_resolution() {
    let mut d = Diagram::new();
    let registry = d.registry();
    let refs = &registry[d.refs.flow_node_refs];
    let task = d.add_task("Task_1");
    let lane = lane(&mut d);
    d.add_text_child(lane, "flowNodeRef", "Task_1");
    d.add_text_child(lane, "flowNodeRef", "Ghost");

    let view = refs.view(&d.model, lane).unwrap();
    assert_eq!(view.len(), 2);
    let resolved: Vec<_> = view.iter().collect();
    assert_eq!(resolved[0], Ok(task));
    assert_eq!(
        view.to_vec(),
        Err(ModelError::NotFound {
            identifier: "Ghost".into()
        })
    );
}

#[test]
fn test_view_requires_source_type() {
    let mut d = Diagram::new();
    let registry = d.registry();
    let refs = &registry[d.refs.flow_node_refs];
    let task = d.add_task("Task_1");

    assert!(matches!(
        refs.view(&d.model, task),
        Err(ModelError::WrongSourceType { .. })
    ));
}

#[test]
fn test_removing_target_drops_only_its_children() {
    let mut d = Diagram::new();
    let registry = d.registry();
    let refs = &registry[d.refs.flow_node_refs];
    let first = d.add_task("Task_1");
    let second = d.add_task("Task_2");
    let lane = lane(&mut d);
    refs.view_mut(&mut d.model, lane)
        .unwrap()
        .add_all([first, second])
        .unwrap();

    d.model.remove_element(first).unwrap();

    let view = refs.view(&d.model, lane).unwrap();
    assert_eq!(view.to_vec().unwrap(), vec![second]);
}

// =============================================================================
// DOCUMENT ORDER
// =============================================================================

#[test]
fn test_new_children_follow_declared_order() {
    let mut d = Diagram::new();
    let registry = d.registry();
    let incoming = &registry[d.refs.incoming];
    let outgoing = &registry[d.refs.outgoing];
    let data_refs = &registry[d.refs.data_refs];
    let task = d.add_task("Task_1");
    let flow_in = d.add_flow("Flow_in");
    let flow_out = d.add_flow("Flow_out");
    let store = d.add_data_store("Store_1");

    data_refs.view_mut(&mut d.model, task).unwrap().add(store).unwrap();
    outgoing.view_mut(&mut d.model, task).unwrap().add(flow_out).unwrap();
    incoming.view_mut(&mut d.model, task).unwrap().add(flow_in).unwrap();

    assert_eq!(d.child_types(task), vec!["incoming", "outgoing", "dataRef"]);
}

// =============================================================================
// QNAME AND URI VARIANTS
// =============================================================================

#[test]
fn test_qname_members_strip_prefix() {
    let mut d = Diagram::new();
    let registry = d.registry();
    let incoming = &registry[d.refs.incoming];
    let task = d.add_task("Task_1");
    let flow = d.add_flow("Flow_1");
    let member = d.add_text_child(task, "incoming", "bpmn:Flow_1");

    let view = incoming.view(&d.model, task).unwrap();
    assert_eq!(view.identifiers(), vec!["Flow_1"]);
    assert_eq!(view.to_vec().unwrap(), vec![flow]);
    assert_eq!(d.model.text(member), Some("bpmn:Flow_1"));
}

#[test]
fn test_qname_member_rename_keeps_prefix() {
    let mut d = Diagram::new();
    let task = d.add_task("Task_1");
    let flow = d.add_flow("Flow_1");
    let member = d.add_text_child(task, "incoming", "bpmn:Flow_1");

    d.model.set_attribute(flow, "id", "Flow_2").unwrap();

    assert_eq!(d.model.text(member), Some("bpmn:Flow_2"));
}

#[rstest]
#[case::same_document("#Store_1")]
#[case::other_document("model.xml#Store_1")]
fn test_uri_member_resolves_fragment(#[case] href: &str) {
    let mut d = Diagram::new();
    let registry = d.registry();
    let data_refs = &registry[d.refs.data_refs];
    let task = d.add_task("Task_1");
    let store = d.add_data_store("Store_1");
    let member = d.add_anonymous(task, "dataRef");
    d.model.set_attribute(member, "href", href).unwrap();

    let view = data_refs.view(&d.model, task).unwrap();
    assert_eq!(view.identifiers(), vec!["Store_1"]);
    assert_eq!(view.to_vec().unwrap(), vec![store]);
}

#[test]
fn test_uri_add_writes_fragment_reference() {
    let mut d = Diagram::new();
    let registry = d.registry();
    let data_refs = &registry[d.refs.data_refs];
    let task = d.add_task("Task_1");
    let store = d.add_data_store("bar");

    data_refs.view_mut(&mut d.model, task).unwrap().add(store).unwrap();

    let member = data_refs.carriers(&d.model, task)[0];
    assert_eq!(d.model.attribute(member, "href"), Some("#bar"));
    assert_eq!(d.model.text(member), None);
}

#[test]
fn test_uri_rename_keeps_document_part() {
    let mut d = Diagram::new();
    let task = d.add_task("Task_1");
    let store = d.add_data_store("Store_1");
    let member = d.add_anonymous(task, "dataRef");
    d.model
        .set_attribute(member, "href", "model.xml#Store_1")
        .unwrap();

    d.model.set_attribute(store, "id", "Store_2").unwrap();

    assert_eq!(d.model.attribute(member, "href"), Some("model.xml#Store_2"));
}

// =============================================================================
// IMMUTABLE COLLECTION
// =============================================================================

#[derive(Clone, Copy, Debug)]
enum Edit {
    Add,
    AddAll,
    Remove,
    RemoveAll,
    Clear,
}

#[rstest]
#[case::add(Edit::Add, "add")]
#[case::add_all(Edit::AddAll, "add_all")]
#[case::remove(Edit::Remove, "remove")]
#[case::remove_all(Edit::RemoveAll, "remove_all")]
#[case::clear(Edit::Clear, "clear")]
fn test_immutable_collection_rejects_edits(#[case] edit: Edit, #[case] operation: &str) {
    let mut d = Diagram::new();
    let registry = d.registry();
    let refs = &registry[d.refs.participant_refs];
    let definitions = d.definitions;
    let existing = d.add(definitions, "participant", "Participant_1");
    let other = d.add(definitions, "participant", "Participant_2");
    let conversation = d.add(definitions, "conversation", "Conversation_1");
    let member = d.add_text_child(conversation, "participantRef", "Participant_1");
    assert!(refs.is_immutable());

    let mut view = refs.view_mut(&mut d.model, conversation).unwrap();
    let result = match edit {
        Edit::Add => view.add(other),
        Edit::AddAll => view.add_all([other]),
        Edit::Remove => view.remove(existing),
        Edit::RemoveAll => view.remove_all([existing]),
        Edit::Clear => view.clear().map(|()| true),
    };

    match result {
        Err(ModelError::Unsupported { operation: op, .. }) => assert_eq!(op, operation),
        unexpected => panic!("{edit:?} should be unsupported, got {unexpected:?}"),
    }
    assert_eq!(view.to_vec().unwrap(), vec![existing]);
    assert_eq!(d.model.children(conversation), &[member]);
    assert_eq!(d.model.text(member), Some("Participant_1"));
}

#[test]
fn test_immutable_collection_still_follows_renames() {
    let mut d = Diagram::new();
    let definitions = d.definitions;
    let participant = d.add(definitions, "participant", "Participant_1");
    let conversation = d.add(definitions, "conversation", "Conversation_1");
    let member = d.add_text_child(conversation, "participantRef", "Participant_1");

    d.model
        .set_attribute(participant, "id", "Participant_9")
        .unwrap();

    assert_eq!(d.model.text(member), Some("Participant_9"));
}
