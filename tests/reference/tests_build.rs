//! Build-time binding of references.

use crate::helpers::diagram::process_schema;
use xref::{
    AnyReferenceId, BuildError, CollectionEncoding, ModelInstance, Reference,
    ReferenceCollection, SchemaBuilder, SchemaConfig,
};

// =============================================================================
// BINDING
// =============================================================================

#[test]
fn test_target_binds_inherited_id_attribute() {
    let (registry, refs) = process_schema();
    let base = registry.type_by_name("baseElement").unwrap();
    let flow_node = registry.type_by_name("flowNode").unwrap();
    let source_ref = &registry[refs.source_ref];

    let target = source_ref.target();
    assert_eq!(target.target_type(), flow_node);
    assert_eq!(target.id_attribute_name(), "id");
    assert_eq!(registry.attribute(target.id_attribute()).owner(), base);
}

#[test]
fn test_references_are_registered_on_both_ends() {
    let (registry, refs) = process_schema();
    let source_ref = &registry[refs.source_ref];
    let flows = &registry[refs.flow_node_refs];

    let id_attribute = registry.attribute(source_ref.target().id_attribute());
    assert!(id_attribute.incoming_references().contains(&source_ref.id()));
    assert!(id_attribute.incoming_references().contains(&flows.id()));

    let source_attribute = registry.attribute(source_ref.source_attribute());
    assert_eq!(source_attribute.name(), "sourceRef");
    assert_eq!(
        source_attribute.outgoing_references(),
        &[AnyReferenceId::Attribute(refs.source_ref)]
    );

    let collection = registry.child_collection(flows.child_collection());
    assert_eq!(
        collection.outgoing_references(),
        &[AnyReferenceId::ElementCollection(refs.flow_node_refs)]
    );
}

#[test]
fn test_references_to_includes_base_type_targets() {
    let (registry, refs) = process_schema();
    let task = registry.type_by_name("task").unwrap();
    let store = registry.type_by_name("dataStore").unwrap();

    let to_task = registry.references_to(task);
    assert!(to_task.contains(&refs.source_ref.into()));
    assert!(to_task.contains(&refs.association_target.into()));
    assert!(!to_task.contains(&refs.data_store_refs.into()));

    let to_store = registry.references_to(store);
    assert!(to_store.contains(&refs.data_store_refs.into()));
    assert!(to_store.contains(&refs.data_refs.into()));
}

#[test]
fn test_element_reference_children_are_single() {
    let (registry, refs) = process_schema();
    let target_ref = &registry[refs.association_target];
    let ids = &registry[refs.data_store_refs];

    assert!(registry.child_collection(target_ref.child_collection()).is_single());
    assert!(registry.child_collection(ids.child_collection()).is_single());
    assert!(!registry.child_collection(registry[refs.flow_node_refs].child_collection()).is_single());
}

// =============================================================================
// SCHEMA ERRORS
// =============================================================================

#[test]
fn test_target_without_id_attribute_fails_build() {
    let mut schema = SchemaBuilder::new();
    schema.element_type("comment");
    schema
        .element_type("note")
        .id_attribute("id")
        .attribute("commentRef")
        .reference("comment")
        .build();

    assert_eq!(
        schema.build().unwrap_err(),
        BuildError::MissingIdAttribute {
            type_name: "comment".into()
        }
    );
}

#[test]
fn test_unknown_target_type_fails_build() {
    let mut schema = SchemaBuilder::new();
    let mut note = schema.element_type("note").id_attribute("id");
    note.child_element("link")
        .element_reference_collection("nowhere")
        .build();
    schema.element_type("link");

    assert_eq!(
        schema.build().unwrap_err(),
        BuildError::UnknownType("nowhere".into())
    );
}

// =============================================================================
// CONFIGURATION
// =============================================================================

#[test]
fn test_configured_separator_and_uri_attribute() {
    let config = SchemaConfig::default()
        .with_id_list_separator(',')
        .with_uri_attribute("xlink:href");
    let mut schema = SchemaBuilder::with_config(config);
    schema.element_type("store").id_attribute("id");
    let mut owner = schema.element_type("owner").id_attribute("id");
    let list = owner.child_element("storeRefs").id_list_reference("store").build();
    let links = owner
        .child_element("storeLink")
        .uri_reference_collection("store")
        .build();
    let custom = owner
        .child_element("otherLink")
        .element_reference_collection("store")
        .href_attribute("ref")
        .build();
    let piped = owner
        .child_element("pipedRefs")
        .id_list_reference("store")
        .separator('|')
        .build();
    for carrier in ["storeRefs", "storeLink", "otherLink", "pipedRefs"] {
        schema.element_type(carrier);
    }
    let registry = schema.build().unwrap();

    assert_eq!(registry[list].separator(), ',');
    assert_eq!(registry[piped].separator(), '|');
    assert_eq!(
        registry[links].encoding(),
        &CollectionEncoding::Uri {
            attribute: "xlink:href".into()
        }
    );
    assert_eq!(
        registry[custom].encoding(),
        &CollectionEncoding::Uri {
            attribute: "ref".into()
        }
    );

    let mut model = ModelInstance::new(registry.clone());
    let owner_ty = registry.type_by_name("owner").unwrap();
    let store_ty = registry.type_by_name("store").unwrap();
    let root = model.create_element_with_id(owner_ty, "Owner_1").unwrap();
    model.set_root(root).unwrap();
    let a = model.create_element_with_id(store_ty, "A").unwrap();
    let b = model.create_element_with_id(store_ty, "B").unwrap();
    model.append_child(root, a).unwrap();
    model.append_child(root, b).unwrap();

    registry[list]
        .view_mut(&mut model, root)
        .unwrap()
        .add_all([a, b])
        .unwrap();
    let child = registry[list].source_child(&model, root).unwrap();
    assert_eq!(model.text(child), Some("A,B"));

    registry[links].view_mut(&mut model, root).unwrap().add(a).unwrap();
    let link = registry[links].carriers(&model, root)[0];
    assert_eq!(model.attribute(link, "xlink:href"), Some("#A"));
}
