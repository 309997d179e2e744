//! List/get/metadata operations end to end.

mod common;

use common::TestContext;
use tablekit_core::proto::{PropertyName, Purpose, RequestParams, Value};
use tablekit_core::{ErrorKind, Verbosity};

#[test]
fn test_six_rows_fill_a_page_and_report_the_next() {
    let ctx = TestContext::new();
    let list = ctx
        .service
        .list_instances("company", &RequestParams::new().with_max(5))
        .unwrap();
    assert_eq!(list.rows.len(), 5);
    assert_eq!(list.next_page, Some(2));

    let list = ctx
        .service
        .list_instances("company", &RequestParams::new().with_max(5).with_page(2))
        .unwrap();
    assert_eq!(list.rows.len(), 1);
    assert_eq!(list.rows[0].get("name"), Some(&Value::String("Vandelay".into())));
    assert_eq!(list.next_page, None);
}

#[test]
fn test_exactly_one_page_has_no_next_page() {
    let ctx = TestContext::as_user(8, "bob");
    let list = ctx
        .service
        .list_instances("company", &RequestParams::new().with_max(5))
        .unwrap();
    assert_eq!(list.rows.len(), 5);
    assert_eq!(list.next_page, None);
}

#[test]
fn test_default_page_length() {
    let ctx = TestContext::new();
    let params = RequestParams::from_pairs([("page", "1")]).unwrap();
    let list = ctx.service.list_instances("company", &params).unwrap();
    assert_eq!(list.rows.len(), 5);
    assert_eq!(list.next_page, Some(2));
    let metadata = list.metadata.unwrap();
    assert!(metadata.relations.iter().all(|r| r.metadata.is_none()));
}

#[test]
fn test_enumeration_listing() {
    let ctx = TestContext::new();
    let list = ctx
        .service
        .list_instances("contact::status", &RequestParams::new().with_max(2))
        .unwrap();
    assert_eq!(list.rows.len(), 2);
    assert_eq!(list.rows[1].get("label"), Some(&Value::String("Customer".into())));
    assert_eq!(list.next_page, Some(2));
}

#[test]
fn test_public_metadata() {
    let ctx = TestContext::new();
    let metadata = ctx.service.get_public_metadata("contact").unwrap();

    assert_eq!(metadata.display_name, "Contact");
    assert_eq!(metadata.property("id").unwrap().purpose, Purpose::Id);
    assert_eq!(metadata.property("first_name").unwrap().purpose, Purpose::Label);
    assert_eq!(metadata.property("phone").unwrap().purpose, Purpose::Secondary);

    let status = metadata.property("status").unwrap();
    assert_eq!(status.name, PropertyName::composite("status"));
    let labels: Vec<_> = status
        .value_list
        .as_ref()
        .unwrap()
        .iter()
        .map(|v| v.label.to_string())
        .collect();
    assert_eq!(labels, vec!["Lead", "Customer", "Former"]);

    let company = metadata.property("company").unwrap();
    let related = company.related_metadata.as_ref().unwrap();
    assert_eq!(related.table_name, "company");
    assert_eq!(related.relations[0].class_name, "contact");
    assert!(related.relations[0].metadata.is_none());
}

#[test]
fn test_unknown_entity_messages() {
    let ctx = TestContext::new();
    let err = ctx
        .service
        .list_instances("widget", &RequestParams::new())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnrecognizedEntity);
    assert_eq!(err.client_message(Verbosity::Terse), "Class widget not found");

    let err = ctx
        .service
        .get_public_metadata("../company")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidName);
}

#[test]
fn test_permission_changes_visible_after_invalidation() {
    let ctx = TestContext::as_user(8, "bob");
    let before = ctx
        .service
        .list_instances("company", &RequestParams::new().with_max(10))
        .unwrap();
    assert_eq!(before.rows.len(), 5);

    ctx.gateway
        .execute("INSERT INTO contact_permissions (contact_id, company_id) VALUES (8, 6)")
        .unwrap();
    ctx.service.permissions().invalidate(8);

    let after = ctx
        .service
        .list_instances("company", &RequestParams::new().with_max(10))
        .unwrap();
    assert_eq!(after.rows.len(), 6);
}
