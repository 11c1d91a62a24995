use crate::modules::contact::entity::{Contact, ContactCreateRequest, ContactKey};
use crate::modules::database::manager::DB_MANAGER;
use crate::modules::database::{
    filter_by_secondary_key_impl, insert_impl, paginate_query_primary_scan_all_impl,
    secondary_find_impl, update_impl, upsert_impl,
};
use crate::modules::error::code::ErrorCode;
use crate::modules::error::RustBlastError;
use crate::raise_error;

fn contact(name: &str, number: &str, group: &str) -> Contact {
    Contact::new(ContactCreateRequest {
        name: name.to_string(),
        number: number.to_string(),
        group: Some(group.to_string()),
        custom_fields: None,
    })
    .unwrap()
}

#[tokio::test]
async fn insert_then_find_by_secondary_key() {
    let row = contact("db_find", "628210000001", "db_find_group");
    insert_impl(DB_MANAGER.meta_db(), row.clone()).await.unwrap();

    let found: Option<Contact> =
        secondary_find_impl(DB_MANAGER.meta_db(), ContactKey::id, row.id)
            .await
            .unwrap();
    assert_eq!(found, Some(row));
}

#[tokio::test]
async fn duplicate_insert_is_rejected() {
    let row = contact("db_dup", "628210000002", "db_dup_group");
    insert_impl(DB_MANAGER.meta_db(), row.clone()).await.unwrap();
    assert!(insert_impl(DB_MANAGER.meta_db(), row).await.is_err());
}

#[tokio::test]
async fn upsert_replaces_the_existing_row() {
    let mut row = contact("db_upsert", "628210000003", "db_upsert_group");
    upsert_impl(DB_MANAGER.meta_db(), row.clone()).await.unwrap();
    row.name = "db_upsert_renamed".to_string();
    upsert_impl(DB_MANAGER.meta_db(), row.clone()).await.unwrap();

    let found: Option<Contact> =
        secondary_find_impl(DB_MANAGER.meta_db(), ContactKey::id, row.id)
            .await
            .unwrap();
    assert_eq!(found.unwrap().name, "db_upsert_renamed");
}

#[tokio::test]
async fn update_returns_the_previous_row() {
    let row = contact("db_update", "628210000004", "db_update_group");
    insert_impl(DB_MANAGER.meta_db(), row.clone()).await.unwrap();

    let id = row.id;
    let previous = update_impl(
        DB_MANAGER.meta_db(),
        move |rw| {
            rw.get()
                .secondary::<Contact>(ContactKey::id, id)
                .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?
                .ok_or_else(|| raise_error!("missing row".into(), ErrorCode::ResourceNotFound))
        },
        |current| {
            let mut updated = current.clone();
            updated.name = "db_update_renamed".to_string();
            Ok(updated)
        },
    )
    .await
    .unwrap();
    assert_eq!(previous.name, "db_update");

    let found: Option<Contact> =
        secondary_find_impl(DB_MANAGER.meta_db(), ContactKey::id, id)
            .await
            .unwrap();
    assert_eq!(found.unwrap().name, "db_update_renamed");
}

#[tokio::test]
async fn delete_removes_the_row() {
    let row = contact("db_delete", "628210000005", "db_delete_group");
    insert_impl(DB_MANAGER.meta_db(), row.clone()).await.unwrap();
    Contact::delete(row.id).await.unwrap();

    let found: Option<Contact> =
        secondary_find_impl(DB_MANAGER.meta_db(), ContactKey::id, row.id)
            .await
            .unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn secondary_string_scan_is_a_prefix_scan() {
    let a = contact("db_prefix_a", "628210000006", "db_prefix_team");
    let b = contact("db_prefix_b", "628210000007", "db_prefix_teammates");
    insert_impl(DB_MANAGER.meta_db(), a.clone()).await.unwrap();
    insert_impl(DB_MANAGER.meta_db(), b.clone()).await.unwrap();

    // The raw helper matches by prefix, which is why group lookups post-filter
    // for exact equality.
    let raw: Vec<Contact> = filter_by_secondary_key_impl(
        DB_MANAGER.meta_db(),
        ContactKey::group,
        "db_prefix_team".to_string(),
    )
    .await
    .unwrap();
    let ids: Vec<u64> = raw.iter().map(|c| c.id).collect();
    assert!(ids.contains(&a.id));
    assert!(ids.contains(&b.id));

    let exact = Contact::list_by_group("db_prefix_team").await.unwrap();
    assert!(exact.iter().any(|c| c.id == a.id));
    assert!(exact.iter().all(|c| c.id != b.id));
}

#[tokio::test]
async fn pagination_rejects_zero_page_arguments() {
    let result = paginate_query_primary_scan_all_impl::<Contact>(
        DB_MANAGER.meta_db(),
        Some(0),
        Some(10),
        None,
    )
    .await;
    assert!(matches!(
        result,
        Err(RustBlastError::Generic { code, .. }) if code == ErrorCode::InvalidParameter
    ));
}
