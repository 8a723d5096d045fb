use pantry_core::db::open_db_in_memory;
use pantry_core::model::inventory::{NewStorage, Supplier};
use pantry_core::model::validation::ValidationError;
use pantry_core::repo::inventory_repo::{IngredientSupplierListQuery, StorageListQuery};
use pantry_core::{
    CatalogService, InventoryService, InventoryServiceError, ListQuery, RepoError,
    SqliteCatalogRepository, SqliteInventoryRepository,
};
use rusqlite::{params, Connection};
use std::thread::sleep;
use std::time::Duration;
use uuid::Uuid;

fn inventory(conn: &Connection) -> InventoryService<SqliteInventoryRepository<'_>> {
    InventoryService::new(SqliteInventoryRepository::try_new(conn).unwrap())
}

#[test]
fn storage_link_sets_may_be_empty_or_many() {
    let conn = open_db_in_memory().unwrap();
    let service = inventory(&conn);

    let empty = service.receive_storage(&NewStorage::default()).unwrap();
    assert!(empty.ingredient_uuids.is_empty());
    assert!(empty.marker_uuids.is_empty());

    let flour = service.create_ingredient("Flour").unwrap();
    let sugar = service.create_ingredient("Sugar").unwrap();
    let fragile = service.create_marker("fragile").unwrap();
    let cold = service.create_marker("keep cold").unwrap();

    let full = service
        .receive_storage(&NewStorage {
            count: 12,
            ingredient_uuids: vec![flour.uuid, sugar.uuid, flour.uuid],
            marker_uuids: vec![fragile.uuid, cold.uuid],
        })
        .unwrap();
    assert_eq!(full.count, 12);
    assert_eq!(full.ingredient_uuids.len(), 2);
    assert!(full.ingredient_uuids.contains(&flour.uuid));
    assert!(full.ingredient_uuids.contains(&sugar.uuid));
    assert_eq!(full.marker_uuids.len(), 2);
    assert_eq!(service.get_storage(full.uuid).unwrap(), Some(full));
}

#[test]
fn storage_with_unknown_member_is_rejected_without_writing() {
    let conn = open_db_in_memory().unwrap();
    let service = inventory(&conn);

    let missing = Uuid::new_v4();
    let err = service
        .receive_storage(&NewStorage {
            count: 1,
            ingredient_uuids: vec![missing],
            marker_uuids: Vec::new(),
        })
        .unwrap_err();
    assert!(matches!(err, InventoryServiceError::IngredientNotFound(id) if id == missing));

    let err = service
        .receive_storage(&NewStorage {
            count: 1,
            ingredient_uuids: Vec::new(),
            marker_uuids: vec![missing],
        })
        .unwrap_err();
    assert!(matches!(err, InventoryServiceError::MarkerNotFound(id) if id == missing));

    assert!(service
        .list_storages(&StorageListQuery::default())
        .unwrap()
        .is_empty());
}

#[test]
fn storage_sets_are_replaced_whole() {
    let conn = open_db_in_memory().unwrap();
    let service = inventory(&conn);

    let flour = service.create_ingredient("Flour").unwrap();
    let sugar = service.create_ingredient("Sugar").unwrap();
    let fragile = service.create_marker("fragile").unwrap();
    let storage = service
        .receive_storage(&NewStorage {
            count: 3,
            ingredient_uuids: vec![flour.uuid],
            marker_uuids: vec![fragile.uuid],
        })
        .unwrap();

    let replaced = service
        .set_storage_ingredients(storage.uuid, &[sugar.uuid])
        .unwrap();
    assert_eq!(replaced.ingredient_uuids, vec![sugar.uuid]);
    assert_eq!(replaced.marker_uuids, vec![fragile.uuid]);

    let cleared = service.set_storage_markers(storage.uuid, &[]).unwrap();
    assert!(cleared.marker_uuids.is_empty());

    assert!(matches!(
        service.set_storage_markers(Uuid::new_v4(), &[]),
        Err(InventoryServiceError::StorageNotFound(_))
    ));
}

#[test]
fn storage_count_update_refreshes_expired_at_only() {
    let conn = open_db_in_memory().unwrap();
    let service = inventory(&conn);

    let storage = service
        .receive_storage(&NewStorage {
            count: 5,
            ..NewStorage::default()
        })
        .unwrap();
    conn.execute(
        "UPDATE storages SET received_at = 1000, expired_at = 1000 WHERE uuid = ?1;",
        params![storage.uuid.to_string()],
    )
    .unwrap();

    let updated = service.update_storage_count(storage.uuid, 4).unwrap();
    assert_eq!(updated.count, 4);
    assert_eq!(updated.received_at, 1000);
    assert!(updated.expired_at > 1000);
}

#[test]
fn storages_list_newest_received_first() {
    let conn = open_db_in_memory().unwrap();
    let service = inventory(&conn);

    let first = service.receive_storage(&NewStorage::default()).unwrap();
    sleep(Duration::from_millis(5));
    let second = service.receive_storage(&NewStorage::default()).unwrap();
    assert!(second.received_at > first.received_at);

    let listed = service
        .list_storages(&StorageListQuery::default())
        .unwrap();
    assert_eq!(listed, vec![second, first]);
}

#[test]
fn storages_filter_by_ingredient_and_marker() {
    let conn = open_db_in_memory().unwrap();
    let service = inventory(&conn);

    let flour = service.create_ingredient("Flour").unwrap();
    let sugar = service.create_ingredient("Sugar").unwrap();
    let cold = service.create_marker("keep cold").unwrap();
    let flour_cold = service
        .receive_storage(&NewStorage {
            count: 1,
            ingredient_uuids: vec![flour.uuid],
            marker_uuids: vec![cold.uuid],
        })
        .unwrap();
    let flour_plain = service
        .receive_storage(&NewStorage {
            count: 2,
            ingredient_uuids: vec![flour.uuid],
            marker_uuids: Vec::new(),
        })
        .unwrap();
    service
        .receive_storage(&NewStorage {
            count: 3,
            ingredient_uuids: vec![sugar.uuid],
            marker_uuids: Vec::new(),
        })
        .unwrap();

    let with_flour = service
        .list_storages(&StorageListQuery {
            ingredient_uuid: Some(flour.uuid),
            ..StorageListQuery::default()
        })
        .unwrap();
    let mut ids: Vec<Uuid> = with_flour.iter().map(|storage| storage.uuid).collect();
    ids.sort();
    let mut expected = vec![flour_cold.uuid, flour_plain.uuid];
    expected.sort();
    assert_eq!(ids, expected);

    let flour_and_cold = service
        .list_storages(&StorageListQuery {
            ingredient_uuid: Some(flour.uuid),
            marker_uuid: Some(cold.uuid),
            ..StorageListQuery::default()
        })
        .unwrap();
    assert_eq!(flour_and_cold, vec![flour_cold]);
}

#[test]
fn deleting_ingredient_removes_details_and_links_but_keeps_batches() {
    let conn = open_db_in_memory().unwrap();
    let service = inventory(&conn);
    let catalog = CatalogService::new(SqliteCatalogRepository::try_new(&conn).unwrap());

    let flour = service.create_ingredient("Flour").unwrap();
    let sugar = service.create_ingredient("Sugar").unwrap();
    let storage = service
        .receive_storage(&NewStorage {
            count: 7,
            ingredient_uuids: vec![flour.uuid, sugar.uuid],
            marker_uuids: Vec::new(),
        })
        .unwrap();
    let acme = service.create_supplier("Acme", "ACME Foods", 5550100).unwrap();
    let group = service
        .link_suppliers(&[flour.uuid], &[acme.uuid])
        .unwrap();

    let bakery = catalog.create_category("Bakery").unwrap();
    let bread = catalog.create_product(bakery.uuid, "Bread").unwrap();
    let recept = catalog.create_recept(bread.uuid, Some(40)).unwrap();
    catalog
        .create_recept_details(recept.uuid, Some(flour.uuid), 2)
        .unwrap();

    service.delete_ingredient(flour.uuid).unwrap();

    assert_eq!(catalog.find_details_for_recept(recept.uuid).unwrap(), None);
    assert!(catalog.get_recept(recept.uuid).unwrap().is_some());

    let storage = service.get_storage(storage.uuid).unwrap().unwrap();
    assert_eq!(storage.ingredient_uuids, vec![sugar.uuid]);

    let group = service.get_ingredient_supplier(group.uuid).unwrap().unwrap();
    assert!(group.ingredient_uuids.is_empty());
    assert_eq!(group.supplier_uuids, vec![acme.uuid]);
}

#[test]
fn ingredient_supplier_groups_filter_and_replace_sets() {
    let conn = open_db_in_memory().unwrap();
    let service = inventory(&conn);

    let flour = service.create_ingredient("Flour").unwrap();
    let sugar = service.create_ingredient("Sugar").unwrap();
    let acme = service.create_supplier("Acme", "ACME Foods", 5550100).unwrap();
    let mill = service.create_supplier("Mill", "Old Mill", 5550199).unwrap();

    let group = service
        .link_suppliers(&[flour.uuid], &[acme.uuid, mill.uuid])
        .unwrap();
    service.link_suppliers(&[sugar.uuid], &[acme.uuid]).unwrap();

    let from_mill = service
        .list_ingredient_suppliers(&IngredientSupplierListQuery {
            supplier_uuid: Some(mill.uuid),
            ..IngredientSupplierListQuery::default()
        })
        .unwrap();
    assert_eq!(from_mill, vec![group.clone()]);

    let from_acme = service
        .list_ingredient_suppliers(&IngredientSupplierListQuery {
            supplier_uuid: Some(acme.uuid),
            ..IngredientSupplierListQuery::default()
        })
        .unwrap();
    assert_eq!(from_acme.len(), 2);

    let regrouped = service
        .set_group_ingredients(group.uuid, &[flour.uuid, sugar.uuid])
        .unwrap();
    assert_eq!(regrouped.ingredient_uuids.len(), 2);
    let regrouped = service.set_group_suppliers(group.uuid, &[mill.uuid]).unwrap();
    assert_eq!(regrouped.supplier_uuids, vec![mill.uuid]);

    assert!(matches!(
        service.link_suppliers(&[flour.uuid], &[Uuid::new_v4()]),
        Err(InventoryServiceError::SupplierNotFound(_))
    ));

    service.delete_ingredient_supplier(group.uuid).unwrap();
    assert_eq!(service.get_ingredient_supplier(group.uuid).unwrap(), None);
    assert!(service.get_supplier(mill.uuid).unwrap().is_some());
}

#[test]
fn supplier_names_are_validated_and_updated_in_full() {
    let conn = open_db_in_memory().unwrap();
    let service = inventory(&conn);

    let err = service.create_supplier("Acme", "  ", 1).unwrap_err();
    assert!(matches!(
        err,
        InventoryServiceError::Repo(RepoError::Validation(ValidationError::BlankField {
            field: "supplier.brand_name"
        }))
    ));

    let long_name = "s".repeat(200);
    let acme = service.create_supplier(&long_name, "ACME", 1).unwrap();
    let updated = service
        .update_supplier(&Supplier {
            legacy_name: "Acme  Ltd".to_string(),
            phone: 2,
            ..acme.clone()
        })
        .unwrap();
    assert_eq!(updated.legacy_name, "Acme Ltd");
    assert_eq!(service.get_supplier(acme.uuid).unwrap(), Some(updated));
    assert_eq!(
        service.list_suppliers(&ListQuery::default()).unwrap().len(),
        1
    );
}

#[test]
fn deleting_marker_detaches_it_from_storages() {
    let conn = open_db_in_memory().unwrap();
    let service = inventory(&conn);

    let cold = service.create_marker("keep cold").unwrap();
    let storage = service
        .receive_storage(&NewStorage {
            count: 1,
            ingredient_uuids: Vec::new(),
            marker_uuids: vec![cold.uuid],
        })
        .unwrap();

    service.delete_marker(cold.uuid).unwrap();
    let storage = service.get_storage(storage.uuid).unwrap().unwrap();
    assert!(storage.marker_uuids.is_empty());
    assert!(service.list_markers(&ListQuery::default()).unwrap().is_empty());
}
