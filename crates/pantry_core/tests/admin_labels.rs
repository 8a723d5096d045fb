use pantry_core::db::open_db_in_memory;
use pantry_core::model::inventory::NewStorage;
use pantry_core::{
    AdminService, CatalogService, EntityKind, InventoryService, OrderService,
    SqliteAdminRepository, SqliteCatalogRepository, SqliteInventoryRepository,
    SqliteOrderRepository,
};

#[test]
fn entity_counts_cover_every_entity_in_display_order() {
    let conn = open_db_in_memory().unwrap();
    let catalog = CatalogService::new(SqliteCatalogRepository::try_new(&conn).unwrap());
    let admin = AdminService::new(SqliteAdminRepository::try_new(&conn).unwrap());

    let dairy = catalog.create_category("Dairy").unwrap();
    catalog.create_product(dairy.uuid, "Milk").unwrap();
    catalog.create_product(dairy.uuid, "Butter").unwrap();

    let counts = admin.entity_counts().unwrap();
    let kinds: Vec<EntityKind> = counts.iter().map(|item| item.entity).collect();
    assert_eq!(kinds, EntityKind::all());

    let count_of = |entity: EntityKind| {
        counts
            .iter()
            .find(|item| item.entity == entity)
            .map(|item| item.count)
            .unwrap()
    };
    assert_eq!(count_of(EntityKind::Category), 1);
    assert_eq!(count_of(EntityKind::Product), 2);
    assert_eq!(count_of(EntityKind::Order), 0);
}

#[test]
fn labels_follow_record_display_rules() {
    let conn = open_db_in_memory().unwrap();
    let catalog = CatalogService::new(SqliteCatalogRepository::try_new(&conn).unwrap());
    let orders = OrderService::new(SqliteOrderRepository::try_new(&conn).unwrap());
    let inventory = InventoryService::new(SqliteInventoryRepository::try_new(&conn).unwrap());
    let admin = AdminService::new(SqliteAdminRepository::try_new(&conn).unwrap());

    let dairy = catalog.create_category("Dairy").unwrap();
    let milk = catalog.create_product(dairy.uuid, "Milk").unwrap();
    let priced = catalog.create_recept(milk.uuid, Some(90)).unwrap();
    let unpriced = catalog.create_recept(milk.uuid, None).unwrap();
    let lactose = inventory.create_ingredient("Lactose").unwrap();
    let details = catalog
        .create_recept_details(priced.uuid, Some(lactose.uuid), 1)
        .unwrap();
    let bare_details = catalog
        .create_recept_details(unpriced.uuid, None, 1)
        .unwrap();

    let ann = orders.register_user("ann").unwrap();
    let order = orders.place_order(ann.uuid).unwrap();
    let link = orders.attach_recept(order.uuid, priced.uuid).unwrap();

    let flour = inventory.create_ingredient("Flour").unwrap();
    let storage = inventory
        .receive_storage(&NewStorage {
            count: 1,
            ingredient_uuids: vec![lactose.uuid, flour.uuid],
            marker_uuids: Vec::new(),
        })
        .unwrap();
    let acme = inventory.create_supplier("Acme", "ACME Foods", 1).unwrap();
    let group = inventory
        .link_suppliers(&[flour.uuid], &[acme.uuid])
        .unwrap();

    let label = |entity, id| admin.label_of(entity, id).unwrap().unwrap();
    assert_eq!(label(EntityKind::Recept, priced.uuid), "Milk (90)");
    assert_eq!(label(EntityKind::Recept, unpriced.uuid), "Milk (None)");
    assert_eq!(
        label(EntityKind::ReceptDetails, details.uuid),
        "Milk (90) - Lactose"
    );
    assert_eq!(
        label(EntityKind::ReceptDetails, bare_details.uuid),
        "Milk (None) - None"
    );
    assert_eq!(label(EntityKind::Order, order.uuid), "Order Receipt for ann");
    assert_eq!(
        label(EntityKind::OrderRecept, link.uuid),
        "Order Recept for Milk"
    );
    assert_eq!(label(EntityKind::Storage, storage.uuid), "Flour, Lactose");
    assert_eq!(
        label(EntityKind::IngredientSupplier, group.uuid),
        "Flour, Acme"
    );
    assert_eq!(label(EntityKind::Supplier, acme.uuid), "Acme");
    assert_eq!(admin.label_of(EntityKind::Category, milk.uuid).unwrap(), None);
}

#[test]
fn label_listing_pages_in_label_order() {
    let conn = open_db_in_memory().unwrap();
    let inventory = InventoryService::new(SqliteInventoryRepository::try_new(&conn).unwrap());
    let admin = AdminService::new(SqliteAdminRepository::try_new(&conn).unwrap());

    for name in ["sugar", "Flour", "butter"] {
        inventory.create_ingredient(name).unwrap();
    }

    let first_page = admin
        .list_labels(EntityKind::Ingredient, Some(2), 0)
        .unwrap();
    assert_eq!(first_page.applied_limit, 2);
    let labels: Vec<&str> = first_page
        .items
        .iter()
        .map(|item| item.label.as_str())
        .collect();
    assert_eq!(labels, vec!["butter", "Flour"]);

    let rest = admin
        .list_labels(EntityKind::Ingredient, Some(2), 2)
        .unwrap();
    assert_eq!(rest.items.len(), 1);
    assert_eq!(rest.items[0].label, "sugar");

    for name in ["молоко", "Мука", "арахис"] {
        inventory.create_marker(name).unwrap();
    }
    let markers: Vec<String> = admin
        .list_labels(EntityKind::Marker, None, 0)
        .unwrap()
        .items
        .into_iter()
        .map(|item| item.label)
        .collect();
    assert_eq!(markers, vec!["арахис", "молоко", "Мука"]);

    let defaulted = admin.list_labels(EntityKind::Supplier, None, 0).unwrap();
    assert_eq!(defaulted.applied_limit, 50);
    assert!(defaulted.items.is_empty());
}
