use pantry_core::db::open_db_in_memory;
use pantry_core::model::validation::ValidationError;
use pantry_core::repo::catalog_repo::{ProductListQuery, ReceptListQuery};
use pantry_core::{
    CatalogService, CatalogServiceError, InventoryService, ListQuery, OrderService, RepoError,
    SqliteCatalogRepository, SqliteInventoryRepository, SqliteOrderRepository,
};
use rusqlite::Connection;
use uuid::Uuid;

#[test]
fn create_category_normalizes_name_and_lists_case_insensitively() {
    let conn = open_db_in_memory().unwrap();
    let service = CatalogService::new(SqliteCatalogRepository::try_new(&conn).unwrap());

    let dairy = service.create_category("  dairy \n products ").unwrap();
    service.create_category("Bakery").unwrap();
    service.create_category("coffee").unwrap();
    assert_eq!(dairy.name, "dairy products");

    let names: Vec<String> = service
        .list_categories(&ListQuery::default())
        .unwrap()
        .into_iter()
        .map(|category| category.name)
        .collect();
    assert_eq!(names, vec!["Bakery", "coffee", "dairy products"]);
}

#[test]
fn cyrillic_names_list_case_insensitively() {
    let conn = open_db_in_memory().unwrap();
    let service = CatalogService::new(SqliteCatalogRepository::try_new(&conn).unwrap());

    for name in ["молоко", "Мука", "арахис", "Bakery"] {
        service.create_category(name).unwrap();
    }

    let names: Vec<String> = service
        .list_categories(&ListQuery::default())
        .unwrap()
        .into_iter()
        .map(|category| category.name)
        .collect();
    assert_eq!(names, vec!["Bakery", "арахис", "молоко", "Мука"]);
}

#[test]
fn blank_or_oversized_names_are_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = CatalogService::new(SqliteCatalogRepository::try_new(&conn).unwrap());

    let err = service.create_category("   ").unwrap_err();
    assert!(matches!(
        err,
        CatalogServiceError::Repo(RepoError::Validation(ValidationError::BlankField {
            field: "category.name"
        }))
    ));

    let category = service.create_category("Dairy").unwrap();
    let err = service
        .create_product(category.uuid, &"m".repeat(101))
        .unwrap_err();
    assert!(matches!(
        err,
        CatalogServiceError::Repo(RepoError::Validation(ValidationError::TooLong {
            max_chars: 100,
            actual_chars: 101,
            ..
        }))
    ));
}

#[test]
fn products_and_recepts_require_existing_parents() {
    let conn = open_db_in_memory().unwrap();
    let service = CatalogService::new(SqliteCatalogRepository::try_new(&conn).unwrap());

    let missing = Uuid::new_v4();
    assert!(matches!(
        service.create_product(missing, "Milk"),
        Err(CatalogServiceError::CategoryNotFound(id)) if id == missing
    ));
    assert!(matches!(
        service.create_recept(missing, Some(10)),
        Err(CatalogServiceError::ProductNotFound(id)) if id == missing
    ));
    assert!(matches!(
        service.create_recept_details(missing, None, 1),
        Err(CatalogServiceError::ReceptNotFound(id)) if id == missing
    ));
}

#[test]
fn products_filter_by_category_and_can_move() {
    let conn = open_db_in_memory().unwrap();
    let service = CatalogService::new(SqliteCatalogRepository::try_new(&conn).unwrap());

    let dairy = service.create_category("Dairy").unwrap();
    let bakery = service.create_category("Bakery").unwrap();
    let milk = service.create_product(dairy.uuid, "Milk").unwrap();
    service.create_product(dairy.uuid, "Butter").unwrap();
    service.create_product(bakery.uuid, "Bread").unwrap();

    let dairy_query = ProductListQuery {
        category_uuid: Some(dairy.uuid),
        ..ProductListQuery::default()
    };
    let names: Vec<String> = service
        .list_products(&dairy_query)
        .unwrap()
        .into_iter()
        .map(|product| product.name)
        .collect();
    assert_eq!(names, vec!["Butter", "Milk"]);

    let moved = service
        .update_product(milk.uuid, "Oat milk", Some(bakery.uuid))
        .unwrap();
    assert_eq!(moved.category_uuid, bakery.uuid);
    assert_eq!(service.list_products(&dairy_query).unwrap().len(), 1);

    assert!(matches!(
        service.update_product(milk.uuid, "Oat milk", Some(Uuid::new_v4())),
        Err(CatalogServiceError::CategoryNotFound(_))
    ));
}

#[test]
fn recept_price_is_optional_and_updatable() {
    let conn = open_db_in_memory().unwrap();
    let service = CatalogService::new(SqliteCatalogRepository::try_new(&conn).unwrap());

    let dairy = service.create_category("Dairy").unwrap();
    let milk = service.create_product(dairy.uuid, "Milk").unwrap();
    let recept = service.create_recept(milk.uuid, None).unwrap();
    assert_eq!(recept.price, None);

    let priced = service.set_recept_price(recept.uuid, Some(120)).unwrap();
    assert_eq!(priced.price, Some(120));

    let listed = service
        .list_recepts(&ReceptListQuery {
            product_uuid: Some(milk.uuid),
            ..ReceptListQuery::default()
        })
        .unwrap();
    assert_eq!(listed, vec![priced]);
}

#[test]
fn recept_holds_at_most_one_details_row() {
    let conn = open_db_in_memory().unwrap();
    let catalog = CatalogService::new(SqliteCatalogRepository::try_new(&conn).unwrap());
    let inventory = InventoryService::new(SqliteInventoryRepository::try_new(&conn).unwrap());

    let dairy = catalog.create_category("Dairy").unwrap();
    let milk = catalog.create_product(dairy.uuid, "Milk").unwrap();
    let recept = catalog.create_recept(milk.uuid, Some(90)).unwrap();
    let lactose = inventory.create_ingredient("Lactose").unwrap();

    let details = catalog
        .create_recept_details(recept.uuid, Some(lactose.uuid), 3)
        .unwrap();
    assert_eq!(
        catalog.find_details_for_recept(recept.uuid).unwrap(),
        Some(details.clone())
    );

    assert!(matches!(
        catalog.create_recept_details(recept.uuid, None, 1),
        Err(CatalogServiceError::DetailsAlreadyExist(id)) if id == recept.uuid
    ));

    let updated = catalog
        .update_recept_details(details.uuid, None, 5)
        .unwrap();
    assert_eq!(updated.ingredient_uuid, None);
    assert_eq!(updated.count, 5);
}

#[test]
fn recept_details_with_unknown_ingredient_are_rejected() {
    let conn = open_db_in_memory().unwrap();
    let catalog = CatalogService::new(SqliteCatalogRepository::try_new(&conn).unwrap());

    let dairy = catalog.create_category("Dairy").unwrap();
    let milk = catalog.create_product(dairy.uuid, "Milk").unwrap();
    let recept = catalog.create_recept(milk.uuid, None).unwrap();

    let missing = Uuid::new_v4();
    assert!(matches!(
        catalog.create_recept_details(recept.uuid, Some(missing), 1),
        Err(CatalogServiceError::IngredientNotFound(id)) if id == missing
    ));
    assert_eq!(catalog.find_details_for_recept(recept.uuid).unwrap(), None);
}

#[test]
fn deleting_category_cascades_through_catalog_and_order_links() {
    let conn = open_db_in_memory().unwrap();
    let catalog = CatalogService::new(SqliteCatalogRepository::try_new(&conn).unwrap());
    let orders = OrderService::new(SqliteOrderRepository::try_new(&conn).unwrap());

    let dairy = catalog.create_category("Dairy").unwrap();
    let bakery = catalog.create_category("Bakery").unwrap();
    let milk = catalog.create_product(dairy.uuid, "Milk").unwrap();
    let bread = catalog.create_product(bakery.uuid, "Bread").unwrap();
    let milk_recept = catalog.create_recept(milk.uuid, Some(90)).unwrap();
    let bread_recept = catalog.create_recept(bread.uuid, Some(40)).unwrap();
    catalog
        .create_recept_details(milk_recept.uuid, None, 2)
        .unwrap();

    let ann = orders.register_user("ann").unwrap();
    let order = orders.place_order(ann.uuid).unwrap();
    orders.attach_recept(order.uuid, milk_recept.uuid).unwrap();
    let other_order = orders.place_order(ann.uuid).unwrap();
    orders
        .attach_recept(other_order.uuid, bread_recept.uuid)
        .unwrap();

    catalog.delete_category(dairy.uuid).unwrap();

    assert_eq!(catalog.get_product(milk.uuid).unwrap(), None);
    assert_eq!(catalog.get_recept(milk_recept.uuid).unwrap(), None);
    assert_eq!(row_count(&conn, "recept_details"), 0);
    assert_eq!(orders.recept_link_for_order(order.uuid).unwrap(), None);
    // Orders themselves survive; only their receipt link goes.
    assert!(orders.get_order(order.uuid).unwrap().is_some());

    assert!(catalog.get_product(bread.uuid).unwrap().is_some());
    assert!(orders
        .recept_link_for_order(other_order.uuid)
        .unwrap()
        .is_some());
    assert_eq!(row_count(&conn, "categories"), 1);
}

#[test]
fn deleting_missing_rows_reports_not_found() {
    let conn = open_db_in_memory().unwrap();
    let catalog = CatalogService::new(SqliteCatalogRepository::try_new(&conn).unwrap());

    let missing = Uuid::new_v4();
    assert!(matches!(
        catalog.delete_category(missing),
        Err(CatalogServiceError::CategoryNotFound(id)) if id == missing
    ));
    assert!(matches!(
        catalog.delete_recept_details(missing),
        Err(CatalogServiceError::ReceptDetailsNotFound(_))
    ));
    assert!(matches!(
        catalog.rename_category(missing, "Dairy"),
        Err(CatalogServiceError::CategoryNotFound(_))
    ));
}

fn row_count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}
