//! Database seeder for Acopio development and testing.
//!
//! Seeds a material catalog, a budget line, and a full purchasing chain
//! (requisition -> purchase request -> two purchase orders -> a partial
//! receipt) for local development.
//!
//! Usage: cargo run --bin seeder

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use acopio_db::entities::{
    budget_lines, materials, purchase_order_lines, purchase_orders, purchase_request_lines,
    purchase_requests, requisition_lines, requisitions,
    sea_orm_active_enums::{
        ItemKind, LineStatus, MovementDirection, MovementSource, OrderStatus, RequestLineStatus,
    },
    warehouse_movements,
};

/// Demo front/specialty ID (consistent for all seeds)
const DEMO_FRONT_SPECIALTY_ID: &str = "00000000-0000-0000-0000-000000000001";
/// Demo warehouse user ID (consistent for all seeds)
const DEMO_USER_ID: &str = "00000000-0000-0000-0000-000000000002";
/// Demo cement material ID (consistent for all seeds)
const DEMO_CEMENT_ID: &str = "00000000-0000-0000-0000-000000000010";
/// Demo requisition ID (consistent for all seeds)
const DEMO_REQUISITION_ID: &str = "00000000-0000-0000-0000-000000000020";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = acopio_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding materials...");
    seed_materials(&db).await;

    println!("Seeding budget line...");
    seed_budget(&db).await;

    println!("Seeding purchasing chain...");
    seed_purchasing_chain(&db).await;

    println!("Seeding complete!");
}

fn demo_front_specialty_id() -> Uuid {
    Uuid::parse_str(DEMO_FRONT_SPECIALTY_ID).unwrap()
}

fn demo_user_id() -> Uuid {
    Uuid::parse_str(DEMO_USER_ID).unwrap()
}

fn demo_cement_id() -> Uuid {
    Uuid::parse_str(DEMO_CEMENT_ID).unwrap()
}

fn demo_requisition_id() -> Uuid {
    Uuid::parse_str(DEMO_REQUISITION_ID).unwrap()
}

/// Seeds a small material catalog.
async fn seed_materials(db: &DatabaseConnection) {
    if materials::Entity::find_by_id(demo_cement_id())
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  Materials already exist, skipping...");
        return;
    }

    let now = Utc::now();
    let catalog = [
        (demo_cement_id(), "Cemento Portland Tipo I", "bag"),
        (Uuid::now_v7(), "Fierro corrugado 1/2\"", "un"),
        (Uuid::now_v7(), "Arena gruesa", "m3"),
    ];

    for (id, name, unit) in catalog {
        let material = materials::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
            kind: Set(ItemKind::Material),
            unit: Set(unit.to_string()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        material.insert(db).await.expect("Failed to seed material");
    }
}

/// Seeds a budget line for cement on the demo front.
async fn seed_budget(db: &DatabaseConnection) {
    let existing = budget_lines::Entity::find().one(db).await.ok().flatten();
    if existing.is_some() {
        println!("  Budget lines already exist, skipping...");
        return;
    }

    let now = Utc::now();
    let line = budget_lines::ActiveModel {
        id: Set(Uuid::now_v7()),
        front_specialty_id: Set(demo_front_specialty_id()),
        material_id: Set(demo_cement_id()),
        quantity_budgeted: Set(Decimal::from(100)),
        quantity_utilized: Set(Decimal::from(50)),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };
    line.insert(db).await.expect("Failed to seed budget line");
}

/// Seeds a requisition for 50 bags of cement, sourced by one purchase
/// request and two purchase orders (30 + 20), with 35 bags received.
async fn seed_purchasing_chain(db: &DatabaseConnection) {
    if requisitions::Entity::find_by_id(demo_requisition_id())
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  Purchasing chain already exists, skipping...");
        return;
    }

    let now = Utc::now();

    let requisition = requisitions::ActiveModel {
        id: Set(demo_requisition_id()),
        front_specialty_id: Set(demo_front_specialty_id()),
        block: Set(Some("Block A".to_string())),
        requested_by: Set(demo_user_id()),
        date: Set(NaiveDate::from_ymd_opt(2026, 7, 1).unwrap()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };
    requisition
        .insert(db)
        .await
        .expect("Failed to seed requisition");

    let line = requisition_lines::ActiveModel {
        id: Set(Uuid::now_v7()),
        requisition_id: Set(demo_requisition_id()),
        kind: Set(ItemKind::Material),
        material_id: Set(Some(demo_cement_id())),
        equipment_id: Set(None),
        ppe_id: Set(None),
        item_description: Set(None),
        unit: Set("bag".to_string()),
        quantity_requested: Set(Decimal::from(50)),
        quantity_fulfilled: Set(Decimal::from(35)),
        status: Set(LineStatus::Partial),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };
    line.insert(db)
        .await
        .expect("Failed to seed requisition line");

    let request = purchase_requests::ActiveModel {
        id: Set(Uuid::now_v7()),
        request_date: Set(NaiveDate::from_ymd_opt(2026, 7, 3).unwrap()),
        created_at: Set(now.into()),
    };
    let request = request
        .insert(db)
        .await
        .expect("Failed to seed purchase request");

    let request_line = purchase_request_lines::ActiveModel {
        id: Set(Uuid::now_v7()),
        purchase_request_id: Set(request.id),
        requisition_id: Set(demo_requisition_id()),
        kind: Set(ItemKind::Material),
        material_id: Set(Some(demo_cement_id())),
        equipment_id: Set(None),
        ppe_id: Set(None),
        item_description: Set(None),
        quantity: Set(Decimal::from(50)),
        status: Set(RequestLineStatus::Open),
        created_at: Set(now.into()),
    };
    let request_line = request_line
        .insert(db)
        .await
        .expect("Failed to seed purchase request line");

    // Two orders against the same request line: the older absorbs
    // receipts first.
    let order_specs = [
        (NaiveDate::from_ymd_opt(2026, 7, 5).unwrap(), 30i64, "Ferreteria Central"),
        (NaiveDate::from_ymd_opt(2026, 7, 12).unwrap(), 20i64, "Distribuidora Sur"),
    ];
    for (order_date, quantity, supplier) in order_specs {
        let order = purchase_orders::ActiveModel {
            id: Set(Uuid::now_v7()),
            status: Set(OrderStatus::Issued),
            order_date: Set(order_date),
            supplier_name: Set(Some(supplier.to_string())),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        let order = order.insert(db).await.expect("Failed to seed order");

        let order_line = purchase_order_lines::ActiveModel {
            id: Set(Uuid::now_v7()),
            purchase_order_id: Set(order.id),
            purchase_request_line_id: Set(request_line.id),
            quantity: Set(Decimal::from(quantity)),
            created_at: Set(now.into()),
        };
        order_line
            .insert(db)
            .await
            .expect("Failed to seed order line");
    }

    // 35 bags received against the OC pipeline: the older order is fully
    // consumed, the newer keeps 15 pending.
    let movement = warehouse_movements::ActiveModel {
        id: Set(Uuid::now_v7()),
        direction: Set(MovementDirection::In),
        kind: Set(ItemKind::Material),
        material_id: Set(Some(demo_cement_id())),
        equipment_id: Set(None),
        ppe_id: Set(None),
        item_description: Set(None),
        quantity: Set(Decimal::from(35)),
        requisition_id: Set(demo_requisition_id()),
        source: Set(MovementSource::PurchaseOrder),
        destination: Set(Some("Block A warehouse".to_string())),
        recorded_by: Set(demo_user_id()),
        recorded_at: Set(now.into()),
    };
    movement.insert(db).await.expect("Failed to seed movement");
}
