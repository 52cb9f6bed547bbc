//! Demo dataset for the dev server and the HTTP tests.

use chrono::{Duration, Utc};
use serde_json::json;

use stocklens_engine::InMemoryStore;

/// Seed every collection the catalog queries with a small, deterministic
/// back-office snapshot spread over the last few months.
pub fn demo_data(store: &InMemoryStore) {
    let now = Utc::now();
    let day = |back: i64| (now - Duration::days(back)).format("%Y-%m-%d").to_string();

    let mut orders = Vec::new();
    for i in 0..60i64 {
        orders.push(json!({
            "order_id": format!("so-{i:03}"),
            "customer_id": format!("c-{:02}", i % 6),
            "customer_name": format!("Customer {:02}", i % 6),
            "ordered_at": day(i),
            "total": 120.0 + (i % 7) as f64 * 35.0,
            "warehouse": if i % 3 == 0 { "north" } else { "south" },
        }));
    }
    store.seed("orders", orders);

    let products = [
        ("p-001", "Cordless Drill", "tools"),
        ("p-002", "Claw Hammer", "tools"),
        ("p-003", "Hex Bolt M8", "fasteners"),
        ("p-004", "Wood Screw 4x40", "fasteners"),
        ("p-005", "Safety Goggles", "safety"),
    ];
    let mut lines = Vec::new();
    for i in 0..80i64 {
        let (id, name, category) = products[(i % 4) as usize];
        lines.push(json!({
            "product_id": id,
            "product_name": name,
            "category": category,
            "ordered_at": day(i % 50),
            "quantity": 1 + i % 5,
            "line_total": 25.0 * (1 + i % 5) as f64,
            "warehouse": if i % 2 == 0 { "north" } else { "south" },
        }));
    }
    store.seed("order_lines", lines);

    let mut inventory = Vec::new();
    for (i, (id, name, category)) in products.iter().enumerate() {
        for warehouse in ["north", "south"] {
            inventory.push(json!({
                "product_id": id,
                "product_name": name,
                "category": category,
                "warehouse": warehouse,
                "quantity": (i as i64 * 7) % 40,
                "reorder_point": 10,
                "max_stock": 30,
                "unit_cost": 4.0 + i as f64 * 2.5,
            }));
        }
    }
    store.seed("inventory", inventory);

    let mut customers = Vec::new();
    for i in 0..6i64 {
        let segment = ["retail", "wholesale", "online"][(i % 3) as usize];
        customers.push(json!({
            "customer_id": format!("c-{i:02}"),
            "name": format!("Customer {i:02}"),
            "segment": segment,
            "outstanding_balance": 250.0 * i as f64,
            "credit_limit": 5000.0,
        }));
    }
    store.seed("customers", customers);

    let suppliers = [("s-01", "Northfield Supply"), ("s-02", "Ironside Tools")];
    let mut purchase_orders = Vec::new();
    for i in 0..30i64 {
        let (id, name) = suppliers[(i % 2) as usize];
        purchase_orders.push(json!({
            "po_id": format!("po-{i:03}"),
            "supplier_id": id,
            "supplier_name": name,
            "ordered_at": day(i * 3),
            "total": 800.0 + (i % 5) as f64 * 150.0,
            "status": if i % 5 == 0 { "open" } else { "received" },
        }));
    }
    store.seed("purchase_orders", purchase_orders);

    store.seed(
        "warehouses",
        vec![
            json!({"id": "north", "name": "North DC"}),
            json!({"id": "south", "name": "South DC"}),
        ],
    );
    store.seed(
        "categories",
        vec![
            json!({"id": "tools", "name": "Tools"}),
            json!({"id": "fasteners", "name": "Fasteners"}),
            json!({"id": "safety", "name": "Safety"}),
        ],
    );
}
