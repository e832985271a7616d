mod common;

use chrono::{Duration, Utc};
use foodtrack_api::{
    entities::LogAction,
    services::{foods::NewFood, inventory::ExpiryStatus, nutrition_logs::AppendLogEvent},
};

fn in_days(days: i64) -> Option<chrono::NaiveDate> {
    Some(Utc::now().date_naive() + Duration::days(days))
}

#[tokio::test]
async fn view_excludes_zero_quantity_items() {
    let ctx = common::setup().await;
    ctx.foods
        .create_food(NewFood {
            quantity: Some(2),
            ..common::sample_food("300001", "In Stock")
        })
        .await
        .unwrap();
    ctx.foods
        .create_food(NewFood {
            quantity: Some(0),
            ..common::sample_food("300002", "Out Of Stock")
        })
        .await
        .unwrap();

    let view = ctx.inventory.inventory_view(None).await.unwrap();
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].food.name, "In Stock");
}

#[tokio::test]
async fn item_clamped_to_zero_disappears_immediately() {
    let ctx = common::setup().await;
    let food = ctx
        .foods
        .create_food(NewFood {
            quantity: Some(1),
            ..common::sample_food("300003", "Last One")
        })
        .await
        .unwrap();

    assert_eq!(ctx.inventory.inventory_view(None).await.unwrap().len(), 1);

    ctx.logs
        .apply_log_event(AppendLogEvent {
            food_id: food.id,
            quantity: 9,
            action: LogAction::Consumed,
            timestamp: None,
        })
        .await
        .unwrap();

    assert!(ctx.inventory.inventory_view(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn view_filters_by_category() {
    let ctx = common::setup().await;
    for (barcode, name, category) in [
        ("300004", "Milk", "Dairy"),
        ("300005", "Cheese", "Dairy"),
        ("300006", "Bread", "Bakery"),
    ] {
        ctx.foods
            .create_food(NewFood {
                category: Some(category.to_string()),
                quantity: Some(1),
                ..common::sample_food(barcode, name)
            })
            .await
            .unwrap();
    }

    let dairy = ctx.inventory.inventory_view(Some("Dairy")).await.unwrap();
    assert_eq!(dairy.len(), 2);
    assert!(dairy
        .iter()
        .all(|r| r.food.category.as_deref() == Some("Dairy")));
}

#[tokio::test]
async fn view_orders_by_expiry_date_with_undated_last() {
    let ctx = common::setup().await;
    for (barcode, name, expiry) in [
        ("300007", "Undated", None),
        ("300008", "Later", in_days(20)),
        ("300009", "Sooner", in_days(2)),
    ] {
        ctx.foods
            .create_food(NewFood {
                expiry_date: expiry,
                quantity: Some(1),
                ..common::sample_food(barcode, name)
            })
            .await
            .unwrap();
    }

    let view = ctx.inventory.inventory_view(None).await.unwrap();
    let names: Vec<&str> = view.iter().map(|r| r.food.name.as_str()).collect();
    assert_eq!(names, vec!["Sooner", "Later", "Undated"]);
}

#[tokio::test]
async fn view_classifies_expiry_at_the_boundaries() {
    let ctx = common::setup().await;
    for (barcode, name, expiry) in [
        ("300010", "Gone Off", in_days(-1)),
        ("300011", "Edge Of Window", in_days(7)),
        ("300012", "Just Outside", in_days(8)),
        ("300013", "No Date", None),
    ] {
        ctx.foods
            .create_food(NewFood {
                expiry_date: expiry,
                quantity: Some(1),
                ..common::sample_food(barcode, name)
            })
            .await
            .unwrap();
    }

    let view = ctx.inventory.inventory_view(None).await.unwrap();
    let status_of = |name: &str| {
        view.iter()
            .find(|r| r.food.name == name)
            .map(|r| r.expiry_status)
            .unwrap()
    };

    assert_eq!(status_of("Gone Off"), ExpiryStatus::Expired);
    assert_eq!(status_of("Edge Of Window"), ExpiryStatus::ExpiresSoon);
    assert_eq!(status_of("Just Outside"), ExpiryStatus::Fresh);
    assert_eq!(status_of("No Date"), ExpiryStatus::NoExpiryDate);
}

#[tokio::test]
async fn expiring_foods_respects_window_and_stock() {
    let ctx = common::setup().await;
    for (barcode, name, expiry, qty) in [
        ("300014", "Soon", in_days(3), 1),
        ("300015", "Too Far", in_days(30), 1),
        ("300016", "Already Expired", in_days(-2), 1),
        ("300017", "Soon But Empty", in_days(3), 0),
    ] {
        ctx.foods
            .create_food(NewFood {
                expiry_date: expiry,
                quantity: Some(qty),
                ..common::sample_food(barcode, name)
            })
            .await
            .unwrap();
    }

    let expiring = ctx.inventory.expiring_foods(7).await.unwrap();
    let names: Vec<&str> = expiring.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["Soon"]);
}

#[tokio::test]
async fn low_stock_orders_by_quantity_ascending() {
    let ctx = common::setup().await;
    for (barcode, name, qty) in [
        ("300018", "Plenty", 50),
        ("300019", "Low", 2),
        ("300020", "Empty", 0),
        ("300021", "Borderline", 5),
    ] {
        ctx.foods
            .create_food(NewFood {
                quantity: Some(qty),
                ..common::sample_food(barcode, name)
            })
            .await
            .unwrap();
    }

    let low = ctx.inventory.low_stock_foods(5).await.unwrap();
    let names: Vec<&str> = low.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["Empty", "Low", "Borderline"]);
}
