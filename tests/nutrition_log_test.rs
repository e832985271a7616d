mod common;

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use foodtrack_api::{
    entities::{
        nutrition_log::{self, Entity as NutritionLog},
        LogAction,
    },
    errors::ServiceError,
    services::{foods::NewFood, nutrition_logs::AppendLogEvent},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

fn event(food_id: Uuid, quantity: i32, action: LogAction) -> AppendLogEvent {
    AppendLogEvent {
        food_id,
        quantity,
        action,
        timestamp: None,
    }
}

#[tokio::test]
async fn removal_then_oversubtraction_clamps_to_zero() {
    let ctx = common::setup().await;
    let food = ctx
        .foods
        .create_food(NewFood {
            quantity: Some(10),
            ..common::sample_food("100001", "Oat Milk")
        })
        .await
        .unwrap();

    let (_, qty) = ctx
        .logs
        .apply_log_event(event(food.id, 3, LogAction::Removed))
        .await
        .unwrap();
    assert_eq!(qty, 7);

    // Consuming more than is on hand floors at zero instead of going negative.
    let (_, qty) = ctx
        .logs
        .apply_log_event(event(food.id, 20, LogAction::Consumed))
        .await
        .unwrap();
    assert_eq!(qty, 0);

    let stored = ctx.foods.get_food(food.id).await.unwrap();
    assert_eq!(stored.quantity, 0);

    // The clamped item no longer shows up in the inventory view.
    let view = ctx.inventory.inventory_view(None).await.unwrap();
    assert!(view.iter().all(|record| record.food.id != food.id));
}

#[tokio::test]
async fn intermediate_clamp_differs_from_end_only_reduction() {
    let ctx = common::setup().await;
    let food = ctx
        .foods
        .create_food(NewFood {
            quantity: Some(5),
            ..common::sample_food("100002", "Yogurt")
        })
        .await
        .unwrap();

    // 5 - 10 clamps to 0 mid-sequence; a naive end-only reduction would
    // give max(0, 5 - 10 + 4) = 0 instead of 4.
    let (_, qty) = ctx
        .logs
        .apply_log_event(event(food.id, 10, LogAction::Consumed))
        .await
        .unwrap();
    assert_eq!(qty, 0);

    let (_, qty) = ctx
        .logs
        .apply_log_event(event(food.id, 4, LogAction::Added))
        .await
        .unwrap();
    assert_eq!(qty, 4);
}

#[tokio::test]
async fn quantity_never_goes_negative_over_event_sequences() {
    let ctx = common::setup().await;
    let food = ctx
        .foods
        .create_food(common::sample_food("100003", "Eggs"))
        .await
        .unwrap();

    let sequence = [
        (12, LogAction::Added),
        (4, LogAction::Consumed),
        (100, LogAction::Removed),
        (2, LogAction::Added),
        (1, LogAction::Expired),
        (7, LogAction::Consumed),
        (3, LogAction::Added),
    ];

    for (quantity, action) in sequence {
        let (_, qty) = ctx
            .logs
            .apply_log_event(event(food.id, quantity, action))
            .await
            .unwrap();
        assert!(qty >= 0, "quantity went negative after {:?}", action);
    }

    let stored = ctx.foods.get_food(food.id).await.unwrap();
    assert_eq!(stored.quantity, 3);
}

#[tokio::test]
async fn negative_magnitude_is_rejected_without_a_ledger_entry() {
    let ctx = common::setup().await;
    let food = ctx
        .foods
        .create_food(NewFood {
            quantity: Some(5),
            ..common::sample_food("100004", "Butter")
        })
        .await
        .unwrap();

    let err = ctx
        .logs
        .apply_log_event(event(food.id, -3, LogAction::Added))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));

    let (logs, total) = ctx.logs.list_logs(Some(food.id), 1, 20).await.unwrap();
    assert!(logs.is_empty());
    assert_eq!(total, 0);
    assert_eq!(ctx.foods.get_food(food.id).await.unwrap().quantity, 5);
}

#[tokio::test]
async fn unknown_food_fails_with_not_found() {
    let ctx = common::setup().await;
    let err = ctx
        .logs
        .apply_log_event(event(Uuid::new_v4(), 1, LogAction::Added))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn action_outside_enumeration_is_rejected_by_the_schema() {
    let ctx = common::setup().await;
    let food = ctx
        .foods
        .create_food(NewFood {
            quantity: Some(5),
            ..common::sample_food("100005", "Cheddar")
        })
        .await
        .unwrap();

    // Bypass the typed service API: the check constraint is the last line
    // of defense against unknown actions.
    let result = nutrition_log::ActiveModel {
        food_id: Set(food.id),
        quantity: Set(1),
        action: Set("discarded".to_string()),
        ..Default::default()
    }
    .insert(ctx.db.as_ref())
    .await;

    assert!(result.is_err());
    assert_eq!(ctx.foods.get_food(food.id).await.unwrap().quantity, 5);
}

#[tokio::test]
async fn explicit_timestamp_is_stored_and_default_is_append_time() {
    let ctx = common::setup().await;
    let food = ctx
        .foods
        .create_food(common::sample_food("100006", "Bread"))
        .await
        .unwrap();

    let yesterday = Utc::now() - Duration::days(1);
    let (entry, _) = ctx
        .logs
        .apply_log_event(AppendLogEvent {
            food_id: food.id,
            quantity: 2,
            action: LogAction::Added,
            timestamp: Some(yesterday),
        })
        .await
        .unwrap();
    assert!((entry.timestamp - yesterday).num_seconds().abs() < 1);

    let before = Utc::now();
    let (entry, _) = ctx
        .logs
        .apply_log_event(event(food.id, 1, LogAction::Added))
        .await
        .unwrap();
    assert!(entry.timestamp >= before - Duration::seconds(5));
}

#[tokio::test]
async fn ledger_lists_newest_first_and_filters_by_food() {
    let ctx = common::setup().await;
    let bread = ctx
        .foods
        .create_food(common::sample_food("100007", "Bread"))
        .await
        .unwrap();
    let jam = ctx
        .foods
        .create_food(common::sample_food("100008", "Jam"))
        .await
        .unwrap();

    let base = Utc::now() - Duration::hours(3);
    for (offset, food_id) in [(0, bread.id), (1, jam.id), (2, bread.id)] {
        ctx.logs
            .apply_log_event(AppendLogEvent {
                food_id,
                quantity: 1,
                action: LogAction::Added,
                timestamp: Some(base + Duration::hours(offset)),
            })
            .await
            .unwrap();
    }

    let (all, total) = ctx.logs.list_logs(None, 1, 20).await.unwrap();
    assert_eq!(total, 3);
    assert!(all.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));

    let (bread_logs, total) = ctx.logs.list_logs(Some(bread.id), 1, 20).await.unwrap();
    assert_eq!(total, 2);
    assert!(bread_logs.iter().all(|l| l.food_id == bread.id));
}

#[tokio::test]
async fn deleting_a_food_cascades_its_ledger_entries() {
    let ctx = common::setup().await;
    let food = ctx
        .foods
        .create_food(common::sample_food("100009", "Milk"))
        .await
        .unwrap();

    for _ in 0..3 {
        ctx.logs
            .apply_log_event(event(food.id, 1, LogAction::Added))
            .await
            .unwrap();
    }

    ctx.foods.delete_food(food.id).await.unwrap();

    let remaining = NutritionLog::find()
        .filter(nutrition_log::Column::FoodId.eq(food.id))
        .all(ctx.db.as_ref())
        .await
        .unwrap();
    assert!(remaining.is_empty());
}

#[tokio::test]
async fn concurrent_consumption_reflects_a_serial_history() {
    let ctx = common::setup().await;
    let food = ctx
        .foods
        .create_food(NewFood {
            quantity: Some(5),
            ..common::sample_food("100010", "Juice")
        })
        .await
        .unwrap();

    let logs_a = ctx.logs.clone();
    let logs_b = ctx.logs.clone();
    let id = food.id;
    let (a, b) = tokio::join!(
        logs_a.apply_log_event(event(id, 5, LogAction::Consumed)),
        logs_b.apply_log_event(event(id, 5, LogAction::Consumed)),
    );
    a.unwrap();
    b.unwrap();

    // One event consumes fully, the other clamps; either order ends at zero
    // with both entries on the ledger.
    assert_eq!(ctx.foods.get_food(id).await.unwrap().quantity, 0);
    let (_, total) = ctx.logs.list_logs(Some(id), 1, 20).await.unwrap();
    assert_eq!(total, 2);
}

#[tokio::test]
async fn addition_saturates_at_the_quantity_ceiling() {
    let ctx = common::setup().await;
    let food = ctx
        .foods
        .create_food(common::sample_food("100012", "Canned Beans"))
        .await
        .unwrap();

    let (_, qty) = ctx
        .logs
        .apply_log_event(event(food.id, i32::MAX, LogAction::Added))
        .await
        .unwrap();
    assert_eq!(qty, i32::MAX);

    // A further addition pins at the ceiling instead of wrapping negative.
    let (_, qty) = ctx
        .logs
        .apply_log_event(event(food.id, 1, LogAction::Added))
        .await
        .unwrap();
    assert_eq!(qty, i32::MAX);
    assert_eq!(ctx.foods.get_food(food.id).await.unwrap().quantity, i32::MAX);
}

#[tokio::test]
async fn reapplying_an_event_is_not_idempotent() {
    let ctx = common::setup().await;
    let food = ctx
        .foods
        .create_food(common::sample_food("100011", "Rice"))
        .await
        .unwrap();

    let append = event(food.id, 4, LogAction::Added);
    ctx.logs.apply_log_event(append.clone()).await.unwrap();
    let (_, qty) = ctx.logs.apply_log_event(append).await.unwrap();
    assert_eq!(qty, 8);
}
