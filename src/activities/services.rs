use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use super::dto::{ActivityRequest, EstimateResponse, EstimatedActivity};
use super::repo_types::{Activity, ActivityType, ActivityWrite};
use super::validation::validate;
use crate::emissions;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

fn not_found() -> AppError {
    AppError::NotFound("Activity not found".into())
}

/// Uses the caller's value when given, otherwise asks the estimator.
async fn resolve_carbon(
    st: &AppState,
    kind: ActivityType,
    details: &Value,
    carbon_kg: Option<f64>,
) -> AppResult<f64> {
    match carbon_kg {
        Some(v) if v.is_finite() && v >= 0.0 => Ok(v),
        Some(_) => Err(AppError::invalid("carbon_kg must be a non-negative number")),
        None => {
            let est = emissions::estimate(st.provider.as_ref(), kind.as_str(), details).await?;
            if est.is_fallback() {
                info!(%kind, carbon_kg = est.carbon_kg, "stored carbon_kg comes from fallback estimate");
            }
            Ok(est.carbon_kg)
        }
    }
}

pub async fn create_activity(
    st: &AppState,
    user_id: Uuid,
    req: ActivityRequest,
) -> AppResult<Activity> {
    let kind = validate(&req.activity_type, &req.details)?;
    let carbon_kg = resolve_carbon(st, kind, &req.details, req.carbon_kg).await?;

    let row = st
        .activities
        .insert_activity(
            user_id,
            &ActivityWrite {
                activity_type: kind,
                details: req.details,
                carbon_kg,
            },
        )
        .await?;

    info!(activity_id = %row.id, %user_id, %kind, "activity created");
    Ok(row.into())
}

pub async fn get_all_activities(st: &AppState, user_id: Uuid) -> AppResult<Vec<Activity>> {
    let rows = st.activities.find_all_activities(user_id).await?;
    info!(%user_id, count = rows.len(), "activities listed");
    Ok(rows.into_iter().map(Activity::from).collect())
}

pub async fn get_activity_by_id(st: &AppState, id: Uuid, user_id: Uuid) -> AppResult<Activity> {
    st.activities
        .find_activity_by_id(id, user_id)
        .await?
        .map(Activity::from)
        .ok_or_else(not_found)
}

pub async fn update_activity(
    st: &AppState,
    id: Uuid,
    user_id: Uuid,
    req: ActivityRequest,
) -> AppResult<Activity> {
    let kind = validate(&req.activity_type, &req.details)?;

    if st.activities.find_activity_by_id(id, user_id).await?.is_none() {
        return Err(not_found());
    }

    let carbon_kg = resolve_carbon(st, kind, &req.details, req.carbon_kg).await?;
    let data = ActivityWrite {
        activity_type: kind,
        details: req.details,
        carbon_kg,
    };
    if !st.activities.update_activity(id, user_id, &data).await? {
        return Err(not_found());
    }

    info!(activity_id = %id, %user_id, "activity updated");
    get_activity_by_id(st, id, user_id).await
}

pub async fn delete_activity(st: &AppState, id: Uuid, user_id: Uuid) -> AppResult<()> {
    if !st.activities.delete_activity(id, user_id).await? {
        return Err(not_found());
    }
    info!(activity_id = %id, %user_id, "activity deleted");
    Ok(())
}

pub async fn estimate_emissions(
    st: &AppState,
    activity_type: String,
    details: Value,
) -> AppResult<EstimateResponse> {
    let est = emissions::estimate(st.provider.as_ref(), &activity_type, &details).await?;
    info!(activity_type = %activity_type, carbon_kg = est.carbon_kg, fallback = est.is_fallback(), "emissions estimated");
    Ok(EstimateResponse {
        activity: EstimatedActivity {
            activity_type,
            details,
            carbon_kg: est.carbon_kg,
        },
        activity_data: est.activity_data,
        tip: est.tip,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::activities::repo::memory::InMemoryActivityStore;
    use crate::emissions::estimator::testing::{Script, StubProvider};

    fn req(activity_type: &str, details: Value, carbon_kg: Option<f64>) -> ActivityRequest {
        ActivityRequest {
            activity_type: activity_type.into(),
            details,
            carbon_kg,
        }
    }

    #[tokio::test]
    async fn create_then_get_round_trips_details() {
        let st = AppState::fake();
        let user = Uuid::new_v4();
        let details = json!({
            "distance": 12.5,
            "vehicle": "train",
            "notes": {"route": ["A", "B"], "peak": false}
        });

        let created = create_activity(&st, user, req("transport", details.clone(), Some(1.2)))
            .await
            .unwrap();
        let fetched = get_activity_by_id(&st, created.id, user).await.unwrap();

        assert_eq!(fetched.details, details);
        assert_eq!(fetched.carbon_kg, 1.2);
        assert_eq!(fetched.activity_type, "transport");
        assert_eq!(fetched.user_id, user);
    }

    #[tokio::test]
    async fn other_users_cannot_see_activity() {
        let st = AppState::fake();
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let created = create_activity(
            &st,
            owner,
            req("food", json!({"food_type": "rice", "quantity": 1}), Some(0.4)),
        )
        .await
        .unwrap();

        let err = get_activity_by_id(&st, created.id, stranger).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        let err = delete_activity(&st, created.id, stranger).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        let err = update_activity(
            &st,
            created.id,
            stranger,
            req("food", json!({"food_type": "beef", "quantity": 1}), Some(9.0)),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        assert!(get_all_activities(&st, stranger).await.unwrap().is_empty());
        assert_eq!(get_activity_by_id(&st, created.id, owner).await.unwrap().carbon_kg, 0.4);
    }

    #[tokio::test]
    async fn create_validates_before_persisting() {
        let st = AppState::fake();
        let user = Uuid::new_v4();
        let err = create_activity(&st, user, req("transport", json!({"vehicle": "car"}), Some(1.0)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        let err = create_activity(&st, user, req("gaming", json!({}), Some(1.0)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        let err = create_activity(
            &st,
            user,
            req("electricity", json!({"energy": 5, "country": "de"}), Some(-3.0)),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert!(get_all_activities(&st, user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_carbon_is_estimated() {
        let provider = Arc::new(StubProvider::new(Script::Co2e(3.3)));
        let st = AppState::fake_with(provider.clone());
        let user = Uuid::new_v4();
        let created = create_activity(
            &st,
            user,
            req("electricity", json!({"energy": 10, "country": "fr"}), None),
        )
        .await
        .unwrap();
        assert_eq!(created.carbon_kg, 3.3);
        assert_eq!(provider.calls(), 1);

        create_activity(&st, user, req("transport", json!({"distance": 2, "vehicle": "car"}), Some(0.5)))
            .await
            .unwrap();
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn update_replaces_fields_and_delete_removes() {
        let st = AppState::fake();
        let user = Uuid::new_v4();
        let created = create_activity(
            &st,
            user,
            req("transport", json!({"distance": 10, "vehicle": "bus"}), Some(1.0)),
        )
        .await
        .unwrap();

        let updated = update_activity(
            &st,
            created.id,
            user,
            req("food", json!({"food_type": "lamb", "quantity": 2}), Some(6.0)),
        )
        .await
        .unwrap();
        assert_eq!(updated.activity_type, "food");
        assert_eq!(updated.details["food_type"], "lamb");
        assert_eq!(updated.carbon_kg, 6.0);

        delete_activity(&st, created.id, user).await.unwrap();
        let err = get_activity_by_id(&st, created.id, user).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        let err = delete_activity(&st, created.id, user).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let st = AppState::fake();
        let user = Uuid::new_v4();
        let first = create_activity(&st, user, req("food", json!({"food_type": "fish", "quantity": 1}), Some(1.0)))
            .await
            .unwrap();
        let second = create_activity(&st, user, req("food", json!({"food_type": "milk", "quantity": 1}), Some(1.0)))
            .await
            .unwrap();
        let ids: Vec<Uuid> = get_all_activities(&st, user)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn legacy_details_read_as_empty_object() {
        let store = Arc::new(InMemoryActivityStore::new());
        let user = Uuid::new_v4();
        let id = store.insert_raw(user, "transport", Some(Value::String("not json".into())));
        let st = AppState::fake_with_store(store);

        let activity = get_activity_by_id(&st, id, user).await.unwrap();
        assert_eq!(activity.details, json!({}));
        assert_eq!(get_all_activities(&st, user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn estimate_wraps_result() {
        let st = AppState::fake_with(Arc::new(StubProvider::new(Script::NoFactor)));
        let res = estimate_emissions(
            &st,
            "transport".into(),
            json!({"distance": 10, "vehicle": "car"}),
        )
        .await
        .unwrap();
        assert!((res.activity.carbon_kg - 2.0).abs() < 1e-9);
        assert_eq!(res.activity_data["fallback"], true);
        assert!(!res.tip.is_empty());
    }
}
