use advenchores_shared::api::{self, PARENT_PIN_HEADER};
use axum::Json;
use axum::extract::{Extension, State};
use axum::http::{HeaderMap, StatusCode};
use tracing::info;

use super::auth::AuthCtx;
use super::dto::{collect, parse_date};
use super::extract::{ApiForm, ApiPath};
use super::guard::{ensure_owner, parse_pin, verify_parent_pin};
use super::{AppError, AppState};
use crate::storage::models::{AssignmentView, Child, Chore, Reward};

type ApiResult<T> = Result<Json<T>, AppError>;

fn required(field: &str, value: &str) -> Result<String, AppError> {
    let v = value.trim();
    if v.is_empty() {
        return Err(AppError::bad_request(format!("{} is required", field)));
    }
    Ok(v.to_string())
}

fn parse_id(field: &str, value: &str) -> Result<i32, AppError> {
    value
        .trim()
        .parse::<i32>()
        .map_err(|_| AppError::bad_request(format!("{} must be an integer id", field)))
}

fn parse_points(field: &str, value: &str) -> Result<i32, AppError> {
    match value.trim().parse::<i32>() {
        Ok(n) if n >= 0 => Ok(n),
        _ => Err(AppError::bad_request(format!(
            "{} must be a non-negative integer",
            field
        ))),
    }
}

// Ownership-checked loaders

async fn owned_child(state: &AppState, auth: &AuthCtx, id: i32) -> Result<Child, AppError> {
    let child = state.store.get_child(id).await?;
    ensure_owner(auth, &child)?;
    Ok(child)
}

async fn owned_chore(state: &AppState, auth: &AuthCtx, id: i32) -> Result<Chore, AppError> {
    let chore = state.store.get_chore(id).await?;
    ensure_owner(auth, &chore)?;
    Ok(chore)
}

async fn owned_reward(state: &AppState, auth: &AuthCtx, id: i32) -> Result<Reward, AppError> {
    let reward = state.store.get_reward(id).await?;
    ensure_owner(auth, &reward)?;
    Ok(reward)
}

async fn owned_assignment(
    state: &AppState,
    auth: &AuthCtx,
    id: i32,
) -> Result<AssignmentView, AppError> {
    let view = state.store.get_assignment_view(id).await?;
    ensure_owner(auth, &view)?;
    Ok(view)
}

// Account

pub(super) async fn api_get_account(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
) -> ApiResult<api::UserDto> {
    let user = state.store.get_user(auth.user_id).await?;
    Ok(Json(user.into()))
}

pub(super) async fn api_update_account(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
    ApiForm(body): ApiForm<api::AccountReq>,
) -> ApiResult<api::UserDto> {
    let username = required("username", &body.username)?;
    let email = required("email", &body.email)?;
    let user = state
        .store
        .update_user_profile(auth.user_id, &username, &email)
        .await?;
    info!(user_id = user.id, username = %user.username, "account updated");
    Ok(Json(user.into()))
}

// Parent panel

pub(super) async fn api_set_parent_pin(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
    ApiForm(body): ApiForm<api::PinReq>,
) -> Result<StatusCode, AppError> {
    let pin = parse_pin(&body.pin)?;
    state.store.set_parent_pin(auth.user_id, pin).await?;
    info!(user_id = auth.user_id, "parent pin changed");
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn api_parent_panel(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
    headers: HeaderMap,
) -> ApiResult<api::ParentPanelDto> {
    let user = state.store.get_user(auth.user_id).await?;
    verify_parent_pin(headers.get(PARENT_PIN_HEADER), user.parent_pin)?;
    let children = state.store.list_children(user.id).await?;
    let chores = state.store.list_chores(user.id).await?;
    let assignments = state.store.list_assignments(user.id).await?;
    let rewards = state.store.list_rewards(user.id).await?;
    Ok(Json(api::ParentPanelDto {
        children: collect(children),
        chores: collect(chores),
        assignments: collect(assignments),
        rewards: collect(rewards),
    }))
}

// Children

pub(super) async fn api_list_children(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
) -> ApiResult<Vec<api::ChildDto>> {
    let rows = state.store.list_children(auth.user_id).await?;
    Ok(Json(collect(rows)))
}

pub(super) async fn api_create_child(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
    ApiForm(body): ApiForm<api::ChildForm>,
) -> Result<(StatusCode, Json<api::ChildDto>), AppError> {
    let name = required("name", &body.name)?;
    let job = body.job.as_deref().unwrap_or("").trim().to_string();
    let child = state
        .store
        .save_child(Child::new(auth.user_id, name, job))
        .await?;
    info!(child_id = child.id, "child created");
    Ok((StatusCode::CREATED, Json(child.into())))
}

/// The child's view: its assignments plus chores nobody has taken yet.
pub(super) async fn api_child_dashboard(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<api::ChildDashboardDto> {
    let child = owned_child(&state, &auth, id).await?;
    let assignments = state.store.list_assignments_for_child(child.id).await?;
    let available = state.store.list_unassigned_chores(auth.user_id).await?;
    Ok(Json(api::ChildDashboardDto {
        child: child.into(),
        assignments: collect(assignments),
        available_chores: collect(available),
    }))
}

pub(super) async fn api_update_child(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
    ApiPath(id): ApiPath<i32>,
    ApiForm(body): ApiForm<api::ChildForm>,
) -> ApiResult<api::ChildDto> {
    let mut child = owned_child(&state, &auth, id).await?;
    child.name = required("name", &body.name)?;
    if let Some(job) = body.job {
        child.job = job.trim().to_string();
    }
    if let Some(points) = body.points.as_deref() {
        child.points = parse_points("points", points)?;
    }
    if let Some(rewards) = body.rewards {
        child.rewards = rewards.trim().to_string();
    }
    let child = state.store.save_child(child).await?;
    Ok(Json(child.into()))
}

pub(super) async fn api_delete_child(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
    ApiPath(id): ApiPath<i32>,
) -> Result<StatusCode, AppError> {
    let child = owned_child(&state, &auth, id).await?;
    state.store.delete_child(child.id).await?;
    info!(child_id = id, "child deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn api_child_store(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<api::RewardsStoreDto> {
    let child = owned_child(&state, &auth, id).await?;
    let rewards = state.store.list_rewards(auth.user_id).await?;
    Ok(Json(api::RewardsStoreDto {
        child: child.into(),
        rewards: collect(rewards),
    }))
}

async fn assign(
    state: &AppState,
    auth: &AuthCtx,
    child_id: i32,
    chore_id: i32,
) -> Result<(StatusCode, Json<api::AssignmentDto>), AppError> {
    let child = owned_child(state, auth, child_id).await?;
    let chore = owned_chore(state, auth, chore_id).await?;
    let assignment = state.store.assign_chore(child.id, chore.id).await?;
    let view = state.store.get_assignment_view(assignment.id).await?;
    Ok((StatusCode::CREATED, Json(view.into())))
}

pub(super) async fn api_accept_chore(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
    ApiPath((child_id, chore_id)): ApiPath<(i32, i32)>,
) -> Result<(StatusCode, Json<api::AssignmentDto>), AppError> {
    assign(&state, &auth, child_id, chore_id).await
}

pub(super) async fn api_unassign_chore(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
    ApiPath((child_id, chore_id)): ApiPath<(i32, i32)>,
) -> Result<StatusCode, AppError> {
    owned_child(&state, &auth, child_id).await?;
    owned_chore(&state, &auth, chore_id).await?;
    state.store.unassign_chore(child_id, chore_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Chores

fn chore_from_form(owner: i32, body: api::ChoreForm) -> Result<Chore, AppError> {
    let description = required("description", &body.description)?;
    let points = parse_points("points", &body.points)?;
    let is_required = matches!(
        body.is_required.as_deref().map(str::trim),
        Some("on" | "true" | "1")
    );
    let due_date = match body.due_date.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(text) => Some(
            parse_date(text)
                .ok_or_else(|| AppError::bad_request("due_date must be YYYY-MM-DD"))?,
        ),
    };
    let mut chore = Chore::new(owner, description, points);
    chore.is_required = is_required;
    chore.due_date = due_date;
    Ok(chore)
}

pub(super) async fn api_list_chores(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
) -> ApiResult<Vec<api::ChoreDto>> {
    let rows = state.store.list_chores(auth.user_id).await?;
    Ok(Json(collect(rows)))
}

pub(super) async fn api_create_chore(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
    ApiForm(body): ApiForm<api::ChoreForm>,
) -> Result<(StatusCode, Json<api::ChoreDto>), AppError> {
    let chore = chore_from_form(auth.user_id, body)?;
    let chore = state.store.save_chore(chore).await?;
    info!(chore_id = chore.id, points = chore.points, "chore created");
    Ok((StatusCode::CREATED, Json(chore.into())))
}

pub(super) async fn api_get_chore(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<api::ChoreDto> {
    let chore = owned_chore(&state, &auth, id).await?;
    Ok(Json(chore.into()))
}

pub(super) async fn api_update_chore(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
    ApiPath(id): ApiPath<i32>,
    ApiForm(body): ApiForm<api::ChoreForm>,
) -> ApiResult<api::ChoreDto> {
    let existing = owned_chore(&state, &auth, id).await?;
    let mut chore = chore_from_form(auth.user_id, body)?;
    chore.id = existing.id;
    let chore = state.store.save_chore(chore).await?;
    Ok(Json(chore.into()))
}

pub(super) async fn api_delete_chore(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
    ApiPath(id): ApiPath<i32>,
) -> Result<StatusCode, AppError> {
    let chore = owned_chore(&state, &auth, id).await?;
    state.store.delete_chore(chore.id).await?;
    info!(chore_id = id, "chore deleted");
    Ok(StatusCode::NO_CONTENT)
}

// Rewards

fn reward_from_form(owner: i32, body: api::RewardForm) -> Result<Reward, AppError> {
    let description = required("description", &body.description)?;
    let cost = parse_points("point_cost", &body.point_cost)?;
    Ok(Reward::new(owner, description, cost))
}

pub(super) async fn api_list_rewards(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
) -> ApiResult<Vec<api::RewardDto>> {
    let rows = state.store.list_rewards(auth.user_id).await?;
    Ok(Json(collect(rows)))
}

pub(super) async fn api_create_reward(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
    ApiForm(body): ApiForm<api::RewardForm>,
) -> Result<(StatusCode, Json<api::RewardDto>), AppError> {
    let reward = reward_from_form(auth.user_id, body)?;
    let reward = state.store.save_reward(reward).await?;
    info!(reward_id = reward.id, cost = reward.point_cost, "reward created");
    Ok((StatusCode::CREATED, Json(reward.into())))
}

pub(super) async fn api_get_reward(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<api::RewardDto> {
    let reward = owned_reward(&state, &auth, id).await?;
    Ok(Json(reward.into()))
}

pub(super) async fn api_update_reward(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
    ApiPath(id): ApiPath<i32>,
    ApiForm(body): ApiForm<api::RewardForm>,
) -> ApiResult<api::RewardDto> {
    let existing = owned_reward(&state, &auth, id).await?;
    let mut reward = reward_from_form(auth.user_id, body)?;
    reward.id = existing.id;
    let reward = state.store.save_reward(reward).await?;
    Ok(Json(reward.into()))
}

pub(super) async fn api_delete_reward(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
    ApiPath(id): ApiPath<i32>,
) -> Result<StatusCode, AppError> {
    let reward = owned_reward(&state, &auth, id).await?;
    state.store.delete_reward(reward.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn api_redeem_reward(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
    ApiForm(body): ApiForm<api::RedeemReq>,
) -> ApiResult<api::ChildDto> {
    let child_id = parse_id("child_id", &body.child_id)?;
    let reward_id = parse_id("reward_id", &body.reward_id)?;
    let child = owned_child(&state, &auth, child_id).await?;
    let reward = owned_reward(&state, &auth, reward_id).await?;
    let child = state.store.redeem_reward(child.id, reward.id).await?;
    Ok(Json(child.into()))
}

// Assignments

pub(super) async fn api_list_assignments(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
) -> ApiResult<Vec<api::AssignmentDto>> {
    let rows = state.store.list_assignments(auth.user_id).await?;
    Ok(Json(collect(rows)))
}

pub(super) async fn api_create_assignment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
    ApiForm(body): ApiForm<api::AssignReq>,
) -> Result<(StatusCode, Json<api::AssignmentDto>), AppError> {
    let child_id = parse_id("child_id", &body.child_id)?;
    let chore_id = parse_id("chore_id", &body.chore_id)?;
    assign(&state, &auth, child_id, chore_id).await
}

pub(super) async fn api_delete_assignment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
    ApiPath(id): ApiPath<i32>,
) -> Result<StatusCode, AppError> {
    let view = owned_assignment(&state, &auth, id).await?;
    state.store.delete_assignment(view.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn api_complete_assignment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<api::AssignmentDto> {
    let mut view = owned_assignment(&state, &auth, id).await?;
    view.is_completed = state.store.complete_assignment(id).await?.is_completed;
    Ok(Json(view.into()))
}

pub(super) async fn api_uncomplete_assignment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<api::AssignmentDto> {
    let mut view = owned_assignment(&state, &auth, id).await?;
    view.is_completed = state.store.uncomplete_assignment(id).await?.is_completed;
    Ok(Json(view.into()))
}

pub(super) async fn api_reward_assignment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<api::PayoutResp> {
    owned_assignment(&state, &auth, id).await?;
    let payout = state.store.reward_assignment(id).await?;
    Ok(Json(api::PayoutResp {
        child: payout.child.into(),
        points_awarded: payout.points_awarded,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chore_form(points: &str, is_required: Option<&str>, due: Option<&str>) -> api::ChoreForm {
        api::ChoreForm {
            description: " Dishes ".into(),
            points: points.into(),
            is_required: is_required.map(String::from),
            due_date: due.map(String::from),
        }
    }

    #[test]
    fn chore_form_parses_checkbox_and_date() {
        let chore = chore_from_form(3, chore_form("10", Some("on"), Some("2026-05-01"))).unwrap();
        assert_eq!(chore.user_id, 3);
        assert_eq!(chore.description, "Dishes");
        assert_eq!(chore.points, 10);
        assert!(chore.is_required);
        assert_eq!(chore.due_date, parse_date("2026-05-01"));

        let plain = chore_from_form(3, chore_form("0", None, Some(""))).unwrap();
        assert!(!plain.is_required);
        assert!(plain.due_date.is_none());
    }

    #[test]
    fn chore_form_rejects_bad_numbers_and_dates() {
        assert!(matches!(
            chore_from_form(1, chore_form("ten", None, None)),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            chore_from_form(1, chore_form("-5", None, None)),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            chore_from_form(1, chore_form("5", None, Some("05/01/2026"))),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn ids_and_required_fields_are_validated() {
        assert_eq!(parse_id("child_id", " 12 ").unwrap(), 12);
        assert!(parse_id("child_id", "abc").is_err());
        assert!(required("name", "   ").is_err());
        assert_eq!(required("name", " Alex ").unwrap(), "Alex");
    }
}
