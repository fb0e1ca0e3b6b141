use serde::{Deserialize, Serialize};

pub mod endpoints;

pub const API_V1_PREFIX: &str = "/api/v1";

/// Name of the cookie carrying the session token for browser clients.
pub const AUTH_COOKIE: &str = "auth_token";

/// Header carrying the parent PIN for the parent panel.
pub const PARENT_PIN_HEADER: &str = "x-parent-pin";

// Auth
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterReq {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthReq {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResp {
    pub token: String,
}

// Account
#[derive(Debug, Serialize, Deserialize)]
pub struct UserDto {
    pub id: i32,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccountReq {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PinReq {
    pub pin: String,
}

// Form bodies carry numbers as text, the way browsers submit them; the server
// parses and validates them.

#[derive(Debug, Serialize, Deserialize)]
pub struct ChildForm {
    pub name: String,
    #[serde(default)]
    pub job: Option<String>,
    #[serde(default)]
    pub points: Option<String>,
    #[serde(default)]
    pub rewards: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChoreForm {
    pub description: String,
    pub points: String,
    /// HTML checkbox semantics: present and `"on"` (or `"true"`) means required.
    #[serde(default)]
    pub is_required: Option<String>,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub due_date: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RewardForm {
    pub description: String,
    pub point_cost: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AssignReq {
    pub child_id: String,
    pub chore_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RedeemReq {
    pub child_id: String,
    pub reward_id: String,
}

// Responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildDto {
    pub id: i32,
    pub name: String,
    pub job: String,
    pub points: i32,
    pub rewards: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChoreDto {
    pub id: i32,
    pub description: String,
    pub points: i32,
    pub is_required: bool,
    pub due_date: Option<String>, // YYYY-MM-DD
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardDto {
    pub id: i32,
    pub description: String,
    pub point_cost: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentDto {
    pub id: i32,
    pub child_id: i32,
    pub child_name: String,
    pub is_completed: bool,
    pub chore: ChoreDto,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PayoutResp {
    pub child: ChildDto,
    pub points_awarded: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChildDashboardDto {
    pub child: ChildDto,
    pub assignments: Vec<AssignmentDto>,
    /// Chores of the account that are not assigned to any child yet.
    pub available_chores: Vec<ChoreDto>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RewardsStoreDto {
    pub child: ChildDto,
    /// Sorted by point cost, cheapest first.
    pub rewards: Vec<RewardDto>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ParentPanelDto {
    pub children: Vec<ChildDto>,
    pub chores: Vec<ChoreDto>,
    pub assignments: Vec<AssignmentDto>,
    pub rewards: Vec<RewardDto>,
}
