use super::API_V1_PREFIX;

fn base_join(base: &str, path: &str) -> String {
    let b = base.trim_end_matches('/');
    let p = path.trim_start_matches('/');
    format!("{}/{}", b, p)
}

fn v1(base: &str, path: &str) -> String {
    base_join(base, &format!("{}/{}", API_V1_PREFIX, path))
}

pub fn auth_register(base: &str) -> String {
    v1(base, "auth/register")
}
pub fn auth_login(base: &str) -> String {
    v1(base, "auth/login")
}
pub fn auth_logout(base: &str) -> String {
    v1(base, "auth/logout")
}
pub fn account(base: &str) -> String {
    v1(base, "account")
}
pub fn parent_panel(base: &str) -> String {
    v1(base, "parent")
}
pub fn parent_pin(base: &str) -> String {
    v1(base, "parent/pin")
}

pub fn children(base: &str) -> String {
    v1(base, "children")
}
pub fn child(base: &str, child_id: i32) -> String {
    v1(base, &format!("children/{}", child_id))
}
pub fn child_store(base: &str, child_id: i32) -> String {
    v1(base, &format!("children/{}/store", child_id))
}
pub fn child_accept_chore(base: &str, child_id: i32, chore_id: i32) -> String {
    v1(
        base,
        &format!("children/{}/chores/{}/accept", child_id, chore_id),
    )
}
pub fn child_unassign_chore(base: &str, child_id: i32, chore_id: i32) -> String {
    v1(
        base,
        &format!("children/{}/chores/{}/unassign", child_id, chore_id),
    )
}

pub fn chores(base: &str) -> String {
    v1(base, "chores")
}
pub fn chore(base: &str, chore_id: i32) -> String {
    v1(base, &format!("chores/{}", chore_id))
}

pub fn rewards(base: &str) -> String {
    v1(base, "rewards")
}
pub fn reward(base: &str, reward_id: i32) -> String {
    v1(base, &format!("rewards/{}", reward_id))
}
pub fn redeem_reward(base: &str) -> String {
    v1(base, "rewards/redeem")
}

pub fn assignments(base: &str) -> String {
    v1(base, "assignments")
}
pub fn assignment(base: &str, assignment_id: i32) -> String {
    v1(base, &format!("assignments/{}", assignment_id))
}
pub fn assignment_complete(base: &str, assignment_id: i32) -> String {
    v1(base, &format!("assignments/{}/complete", assignment_id))
}
pub fn assignment_uncomplete(base: &str, assignment_id: i32) -> String {
    v1(base, &format!("assignments/{}/uncomplete", assignment_id))
}
pub fn assignment_reward(base: &str, assignment_id: i32) -> String {
    v1(base, &format!("assignments/{}/reward", assignment_id))
}
