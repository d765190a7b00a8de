// Team domain model
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub name: String,
    pub branch_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leader_id: Option<String>,
    #[serde(default)]
    pub memo: String,
    #[serde(default)]
    pub member_ids: Vec<String>,
}

impl Team {
    pub fn add_member(&mut self, user_id: &str) {
        if !self.member_ids.iter().any(|id| id == user_id) {
            self.member_ids.push(user_id.to_string());
        }
    }

    pub fn remove_member(&mut self, user_id: &str) -> bool {
        let before = self.member_ids.len();
        self.member_ids.retain(|id| id != user_id);
        self.member_ids.len() != before
    }
}
