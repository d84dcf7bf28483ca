use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::AllergySeverity;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Allergy {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub severity: AllergySeverity,
    pub symptoms: Option<String>,
    pub diagnosed_date: Option<NaiveDate>,
}
