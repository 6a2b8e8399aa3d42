use sea_orm::entity::prelude::*;
use serde::{ Deserialize, Serialize };

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "account")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub free_standard_remaining: i32,
    pub premium_high_remaining: i32,
    pub premium_ultra_remaining: i32,
    pub total_spent: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::payment::Entity")]
    Payment,
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Units left for `tier`.
    pub fn remaining(&self, tier: crate::enums::QualityTier) -> i32 {
        match tier {
            crate::enums::QualityTier::Standard => self.free_standard_remaining,
            crate::enums::QualityTier::High => self.premium_high_remaining,
            crate::enums::QualityTier::Ultra => self.premium_ultra_remaining,
        }
    }
}
