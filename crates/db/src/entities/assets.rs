//! `SeaORM` Entity for assets table.
//!
//! The `category` column is free text; rows with the distinguished value
//! `"Nakit"` feed the cash budget. `partnership_id` is stamped from the
//! owning user at creation time and left untouched afterwards.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "assets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub username: String,
    pub category: String,
    pub amount: Decimal,
    pub value: Decimal,
    pub partnership_id: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
