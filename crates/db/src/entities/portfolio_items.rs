//! `SeaORM` Entity for portfolio_items table.
//!
//! `rate` is the last-known TRY unit price for `code`, restamped by the
//! rate-refresh endpoint. Valuation is derived at read time, never stored.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "portfolio_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub username: String,
    pub kind: String,
    pub code: String,
    pub amount: Decimal,
    pub rate: Decimal,
    pub partnership_id: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
