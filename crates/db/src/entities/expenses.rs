//! `SeaORM` Entity for expenses table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub username: String,
    pub title: String,
    pub category: Option<String>,
    pub vendor: Option<String>,
    pub amount: Decimal,
    pub expense_date: Date,
    pub installments: i32,
    pub partnership_id: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::installment_states::Entity")]
    InstallmentStates,
}

impl Related<super::installment_states::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InstallmentStates.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
