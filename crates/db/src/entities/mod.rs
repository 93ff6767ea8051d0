//! `SeaORM` entity definitions.

pub mod assets;
pub mod budgets;
pub mod categories;
pub mod expenses;
pub mod installment_states;
pub mod notifications;
pub mod portfolio_items;
pub mod users;
pub mod vendors;
