//! Initial schema: users, assets, budgets, portfolio items, expenses,
//! installment states.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(INITIAL_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "DROP TABLE IF EXISTS installment_states, expenses, portfolio_items, budgets, assets, users CASCADE;",
        )
        .await?;
        Ok(())
    }
}

const INITIAL_SQL: &str = r#"
-- User accounts. Partner links are written symmetrically by the application;
-- no constraint enforces bidirectionality (imported data may be one-sided).
CREATE TABLE users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    username VARCHAR(64) NOT NULL UNIQUE,
    full_name TEXT NOT NULL,
    partner_username VARCHAR(64),
    partnership_id VARCHAR(64),
    portfolio_budget_included BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_users_partnership ON users(partnership_id) WHERE partnership_id IS NOT NULL;

-- Assets. category is free text; 'Nakit' rows feed the cash budget.
CREATE TABLE assets (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    username VARCHAR(64) NOT NULL,
    category TEXT NOT NULL,
    amount NUMERIC(14, 2) NOT NULL,
    value NUMERIC(14, 2) NOT NULL,
    partnership_id VARCHAR(64),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- The cash sum filters on category plus owner/stamp
CREATE INDEX idx_assets_owner ON assets(username, category);
CREATE INDEX idx_assets_partnership ON assets(partnership_id) WHERE partnership_id IS NOT NULL;

-- Derived budgets, one row per username, upserted by the synchronizer.
CREATE TABLE budgets (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    username VARCHAR(64) NOT NULL UNIQUE,
    amount NUMERIC(14, 2) NOT NULL DEFAULT 0,
    added_by VARCHAR(64) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- Foreign-currency/gold holdings. rate is the last-known TRY unit price.
CREATE TABLE portfolio_items (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    username VARCHAR(64) NOT NULL,
    kind TEXT NOT NULL,
    code VARCHAR(32) NOT NULL,
    amount NUMERIC(14, 4) NOT NULL,
    rate NUMERIC(14, 4) NOT NULL,
    partnership_id VARCHAR(64),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_portfolio_owner ON portfolio_items(username);
CREATE INDEX idx_portfolio_partnership ON portfolio_items(partnership_id) WHERE partnership_id IS NOT NULL;

-- Expenses with optional installment plans.
CREATE TABLE expenses (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    username VARCHAR(64) NOT NULL,
    title TEXT NOT NULL,
    category TEXT,
    vendor TEXT,
    amount NUMERIC(14, 2) NOT NULL,
    expense_date DATE NOT NULL,
    installments INTEGER NOT NULL DEFAULT 1,
    partnership_id VARCHAR(64),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_installments_positive CHECK (installments >= 1)
);

CREATE INDEX idx_expenses_owner ON expenses(username, expense_date DESC);
CREATE INDEX idx_expenses_partnership ON expenses(partnership_id) WHERE partnership_id IS NOT NULL;

-- Per-installment paid flags, created alongside the expense.
CREATE TABLE installment_states (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    expense_id UUID NOT NULL REFERENCES expenses(id) ON DELETE CASCADE,
    username VARCHAR(64) NOT NULL,
    installment_no INTEGER NOT NULL,
    paid BOOLEAN NOT NULL DEFAULT FALSE,
    paid_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_installment UNIQUE (expense_id, installment_no),
    CONSTRAINT chk_installment_no_positive CHECK (installment_no >= 1)
);
"#;
