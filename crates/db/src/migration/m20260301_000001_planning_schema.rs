//! Planning schema migration.
//!
//! Creates budget accounts, income sources, debts and the monthly planning,
//! allocation and warning dismissal tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(SOURCES_SQL).await?;
        db.execute_unprepared(PLANNING_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_SQL).await?;
        Ok(())
    }
}

const ACCOUNTS_SQL: &str = r"
CREATE TABLE budget_accounts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE budget_account_members (
    budget_account_id UUID NOT NULL REFERENCES budget_accounts(id) ON DELETE CASCADE,
    user_id UUID NOT NULL,
    role VARCHAR(20) NOT NULL DEFAULT 'member',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    PRIMARY KEY (budget_account_id, user_id)
);

CREATE INDEX idx_budget_account_members_user ON budget_account_members(user_id);
";

const SOURCES_SQL: &str = r"
CREATE TABLE income_sources (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    budget_account_id UUID NOT NULL REFERENCES budget_accounts(id) ON DELETE CASCADE,
    user_id UUID NOT NULL,
    name VARCHAR(255) NOT NULL,
    amount NUMERIC(19, 4) NOT NULL,
    frequency VARCHAR(20) NOT NULL,
    start_date DATE NOT NULL,
    end_date DATE,
    second_pay_day SMALLINT,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_income_amount_positive CHECK (amount > 0),
    CONSTRAINT chk_income_frequency CHECK (frequency IN ('weekly', 'biweekly', 'semimonthly', 'monthly')),
    CONSTRAINT chk_income_second_pay_day CHECK (second_pay_day BETWEEN 1 AND 31),
    CONSTRAINT chk_income_dates CHECK (end_date IS NULL OR end_date >= start_date)
);

CREATE INDEX idx_income_sources_account ON income_sources(budget_account_id) WHERE is_active;

CREATE TABLE debts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    budget_account_id UUID NOT NULL REFERENCES budget_accounts(id) ON DELETE CASCADE,
    created_by UUID NOT NULL,
    name VARCHAR(255) NOT NULL,
    payment_amount NUMERIC(19, 4) NOT NULL,
    interest_rate NUMERIC(7, 4) NOT NULL DEFAULT 0,
    due_date DATE NOT NULL,
    category VARCHAR(100),
    last_payment_month DATE,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_debt_payment_non_negative CHECK (payment_amount >= 0),
    CONSTRAINT chk_debt_last_month_first_day CHECK (
        last_payment_month IS NULL OR EXTRACT(DAY FROM last_payment_month) = 1
    )
);

CREATE INDEX idx_debts_account ON debts(budget_account_id) WHERE is_active;
";

const PLANNING_SQL: &str = r"
CREATE TABLE monthly_debt_planning (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    budget_account_id UUID NOT NULL REFERENCES budget_accounts(id) ON DELETE CASCADE,
    debt_id UUID NOT NULL REFERENCES debts(id) ON DELETE CASCADE,
    year INTEGER NOT NULL,
    month INTEGER NOT NULL,
    due_date DATE NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_planning_year CHECK (year BETWEEN 1000 AND 9999),
    CONSTRAINT chk_planning_month CHECK (month BETWEEN 1 AND 12),
    CONSTRAINT chk_planning_due_in_month CHECK (
        EXTRACT(YEAR FROM due_date) = year AND EXTRACT(MONTH FROM due_date) = month
    )
);

-- One planning record per debt and month
CREATE UNIQUE INDEX uq_monthly_debt_planning_slot
    ON monthly_debt_planning(budget_account_id, debt_id, year, month);

CREATE INDEX idx_monthly_debt_planning_period
    ON monthly_debt_planning(budget_account_id, year, month);

CREATE TABLE debt_allocations (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    budget_account_id UUID NOT NULL REFERENCES budget_accounts(id) ON DELETE CASCADE,
    monthly_debt_planning_id UUID NOT NULL REFERENCES monthly_debt_planning(id) ON DELETE CASCADE,
    paycheck_id VARCHAR(64) NOT NULL,
    payment_amount NUMERIC(19, 4),
    payment_date DATE,
    is_paid BOOLEAN NOT NULL DEFAULT false,
    paid_at TIMESTAMPTZ,
    note TEXT,
    allocated_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_allocation_amount_positive CHECK (payment_amount IS NULL OR payment_amount > 0),
    CONSTRAINT chk_allocation_paid_at CHECK (NOT is_paid OR paid_at IS NOT NULL)
);

-- At most one allocation per planning record
CREATE UNIQUE INDEX uq_debt_allocations_planning ON debt_allocations(monthly_debt_planning_id);

CREATE INDEX idx_debt_allocations_paycheck ON debt_allocations(budget_account_id, paycheck_id);

CREATE TABLE dismissed_warnings (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    budget_account_id UUID NOT NULL REFERENCES budget_accounts(id) ON DELETE CASCADE,
    warning_type VARCHAR(40) NOT NULL,
    warning_key VARCHAR(255) NOT NULL,
    dismissed_by UUID NOT NULL,
    dismissed_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE UNIQUE INDEX uq_dismissed_warnings_key
    ON dismissed_warnings(budget_account_id, warning_type, warning_key);
";

const DROP_SQL: &str = r"
DROP TABLE IF EXISTS dismissed_warnings CASCADE;
DROP TABLE IF EXISTS debt_allocations CASCADE;
DROP TABLE IF EXISTS monthly_debt_planning CASCADE;
DROP TABLE IF EXISTS debts CASCADE;
DROP TABLE IF EXISTS income_sources CASCADE;
DROP TABLE IF EXISTS budget_account_members CASCADE;
DROP TABLE IF EXISTS budget_accounts CASCADE;
";
