//! Initial database migration.
//!
//! Creates all core tables, enums, indexes, and the `updated_at` trigger.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: CATALOG
        // ============================================================
        db.execute_unprepared(MATERIALS_SQL).await?;

        // ============================================================
        // PART 3: REQUISITIONS
        // ============================================================
        db.execute_unprepared(REQUISITIONS_SQL).await?;
        db.execute_unprepared(REQUISITION_LINES_SQL).await?;

        // ============================================================
        // PART 4: PURCHASING
        // ============================================================
        db.execute_unprepared(PURCHASE_REQUESTS_SQL).await?;
        db.execute_unprepared(PURCHASE_REQUEST_LINES_SQL).await?;
        db.execute_unprepared(PURCHASE_ORDERS_SQL).await?;
        db.execute_unprepared(PURCHASE_ORDER_LINES_SQL).await?;

        // ============================================================
        // PART 5: WAREHOUSE LEDGER
        // ============================================================
        db.execute_unprepared(WAREHOUSE_MOVEMENTS_SQL).await?;

        // ============================================================
        // PART 6: BUDGETS
        // ============================================================
        db.execute_unprepared(BUDGET_LINES_SQL).await?;

        // ============================================================
        // PART 7: TRIGGERS & FUNCTIONS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Item category
CREATE TYPE item_kind AS ENUM (
    'material',
    'service',
    'equipment',
    'ppe'
);

-- Requisition line fulfillment status
CREATE TYPE line_status AS ENUM (
    'pending',
    'partial',
    'fulfilled',
    'cancelled'
);

-- Purchase request line status
CREATE TYPE request_line_status AS ENUM ('open', 'closed');

-- Purchase order status
CREATE TYPE order_status AS ENUM ('issued', 'cancelled', 'received');

-- Warehouse movement direction
CREATE TYPE movement_direction AS ENUM ('in', 'out');

-- Warehouse movement source
CREATE TYPE movement_source AS ENUM ('purchase_order', 'petty_cash');
";

const MATERIALS_SQL: &str = r"
CREATE TABLE materials (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL,
    kind item_kind NOT NULL DEFAULT 'material',
    unit TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE UNIQUE INDEX idx_materials_name_kind ON materials (lower(name), kind);
";

const REQUISITIONS_SQL: &str = r"
CREATE TABLE requisitions (
    id UUID PRIMARY KEY,
    front_specialty_id UUID NOT NULL,
    block TEXT,
    requested_by UUID NOT NULL,
    date DATE NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_requisitions_front_specialty ON requisitions (front_specialty_id);
";

const REQUISITION_LINES_SQL: &str = r"
CREATE TABLE requisition_lines (
    id UUID PRIMARY KEY,
    requisition_id UUID NOT NULL REFERENCES requisitions(id) ON DELETE CASCADE,
    kind item_kind NOT NULL,
    material_id UUID REFERENCES materials(id),
    equipment_id UUID,
    ppe_id UUID,
    item_description TEXT,
    unit TEXT NOT NULL,
    quantity_requested NUMERIC(18, 4) NOT NULL CHECK (quantity_requested > 0),
    quantity_fulfilled NUMERIC(18, 4) NOT NULL DEFAULT 0,
    status line_status NOT NULL DEFAULT 'pending',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    -- A line identifies its item by id or by description, never neither.
    CONSTRAINT chk_requisition_line_item CHECK (
        material_id IS NOT NULL
        OR equipment_id IS NOT NULL
        OR ppe_id IS NOT NULL
        OR item_description IS NOT NULL
    )
);

CREATE INDEX idx_requisition_lines_requisition ON requisition_lines (requisition_id);
CREATE INDEX idx_requisition_lines_material ON requisition_lines (material_id);
";

const PURCHASE_REQUESTS_SQL: &str = r"
CREATE TABLE purchase_requests (
    id UUID PRIMARY KEY,
    request_date DATE NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const PURCHASE_REQUEST_LINES_SQL: &str = r"
CREATE TABLE purchase_request_lines (
    id UUID PRIMARY KEY,
    purchase_request_id UUID NOT NULL REFERENCES purchase_requests(id) ON DELETE CASCADE,
    requisition_id UUID NOT NULL REFERENCES requisitions(id),
    kind item_kind NOT NULL,
    material_id UUID REFERENCES materials(id),
    equipment_id UUID,
    ppe_id UUID,
    item_description TEXT,
    quantity NUMERIC(18, 4) NOT NULL CHECK (quantity > 0),
    status request_line_status NOT NULL DEFAULT 'open',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_request_line_item CHECK (
        material_id IS NOT NULL
        OR equipment_id IS NOT NULL
        OR ppe_id IS NOT NULL
        OR item_description IS NOT NULL
    )
);

CREATE INDEX idx_purchase_request_lines_request ON purchase_request_lines (purchase_request_id);
CREATE INDEX idx_purchase_request_lines_requisition ON purchase_request_lines (requisition_id);
";

const PURCHASE_ORDERS_SQL: &str = r"
CREATE TABLE purchase_orders (
    id UUID PRIMARY KEY,
    status order_status NOT NULL DEFAULT 'issued',
    order_date DATE NOT NULL,
    supplier_name TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_purchase_orders_order_date ON purchase_orders (order_date);
";

const PURCHASE_ORDER_LINES_SQL: &str = r"
CREATE TABLE purchase_order_lines (
    id UUID PRIMARY KEY,
    purchase_order_id UUID NOT NULL REFERENCES purchase_orders(id) ON DELETE CASCADE,
    purchase_request_line_id UUID NOT NULL REFERENCES purchase_request_lines(id),
    quantity NUMERIC(18, 4) NOT NULL CHECK (quantity > 0),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_purchase_order_lines_order ON purchase_order_lines (purchase_order_id);
CREATE INDEX idx_purchase_order_lines_request_line ON purchase_order_lines (purchase_request_line_id);
";

const WAREHOUSE_MOVEMENTS_SQL: &str = r"
-- Append-only: no UPDATE/DELETE is ever issued against this table;
-- corrections are new rows.
CREATE TABLE warehouse_movements (
    id UUID PRIMARY KEY,
    direction movement_direction NOT NULL,
    kind item_kind NOT NULL,
    material_id UUID REFERENCES materials(id),
    equipment_id UUID,
    ppe_id UUID,
    item_description TEXT,
    quantity NUMERIC(18, 4) NOT NULL CHECK (quantity > 0),
    requisition_id UUID NOT NULL REFERENCES requisitions(id),
    source movement_source NOT NULL,
    destination TEXT,
    recorded_by UUID NOT NULL,
    recorded_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_movement_item CHECK (
        material_id IS NOT NULL
        OR equipment_id IS NOT NULL
        OR ppe_id IS NOT NULL
        OR item_description IS NOT NULL
    )
);

CREATE INDEX idx_warehouse_movements_requisition ON warehouse_movements (requisition_id);
CREATE INDEX idx_warehouse_movements_material ON warehouse_movements (material_id);
CREATE INDEX idx_warehouse_movements_recorded_at ON warehouse_movements (recorded_at);
";

const BUDGET_LINES_SQL: &str = r"
CREATE TABLE budget_lines (
    id UUID PRIMARY KEY,
    front_specialty_id UUID NOT NULL,
    material_id UUID NOT NULL REFERENCES materials(id),
    quantity_budgeted NUMERIC(18, 4) NOT NULL CHECK (quantity_budgeted >= 0),
    quantity_utilized NUMERIC(18, 4) NOT NULL DEFAULT 0 CHECK (quantity_utilized >= 0),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT uq_budget_front_material UNIQUE (front_specialty_id, material_id)
);

CREATE INDEX idx_budget_lines_front_specialty ON budget_lines (front_specialty_id);
";

const TRIGGERS_SQL: &str = r"
-- Keep updated_at current on row updates
CREATE OR REPLACE FUNCTION set_updated_at()
RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at = now();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_materials_updated_at
    BEFORE UPDATE ON materials
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_requisitions_updated_at
    BEFORE UPDATE ON requisitions
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_requisition_lines_updated_at
    BEFORE UPDATE ON requisition_lines
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_purchase_orders_updated_at
    BEFORE UPDATE ON purchase_orders
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_budget_lines_updated_at
    BEFORE UPDATE ON budget_lines
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS budget_lines CASCADE;
DROP TABLE IF EXISTS warehouse_movements CASCADE;
DROP TABLE IF EXISTS purchase_order_lines CASCADE;
DROP TABLE IF EXISTS purchase_orders CASCADE;
DROP TABLE IF EXISTS purchase_request_lines CASCADE;
DROP TABLE IF EXISTS purchase_requests CASCADE;
DROP TABLE IF EXISTS requisition_lines CASCADE;
DROP TABLE IF EXISTS requisitions CASCADE;
DROP TABLE IF EXISTS materials CASCADE;

DROP FUNCTION IF EXISTS set_updated_at CASCADE;

DROP TYPE IF EXISTS movement_source;
DROP TYPE IF EXISTS movement_direction;
DROP TYPE IF EXISTS order_status;
DROP TYPE IF EXISTS request_line_status;
DROP TYPE IF EXISTS line_status;
DROP TYPE IF EXISTS item_kind;
";
