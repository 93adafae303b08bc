use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            email       TEXT NOT NULL UNIQUE,
            name        TEXT,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS item_reports (
            id              TEXT PRIMARY KEY,
            reporter_id     TEXT NOT NULL REFERENCES users(id),
            title           TEXT NOT NULL,
            contact_email   TEXT NOT NULL,
            created_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS applications (
            id              TEXT PRIMARY KEY,
            item_report_id  TEXT NOT NULL REFERENCES item_reports(id),
            applicant_id    TEXT NOT NULL REFERENCES users(id),
            contact_email   TEXT NOT NULL,
            status          TEXT NOT NULL DEFAULT 'pending'
                                CHECK (status IN ('pending', 'paid')),
            created_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_applications_item
            ON applications(item_report_id);

        -- Append-only. The UNIQUE constraint on the triple is the safety
        -- mechanism against double-unlock under concurrent confirms; the
        -- orchestrator's exists() pre-check is only a fast-fail.
        CREATE TABLE IF NOT EXISTS unlock_records (
            id                  TEXT PRIMARY KEY,
            payer_id            TEXT NOT NULL REFERENCES users(id),
            resource_id         TEXT NOT NULL,
            resource_type       TEXT NOT NULL,
            amount              INTEGER NOT NULL,
            gateway_order_id    TEXT NOT NULL,
            gateway_payment_id  TEXT NOT NULL,
            status              TEXT NOT NULL DEFAULT 'completed',
            created_at          TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(payer_id, resource_id, resource_type)
        );

        CREATE INDEX IF NOT EXISTS idx_unlock_records_resource
            ON unlock_records(resource_id, resource_type);

        -- Generic service audit ledger for reporting. Written best-effort
        -- after an unlock record lands; never authoritative.
        CREATE TABLE IF NOT EXISTS service_orders (
            id              TEXT PRIMARY KEY,
            user_id         TEXT NOT NULL,
            service         TEXT NOT NULL,
            reference_id    TEXT NOT NULL,
            amount          INTEGER NOT NULL,
            created_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
