use anyhow::Result;
use rusqlite::Connection;
use uuid::Uuid;

use quad_types::contracts::NewUnlockRecord;
use quad_types::error::LedgerError;
use quad_types::resource::ResourceKind;

use crate::Database;
use crate::models::UnlockRecordRow;

impl Database {
    // -- Users (identity directory) --

    pub fn create_user(&self, id: &str, email: &str, name: Option<&str>) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, email, name) VALUES (?1, ?2, ?3)",
                rusqlite::params![id, email, name],
            )?;
            Ok(())
        })
    }

    pub fn get_user_contact(&self, id: &str) -> Result<Option<String>> {
        self.with_conn(|conn| {
            conn.query_row("SELECT email FROM users WHERE id = ?1", [id], |row| {
                row.get(0)
            })
            .optional()
        })
    }

    // -- Resources --

    pub fn create_item_report(
        &self,
        id: &str,
        reporter_id: &str,
        title: &str,
        contact_email: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO item_reports (id, reporter_id, title, contact_email)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![id, reporter_id, title, contact_email],
            )?;
            Ok(())
        })
    }

    pub fn create_application(
        &self,
        id: &str,
        item_report_id: &str,
        applicant_id: &str,
        contact_email: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO applications (id, item_report_id, applicant_id, contact_email)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![id, item_report_id, applicant_id, contact_email],
            )?;
            Ok(())
        })
    }

    /// The contact identity a payment reveals, or None if the (kind, id)
    /// pair resolves to nothing.
    pub fn protected_identity(&self, kind: ResourceKind, id: &str) -> Result<Option<String>> {
        let sql = match kind {
            ResourceKind::ItemContact => "SELECT contact_email FROM item_reports WHERE id = ?1",
            ResourceKind::ApplicationContact => {
                "SELECT contact_email FROM applications WHERE id = ?1"
            }
        };
        self.with_conn(|conn| conn.query_row(sql, [id], |row| row.get(0)).optional())
    }

    pub fn set_application_paid(&self, id: &str) -> Result<()> {
        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE applications SET status = 'paid' WHERE id = ?1",
                [id],
            )?;
            if updated == 0 {
                return Err(anyhow::anyhow!("application not found: {}", id));
            }
            Ok(())
        })
    }

    pub fn get_application_status(&self, id: &str) -> Result<Option<String>> {
        self.with_conn(|conn| {
            conn.query_row("SELECT status FROM applications WHERE id = ?1", [id], |row| {
                row.get(0)
            })
            .optional()
        })
    }

    // -- Unlock ledger --

    pub fn unlock_exists(
        &self,
        payer_id: &str,
        resource_id: &str,
        kind: ResourceKind,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM unlock_records
                 WHERE payer_id = ?1 AND resource_id = ?2 AND resource_type = ?3",
                rusqlite::params![payer_id, resource_id, kind.as_str()],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
    }

    /// Append-only insert. A UNIQUE violation on the triple maps to
    /// [`LedgerError::Duplicate`] so the orchestrator can translate a lost
    /// confirm race into idempotent success.
    pub fn append_unlock_record(&self, record: &NewUnlockRecord) -> Result<(), LedgerError> {
        self.with_conn(|conn| {
            let id = Uuid::new_v4().to_string();
            match conn.execute(
                "INSERT INTO unlock_records
                 (id, payer_id, resource_id, resource_type, amount, gateway_order_id, gateway_payment_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    id,
                    record.payer_id,
                    record.resource_id,
                    record.resource_type.as_str(),
                    record.amount as i64,
                    record.gateway_order_id,
                    record.gateway_payment_id,
                ],
            ) {
                Ok(_) => Ok(()),
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    Err(LedgerError::Duplicate)
                }
                Err(e) => Err(LedgerError::Storage(e.into())),
            }
        })
    }

    pub fn get_unlock_record(
        &self,
        payer_id: &str,
        resource_id: &str,
        kind: ResourceKind,
    ) -> Result<Option<UnlockRecordRow>> {
        self.with_conn(|conn| query_unlock_record(conn, payer_id, resource_id, kind))
    }

    // -- Service audit ledger --

    pub fn insert_service_order(
        &self,
        user_id: &str,
        service: &str,
        reference_id: &str,
        amount: u64,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO service_orders (id, user_id, service, reference_id, amount)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    Uuid::new_v4().to_string(),
                    user_id,
                    service,
                    reference_id,
                    amount as i64
                ],
            )?;
            Ok(())
        })
    }
}

fn query_unlock_record(
    conn: &Connection,
    payer_id: &str,
    resource_id: &str,
    kind: ResourceKind,
) -> Result<Option<UnlockRecordRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, payer_id, resource_id, resource_type, amount,
                gateway_order_id, gateway_payment_id, status, created_at
         FROM unlock_records
         WHERE payer_id = ?1 AND resource_id = ?2 AND resource_type = ?3",
    )?;

    let row = stmt
        .query_row(
            rusqlite::params![payer_id, resource_id, kind.as_str()],
            |row| {
                Ok(UnlockRecordRow {
                    id: row.get(0)?,
                    payer_id: row.get(1)?,
                    resource_id: row.get(2)?,
                    resource_type: row.get(3)?,
                    amount: row.get::<_, i64>(4)? as u64,
                    gateway_order_id: row.get(5)?,
                    gateway_payment_id: row.get(6)?,
                    status: row.get(7)?,
                    created_at: row.get(8)?,
                })
            },
        )
        .optional()?;

    Ok(row)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.create_user("u-finder", "finder@campus.edu", Some("Finder"))
            .unwrap();
        db.create_user("u-owner", "owner@campus.edu", Some("Owner"))
            .unwrap();
        db.create_item_report("item-1", "u-finder", "Blue backpack", "finder@campus.edu")
            .unwrap();
        db.create_application("app-1", "item-1", "u-owner", "owner@campus.edu")
            .unwrap();
        db
    }

    fn record(payer: &str, resource: &str, kind: ResourceKind) -> NewUnlockRecord {
        NewUnlockRecord {
            payer_id: payer.to_string(),
            resource_id: resource.to_string(),
            resource_type: kind,
            amount: 500,
            gateway_order_id: "order_1".to_string(),
            gateway_payment_id: "pay_1".to_string(),
        }
    }

    #[test]
    fn protected_identity_resolves_per_kind() {
        let db = seeded_db();
        assert_eq!(
            db.protected_identity(ResourceKind::ItemContact, "item-1")
                .unwrap()
                .as_deref(),
            Some("finder@campus.edu")
        );
        assert_eq!(
            db.protected_identity(ResourceKind::ApplicationContact, "app-1")
                .unwrap()
                .as_deref(),
            Some("owner@campus.edu")
        );
        assert!(
            db.protected_identity(ResourceKind::ItemContact, "nope")
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn append_then_exists() {
        let db = seeded_db();
        let kind = ResourceKind::ItemContact;
        assert!(!db.unlock_exists("u-owner", "item-1", kind).unwrap());

        db.append_unlock_record(&record("u-owner", "item-1", kind))
            .unwrap();
        assert!(db.unlock_exists("u-owner", "item-1", kind).unwrap());

        let row = db
            .get_unlock_record("u-owner", "item-1", kind)
            .unwrap()
            .unwrap();
        assert_eq!(row.amount, 500);
        assert_eq!(row.status, "completed");
        assert_eq!(row.gateway_payment_id, "pay_1");
    }

    #[test]
    fn duplicate_triple_is_rejected_by_constraint() {
        let db = seeded_db();
        let kind = ResourceKind::ItemContact;
        db.append_unlock_record(&record("u-owner", "item-1", kind))
            .unwrap();

        // Same triple, different payment: the UNIQUE index must fire.
        let mut dup = record("u-owner", "item-1", kind);
        dup.gateway_payment_id = "pay_2".to_string();
        let err = db.append_unlock_record(&dup).unwrap_err();
        assert!(matches!(err, LedgerError::Duplicate));

        // Different kind for the same ids is a different triple.
        db.append_unlock_record(&record("u-owner", "item-1", ResourceKind::ApplicationContact))
            .unwrap();
    }

    #[test]
    fn application_status_flips_to_paid() {
        let db = seeded_db();
        assert_eq!(
            db.get_application_status("app-1").unwrap().as_deref(),
            Some("pending")
        );
        db.set_application_paid("app-1").unwrap();
        assert_eq!(
            db.get_application_status("app-1").unwrap().as_deref(),
            Some("paid")
        );
        assert!(db.set_application_paid("missing").is_err());
    }

    #[test]
    fn user_contact_lookup() {
        let db = seeded_db();
        assert_eq!(
            db.get_user_contact("u-owner").unwrap().as_deref(),
            Some("owner@campus.edu")
        );
        assert!(db.get_user_contact("ghost").unwrap().is_none());
    }
}
