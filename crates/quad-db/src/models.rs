/// Database row types — these map directly to SQLite rows.
/// Distinct from the quad-types API models to keep the DB layer independent.

pub struct UserRow {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub created_at: String,
}

pub struct ItemReportRow {
    pub id: String,
    pub reporter_id: String,
    pub title: String,
    pub contact_email: String,
    pub created_at: String,
}

pub struct ApplicationRow {
    pub id: String,
    pub item_report_id: String,
    pub applicant_id: String,
    pub contact_email: String,
    pub status: String,
    pub created_at: String,
}

pub struct UnlockRecordRow {
    pub id: String,
    pub payer_id: String,
    pub resource_id: String,
    pub resource_type: String,
    pub amount: u64,
    pub gateway_order_id: String,
    pub gateway_payment_id: String,
    pub status: String,
    pub created_at: String,
}
