use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{Caregiver, ContactRecord, DialOutcome, EscalationRecord, EscalationReport};
use crate::transport::CaregiverStore;

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let users = vec![
        (
            Uuid::parse_str("6b0f3c8e-5f0e-4d8a-9d53-1c1f3f4e2a10")?,
            "Maya Alvarez",
            "maya.alvarez@example.com",
        ),
        (
            Uuid::parse_str("b2f4e7a1-0c6d-4b9e-8f3a-7d2c5e9a1b44")?,
            "Noah Kim",
            "noah.kim@example.com",
        ),
    ];

    for (id, name, email) in users {
        upsert_user(pool, id, name, email).await?;
    }

    let caregivers = vec![
        (
            "maya.alvarez@example.com",
            "Elena Alvarez",
            "+15550142",
            "elena.alvarez@example.com",
        ),
        (
            "maya.alvarez@example.com",
            "Sam Ortiz",
            "",
            "sam.ortiz@example.com",
        ),
        (
            "noah.kim@example.com",
            "Grace Kim",
            "+15550187",
            "grace.kim@example.com",
        ),
    ];

    for (user_email, name, phone, email) in caregivers {
        let user_id = find_user_id(pool, user_email)
            .await?
            .with_context(|| format!("seed user {user_email} missing"))?;
        insert_caregiver(
            pool,
            user_id,
            &Caregiver {
                name: name.to_string(),
                phone: phone.to_string(),
                email: email.to_string(),
            },
        )
        .await?;
    }

    Ok(())
}

async fn upsert_user(pool: &PgPool, id: Uuid, name: &str, email: &str) -> anyhow::Result<Uuid> {
    let user_id: Uuid = sqlx::query(
        r#"
        INSERT INTO breakdown_escalation.users (id, full_name, email)
        VALUES ($1, $2, $3)
        ON CONFLICT (email) DO UPDATE
        SET full_name = EXCLUDED.full_name
        RETURNING id
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(normalize_email(email))
    .fetch_one(pool)
    .await?
    .get("id");
    Ok(user_id)
}

/// Emails are stored trimmed and lowercased; every lookup goes through this.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub async fn find_user_id(pool: &PgPool, email: &str) -> anyhow::Result<Option<Uuid>> {
    let row = sqlx::query("SELECT id FROM breakdown_escalation.users WHERE email = $1")
        .bind(normalize_email(email))
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|row| row.get("id")))
}

/// Trims every field and rejects caregivers missing a name, phone or email.
pub fn validate_caregiver(name: &str, phone: &str, email: &str) -> anyhow::Result<Caregiver> {
    let caregiver = Caregiver {
        name: name.trim().to_string(),
        phone: phone.trim().to_string(),
        email: normalize_email(email),
    };
    if caregiver.name.is_empty() || caregiver.phone.is_empty() || caregiver.email.is_empty() {
        anyhow::bail!("caregiver name, phone and email are all required");
    }
    if !caregiver.email.contains('@') {
        anyhow::bail!("caregiver email {} is not valid", caregiver.email);
    }
    Ok(caregiver)
}

async fn insert_caregiver(pool: &PgPool, user_id: Uuid, caregiver: &Caregiver) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO breakdown_escalation.caregivers (id, user_id, name, phone, email)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (user_id, email) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(&caregiver.name)
    .bind(&caregiver.phone)
    .bind(&caregiver.email)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn add_caregiver(
    pool: &PgPool,
    user_email: &str,
    caregiver: &Caregiver,
) -> anyhow::Result<()> {
    let user_id = find_user_id(pool, user_email)
        .await?
        .with_context(|| format!("no user registered with email {user_email}"))?;
    if !insert_caregiver(pool, user_id, caregiver).await? {
        anyhow::bail!("caregiver {} is already added", caregiver.email);
    }
    Ok(())
}

pub async fn remove_caregiver(
    pool: &PgPool,
    user_email: &str,
    caregiver_email: &str,
) -> anyhow::Result<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM breakdown_escalation.caregivers c
        USING breakdown_escalation.users u
        WHERE u.id = c.user_id AND u.email = $1 AND c.email = $2
        "#,
    )
    .bind(normalize_email(user_email))
    .bind(normalize_email(caregiver_email))
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn list_caregivers(pool: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Caregiver>> {
    let rows = sqlx::query(
        "SELECT name, phone, email FROM breakdown_escalation.caregivers \
         WHERE user_id = $1 ORDER BY created_at, name",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| Caregiver {
            name: row.get("name"),
            phone: row.get("phone"),
            email: row.get("email"),
        })
        .collect())
}

pub async fn import_caregivers_csv(
    pool: &PgPool,
    csv_path: &std::path::Path,
) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        user_name: String,
        user_email: String,
        name: String,
        #[serde(default)]
        phone: String,
        email: String,
    }

    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut inserted = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        let user_id = upsert_user(
            pool,
            Uuid::new_v4(),
            row.user_name.trim(),
            &row.user_email,
        )
        .await?;

        // Imported contacts may lack a phone; they are notified but never dialed.
        let caregiver = Caregiver {
            name: row.name.trim().to_string(),
            phone: row.phone.trim().to_string(),
            email: normalize_email(&row.email),
        };
        if caregiver.name.is_empty() || caregiver.email.is_empty() {
            tracing::warn!(user = %row.user_email, "skipping caregiver row without name or email");
            continue;
        }

        if insert_caregiver(pool, user_id, &caregiver).await? {
            inserted += 1;
        }
    }

    Ok(inserted)
}

pub struct PgCaregiverStore {
    pool: PgPool,
}

impl PgCaregiverStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CaregiverStore for PgCaregiverStore {
    async fn fetch_caregivers(&self, user_id: Uuid) -> anyhow::Result<Option<Vec<Caregiver>>> {
        let exists = sqlx::query("SELECT 1 FROM breakdown_escalation.users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .context("failed to look up user")?
            .is_some();
        if !exists {
            return Ok(None);
        }
        list_caregivers(&self.pool, user_id).await.map(Some)
    }
}

fn dial_columns(dial: &DialOutcome) -> (&'static str, Option<&str>) {
    match dial {
        DialOutcome::Dialed => ("dialed", None),
        DialOutcome::Skipped => ("skipped", None),
        DialOutcome::Failed(err) => ("failed", Some(err.as_str())),
    }
}

pub async fn record_escalation(pool: &PgPool, report: &EscalationReport) -> anyhow::Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO breakdown_escalation.escalations
        (id, user_id, triggered_at, emotion_intensity, stress_level, trigger_count, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(report.id)
    .bind(report.user_id)
    .bind(report.triggered_at)
    .bind(i16::from(report.emotion_intensity.value()))
    .bind(i16::from(report.stress_level.value()))
    .bind(i32::try_from(report.trigger_count).unwrap_or(i32::MAX))
    .bind(report.status.as_str())
    .execute(&mut *tx)
    .await?;

    for contact in &report.contacts {
        let (dial, dial_error) = dial_columns(&contact.dial);
        sqlx::query(
            r#"
            INSERT INTO breakdown_escalation.escalation_contacts
            (id, escalation_id, caregiver_name, caregiver_email, notified,
             notification_error, dial, dial_error)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(report.id)
        .bind(&contact.caregiver.name)
        .bind(&contact.caregiver.email)
        .bind(contact.notification_error.is_none())
        .bind(contact.notification_error.as_deref())
        .bind(dial)
        .bind(dial_error)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

pub async fn fetch_escalations(
    pool: &PgPool,
    since: DateTime<Utc>,
    user_email: Option<&str>,
) -> anyhow::Result<Vec<EscalationRecord>> {
    let mut query = String::from(
        "SELECT u.full_name, e.triggered_at, e.emotion_intensity, e.stress_level, \
         e.trigger_count, e.status \
         FROM breakdown_escalation.escalations e \
         JOIN breakdown_escalation.users u ON u.id = e.user_id \
         WHERE e.triggered_at >= $1",
    );
    if user_email.is_some() {
        query.push_str(" AND u.email = $2");
    }
    query.push_str(" ORDER BY e.triggered_at DESC");

    let mut rows = sqlx::query(&query).bind(since);
    if let Some(value) = user_email {
        rows = rows.bind(normalize_email(value));
    }

    let records = rows.fetch_all(pool).await?;
    Ok(records
        .into_iter()
        .map(|row| EscalationRecord {
            user_name: row.get("full_name"),
            triggered_at: row.get("triggered_at"),
            emotion_intensity: row.get("emotion_intensity"),
            stress_level: row.get("stress_level"),
            trigger_count: row.get("trigger_count"),
            status: row.get("status"),
        })
        .collect())
}

pub async fn fetch_contacts(
    pool: &PgPool,
    since: DateTime<Utc>,
    user_email: Option<&str>,
) -> anyhow::Result<Vec<ContactRecord>> {
    let mut query = String::from(
        "SELECT c.caregiver_name, c.caregiver_email, c.notified, c.dial \
         FROM breakdown_escalation.escalation_contacts c \
         JOIN breakdown_escalation.escalations e ON e.id = c.escalation_id \
         JOIN breakdown_escalation.users u ON u.id = e.user_id \
         WHERE e.triggered_at >= $1",
    );
    if user_email.is_some() {
        query.push_str(" AND u.email = $2");
    }

    let mut rows = sqlx::query(&query).bind(since);
    if let Some(value) = user_email {
        rows = rows.bind(normalize_email(value));
    }

    let records = rows.fetch_all(pool).await?;
    Ok(records
        .into_iter()
        .map(|row| ContactRecord {
            caregiver_name: row.get("caregiver_name"),
            caregiver_email: row.get("caregiver_email"),
            notified: row.get("notified"),
            dial: row.get("dial"),
        })
        .collect())
}
