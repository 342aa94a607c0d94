use crate::model::{
    Incident, IncidentPayload, IncidentStatus, Location, NewIncident, Registration, Role, User,
};
use crate::repository::{AuthCollaborator, AuthError, IncidentRepository, RepositoryError};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("incident '{0}' not found")]
    NotFound(String),
    #[error("email '{0}' is already registered")]
    DuplicateEmail(String),
    #[error("admin code rejected")]
    InvalidAdminCode,
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<StoreError> for RepositoryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => RepositoryError::NotFound(id),
            other => RepositoryError::Storage(other.to_string()),
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail(email) => AuthError::DuplicateEmail(email),
            StoreError::InvalidAdminCode => AuthError::InvalidAdminCode,
            other => AuthError::Unavailable(other.to_string()),
        }
    }
}

const INCIDENT_COLUMNS: &str = "id, title, description, type, severity, status, purok, barangay,
    municipality, latitude, longitude, reporter_id, reporter_name, images, created_at, updated_at";

/// SQLite-backed incident repository and account store. Also holds the
/// signed-in user for the desktop session.
#[derive(Clone)]
pub struct SqliteStore {
    db_path: Arc<PathBuf>,
    admin_secret: Arc<str>,
    session: Arc<Mutex<Option<User>>>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>, admin_secret: &str) -> Result<Self, StoreError> {
        let db_path = path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(&db_path)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            CREATE TABLE IF NOT EXISTS incidents (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                type TEXT NOT NULL,
                severity TEXT NOT NULL,
                status TEXT NOT NULL,
                purok TEXT NOT NULL,
                barangay TEXT NOT NULL,
                municipality TEXT NOT NULL,
                latitude REAL NOT NULL,
                longitude REAL NOT NULL,
                reporter_id TEXT,
                reporter_name TEXT,
                images TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_incidents_created ON incidents(created_at);
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL,
                department TEXT,
                jurisdiction TEXT,
                created_at TEXT NOT NULL
            );
            ",
        )?;
        debug!(path = %db_path.display(), "incident store opened");

        Ok(Self {
            db_path: Arc::new(db_path),
            admin_secret: Arc::from(admin_secret),
            session: Arc::new(Mutex::new(None)),
        })
    }

    fn connect(&self) -> Result<Connection, StoreError> {
        Ok(Connection::open(&*self.db_path)?)
    }

    pub fn insert_incident(&self, incident: NewIncident) -> Result<Incident, StoreError> {
        let now = Utc::now();
        let stored = Incident {
            id: Uuid::new_v4().to_string(),
            title: incident.report.title,
            description: incident.report.description,
            incident_type: incident.report.incident_type,
            severity: incident.report.severity,
            status: incident.status,
            location: incident.report.location,
            reporter_id: Some(incident.reporter_id),
            reporter_name: Some(incident.reporter_name),
            images: incident.report.images,
            created_at: now,
            updated_at: now,
        };

        let images = stored.images.as_ref().map(serde_json::to_string).transpose()?;
        let conn = self.connect()?;
        conn.execute(
            &format!(
                "INSERT INTO incidents ({INCIDENT_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)"
            ),
            params![
                stored.id,
                stored.title,
                stored.description,
                stored.incident_type.as_str(),
                stored.severity.as_str(),
                stored.status.as_str(),
                stored.location.purok,
                stored.location.barangay,
                stored.location.municipality,
                stored.location.latitude,
                stored.location.longitude,
                stored.reporter_id,
                stored.reporter_name,
                images,
                stamp(&stored.created_at),
                stamp(&stored.updated_at),
            ],
        )?;

        Ok(stored)
    }

    /// Replaces the reported fields. Status, reporter and creation time
    /// are kept.
    pub fn update_incident(&self, id: &str, payload: IncidentPayload) -> Result<Incident, StoreError> {
        let images = payload.images.as_ref().map(serde_json::to_string).transpose()?;
        let conn = self.connect()?;
        let changed = conn.execute(
            "UPDATE incidents
             SET title = ?2, description = ?3, type = ?4, severity = ?5, purok = ?6,
                 barangay = ?7, municipality = ?8, latitude = ?9, longitude = ?10,
                 images = ?11, updated_at = ?12
             WHERE id = ?1",
            params![
                id,
                payload.title,
                payload.description,
                payload.incident_type.as_str(),
                payload.severity.as_str(),
                payload.location.purok,
                payload.location.barangay,
                payload.location.municipality,
                payload.location.latitude,
                payload.location.longitude,
                images,
                stamp(&Utc::now()),
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }

        self.get_incident(id)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    pub fn get_incident(&self, id: &str) -> Result<Option<Incident>, StoreError> {
        let conn = self.connect()?;
        let incident = conn
            .query_row(
                &format!("SELECT {INCIDENT_COLUMNS} FROM incidents WHERE id = ?1"),
                params![id],
                map_incident,
            )
            .optional()?;
        Ok(incident)
    }

    /// Newest first.
    pub fn list_incidents(&self) -> Result<Vec<Incident>, StoreError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {INCIDENT_COLUMNS} FROM incidents ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt.query_map([], map_incident)?;

        let mut incidents = Vec::new();
        for row in rows {
            incidents.push(row?);
        }
        Ok(incidents)
    }

    /// Creates the account and signs it in.
    pub fn register_user(&self, registration: Registration) -> Result<User, StoreError> {
        let email = registration.email.trim().to_lowercase();
        if registration.role == Role::Admin
            && registration.admin_code.as_deref() != Some(&*self.admin_secret)
        {
            return Err(StoreError::InvalidAdminCode);
        }

        let conn = self.connect()?;
        let taken = conn
            .query_row("SELECT 1 FROM users WHERE email = ?1", params![email], |_| Ok(()))
            .optional()?
            .is_some();
        if taken {
            return Err(StoreError::DuplicateEmail(email));
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            name: registration.name,
            email,
            role: registration.role,
            department: registration.department,
            jurisdiction: registration.jurisdiction,
        };
        insert_user(&conn, &user, &registration.password)?;

        self.set_current_user(Some(user.clone()));
        Ok(user)
    }

    pub fn set_current_user(&self, user: Option<User>) {
        match self.session.lock() {
            Ok(mut session) => *session = user,
            Err(poisoned) => *poisoned.into_inner() = user,
        }
    }

    pub fn sign_out(&self) {
        self.set_current_user(None);
    }
}

/// A concurrent registration can pass the lookup in `register_user`; the
/// UNIQUE index still reports it as a duplicate.
fn insert_user(conn: &Connection, user: &User, password: &str) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO users (id, name, email, password_hash, role, department, jurisdiction, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            user.id,
            user.name,
            user.email,
            password_hash(&user.id, password),
            user.role.as_str(),
            user.department,
            user.jurisdiction,
            stamp(&Utc::now()),
        ],
    )
    .map_err(|err| match err.sqlite_error_code() {
        Some(ErrorCode::ConstraintViolation) => StoreError::DuplicateEmail(user.email.clone()),
        _ => StoreError::Sqlite(err),
    })?;
    Ok(())
}

/// Fixed-width so stored timestamps sort as text.
fn stamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn password_hash(salt: &str, password: &str) -> String {
    let digest = Sha256::new()
        .chain_update(salt.as_bytes())
        .chain_update(b":")
        .chain_update(password.as_bytes())
        .finalize();
    format!("{digest:x}")
}

fn conversion_error<E>(column: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(err))
}

fn parse_column<T>(row: &rusqlite::Row<'_>, column: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(column)?;
    raw.parse().map_err(|err| conversion_error(column, err))
}

fn timestamp_column(row: &rusqlite::Row<'_>, column: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(column)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|err| conversion_error(column, err))
}

fn map_incident(row: &rusqlite::Row<'_>) -> rusqlite::Result<Incident> {
    let images: Option<String> = row.get(13)?;
    let images = images
        .map(|raw| serde_json::from_str(&raw).map_err(|err| conversion_error(13, err)))
        .transpose()?;

    Ok(Incident {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        incident_type: parse_column(row, 3)?,
        severity: parse_column(row, 4)?,
        status: parse_column::<IncidentStatus>(row, 5)?,
        location: Location {
            purok: row.get(6)?,
            barangay: row.get(7)?,
            municipality: row.get(8)?,
            latitude: row.get(9)?,
            longitude: row.get(10)?,
        },
        reporter_id: row.get(11)?,
        reporter_name: row.get(12)?,
        images,
        created_at: timestamp_column(row, 14)?,
        updated_at: timestamp_column(row, 15)?,
    })
}

impl IncidentRepository for SqliteStore {
    async fn create(&self, incident: NewIncident) -> Result<Incident, RepositoryError> {
        let stored = self.insert_incident(incident).inspect_err(|err| {
            warn!(error = %err, "incident insert failed");
        })?;
        info!(incident_id = %stored.id, "incident stored");
        Ok(stored)
    }

    async fn update(&self, id: &str, payload: IncidentPayload) -> Result<Incident, RepositoryError> {
        let stored = self.update_incident(id, payload).inspect_err(|err| {
            warn!(incident_id = id, error = %err, "incident update failed");
        })?;
        Ok(stored)
    }
}

impl AuthCollaborator for SqliteStore {
    fn current_user(&self) -> Option<User> {
        match self.session.lock() {
            Ok(session) => session.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    async fn register(&self, registration: Registration) -> Result<User, AuthError> {
        let user = self.register_user(registration).inspect_err(|err| {
            warn!(error = %err, "registration refused");
        })?;
        Ok(user)
    }
}
