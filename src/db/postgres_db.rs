use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use super::{
    document_repository::DocumentRepository, user_repository::UserRepository,
    vehicle_repository::VehicleRepository, RepositoryError,
};
use crate::models::{
    document::{Document, DocumentStatus, NewDocument},
    user::{DriverStatus, Location, NewGoogleUser, ProfileUpdate, User, UserRole},
    vehicle::{NewVehicle, Vehicle, VehicleStatus, VehicleUpdate},
};

const USER_SELECT: &str = r#"
    SELECT u.id, u.phone, u.google_id, u.first_name, u.last_name, u.email, u.roles, u.status,
           u.latitude, u.longitude, u.created_at,
           (SELECT v.id FROM vehicles v WHERE v.owner_id = u.id) AS vehicle_id,
           ARRAY(SELECT d.id FROM documents d WHERE d.owner_id = u.id
                 ORDER BY d.uploaded_at, d.id) AS document_ids
    FROM users u
"#;

const VEHICLE_COLUMNS: &str =
    "id, owner_id, vehicle_type, make, model, license_plate, color, status, created_at";

const DOCUMENT_COLUMNS: &str = "id, owner_id, doc_type, file_name, file_path, status, uploaded_at";

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    phone: Option<String>,
    google_id: Option<String>,
    first_name: String,
    last_name: String,
    email: Option<String>,
    roles: Vec<UserRole>,
    status: DriverStatus,
    latitude: Option<f64>,
    longitude: Option<f64>,
    created_at: DateTime<Utc>,
    vehicle_id: Option<Uuid>,
    document_ids: Vec<Uuid>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        let location = match (row.latitude, row.longitude) {
            (Some(latitude), Some(longitude)) => Some(Location { latitude, longitude }),
            _ => None,
        };

        User {
            id: row.id,
            phone: row.phone,
            google_id: row.google_id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            role: row.roles.into_iter().collect(),
            status: row.status,
            location,
            vehicle: row.vehicle_id,
            documents: row.document_ids,
            created_at: row.created_at,
        }
    }
}

#[derive(Clone)]
pub struct PostgresDb {
    pool: PgPool,
}

impl PostgresDb {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects, checks the connection and applies pending migrations.
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;

        sqlx::query("SELECT 1").execute(&pool).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;

        info!("Connected to the database, migrations applied");
        Ok(Self::new(pool))
    }

    async fn fetch_user(&self, clause: &str, value: &str) -> Result<Option<User>, RepositoryError> {
        let sql = format!("{USER_SELECT} WHERE {clause} = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    async fn require_user(&self, id: Uuid) -> Result<User, RepositoryError> {
        self.find_user_by_id(id)
            .await?
            .ok_or(RepositoryError::Database(sqlx::Error::RowNotFound))
    }
}

#[async_trait]
impl UserRepository for PostgresDb {
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        let sql = format!("{USER_SELECT} WHERE u.id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    async fn find_user_by_phone(&self, phone: &str) -> Result<Option<User>, RepositoryError> {
        self.fetch_user("u.phone", phone).await
    }

    async fn find_user_by_google_id(
        &self,
        google_id: &str,
    ) -> Result<Option<User>, RepositoryError> {
        self.fetch_user("u.google_id", google_id).await
    }

    async fn create_user_with_phone(&self, phone: &str) -> Result<User, RepositoryError> {
        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO users (id, phone) VALUES ($1, $2)")
            .bind(id)
            .bind(phone)
            .execute(&self.pool)
            .await?;
        self.require_user(id).await
    }

    async fn create_user_with_google(
        &self,
        new_user: &NewGoogleUser,
    ) -> Result<User, RepositoryError> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO users (id, google_id, first_name, last_name, email)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(id)
        .bind(&new_user.google_id)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(&new_user.email)
        .execute(&self.pool)
        .await?;
        self.require_user(id).await
    }

    async fn update_user_profile(
        &self,
        id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, RepositoryError> {
        let updated = sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE users SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                email = CASE WHEN $4 THEN $5 ELSE email END,
                phone = COALESCE($6, phone)
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(update.email.is_some())
        .bind(update.email.clone().flatten())
        .bind(&update.phone)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(id) => self.find_user_by_id(id).await,
            None => Ok(None),
        }
    }

    async fn set_user_roles(
        &self,
        id: Uuid,
        roles: &BTreeSet<UserRole>,
    ) -> Result<(), RepositoryError> {
        let roles: Vec<UserRole> = roles.iter().copied().collect();
        sqlx::query("UPDATE users SET roles = $2 WHERE id = $1")
            .bind(id)
            .bind(roles)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_driver_status(
        &self,
        id: Uuid,
        status: DriverStatus,
    ) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE users SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_driver_location(
        &self,
        id: Uuid,
        location: Location,
    ) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE users SET latitude = $2, longitude = $3 WHERE id = $1")
            .bind(id)
            .bind(location.latitude)
            .bind(location.longitude)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_online_drivers(&self) -> Result<Vec<User>, RepositoryError> {
        let sql = format!(
            "{USER_SELECT} WHERE u.status = 'online' AND 'driver' = ANY(u.roles) ORDER BY u.created_at"
        );
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }
}

#[async_trait]
impl VehicleRepository for PostgresDb {
    async fn find_vehicle_by_plate(&self, plate: &str) -> Result<Option<Vehicle>, RepositoryError> {
        let sql = format!("SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE license_plate = $1");
        Ok(sqlx::query_as::<_, Vehicle>(&sql)
            .bind(plate)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_vehicle_by_owner(&self, owner: Uuid) -> Result<Option<Vehicle>, RepositoryError> {
        let sql = format!("SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE owner_id = $1");
        Ok(sqlx::query_as::<_, Vehicle>(&sql)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_vehicle(&self, vehicle: &NewVehicle) -> Result<Vehicle, RepositoryError> {
        let sql = format!(
            r#"
            INSERT INTO vehicles (id, owner_id, vehicle_type, make, model, license_plate, color)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {VEHICLE_COLUMNS}
            "#
        );
        Ok(sqlx::query_as::<_, Vehicle>(&sql)
            .bind(Uuid::new_v4())
            .bind(vehicle.owner)
            .bind(vehicle.vehicle_type)
            .bind(&vehicle.make)
            .bind(&vehicle.model)
            .bind(&vehicle.license_plate)
            .bind(&vehicle.color)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_vehicle(
        &self,
        id: Uuid,
        update: &VehicleUpdate,
    ) -> Result<Option<Vehicle>, RepositoryError> {
        let sql = format!(
            r#"
            UPDATE vehicles SET
                vehicle_type = COALESCE($2, vehicle_type),
                make = COALESCE($3, make),
                model = COALESCE($4, model),
                license_plate = COALESCE($5, license_plate),
                color = COALESCE($6, color)
            WHERE id = $1
            RETURNING {VEHICLE_COLUMNS}
            "#
        );
        Ok(sqlx::query_as::<_, Vehicle>(&sql)
            .bind(id)
            .bind(update.vehicle_type)
            .bind(&update.make)
            .bind(&update.model)
            .bind(&update.license_plate)
            .bind(&update.color)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn set_vehicle_status(
        &self,
        id: Uuid,
        status: VehicleStatus,
    ) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE vehicles SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentRepository for PostgresDb {
    async fn create_document(&self, document: &NewDocument) -> Result<Document, RepositoryError> {
        let sql = format!(
            r#"
            INSERT INTO documents (id, owner_id, doc_type, file_name, file_path)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {DOCUMENT_COLUMNS}
            "#
        );
        Ok(sqlx::query_as::<_, Document>(&sql)
            .bind(Uuid::new_v4())
            .bind(document.owner)
            .bind(document.doc_type)
            .bind(&document.file_name)
            .bind(&document.file_path)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn find_documents_by_owner(&self, owner: Uuid) -> Result<Vec<Document>, RepositoryError> {
        let sql = format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE owner_id = $1 ORDER BY uploaded_at, id"
        );
        Ok(sqlx::query_as::<_, Document>(&sql)
            .bind(owner)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_documents_by_status(
        &self,
        status: DocumentStatus,
    ) -> Result<Vec<Document>, RepositoryError> {
        let sql = format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE status = $1 ORDER BY uploaded_at, id"
        );
        Ok(sqlx::query_as::<_, Document>(&sql)
            .bind(status)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn set_document_status(
        &self,
        id: Uuid,
        status: DocumentStatus,
    ) -> Result<Option<Document>, RepositoryError> {
        let sql = format!(
            "UPDATE documents SET status = $2 WHERE id = $1 RETURNING {DOCUMENT_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Document>(&sql)
            .bind(id)
            .bind(status)
            .fetch_optional(&self.pool)
            .await?)
    }
}
