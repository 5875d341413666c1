use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::manager::{DatabaseError, DatabaseManager};
use super::models::{Harvest, HarvestRow, Plot};
use super::store::{FarmStore, NewHarvest, NewPlot, PlotChanges};

const PLOT_COLUMNS: &str = "id, name, area_m2, planting_start";

const HARVEST_SELECT: &str = r#"
    SELECT
        h.id, h.plot_id, h.date, h.weight_kg, h.quality,
        p.name AS plot_name,
        p.area_m2 AS plot_area_m2,
        p.planting_start AS plot_planting_start
    FROM harvests h
    JOIN plots p ON p.id = h.plot_id
"#;

/// PostgreSQL-backed store (tables from `migrations/`)
#[derive(Clone)]
pub struct PgFarmStore {
    pool: PgPool,
}

impl PgFarmStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Translate constraint failures on `plots.name` into a domain error.
fn map_name_conflict(err: sqlx::Error, name: &str) -> DatabaseError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return DatabaseError::UniqueViolation {
                field: "name".to_string(),
                value: name.to_string(),
            };
        }
    }
    DatabaseError::Sqlx(err)
}

/// The referenced plot vanished between the existence check and the insert.
fn map_missing_plot(err: sqlx::Error) -> DatabaseError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_foreign_key_violation() {
            return DatabaseError::NotFound("Plot not found".to_string());
        }
    }
    DatabaseError::Sqlx(err)
}

#[async_trait]
impl FarmStore for PgFarmStore {
    async fn insert_plot(&self, plot: NewPlot) -> Result<Plot, DatabaseError> {
        let sql = format!(
            "INSERT INTO plots (id, name, area_m2, planting_start) VALUES ($1, $2, $3, $4) RETURNING {}",
            PLOT_COLUMNS
        );

        sqlx::query_as::<_, Plot>(&sql)
            .bind(Uuid::new_v4())
            .bind(&plot.name)
            .bind(plot.area)
            .bind(plot.planting_start)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_name_conflict(e, &plot.name))
    }

    async fn list_plots(&self) -> Result<Vec<Plot>, DatabaseError> {
        let sql = format!("SELECT {} FROM plots ORDER BY name ASC", PLOT_COLUMNS);
        let plots = sqlx::query_as::<_, Plot>(&sql).fetch_all(&self.pool).await?;
        Ok(plots)
    }

    async fn find_plot(&self, id: Uuid) -> Result<Option<Plot>, DatabaseError> {
        let sql = format!("SELECT {} FROM plots WHERE id = $1", PLOT_COLUMNS);
        let plot = sqlx::query_as::<_, Plot>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(plot)
    }

    async fn update_plot(&self, id: Uuid, changes: PlotChanges) -> Result<u64, DatabaseError> {
        if changes.is_empty() {
            return Ok(0);
        }

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE plots SET ");
        {
            let mut set = qb.separated(", ");
            if let Some(name) = &changes.name {
                set.push("name = ").push_bind_unseparated(name.clone());
            }
            if let Some(area) = changes.area {
                set.push("area_m2 = ").push_bind_unseparated(area);
            }
            if let Some(planting_start) = changes.planting_start {
                set.push("planting_start = ").push_bind_unseparated(planting_start);
            }
        }
        qb.push(" WHERE id = ").push_bind(id);

        let result = qb.build().execute(&self.pool).await.map_err(|e| {
            let name = changes.name.as_deref().unwrap_or_default();
            map_name_conflict(e, name)
        })?;

        Ok(result.rows_affected())
    }

    async fn delete_plot(&self, id: Uuid) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM plots WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn total_harvest_kg(&self, plot_id: Uuid) -> Result<Decimal, DatabaseError> {
        // Aggregate without GROUP BY always yields one row, even for an unknown plot.
        let (total,): (Decimal,) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(h.weight_kg), 0) AS total_kg
            FROM plots p
            LEFT JOIN harvests h ON h.plot_id = p.id
            WHERE p.id = $1
            "#,
        )
        .bind(plot_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    async fn insert_harvest(&self, harvest: NewHarvest) -> Result<Harvest, DatabaseError> {
        let row = sqlx::query_as::<_, HarvestRow>(
            r#"
            WITH inserted AS (
                INSERT INTO harvests (id, plot_id, date, weight_kg, quality)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, plot_id, date, weight_kg, quality
            )
            SELECT
                i.id, i.plot_id, i.date, i.weight_kg, i.quality,
                p.name AS plot_name,
                p.area_m2 AS plot_area_m2,
                p.planting_start AS plot_planting_start
            FROM inserted i
            JOIN plots p ON p.id = i.plot_id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(harvest.plot_id)
        .bind(harvest.date)
        .bind(harvest.weight_kg)
        .bind(&harvest.quality)
        .fetch_one(&self.pool)
        .await
        .map_err(map_missing_plot)?;

        Ok(row.into())
    }

    async fn list_harvests(&self, plot_id: Option<Uuid>) -> Result<Vec<Harvest>, DatabaseError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(HARVEST_SELECT);
        if let Some(plot_id) = plot_id {
            qb.push(" WHERE h.plot_id = ").push_bind(plot_id);
        }
        qb.push(" ORDER BY h.date DESC");

        let rows = qb.build_query_as::<HarvestRow>().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Harvest::from).collect())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}
