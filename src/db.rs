use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use sqlx::{FromRow, Pool, Sqlite};
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PredictionRecord {
    pub id: i64,
    pub student_name: String,
    pub department: String,
    pub current_average: f64,
    pub predicted_sgpa: f64,
    pub risk: String,
    pub created_at: DateTime<Utc>,
}

/// Fields of a prediction worth keeping; the id and timestamp are assigned
/// on insert.
#[derive(Debug, Clone)]
pub struct NewPrediction {
    pub student_name: String,
    pub department: String,
    pub current_average: f64,
    pub predicted_sgpa: f64,
    pub risk: String,
}

pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Connect to the SQLite database at `url` (e.g. `sqlite:predictions.db`
    /// or `sqlite::memory:`) and create the schema if it is missing.
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS predictions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                student_name TEXT NOT NULL,
                department TEXT NOT NULL,
                current_average REAL NOT NULL,
                predicted_sgpa REAL NOT NULL,
                risk TEXT NOT NULL,
                created_at DATETIME NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;

        Ok(Database { pool })
    }

    pub async fn save_prediction(&self, record: &NewPrediction) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO predictions (student_name, department, current_average, predicted_sgpa, risk, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.student_name)
        .bind(&record.department)
        .bind(record.current_average)
        .bind(record.predicted_sgpa)
        .bind(&record.risk)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Stored predictions for one student, newest first.
    pub async fn history_for_student(
        &self,
        student_name: &str,
    ) -> Result<Vec<PredictionRecord>, sqlx::Error> {
        sqlx::query_as::<_, PredictionRecord>(
            r#"
            SELECT id, student_name, department, current_average, predicted_sgpa, risk, created_at
            FROM predictions
            WHERE student_name = ?
            ORDER BY created_at DESC
            "#,
        )
        .bind(student_name)
        .fetch_all(&self.pool)
        .await
    }
}
