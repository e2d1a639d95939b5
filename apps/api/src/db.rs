use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates the interview and resume-review tables if they do not exist yet.
/// Schema init runs at startup and is idempotent.
///
/// The four parallel interview lists live in JSONB columns; the append path
/// in `store::postgres` relies on `jsonb_array_length` over them.
pub async fn init_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS interviews (
            id TEXT PRIMARY KEY,
            user_id UUID NOT NULL,
            role TEXT NOT NULL,
            session_type TEXT NOT NULL DEFAULT 'standard',
            questions JSONB NOT NULL DEFAULT '[]',
            answers JSONB NOT NULL DEFAULT '[]',
            scores JSONB NOT NULL DEFAULT '[]',
            feedback JSONB NOT NULL DEFAULT '[]',
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS resume_reviews (
            id TEXT PRIMARY KEY,
            user_id UUID NOT NULL,
            target_role TEXT NOT NULL,
            ats_score INTEGER NOT NULL,
            keywords_matched JSONB NOT NULL DEFAULT '[]',
            missing_skills JSONB NOT NULL DEFAULT '[]',
            formatting_issues JSONB NOT NULL DEFAULT '[]',
            file_ref TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_interviews_user ON interviews (user_id, created_at DESC)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_reviews_user ON resume_reviews (user_id, created_at DESC)")
        .execute(pool)
        .await?;

    info!("Database schema initialized");
    Ok(())
}
