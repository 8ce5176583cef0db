pub mod test_helpers {
    use chrono::NaiveDate;
    use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
    use tempfile::NamedTempFile;

    use crate::models::settings::UserSettings;

    /// Create a new in-memory SQLite database for testing
    pub async fn create_test_db() -> Result<SqlitePool, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await?;

        // Run migrations
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(pool)
    }

    /// Create a temporary file-based SQLite database for testing
    /// Useful when you need to test features that don't work with in-memory databases
    pub async fn create_test_db_file() -> Result<(SqlitePool, NamedTempFile), sqlx::Error> {
        let temp_file = NamedTempFile::new().map_err(sqlx::Error::Io)?;
        let db_path = temp_file
            .path()
            .to_str()
            .ok_or_else(|| sqlx::Error::Configuration("Invalid database path".into()))?;
        let database_url = format!("sqlite://{}", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(&database_url)
            .await?;

        // Run migrations
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok((pool, temp_file))
    }

    /// Insert a test user with hashed password, returning the user id
    pub async fn insert_test_user(
        pool: &SqlitePool,
        email: &str,
        password: &str,
        role: &str,
    ) -> Result<i64, sqlx::Error> {
        use argon2::{
            password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
            Argon2,
        };

        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                sqlx::Error::Configuration(format!("Password hashing failed: {}", e).into())
            })?
            .to_string();

        let result = sqlx::query(
            r#"
            INSERT INTO users (first_name, last_name, dob, email, password_hash, user_role)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind("Test")
        .bind("User")
        .bind("1990-01-01")
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Insert a rating for a user on a local calendar date
    pub async fn insert_rating(
        pool: &SqlitePool,
        user_id: i64,
        date: NaiveDate,
        score: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO ratings (user_id, rating_date, score) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(date)
            .bind(score)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Insert a settings document for a user
    pub async fn insert_settings(
        pool: &SqlitePool,
        user_id: i64,
        settings: &UserSettings,
    ) -> Result<(), sqlx::Error> {
        let data = serde_json::to_string(settings)
            .map_err(|e| sqlx::Error::Configuration(e.to_string().into()))?;

        sqlx::query("INSERT INTO settings (user_id, data) VALUES (?, ?)")
            .bind(user_id)
            .bind(data)
            .execute(pool)
            .await?;

        Ok(())
    }
}
