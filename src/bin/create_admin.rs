//! One-shot seed tool: creates the default admin account if none exists.
//!
//!     ADMIN_PASSWORD=... cargo run --bin create_admin

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use dotenvy::dotenv;
use sqlx::mysql::MySqlPoolOptions;
use std::env;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let name = env::var("ADMIN_NAME").unwrap_or_else(|_| "Admin JagaKampung".to_string());
    let email = env::var("ADMIN_EMAIL")
        .unwrap_or_else(|_| "admin@jagakampung.local".to_string())
        .trim()
        .to_lowercase();
    let password = env::var("ADMIN_PASSWORD").expect("ADMIN_PASSWORD must be set");

    let pool = MySqlPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await?;

    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM users WHERE email = ? LIMIT 1)",
    )
    .bind(&email)
    .fetch_one(&pool)
    .await?;

    if exists {
        println!("Admin account {email} already exists, nothing to do");
        return Ok(());
    }

    let salt = SaltString::generate(&mut OsRng);
    let hashed = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("failed to hash password: {e}"))?
        .to_string();

    sqlx::query(
        r#"
        INSERT INTO users (name, email, password, role, status)
        VALUES (?, ?, ?, 'admin', 'active')
        "#,
    )
    .bind(&name)
    .bind(&email)
    .bind(&hashed)
    .execute(&pool)
    .await?;

    println!("Created admin account {email}");

    Ok(())
}
