//! One-shot maintenance tool: drops schedule containers older than the
//! retention window. Entries cascade; attendance history stays.
//!
//!     KEEP_MONTHS=3 cargo run --bin clean_old_schedules

use chrono::{Datelike, FixedOffset, Utc};
use dotenvy::dotenv;
use sqlx::mysql::MySqlPoolOptions;
use std::env;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let keep_months: i32 = env::var("KEEP_MONTHS")
        .unwrap_or_else(|_| "3".to_string())
        .parse()
        .expect("KEEP_MONTHS must be a number");

    // The product runs on WIB; "this month" resolves there.
    let wib = FixedOffset::east_opt(7 * 3600).expect("UTC+7 is a valid offset");
    let today = Utc::now().with_timezone(&wib).date_naive();

    // Keep this month plus keep_months - 1 before it. Months index as
    // year * 12 + (month - 1) so the comparison survives year rollover.
    let current_index = today.year() * 12 + today.month() as i32 - 1;
    let cutoff_index = current_index - (keep_months - 1);

    let pool = MySqlPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await?;

    let result = sqlx::query("DELETE FROM schedules WHERE (year * 12 + month - 1) < ?")
        .bind(cutoff_index)
        .execute(&pool)
        .await?;

    println!(
        "Deleted {} schedule(s) older than {} month(s)",
        result.rows_affected(),
        keep_months
    );

    Ok(())
}
