use actix_web::{HttpRequest, HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error, info, instrument};

use crate::{
    auth::{
        auth::AuthUser,
        jwt::{TokenType, generate_access_token, generate_refresh_token, verify_token},
        password::{hash_password, verify_password},
    },
    config::Config,
    model::{
        role::{Role, UserStatus},
        rt::Rt,
        user::User,
    },
    utils::email_guard,
};

#[derive(Deserialize)]
pub struct RegisterReq {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub rt: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginReq {
    pub email: String,
    pub password: String,
}

/// Row the login path needs: the public profile plus the stored hash.
#[derive(sqlx::FromRow)]
struct AuthRow {
    id: u64,
    name: String,
    email: String,
    password: Option<String>,
    phone: Option<String>,
    rt: Option<Rt>,
    role: Role,
    status: UserStatus,
    photo: Option<String>,
}

#[derive(Serialize)]
struct TokenPair {
    access_token: String,
    refresh_token: String,
}

/// Resident registration. New accounts start `pending` until an admin
/// activates them.
pub async fn register(payload: web::Json<RegisterReq>, pool: web::Data<MySqlPool>) -> impl Responder {
    let name = payload.name.trim();
    let email = payload.email.trim().to_lowercase();

    if name.is_empty() || email.is_empty() || payload.password.is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "success": false,
            "message": "Nama, email, dan password wajib diisi"
        }));
    }

    let Some(rt) = Rt::parse_lenient(&payload.rt) else {
        return HttpResponse::BadRequest().json(json!({
            "success": false,
            "message": "RT tidak dikenal"
        }));
    };

    // Filter -> cache -> DB fast path; the unique key below is the backstop.
    if !email_guard::is_available(&email, pool.get_ref()).await {
        return HttpResponse::Conflict().json(json!({
            "success": false,
            "message": "Email sudah terdaftar"
        }));
    }

    let hashed = hash_password(&payload.password);

    let result = sqlx::query(
        r#"
        INSERT INTO users (name, email, password, phone, rt, role, status)
        VALUES (?, ?, ?, ?, ?, 'user', 'pending')
        "#,
    )
    .bind(name)
    .bind(&email)
    .bind(&hashed)
    .bind(&payload.phone)
    .bind(rt)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => {
            email_guard::mark_registered(&email).await;
            HttpResponse::Created().json(json!({
                "success": true,
                "message": "Registrasi berhasil. Akun Anda menunggu persetujuan admin."
            }))
        }
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return HttpResponse::Conflict().json(json!({
                        "success": false,
                        "message": "Email sudah terdaftar"
                    }));
                }
            }

            error!(error = %e, "Failed to register user");
            HttpResponse::InternalServerError().json(json!({
                "success": false,
                "message": "Gagal mendaftarkan akun"
            }))
        }
    }
}

#[instrument(name = "auth_login", skip(pool, config, payload), fields(email = %payload.email))]
pub async fn login(
    payload: web::Json<LoginReq>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    info!("Login request received");

    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "success": false,
            "message": "Email dan password wajib diisi"
        }));
    }

    let email = payload.email.trim().to_lowercase();

    let row = match sqlx::query_as::<_, AuthRow>(
        r#"
        SELECT id, name, email, password, phone, rt, role, status, photo
        FROM users
        WHERE email = ?
        "#,
    )
    .bind(&email)
    .fetch_optional(pool.get_ref())
    .await
    {
        Ok(Some(row)) => {
            debug!(user_id = row.id, "User found");
            row
        }
        Ok(None) => {
            info!("Invalid credentials: user not found");
            return HttpResponse::Unauthorized().json(json!({
                "success": false,
                "message": "Email atau password salah"
            }));
        }
        Err(e) => {
            error!(error = %e, "Database error while fetching user");
            return HttpResponse::InternalServerError().finish();
        }
    };

    if row.status == UserStatus::Banned {
        info!(user_id = row.id, "Banned account refused");
        return HttpResponse::Forbidden().json(json!({
            "success": false,
            "message": "Akun Anda diblokir. Hubungi admin RT."
        }));
    }

    let password_ok = row
        .password
        .as_deref()
        .is_some_and(|hash| verify_password(&payload.password, hash));
    if !password_ok {
        info!("Invalid credentials: password mismatch");
        return HttpResponse::Unauthorized().json(json!({
            "success": false,
            "message": "Email atau password salah"
        }));
    }

    let access_token = generate_access_token(
        row.id,
        row.email.clone(),
        row.role,
        row.rt,
        &config.jwt_secret,
        config.access_token_ttl,
    );

    let (refresh_token, refresh_claims) = generate_refresh_token(
        row.id,
        row.email.clone(),
        row.role,
        row.rt,
        &config.jwt_secret,
        config.refresh_token_ttl,
    );

    debug!(user_id = row.id, jti = %refresh_claims.jti, "Storing refresh token");

    if let Err(e) = sqlx::query(
        r#"
        INSERT INTO refresh_tokens (user_id, jti, expires_at)
        VALUES (?, ?, FROM_UNIXTIME(?))
        "#,
    )
    .bind(row.id)
    .bind(&refresh_claims.jti)
    .bind(refresh_claims.exp as i64)
    .execute(pool.get_ref())
    .await
    {
        error!(error = %e, "Failed to store refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    // Non-fatal.
    if let Err(e) = sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = ?")
        .bind(row.id)
        .execute(pool.get_ref())
        .await
    {
        error!(error = %e, "Failed to update last_login_at");
    }

    info!("Login successful");

    HttpResponse::Ok().json(json!({
        "success": true,
        "user": {
            "id": row.id,
            "name": row.name,
            "email": row.email,
            "phone": row.phone,
            "rt": row.rt,
            "role": row.role,
            "status": row.status,
            "photo": row.photo,
        },
        "access_token": access_token,
        "refresh_token": refresh_token,
    }))
}

/// Rotate a refresh token: revoke the presented jti, issue a new pair.
pub async fn refresh_token(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    let header = match req.headers().get("Authorization") {
        Some(h) => h.to_str().unwrap_or(""),
        None => return HttpResponse::Unauthorized().body("No token"),
    };

    let token = match header.strip_prefix("Bearer ") {
        Some(t) => t,
        None => return HttpResponse::Unauthorized().body("Invalid token"),
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(_) => return HttpResponse::Unauthorized().finish(),
    };

    if claims.token_type != TokenType::Refresh {
        return HttpResponse::Unauthorized().finish();
    }

    let (record_id, user_id) = match sqlx::query_as::<_, (u64, u64, bool)>(
        "SELECT id, user_id, revoked FROM refresh_tokens WHERE jti = ?",
    )
    .bind(&claims.jti)
    .fetch_optional(pool.get_ref())
    .await
    {
        Ok(Some((id, user_id, false))) => (id, user_id),
        Ok(_) => return HttpResponse::Unauthorized().finish(),
        Err(e) => {
            error!(error = %e, "Failed to look up refresh token");
            return HttpResponse::InternalServerError().finish();
        }
    };

    if let Err(e) = sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE id = ?")
        .bind(record_id)
        .execute(pool.get_ref())
        .await
    {
        error!(error = %e, "Failed to revoke refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    let (new_refresh_token, new_claims) = generate_refresh_token(
        claims.user_id,
        claims.sub.clone(),
        claims.role,
        claims.rt,
        &config.jwt_secret,
        config.refresh_token_ttl,
    );

    if let Err(e) = sqlx::query(
        r#"
        INSERT INTO refresh_tokens (user_id, jti, expires_at)
        VALUES (?, ?, FROM_UNIXTIME(?))
        "#,
    )
    .bind(user_id)
    .bind(&new_claims.jti)
    .bind(new_claims.exp as i64)
    .execute(pool.get_ref())
    .await
    {
        error!(error = %e, "Failed to store rotated refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    let access_token = generate_access_token(
        claims.user_id,
        claims.sub,
        claims.role,
        claims.rt,
        &config.jwt_secret,
        config.access_token_ttl,
    );

    HttpResponse::Ok().json(TokenPair {
        access_token,
        refresh_token: new_refresh_token,
    })
}

/// Revokes the presented refresh token. Always 204, even for unknown or
/// already-revoked tokens.
pub async fn logout(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    let header = match req.headers().get("Authorization") {
        Some(h) => h.to_str().unwrap_or(""),
        None => return HttpResponse::NoContent().finish(),
    };

    let token = match header.strip_prefix("Bearer ") {
        Some(t) => t,
        None => return HttpResponse::NoContent().finish(),
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(_) => return HttpResponse::NoContent().finish(),
    };

    if claims.token_type != TokenType::Refresh {
        return HttpResponse::NoContent().finish();
    }

    let _ = sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE jti = ?")
        .bind(&claims.jti)
        .execute(pool.get_ref())
        .await;

    HttpResponse::NoContent().finish()
}

/// The authenticated caller's own profile.
pub async fn me(auth: AuthUser, pool: web::Data<MySqlPool>) -> impl Responder {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, email, phone, rt, role, status, photo, created_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(auth.user_id)
    .fetch_optional(pool.get_ref())
    .await;

    match user {
        Ok(Some(user)) => HttpResponse::Ok().json(json!({"success": true, "user": user})),
        Ok(None) => HttpResponse::NotFound().json(json!({
            "success": false,
            "message": "Akun tidak ditemukan"
        })),
        Err(e) => {
            error!(error = %e, "Failed to fetch profile");
            HttpResponse::InternalServerError().finish()
        }
    }
}
