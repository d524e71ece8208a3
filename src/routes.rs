use crate::{
    api::{attendance, location, notification, schedule, user},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let register_limiter = Arc::new(build_limiter(config.rate_register_per_min));
    let refresh_limiter = Arc::new(build_limiter(config.rate_refresh_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(register_limiter.clone())
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter.clone())
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            .wrap(protected_limiter) // rate limiting
            .service(web::resource("/me").route(web::get().to(handlers::me)))
            .service(
                web::scope("/schedules")
                    // fixed segments before the {id} catch-all
                    .service(
                        web::resource("/month/{rt}/{year}/{month}")
                            .route(web::get().to(schedule::get_month)),
                    )
                    .service(
                        web::resource("/today-partner")
                            .route(web::get().to(schedule::today_partner)),
                    )
                    .service(
                        web::resource("")
                            .route(web::get().to(schedule::list_schedules))
                            .route(web::post().to(schedule::create_schedule)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(schedule::get_schedule))
                            .route(web::delete().to(schedule::delete_schedule)),
                    )
                    .service(
                        web::resource("/{id}/entries")
                            .route(web::post().to(schedule::add_entry)),
                    )
                    .service(
                        web::resource("/{id}/entries/{entry_id}")
                            .route(web::put().to(schedule::update_entry))
                            .route(web::delete().to(schedule::remove_entry)),
                    ),
            )
            .service(
                web::scope("/attendances")
                    .service(
                        web::resource("/my-history")
                            .route(web::get().to(attendance::my_history)),
                    )
                    .service(
                        web::resource("/my-calendar/{year}/{month}")
                            .route(web::get().to(attendance::my_calendar)),
                    )
                    .service(
                        web::resource("/check-today/{schedule_id}")
                            .route(web::get().to(attendance::check_today)),
                    )
                    .service(
                        web::resource("/rt/{rt}").route(web::get().to(attendance::list_by_rt)),
                    )
                    .service(
                        web::resource("")
                            .route(web::post().to(attendance::create_attendance))
                            .route(web::get().to(attendance::list_attendances)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::delete().to(attendance::delete_attendance)),
                    )
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(attendance::approve_attendance)),
                    ),
            )
            .service(
                web::scope("/notifications")
                    .service(
                        web::resource("/unread-count")
                            .route(web::get().to(notification::unread_count)),
                    )
                    .service(
                        web::resource("/mark-all-read")
                            .route(web::put().to(notification::mark_all_read)),
                    )
                    .service(
                        web::resource("")
                            .route(web::get().to(notification::list_notifications))
                            .route(web::delete().to(notification::delete_all_notifications)),
                    )
                    .service(
                        web::resource("/{id}/read").route(web::put().to(notification::mark_read)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::delete().to(notification::delete_notification)),
                    ),
            )
            .service(
                web::scope("/users")
                    .service(web::resource("").route(web::get().to(user::list_users)))
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(user::get_user))
                            .route(web::put().to(user::update_user))
                            .route(web::delete().to(user::delete_user)),
                    )
                    .service(web::resource("/{id}/ban").route(web::put().to(user::ban_user))),
            )
            .service(
                web::scope("/location").service(
                    web::resource("/reverse-geocode")
                        .route(web::get().to(location::reverse_geocode)),
                ),
            ),
    );
}

// LOGIN
//  ├─ access_token (15 min)
//  └─ refresh_token (7 days)
//
// API REQUEST
//  └─ Authorization: Bearer access_token
//
// ACCESS EXPIRED
//  └─ POST /refresh with refresh_token
//       └─ returns new access_token
