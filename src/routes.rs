use crate::{
    api::{access, attendance, profile, task},
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
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/attendance")
                    // /attendance
                    .service(web::resource("").route(web::get().to(attendance::list_attendance)))
                    // /attendance/day
                    .service(web::resource("/day").route(web::get().to(attendance::day_state)))
                    // /attendance/calendar
                    .service(
                        web::resource("/calendar").route(web::get().to(attendance::calendar)),
                    )
                    // /attendance/clock-in
                    .service(
                        web::resource("/clock-in").route(web::post().to(attendance::clock_in)),
                    )
                    // /attendance/clock-out
                    .service(
                        web::resource("/clock-out").route(web::post().to(attendance::clock_out)),
                    )
                    // /attendance/summary
                    .service(
                        web::resource("/summary").route(web::get().to(attendance::month_summary)),
                    ),
            )
            .service(
                web::scope("/tasks")
                    // /tasks
                    .service(web::resource("").route(web::post().to(task::create_task)))
                    // /tasks/received
                    .service(web::resource("/received").route(web::get().to(task::list_received)))
                    // /tasks/assigned
                    .service(web::resource("/assigned").route(web::get().to(task::list_assigned)))
                    // /tasks/assignable-users
                    .service(
                        web::resource("/assignable-users")
                            .route(web::get().to(task::assignable_users)),
                    )
                    // /tasks/{id}/complete
                    .service(
                        web::resource("/{id}/complete")
                            .route(web::post().to(task::complete_task)),
                    )
                    // /tasks/{id}/updates
                    .service(
                        web::resource("/{id}/updates")
                            .route(web::get().to(task::list_updates))
                            .route(web::post().to(task::add_update)),
                    ),
            )
            .service(
                web::scope("/admin")
                    // /admin/users
                    .service(web::resource("/users").route(web::get().to(access::list_users)))
                    // /admin/access/{owner_id}
                    .service(
                        web::resource("/access/{owner_id}")
                            .route(web::get().to(access::get_access))
                            .route(web::put().to(access::put_access)),
                    ),
            )
            .service(
                web::scope("/profile")
                    // /profile
                    .service(web::resource("").route(web::get().to(profile::get_profile)))
                    // /profile/push-token
                    .service(
                        web::resource("/push-token")
                            .route(web::put().to(profile::put_push_token)),
                    ),
            ),
    );
}

// LOGIN
//  ├─ access_token (15 min)
//  └─ refresh_token (7 days)

// API REQUEST
//  └─ Authorization: Bearer access_token

// ACCESS EXPIRED
//  └─ POST /refresh with refresh_token
//       └─ returns new access_token
