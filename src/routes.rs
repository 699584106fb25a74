use crate::{
    api::{attendance, chatbot, dashboard, face, leave_request, master_data, user},
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
                    .service(
                        web::resource("/check-in").route(web::post().to(attendance::check_in)),
                    )
                    .service(
                        web::resource("/check-out").route(web::put().to(attendance::check_out)),
                    )
                    .service(web::resource("/today").route(web::get().to(attendance::today_status)))
                    .service(web::resource("/report").route(web::get().to(attendance::report)))
                    .service(
                        web::resource("/report/csv").route(web::get().to(attendance::report_csv)),
                    )
                    .service(web::resource("/calendar").route(web::get().to(attendance::calendar)))
                    // admin: every user reconstructed, optional CSV export
                    .service(
                        web::resource("/users").route(web::get().to(attendance::users_overview)),
                    ),
            )
            .service(
                web::scope("/leave")
                    .service(
                        web::resource("")
                            .route(web::post().to(leave_request::create_leave))
                            .route(web::get().to(leave_request::my_leaves)),
                    )
                    .service(web::resource("/all").route(web::get().to(leave_request::leave_list)))
                    .service(web::resource("/{id}").route(web::get().to(leave_request::get_leave)))
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(leave_request::approve_leave)),
                    )
                    .service(
                        web::resource("/{id}/reject")
                            .route(web::put().to(leave_request::reject_leave)),
                    ),
            )
            .service(
                web::scope("/face")
                    .service(
                        web::resource("")
                            .route(web::get().to(face::face_view))
                            .route(web::post().to(face::face_add)),
                    )
                    .service(
                        web::resource("/requests").route(web::get().to(face::pending_requests)),
                    )
                    .service(
                        web::resource("/requests/{id}/approve")
                            .route(web::put().to(face::approve_request)),
                    )
                    .service(
                        web::resource("/requests/{id}/reject")
                            .route(web::put().to(face::reject_request)),
                    ),
            )
            .service(
                web::scope("/master-data")
                    .service(web::resource("").route(web::get().to(master_data::list)))
                    .service(web::resource("/import").route(web::post().to(master_data::import)))
                    .service(web::resource("/export").route(web::get().to(master_data::export))),
            )
            .service(
                web::scope("/users")
                    .service(web::resource("").route(web::get().to(user::list_users)))
                    .service(
                        web::resource("/{id}/approve").route(web::put().to(user::approve_user)),
                    ),
            )
            .service(web::resource("/dashboard").route(web::get().to(dashboard::dashboard)))
            .service(web::resource("/chatbot").route(web::post().to(chatbot::ask)))
            .service(
                web::resource("/profile/password")
                    .route(web::put().to(handlers::change_password)),
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
