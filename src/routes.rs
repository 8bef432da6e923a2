use crate::{
    api::{attendance, change_request, client, deduction, employee, invoice, salary},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

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

    let login_limiter = build_limiter(config.rate_login_per_min);
    let register_limiter = build_limiter(config.rate_register_per_min);
    let refresh_limiter = build_limiter(config.rate_refresh_per_min);
    let protected_limiter = build_limiter(config.rate_protected_per_min);

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter)
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(register_limiter)
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter)
                    .route(web::post().to(handlers::refresh_token)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/clients")
                    .service(
                        web::resource("")
                            .route(web::post().to(client::create_client))
                            .route(web::get().to(client::list_clients)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(client::get_client))
                            .route(web::put().to(client::update_client))
                            .route(web::delete().to(client::delete_client)),
                    )
                    .service(
                        web::resource("/{id}/categories")
                            .route(web::post().to(client::add_category)),
                    ),
            )
            .service(
                web::scope("/employees")
                    .service(
                        web::resource("")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(employee::get_employee))
                            .route(web::put().to(employee::update_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    ),
            )
            .service(
                web::scope("/attendance")
                    .service(
                        web::resource("")
                            .route(web::post().to(attendance::create_attendance))
                            .route(web::get().to(attendance::list_attendance)),
                    )
                    .service(
                        web::resource("/bulk")
                            .route(web::post().to(attendance::create_attendance_bulk)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(attendance::update_attendance))
                            .route(web::delete().to(attendance::delete_attendance)),
                    )
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(attendance::approve_attendance)),
                    )
                    .service(
                        web::resource("/{id}/reject")
                            .route(web::put().to(attendance::reject_attendance)),
                    ),
            )
            .service(
                web::scope("/deductions")
                    .service(
                        web::resource("")
                            .route(web::post().to(deduction::create_deduction))
                            .route(web::get().to(deduction::list_deductions)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::delete().to(deduction::delete_deduction)),
                    ),
            )
            .service(
                web::scope("/requests")
                    .service(
                        web::resource("")
                            .route(web::post().to(change_request::submit_request))
                            .route(web::get().to(change_request::list_requests)),
                    )
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(change_request::approve_request)),
                    )
                    .service(
                        web::resource("/{id}/reject")
                            .route(web::put().to(change_request::reject_request)),
                    ),
            )
            .service(
                web::scope("/salaries")
                    .service(web::resource("").route(web::get().to(salary::list_salaries)))
                    .service(
                        web::resource("/generate")
                            .route(web::post().to(salary::generate_salaries)),
                    )
                    .service(
                        web::resource("/{id}").route(web::delete().to(salary::delete_salary)),
                    ),
            )
            .service(
                web::scope("/invoices")
                    .service(web::resource("").route(web::get().to(invoice::list_invoices)))
                    .service(
                        web::resource("/generate")
                            .route(web::post().to(invoice::generate_invoice)),
                    )
                    .service(
                        web::resource("/{id}").route(web::delete().to(invoice::delete_invoice)),
                    ),
            ),
    );
}
