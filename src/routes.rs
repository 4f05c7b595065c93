use crate::{
    api::{attendance, health, live, print},
    auth::middleware::auth_middleware,
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        // Only fails on a zero period or burst, both clamped above.
        .unwrap_or_default();
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Public routes
    cfg.service(health::health);

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(build_limiter(config.rate_protected_per_min)) // rate limiting
            .service(
                web::scope("/attendance")
                    // /attendance
                    .service(web::resource("").route(web::post().to(attendance::submit_attendance)))
                    // /attendance/calendar
                    .service(web::resource("/calendar").route(web::get().to(attendance::get_calendar)))
                    // /attendance/today
                    .service(web::resource("/today").route(web::get().to(attendance::get_today))),
            )
            .service(
                web::scope("/live")
                    .service(web::resource("").route(web::get().to(live::list_live)))
                    .service(web::resource("/{topic}").route(web::get().to(live::get_live)))
                    .service(web::resource("/{topic}/reconnect").route(web::post().to(live::reconnect_live))),
            )
            .service(
                web::scope("/print")
                    .service(web::resource("/payslip/{id}").route(web::get().to(print::print_payslip)))
                    .service(
                        web::resource("/cash-advance/{id}").route(web::get().to(print::print_cash_advance)),
                    ),
            ),
    );
}
