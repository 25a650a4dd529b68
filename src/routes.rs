use crate::{
    api::{attendance, health},
    auth::middleware::auth_middleware,
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

// Helper to build per-scope limiter
fn build_limiter(requests_per_min: u32) -> Option<Governor<PeerIpKeyExtractor, NoOpMiddleware>> {
    let per_ms = if requests_per_min == 0 {
        1
    } else {
        60_000 / requests_per_min as u64
    };
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms.max(1))
        .burst_size(requests_per_min.max(1))
        .key_extractor(PeerIpKeyExtractor)
        .finish()?;
    Some(Governor::new(&cfg))
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    // Public routes
    cfg.service(health::health);

    let attendance_scope = web::scope("/attendance")
        .service(web::resource("/punch-in").route(web::post().to(attendance::punch_in)))
        .service(web::resource("/punch-out").route(web::post().to(attendance::punch_out)))
        .service(web::resource("/active").route(web::get().to(attendance::active_session)))
        .service(web::resource("/logs").route(web::get().to(attendance::logs)));

    // Protected routes
    match build_limiter(config.rate_protected_per_min) {
        Some(limiter) => cfg.service(
            web::scope(&config.api_prefix)
                .wrap(from_fn(auth_middleware)) // authentication
                .wrap(limiter) // rate limiting
                .service(attendance_scope),
        ),
        None => {
            tracing::warn!("Rate limiter configuration rejected; serving without rate limiting");
            cfg.service(
                web::scope(&config.api_prefix)
                    .wrap(from_fn(auth_middleware))
                    .service(attendance_scope),
            )
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::{AttendancePolicy, AttendanceService};
    use crate::auth::jwt::generate_access_token;
    use crate::model::attendance::{BranchGeofence, GeoPoint};
    use crate::store::memory::InMemoryAttendanceStore;
    use crate::utils::clock::ManualClock;
    use actix_web::{App, http::StatusCode, test, web::Data};
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::{Value, json};
    use std::sync::Arc;

    const SECRET: &str = "test-secret";

    fn bearer(role: u8, tenant: &str, employee_id: Option<u64>) -> (&'static str, String) {
        let token = generate_access_token(1, role, tenant, employee_id, SECRET);
        ("Authorization", format!("Bearer {token}"))
    }

    fn setup() -> (Arc<ManualClock>, AttendanceService, Config) {
        let store = InMemoryAttendanceStore::new()
            .with_employee("acme", 1000, "Jane", "Doe")
            .with_branch(
                "acme",
                1000,
                BranchGeofence {
                    center: GeoPoint {
                        lat: 23.8103,
                        lng: 90.4125,
                    },
                    radius_meters: Some(200.0),
                },
            );
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap(),
        ));
        let service = AttendanceService::new(
            Arc::new(store),
            clock.clone(),
            AttendancePolicy::default(),
        );
        (clock, service, Config::for_tests(SECRET))
    }

    macro_rules! app {
        ($service:expr, $config:expr) => {{
            let config = $config.clone();
            test::init_service(
                App::new()
                    .app_data(Data::new($service.clone()))
                    .app_data(Data::new($config.clone()))
                    .configure(move |cfg| configure(cfg, &config)),
            )
            .await
        }};
    }

    fn peer() -> std::net::SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    #[actix_web::test]
    async fn health_is_public() {
        let (_, service, config) = setup();
        let app = app!(service, config);

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn punch_requires_token() {
        let (_, service, config) = setup();
        let app = app!(service, config);

        let req = test::TestRequest::post()
            .uri("/api/attendance/punch-in")
            .peer_addr(peer())
            .set_json(json!({"location_type": "WFH"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn punch_in_then_out_over_http() {
        let (clock, service, config) = setup();
        let app = app!(service, config);

        let req = test::TestRequest::post()
            .uri("/api/attendance/punch-in")
            .peer_addr(peer())
            .insert_header(bearer(3, "acme", Some(1000)))
            .set_json(json!({"location_type": "OFFICE", "lat": 23.8103, "lng": 90.4125}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Punch-in successful");
        assert_eq!(body["data"]["status"], "PRESENT");
        assert_eq!(body["data"]["is_within_geofence"], true);

        let req = test::TestRequest::post()
            .uri("/api/attendance/punch-in")
            .peer_addr(peer())
            .insert_header(bearer(3, "acme", Some(1000)))
            .set_json(json!({"location_type": "OFFICE"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        clock.advance(Duration::hours(5));
        let req = test::TestRequest::post()
            .uri("/api/attendance/punch-out")
            .peer_addr(peer())
            .insert_header(bearer(3, "acme", Some(1000)))
            .set_json(json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["status"], "HALF_DAY");
        assert_eq!(body["data"]["working_hours"], 5.0);
    }

    #[actix_web::test]
    async fn early_punch_out_is_bad_request() {
        let (clock, service, config) = setup();
        let app = app!(service, config);

        let req = test::TestRequest::post()
            .uri("/api/attendance/punch-in")
            .peer_addr(peer())
            .insert_header(bearer(3, "acme", Some(1000)))
            .set_json(json!({"location_type": "WFH"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        clock.advance(Duration::minutes(5));
        let req = test::TestRequest::post()
            .uri("/api/attendance/punch-out")
            .peer_addr(peer())
            .insert_header(bearer(3, "acme", Some(1000)))
            .set_json(json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
    }

    #[actix_web::test]
    async fn punch_out_without_session_is_not_found() {
        let (_, service, config) = setup();
        let app = app!(service, config);

        let req = test::TestRequest::post()
            .uri("/api/attendance/punch-out")
            .peer_addr(peer())
            .insert_header(bearer(3, "acme", Some(1000)))
            .set_json(json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn lone_latitude_is_rejected() {
        let (_, service, config) = setup();
        let app = app!(service, config);

        let req = test::TestRequest::post()
            .uri("/api/attendance/punch-in")
            .peer_addr(peer())
            .insert_header(bearer(3, "acme", Some(1000)))
            .set_json(json!({"location_type": "OFFICE", "lat": 23.8}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn mismatched_tenant_header_is_forbidden() {
        let (_, service, config) = setup();
        let app = app!(service, config);

        let req = test::TestRequest::get()
            .uri("/api/attendance/active")
            .peer_addr(peer())
            .insert_header(bearer(3, "acme", Some(1000)))
            .insert_header(("x-tenant-id", "globex"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn employee_cannot_punch_for_someone_else() {
        let (_, service, config) = setup();
        let app = app!(service, config);

        let req = test::TestRequest::post()
            .uri("/api/attendance/punch-in")
            .peer_addr(peer())
            .insert_header(bearer(3, "acme", Some(1000)))
            .set_json(json!({"employee_id": 2000, "location_type": "WFH"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn logs_are_for_supervisors_only() {
        let (_, service, config) = setup();
        let app = app!(service, config);

        let req = test::TestRequest::post()
            .uri("/api/attendance/punch-in")
            .peer_addr(peer())
            .insert_header(bearer(3, "acme", Some(1000)))
            .set_json(json!({"location_type": "WFH"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        let req = test::TestRequest::get()
            .uri("/api/attendance/logs")
            .peer_addr(peer())
            .insert_header(bearer(3, "acme", Some(1000)))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::get()
            .uri("/api/attendance/logs?limit=10")
            .peer_addr(peer())
            .insert_header(bearer(4, "acme", None))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["count"], 1);
        assert_eq!(body["data"][0]["employee_id"], 1000);
        assert_eq!(body["data"][0]["first_name"], "Jane");
        assert_eq!(body["data"][0]["last_name"], "Doe");
    }

    #[actix_web::test]
    async fn active_session_reflects_punch_state() {
        let (_, service, config) = setup();
        let app = app!(service, config);

        let req = test::TestRequest::get()
            .uri("/api/attendance/active")
            .peer_addr(peer())
            .insert_header(bearer(3, "acme", Some(1000)))
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert!(body["data"].is_null());

        let req = test::TestRequest::post()
            .uri("/api/attendance/punch-in")
            .peer_addr(peer())
            .insert_header(bearer(3, "acme", Some(1000)))
            .set_json(json!({"location_type": "WFH"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        let req = test::TestRequest::get()
            .uri("/api/attendance/active")
            .peer_addr(peer())
            .insert_header(bearer(3, "acme", Some(1000)))
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["data"]["location_type"], "WFH");
    }
}
