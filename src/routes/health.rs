use actix_web::{get, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

/// Liveness probe, mounted outside `/api` and never behind `AuthMiddleware`.
#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test::TestRequest, App};

    #[actix_rt::test]
    async fn test_health_reports_package_identity() {
        let app = actix_web::test::init_service(App::new().service(health)).await;

        let resp =
            actix_web::test::call_service(&app, TestRequest::get().uri("/health").to_request())
                .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: serde_json::Value = actix_web::test::read_body_json(resp).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "tasklist");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert!(body["timestamp"].as_str().is_some_and(|t| t.contains('T')));
    }
}
