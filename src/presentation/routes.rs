use crate::presentation::auth::{login, register};
use crate::presentation::handlers::{
    ApiError, create_record, delete_record, health_check, list_records, update_record,
};
use actix_cors::Cors;
use actix_web::http::{Method, header};
use actix_web::web;

/// Registers every API route. Shared by the server binary and the tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        ApiError::Validation(format!("Invalid request body: {err}")).into()
    }))
    .route("/health", web::get().to(health_check))
    .service(
        web::scope("/auth")
            .route("/login", web::post().to(login))
            .route("/register", web::post().to(register)),
    )
    .service(
        web::scope("/financial-records")
            .route("", web::post().to(create_record))
            .route("/getAllByUserID/{user_id}", web::get().to(list_records))
            .route("/{id}", web::put().to(update_record))
            .route("/{id}", web::delete().to(delete_record)),
    );
}

/// CORS policy admitting the browser front end.
pub fn cors(allowed_origin: &str) -> Cors {
    Cors::default()
        .allowed_origin(allowed_origin)
        .allowed_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allowed_header(header::CONTENT_TYPE)
        .max_age(3600)
}
