use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::net::TcpListener;
use std::sync::Arc;

use workforce_server::config::AppSettings;
use workforce_server::handlers;
use workforce_server::middleware::{bearer_auth_middleware, token_renewal_middleware};
use workforce_server::routes::{configure_employee_routes, configure_security_routes};
use workforce_server::services::auth::jwt::JwtIssuer;
use workforce_server::services::auth::policy::PolicyRegistry;
use workforce_server::store::{
    EmployeeStore, IdentityStore, InMemoryEmployeeStore, InMemoryIdentityStore,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Load application settings
    let app_settings = match AppSettings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("Failed to load application settings: {}", e);
            log::error!("Cannot start server without valid settings");
            std::process::exit(1);
        }
    };

    // Initialize the token issuer; a missing or weak secret is fatal
    let issuer = match JwtIssuer::from_config(&app_settings.auth) {
        Ok(issuer) => Arc::new(issuer),
        Err(e) => {
            log::error!("Failed to initialize token issuer: {}", e);
            log::error!("Cannot start server without working signing keys");
            std::process::exit(1);
        }
    };
    log::info!(
        "Token issuer initialized (issuer: {}, validity: {} minutes)",
        issuer.issuer_name(),
        app_settings.auth.token_valid_minutes
    );

    // Demo stores: identities with roles/claims, and the employee rows
    let identity_store: Arc<dyn IdentityStore> = match InMemoryIdentityStore::seeded() {
        Ok(store) => Arc::new(store),
        Err(e) => {
            log::error!("Failed to seed identity store: {}", e);
            std::process::exit(1);
        }
    };
    let employee_store: Arc<dyn EmployeeStore> = Arc::new(InMemoryEmployeeStore::seeded());
    log::info!("Demo stores seeded");

    // Named authorization policies, registered once for the whole app
    let policies = web::Data::new(PolicyRegistry::demo_policies());

    // Get server host and port from settings
    let host = &app_settings.server.host;
    let port = app_settings.server.port;

    log::info!("Starting server at http://{}:{}", host, port);

    let server_addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(server_addr)?;

    HttpServer::new(move || {
        let app_settings = app_settings.clone();
        let issuer = issuer.clone();
        let identity_store = identity_store.clone();
        let employee_store = employee_store.clone();

        // Configure CORS using actix-cors
        let mut cors = Cors::default().supports_credentials();

        if app_settings.server.cors_origins.contains(&"*".to_string()) {
            cors = cors.allow_any_origin();
        } else {
            for origin in &app_settings.server.cors_origins {
                cors = cors.allowed_origin(origin);
            }
        }

        cors = cors.allow_any_method().allow_any_header();

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(web::Data::new(app_settings.clone()))
            .app_data(web::Data::from(identity_store.clone()))
            .app_data(web::Data::from(employee_store.clone()))
            .app_data(web::Data::from(issuer.clone()))
            .app_data(policies.clone())
            // Public health endpoint without auth
            .service(web::resource("/health").route(web::get().to(handlers::health::health_check)))
            // Public token issuance routes
            .service(web::scope("/api/security").configure(configure_security_routes))
            // Protected resource routes: bearer auth runs first, then the
            // sliding renewal monitor
            .service(
                web::scope("/api/employee")
                    .wrap(token_renewal_middleware(
                        issuer.clone(),
                        identity_store.clone(),
                    ))
                    .wrap(bearer_auth_middleware(issuer.clone()))
                    .configure(configure_employee_routes),
            )
    })
    .listen(listener)?
    .run()
    .await
}
