use actix_web::web;

use crate::handlers;

/// Public token issuance routes. Mounted under "/api/security" in main.rs;
/// no authentication middleware applies here.
pub fn configure_security_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/login", web::post().to(handlers::security_handlers::login))
        .route(
            "/renewtoken",
            web::post().to(handlers::security_handlers::renew_token),
        );
}

/// Resource routes. Mounted under "/api/employee" and wrapped with the
/// bearer auth and token renewal middleware in main.rs. Literal segments
/// are registered before the "{id}" catch-all.
pub fn configure_employee_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/loginstatus")
            .route(web::get().to(handlers::employee_handlers::login_status)),
    )
    .service(
        web::resource("/create").route(web::get().to(handlers::employee_handlers::create_template)),
    )
    .service(
        web::resource("/email/{email}")
            .route(web::get().to(handlers::employee_handlers::get_by_email)),
    )
    .service(
        web::resource("/{id}")
            .route(web::get().to(handlers::employee_handlers::get_by_id))
            .route(web::delete().to(handlers::employee_handlers::delete)),
    )
    .service(
        web::resource("")
            .route(web::get().to(handlers::employee_handlers::list))
            .route(web::post().to(handlers::employee_handlers::insert))
            .route(web::put().to(handlers::employee_handlers::update)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use chrono::Utc;
    use std::sync::Arc;
    use uuid::Uuid;

    use crate::middleware::{bearer_auth_middleware, token_renewal_middleware, RENEWED_TOKEN_HEADER};
    use crate::models::auth_jwt_claims::Claims;
    use crate::services::auth::jwt::{JwtIssuer, ValidationOptions};
    use crate::services::auth::policy::PolicyRegistry;
    use crate::store::{
        EmployeeStore, IdentityStore, InMemoryEmployeeStore, InMemoryIdentityStore,
    };

    struct TestContext {
        issuer: Arc<JwtIssuer>,
        identity: Arc<dyn IdentityStore>,
        employees: Arc<dyn EmployeeStore>,
        policies: web::Data<PolicyRegistry>,
    }

    fn test_context() -> TestContext {
        let config = crate::config::AuthConfig {
            issuer: "workforce-server".to_string(),
            audience: "workforce-clients".to_string(),
            jwt_secret: "0123456789abcdef0123456789abcdef".to_string(),
            token_valid_minutes: 30,
        };

        TestContext {
            issuer: Arc::new(JwtIssuer::from_config(&config).unwrap()),
            identity: Arc::new(InMemoryIdentityStore::seeded().unwrap()),
            employees: Arc::new(InMemoryEmployeeStore::seeded()),
            policies: web::Data::new(PolicyRegistry::demo_policies()),
        }
    }

    macro_rules! init_test_app {
        ($ctx:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::from($ctx.identity.clone()))
                    .app_data(web::Data::from($ctx.employees.clone()))
                    .app_data(web::Data::from($ctx.issuer.clone()))
                    .app_data($ctx.policies.clone())
                    .service(web::scope("/api/security").configure(configure_security_routes))
                    .service(
                        web::scope("/api/employee")
                            .wrap(token_renewal_middleware(
                                $ctx.issuer.clone(),
                                $ctx.identity.clone(),
                            ))
                            .wrap(bearer_auth_middleware($ctx.issuer.clone()))
                            .configure(configure_employee_routes),
                    ),
            )
            .await
        };
    }

    macro_rules! login {
        ($app:expr, $email:expr, $password:expr) => {{
            let req = test::TestRequest::post()
                .uri("/api/security/login")
                .set_json(serde_json::json!({ "Email": $email, "Password": $password }))
                .to_request();
            let res = test::call_service($app, req).await;
            assert_eq!(res.status(), StatusCode::OK);

            let body = test::read_body(res).await;
            String::from_utf8(body.to_vec()).unwrap()
        }};
    }

    fn bearer(token: &str) -> (&'static str, String) {
        ("authorization", format!("Bearer {}", token))
    }

    #[actix_web::test]
    async fn login_issues_a_validating_token() {
        let ctx = test_context();
        let app = init_test_app!(ctx);

        let token = login!(&app, "hrworker@xyz.com", "password");

        let claims = ctx
            .issuer
            .validate(&token, &ValidationOptions::default())
            .unwrap();
        assert_eq!(claims.sub, "hrworker");
        assert!(claims.role_names().contains(&"HR-Worker".to_string()));
    }

    #[actix_web::test]
    async fn login_failures_are_indistinguishable() {
        let ctx = test_context();
        let app = init_test_app!(ctx);

        let unknown = test::TestRequest::post()
            .uri("/api/security/login")
            .set_json(serde_json::json!({ "Email": "nobody@xyz.com", "Password": "password" }))
            .to_request();
        let unknown_res = test::call_service(&app, unknown).await;
        assert_eq!(unknown_res.status(), StatusCode::BAD_REQUEST);
        let unknown_body = test::read_body(unknown_res).await;

        let wrong = test::TestRequest::post()
            .uri("/api/security/login")
            .set_json(serde_json::json!({ "Email": "employee@xyz.com", "Password": "nope" }))
            .to_request();
        let wrong_res = test::call_service(&app, wrong).await;
        assert_eq!(wrong_res.status(), StatusCode::BAD_REQUEST);
        let wrong_body = test::read_body(wrong_res).await;

        // Same status, same body: no user enumeration through error text
        assert_eq!(unknown_body, wrong_body);
    }

    #[actix_web::test]
    async fn missing_or_tampered_tokens_are_unauthorized() {
        let ctx = test_context();
        let app = init_test_app!(ctx);

        let bare = test::TestRequest::get()
            .uri("/api/employee/loginstatus")
            .to_request();
        let res = test::call_service(&app, bare).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let token = login!(&app, "employee@xyz.com", "password");
        let tampered = format!("{}x", token);
        let req = test::TestRequest::get()
            .uri("/api/employee/loginstatus")
            .insert_header(bearer(&tampered))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn salary_is_redacted_for_non_hr_and_visible_for_hr() {
        let ctx = test_context();
        let app = init_test_app!(ctx);

        let target = "danielle.huber@xyz.com";
        let uri = format!("/api/employee/email/{}", target);

        let employee_token = login!(&app, "employee@xyz.com", "password");
        let req = test::TestRequest::get()
            .uri(&uri)
            .insert_header(bearer(&employee_token))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert!(body.get("Salary").is_none());
        assert_eq!(body["Email"], target);

        let hr_token = login!(&app, "hrworker@xyz.com", "password");
        let req = test::TestRequest::get()
            .uri(&uri)
            .insert_header(bearer(&hr_token))
            .to_request();
        let res = test::call_service(&app, req).await;
        let body: serde_json::Value = test::read_body_json(res).await;
        assert!(body.get("Salary").is_some());
    }

    #[actix_web::test]
    async fn listing_redacts_per_item_and_reports_unfiltered_count() {
        let ctx = test_context();
        let app = init_test_app!(ctx);

        let token = login!(&app, "employee@xyz.com", "password");
        let req = test::TestRequest::get()
            .uri("/api/employee?sortBy=FirstName&sortDirection=asc&take=2")
            .insert_header(bearer(&token))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["CountUnfiltered"], 4);

        let items = body["Items"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        for item in items {
            assert!(item.get("Salary").is_none());
        }
        assert_eq!(items[0]["FirstName"], "Danielle");
    }

    #[actix_web::test]
    async fn mutation_requires_the_hr_policy() {
        let ctx = test_context();
        let app = init_test_app!(ctx);

        let token = login!(&app, "employee@xyz.com", "password");
        let req = test::TestRequest::post()
            .uri("/api/employee")
            .insert_header(bearer(&token))
            .set_json(serde_json::json!({
                "Id": Uuid::new_v4(),
                "FirstName": "New",
                "LastName": "Hire",
                "Email": "new.hire@xyz.com",
            }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn delete_requires_the_manager_policy() {
        let ctx = test_context();
        let app = init_test_app!(ctx);

        // HR-Worker is not enough for delete
        let hr_token = login!(&app, "hrworker@xyz.com", "password");
        let id = Uuid::new_v4();
        let req = test::TestRequest::delete()
            .uri(&format!("/api/employee/{}", id))
            .insert_header(bearer(&hr_token))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        // The manager carries CeoApproval=true; deleting a missing row
        // reports no content
        let manager_token = login!(&app, "hrmanager@xyz.com", "password");
        let req = test::TestRequest::delete()
            .uri(&format!("/api/employee/{}", id))
            .insert_header(bearer(&manager_token))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }

    #[actix_web::test]
    async fn insert_validates_attributes_into_the_result_body() {
        let ctx = test_context();
        let app = init_test_app!(ctx);

        let token = login!(&app, "hrworker@xyz.com", "password");
        let req = test::TestRequest::post()
            .uri("/api/employee")
            .insert_header(bearer(&token))
            .set_json(serde_json::json!({
                "Id": Uuid::new_v4(),
                "FirstName": "",
                "LastName": "Hire",
                "Email": "",
            }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(res).await;
        let members: Vec<&str> = body["Errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["MemberName"].as_str().unwrap())
            .collect();
        assert_eq!(members, vec!["FirstName", "Email"]);
    }

    #[actix_web::test]
    async fn stale_update_returns_conflict_with_result_body() {
        let ctx = test_context();
        let app = init_test_app!(ctx);

        let token = login!(&app, "hrworker@xyz.com", "password");

        // Create a fresh row
        let id = Uuid::new_v4();
        let req = test::TestRequest::post()
            .uri("/api/employee")
            .insert_header(bearer(&token))
            .set_json(serde_json::json!({
                "Id": id,
                "FirstName": "Edit",
                "LastName": "Target",
                "Email": "edit.target@xyz.com",
            }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let created: serde_json::Value = test::read_body_json(res).await;
        let first_version = created["RowVersion"].as_str().unwrap().to_string();

        // First update with the fresh version wins
        let mut updated = created.clone();
        updated["FirstName"] = serde_json::json!("Edited");
        let req = test::TestRequest::put()
            .uri("/api/employee")
            .insert_header(bearer(&token))
            .set_json(&updated)
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let after: serde_json::Value = test::read_body_json(res).await;
        assert_ne!(after["RowVersion"].as_str().unwrap(), first_version);

        // Second update still presenting the original version conflicts
        let mut stale = created;
        stale["FirstName"] = serde_json::json!("Too Late");
        let req = test::TestRequest::put()
            .uri("/api/employee")
            .insert_header(bearer(&token))
            .set_json(&stale)
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CONFLICT);

        let body: serde_json::Value = test::read_body_json(res).await;
        assert!(!body["Exceptions"].as_array().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn aging_token_is_renewed_through_the_response_header() {
        let ctx = test_context();
        let app = init_test_app!(ctx);

        // A token past half of its window: issued 20 minutes ago, 10 left
        let now = Utc::now().timestamp();
        let old_jti = Uuid::new_v4().to_string();
        let claims = Claims {
            iss: "workforce-server".to_string(),
            aud: "workforce-clients".to_string(),
            sub: "employee".to_string(),
            email: "employee@xyz.com".to_string(),
            jti: old_jti.clone(),
            iat: now - 1200,
            nbf: now - 1200,
            exp: now + 600,
            claims: vec![],
        };
        let token = ctx.issuer.sign_claims_for_tests(&claims);

        let req = test::TestRequest::get()
            .uri("/api/employee/loginstatus")
            .insert_header(bearer(&token))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);

        let renewed = res
            .headers()
            .get(RENEWED_TOKEN_HEADER)
            .expect("renewal header missing")
            .to_str()
            .unwrap()
            .to_string();

        let renewed_claims = ctx
            .issuer
            .validate(&renewed, &ValidationOptions::default())
            .unwrap();
        assert_ne!(renewed_claims.jti, old_jti);
        assert!(renewed_claims.exp > claims.exp);
    }

    #[actix_web::test]
    async fn fresh_token_is_not_renewed() {
        let ctx = test_context();
        let app = init_test_app!(ctx);

        let token = login!(&app, "employee@xyz.com", "password");
        let req = test::TestRequest::get()
            .uri("/api/employee/loginstatus")
            .insert_header(bearer(&token))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().get(RENEWED_TOKEN_HEADER).is_none());
    }

    #[actix_web::test]
    async fn renewtoken_endpoint_rotates_a_valid_token() {
        let ctx = test_context();
        let app = init_test_app!(ctx);

        let token = login!(&app, "employee@xyz.com", "password");
        let original = ctx
            .issuer
            .validate(&token, &ValidationOptions::default())
            .unwrap();

        let req = test::TestRequest::post()
            .uri("/api/security/renewtoken")
            .set_payload(token)
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);

        let renewed = String::from_utf8(test::read_body(res).await.to_vec()).unwrap();
        let renewed_claims = ctx
            .issuer
            .validate(&renewed, &ValidationOptions::default())
            .unwrap();
        assert_ne!(renewed_claims.jti, original.jti);
    }

    #[actix_web::test]
    async fn renewtoken_endpoint_refuses_an_expired_token() {
        let ctx = test_context();
        let app = init_test_app!(ctx);

        let now = Utc::now().timestamp();
        let claims = Claims {
            iss: "workforce-server".to_string(),
            aud: "workforce-clients".to_string(),
            sub: "employee".to_string(),
            email: "employee@xyz.com".to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now - 3600,
            nbf: now - 3600,
            exp: now - 1800,
            claims: vec![],
        };
        let token = ctx.issuer.sign_claims_for_tests(&claims);

        let req = test::TestRequest::post()
            .uri("/api/security/renewtoken")
            .set_payload(token)
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
