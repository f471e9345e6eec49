//! End-to-end tests against a running catalog server.
//!
//! All tests here are ignored by default; they need a migrated and
//! seeded database behind a running server. See the crate docs for the
//! setup commands.

use carniceria_integration_tests::TestContext;
use serde_json::Value;

// =============================================================================
// Public browse
// =============================================================================

#[tokio::test]
#[ignore = "Requires running server with seeded data"]
async fn test_health_endpoints() {
    let ctx = TestContext::new();

    let live = ctx
        .client
        .get(format!("{}/health", ctx.base_url))
        .send()
        .await
        .expect("health request");
    assert_eq!(live.status(), 200);

    let ready = ctx
        .client
        .get(format!("{}/health/ready", ctx.base_url))
        .send()
        .await
        .expect("readiness request");
    assert_eq!(ready.status(), 200);
}

#[tokio::test]
#[ignore = "Requires running server with seeded data"]
async fn test_categories_grouped_by_principal() {
    let ctx = TestContext::new();

    let body: Value = ctx
        .client
        .get(ctx.api("/categories"))
        .send()
        .await
        .expect("categories request")
        .json()
        .await
        .expect("categories JSON");

    let groups = body.as_object().expect("grouped mapping");
    let carnes = groups["Carnes"].as_array().expect("Carnes group");
    assert!(!carnes.is_empty());

    // Ordered by position within the group
    let positions: Vec<i64> = carnes
        .iter()
        .map(|c| c["order"].as_i64().expect("order"))
        .collect();
    let mut sorted = positions.clone();
    sorted.sort_unstable();
    assert_eq!(positions, sorted);
}

#[tokio::test]
#[ignore = "Requires running server with seeded data"]
async fn test_list_respects_category_and_limit() {
    let ctx = TestContext::new();

    let body: Value = ctx
        .client
        .get(ctx.api("/products?category=carne-de-res&limit=1"))
        .send()
        .await
        .expect("list request")
        .json()
        .await
        .expect("list JSON");

    let products = body.as_array().expect("product list");
    assert!(products.len() <= 1);
    for product in products {
        assert_eq!(product["categorySlug"], "carne-de-res");
        assert_eq!(product["isAvailable"], true);
    }
}

#[tokio::test]
#[ignore = "Requires running server with seeded data"]
async fn test_unavailable_product_hidden_from_browse_but_not_detail() {
    let ctx = TestContext::new();

    // Seeded as isAvailable: false
    let slug = "queso-oaxaca";

    let listed: Value = ctx
        .client
        .get(ctx.api("/products?q=queso"))
        .send()
        .await
        .expect("list request")
        .json()
        .await
        .expect("list JSON");
    assert!(
        listed
            .as_array()
            .expect("list")
            .iter()
            .all(|p| p["slug"] != slug),
        "unavailable product must not appear in listings"
    );

    let searched: Value = ctx
        .client
        .get(ctx.api("/products/search?q=quesillo"))
        .send()
        .await
        .expect("search request")
        .json()
        .await
        .expect("search JSON");
    assert!(
        searched
            .as_array()
            .expect("search")
            .iter()
            .all(|p| p["slug"] != slug),
        "search filters availability like the other browse endpoints"
    );

    let detail = ctx
        .client
        .get(ctx.api(&format!("/products/{slug}")))
        .send()
        .await
        .expect("detail request");
    assert_eq!(detail.status(), 200, "direct links keep working");
}

#[tokio::test]
#[ignore = "Requires running server with seeded data"]
async fn test_empty_category_is_not_found() {
    let ctx = TestContext::new();

    let response = ctx
        .client
        .get(ctx.api("/products/category/no-such-category"))
        .send()
        .await
        .expect("category request");

    assert_eq!(response.status(), 404);
}

// =============================================================================
// Auth
// =============================================================================

#[tokio::test]
#[ignore = "Requires running server with seeded data"]
async fn test_login_returns_admin_profile() {
    let ctx = TestContext::new();
    let token = ctx.login_as_admin().await;

    let profile: Value = ctx
        .client
        .get(ctx.api("/users/profile"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("profile request")
        .json()
        .await
        .expect("profile JSON");

    assert_eq!(profile["role"], "admin");
    assert_eq!(profile["email"], "admin@example.com");
    assert!(profile.get("password").is_none());
    assert!(profile.get("passwordHash").is_none());
}

#[tokio::test]
#[ignore = "Requires running server with seeded data"]
async fn test_protected_routes_reject_missing_and_bad_tokens() {
    let ctx = TestContext::new();

    let missing = ctx
        .client
        .get(ctx.api("/users/profile"))
        .send()
        .await
        .expect("request");
    assert_eq!(missing.status(), 401);

    let garbage = ctx
        .client
        .get(ctx.api("/users/profile"))
        .bearer_auth("not.a.token")
        .send()
        .await
        .expect("request");
    assert_eq!(garbage.status(), 401);
}

#[tokio::test]
#[ignore = "Requires running server with seeded data"]
async fn test_admin_delete_of_missing_product_is_not_found_not_forbidden() {
    let ctx = TestContext::new();
    let token = ctx.login_as_admin().await;

    let response = ctx
        .client
        .delete(ctx.api("/products/this-slug-does-not-exist"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("delete request");

    // Role check passes; the slug simply does not resolve
    assert_eq!(response.status(), 404);
}

// =============================================================================
// Catalog writes
// =============================================================================

#[tokio::test]
#[ignore = "Requires running server with seeded data"]
async fn test_create_product_with_missing_category_fails_validation() {
    let ctx = TestContext::new();
    let token = ctx.login_as_admin().await;

    let form = reqwest::multipart::Form::new()
        .text("name", "Producto Fantasma")
        .text("description", "No deberia persistirse")
        .text("categorySlug", "categoria-inexistente")
        .text("price", "10.00");

    let response = ctx
        .client
        .post(ctx.api("/products"))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .expect("create request");

    assert_eq!(response.status(), 422);

    // And nothing was persisted
    let detail = ctx
        .client
        .get(ctx.api("/products/producto-fantasma"))
        .send()
        .await
        .expect("detail request");
    assert_eq!(detail.status(), 404);
}

#[tokio::test]
#[ignore = "Requires running server with seeded data"]
async fn test_duplicate_slug_rejected_and_original_unmodified() {
    let ctx = TestContext::new();
    let token = ctx.login_as_admin().await;

    let before: Value = ctx
        .client
        .get(ctx.api("/products/rib-eye"))
        .send()
        .await
        .expect("detail request")
        .json()
        .await
        .expect("detail JSON");

    // Same name, so the derived slug collides with the seeded product
    let form = reqwest::multipart::Form::new()
        .text("name", "Rib Eye")
        .text("description", "Duplicado")
        .text("categorySlug", "carne-de-res")
        .text("price", "1.00");

    let response = ctx
        .client
        .post(ctx.api("/products"))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .expect("create request");
    assert_eq!(response.status(), 422);

    let after: Value = ctx
        .client
        .get(ctx.api("/products/rib-eye"))
        .send()
        .await
        .expect("detail request")
        .json()
        .await
        .expect("detail JSON");
    assert_eq!(before["price"], after["price"]);
    assert_eq!(before["description"], after["description"]);
}

#[tokio::test]
#[ignore = "Requires running server with seeded data"]
async fn test_rename_to_existing_name_rejected() {
    let ctx = TestContext::new();
    let token = ctx.login_as_admin().await;

    // The slug stays put on update, so only the name index can catch
    // this collision with the seeded Rib Eye
    let form = reqwest::multipart::Form::new().text("name", "Rib Eye");

    let response = ctx
        .client
        .put(ctx.api("/products/arrachera-marinada"))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .expect("update request");
    assert_eq!(response.status(), 422);

    let after: Value = ctx
        .client
        .get(ctx.api("/products/arrachera-marinada"))
        .send()
        .await
        .expect("detail request")
        .json()
        .await
        .expect("detail JSON");
    assert_eq!(after["name"], "Arrachera Marinada");
}

#[tokio::test]
#[ignore = "Requires running server with seeded data"]
async fn test_multipart_coercion_reports_each_bad_field() {
    let ctx = TestContext::new();
    let token = ctx.login_as_admin().await;

    let form = reqwest::multipart::Form::new()
        .text("name", "Campo Malo")
        .text("description", "Campos invalidos")
        .text("categorySlug", "carne-de-res")
        .text("price", "gratis")
        .text("stock", "-5")
        .text("isAvailable", "quizas");

    let response = ctx
        .client
        .post(ctx.api("/products"))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .expect("create request");
    assert_eq!(response.status(), 422);

    let body: Value = response.json().await.expect("error JSON");
    let errors = body["errors"].as_array().expect("field errors");
    let fields: Vec<&str> = errors
        .iter()
        .map(|e| e["field"].as_str().expect("field name"))
        .collect();
    assert!(fields.contains(&"price"));
    assert!(fields.contains(&"stock"));
    assert!(fields.contains(&"isAvailable"));
}
