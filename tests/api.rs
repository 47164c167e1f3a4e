mod common;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use marketplace_api::routes::create_app;
use serde_json::{Value, json};
use tower::ServiceExt;

const BOUNDARY: &str = "marketplace-test-boundary";

async fn app() -> anyhow::Result<Router> {
    let test = common::setup().await?;
    Ok(create_app(test.state, &std::env::temp_dir(), 1024 * 1024))
}

async fn send(app: &Router, request: Request<Body>) -> anyhow::Result<(StatusCode, Value)> {
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = response.into_body().collect().await?.to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, body))
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, token);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, token);
    }
    builder.body(Body::empty()).unwrap()
}

/// Registers then logs in, returning the `Bearer ...` header value.
async fn sign_up(app: &Router, email: &str, role: &str) -> anyhow::Result<String> {
    let (status, _) = send(
        app,
        json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({
                "email": email,
                "password": "secret123",
                "username": email.split('@').next().unwrap(),
                "role": role,
                "address": "12 Sukhumvit Rd",
                "phone": "0812345678"
            }),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": email, "password": "secret123" }),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], role);
    Ok(body["data"]["token"].as_str().unwrap().to_string())
}

fn checkout_body(product_id: &str) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"product_id\"\r\n\r\n{product_id}\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"slip\"; filename=\"slip.jpg\"\r\nContent-Type: image/jpeg\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"\xff\xd8\xff\xe0fake-jpeg");
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn image_body(name: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"photo.png\"\r\nContent-Type: image/png\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn multipart_put(uri: &str, token: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header(header::AUTHORIZATION, token)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn health_reports_database() -> anyhow::Result<()> {
    let app = app().await?;
    let (status, body) = send(&app, get("/health", None)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Health check");
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["database"], "ok");
    Ok(())
}

#[tokio::test]
async fn unknown_route_and_missing_token() -> anyhow::Result<()> {
    let app = app().await?;
    let (status, body) = send(&app, get("/nope", None)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["data"]["path"], "/nope");

    let (status, _) = send(&app, get("/api/notifications", None)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn checkout_over_http_notifies_the_seller() -> anyhow::Result<()> {
    let app = app().await?;
    let seller = sign_up(&app, "shop@example.com", "Seller").await?;
    let buyer = sign_up(&app, "buyer@example.com", "Buyer").await?;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/products",
            Some(&seller),
            json!({ "name": "Vintage Lamp", "price": "250.00", "detail": "Brass" }),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["price"], "250.00");
    let product_id = body["data"]["id"].as_str().unwrap().to_string();

    let request = Request::builder()
        .method("POST")
        .uri("/api/orders/checkout")
        .header(header::AUTHORIZATION, &buyer)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(checkout_body(&product_id)))
        .unwrap();
    let (status, body) = send(&app, request).await?;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["order"]["status"], "Pending");
    assert_eq!(body["data"]["notification"]["type"], "order");

    let (status, body) = send(&app, get("/api/notifications", Some(&seller))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["unread"], 1);
    assert_eq!(
        body["data"]["items"][0]["message"],
        "buyer placed an order for Vintage Lamp"
    );

    let (status, body) = send(
        &app,
        get(&format!("/api/orders/availability/{product_id}"), None),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["available"], false);

    let request = Request::builder()
        .method("POST")
        .uri("/api/orders/checkout")
        .header(header::AUTHORIZATION, &buyer)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(checkout_body(&product_id)))
        .unwrap();
    let (status, _) = send(&app, request).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn seller_storefront_shows_uploaded_product_image() -> anyhow::Result<()> {
    let app = app().await?;
    let seller = sign_up(&app, "shop@example.com", "Seller").await?;
    let buyer = sign_up(&app, "buyer@example.com", "Buyer").await?;

    let (_, body) = send(
        &app,
        json_request(
            "POST",
            "/api/products",
            Some(&seller),
            json!({ "name": "Teak Stool", "price": 800, "detail": "Solid teak" }),
        ),
    )
    .await?;
    let product_id = body["data"]["id"].as_str().unwrap().to_string();
    let seller_id = body["data"]["seller_id"].as_str().unwrap().to_string();
    let image_uri = format!("/api/products/{product_id}/image");

    let (status, _) = send(
        &app,
        multipart_put(&image_uri, &buyer, image_body("image", b"\x89PNGstool")),
    )
    .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        multipart_put(&image_uri, &seller, image_body("image", b"")),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Bad Request Product image is empty");

    let (status, body) = send(
        &app,
        multipart_put(&image_uri, &seller, image_body("image", b"\x89PNGstool")),
    )
    .await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    let image_url = body["data"]["image_url"].as_str().unwrap();
    assert!(image_url.starts_with("memory://product_images/"));

    let (status, body) = send(&app, get(&format!("/api/users/{seller_id}"), None)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "shop");
    assert_eq!(body["data"]["role"], "Seller");
    assert!(body["data"].get("email").is_none());
    assert!(body["data"].get("phone").is_none());

    let (status, body) =
        send(&app, get(&format!("/api/users/{seller_id}/products"), None)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["data"][0]["image_url"], image_url);
    Ok(())
}
