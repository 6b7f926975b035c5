mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use user_service::database::models::user::Role;

#[tokio::test]
async fn create_read_delete_scenario() -> Result<()> {
    let server = common::start_server().await?;

    // Create ignores the requested admin role
    let created = server.create_user(&common::ann()).await?;
    assert_eq!(created["id"], "u1");
    assert_eq!(created["role"], "user");
    assert_eq!(created["birthDate"], "1990-04-01");
    assert!(created.get("password").is_none(), "password leaked: {}", created);

    let res = server.client.get(server.url("/users/u1")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let fetched: Value = res.json().await?;
    assert_eq!(fetched, created);

    let res = server
        .client
        .patch(server.url("/users/u1"))
        .json(&json!({ "email": "b@x.com" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let reread: Value = server.client.get(server.url("/users/u1")).send().await?.json().await?;
    assert_eq!(reread["email"], "b@x.com");
    assert_eq!(reread["name"], "Ann");
    assert_eq!(reread["birthDate"], "1990-04-01");

    let token = server.token_for("u1", Role::User)?;
    let res = server
        .client
        .delete(server.url("/users/u1"))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let deleted: Value = res.json().await?;
    assert_eq!(deleted["id"], "u1");

    let res = server.client.get(server.url("/users/u1")).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await?;
    assert_eq!(body, json!({ "status": 404, "label": "Not Found", "detail": "User u1 not found" }));

    Ok(())
}

#[tokio::test]
async fn register_is_an_alias_for_create() -> Result<()> {
    let server = common::start_server().await?;

    let res = server
        .client
        .post(server.url("/users/register"))
        .json(&common::bob())
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    assert_eq!(body["role"], "user");
    assert_eq!(body["birthDate"], Value::Null);

    Ok(())
}

#[tokio::test]
async fn birth_date_accepts_timestamp_form() -> Result<()> {
    let server = common::start_server().await?;

    let mut body = common::bob();
    body["birthDate"] = json!("1985-01-02T00:00:00.000Z");
    let created = server.create_user(&body).await?;
    assert_eq!(created["birthDate"], "1985-01-02");

    Ok(())
}

#[tokio::test]
async fn list_with_and_without_filter() -> Result<()> {
    let server = common::start_server().await?;
    server.create_user(&common::ann()).await?;
    server.create_user(&common::bob()).await?;

    let all: Vec<Value> = server.client.get(server.url("/users/")).send().await?.json().await?;
    let ids: Vec<&str> = all.iter().filter_map(|u| u["id"].as_str()).collect();
    assert_eq!(ids, vec!["u1", "u2"]);

    let res = server
        .client
        .get(server.url("/users"))
        .query(&[("email", "b@x.com")])
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let matched: Vec<Value> = res.json().await?;
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0]["name"], "Bob");

    // An absent id is an empty list, not a 404
    let none: Vec<Value> = server
        .client
        .get(server.url("/users"))
        .query(&[("id", "missing")])
        .send()
        .await?
        .json()
        .await?;
    assert!(none.is_empty());

    Ok(())
}

#[tokio::test]
async fn list_rejects_password_and_unknown_filters() -> Result<()> {
    let server = common::start_server().await?;

    for (field, value) in [("password", "p"), ("shoeSize", "42"), ("role", "emperor")] {
        let res = server
            .client
            .get(server.url("/users"))
            .query(&[(field, value)])
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "filter {field}={value}");
        let body: Value = res.json().await?;
        assert_eq!(body["status"], 400);
        assert_eq!(body["label"], "Bad Request");
    }

    Ok(())
}

#[tokio::test]
async fn patch_changes_only_supplied_fields() -> Result<()> {
    let server = common::start_server().await?;
    let before = server.create_user(&common::ann()).await?;

    let res = server
        .client
        .patch(server.url("/users/u1"))
        .json(&json!({ "name": "Annie", "role": "admin" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let after: Value = res.json().await?;

    assert_eq!(after["name"], "Annie");
    assert_eq!(after["email"], before["email"]);
    assert_eq!(after["birthDate"], before["birthDate"]);
    assert_eq!(after["role"], "user");

    Ok(())
}

#[tokio::test]
async fn patch_and_read_of_absent_id_are_not_found() -> Result<()> {
    let server = common::start_server().await?;

    let res = server
        .client
        .patch(server.url("/users/ghost"))
        .json(&json!({ "name": "Nobody" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await?;
    assert_eq!(body["detail"], "User ghost not found");

    let res = server.client.get(server.url("/users/ghost")).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn duplicate_id_is_a_generic_server_error() -> Result<()> {
    let server = common::start_server().await?;
    server.create_user(&common::ann()).await?;

    let res = server.client.post(server.url("/users")).json(&common::ann()).send().await?;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await?;
    assert_eq!(body["status"], 500);
    assert!(!body["detail"].as_str().unwrap_or_default().contains("users_pkey"));

    Ok(())
}
