mod common;

use anyhow::Result;
use common::{TestServer, ADMIN, USER};
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn create_plot_returns_201_with_row() -> Result<()> {
    let server = TestServer::spawn().await?;

    let res = server
        .post("/plots", Some(ADMIN))
        .json(&json!({ "name": "North Field", "area": 125.5, "plantingStart": "2025-09-01" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let plot: Value = res.json().await?;
    assert!(plot["id"].as_str().map_or(false, |id| id.len() == 36));
    assert_eq!(plot["name"], "North Field");
    assert_eq!(plot["area"], json!(125.5));
    assert_eq!(plot["plantingStart"], "2025-09-01");
    Ok(())
}

#[tokio::test]
async fn duplicate_name_is_rejected_and_not_stored() -> Result<()> {
    let server = TestServer::spawn().await?;
    server.create_plot("Bed A", 10.0).await?;

    let res = server
        .post("/plots", Some(ADMIN))
        .json(&json!({ "name": "Bed A", "area": 20 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["name"].is_string());

    let plots: Vec<Value> = server.get("/plots", Some(USER)).send().await?.json().await?;
    assert_eq!(plots.len(), 1);
    Ok(())
}

#[tokio::test]
async fn invalid_plot_input_is_a_validation_error() -> Result<()> {
    let server = TestServer::spawn().await?;

    let cases = [
        (json!({ "name": "Bed A", "area": 0 }), "area"),
        (json!({ "name": "Bed A", "area": -3.5 }), "area"),
        (json!({ "name": "Bed A" }), "area"),
        (json!({ "name": "", "area": 4 }), "name"),
        (json!({ "name": "Bed A", "area": 4, "plantingStart": "someday" }), "plantingStart"),
    ];
    for (body, field) in cases {
        let res = server.post("/plots", Some(ADMIN)).json(&body).send().await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{body}");
        let err: Value = res.json().await?;
        assert!(err["field_errors"].get(field).is_some(), "{body}");
    }

    let plots: Vec<Value> = server.get("/plots", Some(ADMIN)).send().await?.json().await?;
    assert!(plots.is_empty());
    Ok(())
}

#[tokio::test]
async fn malformed_json_body() -> Result<()> {
    let server = TestServer::spawn().await?;

    let res = server
        .post("/plots", Some(ADMIN))
        .header("Content-Type", "application/json")
        .body("{ not json")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "INVALID_JSON");
    Ok(())
}

#[tokio::test]
async fn list_is_ordered_by_name() -> Result<()> {
    let server = TestServer::spawn().await?;
    for name in ["Cabbage", "Arugula", "Beet"] {
        server.create_plot(name, 5.0).await?;
    }

    let plots: Vec<Value> = server.get("/plots", Some(USER)).send().await?.json().await?;
    let names: Vec<&str> = plots.iter().filter_map(|p| p["name"].as_str()).collect();
    assert_eq!(names, vec!["Arugula", "Beet", "Cabbage"]);
    Ok(())
}

#[tokio::test]
async fn get_plot_by_id() -> Result<()> {
    let server = TestServer::spawn().await?;
    let plot = server.create_plot("Bed A", 10.0).await?;
    let id = plot["id"].as_str().unwrap();

    let res = server.get(&format!("/plots/{}", id), Some(USER)).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?, plot);

    let res = server
        .get("/plots/7a1c4d52-58a3-4d8e-9f0e-3b1f6f5f0c11", Some(USER))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Plot not found");

    let res = server.get("/plots/not-a-uuid", Some(USER)).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn patch_updates_only_given_fields() -> Result<()> {
    let server = TestServer::spawn().await?;
    let res = server
        .post("/plots", Some(ADMIN))
        .json(&json!({ "name": "Bed A", "area": 10, "plantingStart": "2025-03-01" }))
        .send()
        .await?;
    let plot: Value = res.json().await?;
    let path = format!("/plots/{}", plot["id"].as_str().unwrap());

    let res = server.patch(&path, Some(ADMIN)).json(&json!({ "area": 12.25 })).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await?;
    assert_eq!(updated["name"], "Bed A");
    assert_eq!(updated["area"], json!(12.25));
    assert_eq!(updated["plantingStart"], "2025-03-01");

    let res = server
        .patch(&path, Some(ADMIN))
        .json(&json!({ "plantingStart": null }))
        .send()
        .await?;
    let updated: Value = res.json().await?;
    assert_eq!(updated["plantingStart"], Value::Null);

    // Empty patch: nothing written, row returned as stored.
    let res = server.patch(&path, Some(ADMIN)).json(&json!({})).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?, updated);

    let res = server.patch(&path, Some(USER)).json(&json!({ "area": 1 })).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn patch_unknown_plot_is_not_found() -> Result<()> {
    let server = TestServer::spawn().await?;

    let res = server
        .patch("/plots/7a1c4d52-58a3-4d8e-9f0e-3b1f6f5f0c11", Some(ADMIN))
        .json(&json!({ "name": "Ghost" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn delete_plot_then_gone() -> Result<()> {
    let server = TestServer::spawn().await?;
    let plot = server.create_plot("Bed A", 10.0).await?;
    let path = format!("/plots/{}", plot["id"].as_str().unwrap());

    let res = server.delete(&path, Some(USER)).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server.delete(&path, Some(ADMIN)).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!({ "ok": true }));

    let res = server.delete(&path, Some(ADMIN)).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let res = server.get(&path, Some(ADMIN)).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn summary_totals_harvests() -> Result<()> {
    let server = TestServer::spawn().await?;
    let plot = server.create_plot("Bed A", 10.0).await?;
    let id = plot["id"].as_str().unwrap();
    let path = format!("/plots/{}/summary", id);

    let body: Value = server.get(&path, Some(USER)).send().await?.json().await?;
    assert_eq!(body["plotId"], id);
    assert_eq!(body["totalKg"].as_f64(), Some(0.0));

    server.create_harvest(id, "2025-10-01", 12.5).await?;
    server.create_harvest(id, "2025-10-02", 7.25).await?;

    let body: Value = server.get(&path, Some(USER)).send().await?.json().await?;
    assert_eq!(body["totalKg"].as_f64(), Some(19.75));
    Ok(())
}

#[tokio::test]
async fn summary_of_unknown_plot_is_zero() -> Result<()> {
    let server = TestServer::spawn().await?;

    let res = server
        .get("/plots/7a1c4d52-58a3-4d8e-9f0e-3b1f6f5f0c11/summary", Some(USER))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["totalKg"].as_f64(), Some(0.0));
    Ok(())
}
