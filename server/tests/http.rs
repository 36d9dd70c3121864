//! REST surface under `/api`, driven through actix's in-process test service.

use actix_web::{http::StatusCode, test, web, App};
use bastion_server::{
    game::{geometry::Pos, logic::Intent, session::SessionRegistry},
    http, metrics,
    protocol::ClientMsg,
};
use serde_json::Value;
use std::time::Duration;
use uuid::Uuid;

fn registry(max_sessions: usize) -> web::Data<SessionRegistry> {
    web::Data::new(SessionRegistry::new(8, max_sessions, Duration::from_secs(60)))
}

macro_rules! app {
    ($registry:expr) => {
        test::init_service(
            App::new()
                .wrap(metrics::METRICS.clone())
                .app_data($registry.clone())
                .configure(http::routes::init_routes),
        )
        .await
    };
}

#[actix_rt::test]
async fn healthz_reports_live_sessions() {
    let reg = registry(4);
    let app = app!(reg);

    let req = test::TestRequest::get().uri("/api/healthz").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["sessions"], 0);
}

#[actix_rt::test]
async fn create_then_fetch_snapshot() {
    let reg = registry(4);
    let app = app!(reg);

    let resp = test::call_service(&app, test::TestRequest::post().uri("/api/games").to_request()).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    let gid = created["game_id"].as_str().unwrap().to_owned();

    let req = test::TestRequest::get()
        .uri(&format!("/api/games/{gid}"))
        .to_request();
    let snap: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(snap["turn"], 1);
    assert_eq!(snap["phase"]["phase"], "AwaitingBasePlacement");

    let req = test::TestRequest::get().uri("/api/games").to_request();
    let rows: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(rows.as_array().unwrap().len(), 1);
    assert_eq!(rows[0]["game_id"], gid.as_str());
    assert_eq!(rows[0]["seated"], 0);
}

#[actix_rt::test]
async fn unknown_game_is_404() {
    let reg = registry(4);
    let app = app!(reg);

    let req = test::TestRequest::get()
        .uri(&format!("/api/games/{}", Uuid::new_v4()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn highlights_reject_off_board_cells() {
    let reg = registry(4);
    let game = reg.create().unwrap();
    let app = app!(reg);

    let req = test::TestRequest::get()
        .uri(&format!("/api/games/{}/highlights?row=9&col=0", game.game_id()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get()
        .uri(&format!("/api/games/{}/highlights?row=0&col=0", game.game_id()))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["movable"].as_array().unwrap().len(), 0);
    assert_eq!(body["attackable"].as_array().unwrap().len(), 0);
}

#[actix_rt::test]
async fn deployment_zone_follows_the_base() {
    let reg = registry(4);
    let game = reg.create().unwrap();
    let p1 = Uuid::new_v4();
    game.join(p1).await.unwrap();
    let replies = game
        .submit(
            p1,
            ClientMsg::Act {
                intent: Intent::PlaceBase { pos: Pos::new(0, 7) },
            },
        )
        .await
        .unwrap();
    assert!(replies.is_empty());
    let app = app!(reg);

    let req = test::TestRequest::get()
        .uri(&format!("/api/games/{}/deployment/1", game.game_id()))
        .to_request();
    let zone: Vec<Pos> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(zone, vec![Pos::new(0, 6), Pos::new(1, 6), Pos::new(1, 7)]);

    let req = test::TestRequest::get()
        .uri(&format!("/api/games/{}/deployment/3", game.game_id()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn session_limit_is_503() {
    let reg = registry(1);
    let app = app!(reg);

    let first = test::call_service(&app, test::TestRequest::post().uri("/api/games").to_request()).await;
    assert_eq!(first.status(), StatusCode::CREATED);
    let second = test::call_service(&app, test::TestRequest::post().uri("/api/games").to_request()).await;
    assert_eq!(second.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[actix_rt::test]
async fn metrics_endpoint_is_mounted() {
    let reg = registry(4);
    let app = app!(reg);

    let req = test::TestRequest::get().uri("/api/games").to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::get().uri("/metrics").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    let text = String::from_utf8_lossy(&body);
    assert!(text.contains("bastion_http_requests_total"));
    assert!(!text.contains("/api/healthz"), "probes are not counted");
}
