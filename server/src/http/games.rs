//! Read-mostly game queries. Mutations only ever go through the socket.

use actix_web::{get, post, web, HttpResponse, Responder};
use serde::Deserialize;
use uuid::Uuid;

use crate::game::{
    geometry::{is_in_bounds, Pos},
    selection::Highlights,
    session::{DispatchErr, SessionRegistry},
    types::PlayerId,
};

#[derive(Deserialize)]
pub struct CellQuery {
    pub row: u8,
    pub col: u8,
}

/// GET /api/games
#[get("/games")]
pub async fn list(registry: web::Data<SessionRegistry>) -> impl Responder {
    HttpResponse::Ok().json(registry.list())
}

/// POST /api/games
#[post("/games")]
pub async fn create(registry: web::Data<SessionRegistry>) -> impl Responder {
    match registry.create() {
        Ok(handle) => {
            HttpResponse::Created().json(serde_json::json!({ "game_id": handle.game_id() }))
        }
        Err(e @ DispatchErr::TooManySessions(_)) => {
            HttpResponse::ServiceUnavailable().body(e.to_string())
        }
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

/// GET /api/games/{game_id}
#[get("/games/{game_id}")]
pub async fn snapshot(
    path: web::Path<Uuid>,
    registry: web::Data<SessionRegistry>,
) -> impl Responder {
    let gid = path.into_inner();
    match registry.get(gid) {
        Some(handle) => HttpResponse::Ok().json(handle.view().game.snapshot()),
        None => HttpResponse::NotFound().body(DispatchErr::UnknownGame(gid).to_string()),
    }
}

/// GET /api/games/{game_id}/highlights?row=&col=
#[get("/games/{game_id}/highlights")]
pub async fn highlights(
    path: web::Path<Uuid>,
    query: web::Query<CellQuery>,
    registry: web::Data<SessionRegistry>,
) -> impl Responder {
    let gid = path.into_inner();
    let pos = Pos::new(query.row, query.col);
    if !is_in_bounds(pos) {
        return HttpResponse::BadRequest().body(format!("{pos} is off the board"));
    }
    match registry.get(gid) {
        Some(handle) => HttpResponse::Ok().json(Highlights::for_cell(&handle.view().game, pos)),
        None => HttpResponse::NotFound().body(DispatchErr::UnknownGame(gid).to_string()),
    }
}

/// GET /api/games/{game_id}/deployment/{player}
#[get("/games/{game_id}/deployment/{player}")]
pub async fn deployment(
    path: web::Path<(Uuid, u8)>,
    registry: web::Data<SessionRegistry>,
) -> impl Responder {
    let (gid, seat) = path.into_inner();
    let player = match PlayerId::try_from(seat) {
        Ok(p) => p,
        Err(e) => return HttpResponse::BadRequest().body(e),
    };
    match registry.get(gid) {
        Some(handle) => HttpResponse::Ok().json(handle.view().game.deployment_zone(player)),
        None => HttpResponse::NotFound().body(DispatchErr::UnknownGame(gid).to_string()),
    }
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list)
        .service(create)
        .service(highlights)
        .service(deployment)
        .service(snapshot);
}
