use actix_web::{Responder, get, web};
use toxprobe::{SnapshotStore, StatusReport};

/// Latest published snapshot as JSON.
#[get("/json")]
pub async fn json_route(store: web::Data<SnapshotStore>) -> impl Responder {
    let snapshot = store.current().await;
    web::Json(StatusReport::from(snapshot.as_ref()))
}
