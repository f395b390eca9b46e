use rocket::{http::Status, serde::json::Json, Catcher, Request, Route};

use crate::error::ErrorBody;
use crate::model::api::status::StatusBody;

pub fn routes() -> Vec<Route> {
    routes![index]
}

pub fn catchers() -> Vec<Catcher> {
    catchers![not_found, unprocessable, fallback]
}

#[get("/")]
pub fn index() -> Json<StatusBody> {
    Json(StatusBody::new("PebbleVote API"))
}

#[catch(404)]
fn not_found() -> Json<ErrorBody> {
    Json(ErrorBody::new("Site not found!"))
}

/// Rocket answers 422 when a JSON body doesn't match the expected shape.
#[catch(422)]
fn unprocessable() -> Json<ErrorBody> {
    Json(ErrorBody::new("Malformed request body"))
}

#[catch(default)]
fn fallback(status: Status, _req: &Request<'_>) -> (Status, Json<ErrorBody>) {
    let reason = status.reason().unwrap_or("Unknown error");
    (status, Json(ErrorBody::new(reason)))
}
