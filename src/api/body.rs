use std::ops::Deref;

use log::warn;
use rocket::{
    data::{self, Data, FromData},
    form::{Form, FromForm},
    http::Status,
    serde::json::Json,
    Request,
};
use serde::Deserialize;

use crate::logging::RequestId;

/// A request body sent either as JSON or as an urlencoded/multipart form.
///
/// A body without a content type is read as JSON. Any other content type is
/// refused with `415 Unsupported Media Type`.
#[derive(Debug)]
pub struct Body<T>(pub T);

impl<T> Deref for Body<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[rocket::async_trait]
impl<'r, T> FromData<'r> for Body<T>
where
    T: Deserialize<'r> + FromForm<'r> + Send + 'r,
{
    type Error = ();

    async fn from_data(req: &'r Request<'_>, data: Data<'r>) -> data::Outcome<'r, Self> {
        match req.content_type() {
            Some(content_type) if content_type.is_form() || content_type.is_form_data() => {
                Form::<T>::from_data(req, data)
                    .await
                    .map(|form| Body(form.into_inner()))
                    .map_error(|(status, _)| (status, ()))
            }
            Some(content_type) if !content_type.is_json() => {
                warn!("req{}: unsupported body type {content_type}", RequestId::of(req));
                data::Outcome::Error((Status::UnsupportedMediaType, ()))
            }
            _ => Json::<T>::from_data(req, data)
                .await
                .map(|json| Body(json.into_inner()))
                .map_error(|(status, _)| (status, ())),
        }
    }
}
