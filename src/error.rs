use log::{error, warn};
use mongodb::{bson::oid::Error as OidError, error::Error as DbError};
use rocket::{
    http::Status,
    response::{self, Responder},
    serde::json::Json,
    Request, Response,
};
use serde::Serialize;
use thiserror::Error;

use crate::logging::RequestId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The backing store could not be reached or rejected the operation.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] DbError),
    /// A referenced question does not exist.
    #[error("Not found: {0}")]
    NotFound(String),
    /// A required field was missing, empty, or malformed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn invalid_input(what: impl Into<String>) -> Self {
        Self::InvalidInput(what.into())
    }

    /// The HTTP status this error translates to.
    pub fn status(&self) -> Status {
        match self {
            Self::StoreUnavailable(_) => Status::InternalServerError,
            Self::NotFound(_) => Status::NotFound,
            Self::InvalidInput(_) => Status::BadRequest,
        }
    }
}

impl From<OidError> for Error {
    fn from(err: OidError) -> Self {
        Self::InvalidInput(format!("Malformed question ID: {err}"))
    }
}

/// The JSON body returned for every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    /// Render this body with the given status.
    pub fn respond_with<'r, 'o: 'r>(
        self,
        status: Status,
        req: &'r Request<'_>,
    ) -> response::Result<'o> {
        Response::build_from(Json(self).respond_to(req)?)
            .status(status)
            .ok()
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'o> {
        let status = self.status();
        let id = RequestId::of(req);
        match self {
            Self::StoreUnavailable(_) => error!("req{id}: {self}"),
            _ => warn!("req{id}: {self}"),
        }
        ErrorBody::new(self.to_string()).respond_with(status, req)
    }
}
