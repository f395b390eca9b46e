use rocket::{
    fairing::{Fairing, Info, Kind},
    http::{ContentType, Header},
    Request, Response,
};

use crate::Config;

/// A fairing that stamps every response with the configured
/// `Access-Control-Allow-Origin` and marks bodies as JSON.
#[derive(Debug, Copy, Clone)]
pub struct CorsFairing;

#[rocket::async_trait]
impl Fairing for CorsFairing {
    fn info(&self) -> Info {
        Info {
            name: "CORS",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, req: &'r Request<'_>, res: &mut Response<'r>) {
        let origin = req
            .rocket()
            .state::<Config>()
            .map(|config| config.allowed_origin().to_string())
            .unwrap_or_else(|| "*".to_string());
        res.set_header(Header::new("Access-Control-Allow-Origin", origin));
        if res.content_type().is_none() {
            res.set_header(ContentType::JSON);
        }
    }
}
