use rocket::{Catcher, Route};

mod body;
mod feed;
mod public;
mod question;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(public::routes());
    routes.extend(question::routes());
    routes.extend(feed::routes());
    routes
}

pub fn catchers() -> Vec<Catcher> {
    public::catchers()
}
