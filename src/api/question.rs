use chrono::Utc;
use rocket::{serde::json::Json, Route, State};

use super::body::Body;
use crate::error::Result;
use crate::model::{
    api::{
        request::{QuestionAction, SubmitQuestion, VoteRequest},
        status::StatusBody,
    },
    ops,
    store::Questions,
};
use crate::Config;

pub fn routes() -> Vec<Route> {
    routes![submit, vote, report, skip]
}

#[post("/question", data = "<request>")]
pub async fn submit(
    request: Body<SubmitQuestion>,
    questions: Questions,
    config: &State<Config>,
) -> Result<Json<StatusBody>> {
    let submitted = ops::submit_question(
        &*questions,
        &request.user,
        &request.option_a,
        &request.option_b,
        &request.language,
        Utc::now(),
        config.max_option_length(),
    )
    .await?;
    Ok(Json(StatusBody::created(submitted.id)))
}

#[post("/vote", data = "<request>")]
pub async fn vote(request: Body<VoteRequest>, questions: Questions) -> Result<Json<StatusBody>> {
    ops::record_choice(&*questions, &request.question, &request.user, request.choice).await?;
    Ok(Json(StatusBody::ok()))
}

#[post("/report", data = "<request>")]
pub async fn report(request: Body<QuestionAction>, questions: Questions) -> Result<Json<StatusBody>> {
    ops::record_report(&*questions, &request.question, &request.user).await?;
    Ok(Json(StatusBody::ok()))
}

#[post("/skip", data = "<request>")]
pub async fn skip(request: Body<QuestionAction>, questions: Questions) -> Result<Json<StatusBody>> {
    ops::record_skip(&*questions, &request.question, &request.user).await?;
    Ok(Json(StatusBody::ok()))
}
