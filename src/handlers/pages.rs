//! Dashboard page handlers

use axum::{
    extract::{rejection::FormRejection, State},
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;

use crate::{AppError, AppState};
use crate::error::{InvalidSelectionError, PredictionError};
use crate::features::Selection;
use crate::pages;

/// Form-urlencoded submission from the predictor page. A missing field
/// parses as an empty label and is rejected as an invalid selection.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PredictForm {
    pub manufacturer: String,
    pub dose: String,
    pub route: String,
    pub site: String,
}

/// [`AppError`] rendered as an HTML page
pub struct PageError(AppError);

impl From<InvalidSelectionError> for PageError {
    fn from(err: InvalidSelectionError) -> Self {
        PageError(err.into())
    }
}

impl From<FormRejection> for PageError {
    fn from(rejection: FormRejection) -> Self {
        PageError(rejection.into())
    }
}

impl From<PredictionError> for PageError {
    fn from(err: PredictionError) -> Self {
        PageError(err.into())
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        self.0.log();
        (self.0.status(), Html(pages::error_page(&self.0))).into_response()
    }
}

pub async fn index() -> Html<String> {
    Html(pages::form_page())
}

pub async fn problem_statement() -> Html<String> {
    Html(pages::problem_statement_page())
}

/// Score the submitted form and render the result
pub async fn predict(
    State(state): State<AppState>,
    form: Result<Form<PredictForm>, FormRejection>,
) -> Result<Html<String>, PageError> {
    let Form(form) = form?;
    let selection = Selection::parse(&form.manufacturer, &form.dose, &form.route, &form.site)?;
    let assessment = state.engine.assess(&selection)?;
    let description = state.engine.artifacts().classifier.description();

    Ok(Html(pages::result_page(&selection, &assessment, description)))
}
