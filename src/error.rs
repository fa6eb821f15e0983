use crate::data::student::StudentId;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use maud::html;
use snafu::Snafu;
use std::{num::ParseIntError, num::ParseFloatError, path::PathBuf};

pub type RosterResult<T> = Result<T, RosterError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RosterError {
    #[snafu(display("{message}"))]
    Validation { message: &'static str },
    #[snafu(display("Network error occurred"))]
    Network,
    #[snafu(display("Server error occurred"))]
    Server,
    #[snafu(display("A submission is already in flight"))]
    SubmitInFlight,
    #[snafu(display("No student form is open"))]
    NoFormOpen,
    #[snafu(display("Courses have not finished loading"))]
    CoursesNotLoaded,
    #[snafu(display("Unable to find student with ID: {}", id))]
    MissingStudent { id: StudentId },
    #[snafu(display("Saved student has no course attached"))]
    MissingCourse,
    #[snafu(display("Unable to retrieve env var `{}`", name))]
    BadEnvVar {
        source: dotenvy::Error,
        name: &'static str,
    },
    #[snafu(display("Unable to parse `{}` as a millisecond range: {:?}", name, original))]
    ParseDelay {
        source: ParseIntError,
        name: &'static str,
        original: String,
    },
    #[snafu(display("Delay range for `{}` has its minimum above its maximum", name))]
    InvertedDelay { name: &'static str },
    #[snafu(display("Unable to parse `{}` as a probability: {:?}", name, original))]
    ParseProbability {
        source: ParseFloatError,
        name: &'static str,
        original: String,
    },
    #[snafu(display("Probability for `{}` must be between 0 and 1, found {}", name, found))]
    ProbabilityOutOfRange { name: &'static str, found: f64 },
    #[snafu(display("Error reading or writing {:?}", path))]
    Storage {
        source: std::io::Error,
        path: PathBuf,
    },
    #[snafu(display("Error serialising with serde_json"))]
    JsonEncode { source: serde_json::Error },
    #[snafu(display("Error deserialising with serde_json"))]
    JsonDecode { source: serde_json::Error },
}

impl IntoResponse for RosterError {
    #[allow(clippy::match_same_arms)]
    fn into_response(self) -> Response {
        const ISE: StatusCode = StatusCode::INTERNAL_SERVER_ERROR; //internal server error
        const NF: StatusCode = StatusCode::NOT_FOUND; //not found
        const CF: StatusCode = StatusCode::CONFLICT; //wrong phase
        const BI: StatusCode = StatusCode::BAD_REQUEST; //bad input
        const BG: StatusCode = StatusCode::BAD_GATEWAY; //simulated upstream

        let basic_error = |desc| {
            html! {
                div class="bg-red-100 border border-red-400 text-red-700 px-4 py-3 rounded relative mb-4" role="alert" {
                    strong class="font-bold" {"Roster Error "}
                    span {(desc)}
                }
            }
        };

        let status_code = match &self {
            Self::Validation { .. } => BI,
            Self::Network | Self::Server => BG,
            Self::SubmitInFlight | Self::NoFormOpen | Self::CoursesNotLoaded => CF,
            Self::MissingStudent { .. } => NF,
            Self::MissingCourse => BI,
            Self::BadEnvVar { .. } => ISE,
            Self::ParseDelay { .. } | Self::InvertedDelay { .. } => ISE,
            Self::ParseProbability { .. } | Self::ProbabilityOutOfRange { .. } => ISE,
            Self::Storage { .. } => ISE,
            Self::JsonEncode { .. } => ISE,
            Self::JsonDecode { .. } => BI,
        };

        error!(?self, "Error!");
        (status_code, Html(basic_error(self.to_string()))).into_response()
    }
}
