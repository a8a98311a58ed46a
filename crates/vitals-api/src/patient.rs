//! Patient management routes.
//!
//! | Route                   | Success                                   |
//! |-------------------------|-------------------------------------------|
//! | `GET /`                 | 200 banner message                        |
//! | `GET /about`            | 200 configured about text                 |
//! | `GET /view`             | 200 full collection object                |
//! | `GET /patient/:id`      | 200 record                                |
//! | `GET /sort`             | 200 list of `{id, ...record}`             |
//! | `POST /create`          | 201 "Patient created successfully"        |
//! | `PUT /edit/:id`         | 200 "Patient updated"                     |
//! | `DELETE /delete/:id`    | 200 "Patient deleted"                     |

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Map, Value};

use vitals_contracts::{
    error::{VitalsError, VitalsResult},
    patient::{Collection, PatientAttributes, PatientRecord},
    update::PatientUpdate,
    verify::RequestKind,
};
use vitals_core::{traits::RequestVerifier, PatientService};

use crate::error::{no_route, ApiResult};
use crate::middleware::request_span;

pub const BANNER: &str = "Patient Management System API";

/// Body of `POST /create`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePatient {
    pub id: String,
    #[serde(flatten)]
    pub attributes: PatientAttributes,
}

#[derive(Debug, Deserialize)]
struct SortParams {
    sort_by: Option<String>,
    order: Option<String>,
}

/// Router state for the patient service.
#[derive(Clone)]
pub struct PatientApi {
    service: Arc<PatientService>,
    verifier: Arc<dyn RequestVerifier>,
    about: Arc<str>,
}

impl PatientApi {
    pub fn new(
        service: PatientService,
        verifier: Box<dyn RequestVerifier>,
        about: impl Into<String>,
    ) -> Self {
        Self {
            service: Arc::new(service),
            verifier: Arc::from(verifier),
            about: Arc::from(about.into()),
        }
    }

    pub fn service(&self) -> &PatientService {
        &self.service
    }

    pub fn router(self) -> Router {
        Router::new()
            .route("/", get(root))
            .route("/about", get(about))
            .route("/view", get(view))
            .route("/patient/:id", get(show))
            .route("/sort", get(sort))
            .route("/create", post(create))
            .route("/edit/:id", put(edit))
            .route("/delete/:id", delete(remove))
            .fallback(no_route)
            .with_state(self)
            .layer(middleware::from_fn(request_span))
    }

    /// Schema-check `body` for `kind`, then deserialize it.
    ///
    /// Every schema violation is reported at once. Anything serde still
    /// rejects afterwards is reported against the body as a whole.
    fn checked<T: DeserializeOwned>(
        &self,
        kind: RequestKind,
        body: Result<Json<Value>, JsonRejection>,
    ) -> ApiResult<T> {
        let Json(body) = body?;
        let report = self.verifier.verify(kind, &body)?;
        if !report.passed {
            return Err(report.into());
        }
        Ok(parse_body(body)?)
    }
}

pub(crate) fn parse_body<T: DeserializeOwned>(body: Value) -> VitalsResult<T> {
    serde_json::from_value(body).map_err(|e| VitalsError::invalid("body", e.to_string()))
}

fn message(text: &str) -> Json<Value> {
    Json(json!({ "message": text }))
}

// ── Handlers ──────────────────────────────────────────────────────────────────

async fn root() -> Json<Value> {
    message(BANNER)
}

async fn about(State(api): State<PatientApi>) -> Json<Value> {
    message(&api.about)
}

async fn view(State(api): State<PatientApi>) -> ApiResult<Json<Collection>> {
    Ok(Json(api.service.list()?))
}

async fn show(
    State(api): State<PatientApi>,
    Path(id): Path<String>,
) -> ApiResult<Json<PatientRecord>> {
    Ok(Json(api.service.get(&id)?))
}

async fn sort(
    State(api): State<PatientApi>,
    params: Result<Query<SortParams>, QueryRejection>,
) -> ApiResult<Json<Vec<Value>>> {
    let Query(params) = params?;
    let sort_by = params.sort_by.ok_or_else(|| VitalsError::InvalidQuery {
        reason: "missing required parameter 'sort_by'".to_string(),
    })?;
    let rows = api.service.sorted(&sort_by, params.order.as_deref())?;

    let listing = rows
        .into_iter()
        .map(|(id, record)| with_id(id, &record))
        .collect::<VitalsResult<Vec<Value>>>()?;
    Ok(Json(listing))
}

async fn create(
    State(api): State<PatientApi>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let payload: CreatePatient = api.checked(RequestKind::CreatePatient, body)?;
    api.service.create(&payload.id, payload.attributes)?;
    Ok((StatusCode::CREATED, message("Patient created successfully")))
}

async fn edit(
    State(api): State<PatientApi>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let payload: PatientUpdate = api.checked(RequestKind::UpdatePatient, body)?;
    api.service.update(&id, &payload)?;
    Ok(message("Patient updated"))
}

async fn remove(State(api): State<PatientApi>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    api.service.delete(&id)?;
    Ok(message("Patient deleted"))
}

/// `{id, ...record}` as one flat object.
fn with_id(id: String, record: &PatientRecord) -> VitalsResult<Value> {
    let mut object = match serde_json::to_value(record) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            return Err(VitalsError::storage(format!(
                "record serialized to a non-object: {other}"
            )))
        }
        Err(e) => return Err(VitalsError::storage(format!("record serialization failed: {e}"))),
    };
    let mut row = Map::with_capacity(object.len() + 1);
    row.insert("id".to_string(), Value::String(id));
    row.append(&mut object);
    Ok(Value::Object(row))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
