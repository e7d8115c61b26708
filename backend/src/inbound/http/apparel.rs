//! Apparel handlers: submission, own listing and proximity search.
//!
//! ```text
//! POST /apparel          multipart: type, condition, size, description,
//!                        image, latitude, longitude
//! GET  /apparel
//! GET  /apparel/nearby?longitude=-0.12&latitude=51.5&maxDistance=5000
//! ```

use actix_multipart::form::{MultipartForm, bytes::Bytes, text::Text};
use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::ApparelSubmissionRequest;
use crate::domain::{
    Apparel, ApparelDetails, ApparelValidationError, Error, GeoPoint, GeoValidationError,
    ImageUpload, NearbySearch, SearchRadius,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::error::ErrorResponse;
use crate::inbound::http::state::HttpState;

/// Multipart body for `POST /apparel`.
#[derive(Debug, MultipartForm)]
pub struct ApparelUploadForm {
    #[multipart(rename = "type")]
    pub apparel_type: Text<String>,
    pub condition: Text<String>,
    pub size: Text<String>,
    pub description: Text<String>,
    #[multipart(limit = "10MiB")]
    pub image: Option<Bytes>,
    pub latitude: Text<String>,
    pub longitude: Text<String>,
}

/// OpenAPI description of [`ApparelUploadForm`].
#[derive(ToSchema)]
pub struct ApparelUploadSchema {
    #[schema(rename = "type", example = "jacket")]
    pub apparel_type: String,
    #[schema(example = "like_new")]
    pub condition: String,
    #[schema(example = "M")]
    pub size: String,
    pub description: String,
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
    #[schema(example = 51.5072)]
    pub latitude: f64,
    #[schema(example = -0.1276)]
    pub longitude: f64,
}

/// GeoJSON point in (longitude, latitude) order.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PointResponse {
    #[serde(rename = "type")]
    #[schema(example = "Point")]
    pub kind: String,
    #[schema(example = json!([-0.1276, 51.5072]))]
    pub coordinates: [f64; 2],
}

/// Stored apparel record.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApparelResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub apparel_type: String,
    pub condition: String,
    pub size: String,
    pub description: String,
    pub image_url: String,
    pub location: PointResponse,
    /// Owner's user id.
    pub user: String,
    pub created_at: DateTime<Utc>,
}

impl From<Apparel> for ApparelResponse {
    fn from(record: Apparel) -> Self {
        Self {
            id: record.id.to_string(),
            apparel_type: record.details.apparel_type().to_owned(),
            condition: record.details.condition().as_str().to_owned(),
            size: record.details.size().to_owned(),
            description: record.details.description().to_owned(),
            image_url: record.image_url.as_str().to_owned(),
            location: PointResponse {
                kind: "Point".to_owned(),
                coordinates: record.location.coordinates(),
            },
            user: record.owner.to_string(),
            created_at: record.created_at,
        }
    }
}

fn to_responses(records: Vec<Apparel>) -> Vec<ApparelResponse> {
    records.into_iter().map(ApparelResponse::from).collect()
}

/// Query string for `GET /apparel/nearby`.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct NearbyQuery {
    /// Search centre longitude.
    pub longitude: f64,
    /// Search centre latitude.
    pub latitude: f64,
    /// Radius in metres; 10000 when omitted.
    pub max_distance: Option<f64>,
}

fn invalid_apparel(err: ApparelValidationError) -> Error {
    let field = match &err {
        ApparelValidationError::EmptyField { field }
        | ApparelValidationError::FieldTooLong { field, .. } => *field,
        ApparelValidationError::UnknownCondition => "condition",
        ApparelValidationError::MissingImage | ApparelValidationError::ImageTooLarge { .. } => {
            "image"
        }
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field }))
}

fn invalid_geo(err: GeoValidationError) -> Error {
    let field = match err {
        GeoValidationError::LongitudeOutOfRange => "longitude",
        GeoValidationError::LatitudeOutOfRange => "latitude",
        GeoValidationError::InvalidRadius => "maxDistance",
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field }))
}

fn parse_coordinate(raw: &str, on_error: GeoValidationError) -> Result<f64, Error> {
    raw.trim().parse::<f64>().map_err(|_| invalid_geo(on_error))
}

fn submission_request(
    caller: &AuthenticatedUser,
    form: ApparelUploadForm,
) -> Result<ApparelSubmissionRequest, Error> {
    let details = ApparelDetails::try_from_parts(
        &form.apparel_type,
        &form.condition,
        &form.size,
        &form.description,
    )
    .map_err(invalid_apparel)?;

    let longitude = parse_coordinate(&form.longitude, GeoValidationError::LongitudeOutOfRange)?;
    let latitude = parse_coordinate(&form.latitude, GeoValidationError::LatitudeOutOfRange)?;
    let location = GeoPoint::new(longitude, latitude).map_err(invalid_geo)?;

    let upload = form
        .image
        .ok_or_else(|| invalid_apparel(ApparelValidationError::MissingImage))?;
    let content_type = upload.content_type.as_ref().map(ToString::to_string);
    let image = ImageUpload::new(
        upload.file_name.as_deref(),
        content_type.as_deref(),
        upload.data.to_vec(),
    )
    .map_err(invalid_apparel)?;

    Ok(ApparelSubmissionRequest {
        owner: caller.id().clone(),
        details,
        image,
        location,
    })
}

/// Submit an item for recycling and earn points.
#[utoipa::path(
    post,
    path = "/apparel",
    request_body(content = ApparelUploadSchema, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Apparel recorded", body = ApparelResponse),
        (status = 400, description = "Invalid submission", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tags = ["apparel"],
    operation_id = "submitApparel",
    security(("bearerAuth" = []))
)]
#[post("")]
pub async fn submit_apparel(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    MultipartForm(form): MultipartForm<ApparelUploadForm>,
) -> ApiResult<HttpResponse> {
    let request = submission_request(&caller, form)?;
    let record = state.submission.submit(request).await?;
    Ok(HttpResponse::Created().json(ApparelResponse::from(record)))
}

/// List the caller's submissions, newest first.
#[utoipa::path(
    get,
    path = "/apparel",
    responses(
        (status = 200, description = "Caller's apparel", body = [ApparelResponse]),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tags = ["apparel"],
    operation_id = "listApparel",
    security(("bearerAuth" = []))
)]
#[get("")]
pub async fn list_apparel(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<ApparelResponse>>> {
    let records = state.apparel.list_owned(caller.id()).await?;
    Ok(web::Json(to_responses(records)))
}

/// Up to 20 submissions near a point, nearest first.
#[utoipa::path(
    get,
    path = "/apparel/nearby",
    params(NearbyQuery),
    responses(
        (status = 200, description = "Nearby apparel", body = [ApparelResponse]),
        (status = 400, description = "Invalid coordinates or radius", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tags = ["apparel"],
    operation_id = "nearbyApparel",
    security(("bearerAuth" = []))
)]
#[get("/nearby")]
pub async fn nearby_apparel(
    state: web::Data<HttpState>,
    _caller: AuthenticatedUser,
    query: web::Query<NearbyQuery>,
) -> ApiResult<web::Json<Vec<ApparelResponse>>> {
    let NearbyQuery {
        longitude,
        latitude,
        max_distance,
    } = query.into_inner();
    let center = GeoPoint::new(longitude, latitude).map_err(invalid_geo)?;
    let radius = max_distance
        .map(SearchRadius::new)
        .transpose()
        .map_err(invalid_geo)?;
    let records = state
        .apparel
        .nearby(&NearbySearch::new(center, radius))
        .await?;
    Ok(web::Json(to_responses(records)))
}

/// Register the apparel routes under `/apparel`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/apparel")
            .service(nearby_apparel)
            .service(list_apparel)
            .service(submit_apparel),
    );
}
