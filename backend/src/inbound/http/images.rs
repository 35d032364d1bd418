//! Image, like and comment handlers.
//!
//! Uploads send the raw image as the request body with its `Content-Type`
//! and an optional `?title=` query parameter.
//!
//! ```text
//! POST   /api/v1/images?title=sunset      (body: image bytes)
//! GET    /api/v1/images?page=1
//! GET    /api/v1/images/{id}
//! GET    /api/v1/images/{id}/content
//! DELETE /api/v1/images/{id}
//! POST   /api/v1/images/{id}/likes
//! DELETE /api/v1/images/{id}/likes
//! POST   /api/v1/images/{id}/comments     {"text":"lovely"}
//! GET    /api/v1/images/{id}/comments?page=1
//! ```

use actix_web::http::header::{self, CacheControl, CacheDirective};
use actix_web::{HttpRequest, HttpResponse, delete, get, post, web};
use chrono::{DateTime, Utc};
use pagination::PageRequest;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::image::MAX_IMAGE_BYTES;
use crate::domain::{Comment, CommentDraft, Image, ImageUpload, Like};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::envelope::Envelope;
use crate::inbound::http::schemas::{
    CommentEnvelope, CommentPageEnvelope, EmptyEnvelope, ErrorEnvelope, ImageEnvelope,
    ImagePageEnvelope, LikeEnvelope,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{PageQuery, read_body};

/// Image metadata. The storage key stays server-side.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ImageResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: Option<String>,
    #[schema(example = "image/png")]
    pub content_type: String,
    pub size_bytes: i64,
    pub like_count: i64,
    pub comment_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Image> for ImageResponse {
    fn from(image: Image) -> Self {
        Self {
            id: image.id,
            user_id: *image.user_id.as_uuid(),
            title: image.title,
            content_type: image.content_type,
            size_bytes: image.size_bytes,
            like_count: image.like_count,
            comment_count: image.comment_count,
            created_at: image.created_at,
            updated_at: image.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LikeResponse {
    pub image_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<Like> for LikeResponse {
    fn from(like: Like) -> Self {
        Self {
            image_id: like.image_id,
            user_id: *like.user_id.as_uuid(),
            created_at: like.created_at,
        }
    }
}

/// Comment body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CommentRequest {
    #[schema(example = "lovely light")]
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CommentResponse {
    pub id: Uuid,
    pub image_id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            image_id: comment.image_id,
            user_id: *comment.user_id.as_uuid(),
            text: comment.text,
            created_at: comment.created_at,
        }
    }
}

/// Optional upload metadata.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UploadQuery {
    #[param(example = "sunset")]
    pub title: Option<String>,
}

fn content_type_of(req: &HttpRequest) -> String {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|value| value.trim().to_ascii_lowercase())
        .unwrap_or_default()
}

/// Upload an image.
#[utoipa::path(
    post,
    path = "/api/v1/images",
    params(UploadQuery),
    request_body(content = Vec<u8>, content_type = "image/*", description = "Raw image bytes"),
    responses(
        (status = 201, description = "Image stored", body = ImageEnvelope),
        (status = 400, description = "Invalid upload", body = ErrorEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope)
    ),
    tags = ["images"],
    operation_id = "uploadImage"
)]
#[post("/images")]
pub async fn upload_image(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    req: HttpRequest,
    query: web::Query<UploadQuery>,
    body: web::Payload,
) -> ApiResult<HttpResponse> {
    let upload = ImageUpload {
        title: query.into_inner().title,
        content_type: content_type_of(&req),
        bytes: read_body(body, MAX_IMAGE_BYTES).await?,
    };
    let image = state.images.upload(user.id(), upload).await?;
    Ok(HttpResponse::Created().json(Envelope::data(ImageResponse::from(image))))
}

/// List the caller's images.
#[utoipa::path(
    get,
    path = "/api/v1/images",
    params(PageQuery),
    responses(
        (status = 200, description = "Images", body = ImagePageEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope)
    ),
    tags = ["images"],
    operation_id = "listImages"
)]
#[get("/images")]
pub async fn list_images(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<Envelope<Vec<ImageResponse>>>> {
    let page = PageRequest::try_from(query.into_inner())?;
    let found = state.images.list(user.id(), page).await?;
    Ok(web::Json(Envelope::page(found.map(ImageResponse::from))))
}

/// Fetch image metadata.
#[utoipa::path(
    get,
    path = "/api/v1/images/{id}",
    params(("id" = Uuid, Path, description = "Image id")),
    responses(
        (status = 200, description = "Image", body = ImageEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
        (status = 404, description = "Not found", body = ErrorEnvelope)
    ),
    tags = ["images"],
    operation_id = "getImage"
)]
#[get("/images/{id}")]
pub async fn get_image(
    state: web::Data<HttpState>,
    _user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<Envelope<ImageResponse>>> {
    let image = state.images.get(path.into_inner()).await?;
    Ok(web::Json(Envelope::data(image.into())))
}

/// Stream the stored bytes with their original content type.
#[utoipa::path(
    get,
    path = "/api/v1/images/{id}/content",
    params(("id" = Uuid, Path, description = "Image id")),
    responses(
        (status = 200, description = "Image bytes", content_type = "image/*", body = Vec<u8>),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
        (status = 404, description = "Not found", body = ErrorEnvelope)
    ),
    tags = ["images"],
    operation_id = "getImageContent"
)]
#[get("/images/{id}/content")]
pub async fn image_content(
    state: web::Data<HttpState>,
    _user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let (image, bytes) = state.images.content(path.into_inner()).await?;
    Ok(HttpResponse::Ok()
        .content_type(image.content_type)
        .insert_header(CacheControl(vec![
            CacheDirective::Private,
            CacheDirective::MaxAge(3600),
        ]))
        .body(bytes))
}

/// Delete an image the caller owns.
#[utoipa::path(
    delete,
    path = "/api/v1/images/{id}",
    params(("id" = Uuid, Path, description = "Image id")),
    responses(
        (status = 200, description = "Deleted", body = EmptyEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
        (status = 403, description = "Owned by another user", body = ErrorEnvelope),
        (status = 404, description = "Not found", body = ErrorEnvelope)
    ),
    tags = ["images"],
    operation_id = "deleteImage"
)]
#[delete("/images/{id}")]
pub async fn delete_image(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<Envelope<()>>> {
    state.images.delete(user.id(), path.into_inner()).await?;
    Ok(web::Json(Envelope::empty()))
}

/// Like an image.
#[utoipa::path(
    post,
    path = "/api/v1/images/{id}/likes",
    params(("id" = Uuid, Path, description = "Image id")),
    responses(
        (status = 201, description = "Liked", body = LikeEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
        (status = 404, description = "Not found", body = ErrorEnvelope),
        (status = 409, description = "Already liked", body = ErrorEnvelope)
    ),
    tags = ["images"],
    operation_id = "likeImage"
)]
#[post("/images/{id}/likes")]
pub async fn like_image(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let like = state.images.like(user.id(), path.into_inner()).await?;
    Ok(HttpResponse::Created().json(Envelope::data(LikeResponse::from(like))))
}

/// Remove the caller's like.
#[utoipa::path(
    delete,
    path = "/api/v1/images/{id}/likes",
    params(("id" = Uuid, Path, description = "Image id")),
    responses(
        (status = 200, description = "Like removed", body = EmptyEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
        (status = 404, description = "Not liked", body = ErrorEnvelope)
    ),
    tags = ["images"],
    operation_id = "unlikeImage"
)]
#[delete("/images/{id}/likes")]
pub async fn unlike_image(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<Envelope<()>>> {
    state.images.unlike(user.id(), path.into_inner()).await?;
    Ok(web::Json(Envelope::empty()))
}

/// Comment on an image.
#[utoipa::path(
    post,
    path = "/api/v1/images/{id}/comments",
    params(("id" = Uuid, Path, description = "Image id")),
    request_body = CommentRequest,
    responses(
        (status = 201, description = "Comment added", body = CommentEnvelope),
        (status = 400, description = "Invalid request", body = ErrorEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
        (status = 404, description = "Not found", body = ErrorEnvelope)
    ),
    tags = ["images"],
    operation_id = "commentImage"
)]
#[post("/images/{id}/comments")]
pub async fn comment_image(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    payload: web::Json<CommentRequest>,
) -> ApiResult<HttpResponse> {
    let draft = CommentDraft {
        text: payload.into_inner().text,
    };
    let comment = state
        .images
        .comment(user.id(), path.into_inner(), draft)
        .await?;
    Ok(HttpResponse::Created().json(Envelope::data(CommentResponse::from(comment))))
}

/// List comments on an image, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/images/{id}/comments",
    params(("id" = Uuid, Path, description = "Image id"), PageQuery),
    responses(
        (status = 200, description = "Comments", body = CommentPageEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
        (status = 404, description = "Not found", body = ErrorEnvelope)
    ),
    tags = ["images"],
    operation_id = "listImageComments"
)]
#[get("/images/{id}/comments")]
pub async fn list_comments(
    state: web::Data<HttpState>,
    _user: AuthenticatedUser,
    path: web::Path<Uuid>,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<Envelope<Vec<CommentResponse>>>> {
    let page = PageRequest::try_from(query.into_inner())?;
    let found = state.images.comments(path.into_inner(), page).await?;
    Ok(web::Json(Envelope::page(found.map(CommentResponse::from))))
}

#[cfg(test)]
mod tests;
