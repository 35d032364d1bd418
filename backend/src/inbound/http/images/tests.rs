//! Tests for the image handlers.

use actix_web::http::StatusCode;
use actix_web::http::header;
use actix_web::test as actix_test;
use chrono::Utc;
use rstest::rstest;
use serde_json::json;
use uuid::Uuid;

use crate::domain::{Comment, CommentDraft, Error, Image, ImageUpload, Like, UserId};
use crate::inbound::http::test_utils::{TestPorts, bearer, json_body, sample_user};

fn stored_image(owner: UserId) -> Image {
    Image::create(
        owner,
        &ImageUpload {
            title: Some("sunset".to_owned()),
            content_type: "image/png".to_owned(),
            bytes: vec![137, 80, 78, 71],
        },
        Utc::now(),
    )
}

#[rstest]
#[actix_web::test]
async fn upload_reads_raw_body_and_content_type() {
    let user = sample_user();
    let owner = user.id;
    let mut ports = TestPorts::default().authenticated(&user);
    ports
        .images
        .expect_upload()
        .withf(|_, upload| {
            upload.content_type == "image/png"
                && upload.title.as_deref() == Some("sunset")
                && upload.bytes == [137, 80, 78, 71]
        })
        .returning(move |_, upload| Ok(Image::create(owner, &upload, Utc::now())));
    let app = actix_test::init_service(ports.app()).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/images?title=sunset")
        .insert_header(bearer())
        .insert_header((header::CONTENT_TYPE, "image/png"))
        .set_payload(vec![137_u8, 80, 78, 71])
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["data"]["size_bytes"], json!(4));
    assert_eq!(body["data"]["like_count"], json!(0));
    assert!(body["data"].get("storage_key").is_none());
}

#[rstest]
#[actix_web::test]
async fn content_is_served_with_stored_type() {
    let user = sample_user();
    let image = stored_image(user.id);
    let id = image.id;
    let mut ports = TestPorts::default().authenticated(&user);
    ports
        .images
        .expect_content()
        .withf(move |requested| *requested == id)
        .returning(move |_| Ok((image.clone(), vec![1, 2, 3])));
    let app = actix_test::init_service(ports.app()).await;

    let request = actix_test::TestRequest::get()
        .uri(&format!("/api/v1/images/{id}/content"))
        .insert_header(bearer())
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
        Some("image/png")
    );
    let bytes = actix_test::read_body(response).await;
    assert_eq!(bytes.to_vec(), vec![1_u8, 2, 3]);
}

#[rstest]
#[actix_web::test]
async fn deleting_a_foreign_image_is_forbidden() {
    let user = sample_user();
    let mut ports = TestPorts::default().authenticated(&user);
    ports
        .images
        .expect_delete()
        .returning(|_, _| Err(Error::forbidden("image belongs to another user")));
    let app = actix_test::init_service(ports.app()).await;

    let request = actix_test::TestRequest::delete()
        .uri(&format!("/api/v1/images/{}", Uuid::new_v4()))
        .insert_header(bearer())
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[rstest]
#[case(Ok(()), StatusCode::CREATED)]
#[case(Err(Error::conflict("image already liked")), StatusCode::CONFLICT)]
#[actix_web::test]
async fn like_maps_outcomes(#[case] outcome: Result<(), Error>, #[case] status: StatusCode) {
    let user = sample_user();
    let liker = user.id;
    let mut ports = TestPorts::default().authenticated(&user);
    ports.images.expect_like().returning(move |_, image_id| {
        outcome.clone().map(|()| Like {
            image_id,
            user_id: liker,
            created_at: Utc::now(),
        })
    });
    let app = actix_test::init_service(ports.app()).await;

    let request = actix_test::TestRequest::post()
        .uri(&format!("/api/v1/images/{}/likes", Uuid::new_v4()))
        .insert_header(bearer())
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), status);
}

#[rstest]
#[actix_web::test]
async fn comments_are_listed_with_paging() {
    let user = sample_user();
    let commenter = user.id;
    let image_id = Uuid::new_v4();
    let mut ports = TestPorts::default().authenticated(&user);
    ports
        .images
        .expect_comments()
        .withf(move |id, page| *id == image_id && page.page() == 2 && page.size() == 1)
        .returning(move |id, page| {
            let comment = Comment::create(
                id,
                commenter,
                CommentDraft {
                    text: "lovely".to_owned(),
                },
                Utc::now(),
            );
            Ok(pagination::Page::new(vec![comment], page, 3))
        });
    let app = actix_test::init_service(ports.app()).await;

    let request = actix_test::TestRequest::get()
        .uri(&format!("/api/v1/images/{image_id}/comments?page=2&size=1"))
        .insert_header(bearer())
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["paging"]["total_page"], json!(3));
    assert_eq!(body["data"][0]["text"], json!("lovely"));
}
