//! Integration tests for the admin API endpoint

mod test_utils;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serial_test::serial;
    use tower::util::ServiceExt;

    use crate::test_utils::{TestInbox, body_to_json, test_app};

    /// Tests the admin dump is empty before any scan or submission
    #[tokio::test]
    #[serial]
    async fn it_returns_empty_lists_initially() {
        let (_dir, app) = test_app(Arc::new(TestInbox::default())).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/admin-data")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_to_json(response.into_body()).await;
        assert_eq!(body, serde_json::json!({"payments": [], "submissions": []}));
    }

    /// Tests the admin dump does not trigger a scan
    #[tokio::test]
    #[serial]
    async fn it_does_not_scan_the_inbox() {
        let inbox = Arc::new(TestInbox::default());
        inbox.deliver("m1", "paid via upi", "1700000000000");
        let (_dir, app) = test_app(inbox).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/admin-data")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = body_to_json(response.into_body()).await;
        assert!(body["payments"].as_array().unwrap().is_empty());
    }

    /// Tests unknown paths fall through to the static file service
    #[tokio::test]
    #[serial]
    async fn it_returns_404_for_missing_static_files() {
        let (_dir, app) = test_app(Arc::new(TestInbox::default())).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/does-not-exist.html")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
