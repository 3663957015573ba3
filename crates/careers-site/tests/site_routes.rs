//! HTTP-level scenarios for the careers and partners pages, dispatched through
//! the router with an in-memory gateway standing in for Greenhouse and the
//! partners service.

mod common {
    use std::path::PathBuf;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, Response, StatusCode};
    use careers_site::config::{GreenhouseConfig, PartnersConfig};
    use careers_site::http::StaticGateway;
    use careers_site::{site_router, SiteState};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    pub(super) const BOARD: &str = "https://boards.example.test/v1/boards/Acme/jobs";
    pub(super) const PARTNERS: &str = "https://partners.example.test/partners.json";
    pub(super) const BOUNDARY: &str = "careers-site-boundary";

    pub(super) fn job(id: u64, title: &str, department: &str) -> Value {
        json!({
            "id": id,
            "title": title,
            "absolute_url": format!("https://boards.example.test/acme/jobs/{id}"),
            "location": {"name": "Home based"},
            "content": "&lt;p&gt;About the role&lt;/p&gt;",
            "metadata": [
                {"name": "Employment", "value": "Full-time"},
                {"name": "Date", "value": "2024-05-01"},
                {"name": "Department", "value": department},
                {"name": "Management", "value": "Individual contributor"},
                {"name": "Office", "value": "Remote"},
                {"name": "Core Skills", "value": ["Rust", "Linux"]}
            ]
        })
    }

    pub(super) fn with_feed(gateway: StaticGateway) -> StaticGateway {
        gateway.with_json(
            format!("{BOARD}?content=true"),
            json!({
                "jobs": [
                    job(101, "Kernel Engineer", "Engineering"),
                    job(202, "Account Executive", "Sales")
                ]
            }),
        )
    }

    pub(super) fn greenhouse() -> GreenhouseConfig {
        GreenhouseConfig {
            board_url: BOARD.to_string(),
            api_key: "secret".to_string(),
            default_job_id: "1383152".to_string(),
            forward_cover_letter: false,
        }
    }

    fn state(gateway: Arc<StaticGateway>, templates_dir: PathBuf) -> SiteState {
        SiteState::new(
            gateway,
            &greenhouse(),
            &PartnersConfig {
                api_url: PARTNERS.to_string(),
            },
            templates_dir,
        )
    }

    pub(super) fn router(gateway: Arc<StaticGateway>, templates_dir: PathBuf) -> axum::Router {
        site_router(Arc::new(state(gateway, templates_dir)))
    }

    pub(super) fn router_with_upload_limit(
        gateway: Arc<StaticGateway>,
        bytes: usize,
    ) -> axum::Router {
        site_router(Arc::new(
            state(gateway, no_templates()).with_upload_limit(bytes),
        ))
    }

    pub(super) fn no_templates() -> PathBuf {
        std::env::temp_dir().join("careers-site-no-templates")
    }

    pub(super) async fn get(router: axum::Router, uri: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .expect("request");
        read(router.oneshot(request).await.expect("router dispatch")).await
    }

    pub(super) async fn post_form(
        router: axum::Router,
        uri: &str,
        fields: &[(&str, &str)],
        resume: Option<(&str, &[u8])>,
    ) -> (StatusCode, String) {
        let mut body: Vec<u8> = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((filename, content)) = resume {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"resume\"; filename=\"{filename}\"\r\nContent-Type: application/pdf\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("request");
        read(router.oneshot(request).await.expect("router dispatch")).await
    }

    async fn read(response: Response<Body>) -> (StatusCode, String) {
        let status = response.status();
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        (status, String::from_utf8(body.to_vec()).expect("utf-8 page"))
    }

    pub(super) const APPLICANT: [(&str, &str); 5] = [
        ("first_name", "Ada"),
        ("last_name", "Lovelace"),
        ("email", "ada@example.test"),
        ("phone", "+44 1234"),
        ("location", "London"),
    ];
}

mod careers_pages {
    use super::common::*;
    use careers_site::http::{StaticGateway, UpstreamError};
    use std::sync::Arc;

    #[tokio::test]
    async fn department_page_lists_matching_roles_with_navigation() {
        let gateway = Arc::new(with_feed(StaticGateway::new()));
        let (status, page) = get(router(gateway, no_templates()), "/careers/engineering").await;

        assert_eq!(status.as_u16(), 200);
        assert!(page.contains("Kernel Engineer"));
        assert!(!page.contains("Account Executive"));
        assert!(page.contains("Sales (1)"));
        assert!(page.contains("<li class=\"is-active\"><a href=\"/careers/engineering\">"));
    }

    #[tokio::test]
    async fn all_departments_page_lists_every_role() {
        let gateway = Arc::new(with_feed(StaticGateway::new()));
        let (status, page) = get(router(gateway, no_templates()), "/careers/all").await;

        assert_eq!(status.as_u16(), 200);
        assert!(page.contains("Kernel Engineer"));
        assert!(page.contains("Account Executive"));
    }

    #[tokio::test]
    async fn unknown_department_is_not_found() {
        let gateway = Arc::new(with_feed(StaticGateway::new()));
        let (status, page) = get(router(gateway, no_templates()), "/careers/astronauts").await;

        assert_eq!(status.as_u16(), 404);
        assert!(page.contains("404: Page not found"));
    }

    #[tokio::test]
    async fn results_page_filters_by_core_skills() {
        let gateway = Arc::new(with_feed(StaticGateway::new()));
        let (status, page) = get(
            router(gateway.clone(), no_templates()),
            "/careers/results?coreSkills=rust,go",
        )
        .await;
        assert_eq!(status.as_u16(), 200);
        assert!(page.contains("Kernel Engineer"));
        assert!(page.contains("<h2>Engineering</h2>"));

        let (_, empty) = get(router(gateway, no_templates()), "/careers/results").await;
        assert!(empty.contains("There are no roles matching your selection."));
    }

    #[tokio::test]
    async fn job_page_renders_unescaped_content() {
        let gateway = Arc::new(with_feed(
            StaticGateway::new().with_json(format!("{BOARD}/101"), job(101, "Kernel Engineer", "Engineering")),
        ));
        let (status, page) = get(
            router(gateway, no_templates()),
            "/careers/101/kernel-engineer",
        )
        .await;

        assert_eq!(status.as_u16(), 200);
        assert!(page.contains("<h1>Kernel Engineer</h1>"));
        assert!(page.contains("<p>About the role</p>"));
    }

    #[tokio::test]
    async fn unknown_job_is_404_but_unavailable_feed_is_502() {
        let gateway = Arc::new(with_feed(StaticGateway::new()));
        let (status, _) = get(router(gateway, no_templates()), "/careers/999").await;
        assert_eq!(status.as_u16(), 404);

        let down = Arc::new(StaticGateway::new().with_failure(
            format!("{BOARD}/101"),
            UpstreamError::Status {
                url: format!("{BOARD}/101"),
                status: 503,
            },
        ));
        let (status, page) = get(router(down, no_templates()), "/careers/101").await;
        assert_eq!(status.as_u16(), 502);
        assert!(page.contains("responded with status 503"));
    }

    #[tokio::test]
    async fn templated_pages_are_served_from_disk() {
        let dir = std::env::temp_dir().join(format!("careers-site-pages-{}", std::process::id()));
        std::fs::create_dir_all(dir.join("careers")).expect("create templates dir");
        std::fs::write(dir.join("careers").join("benefits.html"), "<p>Great benefits</p>")
            .expect("write careers page");
        std::fs::write(dir.join("about.html"), "<p>About us</p>").expect("write page");
        let gateway = Arc::new(with_feed(StaticGateway::new()));

        let (status, page) = get(router(gateway.clone(), dir.clone()), "/careers/benefits").await;
        assert_eq!(status.as_u16(), 200);
        assert!(page.contains("<p>Great benefits</p>"));

        let (status, page) = get(router(gateway.clone(), dir.clone()), "/about").await;
        assert_eq!(status.as_u16(), 200);
        assert!(page.contains("<p>About us</p>"));

        let (status, _) = get(router(gateway, dir.clone()), "/missing").await;
        assert_eq!(status.as_u16(), 404);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn nested_and_thank_you_pages_fall_back_to_templates() {
        let dir = std::env::temp_dir().join(format!("careers-site-nested-{}", std::process::id()));
        std::fs::create_dir_all(dir.join("careers").join("life")).expect("create templates dir");
        std::fs::write(dir.join("careers").join("thank-you.html"), "<p>Thanks for applying</p>")
            .expect("write thank-you page");
        std::fs::write(
            dir.join("careers").join("life").join("teams.html"),
            "<p>Our teams</p>",
        )
        .expect("write nested page");
        let gateway = Arc::new(with_feed(StaticGateway::new()));

        let (status, page) =
            get(router(gateway.clone(), dir.clone()), "/careers/thank-you").await;
        assert_eq!(status.as_u16(), 200);
        assert!(page.contains("<p>Thanks for applying</p>"));

        let (status, page) = get(router(gateway.clone(), dir.clone()), "/careers/life/teams").await;
        assert_eq!(status.as_u16(), 200);
        assert!(page.contains("<p>Our teams</p>"));

        let (status, _) = get(router(gateway.clone(), dir.clone()), "/careers/life/missing").await;
        assert_eq!(status.as_u16(), 404);
        assert!(gateway.posts().is_empty());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn crafted_all_segment_cannot_break_out_of_attributes() {
        let gateway = Arc::new(with_feed(StaticGateway::new()));
        let (status, page) = get(
            router(gateway, no_templates()),
            "/careers/%22%3E%3Ca%3Ell%3C!--",
        )
        .await;

        assert_eq!(status.as_u16(), 200);
        assert!(page.contains("action=\"/careers/all\""));
        assert!(!page.contains("<a>ll"));
        assert!(!page.contains("<!--"));
    }
}

mod applications {
    use super::common::*;
    use careers_site::http::{StaticGateway, UpstreamError};
    use std::sync::Arc;

    #[tokio::test]
    async fn batch_reports_each_role_in_order() {
        let gateway = Arc::new(
            StaticGateway::new()
                .with_post_status(format!("{BOARD}/101"), 200)
                .with_post_status(format!("{BOARD}/202"), 422),
        );
        let mut fields = APPLICANT.to_vec();
        fields.push(("applicationJobIdList", "101,202"));
        fields.push(("applicationJobTitleList", "Kernel Engineer,Account Executive"));
        fields.push(("favourite_colour", "green"));

        let (status, page) = post_form(
            router(gateway.clone(), no_templates()),
            "/careers/thank-you",
            &fields,
            Some(("cv.pdf", &b"%PDF-1.4"[..])),
        )
        .await;

        assert_eq!(status.as_u16(), 200);
        let success = page.find("<h5>Kernel Engineer</h5>").expect("first role reported");
        let failure = page
            .find("<h5>Account Executive</h5>")
            .expect("second role reported");
        assert!(success < failure);
        assert!(page.contains("Error 422: Unprocessable Entity. Please try again!"));

        let posts = gateway.posts();
        assert_eq!(posts.len(), 2);
        let body = posts[0].body.as_ref().expect("json body");
        assert_eq!(body["first_name"], "Ada");
        assert_eq!(body["resume_content"], "JVBERi0xLjQ=");
        assert_eq!(body["resume_content_filename"], "cv.pdf");
        assert!(body.get("favourite_colour").is_none());
        assert_eq!(posts[0].authorization.as_deref(), Some("Basic c2VjcmV0Og=="));
    }

    #[tokio::test]
    async fn failure_on_first_role_does_not_stop_the_second() {
        let gateway = Arc::new(StaticGateway::new().with_post_failure(
            format!("{BOARD}/101"),
            UpstreamError::Transport {
                url: format!("{BOARD}/101"),
                message: "connection reset".to_string(),
            },
        ));
        let mut fields = APPLICANT.to_vec();
        fields.push(("applicationJobIdList", "101,202"));
        fields.push(("applicationJobTitleList", "Kernel Engineer,Account Executive"));

        let (status, page) = post_form(
            router(gateway.clone(), no_templates()),
            "/careers/thank-you",
            &fields,
            Some(("cv.pdf", &b"%PDF"[..])),
        )
        .await;

        assert_eq!(status.as_u16(), 200);
        assert!(page.contains("Error 502"));
        assert!(page.contains("Your application has been successfully submitted. Thank you!"));
        let urls: Vec<String> = gateway.posts().into_iter().map(|post| post.url).collect();
        assert_eq!(urls, [format!("{BOARD}/101"), format!("{BOARD}/202")]);
    }

    #[tokio::test]
    async fn multi_megabyte_resume_is_relayed() {
        let gateway = Arc::new(StaticGateway::new());
        let resume = vec![b'%'; 3 * 1024 * 1024];
        let mut fields = APPLICANT.to_vec();
        fields.push(("applicationJobIdList", "101"));
        fields.push(("applicationJobTitleList", "Kernel Engineer"));

        let (status, page) = post_form(
            router(gateway.clone(), no_templates()),
            "/careers/thank-you",
            &fields,
            Some(("cv.pdf", resume.as_slice())),
        )
        .await;

        assert_eq!(status.as_u16(), 200);
        assert!(page.contains("Your application has been successfully submitted. Thank you!"));
        let posts = gateway.posts();
        assert_eq!(posts.len(), 1);
        let body = posts[0].body.as_ref().expect("json body");
        let encoded = body["resume_content"].as_str().expect("base64 resume");
        assert_eq!(encoded.len(), 4 * resume.len().div_ceil(3));
    }

    #[tokio::test]
    async fn resume_over_upload_limit_is_payload_too_large() {
        let gateway = Arc::new(StaticGateway::new());
        let resume = vec![b'%'; 2 * 1024 * 1024];
        let mut fields = APPLICANT.to_vec();
        fields.push(("applicationJobIdList", "101"));

        let (status, _) = post_form(
            router_with_upload_limit(gateway.clone(), 1024 * 1024),
            "/careers/thank-you",
            &fields,
            Some(("cv.pdf", resume.as_slice())),
        )
        .await;

        assert_eq!(status.as_u16(), 413);
        assert!(gateway.posts().is_empty());
    }

    #[tokio::test]
    async fn missing_resume_is_rejected_before_any_upstream_call() {
        let gateway = Arc::new(StaticGateway::new());
        let mut fields = APPLICANT.to_vec();
        fields.push(("applicationJobIdList", "101"));

        let (status, page) = post_form(
            router(gateway.clone(), no_templates()),
            "/careers/thank-you",
            &fields,
            None,
        )
        .await;

        assert_eq!(status.as_u16(), 422);
        assert!(page.contains("A resume is required"));
        assert!(gateway.posts().is_empty());
    }

    #[tokio::test]
    async fn department_page_application_goes_to_general_job() {
        let gateway = Arc::new(with_feed(StaticGateway::new()));
        let (status, page) = post_form(
            router(gateway.clone(), no_templates()),
            "/careers/sales",
            &APPLICANT,
            Some(("cv.pdf", &b"%PDF"[..])),
        )
        .await;

        assert_eq!(status.as_u16(), 200);
        assert!(page.contains("p-notification--positive"));
        let posts = gateway.posts();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].url, format!("{BOARD}/1383152"));
    }

    #[tokio::test]
    async fn job_page_shows_upstream_rejection_inline() {
        let gateway = Arc::new(with_feed(
            StaticGateway::new()
                .with_json(format!("{BOARD}/101"), job(101, "Kernel Engineer", "Engineering"))
                .with_post_status(format!("{BOARD}/101"), 401),
        ));
        let (status, page) = post_form(
            router(gateway, no_templates()),
            "/careers/101",
            &APPLICANT,
            Some(("cv.pdf", &b"%PDF"[..])),
        )
        .await;

        assert_eq!(status.as_u16(), 200);
        assert!(page.contains("<h5>Error 401</h5>"));
        assert!(page.contains("Unauthorized. Please try again!"));
    }
}

mod partner_pages {
    use super::common::*;
    use careers_site::http::StaticGateway;
    use careers_site::partners::PartnerCategory;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn category_page_lists_partners() {
        let gateway = Arc::new(StaticGateway::new().with_json(
            format!("{PARTNERS}{}", PartnerCategory::PublicCloud.query()),
            json!([{"name": "Cloudy", "short_description": "**Fast** clouds"}]),
        ));
        let (status, page) = get(router(gateway, no_templates()), "/partners/public-cloud").await;

        assert_eq!(status.as_u16(), 200);
        assert!(page.contains("Public cloud partners"));
        assert!(page.contains("<strong>Fast</strong>"));
    }

    #[tokio::test]
    async fn partner_descriptions_lose_scripts() {
        let gateway = Arc::new(StaticGateway::new().with_json(
            format!("{PARTNERS}{}", PartnerCategory::PublicCloud.query()),
            json!([{
                "name": "Cloudy",
                "short_description": "**Fast** clouds <script>alert(1)</script>"
            }]),
        ));
        let (status, page) = get(router(gateway, no_templates()), "/partners/public-cloud").await;

        assert_eq!(status.as_u16(), 200);
        assert!(page.contains("<strong>Fast</strong>"));
        assert!(!page.contains("<script>"));
        assert!(!page.contains("alert(1)"));
    }

    #[tokio::test]
    async fn unknown_category_is_404_without_upstream_call() {
        let gateway = Arc::new(StaticGateway::new());
        let (status, _) = get(router(gateway.clone(), no_templates()), "/partners/mainframe").await;

        assert_eq!(status.as_u16(), 404);
        assert!(gateway.requests().is_empty());
    }

    #[tokio::test]
    async fn find_a_partner_sorts_by_name() {
        let gateway = Arc::new(StaticGateway::new().with_json(
            PARTNERS,
            json!([{"name": "Zenith"}, {"name": "Acme"}]),
        ));
        let (status, page) = get(router(gateway, no_templates()), "/partners/find-a-partner").await;

        assert_eq!(status.as_u16(), 200);
        let acme = page.find("Acme").expect("Acme listed");
        let zenith = page.find("Zenith").expect("Zenith listed");
        assert!(acme < zenith);
    }
}
