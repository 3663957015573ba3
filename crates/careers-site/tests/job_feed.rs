//! Job feed behavior through the public Greenhouse client, backed by an
//! in-memory gateway so no scenario touches the network.

use std::sync::Arc;

use careers_site::careers::{normalize_department, FeedError, GreenhouseClient, ALL_DEPARTMENTS};
use careers_site::http::{StaticGateway, UpstreamError};
use serde_json::{json, Value};

const BOARD: &str = "https://boards.example.test/v1/boards/Acme/jobs";

fn job(id: u64, title: &str, department: &str, skills: Value) -> Value {
    json!({
        "id": id,
        "title": title,
        "absolute_url": format!("https://boards.example.test/acme/jobs/{id}"),
        "location": {"name": "Home based"},
        "content": "&lt;p&gt;Join us&lt;/p&gt;",
        "metadata": [
            {"name": "Employment", "value": "Full-time"},
            {"name": "Date", "value": "2024-05-01"},
            {"name": "Department", "value": department},
            {"name": "Management", "value": "Individual contributor"},
            {"name": "Office", "value": "Remote"},
            {"name": "Core Skills", "value": skills}
        ]
    })
}

fn feed() -> Value {
    json!({
        "jobs": [
            job(101, "Kernel Engineer", "Engineering", json!(["C", "Linux"])),
            job(102, "Account Executive", "Sales", json!("Negotiation, Linux")),
            job(103, "Web Developer", "Web-Design", json!(["JavaScript"])),
            job(104, "Release Engineer", "Engineering", Value::Null)
        ]
    })
}

fn client_with(gateway: StaticGateway) -> GreenhouseClient {
    GreenhouseClient::new(Arc::new(gateway), BOARD)
}

fn client() -> GreenhouseClient {
    client_with(StaticGateway::new().with_json(format!("{BOARD}?content=true"), feed()))
}

fn ids(vacancies: &[careers_site::careers::Vacancy]) -> Vec<u64> {
    vacancies.iter().map(|vacancy| vacancy.id).collect()
}

#[tokio::test]
async fn all_departments_returns_every_job_in_feed_order() {
    let vacancies = client()
        .list_vacancies(ALL_DEPARTMENTS)
        .await
        .expect("feed loads");
    assert_eq!(ids(&vacancies), [101, 102, 103, 104]);

    let upper = client().list_vacancies("ALL").await.expect("feed loads");
    assert_eq!(ids(&upper), [101, 102, 103, 104]);
}

#[tokio::test]
async fn department_filter_ignores_case_hyphens_and_spaces() {
    let client = client();

    let engineering = client.list_vacancies("engineering").await.expect("feed loads");
    assert_eq!(ids(&engineering), [101, 104]);
    assert!(engineering
        .iter()
        .all(|vacancy| normalize_department(&vacancy.department) == "engineering"));

    let web = client.list_vacancies("web design").await.expect("feed loads");
    assert_eq!(ids(&web), [103]);

    let none = client.list_vacancies("legal").await.expect("feed loads");
    assert!(none.is_empty());
}

#[tokio::test]
async fn skill_search_returns_each_matching_job_once() {
    let vacancies = client()
        .list_vacancies_by_skills(&["linux", "c", "LINUX"])
        .await
        .expect("feed loads");
    assert_eq!(ids(&vacancies), [101, 102]);

    let java = client()
        .list_vacancies_by_skills(&["java"])
        .await
        .expect("feed loads");
    assert!(java.is_empty());
}

#[tokio::test]
async fn departments_are_unique_and_sorted() {
    let departments = client().list_departments().await.expect("feed loads");
    let names: Vec<&str> = departments
        .iter()
        .map(|department| department.name.as_str())
        .collect();
    assert_eq!(names, ["Engineering", "Sales", "Web-Design"]);
    assert_eq!(departments[2].slug, "web-design");
}

#[tokio::test]
async fn single_job_is_unescaped_and_unknown_ids_are_not_found() {
    let gateway = StaticGateway::new().with_json(
        format!("{BOARD}/101"),
        job(101, "Kernel Engineer", "Engineering", Value::Null),
    );
    let client = client_with(gateway);

    let detail = client.get_vacancy(101).await.expect("job loads");
    assert_eq!(detail.content, "<p>Join us</p>");
    assert_eq!(detail.department, "Engineering");

    let missing = client.get_vacancy(999).await.expect_err("unknown job");
    assert!(missing.is_not_found());
}

#[tokio::test]
async fn unavailable_upstream_is_not_mistaken_for_missing_job() {
    let gateway = StaticGateway::new().with_failure(
        format!("{BOARD}/101"),
        UpstreamError::Transport {
            url: format!("{BOARD}/101"),
            message: "connection refused".to_string(),
        },
    );

    let err = client_with(gateway)
        .get_vacancy(101)
        .await
        .expect_err("upstream down");
    assert!(!err.is_not_found());
    assert!(matches!(err, FeedError::Upstream(_)));
}

#[tokio::test]
async fn jobs_without_required_metadata_fail_the_feed() {
    let mut broken = job(105, "Designer", "Design", Value::Null);
    broken["metadata"] = json!([{"name": "Department", "value": "Design"}]);
    let gateway = StaticGateway::new()
        .with_json(format!("{BOARD}?content=true"), json!({"jobs": [broken]}));

    let err = client_with(gateway)
        .list_vacancies(ALL_DEPARTMENTS)
        .await
        .expect_err("metadata missing");
    assert!(matches!(
        err,
        FeedError::MissingMetadata {
            job_id: 105,
            field: "Employment"
        }
    ));
}

#[tokio::test]
async fn job_content_is_stripped_of_scripts() {
    let mut hostile = job(106, "Support Engineer", "Support", Value::Null);
    hostile["content"] =
        json!("&lt;p&gt;Hello&lt;/p&gt;&lt;script&gt;document.cookie&lt;/script&gt;&lt;img src=x onerror=alert(1)&gt;");
    let gateway = StaticGateway::new().with_json(format!("{BOARD}/106"), hostile);

    let detail = client_with(gateway)
        .get_vacancy(106)
        .await
        .expect("job loads");
    assert!(detail.content.starts_with("<p>Hello</p>"));
    assert!(!detail.content.contains("<script"));
    assert!(!detail.content.contains("document.cookie"));
    assert!(!detail.content.contains("onerror"));
}
