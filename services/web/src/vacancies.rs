use careers_site::careers::{GreenhouseClient, Vacancy, ALL_DEPARTMENTS};
use careers_site::config::AppConfig;
use careers_site::error::AppError;
use careers_site::http::ReqwestGateway;
use careers_site::telemetry;
use clap::Args;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct VacanciesArgs {
    /// Only list roles in this department (slug or name). Defaults to all.
    #[arg(long)]
    pub(crate) department: Option<String>,
    /// Comma-separated core skills; lists roles tagged with any of them.
    #[arg(long, value_delimiter = ',', conflicts_with = "department")]
    pub(crate) skills: Vec<String>,
    /// Print the matching vacancies as JSON instead of a table.
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) async fn run_vacancies(args: VacanciesArgs) -> Result<(), AppError> {
    // Listing reads the public board; no API key is needed.
    let config = AppConfig::load_read_only()?;
    telemetry::init(&config.telemetry)?;

    let gateway = Arc::new(ReqwestGateway::new(&config.upstream)?);
    let client = GreenhouseClient::new(gateway, config.greenhouse.board_url.clone());

    let skills: Vec<String> = args
        .skills
        .iter()
        .map(|skill| skill.trim().to_string())
        .filter(|skill| !skill.is_empty())
        .collect();
    let vacancies = if skills.is_empty() {
        let department = args.department.as_deref().unwrap_or(ALL_DEPARTMENTS);
        client.list_vacancies(department).await?
    } else {
        client.list_vacancies_by_skills(skills.as_slice()).await?
    };

    if args.json {
        match serde_json::to_string_pretty(&vacancies) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("Vacancy payload unavailable: {err}"),
        }
        return Ok(());
    }

    render_vacancies(&vacancies);
    Ok(())
}

fn render_vacancies(vacancies: &[Vacancy]) {
    if vacancies.is_empty() {
        println!("No open roles match this query.");
        return;
    }

    println!("{} open roles", vacancies.len());
    let mut department = "";
    for vacancy in vacancies {
        if vacancy.department != department {
            department = &vacancy.department;
            println!("\n{department}");
        }
        println!(
            "  - [{}] {} | {} | {}",
            vacancy.id, vacancy.title, vacancy.location, vacancy.employment
        );
    }
}
