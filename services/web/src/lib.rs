mod cli;
mod infra;
mod routes;
mod server;
mod vacancies;

use careers_site::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
