mod cli;
mod infra;
mod report;
mod routes;
mod server;

use agro_potential::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
