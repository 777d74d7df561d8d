mod cli;
mod grade;
mod infra;
mod routes;
mod server;

use assignment_grader::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
