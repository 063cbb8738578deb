mod cli;
mod decision;
mod infra;
mod routes;
mod server;

use checkout_decision::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
