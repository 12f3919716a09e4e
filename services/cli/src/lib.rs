mod cli;
mod commands;
mod infra;

use b2g_match::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
