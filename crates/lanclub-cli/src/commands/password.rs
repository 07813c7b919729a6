//! Password hashing helper for operator credentials.

use clap::Args;

use lanclub_core::error::AppError;
use lanclub_service::PasswordHasher;

use crate::output;

/// Arguments for the hash-password command
#[derive(Debug, Args)]
pub struct HashPasswordArgs {
    /// Password to hash (will prompt if not provided)
    #[arg(short, long)]
    pub password: Option<String>,
}

/// Print an Argon2 hash suitable for `admin.password_hash`.
pub fn execute(args: &HashPasswordArgs) -> Result<(), AppError> {
    let password = super::prompt_password(args.password.as_ref(), "Admin password", true)?;
    let hash = PasswordHasher::new().hash_password(&password)?;
    println!("{hash}");
    output::print_success("Set this value as admin.password_hash (or LANCLUB__ADMIN__PASSWORD_HASH)");
    Ok(())
}
