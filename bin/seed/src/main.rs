//! # Seed
//!
//! Mints a bearer token for a user so the API can be exercised without an
//! external identity provider. The salt must match the server's `AUTH_SALT`.
//!
//! Usage: `seed [user-uuid]` — with no argument a fresh user ID is generated.

use anyhow::Context;
use ri_auth_simple::SimpleAuthProvider;
use ri_core::traits::AuthProvider;
use uuid::Uuid;

fn parse_user_id(arg: Option<&str>) -> anyhow::Result<Uuid> {
    match arg {
        Some(raw) => Uuid::parse_str(raw).with_context(|| format!("'{raw}' is not a UUID")),
        None => Ok(Uuid::now_v7()),
    }
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let salt = std::env::var("AUTH_SALT").unwrap_or_else(|_| "dev-salt".to_string());

    let args: Vec<String> = std::env::args().skip(1).collect();
    let user_id = parse_user_id(args.first().map(String::as_str))?;

    let auth = SimpleAuthProvider::new(&salt);
    println!("user:  {user_id}");
    println!("token: {}", auth.issue_token(user_id));
    Ok(())
}
