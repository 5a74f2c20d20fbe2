//! layered-config: resolve layered configuration and drive its consumers
//!
//! Merges a base configuration with an environment-specific override and uses
//! the result to configure logging and migrate the sample database.

use anyhow::Result;

fn main() -> Result<()> {
    layered_config::cli::run()
}
