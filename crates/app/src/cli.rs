use clap::Parser;

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Start without applying database migrations.
    #[arg(long, default_value_t = false, conflicts_with = "migrate_only")]
    pub skip_migrations: bool,
    /// Apply database migrations and exit.
    #[arg(long, default_value_t = false)]
    pub migrate_only: bool,
}
