use crate::config::toml_config::{GraderConfig, PoolsConfig, UpdateConfig};
use crate::core::pipeline::UpdatePolicy;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "pool-grader")]
#[command(about = "Recompute a pool project's final mark from its validated modules")]
pub struct CliArgs {
    /// Intranet login or id of the user
    pub user_id: String,

    /// Id of any module of the pool
    pub project_id: String,

    /// Path to TOML configuration file
    #[arg(short, long, default_value = "grader.toml")]
    pub config: String,

    /// Override the pool list path from config
    #[arg(long)]
    pub pool_list: Option<String>,

    /// Override the update policy from config
    #[arg(long, value_enum)]
    pub policy: Option<UpdatePolicy>,

    /// Compute the mark but do not write it
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliArgs {
    /// 應用命令列覆蓋設定
    pub fn apply_overrides(&self, config: &mut GraderConfig) {
        if let Some(path) = &self.pool_list {
            config.pools = Some(PoolsConfig { path: path.clone() });
        }

        let update = config.update.get_or_insert(UpdateConfig {
            policy: None,
            dry_run: None,
        });
        if let Some(policy) = self.policy {
            update.policy = Some(policy);
        }
        if self.dry_run {
            update.dry_run = Some(true);
        }
    }
}
