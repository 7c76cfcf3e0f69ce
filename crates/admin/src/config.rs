//! Command line and environment configuration for `hris-admin`.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `HRIS_TENANT_DATABASE` | hris.db | Tenant store path |
//! | `HRIS_PLATFORM_DATABASE` | | Platform store path (dedicated topology) |
//! | `HRIS_TOPOLOGY` | single-store | `single-store` or `dedicated-platform` |
//! | `HRIS_LOG_LEVEL` | info | Log level |

use clap::{Parser, Subcommand};
use hris_persistence::config::{PersistenceConfig, StorageTopology};

/// Operator configuration and the command to run.
#[derive(Debug, Clone, Parser)]
#[command(name = "hris-admin")]
#[command(about = "Administration tool for the HRIS data stores")]
pub struct AdminConfig {
    /// Path of the tenant database.
    #[arg(long, env = "HRIS_TENANT_DATABASE", default_value = "hris.db")]
    pub tenant_database: String,

    /// Path of the platform database, required for the dedicated topology.
    #[arg(long, env = "HRIS_PLATFORM_DATABASE")]
    pub platform_database: Option<String>,

    /// Where platform tables live.
    #[arg(long, env = "HRIS_TOPOLOGY", default_value = "single-store")]
    pub topology: StorageTopology,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "HRIS_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Administrative commands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Creates the tenant and platform tables.
    Init,

    /// Prints record counts per tenant for tenant-owned tables.
    TenantStats {
        /// Restrict the report to one table.
        #[arg(long)]
        table: Option<String>,
    },

    /// Lists the module assignments of a plan.
    PlanModules {
        /// Plan code.
        #[arg(long)]
        plan: String,
    },
}

const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

impl AdminConfig {
    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.tenant_database.trim().is_empty() {
            errors.push("Tenant database path cannot be empty".to_string());
        }

        match (&self.topology, &self.platform_database) {
            (StorageTopology::DedicatedPlatform, None) => {
                errors.push("Dedicated platform topology requires --platform-database".to_string());
            }
            (StorageTopology::DedicatedPlatform, Some(path)) if *path == self.tenant_database => {
                errors.push("Platform database must differ from the tenant database".to_string());
            }
            _ => {}
        }

        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            errors.push(format!("Unknown log level: {}", self.log_level));
        }

        if let Command::TenantStats { table: Some(table) } = &self.command {
            if hris_persistence::entities::tenant_table(table).is_none() {
                errors.push(format!("Unknown tenant table: {}", table));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Builds the persistence configuration for the selected stores.
    pub fn to_persistence_config(&self) -> PersistenceConfig {
        PersistenceConfig {
            topology: self.topology,
            tenant_database: self.tenant_database.clone(),
            platform_database: self.platform_database.clone(),
            ..PersistenceConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> AdminConfig {
        AdminConfig::try_parse_from(std::iter::once("hris-admin").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["init"]);
        assert_eq!(config.tenant_database, "hris.db");
        assert_eq!(config.topology, StorageTopology::SingleStore);
        assert!(config.platform_database.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_dedicated_requires_platform_database() {
        let config = parse(&["--topology", "dedicated-platform", "init"]);
        let errors = config.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("--platform-database")));
    }

    #[test]
    fn test_dedicated_with_same_path_is_rejected() {
        let config = parse(&[
            "--topology",
            "dedicated-platform",
            "--tenant-database",
            "one.db",
            "--platform-database",
            "one.db",
            "init",
        ]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_topology_fails_to_parse() {
        let result = AdminConfig::try_parse_from(["hris-admin", "--topology", "sharded", "init"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_table_is_rejected() {
        let config = parse(&["tenant-stats", "--table", "salaries"]);
        let errors = config.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("salaries")));

        let config = parse(&["tenant-stats", "--table", "goals"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_log_level() {
        let config = parse(&["--log-level", "loud", "init"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_to_persistence_config() {
        let config = parse(&[
            "--topology",
            "dedicated-platform",
            "--tenant-database",
            "tenants.db",
            "--platform-database",
            "platform.db",
            "plan-modules",
            "--plan",
            "growth",
        ]);
        let persistence = config.to_persistence_config();
        assert_eq!(persistence.topology, StorageTopology::DedicatedPlatform);
        assert_eq!(persistence.tenant_database, "tenants.db");
        assert_eq!(persistence.platform_database.as_deref(), Some("platform.db"));
        assert!(persistence.validate().is_ok());
    }
}
