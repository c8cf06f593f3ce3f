//! CLI runner - executes commands

use super::commands::{Cli, Commands, FilterArgs};
use crate::config::InstanceConfig;
use crate::error::{Error, Result};
use crate::query::{QueryParams, Selection, SnSoap};
use serde_json::json;
use std::io::Write;
use tracing::info;

/// Environment variable consulted when no password is given
pub const PASSWORD_ENV: &str = "SNSOAP_PASSWORD";

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let sn = SnSoap::from_config(self.instance_config()?)?;
        let stdout = std::io::stdout();
        let mut out = stdout.lock();

        match &self.cli.command {
            Commands::Check { table } => self.check(&sn, table, &mut out).await,
            Commands::Keys { table, filter } => self.keys(&sn, table, filter, &mut out).await,
            Commands::Query {
                table,
                filter,
                sys_ids,
                page_size,
                max_pages,
                pages,
            } => {
                let selection = match sys_ids {
                    Some(ids) => Selection::sys_ids(ids.iter().cloned()),
                    None => Selection::Filter(build_filter(filter)),
                };
                let page_size = (*page_size).unwrap_or(sn.config().page_size);
                self.query(
                    &sn,
                    table,
                    selection,
                    page_size,
                    *max_pages,
                    *pages,
                    &mut out,
                )
                .await
            }
        }
    }

    /// Merge the config file with command-line flags
    pub fn instance_config(&self) -> Result<InstanceConfig> {
        let mut config = match &self.cli.config {
            Some(path) => InstanceConfig::from_yaml_file(path)?,
            None => {
                let instance = self.cli.instance.clone().unwrap_or_default();
                InstanceConfig::new(instance, "", "")
            }
        };

        if let Some(instance) = &self.cli.instance {
            config.instance.clone_from(instance);
        }
        if let Some(username) = &self.cli.username {
            config.username.clone_from(username);
        }
        if let Some(password) = &self.cli.password {
            config.password.clone_from(password);
        }
        if config.password.is_empty() {
            if let Ok(password) = std::env::var(PASSWORD_ENV) {
                config.password = password;
            }
        }
        if let Some(base_url) = &self.cli.base_url {
            config.base_url = Some(base_url.clone());
        }
        if let Some(timeout) = self.cli.timeout {
            config.timeout_secs = Some(timeout);
        }

        if config.instance.is_empty() && config.base_url.is_none() {
            return Err(Error::config(
                "Instance not specified (use -i, --base-url or a config file)",
            ));
        }
        Ok(config)
    }

    async fn check(&self, sn: &SnSoap, table: &str, out: &mut impl Write) -> Result<()> {
        let client = sn.resolve_client(table).await?;
        let descriptor = client.descriptor();
        let operations: Vec<&String> = descriptor.operations.keys().collect();
        writeln!(
            out,
            "{}",
            json!({
                "table": table,
                "namespace": descriptor.namespace,
                "address": descriptor.address,
                "operations": operations,
            })
        )?;
        Ok(())
    }

    async fn keys(
        &self,
        sn: &SnSoap,
        table: &str,
        filter: &FilterArgs,
        out: &mut impl Write,
    ) -> Result<()> {
        let keys = sn.keys(table, &build_filter(filter)).await?;
        writeln!(
            out,
            "{}",
            json!({ "table": table, "count": keys.count, "sys_ids": keys.sys_ids })
        )?;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    async fn query(
        &self,
        sn: &SnSoap,
        table: &str,
        selection: Selection,
        page_size: usize,
        max_pages: Option<usize>,
        per_page: bool,
        out: &mut impl Write,
    ) -> Result<()> {
        let mut pages = sn.run_query(table, selection, page_size)?;
        let mut fetched = 0usize;
        let mut records = 0usize;

        while max_pages.map_or(true, |max| fetched < max) {
            let Some(page) = pages.next_page().await? else {
                break;
            };
            fetched += 1;
            records += page.len();

            if per_page {
                writeln!(out, "{}", serde_json::to_string(&page)?)?;
            } else {
                for record in &page {
                    writeln!(out, "{}", serde_json::to_string(record)?)?;
                }
            }
        }

        info!(table, pages = fetched, records, "query finished");
        Ok(())
    }
}

/// Build request parameters from CLI filter arguments
pub fn build_filter(args: &FilterArgs) -> QueryParams {
    let mut params: QueryParams = args.params.iter().cloned().collect();
    if let Some(query) = &args.query {
        params.set(crate::query::ENCODED_QUERY, query);
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write as _;

    #[test]
    fn test_build_filter() {
        let args = FilterArgs {
            params: vec![("active".to_string(), "false".to_string())],
            query: Some("state=7".to_string()),
        };
        let filter = build_filter(&args);
        assert_eq!(filter.get("active"), Some("false"));
        assert_eq!(filter.encoded_query(), Some("state=7"));
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "instance: from_file\nusername: file_user\npassword: file_pw").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let cli = Cli::try_parse_from([
            "snsoap", "-C", &path, "-u", "flag_user", "--timeout", "15", "check", "incident",
        ])
        .unwrap();
        let config = Runner::new(cli).instance_config().unwrap();

        assert_eq!(config.instance, "from_file");
        assert_eq!(config.username, "flag_user");
        assert_eq!(config.password, "file_pw");
        assert_eq!(config.timeout_secs, Some(15));
    }

    #[test]
    fn test_missing_instance() {
        let cli = Cli::try_parse_from(["snsoap", "check", "incident"]).unwrap();
        let err = Runner::new(cli).instance_config().unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }
}
