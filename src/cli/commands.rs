//! CLI commands and argument parsing

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Paged queries against ServiceNow SOAP web services
#[derive(Parser, Debug)]
#[command(name = "snsoap")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Instance configuration file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Instance name (`{instance}.service-now.com`)
    #[arg(short, long, global = true)]
    pub instance: Option<String>,

    /// Basic auth user
    #[arg(short, long, global = true)]
    pub username: Option<String>,

    /// Basic auth password (falls back to SNSOAP_PASSWORD)
    #[arg(short, long, global = true)]
    pub password: Option<String>,

    /// Base URL replacing https://{instance}.service-now.com
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Filter arguments shared by `keys` and `query`
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Filter criterion as field=value (repeatable)
    #[arg(long = "param", value_parser = parse_param)]
    pub params: Vec<(String, String)>,

    /// Encoded query, e.g. "active=true^priority=1"
    #[arg(short, long)]
    pub query: Option<String>,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a table's WSDL and show its endpoint
    Check {
        /// Table name
        table: String,
    },

    /// Print the sys_ids matching a filter
    Keys {
        /// Table name
        table: String,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Page through the records matching a filter or a sys_id list
    Query {
        /// Table name
        table: String,

        #[command(flatten)]
        filter: FilterArgs,

        /// Comma-separated sys_ids (the filter is ignored when given)
        #[arg(long, value_delimiter = ',')]
        sys_ids: Option<Vec<String>>,

        /// Records per page (1-250)
        #[arg(long)]
        page_size: Option<usize>,

        /// Stop after this many pages
        #[arg(long)]
        max_pages: Option<usize>,

        /// Print one line per page instead of per record
        #[arg(long)]
        pages: bool,
    },
}

/// Parse a `field=value` filter argument
pub fn parse_param(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected field=value, got '{arg}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_param() {
        assert_eq!(
            parse_param("state=7"),
            Ok(("state".to_string(), "7".to_string()))
        );
        assert_eq!(
            parse_param("q=a=b"),
            Ok(("q".to_string(), "a=b".to_string()))
        );
        assert!(parse_param("state").is_err());
        assert!(parse_param("=7").is_err());
    }

    #[test]
    fn test_parse_query_command() {
        let cli = Cli::try_parse_from([
            "snsoap",
            "-i",
            "dev12345",
            "-u",
            "reader",
            "query",
            "incident",
            "--param",
            "active=false",
            "--param",
            "state=7",
            "--page-size",
            "100",
            "--max-pages",
            "2",
        ])
        .unwrap();

        assert_eq!(cli.instance.as_deref(), Some("dev12345"));
        match cli.command {
            Commands::Query {
                table,
                filter,
                sys_ids,
                page_size,
                max_pages,
                pages,
            } => {
                assert_eq!(table, "incident");
                assert_eq!(filter.params.len(), 2);
                assert_eq!(filter.params[1], ("state".to_string(), "7".to_string()));
                assert!(sys_ids.is_none());
                assert_eq!(page_size, Some(100));
                assert_eq!(max_pages, Some(2));
                assert!(!pages);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_sys_ids() {
        let cli = Cli::try_parse_from(["snsoap", "query", "cmdb_ci", "--sys-ids", "a,b,a"]).unwrap();
        let Commands::Query { sys_ids, .. } = cli.command else {
            panic!("expected query");
        };
        assert_eq!(
            sys_ids,
            Some(vec!["a".to_string(), "b".to_string(), "a".to_string()])
        );
    }

    #[test]
    fn test_parse_keys_command() {
        let cli = Cli::try_parse_from(["snsoap", "keys", "incident", "-q", "active=true"]).unwrap();
        let Commands::Keys { table, filter } = cli.command else {
            panic!("expected keys");
        };
        assert_eq!(table, "incident");
        assert_eq!(filter.query.as_deref(), Some("active=true"));
    }

    #[test]
    fn test_bad_param_rejected() {
        assert!(Cli::try_parse_from(["snsoap", "keys", "incident", "--param", "oops"]).is_err());
    }
}
