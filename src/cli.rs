use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::i18n::Locale;

/// Coverform - fill in and submit schema-driven insurance applications
#[derive(Parser, Debug, Clone)]
#[command(name = "coverform", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "COVERFORM_CONFIG", default_value = "coverform.toml")]
    pub config: PathBuf,

    /// Insurance API base URL
    #[arg(long, env = "COVERFORM_BASE_URL")]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List available forms
    Forms,

    /// Print the render tree of a form for the current draft
    Render {
        form_id: String,
        /// Read answers from a JSON file instead of the stored draft
        #[arg(long)]
        answers: Option<PathBuf>,
        /// Print JSON instead of an indented outline
        #[arg(long)]
        json: bool,
    },

    /// Change one answer in the stored draft
    Set {
        form_id: String,
        field_id: String,
        value: String,
        /// Store the value as a boolean (toggle fields)
        #[arg(long, conflicts_with = "choice")]
        flag: bool,
        /// Add the value to a checkbox group
        #[arg(long)]
        choice: bool,
        /// With --choice, remove the value instead
        #[arg(long, requires = "choice")]
        off: bool,
    },

    /// Check required fields; exits non-zero when the form is incomplete
    Validate {
        form_id: String,
        #[arg(long)]
        answers: Option<PathBuf>,
    },

    /// Validate and submit a form, clearing its draft on success
    Submit {
        form_id: String,
        #[arg(long)]
        answers: Option<PathBuf>,
    },

    /// Show submitted applications
    Submissions {
        /// Case-insensitive search over the visible columns
        #[arg(long)]
        search: Option<String>,
        /// Column to sort by
        #[arg(long)]
        sort: Option<String>,
        /// Sort descending
        #[arg(long, requires = "sort")]
        desc: bool,
        /// 1-based page number
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Columns to hide
        #[arg(long, num_args = 1..)]
        hide: Vec<String>,
    },

    /// Show or change theme and language
    Prefs {
        #[arg(long)]
        toggle_theme: bool,
        #[arg(long)]
        locale: Option<Locale>,
    },

    /// Run the local mock API
    Serve {
        /// Server host address
        #[arg(long, env = "COVERFORM_HOST")]
        host: Option<String>,
        /// Server port
        #[arg(long, env = "COVERFORM_PORT")]
        port: Option<u16>,
    },
}

impl Cli {
    /// Host and port given to `serve`, if that is the command
    pub fn serve_overrides(&self) -> Option<(Option<&str>, Option<u16>)> {
        match &self.command {
            Command::Serve { host, port } => Some((host.as_deref(), *port)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["coverform", "forms"]);
        assert_eq!(cli.config, PathBuf::from("coverform.toml"));
        assert!(cli.base_url.is_none());
        assert!(matches!(cli.command, Command::Forms));
        assert!(cli.serve_overrides().is_none());
    }

    #[test]
    fn test_cli_with_args() {
        let cli = Cli::parse_from([
            "coverform",
            "--config",
            "custom.toml",
            "--base-url",
            "http://localhost:3000",
            "serve",
            "--host",
            "0.0.0.0",
            "--port",
            "8080",
        ]);
        assert_eq!(cli.config, PathBuf::from("custom.toml"));
        assert_eq!(cli.base_url.as_deref(), Some("http://localhost:3000"));
        assert_eq!(cli.serve_overrides(), Some((Some("0.0.0.0"), Some(8080))));
    }

    #[test]
    fn test_set_choice_off() {
        let cli = Cli::parse_from(["coverform", "set", "home", "extras", "flood", "--choice", "--off"]);
        match cli.command {
            Command::Set { choice, off, flag, .. } => {
                assert!(choice && off && !flag);
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert!(Cli::try_parse_from(["coverform", "set", "home", "a", "b", "--off"]).is_err());
    }

    #[test]
    fn test_submissions_args() {
        let cli = Cli::parse_from([
            "coverform", "submissions", "--search", "teh", "--sort", "age", "--desc", "--hide", "id", "city",
        ]);
        match cli.command {
            Command::Submissions { search, sort, desc, page, hide } => {
                assert_eq!(search.as_deref(), Some("teh"));
                assert_eq!(sort.as_deref(), Some("age"));
                assert!(desc);
                assert_eq!(page, 1);
                assert_eq!(hide, vec!["id", "city"]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_locale_arg() {
        let cli = Cli::parse_from(["coverform", "prefs", "--locale", "fa"]);
        assert!(matches!(cli.command, Command::Prefs { locale: Some(Locale::Fa), .. }));
    }
}
