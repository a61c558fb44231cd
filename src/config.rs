//! Command line configuration.

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

use crate::portfolio::Portfolio;

/// Command line configuration for Folio.
#[derive(Debug, Clone, Parser)]
#[command(name = "folio", version, about, long_about = None)]
pub struct Config {
    /// Content directory holding pages, resources and the portfolio
    #[arg(long, global = true, default_value = "content")]
    pub content: PathBuf,

    /// Output directory
    #[arg(short, long, global = true, default_value = "dist")]
    pub output: PathBuf,

    /// Site name
    #[arg(long, global = true)]
    pub name: Option<String>,

    /// Syntax highlighting theme (InspiredGitHub, base16-ocean.dark, etc.)
    #[arg(long, global = true, default_value = "InspiredGitHub")]
    pub theme: String,

    /// Do not open the generated site in a browser
    #[arg(long, global = true)]
    pub no_open: bool,

    /// Base URL for resource file links
    #[arg(long, global = true, default_value = "http://localhost:8000")]
    pub storage_url: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Folio subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Create the content directory layout
    Init,

    /// Generate the static site
    Build,

    /// Create a new unpublished page
    New {
        title: String,
        /// Explicit slug, derived from the title when omitted
        #[arg(long)]
        slug: Option<String>,
        /// Start from the starter template body
        #[arg(long)]
        template: bool,
    },

    /// Edit an existing page
    Edit {
        slug: String,
        #[command(flatten)]
        changes: PageChanges,
    },

    /// Publish a page
    Publish { slug: String },

    /// Unpublish a page
    Unpublish { slug: String },

    /// List pages, most recently updated first
    List,

    /// Delete a page
    Delete { slug: String },

    /// Print the parsed blocks of a markdown subset file
    Render { file: PathBuf },

    /// Write the portfolio as JSON
    ExportPortfolio { file: PathBuf },

    /// Replace the portfolio with a JSON snapshot
    ImportPortfolio { file: PathBuf },

    /// Manage portfolio projects
    #[command(subcommand)]
    Project(ProjectCommand),

    /// Manage portfolio services
    #[command(subcommand)]
    Service(ServiceCommand),

    /// Edit the hero section
    Hero(HeroChanges),

    /// Edit the about section
    About(AboutChanges),

    /// Manage FAQ entries
    #[command(subcommand)]
    Faq(FaqCommand),

    /// Manage gated resource pages
    #[command(subcommand)]
    Resource(ResourceCommand),
}

/// Field changes for `edit`.
#[derive(Debug, Clone, Default, Args)]
pub struct PageChanges {
    #[arg(long)]
    pub title: Option<String>,

    /// New slug; the page is moved
    #[arg(long)]
    pub new_slug: Option<String>,

    /// Replace the body with the content of a file
    #[arg(long)]
    pub body_file: Option<PathBuf>,

    #[arg(long, conflicts_with = "unpublish")]
    pub publish: bool,

    #[arg(long)]
    pub unpublish: bool,
}

impl PageChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.new_slug.is_none()
            && self.body_file.is_none()
            && !self.publish
            && !self.unpublish
    }
}

/// Project subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum ProjectCommand {
    /// Add a draft project
    Add {
        title: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Show a project on the landing page
    Publish { id: String },
    /// Hide a project from the landing page
    Unpublish { id: String },
    /// Remove a project
    Remove { id: String },
    /// Set display order by listing project ids
    Reorder { ids: Vec<String> },
    /// List projects in display order
    List,
}

/// Service subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum ServiceCommand {
    /// Add a service
    Add {
        title: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Change a service
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Feature bullet; repeat to replace the whole list
        #[arg(long = "feature")]
        features: Vec<String>,
    },
    /// Remove a service
    Remove { id: String },
    /// List services in display order
    List,
}

/// Field changes for `hero`; omitted fields keep their value.
#[derive(Debug, Clone, Default, Args)]
pub struct HeroChanges {
    /// Display name shown in the hero
    #[arg(long)]
    pub full_name: Option<String>,

    #[arg(long)]
    pub subtitle: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// Tech stack entry; repeat to replace the whole list
    #[arg(long = "tech")]
    pub tech_stack: Vec<String>,
}

/// Field changes for `about`; omitted fields keep their value.
#[derive(Debug, Clone, Default, Args)]
pub struct AboutChanges {
    #[arg(long)]
    pub bio: Option<String>,

    #[arg(long)]
    pub mission: Option<String>,
}

/// FAQ subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum FaqCommand {
    /// Add a question, creating its category when needed
    Add {
        #[arg(long)]
        category: String,
        #[arg(long)]
        question: String,
        #[arg(long)]
        answer: String,
    },
    /// Remove a question; empty categories are dropped
    Remove {
        #[arg(long)]
        category: String,
        #[arg(long)]
        question: String,
    },
}

/// Resource page subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum ResourceCommand {
    /// Create an unpublished resource page
    New {
        title: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Upload a file to a resource page
    Attach {
        slug: String,
        file: PathBuf,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete one file from a resource page and from storage
    Detach { slug: String, file_id: Uuid },
    /// Delete a resource page and all its files
    Delete { slug: String },
    /// Publish a resource page
    Publish { slug: String },
    /// Unpublish a resource page
    Unpublish { slug: String },
    /// List resource pages
    List,
    /// List captured download emails
    Downloads {
        /// Only downloads of this resource page
        #[arg(long)]
        page: Option<String>,
        /// Only emails containing this text, ignoring case
        #[arg(long)]
        email: Option<String>,
        /// Write CSV to this file, or to stdout for `-`
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

impl Config {
    /// Parses configuration from command line arguments.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Validates configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the content directory does not exist, except for
    /// `init` which creates it.
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.command, Command::Init) && !self.content.exists() {
            bail!(
                "Content directory does not exist: {} (run `folio init`)",
                self.content.display()
            );
        }

        Ok(())
    }

    /// Returns site name from configuration, portfolio or content directory.
    ///
    /// # Errors
    ///
    /// Returns error if the content path has no name component or contains invalid UTF8.
    pub fn site_name(&self, portfolio: Option<&Portfolio>) -> Result<String> {
        if let Some(name) = &self.name {
            return Ok(name.clone());
        }

        if let Some(portfolio) = portfolio
            && !portfolio.hero.name.trim().is_empty()
        {
            return Ok(portfolio.hero.name.clone());
        }

        let path = self
            .content
            .canonicalize()
            .unwrap_or_else(|_| self.content.clone());

        path.file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("Cannot extract site name from path: {}", path.display()))
            .map(String::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(command: Command) -> Config {
        Config {
            content: PathBuf::from("."),
            output: PathBuf::from("dist"),
            name: None,
            theme: "InspiredGitHub".to_string(),
            no_open: true,
            storage_url: "http://localhost:8000".to_string(),
            command,
        }
    }

    #[test]
    fn test_site_name_with_explicit_name() {
        // Arrange
        let mut config = config(Command::Build);
        config.name = Some("ExplicitName".to_string());

        // Act
        let result = config.site_name(Some(&Portfolio::default()));

        // Assert
        assert_eq!(result.expect("Should resolve"), "ExplicitName");
    }

    #[test]
    fn test_site_name_from_portfolio() {
        // Arrange
        let config = config(Command::Build);
        let mut portfolio = Portfolio::default();
        portfolio.hero.name = "Jane Doe".to_string();

        // Act
        let result = config.site_name(Some(&portfolio));

        // Assert
        assert_eq!(result.expect("Should resolve"), "Jane Doe");
    }

    #[test]
    fn test_site_name_falls_back_to_directory() {
        // Arrange
        let mut config = config(Command::Build);
        config.content = PathBuf::from("/srv/my-site");

        // Act
        let result = config.site_name(None);

        // Assert
        assert_eq!(result.expect("Should resolve"), "my-site");
    }

    #[test]
    fn test_validate_existing_path() {
        // Act
        let result = config(Command::List).validate();

        // Assert
        assert!(result.is_ok(), "Current directory should be valid");
    }

    #[test]
    fn test_validate_missing_content_dir() {
        // Arrange
        let mut missing = config(Command::Build);
        missing.content = PathBuf::from("/definitely/not/here");
        let mut init = missing.clone();
        init.command = Command::Init;

        // Assert
        assert!(missing.validate().is_err());
        assert!(init.validate().is_ok(), "Init creates the directory");
    }

    #[test]
    fn test_parse_subcommand_with_globals() {
        // Act
        let config = Config::try_parse_from([
            "folio",
            "edit",
            "pricing",
            "--title",
            "Plans",
            "--publish",
            "--content",
            "site",
        ])
        .expect("Should parse");

        // Assert
        assert_eq!(config.content, PathBuf::from("site"));
        match config.command {
            Command::Edit { slug, changes } => {
                assert_eq!(slug, "pricing");
                assert_eq!(changes.title.as_deref(), Some("Plans"));
                assert!(changes.publish);
                assert!(!changes.is_empty());
            }
            other => panic!("Unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_publish_conflicts_with_unpublish() {
        // Act
        let result = Config::try_parse_from(["folio", "edit", "x", "--publish", "--unpublish"]);

        // Assert
        assert!(result.is_err());
    }

    #[test]
    fn test_default_theme() {
        // Act
        let config = Config::try_parse_from(["folio", "build"]).expect("Should parse");

        // Assert
        assert_eq!(config.theme, "InspiredGitHub");
        assert_eq!(config.output, PathBuf::from("dist"));
        assert!(!config.no_open);
    }

    #[test]
    fn test_parse_downloads_filters() {
        // Act
        let config = Config::try_parse_from([
            "folio", "resource", "downloads", "--email", "acme", "--csv", "-",
        ])
        .expect("Should parse");

        // Assert
        match config.command {
            Command::Resource(ResourceCommand::Downloads { page, email, csv }) => {
                assert!(page.is_none());
                assert_eq!(email.as_deref(), Some("acme"));
                assert_eq!(csv, Some(PathBuf::from("-")));
            }
            other => panic!("Unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_detach_requires_uuid() {
        // Act
        let bad = Config::try_parse_from(["folio", "resource", "detach", "kit", "not-a-uuid"]);
        let good = Config::try_parse_from([
            "folio",
            "resource",
            "detach",
            "kit",
            "67e55044-10b1-426f-9247-bb680e5fe0c8",
        ]);

        // Assert
        assert!(bad.is_err());
        assert!(good.is_ok());
    }

    #[test]
    fn test_parse_repeated_service_features() {
        // Act
        let config = Config::try_parse_from([
            "folio", "service", "edit", "s1", "--feature", "Audit", "--feature", "Build",
        ])
        .expect("Should parse");

        // Assert
        match config.command {
            Command::Service(ServiceCommand::Edit { id, features, .. }) => {
                assert_eq!(id, "s1");
                assert_eq!(features, vec!["Audit", "Build"]);
            }
            other => panic!("Unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_command_definition_is_consistent() {
        // Global options must not clash with subcommand argument ids
        <Config as clap::CommandFactory>::command().debug_assert();
    }
}
