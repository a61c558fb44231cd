//! Portfolio aggregate: the multi-section landing page content.
//!
//! The whole aggregate is edited through an [`EditSession`](crate::EditSession)
//! and persisted as one document. Imports merge with [`Portfolio::default`],
//! so a partial JSON export fills missing sections from defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::draft::Editable;

/// Visibility of a project on the public site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Published,
    #[default]
    Draft,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Hero {
    pub name: String,
    pub subtitle: String,
    pub description: String,
    pub tech_stack: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stat {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct About {
    pub bio: String,
    pub mission: String,
    pub stats: Vec<Stat>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Outcome highlights such as "20h saved per week".
    #[serde(default)]
    pub results: Vec<String>,
    #[serde(default)]
    pub status: ProjectStatus,
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub features: Vec<String>,
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLink {
    pub platform: String,
    pub url: String,
    #[serde(default)]
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
    pub email: String,
    pub location: String,
    pub social_links: Vec<SocialLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Footer {
    pub copyright: String,
    pub tagline: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqQuestion {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqCategory {
    pub id: String,
    pub category: String,
    #[serde(default)]
    pub questions: Vec<FaqQuestion>,
}

/// All landing page sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Portfolio {
    pub hero: Hero,
    pub about: About,
    pub projects: Vec<Project>,
    pub services: Vec<Service>,
    pub contact: Contact,
    pub footer: Footer,
    pub faq: Vec<FaqCategory>,
}

impl Default for Portfolio {
    fn default() -> Self {
        Self {
            hero: Hero {
                name: "Your Name".to_string(),
                subtitle: "AI Automation Specialist".to_string(),
                description: "I build automation systems that save time, reduce errors, and scale your business.".to_string(),
                tech_stack: vec![
                    "AI Automation".to_string(),
                    "n8n".to_string(),
                    "API Integration".to_string(),
                ],
            },
            about: About {
                bio: "Workflow automation, AI integration and custom API solutions.".to_string(),
                mission: "Make AI practical for businesses of all sizes.".to_string(),
                stats: vec![
                    Stat {
                        label: "Projects Delivered".to_string(),
                        value: "0".to_string(),
                    },
                ],
            },
            projects: Vec::new(),
            services: Vec::new(),
            contact: Contact::default(),
            footer: Footer {
                copyright: "All rights reserved.".to_string(),
                tagline: "Automating the boring parts.".to_string(),
            },
            faq: Vec::new(),
        }
    }
}

impl Portfolio {
    /// Published projects ordered by their `order` field.
    pub fn published_projects(&self) -> Vec<&Project> {
        let mut projects: Vec<&Project> = self
            .projects
            .iter()
            .filter(|p| p.status == ProjectStatus::Published)
            .collect();
        projects.sort_by_key(|p| p.order);
        projects
    }

    /// Published projects matching a search query and an optional tag.
    ///
    /// The query matches case-insensitively against title or description; an
    /// empty query matches everything. Results are ordered by `order`.
    pub fn filter_projects(&self, query: &str, tag: Option<&str>) -> Vec<&Project> {
        let query = query.trim().to_lowercase();
        self.published_projects()
            .into_iter()
            .filter(|p| {
                query.is_empty()
                    || p.title.to_lowercase().contains(&query)
                    || p.description.to_lowercase().contains(&query)
            })
            .filter(|p| tag.is_none_or(|t| p.tags.iter().any(|pt| pt == t)))
            .collect()
    }

    /// Distinct tags of published projects, sorted.
    pub fn project_tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self
            .published_projects()
            .into_iter()
            .flat_map(|p| p.tags.iter().map(String::as_str))
            .collect();
        tags.sort_unstable();
        tags.dedup();
        tags
    }

    /// Services ordered by their `order` field.
    pub fn sorted_services(&self) -> Vec<&Service> {
        let mut services: Vec<&Service> = self.services.iter().collect();
        services.sort_by_key(|s| s.order);
        services
    }

    /// Serializes the aggregate as pretty printed JSON.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize portfolio")
    }

    /// Parses an exported snapshot, filling missing sections from defaults.
    ///
    /// # Errors
    ///
    /// Returns error if the input is not valid portfolio JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid portfolio JSON")
    }
}

/// Partial update of a project; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub results: Option<Vec<String>>,
    pub status: Option<ProjectStatus>,
}

/// Partial update of a service; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub features: Option<Vec<String>>,
}

/// Single field level change to a [`Portfolio`] draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortfolioEdit {
    Hero(Hero),
    About(About),
    Contact(Contact),
    Footer(Footer),
    Faq(Vec<FaqCategory>),
    AddProject { title: String, description: String },
    UpdateProject { id: String, update: ProjectUpdate },
    DeleteProject(String),
    /// Project ids in their new order; unlisted projects keep their
    /// relative order after the listed ones.
    ReorderProjects(Vec<String>),
    AddService { title: String, description: String },
    UpdateService { id: String, update: ServiceUpdate },
    DeleteService(String),
}

impl Editable for Portfolio {
    type Edit = PortfolioEdit;

    fn apply(&mut self, edit: PortfolioEdit) {
        match edit {
            PortfolioEdit::Hero(hero) => self.hero = hero,
            PortfolioEdit::About(about) => self.about = about,
            PortfolioEdit::Contact(contact) => self.contact = contact,
            PortfolioEdit::Footer(footer) => self.footer = footer,
            PortfolioEdit::Faq(faq) => self.faq = faq,
            PortfolioEdit::AddProject { title, description } => {
                let order = self.projects.len() as u32 + 1;
                self.projects.push(Project {
                    id: Uuid::new_v4().to_string(),
                    title,
                    description,
                    tags: Vec::new(),
                    results: Vec::new(),
                    status: ProjectStatus::Draft,
                    order,
                });
            }
            PortfolioEdit::UpdateProject { id, update } => {
                if let Some(project) = self.projects.iter_mut().find(|p| p.id == id) {
                    if let Some(title) = update.title {
                        project.title = title;
                    }
                    if let Some(description) = update.description {
                        project.description = description;
                    }
                    if let Some(tags) = update.tags {
                        project.tags = tags;
                    }
                    if let Some(results) = update.results {
                        project.results = results;
                    }
                    if let Some(status) = update.status {
                        project.status = status;
                    }
                }
            }
            PortfolioEdit::DeleteProject(id) => self.projects.retain(|p| p.id != id),
            PortfolioEdit::ReorderProjects(ids) => {
                let rank = |p: &Project| {
                    ids.iter()
                        .position(|id| *id == p.id)
                        .unwrap_or(ids.len())
                };
                self.projects.sort_by_key(|p| (rank(p), p.order));
                for (index, project) in self.projects.iter_mut().enumerate() {
                    project.order = index as u32 + 1;
                }
            }
            PortfolioEdit::AddService { title, description } => {
                let order = self.services.len() as u32 + 1;
                self.services.push(Service {
                    id: Uuid::new_v4().to_string(),
                    title,
                    description,
                    features: Vec::new(),
                    order,
                });
            }
            PortfolioEdit::UpdateService { id, update } => {
                if let Some(service) = self.services.iter_mut().find(|s| s.id == id) {
                    if let Some(title) = update.title {
                        service.title = title;
                    }
                    if let Some(description) = update.description {
                        service.description = description;
                    }
                    if let Some(features) = update.features {
                        service.features = features;
                    }
                }
            }
            PortfolioEdit::DeleteService(id) => self.services.retain(|s| s.id != id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_projects(titles: &[&str]) -> Portfolio {
        let mut portfolio = Portfolio::default();
        for title in titles {
            portfolio.apply(PortfolioEdit::AddProject {
                title: title.to_string(),
                description: String::new(),
            });
        }
        portfolio
    }

    #[test]
    fn test_add_project_assigns_order_and_id() {
        // Arrange & Act
        let portfolio = with_projects(&["One", "Two"]);

        // Assert
        assert_eq!(portfolio.projects.len(), 2);
        assert_eq!(portfolio.projects[0].order, 1);
        assert_eq!(portfolio.projects[1].order, 2);
        assert_ne!(portfolio.projects[0].id, portfolio.projects[1].id);
        assert_eq!(portfolio.projects[0].status, ProjectStatus::Draft);
    }

    #[test]
    fn test_update_project_partial() {
        // Arrange
        let mut portfolio = with_projects(&["One"]);
        let id = portfolio.projects[0].id.clone();

        // Act
        portfolio.apply(PortfolioEdit::UpdateProject {
            id,
            update: ProjectUpdate {
                status: Some(ProjectStatus::Published),
                tags: Some(vec!["n8n".to_string()]),
                ..ProjectUpdate::default()
            },
        });

        // Assert
        let project = &portfolio.projects[0];
        assert_eq!(project.title, "One", "Title should be untouched");
        assert_eq!(project.status, ProjectStatus::Published);
        assert_eq!(project.tags, vec!["n8n".to_string()]);
    }

    #[test]
    fn test_reorder_projects_renumbers() {
        // Arrange
        let mut portfolio = with_projects(&["A", "B", "C"]);
        let ids: Vec<String> = portfolio.projects.iter().map(|p| p.id.clone()).collect();

        // Act
        portfolio.apply(PortfolioEdit::ReorderProjects(vec![ids[2].clone(), ids[0].clone()]));

        // Assert
        let titles: Vec<&str> = portfolio.projects.iter().map(|p| p.title.as_str()).collect();
        let orders: Vec<u32> = portfolio.projects.iter().map(|p| p.order).collect();
        assert_eq!(titles, vec!["C", "A", "B"]);
        assert_eq!(orders, vec![1, 2, 3]);
    }

    #[test]
    fn test_published_projects_filtered_and_sorted() {
        // Arrange
        let mut portfolio = with_projects(&["A", "B", "C"]);
        portfolio.projects[0].status = ProjectStatus::Published;
        portfolio.projects[0].order = 5;
        portfolio.projects[2].status = ProjectStatus::Published;

        // Act
        let published = portfolio.published_projects();

        // Assert
        let titles: Vec<&str> = published.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["C", "A"]);
    }

    #[test]
    fn test_delete_service() {
        // Arrange
        let mut portfolio = Portfolio::default();
        portfolio.apply(PortfolioEdit::AddService {
            title: "Audits".to_string(),
            description: "Process audits".to_string(),
        });
        let id = portfolio.services[0].id.clone();

        // Act
        portfolio.apply(PortfolioEdit::DeleteService(id));

        // Assert
        assert!(portfolio.services.is_empty());
    }

    #[test]
    fn test_import_merges_defaults() {
        // Arrange
        let json = r#"{"hero":{"name":"Ada"},"footer":{"tagline":"Hi"}}"#;

        // Act
        let portfolio = Portfolio::from_json(json).expect("Should parse partial JSON");

        // Assert
        assert_eq!(portfolio.hero.name, "Ada");
        assert!(portfolio.hero.subtitle.is_empty(), "Partial section uses field defaults");
        assert_eq!(portfolio.about, Portfolio::default().about);
        assert_eq!(portfolio.footer.tagline, "Hi");
    }

    #[test]
    fn test_export_import_identity() {
        // Arrange
        let portfolio = with_projects(&["Chatbot"]);

        // Act
        let json = portfolio.to_json().expect("Should serialize");
        let restored = Portfolio::from_json(&json).expect("Should parse");

        // Assert
        assert_eq!(restored, portfolio);
    }

    #[test]
    fn test_import_rejects_invalid_json() {
        assert!(Portfolio::from_json("{not json").is_err());
    }

    fn tagged(id: &str, title: &str, tags: &[&str], status: ProjectStatus, order: u32) -> Project {
        Project {
            id: id.to_string(),
            title: title.to_string(),
            description: format!("{} description", title),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            results: Vec::new(),
            status,
            order,
        }
    }

    fn filterable() -> Portfolio {
        let mut portfolio = Portfolio::default();
        portfolio.projects = vec![
            tagged("c", "CRM Sync", &["n8n", "api"], ProjectStatus::Published, 3),
            tagged("a", "Invoice Bot", &["ai"], ProjectStatus::Published, 1),
            tagged("b", "Lead Scorer", &["ai", "n8n"], ProjectStatus::Published, 2),
            tagged("d", "Secret", &["ai"], ProjectStatus::Draft, 0),
        ];
        portfolio
    }

    #[test]
    fn test_filter_projects_by_query() {
        // Arrange
        let portfolio = filterable();

        // Act
        let by_title: Vec<&str> = portfolio
            .filter_projects("crm", None)
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        let by_description: Vec<&str> = portfolio
            .filter_projects("  BOT DESCRIPTION ", None)
            .iter()
            .map(|p| p.id.as_str())
            .collect();

        // Assert
        assert_eq!(by_title, vec!["c"]);
        assert_eq!(by_description, vec!["a"], "Query is trimmed and case-insensitive");
    }

    #[test]
    fn test_filter_projects_by_tag_sorted_and_published_only() {
        // Arrange
        let portfolio = filterable();

        // Act
        let ai: Vec<&str> = portfolio
            .filter_projects("", Some("ai"))
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        let all = portfolio.filter_projects("", None);

        // Assert
        assert_eq!(ai, vec!["a", "b"], "Drafts excluded, ordered by order");
        assert_eq!(all.len(), 3);
        assert!(portfolio.filter_projects("", Some("rust")).is_empty());
    }

    #[test]
    fn test_project_tags_distinct_and_sorted() {
        assert_eq!(filterable().project_tags(), vec!["ai", "api", "n8n"]);
    }
}
