//! All projects page generation

use maud::{Markup, html};

use super::index::project_card;
use crate::assets::INDEX_CSS;
use crate::components::layout::{PageChrome, page_wrapper};
use crate::document::slugify;
use crate::portfolio::{Portfolio, Project};

/// Generates the page listing every published project
///
/// Projects are grouped under each of their tags, so a project with two
/// tags appears in both groups. Untagged projects are listed last under
/// "Other".
pub fn generate(portfolio: &Portfolio, chrome: &PageChrome<'_>) -> Markup {
    let all = portfolio.filter_projects("", None);
    let untagged: Vec<&Project> = all.iter().copied().filter(|p| p.tags.is_empty()).collect();
    let stylesheets = vec![chrome.stylesheet(INDEX_CSS)];

    page_wrapper(
        "All Projects",
        chrome,
        &stylesheets,
        html! {
            section class="section" id="projects" {
                h1 { "All Projects" }
                p class="meta" { (all.len()) " published projects" }

                @if all.is_empty() {
                    p { "No projects found" }
                }

                nav class="tag-index" {
                    @for tag in portfolio.project_tags() {
                        a href=(format!("#tag-{}", slugify(tag))) { (tag) }
                        " "
                    }
                }

                @for tag in portfolio.project_tags() {
                    section class="tag-group" id=(format!("tag-{}", slugify(tag))) {
                        h2 { (tag) }
                        div class="grid" {
                            @for project in portfolio.filter_projects("", Some(tag)) {
                                (project_card(project))
                            }
                        }
                    }
                }

                @if !untagged.is_empty() {
                    section class="tag-group" id="tag-other" {
                        h2 { "Other" }
                        div class="grid" {
                            @for project in &untagged {
                                (project_card(project))
                            }
                        }
                    }
                }
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::{Footer, ProjectStatus};

    fn project(id: &str, tags: &[&str], status: ProjectStatus, order: u32) -> Project {
        Project {
            id: id.to_string(),
            title: format!("Project {}", id),
            description: String::new(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            results: Vec::new(),
            status,
            order,
        }
    }

    fn render(portfolio: &Portfolio) -> String {
        let footer = Footer::default();
        let chrome = PageChrome {
            site_name: "Studio",
            footer: &footer,
            depth: 0,
        };
        generate(portfolio, &chrome).into_string()
    }

    #[test]
    fn test_projects_grouped_by_tag() {
        // Arrange
        let mut portfolio = Portfolio::default();
        portfolio.projects = vec![
            project("A", &["AI Agents"], ProjectStatus::Published, 2),
            project("B", &["AI Agents", "n8n"], ProjectStatus::Published, 1),
            project("C", &[], ProjectStatus::Published, 3),
            project("D", &["n8n"], ProjectStatus::Draft, 4),
        ];

        // Act
        let html = render(&portfolio);

        // Assert
        assert!(html.contains("id=\"tag-ai-agents\""));
        assert!(html.contains("id=\"tag-n8n\""));
        assert!(html.contains("id=\"tag-other\""), "Untagged group present");
        assert!(html.contains("3 published projects"));
        assert!(!html.contains("Project D"), "Drafts must not render");
        let ai_group = html
            .split("id=\"tag-ai-agents\"")
            .nth(1)
            .and_then(|rest| rest.split("id=\"tag-n8n\"").next())
            .expect("AI group present");
        let b = ai_group.find("Project B").expect("B in AI group");
        let a = ai_group.find("Project A").expect("A in AI group");
        assert!(b < a, "Group ordered by project order");
    }

    #[test]
    fn test_empty_projects_page() {
        // Act
        let html = render(&Portfolio::default());

        // Assert
        assert!(html.contains("No projects found"));
        assert!(!html.contains("tag-other"));
    }
}
