//! Portfolio landing page generation

use maud::{Markup, html};

use crate::assets::{INDEX_CSS, MARKDOWN_CSS};
use crate::components::layout::{PageChrome, page_wrapper};
use crate::document::Document;
use crate::portfolio::{Portfolio, Project, Service};
use crate::resources::ResourcePage;

/// Data container for index page generation
pub struct IndexPageData<'a> {
    pub chrome: PageChrome<'a>,
    pub portfolio: &'a Portfolio,
    /// Published custom pages to link
    pub documents: &'a [Document],
    /// Published resource pages to link
    pub resources: &'a [ResourcePage],
}

/// Generates the landing page
///
/// Sections follow the portfolio layout: hero, about, projects, services,
/// pages and resources, FAQ and contact. Sections without content are
/// left out.
///
/// # Arguments
///
/// * `data`: Index page data container with all required fields
///
/// # Returns
///
/// Complete HTML markup for index page
pub fn generate(data: IndexPageData<'_>) -> Markup {
    let portfolio = data.portfolio;
    let projects = portfolio.published_projects();
    let services = portfolio.sorted_services();
    let stylesheets = vec![
        data.chrome.stylesheet(INDEX_CSS),
        data.chrome.stylesheet(MARKDOWN_CSS),
    ];

    page_wrapper(
        data.chrome.site_name,
        &data.chrome,
        &stylesheets,
        html! {
            section class="hero" {
                h1 { (portfolio.hero.name) }
                @if !portfolio.hero.subtitle.is_empty() {
                    p class="subtitle" { (portfolio.hero.subtitle) }
                }
                p { (portfolio.hero.description) }
                @if !portfolio.hero.tech_stack.is_empty() {
                    ul class="tech-stack" {
                        @for tech in &portfolio.hero.tech_stack {
                            li { (tech) }
                        }
                    }
                }
            }

            @if !portfolio.about.bio.is_empty() || !portfolio.about.stats.is_empty() {
                section class="section" id="about" {
                    h2 { "About" }
                    p { (portfolio.about.bio) }
                    @if !portfolio.about.mission.is_empty() {
                        p class="meta" { (portfolio.about.mission) }
                    }
                    div class="stats" {
                        @for stat in &portfolio.about.stats {
                            div class="card" {
                                div class="stat-value" { (stat.value) }
                                div class="meta" { (stat.label) }
                            }
                        }
                    }
                }
            }

            @if !projects.is_empty() {
                section class="section" id="projects" {
                    h2 { "Projects" }
                    div class="grid" {
                        @for project in &projects {
                            (project_card(project))
                        }
                    }
                    p { a href="projects.html" { "All projects" } }
                }
            }

            @if !services.is_empty() {
                section class="section" id="services" {
                    h2 { "Services" }
                    div class="grid" {
                        @for service in &services {
                            (service_card(service))
                        }
                    }
                }
            }

            @if !data.documents.is_empty() || !data.resources.is_empty() {
                section class="section" id="pages" {
                    h2 { "Pages" }
                    ul class="page-links" {
                        @for doc in data.documents {
                            li { a href=(format!("p/{}.html", doc.slug)) { (doc.title) } }
                        }
                        @for page in data.resources {
                            li {
                                a href=(format!("r/{}.html", page.slug)) { (page.title) }
                                " "
                                span class="meta" { "Free resource" }
                            }
                        }
                    }
                }
            }

            @if !portfolio.faq.is_empty() {
                section class="section faq" id="faq" {
                    h2 { "FAQ" }
                    @for category in &portfolio.faq {
                        h3 { (category.category) }
                        dl {
                            @for item in &category.questions {
                                dt { (item.question) }
                                dd { (item.answer) }
                            }
                        }
                    }
                }
            }

            (contact(portfolio))
        },
    )
}

pub(crate) fn project_card(project: &Project) -> Markup {
    html! {
        article class="card project" {
            h3 { (project.title) }
            p { (project.description) }
            @if !project.tags.is_empty() {
                ul class="tags" {
                    @for tag in &project.tags {
                        li { (tag) }
                    }
                }
            }
            @if !project.results.is_empty() {
                ul class="results" {
                    @for result in &project.results {
                        li { (result) }
                    }
                }
            }
        }
    }
}

fn service_card(service: &Service) -> Markup {
    html! {
        article class="card service" {
            h3 { (service.title) }
            p { (service.description) }
            @if !service.features.is_empty() {
                ul class="results" {
                    @for feature in &service.features {
                        li { (feature) }
                    }
                }
            }
        }
    }
}

fn contact(portfolio: &Portfolio) -> Markup {
    let contact = &portfolio.contact;
    let links: Vec<_> = contact.social_links.iter().filter(|l| l.visible).collect();

    html! {
        @if !contact.email.is_empty() || !links.is_empty() {
            section class="section" id="contact" {
                h2 { "Contact" }
                @if !contact.email.is_empty() {
                    p { a href=(format!("mailto:{}", contact.email)) { (contact.email) } }
                }
                @if !contact.location.is_empty() {
                    p class="meta" { (contact.location) }
                }
                @if !links.is_empty() {
                    ul class="tech-stack" {
                        @for link in &links {
                            li {
                                a href=(link.url) target="_blank" rel="noopener noreferrer" {
                                    (link.platform)
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
