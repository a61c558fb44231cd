use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use folio::portfolio::{FaqCategory, FaqQuestion};
use folio::{
    AboutChanges, Command, Config, Document, DocumentEdit, DocumentStore, EditSession,
    FaqCommand, FsStore, HeroChanges, LocalObjectStore, PageChanges, Portfolio, PortfolioEdit,
    ProjectCommand, ProjectStatus, ProjectUpdate, ResourceCommand, ResourcePage,
    ServiceCommand, ServiceUpdate, SessionId, SiteOptions, build_site, delete_page_with_files,
    download_report, format_date, render, slugify, write_downloads_csv,
};

/// Object bucket directory under the content root
const OBJECTS_DIR: &str = "objects";

/// Environment variable holding the URL signing secret
const SECRET_ENV: &str = "FOLIO_SIGNING_SECRET";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::parse();
    config.validate().context("Invalid configuration")?;

    let store = FsStore::new(&config.content);

    match &config.command {
        Command::Init => init(&store),
        Command::Build => build(&config, &store),
        Command::New {
            title,
            slug,
            template,
        } => new_page(&store, title, slug.as_deref(), *template),
        Command::Edit { slug, changes } => edit_page(&store, slug, changes),
        Command::Publish { slug } => edit_page(
            &store,
            slug,
            &PageChanges {
                publish: true,
                ..PageChanges::default()
            },
        ),
        Command::Unpublish { slug } => edit_page(
            &store,
            slug,
            &PageChanges {
                unpublish: true,
                ..PageChanges::default()
            },
        ),
        Command::List => list_pages(&store),
        Command::Delete { slug } => {
            store
                .delete_document(slug)
                .with_context(|| format!("Failed to delete page: {}", slug))?;
            println!("Deleted: {}", slug);
            Ok(())
        }
        Command::Render { file } => render_file(file),
        Command::ExportPortfolio { file } => export_portfolio(&store, file),
        Command::ImportPortfolio { file } => import_portfolio(&store, file),
        Command::Project(command) => project(&store, command),
        Command::Service(command) => service(&store, command),
        Command::Hero(changes) => hero(&store, changes),
        Command::About(changes) => about(&store, changes),
        Command::Faq(command) => faq(&store, command),
        Command::Resource(command) => resource(&config, &store, command),
    }
}

fn init(store: &FsStore) -> Result<()> {
    store
        .init()
        .with_context(|| format!("Failed to initialize {}", store.root().display()))?;

    if store.load_portfolio().context("Failed to read portfolio")?.is_none() {
        store
            .save_portfolio(&Portfolio::default())
            .context("Failed to write default portfolio")?;
    }

    println!("Initialized: {}", store.root().display());
    Ok(())
}

fn build(config: &Config, store: &FsStore) -> Result<()> {
    let portfolio = store.load_portfolio().context("Failed to load portfolio")?;
    let options = SiteOptions {
        site_name: Some(config.site_name(portfolio.as_ref())?),
        theme: config.theme.clone(),
        ..SiteOptions::default()
    };

    fs::create_dir_all(&config.output).context("Failed to create output directory")?;
    let summary = build_site(store, &config.output, &options)?;

    let index_path = config.output.join("index.html");
    println!("Generated: {}", index_path.display());
    println!(
        "Generated {} pages, {} resource pages, {} projects",
        summary.pages, summary.resources, summary.projects
    );

    if !config.no_open
        && let Err(e) = open::that(&index_path)
    {
        warn!(error = %e, "failed to open generated site");
    }

    Ok(())
}

fn new_page(store: &FsStore, title: &str, slug: Option<&str>, template: bool) -> Result<()> {
    if title.trim().is_empty() {
        bail!("Title must not be empty");
    }

    let mut document = match slug {
        Some(slug) => Document::with_slug(slug, title),
        None => Document::new(title),
    };
    if document.slug.is_empty() {
        bail!(
            "Slug must not be empty: '{}' has no URL safe characters",
            slug.unwrap_or(title)
        );
    }
    if template {
        document = document.templated();
    }

    let created = document.slug.clone();
    let mut session = EditSession::new(SessionId::new());
    session.import(document)?;
    session
        .save(store)
        .with_context(|| format!("Failed to create page: {}", created))?;

    println!("Created: {}", created);
    Ok(())
}

fn edit_page(store: &FsStore, slug: &str, changes: &PageChanges) -> Result<()> {
    if changes.is_empty() {
        bail!("No changes given for page: {}", slug);
    }

    let source = store
        .load_document(slug)
        .with_context(|| format!("Failed to load page: {}", slug))?;
    let mut session = EditSession::new(SessionId::new());
    session.load(&source)?;

    if let Some(title) = &changes.title {
        if title.trim().is_empty() {
            bail!("Title must not be empty");
        }
        session.mutate(DocumentEdit::Title(title.clone()))?;
    }
    if let Some(new_slug) = &changes.new_slug {
        if slugify(new_slug).is_empty() {
            bail!("Slug must not be empty: '{}' has no URL safe characters", new_slug);
        }
        session.mutate(DocumentEdit::Slug(new_slug.clone()))?;
    }
    if let Some(path) = &changes.body_file {
        let body = fs::read_to_string(path)
            .with_context(|| format!("Failed to read body file: {}", path.display()))?;
        session.mutate(DocumentEdit::Body(body))?;
    }
    if changes.publish {
        session.mutate(DocumentEdit::Published(true))?;
    } else if changes.unpublish {
        session.mutate(DocumentEdit::Published(false))?;
    }

    session
        .save(store)
        .with_context(|| format!("Failed to save page: {}", slug))?;

    let saved = session.last_saved().map_or(slug, |d| d.slug.as_str());
    println!("Saved: {}", saved);
    Ok(())
}

fn list_pages(store: &FsStore) -> Result<()> {
    let documents = store.list_documents().context("Failed to list pages")?;
    if documents.is_empty() {
        println!("No pages");
        return Ok(());
    }

    for doc in &documents {
        let status = if doc.published { "published" } else { "draft" };
        println!(
            "{:<28} {:<10} {:<13} {}",
            doc.slug,
            status,
            format_date(&doc.updated_at),
            doc.title
        );
    }
    Ok(())
}

fn render_file(file: &Path) -> Result<()> {
    let content = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    for block in render(&content) {
        println!("{:#?}", block);
    }
    Ok(())
}

fn export_portfolio(store: &FsStore, file: &Path) -> Result<()> {
    let portfolio = store
        .portfolio_or_default()
        .context("Failed to load portfolio")?;
    fs::write(file, portfolio.to_json()?)
        .with_context(|| format!("Failed to write {}", file.display()))?;

    println!("Exported: {}", file.display());
    Ok(())
}

fn import_portfolio(store: &FsStore, file: &Path) -> Result<()> {
    let json = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let snapshot = Portfolio::from_json(&json)?;

    let mut session = portfolio_session(store)?;
    session.import(snapshot)?;
    session.save(store).context("Failed to save portfolio")?;

    println!("Imported: {}", file.display());
    Ok(())
}

fn portfolio_session(store: &FsStore) -> Result<EditSession<Portfolio>> {
    let current = store
        .portfolio_or_default()
        .context("Failed to load portfolio")?;
    let mut session = EditSession::new(SessionId::new());
    session.load(&current)?;
    Ok(session)
}

fn project(store: &FsStore, command: &ProjectCommand) -> Result<()> {
    let mut session = portfolio_session(store)?;
    let known = |session: &EditSession<Portfolio>, id: &str| {
        session
            .draft()
            .is_some_and(|p| p.projects.iter().any(|project| project.id == id))
    };

    let edit = match command {
        ProjectCommand::List => {
            if let Some(portfolio) = session.draft() {
                let mut projects: Vec<_> = portfolio.projects.iter().collect();
                projects.sort_by_key(|p| p.order);
                for p in projects {
                    let status = match p.status {
                        ProjectStatus::Published => "published",
                        ProjectStatus::Draft => "draft",
                    };
                    println!("{:>3} {:<36} {:<10} {}", p.order, p.id, status, p.title);
                }
            }
            return Ok(());
        }
        ProjectCommand::Add { title, description } => {
            if title.trim().is_empty() {
                bail!("Title must not be empty");
            }
            PortfolioEdit::AddProject {
                title: title.clone(),
                description: description.clone(),
            }
        }
        ProjectCommand::Publish { id } | ProjectCommand::Unpublish { id } => {
            if !known(&session, id) {
                bail!("Unknown project: {}", id);
            }
            let status = if matches!(command, ProjectCommand::Publish { .. }) {
                ProjectStatus::Published
            } else {
                ProjectStatus::Draft
            };
            PortfolioEdit::UpdateProject {
                id: id.clone(),
                update: ProjectUpdate {
                    status: Some(status),
                    ..ProjectUpdate::default()
                },
            }
        }
        ProjectCommand::Remove { id } => {
            if !known(&session, id) {
                bail!("Unknown project: {}", id);
            }
            PortfolioEdit::DeleteProject(id.clone())
        }
        ProjectCommand::Reorder { ids } => {
            if let Some(unknown) = ids.iter().find(|id| !known(&session, id.as_str())) {
                bail!("Unknown project: {}", unknown);
            }
            PortfolioEdit::ReorderProjects(ids.clone())
        }
    };

    session.mutate(edit)?;
    session.save(store).context("Failed to save portfolio")?;

    if let ProjectCommand::Add { .. } = command
        && let Some(added) = session.last_saved().and_then(|p| p.projects.last())
    {
        println!("Added project: {}", added.id);
    } else {
        println!("Saved portfolio");
    }
    Ok(())
}

fn resource(config: &Config, store: &FsStore, command: &ResourceCommand) -> Result<()> {
    match command {
        ResourceCommand::New { title, description } => {
            let mut page = ResourcePage::new(title.as_str());
            if page.slug.is_empty() {
                bail!("Slug must not be empty: '{}' has no URL safe characters", title);
            }
            if store.load_resource_page(&page.slug).is_ok() {
                bail!("Resource page already exists: {}", page.slug);
            }
            page.description = description.clone();
            store
                .save_resource_page(&page)
                .context("Failed to save resource page")?;
            println!("Created resource page: {}", page.slug);
        }
        ResourceCommand::Attach {
            slug,
            file,
            description,
        } => {
            let mut page = load_resource(store, slug)?;
            let file_name = file
                .file_name()
                .and_then(|n| n.to_str())
                .with_context(|| format!("Invalid file name: {}", file.display()))?;
            let bytes =
                fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;

            let objects = object_store(config);
            let attached = page
                .attach_file(&objects, file_name, &bytes, description.clone())
                .with_context(|| format!("Failed to upload {}", file_name))?
                .id;
            store
                .save_resource_page(&page)
                .context("Failed to save resource page")?;
            println!("Attached: {} ({})", file_name, attached);
        }
        ResourceCommand::Detach { slug, file_id } => {
            let mut page = load_resource(store, slug)?;
            let file_name = page
                .file(*file_id)
                .map(|f| f.file_name.clone())
                .with_context(|| format!("Unknown file {} on page {}", file_id, slug))?;
            page.remove_file(&object_store(config), *file_id)
                .with_context(|| format!("Failed to delete {}", file_name))?;
            store
                .save_resource_page(&page)
                .context("Failed to save resource page")?;
            println!("Detached: {}", file_name);
        }
        ResourceCommand::Delete { slug } => {
            let removed = delete_page_with_files(store, &object_store(config), slug)
                .with_context(|| format!("Failed to delete resource page: {}", slug))?;
            println!("Deleted: {} ({} files)", slug, removed);
        }
        ResourceCommand::Publish { slug } | ResourceCommand::Unpublish { slug } => {
            let mut page = load_resource(store, slug)?;
            page.published = matches!(command, ResourceCommand::Publish { .. });
            page.updated_at = chrono::Utc::now();
            store
                .save_resource_page(&page)
                .context("Failed to save resource page")?;
            println!("Saved: {}", slug);
        }
        ResourceCommand::List => {
            let pages = store
                .list_resource_pages()
                .context("Failed to list resource pages")?;
            if pages.is_empty() {
                println!("No resource pages");
            }
            for page in &pages {
                let status = if page.published { "published" } else { "draft" };
                println!(
                    "{:<28} {:<10} {:>3} files  {}",
                    page.slug,
                    status,
                    page.files.len(),
                    page.title
                );
            }
        }
        ResourceCommand::Downloads { page, email, csv } => {
            let page_id = match page {
                Some(slug) => Some(load_resource(store, slug)?.id),
                None => None,
            };
            let rows = download_report(store, page_id, email.as_deref())
                .context("Failed to list downloads")?;

            match csv {
                Some(path) if path.as_os_str() == "-" => {
                    write_downloads_csv(&rows, &mut std::io::stdout().lock())
                        .context("Failed to write CSV")?;
                }
                Some(path) => {
                    let mut file = fs::File::create(path)
                        .with_context(|| format!("Failed to create {}", path.display()))?;
                    write_downloads_csv(&rows, &mut file)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Exported: {} ({} downloads)", path.display(), rows.len());
                }
                None => {
                    if rows.is_empty() {
                        println!("No downloads");
                    }
                    for row in &rows {
                        println!(
                            "{:<13} {:<32} {:<28} {}",
                            format_date(&row.downloaded_at),
                            row.email,
                            row.page,
                            row.file
                        );
                    }
                }
            }
        }
    }
    Ok(())
}

fn load_resource(store: &FsStore, slug: &str) -> Result<ResourcePage> {
    store
        .load_resource_page(slug)
        .with_context(|| format!("Failed to load resource page: {}", slug))
}

fn object_store(config: &Config) -> LocalObjectStore {
    let secret = std::env::var(SECRET_ENV).unwrap_or_default();
    LocalObjectStore::new(
        config.content.join(OBJECTS_DIR),
        config.storage_url.as_str(),
        secret.as_bytes(),
    )
}

/// Applies one edit to the stored portfolio through an editing session.
fn save_portfolio_edit(store: &FsStore, edit: PortfolioEdit) -> Result<Portfolio> {
    let mut session = portfolio_session(store)?;
    session.mutate(edit)?;
    session.save(store).context("Failed to save portfolio")?;
    session
        .last_saved()
        .cloned()
        .context("Portfolio missing after save")
}

fn service(store: &FsStore, command: &ServiceCommand) -> Result<()> {
    let current = store
        .portfolio_or_default()
        .context("Failed to load portfolio")?;
    let known = |id: &str| current.services.iter().any(|s| s.id == id);

    match command {
        ServiceCommand::List => {
            for s in current.sorted_services() {
                println!("{:>3} {:<36} {}", s.order, s.id, s.title);
            }
        }
        ServiceCommand::Add { title, description } => {
            if title.trim().is_empty() {
                bail!("Title must not be empty");
            }
            let saved = save_portfolio_edit(
                store,
                PortfolioEdit::AddService {
                    title: title.clone(),
                    description: description.clone(),
                },
            )?;
            if let Some(added) = saved.services.last() {
                println!("Added service: {}", added.id);
            }
        }
        ServiceCommand::Edit {
            id,
            title,
            description,
            features,
        } => {
            if !known(id) {
                bail!("Unknown service: {}", id);
            }
            let update = ServiceUpdate {
                title: title.clone(),
                description: description.clone(),
                features: (!features.is_empty()).then(|| features.clone()),
            };
            save_portfolio_edit(
                store,
                PortfolioEdit::UpdateService {
                    id: id.clone(),
                    update,
                },
            )?;
            println!("Saved portfolio");
        }
        ServiceCommand::Remove { id } => {
            if !known(id) {
                bail!("Unknown service: {}", id);
            }
            save_portfolio_edit(store, PortfolioEdit::DeleteService(id.clone()))?;
            println!("Saved portfolio");
        }
    }
    Ok(())
}

fn hero(store: &FsStore, changes: &HeroChanges) -> Result<()> {
    let mut hero = store
        .portfolio_or_default()
        .context("Failed to load portfolio")?
        .hero;
    if let Some(name) = &changes.full_name {
        hero.name = name.clone();
    }
    if let Some(subtitle) = &changes.subtitle {
        hero.subtitle = subtitle.clone();
    }
    if let Some(description) = &changes.description {
        hero.description = description.clone();
    }
    if !changes.tech_stack.is_empty() {
        hero.tech_stack = changes.tech_stack.clone();
    }

    save_portfolio_edit(store, PortfolioEdit::Hero(hero))?;
    println!("Saved portfolio");
    Ok(())
}

fn about(store: &FsStore, changes: &AboutChanges) -> Result<()> {
    let mut about = store
        .portfolio_or_default()
        .context("Failed to load portfolio")?
        .about;
    if let Some(bio) = &changes.bio {
        about.bio = bio.clone();
    }
    if let Some(mission) = &changes.mission {
        about.mission = mission.clone();
    }

    save_portfolio_edit(store, PortfolioEdit::About(about))?;
    println!("Saved portfolio");
    Ok(())
}

fn faq(store: &FsStore, command: &FaqCommand) -> Result<()> {
    let mut faq = store
        .portfolio_or_default()
        .context("Failed to load portfolio")?
        .faq;

    match command {
        FaqCommand::Add {
            category,
            question,
            answer,
        } => {
            let entry = FaqQuestion {
                question: question.clone(),
                answer: answer.clone(),
            };
            match faq.iter_mut().find(|c| c.category == *category) {
                Some(existing) => existing.questions.push(entry),
                None => faq.push(FaqCategory {
                    id: slugify(category),
                    category: category.clone(),
                    questions: vec![entry],
                }),
            }
        }
        FaqCommand::Remove { category, question } => {
            let entry = faq
                .iter_mut()
                .find(|c| c.category == *category)
                .with_context(|| format!("Unknown FAQ category: {}", category))?;
            let before = entry.questions.len();
            entry.questions.retain(|q| q.question != *question);
            if entry.questions.len() == before {
                bail!("Unknown FAQ question: {}", question);
            }
            faq.retain(|c| !c.questions.is_empty());
        }
    }

    save_portfolio_edit(store, PortfolioEdit::Faq(faq))?;
    println!("Saved portfolio");
    Ok(())
}
