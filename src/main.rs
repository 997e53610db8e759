mod cache;
mod collector;
mod config;
mod jira_client;
mod logging;
mod metrics;
mod models;
mod progress_graph;
mod renderer;
mod report;
mod routes;
mod time_graph;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use cache::QueryCache;
use collector::Collector;
use config::Settings;
use jira_client::JiraClient;
use metrics::Weighting;
use models::Project;
use report::GraphType;

const GRAPH_DIR: &str = "graphs";

#[derive(Parser)]
#[command(name = "jira-burnup-report")]
#[command(about = "Burn-up charts and completion predictions for Jira projects", long_about = None)]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write charts to the graphs directory and print completion predictions
    Report {
        /// The projects YAML file
        projects_file: PathBuf,
        /// Use cached Jira data to avoid making live queries
        #[arg(short = 'c', long)]
        use_cache: bool,
        /// Only report on these projects (default: all)
        #[arg(short, long = "project")]
        projects: Vec<String>,
        /// Only produce this kind of output (default: all)
        #[arg(short, long, value_enum)]
        graph: Option<GraphType>,
    },
    /// Serve charts over HTTP, rendered from cached Jira data
    Serve {
        /// The projects YAML file
        projects_file: PathBuf,
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
}

#[derive(Clone)]
struct AppState {
    collector: Arc<Collector>,
    projects: Arc<Vec<Project>>,
    settings: Arc<Settings>,
}

pub(crate) fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let settings = Settings::from_env().context("Could not read Jira settings")?;
    let collector = Collector::new(
        JiraClient::new(&settings),
        QueryCache::new(&settings.cache_directory),
        settings.story_points_field.clone(),
    );

    match cli.command {
        Commands::Report {
            projects_file,
            use_cache,
            projects,
            graph,
        } => {
            let all_projects = config::load_projects(&projects_file)?;
            let selected = select_projects(all_projects, &projects)?;
            run_report(&collector, &settings, &selected, graph, use_cache).await?;
        }
        Commands::Serve { projects_file, port } => {
            let projects = config::load_projects(&projects_file)?;
            serve(collector, settings, projects, port).await?;
        }
    }

    Ok(())
}

fn select_projects(all_projects: Vec<Project>, names: &[String]) -> anyhow::Result<Vec<Project>> {
    if names.is_empty() {
        return Ok(all_projects);
    }
    if let Some(unknown) = names.iter().find(|name| !all_projects.iter().any(|p| &p.name == *name)) {
        anyhow::bail!("No project named {}", unknown);
    }
    Ok(all_projects
        .into_iter()
        .filter(|project| names.contains(&project.name))
        .collect())
}

fn write_graph(graph_type: &str, svg_content: &str) -> anyhow::Result<()> {
    let graph_dir = Path::new(GRAPH_DIR);
    std::fs::create_dir_all(graph_dir).context("Could not create graphs directory")?;
    let path = report::graph_file(graph_dir, graph_type, today());
    std::fs::write(&path, svg_content).with_context(|| format!("Could not write {}", path.display()))?;
    tracing::info!(path = %path.display(), "Graph written");
    Ok(())
}

async fn run_report(
    collector: &Collector,
    settings: &Settings,
    projects: &[Project],
    graph: Option<GraphType>,
    use_cache: bool,
) -> anyhow::Result<()> {
    let wants = |graph_type: GraphType| graph.map_or(true, |chosen| chosen == graph_type);
    let today = today();
    let mut all_progress = BTreeMap::new();

    for project in projects {
        let issues = collector
            .collect_issues(&project.query, use_cache)
            .await
            .with_context(|| format!("Could not collect issues for {}", project.name))?;
        if issues.is_empty() {
            tracing::warn!(project = %project.name, "No issues found");
            continue;
        }

        if wants(GraphType::Completion) {
            print!("{}", report::predict_completion(project, &issues, settings, today)?);
        }

        let series = report::created_and_closed(&issues, settings, Weighting::IssueCount)?;
        all_progress.insert(project.name.clone(), report::project_progress(project, &series, today));

        if wants(GraphType::Points) {
            if let Some(svg_content) = report::points_chart(project, &issues, settings, today)? {
                write_graph(&format!("{} daily rates", project.name), &svg_content)?;
            }
        }

        if wants(GraphType::Issues) {
            write_graph(
                &format!("{} issues over time", project.name),
                &report::issues_chart(project, &series, today),
            )?;
        }
    }

    if wants(GraphType::Projects) {
        write_graph("all projects", &progress_graph::render_projects(&all_progress))?;
    }
    Ok(())
}

async fn serve(collector: Collector, settings: Settings, projects: Vec<Project>, port: u16) -> anyhow::Result<()> {
    let state = AppState {
        collector: Arc::new(collector),
        projects: Arc::new(projects),
        settings: Arc::new(settings),
    };

    let app = axum::Router::new()
        .route("/", axum::routing::get(routes::root::root))
        .route("/projects.svg", axum::routing::get(routes::project_graph::projects_svg))
        .route(
            "/project/{project_name}/issues.svg",
            axum::routing::get(routes::project_graph::issues_svg),
        )
        .route(
            "/project/{project_name}/points.svg",
            axum::routing::get(routes::project_graph::points_svg),
        )
        .nest_service("/graphs", tower_http::services::ServeDir::new(GRAPH_DIR))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Could not bind to port {}", port))?;
    tracing::info!(port, "Serving charts");
    axum::serve(listener, app).await.context("Could not start server")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(name: &str) -> Project {
        Project {
            name: name.to_string(),
            query: format!("project = {}", name),
            dev_days: None,
            done: false,
            disabled: false,
        }
    }

    #[test]
    fn selects_all_projects_by_default() {
        let selected = select_projects(vec![project("WEB"), project("SRCH")], &[]).unwrap();
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn selects_named_projects() {
        let selected = select_projects(vec![project("WEB"), project("SRCH")], &["SRCH".to_string()]).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, "SRCH");
    }

    #[test]
    fn unknown_project_is_an_error() {
        assert!(select_projects(vec![project("WEB")], &["OPS".to_string()]).is_err());
    }

    #[test]
    fn cli_parses_report_options() {
        let cli = Cli::parse_from(["jira-burnup-report", "report", "projects.yml", "-c", "--graph", "issues", "-p", "WEB"]);
        match cli.command {
            Commands::Report {
                use_cache,
                projects,
                graph,
                ..
            } => {
                assert!(use_cache);
                assert_eq!(projects, vec!["WEB".to_string()]);
                assert_eq!(graph, Some(GraphType::Issues));
            }
            Commands::Serve { .. } => panic!("expected report"),
        }
    }
}
