use crate::models::Project;
use crate::AppState;
use itertools::Itertools;

/// Path of a project chart, with the project name as one percent-encoded segment.
pub(crate) fn chart_path(project_name: &str, chart: &str) -> String {
    // Form encoding turns spaces into '+', which a path does not decode back.
    let segment = url::form_urlencoded::byte_serialize(project_name.as_bytes())
        .collect::<String>()
        .replace('+', "%20");
    format!("/project/{}/{}.svg", segment, chart)
}

pub(crate) fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn project_list_html(projects: &[Project]) -> String {
    projects
        .iter()
        .map(|project| {
            let points_button = if project.dev_days.is_some() {
                format!(
                    "<button hx-get=\"{}\" hx-target=\"next .graph\">Points/Dev-Day</button>",
                    escape_html(&chart_path(&project.name, "points"))
                )
            } else {
                String::new()
            };
            format!(
                "
            <li>
                <div>
                    <span>{}{}</span><br>
                    <button hx-get=\"{}\" hx-target=\"next .graph\">Issue Burnup</button>
                    {}
                    <div class=\"graph\"></div>
                </div>
            </li>",
                escape_html(&project.name),
                if project.done { " (done)" } else { "" },
                escape_html(&chart_path(&project.name, "issues")),
                points_button
            )
        })
        .join("")
}

pub async fn root(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> axum::response::Html<String> {
    axum::response::Html(format!(
        r#"
        <!DOCTYPE html>
        <html>
            <head>
                <script src="https://unpkg.com/htmx.org@2.0.4"></script>
            </head>
            <body>
                <h1>Projects</h1>
                <img src="/projects.svg" alt="All projects">
                <ul>
                    {}
                </ul>
            </body>
        </html>
        "#,
        project_list_html(&state.projects)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn project(name: &str) -> Project {
        Project {
            name: name.to_string(),
            query: "project = WEB".to_string(),
            dev_days: Some(BTreeMap::new()),
            done: false,
            disabled: false,
        }
    }

    #[test]
    fn chart_path_keeps_project_name_in_one_segment() {
        assert_eq!(chart_path("Search/Browse", "issues"), "/project/Search%2FBrowse/issues.svg");
        assert_eq!(chart_path("Q&A #2?", "points"), "/project/Q%26A%20%232%3F/points.svg");
        assert_eq!(chart_path("Checkout", "issues"), "/project/Checkout/issues.svg");
    }

    #[test]
    fn plus_in_project_name_survives_encoding() {
        assert_eq!(chart_path("C++", "issues"), "/project/C%2B%2B/issues.svg");
    }

    #[test]
    fn escapes_markup_in_labels() {
        assert_eq!(escape_html("<b>R&D</b> \"x\""), "&lt;b&gt;R&amp;D&lt;/b&gt; &quot;x&quot;");
    }

    #[test]
    fn project_list_uses_encoded_paths_and_escaped_names() {
        let html = project_list_html(&[project("Search/Browse <beta>")]);

        assert!(html.contains("hx-get=\"/project/Search%2FBrowse%20%3Cbeta%3E/issues.svg\""));
        assert!(html.contains("hx-get=\"/project/Search%2FBrowse%20%3Cbeta%3E/points.svg\""));
        assert!(html.contains("<span>Search/Browse &lt;beta&gt;</span>"));
        assert!(!html.contains("<beta>"));
    }
}
