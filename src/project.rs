//! Projects and server-side idea generation.
//!
//! The current project is remembered in the config file's
//! `currentProjectId`, which `create-project` rewrites.

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::json;
use std::io::{BufRead, Write};
use std::path::Path;
use tracing::info;

use crate::client::{decode_json, expect_status, ApiClient};
use crate::config::{save_config, Config};
use crate::models::{IdeasRequest, IdeasResponse, Project};
use crate::session::Session;

pub fn create_project(session: &Session, title: &str, topic: &str) -> Result<Project> {
    let body = json!({ "title": title, "topic": topic });
    let response = session
        .client
        .post_json(&session.customer_path("/createProject"), &body)?;
    let response = expect_status(response, "POST", StatusCode::OK)?;
    Ok(decode_json(response)?)
}

pub fn get_project(client: &ApiClient, project_id: &str) -> Result<Project> {
    let response = client.get(&format!("/projects/{}", project_id), &[])?;
    let response = expect_status(response, "GET", StatusCode::OK)?;
    Ok(decode_json(response)?)
}

pub fn request_ideas(
    client: &ApiClient,
    project_id: &str,
    request: &IdeasRequest,
) -> Result<IdeasResponse> {
    let response = client.post_json(&format!("/projects/{}/generateIdeas", project_id), request)?;
    let response = expect_status(response, "POST", StatusCode::OK)?;
    Ok(decode_json(response)?)
}

/// Generate ideas, then keep regenerating with the user's feedback until an
/// empty line (or end of input). Returns the number of rounds requested.
pub fn idea_loop<R, W, F>(k: u8, input: &mut R, out: &mut W, mut fetch: F) -> Result<usize>
where
    R: BufRead,
    W: Write,
    F: FnMut(&IdeasRequest) -> Result<IdeasResponse>,
{
    let mut request = IdeasRequest {
        k,
        ..Default::default()
    };
    let mut rounds = 0;

    loop {
        let response = fetch(&request)?;
        rounds += 1;

        writeln!(out, "\nIdeas:")?;
        for idea in &response.ideas {
            writeln!(out, "- {}", idea.title)?;
        }
        writeln!(out)?;
        write!(out, "Feedback (empty to exit): ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let feedback = line.trim_end_matches(['\r', '\n']);
        if feedback.is_empty() {
            break;
        }

        request.feedback = Some(feedback.to_string());
        request.conversation_id = Some(response.conversation_id);
        writeln!(out, "Re-generating with feedback ...")?;
    }

    Ok(rounds)
}

/// CLI entry point for `create-project`. Writes the new id to the config file.
pub fn run_create_project(
    config_path: &Path,
    config: &Config,
    title: &str,
    topic: &str,
) -> Result<()> {
    let session = Session::resolve(config)?;
    let project = create_project(&session, title, topic).context("issue creating the project")?;

    let mut updated = config.clone();
    updated.current_project_id = project.id.to_string();
    save_config(config_path, &updated)?;
    info!(project = %project.id, "saved current project");

    println!("{}", serde_json::to_string_pretty(&project)?);
    Ok(())
}

/// CLI entry point for `get-project`.
pub fn run_get_project(config: &Config) -> Result<()> {
    let project_id = config.current_project_id()?;
    let client = ApiClient::new(config)?;
    let project = get_project(&client, project_id).context("issue getting the project")?;
    println!("{}", serde_json::to_string_pretty(&project)?);
    Ok(())
}

/// CLI entry point for `generate-ideas`.
pub fn run_generate_ideas(config: &Config, k: u8) -> Result<()> {
    let project_id = config.current_project_id()?;
    let client = ApiClient::new(config)?;
    let project = get_project(&client, project_id).context("issue getting the project")?;
    println!("generating project ideas for project: {} ...", project.id);

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    idea_loop(k, &mut stdin.lock(), &mut stdout.lock(), |request| {
        request_ideas(&client, project_id, request)
    })
    .context("error generating ideas")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProjectIdea;
    use std::io::Cursor;

    fn ideas(round: usize) -> IdeasResponse {
        IdeasResponse {
            ideas: vec![
                ProjectIdea {
                    id: None,
                    title: format!("idea {}a", round),
                    used: false,
                },
                ProjectIdea {
                    id: None,
                    title: format!("idea {}b", round),
                    used: false,
                },
            ],
            conversation_id: "conv-1".to_string(),
        }
    }

    #[test]
    fn feedback_is_threaded_through_conversation() {
        let mut input = Cursor::new("make them shorter\n\n");
        let mut out = Vec::new();
        let mut seen = Vec::new();

        let rounds = idea_loop(3, &mut input, &mut out, |req| {
            seen.push(req.clone());
            Ok(ideas(seen.len()))
        })
        .unwrap();

        assert_eq!(rounds, 2);
        assert_eq!(seen[0], IdeasRequest { k: 3, ..Default::default() });
        assert_eq!(seen[1].feedback.as_deref(), Some("make them shorter"));
        assert_eq!(seen[1].conversation_id.as_deref(), Some("conv-1"));

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("- idea 1a"));
        assert!(printed.contains("- idea 2b"));
        assert!(printed.contains("Re-generating with feedback"));
    }

    #[test]
    fn end_of_input_stops_after_first_round() {
        let mut input = Cursor::new("");
        let mut out = Vec::new();
        let rounds = idea_loop(1, &mut input, &mut out, |_| Ok(ideas(1))).unwrap();
        assert_eq!(rounds, 1);
    }

    #[test]
    fn fetch_error_propagates() {
        let mut input = Cursor::new("\n");
        let mut out = Vec::new();
        let result = idea_loop(2, &mut input, &mut out, |_| anyhow::bail!("boom"));
        assert!(result.is_err());
    }
}
