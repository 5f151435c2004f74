//! `.gitignore` generation from github/gitignore templates.

use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info};

use crate::error::GitignoreError;

pub const TEMPLATE_BASE_URL: &str = "https://raw.githubusercontent.com/github/gitignore/main";

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Template file stem as named upstream: `go` → `Go`, `visual-studio` → `Visual-Studio`.
pub fn template_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut at_word_start = true;
    for c in name.trim().chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        at_word_start = !c.is_alphanumeric();
    }
    out
}

/// Where the generated file went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateReport {
    pub path: PathBuf,
    /// Previous file, if one was moved aside.
    pub backup: Option<PathBuf>,
}

pub struct TemplateClient {
    client: reqwest::Client,
    base_url: String,
}

impl TemplateClient {
    pub fn new() -> Result<Self, GitignoreError> {
        Self::with_base_url(TEMPLATE_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, GitignoreError> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|source| GitignoreError::Fetch {
                name: base_url.to_string(),
                source,
            })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch one template. Anything but HTTP 200 means it does not exist.
    pub async fn fetch(&self, name: &str) -> Result<String, GitignoreError> {
        let upstream = template_name(name);
        let url = format!("{}/{}.gitignore", self.base_url, upstream);
        debug!("GET {}", url);

        let fetch_err = |source| GitignoreError::Fetch {
            name: name.to_string(),
            source,
        };
        let response = self.client.get(&url).send().await.map_err(fetch_err)?;
        if response.status() != reqwest::StatusCode::OK {
            debug!("Template {} returned HTTP {}", upstream, response.status());
            return Err(GitignoreError::TemplateNotFound(upstream));
        }
        response.text().await.map_err(fetch_err)
    }

    /// Concatenate templates, each under a `### name ###` header.
    pub async fn render(&self, templates: &[String]) -> Result<String, GitignoreError> {
        if templates.is_empty() {
            return Err(GitignoreError::NoTemplates);
        }

        let mut out = String::new();
        for name in templates {
            let content = self.fetch(name).await?;
            let _ = write!(out, "### {name} ###\n{content}\n\n");
        }
        Ok(out)
    }
}

/// Write `content` as `dir/.gitignore`, moving an existing file to
/// `.gitignore.backup` first.
pub fn write_gitignore(dir: &Path, content: &str) -> Result<GenerateReport, GitignoreError> {
    let path = dir.join(".gitignore");
    let backup = if path.exists() {
        let backup = dir.join(".gitignore.backup");
        fs::rename(&path, &backup).map_err(GitignoreError::Backup)?;
        info!("Backed up existing .gitignore to {}", backup.display());
        Some(backup)
    } else {
        None
    };

    fs::write(&path, content).map_err(GitignoreError::Write)?;
    Ok(GenerateReport { path, backup })
}

/// Fetch every template and write the combined file into `dir`.
///
/// Nothing is written unless all templates were fetched.
pub async fn generate(
    client: &TemplateClient,
    templates: &[String],
    dir: &Path,
) -> Result<GenerateReport, GitignoreError> {
    let content = client.render(templates).await?;
    write_gitignore(dir, &content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    async fn server_with_templates() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/Go.gitignore"))
            .respond_with(ResponseTemplate::new(200).set_body_string("*.exe\nvendor/"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/Node.gitignore"))
            .respond_with(ResponseTemplate::new(200).set_body_string("node_modules/"))
            .mount(&server)
            .await;
        server
    }

    #[test]
    fn test_template_name_title_cases() {
        assert_eq!(template_name("go"), "Go");
        assert_eq!(template_name("NODE"), "Node");
        assert_eq!(template_name(" python "), "Python");
        assert_eq!(template_name("visual-studio"), "Visual-Studio");
        assert_eq!(template_name(""), "");
    }

    #[tokio::test]
    async fn test_render_concatenates_blocks_in_order() {
        let server = server_with_templates().await;
        let client = TemplateClient::with_base_url(&server.uri()).unwrap();

        let content = client.render(&names(&["go", "node"])).await.unwrap();

        assert_eq!(
            content,
            "### go ###\n*.exe\nvendor/\n\n### node ###\nnode_modules/\n\n"
        );
    }

    #[tokio::test]
    async fn test_unknown_template_is_not_found() {
        let server = server_with_templates().await;
        let client = TemplateClient::with_base_url(&server.uri()).unwrap();

        let err = client.fetch("cobol").await.unwrap_err();
        assert!(matches!(err, GitignoreError::TemplateNotFound(name) if name == "Cobol"));
    }

    #[tokio::test]
    async fn test_no_templates_is_error() {
        let client = TemplateClient::with_base_url("http://127.0.0.1:9").unwrap();
        assert!(matches!(client.render(&[]).await, Err(GitignoreError::NoTemplates)));
    }

    #[tokio::test]
    async fn test_generate_backs_up_existing_file() {
        let server = server_with_templates().await;
        let client = TemplateClient::with_base_url(&server.uri()).unwrap();
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".gitignore"), "old rules\n").unwrap();

        let report = generate(&client, &names(&["go"]), dir.path()).await.unwrap();

        assert_eq!(report.backup, Some(dir.path().join(".gitignore.backup")));
        assert_eq!(
            fs::read_to_string(dir.path().join(".gitignore.backup")).unwrap(),
            "old rules\n"
        );
        assert!(fs::read_to_string(&report.path).unwrap().starts_with("### go ###\n"));
    }

    #[tokio::test]
    async fn test_generate_writes_nothing_when_a_template_is_missing() {
        let server = server_with_templates().await;
        let client = TemplateClient::with_base_url(&server.uri()).unwrap();
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".gitignore"), "old rules\n").unwrap();

        let result = generate(&client, &names(&["go", "cobol"]), dir.path()).await;

        assert!(matches!(result, Err(GitignoreError::TemplateNotFound(_))));
        assert_eq!(
            fs::read_to_string(dir.path().join(".gitignore")).unwrap(),
            "old rules\n"
        );
        assert!(!dir.path().join(".gitignore.backup").exists());
    }

    #[test]
    fn test_write_gitignore_without_existing_file() {
        let dir = TempDir::new().unwrap();
        let report = write_gitignore(dir.path(), "target/\n").unwrap();

        assert!(report.backup.is_none());
        assert_eq!(fs::read_to_string(report.path).unwrap(), "target/\n");
    }
}
