use std::fs;
use std::path::{Path, PathBuf};

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::header::{AUTHORIZATION, USER_AGENT};
use serde::Serialize;
use tracing::{debug, info};
use url::Url;

use crate::utils::PipelineError;
use crate::Result;

const RAW_CONTENT_HOST: &str = "https://raw.githubusercontent.com/";
const GITHUB_PREFIXES: [&str; 2] = ["https://github.com/", "http://github.com/"];

/// Bytes left unescaped in the file path: ASCII alphanumerics, `_.-~` and `/`
const PATH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~')
    .remove(b'/');

/// Sentinel repository value that copies from the local filesystem instead
pub const LOCAL_REPO: &str = "local";

#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Repository URL (`https://github.com/owner/name[.git]`), `owner/name`, or `local`
    pub repo: String,
    /// Branch, tag or commit
    pub git_ref: String,
    /// File path inside the repository
    pub path: String,
    /// Target file, or a directory receiving a file named after `path`
    pub output: PathBuf,
    /// Base directory for `local` copies
    pub local_root: PathBuf,
    /// Optional token for private repositories
    pub github_token: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DownloadReport {
    pub source: String,
    pub output_file: PathBuf,
    pub bytes: u64,
}

/// Build the raw-content URL for a file in a GitHub repository
///
/// Trailing slashes, a `.git` suffix and the `github.com` prefix are removed
/// from `repo`. The ref is used as given; the file path is percent-encoded
/// except for its `/` separators. The same triple always maps to the same URL.
pub fn raw_url(repo: &str, git_ref: &str, file_path: &str) -> Result<String> {
    let mut cleaned = repo.trim_end_matches('/');
    cleaned = cleaned.strip_suffix(".git").unwrap_or(cleaned);
    for prefix in GITHUB_PREFIXES {
        cleaned = cleaned.strip_prefix(prefix).unwrap_or(cleaned);
    }

    let file_path = file_path.trim_start_matches('/');
    if cleaned.is_empty() || git_ref.is_empty() || file_path.is_empty() {
        return Err(PipelineError::ValidationError(format!(
            "repo, ref and path are required (got repo='{}', ref='{}', path='{}')",
            repo, git_ref, file_path
        )));
    }

    let raw = format!(
        "{}{}/{}/{}",
        RAW_CONTENT_HOST,
        cleaned,
        git_ref,
        utf8_percent_encode(file_path, PATH_ENCODE_SET)
    );
    Url::parse(&raw).map_err(|e| PipelineError::DownloadError(format!("invalid url '{}': {}", raw, e)))?;
    Ok(raw)
}

/// Output paths with an extension are files; anything else is a directory
pub fn resolve_output_path(output: &Path, file_name: &str) -> PathBuf {
    if output.extension().is_some() {
        output.to_path_buf()
    } else {
        output.join(file_name)
    }
}

/// Fetch the dataset file and store it at the resolved output path
pub fn run(options: &DownloadOptions) -> Result<DownloadReport> {
    let file_name = Path::new(&options.path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            PipelineError::ValidationError(format!("path '{}' has no file name", options.path))
        })?;
    let output_file = resolve_output_path(&options.output, &file_name);

    if options.repo.eq_ignore_ascii_case(LOCAL_REPO) {
        return copy_local(options, output_file);
    }

    let url = raw_url(&options.repo, &options.git_ref, &options.path)?;
    info!(url = %url, "downloading dataset");
    let bytes = download_to(&url, options.github_token.as_deref(), &output_file)?;
    info!(path = %output_file.display(), bytes, "dataset downloaded");

    Ok(DownloadReport {
        source: url,
        output_file,
        bytes,
    })
}

/// Fetch `url` and write the body to `output_file`; nothing is written on failure
fn download_to(url: &str, token: Option<&str>, output_file: &Path) -> Result<u64> {
    let payload = fetch(url, token)?;
    create_parent(output_file)?;
    fs::write(output_file, &payload)?;
    Ok(payload.len() as u64)
}

fn copy_local(options: &DownloadOptions, output_file: PathBuf) -> Result<DownloadReport> {
    let source = options.local_root.join(&options.path);
    if !source.is_file() {
        return Err(PipelineError::MissingInput(source));
    }

    create_parent(&output_file)?;
    let bytes = fs::copy(&source, &output_file)?;
    info!(
        source = %source.display(),
        path = %output_file.display(),
        "copied local dataset"
    );

    Ok(DownloadReport {
        source: source.display().to_string(),
        output_file,
        bytes,
    })
}

fn fetch(url: &str, token: Option<&str>) -> Result<Vec<u8>> {
    let client = reqwest::blocking::Client::new();
    let mut request = client.get(url).header(
        USER_AGENT,
        concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")),
    );
    if let Some(token) = token.filter(|t| !t.is_empty()) {
        debug!("using GITHUB_TOKEN for authorization");
        request = request.header(AUTHORIZATION, format!("token {}", token));
    }

    let response = request
        .send()
        .map_err(|e| PipelineError::DownloadError(format!("request to {} failed: {}", url, e)))?;

    let status = response.status();
    if status.as_u16() >= 400 {
        return Err(PipelineError::DownloadError(format!(
            "download failed with status {}",
            status
        )));
    }

    let body = response
        .bytes()
        .map_err(|e| PipelineError::DownloadError(format!("failed to read body: {}", e)))?;
    Ok(body.to_vec())
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
