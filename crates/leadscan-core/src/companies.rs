//! Loading the list of companies to scan.
//!
//! Two formats are accepted: YAML (`companies:` list) and CSV with a header
//! row naming `name`, `domain` and `department` in any order and case.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::scan::{CompanyInput, ScanTarget};
use crate::ConfigError;

#[derive(Debug, Clone, Deserialize)]
pub struct CompanyEntry {
    pub name: String,
    pub domain: String,
    #[serde(default)]
    pub department: String,
}

#[derive(Debug, Deserialize)]
pub struct CompaniesFile {
    pub companies: Vec<CompanyEntry>,
}

/// Load and validate scan targets from a YAML or CSV file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read or parsed, a domain is
/// unusable, or the same `(domain, department)` appears twice.
pub fn load_scan_targets(path: &Path) -> Result<Vec<ScanTarget>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CompaniesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

    let entries = if is_yaml {
        let file: CompaniesFile =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::CompaniesFileParse {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        file.companies
    } else {
        parse_companies_csv(&content).map_err(|reason| ConfigError::CompaniesFileParse {
            path: path.display().to_string(),
            reason,
        })?
    };

    build_targets(entries)
}

fn build_targets(entries: Vec<CompanyEntry>) -> Result<Vec<ScanTarget>, ConfigError> {
    let mut seen = HashSet::new();
    let mut targets = Vec::with_capacity(entries.len());

    for entry in entries {
        let name = entry.name.trim();
        if name.is_empty() {
            return Err(ConfigError::Validation(
                "company name must be non-empty".to_string(),
            ));
        }

        let domain = normalize_domain(&entry.domain).ok_or_else(|| {
            ConfigError::Validation(format!(
                "company '{name}' has an invalid domain '{}'",
                entry.domain
            ))
        })?;
        let department = entry.department.trim().to_string();

        if !seen.insert((domain.clone(), department.clone())) {
            return Err(ConfigError::Validation(format!(
                "duplicate scan key: domain '{domain}', department '{department}'"
            )));
        }

        targets.push(ScanTarget {
            company: CompanyInput {
                name: name.to_string(),
                domain,
            },
            department,
        });
    }

    Ok(targets)
}

/// Parse CSV company rows. Rows without a name or domain are skipped.
///
/// # Errors
///
/// Returns a message when the header is missing a required column.
pub fn parse_companies_csv(content: &str) -> Result<Vec<CompanyEntry>, String> {
    let mut lines = content
        .lines()
        .map(|l| l.trim_end_matches('\r'))
        .filter(|l| !l.trim().is_empty());

    let header = lines.next().ok_or_else(|| "file is empty".to_string())?;
    let columns: Vec<String> = split_csv_line(header)
        .into_iter()
        .map(|c| c.trim().to_lowercase())
        .collect();

    let position = |wanted: &str| -> Result<usize, String> {
        columns
            .iter()
            .position(|c| c == wanted)
            .ok_or_else(|| format!("header must include a '{wanted}' column"))
    };
    let name_idx = position("name")?;
    let domain_idx = position("domain")?;
    let department_idx = position("department")?;

    let entries = lines
        .filter_map(|line| {
            let fields = split_csv_line(line);
            let field = |idx: usize| fields.get(idx).map_or("", |f| f.trim()).to_string();
            let name = field(name_idx);
            let domain = field(domain_idx);
            if name.is_empty() || domain.is_empty() {
                return None;
            }
            Some(CompanyEntry {
                name,
                domain,
                department: field(department_idx),
            })
        })
        .collect();

    Ok(entries)
}

/// Split one CSV line on commas, honouring double-quoted fields and `""`
/// escapes.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// Reduce a URL or host to a bare lowercase domain: scheme, `www.`, port and
/// path are stripped. Returns `None` when nothing domain-like remains.
#[must_use]
pub fn normalize_domain(input: &str) -> Option<String> {
    let trimmed = input.trim();
    let without_scheme = trimmed
        .split_once("://")
        .map_or(trimmed, |(_, rest)| rest);
    let host = without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    let host = host.rsplit_once('@').map_or(host, |(_, h)| h);
    let host = host.split(':').next().unwrap_or_default();
    let host = host.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);

    let looks_valid = host.contains('.')
        && !host.starts_with('.')
        && !host.ends_with('.')
        && !host.chars().any(char::is_whitespace);
    looks_valid.then(|| host.to_string())
}
