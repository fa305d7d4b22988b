use leadscan_core::{normalize_domain, EmailPatternRecord};
use leadscan_db::CandidateReportRow;

/// Print the stored company, its pattern ledger, and every contact with the
/// candidates at or above `min_confidence`.
///
/// # Errors
///
/// Returns an error if `domain` is not a domain, no company is stored for
/// it, or a query fails.
pub(crate) async fn run_show(
    pool: &sqlx::PgPool,
    domain: &str,
    min_confidence: f64,
) -> anyhow::Result<()> {
    let domain =
        normalize_domain(domain).ok_or_else(|| anyhow::anyhow!("'{domain}' is not a valid domain"))?;
    let company = leadscan_db::get_company_by_domain(pool, &domain)
        .await?
        .ok_or_else(|| anyhow::anyhow!("no company stored for {domain}; run `leadscan scan` first"))?;
    let patterns = leadscan_db::list_domain_patterns(pool, &domain).await?;
    let rows = leadscan_db::list_candidates_for_company(pool, company.id, min_confidence).await?;

    println!("Company: {} ({})", company.name, company.domain);
    println!();
    print_patterns(&patterns);
    println!();
    print_contacts(&rows, min_confidence);
    Ok(())
}

fn print_patterns(patterns: &[EmailPatternRecord]) {
    if patterns.is_empty() {
        println!("no learned patterns yet");
        return;
    }
    println!("{:<14}{:<10}{:<12}SAMPLE", "PATTERN", "HITS", "VERIFIED");
    for p in patterns {
        println!(
            "{:<14}{:<10}{:<12}{}",
            p.pattern.as_str(),
            format!(
                "{}/{}",
                p.success_count.unwrap_or(0),
                p.total_count.unwrap_or(0)
            ),
            p.verified_at
                .map_or_else(|| "\u{2014}".to_string(), |t| t.format("%Y-%m-%d").to_string()),
            p.sample_email.as_deref().unwrap_or("\u{2014}"),
        );
    }
}

fn print_contacts(rows: &[CandidateReportRow], min_confidence: f64) {
    if rows.is_empty() {
        println!("no contacts stored");
        return;
    }

    let mut current = None;
    for row in rows {
        if current != Some(row.contact_id) {
            current = Some(row.contact_id);
            println!(
                "{} / {} / {} [{}]",
                row.contact_name, row.position, row.department, row.department_category
            );
        }
        match format_candidate(row) {
            Some(line) => println!("  {line}"),
            None => println!("  (no candidates at or above {min_confidence})"),
        }
    }
}

pub(crate) fn format_candidate(row: &CandidateReportRow) -> Option<String> {
    let email = row.email.as_deref()?;
    let marker = if row.is_primary == Some(true) { "*" } else { " " };
    let verdict = match row.is_deliverable {
        Some(true) => "deliverable",
        Some(false) => "undeliverable",
        None => "unverified",
    };
    let mut line = format!(
        "{marker} {email:<40} {:.2} {verdict}",
        row.confidence.unwrap_or(0.0)
    );
    if let Some(reason) = row.verification_reason.as_deref().filter(|r| !r.is_empty()) {
        line.push_str(&format!(" ({reason})"));
    }
    Some(line)
}
