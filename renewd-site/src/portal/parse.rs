//! Pure parsing helpers for the portal's listing and confirmation markup.

use crate::types::{Domain, DomainStatus};

/// Parse the "days until expiry" cell, rendered as e.g. `"14 Days"`.
pub fn parse_days_cell(text: &str) -> Option<u32> {
    text.trim().split_whitespace().next()?.parse().ok()
}

/// The renewable column renders literally `Renewable` or `Renewable in N days`.
pub fn parse_renewable_cell(text: &str) -> bool {
    text.trim() == "Renewable"
}

/// Extract the site-assigned domain id from the row's renewal link,
/// e.g. `domains.php?a=renewdomain&domain=1083React6167` -> `1083React6167`.
pub fn domain_id_from_href(href: &str) -> Option<String> {
    let id = href.rsplit('=').next()?;
    if id.is_empty() || id == href {
        return None;
    }
    Some(id.to_string())
}

/// Extract the order id from the confirmation element's text,
/// e.g. `"Order Confirmation Number: 1234567890"`.
pub fn order_id_from_confirmation(text: &str) -> String {
    text.rsplit(": ").next().unwrap_or(text).trim().to_string()
}

/// Assemble a [`Domain`] from one listing row.
///
/// `cells` holds the text of the row's columns in the portal's fixed
/// order: name, status, days until expiry, renewable flag. `href` is
/// the renewal link from the fifth column.
pub fn parse_row(cells: &[String], href: &str) -> Result<Domain, String> {
    if cells.len() < 4 {
        return Err(format!("expected at least 4 columns, found {}", cells.len()));
    }
    let domain_name = cells[0].trim().to_string();
    let status = DomainStatus::parse(&cells[1])
        .ok_or_else(|| format!("unknown status '{}' for {domain_name}", cells[1].trim()))?;
    let days_until_expiry = parse_days_cell(&cells[2])
        .ok_or_else(|| format!("bad expiry cell '{}' for {domain_name}", cells[2].trim()))?;
    let domain_id = domain_id_from_href(href)
        .ok_or_else(|| format!("no domain id in link '{href}' for {domain_name}"))?;

    Ok(Domain {
        domain_name,
        status,
        days_until_expiry,
        renewable: parse_renewable_cell(&cells[3]),
        domain_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(name: &str, status: &str, days: &str, renewable: &str) -> Vec<String> {
        [name, status, days, renewable]
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn parses_days_cell() {
        assert_eq!(parse_days_cell("14 Days"), Some(14));
        assert_eq!(parse_days_cell("  1 Day "), Some(1));
        assert_eq!(parse_days_cell("Days"), None);
        assert_eq!(parse_days_cell(""), None);
    }

    #[test]
    fn renewable_cell_is_exact_match() {
        assert!(parse_renewable_cell("Renewable"));
        assert!(parse_renewable_cell("  Renewable "));
        assert!(!parse_renewable_cell("Renewable in 10 days"));
        assert!(!parse_renewable_cell(""));
    }

    #[test]
    fn extracts_domain_id_from_href() {
        assert_eq!(
            domain_id_from_href("https://portal.example/domains.php?a=renewdomain&domain=12345"),
            Some("12345".to_string())
        );
        assert_eq!(domain_id_from_href("no-query-string"), None);
        assert_eq!(domain_id_from_href("domains.php?domain="), None);
    }

    #[test]
    fn extracts_order_id() {
        assert_eq!(
            order_id_from_confirmation("Order Confirmation Number: 1234567890"),
            "1234567890"
        );
        // No separator: the whole text is the best we can report.
        assert_eq!(order_id_from_confirmation("1234567890"), "1234567890");
    }

    #[test]
    fn parses_full_row() {
        let domain = parse_row(
            &cells("example.tk", "Active", "14 Days", "Renewable"),
            "domains.php?a=renewdomain&domain=998877",
        )
        .expect("valid row");
        assert_eq!(domain.domain_name, "example.tk");
        assert_eq!(domain.status, DomainStatus::Active);
        assert_eq!(domain.days_until_expiry, 14);
        assert!(domain.renewable);
        assert_eq!(domain.domain_id, "998877");
    }

    #[test]
    fn rejects_unknown_status() {
        let err = parse_row(
            &cells("example.tk", "Pending", "14 Days", "Renewable"),
            "d?domain=1",
        )
        .expect_err("unknown status");
        assert!(err.contains("Pending"));
    }

    #[test]
    fn rejects_short_row() {
        let err = parse_row(&cells("example.tk", "Active", "14 Days", "Renewable")[..2].to_vec(), "d?domain=1")
            .expect_err("short row");
        assert!(err.contains("columns"));
    }
}
