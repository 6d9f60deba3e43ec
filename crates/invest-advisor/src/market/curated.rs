//! Curated sector leaders used when live search is unavailable

/// Normalize a sector name: trim, lowercase and resolve aliases
pub fn normalize_sector(sector: &str) -> String {
    let key = sector.trim().to_lowercase();
    match key.as_str() {
        "technology" | "it" => "tech".to_string(),
        "health" => "healthcare".to_string(),
        "fmcg" => "consumer goods".to_string(),
        _ => key,
    }
}

/// Curated names for a sector; empty for unknown sectors
pub fn curated_top(sector: &str) -> &'static [&'static str] {
    match normalize_sector(sector).as_str() {
        "tech" => &["TCS", "Infosys", "HCL Tech", "LTIMindtree"],
        "finance" => &["HDFC Bank", "ICICI Bank", "Axis Bank", "SBI"],
        "energy" => &["Reliance Industries", "NTPC", "Tata Power", "Adani Green"],
        "healthcare" => &["Apollo Hospitals", "Sun Pharma", "Dr. Reddy's", "Zydus Life"],
        "consumer goods" => &["Hindustan Unilever", "ITC", "Nestle India", "Britannia"],
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases() {
        assert_eq!(normalize_sector("  IT "), "tech");
        assert_eq!(normalize_sector("Technology"), "tech");
        assert_eq!(normalize_sector("Health"), "healthcare");
        assert_eq!(normalize_sector("FMCG"), "consumer goods");
        assert_eq!(normalize_sector("Finance"), "finance");
    }

    #[test]
    fn test_every_sector_has_four_names() {
        for sector in ["tech", "finance", "energy", "healthcare", "consumer goods"] {
            assert_eq!(curated_top(sector).len(), 4, "{sector}");
        }
    }

    #[test]
    fn test_lookup() {
        assert_eq!(curated_top("it"), &["TCS", "Infosys", "HCL Tech", "LTIMindtree"]);
        assert!(curated_top("unknown-sector").is_empty());
    }
}
