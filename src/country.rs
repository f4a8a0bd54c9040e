// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

//! Country code resolution.
//!
//! The map dataset and the scraped directories disagree on whether a
//! country folder is named with its alpha-2 or alpha-3 code, so every
//! lookup tries both forms, alpha-2 first.

// (alpha-2, alpha-3) pairs for countries whose folders may use either form.
const ISO_PAIRS: &[(&str, &str)] = &[
    ("AR", "ARG"),
    ("AT", "AUT"),
    ("AU", "AUS"),
    ("BE", "BEL"),
    ("BR", "BRA"),
    ("CA", "CAN"),
    ("CH", "CHE"),
    ("CN", "CHN"),
    ("DE", "DEU"),
    ("DK", "DNK"),
    ("ES", "ESP"),
    ("FI", "FIN"),
    ("FR", "FRA"),
    ("GB", "GBR"),
    ("GR", "GRC"),
    ("IE", "IRL"),
    ("IN", "IND"),
    ("IT", "ITA"),
    ("JP", "JPN"),
    ("MX", "MEX"),
    ("NL", "NLD"),
    ("NO", "NOR"),
    ("PL", "POL"),
    ("PT", "PRT"),
    ("RU", "RUS"),
    ("SE", "SWE"),
    ("TR", "TUR"),
    ("UA", "UKR"),
    ("US", "USA"),
];

pub fn alpha3_for(alpha2: &str) -> Option<&'static str> {
    ISO_PAIRS
        .iter()
        .find(|(a2, _)| a2.eq_ignore_ascii_case(alpha2))
        .map(|(_, a3)| *a3)
}

pub fn alpha2_for(alpha3: &str) -> Option<&'static str> {
    ISO_PAIRS
        .iter()
        .find(|(_, a3)| a3.eq_ignore_ascii_case(alpha3))
        .map(|(a2, _)| *a2)
}

/// Returns the ordered folder codes to query for a user supplied country code.
pub fn candidate_codes(code: &str) -> Vec<String> {
    let code = code.trim().to_uppercase();

    match code.len() {
        2 => {
            let mut candidates = vec![code.clone()];
            if let Some(alpha3) = alpha3_for(&code) {
                candidates.push(alpha3.to_string());
            }
            candidates
        }
        3 => match alpha2_for(&code) {
            Some(alpha2) => vec![alpha2.to_string(), code],
            None => vec![code],
        },
        _ => Vec::new(),
    }
}

/// Canonical code for display and deep links (alpha-2 where known).
pub fn canonical_code(code: &str) -> Option<String> {
    candidate_codes(code).into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alpha2_resolves_to_both_forms() {
        assert_eq!(candidate_codes("FR"), vec!["FR", "FRA"]);
        assert_eq!(candidate_codes("gb"), vec!["GB", "GBR"]);
    }

    #[test]
    fn test_alpha3_maps_back_to_alpha2() {
        assert_eq!(candidate_codes("fra"), vec!["FR", "FRA"]);
        assert_eq!(candidate_codes("PRT"), vec!["PT", "PRT"]);
    }

    #[test]
    fn test_unknown_codes() {
        assert_eq!(candidate_codes("ZZ"), vec!["ZZ"]);
        assert_eq!(candidate_codes("ZZZ"), vec!["ZZZ"]);
        assert_eq!(candidate_codes("XX"), vec!["XX"]);
    }

    #[test]
    fn test_rejected_inputs() {
        assert!(candidate_codes("").is_empty());
        assert!(candidate_codes("F").is_empty());
        assert!(candidate_codes("FRAN").is_empty());
        assert_eq!(canonical_code(""), None);
        assert_eq!(canonical_code("deu").as_deref(), Some("DE"));
    }
}
