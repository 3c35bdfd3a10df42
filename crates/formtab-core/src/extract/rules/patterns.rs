//! Regex patterns for labels and fragments found in analysis results.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Key labels (matched against key-value pair keys, case-insensitive)
    pub static ref CLIENT_LABEL: Regex = Regex::new(
        r"(?i)cliente(?:[\s|/\\]|\\n)+client"
    ).unwrap();

    pub static ref PRODUCT_LABEL: Regex = Regex::new(
        r"(?i)producto"
    ).unwrap();

    pub static ref DATE_TIME_LABEL: Regex = Regex::new(
        r"(?i)date-time"
    ).unwrap();

    // D/M/YYYY H:MM with an optional a.m / p.m marker, anchored at the start
    pub static ref DATE_TIME_FRAGMENT: Regex = Regex::new(
        r"^\d{1,2}/\d{1,2}/\d{4}\s\d{1,2}:\d{2}(?:\s(?P<meridiem>[aApP])\.[mM])?"
    ).unwrap();

    pub static ref MERIDIEM_MARKER: Regex = Regex::new(
        r"\s*[aApP]\.[mM]\.?"
    ).unwrap();

    // Service station address: everything after the "E/S" marker
    pub static ref ADDRESS_MARKER: Regex = Regex::new(
        r"(?s)E/S\s+(.*)"
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_label_separators() {
        assert!(CLIENT_LABEL.is_match("Cliente/Client"));
        assert!(CLIENT_LABEL.is_match("CLIENTE / CLIENT:"));
        assert!(CLIENT_LABEL.is_match("Cliente\nClient"));
        assert!(CLIENT_LABEL.is_match(r"Cliente\nClient"));
        assert!(CLIENT_LABEL.is_match("cliente | client"));
        assert!(CLIENT_LABEL.is_match(r"Cliente\Client"));
        assert!(CLIENT_LABEL.is_match("Cliente \t/\n Client"));
        assert!(!CLIENT_LABEL.is_match("ClientenClient"));
        assert!(!CLIENT_LABEL.is_match("Cliente-Client"));
        assert!(!CLIENT_LABEL.is_match("Cliente: Client"));
        assert!(!CLIENT_LABEL.is_match("Cliente"));
        assert!(!CLIENT_LABEL.is_match("ClienteClient"));
    }

    #[test]
    fn test_date_time_fragment_is_anchored() {
        assert!(DATE_TIME_FRAGMENT.is_match("12/5/2023 3:30 p.m"));
        assert!(DATE_TIME_FRAGMENT.is_match("1/12/2023 15:30 extra"));
        assert!(!DATE_TIME_FRAGMENT.is_match("Fecha 12/5/2023 3:30"));

        let caps = DATE_TIME_FRAGMENT.captures("12/5/2023 3:30 p.m. GMT").unwrap();
        assert_eq!(&caps[0], "12/5/2023 3:30 p.m");
        assert_eq!(&caps["meridiem"], "p");
    }
}
