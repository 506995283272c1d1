use crate::error::{Error, Result};

/// An input domain split into `sub_labels.base_label.tld`.
///
/// The last label is always the TLD and the one before it the base label; public
/// suffixes such as `co.uk` are not special-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDomain {
    sub_labels: Vec<String>,
    base_label: String,
    tld: String,
}

impl ParsedDomain {
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = |reason| Error::InvalidDomain {
            input: raw.to_string(),
            reason,
        };

        if raw.is_empty() {
            return Err(invalid("empty input"));
        }
        if raw.chars().any(char::is_whitespace) {
            return Err(invalid("contains whitespace"));
        }

        let normalized = raw.to_ascii_lowercase();
        let (rest, tld) = normalized
            .rsplit_once('.')
            .ok_or_else(|| invalid("no dot separating name and tld"))?;
        if tld.is_empty() {
            return Err(invalid("empty tld"));
        }

        let mut labels: Vec<String> = rest.split('.').map(str::to_string).collect();
        let base_label = labels.pop().unwrap_or_default();
        if base_label.is_empty() {
            return Err(invalid("empty base label"));
        }
        if labels.iter().any(String::is_empty) {
            return Err(invalid("empty label"));
        }

        Ok(Self {
            sub_labels: labels,
            base_label,
            tld: tld.to_string(),
        })
    }

    pub fn sub_labels(&self) -> &[String] {
        &self.sub_labels
    }

    pub fn base_label(&self) -> &str {
        &self.base_label
    }

    pub fn tld(&self) -> &str {
        &self.tld
    }

    /// Full domain, lowercase.
    pub fn fqdn(&self) -> String {
        self.with_base(&self.base_label)
    }

    /// Reassembles the domain with `base` in place of the base label.
    pub fn with_base(&self, base: &str) -> String {
        self.assemble(&self.sub_labels, base, &self.tld)
    }

    pub fn with_tld(&self, tld: &str) -> String {
        self.assemble(&self.sub_labels, &self.base_label, tld)
    }

    pub fn with_sub_labels(&self, sub_labels: &[String], base: &str) -> String {
        self.assemble(sub_labels, base, &self.tld)
    }

    fn assemble(&self, sub_labels: &[String], base: &str, tld: &str) -> String {
        let mut out = String::new();
        for label in sub_labels {
            out.push_str(label);
            out.push('.');
        }
        out.push_str(base);
        out.push('.');
        out.push_str(tld);
        out
    }
}

impl std::str::FromStr for ParsedDomain {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl std::fmt::Display for ParsedDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.fqdn())
    }
}

/// IDNA (punycode) form of a candidate, `None` if it cannot be encoded as a host.
pub fn to_ascii(candidate: &str) -> Option<String> {
    match url::Host::parse(candidate) {
        Ok(url::Host::Domain(ascii)) => Some(ascii),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_base_and_tld() {
        let d = ParsedDomain::parse("Example.COM").unwrap();
        assert!(d.sub_labels().is_empty());
        assert_eq!(d.base_label(), "example");
        assert_eq!(d.tld(), "com");
        assert_eq!(d.fqdn(), "example.com");
    }

    #[test]
    fn keeps_sub_labels_in_order() {
        let d = ParsedDomain::parse("a.b.example.co.uk").unwrap();
        assert_eq!(d.sub_labels(), ["a", "b", "example"]);
        assert_eq!(d.base_label(), "co");
        assert_eq!(d.tld(), "uk");
        assert_eq!(d.fqdn(), "a.b.example.co.uk");
    }

    #[test]
    fn parse_is_idempotent() {
        for raw in ["google.com", "Mail.Google.com", "x.y.z.io"] {
            let once = ParsedDomain::parse(raw).unwrap();
            let twice = ParsedDomain::parse(&once.fqdn()).unwrap();
            assert_eq!(once, twice);
            assert_eq!(once.fqdn(), raw.to_ascii_lowercase());
        }
    }

    #[test]
    fn rejects_malformed_input() {
        let malformed = [
            "",
            "exa mple.com",
            "example",
            "example.",
            ".com",
            "a..com",
            "\tfoo.com",
            "example.com.",
        ];
        for raw in malformed {
            assert!(
                matches!(ParsedDomain::parse(raw), Err(Error::InvalidDomain { .. })),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn trailing_root_dot_is_an_empty_tld() {
        match ParsedDomain::parse("example.com.") {
            Err(Error::InvalidDomain { input, reason }) => {
                assert_eq!(input, "example.com.");
                assert_eq!(reason, "empty tld");
            }
            other => panic!("expected InvalidDomain, got {other:?}"),
        }
    }

    #[test]
    fn reassembles_with_replacements() {
        let d = ParsedDomain::parse("www.example.com").unwrap();
        assert_eq!(d.with_base("exmple"), "www.exmple.com");
        assert_eq!(d.with_tld("net"), "www.example.net");
    }

    #[test]
    fn punycode_for_unicode_candidates() {
        assert_eq!(to_ascii("example.com").as_deref(), Some("example.com"));
        let ascii = to_ascii("g\u{043E}\u{043E}gle.com").unwrap();
        assert!(ascii.starts_with("xn--"));
        assert!(ascii.ends_with(".com"));
    }
}
