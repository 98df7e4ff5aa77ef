/// Token prefix that sets the fetch limit, e.g. `max:20`.
pub const LIMIT_DIRECTIVE: &str = "max:";
pub const DEFAULT_MSG_LIMIT: u32 = 5;

/// A raw search string split into the fetch limit and the keywords sent to
/// the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    pub limit: u32,
    pub keywords: String,
}

impl ParsedQuery {
    /// Never fails: a missing, unparsable or zero directive leaves the limit
    /// at [`DEFAULT_MSG_LIMIT`]. Only the first `max:` token is honored, any
    /// later ones are dropped along with it.
    pub fn parse(raw: &str) -> ParsedQuery {
        let (directives, keywords): (Vec<&str>, Vec<&str>) =
            raw.split(' ').partition(|t| t.starts_with(LIMIT_DIRECTIVE));

        let limit = directives
            .first()
            .and_then(|t| t[LIMIT_DIRECTIVE.len()..].parse::<i32>().ok())
            .and_then(|n| u32::try_from(n).ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_MSG_LIMIT);

        ParsedQuery {
            limit,
            keywords: keywords.join(" "),
        }
    }

    pub fn keyword_tokens(&self) -> impl Iterator<Item = &str> {
        self.keywords.split(' ').filter(|k| !k.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limit_without_directive() {
        for raw in ["rust", "hello world", "maximum effort", "max", "MAX:3 a"] {
            let q = ParsedQuery::parse(raw);
            assert_eq!(q.limit, DEFAULT_MSG_LIMIT, "raw: {raw}");
            assert_eq!(q.keywords, raw);
        }
    }

    #[test]
    fn test_directive_sets_limit_and_is_removed() {
        let q = ParsedQuery::parse("mandalorian max:20 baby yoda");
        assert_eq!(q.limit, 20);
        assert_eq!(q.keywords, "mandalorian baby yoda");

        let q = ParsedQuery::parse("max:1");
        assert_eq!(q.limit, 1);
        assert_eq!(q.keywords, "");
    }

    #[test]
    fn test_only_first_directive_counts() {
        let q = ParsedQuery::parse("a max:7 b max:9 c");
        assert_eq!(q.limit, 7);
        assert_eq!(q.keywords, "a b c");

        // first directive is garbage: the later valid one is still ignored
        let q = ParsedQuery::parse("max:x max:9 rust");
        assert_eq!(q.limit, DEFAULT_MSG_LIMIT);
        assert_eq!(q.keywords, "rust");
    }

    #[test]
    fn test_unparsable_directive_falls_back() {
        let q = ParsedQuery::parse("max:abc hello world");
        assert_eq!(q.limit, DEFAULT_MSG_LIMIT);
        assert_eq!(q.keywords, "hello world");

        assert_eq!(ParsedQuery::parse("max:0 a").limit, DEFAULT_MSG_LIMIT);
        assert_eq!(ParsedQuery::parse("max:-4 a").limit, DEFAULT_MSG_LIMIT);
        assert_eq!(ParsedQuery::parse("max: a").limit, DEFAULT_MSG_LIMIT);
    }

    #[test]
    fn test_limit_must_fit_signed_32_bits() {
        assert_eq!(ParsedQuery::parse("max:2147483647 a").limit, i32::MAX as u32);
        assert_eq!(ParsedQuery::parse("max:2147483648 a").limit, DEFAULT_MSG_LIMIT);
        assert_eq!(ParsedQuery::parse("max:4294967295 a").limit, DEFAULT_MSG_LIMIT);
    }

    #[test]
    fn test_empty_input() {
        let q = ParsedQuery::parse("");
        assert_eq!(q.limit, DEFAULT_MSG_LIMIT);
        assert_eq!(q.keywords, "");
        assert_eq!(q.keyword_tokens().count(), 0);
    }

    #[test]
    fn test_keyword_order_and_spacing_preserved() {
        let q = ParsedQuery::parse("zeta  alpha max:3 beta");
        assert_eq!(q.keywords, "zeta  alpha beta");
        assert_eq!(q.keyword_tokens().collect::<Vec<_>>(), vec!["zeta", "alpha", "beta"]);
    }
}
