use index_patterns::adapters::memory::elasticsearch::matches_wildcard;
use index_patterns::domain::models::index_pattern::time_pattern_to_wildcard;
use proptest::prelude::*;

proptest! {
    /// Property: the wildcard form never contains brackets or consecutive `*`
    #[test]
    fn prop_wildcard_is_normalized(literal in "[a-z-]{0,8}", tokens in "[YMDHms.]{1,10}") {
        let wildcard = time_pattern_to_wildcard(&format!("[{literal}]{tokens}"));
        prop_assert!(!wildcard.contains('['));
        prop_assert!(!wildcard.contains(']'));
        prop_assert!(!wildcard.contains("**"));
        prop_assert_eq!(wildcard, format!("{literal}*"));
    }

    /// Property: every concrete daily index matches the wildcard of its pattern
    #[test]
    fn prop_dated_index_matches_wildcard(
        prefix in "[a-z]{1,6}-",
        year in 2000u32..2100,
        month in 1u32..=12,
        day in 1u32..=28,
    ) {
        let wildcard = time_pattern_to_wildcard(&format!("[{prefix}]YYYY.MM.DD"));
        let index = format!("{prefix}{year}.{month:02}.{day:02}");
        prop_assert!(matches_wildcard(&wildcard, &index));
    }
}
