use std::sync::LazyLock;

use regex::Regex;

use crate::PackageName;

static INST_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Inst\s+(\S+)").expect("install marker pattern must compile"));

/// Extracts package names from `apt list --upgradable` output.
///
/// Each listing line looks like `name/suite version arch [upgradable from: ...]`;
/// lines without a `/` (the `Listing...` header, warnings) are skipped.
pub fn parse_upgradable_list(text: &str) -> Vec<PackageName> {
    text.lines()
        .filter_map(|line| line.split_once('/'))
        .map(|(name, _)| name.to_string())
        .collect()
}

/// Extracts package names from `Inst <name> ...` transaction lines.
pub fn parse_upgraded_packages(text: &str) -> Vec<PackageName> {
    text.lines()
        .filter_map(|line| INST_LINE.captures(line))
        .filter_map(|captures| captures.get(1))
        .map(|name| name.as_str().to_string())
        .collect()
}
