//! Dotted version comparison.

/// Returns `true` when `candidate` is strictly newer than `current`.
///
/// A leading `v` is ignored, missing components count as zero and
/// non-numeric components parse as zero, so `"1.0"` equals `"1.0.0"`.
pub fn is_newer_version(candidate: &str, current: &str) -> bool {
    let lhs = components(candidate);
    let rhs = components(current);
    let len = lhs.len().max(rhs.len());

    for i in 0..len {
        let a = lhs.get(i).copied().unwrap_or(0);
        let b = rhs.get(i).copied().unwrap_or(0);
        if a != b {
            return a > b;
        }
    }
    false
}

fn components(version: &str) -> Vec<u64> {
    let trimmed = version.trim();
    let trimmed = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);
    trimmed
        .split('.')
        .map(|part| {
            // "13-beta" -> 13
            let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
            digits.parse().unwrap_or(0)
        })
        .collect()
}
