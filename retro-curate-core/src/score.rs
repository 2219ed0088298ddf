//! Weighted up/down tag scoring.

/// Score a tag list against ordered preference lists.
///
/// With `U` up tags, a tag equal to `up_tags[i]` adds `U - i`; with `D` down
/// tags, a tag equal to `down_tags[j]` subtracts `D - j`. Every occurrence
/// counts, and a tag named in both lists contributes both ways.
pub fn score<S: AsRef<str>>(tags: &[String], up_tags: &[S], down_tags: &[S]) -> i64 {
    let up_len = up_tags.len() as i64;
    let down_len = down_tags.len() as i64;
    let mut total = 0i64;

    for tag in tags {
        for (i, up) in up_tags.iter().enumerate() {
            if tag == up.as_ref() {
                total += up_len - i as i64;
            }
        }
        for (j, down) in down_tags.iter().enumerate() {
            if tag == down.as_ref() {
                total -= down_len - j as i64;
            }
        }
    }

    total
}
