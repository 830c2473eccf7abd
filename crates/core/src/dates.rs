use chrono::NaiveDate;

pub const POST_DATE_FORMAT: &str =
  "%B %d, %Y";

/// Display date stamped on a post at
/// creation, e.g. `October 07, 2026`.
pub fn format_post_date(
  date: NaiveDate
) -> String {
  date
    .format(POST_DATE_FORMAT)
    .to_string()
}
