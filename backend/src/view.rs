//! HTML for the summary page.

use shared::models::{Candidate, VoteSummary};

use crate::utils::format_timestamp;

pub fn headline(summary: &VoteSummary) -> String {
    match summary.leader() {
        Some(candidate) => match lead(summary) {
            1 => format!("{candidate} are winning by 1 vote!"),
            n => format!("{candidate} are winning by {n} votes!"),
        },
        None => "TABS and SPACES are evenly matched!".to_string(),
    }
}

fn lead(summary: &VoteSummary) -> i64 {
    (summary.tabs_count - summary.spaces_count).abs()
}

pub fn render_summary(summary: &VoteSummary) -> String {
    let recent = if summary.recent_votes.is_empty() {
        "      <li>No votes yet.</li>\n".to_string()
    } else {
        summary
            .recent_votes
            .iter()
            .map(|vote| {
                format!(
                    "      <li class=\"{}\">A vote for <b>{}</b> was cast at {}</li>\n",
                    css_class(vote.candidate),
                    vote.candidate,
                    format_timestamp(vote.cast_at)
                )
            })
            .collect()
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <title>Tabs VS Spaces</title>
  </head>
  <body>
    <h1>{headline}</h1>
    <section>
      <form method="POST" action="/">
        <div class="tabs">
          <p>{tabs} votes</p>
          <button type="submit" name="team" value="TABS">Vote for TABS</button>
        </div>
        <div class="spaces">
          <p>{spaces} votes</p>
          <button type="submit" name="team" value="SPACES">Vote for SPACES</button>
        </div>
      </form>
    </section>
    <h2>Recent Votes</h2>
    <ul>
{recent}    </ul>
  </body>
</html>
"#,
        headline = headline(summary),
        tabs = summary.tabs_count,
        spaces = summary.spaces_count,
        recent = recent,
    )
}

fn css_class(candidate: Candidate) -> &'static str {
    match candidate {
        Candidate::Tabs => "tabs",
        Candidate::Spaces => "spaces",
    }
}
