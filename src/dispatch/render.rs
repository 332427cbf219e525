use chrono::{DateTime, Utc};
use url::Url;

use crate::domain::subscriber::Subscriber;

/// Human-readable issue label derived from the run's start instant,
/// e.g. "March 4, 2024". Used in the subject line and as the archive key.
pub fn issue_label(now: DateTime<Utc>) -> String {
    now.format("%B %-d, %Y").to_string()
}

pub fn issue_subject(issue_label: &str) -> String {
    format!("THE SIGNAL: Intelligence Briefing for {}", issue_label)
}

/// Wraps the shared briefing body in the per-subscriber email frame. The
/// briefing body itself is identical for every recipient in a run; only the
/// greeting and the footer links are personalized.
pub fn issue_html(subscriber: &Subscriber, shared_body: &str, issue_label: &str, base_url: &str) -> String {
    let unsubscribe_link = personalized_link(base_url, &[("unsubscribe", "true")], subscriber);
    let feedback_link = personalized_link(base_url, &[("view", "feedback")], subscriber);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<body style="margin: 0; padding: 0; background-color: #020617; color: #94a3b8;">
  <table border="0" cellpadding="0" cellspacing="0" width="100%" style="background-color: #020617; padding: 20px 0 40px 0;">
    <tr>
      <td align="center">
        <table border="0" cellpadding="0" cellspacing="0" width="600" style="background-color: #0f172a; border-radius: 32px;">
          <tr>
            <td style="padding: 60px 48px; text-align: center;">
              <h1 style="color: #ffffff; margin: 0; font-size: 36px;">THE <span style="color: #10b981;">SIGNAL.</span></h1>
              <p style="color: #94a3b8; margin: 12px 0 0 0;">{issue_label}</p>
            </td>
          </tr>
          <tr>
            <td style="padding: 48px; color: #cbd5e1; line-height: 1.7;">
              <div style="color: #ffffff; font-size: 24px; font-weight: 700; margin-bottom: 24px;">Greetings, {name}.</div>
              <p style="margin-bottom: 40px;">Your weekly intelligence briefing is ready. Below is the curated signal from this week's shifts.</p>
              {shared_body}
            </td>
          </tr>
          <tr>
            <td style="padding: 48px; text-align: center;">
              <a href="{feedback_link}" style="color: #10b981; font-size: 12px;">Send feedback</a>
              <span style="color: #334155;"> | </span>
              <a href="{unsubscribe_link}" style="color: #64748b; font-size: 12px;">Unsubscribe</a>
            </td>
          </tr>
        </table>
      </td>
    </tr>
  </table>
</body>
</html>"#,
        issue_label = issue_label,
        name = subscriber.name.as_ref(),
        shared_body = shared_body,
        feedback_link = feedback_link,
        unsubscribe_link = unsubscribe_link,
    )
}

fn personalized_link(base_url: &str, params: &[(&str, &str)], subscriber: &Subscriber) -> String {
    match Url::parse_with_params(
        base_url,
        params
            .iter()
            .copied()
            .chain([("email", subscriber.email.as_ref())]),
    ) {
        Ok(url) => url.to_string(),
        // A malformed base URL only loses the footer links, not the send.
        Err(_) => base_url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::subscriber_email::SubscriberEmail;
    use crate::domain::subscriber_name::SubscriberName;
    use crate::domain::subscriber_timezone::SubscriberTimezone;
    use chrono::TimeZone;

    fn subscriber() -> Subscriber {
        Subscriber {
            email: SubscriberEmail::parse("ada@signal.dev".to_string()).unwrap(),
            name: SubscriberName::parse("Ada".to_string()).unwrap(),
            timezone: SubscriberTimezone::parse("Europe/Madrid".to_string()).unwrap(),
            last_sent_date: None,
        }
    }

    #[test]
    fn issue_label_is_a_human_readable_date() {
        let now = Utc.with_ymd_and_hms(2024, 3, 4, 15, 0, 0).unwrap();

        assert_eq!(issue_label(now), "March 4, 2024");
    }

    #[test]
    fn issue_html_embeds_body_greeting_and_unsubscribe_link() {
        let html = issue_html(
            &subscriber(),
            "<p>the briefing</p>",
            "March 4, 2024",
            "https://thesignal.dev",
        );

        assert!(html.contains("<p>the briefing</p>"));
        assert!(html.contains("Greetings, Ada."));
        assert!(html.contains("unsubscribe=true"));
        assert!(html.contains("email=ada%40signal.dev"));
    }
}
