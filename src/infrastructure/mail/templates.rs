use std::borrow::Cow;

use ammonia::clean_text;
use chrono::{DateTime, Datelike};
use chrono_tz::Tz;

use crate::entities::contact::ValidSubmission;
use super::message::OutgoingEmail;

/// Agency identity used in both templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branding {
    pub name: String,
    pub website: String,
    pub tagline: String,
    pub support_email: String,
}

/// `Monday, January 6, 2025 at 03:04 PM`
pub fn format_timestamp(ts: &DateTime<Tz>) -> String {
    ts.format("%A, %B %-d, %Y at %I:%M %p").to_string()
}

/// Cuts `message` to at most `max_chars` characters, marking the cut with an ellipsis.
pub fn preview(message: &str, max_chars: usize) -> Cow<'_, str> {
    match message.char_indices().nth(max_chars) {
        Some((cut, _)) => Cow::Owned(format!("{}…", message[..cut].trim_end())),
        None => Cow::Borrowed(message),
    }
}

/// Escapes user text for HTML and turns each line break into `<br>`.
fn multiline_html(text: &str) -> String {
    text.lines().map(clean_text).collect::<Vec<_>>().join("<br>")
}

/// Message to the operator inbox describing a new submission.
pub fn notification_email(
    submission: &ValidSubmission,
    branding: &Branding,
    operator_inbox: &str,
    submitted_at: &DateTime<Tz>,
) -> OutgoingEmail {
    let when = format_timestamp(submitted_at);
    let name = clean_text(&submission.name);
    let email = clean_text(&submission.email);
    let subject = clean_text(&submission.subject);
    let message = multiline_html(&submission.message);
    let client = clean_text(&submission.client_id);
    let brand = clean_text(&branding.name);
    let year = submitted_at.year();

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="UTF-8" />
  <style>
    body {{ font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; line-height: 1.6; color: #333; }}
    .container {{ max-width: 700px; margin: 0 auto; padding: 20px; }}
    .header {{ background: linear-gradient(135deg, #7c3aed 0%, #9d50bb 100%); padding: 30px; text-align: center; border-radius: 8px 8px 0 0; }}
    .header h1 {{ color: white; margin: 0; font-size: 24px; }}
    .content {{ background: #ffffff; padding: 30px; border-radius: 0 0 8px 8px; }}
    .table {{ width: 100%; border-collapse: collapse; margin: 25px 0; }}
    .table th {{ background-color: #f8f9fa; text-align: left; padding: 12px 15px; }}
    .table td {{ padding: 12px 15px; border-bottom: 1px solid #e9ecef; }}
    .footer {{ margin-top: 30px; padding-top: 20px; border-top: 1px solid #e9ecef; color: #6c757d; font-size: 14px; text-align: center; }}
    .highlight {{ color: #7c3aed; font-weight: 600; }}
    .mono {{ background: #f1f3f5; padding: 2px 6px; border-radius: 4px; font-family: monospace; }}
  </style>
</head>
<body>
  <div class="container">
    <div class="header"><h1>New Contact Form Submission</h1></div>
    <div class="content">
      <p>You've received a new contact form submission on <span class="highlight">{when}</span>:</p>
      <table class="table">
        <tr><th>Field</th><th>Details</th></tr>
        <tr><td><strong>Name</strong></td><td>{name}</td></tr>
        <tr><td><strong>Email</strong></td><td><a href="mailto:{email}">{email}</a></td></tr>
        <tr><td><strong>Subject</strong></td><td>{subject}</td></tr>
        <tr><td><strong>Message</strong></td><td>{message}</td></tr>
        <tr><td><strong>Submitted from</strong></td><td><span class="mono">{client}</span></td></tr>
        <tr><td><strong>Reference</strong></td><td><span class="mono">{id}</span></td></tr>
      </table>
      <div class="footer">
        <p>This message was sent from your website contact form.</p>
        <p>&copy; {year} {brand}. All rights reserved.</p>
      </div>
    </div>
  </div>
</body>
</html>"#,
        id = submission.id,
    );

    let text = format!(
        "New contact form submission on {when}\n\n\
         Name: {}\n\
         Email: {}\n\
         Subject: {}\n\
         Submitted from: {}\n\
         Reference: {}\n\n\
         {}\n",
        submission.name,
        submission.email,
        submission.subject,
        submission.client_id,
        submission.id,
        submission.message,
    );

    OutgoingEmail {
        sender_name: "Website Contact".to_string(),
        to: operator_inbox.to_string(),
        subject: format!("📩 New Contact Submission: {}", submission.subject),
        html,
        text,
    }
}

/// Thank-you message sent back to the person who filled in the form.
pub fn autoresponder_email(
    submission: &ValidSubmission,
    branding: &Branding,
    preview_chars: usize,
) -> OutgoingEmail {
    let excerpt = preview(&submission.message, preview_chars);
    let name = clean_text(&submission.name);
    let subject = clean_text(&submission.subject);
    let message = multiline_html(&excerpt);
    let brand = clean_text(&branding.name);
    let tagline = clean_text(&branding.tagline);
    let website = clean_text(&branding.website);
    let support = clean_text(&branding.support_email);

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="UTF-8" />
  <style>
    body {{ font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; margin: 0; padding: 0; background: #f0f0ff; }}
    .container {{ max-width: 600px; margin: 30px auto; background: #fff; border-radius: 12px; overflow: hidden; }}
    .header {{ background: linear-gradient(to right, #6366f1, #8b5cf6); color: white; padding: 20px 0; text-align: center; }}
    .header h1 {{ margin: 0; font-size: 28px; font-weight: 700; }}
    .header p {{ margin-top: 5px; font-style: italic; font-size: 14px; }}
    .content {{ padding: 30px; color: #111827; }}
    .summary {{ background: #f9fafb; padding: 15px 20px; border-left: 4px solid #6366f1; border-radius: 8px; margin-bottom: 20px; }}
    .cta {{ text-align: center; margin: 30px 0; }}
    .cta a {{ background: linear-gradient(to right, #6366f1, #8b5cf6); color: white; padding: 12px 30px; border-radius: 25px; font-weight: 600; text-decoration: none; }}
    .footer {{ text-align: center; font-size: 13px; color: #6b7280; padding: 20px; background: #f9fafb; }}
  </style>
</head>
<body>
  <div class="container">
    <div class="header">
      <h1>{brand}</h1>
      <p>{tagline}</p>
    </div>
    <div class="content">
      <h2>Thank you for reaching out, {name}!</h2>
      <p>We've received your message and appreciate you taking the time to contact us. Our team will review your inquiry and get back to you within 24 hours.</p>
      <div class="summary">
        <p><strong>Subject:</strong> {subject}</p>
        <p><strong>Message:</strong><br>{message}</p>
      </div>
      <p>In the meantime, feel free to explore our services and learn more about how we can help your business grow in the digital landscape.</p>
      <div class="cta"><a href="{website}" target="_blank">Visit Our Website</a></div>
      <div class="footer">
        <p><strong>{brand}</strong></p>
        <p>Email: {support}</p>
        <p><em>This is an automated response. Please do not reply to this email.</em></p>
      </div>
    </div>
  </div>
</body>
</html>"#
    );

    let text = format!(
        "Thank you for reaching out, {}!\n\n\
         We've received your message and will get back to you within 24 hours.\n\n\
         Subject: {}\n\
         Message:\n{}\n\n\
         Visit us at {}\n\n\
         {}\n\
         This is an automated response. Please do not reply to this email.\n",
        submission.name,
        submission.subject,
        excerpt,
        branding.website,
        branding.name,
    );

    OutgoingEmail {
        sender_name: format!("{} Support", branding.name),
        to: submission.email.clone(),
        subject: format!("Thank you for contacting {}, {}!", branding.name, submission.name),
        html,
        text,
    }
}
