use chrono::NaiveDate;

use crate::models::settings::ReminderCadence;

/// Call-to-action target in every reminder email.
pub const APP_URL: &str = "https://ratemyday.app";

pub const REMINDER_SUBJECT: &str = "RateMyDay Reminder";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedReminder {
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Build the subject, plain-text body, and HTML body for a reminder.
///
/// Deterministic: the same cadence and missed-date list produce
/// byte-identical output. `missed_dates` is only rendered for the weekly
/// cadence and is expected in chronological order, as the ledger query
/// returns it.
pub fn compose_reminder(cadence: ReminderCadence, missed_dates: &[NaiveDate]) -> ComposedReminder {
    let mut text =
        String::from("Hello! This is your reminder to fill out your rating in RateMyDay.\n");

    match cadence {
        ReminderCadence::Daily => {
            text.push_str("\nIt looks like you haven't rated your day yet!");
        }
        ReminderCadence::Weekly => {
            text.push_str("\nYou missed the following days:\n");
            for date in missed_dates {
                text.push_str(&format!(" - {}\n", date.format("%Y-%m-%d")));
            }
        }
    }

    ComposedReminder {
        subject: REMINDER_SUBJECT.to_string(),
        text,
        html: render_html(cadence, missed_dates),
    }
}

fn render_html(cadence: ReminderCadence, missed_dates: &[NaiveDate]) -> String {
    let content_paragraph = match cadence {
        ReminderCadence::Daily => "We noticed you haven't rated your day yet. Take a moment to \
                                   reflect on how your day went and how you're feeling."
            .to_string(),
        ReminderCadence::Weekly => {
            let items: String = missed_dates
                .iter()
                .map(|date| {
                    format!(
                        r#"<li style="margin: 16px 0; font-weight: 100; font-size: 16px; color: #808080; line-height: 1.5;">{}</li>"#,
                        date.format("%Y-%m-%d")
                    )
                })
                .collect();
            format!(
                "We noticed you missed the following days. Take a moment to reflect on how your \
                 week went and how you're feeling.<ul>{}</ul>",
                items
            )
        }
    };

    // Inline styles for cross-client compatibility.
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0" />
    <title>RateMyDay Reminder</title>
</head>
<body style="margin: 0; padding: 0; background-color: #f7f7f7; font-family: 'Helvetica', 'Arial', sans-serif;">
<div style="max-width: 600px; margin: 40px auto; background-color: #ffffff; border-radius: 8px; padding: 24px; border: 1px solid #ddd; box-shadow: 0px 4px 8px rgba(0, 0, 0, 0.1);">
    <h2 style="text-align: center; color: #787878; margin-bottom: 20px; font-weight: 200; font-size: 24px; letter-spacing: 0.05em;">
        Reflect on Your Day with <span style="font-weight: 300">RateMyDay</span>
    </h2>
    <p style="margin: 16px 0; font-weight: 100; font-size: 16px; color: #808080; line-height: 1.5;">
        {content}
    </p>
    <div style="text-align: center; margin: 24px 0;">
        <a href="{link}" style="display: inline-block; border: 1px solid #2477C8; color: #2477C8; padding: 12px 24px; border-radius: 4px; font-size: 16px; font-weight: 300; letter-spacing: 0.05em; background-color: transparent; box-shadow: 1px 1px 2px rgba(0, 0, 0, 0.2); text-decoration: none;">
            RateMyDay Now
        </a>
    </div>
</div>
</body>
</html>
"#,
        content = content_paragraph,
        link = APP_URL
    )
}
