//! Notification message templates for the lead pipeline.

use rust_decimal::Decimal;

use leadflow_core::scoring::LeadQuality;

use crate::blocks::{ButtonElement, ButtonStyle, MessageBuilder, MessageTemplate, TextObject};

#[derive(Clone, Debug)]
pub struct NewLeadNotification {
    pub lead_name: String,
    pub lead_email: String,
    pub company: Option<String>,
    pub score: u8,
    pub quality: LeadQuality,
    pub automation_area: Option<String>,
    pub crm_url: Option<String>,
}

pub fn new_qualified_lead_message(notification: &NewLeadNotification) -> MessageTemplate {
    let company = notification.company.as_deref().unwrap_or("Not provided");
    let score_line =
        format!("*Score:*\n{} {}/100", quality_emoji(notification.quality), notification.score);

    let mut builder = MessageBuilder::new(format!(
        "New lead: {} from {} (Score: {})",
        notification.lead_name,
        notification.company.as_deref().unwrap_or("Unknown"),
        notification.score
    ))
    .header("🎯 New Qualified Lead")
    .fields(vec![
        TextObject::mrkdwn(format!("*Name:*\n{}", notification.lead_name)),
        TextObject::mrkdwn(format!("*Company:*\n{company}")),
        TextObject::mrkdwn(format!("*Email:*\n{}", notification.lead_email)),
        TextObject::mrkdwn(score_line),
    ]);

    if let Some(area) = &notification.automation_area {
        builder = builder.section(TextObject::mrkdwn(format!("*Automation Area:*\n{area}")));
    }

    let mut buttons = Vec::new();
    if let Some(crm_url) = &notification.crm_url {
        buttons.push(ButtonElement::new("View in CRM").style(ButtonStyle::Primary).url(crm_url));
    }
    buttons.push(ButtonElement::new("Send Email").url(format!("mailto:{}", notification.lead_email)));

    builder.actions(buttons).build()
}

pub fn quote_accepted_message(
    lead_name: &str,
    company: Option<&str>,
    project_title: &str,
    amount: Decimal,
) -> MessageTemplate {
    MessageBuilder::new(format!(
        "Quote accepted! {lead_name} - {project_title} ({})",
        format_amount(amount)
    ))
    .header("🎉 Quote Accepted!")
    .fields(vec![
        TextObject::mrkdwn(format!("*Client:*\n{lead_name}")),
        TextObject::mrkdwn(format!("*Company:*\n{}", company.unwrap_or("N/A"))),
        TextObject::mrkdwn(format!("*Project:*\n{project_title}")),
        TextObject::mrkdwn(format!("*Amount:*\n{}", format_amount(amount))),
    ])
    .divider()
    .section(TextObject::mrkdwn(
        "🚀 *Action Required:* Schedule kickoff call within 48 hours".to_string(),
    ))
    .build()
}

pub fn quote_declined_message(
    lead_name: &str,
    company: Option<&str>,
    project_title: &str,
    reason: Option<&str>,
) -> MessageTemplate {
    let mut builder =
        MessageBuilder::new(format!("Quote declined: {lead_name} - {project_title}"))
            .header("❌ Quote Declined")
            .fields(vec![
                TextObject::mrkdwn(format!("*Client:*\n{lead_name}")),
                TextObject::mrkdwn(format!("*Company:*\n{}", company.unwrap_or("N/A"))),
                TextObject::mrkdwn(format!("*Project:*\n{project_title}")),
            ]);

    if let Some(reason) = reason {
        builder = builder.section(TextObject::mrkdwn(format!("*Reason:*\n_{reason}_")));
    }

    builder.build()
}

fn quality_emoji(quality: LeadQuality) -> &'static str {
    match quality {
        LeadQuality::High => "🟢",
        LeadQuality::Medium => "🟡",
        LeadQuality::Low => "🔴",
    }
}

/// `$12,345.67` style formatting for quote amounts.
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let raw = format!("{rounded:.2}");
    let (whole, cents) = raw.split_once('.').unwrap_or((raw.as_str(), "00"));
    let (sign, digits) = match whole.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", whole),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{sign}${grouped}.{cents}")
}
