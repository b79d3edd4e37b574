//! HTML email templates, rendered with tera from embedded sources.

use anyhow::{Context as _, Result};
use serde::Serialize;
use tera::{Context, Tera};

const WELCOME_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <style>
        body { font-family: -apple-system, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px; }
        .header { background: linear-gradient(135deg, #fb6400 0%, #ff7a1a 100%); color: white; padding: 30px; text-align: center; border-radius: 8px; }
        .content { background: #f8fafc; padding: 30px; border-radius: 8px; margin-top: 20px; }
        .callout { background: #fff7ed; border-left: 4px solid #fb6400; padding: 16px; margin: 16px 0; }
        .footer { text-align: center; color: #64748b; font-size: 14px; margin-top: 30px; }
    </style>
</head>
<body>
    <div class="header">
        <h1>🎉 Thanks for Connecting!</h1>
    </div>
    <div class="content">
        <p>Hi {{ name }},</p>
        <p>Thanks for reaching out! I've passed your project details to our team, and they're already analyzing how we can help you with <strong>{{ automation_area | default(value="your automation needs") }}</strong>.</p>
        <p><strong>What happens next?</strong></p>
        <ul>
            <li>📊 We're analyzing your requirements</li>
            <li>💰 Calculating ROI and pricing</li>
            <li>📝 Preparing a custom proposal</li>
        </ul>
        {% if problem_text %}
        <div class="callout">
            <p><strong>Your Challenge:</strong><br>
            <em>"{{ problem_text }}"</em></p>
        </div>
        {% endif %}
        <p>You'll receive a detailed proposal within 24 hours!</p>
        <p>Best,<br><strong>The Leadflow Team</strong></p>
    </div>
    <div class="footer">
        <p>Leadflow | AI-Powered Automation</p>
    </div>
</body>
</html>"#;

const QUOTE_READY_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <style>
        body { font-family: -apple-system, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px; }
        .header { background: linear-gradient(135deg, #6366f1 0%, #8b5cf6 100%); color: white; padding: 30px; text-align: center; border-radius: 8px; }
        .content { background: #f8fafc; padding: 30px; border-radius: 8px; margin-top: 20px; }
        .cta { display: inline-block; background: #fb6400; color: white; padding: 12px 24px; text-decoration: none; border-radius: 6px; font-weight: 600; }
    </style>
</head>
<body>
    <div class="header">
        <h1>📋 Your Quote is Ready!</h1>
    </div>
    <div class="content">
        <p>Hi {{ name }},</p>
        <p>Your quote for <strong>{{ project_title }}</strong> is ready.</p>
        {% if quote_url %}
        <p style="text-align: center;">
            <a href="{{ quote_url }}" class="cta">View Your Quote</a>
        </p>
        {% endif %}
        <p>This quote includes:</p>
        <ul>
            <li>📋 Detailed project scope</li>
            <li>⏱️ Timeline estimates</li>
            <li>💰 Investment breakdown</li>
            <li>🚀 Next steps</li>
        </ul>
        <p>Reply to this email with any questions!</p>
        <p>Best,<br><strong>The Leadflow Team</strong></p>
    </div>
</body>
</html>"#;

const TEAM_NOTIFICATION_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <style>
        body { font-family: -apple-system, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px; }
        .header { background: linear-gradient(135deg, #10b981 0%, #059669 100%); color: white; padding: 30px; text-align: center; border-radius: 8px; }
        .content { background: #f0fdf4; padding: 30px; border-radius: 8px; margin-top: 20px; }
        .callout { background: #fff7ed; border-left: 4px solid #fb6400; padding: 16px; margin-top: 16px; }
        table { width: 100%; border-collapse: collapse; }
        td { padding: 8px; border-bottom: 1px solid #e0e0e0; }
    </style>
</head>
<body>
    <div class="header">
        <h1>🎯 New Qualified Lead</h1>
    </div>
    <div class="content">
        <table>
            <tr><td><strong>Name:</strong></td><td>{{ lead_name }}</td></tr>
            <tr><td><strong>Email:</strong></td><td><a href="mailto:{{ lead_email }}">{{ lead_email }}</a></td></tr>
            <tr><td><strong>Company:</strong></td><td>{{ company | default(value="Not provided") }}</td></tr>
            <tr><td><strong>Lead Score:</strong></td><td>{{ lead_score | default(value="N/A") }}/100</td></tr>
        </table>
        {% if project_summary %}
        <div class="callout">
            <p><strong>Project:</strong></p>
            <p>{{ project_summary }}</p>
        </div>
        {% endif %}
        <p style="margin-top: 16px;"><strong>Action Required:</strong> Review and respond within 24 hours.</p>
    </div>
</body>
</html>"#;

// Absent optionals are skipped so tera's `default` filter and `if` blocks
// see an undefined variable rather than a null.
#[derive(Debug, Serialize)]
pub struct WelcomeEmail<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub automation_area: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem_text: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct QuoteReadyEmail<'a> {
    pub name: &'a str,
    pub project_title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_url: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct TeamNotificationEmail<'a> {
    pub lead_name: &'a str,
    pub lead_email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_summary: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_score: Option<u8>,
}

pub struct EmailTemplates {
    tera: Tera,
}

impl EmailTemplates {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates([
            ("welcome.html", WELCOME_TEMPLATE),
            ("quote_ready.html", QUOTE_READY_TEMPLATE),
            ("team_notification.html", TEAM_NOTIFICATION_TEMPLATE),
        ])
        .context("failed to register email templates")?;
        Ok(Self { tera })
    }

    pub fn render_welcome(&self, email: &WelcomeEmail<'_>) -> Result<String> {
        self.render("welcome.html", email)
    }

    pub fn render_quote_ready(&self, email: &QuoteReadyEmail<'_>) -> Result<String> {
        self.render("quote_ready.html", email)
    }

    pub fn render_team_notification(&self, email: &TeamNotificationEmail<'_>) -> Result<String> {
        self.render("team_notification.html", email)
    }

    fn render<T: Serialize>(&self, template: &str, value: &T) -> Result<String> {
        let context = Context::from_serialize(value)
            .with_context(|| format!("failed to build context for `{template}`"))?;
        self.tera
            .render(template, &context)
            .with_context(|| format!("failed to render `{template}`"))
    }
}
