//! LINE message bodies for each notification kind.

use chrono::{DateTime, FixedOffset, Utc};
use serde_json::{json, Value};
use thinker_core::OutboundMessage;

/// Asia/Taipei, used for every date a student sees.
const DISPLAY_OFFSET_SECS: i32 = 8 * 60 * 60;

const MUTED: &str = "#666666";
const INK: &str = "#111111";
const ALERT: &str = "#FF6B6B";
const SUCCESS: &str = "#28a745";

/// Display values for one notification, already resolved from the order.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFields {
    pub student_name: String,
    pub order_id: String,
    pub course_name: String,
    /// Whole NT$.
    pub amount: i64,
    pub payment_url: String,
    pub payment_deadline: Option<DateTime<Utc>>,
}

/// Brand-level wording shared by all templates.
#[derive(Debug, Clone)]
pub struct TemplateContext {
    pub brand_name: String,
    pub payment_window_hours: i64,
}

/// `1234567` -> `1,234,567`
pub fn format_amount(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if amount < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `YYYY/MM/DD HH:MM` in Taiwan time.
pub fn format_deadline(at: DateTime<Utc>) -> String {
    match FixedOffset::east_opt(DISPLAY_OFFSET_SECS) {
        Some(tz) => at.with_timezone(&tz).format("%Y/%m/%d %H:%M").to_string(),
        None => at.format("%Y/%m/%d %H:%M").to_string(),
    }
}

fn header(title: &str, background: &str) -> Value {
    json!({
        "type": "box",
        "layout": "vertical",
        "contents": [
            { "type": "text", "text": title, "weight": "bold", "size": "xl", "color": "#FFFFFF" }
        ],
        "backgroundColor": background,
    })
}

fn detail_row(label: &str, value: &str, color: &str, emphasized: bool) -> Value {
    let mut value_node = json!({
        "type": "text",
        "text": value,
        "wrap": true,
        "color": color,
        "size": "sm",
        "flex": 5,
    });
    if emphasized {
        value_node["weight"] = json!("bold");
    }
    json!({
        "type": "box",
        "layout": "baseline",
        "spacing": "sm",
        "contents": [
            { "type": "text", "text": label, "color": MUTED, "size": "sm", "flex": 3 },
            value_node,
        ],
    })
}

fn amount_row(amount: i64, color: &str) -> Value {
    let mut row = detail_row("應繳金額", &format!("NT$ {}", format_amount(amount)), color, true);
    row["contents"][1]["size"] = json!("md");
    row
}

fn greeting(fields: &RenderedFields, subtitle: &str) -> [Value; 3] {
    [
        json!({
            "type": "text",
            "text": format!("{} 您好！", fields.student_name),
            "weight": "bold",
            "size": "md",
            "margin": "none",
        }),
        json!({ "type": "text", "text": subtitle, "size": "sm", "color": MUTED, "margin": "sm" }),
        json!({ "type": "separator", "margin": "lg" }),
    ]
}

fn footer(primary_label: &str, secondary_label: &str, url: &str) -> Value {
    json!({
        "type": "box",
        "layout": "vertical",
        "spacing": "sm",
        "contents": [
            {
                "type": "button",
                "style": "primary",
                "height": "sm",
                "action": { "type": "uri", "label": primary_label, "uri": url },
                "color": SUCCESS,
            },
            {
                "type": "button",
                "style": "link",
                "height": "sm",
                "action": { "type": "uri", "label": secondary_label, "uri": url },
            },
        ],
        "flex": 0,
    })
}

fn bubble(header: Value, body: Vec<Value>, footer: Value) -> Value {
    json!({
        "type": "bubble",
        "header": header,
        "body": { "type": "box", "layout": "vertical", "contents": body },
        "footer": footer,
    })
}

pub fn payment_reminder(ctx: &TemplateContext, fields: &RenderedFields) -> OutboundMessage {
    let mut rows = vec![
        detail_row("訂單編號", &format!("#{}", fields.order_id), INK, true),
        detail_row("課程名稱", &fields.course_name, INK, false),
        amount_row(fields.amount, ALERT),
    ];
    if let Some(deadline) = fields.payment_deadline {
        rows.push(detail_row("繳費期限", &format_deadline(deadline), INK, false));
    }

    let mut body: Vec<Value> = greeting(fields, "您的課程報名尚未完成繳費").into();
    body.push(json!({ "type": "box", "layout": "vertical", "margin": "lg", "spacing": "sm", "contents": rows }));
    body.push(json!({ "type": "separator", "margin": "lg" }));
    body.push(json!({
        "type": "box",
        "layout": "vertical",
        "margin": "lg",
        "spacing": "sm",
        "contents": [{
            "type": "text",
            "text": "⚠️ 請於期限內完成繳費，逾期訂單將自動取消",
            "size": "xs",
            "color": ALERT,
            "wrap": true,
        }],
    }));

    OutboundMessage::flex(
        format!("【{}】繳費提醒 #{}", ctx.brand_name, fields.order_id),
        bubble(
            header("💰 繳費提醒", ALERT),
            body,
            footer("立即繳費", "查看訂單詳情", &fields.payment_url),
        ),
    )
}

pub fn order_confirmation(ctx: &TemplateContext, fields: &RenderedFields) -> OutboundMessage {
    let rows = vec![
        detail_row("訂單編號", &format!("#{}", fields.order_id), INK, true),
        detail_row("課程名稱", &fields.course_name, INK, false),
        amount_row(fields.amount, SUCCESS),
    ];

    let subtitle = format!("感謝您報名{}的課程", ctx.brand_name);
    let mut body: Vec<Value> = greeting(fields, &subtitle).into();
    body.push(json!({ "type": "box", "layout": "vertical", "margin": "lg", "spacing": "sm", "contents": rows }));
    body.push(json!({ "type": "separator", "margin": "lg" }));
    body.push(json!({
        "type": "box",
        "layout": "vertical",
        "margin": "lg",
        "spacing": "sm",
        "contents": [
            {
                "type": "text",
                "text": format!("📌 下一步：請於 {} 小時內完成繳費", ctx.payment_window_hours),
                "size": "sm",
                "color": INK,
                "wrap": true,
                "weight": "bold",
            },
            {
                "type": "text",
                "text": "完成繳費後，我們會立即通知您",
                "size": "xs",
                "color": MUTED,
                "wrap": true,
                "margin": "sm",
            },
        ],
    }));

    OutboundMessage::flex(
        format!("【{}】訂單確認 #{}", ctx.brand_name, fields.order_id),
        bubble(
            header("✅ 報名成功", SUCCESS),
            body,
            footer("前往繳費", "查看訂單", &fields.payment_url),
        ),
    )
}

pub fn payment_success(fields: &RenderedFields) -> OutboundMessage {
    OutboundMessage::text(format!(
        "✅ 繳費成功通知\n\n{} 您好！\n\n您的訂單 #{} 已成功繳費\n課程：{}\n金額：NT$ {}\n\n我們會在課程開課前再次通知您，請保持 LINE 通知開啟。\n\n如有任何問題，歡迎隨時與我們聯繫！",
        fields.student_name,
        fields.order_id,
        fields.course_name,
        format_amount(fields.amount),
    ))
}
