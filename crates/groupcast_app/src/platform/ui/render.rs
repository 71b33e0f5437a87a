use std::fmt::Write as _;

use groupcast_core::{
    Alert, AlertSeverity, AppViewModel, AttachmentKind, ChannelStatus, ComposerView, ScreenView,
};
use qrcode::render::unicode;
use qrcode::QrCode;

pub fn render(view: &AppViewModel) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", status_line(view));
    match &view.screen {
        ScreenView::Loading => {
            let _ = writeln!(out, "Loading... waiting for the backend.");
        }
        ScreenView::Linking { qr } => {
            let _ = writeln!(out, "Scan this code with WhatsApp > Linked devices:");
            let _ = writeln!(out, "{}", render_qr(qr));
            let _ = writeln!(out, "{qr}");
        }
        ScreenView::Composing(composer) => render_composer(&mut out, composer),
    }
    out
}

fn status_line(view: &AppViewModel) -> String {
    let channel = match &view.channel {
        ChannelStatus::Idle => "idle".to_string(),
        ChannelStatus::Connecting => "connecting".to_string(),
        ChannelStatus::Connected => "connected".to_string(),
        ChannelStatus::Closed { reason } => format!("closed ({reason})"),
    };
    match &view.session {
        Some(session) => format!("Session {session} | channel {channel}"),
        None => format!("No session | channel {channel}"),
    }
}

fn render_composer(out: &mut String, composer: &ComposerView) {
    let filter = if composer.filter.is_empty() {
        String::new()
    } else {
        format!(" matching {:?}", composer.filter)
    };
    let _ = writeln!(
        out,
        "Chats{filter}: showing {} of {}, {} selected",
        composer.rows.len(),
        composer.total_chats,
        composer.selected_count
    );
    for (index, row) in composer.rows.iter().enumerate() {
        let mark = if row.selected { "x" } else { " " };
        let _ = writeln!(out, "  [{mark}] {:>3}. {}", index + 1, row.subject);
    }
    if !composer.rows.is_empty() {
        let mark = if composer.all_visible_selected { "x" } else { " " };
        let _ = writeln!(out, "  [{mark}] all shown");
    }
    let _ = writeln!(out, "Text: {}", composer.text);
    let attachment = match &composer.attachment_name {
        Some(name) => format!("{name} ({})", kind_label(composer.attachment_kind)),
        None => "none".to_string(),
    };
    let _ = writeln!(out, "Attachment: {attachment}");
    if composer.busy {
        let _ = writeln!(out, "Sending...");
    }
}

fn kind_label(kind: AttachmentKind) -> &'static str {
    match kind {
        AttachmentKind::None => "type not set",
        AttachmentKind::Audio => "audio",
        AttachmentKind::Document => "document",
    }
}

fn render_qr(payload: &str) -> String {
    match QrCode::new(payload.as_bytes()) {
        Ok(code) => code
            .render::<unicode::Dense1x2>()
            .dark_color(unicode::Dense1x2::Light)
            .light_color(unicode::Dense1x2::Dark)
            .quiet_zone(true)
            .build(),
        Err(err) => format!("(cannot draw QR code: {err})"),
    }
}

pub fn render_alert(alert: &Alert) -> String {
    match alert.severity {
        AlertSeverity::Info => format!("*** {} ***", alert.message),
        AlertSeverity::Error => format!("*** Error: {} ***", alert.message),
    }
}
