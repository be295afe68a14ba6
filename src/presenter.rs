use crate::handlers::{Outcome, Session};
use crate::models::{AnalysisStatus, FishAnalysis};
use crate::services::EncodedImage;

const PAGE_TEMPLATE: &str = include_str!("../static/index.html");
const NOT_INFORMED: &str = "Não informado";

pub fn render_page(session: &Session) -> String {
    let mut content = String::new();

    content.push_str(&render_uploader(session.image(), session.is_analyzing()));
    content.push_str(&render_analyze_button(session));

    match (session.status(), session.outcome()) {
        (AnalysisStatus::Error, Outcome::Error(message)) => content.push_str(&render_error(message)),
        (AnalysisStatus::Success, Outcome::Result(analysis)) => {
            content.push_str(&render_result_card(analysis));
            if let Some(at) = session.analyzed_at() {
                content.push_str(&format!(
                    "<p class=\"analyzed-at\">Analisado em {}</p>",
                    at.format("%d/%m/%Y %H:%M UTC")
                ));
            }
        }
        _ => {}
    }

    PAGE_TEMPLATE.replace("{{content}}", &content)
}

fn render_uploader(image: Option<&EncodedImage>, disabled: bool) -> String {
    if let Some(image) = image {
        let remove = if disabled {
            String::new()
        } else {
            "<form method=\"post\" action=\"/image/clear\">\
             <button type=\"submit\" class=\"remove-image\" title=\"Remover imagem\">✕</button>\
             </form>"
                .to_string()
        };

        return format!(
            "<div class=\"preview\"><img src=\"{}\" alt=\"Preview\">{}</div>",
            escape_html(&image.data_uri),
            remove
        );
    }

    let disabled_attr = if disabled { " disabled" } else { "" };

    format!(
        "<form id=\"upload-form\" class=\"drop-zone{}\" method=\"post\" action=\"/image\" enctype=\"multipart/form-data\">\
         <input id=\"file-input\" type=\"file\" name=\"image\" accept=\"image/*\"{}>\
         <div class=\"drop-icon\">📷</div>\
         <h3>Carregue uma foto do peixe</h3>\
         <p>Clique para selecionar ou arraste a imagem aqui</p>\
         <small>Suporta JPG, PNG, WEBP</small>\
         <noscript><button type=\"submit\">Enviar</button></noscript>\
         </form>",
        disabled_attr, disabled_attr
    )
}

fn render_analyze_button(session: &Session) -> String {
    let disabled = if session.can_submit() { "" } else { " disabled" };
    let label = if session.is_analyzing() {
        "⏳ Analisando..."
    } else {
        "🔍 Identificar Peixe"
    };

    format!(
        "<form class=\"analyze\" method=\"post\" action=\"/analyze\">\
         <button type=\"submit\"{}>{}</button>\
         </form>",
        disabled, label
    )
}

pub fn render_error(message: &str) -> String {
    format!(
        "<div class=\"error\"><p><strong>Ops! Algo deu errado.</strong></p><p>{}</p></div>",
        escape_html(message)
    )
}

pub fn render_result_card(analysis: &FishAnalysis) -> String {
    let tier = analysis.confidence_tier();

    let (edible_class, edible_label) = if analysis.edible {
        ("edible", "✅ Comestível")
    } else {
        ("not-edible", "⚠️ Não Recomendado / Impróprio")
    };

    let cooking_tip = match analysis.cooking_tips.as_deref().map(str::trim) {
        Some(tip) if !tip.is_empty() => {
            format!("<p class=\"tip\"><strong>Dica:</strong> {}</p>", escape_html(tip))
        }
        _ => String::new(),
    };

    format!(
        "<article class=\"result\">\
         <header>\
         <div><h2>{name}</h2><p class=\"scientific\">{scientific}</p></div>\
         <span class=\"confidence {tier_class}\">{confidence}% Confiança ({tier})</span>\
         </header>\
         <section><h3>Descrição</h3><p>{description}</p></section>\
         <section><h3>Habitat &amp; Dieta</h3>\
         <p><strong>Habitat:</strong> {habitat}</p>\
         <p><strong>Dieta:</strong> {diet}</p></section>\
         <section><h3>Gastronomia</h3>\
         <div class=\"{edible_class}\"><p><strong>{edible_label}</strong></p>{cooking_tip}</div></section>\
         <section><h3>Estado de Conservação</h3><span class=\"badge\">{conservation}</span></section>\
         </article>",
        name = escape_html(&analysis.name),
        scientific = escape_html(&analysis.scientific_name),
        tier_class = tier.css_class(),
        confidence = analysis.confidence,
        tier = tier,
        description = escape_html(&analysis.description),
        habitat = escape_html(&analysis.habitat),
        diet = optional_text(analysis.diet.as_deref()),
        edible_class = edible_class,
        edible_label = edible_label,
        cooking_tip = cooking_tip,
        conservation = optional_text(analysis.conservation_status.as_deref()),
    )
}

fn optional_text(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => escape_html(v),
        _ => NOT_INFORMED.to_string(),
    }
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
