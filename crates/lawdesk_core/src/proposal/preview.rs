//! Paginated HTML preview of a proposal.

use crate::config::FirmConfig;
use crate::proposal::pagination::{Page, PageLayout};
use crate::proposal::{Align, Block};
use std::fmt::Write as _;

/// Escapes text for HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn css_align(align: Align) -> &'static str {
    match align {
        Align::Left => "left",
        Align::Center => "center",
        Align::Right => "right",
        Align::Justify => "justify",
    }
}

fn paragraph_html(block: &Block, layout: &PageLayout) -> String {
    let gap = layout.paragraph_spacing / 200.0;
    let mut html = format!(
        "<p style=\"text-align:{};margin:{:.1}px 0 {:.1}px 0\">",
        css_align(block.align),
        f64::from(block.spacing_before) * gap,
        f64::from(block.spacing_after) * gap,
    );
    if block.runs.iter().all(|run| run.text.is_empty()) {
        html.push_str("&nbsp;");
    }
    for run in &block.runs {
        let text = escape_html(&run.text).replace('\t', "&emsp;");
        if run.bold {
            let _ = write!(html, "<strong>{text}</strong>");
        } else {
            html.push_str(&text);
        }
    }
    html.push_str("</p>");
    html
}

/// Renders every page as a `<section>` with the letterhead bands.
pub fn render_preview(
    blocks: &[Block],
    pages: &[Page],
    layout: &PageLayout,
    firm: &FirmConfig,
) -> String {
    let firm_name = escape_html(&firm.name);
    let firm_address = escape_html(&firm.address);
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"pt-BR\">\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<title>{firm_name}</title>");
    let _ = writeln!(
        html,
        "<style>body{{background:#e5e7eb;font-family:Arial,sans-serif;font-size:11pt;line-height:{:.0}px}}\
         .page{{background:#fff;width:794px;margin:16px auto;position:relative;box-shadow:0 1px 4px #0003}}\
         .page header,.page footer{{display:flex;align-items:center;justify-content:center;padding:0 64px}}\
         .page main{{padding:0 64px;overflow:hidden}}</style>",
        layout.line_height
    );
    html.push_str("</head>\n<body>\n");

    for (number, page) in pages.iter().enumerate() {
        let page_height = layout.page_height * page.span as f64;
        let main_height = page_height - layout.header_height - layout.footer_height;
        let _ = writeln!(
            html,
            "<section class=\"page\" data-page=\"{}\" data-span=\"{}\" style=\"height:{page_height:.0}px\">",
            number + 1,
            page.span
        );
        let _ = writeln!(
            html,
            "<header style=\"height:{:.0}px\"><strong>{firm_name}</strong></header>",
            layout.header_height
        );
        let _ = writeln!(html, "<main style=\"height:{main_height:.0}px\">");
        for &index in &page.blocks {
            if let Some(block) = blocks.get(index) {
                html.push_str(&paragraph_html(block, layout));
                html.push('\n');
            }
        }
        html.push_str("</main>\n");
        let _ = writeln!(
            html,
            "<footer style=\"height:{:.0}px\">{firm_address}</footer>",
            layout.footer_height
        );
        html.push_str("</section>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProposalLayoutConfig;
    use crate::proposal::pagination::paginate;
    use crate::proposal::Run;

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            escape_html("<b>\"A & B\"</b>'"),
            "&lt;b&gt;&quot;A &amp; B&quot;&lt;/b&gt;&#39;"
        );
    }

    #[test]
    fn preview_has_one_section_per_page_with_letterhead() {
        let layout = PageLayout::from_config(&ProposalLayoutConfig::default());
        let blocks = vec![
            Block::new(vec![Run::bold("A "), Run::plain("<Cliente>")]),
            Block::text("Prezados,"),
        ];
        let pages = paginate(&layout, &blocks);
        let html = render_preview(&blocks, &pages, &layout, &FirmConfig::default());

        assert_eq!(html.matches("<section class=\"page\"").count(), pages.len());
        assert!(html.contains("<strong>SALOMÃO ADVOGADOS</strong>"));
        assert!(html.contains("<footer"));
        assert!(html.contains("<strong>A </strong>&lt;Cliente&gt;"));
        assert!(!html.contains("<Cliente>"));
    }
}
