//! Greedy pagination of proposal blocks into the letterhead-safe area.
//!
//! # Invariants
//! - A regular page never holds more than `safe_height()` of content.
//! - A block taller than the safe area starts a fresh page and spans
//!   `ceil(height / safe_height)` pages on its own.

use crate::config::ProposalLayoutConfig;
use crate::proposal::Block;

/// Spacing unit of a regular paragraph gap, in twentieths of a point.
const STANDARD_GAP_TWIPS: f64 = 200.0;

/// Page geometry in CSS pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pub page_height: f64,
    pub header_height: f64,
    pub footer_height: f64,
    pub line_height: f64,
    /// Height of one regular paragraph gap.
    pub paragraph_spacing: f64,
    pub chars_per_line: usize,
}

impl PageLayout {
    pub fn from_config(config: &ProposalLayoutConfig) -> Self {
        Self {
            page_height: config.page_height,
            header_height: config.page_height * config.header_pct / 100.0,
            footer_height: config.page_height * config.footer_pct / 100.0,
            line_height: config.line_height,
            paragraph_spacing: config.paragraph_spacing,
            chars_per_line: config.chars_per_line.max(1),
        }
    }

    /// Vertical room between the header and footer bands.
    pub fn safe_height(&self) -> f64 {
        (self.page_height - self.header_height - self.footer_height).max(self.line_height)
    }

    /// Pages needed for `content_height` of flowing content; at least one.
    pub fn page_count(&self, content_height: f64) -> usize {
        if !(content_height > 0.0) {
            return 1;
        }
        ((content_height / self.safe_height()).ceil() as usize).max(1)
    }

    /// Lines `text` wraps into at `chars_per_line`, breaking on whitespace.
    ///
    /// Words longer than a line are split. Empty text still takes one line.
    pub fn wrapped_lines(&self, text: &str) -> usize {
        let width = self.chars_per_line;
        let mut lines = 1;
        let mut used = 0;
        for word in text.split_whitespace() {
            let len = word.chars().count();
            let needed = if used == 0 { len } else { used + 1 + len };
            if needed <= width {
                used = needed;
                continue;
            }
            if used > 0 {
                lines += 1;
            }
            lines += (len.saturating_sub(1)) / width;
            used = match len % width {
                0 => width,
                rest => rest,
            };
        }
        lines
    }

    pub fn block_height(&self, block: &Block) -> f64 {
        let lines = self.wrapped_lines(&block.plain_text()) as f64;
        let gap_units = f64::from(block.spacing_before + block.spacing_after) / STANDARD_GAP_TWIPS;
        lines * self.line_height + gap_units * self.paragraph_spacing
    }
}

/// One preview page: a run of block indices and the height they use.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub blocks: Vec<usize>,
    pub used_height: f64,
    /// Physical pages this entry covers; above 1 only for an oversize block.
    pub span: usize,
}

impl Page {
    fn empty() -> Self {
        Self {
            blocks: Vec::new(),
            used_height: 0.0,
            span: 1,
        }
    }
}

/// Packs `blocks` greedily in order.
pub fn paginate(layout: &PageLayout, blocks: &[Block]) -> Vec<Page> {
    let safe = layout.safe_height();
    let mut pages = Vec::new();
    let mut current = Page::empty();

    for (index, block) in blocks.iter().enumerate() {
        let height = layout.block_height(block);

        if height > safe {
            if !current.blocks.is_empty() {
                pages.push(std::mem::replace(&mut current, Page::empty()));
            }
            pages.push(Page {
                blocks: vec![index],
                used_height: height,
                span: layout.page_count(height),
            });
            continue;
        }

        if current.used_height + height > safe && !current.blocks.is_empty() {
            pages.push(std::mem::replace(&mut current, Page::empty()));
        }
        current.blocks.push(index);
        current.used_height += height;
    }

    if !current.blocks.is_empty() || pages.is_empty() {
        pages.push(current);
    }
    pages
}

/// Physical page total, counting oversize spans.
pub fn total_pages(pages: &[Page]) -> usize {
    pages.iter().map(|page| page.span).sum::<usize>().max(1)
}
