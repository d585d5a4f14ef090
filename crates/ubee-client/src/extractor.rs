use scraper::{ElementRef, Html, Selector};
use ubee_core::error::AppError;
use ubee_core::layout::{
    self, CONTENT_SELECTOR, CURRENT_TAB_SELECTOR, CellSpec, DOCSIS_TABLES, FIRMWARE_CELL,
    MAIN_PAGE_SELECTOR, TableSpec, UPTIME_CELL,
};
use ubee_core::models::{Measurements, Section};
use ubee_core::traits::Extractor;

/// HTML extractor using scraper.
///
/// All selectors from [`ubee_core::layout`] are compiled once up front; a
/// selector that fails to compile is a startup error, not a scrape error.
#[derive(Debug, Clone)]
pub struct ScraperExtractor {
    content: Selector,
    current_tab: Selector,
    main_page: Selector,
    cell: Selector,
    tables: Vec<(TableSpec, Selector)>,
    uptime: Selector,
    firmware: Selector,
}

impl ScraperExtractor {
    pub fn new() -> Result<Self, AppError> {
        let tables = DOCSIS_TABLES
            .iter()
            .map(|spec| Ok((*spec, compile(spec.row_selector)?)))
            .collect::<Result<Vec<_>, AppError>>()?;

        Ok(Self {
            content: compile(CONTENT_SELECTOR)?,
            current_tab: compile(CURRENT_TAB_SELECTOR)?,
            main_page: compile(MAIN_PAGE_SELECTOR)?,
            cell: compile("td")?,
            tables,
            uptime: compile(UPTIME_CELL.selector)?,
            firmware: compile(FIRMWARE_CELL.selector)?,
        })
    }

    fn main_page<'a>(&self, doc: &'a Html) -> Option<ElementRef<'a>> {
        doc.select(&self.content)
            .find_map(|holder| holder.select(&self.main_page).next())
    }

    /// Trimmed text of every `td` in every row the selector matches.
    fn rows(&self, scope: ElementRef<'_>, rows: &Selector) -> Vec<Vec<String>> {
        scope
            .select(rows)
            .map(|tr| tr.select(&self.cell).map(text_of).collect())
            .collect()
    }

    fn cell_text(&self, scope: ElementRef<'_>, spec: &CellSpec, selector: &Selector) -> Option<String> {
        let text = scope.select(selector).next().map(text_of);
        if text.is_none() {
            tracing::warn!(field = %spec.field, selector = spec.selector, "Cell not found");
        }
        text
    }
}

impl Extractor for ScraperExtractor {
    type Document = Html;

    fn parse(&self, html: &str) -> Html {
        Html::parse_document(html)
    }

    fn current_tabs(&self, doc: &Html) -> Vec<String> {
        doc.select(&self.content)
            .flat_map(|holder| holder.select(&self.current_tab).map(text_of))
            .collect()
    }

    fn extract(&self, doc: &Html, section: Section, out: &mut Measurements) {
        let Some(main) = self.main_page(doc) else {
            tracing::warn!(%section, "Page has no {MAIN_PAGE_SELECTOR} element");
            return;
        };

        match section {
            Section::Docsis => {
                for (spec, selector) in &self.tables {
                    let rows = self.rows(main, selector);
                    if rows.len() <= spec.header_rows {
                        tracing::warn!(
                            table = ?spec.kind,
                            rows = rows.len(),
                            "Table has no data rows"
                        );
                    }
                    layout::collect_table(spec, &rows, out);
                }
            }
            Section::Status => {
                if let Some(text) = self.cell_text(main, &UPTIME_CELL, &self.uptime) {
                    layout::collect_uptime(&text, out);
                }
            }
            Section::Firmware => {
                if let Some(text) = self.cell_text(main, &FIRMWARE_CELL, &self.firmware) {
                    layout::collect_firmware(&text, out);
                }
            }
        }
    }
}

fn compile(selector: &str) -> Result<Selector, AppError> {
    Selector::parse(selector)
        .map_err(|e| AppError::Generic(format!("Invalid selector '{selector}': {e}")))
}

fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}
