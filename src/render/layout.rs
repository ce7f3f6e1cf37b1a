//! Page layout for CV documents.
//!
//! Coordinates are in points measured from the top-left corner of an A4 page;
//! `y` is the top of the element. The PDF writer flips them.

use chrono::NaiveDate;

use crate::model::cv_profile::{CvProfile, CvSection};
use crate::util::dates::{date_range, month_year};

pub const PAGE_WIDTH: f32 = 595.28;
pub const PAGE_HEIGHT: f32 = 841.89;
pub const MARGIN: f32 = 50.0;
pub const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
/// Lowest point body content may reach; the footer sits below it.
pub const CONTENT_BOTTOM: f32 = PAGE_HEIGHT - MARGIN - 14.0;
const FOOTER_Y: f32 = PAGE_HEIGHT - MARGIN + 8.0;

const LINE_SPACING: f32 = 1.2;
const INDENT: f32 = 15.0;
const ENTRY_GAP: f32 = 15.0;
const SKILL_ROW_HEIGHT: f32 = 50.0;
const LANGUAGE_ROW_HEIGHT: f32 = 26.0;

const TEXT_COLOR: &str = "#333333";
const MUTED_COLOR: &str = "#555555";
const HEADLINE_COLOR: &str = "#444444";
const FOOTER_COLOR: &str = "#888888";
const BAR_BACKGROUND: &str = "#eeeeee";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
    Oblique,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Text { x: f32, y: f32, size: f32, style: FontStyle, color: String, text: String },
    Rule { x1: f32, x2: f32, y: f32, thickness: f32, color: String },
    Bar { x: f32, y: f32, width: f32, height: f32, color: String },
}

impl Element {
    fn shifted(mut self, dy: f32) -> Self {
        match &mut self {
            Element::Text { y, .. } | Element::Rule { y, .. } | Element::Bar { y, .. } => *y += dy,
        }
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub elements: Vec<Element>,
}

impl Page {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().filter_map(|e| match e {
            Element::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub title: String,
    pub author: String,
    pub pages: Vec<Page>,
}

fn glyph_width(c: char) -> f32 {
    match c {
        'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '\'' | '|' | '!' | 'I' => 0.26,
        ' ' | 'f' | 't' | 'r' | '(' | ')' | '-' | '/' => 0.33,
        'm' | 'w' => 0.83,
        'M' | 'W' | '@' => 0.9,
        c if c.is_ascii_uppercase() => 0.67,
        c if c.is_ascii_digit() => 0.556,
        _ => 0.53,
    }
}

/// Estimated advance width of `text` in points.
pub fn text_width(text: &str, size: f32, style: FontStyle) -> f32 {
    let em: f32 = text.chars().map(glyph_width).sum();
    let weight = if style == FontStyle::Bold { 1.05 } else { 1.0 };
    em * size * weight
}

fn split_long_word(word: &str, size: f32, style: FontStyle, width: f32) -> Vec<String> {
    if text_width(word, size, style) <= width {
        return vec![word.to_string()];
    }
    let mut pieces = Vec::new();
    let mut current = String::new();
    for c in word.chars() {
        current.push(c);
        if text_width(&current, size, style) > width && current.chars().count() > 1 {
            current.pop();
            pieces.push(std::mem::take(&mut current));
            current.push(c);
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Greedy word wrap. Line breaks in the input are kept; words wider than a
/// line are cut by character.
pub fn wrap(text: &str, size: f32, style: FontStyle, width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            for piece in split_long_word(word, size, style, width) {
                if current.is_empty() {
                    current = piece;
                    continue;
                }
                let candidate = format!("{} {}", current, piece);
                if text_width(&candidate, size, style) <= width {
                    current = candidate;
                } else {
                    lines.push(std::mem::replace(&mut current, piece));
                }
            }
        }
        lines.push(current);
    }
    lines
}

/// One line of content. Element offsets are relative to the row top.
#[derive(Debug, Clone, Default)]
struct Row {
    height: f32,
    elements: Vec<Element>,
}

/// Rows that belong to one entry and move to a new page together if they can.
type Block = Vec<Row>;

fn block_height(block: &[Row]) -> f32 {
    block.iter().map(|r| r.height).sum()
}

fn line_height(size: f32) -> f32 {
    size * LINE_SPACING
}

fn gap(height: f32) -> Row {
    Row { height, elements: Vec::new() }
}

fn text(x: f32, size: f32, style: FontStyle, color: &str, content: String) -> Element {
    Element::Text { x, y: 0.0, size, style, color: color.to_string(), text: content }
}

fn text_rows(content: &str, size: f32, style: FontStyle, color: &str, indent: f32) -> Vec<Row> {
    wrap(content, size, style, CONTENT_WIDTH - indent)
        .into_iter()
        .map(|line| Row { height: line_height(size), elements: vec![text(MARGIN + indent, size, style, color, line)] })
        .collect()
}

fn centered_rows(content: &str, size: f32, style: FontStyle, color: &str) -> Vec<Row> {
    wrap(content, size, style, CONTENT_WIDTH)
        .into_iter()
        .map(|line| {
            let x = (MARGIN + (CONTENT_WIDTH - text_width(&line, size, style)) / 2.0).max(MARGIN);
            Row { height: line_height(size), elements: vec![text(x, size, style, color, line)] }
        })
        .collect()
}

/// A bold lead followed by regular text on the same line, e.g. "Engineer" + " at Acme".
fn lead_rows(strong: &str, rest: &str, size: f32) -> Vec<Row> {
    let full = format!("{}{}", strong, rest);
    let strong_width = text_width(strong, size, FontStyle::Bold);
    if rest.is_empty() || strong_width + text_width(rest, size, FontStyle::Regular) > CONTENT_WIDTH {
        return text_rows(&full, size, FontStyle::Bold, TEXT_COLOR, 0.0);
    }
    vec![Row {
        height: line_height(size),
        elements: vec![
            text(MARGIN, size, FontStyle::Bold, TEXT_COLOR, strong.to_string()),
            text(MARGIN + strong_width, size, FontStyle::Regular, TEXT_COLOR, rest.to_string()),
        ],
    }]
}

fn at(place: &str) -> String {
    if place.trim().is_empty() {
        String::new()
    } else {
        format!(" at {}", place.trim())
    }
}

fn bullet_rows(label: &str, items: &[String]) -> Vec<Row> {
    let items: Vec<&String> = items.iter().filter(|i| !i.trim().is_empty()).collect();
    if items.is_empty() {
        return Vec::new();
    }
    let mut rows = text_rows(label, 11.0, FontStyle::Bold, TEXT_COLOR, 0.0);
    for item in items {
        rows.extend(text_rows(&format!("\u{2022} {}", item.trim()), 11.0, FontStyle::Regular, TEXT_COLOR, INDENT));
    }
    rows
}

fn listing_rows(label: &str, items: &[String]) -> Vec<Row> {
    let joined = items.iter().map(|i| i.trim()).filter(|i| !i.is_empty()).collect::<Vec<_>>().join(", ");
    if joined.is_empty() {
        return Vec::new();
    }
    let mut rows = text_rows(label, 11.0, FontStyle::Bold, TEXT_COLOR, 0.0);
    rows.extend(text_rows(&joined, 11.0, FontStyle::Regular, TEXT_COLOR, INDENT));
    rows
}

fn optional_rows(content: &str, size: f32, style: FontStyle, color: &str) -> Vec<Row> {
    if content.trim().is_empty() {
        Vec::new()
    } else {
        text_rows(content.trim(), size, style, color, 0.0)
    }
}

fn joined(parts: &[String]) -> String {
    parts.iter().filter(|p| !p.is_empty()).cloned().collect::<Vec<_>>().join(" | ")
}

struct Composer {
    done: Vec<Page>,
    current: Page,
    y: f32,
    primary: String,
}

impl Composer {
    fn new(primary: String) -> Self {
        Composer { done: Vec::new(), current: Page::default(), y: MARGIN, primary }
    }

    fn remaining(&self) -> f32 {
        CONTENT_BOTTOM - self.y
    }

    fn at_top(&self) -> bool {
        self.y <= MARGIN
    }

    fn new_page(&mut self) {
        self.done.push(std::mem::take(&mut self.current));
        self.y = MARGIN;
    }

    fn place_row(&mut self, row: Row) {
        if row.elements.is_empty() {
            self.y = (self.y + row.height).min(CONTENT_BOTTOM);
            return;
        }
        if row.height > self.remaining() && !self.at_top() {
            self.new_page();
        }
        let top = self.y;
        self.current.elements.extend(row.elements.into_iter().map(|e| e.shifted(top)));
        self.y += row.height;
    }

    fn place_block(&mut self, block: Block) {
        for row in block {
            self.place_row(row);
        }
    }

    fn header_block(&self, heading: &str) -> Block {
        let mut block = text_rows(heading, 16.0, FontStyle::Bold, &self.primary, 0.0);
        block.push(gap(4.0));
        block.push(Row {
            height: 10.0,
            elements: vec![Element::Rule {
                x1: MARGIN,
                x2: PAGE_WIDTH - MARGIN,
                y: 0.0,
                thickness: 1.0,
                color: self.primary.clone(),
            }],
        });
        block
    }

    /// A section header followed by its entries. The header never ends a page
    /// alone; an entry that does not fit opens a new page with a
    /// "(continued)" header.
    fn section(&mut self, heading: &str, blocks: Vec<Block>) {
        let Some(first) = blocks.first() else {
            return;
        };
        let header = self.header_block(heading);
        let usable = CONTENT_BOTTOM - MARGIN;
        let needed = block_height(&header) + block_height(first).min(usable - block_height(&header));
        if !self.at_top() && needed > self.remaining() {
            self.new_page();
        }
        self.place_block(header);

        for (i, block) in blocks.into_iter().enumerate() {
            if i > 0 && block_height(&block) > self.remaining() {
                self.new_page();
                let continued = self.header_block(&format!("{} (continued)", heading));
                self.place_block(continued);
            }
            self.place_block(block);
        }
        self.place_row(gap(10.0));
    }

    fn finish(mut self, generated_on: NaiveDate) -> Vec<Page> {
        if !self.current.elements.is_empty() || self.done.is_empty() {
            self.done.push(self.current);
        }
        let total = self.done.len();
        let date = generated_on.format("%-m/%-d/%Y").to_string();
        for (i, page) in self.done.iter_mut().enumerate() {
            let footer = format!("Generated on {} | Page {} of {}", date, i + 1, total);
            let x = MARGIN + (CONTENT_WIDTH - text_width(&footer, 8.0, FontStyle::Regular)) / 2.0;
            page.elements.push(Element::Text {
                x,
                y: FOOTER_Y,
                size: 8.0,
                style: FontStyle::Regular,
                color: FOOTER_COLOR.to_string(),
                text: footer,
            });
        }
        self.done
    }
}

fn summary_blocks(cv: &CvProfile) -> Vec<Block> {
    if cv.summary.trim().is_empty() {
        return Vec::new();
    }
    vec![text_rows(cv.summary.trim(), 11.0, FontStyle::Regular, TEXT_COLOR, 0.0)]
}

fn experience_blocks(cv: &CvProfile) -> Vec<Block> {
    cv.work_experience
        .iter()
        .map(|exp| {
            let mut block = lead_rows(exp.title.trim(), &at(&exp.company), 13.0);
            block.extend(optional_rows(&exp.location, 11.0, FontStyle::Regular, MUTED_COLOR));
            let range = date_range(exp.start_date.as_deref(), exp.end_date.as_deref(), exp.current);
            block.extend(optional_rows(&range, 11.0, FontStyle::Oblique, MUTED_COLOR));
            block.push(gap(5.0));
            if !exp.description.trim().is_empty() {
                block.extend(optional_rows(&exp.description, 11.0, FontStyle::Regular, TEXT_COLOR));
                block.push(gap(5.0));
            }
            block.extend(bullet_rows("Key Achievements:", &exp.highlights));
            block.extend(listing_rows("Technologies:", &exp.technologies));
            block.push(gap(ENTRY_GAP));
            block
        })
        .collect()
}

fn education_blocks(cv: &CvProfile) -> Vec<Block> {
    cv.education
        .iter()
        .map(|edu| {
            let mut degree = edu.degree.trim().to_string();
            if !edu.field_of_study.trim().is_empty() {
                degree = format!("{} in {}", degree, edu.field_of_study.trim()).trim().to_string();
            }
            let mut block = if degree.is_empty() {
                lead_rows(edu.institution.trim(), "", 13.0)
            } else {
                lead_rows(&degree, &at(&edu.institution), 13.0)
            };
            let start = edu.start_year.map(|y| y.to_string()).unwrap_or_default();
            let end = if edu.current {
                "Present".to_string()
            } else {
                edu.end_year.map(|y| y.to_string()).unwrap_or_default()
            };
            if !start.is_empty() || !end.is_empty() {
                block.extend(text_rows(&format!("{} - {}", start, end), 11.0, FontStyle::Oblique, MUTED_COLOR, 0.0));
            }
            if !edu.description.trim().is_empty() {
                block.push(gap(5.0));
                block.extend(optional_rows(&edu.description, 11.0, FontStyle::Regular, TEXT_COLOR));
            }
            if !edu.achievements.is_empty() {
                block.push(gap(5.0));
                block.extend(bullet_rows("Achievements:", &edu.achievements));
            }
            block.push(gap(ENTRY_GAP));
            block
        })
        .collect()
}

fn skill_blocks(cv: &CvProfile, primary: &str) -> Vec<Block> {
    let column = CONTENT_WIDTH / 2.0;
    cv.skills
        .chunks(2)
        .map(|pair| {
            let mut elements = Vec::new();
            for (j, skill) in pair.iter().enumerate() {
                let x = MARGIN + j as f32 * column;
                let years = match skill.years_of_experience {
                    Some(1) => " (1 year)".to_string(),
                    Some(n) => format!(" ({} years)", n),
                    None => String::new(),
                };
                let bar = column - 10.0;
                elements.push(text(x, 11.0, FontStyle::Bold, TEXT_COLOR, skill.name.clone()));
                elements.push(
                    text(x, 10.0, FontStyle::Regular, MUTED_COLOR, format!("{}{}", skill.level.as_str(), years)).shifted(15.0),
                );
                elements.push(Element::Bar { x, y: 30.0, width: bar, height: 10.0, color: BAR_BACKGROUND.to_string() });
                elements.push(Element::Bar {
                    x,
                    y: 30.0,
                    width: bar * skill.level.fill(),
                    height: 10.0,
                    color: primary.to_string(),
                });
            }
            vec![Row { height: SKILL_ROW_HEIGHT, elements }]
        })
        .collect()
}

fn language_blocks(cv: &CvProfile) -> Vec<Block> {
    let column = CONTENT_WIDTH / 2.0;
    cv.languages
        .chunks(2)
        .map(|pair| {
            let mut elements = Vec::new();
            for (j, lang) in pair.iter().enumerate() {
                let x = MARGIN + j as f32 * column;
                let name_width = text_width(&lang.name, 11.0, FontStyle::Bold);
                elements.push(text(x, 11.0, FontStyle::Bold, TEXT_COLOR, lang.name.clone()));
                elements.push(text(
                    x + name_width,
                    11.0,
                    FontStyle::Regular,
                    MUTED_COLOR,
                    format!(" - {}", lang.proficiency.as_str()),
                ));
            }
            vec![Row { height: LANGUAGE_ROW_HEIGHT, elements }]
        })
        .collect()
}

fn project_blocks(cv: &CvProfile, primary: &str) -> Vec<Block> {
    cv.projects
        .iter()
        .map(|project| {
            let mut block = lead_rows(project.title.trim(), "", 13.0);
            if project.start_date.is_some() || project.end_date.is_some() {
                let range = date_range(project.start_date.as_deref(), project.end_date.as_deref(), project.current);
                block.extend(optional_rows(&range, 11.0, FontStyle::Oblique, MUTED_COLOR));
            }
            if !project.url.is_empty() || !project.repository_url.is_empty() {
                block.push(gap(5.0));
                if !project.url.is_empty() {
                    block.extend(text_rows(&format!("Live Demo: {}", project.url), 10.0, FontStyle::Regular, primary, 0.0));
                }
                if !project.repository_url.is_empty() {
                    block.extend(text_rows(
                        &format!("Repository: {}", project.repository_url),
                        10.0,
                        FontStyle::Regular,
                        primary,
                        0.0,
                    ));
                }
            }
            if !project.description.trim().is_empty() {
                block.push(gap(5.0));
                block.extend(optional_rows(&project.description, 11.0, FontStyle::Regular, TEXT_COLOR));
            }
            block.extend(listing_rows("Technologies:", &project.technologies));
            block.extend(bullet_rows("Key Features:", &project.highlights));
            block.push(gap(ENTRY_GAP));
            block
        })
        .collect()
}

fn certification_blocks(cv: &CvProfile, primary: &str) -> Vec<Block> {
    cv.certifications
        .iter()
        .map(|cert| {
            let issuer = if cert.issuer.trim().is_empty() { String::new() } else { format!(" - {}", cert.issuer.trim()) };
            let mut block = lead_rows(cert.name.trim(), &issuer, 13.0);
            let issued = cert.date.as_deref().map(|d| format!("Issued {}", month_year(d))).unwrap_or_default();
            let expires = match (cert.has_expiry, cert.expires.as_deref()) {
                (true, Some(d)) => format!("Expires {}", month_year(d)),
                _ => String::new(),
            };
            block.extend(optional_rows(&joined(&[issued, expires]), 11.0, FontStyle::Oblique, MUTED_COLOR));
            if !cert.credential_id.trim().is_empty() {
                block.extend(text_rows(
                    &format!("Credential ID: {}", cert.credential_id.trim()),
                    10.0,
                    FontStyle::Regular,
                    MUTED_COLOR,
                    0.0,
                ));
            }
            block.extend(optional_rows(&cert.credential_url, 10.0, FontStyle::Regular, primary));
            block.push(gap(ENTRY_GAP));
            block
        })
        .collect()
}

fn publication_blocks(cv: &CvProfile, primary: &str) -> Vec<Block> {
    cv.publications
        .iter()
        .map(|publication| {
            let mut block = lead_rows(publication.title.trim(), "", 13.0);
            let date = publication.date.as_deref().map(month_year).unwrap_or_default();
            block.extend(optional_rows(
                &joined(&[publication.publisher.trim().to_string(), date]),
                11.0,
                FontStyle::Oblique,
                MUTED_COLOR,
            ));
            block.extend(optional_rows(&publication.url, 10.0, FontStyle::Regular, primary));
            if !publication.description.trim().is_empty() {
                block.push(gap(5.0));
                block.extend(optional_rows(&publication.description, 11.0, FontStyle::Regular, TEXT_COLOR));
            }
            block.push(gap(ENTRY_GAP));
            block
        })
        .collect()
}

fn custom_sections(cv: &CvProfile, primary: &str) -> Vec<(String, Vec<Block>)> {
    cv.custom_sections
        .iter()
        .map(|section| {
            let heading = match section.title.trim() {
                "" => CvSection::CustomSections.heading().to_string(),
                title => title.to_string(),
            };
            let blocks = section
                .items
                .iter()
                .map(|item| {
                    let mut block = lead_rows(item.title.trim(), "", 12.0);
                    block.extend(optional_rows(&item.subtitle, 11.0, FontStyle::Regular, MUTED_COLOR));
                    let date = item.date.as_deref().map(month_year).unwrap_or_default();
                    block.extend(optional_rows(&date, 11.0, FontStyle::Oblique, MUTED_COLOR));
                    block.extend(optional_rows(&item.description, 11.0, FontStyle::Regular, TEXT_COLOR));
                    block.extend(optional_rows(&item.url, 10.0, FontStyle::Regular, primary));
                    block.push(gap(ENTRY_GAP));
                    block
                })
                .collect();
            (heading, blocks)
        })
        .collect()
}

fn sections(cv: &CvProfile, section: CvSection, primary: &str) -> Vec<(String, Vec<Block>)> {
    let blocks = match section {
        CvSection::Summary => summary_blocks(cv),
        CvSection::WorkExperience => experience_blocks(cv),
        CvSection::Education => education_blocks(cv),
        CvSection::Skills => skill_blocks(cv, primary),
        CvSection::Projects => project_blocks(cv, primary),
        CvSection::Certifications => certification_blocks(cv, primary),
        CvSection::Languages => language_blocks(cv),
        CvSection::Publications => publication_blocks(cv, primary),
        CvSection::CustomSections => return custom_sections(cv, primary),
    };
    vec![(section.heading().to_string(), blocks)]
}

/// Lays a CV out on as many A4 pages as the content needs.
pub fn layout_cv(cv: &CvProfile, generated_on: NaiveDate) -> Document {
    let primary = match cv.theme.primary_color.trim() {
        "" => "#4e54c8".to_string(),
        color => color.to_string(),
    };
    let name = match cv.full_name.trim() {
        "" => "Curriculum Vitae".to_string(),
        name => name.to_string(),
    };
    let mut composer = Composer::new(primary.clone());

    composer.place_block(centered_rows(&name, 28.0, FontStyle::Bold, &primary));
    if !cv.headline.trim().is_empty() {
        composer.place_block(centered_rows(cv.headline.trim(), 16.0, FontStyle::Regular, HEADLINE_COLOR));
    }
    composer.place_row(gap(12.0));
    if cv.display_options.show_contact {
        let contact = &cv.contact;
        let line = joined(&[
            contact.email.trim().to_string(),
            contact.phone.trim().to_string(),
            contact.location.trim().to_string(),
            contact.website.trim().to_string(),
        ]);
        if !line.is_empty() {
            composer.place_block(centered_rows(&line, 11.0, FontStyle::Regular, TEXT_COLOR));
            composer.place_row(gap(18.0));
        }
    }

    for section in cv.visible_sections() {
        for (heading, blocks) in sections(cv, section, &primary) {
            composer.section(&heading, blocks);
        }
    }

    Document { title: format!("CV - {}", name), author: name, pages: composer.finish(generated_on) }
}
