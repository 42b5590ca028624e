use crate::error::Result;
use crate::types::{MemberTerm, Year};
use askama::Template;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

// Layout, in pixels from the top-left corner
pub const CARD_WIDTH: u32 = 1080;
pub const CARD_HEIGHT: u32 = 1920;
const NAME_Y: u32 = 80;
const HEADER_Y: u32 = 170;
const PIC_POS: (u32, u32) = (75, 250);
const PIC_SIZE: (u32, u32) = (580, 670);
const BODY_POS: (u32, u32) = (690, 250);

const NAME_SIZE: u32 = 70;
const LABEL_SIZE: u32 = 40;
/// Characters per body line; roughly 300px at the label size.
const WRAP_COLUMNS: usize = 15;
const LINE_HEIGHT: u32 = LABEL_SIZE * 6 / 5;
const PARAGRAPH_GAP: u32 = 10;

/// The words printed on a card, before layout.
#[derive(Debug, Clone, PartialEq)]
pub struct CardText {
    pub name: String,
    pub header: String,
    /// One entry per paragraph; each is wrapped separately.
    pub paragraphs: Vec<String>,
}

impl CardText {
    pub fn for_member(member: &MemberTerm, current_year: Year) -> Self {
        let party = &member.party_name;
        let tenure = format!(
            "{}/{}",
            fmt_opt(member.tenure_current_party),
            fmt_opt(member.party_current_count)
        );
        let tenure_line = format!("{tenure} most tenured {party}");

        let mut paragraphs = vec![member.chamber.clone()];
        match member.end_year {
            Some(end) if end - 1 > current_year => {
                paragraphs.push(format!("{} - Present", member.start_year));
                paragraphs.push(tenure_line);
                paragraphs.push(format!("Up for re-election in {}", end - 1));
            }
            Some(end) if end - 1 < current_year => {
                paragraphs.push(format!("{} - {}", member.start_year, end));
                paragraphs.push(tenure_line);
            }
            _ => {
                paragraphs.push(format!("{} - Present", member.start_year));
                paragraphs.push(tenure_line);
                paragraphs.push("Up for re-election this year".to_string());
            }
        }

        Self {
            name: member.name.clone(),
            header: format!("{} from {}", party, member.state),
            paragraphs,
        }
    }
}

fn fmt_opt(value: Option<u32>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| v.to_string())
}

/// Greedy word wrap at `columns` characters. A word longer than the limit
/// gets a line to itself.
pub fn wrap_words(text: &str, columns: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split(' ') {
        if !line.is_empty() && line.chars().count() + 1 + word.chars().count() > columns {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// `"Jr. Angus S. King"` -> `"jr_angus_s_king_card.svg"`
pub fn card_file_name(name: &str) -> String {
    let slug: String = name
        .chars()
        .filter(|c| !matches!(c, ',' | '"' | '.'))
        .map(|c| if c == ' ' { '_' } else { c })
        .collect();
    format!("{}_card.svg", slug.to_lowercase())
}

pub struct CardLine {
    pub x: u32,
    pub y: u32,
    pub text: String,
}

#[derive(Template)]
#[template(path = "card.svg", escape = "html")]
struct CardTemplate<'a> {
    width: u32,
    height: u32,
    center_x: u32,
    name_y: u32,
    header_y: u32,
    name_size: u32,
    label_size: u32,
    name: &'a str,
    header: &'a str,
    portrait: Option<&'a str>,
    pic_x: u32,
    pic_y: u32,
    pic_width: u32,
    pic_height: u32,
    lines: Vec<CardLine>,
}

fn layout_body(paragraphs: &[String]) -> Vec<CardLine> {
    let (x, mut y) = BODY_POS;
    let mut lines = Vec::new();
    for (i, paragraph) in paragraphs.iter().enumerate() {
        if i > 0 {
            y += PARAGRAPH_GAP;
        }
        for text in wrap_words(paragraph, WRAP_COLUMNS) {
            lines.push(CardLine { x, y, text });
            y += LINE_HEIGHT;
        }
    }
    lines
}

/// Portrait URL usable on the card, or a note on why there isn't one.
fn portrait_for(member: &MemberTerm) -> std::result::Result<&str, String> {
    match member.image_url.as_deref() {
        None | Some("") => Err(format!("{}: face image not found", member.name)),
        Some(url) if url.starts_with("http") => Ok(url),
        Some(url) => Err(format!("{}: unrecognized face image format '{}'", member.name, url)),
    }
}

/// A rendered card plus any problem found while building it.
pub struct RenderedCard {
    pub file_name: String,
    pub svg: String,
    pub warning: Option<String>,
}

pub fn render_card(member: &MemberTerm, current_year: Year) -> Result<RenderedCard> {
    let text = CardText::for_member(member, current_year);
    let (portrait, warning) = match portrait_for(member) {
        Ok(url) => (Some(url), None),
        Err(note) => (None, Some(note)),
    };

    let template = CardTemplate {
        width: CARD_WIDTH,
        height: CARD_HEIGHT,
        center_x: CARD_WIDTH / 2,
        name_y: NAME_Y,
        header_y: HEADER_Y,
        name_size: NAME_SIZE,
        label_size: LABEL_SIZE,
        name: &text.name,
        header: &text.header,
        portrait,
        pic_x: PIC_POS.0,
        pic_y: PIC_POS.1,
        pic_width: PIC_SIZE.0,
        pic_height: PIC_SIZE.1,
        lines: layout_body(&text.paragraphs),
    };

    Ok(RenderedCard {
        file_name: card_file_name(&member.name),
        svg: template.render()?,
        warning,
    })
}

/// Cards written by one run and the problems logged along the way.
#[derive(Debug, Default)]
pub struct CardReport {
    pub written: Vec<PathBuf>,
    pub errors: Vec<String>,
}

/// Renders one card per member into `out_dir`. With `test_card` only the first
/// member is rendered.
#[instrument(skip(members))]
pub fn generate_cards(
    members: &[MemberTerm],
    out_dir: &Path,
    current_year: Year,
    test_card: bool,
) -> Result<CardReport> {
    fs::create_dir_all(out_dir)?;
    let mut report = CardReport::default();

    let selected = if test_card { &members[..members.len().min(1)] } else { members };
    if test_card {
        info!("Test mode: rendering a single card");
    }

    for member in selected {
        let card = render_card(member, current_year)?;
        if let Some(warning) = card.warning {
            warn!("{}", warning);
            report.errors.push(warning);
        }
        let path = out_dir.join(&card.file_name);
        fs::write(&path, card.svg)?;
        info!("Created card: {}", path.display());
        report.written.push(path);
    }

    info!(
        "Card generation complete: {} cards, {} issues",
        report.written.len(),
        report.errors.len()
    );
    Ok(report)
}
