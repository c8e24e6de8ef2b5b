/// BDF (Nastran bulk data) field codec for GRID cards
///
/// Only GRID cards are decoded. Every other card is treated as opaque text by
/// the model and written back unchanged.
use std::borrow::Cow;

use nalgebra::Point3;
use nom::{
    branch::alt,
    character::complete::{char, digit0, digit1, one_of},
    combinator::{all_consuming, map_res, opt, recognize},
    sequence::{pair, preceded, tuple},
    IResult,
};

use crate::error::{Error, Result};

/// Small-field cards use 8-column fields.
pub const SMALL_FIELD: usize = 8;
/// Large-field cards (`NAME*`) use 16-column data fields.
pub const LARGE_FIELD: usize = 16;
/// Data columns end here; columns 73-80 hold the continuation marker.
const DATA_END: usize = 72;
/// Free-field lines carry at most this many data fields before the marker.
const FREE_DATA_FIELDS: usize = 8;

/// Field layout a card was written in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldFormat {
    Small,
    Large,
    Free,
}

/// A GRID card: `GRID ID CP X1 X2 X3 CD PS SEID`
#[derive(Debug, Clone, PartialEq)]
pub struct GridCard {
    pub id: u32,
    /// Coordinate system the location is expressed in (0 = basic).
    pub cp: u32,
    pub xyz: Point3<f64>,
    /// Coordinate system for displacements (0 = basic).
    pub cd: u32,
    /// Permanent single-point constraints, kept as written.
    pub ps: String,
    pub seid: u32,
    pub format: FieldFormat,
    /// Columns 73-80 of the first line and of the `*` line of a large-field card.
    markers: [String; 2],
    /// Continuation lines that carry no GRID data, written back verbatim.
    trailing: Vec<String>,
}

/// One logical card: its first line plus any continuation lines.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Card {
    /// Upper-cased card name, including a trailing `*` for large field.
    pub name: String,
    pub format: FieldFormat,
    /// Data fields of every line, in order.
    pub fields: Vec<String>,
    /// Continuation marker (columns 73-80) of each fixed-column line.
    pub markers: Vec<String>,
    /// Number of physical lines the card spans.
    pub span: usize,
}

impl Card {
    /// Card name without the large-field marker.
    pub fn base_name(&self) -> &str {
        self.name.trim_end_matches('*')
    }

    pub fn is_large(&self) -> bool {
        self.name.ends_with('*')
    }
}

/// Read the card starting at `lines[0]`, merging its continuation lines.
///
/// Returns `None` when `lines[0]` is a comment, a blank line, a continuation
/// line or not plain ASCII.
pub(crate) fn read_card(lines: &[&str]) -> Option<Card> {
    let first = card_data(lines.first()?)?;
    if first.trim().is_empty() || is_continuation(&first) {
        return None;
    }

    let mut card = if first.contains(',') {
        let mut parts = first.split(',');
        let name = parts.next()?.trim().to_ascii_uppercase();
        Card {
            name,
            format: FieldFormat::Free,
            fields: Vec::new(),
            markers: Vec::new(),
            span: 1,
        }
    } else {
        let name = column(&first, 0, SMALL_FIELD).to_ascii_uppercase();
        if name.is_empty() {
            return None;
        }
        let format = if name.ends_with('*') {
            FieldFormat::Large
        } else {
            FieldFormat::Small
        };
        Card {
            name,
            format,
            fields: Vec::new(),
            markers: Vec::new(),
            span: 1,
        }
    };

    let continued = |index: usize| {
        lines
            .get(index)
            .and_then(|line| card_data(line))
            .map_or(false, |data| is_continuation(&data))
    };

    let width = if card.is_large() {
        LARGE_FIELD
    } else {
        SMALL_FIELD
    };
    append_line(&mut card, &first, width, continued(1));
    while continued(card.span) {
        let data = card_data(lines[card.span]).unwrap_or_default();
        card.span += 1;
        let more = continued(card.span);
        append_line(&mut card, &data, width, more);
    }
    Some(card)
}

/// Add the data fields of one physical line to `card`.
fn append_line(card: &mut Card, data: &str, width: usize, more: bool) {
    if data.contains(',') {
        let mut parts: Vec<&str> = data.split(',').skip(1).map(str::trim).collect();
        // A trailing comma before a continuation line only ends the line.
        if more && parts.last() == Some(&"") {
            parts.pop();
        }
        parts.truncate(FREE_DATA_FIELDS);
        card.fields.extend(parts.into_iter().map(String::from));
    } else {
        card.fields.extend(
            (SMALL_FIELD..DATA_END)
                .step_by(width)
                .map(|start| column(data, start, width).to_string()),
        );
        card.markers.push(column(data, DATA_END, SMALL_FIELD).to_string());
    }
}

/// Data part of a line: comment stripped and tabs expanded to 8-column stops.
fn card_data(line: &str) -> Option<Cow<'_, str>> {
    let data = match line.find('$') {
        Some(pos) => &line[..pos],
        None => line,
    };
    if !data.is_ascii() {
        return None;
    }
    if !data.contains('\t') || data.contains(',') {
        return Some(Cow::Borrowed(data));
    }

    let mut expanded = String::with_capacity(data.len() + 16);
    for ch in data.chars() {
        if ch == '\t' {
            let pad = SMALL_FIELD - expanded.len() % SMALL_FIELD;
            expanded.extend(std::iter::repeat(' ').take(pad));
        } else {
            expanded.push(ch);
        }
    }
    Some(Cow::Owned(expanded))
}

/// Continuation lines start with `+`, `*`, `,` or a blank name field.
fn is_continuation(data: &str) -> bool {
    data.starts_with('+')
        || data.starts_with('*')
        || data.starts_with(',')
        || (data.starts_with("        ") && !data.trim().is_empty())
}

/// Trimmed text of columns `start..start + width`, clipped to the line.
fn column(line: &str, start: usize, width: usize) -> &str {
    if start >= line.len() {
        return "";
    }
    let end = (start + width).min(line.len());
    line[start..end].trim()
}

impl GridCard {
    pub fn new(id: u32, xyz: Point3<f64>) -> Self {
        Self {
            id,
            cp: 0,
            xyz,
            cd: 0,
            ps: String::new(),
            seid: 0,
            format: FieldFormat::Small,
            markers: Default::default(),
            trailing: Vec::new(),
        }
    }

    /// Decode a GRID card read from `lines[..card.span]`.
    ///
    /// `line_no` is the 1-based number of `lines[0]`, used in error messages.
    pub(crate) fn parse(card: &Card, lines: &[&str], line_no: usize) -> Result<Self> {
        if card.is_large() && card.span < 2 {
            return Err(Error::parse(
                line_no,
                "GRID* is missing its continuation line",
            ));
        }

        let field = |index: usize| card.fields.get(index).map(String::as_str).unwrap_or("");

        let id_text = field(0);
        let id = match parse_int(id_text) {
            Some(id) if id > 0 => id,
            _ => {
                return Err(Error::parse(
                    line_no,
                    format!("invalid GRID id `{}`", id_text),
                ))
            }
        };

        let int_or_zero = |index: usize, label: &str| -> Result<u32> {
            let text = field(index);
            if text.is_empty() {
                return Ok(0);
            }
            parse_int(text).ok_or_else(|| {
                Error::parse(line_no, format!("GRID {}: invalid {} `{}`", id, label, text))
            })
        };
        let real_or_zero = |index: usize, label: &str| -> Result<f64> {
            let text = field(index);
            if text.is_empty() {
                return Ok(0.0);
            }
            parse_real(text).ok_or_else(|| {
                Error::parse(line_no, format!("GRID {}: invalid {} `{}`", id, label, text))
            })
        };

        // Lines past the ones holding ID..SEID carry no GRID data.
        let (markers, data_lines) = match card.format {
            FieldFormat::Free => (Default::default(), card.span),
            FieldFormat::Small => ([marker(card, 0), String::new()], 1),
            FieldFormat::Large => ([marker(card, 0), marker(card, 1)], 2),
        };
        let trailing = lines
            .iter()
            .take(card.span)
            .skip(data_lines)
            .map(|line| line.to_string())
            .collect();

        let grid = Self {
            id,
            cp: int_or_zero(1, "CP")?,
            xyz: Point3::new(
                real_or_zero(2, "X1")?,
                real_or_zero(3, "X2")?,
                real_or_zero(4, "X3")?,
            ),
            cd: int_or_zero(5, "CD")?,
            ps: field(6).to_string(),
            seid: int_or_zero(7, "SEID")?,
            format: card.format,
            markers,
            trailing,
        };
        log::trace!("line {}: GRID {} at {:?}", line_no, grid.id, grid.xyz);

        Ok(grid)
    }

    /// Render the card in its original field width.
    ///
    /// Free-field cards are written back in small field. A card whose id or
    /// references do not fit 8 columns is promoted to large field.
    pub fn to_lines(&self) -> Result<Vec<String>> {
        if !(self.xyz.x.is_finite() && self.xyz.y.is_finite() && self.xyz.z.is_finite()) {
            return Err(Error::NonFiniteCoordinate { id: self.id });
        }

        let blank_zero = |value: u32| {
            if value == 0 {
                String::new()
            } else {
                value.to_string()
            }
        };
        let id = self.id.to_string();
        let cp = blank_zero(self.cp);
        let cd = blank_zero(self.cd);
        let seid = blank_zero(self.seid);

        let fits_small = [&id, &cp, &cd, &seid, &self.ps]
            .iter()
            .all(|text| text.len() <= SMALL_FIELD);

        let mut lines = if self.format == FieldFormat::Large || !fits_small {
            let w = LARGE_FIELD;
            // The `*` line is named after the first line's marker when it has one.
            let lead = if self.markers[0].starts_with('*') {
                self.markers[0].as_str()
            } else {
                "*"
            };
            let first = format!(
                "{:<8}{:>w$}{:>w$}{:>w$}{:>w$}",
                "GRID*",
                id,
                cp,
                format_real(self.xyz.x, w),
                format_real(self.xyz.y, w),
            );
            let second = format!(
                "{:<8}{:>w$}{:>w$}{:>w$}{:>w$}",
                lead,
                format_real(self.xyz.z, w),
                cd,
                self.ps,
                seid,
            );
            vec![
                with_marker(first, &self.markers[0]),
                with_marker(second, &self.markers[1]),
            ]
        } else {
            let w = SMALL_FIELD;
            let line = format!(
                "{:<8}{:>w$}{:>w$}{:>w$}{:>w$}{:>w$}{:>w$}{:>w$}{:>w$}",
                "GRID",
                id,
                cp,
                format_real(self.xyz.x, w),
                format_real(self.xyz.y, w),
                format_real(self.xyz.z, w),
                cd,
                self.ps,
                seid,
            );
            vec![with_marker(line, &self.markers[0])]
        };
        lines.extend(self.trailing.iter().cloned());
        Ok(lines)
    }
}

fn marker(card: &Card, line: usize) -> String {
    card.markers.get(line).cloned().unwrap_or_default()
}

/// Trim `line` and, if `marker` is set, place it in columns 73-80.
fn with_marker(line: String, marker: &str) -> String {
    let line = line.trim_end();
    if marker.is_empty() {
        line.to_string()
    } else {
        format!("{:<72}{}", line, marker)
    }
}

/// Parse a Nastran integer field.
pub fn parse_int(text: &str) -> Option<u32> {
    let parsed: IResult<&str, u32> =
        all_consuming(map_res(preceded(opt(char('+')), digit1), str::parse::<u32>))(text.trim());
    parsed.ok().map(|(_, value)| value)
}

/// Parse a Nastran real field.
///
/// Accepts the usual forms (`1.5`, `1.`, `.5`, `-2`, `1.5E-3`, `1.5D-3`) as
/// well as the implicit exponent form `1.5-3` / `1.5+3`.
pub fn parse_real(text: &str) -> Option<f64> {
    let (_, (sign, mantissa, exponent)) = all_consuming(real_parts)(text.trim()).ok()?;
    let mut normalized = String::with_capacity(text.len() + 2);
    if let Some(sign) = sign {
        normalized.push(sign);
    }
    normalized.push_str(mantissa);
    if let Some(exponent) = exponent {
        normalized.push('e');
        normalized.push_str(exponent);
    }
    normalized.parse().ok()
}

fn real_parts(input: &str) -> IResult<&str, (Option<char>, &str, Option<&str>)> {
    let (input, sign) = opt(one_of("+-"))(input)?;
    let (input, mantissa) = alt((
        recognize(pair(digit1, opt(pair(char('.'), digit0)))),
        recognize(pair(char('.'), digit1)),
    ))(input)?;
    let (input, exponent) = opt(alt((
        preceded(one_of("eEdD"), recognize(pair(opt(one_of("+-")), digit1))),
        recognize(tuple((one_of("+-"), digit1))),
    )))(input)?;
    Ok((input, (sign, mantissa, exponent)))
}

/// Format `value` into at most `width` columns with as much precision as fits.
///
/// Uses the short Nastran forms: leading zeros are dropped (`.5`) and
/// exponents are written without the `E` (`1.25-7`).
pub fn format_real(value: f64, width: usize) -> String {
    if value == 0.0 {
        return "0.".to_string();
    }

    let mut best: Option<(f64, String)> = None;
    let mut consider = |text: String| -> bool {
        if text.len() > width {
            return false;
        }
        let error = parse_real(&text).map_or(f64::INFINITY, |parsed| (parsed - value).abs());
        if best.as_ref().map_or(true, |(best_error, _)| error < *best_error) {
            best = Some((error, text));
        }
        true
    };

    for precision in (0..width).rev() {
        if consider(fixed_repr(value, precision)) {
            break;
        }
    }
    for precision in (0..width).rev() {
        if consider(exponent_repr(value, precision)) {
            break;
        }
    }

    match best {
        Some((_, text)) => text,
        None => exponent_repr(value, 0),
    }
}

fn fixed_repr(value: f64, precision: usize) -> String {
    let mut text = format!("{:.*}", precision, value);
    if precision == 0 {
        text.push('.');
    } else {
        while text.ends_with('0') {
            text.pop();
        }
    }

    if let Some(rest) = text.strip_prefix("0.") {
        if !rest.is_empty() {
            return format!(".{}", rest);
        }
    } else if let Some(rest) = text.strip_prefix("-0.") {
        if !rest.is_empty() {
            return format!("-.{}", rest);
        }
    }
    text
}

fn exponent_repr(value: f64, precision: usize) -> String {
    let text = format!("{:.*e}", precision, value);
    let Some((mantissa, exponent)) = text.split_once('e') else {
        return text;
    };

    let mut mantissa = mantissa.to_string();
    if mantissa.contains('.') {
        while mantissa.ends_with('0') {
            mantissa.pop();
        }
    } else {
        mantissa.push('.');
    }

    let exponent: i32 = exponent.parse().unwrap_or(0);
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{}{}{}", mantissa, sign, exponent.abs())
}
