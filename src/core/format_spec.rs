//! Format specifiers for `{name:spec}` placeholders
//!
//! Standard specs follow the familiar mini-language
//! `[[fill]align][sign][#][0][width][grouping][.precision][type]`.
//! A spec that is not a standard spec but is a valid strftime pattern
//! (e.g. `%Y-%m-%d`) is kept as a date pattern and only applies to
//! date-time values.

use crate::error::{Xls2JsonError, Xls2JsonResult};
use crate::types::{number_as_integer, CellValue};
use chrono::format::{Item, StrftimeItems};
use regex::Regex;
use std::fmt::Write;
use std::sync::OnceLock;

/// Upper bound for width and precision
const MAX_WIDTH: usize = u16::MAX as usize;

fn spec_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?s)^(?:(?P<fill>.)?(?P<align>[<>=^]))?(?P<sign>[+\- ])?(?P<alt>#)?(?P<zero>0)?(?P<width>\d+)?(?P<grouping>[,_])?(?:\.(?P<precision>\d+))?(?P<kind>[bdeEfFgGnosxX%])?$",
        )
        .expect("format spec pattern is valid")
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
    Center,
    /// Padding goes between the sign and the digits
    AfterSign,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Sign {
    #[default]
    Negative,
    Always,
    Space,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct StandardSpec {
    fill: char,
    align: Option<Align>,
    sign: Sign,
    alternate: bool,
    zero: bool,
    width: Option<usize>,
    grouping: Option<char>,
    precision: Option<usize>,
    kind: Option<char>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SpecKind {
    Standard(StandardSpec),
    DatePattern,
}

/// A parsed format specifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSpec {
    raw: String,
    kind: SpecKind,
}

impl FormatSpec {
    pub fn parse(raw: &str) -> Xls2JsonResult<Self> {
        if let Some(caps) = spec_pattern().captures(raw) {
            let number = |name: &str| -> Xls2JsonResult<Option<usize>> {
                caps.name(name)
                    .map(|m| match m.as_str().parse::<usize>() {
                        Ok(n) if n <= MAX_WIDTH => Ok(n),
                        _ => Err(Xls2JsonError::format_spec(
                            raw,
                            format!("{name} exceeds {MAX_WIDTH}"),
                        )),
                    })
                    .transpose()
            };

            let align = caps.name("align").map(|m| match m.as_str() {
                "<" => Align::Left,
                ">" => Align::Right,
                "^" => Align::Center,
                _ => Align::AfterSign,
            });
            let sign = match caps.name("sign").map(|m| m.as_str()) {
                Some("+") => Sign::Always,
                Some(" ") => Sign::Space,
                _ => Sign::Negative,
            };

            let spec = StandardSpec {
                fill: caps
                    .name("fill")
                    .and_then(|m| m.as_str().chars().next())
                    .unwrap_or(' '),
                align,
                sign,
                alternate: caps.name("alt").is_some(),
                zero: caps.name("zero").is_some(),
                width: number("width")?,
                grouping: caps.name("grouping").and_then(|m| m.as_str().chars().next()),
                precision: number("precision")?,
                kind: caps.name("kind").and_then(|m| m.as_str().chars().next()),
            };
            return Ok(Self {
                raw: raw.to_string(),
                kind: SpecKind::Standard(spec),
            });
        }

        if raw.contains('%') && is_valid_date_pattern(raw) {
            return Ok(Self {
                raw: raw.to_string(),
                kind: SpecKind::DatePattern,
            });
        }

        Err(Xls2JsonError::format_spec(
            raw,
            "not a standard format spec or date pattern",
        ))
    }

    /// Render a cell value according to this spec
    pub fn apply(&self, value: &CellValue) -> Xls2JsonResult<String> {
        match (&self.kind, value) {
            (SpecKind::DatePattern, CellValue::DateTime(dt)) => {
                let mut out = String::new();
                write!(out, "{}", dt.format_with_items(StrftimeItems::new(&self.raw)))
                    .map_err(|_| Xls2JsonError::format_spec(&self.raw, "invalid date pattern"))?;
                Ok(out)
            }
            (SpecKind::DatePattern, other) => Err(Xls2JsonError::format_spec(
                &self.raw,
                format!("date pattern applied to a {} value", other.type_name()),
            )),
            (SpecKind::Standard(spec), value) => self.apply_standard(spec, value),
        }
    }

    fn apply_standard(&self, spec: &StandardSpec, value: &CellValue) -> Xls2JsonResult<String> {
        let numeric_kind = spec.kind.is_some_and(|k| k != 's');
        match value {
            CellValue::Number(n) => self.format_number(spec, *n),
            CellValue::Bool(b) if numeric_kind => self.format_number(spec, f64::from(u8::from(*b))),
            other => self.format_text(spec, &other.to_string(), other.type_name()),
        }
    }

    fn format_text(&self, spec: &StandardSpec, text: &str, type_name: &str) -> Xls2JsonResult<String> {
        if let Some(kind) = spec.kind.filter(|k| *k != 's') {
            return Err(Xls2JsonError::format_spec(
                &self.raw,
                format!("format code '{kind}' not allowed for a {type_name} value"),
            ));
        }
        if spec.sign != Sign::Negative || spec.grouping.is_some() || spec.alternate {
            return Err(Xls2JsonError::format_spec(
                &self.raw,
                format!("sign, grouping and '#' are only allowed for numbers, got a {type_name} value"),
            ));
        }
        if spec.align == Some(Align::AfterSign) {
            return Err(Xls2JsonError::format_spec(
                &self.raw,
                "'=' alignment is only allowed for numbers",
            ));
        }

        let body: String = match spec.precision {
            Some(p) => text.chars().take(p).collect(),
            None => text.to_string(),
        };
        Ok(pad("", &body, spec.width, spec.fill, spec.align.unwrap_or(Align::Left)))
    }

    fn format_number(&self, spec: &StandardSpec, n: f64) -> Xls2JsonResult<String> {
        let negative = n.is_sign_negative() && n != 0.0 && !n.is_nan();
        let abs = n.abs();

        let integer = || {
            number_as_integer(abs).ok_or_else(|| {
                Xls2JsonError::format_spec(
                    &self.raw,
                    format!("format code '{}' requires an integral value, got {n}", spec.kind.unwrap_or('d')),
                )
            })
        };

        let mut prefix = "";
        let body = match spec.kind {
            Some('d') => group(&integer()?.to_string(), spec.grouping),
            Some('n') => match number_as_integer(abs) {
                Some(i) => group(&i.to_string(), spec.grouping),
                None => general(abs, spec.precision, spec.alternate),
            },
            Some('x') | Some('X') | Some('o') | Some('b') => {
                let i = integer()?;
                let (digits, alt_prefix) = match spec.kind {
                    Some('x') => (format!("{i:x}"), "0x"),
                    Some('X') => (format!("{i:X}"), "0X"),
                    Some('o') => (format!("{i:o}"), "0o"),
                    _ => (format!("{i:b}"), "0b"),
                };
                if spec.alternate {
                    prefix = alt_prefix;
                }
                digits
            }
            Some(kind @ ('f' | 'F')) => {
                let s = fixed(abs, spec.precision.unwrap_or(6), spec.grouping, spec.alternate);
                if kind == 'F' {
                    s.to_uppercase()
                } else {
                    s
                }
            }
            Some(kind @ ('e' | 'E')) => {
                let s = scientific(abs, spec.precision.unwrap_or(6), spec.alternate);
                if kind == 'E' {
                    s.to_uppercase()
                } else {
                    s
                }
            }
            Some(kind @ ('g' | 'G')) => {
                let s = general(abs, spec.precision, spec.alternate);
                if kind == 'G' {
                    s.to_uppercase()
                } else {
                    s
                }
            }
            Some('%') => {
                let s = fixed(abs * 100.0, spec.precision.unwrap_or(6), spec.grouping, spec.alternate);
                format!("{s}%")
            }
            Some(other) if other != 's' => {
                return Err(Xls2JsonError::format_spec(
                    &self.raw,
                    format!("unknown format code '{other}' for a number"),
                ))
            }
            _ => match (spec.precision, number_as_integer(abs)) {
                (None, Some(i)) => group(&i.to_string(), spec.grouping),
                (None, None) => CellValue::Number(abs).to_string(),
                (Some(_), _) => general(abs, spec.precision, spec.alternate),
            },
        };

        let sign = match (negative, spec.sign) {
            (true, _) => "-",
            (false, Sign::Always) => "+",
            (false, Sign::Space) => " ",
            (false, Sign::Negative) => "",
        };
        let sign = format!("{sign}{prefix}");

        let (fill, align) = match spec.align {
            Some(align) => (spec.fill, align),
            None if spec.zero => ('0', Align::AfterSign),
            None => (spec.fill, Align::Right),
        };
        Ok(pad(&sign, &body, spec.width, fill, align))
    }
}

fn is_valid_date_pattern(raw: &str) -> bool {
    !StrftimeItems::new(raw).any(|item| matches!(item, Item::Error))
}

/// Insert a separator every three digits of the integer part
fn group(digits: &str, separator: Option<char>) -> String {
    let Some(sep) = separator else {
        return digits.to_string();
    };
    let (int_part, rest) = match digits.find('.') {
        Some(pos) => digits.split_at(pos),
        None => (digits, ""),
    };
    if !int_part.chars().all(|c| c.is_ascii_digit()) {
        return digits.to_string();
    }

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(sep);
        }
        grouped.push(c);
    }
    grouped.push_str(rest);
    grouped
}

fn non_finite(n: f64) -> Option<String> {
    if n.is_nan() {
        Some("nan".to_string())
    } else if n.is_infinite() {
        Some("inf".to_string())
    } else {
        None
    }
}

fn fixed(n: f64, precision: usize, grouping: Option<char>, alternate: bool) -> String {
    if let Some(s) = non_finite(n) {
        return s;
    }
    let mut s = format!("{n:.precision$}");
    if alternate && precision == 0 {
        s.push('.');
    }
    group(&s, grouping)
}

fn scientific(n: f64, precision: usize, alternate: bool) -> String {
    if let Some(s) = non_finite(n) {
        return s;
    }
    let formatted = format!("{n:.precision$e}");
    let (mantissa, exponent) = formatted.split_once('e').unwrap_or((&formatted, "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let dot = if alternate && precision == 0 { "." } else { "" };
    let exp_sign = if exponent < 0 { '-' } else { '+' };
    format!("{mantissa}{dot}e{exp_sign}{:02}", exponent.abs())
}

/// `g` style: fixed or scientific depending on the exponent, trailing zeros
/// removed unless `alternate`
fn general(n: f64, precision: Option<usize>, alternate: bool) -> String {
    if let Some(s) = non_finite(n) {
        return s;
    }
    let p = precision.unwrap_or(6).max(1);
    let exponent = if n == 0.0 {
        0
    } else {
        let sci = format!("{n:.prec$e}", prec = p - 1);
        sci.split_once('e')
            .and_then(|(_, e)| e.parse::<i32>().ok())
            .unwrap_or(0)
    };

    let strip = |s: String| -> String {
        if alternate || !s.contains('.') {
            s
        } else {
            s.trim_end_matches('0').trim_end_matches('.').to_string()
        }
    };

    if exponent >= -4 && exponent < p as i32 {
        let decimals = (p as i32 - 1 - exponent).max(0) as usize;
        strip(format!("{n:.decimals$}"))
    } else {
        let sci = scientific(n, p - 1, alternate);
        match sci.split_once('e') {
            Some((mantissa, exp)) => format!("{}e{exp}", strip(mantissa.to_string())),
            None => sci,
        }
    }
}

fn pad(sign: &str, body: &str, width: Option<usize>, fill: char, align: Align) -> String {
    let len = sign.chars().count() + body.chars().count();
    let padding = width.unwrap_or(0).saturating_sub(len);
    let fill_str = |count: usize| -> String { std::iter::repeat(fill).take(count).collect() };

    match align {
        Align::Left => format!("{sign}{body}{}", fill_str(padding)),
        Align::Right => format!("{}{sign}{body}", fill_str(padding)),
        Align::Center => {
            let left = padding / 2;
            format!("{}{sign}{body}{}", fill_str(left), fill_str(padding - left))
        }
        Align::AfterSign => format!("{sign}{}{body}", fill_str(padding)),
    }
}
