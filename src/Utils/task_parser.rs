/// parse document with structure like " title1 key1: value1, value2 key2: value2 title2 key3:value3, value4" which has titles and
/// pairs key-vector of values into HashMap<String, HashMap<String, Vec<Value>>>.
/// Solvers read their settings from the section with their own title:
/// ```text
/// newton
/// tolerance: 1e-8
/// max_iterations: 50
/// linear
/// method: GaussSeidel
/// ```
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{alpha1, alphanumeric1, multispace0, space0},
    combinator::{map, recognize},
    multi::{many0, many1, separated_list1},
    sequence::{delimited, pair, separated_pair, terminated},
};
use std::collections::HashMap;
use std::fmt::Display;
use std::fs;
use std::path::Path;

pub type DocumentMap = HashMap<String, SectionMap>;
pub type SectionMap = HashMap<String, Vec<Value>>;
/// enum to represent different value types:
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Float(f64),
    Integer(i64),
    Boolean(bool),
}

impl Value {
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        if let Value::Integer(i) = self {
            Some(*i)
        } else {
            None
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        if let Value::Boolean(b) = self {
            Some(*b)
        } else {
            None
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::String(s) => write!(f, "{}", s),
            Value::Float(val) => write!(f, "{}", val),
            Value::Integer(val) => write!(f, "{}", val),
            Value::Boolean(val) => write!(f, "{}", val),
        }
    }
}

/// titles and keys: word characters without spaces
fn parse_identifier(input: &str) -> IResult<&str, String> {
    let parser = recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ));
    let mut parser = map(parser, String::from);
    parser.parse(input)
}

fn parse_value(input: &str) -> IResult<&str, Value> {
    // a single value - everything up to a comma, whitespace or newline
    let value_parser = take_while1(|c: char| !matches!(c, ',' | ' ' | '\t' | '\n' | '\r' | ';'));
    let mut value_parser = map(value_parser, |s: &str| {
        if let Ok(val) = s.parse::<i64>() {
            Value::Integer(val)
        } else if let Ok(val) = s.parse::<f64>() {
            Value::Float(val)
        } else if let Ok(val) = s.parse::<bool>() {
            Value::Boolean(val)
        } else {
            Value::String(s.to_string())
        }
    });
    value_parser.parse(input)
}

fn parse_value_list(input: &str) -> IResult<&str, Vec<Value>> {
    let separator_coma = delimited(space0, tag(","), space0);
    let mut value_parser = separated_list1(separator_coma, parse_value);
    value_parser.parse(input)
}

fn parse_key_value_pair(input: &str) -> IResult<&str, (String, Vec<Value>)> {
    let colon_separator = delimited(space0, tag(":"), space0);
    let mut parser = separated_pair(parse_identifier, colon_separator, parse_value_list);
    let (input, result) = parser.parse(input)?;
    Ok((input.trim_start(), result))
}

fn parse_section(input: &str) -> IResult<&str, (String, SectionMap)> {
    let (input, _) = space0(input)?;
    let (input, title) = parse_identifier(input)?;
    let (input, _) = multispace0(input)?;
    let mut parser = many1(terminated(parse_key_value_pair, space0));
    let (input, pairs) = parser.parse(input)?;
    Ok((input, (title, pairs.into_iter().collect())))
}

/// Filters out comment lines (starting with //, #, %, or ;) and blank lines
fn filter_comments(input: &str) -> String {
    input
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.starts_with("//")
                && !trimmed.starts_with('#')
                && !trimmed.starts_with('%')
                && !trimmed.starts_with(';')
                && !trimmed.is_empty()
        })
        .collect::<Vec<&str>>()
        .join("\n")
}

/// Parses the entire document into a HashMap
pub fn parse_document(input: &str) -> Result<DocumentMap, String> {
    let filtered = filter_comments(input);
    let mut parser = many1(delimited(multispace0, parse_section, multispace0));
    match parser.parse(filtered.as_str()) {
        Ok((remaining, sections)) => {
            if !remaining.trim().is_empty() {
                return Err(format!(
                    "Failed to parse entire document. Remaining: '{}'",
                    remaining
                ));
            }
            Ok(sections.into_iter().collect())
        }
        Err(e) => Err(format!("Parsing error: {:?}", e)),
    }
}

pub fn parse_document_from_file(path: &Path) -> Result<DocumentMap, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("cannot read task file {}: {}", path.display(), e))?;
    parse_document(&content)
}

fn single_value<'a>(section: &'a SectionMap, key: &str) -> Result<Option<&'a Value>, String> {
    match section.get(key) {
        None => Ok(None),
        Some(values) if values.len() == 1 => Ok(values.first()),
        Some(values) => Err(format!(
            "key '{}' expects a single value, got {}",
            key,
            values.len()
        )),
    }
}

pub fn get_f64(section: &SectionMap, key: &str) -> Result<Option<f64>, String> {
    match single_value(section, key)? {
        None => Ok(None),
        Some(v) => v
            .as_float()
            .map(Some)
            .ok_or_else(|| format!("key '{}' expects a number, got '{}'", key, v)),
    }
}

pub fn get_usize(section: &SectionMap, key: &str) -> Result<Option<usize>, String> {
    match single_value(section, key)? {
        None => Ok(None),
        Some(v) => v
            .as_integer()
            .and_then(|i| usize::try_from(i).ok())
            .map(Some)
            .ok_or_else(|| format!("key '{}' expects a non-negative integer, got '{}'", key, v)),
    }
}

pub fn get_bool(section: &SectionMap, key: &str) -> Result<Option<bool>, String> {
    match single_value(section, key)? {
        None => Ok(None),
        Some(v) => v
            .as_boolean()
            .map(Some)
            .ok_or_else(|| format!("key '{}' expects true or false, got '{}'", key, v)),
    }
}

pub fn get_string(section: &SectionMap, key: &str) -> Result<Option<String>, String> {
    Ok(single_value(section, key)?.map(|v| v.to_string()))
}

/// all numbers stored under the key, e.g. "initial_guess: 0.0, 0.0"
pub fn get_f64_vec(section: &SectionMap, key: &str) -> Result<Option<Vec<f64>>, String> {
    match section.get(key) {
        None => Ok(None),
        Some(values) => values
            .iter()
            .map(|v| {
                v.as_float()
                    .ok_or_else(|| format!("key '{}' expects numbers, got '{}'", key, v))
            })
            .collect::<Result<Vec<f64>, String>>()
            .map(Some),
    }
}

/// keys of the section that are not in the list of known keys
pub fn unknown_keys(section: &SectionMap, known: &[&str]) -> Vec<String> {
    let mut unknown: Vec<String> = section
        .keys()
        .filter(|k| !known.contains(&k.as_str()))
        .cloned()
        .collect();
    unknown.sort();
    unknown
}
