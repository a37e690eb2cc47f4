use crate::core::{capture_now, extract_column, map_worksheet, Template};
use crate::error::{Xls2JsonError, Xls2JsonResult};
use crate::excel::WorkbookReader;
use crate::parser::{identity_template, parse_template_file};
use crate::types::ColumnSelector;
use crate::writer::{to_json, write_output};
use colored::Colorize;
use std::path::PathBuf;
use tracing::info;

pub const DEFAULT_SHEET: &str = "Sheet1";

/// What to produce from the sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Records shaped by a JSON template file
    Template(PathBuf),
    /// Records with one key per label (identity template)
    Labels(Vec<String>),
    /// Distinct values of a single column
    Column(ColumnSelector),
}

/// Everything one conversion run needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub input: PathBuf,
    pub sheet: String,
    pub password: Option<String>,
    pub mode: Mode,
    pub unique_key: Option<ColumnSelector>,
    pub output: Option<PathBuf>,
    pub pretty: bool,
}

/// Raw selections as they come from the command line
#[derive(Debug, Clone, Default)]
pub struct RunArgs {
    pub input: PathBuf,
    pub sheet: Option<String>,
    pub password: Option<String>,
    pub template: Option<PathBuf>,
    pub mapping_labels: Option<Vec<String>>,
    pub column: Option<String>,
    pub unique_key: Option<String>,
    pub output: Option<PathBuf>,
    pub pretty: bool,
}

impl RunConfig {
    /// Validate the raw selections.
    ///
    /// Exactly one of template, mapping labels and column must be given.
    pub fn from_args(args: RunArgs) -> Xls2JsonResult<Self> {
        let selected = [
            args.template.is_some(),
            args.mapping_labels.is_some(),
            args.column.is_some(),
        ]
        .into_iter()
        .filter(|selected| *selected)
        .count();
        if selected > 1 {
            return Err(Xls2JsonError::Configuration(
                "--template, --mapping-labels and --column are mutually exclusive".to_string(),
            ));
        }

        let unique_key = args.unique_key.as_deref().map(ColumnSelector::parse);
        let (mode, unique_key) = match (args.template, args.mapping_labels, args.column) {
            (Some(path), _, _) => (Mode::Template(path), unique_key),
            (_, Some(labels), _) => {
                if labels.is_empty() {
                    return Err(Xls2JsonError::Configuration(
                        "--mapping-labels needs at least one label".to_string(),
                    ));
                }
                (Mode::Labels(labels), unique_key)
            }
            (_, _, Some(column)) => {
                if unique_key.is_some() {
                    return Err(Xls2JsonError::Configuration(
                        "--unique-key cannot be combined with --column".to_string(),
                    ));
                }
                (Mode::Column(ColumnSelector::parse(&column)), None)
            }
            (None, None, None) => {
                return Err(Xls2JsonError::Configuration(
                    "one of --template, --mapping-labels or --column is required".to_string(),
                ))
            }
        };

        Ok(Self {
            input: args.input,
            sheet: args.sheet.unwrap_or_else(|| DEFAULT_SHEET.to_string()),
            password: args.password,
            mode,
            unique_key,
            output: args.output,
            pretty: args.pretty,
        })
    }
}

/// Load the template for the run, before the workbook is opened
fn load_template(mode: &Mode) -> Xls2JsonResult<Option<Template>> {
    match mode {
        Mode::Template(path) => parse_template_file(path).map(Some),
        Mode::Labels(labels) => identity_template(labels).map(Some),
        Mode::Column(_) => Ok(None),
    }
}

/// Run the conversion and return the serialized JSON array
pub fn convert(config: &RunConfig) -> Xls2JsonResult<(String, usize)> {
    let template = load_template(&config.mode)?;

    let mut reader = match &config.password {
        Some(password) => WorkbookReader::open_with_password(&config.input, password)?,
        None => WorkbookReader::open(&config.input)?,
    };
    let sheet = reader.worksheet(&config.sheet)?;
    info!(
        file = %reader.path().display(),
        sheet = %sheet.name,
        rows = sheet.data_row_count(),
        "loaded sheet"
    );

    match (&config.mode, template) {
        (Mode::Column(selector), _) => {
            let values = extract_column(&sheet, selector)?;
            Ok((to_json(&values, config.pretty)?, values.len()))
        }
        (_, Some(template)) => {
            let now = capture_now();
            let records = map_worksheet(&sheet, &template, config.unique_key.as_ref(), &now)?;
            Ok((to_json(&records, config.pretty)?, records.len()))
        }
        (_, None) => Err(Xls2JsonError::Configuration(
            "no template for mapping mode".to_string(),
        )),
    }
}

/// Execute a full run: convert, then write to the output file or stdout
pub fn run(config: &RunConfig) -> Xls2JsonResult<()> {
    let (json, count) = convert(config)?;
    write_output(&json, config.output.as_deref())?;

    if let Some(path) = &config.output {
        let noun = match config.mode {
            Mode::Column(_) => "values",
            _ => "records",
        };
        eprintln!(
            "{} {} {} → {}",
            "✅".green(),
            count.to_string().bold(),
            noun,
            path.display().to_string().bright_blue()
        );
    }
    Ok(())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
